//! Graph fixtures shared by the library tests.

use btfgraph_core::{Composite, FwdKind, Graph, Int, Member, TypeData, TypeId};

pub fn member(g: &mut Graph, name: &str, ty: TypeId, bit_offset: u32) -> Member {
    Member {
        name: g.intern(name),
        ty,
        bit_offset,
        bitfield_size: 0,
    }
}

pub fn structure(size: u32, members: Vec<Member>) -> TypeData {
    TypeData::Struct(Composite {
        size,
        bitfield_encoding: false,
        members,
    })
}

/// A miniature kernel:
///
/// ```text
/// [1] int              [8]  fwd struct sock
/// [2] long             [9]  ptr -> 8
/// [3] pid_t -> 1       [10] struct socket { sk: 9 }
/// [4] ptr -> 5         [11] struct sock { refcnt: 1 }
/// [5] struct task_struct { pid: 3, parent: 4, regs: 6 }
/// [6] ptr -> 7         [12] struct unrelated { x: 2 }
/// [7] struct pt_regs { ip: 2 }
///                      [13] const -> 12
/// ```
pub fn kernel_graph() -> Graph {
    let mut g = Graph::new();
    let int = g.add("int", TypeData::Int(Int::new(4, true)));
    let long = g.add("long", TypeData::Int(Int::new(8, true)));
    let pid_t = g.add("pid_t", TypeData::Typedef(int));
    let task_ptr = g.add("", TypeData::Pointer(TypeId(5)));
    let members = vec![
        member(&mut g, "pid", pid_t, 0),
        member(&mut g, "parent", task_ptr, 64),
        member(&mut g, "regs", TypeId(6), 128),
    ];
    g.add("task_struct", structure(24, members));
    g.add("", TypeData::Pointer(TypeId(7)));
    let members = vec![member(&mut g, "ip", long, 0)];
    g.add("pt_regs", structure(8, members));
    let fwd = g.add("sock", TypeData::Fwd(FwdKind::Struct));
    let sock_ptr = g.add("", TypeData::Pointer(fwd));
    let members = vec![member(&mut g, "sk", sock_ptr, 0)];
    g.add("socket", structure(8, members));
    let members = vec![member(&mut g, "refcnt", int, 0)];
    g.add("sock", structure(4, members));
    let members = vec![member(&mut g, "x", long, 0)];
    let unrelated = g.add("unrelated", structure(8, members));
    g.add("", TypeData::Const(unrelated));
    g
}
