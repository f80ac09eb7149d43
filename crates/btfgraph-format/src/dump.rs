//! Human-readable type listing, modelled on `bpftool btf dump`.
//!
//! One line per type, `[id] KIND 'name' attrs...`, with member, parameter,
//! enumerator and section records indented below their owner.

use std::fmt::Write as _;

use btfgraph_core::{
    Enum, FwdKind, Graph, IntEncoding, StrOffset, StringTable, Type, TypeData, TypeId,
};

use crate::split::SplitGraph;

/// Dump every type of `graph` except void.
pub fn dump(graph: &Graph) -> String {
    let ctx = DumpContext {
        strings: graph.strings(),
    };
    let mut out = String::new();
    for (id, ty) in graph.iter().skip(1) {
        ctx.dump_type(&mut out, id, ty);
    }
    out
}

/// Dump the local types of a split graph, numbered from its base type count.
pub fn dump_split(split: &SplitGraph) -> String {
    let ctx = DumpContext {
        strings: &split.strings,
    };
    let mut out = String::new();
    for (i, ty) in split.types.iter().enumerate() {
        let Some(id) = split.id_of(i) else { break };
        ctx.dump_type(&mut out, id, ty);
    }
    out
}

struct DumpContext<'a> {
    strings: &'a StringTable,
}

impl DumpContext<'_> {
    fn name(&self, offset: StrOffset) -> &str {
        match self.strings.resolve(offset) {
            Some("") => "(anon)",
            Some(s) => s,
            None => "<invalid>",
        }
    }

    fn dump_type(&self, out: &mut String, id: TypeId, ty: &Type) {
        write!(out, "[{id}] {} '{}'", ty.kind().as_str(), self.name(ty.name)).unwrap();

        match &ty.data {
            TypeData::Void => out.push('\n'),
            TypeData::Int(int) => writeln!(
                out,
                " size={} bits_offset={} nr_bits={} encoding={}",
                int.size,
                int.bit_offset,
                int.bits,
                int_encoding(int.encoding)
            )
            .unwrap(),
            TypeData::Pointer(t)
            | TypeData::Typedef(t)
            | TypeData::Volatile(t)
            | TypeData::Const(t)
            | TypeData::Restrict(t) => writeln!(out, " type_id={t}").unwrap(),
            TypeData::TypeTag(t) => {
                writeln!(out, " type_id={}{}", t.target, attr_suffix(t.attribute)).unwrap();
            }
            TypeData::Array(a) => writeln!(
                out,
                " type_id={} index_type_id={} nr_elems={}",
                a.element, a.index, a.len
            )
            .unwrap(),
            TypeData::Struct(c) | TypeData::Union(c) => {
                writeln!(out, " size={} vlen={}", c.size, c.members.len()).unwrap();
                for m in &c.members {
                    write!(
                        out,
                        "  '{}' type_id={} bits_offset={}",
                        self.name(m.name),
                        m.ty,
                        m.bit_offset
                    )
                    .unwrap();
                    if m.bitfield_size != 0 {
                        write!(out, " bitfield_size={}", m.bitfield_size).unwrap();
                    }
                    out.push('\n');
                }
            }
            TypeData::Enum(e) => self.dump_enum(out, e, false),
            TypeData::Enum64(e) => self.dump_enum(out, e, true),
            TypeData::Fwd(kind) => {
                let kind = match kind {
                    FwdKind::Struct => "struct",
                    FwdKind::Union => "union",
                };
                writeln!(out, " fwd_kind={kind}").unwrap();
            }
            TypeData::Func(f) => writeln!(
                out,
                " type_id={} linkage={}",
                f.proto,
                f.linkage.as_str()
            )
            .unwrap(),
            TypeData::FuncProto(p) => {
                writeln!(out, " ret_type_id={} vlen={}", p.ret, ty.vlen()).unwrap();
                for param in &p.params {
                    writeln!(out, "  '{}' type_id={}", self.name(param.name), param.ty).unwrap();
                }
                if p.variadic {
                    writeln!(out, "  ...").unwrap();
                }
            }
            TypeData::Var(v) => writeln!(
                out,
                " type_id={} linkage={}",
                v.ty,
                v.linkage.as_str()
            )
            .unwrap(),
            TypeData::DataSec(d) => {
                writeln!(out, " size={} vlen={}", d.size, d.vars.len()).unwrap();
                for v in &d.vars {
                    writeln!(out, "  type_id={} offset={} size={}", v.var, v.offset, v.size)
                        .unwrap();
                }
            }
            TypeData::Float(size) => writeln!(out, " size={size}").unwrap(),
            TypeData::DeclTag(t) => writeln!(
                out,
                " type_id={} component_idx={}{}",
                t.target,
                t.component,
                attr_suffix(t.attribute)
            )
            .unwrap(),
        }
    }

    fn dump_enum(&self, out: &mut String, e: &Enum, wide: bool) {
        let encoding = if e.signed { "SIGNED" } else { "UNSIGNED" };
        writeln!(
            out,
            " encoding={encoding} size={} vlen={}",
            e.size,
            e.values.len()
        )
        .unwrap();
        for v in &e.values {
            let name = self.name(v.name);
            match (wide, e.signed) {
                (false, true) => writeln!(out, "  '{name}' val={}", v.value as u32 as i32),
                (false, false) => writeln!(out, "  '{name}' val={}", v.value as u32),
                (true, true) => writeln!(out, "  '{name}' val={}", v.value as i64),
                (true, false) => writeln!(out, "  '{name}' val={}", v.value),
            }
            .unwrap();
        }
    }
}

fn int_encoding(encoding: IntEncoding) -> String {
    let mut parts = Vec::new();
    if encoding.is_signed() {
        parts.push("SIGNED");
    }
    if encoding.is_char() {
        parts.push("CHAR");
    }
    if encoding.is_bool() {
        parts.push("BOOL");
    }
    if parts.is_empty() {
        return "(none)".to_owned();
    }
    parts.join("|")
}

fn attr_suffix(attribute: bool) -> &'static str {
    if attribute { " kind_flag=1" } else { "" }
}
