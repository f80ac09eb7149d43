use btfgraph_core::{
    Array, Composite, DataSec, DeclTag, Enum, EnumValue, Func, FuncProto, FwdKind, Graph, Int,
    Kind, Linkage, Member, Param, StrOffset, StringTable, Type, TypeData, TypeId, TypeTag, Var,
    VarSecinfo,
};

use crate::test_utils::{RawBtf, kind_info, list_graph};
use crate::{EncodeError, EncodeOptions, Endian, StringsMode, decode, encode};

/// One node of every kind except void.
fn every_kind() -> Graph {
    let mut g = Graph::new();
    let int = g.add("int", TypeData::Int(Int::new(4, true)));
    let ptr = g.add("", TypeData::Pointer(int));
    g.add(
        "",
        TypeData::Array(Array {
            element: int,
            index: int,
            len: 8,
        }),
    );
    let x = g.intern("x");
    let members = vec![Member {
        name: x,
        ty: int,
        bit_offset: 3,
        bitfield_size: 5,
    }];
    g.add(
        "bits",
        TypeData::Struct(Composite {
            size: 4,
            bitfield_encoding: true,
            members: members.clone(),
        }),
    );
    g.add(
        "u",
        TypeData::Union(Composite {
            size: 4,
            bitfield_encoding: false,
            members: vec![Member {
                bitfield_size: 0,
                ..members[0]
            }],
        }),
    );
    let a = g.intern("A");
    g.add(
        "e",
        TypeData::Enum(Enum {
            size: 4,
            signed: true,
            values: vec![EnumValue {
                name: a,
                value: u64::from(u32::MAX),
            }],
        }),
    );
    g.add("fwd", TypeData::Fwd(FwdKind::Union));
    g.add("t", TypeData::Typedef(int));
    g.add("", TypeData::Volatile(int));
    g.add("", TypeData::Const(int));
    g.add("", TypeData::Restrict(ptr));
    let proto = g.add(
        "",
        TypeData::FuncProto(FuncProto {
            ret: int,
            params: vec![Param { name: x, ty: ptr }],
            variadic: true,
        }),
    );
    let func = g.add(
        "f",
        TypeData::Func(Func {
            linkage: Linkage::Global,
            proto,
        }),
    );
    let var = g.add(
        "v",
        TypeData::Var(Var {
            linkage: Linkage::Static,
            ty: int,
        }),
    );
    g.add(
        ".data",
        TypeData::DataSec(DataSec {
            size: 4,
            vars: vec![VarSecinfo {
                var,
                offset: 0,
                size: 4,
            }],
        }),
    );
    g.add("double", TypeData::Float(8));
    g.add(
        "tag",
        TypeData::DeclTag(DeclTag {
            target: func,
            component: -1,
            attribute: true,
        }),
    );
    g.add(
        "user",
        TypeData::TypeTag(TypeTag {
            target: ptr,
            attribute: false,
        }),
    );
    g.add(
        "e64",
        TypeData::Enum64(Enum {
            size: 8,
            signed: false,
            values: vec![EnumValue {
                name: a,
                value: 0xdead_beef_0000_0001,
            }],
        }),
    );
    g
}

#[test]
fn round_trips_every_kind() {
    let g = every_kind();
    let bytes = encode(&g, &EncodeOptions::default()).unwrap();

    assert_eq!(decode(&bytes).unwrap().graph, g);
}

#[test]
fn round_trips_cycles() {
    let g = list_graph();
    let bytes = encode(&g, &EncodeOptions::default()).unwrap();

    assert_eq!(decode(&bytes).unwrap().graph, g);
}

#[test]
fn reencoding_is_byte_identical() {
    let raw = RawBtf::new(b"\0int\0unused\0")
        .words(&[1, kind_info(Kind::Int, false, 0), 4, 0x0100_0020])
        .words(&[0, kind_info(Kind::Pointer, false, 0), 1])
        .build();

    let decoded = decode(&raw).unwrap();
    let options = EncodeOptions {
        endian: decoded.header.endian,
        ..EncodeOptions::default()
    };

    assert_eq!(encode(&decoded.graph, &options).unwrap(), raw);
}

#[test]
fn big_endian_output() {
    let g = list_graph();
    let options = EncodeOptions {
        endian: Endian::Big,
        ..EncodeOptions::default()
    };
    let bytes = encode(&g, &options).unwrap();

    assert_eq!(&bytes[..2], &[0xeb, 0x9f]);
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded.header.endian, Endian::Big);
    assert_eq!(decoded.graph, g);
}

#[test]
fn recompact_keeps_only_referenced_strings() {
    let strings = StringTable::from_bytes(b"\0unused\0int\0int\0".to_vec());
    let mut g = Graph::with_strings(strings);
    g.push(Type::new(StrOffset(12), TypeData::Int(Int::new(4, true))));
    g.push(Type::anon(TypeData::Pointer(TypeId(1))));

    let options = EncodeOptions {
        strings: StringsMode::Recompact,
        ..EncodeOptions::default()
    };
    let decoded = decode(&encode(&g, &options).unwrap()).unwrap().graph;

    assert_eq!(decoded.strings().as_bytes(), b"\0int\0");
    assert_eq!(decoded.name_of(TypeId(1)), Some("int"));
    assert_eq!(decoded.get(TypeId(2)), g.get(TypeId(2)));
}

#[test]
fn recompact_rejects_unresolvable_names() {
    let mut g = Graph::new();
    g.push(Type::new(StrOffset(99), TypeData::Float(4)));

    let options = EncodeOptions {
        strings: StringsMode::Recompact,
        ..EncodeOptions::default()
    };

    assert_eq!(
        encode(&g, &options),
        Err(EncodeError::InvalidName {
            id: TypeId(1),
            offset: StrOffset(99),
        })
    );
}

#[test]
fn vlen_overflow() {
    let mut g = Graph::new();
    let member = Member {
        name: StrOffset::EMPTY,
        ty: TypeId::VOID,
        bit_offset: 0,
        bitfield_size: 0,
    };
    g.add(
        "huge",
        TypeData::Struct(Composite {
            size: 0,
            bitfield_encoding: false,
            members: vec![member; 0x1_0000],
        }),
    );

    assert_eq!(
        encode(&g, &EncodeOptions::default()),
        Err(EncodeError::TooManyMembers {
            id: TypeId(1),
            count: 0x1_0000,
        })
    );
}

#[test]
fn void_only_at_zero() {
    let mut g = Graph::new();
    g.push(Type::void());

    assert_eq!(
        encode(&g, &EncodeOptions::default()),
        Err(EncodeError::MisplacedVoid(TypeId(1)))
    );
}
