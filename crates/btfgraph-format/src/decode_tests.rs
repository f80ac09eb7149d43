use btfgraph_core::{
    Composite, DeclTag, Enum, EnumValue, FuncProto, GraphError, Int, Kind, Member, Param,
    StrOffset, TypeData, TypeId, TypeTag,
};

use crate::test_utils::{RawBtf, info, kind_info, list_graph, patch_u32};
use crate::{
    DecodeError, EncodeOptions, Endian, HeaderError, SplitGraph, decode, encode, encode_split,
};

/// `int` (ID 1) and `int *` (ID 2).
fn int_and_pointer(endian: Endian) -> Vec<u8> {
    RawBtf::with_endian(endian, b"\0int\0")
        .words(&[1, kind_info(Kind::Int, false, 0), 4, 0x0100_0020])
        .words(&[0, kind_info(Kind::Pointer, false, 0), 1])
        .build()
}

#[test]
fn decodes_int_and_pointer() {
    let decoded = decode(&int_and_pointer(Endian::Little)).unwrap();
    let g = &decoded.graph;

    assert_eq!(g.len(), 3);
    assert_eq!(g.get(TypeId(1)).unwrap().data, TypeData::Int(Int::new(4, true)));
    assert_eq!(g.name_of(TypeId(1)), Some("int"));
    assert_eq!(g.get(TypeId(2)).unwrap().data, TypeData::Pointer(TypeId(1)));
    assert_eq!(g.name_of(TypeId(2)), Some(""));
    assert_eq!(decoded.header.endian, Endian::Little);
}

#[test]
fn decodes_big_endian() {
    let little = decode(&int_and_pointer(Endian::Little)).unwrap();
    let big = decode(&int_and_pointer(Endian::Big)).unwrap();

    assert_eq!(big.header.endian, Endian::Big);
    assert_eq!(big.graph, little.graph);
}

#[test]
fn forward_references_and_cycles() {
    let bytes = encode(&list_graph(), &EncodeOptions::default()).unwrap();
    let g = decode(&bytes).unwrap().graph;

    assert_eq!(g.get(TypeId(2)).unwrap().edges(), vec![TypeId(3)]);
    assert_eq!(g.get(TypeId(3)).unwrap().edges(), vec![TypeId(1), TypeId(2)]);
}

#[test]
fn self_referencing_pointer() {
    let bytes = RawBtf::new(b"\0")
        .words(&[0, kind_info(Kind::Pointer, false, 0), 1])
        .build();

    let g = decode(&bytes).unwrap().graph;

    assert_eq!(g.get(TypeId(1)).unwrap().data, TypeData::Pointer(TypeId(1)));
}

#[test]
fn empty_type_section() {
    let g = decode(&RawBtf::new(b"\0").build()).unwrap().graph;

    assert!(g.is_empty());
    assert_eq!(g.len(), 1);
}

#[test]
fn bitfield_members() {
    let bytes = RawBtf::new(b"\0s\0a\0")
        .words(&[1, kind_info(Kind::Struct, true, 1), 4])
        .words(&[3, 0, (3 << 24) | 5])
        .build();

    let g = decode(&bytes).unwrap().graph;

    assert_eq!(
        g.get(TypeId(1)).unwrap().data,
        TypeData::Struct(Composite {
            size: 4,
            bitfield_encoding: true,
            members: vec![Member {
                name: StrOffset(3),
                ty: TypeId::VOID,
                bit_offset: 5,
                bitfield_size: 3,
            }],
        })
    );
}

#[test]
fn variadic_marker_is_stripped() {
    let bytes = RawBtf::new(b"\0int\0")
        .words(&[1, kind_info(Kind::Int, false, 0), 4, 0x0100_0020])
        .words(&[0, kind_info(Kind::FuncProto, false, 2), 1])
        .words(&[1, 1, 0, 0])
        .build();

    let g = decode(&bytes).unwrap().graph;

    assert_eq!(
        g.get(TypeId(2)).unwrap().data,
        TypeData::FuncProto(FuncProto {
            ret: TypeId(1),
            params: vec![Param {
                name: StrOffset(1),
                ty: TypeId(1),
            }],
            variadic: true,
        })
    );
}

#[test]
fn enum64_values_join_halves() {
    let bytes = RawBtf::new(b"\0e\0A\0")
        .words(&[1, kind_info(Kind::Enum64, false, 1), 8])
        .words(&[3, 1, 2])
        .build();

    let g = decode(&bytes).unwrap().graph;

    assert_eq!(
        g.get(TypeId(1)).unwrap().data,
        TypeData::Enum64(Enum {
            size: 8,
            signed: false,
            values: vec![EnumValue {
                name: StrOffset(3),
                value: 0x2_0000_0001,
            }],
        })
    );
}

#[test]
fn truncated_type_section() {
    let mut bytes = int_and_pointer(Endian::Little);
    patch_u32(&mut bytes, 12, 100);

    assert_eq!(
        decode(&bytes),
        Err(DecodeError::TruncatedSection {
            section: "type",
            offset: 24,
            len: 100,
            available: 33,
        })
    );
}

#[test]
fn section_past_end_of_buffer() {
    let mut bytes = int_and_pointer(Endian::Little);
    patch_u32(&mut bytes, 16, 1000);

    assert_eq!(
        decode(&bytes),
        Err(DecodeError::MalformedHeader(HeaderError::SectionOutOfBounds {
            section: "string",
            offset: 1024,
            available: 57,
        }))
    );
}

#[test]
fn records_run_past_section() {
    let bytes = RawBtf::new(b"\0s\0")
        .words(&[1, kind_info(Kind::Struct, false, 2), 8])
        .words(&[0, 0, 0])
        .build();

    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnexpectedEof {
            id: TypeId(1),
            offset: 24,
        })
    );
}

#[test]
fn partial_prefix() {
    let bytes = RawBtf::new(b"\0")
        .words(&[0, kind_info(Kind::Pointer, false, 0), 0])
        .words(&[0, 0])
        .build();

    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnexpectedEof {
            id: TypeId(2),
            offset: 36,
        })
    );
}

#[test]
fn unknown_kind() {
    let bytes = RawBtf::new(b"\0").words(&[0, info(25, false, 0), 0]).build();
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnknownKind {
            id: TypeId(1),
            kind: 25,
        })
    );

    let bytes = RawBtf::new(b"\0").words(&[0, info(0, false, 0), 0]).build();
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnknownKind {
            id: TypeId(1),
            kind: 0,
        })
    );
}

#[test]
fn invalid_func_linkage() {
    let bytes = RawBtf::new(b"\0f\0")
        .words(&[1, kind_info(Kind::Func, false, 5), 0])
        .build();

    assert_eq!(
        decode(&bytes),
        Err(DecodeError::InvalidLinkage {
            id: TypeId(1),
            linkage: 5,
        })
    );
}

#[test]
fn attribute_tags_survive_reencoding() {
    let bytes = RawBtf::new(b"\0int\0noinline\0")
        .words(&[1, kind_info(Kind::Int, false, 0), 4, 0x0100_0020])
        .words(&[5, kind_info(Kind::DeclTag, true, 0), 1, u32::MAX])
        .words(&[5, kind_info(Kind::TypeTag, true, 0), 1])
        .build();

    let g = decode(&bytes).unwrap().graph;

    assert_eq!(
        g.get(TypeId(2)).unwrap().data,
        TypeData::DeclTag(DeclTag {
            target: TypeId(1),
            component: -1,
            attribute: true,
        })
    );
    assert_eq!(
        g.get(TypeId(3)).unwrap().data,
        TypeData::TypeTag(TypeTag {
            target: TypeId(1),
            attribute: true,
        })
    );
    assert_eq!(encode(&g, &EncodeOptions::default()).unwrap(), bytes);
}

#[test]
fn reserved_bits_are_rejected() {
    let flagged_pointer = RawBtf::new(b"\0")
        .words(&[0, kind_info(Kind::Pointer, true, 0), 0])
        .build();
    let int_padding = RawBtf::new(b"\0")
        .words(&[0, kind_info(Kind::Int, false, 0), 4, 0x0100_1020])
        .build();
    let array_vlen = RawBtf::new(b"\0")
        .words(&[0, kind_info(Kind::Array, false, 1), 0, 0, 0, 1])
        .build();
    let info_padding = RawBtf::new(b"\0")
        .words(&[0, kind_info(Kind::Float, false, 0) | 0x0001_0000, 8])
        .build();

    for (bytes, kind) in [
        (flagged_pointer, Kind::Pointer),
        (int_padding, Kind::Int),
        (array_vlen, Kind::Array),
        (info_padding, Kind::Float),
    ] {
        assert_eq!(
            decode(&bytes),
            Err(DecodeError::ReservedBits {
                id: TypeId(1),
                kind,
            })
        );
    }
}

#[test]
fn dangling_edge_is_rejected_after_scan() {
    let bytes = RawBtf::new(b"\0")
        .words(&[0, kind_info(Kind::Pointer, false, 0), 7])
        .build();

    assert_eq!(
        decode(&bytes),
        Err(DecodeError::Graph(GraphError::DanglingEdge {
            from: TypeId(1),
            to: TypeId(7),
        }))
    );
}

#[test]
fn unresolvable_name_is_rejected() {
    let bytes = RawBtf::new(b"\0")
        .words(&[40, kind_info(Kind::Pointer, false, 0), 0])
        .build();

    assert_eq!(
        decode(&bytes),
        Err(DecodeError::Graph(GraphError::InvalidName {
            id: TypeId(1),
            offset: StrOffset(40),
        }))
    );
}

#[test]
fn split_buffer_needs_a_base() {
    let bytes = encode_split(&SplitGraph::new(10), &EncodeOptions::default()).unwrap();

    assert_eq!(decode(&bytes), Err(DecodeError::UnexpectedSplit));
}
