//! Fixtures shared by the codec tests.

use btfgraph_core::{Composite, Graph, Int, Kind, Member, TypeData, TypeId};

use crate::{Endian, Header};

/// `int`, an anonymous pointer to `struct list`, and
/// `struct list { int val; struct list *next; }`.
///
/// The pointer is a forward reference and the struct closes a cycle through it.
pub fn list_graph() -> Graph {
    let mut g = Graph::new();
    let int = g.add("int", TypeData::Int(Int::new(4, true)));
    let ptr = g.add("", TypeData::Pointer(TypeId(3)));
    let val = g.intern("val");
    let next = g.intern("next");
    g.add(
        "list",
        TypeData::Struct(Composite {
            size: 16,
            bitfield_encoding: false,
            members: vec![
                Member {
                    name: val,
                    ty: int,
                    bit_offset: 0,
                    bitfield_size: 0,
                },
                Member {
                    name: next,
                    ty: ptr,
                    bit_offset: 64,
                    bitfield_size: 0,
                },
            ],
        }),
    );
    g
}

/// The `info` word of a type prefix.
pub fn info(kind: u8, kind_flag: bool, vlen: u32) -> u32 {
    (u32::from(kind_flag) << 31) | (u32::from(kind) << 24) | vlen
}

pub fn kind_info(kind: Kind, kind_flag: bool, vlen: u32) -> u32 {
    info(kind as u8, kind_flag, vlen)
}

/// Hand-assembled BTF buffer, type section first, strings right after.
pub struct RawBtf {
    endian: Endian,
    types: Vec<u8>,
    strings: Vec<u8>,
}

impl RawBtf {
    pub fn new(strings: &[u8]) -> Self {
        Self::with_endian(Endian::Little, strings)
    }

    pub fn with_endian(endian: Endian, strings: &[u8]) -> Self {
        Self {
            endian,
            types: Vec::new(),
            strings: strings.to_vec(),
        }
    }

    /// Append raw u32 words to the type section.
    pub fn words(mut self, words: &[u32]) -> Self {
        for &w in words {
            self.types.extend_from_slice(&self.endian.u32_bytes(w));
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let header = Header::for_sections(
            self.endian,
            self.types.len() as u32,
            self.strings.len() as u32,
            None,
        );
        let mut out = header.to_bytes();
        out.extend_from_slice(&self.types);
        out.extend_from_slice(&self.strings);
        out
    }
}

/// Overwrite the header field at byte `pos` with a little-endian u32.
pub fn patch_u32(bytes: &mut [u8], pos: usize, value: u32) {
    bytes[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
}
