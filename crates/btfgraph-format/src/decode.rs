//! Decoding of self-contained BTF buffers.

use btfgraph_core::{
    Array, Composite, DataSec, DeclTag, Enum, EnumValue, Func, FuncProto, FwdKind, Graph,
    GraphError, Int, IntEncoding, Kind, Linkage, Member, Param, StrOffset, StringTable, Type,
    TypeData, TypeId, TypeTag, Var, VarSecinfo,
};

use crate::constants::{
    BITFIELD_OFFSET_MASK, INFO_KIND_FLAG_SHIFT, INFO_KIND_MASK, INFO_KIND_SHIFT,
    INFO_RESERVED_MASK, INFO_VLEN_MASK, INT_RESERVED_MASK, TYPE_PREFIX_LEN,
};
use crate::error::DecodeError;
use crate::header::{Endian, Header};

/// A decoded buffer: the type graph plus the header it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub graph: Graph,
    pub header: Header,
}

/// Decode a self-contained BTF buffer into a validated graph.
///
/// Type IDs are assigned in encounter order starting at 1; ID 0 is void.
pub fn decode(bytes: &[u8]) -> Result<Decoded, DecodeError> {
    let header = Header::from_bytes(bytes)?;
    if header.is_split() {
        return Err(DecodeError::UnexpectedSplit);
    }
    let (types, strings) = read_sections(bytes, &header, 1)?;

    let mut graph = Graph::with_strings(strings);
    for ty in types {
        graph.push(ty);
    }
    graph.validate()?;

    Ok(Decoded { graph, header })
}

/// Slice out both sections and decode the type section, numbering types
/// from `first_id`.
pub(crate) fn read_sections(
    bytes: &[u8],
    header: &Header,
    first_id: u32,
) -> Result<(Vec<Type>, StringTable), DecodeError> {
    let type_range = header.type_section(bytes.len())?;
    let str_range = header.str_section(bytes.len())?;

    let strings = StringTable::from_bytes(bytes[str_range].to_vec());
    let start = type_range.start;
    let types = TypeReader {
        bytes: &bytes[type_range],
        base: start,
        endian: header.endian,
    }
    .read_all(first_id)?;

    Ok((types, strings))
}

/// The fixed part every encoded type starts with.
struct Prefix {
    name: StrOffset,
    kind: u8,
    kind_flag: bool,
    vlen: u32,
    size_or_type: u32,
    reserved: u32,
}

impl Prefix {
    fn new(name: u32, info: u32, size_or_type: u32) -> Self {
        Self {
            name: StrOffset(name),
            kind: ((info >> INFO_KIND_SHIFT) & INFO_KIND_MASK) as u8,
            kind_flag: (info >> INFO_KIND_FLAG_SHIFT) & 1 == 1,
            vlen: info & INFO_VLEN_MASK,
            size_or_type,
            reserved: info & INFO_RESERVED_MASK,
        }
    }

    /// Whether every field `kind` gives no meaning to is zero. Encoding
    /// writes those fields as zero, so anything else would not survive.
    fn reserved_clear(&self, kind: Kind) -> bool {
        let flag_ok = !self.kind_flag
            || matches!(
                kind,
                Kind::Struct
                    | Kind::Union
                    | Kind::Enum
                    | Kind::Enum64
                    | Kind::Fwd
                    | Kind::DeclTag
                    | Kind::TypeTag
            );
        let vlen_ok = self.vlen == 0
            || matches!(
                kind,
                Kind::Struct
                    | Kind::Union
                    | Kind::Enum
                    | Kind::Enum64
                    | Kind::Func
                    | Kind::FuncProto
                    | Kind::DataSec
            );
        let size_ok = self.size_or_type == 0 || !matches!(kind, Kind::Array | Kind::Fwd);
        self.reserved == 0 && flag_ok && vlen_ok && size_ok
    }

    fn ty(&self) -> TypeId {
        TypeId(self.size_or_type)
    }
}

/// Bytes that follow the prefix of one type.
fn trailing_len(kind: Kind, vlen: usize) -> usize {
    match kind {
        Kind::Int | Kind::Var | Kind::DeclTag => 4,
        Kind::Array => 12,
        Kind::Struct | Kind::Union | Kind::DataSec | Kind::Enum64 => vlen * 12,
        Kind::Enum | Kind::FuncProto => vlen * 8,
        _ => 0,
    }
}

struct TypeReader<'a> {
    bytes: &'a [u8],
    /// Absolute offset of `bytes` in the whole buffer, for error reporting.
    base: usize,
    endian: Endian,
}

impl TypeReader<'_> {
    fn read_all(&self, first_id: u32) -> Result<Vec<Type>, DecodeError> {
        let mut types = Vec::new();
        let mut pos = 0;
        while pos < self.bytes.len() {
            let id = TypeId::nth_from(first_id, types.len()).ok_or(GraphError::TooManyTypes {
                first_id,
                count: types.len() + 1,
            })?;
            let eof = DecodeError::UnexpectedEof {
                id,
                offset: self.base + pos,
            };

            let prefix = self.bytes.get(pos..pos + TYPE_PREFIX_LEN).ok_or(eof.clone())?;
            let prefix = Prefix::new(
                self.endian.read_u32(prefix, 0),
                self.endian.read_u32(prefix, 4),
                self.endian.read_u32(prefix, 8),
            );
            // Kind 0 is reserved for the implicit void and never encoded.
            let kind = Kind::from_u8(prefix.kind)
                .filter(|&k| k != Kind::Void)
                .ok_or(DecodeError::UnknownKind {
                    id,
                    kind: prefix.kind,
                })?;
            if !prefix.reserved_clear(kind) {
                return Err(DecodeError::ReservedBits { id, kind });
            }

            let body_start = pos + TYPE_PREFIX_LEN;
            let body_end = body_start + trailing_len(kind, prefix.vlen as usize);
            let body = self.bytes.get(body_start..body_end).ok_or(eof)?;

            let data = Body {
                bytes: body,
                endian: self.endian,
            }
            .decode(id, kind, &prefix)?;
            types.push(Type::new(prefix.name, data));
            pos = body_end;
        }
        Ok(types)
    }
}

/// The trailing records of one type, already bounds-checked.
struct Body<'a> {
    bytes: &'a [u8],
    endian: Endian,
}

impl Body<'_> {
    /// The `i`-th u32 word of the body.
    fn word(&self, i: usize) -> u32 {
        self.endian.read_u32(self.bytes, i * 4)
    }

    fn decode(&self, id: TypeId, kind: Kind, p: &Prefix) -> Result<TypeData, DecodeError> {
        let vlen = p.vlen as usize;
        let data = match kind {
            Kind::Void => TypeData::Void,
            Kind::Int => {
                let w = self.word(0);
                if w & INT_RESERVED_MASK != 0 {
                    return Err(DecodeError::ReservedBits { id, kind });
                }
                TypeData::Int(Int {
                    size: p.size_or_type,
                    encoding: IntEncoding(((w >> 24) & 0x0f) as u8),
                    bit_offset: ((w >> 16) & 0xff) as u8,
                    bits: (w & 0xff) as u8,
                })
            }
            Kind::Pointer => TypeData::Pointer(p.ty()),
            Kind::Array => TypeData::Array(Array {
                element: TypeId(self.word(0)),
                index: TypeId(self.word(1)),
                len: self.word(2),
            }),
            Kind::Struct => TypeData::Struct(self.composite(p)),
            Kind::Union => TypeData::Union(self.composite(p)),
            Kind::Enum => TypeData::Enum(Enum {
                size: p.size_or_type,
                signed: p.kind_flag,
                values: (0..vlen)
                    .map(|i| EnumValue {
                        name: StrOffset(self.word(i * 2)),
                        value: u64::from(self.word(i * 2 + 1)),
                    })
                    .collect(),
            }),
            Kind::Fwd => TypeData::Fwd(if p.kind_flag {
                FwdKind::Union
            } else {
                FwdKind::Struct
            }),
            Kind::Typedef => TypeData::Typedef(p.ty()),
            Kind::Volatile => TypeData::Volatile(p.ty()),
            Kind::Const => TypeData::Const(p.ty()),
            Kind::Restrict => TypeData::Restrict(p.ty()),
            Kind::Func => TypeData::Func(Func {
                linkage: linkage(id, p.vlen)?,
                proto: p.ty(),
            }),
            Kind::FuncProto => {
                let mut params: Vec<Param> = (0..vlen)
                    .map(|i| Param {
                        name: StrOffset(self.word(i * 2)),
                        ty: TypeId(self.word(i * 2 + 1)),
                    })
                    .collect();
                // A trailing nameless void parameter marks `...`.
                let variadic = params
                    .last()
                    .is_some_and(|p| p.name.is_empty() && p.ty.is_void());
                if variadic {
                    params.pop();
                }
                TypeData::FuncProto(FuncProto {
                    ret: p.ty(),
                    params,
                    variadic,
                })
            }
            Kind::Var => TypeData::Var(Var {
                linkage: linkage(id, self.word(0))?,
                ty: p.ty(),
            }),
            Kind::DataSec => TypeData::DataSec(DataSec {
                size: p.size_or_type,
                vars: (0..vlen)
                    .map(|i| VarSecinfo {
                        var: TypeId(self.word(i * 3)),
                        offset: self.word(i * 3 + 1),
                        size: self.word(i * 3 + 2),
                    })
                    .collect(),
            }),
            Kind::Float => TypeData::Float(p.size_or_type),
            Kind::DeclTag => TypeData::DeclTag(DeclTag {
                target: p.ty(),
                component: self.word(0) as i32,
                attribute: p.kind_flag,
            }),
            Kind::TypeTag => TypeData::TypeTag(TypeTag {
                target: p.ty(),
                attribute: p.kind_flag,
            }),
            Kind::Enum64 => TypeData::Enum64(Enum {
                size: p.size_or_type,
                signed: p.kind_flag,
                values: (0..vlen)
                    .map(|i| {
                        let lo = u64::from(self.word(i * 3 + 1));
                        let hi = u64::from(self.word(i * 3 + 2));
                        EnumValue {
                            name: StrOffset(self.word(i * 3)),
                            value: (hi << 32) | lo,
                        }
                    })
                    .collect(),
            }),
        };
        Ok(data)
    }

    fn composite(&self, p: &Prefix) -> Composite {
        let members = (0..p.vlen as usize)
            .map(|i| {
                let offset = self.word(i * 3 + 2);
                let (bit_offset, bitfield_size) = if p.kind_flag {
                    (offset & BITFIELD_OFFSET_MASK, (offset >> 24) as u8)
                } else {
                    (offset, 0)
                };
                Member {
                    name: StrOffset(self.word(i * 3)),
                    ty: TypeId(self.word(i * 3 + 1)),
                    bit_offset,
                    bitfield_size,
                }
            })
            .collect();
        Composite {
            size: p.size_or_type,
            bitfield_encoding: p.kind_flag,
            members,
        }
    }
}

fn linkage(id: TypeId, raw: u32) -> Result<Linkage, DecodeError> {
    Linkage::from_u32(raw).ok_or(DecodeError::InvalidLinkage { id, linkage: raw })
}
