//! Encoding of type graphs back to BTF.

use btfgraph_core::{FwdKind, Graph, StringTable, Type, TypeData, TypeId};

use crate::constants::{INFO_KIND_FLAG_SHIFT, INFO_KIND_SHIFT, MAX_VLEN};
use crate::error::EncodeError;
use crate::header::{Endian, Header};

/// What to do with the string table on encode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StringsMode {
    /// Write the table byte for byte; offsets are kept as they are.
    #[default]
    Preserve,
    /// Write only the strings the types reference, in node order.
    Recompact,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub endian: Endian,
    pub strings: StringsMode,
}

/// Encode `graph` into a self-contained BTF buffer.
///
/// Void (ID 0) is implicit and not written. The type section starts right
/// after the header, followed by the string section.
pub fn encode(graph: &Graph, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let types = graph.types().get(1..).unwrap_or_default();
    encode_sections(types, graph.strings(), 1, None, options)
}

/// Shared by [`encode`] and split encoding: writes header, types, strings.
pub(crate) fn encode_sections(
    types: &[Type],
    strings: &StringTable,
    first_id: u32,
    base_type_count: Option<u32>,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    if let Some(last) = types.len().checked_sub(1)
        && TypeId::nth_from(first_id, last).is_none()
    {
        return Err(EncodeError::TooManyTypes {
            first_id,
            count: types.len(),
        });
    }
    // In range after the check above.
    let id_of = |i: usize| TypeId(first_id.wrapping_add(i as u32));

    let recompacted;
    let (types, strings) = match options.strings {
        StringsMode::Preserve => (types, strings),
        StringsMode::Recompact => {
            recompacted = recompact(types, strings, id_of)?;
            (recompacted.0.as_slice(), &recompacted.1)
        }
    };

    let mut w = Writer::new(options.endian);
    for (i, ty) in types.iter().enumerate() {
        w.write_type(id_of(i), ty)?;
    }
    let type_section = w.finish();

    let header = Header::for_sections(
        options.endian,
        type_section.len() as u32,
        strings.len() as u32,
        base_type_count,
    );
    let mut out = header.to_bytes();
    out.extend_from_slice(&type_section);
    out.extend_from_slice(strings.as_bytes());
    Ok(out)
}

/// Rewrite every name into a fresh table holding only referenced strings.
fn recompact(
    types: &[Type],
    strings: &StringTable,
    id_of: impl Fn(usize) -> TypeId,
) -> Result<(Vec<Type>, StringTable), EncodeError> {
    let mut table = StringTable::new();
    let mut out = Vec::with_capacity(types.len());
    for (i, ty) in types.iter().enumerate() {
        let mut ty = ty.clone();
        for name in ty.names_mut() {
            let s = strings.resolve(*name).ok_or(EncodeError::InvalidName {
                id: id_of(i),
                offset: *name,
            })?;
            *name = table.intern(s);
        }
        out.push(ty);
    }
    Ok((out, table))
}

struct Writer {
    buf: Vec<u8>,
    endian: Endian,
}

impl Writer {
    fn new(endian: Endian) -> Self {
        Self {
            buf: Vec::new(),
            endian,
        }
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&self.endian.u32_bytes(v));
    }

    fn prefix(&mut self, ty: &Type, kind_flag: bool, vlen: u32, size_or_type: u32) {
        let info = (u32::from(kind_flag) << INFO_KIND_FLAG_SHIFT)
            | ((ty.kind() as u32) << INFO_KIND_SHIFT)
            | vlen;
        self.u32(ty.name.0);
        self.u32(info);
        self.u32(size_or_type);
    }

    fn write_type(&mut self, id: TypeId, ty: &Type) -> Result<(), EncodeError> {
        let count = ty.vlen();
        if count > MAX_VLEN {
            return Err(EncodeError::TooManyMembers { id, count });
        }
        let vlen = count as u32;

        match &ty.data {
            TypeData::Void => return Err(EncodeError::MisplacedVoid(id)),
            TypeData::Int(int) => {
                self.prefix(ty, false, 0, int.size);
                self.u32(
                    (u32::from(int.encoding.0) << 24)
                        | (u32::from(int.bit_offset) << 16)
                        | u32::from(int.bits),
                );
            }
            TypeData::Pointer(t)
            | TypeData::Typedef(t)
            | TypeData::Volatile(t)
            | TypeData::Const(t)
            | TypeData::Restrict(t) => self.prefix(ty, false, 0, t.0),
            TypeData::TypeTag(t) => self.prefix(ty, t.attribute, 0, t.target.0),
            TypeData::Array(a) => {
                self.prefix(ty, false, 0, 0);
                self.u32(a.element.0);
                self.u32(a.index.0);
                self.u32(a.len);
            }
            TypeData::Struct(c) | TypeData::Union(c) => {
                self.prefix(ty, c.bitfield_encoding, vlen, c.size);
                for m in &c.members {
                    self.u32(m.name.0);
                    self.u32(m.ty.0);
                    self.u32(if c.bitfield_encoding {
                        (u32::from(m.bitfield_size) << 24) | m.bit_offset
                    } else {
                        m.bit_offset
                    });
                }
            }
            TypeData::Enum(e) => {
                self.prefix(ty, e.signed, vlen, e.size);
                for v in &e.values {
                    self.u32(v.name.0);
                    self.u32(v.value as u32);
                }
            }
            TypeData::Enum64(e) => {
                self.prefix(ty, e.signed, vlen, e.size);
                for v in &e.values {
                    self.u32(v.name.0);
                    self.u32(v.value as u32);
                    self.u32((v.value >> 32) as u32);
                }
            }
            TypeData::Fwd(kind) => self.prefix(ty, *kind == FwdKind::Union, 0, 0),
            TypeData::Func(f) => self.prefix(ty, false, f.linkage as u32, f.proto.0),
            TypeData::FuncProto(p) => {
                self.prefix(ty, false, vlen, p.ret.0);
                for param in &p.params {
                    self.u32(param.name.0);
                    self.u32(param.ty.0);
                }
                if p.variadic {
                    self.u32(0);
                    self.u32(0);
                }
            }
            TypeData::Var(v) => {
                self.prefix(ty, false, 0, v.ty.0);
                self.u32(v.linkage as u32);
            }
            TypeData::DataSec(d) => {
                self.prefix(ty, false, vlen, d.size);
                for v in &d.vars {
                    self.u32(v.var.0);
                    self.u32(v.offset);
                    self.u32(v.size);
                }
            }
            TypeData::Float(size) => self.prefix(ty, false, 0, *size),
            TypeData::DeclTag(t) => {
                self.prefix(ty, t.attribute, 0, t.target.0);
                self.u32(t.component as u32);
            }
        }
        Ok(())
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}
