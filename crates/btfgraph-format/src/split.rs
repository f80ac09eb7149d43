//! Split BTF: module types layered on top of a base.
//!
//! A split buffer carries [`FLAG_SPLIT`](crate::FLAG_SPLIT) and a 28-byte
//! header whose extra field is the base type count (void included). Its
//! types are numbered from that count onward. Edges below it point into the
//! base; the rest point at the buffer's own types. Name offsets are local to
//! the buffer's own string section.

use btfgraph_core::{GraphError, StrOffset, StringTable, Type, TypeData, TypeId};

use crate::decode::read_sections;
use crate::encode::{EncodeOptions, encode_sections};
use crate::error::{DecodeError, EncodeError};
use crate::header::Header;

/// Types of a split buffer, still unresolved against their base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitGraph {
    /// Number of base types, void included. Also the ID of the first local type.
    pub base_type_count: u32,
    pub types: Vec<Type>,
    pub strings: StringTable,
}

impl SplitGraph {
    pub fn new(base_type_count: u32) -> Self {
        Self {
            base_type_count,
            types: Vec::new(),
            strings: StringTable::new(),
        }
    }

    /// Append a local type, returning its (global) ID.
    ///
    /// # Panics
    /// Panics if the ID would not fit in 32 bits.
    pub fn push(&mut self, ty: Type) -> TypeId {
        let Some(id) = self.id_of(self.types.len()) else {
            panic!(
                "SplitGraph: no type ID left after {} base and {} local types",
                self.base_type_count,
                self.types.len()
            );
        };
        self.types.push(ty);
        id
    }

    /// Intern `name` locally and append a type carrying it.
    pub fn add(&mut self, name: &str, data: TypeData) -> TypeId {
        let name = self.strings.intern(name);
        self.push(Type::new(name, data))
    }

    pub fn intern(&mut self, s: &str) -> StrOffset {
        self.strings.intern(s)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Global ID of `types[index]`, or `None` if it would not fit in 32 bits.
    pub fn id_of(&self, index: usize) -> Option<TypeId> {
        TypeId::nth_from(self.base_type_count, index)
    }

    /// Index into [`types`](Self::types) for a local ID; `None` for base IDs.
    pub fn local_index(&self, id: TypeId) -> Option<usize> {
        id.0.checked_sub(self.base_type_count).map(|i| i as usize)
    }

    /// Check that local edges stay inside the buffer and local names resolve.
    ///
    /// Base edges can only be checked once the base is known.
    pub fn validate(&self) -> Result<(), GraphError> {
        let end = self.base_type_count as usize + self.types.len();
        for (i, ty) in self.types.iter().enumerate() {
            let id = self.id_of(i).ok_or(GraphError::TooManyTypes {
                first_id: self.base_type_count,
                count: self.types.len(),
            })?;
            if let Some(to) = ty.edges().into_iter().find(|e| e.index() >= end) {
                return Err(GraphError::DanglingEdge { from: id, to });
            }
            if let Some(offset) = ty
                .names()
                .into_iter()
                .find(|&n| self.strings.resolve(n).is_none())
            {
                return Err(GraphError::InvalidName { id, offset });
            }
        }
        Ok(())
    }
}

/// Decode a split buffer.
///
/// Fails with [`DecodeError::SplitBtfUnsupported`] if the buffer does not
/// carry the split marker.
pub fn decode_split(bytes: &[u8]) -> Result<SplitGraph, DecodeError> {
    let header = Header::from_bytes(bytes)?;
    let Some(base_type_count) = header.base_type_count else {
        return Err(DecodeError::SplitBtfUnsupported);
    };
    let (types, strings) = read_sections(bytes, &header, base_type_count)?;

    let split = SplitGraph {
        base_type_count,
        types,
        strings,
    };
    split.validate()?;
    Ok(split)
}

/// Encode a split graph. Its edges and names are written as they are.
pub fn encode_split(split: &SplitGraph, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    encode_sections(
        &split.types,
        &split.strings,
        split.base_type_count,
        Some(split.base_type_count),
        options,
    )
}
