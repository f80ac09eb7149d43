//! Immutable, indexed view of a type graph.

use indexmap::IndexMap;

use btfgraph_core::{Graph, Kind, StringTable, Type, TypeData, TypeId, TypeTag};
use btfgraph_format::{EncodeOptions, decode, encode};

use crate::filter::filter;
use crate::{Error, Result, SpecOptions};

/// Longest qualifier chain [`Spec::underlying`] follows.
pub const MAX_RESOLVE_DEPTH: usize = 32;

/// A type graph plus a name index.
///
/// Built once, never mutated. Types are addressed by their position in the
/// graph; names map to every type carrying them, in graph order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spec {
    graph: Graph,
    named: IndexMap<String, Vec<TypeId>>,
}

impl Spec {
    /// Index `graph`. Anonymous types are not indexed by name.
    pub fn new(graph: Graph) -> Self {
        let mut named: IndexMap<String, Vec<TypeId>> = IndexMap::new();
        for (id, ty) in graph.iter() {
            match graph.resolve(ty.name) {
                Some(name) if !name.is_empty() => {
                    named.entry(name.to_owned()).or_default().push(id);
                }
                _ => {}
            }
        }
        Self { graph, named }
    }

    /// Index `graph`, keeping only the closure of `options.type_names` if any.
    pub fn with_options(graph: Graph, options: &SpecOptions) -> Result<Self> {
        if !options.is_filtering() {
            return Ok(Self::new(graph));
        }
        let subset = filter(&graph, &options.type_names, options.missing_type_names)?;
        Ok(Self::new(subset.graph))
    }

    /// Decode a self-contained BTF buffer and index it.
    pub fn from_bytes(bytes: &[u8], options: &SpecOptions) -> Result<Self> {
        let decoded = decode(bytes)?;
        Self::with_options(decoded.graph, options)
    }

    /// A new spec holding only the closure of `options.type_names`.
    pub fn filtered(&self, options: &SpecOptions) -> Result<Self> {
        if !options.is_filtering() {
            return Ok(self.clone());
        }
        let subset = filter(&self.graph, &options.type_names, options.missing_type_names)?;
        Ok(Self::new(subset.graph))
    }

    pub fn type_by_id(&self, id: TypeId) -> Option<&Type> {
        self.graph.get(id)
    }

    /// Every type named `name`, in ID order. Empty if there is none.
    pub fn ids_by_name(&self, name: &str) -> &[TypeId] {
        self.named.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// The single type named `name` with kind `kind`.
    pub fn type_by_name_kind(&self, name: &str, kind: Kind) -> Result<TypeId> {
        let mut matches = self
            .ids_by_name(name)
            .iter()
            .copied()
            .filter(|&id| self.graph.get(id).is_some_and(|t| t.kind() == kind));

        match (matches.next(), matches.count()) {
            (None, _) => Err(Error::UnknownTypeName(name.to_owned())),
            (Some(id), 0) => Ok(id),
            (Some(_), rest) => Err(Error::AmbiguousTypeName {
                name: name.to_owned(),
                count: rest + 1,
            }),
        }
    }

    /// Number of types, void included.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether the spec holds nothing but void.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn name_of(&self, id: TypeId) -> Option<&str> {
        self.graph.name_of(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.graph.iter()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The name index, in first-occurrence order.
    pub fn named_types(&self) -> &IndexMap<String, Vec<TypeId>> {
        &self.named
    }

    pub fn strings(&self) -> &StringTable {
        self.graph.strings()
    }

    /// Skip typedefs and qualifiers starting at `id`.
    pub fn underlying(&self, id: TypeId) -> Result<TypeId> {
        let mut current = id;
        for _ in 0..=MAX_RESOLVE_DEPTH {
            let ty = self.graph.get(current).ok_or(Error::UnknownTypeId(current))?;
            match ty.data {
                TypeData::Typedef(t)
                | TypeData::Volatile(t)
                | TypeData::Const(t)
                | TypeData::Restrict(t)
                | TypeData::TypeTag(TypeTag { target: t, .. }) => current = t,
                _ => return Ok(current),
            }
        }
        Err(Error::MaximumTypeDepth { id })
    }

    /// Size of `id` in bytes, or `None` for types without a size.
    ///
    /// Pointers are 8 bytes.
    pub fn size_of(&self, id: TypeId) -> Option<u64> {
        self.size_at_depth(id, 0)
    }

    fn size_at_depth(&self, id: TypeId, depth: usize) -> Option<u64> {
        if depth > MAX_RESOLVE_DEPTH {
            return None;
        }
        let id = self.underlying(id).ok()?;
        let size = match &self.graph.get(id)?.data {
            TypeData::Int(int) => int.size,
            TypeData::Float(size) => *size,
            TypeData::Struct(c) | TypeData::Union(c) => c.size,
            TypeData::Enum(e) | TypeData::Enum64(e) => e.size,
            TypeData::DataSec(d) => d.size,
            TypeData::Pointer(_) => 8,
            TypeData::Array(a) => {
                let element = self.size_at_depth(a.element, depth + 1)?;
                return element.checked_mul(u64::from(a.len));
            }
            _ => return None,
        };
        Some(u64::from(size))
    }

    /// Encode the spec's graph.
    pub fn to_bytes(&self, options: &EncodeOptions) -> Result<Vec<u8>> {
        Ok(encode(&self.graph, options)?)
    }
}
