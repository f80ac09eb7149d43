//! Type graph: an append-only arena of type nodes.

use crate::{GraphError, StrOffset, StringTable, Type, TypeData, TypeId};

/// Arena of type nodes addressed by [`TypeId`], plus the strings they name.
///
/// ID 0 always holds void. Nodes are appended and never removed or
/// renumbered; filtering and deduplication produce new graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    types: Vec<Type>,
    strings: StringTable,
}

impl Graph {
    /// Graph holding only void, with an empty string table.
    pub fn new() -> Self {
        Self::with_strings(StringTable::new())
    }

    /// Graph holding only void, naming its types through `strings`.
    pub fn with_strings(strings: StringTable) -> Self {
        Self {
            types: vec![Type::void()],
            strings,
        }
    }

    /// Append a node, returning its ID.
    pub fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId::from_index(self.types.len());
        self.types.push(ty);
        id
    }

    /// Intern `name` and append a node carrying it.
    pub fn add(&mut self, name: &str, data: TypeData) -> TypeId {
        let name = self.strings.intern(name);
        self.push(Type::new(name, data))
    }

    /// Intern a string into the graph's string table.
    pub fn intern(&mut self, s: &str) -> StrOffset {
        self.strings.intern(s)
    }

    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.index())
    }

    /// Number of nodes, void included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the graph holds nothing but void.
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeId::from_index(i), t))
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Resolve a string offset through the graph's string table.
    pub fn resolve(&self, offset: StrOffset) -> Option<&str> {
        self.strings.resolve(offset)
    }

    /// Name of the node at `id`; `None` if the node does not exist.
    pub fn name_of(&self, id: TypeId) -> Option<&str> {
        self.get(id).and_then(|t| self.strings.resolve(t.name))
    }

    /// Check that every edge and every name offset resolves.
    pub fn validate(&self) -> Result<(), GraphError> {
        let len = self.types.len();
        for (id, ty) in self.iter() {
            if let Some(to) = ty.edges().into_iter().find(|e| e.index() >= len) {
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

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
