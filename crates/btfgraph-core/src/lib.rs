#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for BTF type information.
//!
//! Two layers:
//! - **Strings**: [`StringTable`], a NUL-terminated blob addressed by byte offset
//! - **Types**: [`Graph`], an arena of [`Type`] nodes whose edges are [`TypeId`]s
//!
//! Node identity is positional. Edges are plain integers, so self-referential
//! structs and pointer cycles need no special ownership.

mod graph;
mod ids;
mod invariants;
mod strings;
mod types;


pub use graph::Graph;
pub use ids::{StrOffset, TypeId};
pub use strings::StringTable;
pub use types::{
    Array, Composite, DataSec, DeclTag, Enum, EnumValue, Func, FuncProto, FwdKind, Int,
    IntEncoding, Kind, Linkage, Member, Param, Type, TypeData, TypeTag, Var, VarSecinfo,
};

/// Structural errors found when validating a graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge points past the end of the graph.
    #[error("type {from} references missing type {to}")]
    DanglingEdge { from: TypeId, to: TypeId },

    /// A name offset does not resolve in the string table.
    #[error("type {id} has invalid name offset {offset}")]
    InvalidName { id: TypeId, offset: StrOffset },

    /// Numbering the types from `first_id` runs past `u32::MAX`.
    #[error("{count} types numbered from {first_id} overflow the type ID space")]
    TooManyTypes { first_id: u32, count: usize },
}
