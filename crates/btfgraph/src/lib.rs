//! btfgraph: indexed, filterable and deduplicating BTF type specs.
//!
//! # Example
//!
//! ```
//! use btfgraph::{Graph, Int, Spec, TypeData};
//!
//! let mut graph = Graph::new();
//! let int = graph.add("int", TypeData::Int(Int::new(4, true)));
//! graph.add("", TypeData::Pointer(int));
//!
//! let spec = Spec::new(graph);
//! assert_eq!(spec.ids_by_name("int"), &[int]);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod compose;
mod dedup;
mod filter;
mod kernel;
mod options;
mod rewrite;
mod spec;

#[cfg(test)]
mod test_utils;

pub use btfgraph_core::{
    Array, Composite, DataSec, DeclTag, Enum, EnumValue, Func, FuncProto, FwdKind, Graph,
    GraphError, Int, IntEncoding, Kind, Linkage, Member, Param, StrOffset, StringTable, Type,
    TypeData, TypeId, TypeTag, Var, VarSecinfo,
};
pub use btfgraph_format::{
    DecodeError, EncodeError, EncodeOptions, Endian, SplitGraph, StringsMode, decode, decode_split,
    dump, encode, encode_split,
};

pub use compose::compose_module;
pub use dedup::{DedupStats, Deduplicated, dedup};
pub use filter::{Subset, filter};
pub use kernel::{
    KernelSource, KernelSpecs, SYSFS_BTF_DIR, SysfsSource, flush_kernel_spec,
    load_kernel_module_spec, load_kernel_spec, load_kernel_spec_with_options,
};
pub use options::{MissingTypeNames, SpecOptions};
pub use spec::{MAX_RESOLVE_DEPTH, Spec};

/// Errors returned by spec construction, lookup and loading.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// No type carries the requested name (and kind, where one was given).
    #[error("unknown type name `{0}`")]
    UnknownTypeName(String),

    #[error("type name `{name}` is ambiguous: {count} candidates")]
    AmbiguousTypeName { name: String, count: usize },

    #[error("no type with ID {0}")]
    UnknownTypeId(TypeId),

    /// A qualifier chain is longer than [`MAX_RESOLVE_DEPTH`], or cyclic.
    #[error("type {id} exceeds the maximum resolve depth")]
    MaximumTypeDepth { id: TypeId },

    #[error("invalid module name `{0}`")]
    InvalidModuleName(String),

    #[error("failed to read {what}")]
    Io {
        what: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for spec operations.
pub type Result<T> = std::result::Result<T, Error>;
