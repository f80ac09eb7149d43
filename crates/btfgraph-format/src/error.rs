//! Codec errors.

use btfgraph_core::{GraphError, Kind, StrOffset, TypeId};

/// Why a header was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("buffer too small: {0} bytes (minimum 24)")]
    TooShort(usize),
    #[error("invalid magic: {0:#06x}")]
    InvalidMagic(u16),
    #[error("unsupported version: {0} (expected {VERSION})", VERSION = crate::VERSION)]
    UnsupportedVersion(u8),
    #[error("header length {hdr_len} outside 24..={available}")]
    InvalidLength { hdr_len: u32, available: usize },
    #[error("split header needs 28 bytes, got {0}")]
    ShortSplitHeader(u32),
    #[error("{section} section starts at {offset}, past the {available}-byte buffer")]
    SectionOutOfBounds {
        section: &'static str,
        offset: u64,
        available: usize,
    },
}

/// Decode failure. Every variant is fatal for the buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed header: {0}")]
    MalformedHeader(#[from] HeaderError),

    #[error(
        "{section} section truncated: {len} bytes declared at offset {offset}, {available} available"
    )]
    TruncatedSection {
        section: &'static str,
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("unexpected end of type section in type {id} at offset {offset}")]
    UnexpectedEof { id: TypeId, offset: usize },

    #[error("unknown kind {kind} for type {id}")]
    UnknownKind { id: TypeId, kind: u8 },

    #[error("type {id} ({}) sets bits its kind leaves reserved", .kind.as_str())]
    ReservedBits { id: TypeId, kind: Kind },

    #[error("invalid linkage {linkage} for type {id}")]
    InvalidLinkage { id: TypeId, linkage: u32 },

    #[error("buffer is not split BTF")]
    SplitBtfUnsupported,

    #[error("split BTF cannot be decoded without a base")]
    UnexpectedSplit,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Encode failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("{count} types numbered from {first_id} overflow the type ID space")]
    TooManyTypes { first_id: u32, count: usize },

    #[error("type {id} has {count} records (maximum 65535)")]
    TooManyMembers { id: TypeId, count: usize },

    #[error("void can only be type 0, found at {0}")]
    MisplacedVoid(TypeId),

    #[error("type {id} has invalid name offset {offset}")]
    InvalidName { id: TypeId, offset: StrOffset },
}
