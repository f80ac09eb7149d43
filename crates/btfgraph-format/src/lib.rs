#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! BTF binary codec.
//!
//! This crate contains:
//! - Format definitions (header layout, kind info bits, split marker)
//! - [`decode`] / [`encode`] for self-contained BTF blobs
//! - [`decode_split`] / [`encode_split`] for module BTF layered on a base
//! - [`dump`], a human-readable listing for debugging and snapshot tests

mod constants;
mod decode;
mod dump;
mod encode;
mod error;
mod header;
mod split;

#[cfg(test)]
mod decode_tests;
#[cfg(test)]
mod encode_tests;
#[cfg(test)]
mod test_utils;

pub use constants::{FLAG_SPLIT, HEADER_LEN, MAGIC, SPLIT_HEADER_LEN, TYPE_PREFIX_LEN, VERSION};
pub use decode::{Decoded, decode};
pub use dump::{dump, dump_split};
pub use encode::{EncodeOptions, StringsMode, encode};
pub use error::{DecodeError, EncodeError, HeaderError};
pub use header::{Endian, Header};
pub use split::{SplitGraph, decode_split, encode_split};
