//! BTF header (24 bytes, 28 for split BTF).
//!
//! Layout:
//! - 0-3: magic (u16), version (u8), flags (u8)
//! - 4-23: hdr_len, type_off, type_len, str_off, str_len (5 × u32)
//! - 24-27: base_type_count (u32), split BTF only
//!
//! Section offsets are relative to the end of the header (`hdr_len`).

use std::ops::Range;

use crate::constants::{FLAG_SPLIT, HEADER_LEN, MAGIC, SPLIT_HEADER_LEN, VERSION};
use crate::error::{DecodeError, HeaderError};

/// Byte order of a BTF buffer, detected from the magic number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    pub(crate) fn u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }

    pub(crate) fn u16_bytes(self, v: u16) -> [u8; 2] {
        match self {
            Self::Little => v.to_le_bytes(),
            Self::Big => v.to_be_bytes(),
        }
    }

    pub(crate) fn u32_bytes(self, v: u32) -> [u8; 4] {
        match self {
            Self::Little => v.to_le_bytes(),
            Self::Big => v.to_be_bytes(),
        }
    }

    /// Read the u32 at `pos`. The caller guarantees the bounds.
    pub(crate) fn read_u32(self, bytes: &[u8], pos: usize) -> u32 {
        self.u32([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub endian: Endian,
    pub version: u8,
    pub flags: u8,
    pub hdr_len: u32,
    /// Type section offset, relative to `hdr_len`.
    pub type_off: u32,
    pub type_len: u32,
    /// String section offset, relative to `hdr_len`.
    pub str_off: u32,
    pub str_len: u32,
    /// Number of base types (void included) a split buffer builds on.
    pub base_type_count: Option<u32>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            version: VERSION,
            flags: 0,
            hdr_len: HEADER_LEN,
            type_off: 0,
            type_len: 0,
            str_off: 0,
            str_len: 0,
            base_type_count: None,
        }
    }
}

impl Header {
    /// Header of a buffer holding `type_len` bytes of types followed by
    /// `str_len` bytes of strings.
    pub fn for_sections(
        endian: Endian,
        type_len: u32,
        str_len: u32,
        base_type_count: Option<u32>,
    ) -> Self {
        let split = base_type_count.is_some();
        Self {
            endian,
            flags: if split { FLAG_SPLIT } else { 0 },
            hdr_len: if split { SPLIT_HEADER_LEN } else { HEADER_LEN },
            type_len,
            str_off: type_len,
            str_len,
            base_type_count,
            ..Self::default()
        }
    }

    /// Decode and sanity-check the header at the start of `bytes`.
    ///
    /// Only the header itself is checked here; see [`type_section`](Self::type_section)
    /// and [`str_section`](Self::str_section) for the section bounds.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() < HEADER_LEN as usize {
            return Err(HeaderError::TooShort(bytes.len()));
        }

        let endian = match [bytes[0], bytes[1]] {
            b if u16::from_le_bytes(b) == MAGIC => Endian::Little,
            b if u16::from_be_bytes(b) == MAGIC => Endian::Big,
            b => return Err(HeaderError::InvalidMagic(u16::from_le_bytes(b))),
        };

        let version = bytes[2];
        if version != VERSION {
            return Err(HeaderError::UnsupportedVersion(version));
        }
        let flags = bytes[3];

        let hdr_len = endian.read_u32(bytes, 4);
        if hdr_len < HEADER_LEN || hdr_len as usize > bytes.len() {
            return Err(HeaderError::InvalidLength {
                hdr_len,
                available: bytes.len(),
            });
        }

        let base_type_count = if flags & FLAG_SPLIT != 0 {
            if hdr_len < SPLIT_HEADER_LEN {
                return Err(HeaderError::ShortSplitHeader(hdr_len));
            }
            Some(endian.read_u32(bytes, 24))
        } else {
            None
        };

        Ok(Self {
            endian,
            version,
            flags,
            hdr_len,
            type_off: endian.read_u32(bytes, 8),
            type_len: endian.read_u32(bytes, 12),
            str_off: endian.read_u32(bytes, 16),
            str_len: endian.read_u32(bytes, 20),
            base_type_count,
        })
    }

    /// Encode the header. The result is `hdr_len` bytes long.
    pub fn to_bytes(&self) -> Vec<u8> {
        let e = self.endian;
        let mut bytes = Vec::with_capacity(self.hdr_len as usize);
        bytes.extend_from_slice(&e.u16_bytes(MAGIC));
        bytes.push(self.version);
        bytes.push(self.flags);
        for field in [
            self.hdr_len,
            self.type_off,
            self.type_len,
            self.str_off,
            self.str_len,
        ] {
            bytes.extend_from_slice(&e.u32_bytes(field));
        }
        if let Some(count) = self.base_type_count {
            bytes.extend_from_slice(&e.u32_bytes(count));
        }
        bytes.resize(self.hdr_len as usize, 0);
        bytes
    }

    pub fn is_split(&self) -> bool {
        self.base_type_count.is_some()
    }

    /// Absolute byte range of the type section inside a `available`-byte buffer.
    pub fn type_section(&self, available: usize) -> Result<Range<usize>, DecodeError> {
        self.section("type", self.type_off, self.type_len, available)
    }

    /// Absolute byte range of the string section inside a `available`-byte buffer.
    pub fn str_section(&self, available: usize) -> Result<Range<usize>, DecodeError> {
        self.section("string", self.str_off, self.str_len, available)
    }

    fn section(
        &self,
        section: &'static str,
        off: u32,
        len: u32,
        available: usize,
    ) -> Result<Range<usize>, DecodeError> {
        // u64 arithmetic: hdr_len + off + len cannot overflow it.
        let start = u64::from(self.hdr_len) + u64::from(off);
        if start > available as u64 {
            return Err(HeaderError::SectionOutOfBounds {
                section,
                offset: start,
                available,
            }
            .into());
        }
        let start = start as usize;
        let len = len as usize;
        if len > available - start {
            return Err(DecodeError::TruncatedSection {
                section,
                offset: start,
                len,
                available: available - start,
            });
        }
        Ok(start..start + len)
    }
}
