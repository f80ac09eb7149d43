//! String table: a blob of NUL-terminated strings addressed by byte offset.
//!
//! Offsets handed out by [`StringTable::intern`] stay valid for the lifetime
//! of the table; strings are never removed or moved.

use std::collections::HashMap;

use crate::StrOffset;

/// NUL-terminated string blob with content-based deduplication.
#[derive(Debug, Clone)]
pub struct StringTable {
    /// Raw blob, exactly as it goes on the wire.
    data: Vec<u8>,
    /// Offset of the first string start holding each content.
    index: HashMap<String, StrOffset>,
}

impl StringTable {
    /// Create a table holding only the empty string at offset 0.
    pub fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(String::new(), StrOffset::EMPTY);
        Self {
            data: vec![0],
            index,
        }
    }

    /// Wrap an existing blob. Every string start is indexed for interning.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mut table = Self {
            data,
            index: HashMap::new(),
        };
        table.index_from(0);
        table
    }

    fn index_from(&mut self, start: usize) {
        let mut pos = start;
        while pos < self.data.len() {
            let end = self.data[pos..]
                .iter()
                .position(|&b| b == 0)
                .map_or(self.data.len(), |n| pos + n);
            // Unterminated tails cannot be resolved, so they cannot be shared either.
            if end < self.data.len()
                && let Ok(s) = std::str::from_utf8(&self.data[pos..end])
            {
                self.index
                    .entry(s.to_owned())
                    .or_insert(StrOffset(pos as u32));
            }
            pos = end + 1;
        }
    }

    /// Resolve the string starting at `offset`.
    ///
    /// Returns `None` for offsets past the blob, unterminated strings, and
    /// invalid UTF-8.
    pub fn resolve(&self, offset: StrOffset) -> Option<&str> {
        let start = offset.0 as usize;
        if start == 0 && self.data.is_empty() {
            return Some("");
        }
        let tail = self.data.get(start..)?;
        let len = tail.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&tail[..len]).ok()
    }

    /// Get the offset of `s`, appending it if no identical string exists.
    pub fn intern(&mut self, s: &str) -> StrOffset {
        debug_assert!(!s.contains('\0'), "interned strings cannot contain NUL");

        if let Some(&offset) = self.index.get(s) {
            return offset;
        }
        if self.data.is_empty() {
            self.data.push(0);
            self.index.insert(String::new(), StrOffset::EMPTY);
            if s.is_empty() {
                return StrOffset::EMPTY;
            }
        }

        let offset = StrOffset(self.data.len() as u32);
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        self.index.insert(s.to_owned(), offset);
        offset
    }

    /// Look up the offset of `s` without appending.
    pub fn find(&self, s: &str) -> Option<StrOffset> {
        self.index.get(s).copied()
    }

    /// Append every string of `other`.
    ///
    /// Returns the shift that offsets into `other` must take to address the
    /// same strings in `self`.
    pub fn append(&mut self, other: &StringTable) -> u32 {
        let shift = self.data.len();
        self.data.extend_from_slice(&other.data);
        self.index_from(shift);
        shift as u32
    }

    /// The raw blob.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Blob size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Tables are equal when their blobs are; the index is derived data.
impl PartialEq for StringTable {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for StringTable {}

impl Default for StringTable {
    fn default() -> Self {
        Self::new()
    }
}
