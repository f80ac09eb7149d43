//! Index newtypes.

use std::fmt;

/// Position of a node in a type graph. ID 0 is always void.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const VOID: Self = Self(0);

    #[inline]
    pub fn is_void(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self(idx as u32)
    }

    /// ID of the `index`-th type of a sequence numbered from `first`, or
    /// `None` past `u32::MAX`.
    pub fn nth_from(first: u32, index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|i| first.checked_add(i))
            .map(Self)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Byte offset into a string table. Offset 0 is the empty string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct StrOffset(pub u32);

impl StrOffset {
    pub const EMPTY: Self = Self(0);

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for StrOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
