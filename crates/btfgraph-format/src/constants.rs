//! Wire format constants.

/// Magic number, read in the buffer's own byte order.
pub const MAGIC: u16 = 0xeb9f;

/// Supported format version.
pub const VERSION: u8 = 1;

/// Size of the standard header in bytes.
pub const HEADER_LEN: u32 = 24;

/// Size of the header of split BTF, which appends `base_type_count`.
pub const SPLIT_HEADER_LEN: u32 = 28;

/// Header flag marking split BTF.
pub const FLAG_SPLIT: u8 = 1 << 0;

/// Size of the fixed prefix of every encoded type (name, info, size/type).
pub const TYPE_PREFIX_LEN: usize = 12;

/// Largest record count the 16-bit `vlen` field can hold.
pub(crate) const MAX_VLEN: usize = 0xffff;

pub(crate) const INFO_VLEN_MASK: u32 = 0xffff;
pub(crate) const INFO_KIND_SHIFT: u32 = 24;
pub(crate) const INFO_KIND_MASK: u32 = 0x1f;
pub(crate) const INFO_KIND_FLAG_SHIFT: u32 = 31;
/// Info bits outside vlen, kind and kind_flag.
pub(crate) const INFO_RESERVED_MASK: u32 = 0x60ff_0000;

/// Int word bits outside encoding, offset and bit count.
pub(crate) const INT_RESERVED_MASK: u32 = 0xf000_ff00;

/// Bitfield member offsets keep the bit offset in the low 24 bits.
pub(crate) const BITFIELD_OFFSET_MASK: u32 = 0x00ff_ffff;
