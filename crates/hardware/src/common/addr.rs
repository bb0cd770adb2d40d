//! Memory address decomposition.
//!
//! This module splits a 32-bit address into the fields the cache geometry
//! defines. It provides:
//! 1. **Field Extraction:** Set index, tag, and block offset for a given
//!    (set bits, block bits) geometry.
//! 2. **Shared Decoding:** The cache lookup path and the snoop path both use
//!    this decomposition, so they always agree on where a block lives.

/// The fields of a decomposed memory address.
///
/// For a geometry with `s` set-index bits and `b` block-offset bits:
/// `offset = addr mod 2^b`, `set_index = (addr >> b) mod 2^s`,
/// `tag = addr >> (s + b)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressParts {
    /// Index of the cache set the address maps to.
    pub set_index: usize,
    /// Tag compared against resident lines in the set.
    pub tag: u32,
    /// Byte offset within the block.
    pub offset: u32,
}

impl AddressParts {
    /// Decomposes a 32-bit address under the given geometry.
    ///
    /// # Arguments
    ///
    /// * `addr` - The 32-bit memory address.
    /// * `set_bits` - Number of set-index bits (`s`).
    /// * `block_bits` - Number of block-offset bits (`b`).
    ///
    /// # Returns
    ///
    /// The set index, tag, and block offset of `addr`.
    pub fn decompose(addr: u32, set_bits: u32, block_bits: u32) -> Self {
        let set_mask = (1u32 << set_bits) - 1;
        let offset_mask = (1u32 << block_bits) - 1;
        Self {
            set_index: ((addr >> block_bits) & set_mask) as usize,
            tag: addr >> (set_bits + block_bits),
            offset: addr & offset_mask,
        }
    }
}
