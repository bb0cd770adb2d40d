//! Global timing and system constants.
//!
//! This module defines the fixed penalties and system-wide parameters used
//! across the simulator. It includes:
//! 1. **Timing Constants:** Memory penalty, word transfer cost, and hit cost.
//! 2. **System Constants:** Word size, address width, and core count.

/// Penalty in cycles for a main-memory access (block fetch or write-back).
pub const MEM_PENALTY: u64 = 100;

/// Bus occupancy in cycles per 4-byte word of a cache-to-cache transfer.
pub const TRANSFER_PER_WORD: u64 = 2;

/// Word size in bytes.
pub const WORD_SIZE: usize = 4;

/// Cost in cycles of a cache hit.
pub const HIT_COST: u64 = 1;

/// Number of processor cores in the simulated system.
pub const NUM_CORES: usize = 4;

/// Width of a memory address in bits.
pub const ADDRESS_BITS: u32 = 32;
