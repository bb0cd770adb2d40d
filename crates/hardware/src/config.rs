//! Configuration system for the cache coherence simulator.
//!
//! This module defines the configuration structures used to parameterize a
//! simulation. It provides:
//! 1. **Defaults:** Baseline cache geometry matching a 4 KB, 2-way,
//!    32-byte-block cache per core.
//! 2. **Structures:** Cache geometry and top-level simulation settings.
//! 3. **Validation:** Geometry sanity checks performed before any trace is
//!    loaded.
//!
//! Configuration is normally built by the CLI from its flags; the structures
//! also deserialize from JSON for programmatic use.

use std::path::PathBuf;

use serde::Deserialize;

use crate::common::constants::{ADDRESS_BITS, NUM_CORES, WORD_SIZE};
use crate::common::{Error, Result};

/// Default configuration constants.
///
/// These values match the original quad-core setup: 64 sets, 2-way
/// associativity, 32-byte blocks (4 KB per core).
mod defaults {
    /// Default number of set-index bits (2^6 = 64 sets).
    pub const SET_BITS: u32 = 6;

    /// Default associativity (lines per set).
    pub const WAYS: usize = 2;

    /// Default number of block-offset bits (2^5 = 32-byte blocks).
    pub const BLOCK_BITS: u32 = 5;
}

/// Cache geometry: the (s, E, b) triple.
///
/// # Examples
///
/// Deserializing from JSON:
///
/// ```
/// use mesisim_core::config::GeometryConfig;
///
/// let json = r#"{ "set_bits": 2, "ways": 2, "block_bits": 5 }"#;
/// let geometry: GeometryConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(geometry.num_sets(), 4);
/// assert_eq!(geometry.block_size(), 32);
/// assert_eq!(geometry.per_core_bytes(), 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GeometryConfig {
    /// Number of set-index bits; the cache has 2^s sets.
    #[serde(default = "GeometryConfig::default_set_bits")]
    pub set_bits: u32,

    /// Associativity: lines per set.
    #[serde(default = "GeometryConfig::default_ways")]
    pub ways: usize,

    /// Number of block-offset bits; blocks are 2^b bytes.
    #[serde(default = "GeometryConfig::default_block_bits")]
    pub block_bits: u32,
}

impl GeometryConfig {
    /// Returns the default number of set-index bits.
    fn default_set_bits() -> u32 {
        defaults::SET_BITS
    }

    /// Returns the default associativity.
    fn default_ways() -> usize {
        defaults::WAYS
    }

    /// Returns the default number of block-offset bits.
    fn default_block_bits() -> u32 {
        defaults::BLOCK_BITS
    }

    /// Number of sets per cache (2^s).
    pub fn num_sets(&self) -> usize {
        1usize << self.set_bits
    }

    /// Block size in bytes (2^b).
    pub fn block_size(&self) -> usize {
        1usize << self.block_bits
    }

    /// Total cache capacity per core in bytes.
    pub fn per_core_bytes(&self) -> usize {
        self.num_sets() * self.ways * self.block_size()
    }

    /// Checks the geometry for internal consistency.
    ///
    /// # Returns
    ///
    /// `Ok(())` when the geometry is usable; `Error::Config` when the
    /// associativity is zero, a block is smaller than a word, or the set and
    /// block fields leave no tag bits in a 32-bit address.
    pub fn validate(&self) -> Result<()> {
        if self.ways == 0 {
            return Err(Error::Config("associativity (E) must be at least 1".into()));
        }
        if (1usize << self.block_bits) < WORD_SIZE {
            return Err(Error::Config(format!(
                "block size 2^{} is smaller than the {}-byte word size",
                self.block_bits, WORD_SIZE
            )));
        }
        if self.set_bits + self.block_bits >= ADDRESS_BITS {
            return Err(Error::Config(format!(
                "set bits ({}) + block bits ({}) must leave tag bits in a {}-bit address",
                self.set_bits, self.block_bits, ADDRESS_BITS
            )));
        }
        Ok(())
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            set_bits: defaults::SET_BITS,
            ways: defaults::WAYS,
            block_bits: defaults::BLOCK_BITS,
        }
    }
}

/// Top-level simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Cache geometry shared by all cores.
    #[serde(default)]
    pub geometry: GeometryConfig,

    /// Number of cores (and trace files) in the system.
    #[serde(default = "SimConfig::default_cores")]
    pub cores: usize,

    /// Trace file prefix; core `i` loads `<trace_base>_proc<i>.trace`.
    pub trace_base: String,

    /// Report destination; stdout when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl SimConfig {
    /// Returns the default core count.
    fn default_cores() -> usize {
        NUM_CORES
    }

    /// Checks the whole configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        if self.cores == 0 {
            return Err(Error::Config("core count must be at least 1".into()));
        }
        if self.trace_base.is_empty() {
            return Err(Error::Config("trace file prefix must not be empty".into()));
        }
        Ok(())
    }
}
