//! Set-associative write-back L1 data cache.
//!
//! This module implements one core's cache. It provides:
//! 1. **Lookup:** Address decomposition and tag search within a set.
//! 2. **Replacement:** LRU victim selection with empty slots preferred and
//!    ties broken by way position.
//! 3. **Installation:** Line fills with eviction and write-back accounting.
//! 4. **Snooping:** Application of peer bus transactions to resident lines.
//!
//! The cache models metadata only; no data bytes are stored. Timing and bus
//! interaction are decided by the scheduler, which consults the line states
//! this module maintains.

use crate::common::AddressParts;
use crate::config::GeometryConfig;
use crate::core::mesi::{snoop_transition, BusTx, MesiState, SnoopOutcome};
use crate::stats::CacheStats;

/// Metadata for a single cache line.
#[derive(Clone, Copy, Debug)]
pub struct CacheLine {
    /// Whether the slot has ever been filled.
    pub valid: bool,
    /// Tag of the resident block.
    pub tag: u32,
    /// MESI coherence state.
    pub state: MesiState,
    /// Cycle of the last access, for LRU ordering.
    pub last_used_cycle: u64,
}

impl CacheLine {
    /// Whether the slot can be filled without displacing a resident block.
    ///
    /// An Invalid line is equivalent to an empty slot regardless of its
    /// other fields.
    pub fn is_vacant(&self) -> bool {
        !self.valid || self.state == MesiState::Invalid
    }
}

impl Default for CacheLine {
    fn default() -> Self {
        Self {
            valid: false,
            tag: 0,
            state: MesiState::Invalid,
            last_used_cycle: 0,
        }
    }
}

/// One core's L1 data cache.
pub struct Cache {
    set_bits: u32,
    block_bits: u32,
    ways: usize,
    num_sets: usize,
    /// Lines stored flat: set `s` occupies `[s * ways, (s + 1) * ways)`.
    lines: Vec<CacheLine>,
    /// Hit/miss, eviction, and write-back counters.
    pub stats: CacheStats,
}

impl Cache {
    /// Creates an empty cache with the given geometry.
    pub fn new(geometry: &GeometryConfig) -> Self {
        let num_sets = geometry.num_sets();
        Self {
            set_bits: geometry.set_bits,
            block_bits: geometry.block_bits,
            ways: geometry.ways,
            num_sets,
            lines: vec![CacheLine::default(); num_sets * geometry.ways],
            stats: CacheStats::default(),
        }
    }

    /// Decomposes an address into set index, tag, and offset.
    pub fn decode(&self, addr: u32) -> AddressParts {
        AddressParts::decompose(addr, self.set_bits, self.block_bits)
    }

    /// Block size in bytes.
    pub fn block_size(&self) -> usize {
        1usize << self.block_bits
    }

    /// Number of sets.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Associativity.
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Searches a set for a resident copy of the block.
    ///
    /// # Arguments
    ///
    /// * `set_index` - The set to search.
    /// * `tag` - Tag of the block.
    ///
    /// # Returns
    ///
    /// The way holding a valid, non-Invalid line with a matching tag, or
    /// `None` on a miss.
    pub fn lookup(&self, set_index: usize, tag: u32) -> Option<usize> {
        let base = set_index * self.ways;
        (0..self.ways).find(|&way| {
            let line = &self.lines[base + way];
            !line.is_vacant() && line.tag == tag
        })
    }

    /// Chooses the way a fill should use.
    ///
    /// Prefers the first vacant slot; otherwise returns the resident line
    /// with the smallest `last_used_cycle`. Scanning in way order makes the
    /// tie-break stable.
    pub fn victim_way(&self, set_index: usize) -> usize {
        let base = set_index * self.ways;
        let mut victim = 0;
        let mut oldest = u64::MAX;
        for way in 0..self.ways {
            let line = &self.lines[base + way];
            if line.is_vacant() {
                return way;
            }
            if line.last_used_cycle < oldest {
                oldest = line.last_used_cycle;
                victim = way;
            }
        }
        victim
    }

    /// Borrows a line.
    pub fn line(&self, set_index: usize, way: usize) -> &CacheLine {
        &self.lines[set_index * self.ways + way]
    }

    /// Mutably borrows a line.
    pub fn line_mut(&mut self, set_index: usize, way: usize) -> &mut CacheLine {
        &mut self.lines[set_index * self.ways + way]
    }

    /// Installs a block into a way, displacing whatever was there.
    ///
    /// Records the eviction (and write-back for a Modified victim) or cold
    /// miss, stamps the line's LRU timestamp with `cycle` — the completion
    /// cycle of the fill — and marks it most recently used.
    pub fn install(&mut self, set_index: usize, way: usize, tag: u32, state: MesiState, cycle: u64) {
        let line = &mut self.lines[set_index * self.ways + way];
        if line.is_vacant() {
            self.stats.cold_misses += 1;
        } else {
            self.stats.evictions += 1;
            if line.state == MesiState::Modified {
                self.stats.write_backs += 1;
            }
        }
        *line = CacheLine {
            valid: true,
            tag,
            state,
            last_used_cycle: cycle,
        };
    }

    /// Marks a line most recently used without changing tag or state.
    pub fn touch(&mut self, set_index: usize, way: usize, cycle: u64) {
        self.lines[set_index * self.ways + way].last_used_cycle = cycle;
    }

    /// Applies a snooped bus transaction to this cache.
    ///
    /// # Arguments
    ///
    /// * `set_index` - Set the transaction's block maps to.
    /// * `tag` - Tag of the block.
    /// * `tx` - The transaction on the bus.
    ///
    /// # Returns
    ///
    /// The state the line held before the transaction and the transition
    /// outcome, when a copy was resident; `None` otherwise.
    pub fn snoop(
        &mut self,
        set_index: usize,
        tag: u32,
        tx: BusTx,
    ) -> Option<(MesiState, SnoopOutcome)> {
        let way = self.lookup(set_index, tag)?;
        let line = &mut self.lines[set_index * self.ways + way];
        let prev = line.state;
        let outcome = snoop_transition(prev, tx);
        line.state = outcome.next;
        Some((prev, outcome))
    }
}
