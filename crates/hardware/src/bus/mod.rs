//! Shared snooping bus arbiter.
//!
//! This module implements the single bus that serializes all coherence
//! transactions. It provides:
//! 1. **Occupancy:** Busy/free state with an owning core and a release
//!    cycle; at most one transaction is in flight at any simulated time.
//! 2. **Transfer Timing:** Cycle cost of moving a block cache-to-cache.
//! 3. **Counters:** Transactions, invalidations, and traffic bytes.
//!
//! The bus holds no references to caches: snoop distribution is performed by
//! the scheduler over its core table, and the bus carries only metadata and
//! counters.

use crate::common::constants::{TRANSFER_PER_WORD, WORD_SIZE};
use crate::stats::BusStats;

/// What the peer caches held when a `BusRd` was snooped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnoopData {
    /// No peer held the block; the fill comes from memory.
    NoData,
    /// At least one peer held the block Shared.
    Shared,
    /// A peer held the block Exclusive.
    Exclusive,
    /// A peer held the block Modified and wrote it back first.
    Modified,
}

impl SnoopData {
    /// Whether any peer held the block, making the fill cache-to-cache.
    pub fn supplied(&self) -> bool {
        *self != SnoopData::NoData
    }
}

/// The shared bus: occupancy state and global counters.
pub struct Bus {
    busy: bool,
    free_cycle: u64,
    owner: Option<usize>,
    /// Transaction, invalidation, and traffic counters.
    pub stats: BusStats,
}

impl Bus {
    /// Creates an idle bus.
    pub fn new() -> Self {
        Self {
            busy: false,
            free_cycle: 0,
            owner: None,
            stats: BusStats::default(),
        }
    }

    /// Whether a transaction is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Cycle at which the current transaction completes.
    pub fn free_cycle(&self) -> u64 {
        self.free_cycle
    }

    /// Core owning the in-flight transaction, if any.
    pub fn owner(&self) -> Option<usize> {
        self.owner
    }

    /// Occupies the bus for `cost` cycles starting at `cycle`.
    ///
    /// # Panics
    ///
    /// Panics when the bus is already busy; the scheduler must check
    /// occupancy before starting a transaction.
    pub fn acquire(&mut self, owner: usize, cycle: u64, cost: u64) {
        assert!(
            !self.busy,
            "bus acquired by core {} at cycle {} while owned by core {:?} until cycle {}",
            owner, cycle, self.owner, self.free_cycle
        );
        self.busy = true;
        self.owner = Some(owner);
        self.free_cycle = cycle + cost;
    }

    /// Releases the bus when its transaction has completed by `cycle`.
    pub fn release_if_due(&mut self, cycle: u64) {
        if self.busy && self.free_cycle <= cycle {
            assert!(
                self.owner.is_some(),
                "bus busy with no owner at cycle {}",
                cycle
            );
            self.busy = false;
            self.owner = None;
        }
    }

    /// Bus occupancy in cycles for one block moved cache-to-cache.
    pub fn transfer_cycles(block_size: usize) -> u64 {
        TRANSFER_PER_WORD * (block_size / WORD_SIZE) as u64
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
