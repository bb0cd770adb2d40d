//! Simulation statistics collection and reporting.
//!
//! This module tracks the metrics the simulator produces. It provides:
//! 1. **Cache Counters:** Hit/miss splits, evictions, cold misses, and
//!    write-backs per cache.
//! 2. **Core Counters:** Instruction mix, execution and idle cycles, and
//!    requester-attributed invalidations and traffic.
//! 3. **Bus Counters:** Transactions, invalidations, and traffic bytes,
//!    each data movement charged exactly once.
//! 4. **Report Writer:** The text report, written to any `io::Write` so the
//!    destination can be stdout or a file.

use std::io::{self, Write};

use crate::config::GeometryConfig;
use crate::core::Core;

/// One-line description of the simulated memory system policy.
pub const POLICY: &str = "MESI / write-back write-allocate / LRU / central snooping bus";

/// Counters owned by a single cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Read accesses served from the cache.
    pub read_hits: u64,
    /// Read accesses that missed.
    pub read_misses: u64,
    /// Write accesses served from the cache.
    pub write_hits: u64,
    /// Write accesses that missed.
    pub write_misses: u64,
    /// Misses that displaced a resident line.
    pub evictions: u64,
    /// Misses that filled an empty (Invalid) slot.
    pub cold_misses: u64,
    /// Modified victims written back to memory.
    pub write_backs: u64,
}

impl CacheStats {
    /// Total hits.
    pub fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }

    /// Total misses.
    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// Total accesses consumed by this cache.
    pub fn accesses(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Miss rate as a percentage; zero when no access has completed.
    pub fn miss_rate_percent(&self) -> f64 {
        let accesses = self.accesses();
        if accesses == 0 {
            return 0.0;
        }
        self.misses() as f64 * 100.0 / accesses as f64
    }
}

/// Counters owned by a single core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreStats {
    /// Read instructions in the core's trace.
    pub read_count: u64,
    /// Write instructions in the core's trace.
    pub write_count: u64,
    /// Cycles spent completing the core's own accesses (stalls included).
    pub exec_cycles: u64,
    /// Cycles spent blocked on a busy bus with work remaining.
    pub idle_cycles: u64,
    /// Peer copies invalidated by this core's bus transactions.
    pub invalidations: u64,
    /// Bus traffic bytes attributed to this core's transactions.
    pub traffic_bytes: u64,
}

impl CoreStats {
    /// Total instructions in the core's trace.
    pub fn total_instructions(&self) -> u64 {
        self.read_count + self.write_count
    }
}

/// Counters owned by the shared bus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Transactions initiated (BusRd, BusRdX, BusUpgr).
    pub transactions: u64,
    /// Peer copies invalidated across all transactions.
    pub invalidations: u64,
    /// Total bytes moved, one block per data-bearing movement.
    pub traffic_bytes: u64,
}

/// Borrowed view of a finished simulation, formatted as the text report.
pub struct Report<'a> {
    /// Cache geometry the simulation ran with.
    pub geometry: &'a GeometryConfig,
    /// All cores, in ascending id order.
    pub cores: &'a [Core],
    /// Global bus counters.
    pub bus: &'a BusStats,
    /// Total simulated cycles.
    pub total_cycles: u64,
}

impl Report<'_> {
    /// Writes the full report: configuration header, one block per core,
    /// and the bus summary.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.write_header(out)?;
        for core in self.cores {
            self.write_core(out, core)?;
        }
        self.write_summary(out)
    }

    fn write_header<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let g = self.geometry;
        writeln!(out, "Simulation configuration")?;
        writeln!(out, "  set index bits (s)  : {}", g.set_bits)?;
        writeln!(out, "  associativity (E)   : {}", g.ways)?;
        writeln!(out, "  block offset bits (b): {}", g.block_bits)?;
        writeln!(out, "  block size          : {} bytes", g.block_size())?;
        writeln!(out, "  sets per cache      : {}", g.num_sets())?;
        writeln!(
            out,
            "  cache size per core : {:.2} KB",
            g.per_core_bytes() as f64 / 1024.0
        )?;
        writeln!(out, "  policy              : {}", POLICY)?;
        writeln!(out)
    }

    fn write_core<W: Write>(&self, out: &mut W, core: &Core) -> io::Result<()> {
        let stats = &core.stats;
        let cache = &core.cache.stats;
        writeln!(out, "---------- Core {} ----------", core.id)?;
        writeln!(out, "  total instructions  : {}", stats.total_instructions())?;
        writeln!(out, "  read instructions   : {}", stats.read_count)?;
        writeln!(out, "  write instructions  : {}", stats.write_count)?;
        writeln!(out, "  execution cycles    : {}", stats.exec_cycles)?;
        writeln!(out, "  idle cycles         : {}", stats.idle_cycles)?;
        writeln!(out, "  cache misses        : {}", cache.misses())?;
        writeln!(out, "  miss rate           : {:.4}%", cache.miss_rate_percent())?;
        writeln!(out, "  evictions           : {}", cache.evictions)?;
        writeln!(out, "  writebacks          : {}", cache.write_backs)?;
        writeln!(out, "  invalidations       : {}", stats.invalidations)?;
        writeln!(out, "  data traffic        : {} bytes", stats.traffic_bytes)?;
        writeln!(out)
    }

    fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "---------- Summary ----------")?;
        writeln!(out, "  bus transactions    : {}", self.bus.transactions)?;
        writeln!(out, "  bus traffic         : {} bytes", self.bus.traffic_bytes)?;
        writeln!(out, "  bus invalidations   : {}", self.bus.invalidations)?;
        writeln!(out, "  total cycles        : {}", self.total_cycles)
    }
}
