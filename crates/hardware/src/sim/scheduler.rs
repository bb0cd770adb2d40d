//! Cycle-driven scheduler over the core table and the shared bus.
//!
//! This module drives the coupled simulation. Each outer iteration:
//! 1. **Bus Release:** Frees the bus when its transaction completes, before
//!    any core is examined.
//! 2. **Core Visits:** Ready cores attempt one access each, in ascending id
//!    order; bus contention skips the access without consuming it.
//! 3. **Clock Advance:** One cycle when progress was made, otherwise a jump
//!    to the earliest future event (no busy-waiting). The clock never
//!    advances more than once per iteration.
//!
//! The scheduler owns every core (and through it every cache) in an indexed
//! table, so snoop distribution visits peers directly and no component holds
//! a reference to another. Given identical traces and geometry the visit
//! order is fixed, making the output bit-identical run-to-run.

use std::io::{self, Write};

use log::debug;

use crate::bus::{Bus, SnoopData};
use crate::common::constants::{HIT_COST, MEM_PENALTY};
use crate::config::{GeometryConfig, SimConfig};
use crate::core::cache::Cache;
use crate::core::mesi::{read_fill_state, BusTx, MesiState};
use crate::core::Core;
use crate::sim::trace::Access;
use crate::stats::Report;

/// Aggregated effect of distributing one transaction to all peer caches.
struct SnoopSummary {
    /// What the peers held, for deciding the fill source and state.
    data: SnoopData,
    /// Number of peer copies invalidated.
    invalidated: u64,
    /// A peer held the block Modified and wrote it back.
    wrote_back: bool,
}

/// The simulator: core table, shared bus, and the global clock.
pub struct Simulator {
    geometry: GeometryConfig,
    cores: Vec<Core>,
    bus: Bus,
    cycle: u64,
}

impl Simulator {
    /// Builds a simulator from a configuration and one trace per core.
    pub fn new(config: &SimConfig, traces: Vec<Vec<Access>>) -> Self {
        let cores = traces
            .into_iter()
            .enumerate()
            .map(|(id, trace)| Core::new(id, Cache::new(&config.geometry), trace))
            .collect();
        Self {
            geometry: config.geometry,
            cores,
            bus: Bus::new(),
            cycle: 0,
        }
    }

    /// All cores, in ascending id order.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// The shared bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Current simulated cycle.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Whether every core has consumed its whole trace.
    pub fn is_done(&self) -> bool {
        self.cores.iter().all(Core::is_done)
    }

    /// Runs the simulation to trace exhaustion.
    ///
    /// # Returns
    ///
    /// The total number of simulated cycles, including the completion of
    /// whatever work was still in flight when the last access was consumed.
    pub fn run(&mut self) -> u64 {
        debug!(
            "starting simulation: {} cores, {} sets x {} ways x {} bytes",
            self.cores.len(),
            self.geometry.num_sets(),
            self.geometry.ways,
            self.geometry.block_size()
        );
        while !self.is_done() {
            self.bus.release_if_due(self.cycle);
            let mut progressed = false;
            for id in 0..self.cores.len() {
                if self.cores[id].is_ready(self.cycle) {
                    progressed |= self.try_access(id);
                }
            }
            if self.is_done() {
                break;
            }
            if progressed {
                self.cycle += 1;
            } else {
                self.advance_to_next_event();
            }
        }

        // Let in-flight work complete before reporting the total.
        let drain = self
            .cores
            .iter()
            .map(|core| core.next_free_cycle)
            .max()
            .unwrap_or(0);
        self.cycle = self.cycle.max(drain);
        self.bus.release_if_due(self.cycle);
        debug!("simulation finished at cycle {}", self.cycle);
        self.cycle
    }

    /// Writes the statistics report for a finished run.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        Report {
            geometry: &self.geometry,
            cores: &self.cores,
            bus: &self.bus.stats,
            total_cycles: self.cycle,
        }
        .write_to(out)
    }

    /// Attempts to execute core `id`'s next access at the current cycle.
    ///
    /// # Returns
    ///
    /// `true` when the access was consumed, `false` when it stalled on a
    /// busy bus.
    fn try_access(&mut self, id: usize) -> bool {
        let access = match self.cores[id].current_access() {
            Some(access) => access,
            None => return false,
        };
        let parts = self.cores[id].cache.decode(access.addr);
        match self.cores[id].cache.lookup(parts.set_index, parts.tag) {
            Some(way) => self.execute_hit(id, access, parts.set_index, parts.tag, way),
            None => self.execute_miss(id, access, parts.set_index, parts.tag),
        }
    }

    /// Serves a hit; a write hit on a Shared line needs the bus for an
    /// upgrade and stalls while it is busy.
    fn execute_hit(&mut self, id: usize, access: Access, set: usize, tag: u32, way: usize) -> bool {
        let state = self.cores[id].cache.line(set, way).state;
        let needs_upgrade = access.is_write && state == MesiState::Shared;
        if needs_upgrade && self.bus.is_busy() {
            self.cores[id].mark_blocked(self.cycle);
            return false;
        }

        let cycle = self.cycle;
        if needs_upgrade {
            let summary = Self::snoop_peers(&mut self.cores, id, set, tag, BusTx::BusUpgr);
            self.bus.acquire(id, cycle, HIT_COST);
            self.bus.stats.transactions += 1;
            self.bus.stats.invalidations += summary.invalidated;
            let core = &mut self.cores[id];
            core.stats.invalidations += summary.invalidated;
            core.cache.line_mut(set, way).state = MesiState::Modified;
        } else if access.is_write && state == MesiState::Exclusive {
            // Silent upgrade: no peer holds the block.
            self.cores[id].cache.line_mut(set, way).state = MesiState::Modified;
        }

        let core = &mut self.cores[id];
        core.cache.touch(set, way, cycle);
        if access.is_write {
            core.cache.stats.write_hits += 1;
        } else {
            core.cache.stats.read_hits += 1;
        }
        core.retire(cycle, HIT_COST);
        if needs_upgrade {
            self.verify_block(set, tag);
        }
        true
    }

    /// Serves a miss: snoops peers, evicts, fetches, installs, and occupies
    /// the bus for the whole transaction.
    fn execute_miss(&mut self, id: usize, access: Access, set: usize, tag: u32) -> bool {
        if self.bus.is_busy() {
            self.cores[id].mark_blocked(self.cycle);
            return false;
        }

        let cycle = self.cycle;
        let block_size = self.cores[id].cache.block_size();
        let block_bytes = block_size as u64;

        {
            let stats = &mut self.cores[id].cache.stats;
            if access.is_write {
                stats.write_misses += 1;
            } else {
                stats.read_misses += 1;
            }
        }

        let victim_way = self.cores[id].cache.victim_way(set);
        let victim_dirty = {
            let line = self.cores[id].cache.line(set, victim_way);
            !line.is_vacant() && line.state == MesiState::Modified
        };

        let tx = if access.is_write {
            BusTx::BusRdX
        } else {
            BusTx::BusRd
        };
        let summary = Self::snoop_peers(&mut self.cores, id, set, tag, tx);

        let mut cost = HIT_COST;
        let mut traffic = 0u64;
        if victim_dirty {
            cost += MEM_PENALTY;
            traffic += block_bytes;
        }
        if summary.wrote_back {
            cost += MEM_PENALTY;
            traffic += block_bytes;
        }
        let fill_state = if access.is_write {
            // Write-allocate: BusRdX always fetches the block from memory.
            cost += MEM_PENALTY;
            MesiState::Modified
        } else if summary.data.supplied() {
            cost += Bus::transfer_cycles(block_size);
            read_fill_state(true)
        } else {
            cost += MEM_PENALTY;
            read_fill_state(false)
        };
        traffic += block_bytes;

        self.bus.acquire(id, cycle, cost);
        self.bus.stats.transactions += 1;
        self.bus.stats.invalidations += summary.invalidated;
        self.bus.stats.traffic_bytes += traffic;

        let core = &mut self.cores[id];
        core.stats.invalidations += summary.invalidated;
        core.stats.traffic_bytes += traffic;
        core.cache.install(set, victim_way, tag, fill_state, cycle + cost);
        core.retire(cycle, cost);

        self.verify_block(set, tag);
        true
    }

    /// Distributes a transaction to every non-requester cache and aggregates
    /// the reactions. Completes before any other transaction can start.
    fn snoop_peers(
        cores: &mut [Core],
        requester: usize,
        set: usize,
        tag: u32,
        tx: BusTx,
    ) -> SnoopSummary {
        let mut summary = SnoopSummary {
            data: SnoopData::NoData,
            invalidated: 0,
            wrote_back: false,
        };
        for core in cores.iter_mut().filter(|core| core.id != requester) {
            if let Some((prev, outcome)) = core.cache.snoop(set, tag, tx) {
                match prev {
                    MesiState::Modified => summary.data = SnoopData::Modified,
                    MesiState::Exclusive => {
                        if summary.data == SnoopData::NoData {
                            summary.data = SnoopData::Exclusive;
                        }
                    }
                    MesiState::Shared => {
                        if summary.data == SnoopData::NoData {
                            summary.data = SnoopData::Shared;
                        }
                    }
                    MesiState::Invalid => {}
                }
                if outcome.wrote_back {
                    summary.wrote_back = true;
                }
                if outcome.invalidated {
                    summary.invalidated += 1;
                }
            }
        }
        summary
    }

    /// Jumps the clock to the earliest future event: the smallest
    /// `next_free_cycle` among unfinished cores, or the bus release.
    fn advance_to_next_event(&mut self) {
        let mut next = u64::MAX;
        for core in &self.cores {
            if !core.is_done() && core.next_free_cycle > self.cycle {
                next = next.min(core.next_free_cycle);
            }
        }
        if self.bus.is_busy() {
            next = next.min(self.bus.free_cycle());
        }
        assert!(
            next != u64::MAX && next > self.cycle,
            "scheduler stalled at cycle {} with work remaining",
            self.cycle
        );
        self.cycle = next;
    }

    /// Checks the coherence invariants for one block after a transaction.
    ///
    /// At most one cache may hold the block Modified or Exclusive, and an
    /// owner excludes any other copy; valid tags within each affected set
    /// must be distinct. Violations are implementation bugs and abort with a
    /// diagnostic naming the cycle, set, and tag.
    #[cfg(debug_assertions)]
    fn verify_block(&self, set: usize, tag: u32) {
        let mut owners = 0u32;
        let mut sharers = 0u32;
        for core in &self.cores {
            let cache = &core.cache;
            for way_a in 0..cache.ways() {
                let line_a = cache.line(set, way_a);
                if line_a.is_vacant() {
                    continue;
                }
                for way_b in (way_a + 1)..cache.ways() {
                    let line_b = cache.line(set, way_b);
                    assert!(
                        line_b.is_vacant() || line_a.tag != line_b.tag,
                        "duplicate tag {:#x} in core {} set {} at cycle {}",
                        line_a.tag,
                        core.id,
                        set,
                        self.cycle
                    );
                }
            }
            if let Some(way) = cache.lookup(set, tag) {
                match cache.line(set, way).state {
                    MesiState::Modified | MesiState::Exclusive => owners += 1,
                    MesiState::Shared => sharers += 1,
                    MesiState::Invalid => {}
                }
            }
        }
        assert!(
            owners <= 1 && (owners == 0 || sharers == 0),
            "coherence violation at cycle {} set {} tag {:#x}: {} owners, {} sharers",
            self.cycle,
            set,
            tag,
            owners,
            sharers
        );
    }

    #[cfg(not(debug_assertions))]
    fn verify_block(&self, _set: usize, _tag: u32) {}
}
