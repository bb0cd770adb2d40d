//! Scheduler Accounting and Determinism Tests.
//!
//! Verifies the cross-cutting properties of whole runs: conservation of
//! accesses, the eviction/cold-miss identity, idle/exec accounting, report
//! structure, and bit-identical reruns.

use mesisim_core::core::mesi::MesiState;
use mesisim_core::sim::trace::Access;
use mesisim_core::stats::POLICY;

use crate::common::{geometry, r, run_and_report, sim, w};

/// A four-core workload with sharing, upgrades, conflicts, and write-backs.
fn contended_workload() -> Vec<Vec<Access>> {
    vec![
        vec![r(0x0), w(0x0), r(0x100), w(0x40)],
        vec![r(0x0), w(0x0), r(0x40)],
        vec![w(0x100), r(0x0), w(0x140), r(0x140)],
        vec![r(0x20), w(0x20), r(0x0), w(0x100)],
    ]
}

// ══════════════════════════════════════════════════════════
// 1. Conservation invariants
// ══════════════════════════════════════════════════════════

/// Every trace entry is consumed exactly once: hits + misses == trace length
/// per core, and the read/write split matches the trace.
#[test]
fn accesses_are_conserved() {
    let traces = contended_workload();
    let lengths: Vec<usize> = traces.iter().map(Vec::len).collect();
    let mut s = sim(geometry(2, 2, 5), traces);
    s.run();

    for (core, &len) in s.cores().iter().zip(&lengths) {
        let cache = &core.cache.stats;
        assert_eq!(
            cache.accesses(),
            len as u64,
            "core {}: hits + misses must equal trace length",
            core.id
        );
        assert_eq!(
            core.stats.total_instructions(),
            len as u64,
            "core {}: read + write counts must equal trace length",
            core.id
        );
    }
}

/// Misses either fill an empty slot or evict: evictions == misses − cold.
#[test]
fn evictions_complement_cold_misses() {
    let mut s = sim(geometry(1, 1, 5), contended_workload());
    s.run();

    for core in s.cores() {
        let cache = &core.cache.stats;
        assert_eq!(
            cache.evictions,
            cache.misses() - cache.cold_misses,
            "core {}",
            core.id
        );
    }
}

/// The global bus counters are the sums of the per-core attributions.
#[test]
fn bus_counters_sum_core_attributions() {
    let mut s = sim(geometry(2, 2, 5), contended_workload());
    s.run();

    let traffic: u64 = s.cores().iter().map(|c| c.stats.traffic_bytes).sum();
    let invalidations: u64 = s.cores().iter().map(|c| c.stats.invalidations).sum();
    assert_eq!(s.bus().stats.traffic_bytes, traffic);
    assert_eq!(s.bus().stats.invalidations, invalidations);
}

/// Exactly one core may own a block in M or E at termination.
#[test]
fn final_states_respect_exclusivity() {
    let mut s = sim(geometry(2, 2, 5), contended_workload());
    s.run();

    for addr in [0x0u32, 0x20, 0x40, 0x100, 0x140] {
        let mut owners = 0;
        let mut sharers = 0;
        for core in s.cores() {
            let parts = core.cache.decode(addr);
            if let Some(way) = core.cache.lookup(parts.set_index, parts.tag) {
                match core.cache.line(parts.set_index, way).state {
                    MesiState::Modified | MesiState::Exclusive => owners += 1,
                    MesiState::Shared => sharers += 1,
                    MesiState::Invalid => {}
                }
            }
        }
        assert!(
            owners <= 1 && (owners == 0 || sharers == 0),
            "block {:#x}: {} owners, {} sharers",
            addr,
            owners,
            sharers
        );
    }
}

// ══════════════════════════════════════════════════════════
// 2. Degenerate inputs
// ══════════════════════════════════════════════════════════

/// All-empty traces terminate immediately at cycle zero.
#[test]
fn empty_traces_finish_at_cycle_zero() {
    let mut s = sim(geometry(2, 2, 5), vec![vec![], vec![], vec![], vec![]]);
    assert_eq!(s.run(), 0);
    assert_eq!(s.bus().stats.transactions, 0);
}

/// A single empty core among busy ones contributes nothing.
#[test]
fn idle_core_stays_silent() {
    let mut s = sim(geometry(2, 2, 5), vec![vec![r(0x0)], vec![]]);
    s.run();
    let idle = &s.cores()[1];
    assert_eq!(idle.stats.total_instructions(), 0);
    assert_eq!(idle.stats.exec_cycles, 0);
    assert_eq!(idle.stats.idle_cycles, 0);
}

// ══════════════════════════════════════════════════════════
// 3. Report and determinism
// ══════════════════════════════════════════════════════════

/// The report carries the geometry header, one block per core in id order,
/// and the bus summary.
#[test]
fn report_structure() {
    let mut s = sim(geometry(2, 2, 5), contended_workload());
    let report = run_and_report(&mut s);

    assert!(report.contains(POLICY));
    assert!(report.contains("set index bits (s)  : 2"));
    assert!(report.contains("block size          : 32 bytes"));
    for id in 0..4 {
        assert!(report.contains(&format!("---------- Core {} ----------", id)));
    }
    assert!(report.contains("---------- Summary ----------"));
    assert!(report.contains("bus transactions"));

    let core_order: Vec<usize> = (0..4)
        .map(|id| report.find(&format!("Core {}", id)).unwrap())
        .collect();
    let mut sorted = core_order.clone();
    sorted.sort_unstable();
    assert_eq!(core_order, sorted, "cores must appear in ascending id order");
}

/// The miss rate is printed with four decimal places.
#[test]
fn report_miss_rate_formatting() {
    let mut s = sim(geometry(2, 2, 5), vec![vec![r(0x0), r(0x0), r(0x0), r(0x0)]]);
    let report = run_and_report(&mut s);
    assert!(report.contains("miss rate           : 25.0000%"));
}

/// Running the same workload twice yields byte-identical reports.
#[test]
fn reruns_are_bit_identical() {
    let first = run_and_report(&mut sim(geometry(2, 2, 5), contended_workload()));
    let second = run_and_report(&mut sim(geometry(2, 2, 5), contended_workload()));
    assert_eq!(first, second);
}
