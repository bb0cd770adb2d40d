//! MESI Snoop Transition Table Tests.
//!
//! Verifies every row of the snoop side of the protocol table, the fill
//! state chosen on a read miss, and that transitions the invariants forbid
//! abort instead of silently corrupting state.

use mesisim_core::core::mesi::{read_fill_state, snoop_transition, BusTx, MesiState};

// ══════════════════════════════════════════════════════════
// 1. Modified line reactions
// ══════════════════════════════════════════════════════════

/// M snooping a BusRd supplies the block: write-back, demote to Shared.
#[test]
fn modified_busrd_writes_back_and_shares() {
    let outcome = snoop_transition(MesiState::Modified, BusTx::BusRd);
    assert_eq!(outcome.next, MesiState::Shared);
    assert!(outcome.wrote_back);
    assert!(!outcome.invalidated);
}

/// M snooping a BusRdX writes back, then invalidates.
#[test]
fn modified_busrdx_writes_back_and_invalidates() {
    let outcome = snoop_transition(MesiState::Modified, BusTx::BusRdX);
    assert_eq!(outcome.next, MesiState::Invalid);
    assert!(outcome.wrote_back);
    assert!(outcome.invalidated);
}

// ══════════════════════════════════════════════════════════
// 2. Exclusive line reactions
// ══════════════════════════════════════════════════════════

/// E snooping a BusRd demotes to Shared with no data movement of its own.
#[test]
fn exclusive_busrd_demotes_to_shared() {
    let outcome = snoop_transition(MesiState::Exclusive, BusTx::BusRd);
    assert_eq!(outcome.next, MesiState::Shared);
    assert!(!outcome.wrote_back);
    assert!(!outcome.invalidated);
}

/// E snooping a BusRdX invalidates; the line was clean, so no write-back.
#[test]
fn exclusive_busrdx_invalidates_clean() {
    let outcome = snoop_transition(MesiState::Exclusive, BusTx::BusRdX);
    assert_eq!(outcome.next, MesiState::Invalid);
    assert!(!outcome.wrote_back);
    assert!(outcome.invalidated);
}

// ══════════════════════════════════════════════════════════
// 3. Shared line reactions
// ══════════════════════════════════════════════════════════

/// S snooping a BusRd stays Shared.
#[test]
fn shared_busrd_stays_shared() {
    let outcome = snoop_transition(MesiState::Shared, BusTx::BusRd);
    assert_eq!(outcome.next, MesiState::Shared);
    assert!(!outcome.wrote_back);
    assert!(!outcome.invalidated);
}

/// S invalidates on both BusRdX and BusUpgr.
#[test]
fn shared_invalidates_on_busrdx_and_busupgr() {
    for tx in [BusTx::BusRdX, BusTx::BusUpgr] {
        let outcome = snoop_transition(MesiState::Shared, tx);
        assert_eq!(outcome.next, MesiState::Invalid, "tx = {:?}", tx);
        assert!(!outcome.wrote_back);
        assert!(outcome.invalidated);
    }
}

// ══════════════════════════════════════════════════════════
// 4. Invalid line reactions
// ══════════════════════════════════════════════════════════

/// An Invalid line ignores every transaction.
#[test]
fn invalid_ignores_all_transactions() {
    for tx in [BusTx::BusRd, BusTx::BusRdX, BusTx::BusUpgr] {
        let outcome = snoop_transition(MesiState::Invalid, tx);
        assert_eq!(outcome.next, MesiState::Invalid, "tx = {:?}", tx);
        assert!(!outcome.wrote_back);
        assert!(!outcome.invalidated);
    }
}

// ══════════════════════════════════════════════════════════
// 5. Forbidden transitions
// ══════════════════════════════════════════════════════════

/// A BusUpgr can only be issued by a Shared holder, so no peer can hold the
/// block Modified; observing that is a coherence violation.
#[test]
#[should_panic(expected = "BusUpgr")]
fn modified_busupgr_is_a_coherence_violation() {
    snoop_transition(MesiState::Modified, BusTx::BusUpgr);
}

/// Same for an Exclusive holder.
#[test]
#[should_panic(expected = "BusUpgr")]
fn exclusive_busupgr_is_a_coherence_violation() {
    snoop_transition(MesiState::Exclusive, BusTx::BusUpgr);
}

// ══════════════════════════════════════════════════════════
// 6. Read fill state
// ══════════════════════════════════════════════════════════

/// A read miss installs Shared iff a peer held the block, else Exclusive.
#[test]
fn read_fill_state_depends_on_peers() {
    assert_eq!(read_fill_state(true), MesiState::Shared);
    assert_eq!(read_fill_state(false), MesiState::Exclusive);
}
