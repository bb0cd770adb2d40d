//! MESI coherence state machine.
//!
//! This module implements the protocol policy as pure transition functions:
//! 1. **States:** Modified, Exclusive, Shared, Invalid.
//! 2. **Snoop Transitions:** How a resident line reacts to a peer's bus
//!    transaction, including write-back and invalidation side effects.
//! 3. **Fill States:** The state a read miss installs, determined by whether
//!    any peer held the block.
//!
//! Processor-side upgrades (write hit on Exclusive or Shared) are driven by
//! the scheduler; the snoop side lives here so the reaction table has a
//! single authoritative definition.

/// Coherence state of a cache line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MesiState {
    /// Dirty and exclusively owned; memory is stale.
    Modified,
    /// Clean and exclusively owned; silent upgrade to Modified is allowed.
    Exclusive,
    /// Clean with possible copies in peer caches.
    Shared,
    /// Not present; equivalent to an empty slot.
    Invalid,
}

/// A transaction broadcast on the shared bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusTx {
    /// Read request from a miss; peers demote to Shared.
    BusRd,
    /// Read-exclusive request from a write miss; peers invalidate.
    BusRdX,
    /// Shared-to-Modified upgrade; peers invalidate, no data moves.
    BusUpgr,
}

/// Effect of a snooped transaction on one resident line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnoopOutcome {
    /// State the line transitions to.
    pub next: MesiState,
    /// The line was Modified and its block was written back.
    pub wrote_back: bool,
    /// The line was invalidated by the transaction.
    pub invalidated: bool,
}

/// Applies the snoop side of the MESI table to a single line.
///
/// Transitions not in the table cannot arise when the protocol invariants
/// hold (a peer cannot snoop `BusUpgr` while holding the block exclusively),
/// and are treated as fatal coherence violations.
///
/// # Arguments
///
/// * `state` - Current state of the snooping cache's line.
/// * `tx` - The transaction observed on the bus.
///
/// # Returns
///
/// The next state and the side effects the transition produced.
pub fn snoop_transition(state: MesiState, tx: BusTx) -> SnoopOutcome {
    let keep = |next| SnoopOutcome {
        next,
        wrote_back: false,
        invalidated: false,
    };
    match (state, tx) {
        (MesiState::Modified, BusTx::BusRd) => SnoopOutcome {
            next: MesiState::Shared,
            wrote_back: true,
            invalidated: false,
        },
        (MesiState::Modified, BusTx::BusRdX) => SnoopOutcome {
            next: MesiState::Invalid,
            wrote_back: true,
            invalidated: true,
        },
        (MesiState::Exclusive, BusTx::BusRd) => keep(MesiState::Shared),
        (MesiState::Exclusive, BusTx::BusRdX) => SnoopOutcome {
            next: MesiState::Invalid,
            wrote_back: false,
            invalidated: true,
        },
        (MesiState::Shared, BusTx::BusRd) => keep(MesiState::Shared),
        (MesiState::Shared, BusTx::BusRdX) | (MesiState::Shared, BusTx::BusUpgr) => SnoopOutcome {
            next: MesiState::Invalid,
            wrote_back: false,
            invalidated: true,
        },
        (MesiState::Invalid, _) => keep(MesiState::Invalid),
        (MesiState::Modified, BusTx::BusUpgr) | (MesiState::Exclusive, BusTx::BusUpgr) => {
            unreachable!("BusUpgr snooped by a cache holding the block in {:?}", state)
        }
    }
}

/// State installed by a read miss.
///
/// # Arguments
///
/// * `peers_had_copy` - Whether any peer held the block non-Invalid when the
///   `BusRd` was snooped.
///
/// # Returns
///
/// `Shared` when the block was supplied or held elsewhere, `Exclusive` when
/// it came from memory with no other copies.
pub fn read_fill_state(peers_had_copy: bool) -> MesiState {
    if peers_had_copy {
        MesiState::Shared
    } else {
        MesiState::Exclusive
    }
}
