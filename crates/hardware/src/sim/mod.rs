//! Simulation driving and trace loading.
//!
//! Provides the trace-file loader and the cycle-driven scheduler that runs
//! the core table against the shared bus.

/// Cycle-driven scheduler and snoop distribution.
pub mod scheduler;

/// Trace-file parsing and loading.
pub mod trace;

pub use scheduler::Simulator;
