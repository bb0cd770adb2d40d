//! Error definitions for the simulation engine.
//!
//! This module defines the error type surfaced by the engine. It covers:
//! 1. **Configuration Errors:** Invalid cache geometry or system parameters,
//!    rejected before simulation begins.
//! 2. **Trace I/O Errors:** Missing or unreadable trace files, fatal for the
//!    affected core.
//! 3. **Trace Format Errors:** Malformed trace lines, recovered locally by
//!    the loader (the offending line is reported and skipped).
//!
//! Runtime coherence-invariant violations are not represented here: they
//! indicate implementation bugs and fail fast with a panic.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors produced while configuring or loading a simulation.
#[derive(Debug)]
pub enum Error {
    /// Invalid configuration (bad geometry, zero associativity, ...).
    ///
    /// The simulator exits with a non-zero status before simulation begins.
    Config(String),

    /// A trace file could not be opened or read.
    ///
    /// Simulation does not start; a missing trace is fatal for its core.
    TraceIo {
        /// Path of the trace file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A trace line could not be parsed.
    ///
    /// The loader reports the line and skips it; loading continues.
    TraceFormat {
        /// Path of the trace file.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line_no: usize,
        /// Description of what was malformed.
        reason: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
            Error::TraceIo { path, source } => {
                write!(f, "cannot read trace file '{}': {}", path.display(), source)
            }
            Error::TraceFormat {
                path,
                line_no,
                reason,
            } => {
                write!(f, "{}:{}: {}", path.display(), line_no, reason)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::TraceIo { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, Error>;
