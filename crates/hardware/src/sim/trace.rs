//! Memory reference trace loading.
//!
//! This module parses the per-core ASCII trace files. It performs:
//! 1. **Line Parsing:** One operation character (`R`/`r`/`W`/`w`) followed by
//!    a hex address with an optional `0x`/`0X` prefix.
//! 2. **Recovery:** Blank lines and `#` comments are skipped silently;
//!    malformed lines are logged and skipped, and loading continues.
//! 3. **File Naming:** Core `i` reads `<base>_proc<i>.trace`; a missing file
//!    is fatal before simulation starts.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::common::{Error, Result};

/// One memory access from a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    /// `true` for a write, `false` for a read.
    pub is_write: bool,
    /// The 32-bit address accessed.
    pub addr: u32,
}

/// Parses one trace line.
///
/// # Returns
///
/// `Ok(None)` for blank lines and comments, `Ok(Some(access))` for a valid
/// reference, or the reason the line is malformed.
fn parse_line(line: &str) -> std::result::Result<Option<Access>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut parts = trimmed.split_whitespace();
    let op = parts.next().ok_or("missing operation")?;
    let addr_str = parts.next().ok_or("missing address")?;

    let is_write = match op {
        "R" | "r" => false,
        "W" | "w" => true,
        other => return Err(format!("unknown operation '{}'", other)),
    };

    let digits = addr_str
        .strip_prefix("0x")
        .or_else(|| addr_str.strip_prefix("0X"))
        .unwrap_or(addr_str);
    let addr = u32::from_str_radix(digits, 16)
        .map_err(|e| format!("bad address '{}': {}", addr_str, e))?;

    Ok(Some(Access { is_write, addr }))
}

/// Loads one trace file.
///
/// Malformed lines are reported through `log::warn!` and skipped; an
/// unreadable file is an error.
pub fn load_trace(path: &Path) -> Result<Vec<Access>> {
    let file = File::open(path).map_err(|source| Error::TraceIo {
        path: path.to_path_buf(),
        source,
    })?;

    let mut accesses = Vec::new();
    let mut skipped = 0usize;
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| Error::TraceIo {
            path: path.to_path_buf(),
            source,
        })?;
        match parse_line(&line) {
            Ok(Some(access)) => accesses.push(access),
            Ok(None) => {}
            Err(reason) => {
                let err = Error::TraceFormat {
                    path: path.to_path_buf(),
                    line_no: idx + 1,
                    reason,
                };
                warn!("{} (line skipped)", err);
                skipped += 1;
            }
        }
    }
    debug!(
        "loaded {} accesses from '{}' ({} malformed lines skipped)",
        accesses.len(),
        path.display(),
        skipped
    );
    Ok(accesses)
}

/// Path of core `core_id`'s trace file for a given prefix.
pub fn trace_path(base: &str, core_id: usize) -> PathBuf {
    PathBuf::from(format!("{}_proc{}.trace", base, core_id))
}

/// Loads the trace files for all cores: `<base>_proc0.trace` onward.
pub fn load_traces(base: &str, cores: usize) -> Result<Vec<Vec<Access>>> {
    (0..cores)
        .map(|id| load_trace(&trace_path(base, id)))
        .collect()
}
