//! Cache coherence simulator CLI.
//!
//! This binary wires the simulation engine to the command line. It performs:
//! 1. **Argument Parsing:** Cache geometry, trace prefix, and report
//!    destination.
//! 2. **Loading:** Reads one trace file per core; a missing file aborts the
//!    run with a non-zero exit status.
//! 3. **Run and Report:** Executes the simulation and writes the statistics
//!    report to stdout or the requested file.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use mesisim_core::common::constants::NUM_CORES;
use mesisim_core::config::{GeometryConfig, SimConfig};
use mesisim_core::sim::trace;
use mesisim_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "mesisim",
    author,
    version,
    about = "Cycle-accurate quad-core MESI snooping-bus cache simulator",
    long_about = "Simulates four trace-driven cores with private write-back L1 caches \
kept coherent by a snooping MESI protocol over a single shared bus.\n\n\
Example:\n  mesisim -t traces/app1 -s 6 -E 2 -b 5 -o report.txt"
)]
struct Cli {
    /// Trace file prefix; loads <base>_proc0.trace .. <base>_proc3.trace.
    #[arg(short = 't', long = "trace")]
    trace_base: String,

    /// Number of set index bits (sets = 2^s).
    #[arg(short = 's', long = "set-bits", default_value_t = 6)]
    set_bits: u32,

    /// Associativity: cache lines per set.
    #[arg(short = 'E', long = "assoc", default_value_t = 2)]
    ways: usize,

    /// Number of block offset bits (block size = 2^b bytes).
    #[arg(short = 'b', long = "block-bits", default_value_t = 5)]
    block_bits: u32,

    /// Write the report to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = SimConfig {
        geometry: GeometryConfig {
            set_bits: cli.set_bits,
            ways: cli.ways,
            block_bits: cli.block_bits,
        },
        cores: NUM_CORES,
        trace_base: cli.trace_base,
        output: cli.output,
    };

    if let Err(e) = config.validate() {
        eprintln!("mesisim: {}", e);
        process::exit(1);
    }

    let traces = match trace::load_traces(&config.trace_base, config.cores) {
        Ok(traces) => traces,
        Err(e) => {
            eprintln!("mesisim: {}", e);
            process::exit(1);
        }
    };

    let mut sim = Simulator::new(&config, traces);
    sim.run();

    if let Err(e) = write_report(&sim, config.output.as_deref()) {
        eprintln!("mesisim: cannot write report: {}", e);
        process::exit(1);
    }
}

/// Writes the report to the requested destination, stdout when absent.
fn write_report(sim: &Simulator, output: Option<&std::path::Path>) -> io::Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            sim.write_report(&mut file)?;
            file.flush()
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            sim.write_report(&mut handle)?;
            handle.flush()
        }
    }
}
