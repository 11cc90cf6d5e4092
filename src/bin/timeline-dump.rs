//! Prints a stored timeline chunk in a human-readable form.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use timeline_codec::{Result, TimelineChunk};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    /// Loose JSON view with the samples decoded to CSV.
    Loose,
    /// Compact JSON view, re-encoded after validation.
    Compact,
    /// One `timestamp,value` line per sample.
    Table,
}

/// Decode a compact JSON timeline chunk.
#[derive(Debug, Parser)]
#[command(name = "timeline-dump", version)]
struct Args {
    /// Compact JSON chunk to read; stdin when omitted.
    input: Option<PathBuf>,

    /// Output rendering.
    #[arg(long, value_enum, default_value_t = View::Loose)]
    view: View,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut json = String::new();
            io::stdin().read_to_string(&mut json)?;
            Ok(json)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let json = read_input(args.input.as_ref())?;
    let chunk = TimelineChunk::from_compact_json(&json)?;
    debug!(
        chunk_id = chunk.chunk_id(),
        sample_count = chunk.sample_count(),
        "loaded chunk"
    );

    let mut out = io::stdout().lock();
    match args.view {
        View::Loose => writeln!(out, "{}", chunk.to_loose_json()?)?,
        View::Compact => writeln!(out, "{}", chunk.to_compact_json()?)?,
        View::Table => {
            for entry in chunk.timed_samples() {
                let (time, sample) = entry?;
                writeln!(out, "{},{sample}", time.to_rfc3339())?;
            }
        }
    }
    Ok(())
}
