//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hours-of-Service compliance checker.
///
/// Reads the text of ELD daily log pages, rebuilds the duty-status timeline
/// and reports every HOS rule it breaks.
#[derive(Debug, Parser)]
#[command(name = "hos", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check log pages for Hours-of-Service violations.
    ///
    /// Each file holds page text; form feeds split a file into pages.
    /// Reads stdin when no files are given.
    Check {
        /// Page text files.
        files: Vec<PathBuf>,

        /// Treat inputs as JSON arrays of pre-extracted entries.
        #[arg(long)]
        entries: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the normalized events of log pages as JSON lines.
    Events {
        /// Page text files.
        files: Vec<PathBuf>,
    },

    /// Evaluate a JSON array of events.
    Evaluate {
        /// JSON file. Reads stdin when omitted.
        file: Option<PathBuf>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the duty type a note classifies as.
    Classify {
        /// Free-text note, e.g. "pre-trip inspection".
        note: String,
    },
}
