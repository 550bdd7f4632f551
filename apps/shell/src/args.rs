//! # CLI Argument Definitions
//!
//! Every storage command names the configured storage first, then the entry inside it.

use clap::{Args, Parser, Subcommand};
use depot::storage::{DEFAULT_DIR_MODE, parse_mode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "depot")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Read and write files in named storages")]
pub(crate) struct Cli {
    /// Configuration file; the extension may be omitted [default: depot]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Storage and entry addressed by a command.
#[derive(Debug, Args)]
pub(crate) struct Target {
    /// Configured storage name
    pub storage: String,
    /// Path inside the storage; a leading `/` is the storage root
    pub filename: String,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List configured storages with their adapters
    Storages {},
    /// Store a file and print the path written
    Write {
        #[command(flatten)]
        target: Target,
        /// Read the content from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print a file's content to stdout
    Read {
        #[command(flatten)]
        target: Target,
    },
    /// Remove a file or an empty directory; prints whether anything was removed
    #[command(alias = "rm")]
    Delete {
        #[command(flatten)]
        target: Target,
    },
    /// Print whether a file or directory exists
    Exists {
        #[command(flatten)]
        target: Target,
    },
    /// Create a directory; prints whether it exists afterwards
    Mkdir {
        #[command(flatten)]
        target: Target,
        /// Permission bits in octal, e.g. 755
        #[arg(short, long, value_parser = octal_mode, default_value = "777")]
        mode: u32,
        /// Fail instead of creating missing parents
        #[arg(long)]
        no_recursive: bool,
    },
    /// Print image dimensions as WIDTHxHEIGHT
    ImageSize {
        #[command(flatten)]
        target: Target,
    },
    /// Print EXIF tags, one `Tag: value` per line
    Exif {
        #[command(flatten)]
        target: Target,
        /// Print a JSON object instead
        #[arg(long)]
        json: bool,
    },
}

fn octal_mode(raw: &str) -> Result<u32, String> {
    parse_mode(raw)
        .ok_or_else(|| format!("'{raw}' is not an octal mode (default {DEFAULT_DIR_MODE:o})"))
}
