//! `depot` command-line tool: one storage operation per invocation.
//!
//! ```text
//! depot --config depot.toml write avatars u/42.png --input face.png
//! depot read avatars u/42.png > copy.png
//! depot image-size avatars u/42.png
//! ```

mod args;
mod commands;

use crate::args::Cli;
use anyhow::Result;
use clap::Parser;
use depot::{FileSystem, FilterCatalog};
use depot_kernel::config::load_depot_config;
use depot_logger::Logger;
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_depot_config(cli.config.as_deref())?;

    let logging = &config.logging;
    let _logger = if logging.console || logging.path.is_some() {
        Some(Logger::from_config(env!("CARGO_PKG_NAME"), logging)?)
    } else {
        None
    };

    let fs = FileSystem::from_config(&config, &FilterCatalog::default())?;

    commands::run(&fs, cli.command, &mut io::stdin().lock(), &mut io::stdout().lock())
}
