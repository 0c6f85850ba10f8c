// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # bagzarr CLI
//!
//! Convert ROS1 bags into Zarr v2 array stores.
//!
//! ## Usage
//!
//! ```sh
//! # Convert one bag
//! bagzarr convert dive_001.bag dive.zarr --config topics.toml
//!
//! # Convert every bag under a data root into one store
//! bagzarr batch /data/cruise cruise.zarr --keyword dive --overwrite
//!
//! # List the bags batch would convert
//! bagzarr find /data/cruise --keyword dive
//!
//! # Look at inputs and outputs
//! bagzarr inspect bag dive_001.bag
//! bagzarr inspect store dive.zarr
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{BatchCmd, ConvertCmd, FindCmd, InspectCmd};
use common::Result;

/// bagzarr - ROS1 bag to Zarr converter
///
/// Streams selected topics out of bag files into one compressed
/// (N, 10) float64 array per topic.
#[derive(Parser, Clone)]
#[command(name = "bagzarr")]
#[command(about = "Convert ROS1 bag files into Zarr v2 array stores", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Convert one bag into a store
    Convert(ConvertCmd),

    /// Discover bags under a data root and convert them all into one store
    Batch(BatchCmd),

    /// Print the bags discovered under a data root
    Find(FindCmd),

    /// Inspect a bag or a store
    #[command(subcommand)]
    Inspect(InspectCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    common::init_logging();

    match cli.command {
        Commands::Convert(cmd) => cmd.run(),
        Commands::Batch(cmd) => cmd.run(),
        Commands::Find(cmd) => cmd.run(),
        Commands::Inspect(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
