// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show bag connections or store datasets.

use std::path::PathBuf;

use clap::Subcommand;

use crate::common::{format_timestamp, Result};
use bagzarr::io::BagReader;
use bagzarr::pipeline::topic_key;
use bagzarr::store::ArrayStore;

/// Inspect a bag or a store.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// List connections and per-topic record counts
    Bag {
        /// Input bag file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// List datasets with shapes and time ranges
    Store {
        /// Store directory
        #[arg(value_name = "STORE")]
        store: PathBuf,
    },
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        match self {
            InspectCmd::Bag { input } => cmd_bag(input),
            InspectCmd::Store { store } => cmd_store(store),
        }
    }
}

/// Cmd: Show bag connections
fn cmd_bag(input: PathBuf) -> Result<()> {
    let reader = BagReader::open(&input)?;
    let counts = reader.topic_counts()?;

    println!("=== {} ===", input.display());
    println!();
    println!(
        "{:<4} {:<36} {:<32} {:>10}  Dataset",
        "ID", "Topic", "Type", "Records"
    );
    println!("{}", "-".repeat(100));
    for conn in reader.connections() {
        println!(
            "{:<4} {:<36} {:<32} {:>10}  {}",
            conn.id,
            conn.topic,
            conn.message_type,
            counts.get(&conn.topic).copied().unwrap_or(0),
            topic_key(&conn.topic)
        );
    }
    println!();
    println!("Records: {}", counts.values().sum::<u64>());
    Ok(())
}

/// Cmd: Show store datasets
fn cmd_store(path: PathBuf) -> Result<()> {
    let store = ArrayStore::open_existing(&path)?;
    let names = store.dataset_names()?;

    println!("=== {} ===", path.display());
    println!();
    println!(
        "{:<32} {:>12} {:>8} {:<10} {:<27} {:<27}",
        "Dataset", "Rows", "Chunk", "Codec", "First", "Last"
    );
    println!("{}", "-".repeat(120));
    for name in &names {
        let dataset = store.open_dataset(name)?;
        let (rows, _) = dataset.shape();
        let (first, last) = if rows == 0 {
            (f64::NAN, f64::NAN)
        } else {
            (dataset.read_row(0)?[0], dataset.read_row(rows - 1)?[0])
        };
        let codec = dataset
            .compressor()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string());
        println!(
            "{:<32} {:>12} {:>8} {:<10} {:<27} {:<27}",
            name,
            rows,
            dataset.chunk_rows(),
            codec,
            format_timestamp(first),
            format_timestamp(last)
        );
        if let Some(topics) = dataset
            .attributes()?
            .and_then(|attrs| attrs.get("topics").cloned())
        {
            println!("  topics: {topics}");
        }
    }
    println!();
    println!("Datasets: {}", names.len());
    Ok(())
}
