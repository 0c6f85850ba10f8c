// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Convert command - one bag into one store.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;

use crate::common::{format_duration, ConvertArgs, Result};
use bagzarr::{TransformStats, Transformer};

/// Convert one bag into a store.
#[derive(Args, Clone, Debug)]
pub struct ConvertCmd {
    /// Input bag file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output store directory
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    args: ConvertArgs,
}

impl ConvertCmd {
    pub fn run(self) -> Result<()> {
        let plan = self.args.plan()?;
        let started = Instant::now();

        let transformer = Transformer::new(&plan.registry, plan.options)?;
        let stats = transformer.run(&self.input, &self.output, &plan.filter)?;

        print_summary(&stats, started.elapsed().as_nanos() as u64);
        Ok(())
    }
}

/// Print the per-dataset table and failure counters.
pub fn print_summary(stats: &TransformStats, elapsed_ns: u64) {
    println!();
    println!("{:<40} {:>12}", "Dataset", "Records");
    println!("{}", "-".repeat(53));
    for (key, count) in &stats.counts {
        println!("{:<40} {:>12}", key, count);
    }
    println!("{}", "-".repeat(53));
    println!("{:<40} {:>12}", "Total", stats.total_records());
    println!();
    println!("  Read:              {}", stats.records_read);
    println!("  Filtered out:      {}", stats.filtered_out);
    println!("  Decode failures:   {}", stats.decode_failures);
    println!("  Extract failures:  {}", stats.extract_failures);
    println!("  Out of order:      {}", stats.disorder_warnings);
    if stats.invalid_topic_keys > 0 {
        println!("  Unusable topics:   {}", stats.invalid_topic_keys);
    }
    if stats.topic_key_collisions > 0 {
        println!("  Merged topics:     {}", stats.topic_key_collisions);
    }
    println!("  Elapsed:           {}", format_duration(elapsed_ns));
}
