// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Batch command - discover bags and convert them into one store.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use tracing::info;

use super::convert::print_summary;
use super::find::report_discovery;
use crate::common::{ConvertArgs, ProgressBar, Result};
use bagzarr::io::{ensure_directory, find_log_paths};
use bagzarr::{TransformStats, Transformer};

/// Discover bags under a data root and convert them all into one store.
#[derive(Args, Clone, Debug)]
pub struct BatchCmd {
    /// Data root to search for a `rosbag` folder
    #[arg(value_name = "DATA_ROOT")]
    root: PathBuf,

    /// Output store directory
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Only convert files whose names start with this text
    #[arg(short, long, default_value = "")]
    keyword: String,

    /// Create the data root if it does not exist
    #[arg(long)]
    create_root: bool,

    #[command(flatten)]
    args: ConvertArgs,
}

impl BatchCmd {
    pub fn run(self) -> Result<()> {
        ensure_directory(&self.root, self.create_root)?;
        let discovery = find_log_paths(&self.root, &self.keyword)?;
        report_discovery(&discovery, &self.keyword);
        let paths = discovery.into_paths();
        if paths.is_empty() {
            return Ok(());
        }

        let plan = self.args.plan()?;
        let show_progress = plan.options.progress;
        // The first bag decides overwrite; later bags always append.
        let first_append = plan.options.append;
        let base_options = plan.options.with_progress(false);

        let started = Instant::now();
        let progress = ProgressBar::new(paths.len() as u64, show_progress);
        let mut total = TransformStats::new();
        for (index, path) in paths.iter().enumerate() {
            let options = base_options
                .clone()
                .with_append(index > 0 || first_append);
            progress.set_message(path.display().to_string());
            info!(
                bag = %path.display(),
                index = index + 1,
                total = paths.len(),
                "Converting bag"
            );

            let transformer = Transformer::new(&plan.registry, options)?;
            let stats = transformer.run(path, &self.output, &plan.filter)?;
            total.merge(&stats);
            progress.inc();
        }
        progress.finish_with_message(format!("{} bags converted", paths.len()));

        print_summary(&total, started.elapsed().as_nanos() as u64);
        Ok(())
    }
}
