// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Find command - list discovered bags.

use std::path::PathBuf;

use clap::Args;

use crate::common::Result;
use bagzarr::io::{ensure_directory, find_log_paths, Discovery};

/// Print the bags discovered under a data root.
#[derive(Args, Clone, Debug)]
pub struct FindCmd {
    /// Data root to search
    #[arg(value_name = "DATA_ROOT")]
    root: PathBuf,

    /// Only match file names starting with this text
    #[arg(short, long, default_value = "")]
    keyword: String,
}

impl FindCmd {
    pub fn run(self) -> Result<()> {
        ensure_directory(&self.root, false)?;
        let discovery = find_log_paths(&self.root, &self.keyword)?;
        report_discovery(&discovery, &self.keyword);
        for path in discovery.paths() {
            println!("{}", path.display());
        }
        Ok(())
    }
}

/// Explain an empty discovery on stderr.
pub fn report_discovery(discovery: &Discovery, keyword: &str) {
    match discovery {
        Discovery::Found { .. } => {}
        Discovery::NoMatchingFiles { directories } => {
            for dir in directories {
                eprintln!(
                    "No .bag files starting with '{keyword}' in {}",
                    dir.display()
                );
            }
        }
        Discovery::NoLogDirectory => eprintln!("No 'rosbag' folder found"),
    }
}
