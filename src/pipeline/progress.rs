// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Terminal progress for a transform run.

use std::io::IsTerminal as _;

/// Spinner counting records read. Hidden unless enabled and stderr is a
/// terminal.
pub struct Progress {
    inner: Option<indicatif::ProgressBar>,
}

impl Progress {
    /// Create a spinner labelled with the input file name.
    pub fn new(enabled: bool, label: &str) -> Self {
        let inner = if enabled && std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::new_spinner();
            if let Ok(style) = indicatif::ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] Reading {prefix}: {pos} records {msg}")
            {
                pb.set_style(style);
            }
            pb.set_prefix(label.to_string());
            Some(pb)
        } else {
            None
        };
        Self { inner }
    }

    /// Disabled progress.
    pub fn hidden() -> Self {
        Self { inner: None }
    }

    /// Count one record.
    pub fn tick(&self) {
        if let Some(pb) = &self.inner {
            pb.inc(1);
        }
    }

    /// Finish the spinner with a message.
    pub fn finish_with_message(&self, msg: String) {
        if let Some(pb) = &self.inner {
            pb.finish_with_message(msg);
        }
    }
}
