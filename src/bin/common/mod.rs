// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::io::IsTerminal as _;
use std::path::PathBuf;

use clap::Args;

use bagzarr::config::ConfigFile;
use bagzarr::extract::FieldSet;
use bagzarr::io::TopicFilter;
use bagzarr::schema::SchemaRegistry;
use bagzarr::store::Compressor;
use bagzarr::TransformOptions;

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Install the stdout log subscriber. `RUST_LOG` overrides the `info`
/// default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stdout)
        .init();
}

/// Format a duration in nanoseconds to human-readable string.
pub fn format_duration(nanos: u64) -> String {
    let secs = nanos / 1_000_000_000;
    let millis = (nanos % 1_000_000_000) / 1_000_000;

    if secs >= 3600 {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        format!("{}h {}m", hours, minutes)
    } else if secs >= 60 {
        let minutes = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}m {}s", minutes, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

/// Format a record timestamp in seconds since the epoch.
pub fn format_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "-".to_string();
    }
    let secs = seconds.floor();
    let nanos = ((seconds - secs) * 1e9) as u32;
    match chrono::DateTime::<chrono::Utc>::from_timestamp(secs as i64, nanos) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
        None => format!("{seconds} s"),
    }
}

/// Conversion flags shared by `convert` and `batch`.
#[derive(Args, Clone, Debug)]
pub struct ConvertArgs {
    /// Config file selecting topics (TOML, `[topics]` table)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Records buffered per topic before a write [default: 1000]
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Replace the output store instead of appending to it
    #[arg(long)]
    pub overwrite: bool,

    /// Directory of .msg definitions to load (repeatable)
    #[arg(long = "schema-dir", value_name = "DIR")]
    pub schema_dirs: Vec<PathBuf>,

    /// Values to extract per record: timestamp or a2d2
    #[arg(long, value_name = "SET")]
    pub fields: Option<FieldSet>,

    /// Chunk compressor: zstd, zstd:<level> or lz4
    #[arg(long, value_name = "CODEC")]
    pub compressor: Option<Compressor>,

    /// Hide the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

/// Everything a conversion needs, resolved from flags and config.
pub struct ConversionPlan {
    pub registry: SchemaRegistry,
    pub filter: TopicFilter,
    pub options: TransformOptions,
}

impl ConvertArgs {
    /// Resolve the plan. Flags win over the config's `[convert]` table,
    /// which wins over the library defaults.
    pub fn plan(&self) -> Result<ConversionPlan> {
        let config = self.config.as_deref().map(ConfigFile::load).transpose()?;

        let mut options = TransformOptions::default().with_progress(!self.no_progress);
        let mut schema_dirs = Vec::new();
        let filter = match &config {
            Some(config) => {
                options = options.with_config(&config.convert)?;
                schema_dirs.extend(config.schema_dirs());
                config.topic_filter()
            }
            None => TopicFilter::All,
        };

        if let Some(chunk_size) = self.chunk_size {
            options = options.with_chunk_size(chunk_size);
        }
        if self.overwrite {
            options = options.with_append(false);
        }
        if let Some(field_set) = self.fields {
            options = options.with_field_set(field_set);
        }
        if let Some(compressor) = self.compressor {
            options = options.with_compressor(compressor);
        }

        let registry = SchemaRegistry::new();
        schema_dirs.extend(self.schema_dirs.iter().cloned());
        for dir in &schema_dirs {
            let loaded = registry.load_directory(dir)?;
            tracing::info!(dir = %dir.display(), types = loaded, "Loaded message definitions");
        }

        Ok(ConversionPlan {
            registry,
            filter,
            options,
        })
    }
}

/// Progress bar wrapper for consistent progress reporting.
pub struct ProgressBar {
    inner: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a new progress bar; hidden when disabled or stderr is not a
    /// terminal.
    pub fn new(total: u64, enabled: bool) -> Self {
        let inner = if enabled && std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::new(total);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("=>-"));
            }
            Some(pb)
        } else {
            None
        };

        Self { inner }
    }

    /// Show which item is in progress.
    pub fn set_message(&self, msg: String) {
        if let Some(pb) = &self.inner {
            pb.set_message(msg);
        }
    }

    /// Advance by one.
    pub fn inc(&self) {
        if let Some(pb) = &self.inner {
            pb.inc(1);
        }
    }

    /// Finish the progress bar with a message.
    pub fn finish_with_message(&self, msg: String) {
        if let Some(pb) = &self.inner {
            pb.finish_with_message(msg);
        }
    }
}
