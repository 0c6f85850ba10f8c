// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Input side: bag files, their discovery, and topic filtering.

pub mod discovery;
pub mod filter;
pub mod formats;

pub use discovery::{ensure_directory, find_log_paths, Discovery};
pub use filter::TopicFilter;
pub use formats::bag::{BagConnection, BagMessage, BagReader, BagRecord, BagWriter};
