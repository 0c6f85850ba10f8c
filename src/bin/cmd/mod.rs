// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod batch;
mod convert;
mod find;
mod inspect;

pub use batch::BatchCmd;
pub use convert::ConvertCmd;
pub use find::FindCmd;
pub use inspect::InspectCmd;
