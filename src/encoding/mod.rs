// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message wire-format decoding.

pub mod ros1;

pub use ros1::{Ros1Cursor, Ros1Decoder};
