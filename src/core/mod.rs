// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout bagzarr.
//!
//! - [`Error`] - Error handling for conversion runs
//! - [`CodecValue`] - Decoded message value representation

pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::{CodecValue, DecodedMessage};
