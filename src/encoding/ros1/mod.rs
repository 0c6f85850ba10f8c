// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 serialization.

pub mod cursor;
pub mod decoder;

pub use cursor::Ros1Cursor;
pub use decoder::Ros1Decoder;
