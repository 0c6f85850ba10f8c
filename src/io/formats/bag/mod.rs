// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 bag format.
//!
//! - Sequential reader over the rosbag crate
//! - Uncompressed writer for fixtures and exports

pub mod reader;
pub mod writer;

pub use reader::{BagConnection, BagReader, BagRecord};
pub use writer::{BagMessage, BagWriter};
