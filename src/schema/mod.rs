// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parsing and registration for ROS1 `.msg` definitions.
//!
//! - [`parse_definition`] turns definition text into a [`MessageSchema`]
//! - [`SchemaRegistry`] holds resolved types for the decoder

pub mod ast;
pub mod builtin_types;
pub mod parser;
pub mod registry;

pub use ast::{Field, FieldType, MessageSchema, MessageType, PrimitiveType};
pub use parser::parse_definition;
pub use registry::SchemaRegistry;
