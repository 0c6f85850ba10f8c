// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 .msg parser using Pest.
//!
//! The format supports:
//! - Simple field lists (root message)
//! - Dependency blocks with "MSG: TypeName" headers
//! - Array types: T[] (dynamic) or T[n] (fixed)
//! - Nested types: package/MessageName, bare names resolved against the
//!   enclosing package, `Header` resolved to `std_msgs/Header`
//! - Comments (# style) and constants (skipped)

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::core::{Error, Result};
use crate::schema::ast::{
    normalize_type_name, package_of, qualify_type_name, Field, FieldType, MessageSchema,
    MessageType, PrimitiveType,
};

/// Pest parser for ROS1 .msg definitions.
#[derive(Parser)]
#[grammar = "schema/parser/msg.pest"] // Path relative to src/ directory
struct MsgParser;

/// Parse a ROS1 message definition.
///
/// # Arguments
///
/// * `type_name` - Name of the root type (e.g., "ds_hotel_msgs/A2D2")
/// * `definition` - Definition text, optionally with `MSG:` dependency blocks
///
/// # Returns
///
/// A [`MessageSchema`] holding the root type and every dependency block.
pub fn parse_definition(type_name: &str, definition: &str) -> Result<MessageSchema> {
    let mut source = definition.to_string();
    if !source.ends_with('\n') {
        source.push('\n');
    }

    let pairs = MsgParser::parse(Rule::definition, &source)
        .map_err(|e| Error::parse(format!("msg definition '{type_name}'"), e.to_string()))?;

    let mut schema = MessageSchema::new(type_name);
    let mut is_root = true;

    for block in pairs.flat_map(|pair| pair.into_inner()) {
        if block.as_rule() != Rule::block {
            continue;
        }

        let mut block_name: Option<String> = None;
        let mut field_pairs = Vec::new();
        for item in block.into_inner() {
            match item.as_rule() {
                Rule::msg_header => {
                    block_name = item
                        .into_inner()
                        .next()
                        .map(|p| normalize_type_name(p.as_str()));
                }
                Rule::field => field_pairs.push(item),
                // constants carry no wire data
                _ => {}
            }
        }

        let name = match block_name {
            Some(name) => name,
            None if is_root => schema.name.clone(),
            None => {
                return Err(Error::invalid_schema(
                    type_name,
                    "dependency block is missing its 'MSG:' header",
                ))
            }
        };
        is_root = false;

        let package = package_of(&name).map(str::to_string);
        let mut msg_type = MessageType::new(name);
        for pair in field_pairs {
            msg_type.add_field(parse_field(pair, package.as_deref())?);
        }
        schema.add_type(msg_type);
    }

    Ok(schema)
}

/// Parse a single `field` pair into a [`Field`].
fn parse_field(pair: Pair<'_, Rule>, package: Option<&str>) -> Result<Field> {
    let mut base_type = None;
    let mut array: Option<Option<usize>> = None;
    let mut name = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::field_type => {
                for part in item.into_inner() {
                    match part.as_rule() {
                        Rule::type_name => base_type = Some(part.as_str().to_string()),
                        Rule::array_suffix => {
                            let size = match part.into_inner().next() {
                                Some(digits) => Some(digits.as_str().parse::<usize>().map_err(
                                    |e| Error::parse("msg array size", e.to_string()),
                                )?),
                                None => None,
                            };
                            array = Some(size);
                        }
                        _ => {}
                    }
                }
            }
            Rule::field_name => name = Some(item.as_str().to_string()),
            _ => {}
        }
    }

    let (Some(base_type), Some(name)) = (base_type, name) else {
        return Err(Error::parse("msg field", "incomplete field declaration"));
    };

    let base = match PrimitiveType::try_from_str(&base_type) {
        Some(prim) => FieldType::Primitive(prim),
        None => FieldType::Nested(qualify_type_name(&base_type, package)),
    };

    let type_name = match array {
        Some(size) => FieldType::Array {
            base_type: Box::new(base),
            size,
        },
        None => base,
    };

    Ok(Field { name, type_name })
}
