// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Predefined ROS1 message types.
//!
//! Bags normally embed every dependency in their connection records, but
//! `.msg` directories loaded from disk reference `Header` without
//! defining it, so the registry starts with these:
//!
//! ```text
//! # std_msgs/Header
//! uint32 seq
//! time stamp
//! string frame_id
//! ```

use crate::schema::ast::{Field, FieldType, MessageType, PrimitiveType};

/// Create the predefined std_msgs/Header type (ROS1 layout, with `seq`).
fn builtin_header() -> MessageType {
    let mut msg_type = MessageType::new("std_msgs/Header");

    msg_type.add_field(Field {
        name: "seq".to_string(),
        type_name: FieldType::Primitive(PrimitiveType::UInt32),
    });
    msg_type.add_field(Field {
        name: "stamp".to_string(),
        type_name: FieldType::Primitive(PrimitiveType::Time),
    });
    msg_type.add_field(Field {
        name: "frame_id".to_string(),
        type_name: FieldType::Primitive(PrimitiveType::String),
    });

    msg_type
}

/// All builtin types, in registration order.
pub fn builtin_types() -> Vec<MessageType> {
    vec![builtin_header()]
}
