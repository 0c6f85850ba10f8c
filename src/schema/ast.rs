// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST types for parsed ROS1 .msg schemas.

use std::collections::HashMap;

/// A parsed ROS1 message definition.
///
/// Holds the root type plus every dependency type that appeared in the
/// same definition text (the `MSG: pkg/Type` blocks of a bag connection).
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    /// Root type name (e.g., "ds_hotel_msgs/A2D2")
    pub name: String,
    /// Package name (e.g., "ds_hotel_msgs")
    pub package: Option<String>,
    /// All types defined in this schema (root type + dependencies)
    pub types: HashMap<String, MessageType>,
}

/// A message type definition with its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageType {
    /// Fully qualified type name
    pub name: String,
    /// Ordered list of fields (wire order)
    pub fields: Vec<Field>,
}

/// A field in a message type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field type
    pub type_name: FieldType,
}

/// Field type - can be primitive, array, or nested message.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Primitive type
    Primitive(PrimitiveType),
    /// Array type
    Array {
        /// Element type
        base_type: Box<FieldType>,
        /// Array size (None = dynamic, Some(N) = fixed)
        size: Option<usize>,
    },
    /// Nested message type (fully qualified)
    Nested(String),
}

/// Primitive ROS1 types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    /// Deprecated alias for int8
    Byte,
    /// Deprecated alias for uint8
    Char,
    /// ROS1 time (secs: uint32, nsecs: uint32)
    Time,
    /// ROS1 duration (secs: int32, nsecs: int32)
    Duration,
}

impl PrimitiveType {
    /// Get the wire size in bytes for this primitive type, if fixed.
    pub fn size(self) -> Option<usize> {
        match self {
            PrimitiveType::Bool
            | PrimitiveType::Int8
            | PrimitiveType::UInt8
            | PrimitiveType::Byte
            | PrimitiveType::Char => Some(1),
            PrimitiveType::Int16 | PrimitiveType::UInt16 => Some(2),
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float32 => Some(4),
            PrimitiveType::Int64
            | PrimitiveType::UInt64
            | PrimitiveType::Float64
            | PrimitiveType::Time
            | PrimitiveType::Duration => Some(8),
            PrimitiveType::String => None,
        }
    }

    /// Whether arrays of this type are decoded as raw bytes.
    pub fn is_byte_like(self) -> bool {
        matches!(
            self,
            PrimitiveType::UInt8 | PrimitiveType::Byte | PrimitiveType::Char
        )
    }

    /// Parse a primitive type from a string.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(PrimitiveType::Bool),
            "int8" => Some(PrimitiveType::Int8),
            "int16" => Some(PrimitiveType::Int16),
            "int32" => Some(PrimitiveType::Int32),
            "int64" => Some(PrimitiveType::Int64),
            "uint8" => Some(PrimitiveType::UInt8),
            "uint16" => Some(PrimitiveType::UInt16),
            "uint32" => Some(PrimitiveType::UInt32),
            "uint64" => Some(PrimitiveType::UInt64),
            "float32" => Some(PrimitiveType::Float32),
            "float64" => Some(PrimitiveType::Float64),
            "string" => Some(PrimitiveType::String),
            "byte" => Some(PrimitiveType::Byte),
            "char" => Some(PrimitiveType::Char),
            "time" => Some(PrimitiveType::Time),
            "duration" => Some(PrimitiveType::Duration),
            _ => None,
        }
    }
}

impl MessageSchema {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        let name = normalize_type_name(&name.into());
        Self {
            package: package_of(&name).map(str::to_string),
            name,
            types: HashMap::new(),
        }
    }

    /// Register a type in this schema.
    pub fn add_type(&mut self, msg_type: MessageType) {
        self.types.insert(msg_type.name.clone(), msg_type);
    }

    /// Look up a type by name.
    pub fn get_type(&self, name: &str) -> Option<&MessageType> {
        self.types.get(&normalize_type_name(name))
    }

    /// The root type of this schema, if it was defined.
    pub fn root(&self) -> Option<&MessageType> {
        self.types.get(&self.name)
    }
}

impl MessageType {
    /// Create a new message type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: normalize_type_name(&name.into()),
            fields: Vec::new(),
        }
    }

    /// Add a field to this message type.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Normalize a type name to the ROS1 `pkg/Type` form.
///
/// `std_msgs/msg/Header` and `std_msgs/Header` resolve to the same key.
pub fn normalize_type_name(name: &str) -> String {
    name.trim().replace("/msg/", "/")
}

/// Package component of a type name, if qualified.
pub fn package_of(name: &str) -> Option<&str> {
    name.rsplit_once('/').map(|(pkg, _)| pkg)
}

/// Qualify a type reference found inside a definition of `package`.
///
/// `Header` always means `std_msgs/Header`; other bare names belong to
/// the enclosing package.
pub fn qualify_type_name(name: &str, package: Option<&str>) -> String {
    if name == "Header" {
        return "std_msgs/Header".to_string();
    }
    if name.contains('/') {
        return normalize_type_name(name);
    }
    match package {
        Some(pkg) => format!("{pkg}/{name}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_sizes() {
        assert_eq!(PrimitiveType::Time.size(), Some(8));
        assert_eq!(PrimitiveType::Char.size(), Some(1));
        assert_eq!(PrimitiveType::String.size(), None);
    }

    #[test]
    fn test_try_from_str() {
        assert_eq!(PrimitiveType::try_from_str("time"), Some(PrimitiveType::Time));
        assert_eq!(PrimitiveType::try_from_str("float64"), Some(PrimitiveType::Float64));
        assert_eq!(PrimitiveType::try_from_str("Header"), None);
    }

    #[test]
    fn test_normalize_type_name() {
        assert_eq!(normalize_type_name("std_msgs/msg/Header"), "std_msgs/Header");
        assert_eq!(normalize_type_name(" ds_core_msgs/DsHeader "), "ds_core_msgs/DsHeader");
    }

    #[test]
    fn test_qualify_type_name() {
        assert_eq!(qualify_type_name("Header", Some("ds_hotel_msgs")), "std_msgs/Header");
        assert_eq!(qualify_type_name("A2D2", Some("ds_hotel_msgs")), "ds_hotel_msgs/A2D2");
        assert_eq!(
            qualify_type_name("ds_core_msgs/DsHeader", Some("ds_hotel_msgs")),
            "ds_core_msgs/DsHeader"
        );
        assert_eq!(qualify_type_name("Point", None), "Point");
    }

    #[test]
    fn test_schema_package() {
        let schema = MessageSchema::new("ds_hotel_msgs/A2D2");
        assert_eq!(schema.package.as_deref(), Some("ds_hotel_msgs"));
        assert!(schema.root().is_none());
    }
}
