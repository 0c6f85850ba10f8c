// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema registry for ROS1 message types.
//!
//! The registry is an explicit object: build it once, load `.msg`
//! directories into it, and pass it by reference to the decoder. Types
//! embedded in bag connection records are added lazily while streaming.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::core::{Error, Result};
use crate::schema::ast::{normalize_type_name, MessageSchema, MessageType};
use crate::schema::builtin_types::builtin_types;
use crate::schema::parser::parse_definition;

/// Thread-safe registry of parsed message types keyed by `pkg/Type`.
///
/// Registration never replaces an existing type: the first definition
/// seen for a name wins. Types loaded from disk before a run therefore
/// take precedence over definitions embedded in the bag.
pub struct SchemaRegistry {
    inner: RwLock<HashMap<String, Arc<MessageType>>>,
}

impl SchemaRegistry {
    /// Create a registry preloaded with the builtin ROS1 types.
    pub fn new() -> Self {
        let registry = Self::empty();
        {
            let mut inner = registry.inner.write().unwrap_or_else(|e| e.into_inner());
            for msg_type in builtin_types() {
                inner.insert(msg_type.name.clone(), Arc::new(msg_type));
            }
        }
        registry
    }

    /// Create a registry with no types at all.
    pub fn empty() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Register a single type. Returns `false` if the name was taken.
    pub fn register_type(&self, msg_type: MessageType) -> Result<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| Error::Io(format!("Registry lock poisoned: {e}")))?;
        if inner.contains_key(&msg_type.name) {
            return Ok(false);
        }
        inner.insert(msg_type.name.clone(), Arc::new(msg_type));
        Ok(true)
    }

    /// Register every type of a parsed schema. Returns how many were new.
    pub fn register_schema(&self, schema: MessageSchema) -> Result<usize> {
        let mut added = 0;
        for (_, msg_type) in schema.types {
            if self.register_type(msg_type)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Parse and register a definition text (e.g. a connection's
    /// `message_definition`). Returns how many types were new.
    pub fn register_definition(&self, type_name: &str, definition: &str) -> Result<usize> {
        let schema = parse_definition(type_name, definition)?;
        self.register_schema(schema)
    }

    /// Load every `.msg` file below `dir`.
    ///
    /// The package of `<pkg>/msg/<Type>.msg` is `<pkg>`; a file directly
    /// inside some other directory takes that directory's name as package.
    /// Returns how many types were new.
    pub fn load_directory(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::missing_directory(dir));
        }

        let mut files = Vec::new();
        collect_msg_files(dir, &mut files)?;
        files.sort();

        let mut added = 0;
        for file in &files {
            let Some(type_name) = type_name_for_file(file) else {
                continue;
            };
            let text = fs::read_to_string(file)?;
            let schema = parse_definition(&type_name, &text)
                .map_err(|e| Error::invalid_schema(file.display().to_string(), e.to_string()))?;
            added += self.register_schema(schema)?;
        }

        debug!(
            directory = %dir.display(),
            files = files.len(),
            added,
            "Loaded message definitions"
        );
        Ok(added)
    }

    /// Look up a type by name.
    pub fn resolve(&self, type_name: &str) -> Result<Option<Arc<MessageType>>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| Error::Io(format!("Registry lock poisoned: {e}")))?;
        Ok(inner.get(&normalize_type_name(type_name)).cloned())
    }

    /// Check if a type is registered.
    pub fn contains(&self, type_name: &str) -> Result<bool> {
        Ok(self.resolve(type_name)?.is_some())
    }

    /// Get all registered type names, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| Error::Io(format!("Registry lock poisoned: {e}")))?;
        let mut names: Vec<String> = inner.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Get the number of registered types.
    pub fn len(&self) -> Result<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|e| Error::Io(format!("Registry lock poisoned: {e}")))?;
        Ok(inner.len())
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_msg_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // Linked directories are not descended into; linked files are read.
        if entry.file_type()?.is_dir() {
            collect_msg_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "msg") && path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

fn type_name_for_file(file: &Path) -> Option<String> {
    let stem = file.file_stem()?.to_str()?;
    let parent = file.parent()?;
    let parent_name = parent.file_name()?.to_str()?;
    let package = if parent_name == "msg" {
        parent.parent()?.file_name()?.to_str()?
    } else {
        parent_name
    };
    Some(format!("{package}/{stem}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ast::{Field, FieldType, PrimitiveType};
    use crate::test_util::temp_dir;

    #[test]
    fn test_new_has_header() {
        let registry = SchemaRegistry::new();
        assert!(registry.contains("std_msgs/Header").unwrap());
        assert!(registry.contains("std_msgs/msg/Header").unwrap());
        assert_eq!(registry.len().unwrap(), 1);
        assert!(SchemaRegistry::empty().is_empty().unwrap());
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = SchemaRegistry::empty();

        let mut first = MessageType::new("test/Value");
        first.add_field(Field {
            name: "a".to_string(),
            type_name: FieldType::Primitive(PrimitiveType::Int32),
        });
        assert!(registry.register_type(first).unwrap());

        let second = MessageType::new("test/Value");
        assert!(!registry.register_type(second).unwrap());

        let resolved = registry.resolve("test/Value").unwrap().unwrap();
        assert_eq!(resolved.fields.len(), 1);
    }

    #[test]
    fn test_register_definition_counts_new_types() {
        let registry = SchemaRegistry::new();
        let definition = "Header header\nfloat64 depth\n===\nMSG: std_msgs/Header\nuint32 seq\ntime stamp\nstring frame_id\n";
        let added = registry
            .register_definition("ds_sensor_msgs/Depth", definition)
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(
            registry.names().unwrap(),
            vec!["ds_sensor_msgs/Depth".to_string(), "std_msgs/Header".to_string()]
        );
    }

    #[test]
    fn test_load_directory() {
        let (root, _guard) = temp_dir("registry_load");
        let msg_dir = root.join("ds_hotel_msgs").join("msg");
        fs::create_dir_all(&msg_dir).unwrap();
        fs::write(
            msg_dir.join("A2D2.msg"),
            "Header header\nds_core_msgs/DsHeader ds_header\nint16[4] raw\nfloat32[4] proc\n",
        )
        .unwrap();
        fs::write(msg_dir.join("Battery.msg"), "Header header\nfloat32 voltage\n").unwrap();
        fs::write(msg_dir.join("README.txt"), "not a message").unwrap();

        let registry = SchemaRegistry::new();
        let added = registry.load_directory(root.join("ds_hotel_msgs")).unwrap();
        assert_eq!(added, 2);

        let a2d2 = registry.resolve("ds_hotel_msgs/A2D2").unwrap().unwrap();
        assert_eq!(
            a2d2.field("header").unwrap().type_name,
            FieldType::Nested("std_msgs/Header".to_string())
        );
        assert!(registry.contains("ds_hotel_msgs/Battery").unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_load_directory_skips_linked_directories() {
        let (root, _guard) = temp_dir("registry_loop");
        let msg_dir = root.join("ds_nav_msgs").join("msg");
        fs::create_dir_all(&msg_dir).unwrap();
        fs::write(msg_dir.join("Depth.msg"), "Header header\nfloat64 depth\n").unwrap();
        std::os::unix::fs::symlink(&root, msg_dir.join("loop")).unwrap();

        let registry = SchemaRegistry::new();
        let added = registry.load_directory(&root).unwrap();
        assert_eq!(added, 1);
        assert!(registry.contains("ds_nav_msgs/Depth").unwrap());
    }

    #[test]
    fn test_load_missing_directory() {
        let registry = SchemaRegistry::new();
        let result = registry.load_directory("/nonexistent/bagzarr/msgs");
        assert!(matches!(result, Err(Error::MissingDirectory { .. })));
    }

    #[test]
    fn test_type_name_for_file() {
        assert_eq!(
            type_name_for_file(Path::new("/x/ds_hotel_msgs/msg/A2D2.msg")),
            Some("ds_hotel_msgs/A2D2".to_string())
        );
        assert_eq!(
            type_name_for_file(Path::new("/x/ds_core_msgs/DsHeader.msg")),
            Some("ds_core_msgs/DsHeader".to_string())
        );
    }
}
