// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for bagzarr.
//!
//! Covers the failures that can stop a conversion run:
//! - Schema parsing and type resolution
//! - ROS1 wire decoding
//! - Configuration loading
//! - Array store I/O
//! - Setup problems (missing input directories, bad arguments)
//!
//! Per-message extraction failures are not part of this enum; see
//! [`crate::extract::ExtractError`].

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while converting bag files.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Parse error in schema or data
    #[error("Parse error in {context}: {message}")]
    Parse {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Invalid schema definition
    #[error("Invalid schema '{schema_name}': {reason}")]
    InvalidSchema {
        /// Schema name or identifier
        schema_name: String,
        /// Validation error message
        reason: String,
    },

    /// Type not found in the schema registry
    #[error("Type not found: '{type_name}'")]
    TypeNotFound {
        /// Type name that was not found
        type_name: String,
    },

    /// Buffer too short for requested read
    #[error("Buffer too short: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available")]
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Array, string or sequence length exceeded data bounds
    #[error("Length {length} exceeds buffer at position {position} (buffer length: {buffer_len})")]
    LengthExceeded {
        /// Length that was read
        length: usize,
        /// Position in buffer
        position: usize,
        /// Buffer length
        buffer_len: usize,
    },

    /// Configuration document could not be read or parsed
    #[error("Config error in '{path}': {message}")]
    Config {
        /// Config file path
        path: String,
        /// Error message
        message: String,
    },

    /// Array store operation failed
    #[error("Store error at '{path}': {message}")]
    Store {
        /// Store or dataset path
        path: String,
        /// Error message
        message: String,
    },

    /// Required directory does not exist
    #[error("the directory '{path}' does not exist or is not a directory")]
    MissingDirectory {
        /// Directory path
        path: String,
    },

    /// Bag file could not be opened or read
    #[error("Bag error in '{path}': {message}")]
    Bag {
        /// Bag file path
        path: String,
        /// Error message
        message: String,
    },

    /// Invalid argument passed to an operation
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Argument name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// I/O error
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidSchema {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        Error::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        Error::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create a length exceeded error.
    pub fn length_exceeded(length: usize, position: usize, buffer_len: usize) -> Self {
        Error::LengthExceeded {
            length,
            position,
            buffer_len,
        }
    }

    /// Create a config error.
    pub fn config(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::Config {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a store error.
    pub fn store(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::Store {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a missing directory error.
    pub fn missing_directory(path: impl AsRef<Path>) -> Self {
        Error::MissingDirectory {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Create a bag error.
    pub fn bag(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::Bag {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error happened while decoding a single message payload.
    ///
    /// The transform engine recovers from these by skipping the record.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. }
                | Error::TypeNotFound { .. }
                | Error::InvalidSchema { .. }
                | Error::BufferTooShort { .. }
                | Error::LengthExceeded { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Error::Parse { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            Error::InvalidSchema {
                schema_name,
                reason,
            } => vec![("schema", schema_name.clone()), ("reason", reason.clone())],
            Error::TypeNotFound { type_name } => vec![("type", type_name.clone())],
            Error::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            Error::LengthExceeded {
                length,
                position,
                buffer_len,
            } => vec![
                ("length", length.to_string()),
                ("position", position.to_string()),
                ("buffer_len", buffer_len.to_string()),
            ],
            Error::Config { path, message }
            | Error::Store { path, message }
            | Error::Bag { path, message } => {
                vec![("path", path.clone()), ("message", message.clone())]
            }
            Error::MissingDirectory { path } => vec![("path", path.clone())],
            Error::InvalidArgument { name, reason } => {
                vec![("argument", name.clone()), ("reason", reason.clone())]
            }
            Error::Io(msg) => vec![("message", msg.clone())],
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type for bagzarr operations.
pub type Result<T> = std::result::Result<T, Error>;
