// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use bagzarr::io::{BagMessage, BagWriter};

// ============================================================================
// Temporary Directories
// ============================================================================

/// Get a unique temporary directory for one test.
pub fn temp_dir(name: &str) -> (PathBuf, CleanupGuard) {
    let random = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    let dir = std::env::temp_dir().join(format!(
        "bagzarr_test_{}_{}_{}",
        name,
        std::process::id(),
        random
    ));
    fs::create_dir_all(&dir).unwrap();
    let guard = CleanupGuard(dir.clone());
    (dir, guard)
}

/// Cleanup guard for test temporary files
#[derive(Debug)]
pub struct CleanupGuard(PathBuf);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

// ============================================================================
// Message Definitions
// ============================================================================

/// A header plus one value.
pub const STAMPED_TYPE: &str = "test_msgs/Stamped";
pub const STAMPED_DEF: &str = "\
Header header
float64 value
===
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id
";

/// Hotel A2D2 sample as recorded on the vehicle.
pub const A2D2_TYPE: &str = "ds_hotel_msgs/A2D2";
pub const A2D2_DEF: &str = "\
# A2D2 converter sample
Header header
ds_core_msgs/DsHeader ds_header
int16[4] raw
float32[4] proc
===
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id
===
MSG: ds_core_msgs/DsHeader
time io_time
time orig_stamp
";

// ============================================================================
// Serialization
// ============================================================================

/// Split seconds into ROS1 (secs, nsecs).
pub fn ros_time(seconds: f64) -> (u32, u32) {
    let secs = seconds.trunc();
    let nsecs = ((seconds - secs) * 1e9).round() as u32;
    (secs as u32, nsecs)
}

fn push_time(buf: &mut Vec<u8>, seconds: f64) {
    let (secs, nsecs) = ros_time(seconds);
    buf.extend_from_slice(&secs.to_le_bytes());
    buf.extend_from_slice(&nsecs.to_le_bytes());
}

fn push_header(buf: &mut Vec<u8>, seq: u32, seconds: f64, frame_id: &str) {
    buf.extend_from_slice(&seq.to_le_bytes());
    push_time(buf, seconds);
    buf.extend_from_slice(&(frame_id.len() as u32).to_le_bytes());
    buf.extend_from_slice(frame_id.as_bytes());
}

/// Serialize a `test_msgs/Stamped`.
pub fn stamped(seconds: f64, value: f64) -> Vec<u8> {
    let mut buf = Vec::new();
    push_header(&mut buf, 0, seconds, "base");
    buf.extend_from_slice(&value.to_le_bytes());
    buf
}

/// Serialize a `ds_hotel_msgs/A2D2`.
pub fn a2d2(seconds: f64, orig_stamp: f64, raw: [i16; 4], proc: [f32; 4]) -> Vec<u8> {
    let mut buf = Vec::new();
    push_header(&mut buf, 1, seconds, "hotel");
    push_time(&mut buf, seconds);
    push_time(&mut buf, orig_stamp);
    for value in raw {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    for value in proc {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    buf
}

// ============================================================================
// Bag Fixtures
// ============================================================================

/// One message to write: topic, type, definition, receive time, payload.
pub struct Record {
    pub topic: &'static str,
    pub message_type: &'static str,
    pub definition: &'static str,
    pub seconds: f64,
    pub data: Vec<u8>,
}

impl Record {
    /// A `test_msgs/Stamped` record stamped at `seconds`.
    pub fn stamped(topic: &'static str, seconds: f64) -> Self {
        Self {
            topic,
            message_type: STAMPED_TYPE,
            definition: STAMPED_DEF,
            seconds,
            data: stamped(seconds, seconds * 10.0),
        }
    }

    /// A `ds_hotel_msgs/A2D2` record stamped at `seconds`.
    pub fn a2d2(topic: &'static str, seconds: f64, raw: [i16; 4], proc: [f32; 4]) -> Self {
        Self {
            topic,
            message_type: A2D2_TYPE,
            definition: A2D2_DEF,
            seconds,
            data: a2d2(seconds, seconds - 0.25, raw, proc),
        }
    }
}

/// Write records in order, one connection per topic. Chunks are kept
/// small so most fixtures span several.
pub fn write_bag(path: &Path, records: &[Record]) {
    let mut writer = BagWriter::create(path).unwrap().with_chunk_threshold(128);
    let mut conns: HashMap<&str, u32> = HashMap::new();
    for record in records {
        let conn = match conns.get(record.topic) {
            Some(&conn) => conn,
            None => {
                let conn = writer
                    .add_connection(record.topic, record.message_type, record.definition)
                    .unwrap();
                conns.insert(record.topic, conn);
                conn
            }
        };
        let time_ns = (record.seconds * 1e9).round() as u64;
        writer
            .write_message(&BagMessage::new(conn, time_ns, record.data.clone()))
            .unwrap();
    }
    writer.finish().unwrap();
}

/// Write a config file with a `[topics]` table.
pub fn write_config(path: &Path, topics: &[(&str, &str)]) {
    let mut text = String::from("[topics]\n");
    for (name, topic) in topics {
        text.push_str(&format!("{name} = \"{topic}\"\n"));
    }
    fs::write(path, text).unwrap();
}

/// First column of every row of a flat `(N, 10)` buffer.
pub fn first_column(values: &[f64]) -> Vec<f64> {
    values.chunks(bagzarr::extract::RECORD_WIDTH).map(|row| row[0]).collect()
}
