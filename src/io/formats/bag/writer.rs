// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 bag file writer.
//!
//! Writes uncompressed version 2.0 bags that the sequential reader (and
//! the ROS1 tooling) can open. Used to build bag fixtures and to export
//! synthetic logs.
//!
//! # ROS1 Bag Format Overview
//!
//! 1. Version line: `#ROSBAG V2.0\n`
//! 2. File header record (padded to 4096 bytes)
//! 3. Chunks, each holding connection records, message data records and
//!    trailing index data records per connection
//! 4. Connection records (summary)
//! 5. Chunk info records (summary)
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bagzarr::io::formats::bag::{BagMessage, BagWriter};
//!
//! let mut writer = BagWriter::create("output.bag")?;
//! let conn = writer.add_connection("/depth", "test/Depth", "float64 depth\n")?;
//! writer.write_message(&BagMessage::new(conn, 1_000_000_000, 1.0f64.to_le_bytes().to_vec()))?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::warn;

use crate::core::{Error, Result};

const VERSION_LINE: &str = "#ROSBAG V2.0\n";

/// Size of the version line plus the padded file header record.
const FILE_HEADER_SIZE: usize = 4096;

const OP_MSG_DATA: u8 = 0x02;
const OP_BAG_HEADER: u8 = 0x03;
const OP_INDEX_DATA: u8 = 0x04;
const OP_CHUNK: u8 = 0x05;
const OP_CHUNK_INFO: u8 = 0x06;
const OP_CONNECTION: u8 = 0x07;

const INDEX_VERSION: u32 = 1;
const CHUNK_INFO_VERSION: u32 = 1;

/// Default chunk threshold (768KB)
const DEFAULT_CHUNK_THRESHOLD: usize = 768 * 1024;

/// A message to be written to a bag file.
#[derive(Debug, Clone)]
pub struct BagMessage {
    /// Connection ID returned by `add_connection`
    pub conn_id: u32,
    /// Receive time in nanoseconds since the Unix epoch
    pub time_ns: u64,
    /// ROS1 serialized message bytes
    pub data: Vec<u8>,
}

impl BagMessage {
    /// Create a new BagMessage.
    pub fn new(conn_id: u32, time_ns: u64, data: Vec<u8>) -> Self {
        Self {
            conn_id,
            time_ns,
            data,
        }
    }
}

#[derive(Debug, Clone)]
struct Connection {
    id: u32,
    topic: String,
    message_type: String,
    message_definition: String,
    caller_id: String,
}

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    time: (u32, u32),
    offset: u32,
}

#[derive(Debug, Clone)]
struct ChunkInfo {
    pos: u64,
    start_time: (u32, u32),
    end_time: (u32, u32),
    counts: BTreeMap<u32, u32>,
}

/// Record header fields, serialized as `len key=value` pairs.
#[derive(Default)]
struct RecordHeader {
    fields: BTreeMap<&'static str, Vec<u8>>,
}

impl RecordHeader {
    fn op(op: u8) -> Self {
        let mut header = Self::default();
        header.fields.insert("op", vec![op]);
        header
    }

    fn bytes(mut self, key: &'static str, value: &[u8]) -> Self {
        self.fields.insert(key, value.to_vec());
        self
    }

    fn u32(self, key: &'static str, value: u32) -> Self {
        self.bytes(key, &value.to_le_bytes())
    }

    fn u64(self, key: &'static str, value: u64) -> Self {
        self.bytes(key, &value.to_le_bytes())
    }

    fn time(self, key: &'static str, time: (u32, u32)) -> Self {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&time.0.to_le_bytes());
        bytes[4..].copy_from_slice(&time.1.to_le_bytes());
        self.bytes(key, &bytes)
    }

    /// Append the length-prefixed header to `buffer`.
    fn write_to(&self, buffer: &mut Vec<u8>) -> std::io::Result<()> {
        let len: usize = self
            .fields
            .iter()
            .map(|(key, value)| 4 + key.len() + 1 + value.len())
            .sum();
        buffer.write_u32::<LittleEndian>(len as u32)?;
        for (key, value) in &self.fields {
            buffer.write_u32::<LittleEndian>((key.len() + 1 + value.len()) as u32)?;
            buffer.extend_from_slice(key.as_bytes());
            buffer.push(b'=');
            buffer.extend_from_slice(value);
        }
        Ok(())
    }
}

/// ROS1 bag file writer.
///
/// Call [`finish()`](BagWriter::finish) to write the index; a writer that is
/// dropped unfinished leaves a bag without summary records.
pub struct BagWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    is_open: bool,
    connections: Vec<Connection>,
    chunk_infos: Vec<ChunkInfo>,
    /// Records of the chunk being built, without the chunk header
    chunk_data: Vec<u8>,
    current_chunk: Option<ChunkInfo>,
    chunk_indexes: BTreeMap<u32, Vec<IndexEntry>>,
    connections_in_chunk: HashSet<u32>,
    topic_ids: HashMap<(String, String), u32>,
    chunk_threshold: usize,
    file_pos: u64,
}

impl BagWriter {
    /// Create a new bag file for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .map_err(|e| Error::bag(&path, format!("Failed to create file: {e}")))?;
        let mut writer = BufWriter::new(file);

        let header = file_header(0, 0, 0).map_err(|e| Error::bag(&path, e.to_string()))?;
        writer
            .write_all(&header)
            .map_err(|e| Error::bag(&path, format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path,
            is_open: true,
            connections: Vec::new(),
            chunk_infos: Vec::new(),
            chunk_data: Vec::new(),
            current_chunk: None,
            chunk_indexes: BTreeMap::new(),
            connections_in_chunk: HashSet::new(),
            topic_ids: HashMap::new(),
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            file_pos: header.len() as u64,
        })
    }

    /// Set the chunk size threshold in bytes.
    pub fn with_chunk_threshold(mut self, threshold: usize) -> Self {
        self.chunk_threshold = threshold.max(1);
        self
    }

    /// Add a connection with an empty caller id. Returns its connection ID.
    ///
    /// Adding the same topic twice returns the existing ID.
    pub fn add_connection(
        &mut self,
        topic: &str,
        message_type: &str,
        message_definition: &str,
    ) -> Result<u32> {
        self.add_connection_with_callerid(topic, message_type, message_definition, "")
    }

    /// Add a connection for a specific publishing node.
    ///
    /// ROS1 allows several nodes to publish on one topic; each
    /// (topic, caller id) pair gets its own connection.
    pub fn add_connection_with_callerid(
        &mut self,
        topic: &str,
        message_type: &str,
        message_definition: &str,
        caller_id: &str,
    ) -> Result<u32> {
        if !self.is_open {
            return Err(Error::bag(&self.path, "Cannot add connection to closed bag"));
        }
        let key = (topic.to_string(), caller_id.to_string());
        if let Some(&id) = self.topic_ids.get(&key) {
            return Ok(id);
        }

        let id = self.connections.len() as u32;
        self.connections.push(Connection {
            id,
            topic: topic.to_string(),
            message_type: message_type.to_string(),
            message_definition: message_definition.to_string(),
            caller_id: caller_id.to_string(),
        });
        self.topic_ids.insert(key, id);
        Ok(id)
    }

    /// Write a message to the current chunk.
    pub fn write_message(&mut self, msg: &BagMessage) -> Result<()> {
        if !self.is_open {
            return Err(Error::bag(&self.path, "Cannot write to closed bag"));
        }
        let Some(conn) = self.connections.get(msg.conn_id as usize) else {
            return Err(Error::bag(
                &self.path,
                format!(
                    "No connection found for conn_id {} (only {} connections added)",
                    msg.conn_id,
                    self.connections.len()
                ),
            ));
        };

        let time = ns_to_time(msg.time_ns);
        let chunk = self.current_chunk.get_or_insert_with(|| ChunkInfo {
            pos: 0,
            start_time: time,
            end_time: time,
            counts: BTreeMap::new(),
        });
        chunk.start_time = chunk.start_time.min(time);
        chunk.end_time = chunk.end_time.max(time);
        *chunk.counts.entry(conn.id).or_default() += 1;

        if self.connections_in_chunk.insert(conn.id) {
            connection_record(conn, &mut self.chunk_data)
                .map_err(|e| Error::bag(&self.path, e.to_string()))?;
        }

        let offset = self.chunk_data.len() as u32;
        RecordHeader::op(OP_MSG_DATA)
            .u32("conn", conn.id)
            .time("time", time)
            .write_to(&mut self.chunk_data)
            .and_then(|_| {
                self.chunk_data
                    .write_u32::<LittleEndian>(msg.data.len() as u32)
            })
            .map_err(|e| Error::bag(&self.path, e.to_string()))?;
        self.chunk_data.extend_from_slice(&msg.data);

        self.chunk_indexes
            .entry(conn.id)
            .or_default()
            .push(IndexEntry { time, offset });

        if self.chunk_data.len() >= self.chunk_threshold {
            self.finish_chunk()?;
        }
        Ok(())
    }

    /// Write the pending chunk and its index records to the file.
    fn finish_chunk(&mut self) -> Result<()> {
        let Some(mut chunk) = self.current_chunk.take() else {
            return Ok(());
        };
        chunk.pos = self.file_pos;

        let mut buffer = Vec::with_capacity(self.chunk_data.len() + 128);
        let size = self.chunk_data.len() as u32;
        RecordHeader::op(OP_CHUNK)
            .bytes("compression", b"none")
            .u32("size", size)
            .write_to(&mut buffer)
            .and_then(|_| buffer.write_u32::<LittleEndian>(size))
            .map_err(|e| Error::bag(&self.path, e.to_string()))?;
        buffer.extend_from_slice(&self.chunk_data);

        for (conn_id, entries) in &self.chunk_indexes {
            index_record(*conn_id, entries, &mut buffer)
                .map_err(|e| Error::bag(&self.path, e.to_string()))?;
        }

        self.writer
            .write_all(&buffer)
            .map_err(|e| Error::bag(&self.path, format!("Failed to write chunk: {e}")))?;
        self.file_pos += buffer.len() as u64;

        self.chunk_infos.push(chunk);
        self.chunk_data.clear();
        self.chunk_indexes.clear();
        self.connections_in_chunk.clear();
        Ok(())
    }

    /// Finalize the bag file and write the summary records.
    pub fn finish(mut self) -> Result<()> {
        self.finish_chunk()?;
        let index_pos = self.file_pos;

        let mut summary = Vec::new();
        for conn in &self.connections {
            connection_record(conn, &mut summary)
                .map_err(|e| Error::bag(&self.path, e.to_string()))?;
        }
        for chunk in &self.chunk_infos {
            chunk_info_record(chunk, &mut summary)
                .map_err(|e| Error::bag(&self.path, e.to_string()))?;
        }

        let header = file_header(
            self.connections.len() as u32,
            self.chunk_infos.len() as u32,
            index_pos,
        )
        .map_err(|e| Error::bag(&self.path, e.to_string()))?;

        let path = self.path.clone();
        let io = |e: std::io::Error| Error::bag(&path, format!("Failed to write index: {e}"));
        self.writer.write_all(&summary).map_err(io)?;
        self.writer.seek(SeekFrom::Start(0)).map_err(io)?;
        self.writer.write_all(&header).map_err(io)?;
        self.writer.flush().map_err(io)?;

        self.is_open = false;
        Ok(())
    }
}

impl Drop for BagWriter {
    fn drop(&mut self) {
        if self.is_open {
            warn!(path = %self.path.display(), "BagWriter dropped without calling finish()");
        }
    }
}

/// Version line plus the bag header record, padded to 4096 bytes.
fn file_header(conn_count: u32, chunk_count: u32, index_pos: u64) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(FILE_HEADER_SIZE);
    buffer.extend_from_slice(VERSION_LINE.as_bytes());
    RecordHeader::op(OP_BAG_HEADER)
        .u64("index_pos", index_pos)
        .u32("conn_count", conn_count)
        .u32("chunk_count", chunk_count)
        .write_to(&mut buffer)?;
    let padding = FILE_HEADER_SIZE - buffer.len() - 4;
    buffer.write_u32::<LittleEndian>(padding as u32)?;
    buffer.resize(FILE_HEADER_SIZE, b' ');
    Ok(buffer)
}

fn connection_record(conn: &Connection, buffer: &mut Vec<u8>) -> std::io::Result<()> {
    RecordHeader::op(OP_CONNECTION)
        .u32("conn", conn.id)
        .bytes("topic", conn.topic.as_bytes())
        .write_to(buffer)?;

    RecordHeader::default()
        .bytes("type", conn.message_type.as_bytes())
        .bytes("md5sum", b"00000000000000000000000000000000")
        .bytes("message_definition", conn.message_definition.as_bytes())
        .bytes("callerid", conn.caller_id.as_bytes())
        .bytes("latching", b"0")
        .write_to(buffer)
}

fn index_record(conn_id: u32, entries: &[IndexEntry], buffer: &mut Vec<u8>) -> std::io::Result<()> {
    RecordHeader::op(OP_INDEX_DATA)
        .u32("ver", INDEX_VERSION)
        .u32("conn", conn_id)
        .u32("count", entries.len() as u32)
        .write_to(buffer)?;
    buffer.write_u32::<LittleEndian>((entries.len() * 12) as u32)?;
    for entry in entries {
        buffer.write_u32::<LittleEndian>(entry.time.0)?;
        buffer.write_u32::<LittleEndian>(entry.time.1)?;
        buffer.write_u32::<LittleEndian>(entry.offset)?;
    }
    Ok(())
}

fn chunk_info_record(chunk: &ChunkInfo, buffer: &mut Vec<u8>) -> std::io::Result<()> {
    RecordHeader::op(OP_CHUNK_INFO)
        .u32("ver", CHUNK_INFO_VERSION)
        .u64("chunk_pos", chunk.pos)
        .time("start_time", chunk.start_time)
        .time("end_time", chunk.end_time)
        .u32("count", chunk.counts.len() as u32)
        .write_to(buffer)?;
    buffer.write_u32::<LittleEndian>((chunk.counts.len() * 8) as u32)?;
    for (conn_id, count) in &chunk.counts {
        buffer.write_u32::<LittleEndian>(*conn_id)?;
        buffer.write_u32::<LittleEndian>(*count)?;
    }
    Ok(())
}

/// Convert nanoseconds to (sec, nsec).
fn ns_to_time(ns: u64) -> (u32, u32) {
    ((ns / 1_000_000_000) as u32, (ns % 1_000_000_000) as u32)
}
