// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sequential ROS1 bag reader built on the rosbag crate.
//!
//! Records are visited in stream order: chunk by chunk, and within a chunk
//! in the order they were written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rosbag::{ChunkRecord, IndexRecord, MessageRecord, RosBag};

use crate::core::{Error, Result};

/// Connection metadata from a bag file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagConnection {
    /// Connection ID as stored in the bag
    pub id: u32,
    /// Topic name (e.g., "/hotel/a2d2")
    pub topic: String,
    /// Message type (e.g., "ds_hotel_msgs/A2D2")
    pub message_type: String,
    /// Full message definition text with dependency blocks
    pub message_definition: String,
    /// Publishing node, if recorded
    pub caller_id: Option<String>,
}

/// One message record, borrowed from the open bag.
#[derive(Debug, Clone, Copy)]
pub struct BagRecord<'a> {
    /// The connection this record was written on
    pub connection: &'a BagConnection,
    /// Receive time in nanoseconds since the Unix epoch
    pub time_ns: u64,
    /// ROS1 serialized message bytes
    pub data: &'a [u8],
}

/// Sequential reader over one bag file.
///
/// The underlying file mapping is released when the reader is dropped.
pub struct BagReader {
    path: PathBuf,
    bag: RosBag,
    connections: BTreeMap<u32, BagConnection>,
}

impl BagReader {
    /// Open a bag and collect its connections.
    ///
    /// Connections come from the index section. Chunks are scanned for
    /// connection records only when the index lists none.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bag = RosBag::new(&path)
            .map_err(|e| Error::bag(&path, format!("Failed to open bag: {e}")))?;

        let mut connections = BTreeMap::new();

        for record in bag.index_records() {
            let record =
                record.map_err(|e| Error::bag(&path, format!("Failed to read index: {e}")))?;
            if let IndexRecord::Connection(conn) = record {
                connections.entry(conn.id).or_insert_with(|| BagConnection {
                    id: conn.id,
                    topic: conn.topic.to_string(),
                    message_type: conn.tp.to_string(),
                    message_definition: conn.message_definition.to_string(),
                    caller_id: non_empty(conn.caller_id),
                });
            }
        }

        if connections.is_empty() {
            connections = scan_chunk_connections(&bag, &path)?;
        }

        Ok(Self {
            path,
            bag,
            connections,
        })
    }

    /// Get the bag file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get all connections, ordered by ID.
    pub fn connections(&self) -> impl Iterator<Item = &BagConnection> {
        self.connections.values()
    }

    /// Look up a connection by ID.
    pub fn connection(&self, id: u32) -> Option<&BagConnection> {
        self.connections.get(&id)
    }

    /// Visit every message record in stream order.
    ///
    /// Records on unknown connections are skipped. An error returned by
    /// `visit` stops the walk and is passed through.
    pub fn for_each_record<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(BagRecord<'_>) -> Result<()>,
    {
        for record in self.bag.chunk_records() {
            let record = record
                .map_err(|e| Error::bag(&self.path, format!("Failed to read chunk: {e}")))?;
            let ChunkRecord::Chunk(chunk) = record else {
                continue;
            };
            for msg in chunk.messages() {
                let msg = msg.map_err(|e| {
                    Error::bag(&self.path, format!("Failed to read message: {e}"))
                })?;
                let MessageRecord::MessageData(msg) = msg else {
                    continue;
                };
                let Some(connection) = self.connections.get(&msg.conn_id) else {
                    continue;
                };
                visit(BagRecord {
                    connection,
                    time_ns: msg.time,
                    data: msg.data,
                })?;
            }
        }
        Ok(())
    }

    /// Count records per topic.
    pub fn topic_counts(&self) -> Result<BTreeMap<String, u64>> {
        let mut counts = BTreeMap::new();
        self.for_each_record(|record| {
            *counts.entry(record.connection.topic.clone()).or_insert(0) += 1;
            Ok(())
        })?;
        Ok(counts)
    }
}

/// Collect connection records stored inside chunks, for bags whose index
/// section lists no connections.
fn scan_chunk_connections(bag: &RosBag, path: &Path) -> Result<BTreeMap<u32, BagConnection>> {
    let mut connections = BTreeMap::new();
    for record in bag.chunk_records() {
        let record =
            record.map_err(|e| Error::bag(path, format!("Failed to read chunk: {e}")))?;
        let ChunkRecord::Chunk(chunk) = record else {
            continue;
        };
        for msg in chunk.messages() {
            let msg =
                msg.map_err(|e| Error::bag(path, format!("Failed to read message: {e}")))?;
            if let MessageRecord::Connection(conn) = msg {
                connections.entry(conn.id).or_insert_with(|| BagConnection {
                    id: conn.id,
                    topic: conn.topic.to_string(),
                    message_type: conn.tp.to_string(),
                    message_definition: conn.message_definition.to_string(),
                    caller_id: non_empty(conn.caller_id),
                });
            }
        }
    }
    Ok(connections)
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
