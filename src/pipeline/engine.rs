// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The transform engine.
//!
//! One pass over a bag in stream order. Each record that passes the topic
//! filter is decoded, reduced to a fixed-width row and buffered under its
//! topic key; full buffers are appended to the key's dataset. Decode and
//! extraction failures, and topics whose key cannot name a dataset, skip
//! the record and are counted, never fatal. Store and bag I/O errors end
//! the run.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::core::{Error, Result};
use crate::encoding::Ros1Decoder;
use crate::extract::{extract, FieldSet, RECORD_WIDTH};
use crate::io::{BagConnection, BagReader, BagRecord, TopicFilter};
use crate::pipeline::progress::Progress;
use crate::pipeline::topic::{topic_key, TopicState};
use crate::pipeline::{TransformOptions, TransformStats};
use crate::schema::SchemaRegistry;
use crate::store::{is_valid_dataset_name, ArrayStore, Dataset, DatasetSpec, OpenMode};

/// Streams bags into an array store.
///
/// Definitions embedded in the bag's connection records are added to the
/// registry as connections are first used, so a registry shared across
/// several runs accumulates their types.
pub struct Transformer<'r> {
    registry: &'r SchemaRegistry,
    decoder: Ros1Decoder,
    options: TransformOptions,
}

impl<'r> Transformer<'r> {
    /// Create a transformer. A zero chunk size is rejected here, before
    /// anything touches the filesystem.
    pub fn new(registry: &'r SchemaRegistry, options: TransformOptions) -> Result<Self> {
        if options.chunk_size == 0 {
            return Err(Error::invalid_argument(
                "chunk_size",
                "must be at least 1",
            ));
        }
        Ok(Self {
            registry,
            decoder: Ros1Decoder::new(),
            options,
        })
    }

    /// Get the options used for this transformer.
    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Convert `input` into the store at `output`, keeping only topics
    /// accepted by `filter`.
    pub fn run(&self, input: &Path, output: &Path, filter: &TopicFilter) -> Result<TransformStats> {
        let store = ArrayStore::open(output, OpenMode::from_append(self.options.append))?;
        let reader = BagReader::open(input)?;

        let available: HashSet<&str> = reader.connections().map(|c| c.topic.as_str()).collect();
        for topic in filter.missing_from(&available) {
            warn!(input = %input.display(), topic, "Configured topic not found in bag");
        }

        info!(
            input = %input.display(),
            output = %output.display(),
            append = self.options.append,
            chunk_size = self.options.chunk_size,
            fields = %self.options.field_set,
            "Starting conversion"
        );

        let label = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let progress = Progress::new(self.options.progress, &label);

        let mut run = Run {
            registry: self.registry,
            decoder: &self.decoder,
            options: &self.options,
            store: &store,
            topics: BTreeMap::new(),
            seen_topics: HashSet::new(),
            registered: HashSet::new(),
            stats: TransformStats::new(),
        };
        reader.for_each_record(|record| {
            progress.tick();
            run.handle(filter, record)
        })?;
        let stats = run.finish()?;

        progress.finish_with_message(format!("{} records stored", stats.total_records()));
        for (key, count) in &stats.counts {
            info!(dataset = %key, count, "Topic converted");
        }
        info!(
            input = %input.display(),
            records_read = stats.records_read,
            stored = stats.total_records(),
            filtered_out = stats.filtered_out,
            decode_failures = stats.decode_failures,
            extract_failures = stats.extract_failures,
            invalid_topic_keys = stats.invalid_topic_keys,
            disorder_warnings = stats.disorder_warnings,
            datasets = stats.counts.len(),
            "Conversion complete"
        );
        Ok(stats)
    }
}

/// Mutable state of one run.
struct Run<'a> {
    registry: &'a SchemaRegistry,
    decoder: &'a Ros1Decoder,
    options: &'a TransformOptions,
    store: &'a ArrayStore,
    topics: BTreeMap<String, TopicState>,
    /// Topics that produced a record
    seen_topics: HashSet<String>,
    /// Connections whose definitions were offered to the registry
    registered: HashSet<u32>,
    stats: TransformStats,
}

impl Run<'_> {
    fn handle(&mut self, filter: &TopicFilter, record: BagRecord<'_>) -> Result<()> {
        self.stats.records_read += 1;
        let connection = record.connection;
        if !filter.should_include(&connection.topic) {
            self.stats.filtered_out += 1;
            return Ok(());
        }

        let key = topic_key(&connection.topic);
        if !is_valid_dataset_name(&key) {
            warn!(
                topic = %connection.topic,
                dataset = %key,
                "Topic has no usable dataset name, skipping"
            );
            self.stats.invalid_topic_keys += 1;
            return Ok(());
        }

        self.register_connection(connection);

        let message = match self
            .decoder
            .decode(self.registry, &connection.message_type, record.data)
        {
            Ok(message) => message,
            Err(e) if e.is_decode_error() => {
                warn!(
                    topic = %connection.topic,
                    message_type = %connection.message_type,
                    error = %e,
                    "Failed to decode message, skipping"
                );
                self.stats.decode_failures += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let row = match extract(&message, self.options.field_set) {
            Ok(row) => row,
            Err(e) => {
                warn!(
                    topic = %connection.topic,
                    message_type = %connection.message_type,
                    field = e.path(),
                    error = %e,
                    "Failed to extract fields, skipping"
                );
                self.stats.extract_failures += 1;
                return Ok(());
            }
        };

        let key = self.track_key(&connection.topic, key)?;
        let state = match self.topics.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let dataset = open_or_create(
                    self.store,
                    entry.key(),
                    &connection.topic,
                    self.options,
                    &mut self.stats,
                )?;
                entry.insert(TopicState::new(
                    connection.topic.clone(),
                    dataset,
                    self.options.chunk_size,
                ))
            }
        };

        let timestamp = row.timestamp();
        if let Some(previous) = state.observe(timestamp) {
            warn!(
                topic = %connection.topic,
                previous,
                timestamp,
                "Timestamp earlier than previous record on this topic"
            );
            self.stats.disorder_warnings += 1;
        }

        if state.push(row) >= self.options.chunk_size {
            let written = state.flush()?;
            debug!(dataset = state.dataset().name(), rows = written, "Flushed buffer");
        }
        Ok(())
    }

    /// Offer a connection's embedded definition to the registry once.
    fn register_connection(&mut self, connection: &BagConnection) {
        if !self.registered.insert(connection.id) || connection.message_definition.is_empty() {
            return;
        }
        match self
            .registry
            .register_definition(&connection.message_type, &connection.message_definition)
        {
            Ok(added) => debug!(
                topic = %connection.topic,
                message_type = %connection.message_type,
                added,
                "Registered connection definition"
            ),
            Err(e) => warn!(
                topic = %connection.topic,
                message_type = %connection.message_type,
                error = %e,
                "Failed to parse connection definition"
            ),
        }
    }

    /// Remember the key of a topic, detecting keys shared by distinct topics.
    fn track_key(&mut self, topic: &str, key: String) -> Result<String> {
        if self.seen_topics.contains(topic) {
            return Ok(key);
        }
        if let Some(state) = self.topics.get(&key) {
            warn!(
                topic,
                existing_topic = %state.topic,
                dataset = %key,
                "Topics share a dataset name; records will be merged"
            );
            self.stats.topic_key_collisions += 1;
            record_topic(state.dataset(), topic, self.options.field_set)?;
        }
        self.seen_topics.insert(topic.to_string());
        Ok(key)
    }

    /// Flush every buffer and collect per-key counts.
    fn finish(mut self) -> Result<TransformStats> {
        for (key, state) in &mut self.topics {
            let written = state.flush()?;
            debug!(dataset = %key, rows = written, "Flushed final buffer");
            self.stats.counts.insert(key.clone(), state.count());
        }
        Ok(self.stats)
    }
}

/// Open the key's dataset when appending to an existing one, otherwise
/// create it.
fn open_or_create(
    store: &ArrayStore,
    key: &str,
    topic: &str,
    options: &TransformOptions,
    stats: &mut TransformStats,
) -> Result<Dataset> {
    let dataset = if store.contains(key) {
        let dataset = store.open_dataset(key)?;
        if dataset.width() != RECORD_WIDTH {
            return Err(Error::store(
                dataset.path(),
                format!(
                    "existing dataset has {} columns, expected {RECORD_WIDTH}",
                    dataset.width()
                ),
            ));
        }
        info!(dataset = key, rows = dataset.len(), "Appending to existing dataset");
        dataset
    } else {
        let spec = DatasetSpec::new(RECORD_WIDTH, options.chunk_size)
            .with_compressor(options.compressor);
        let dataset = store.create_dataset(key, spec)?;
        stats.datasets_created += 1;
        info!(dataset = key, topic, "Created dataset");
        dataset
    };
    record_topic(&dataset, topic, options.field_set)?;
    Ok(dataset)
}

/// Add `topic` to the dataset's `.zattrs` topic list.
fn record_topic(dataset: &Dataset, topic: &str, field_set: FieldSet) -> Result<()> {
    let mut attrs = match dataset.attributes()? {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    if let Some(existing) = attrs.get("field_set").and_then(Value::as_str) {
        if existing != field_set.name() {
            warn!(
                dataset = dataset.name(),
                existing,
                requested = field_set.name(),
                "Dataset was written with a different field set"
            );
        }
    }

    let topics = attrs.entry("topics").or_insert_with(|| json!([]));
    match topics {
        Value::Array(list) if list.iter().any(|t| t.as_str() == Some(topic)) => return Ok(()),
        Value::Array(list) => list.push(json!(topic)),
        other => *other = json!([topic]),
    }
    attrs
        .entry("field_set")
        .or_insert_with(|| json!(field_set.name()));
    attrs
        .entry("fields")
        .or_insert_with(|| json!(field_set.labels()));
    dataset.write_attributes(&Value::Object(attrs))
}
