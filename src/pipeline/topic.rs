// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-topic state of a transform run.

use crate::extract::{ExtractedRecord, RECORD_WIDTH};
use crate::store::Dataset;

use crate::core::Result;

/// Store-safe dataset name for a topic.
///
/// Leading and trailing `/` are stripped and inner `/` become `_`:
/// `/hotel/a2d2` is `hotel_a2d2`.
pub fn topic_key(topic: &str) -> String {
    topic.trim_matches('/').replace('/', "_")
}

/// Dataset, pending rows and ordering state of one topic key.
#[derive(Debug)]
pub struct TopicState {
    /// Topic that first produced this key
    pub topic: String,
    dataset: Dataset,
    buffer: Vec<ExtractedRecord>,
    count: u64,
    last_timestamp: f64,
}

impl TopicState {
    /// Start tracking a topic with its output dataset.
    pub fn new(topic: impl Into<String>, dataset: Dataset, capacity: usize) -> Self {
        Self {
            topic: topic.into(),
            dataset,
            buffer: Vec::with_capacity(capacity),
            count: 0,
            last_timestamp: f64::NEG_INFINITY,
        }
    }

    /// Record the timestamp of the next record.
    ///
    /// Returns the previous timestamp when `timestamp` moves backwards. The
    /// last-seen timestamp is updated either way.
    pub fn observe(&mut self, timestamp: f64) -> Option<f64> {
        let previous = self.last_timestamp;
        self.last_timestamp = timestamp;
        (timestamp < previous).then_some(previous)
    }

    /// Buffer a record. Returns the buffered length.
    pub fn push(&mut self, record: ExtractedRecord) -> usize {
        self.buffer.push(record);
        self.count += 1;
        self.buffer.len()
    }

    /// Append buffered records to the dataset as one batch and clear the
    /// buffer. Returns the number of rows written; an empty buffer writes
    /// nothing.
    pub fn flush(&mut self) -> Result<usize> {
        if self.buffer.is_empty() {
            return Ok(0);
        }
        let mut batch = Vec::with_capacity(self.buffer.len() * RECORD_WIDTH);
        for record in &self.buffer {
            batch.extend_from_slice(record.values());
        }
        let written = self.dataset.append_rows(&batch)?;
        self.buffer.clear();
        Ok(written)
    }

    /// Records accepted this run.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Records waiting for the next flush.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Output dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ArrayStore, DatasetSpec, OpenMode};
    use crate::test_util::{temp_dir, CleanupGuard};

    #[test]
    fn test_topic_key() {
        assert_eq!(topic_key("/a/b/c"), "a_b_c");
        assert_eq!(topic_key("a"), "a");
        assert_eq!(topic_key("/hotel/a2d2/"), "hotel_a2d2");
        assert_eq!(topic_key("//x"), "x");
        assert_eq!(topic_key("/"), "");
        assert_eq!(topic_key("//"), "");
    }

    fn temp_state(name: &str) -> (CleanupGuard, TopicState) {
        let (root, guard) = temp_dir(name);
        let store = ArrayStore::open(root.join("out.zarr"), OpenMode::Overwrite).unwrap();
        let dataset = store
            .create_dataset("t", DatasetSpec::new(RECORD_WIDTH, 4))
            .unwrap();
        (guard, TopicState::new("/t", dataset, 4))
    }

    #[test]
    fn test_observe_reports_disorder() {
        let (_guard, mut state) = temp_state("topic_observe");
        assert_eq!(state.observe(1.0), None);
        assert_eq!(state.observe(2.0), None);
        assert_eq!(state.observe(0.5), Some(2.0));
        assert_eq!(state.observe(3.0), None);
        assert_eq!(state.observe(3.0), None);
    }

    #[test]
    fn test_empty_flush_leaves_dataset_unchanged() {
        let (_guard, mut state) = temp_state("topic_empty_flush");
        assert_eq!(state.flush().unwrap(), 0);
        assert_eq!(state.dataset().len(), 0);
    }

    #[test]
    fn test_flush_appends_in_order() {
        let (_guard, mut state) = temp_state("topic_flush");
        state.push(ExtractedRecord::from_timestamp(1.0));
        state.push(ExtractedRecord::from_timestamp(2.0));
        assert_eq!(state.buffered(), 2);
        assert_eq!(state.flush().unwrap(), 2);
        assert_eq!(state.buffered(), 0);
        assert_eq!(state.count(), 2);

        let rows = state.dataset().read_all().unwrap();
        assert_eq!(rows.len(), 2 * RECORD_WIDTH);
        assert_eq!(rows[0], 1.0);
        assert_eq!(rows[RECORD_WIDTH], 2.0);
    }
}
