// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Topic filtering for the transform engine.

use std::collections::HashSet;

/// Filter for selecting topics while streaming a bag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TopicFilter {
    /// Read all topics (no filtering)
    #[default]
    All,
    /// Read only the listed topics; an empty list matches nothing
    Include(Vec<String>),
}

impl TopicFilter {
    /// Check if a topic should be included.
    pub fn should_include(&self, topic: &str) -> bool {
        match self {
            TopicFilter::All => true,
            TopicFilter::Include(topics) => topics.iter().any(|t| t == topic),
        }
    }

    /// Create an include filter from topic names.
    pub fn include(topics: Vec<String>) -> Self {
        Self::Include(topics)
    }

    /// The listed topics, or `None` for `All`.
    pub fn topics(&self) -> Option<&[String]> {
        match self {
            TopicFilter::All => None,
            TopicFilter::Include(topics) => Some(topics),
        }
    }

    /// Listed topics that are not in `available`.
    pub fn missing_from<'a>(&'a self, available: &HashSet<&str>) -> Vec<&'a str> {
        self.topics()
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .filter(|t| !available.contains(t))
            .collect()
    }
}
