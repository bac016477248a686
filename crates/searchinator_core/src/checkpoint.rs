use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Query strings that are done, regardless of which engine processed them.
///
/// Serializes as a sorted array so rewritten files diff cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckpointSet {
    queries: BTreeSet<String>,
}

impl CheckpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a query as done. Returns `false` if it already was.
    pub fn insert(&mut self, query: impl Into<String>) -> bool {
        self.queries.insert(query.into())
    }

    pub fn contains(&self, query: &str) -> bool {
        self.queries.contains(query)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Iterates in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queries.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CheckpointSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            queries: iter.into_iter().map(Into::into).collect(),
        }
    }
}
