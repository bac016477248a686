use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of a configured search engine, e.g. `bing`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineId(String);

impl EngineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EngineId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One (engine, query) pair to be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryUnit {
    engine: EngineId,
    query: String,
}

impl QueryUnit {
    pub fn new(engine: EngineId, query: impl Into<String>) -> Self {
        Self {
            engine,
            query: query.into(),
        }
    }

    pub fn engine(&self) -> &EngineId {
        &self.engine
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// One line of an engine's result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub query: String,
    pub results: Vec<String>,
}

impl ResultRecord {
    pub fn new(query: impl Into<String>, results: Vec<String>) -> Self {
        Self {
            query: query.into(),
            results,
        }
    }
}

/// Terminal result of driving one unit through the rendering backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Extraction succeeded; an empty list is still a success.
    Success(Vec<String>),
    /// Every attempt failed; carries the last error message.
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}
