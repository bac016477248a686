use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_warn};
use searchinator_core::{CheckpointSet, EngineCatalog, EngineId, ResultRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::persist::{write_atomically, PersistError};

/// Durable set of completed queries.
///
/// `save` replaces the whole persisted state, so implementations only need
/// whole-object atomicity.
pub trait CheckpointStore: Send + Sync {
    /// Never fails: missing or unreadable state loads as empty.
    fn load(&self) -> CheckpointSet;

    fn save(&self, completed: &CheckpointSet) -> Result<(), PersistError>;
}

/// Durable per-engine list of result records.
pub trait ResultSink: Send + Sync {
    fn append(&self, engine: &EngineId, record: ResultRecord) -> Result<(), PersistError>;
}

/// Checkpoint kept as a pretty-printed, sorted JSON array.
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> CheckpointSet {
        read_json_or_default(&self.path, "checkpoint")
    }

    fn save(&self, completed: &CheckpointSet) -> Result<(), PersistError> {
        write_json(&self.path, completed)
    }
}

/// One JSON array of `{query, results}` records per engine.
#[derive(Debug, Clone, Default)]
pub struct JsonResultAccumulator {
    files: BTreeMap<EngineId, PathBuf>,
}

impl JsonResultAccumulator {
    pub fn new(files: BTreeMap<EngineId, PathBuf>) -> Self {
        Self { files }
    }

    pub fn from_catalog(catalog: &EngineCatalog) -> Self {
        Self::new(
            catalog
                .iter()
                .map(|(id, config)| (id.clone(), config.result_file.clone()))
                .collect(),
        )
    }

    /// Current records for `engine`; empty if the file is missing or corrupt.
    pub fn load(&self, engine: &EngineId) -> Result<Vec<ResultRecord>, PersistError> {
        let path = self.file_for(engine)?;
        Ok(read_json_or_default(path, "result file"))
    }

    fn file_for(&self, engine: &EngineId) -> Result<&Path, PersistError> {
        self.files
            .get(engine)
            .map(PathBuf::as_path)
            .ok_or_else(|| PersistError::UnknownEngine(engine.to_string()))
    }
}

impl ResultSink for JsonResultAccumulator {
    fn append(&self, engine: &EngineId, record: ResultRecord) -> Result<(), PersistError> {
        let path = self.file_for(engine)?;
        let mut records: Vec<ResultRecord> = read_json_or_default(path, "result file");
        records.push(record);
        write_json(path, &records)?;
        engine_debug!("{} now holds {} records", path.display(), records.len());
        Ok(())
    }
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return T::default(),
        Err(err) => {
            engine_warn!("Failed to read {} {:?}: {}; starting fresh", what, path, err);
            return T::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(err) => {
            engine_warn!("{} {:?} is corrupted ({}); starting fresh", what, path, err);
            T::default()
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let content = serde_json::to_string_pretty(value)?;
    write_atomically(path, &content)
}
