use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;

use engine_logging::{engine_info, engine_warn};
use rand::Rng;
use searchinator_core::{build_queue, CheckpointSet, EngineCatalog, EngineId, WorkQueue};

/// Reads the query file of every selected engine and builds the shuffled queue.
///
/// `filter` of `None` selects every engine. Missing or unreadable query files
/// are logged and that engine is skipped.
pub fn load_queue<R: Rng + ?Sized>(
    catalog: &EngineCatalog,
    filter: Option<&BTreeSet<EngineId>>,
    completed: &CheckpointSet,
    rng: &mut R,
) -> WorkQueue {
    let mut sources: Vec<(EngineId, String)> = Vec::new();
    for (id, config) in catalog.iter() {
        if filter.is_some_and(|selected| !selected.contains(id)) {
            continue;
        }
        match fs::read_to_string(&config.query_file) {
            Ok(text) => sources.push((id.clone(), text)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                engine_warn!("Missing query file: {}", config.query_file.display());
            }
            Err(err) => {
                engine_warn!(
                    "Failed to read query file {}: {}",
                    config.query_file.display(),
                    err
                );
            }
        }
    }

    let queue = build_queue(
        sources.iter().map(|(id, text)| (id.clone(), text.as_str())),
        completed,
        rng,
    );
    engine_info!("Queued up {} queries", queue.len());
    queue
}
