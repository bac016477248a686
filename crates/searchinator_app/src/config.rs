//! Data directory layout and engine catalog loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use engine_logging::engine_info;
use searchinator_core::EngineCatalog;
use searchinator_engine::{ensure_dir, PersistError};
use serde::Deserialize;

const CHECKPOINT_FILENAME: &str = "completed_queries.json";
const RUN_LOG_FILENAME: &str = "search_log.txt";

/// Directories under the data root; created on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDirs {
    pub root: PathBuf,
    pub queries: PathBuf,
    pub scraped: PathBuf,
}

impl DataDirs {
    pub fn prepare(root: &Path) -> Result<Self, PersistError> {
        let dirs = Self {
            root: root.to_path_buf(),
            queries: root.join("queries"),
            scraped: root.join("scraped_data"),
        };
        ensure_dir(&dirs.queries)?;
        ensure_dir(&dirs.scraped)?;
        Ok(dirs)
    }

    pub fn checkpoint_file(&self) -> PathBuf {
        self.scraped.join(CHECKPOINT_FILENAME)
    }

    pub fn run_log(&self) -> PathBuf {
        self.scraped.join(RUN_LOG_FILENAME)
    }
}

/// On-disk shape of an engine catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    engines: EngineCatalog,
}

/// Loads the catalog from a RON file, or returns the built-in one.
///
/// Relative query and result paths in the file resolve against the data root.
pub fn load_catalog(file: Option<&Path>, dirs: &DataDirs) -> anyhow::Result<EngineCatalog> {
    let catalog = match file {
        None => EngineCatalog::builtin(&dirs.queries, &dirs.scraped),
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading engine catalog {}", path.display()))?;
            let parsed: CatalogFile = ron::from_str(&text)
                .with_context(|| format!("parsing engine catalog {}", path.display()))?;
            engine_info!("Loaded {} engines from {}", parsed.engines.len(), path.display());
            parsed.engines.rebase(&dirs.root)
        }
    };
    catalog.validate()?;
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchinator_core::EngineId;
    use tempfile::TempDir;

    #[test]
    fn prepare_creates_layout() {
        let temp = TempDir::new().unwrap();
        let dirs = DataDirs::prepare(&temp.path().join("data")).unwrap();
        assert!(dirs.queries.is_dir());
        assert!(dirs.scraped.is_dir());
        assert_eq!(
            dirs.checkpoint_file(),
            temp.path().join("data/scraped_data/completed_queries.json")
        );
    }

    #[test]
    fn builtin_catalog_lives_under_data_dirs() {
        let temp = TempDir::new().unwrap();
        let dirs = DataDirs::prepare(temp.path()).unwrap();
        let catalog = load_catalog(None, &dirs).unwrap();
        let bing = catalog.get(&EngineId::from("bing")).unwrap();
        assert_eq!(bing.query_file, dirs.queries.join("bing_search_queries.txt"));
        assert_eq!(bing.result_file, dirs.scraped.join("bing_results.json"));
    }

    #[test]
    fn ron_catalog_replaces_builtin() {
        let temp = TempDir::new().unwrap();
        let dirs = DataDirs::prepare(temp.path()).unwrap();
        let file = temp.path().join("engines.ron");
        fs::write(
            &file,
            r#"(
                engines: {
                    "mojeek": (
                        name: "Mojeek",
                        query_file: "queries/mojeek.txt",
                        result_file: "scraped_data/mojeek.json",
                        url_template: "https://www.mojeek.com/search?q={query}",
                        link_selector: "ul.results-standard a.ob",
                    ),
                },
            )"#,
        )
        .unwrap();

        let catalog = load_catalog(Some(&file), &dirs).unwrap();
        assert_eq!(catalog.len(), 1);
        let mojeek = catalog.get(&EngineId::from("mojeek")).unwrap();
        assert_eq!(mojeek.query_file, temp.path().join("queries/mojeek.txt"));
        assert_eq!(mojeek.wait_for, None);
        assert_eq!(mojeek.wait_timeout_ms, 10_000);
    }

    #[test]
    fn catalog_without_placeholder_is_rejected() {
        let temp = TempDir::new().unwrap();
        let dirs = DataDirs::prepare(temp.path()).unwrap();
        let file = temp.path().join("engines.ron");
        fs::write(
            &file,
            r#"(engines: {"x": (name: "X", query_file: "q", result_file: "r",
                url_template: "https://x.example/", link_selector: "a")})"#,
        )
        .unwrap();
        assert!(load_catalog(Some(&file), &dirs).is_err());
    }
}
