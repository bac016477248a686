use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

use crate::EngineId;

/// Marker replaced by the encoded query in an engine's URL template.
pub const QUERY_PLACEHOLDER: &str = "{query}";

const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("url template {0:?} has no {{query}} placeholder")]
    MissingPlaceholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("engine catalog is empty")]
    Empty,
    #[error("engine {engine}: {source}")]
    Template {
        engine: EngineId,
        #[source]
        source: TemplateError,
    },
    #[error("engine {engine}: link selector is empty")]
    EmptySelector { engine: EngineId },
    #[error("unknown engine {0:?}")]
    UnknownEngine(String),
}

/// Static description of one search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Display name used in log lines.
    pub name: String,
    pub query_file: PathBuf,
    pub result_file: PathBuf,
    /// Search URL containing `{query}`.
    pub url_template: String,
    /// CSS selector matching the result anchors.
    pub link_selector: String,
    /// Optional CSS selector to wait for before extraction.
    #[serde(default)]
    pub wait_for: Option<String>,
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
}

fn default_wait_timeout_ms() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

impl EngineConfig {
    /// Interpolates the form-encoded query into the URL template.
    pub fn render_url(&self, query: &str) -> Result<String, TemplateError> {
        if !self.url_template.contains(QUERY_PLACEHOLDER) {
            return Err(TemplateError::MissingPlaceholder(self.url_template.clone()));
        }
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        Ok(self.url_template.replace(QUERY_PLACEHOLDER, &encoded))
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

/// The configured engines, keyed and iterated in id order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineCatalog {
    engines: BTreeMap<EngineId, EngineConfig>,
}

impl EngineCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bing and DuckDuckGo with their conventional file names.
    pub fn builtin(queries_dir: &Path, scraped_dir: &Path) -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            EngineId::from("bing"),
            EngineConfig {
                name: "Bing".to_string(),
                query_file: queries_dir.join("bing_search_queries.txt"),
                result_file: scraped_dir.join("bing_results.json"),
                url_template: "https://www.bing.com/search?q={query}".to_string(),
                link_selector: "li.b_algo a".to_string(),
                wait_for: None,
                wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            },
        );
        catalog.insert(
            EngineId::from("duckduckgo"),
            EngineConfig {
                name: "DuckDuckGo".to_string(),
                query_file: queries_dir.join("duckduckgo_search_queries.txt"),
                result_file: scraped_dir.join("duckduckgo_results.json"),
                // Script-free endpoint; the main site fills results in client side.
                url_template: "https://html.duckduckgo.com/html/?q={query}".to_string(),
                link_selector: "a.result__a".to_string(),
                wait_for: None,
                wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            },
        );
        catalog
    }

    pub fn insert(&mut self, id: EngineId, config: EngineConfig) {
        self.engines.insert(id, config);
    }

    pub fn get(&self, id: &EngineId) -> Option<&EngineConfig> {
        self.engines.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EngineId, &EngineConfig)> {
        self.engines.iter()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Looks up an engine by its textual id.
    pub fn resolve(&self, id: &str) -> Result<EngineId, CatalogError> {
        let id = EngineId::from(id);
        if self.engines.contains_key(&id) {
            Ok(id)
        } else {
            Err(CatalogError::UnknownEngine(id.to_string()))
        }
    }

    /// Makes relative query and result paths relative to `base`.
    pub fn rebase(mut self, base: &Path) -> Self {
        for config in self.engines.values_mut() {
            if config.query_file.is_relative() {
                config.query_file = base.join(&config.query_file);
            }
            if config.result_file.is_relative() {
                config.result_file = base.join(&config.result_file);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.engines.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (id, config) in &self.engines {
            if !config.url_template.contains(QUERY_PLACEHOLDER) {
                return Err(CatalogError::Template {
                    engine: id.clone(),
                    source: TemplateError::MissingPlaceholder(config.url_template.clone()),
                });
            }
            if config.link_selector.trim().is_empty() {
                return Err(CatalogError::EmptySelector { engine: id.clone() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bing() -> EngineConfig {
        EngineCatalog::builtin(Path::new("q"), Path::new("s"))
            .get(&EngineId::from("bing"))
            .cloned()
            .unwrap()
    }

    #[test]
    fn render_url_form_encodes_query() {
        let url = bing().render_url("nursery schools in Leeds & more").unwrap();
        assert_eq!(
            url,
            "https://www.bing.com/search?q=nursery+schools+in+Leeds+%26+more"
        );
    }

    #[test]
    fn render_url_requires_placeholder() {
        let mut config = bing();
        config.url_template = "https://example.com/search".into();
        assert!(matches!(
            config.render_url("x"),
            Err(TemplateError::MissingPlaceholder(_))
        ));
    }

    #[test]
    fn builtin_catalog_validates() {
        let catalog = EngineCatalog::builtin(Path::new("q"), Path::new("s"));
        assert_eq!(catalog.len(), 2);
        catalog.validate().unwrap();
        let ddg = catalog.get(&EngineId::from("duckduckgo")).unwrap();
        assert_eq!(ddg.wait_timeout(), Duration::from_secs(10));
        assert!(ddg.url_template.starts_with("https://html.duckduckgo.com/html/"));
        assert_eq!(ddg.link_selector, "a.result__a");
        assert!(catalog.get(&EngineId::from("bing")).unwrap().wait_for.is_none());
    }

    #[test]
    fn rebase_only_touches_relative_paths() {
        let mut catalog = EngineCatalog::new();
        let mut config = bing();
        config.query_file = PathBuf::from("queries/a.txt");
        config.result_file = std::env::temp_dir().join("a.json");
        catalog.insert(EngineId::from("a"), config);

        let catalog = catalog.rebase(Path::new("/data"));
        let config = catalog.get(&EngineId::from("a")).unwrap();
        assert_eq!(config.query_file, Path::new("/data").join("queries/a.txt"));
        assert_eq!(config.result_file, std::env::temp_dir().join("a.json"));
    }

    #[test]
    fn resolve_rejects_unknown_engine() {
        let catalog = EngineCatalog::builtin(Path::new("q"), Path::new("s"));
        assert_eq!(catalog.resolve("bing").unwrap(), EngineId::from("bing"));
        assert_eq!(
            catalog.resolve("google"),
            Err(CatalogError::UnknownEngine("google".into()))
        );
    }
}
