use std::collections::BTreeSet;
use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::Parser;
use searchinator_core::{DelayRange, EngineCatalog};
use searchinator_engine::{LaunchMode, RetryPolicy, RunSettings};

/// Run search queries on Bing & DuckDuckGo, resuming where the last run stopped.
#[derive(Debug, Parser)]
#[command(name = "searchinator", version)]
pub struct Cli {
    /// Only run this engine (defaults to all configured engines).
    #[arg(long, value_name = "ID")]
    pub engine: Option<String>,

    /// Ask the rendering backend to run visibly.
    #[arg(long)]
    pub no_headless: bool,

    /// How many times to try each query before giving up.
    #[arg(long, default_value = "3")]
    pub retries: NonZeroU32,

    /// Min seconds to wait between queries.
    #[arg(long, default_value_t = 1.0)]
    pub pause_min: f64,

    /// Max seconds to wait between queries.
    #[arg(long, default_value_t = 3.0)]
    pub pause_max: f64,

    /// Min seconds to wait before a retry (defaults to --pause-min).
    #[arg(long)]
    pub backoff_min: Option<f64>,

    /// Max seconds to wait before a retry (defaults to --pause-max).
    #[arg(long)]
    pub backoff_max: Option<f64>,

    /// Root holding queries/ and scraped_data/.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// RON file replacing the built-in engine catalog.
    #[arg(long, value_name = "FILE")]
    pub engines: Option<PathBuf>,

    /// Seed for queue order, identities and delays.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn run_settings(&self, catalog: &EngineCatalog) -> anyhow::Result<RunSettings> {
        let engine_filter = match self.engine.as_deref() {
            Some(id) => Some(BTreeSet::from([catalog.resolve(id)?])),
            None => None,
        };
        let pacing = DelayRange::from_secs(self.pause_min, self.pause_max)?;
        let backoff = DelayRange::from_secs(
            self.backoff_min.unwrap_or(self.pause_min),
            self.backoff_max.unwrap_or(self.pause_max),
        )?;
        Ok(RunSettings {
            engine_filter,
            launch_mode: if self.no_headless {
                LaunchMode::Visible
            } else {
                LaunchMode::Headless
            },
            retry: RetryPolicy::new(self.retries, backoff),
            pacing,
        })
    }
}
