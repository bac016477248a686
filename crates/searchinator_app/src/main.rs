mod cli;
mod config;
mod signal;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use engine_logging::{engine_error, engine_info, engine_warn, LogDestination};
use searchinator_engine::{
    HttpLauncher, JsonCheckpointStore, JsonResultAccumulator, Orchestrator, RunReport,
};

use crate::cli::Cli;
use crate::config::{load_catalog, DataDirs};
use crate::signal::relay_interrupts;

/// Exit status after an operator interrupt.
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let dirs = match DataDirs::prepare(&cli.data_dir) {
        Ok(dirs) => dirs,
        Err(err) => {
            engine_logging::initialize_run_log(LogDestination::Terminal, cli.verbose);
            engine_error!("Data directory {}: {err}", cli.data_dir.display());
            return ExitCode::FAILURE;
        }
    };
    engine_logging::initialize_run_log(LogDestination::Both(dirs.run_log()), cli.verbose);

    match run(&cli, &dirs).await {
        Ok(report) if report.cancelled => ExitCode::from(EXIT_CANCELLED),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("Run aborted: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, dirs: &DataDirs) -> anyhow::Result<RunReport> {
    let catalog = load_catalog(cli.engines.as_deref(), dirs)?;
    let settings = cli.run_settings(&catalog)?;

    let checkpoints = Arc::new(JsonCheckpointStore::new(dirs.checkpoint_file()));
    let results = Arc::new(JsonResultAccumulator::from_catalog(&catalog));
    let mut orchestrator = Orchestrator::new(
        catalog,
        settings,
        checkpoints,
        results,
        Arc::new(HttpLauncher::default()),
    );
    if let Some(seed) = cli.seed {
        engine_info!("Using seed {}", seed);
        orchestrator = orchestrator.with_seed(seed);
    }

    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if relay_interrupts(token, tokio::signal::ctrl_c).await {
            engine_warn!("Second interrupt received; exiting without finishing the current query");
            log::logger().flush();
            std::process::exit(EXIT_CANCELLED.into());
        }
    });

    Ok(orchestrator.run().await?)
}
