// Composition root for the room forecast job.
//
// Responsibilities
// - Install the tracing subscriber (stderr, RUST_LOG, default info).
// - Read flags and the DB_* environment, wire the MySQL store, the MSTL model and the system clock.
// - Translate the run result into the process exit status.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use room_forecast::adapters::clock::SystemClock;
use room_forecast::adapters::mysql::mysql_booking_store::MySqlConnector;
use room_forecast::adapters::seasonal::mstl_model::MstlSeasonalModel;
use room_forecast::application::errors::PipelineError;
use room_forecast::application::pipeline::ForecastPipeline;
use room_forecast::shell::cli::Cli;
use room_forecast::shell::config::db_config_from_env;

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "forecast run failed");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), PipelineError> {
    let config = cli
        .pipeline_config()
        .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
    let db = db_config_from_env().map_err(|e| PipelineError::InvalidConfig(format!("{e:#}")))?;
    info!(host = %db.host, port = db.port, database = %db.database, ?config, "starting forecast run");

    let pipeline = ForecastPipeline::new(
        MySqlConnector::new(&db),
        MstlSeasonalModel::default(),
        SystemClock,
        config,
    );
    let outcome = pipeline.run().await?;
    info!(?outcome, "forecast run finished");
    Ok(())
}
