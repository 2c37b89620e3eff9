use house_trend::config::{load_config, AppConfig};
use house_trend::report::{render_summary, write_tables};
use house_trend::source::{source_for, Source};
use house_trend::storage::SqliteStorage;
use house_trend::{run_pipeline, PipelineOutput};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };

    let text = match source_for(&config.source).fetch().await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to fetch price table: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let output = match run_pipeline(&text, &config).await {
        Ok(output) => output,
        Err(e) => {
            error!("Failed to parse price table: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for failure in &output.report.failures {
        warn!("Excluded {}: {}", failure.group_key, failure.error);
    }

    if let Err(e) = write_tables(
        Path::new(&config.output_dir),
        &output.estimates,
        &output.predictions,
        &output.report,
        config.base_year,
    ) {
        error!("Failed to write output tables: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(db_path) = &config.db_path {
        if let Err(e) = persist(db_path, &output, config.base_year) {
            error!("Failed to persist results to {}: {}", db_path, e);
            return ExitCode::FAILURE;
        }
        info!("Results stored in {}", db_path);
    }

    info!(
        "\n{}",
        render_summary(&output.report, &output.estimates, config.top_n)
    );
    ExitCode::SUCCESS
}

fn persist(
    db_path: &str,
    output: &PipelineOutput,
    base_year: i32,
) -> Result<(), house_trend::model::StorageError> {
    let mut storage = SqliteStorage::new(db_path)?;
    storage.replace_run(
        &output.estimates,
        &output.predictions,
        &output.report.failures,
        output.fitted_at,
        base_year,
    )?;
    Ok(())
}
