use crate::analyzer::{fit_all, fit_all_concurrent, group_observations, interpret, predict_all};
use crate::config::AppConfig;
use crate::model::{FitReport, GrowthEstimate, LoaderError, Prediction};
use crate::normalizer::normalize_all;
use crate::parser::parser_for;
use chrono::{DateTime, Utc};
use tracing::info;

/// Everything one run produces, ready for reporting.
pub struct PipelineOutput {
    pub report: FitReport,
    pub estimates: Vec<GrowthEstimate>,
    pub predictions: Vec<Prediction>,
    /// When the fits were produced; stored alongside them.
    pub fitted_at: DateTime<Utc>,
}

/// Parses the raw table and runs normalize → fit → interpret → predict.
pub async fn run_pipeline(text: &str, cfg: &AppConfig) -> Result<PipelineOutput, LoaderError> {
    let records = parser_for(cfg).parse(text)?;
    info!("Parsed {} price records", records.len());

    let normalized = normalize_all(&records, cfg);
    let groups = group_observations(&normalized.observations);
    info!(
        "Fitting {} local authorities from {} observations",
        groups.len(),
        normalized.observations.len()
    );

    let report = if cfg.concurrent {
        fit_all_concurrent(normalized.observations).await
    } else {
        fit_all(&normalized.observations)
    };

    let fitted_at = Utc::now();

    let estimates = interpret(&report, &normalized.regions);
    let predictions = predict_all(&report, &groups);
    info!(
        "{} fits, {} failures, {} predictions",
        report.models.len(),
        report.failures.len(),
        predictions.len()
    );

    Ok(PipelineOutput {
        report,
        estimates,
        predictions,
        fitted_at,
    })
}
