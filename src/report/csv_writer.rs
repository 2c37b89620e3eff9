// report/csv_writer.rs

use crate::model::{FitReport, GrowthEstimate, Prediction, ReportError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const FITS_FILE: &str = "fits.csv";
pub const PREDICTIONS_FILE: &str = "predictions.csv";
pub const FAILURES_FILE: &str = "failures.csv";

#[derive(Serialize)]
struct FitRow<'a> {
    region: &'a str,
    local_authority: &'a str,
    intercept: f64,
    slope: f64,
    baseline_value: f64,
    annual_growth_rate: f64,
    r_squared: f64,
    n_observations: usize,
}

#[derive(Serialize)]
struct PredictionRow<'a> {
    local_authority: &'a str,
    year: i32,
    predicted_price: f64,
}

#[derive(Serialize)]
struct FailureRow<'a> {
    local_authority: &'a str,
    error: String,
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

/// Writes fits, predictions and failures tables into `dir`.
pub fn write_tables(
    dir: &Path,
    estimates: &[GrowthEstimate],
    predictions: &[Prediction],
    report: &FitReport,
    base_year: i32,
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let fits_path = dir.join(FITS_FILE);
    write_rows(
        &fits_path,
        estimates.iter().map(|e| FitRow {
            region: &e.region,
            local_authority: &e.group_key,
            intercept: e.intercept,
            slope: e.slope,
            baseline_value: e.baseline_value,
            annual_growth_rate: e.annual_growth_rate,
            r_squared: e.r_squared,
            n_observations: e.n_observations,
        }),
    )?;

    let predictions_path = dir.join(PREDICTIONS_FILE);
    write_rows(
        &predictions_path,
        predictions.iter().map(|p| PredictionRow {
            local_authority: &p.group_key,
            year: base_year + p.time,
            predicted_price: p.predicted_value,
        }),
    )?;

    let failures_path = dir.join(FAILURES_FILE);
    write_rows(
        &failures_path,
        report.failures.iter().map(|f| FailureRow {
            local_authority: &f.group_key,
            error: f.error.to_string(),
        }),
    )?;

    let written = vec![fits_path, predictions_path, failures_path];
    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}
