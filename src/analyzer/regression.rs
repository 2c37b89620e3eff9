use crate::model::{FitError, FitReport, FittedModel, GroupFailure, Observation};
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const MIN_OBSERVATIONS: usize = 2;

/// Partitions observations by group key in a single pass.
pub fn group_observations(observations: &[Observation]) -> BTreeMap<String, Vec<Observation>> {
    let mut grouped: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for obs in observations {
        grouped.entry(obs.group_key.clone()).or_default().push(obs.clone());
    }
    grouped
}

/// Fits `log2(value) = intercept + slope * time` by closed-form OLS.
///
/// Values are validated before any log is taken. Duplicate times are kept.
/// When every log value is equal the total variance is zero and R² is
/// reported as 0.
pub fn fit_group(group_key: &str, observations: &[Observation]) -> Result<FittedModel, FitError> {
    if observations.len() < MIN_OBSERVATIONS {
        return Err(FitError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: observations.len(),
        });
    }

    if let Some(bad) = observations
        .iter()
        .find(|o| !(o.value.is_finite() && o.value > 0.0))
    {
        return Err(FitError::InvalidValue {
            time: bad.time,
            value: bad.value,
        });
    }

    let n = observations.len() as f64;
    let ts: Vec<f64> = observations.iter().map(|o| o.time as f64).collect();
    let ys: Vec<f64> = observations.iter().map(|o| o.value.log2()).collect();

    let mean_t = ts.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let sxx: f64 = ts.iter().map(|t| (t - mean_t).powi(2)).sum();
    if sxx == 0.0 {
        return Err(FitError::DegenerateFit {
            time: observations[0].time,
            n: observations.len(),
        });
    }
    let sxy: f64 = ts
        .iter()
        .zip(ys.iter())
        .map(|(t, y)| (t - mean_t) * (y - mean_y))
        .sum();

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_t;

    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = ts
        .iter()
        .zip(ys.iter())
        .map(|(t, y)| (y - (intercept + slope * t)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Ok(FittedModel {
        group_key: group_key.to_string(),
        intercept,
        slope,
        r_squared,
        n_observations: observations.len(),
    })
}

fn collect_outcomes<I>(outcomes: I) -> FitReport
where
    I: IntoIterator<Item = (String, Result<FittedModel, FitError>)>,
{
    let mut models = Vec::new();
    let mut failures = Vec::new();
    for (group_key, outcome) in outcomes {
        match outcome {
            Ok(model) => {
                debug!(
                    "{}: slope={:.5} r2={:.3} n={}",
                    group_key, model.slope, model.r_squared, model.n_observations
                );
                models.push(model);
            }
            Err(error) => {
                warn!("Fit failed for {}: {}", group_key, error);
                failures.push(GroupFailure { group_key, error });
            }
        }
    }
    models.sort_by(|a, b| a.group_key.cmp(&b.group_key));
    failures.sort_by(|a, b| a.group_key.cmp(&b.group_key));
    FitReport { models, failures }
}

/// Fits every group one after another.
pub fn fit_all(observations: &[Observation]) -> FitReport {
    let grouped = group_observations(observations);
    collect_outcomes(grouped.into_iter().map(|(key, group)| {
        let outcome = fit_group(&key, &group);
        (key, outcome)
    }))
}

/// Fits every group on the blocking pool and merges the results by key.
/// Produces the same report as [`fit_all`].
pub async fn fit_all_concurrent(observations: Vec<Observation>) -> FitReport {
    let grouped = group_observations(&observations);
    drop(observations);

    let tasks: Vec<_> = grouped
        .into_iter()
        .map(|(key, group)| async move {
            let task_key = key.clone();
            let handle =
                tokio::task::spawn_blocking(move || fit_group(&task_key, &group));
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(FitError::TaskFailed(e.to_string())),
            };
            (key, outcome)
        })
        .collect();

    collect_outcomes(join_all(tasks).await)
}
