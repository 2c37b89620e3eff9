use crate::model::{FitReport, FittedModel, GrowthEstimate, Observation, Prediction};
use std::collections::{BTreeMap, HashMap};

impl FittedModel {
    /// Fitted value in log2 space.
    pub fn predicted_log_value(&self, time: i32) -> f64 {
        self.intercept + self.slope * time as f64
    }

    /// Fitted value back in price terms; also extrapolates beyond the data.
    pub fn value_at(&self, time: i32) -> f64 {
        self.predicted_log_value(time).exp2()
    }

    /// `2^slope - 1`: multiplicative change per year.
    pub fn annual_growth_rate(&self) -> f64 {
        self.slope.exp2() - 1.0
    }

    /// Fitted price at time zero (the base year).
    pub fn baseline_value(&self) -> f64 {
        self.intercept.exp2()
    }
}

/// Evaluates the model at each observed time of its own group.
pub fn predict(model: &FittedModel, group: &[Observation]) -> Vec<Prediction> {
    group
        .iter()
        .map(|o| Prediction {
            group_key: model.group_key.clone(),
            time: o.time,
            predicted_value: model.value_at(o.time),
        })
        .collect()
}

/// Log-space residuals `log2(actual) - fitted`, in group order.
pub fn residuals(model: &FittedModel, group: &[Observation]) -> Vec<f64> {
    group
        .iter()
        .map(|o| o.value.log2() - model.predicted_log_value(o.time))
        .collect()
}

/// Predictions for every successful fit. Failed groups yield nothing.
pub fn predict_all(
    report: &FitReport,
    groups: &BTreeMap<String, Vec<Observation>>,
) -> Vec<Prediction> {
    report
        .models
        .iter()
        .filter_map(|model| groups.get(&model.group_key).map(|g| predict(model, g)))
        .flatten()
        .collect()
}

/// Joins fits back to their region and converts coefficients to growth terms.
pub fn interpret(report: &FitReport, regions: &HashMap<String, String>) -> Vec<GrowthEstimate> {
    report
        .models
        .iter()
        .map(|m| GrowthEstimate {
            group_key: m.group_key.clone(),
            region: regions.get(&m.group_key).cloned().unwrap_or_default(),
            intercept: m.intercept,
            slope: m.slope,
            baseline_value: m.baseline_value(),
            annual_growth_rate: m.annual_growth_rate(),
            r_squared: m.r_squared,
            n_observations: m.n_observations,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::regression::{fit_all, fit_group, group_observations};

    fn obs(key: &str, time: i32, value: f64) -> Observation {
        Observation {
            group_key: key.to_string(),
            time,
            value,
        }
    }

    #[test]
    fn test_doubling_is_hundred_percent_growth() {
        let group = vec![obs("A", 0, 100.0), obs("A", 1, 200.0)];
        let model = fit_group("A", &group).unwrap();
        assert!((model.annual_growth_rate() - 1.0).abs() < 1e-9);
        assert!((model.baseline_value() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_group_has_no_growth() {
        let group = vec![obs("B", 0, 50.0), obs("B", 1, 50.0), obs("B", 2, 50.0)];
        let model = fit_group("B", &group).unwrap();
        assert!(model.annual_growth_rate().abs() < 1e-12);
        let preds = predict(&model, &group);
        assert!(preds.iter().all(|p| (p.predicted_value - 50.0).abs() < 1e-9));
    }

    #[test]
    fn test_predictions_follow_group_times() {
        let group = vec![obs("K", 0, 200.0), obs("K", 4, 300.0), obs("K", 2, 260.0)];
        let model = fit_group("K", &group).unwrap();
        let preds = predict(&model, &group);
        let times: Vec<i32> = preds.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0, 4, 2]);
        for p in &preds {
            assert_eq!(p.group_key, "K");
            assert!((p.predicted_value.log2() - model.predicted_log_value(p.time)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_residuals_match_actual_minus_predicted() {
        let group = vec![
            obs("R", 0, 120_000.0),
            obs("R", 1, 118_000.0),
            obs("R", 2, 131_500.0),
            obs("R", 5, 150_250.0),
        ];
        let model = fit_group("R", &group).unwrap();
        let preds = predict(&model, &group);
        let res = residuals(&model, &group);
        for ((o, p), r) in group.iter().zip(&preds).zip(&res) {
            assert!((o.value.log2() - p.predicted_value.log2() - r).abs() < 1e-9);
        }
        // OLS residuals with an intercept sum to zero and are orthogonal to time
        assert!(res.iter().sum::<f64>().abs() < 1e-9);
        let dot: f64 = group.iter().zip(&res).map(|(o, r)| o.time as f64 * r).sum();
        assert!(dot.abs() < 1e-9);
    }

    #[test]
    fn test_predict_all_skips_failed_groups() {
        let observations = vec![
            obs("Good", 0, 100.0),
            obs("Good", 1, 110.0),
            obs("Bad", 0, 100.0),
            obs("Bad", 1, 0.0),
        ];
        let report = fit_all(&observations);
        let groups = group_observations(&observations);
        let preds = predict_all(&report, &groups);
        assert_eq!(preds.len(), 2);
        assert!(preds.iter().all(|p| p.group_key == "Good"));
    }

    #[test]
    fn test_interpret_joins_region() {
        let observations = vec![obs("Bath", 0, 100.0), obs("Bath", 1, 121.0)];
        let report = fit_all(&observations);
        let regions = HashMap::from([("Bath".to_string(), "South West".to_string())]);
        let estimates = interpret(&report, &regions);
        assert_eq!(estimates.len(), 1);
        assert_eq!(estimates[0].region, "South West");
        assert!((estimates[0].annual_growth_rate - 0.21).abs() < 1e-9);
    }

    #[test]
    fn test_value_at_extrapolates() {
        let group = vec![obs("X", 0, 100.0), obs("X", 1, 200.0)];
        let model = fit_group("X", &group).unwrap();
        assert!((model.value_at(3) - 800.0).abs() < 1e-6);
    }
}
