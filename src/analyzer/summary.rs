use crate::model::{FittedModel, GrowthEstimate};
use std::collections::BTreeMap;

/// Half-open R² interval `[lower, upper)` in tenths; the top bucket includes 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FitBucket(pub u8, pub u8);

impl FitBucket {
    pub fn lower(&self) -> f64 {
        self.0 as f64 / 10.0
    }

    pub fn upper(&self) -> f64 {
        self.1 as f64 / 10.0
    }
}

pub struct TrendSummary;

impl TrendSummary {
    /// Fastest and slowest `n` authorities by annual growth.
    pub fn rank_by_growth(
        estimates: &[GrowthEstimate],
        n: usize,
    ) -> (Vec<GrowthEstimate>, Vec<GrowthEstimate>) {
        let mut sorted = estimates.to_vec();
        sorted.sort_by(|a, b| {
            b.annual_growth_rate
                .total_cmp(&a.annual_growth_rate)
                .then_with(|| a.group_key.cmp(&b.group_key))
        });
        let fastest: Vec<_> = sorted.iter().take(n).cloned().collect();
        let slowest: Vec<_> = sorted.iter().rev().take(n).cloned().collect();
        (fastest, slowest)
    }

    /// Counts of fits per tenth of R². All ten buckets are present.
    pub fn r_squared_buckets(models: &[FittedModel]) -> BTreeMap<FitBucket, usize> {
        let mut map: BTreeMap<FitBucket, usize> =
            (0..10).map(|i| (FitBucket(i, i + 1), 0)).collect();
        for model in models {
            *map.entry(Self::bucket_for(model.r_squared)).or_default() += 1;
        }
        map
    }

    /// Mean annual growth per region.
    pub fn regional_growth(estimates: &[GrowthEstimate]) -> BTreeMap<String, f64> {
        let mut map: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for e in estimates {
            map.entry(e.region.clone()).or_default().push(e.annual_growth_rate);
        }
        map.into_iter()
            .map(|(region, rates)| {
                let mean = rates.iter().sum::<f64>() / rates.len() as f64;
                (region, mean)
            })
            .collect()
    }

    pub fn median_growth(estimates: &[GrowthEstimate]) -> Option<f64> {
        if estimates.is_empty() {
            return None;
        }
        let mut rates: Vec<f64> = estimates.iter().map(|e| e.annual_growth_rate).collect();
        rates.sort_by(f64::total_cmp);
        let mid = rates.len() / 2;
        if rates.len() % 2 == 0 {
            Some((rates[mid - 1] + rates[mid]) / 2.0)
        } else {
            Some(rates[mid])
        }
    }

    fn bucket_for(r_squared: f64) -> FitBucket {
        let tenth = ((r_squared * 10.0).floor() as i64).clamp(0, 9) as u8;
        FitBucket(tenth, tenth + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(key: &str, region: &str, growth: f64) -> GrowthEstimate {
        GrowthEstimate {
            group_key: key.to_string(),
            region: region.to_string(),
            intercept: 0.0,
            slope: (1.0 + growth).log2(),
            baseline_value: 1.0,
            annual_growth_rate: growth,
            r_squared: 0.9,
            n_observations: 11,
        }
    }

    fn model(r_squared: f64) -> FittedModel {
        FittedModel {
            group_key: "x".to_string(),
            intercept: 0.0,
            slope: 0.0,
            r_squared,
            n_observations: 2,
        }
    }

    #[test]
    fn test_rank_by_growth() {
        let estimates = vec![
            estimate("Hackney", "London", 0.08),
            estimate("Burnley", "North West", 0.001),
            estimate("Camden", "London", 0.06),
            estimate("Hull", "Yorkshire", 0.01),
        ];
        let (fastest, slowest) = TrendSummary::rank_by_growth(&estimates, 2);
        let f: Vec<_> = fastest.iter().map(|e| e.group_key.as_str()).collect();
        let s: Vec<_> = slowest.iter().map(|e| e.group_key.as_str()).collect();
        assert_eq!(f, vec!["Hackney", "Camden"]);
        assert_eq!(s, vec!["Burnley", "Hull"]);
    }

    #[test]
    fn test_r_squared_buckets() {
        let models = vec![model(0.0), model(0.05), model(0.55), model(0.99), model(1.0)];
        let buckets = TrendSummary::r_squared_buckets(&models);
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[&FitBucket(0, 1)], 2);
        assert_eq!(buckets[&FitBucket(5, 6)], 1);
        assert_eq!(buckets[&FitBucket(9, 10)], 2);
        assert_eq!(buckets.values().sum::<usize>(), models.len());
    }

    #[test]
    fn test_regional_growth_and_median() {
        let estimates = vec![
            estimate("Hackney", "London", 0.08),
            estimate("Camden", "London", 0.06),
            estimate("Hull", "Yorkshire", 0.01),
        ];
        let regional = TrendSummary::regional_growth(&estimates);
        assert!((regional["London"] - 0.07).abs() < 1e-12);
        assert!((regional["Yorkshire"] - 0.01).abs() < 1e-12);
        assert_eq!(TrendSummary::median_growth(&estimates), Some(0.06));
        assert_eq!(TrendSummary::median_growth(&[]), None);
    }
}
