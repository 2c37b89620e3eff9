pub mod csv_writer;

pub use csv_writer::write_tables;

use crate::analyzer::TrendSummary;
use crate::model::{FitReport, GrowthEstimate};

fn pct(rate: f64) -> String {
    format!("{:+.2}%", rate * 100.0)
}

/// Plain-text run summary: failures, growth ranking, fit quality, regions.
pub fn render_summary(report: &FitReport, estimates: &[GrowthEstimate], top_n: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Fitted {} of {} local authorities ({} failed)\n",
        report.models.len(),
        report.groups(),
        report.failures.len()
    ));

    if !report.failures.is_empty() {
        out.push_str("\nFailed groups:\n");
        for f in &report.failures {
            out.push_str(&format!("  {}: {}\n", f.group_key, f.error));
        }
    }

    if let Some(median) = TrendSummary::median_growth(estimates) {
        out.push_str(&format!("\nMedian annual growth: {}\n", pct(median)));
    }

    let (fastest, slowest) = TrendSummary::rank_by_growth(estimates, top_n);
    if !fastest.is_empty() {
        out.push_str("\nFastest growth:\n");
        for e in &fastest {
            out.push_str(&format!(
                "  {:<32} {:>8}  r2={:.3}  ({})\n",
                e.group_key,
                pct(e.annual_growth_rate),
                e.r_squared,
                e.region
            ));
        }
        out.push_str("\nSlowest growth:\n");
        for e in &slowest {
            out.push_str(&format!(
                "  {:<32} {:>8}  r2={:.3}  ({})\n",
                e.group_key,
                pct(e.annual_growth_rate),
                e.r_squared,
                e.region
            ));
        }
    }

    if !report.models.is_empty() {
        out.push_str("\nR-squared distribution:\n");
        for (bucket, count) in TrendSummary::r_squared_buckets(&report.models) {
            out.push_str(&format!(
                "  [{:.1}, {:.1}) {:>5}\n",
                bucket.lower(),
                bucket.upper(),
                count
            ));
        }
    }

    let regional = TrendSummary::regional_growth(estimates);
    if !regional.is_empty() {
        out.push_str("\nMean growth by region:\n");
        for (region, rate) in regional {
            out.push_str(&format!("  {:<32} {:>8}\n", region, pct(rate)));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{fit_all, interpret};
    use crate::model::Observation;
    use std::collections::HashMap;

    #[test]
    fn test_summary_lists_failures_and_growth() {
        let observations = vec![
            Observation { group_key: "Camden".into(), time: 0, value: 100.0 },
            Observation { group_key: "Camden".into(), time: 1, value: 200.0 },
            Observation { group_key: "Rutland".into(), time: 0, value: 100.0 },
        ];
        let report = fit_all(&observations);
        let regions = HashMap::from([("Camden".to_string(), "London".to_string())]);
        let estimates = interpret(&report, &regions);

        let text = render_summary(&report, &estimates, 5);
        assert!(text.starts_with("Fitted 1 of 2 local authorities (1 failed)"));
        assert!(text.contains("Rutland: need at least 2 observations, got 1"));
        assert!(text.contains("+100.00%"));
        assert!(text.contains("London"));
        assert!(text.contains("  [0.9, 1.0)     1\n"));
        let bucket_lines = text.lines().filter(|l| l.trim_start().starts_with('[')).count();
        assert_eq!(bucket_lines, 10);
        assert!(text.ends_with('\n'));
    }
}
