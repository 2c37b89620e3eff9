// Analyzer module: per-authority trend fitting and its interpretation.

pub mod regression;
pub mod interpretation;
pub mod summary;

pub use regression::{fit_all, fit_all_concurrent, fit_group, group_observations};
pub use interpretation::{interpret, predict, predict_all, residuals};
pub use summary::TrendSummary;
