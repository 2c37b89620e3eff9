// Core structs: PriceRecord, Observation, FittedModel, Prediction
use thiserror::Error;

/// One row of the source table: median price of an authority in a year.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub region: String,
    pub local_authority: String,
    pub year: i32,
    pub median_price: f64,
}

/// A normalized point fed to the fit engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub group_key: String,
    /// Years since the configured base year.
    pub time: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    pub group_key: String,
    pub intercept: f64,
    pub slope: f64,
    pub r_squared: f64,
    pub n_observations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub group_key: String,
    pub time: i32,
    pub predicted_value: f64,
}

/// A fit expressed in price terms and joined back to its region.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthEstimate {
    pub group_key: String,
    pub region: String,
    pub intercept: f64,
    pub slope: f64,
    pub baseline_value: f64,
    pub annual_growth_rate: f64,
    pub r_squared: f64,
    pub n_observations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupFailure {
    pub group_key: String,
    pub error: FitError,
}

/// Outcome of fitting every group in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub models: Vec<FittedModel>,
    pub failures: Vec<GroupFailure>,
}

impl FitReport {
    pub fn model(&self, group_key: &str) -> Option<&FittedModel> {
        self.models
            .binary_search_by(|m| m.group_key.as_str().cmp(group_key))
            .ok()
            .map(|i| &self.models[i])
    }

    pub fn groups(&self) -> usize {
        self.models.len() + self.failures.len()
    }
}

/// Per-group fit failure. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("non-positive price {value} at time {time}")]
    InvalidValue { time: i32, value: f64 },

    #[error("all {n} observations share time {time}")]
    DegenerateFit { time: i32, n: usize },

    #[error("need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("fit task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response status {0}")]
    InvalidResponse(reqwest::StatusCode),
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("line {line}: cannot parse {field} from '{value}'")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("no year columns found in header")]
    NoYearColumns,

    #[error("columns '{first}' and '{second}' both give year {year}; set period_prefix to pick one")]
    DuplicateYearColumn {
        year: i32,
        first: String,
        second: String,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
