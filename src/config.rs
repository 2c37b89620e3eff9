use serde::Deserialize;
use std::fs;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// `region,local_authority,year,median_price`
    #[default]
    Long,
    /// One row per authority, one column per year.
    Wide,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Local path or http(s) URL of the price table.
    pub source: String,
    #[serde(default)]
    pub format: TableFormat,
    /// Wide tables only: keep year columns whose header starts with this,
    /// e.g. "Year ending Dec".
    #[serde(default)]
    pub period_prefix: Option<String>,
    #[serde(default = "default_year")]
    pub base_year: i32,
    #[serde(default = "default_year")]
    pub min_year: i32,
    #[serde(default)]
    pub max_year: Option<i32>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub db_path: Option<String>,
    #[serde(default = "default_true")]
    pub concurrent: bool,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_year() -> i32 {
    2008
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_true() -> bool {
    true
}

fn default_top_n() -> usize {
    10
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid year window: {0}")]
    InvalidWindow(String),
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max) = self.max_year {
            if max < self.min_year {
                return Err(ConfigError::InvalidWindow(format!(
                    "max_year {} is before min_year {}",
                    max, self.min_year
                )));
            }
        }
        if self.base_year > self.min_year {
            return Err(ConfigError::InvalidWindow(format!(
                "base_year {} is after min_year {}",
                self.base_year, self.min_year
            )));
        }
        Ok(())
    }

    pub fn in_window(&self, year: i32) -> bool {
        year >= self.min_year && self.max_year.is_none_or(|max| year <= max)
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
