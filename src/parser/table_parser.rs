// CSV parsing of the median price table, long or wide layout
use crate::config::{AppConfig, TableFormat};
use crate::model::{LoaderError, PriceRecord};
use crate::utils::{is_missing, parse_price, parse_year, to_snake_case};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

pub trait Parser {
    fn parse(&self, text: &str) -> Result<Vec<PriceRecord>, LoaderError>;
}

const REGION_ALIASES: &[&str] = &["region", "region_name"];
const AUTHORITY_ALIASES: &[&str] = &["local_authority", "local_authority_name", "la_name"];
const YEAR_ALIASES: &[&str] = &["year"];
const PRICE_ALIASES: &[&str] = &["median_price", "price", "median"];

fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.contains(&to_snake_case(h).as_str()))
}

fn require_column(headers: &StringRecord, aliases: &[&str]) -> Result<usize, LoaderError> {
    find_column(headers, aliases).ok_or_else(|| LoaderError::MissingColumn(aliases[0].to_string()))
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Rows of `region,local_authority,year,median_price`.
pub struct LongTableParser;

impl Parser for LongTableParser {
    fn parse(&self, text: &str) -> Result<Vec<PriceRecord>, LoaderError> {
        let mut rdr = reader(text);
        let headers = rdr.headers()?.clone();
        let region_idx = require_column(&headers, REGION_ALIASES)?;
        let authority_idx = require_column(&headers, AUTHORITY_ALIASES)?;
        let year_idx = require_column(&headers, YEAR_ALIASES)?;
        let price_idx = require_column(&headers, PRICE_ALIASES)?;

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            let line = line_of(&row);
            let cell = |idx: usize| row.get(idx).unwrap_or("");

            let price_cell = cell(price_idx);
            if is_missing(price_cell) {
                debug!("line {}: missing price for {}, skipped", line, cell(authority_idx));
                continue;
            }
            let year = cell(year_idx)
                .parse::<i32>()
                .map_err(|_| LoaderError::InvalidField {
                    line,
                    field: "year",
                    value: cell(year_idx).to_string(),
                })?;
            let median_price = parse_price(price_cell).ok_or_else(|| LoaderError::InvalidField {
                line,
                field: "median_price",
                value: price_cell.to_string(),
            })?;

            records.push(PriceRecord {
                region: cell(region_idx).to_string(),
                local_authority: cell(authority_idx).to_string(),
                year,
                median_price,
            });
        }
        Ok(records)
    }
}

/// One row per authority with a column per year; pivoted to long rows.
///
/// Published sheets carry several periods per year ("Year ending Mar 2008",
/// "Year ending Jun 2008", ...). `period_prefix` keeps only the headers that
/// start with it; any year still claimed by two columns is an error.
#[derive(Debug, Clone, Default)]
pub struct WideTableParser {
    period_prefix: Option<String>,
}

impl WideTableParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_period(prefix: &str) -> Self {
        Self {
            period_prefix: Some(prefix.trim().to_lowercase()),
        }
    }

    fn matches_period(&self, header: &str) -> bool {
        match &self.period_prefix {
            Some(prefix) => header.trim().to_lowercase().starts_with(prefix.as_str()),
            None => true,
        }
    }

    fn year_columns(
        &self,
        headers: &StringRecord,
        skip: &[usize],
    ) -> Result<Vec<(usize, i32)>, LoaderError> {
        let mut columns: Vec<(usize, i32)> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if skip.contains(&idx) || !self.matches_period(header) {
                continue;
            }
            let Some(year) = parse_year(header) else {
                continue;
            };
            if let Some(&(first, _)) = columns.iter().find(|(_, y)| *y == year) {
                return Err(LoaderError::DuplicateYearColumn {
                    year,
                    first: headers.get(first).unwrap_or("").to_string(),
                    second: header.to_string(),
                });
            }
            columns.push((idx, year));
        }
        Ok(columns)
    }
}

impl Parser for WideTableParser {
    fn parse(&self, text: &str) -> Result<Vec<PriceRecord>, LoaderError> {
        let mut rdr = reader(text);
        let headers = rdr.headers()?.clone();
        let region_idx = require_column(&headers, REGION_ALIASES)?;
        let authority_idx = require_column(&headers, AUTHORITY_ALIASES)?;

        let year_columns = self.year_columns(&headers, &[region_idx, authority_idx])?;
        if year_columns.is_empty() {
            return Err(LoaderError::NoYearColumns);
        }

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            let line = line_of(&row);
            let region = row.get(region_idx).unwrap_or("");
            let authority = row.get(authority_idx).unwrap_or("");
            if authority.is_empty() {
                continue;
            }

            for &(idx, year) in &year_columns {
                let cell = row.get(idx).unwrap_or("");
                if is_missing(cell) {
                    continue;
                }
                let median_price = parse_price(cell).ok_or_else(|| LoaderError::InvalidField {
                    line,
                    field: "median_price",
                    value: cell.to_string(),
                })?;
                records.push(PriceRecord {
                    region: region.to_string(),
                    local_authority: authority.to_string(),
                    year,
                    median_price,
                });
            }
        }
        Ok(records)
    }
}

pub fn parser_for(cfg: &AppConfig) -> Box<dyn Parser + Send + Sync> {
    match cfg.format {
        TableFormat::Long => Box::new(LongTableParser),
        TableFormat::Wide => match &cfg.period_prefix {
            Some(prefix) => Box::new(WideTableParser::with_period(prefix)),
            None => Box::new(WideTableParser::new()),
        },
    }
}
