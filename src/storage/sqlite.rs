use crate::model::{GroupFailure, GrowthEstimate, Prediction, StorageError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, Transaction};

/// A failure as stored: the error is kept as its display text.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFailure {
    pub group_key: String,
    pub error: String,
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database file and creates the output tables.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::init(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS fits (
                local_authority TEXT PRIMARY KEY,
                region TEXT NOT NULL,
                intercept REAL NOT NULL,
                slope REAL NOT NULL,
                baseline_value REAL NOT NULL,
                annual_growth_rate REAL NOT NULL,
                r_squared REAL NOT NULL,
                n_observations INTEGER NOT NULL,
                fitted_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS predictions (
                local_authority TEXT NOT NULL,
                year INTEGER NOT NULL,
                predicted_price REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_predictions_la ON predictions(local_authority);

            CREATE TABLE IF NOT EXISTS failures (
                local_authority TEXT PRIMARY KEY,
                error TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }

    /// Replaces the fits, predictions and failures tables with one run's
    /// output. All three are rewritten in a single transaction, so a failed
    /// write leaves the previous run intact.
    pub fn replace_run(
        &mut self,
        estimates: &[GrowthEstimate],
        predictions: &[Prediction],
        failures: &[GroupFailure],
        fitted_at: DateTime<Utc>,
        base_year: i32,
    ) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        Self::write_fits(&tx, estimates, fitted_at)?;
        Self::write_predictions(&tx, predictions, base_year)?;
        Self::write_failures(&tx, failures)?;
        tx.commit()?;
        Ok(())
    }

    fn write_fits(
        tx: &Transaction,
        estimates: &[GrowthEstimate],
        fitted_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        tx.execute("DELETE FROM fits", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO fits (
                local_authority, region, intercept, slope, baseline_value,
                annual_growth_rate, r_squared, n_observations, fitted_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        let fitted_at = fitted_at.to_rfc3339();
        for e in estimates {
            stmt.execute(params![
                &e.group_key,
                &e.region,
                e.intercept,
                e.slope,
                e.baseline_value,
                e.annual_growth_rate,
                e.r_squared,
                e.n_observations as i64,
                &fitted_at,
            ])?;
        }
        Ok(())
    }

    /// `time` is stored as a calendar year.
    fn write_predictions(
        tx: &Transaction,
        predictions: &[Prediction],
        base_year: i32,
    ) -> Result<(), StorageError> {
        tx.execute("DELETE FROM predictions", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO predictions (local_authority, year, predicted_price) VALUES (?1, ?2, ?3)",
        )?;
        for p in predictions {
            stmt.execute(params![&p.group_key, base_year + p.time, p.predicted_value])?;
        }
        Ok(())
    }

    fn write_failures(tx: &Transaction, failures: &[GroupFailure]) -> Result<(), StorageError> {
        tx.execute("DELETE FROM failures", [])?;
        let mut stmt = tx.prepare("INSERT INTO failures (local_authority, error) VALUES (?1, ?2)")?;
        for f in failures {
            stmt.execute(params![&f.group_key, f.error.to_string()])?;
        }
        Ok(())
    }

    pub fn load_fits(&self) -> Result<Vec<GrowthEstimate>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT local_authority, region, intercept, slope, baseline_value,
                    annual_growth_rate, r_squared, n_observations
             FROM fits ORDER BY local_authority ASC",
        )?;
        let rows = stmt.query_map([], Self::map_estimate)?;
        let mut estimates = Vec::new();
        for row in rows {
            estimates.push(row?);
        }
        Ok(estimates)
    }

    /// Predictions with `time` converted back from calendar year.
    pub fn load_predictions(&self, base_year: i32) -> Result<Vec<Prediction>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT local_authority, year, predicted_price
             FROM predictions ORDER BY local_authority ASC, year ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let year: i32 = row.get(1)?;
            Ok(Prediction {
                group_key: row.get(0)?,
                time: year - base_year,
                predicted_value: row.get(2)?,
            })
        })?;
        let mut predictions = Vec::new();
        for row in rows {
            predictions.push(row?);
        }
        Ok(predictions)
    }

    pub fn load_failures(&self) -> Result<Vec<StoredFailure>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT local_authority, error FROM failures ORDER BY local_authority ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredFailure {
                group_key: row.get(0)?,
                error: row.get(1)?,
            })
        })?;
        let mut failures = Vec::new();
        for row in rows {
            failures.push(row?);
        }
        Ok(failures)
    }

    /// Timestamp of the run that wrote the fits table, if any.
    pub fn last_fitted_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT fitted_at FROM fits LIMIT 1")?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => {
                let text: String = row.get(0)?;
                let parsed = DateTime::parse_from_rfc3339(&text)
                    .map_err(|e| StorageError::CorruptRow(format!("fitted_at '{}': {}", text, e)))?;
                Ok(Some(parsed.with_timezone(&Utc)))
            }
            None => Ok(None),
        }
    }

    fn map_estimate(row: &Row) -> Result<GrowthEstimate, rusqlite::Error> {
        let n: i64 = row.get(7)?;
        Ok(GrowthEstimate {
            group_key: row.get(0)?,
            region: row.get(1)?,
            intercept: row.get(2)?,
            slope: row.get(3)?,
            baseline_value: row.get(4)?,
            annual_growth_rate: row.get(5)?,
            r_squared: row.get(6)?,
            n_observations: n as usize,
        })
    }
}
