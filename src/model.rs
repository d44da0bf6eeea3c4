use std::str::FromStr;

use bigdecimal::{BigDecimal, FromPrimitive, Zero};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

use crate::{alphavantage::api_caller::FetchError, config::ConfigError, constants};

/// One daily price observation, a row of `stock_data`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub symbol: String,           // Ticker.
    pub timestamp: NaiveDateTime, // Trading day at midnight.
    pub open: BigDecimal,
    pub high: BigDecimal,
    pub low: BigDecimal,
    pub close: BigDecimal,
    pub volume: i64,
}

/// Why a single record of the time series could not be loaded.
#[derive(Error, Debug, PartialEq)]
pub enum RowError {
    #[error("invalid date '{0}': {1}")]
    InvalidDate(String, String),
    #[error("record is not an object")]
    NotAnObject,
    #[error("field '{0}' is not a number: {1}")]
    InvalidNumber(&'static str, String),
    #[error("field '{0}' is not an integer: {1}")]
    InvalidInteger(&'static str, String),
    #[error("volume cannot be negative: {0}")]
    NegativeVolume(i64),
    #[error("database rejected row: {0}")]
    Database(String),
}

impl PriceObservation {
    /// Converts one entry of the daily time series. Absent or falsy fields load as zero.
    pub fn from_daily_bar(
        symbol: &str,   // Symbol the series belongs to.
        date: &str,     // "YYYY-MM-DD" key.
        fields: &Value, // Field map of that day.
    ) -> std::result::Result<PriceObservation, RowError> {
        let day = NaiveDate::parse_from_str(date, constants::DATE_FORMAT)
            .map_err(|e| RowError::InvalidDate(date.into(), e.to_string()))?;
        let fields = fields.as_object().ok_or(RowError::NotAnObject)?;

        let decimal = |key: &'static str| decimal_field(key, fields.get(key));
        let volume = integer_field(constants::FIELD_VOLUME, fields.get(constants::FIELD_VOLUME))?;
        if volume < 0 {
            return Err(RowError::NegativeVolume(volume));
        }

        Ok(PriceObservation {
            symbol: symbol.into(),
            timestamp: day.and_time(chrono::NaiveTime::MIN),
            open: decimal(constants::FIELD_OPEN)?,
            high: decimal(constants::FIELD_HIGH)?,
            low: decimal(constants::FIELD_LOW)?,
            close: decimal(constants::FIELD_CLOSE)?,
            volume,
        })
    }
}

// Absent, null, false, "", 0 and empty containers are all "no value".
fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
    }
}

fn decimal_field(
    key: &'static str,
    value: Option<&Value>,
) -> std::result::Result<BigDecimal, RowError> {
    if is_falsy(value) {
        return Ok(BigDecimal::zero());
    }
    let invalid = |v: &Value| RowError::InvalidNumber(key, v.to_string());
    match value {
        Some(Value::String(s)) => {
            BigDecimal::from_str(s.trim()).map_err(|_| RowError::InvalidNumber(key, s.clone()))
        }
        Some(v @ Value::Number(n)) => BigDecimal::from_str(&n.to_string()).map_err(|_| invalid(v)),
        Some(Value::Bool(true)) => Ok(BigDecimal::from(1i64)),
        Some(other) => Err(invalid(other)),
        None => Ok(BigDecimal::zero()),
    }
}

fn integer_field(
    key: &'static str,
    value: Option<&Value>,
) -> std::result::Result<i64, RowError> {
    if is_falsy(value) {
        return Ok(0);
    }
    match value {
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| RowError::InvalidInteger(key, s.clone())),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(i),
            // Float volumes truncate toward zero.
            None => n
                .as_f64()
                .filter(|f| f.is_finite())
                .and_then(i64::from_f64)
                .ok_or_else(|| RowError::InvalidInteger(key, n.to_string())),
        },
        Some(Value::Bool(true)) => Ok(1),
        Some(other) => Err(RowError::InvalidInteger(key, other.to_string())),
        None => Ok(0),
    }
}

/// Result of loading one record.
#[derive(Debug, PartialEq)]
pub enum RowOutcome {
    Inserted,
    // (symbol, timestamp) already stored.
    Duplicate,
    Skipped { date: String, reason: RowError },
}

/// Per-run tally of row outcomes.
#[derive(Debug, Default, PartialEq)]
pub struct LoadSummary {
    pub symbol: String,
    pub inserted: u64,
    pub duplicates: u64,
    pub skipped: Vec<(String, RowError)>,
}

impl LoadSummary {
    pub fn new(symbol: &str) -> Self {
        LoadSummary {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Inserted => self.inserted += 1,
            RowOutcome::Duplicate => self.duplicates += 1,
            RowOutcome::Skipped { date, reason } => self.skipped.push((date, reason)),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuotesError>;

/// Reasons a run stops before the load completes.
#[derive(Error, Debug)]
pub enum QuotesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Could not connect to Postgres after {attempts} attempts: {source}")]
    DatabaseUnavailable {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
