use super::response::{DailyTimeSeries, DailyTimeSeriesResponse};
use crate::config::OutputSize;
use crate::constants;
use crate::http::client::{self, RequestError};
use std::time::Duration;
use thiserror::Error;

/// Non-success outcomes of a daily time series fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] RequestError),
    #[error("Unexpected API response format: {0}")]
    UnexpectedFormat(String),
    #[error("API Error Message: {0}")]
    Api(String),
    #[error("API Note (likely rate limit): {0}")]
    RateLimited(String),
    #[error("Time Series (Daily) not found in response.")]
    MissingTimeSeries,
}

/// Fetches the daily time series for a symbol.
pub async fn daily_time_series(
    base_url: &str,          // Query endpoint.
    symbol: &str,            // Stock symbol.
    api_key: &str,           // Alpha Vantage api key.
    output_size: OutputSize, // compact or full history.
) -> Result<DailyTimeSeries, FetchError> {
    let body = client::get_json::<serde_json::Value>(
        base_url,
        &[
            ("function", constants::TIME_SERIES_FUNCTION),
            ("symbol", symbol),
            ("outputsize", output_size.as_str()),
            ("apikey", api_key),
        ],
        Duration::from_secs(constants::HTTP_TIMEOUT_SECS),
    )
    .await?;

    check_payload(body)
}

// Classifies a decoded body into a time series or one of the API-level failures.
fn check_payload(body: serde_json::Value) -> Result<DailyTimeSeries, FetchError> {
    if !body.is_object() {
        return Err(FetchError::UnexpectedFormat(format!(
            "expected a JSON object, got {}",
            json_kind(&body)
        )));
    }

    let resp: DailyTimeSeriesResponse = serde_json::from_value(body)
        .map_err(|e| FetchError::UnexpectedFormat(e.to_string()))?;

    if let Some(msg) = resp.error_message {
        return Err(FetchError::Api(message_text(msg)));
    }

    if let Some(note) = resp.note.or(resp.information) {
        return Err(FetchError::RateLimited(message_text(note)));
    }

    let series: DailyTimeSeries = match resp.time_series {
        Some(serde_json::Value::Null) | None => return Err(FetchError::MissingTimeSeries),
        Some(raw) => serde_json::from_value(raw)
            .map_err(|e| FetchError::UnexpectedFormat(e.to_string()))?,
    };
    if series.is_empty() {
        return Err(FetchError::MissingTimeSeries);
    }
    Ok(series)
}

fn message_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
