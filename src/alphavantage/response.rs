use serde::Deserialize;
use std::collections::BTreeMap;

/// Date string ("YYYY-MM-DD") to the raw field map of that day.
pub type DailyTimeSeries = BTreeMap<String, serde_json::Value>;

// Alpha Vantage answers 200 for everything; the keys tell what happened.
// Fields stay raw so the indicator keys are read whatever shape the series has.
#[derive(Deserialize, Debug)]
pub struct DailyTimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    pub time_series: Option<serde_json::Value>,

    // { "Error Message": "Invalid API call. ..." }
    #[serde(rename = "Error Message")]
    pub error_message: Option<serde_json::Value>,

    // { "Note": "Thank you for using Alpha Vantage! ... 5 calls per minute ..." }
    #[serde(rename = "Note")]
    pub note: Option<serde_json::Value>,

    // Newer throttle and premium notices use this key instead of Note.
    #[serde(rename = "Information")]
    pub information: Option<serde_json::Value>,
}
