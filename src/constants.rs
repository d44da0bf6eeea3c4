// Alpha Vantage query endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const TIME_SERIES_FUNCTION: &str = "TIME_SERIES_DAILY";
pub const DEFAULT_SYMBOL: &str = "AAPL";

// Postgres defaults.
pub const DEFAULT_DB_HOST: &str = "postgres";
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_PASS: &str = "postgres";
pub const DEFAULT_DB_NAME: &str = "stocks";
pub const DEFAULT_DB_PORT: u16 = 5432;

// HTTP request timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 15;
// Per-attempt connect timeout in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DB_CONNECT_MAX_ATTEMPTS: u32 = 5;
// Delay after failed attempt n is BACKOFF_BASE_SECS^n.
pub const DB_CONNECT_BACKOFF_BASE_SECS: u64 = 2;

// Field names inside one day of the time series.
pub const FIELD_OPEN: &str = "1. open";
pub const FIELD_HIGH: &str = "2. high";
pub const FIELD_LOW: &str = "3. low";
pub const FIELD_CLOSE: &str = "4. close";
pub const FIELD_VOLUME: &str = "5. volume";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
