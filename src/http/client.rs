use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};
use thiserror::Error;

// Shared HTTP client instance.
lazy_static::lazy_static! {
    static ref CLIENT: Arc<reqwest::Client> = Arc::new(reqwest::Client::new());
}

/// Custom error type for HTTP requests.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("Request to {0} failed: {1}")]
    Transport(String, String),
    #[error("HTTP error: {0} returned {1}. Response body: {2}")]
    HttpError(String, u16, String),
    #[error("Error deserializing JSON: {0}")]
    JsonError(String),
}

/// Sends a GET request with query parameters and deserializes the JSON body.
pub async fn get_json<T: DeserializeOwned>(
    path: &str,              // Endpoint URL.
    params: &[(&str, &str)], // Query parameters.
    timeout: Duration,       // Whole-request timeout.
) -> Result<T, RequestError> {
    // Construct the URL.
    let url = if params.is_empty() {
        reqwest::Url::parse(path)
    } else {
        reqwest::Url::parse_with_params(path, params)
    }
    .map_err(|e| RequestError::InvalidUrl(path.into(), e.to_string()))?;

    // The query string carries the api key, keep it out of errors.
    let display_url = redacted(&url);

    let transport = |e: reqwest::Error| {
        RequestError::Transport(display_url.clone(), e.without_url().to_string())
    };

    let response = CLIENT
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(transport)?;

    // Get the response status code.
    let status = response.status();

    // Handle non-success status codes.
    if !status.is_success() {
        let body = response.text().await.map_err(transport)?;
        return Err(RequestError::HttpError(display_url, status.as_u16(), body));
    }

    // Deserialize the JSON response.
    response
        .json()
        .await
        .map_err(|e| RequestError::JsonError(e.without_url().to_string()))
}

fn redacted(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_query_params_and_parses_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("symbol", "IBM"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body: serde_json::Value = get_json(
            &format!("{}/query", server.uri()),
            &[("symbol", "IBM")],
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn non_success_status_keeps_body_and_hides_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = get_json::<serde_json::Value>(
            &format!("{}/query", server.uri()),
            &[("apikey", "secret")],
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        match err {
            RequestError::HttpError(url, status, body) => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
                assert!(!url.contains("secret"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_a_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = get_json::<serde_json::Value>(&server.uri(), &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::JsonError(_)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = get_json::<serde_json::Value>(&server.uri(), &[], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Transport(_, _)));
    }

    #[tokio::test]
    async fn invalid_url_is_reported() {
        let err = get_json::<serde_json::Value>("not a url", &[], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl(_, _)));
    }
}
