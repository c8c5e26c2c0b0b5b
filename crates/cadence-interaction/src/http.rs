//! HTTP helpers shared by the API providers.

use cadence_core::provider::ProviderError;
use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Request timeout used when the configuration does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Builds the HTTP client with the given request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ProviderError::Configuration(format!("Failed to build HTTP client: {err}")))
}

/// Maps a transport-level failure.
pub(crate) fn map_request_error(provider: &str, err: reqwest::Error) -> ProviderError {
    ProviderError::Request {
        message: format!("{provider} API request failed: {err}"),
        is_retryable: err.is_connect() || err.is_timeout(),
    }
}

/// Both APIs wrap failures as `{"error": {"message": ...}}`.
#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a non-success response to a provider error.
pub(crate) fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> ProviderError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    ProviderError::Http {
        status: status.as_u16(),
        message,
        is_retryable,
        retry_after,
    }
}

/// Parses a `Retry-After` header given in seconds.
///
/// HTTP-date values are ignored.
pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Rejects blank model output.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, ProviderError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_http_error_extracts_message() {
        let body = r#"{"type":"error","error":{"type":"rate_limit_error","message":"Slow down"}}"#;
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            body.to_string(),
            Some(Duration::from_secs(3)),
        );
        match err {
            ProviderError::Http {
                status,
                message,
                is_retryable,
                retry_after,
            } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Slow down");
                assert!(is_retryable);
                assert_eq!(retry_after, Some(Duration::from_secs(3)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_http_error_keeps_raw_body() {
        let err = map_http_error(StatusCode::UNAUTHORIZED, "bad key".to_string(), None);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn test_parse_retry_after() {
        let seconds = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&seconds)), Some(Duration::from_secs(12)));

        let date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date)), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("hi".to_string())).unwrap(), "hi");
        assert!(matches!(non_empty(Some("  ".to_string())), Err(ProviderError::EmptyResponse)));
        assert!(matches!(non_empty(None), Err(ProviderError::EmptyResponse)));
    }
}
