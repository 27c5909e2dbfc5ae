use profitwise_core::RawFailure;
use reqwest::{header::RETRY_AFTER, Response};
use serde_json::Value;
use tracing::{trace, warn};
use url::Url;

/// Standard HTTP response handling for all endpoints
pub(crate) async fn handle_http_response(
    response: Response,
    context: &str,
) -> Result<Response, RawFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    warn!(
        url = %url,
        status = %status,
        context = %context,
        "HTTP request failed"
    );

    Err(RawFailure::Http {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
        body,
        retry_after,
    })
}

/// Standard JSON parsing. An empty body decodes as JSON `null`.
pub(crate) async fn parse_json_response<T>(
    response: Response,
    context: &str,
) -> Result<T, RawFailure>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = response.bytes().await?;
    trace!(context = %context, bytes = bytes.len(), "Decoding JSON response");

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(Value::Null).map_err(RawFailure::from);
    }
    serde_json::from_slice(&bytes).map_err(RawFailure::from)
}

/// Append an endpoint path to the base URL, keeping any path prefix the base
/// already carries (`https://host/backend` + `/api/x` is `https://host/backend/api/x`)
pub(crate) fn build_endpoint_url(base: &Url, path: &str) -> Result<Url, RawFailure> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| RawFailure::Other(format!("Invalid endpoint URL '{path}': opaque base")))?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}
