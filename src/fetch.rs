use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};

use crate::error::KitchenError;

/// Fetch a recipe page as text.
///
/// # Errors
/// [`KitchenError::ImportFetch`] for a malformed URL, a network failure or
/// timeout, a non-success status, or an empty body.
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<String, KitchenError> {
    let parsed = url::Url::parse(url.trim())
        .map_err(|e| KitchenError::ImportFetch(format!("invalid url {url:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(KitchenError::ImportFetch(format!(
            "unsupported scheme {:?}",
            parsed.scheme()
        )));
    }

    let resp = client
        .get(parsed.clone())
        .header(USER_AGENT, user_agent)
        .header(ACCEPT, "text/html,application/xhtml+xml")
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| describe(&e, timeout))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(KitchenError::ImportFetch(format!(
            "HTTP {status} from {parsed}"
        )));
    }

    let body = resp.text().await.map_err(|e| describe(&e, timeout))?;
    if body.trim().is_empty() {
        return Err(KitchenError::ImportFetch(format!("empty page at {parsed}")));
    }
    tracing::debug!(url = %parsed, bytes = body.len(), "fetched recipe page");
    Ok(body)
}

fn describe(e: &reqwest::Error, timeout: Duration) -> KitchenError {
    if e.is_timeout() {
        KitchenError::ImportFetch(format!("timed out after {}s", timeout.as_secs()))
    } else {
        KitchenError::ImportFetch(e.to_string())
    }
}
