//! Stylesheet fetching
//!
//! [`StylesheetFetcher`] is the seam between the resolution engine and the
//! network. Implementations must always produce a [`FetchOutcome`]: transport
//! errors, bad statuses and non-CSS responses all become
//! [`FetchStatus::Failure`](super::types::FetchStatus::Failure) so a single
//! unreachable stylesheet never aborts a run.
//!
//! [`HttpFetcher`] is the reqwest-backed implementation used by
//! [`embed_stylesheets`](super::orchestrator::embed_stylesheets).

use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::types::{EmbedError, FetchOutcome};
use crate::config::EmbedConfig;
use crate::utils::constants::CSS_ACCEPT;

/// Boxed future returned by [`StylesheetFetcher::fetch`]
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'a>>;

/// Fetches one stylesheet per call.
///
/// Called once per distinct address; retries are the implementation's concern.
pub trait StylesheetFetcher: Send + Sync {
    fn fetch<'a>(&'a self, address: &'a str) -> FetchFuture<'a>;
}

/// Check whether a `Content-Type` header value identifies CSS text.
///
/// Parameters such as `charset` are ignored.
#[must_use]
pub fn is_css_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("text/css"))
}

/// [`StylesheetFetcher`] over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_css_size: usize,
}

impl HttpFetcher {
    /// Build a fetcher with the timeout, user agent and size limit of `config`.
    ///
    /// Compressed responses are decoded transparently.
    pub fn new(config: &EmbedConfig) -> Result<Self, EmbedError> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        Ok(Self::with_client(client, config.max_css_size()))
    }

    /// Wrap an existing client. `Client` is reference counted, so clones share
    /// one connection pool.
    #[must_use]
    pub fn with_client(client: Client, max_css_size: usize) -> Self {
        Self {
            client,
            max_css_size,
        }
    }
}

impl StylesheetFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, address: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            match download_css_core(&self.client, address, self.max_css_size).await {
                Ok((body, content_type)) => {
                    log::info!("Successfully downloaded CSS from: {address}");
                    log::debug!("Downloaded CSS content length: {} chars", body.len());
                    FetchOutcome::success(address, body, content_type)
                }
                Err(e) => {
                    let reason = format!("{e:#}");
                    log::warn!("Failed to fetch stylesheet {address}: {reason}");
                    FetchOutcome::failure(address, reason)
                }
            }
        })
    }
}

/// Core CSS download: status and content type checks, then a streamed body
/// read bounded by `max_size`. Returns the decoded body and its content type.
async fn download_css_core(
    client: &Client,
    url: &str,
    max_size: usize,
) -> Result<(String, String)> {
    let response = client
        .get(url)
        .header(ACCEPT, CSS_ACCEPT)
        .send()
        .await
        .context("Failed to download CSS")?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "CSS download failed with status: {}",
            response.status()
        ));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if !is_css_content_type(&content_type) {
        return Err(anyhow::anyhow!(
            "Unexpected content type for stylesheet: {}",
            if content_type.is_empty() {
                "<missing>"
            } else {
                content_type.as_str()
            }
        ));
    }

    // Enforce the limit before reading when the server announces a size
    let expected_size = response.content_length().unwrap_or(0);
    if expected_size > max_size as u64 {
        return Err(anyhow::anyhow!(
            "CSS file too large: {expected_size} bytes exceeds limit of {max_size} bytes"
        ));
    }

    let mut buffer = if expected_size > 0 {
        Vec::with_capacity(expected_size as usize)
    } else {
        Vec::new()
    };

    let mut stream = response.bytes_stream();
    let mut total_size = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.context("Failed to read CSS chunk")?;

        let new_total = total_size + chunk.len();
        if new_total > max_size {
            return Err(anyhow::anyhow!(
                "CSS download exceeded size limit during download: {new_total} bytes (max: {max_size})"
            ));
        }

        buffer.extend_from_slice(&chunk);
        total_size = new_total;
    }

    let body = match String::from_utf8(buffer) {
        Ok(body) => body,
        Err(e) => {
            log::debug!("CSS from {url} is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let body = body
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(body);

    Ok((body, content_type))
}
