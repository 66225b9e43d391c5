//! Test utilities and helper functions for the embedding test suite

use std::collections::HashMap;
use std::sync::Mutex;

use html_embed_stylesheets::embed::FetchFuture;
use html_embed_stylesheets::{EmbedConfig, FetchOutcome, StylesheetFetcher};
use mockito::{Mock, Server};

/// Starts a mock HTTP server for stylesheet requests
#[allow(dead_code)]
pub async fn setup_mock_server() -> mockito::ServerGuard {
    Server::new_async().await
}

/// Creates a mock serving `css` as `text/css` at `path`
#[allow(dead_code)]
pub async fn create_css_mock(server: &mut Server, path: &str, css: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/css; charset=utf-8")
        .with_body(css)
        .create_async()
        .await
}

/// Creates a mock answering `path` with the given status and content type
#[allow(dead_code)]
pub async fn create_response_mock(
    server: &mut Server,
    path: &str,
    status: usize,
    content_type: &str,
    body: &str,
) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_header("content-type", content_type)
        .with_body(body)
        .create_async()
        .await
}

/// Creates a minimal HTML document with the given `<head>` content
#[allow(dead_code)]
pub fn create_test_html(head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Test</title>
    {head}
</head>
<body>
    {body}
</body>
</html>"#
    )
}

/// Configuration resolving against `base` with downloads enabled
#[allow(dead_code)]
pub fn online_config(base: &str) -> EmbedConfig {
    EmbedConfig::builder()
        .resolve_to(base)
        .timeout_secs(5)
        .build()
        .expect("test config should build")
}

/// Configuration resolving against `base` without downloading
#[allow(dead_code)]
pub fn offline_config(base: Option<&str>) -> EmbedConfig {
    let builder = EmbedConfig::builder().download(false);
    let builder = match base {
        Some(base) => builder.resolve_to(base),
        None => builder,
    };
    builder.build().expect("test config should build")
}

/// In-memory fetcher serving stylesheets from a map and recording requests
#[allow(dead_code)]
#[derive(Default)]
pub struct MapFetcher {
    sheets: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MapFetcher {
    pub fn with(mut self, address: &str, css: &str) -> Self {
        self.sheets.insert(address.to_string(), css.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl StylesheetFetcher for MapFetcher {
    fn fetch<'a>(&'a self, address: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(address.to_string());
            }
            match self.sheets.get(address) {
                Some(css) => FetchOutcome::success(address, css.clone(), "text/css"),
                None => FetchOutcome::failure(address, "CSS download failed with status: 404 Not Found"),
            }
        })
    }
}
