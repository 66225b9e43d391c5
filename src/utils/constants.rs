//! Shared configuration constants for stylesheet embedding
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default per-request timeout for stylesheet downloads: 30 seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default maximum stylesheet size: 2MB
///
/// Based on 99th percentile of real-world CSS plus margin.
/// Typical: 50-200KB, Large frameworks: 500KB-1MB
pub const DEFAULT_MAX_CSS_SIZE: usize = 2 * 1024 * 1024;

/// Chrome user agent string sent with every stylesheet request
///
/// Some CDNs serve a different (or no) stylesheet to unknown agents.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Accept header for stylesheet requests
pub const CSS_ACCEPT: &str = "text/css,*/*;q=0.1";

/// Attribute used to pin the placement of embedded stylesheets while the
/// document is serialized between discovery and embedding.
///
/// It never survives into the returned HTML.
pub const ANCHOR_ATTRIBUTE: &str = "data-embed-stylesheets-anchor";
