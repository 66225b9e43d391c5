//! Core configuration types for stylesheet embedding
//!
//! This module contains the main `EmbedConfig` struct that defines how
//! stylesheet references are resolved and downloaded.

use serde::{Deserialize, Serialize};

/// Main configuration struct for an embedding run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Base address used to resolve relative hrefs.
    ///
    /// **INVARIANT:** Never blank (blank input is stored as `None` by the builder).
    /// When absent, hrefs are only percent-encoded and stay unresolved.
    pub(crate) resolve_to: Option<String>,

    /// Fetch and embed stylesheets.
    ///
    /// When false, references are still discovered, normalized and
    /// deduplicated and their markers stripped, but nothing is downloaded.
    pub(crate) download: bool,

    /// Timeout in seconds for a single stylesheet request
    ///
    /// Default: 30 seconds
    pub(crate) timeout_secs: u64,

    /// Maximum size for a stylesheet download (bytes)
    ///
    /// Larger responses are recorded as not found.
    pub(crate) max_css_size: usize,

    /// User agent sent with every request
    pub(crate) user_agent: String,
}
