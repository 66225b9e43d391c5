//! Builder for `EmbedConfig`
//!
//! Every field has a default, so `EmbedConfig::builder().build()` is always a
//! usable configuration. `build()` validates the values that can be wrong.

use anyhow::{Result, anyhow};

use super::types::EmbedConfig;
use crate::utils::{CHROME_USER_AGENT, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_CSS_SIZE};

pub struct EmbedConfigBuilder {
    pub(crate) resolve_to: Option<String>,
    pub(crate) download: bool,
    pub(crate) timeout_secs: u64,
    pub(crate) max_css_size: usize,
    pub(crate) user_agent: String,
}

impl Default for EmbedConfigBuilder {
    fn default() -> Self {
        Self {
            resolve_to: None,
            download: true,
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_css_size: DEFAULT_MAX_CSS_SIZE,
            user_agent: CHROME_USER_AGENT.to_string(),
        }
    }
}

impl EmbedConfig {
    #[must_use]
    pub fn builder() -> EmbedConfigBuilder {
        EmbedConfigBuilder::default()
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        EmbedConfigBuilder::default().assemble()
    }
}

impl EmbedConfigBuilder {
    /// Set the base address relative hrefs are resolved against
    #[must_use]
    pub fn resolve_to(mut self, base: impl Into<String>) -> Self {
        self.resolve_to = Some(base.into());
        self
    }

    /// Leave hrefs unresolved (percent-encoded only)
    #[must_use]
    pub fn without_base(mut self) -> Self {
        self.resolve_to = None;
        self
    }

    #[must_use]
    pub fn download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }

    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn max_css_size(mut self, bytes: usize) -> Self {
        self.max_css_size = bytes;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_css_size` or `timeout_secs` is zero.
    pub fn build(self) -> Result<EmbedConfig> {
        if self.max_css_size == 0 {
            return Err(anyhow!("max_css_size must be greater than zero"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> EmbedConfig {
        // A blank base behaves exactly like no base
        let resolve_to = self
            .resolve_to
            .map(|base| base.trim().to_string())
            .filter(|base| !base.is_empty());

        EmbedConfig {
            resolve_to,
            download: self.download,
            timeout_secs: self.timeout_secs,
            max_css_size: self.max_css_size,
            user_agent: self.user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EmbedConfig::default();
        assert_eq!(config.resolve_to(), None);
        assert!(config.download());
        assert_eq!(config.timeout().as_secs(), DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(config.max_css_size(), DEFAULT_MAX_CSS_SIZE);
        assert_eq!(config.user_agent(), CHROME_USER_AGENT);
    }

    #[test]
    fn test_blank_base_is_dropped() {
        let config = EmbedConfig::builder()
            .resolve_to("   ")
            .build()
            .expect("config should build");
        assert_eq!(config.resolve_to(), None);
    }

    #[test]
    fn test_base_is_trimmed() {
        let config = EmbedConfig::builder()
            .resolve_to(" http://example.com/ ")
            .download(false)
            .build()
            .expect("config should build");
        assert_eq!(config.resolve_to(), Some("http://example.com/"));
        assert!(!config.download());
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        assert!(EmbedConfig::builder().max_css_size(0).build().is_err());
        assert!(EmbedConfig::builder().timeout_secs(0).build().is_err());
    }

    #[test]
    fn test_serde_roundtrip_keeps_options() {
        let config = EmbedConfig::builder()
            .resolve_to("https://example.com")
            .download(false)
            .build()
            .expect("config should build");
        let json = serde_json::to_string(&config).expect("config should serialize");
        let back: EmbedConfig = serde_json::from_str(&json).expect("config should deserialize");
        assert_eq!(back.resolve_to(), Some("https://example.com"));
        assert!(!back.download());
    }
}
