//! Getter methods for `EmbedConfig`

use std::time::Duration;

use super::types::EmbedConfig;

impl EmbedConfig {
    #[must_use]
    pub fn resolve_to(&self) -> Option<&str> {
        self.resolve_to.as_deref()
    }

    #[must_use]
    pub fn download(&self) -> bool {
        self.download
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn max_css_size(&self) -> usize {
        self.max_css_size
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
