//! Configuration module for stylesheet embedding
//!
//! This module provides the `EmbedConfig` struct and its builder for
//! configuring an embedding run with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::EmbedConfigBuilder;
pub use types::EmbedConfig;
