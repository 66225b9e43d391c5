//! Embed the external stylesheets of an HTML document.
//!
//! ```no_run
//! use html_embed_stylesheets::{EmbedConfig, embed_stylesheets};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = EmbedConfig::builder()
//!     .resolve_to("https://www.example.com")
//!     .build()?;
//! let result = embed_stylesheets(r#"<link rel="stylesheet" href="main.css">"#, &config).await?;
//! println!("{}", result.html);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embed;
pub mod utils;

pub use config::{EmbedConfig, EmbedConfigBuilder};
pub use embed::{
    EmbedError, EmbedResult, EmbeddedStylesheet, FetchFailure, FetchOutcome, HttpFetcher,
    StylesheetFetcher, embed_stylesheets, embed_stylesheets_with,
};
pub use utils::normalize_href;
