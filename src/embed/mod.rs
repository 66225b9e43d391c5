//! Stylesheet embedding
//!
//! This module turns an HTML document that references external stylesheets
//! into a self-contained one: `<link>` stylesheets and `@import` statements
//! (including imports nested inside fetched stylesheets) are fetched once per
//! address and written into the document as `<style>` elements.

// Sub-modules
pub mod dedup;
pub mod discovery;
pub mod downloaders;
pub mod embedder;
pub mod imports;
pub mod orchestrator;
pub mod resolver;
pub mod rewriter;
pub mod types;

// Re-exports for public API
pub use downloaders::{FetchFuture, HttpFetcher, StylesheetFetcher, is_css_content_type};
pub use imports::{ImportStatement, extract_imports};
pub use orchestrator::{embed_stylesheets, embed_stylesheets_with};
pub use rewriter::absolutize_css_urls;
pub use types::{
    AnchorId, EmbedError, EmbedResult, EmbeddedStylesheet, FetchFailure, FetchOutcome,
    FetchStatus, InsertionMode, ReferenceOrigin, StylesheetReference,
};
