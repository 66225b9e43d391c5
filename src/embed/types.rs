//! Type definitions for stylesheet embedding

use serde::Serialize;

use super::imports::ImportStatement;

/// Position of an originating node in the document, in discovery order.
///
/// Anchors survive serialization between discovery and embedding through
/// [`ANCHOR_ATTRIBUTE`](crate::utils::ANCHOR_ATTRIBUTE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AnchorId(pub usize);

/// How an embedded stylesheet is placed relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsertionMode {
    /// Appended to `<head>`
    Append,
    /// Takes the place of the originating `<link>`
    Replace,
    /// Placed immediately before the originating node
    InsertBefore,
}

/// Where a stylesheet reference came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceOrigin {
    /// A `<link>` element and its `media` attribute
    Link {
        anchor: AnchorId,
        media: Option<String>,
    },
    /// An `@import` statement, either in a `<style>` block or in a fetched stylesheet
    Import {
        anchor: AnchorId,
        /// Media query list of the statement itself
        condition: Option<String>,
        /// `layer` or `layer(name)`; an empty name is an anonymous layer
        layer: Option<String>,
        /// Contents of `supports(...)`
        supports: Option<String>,
        /// `media` attribute of the `<style>` block holding the statement
        block_media: Option<String>,
    },
}

impl std::fmt::Display for ReferenceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceOrigin::Link { .. } => write!(f, "link"),
            ReferenceOrigin::Import { .. } => write!(f, "@import"),
        }
    }
}

/// A discovered stylesheet reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetReference {
    pub raw_href: String,
    pub origin: ReferenceOrigin,
}

impl StylesheetReference {
    #[must_use]
    pub fn link(raw_href: impl Into<String>, anchor: AnchorId) -> Self {
        Self {
            raw_href: raw_href.into(),
            origin: ReferenceOrigin::Link {
                anchor,
                media: None,
            },
        }
    }

    #[must_use]
    pub fn import(raw_href: impl Into<String>, anchor: AnchorId, condition: Option<String>) -> Self {
        Self {
            raw_href: raw_href.into(),
            origin: ReferenceOrigin::Import {
                anchor,
                condition,
                layer: None,
                supports: None,
                block_media: None,
            },
        }
    }

    /// Reference for a parsed `@import`, keeping its layer and supports clauses
    #[must_use]
    pub fn from_statement(statement: &ImportStatement, anchor: AnchorId) -> Self {
        Self {
            raw_href: statement.path.clone(),
            origin: ReferenceOrigin::Import {
                anchor,
                condition: statement.condition.clone(),
                layer: statement.layer.clone(),
                supports: statement.supports.clone(),
                block_media: None,
            },
        }
    }

    /// Restrict to the `media` attribute of the originating element
    #[must_use]
    pub fn with_media(mut self, media: Option<String>) -> Self {
        match &mut self.origin {
            ReferenceOrigin::Link { media: slot, .. }
            | ReferenceOrigin::Import {
                block_media: slot, ..
            } => *slot = media,
        }
        self
    }

    #[must_use]
    pub fn anchor(&self) -> AnchorId {
        match self.origin {
            ReferenceOrigin::Link { anchor, .. } | ReferenceOrigin::Import { anchor, .. } => anchor,
        }
    }

    /// Media condition of the reference itself: a link's `media`, an import's query list
    #[must_use]
    pub fn condition(&self) -> Option<&str> {
        match &self.origin {
            ReferenceOrigin::Link { media, .. } => media.as_deref(),
            ReferenceOrigin::Import { condition, .. } => condition.as_deref(),
        }
    }

    #[must_use]
    pub fn insertion_mode(&self) -> InsertionMode {
        match self.origin {
            ReferenceOrigin::Link { .. } => InsertionMode::Replace,
            ReferenceOrigin::Import { .. } => InsertionMode::InsertBefore,
        }
    }

    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(self.origin, ReferenceOrigin::Link { .. })
    }

    /// Place `stylesheet` under every condition this reference imposes.
    ///
    /// Innermost first: layer, supports, the import's media list, then the
    /// media of the enclosing `<style>` block.
    pub fn apply_conditions(&self, stylesheet: &mut EmbeddedStylesheet) {
        match &self.origin {
            ReferenceOrigin::Link { media, .. } => stylesheet.scope(media.as_deref()),
            ReferenceOrigin::Import {
                condition,
                layer,
                supports,
                block_media,
                ..
            } => {
                if let Some(layer) = layer {
                    let prelude = if layer.is_empty() {
                        "@layer".to_string()
                    } else {
                        format!("@layer {layer}")
                    };
                    stylesheet.enclose(&prelude);
                }
                if let Some(supports) = supports {
                    stylesheet.enclose(&format!("@supports ({supports})"));
                }
                stylesheet.scope(condition.as_deref());
                stylesheet.scope(block_media.as_deref());
            }
        }
    }
}

/// Result of a single stylesheet GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub address: String,
    pub status: FetchStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Success { body: String, content_type: String },
    Failure { reason: String },
}

impl FetchOutcome {
    #[must_use]
    pub fn success(
        address: impl Into<String>,
        body: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            status: FetchStatus::Success {
                body: body.into(),
                content_type: content_type.into(),
            },
        }
    }

    #[must_use]
    pub fn failure(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: FetchStatus::Failure {
                reason: reason.into(),
            },
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, FetchStatus::Success { .. })
    }
}

/// Error information for an address whose fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub address: String,
    pub reason: String,
}

/// A resolved stylesheet body ready to be written into the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedStylesheet {
    /// Address the body was fetched from
    pub address: String,
    /// Body with resource URLs absolutized and `@import` statements removed
    pub css: String,
    pub condition: Option<String>,
    pub anchor: AnchorId,
    pub mode: InsertionMode,
}

impl EmbeddedStylesheet {
    /// Scope this stylesheet to a media condition.
    ///
    /// An existing condition is folded into the body as an inner `@media`
    /// block, so the result only applies when both conditions hold.
    pub fn scope(&mut self, condition: Option<&str>) {
        let Some(outer) = condition else {
            return;
        };
        if let Some(inner) = self.condition.take() {
            self.css = wrap_in_media(&inner, &self.css);
        }
        self.condition = Some(outer.to_string());
    }

    /// Wrap the body in a block at-rule such as `@layer base` or `@supports (x)`.
    ///
    /// A pending media condition goes inside the new block.
    pub fn enclose(&mut self, prelude: &str) {
        if let Some(inner) = self.condition.take() {
            self.css = wrap_in_media(&inner, &self.css);
        }
        self.css = wrap_block(prelude, &self.css);
    }

    /// Text content of the `<style>` element written for this stylesheet
    #[must_use]
    pub fn style_text(&self) -> String {
        match &self.condition {
            Some(condition) => wrap_in_media(condition, &self.css),
            None => self.css.clone(),
        }
    }
}

fn wrap_in_media(condition: &str, css: &str) -> String {
    wrap_block(&format!("@media {condition}"), css)
}

fn wrap_block(prelude: &str, css: &str) -> String {
    format!("{prelude} {{\n{css}\n}}")
}

/// Output of resolving one reference (and everything it imports)
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Embeddable bodies, imports before their importer
    pub stylesheets: Vec<EmbeddedStylesheet>,
    pub not_founds: Vec<FetchFailure>,
}

impl Resolution {
    #[must_use]
    pub fn not_found(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stylesheets: Vec::new(),
            not_founds: vec![FetchFailure {
                address: address.into(),
                reason: reason.into(),
            }],
        }
    }

    pub fn extend(&mut self, other: Resolution) {
        self.stylesheets.extend(other.stylesheets);
        self.not_founds.extend(other.not_founds);
    }
}

/// Result of an embedding run
#[derive(Debug, Clone, Serialize)]
pub struct EmbedResult {
    /// The document with stylesheets embedded and stylesheet markers removed
    pub html: String,
    /// Distinct stylesheet addresses in first-discovery order
    pub stylesheet_urls: Vec<String>,
    /// Embedded bodies in embedding order
    pub stylesheets: Vec<String>,
    /// Addresses whose fetch failed
    pub not_founds: Vec<String>,
    /// Failure reason for every address in `not_founds`, same order
    pub failures: Vec<FetchFailure>,
    /// Embedded bodies with their address and placement
    pub embedded: Vec<EmbeddedStylesheet>,
}

impl EmbedResult {
    /// Result for a document that carried no stylesheet references
    #[must_use]
    pub fn unchanged(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            stylesheet_urls: Vec::new(),
            stylesheets: Vec::new(),
            not_founds: Vec::new(),
            failures: Vec::new(),
            embedded: Vec::new(),
        }
    }

    #[must_use]
    pub fn new(html: String, stylesheet_urls: Vec<String>, resolution: Resolution) -> Self {
        let Resolution {
            stylesheets: embedded,
            not_founds: failures,
        } = resolution;

        Self {
            html,
            stylesheet_urls,
            stylesheets: embedded.iter().map(|sheet| sheet.css.clone()).collect(),
            not_founds: failures.iter().map(|f| f.address.clone()).collect(),
            failures,
            embedded,
        }
    }

    /// Total number of stylesheets fetched or attempted
    #[must_use]
    pub fn total(&self) -> usize {
        self.embedded.len() + self.failures.len()
    }

    /// Check if any fetch failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Get failure rate as a ratio between 0.0 and 1.0
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.failures.len() as f64 / total as f64
        }
    }
}

/// Errors surfaced by an embedding run.
///
/// Network failures are never errors; they end up in
/// [`EmbedResult::not_founds`].
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// The HTML tree could not be queried or serialized
    #[error("Failed to process HTML document: {0}")]
    Document(String),

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl From<anyhow::Error> for EmbedError {
    fn from(error: anyhow::Error) -> Self {
        EmbedError::Document(format!("{error:#}"))
    }
}
