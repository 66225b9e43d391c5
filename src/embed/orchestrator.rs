//! Embedding orchestration
//!
//! A run has three phases. Discovery, deduplication and marking happen
//! synchronously on a parsed tree, which is serialized and dropped before the
//! first network request because kuchiki trees are not `Send`. Resolution then
//! walks the deduplicated references one at a time, depth first. Finally the
//! marked document is parsed again and the resolved stylesheets are embedded.

use anyhow::Result;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

use super::dedup::{AddressSet, Deduplicated, deduplicate};
use super::discovery::discover;
use super::downloaders::{HttpFetcher, StylesheetFetcher};
use super::embedder::{embed, serialize_document};
use super::resolver::Resolver;
use super::types::{EmbedError, EmbedResult, Resolution, StylesheetReference};
use crate::config::EmbedConfig;
use crate::utils::ANCHOR_ATTRIBUTE;

/// Document state handed from the synchronous phase to resolution
struct Prepared {
    /// Serialized document with duplicates and hints removed and anchors marked
    html: String,
    /// Deduplicated references with their normalized addresses
    work: Vec<(StylesheetReference, String)>,
    visited: AddressSet,
}

/// Embed every stylesheet referenced by `html`, fetching over HTTP.
///
/// Fetch failures never make this return `Err`; they are reported through
/// [`EmbedResult::not_founds`].
pub async fn embed_stylesheets(html: &str, config: &EmbedConfig) -> Result<EmbedResult, EmbedError> {
    let fetcher = HttpFetcher::new(config)?;
    embed_stylesheets_with(html, config, &fetcher).await
}

/// Embed every stylesheet referenced by `html` using `fetcher`.
///
/// Returns `html` untouched when it references no stylesheets.
pub async fn embed_stylesheets_with<F>(
    html: &str,
    config: &EmbedConfig,
    fetcher: &F,
) -> Result<EmbedResult, EmbedError>
where
    F: StylesheetFetcher + ?Sized,
{
    let base = config.resolve_to();

    let Some(prepared) = prepare(html, base)? else {
        log::debug!("No stylesheet references found, returning document unchanged");
        return Ok(EmbedResult::unchanged(html));
    };

    let Prepared {
        html: marked,
        work,
        visited,
    } = prepared;

    let (resolution, visited) = if config.download() {
        let mut resolver = Resolver::new(fetcher, base, visited);
        let mut resolution = Resolution::default();
        for (reference, address) in &work {
            let resolved = resolver.resolve(reference, address).await;
            resolution.extend(resolved);
        }
        (resolution, resolver.into_visited())
    } else {
        log::debug!("Download disabled, skipping {} stylesheets", work.len());
        (Resolution::default(), visited)
    };

    let html = embed(&marked, &resolution.stylesheets)?;
    let result = EmbedResult::new(html, visited.into_vec(), resolution);

    log::info!(
        "Embedded {} of {} stylesheets ({} not found)",
        result.embedded.len(),
        result.stylesheet_urls.len(),
        result.not_founds.len()
    );

    Ok(result)
}

/// Parse, discover, deduplicate and mark anchors.
///
/// Returns `None` when the document needs no changes at all.
fn prepare(html: &str, base: Option<&str>) -> Result<Option<Prepared>> {
    let document = kuchiki::parse_html().one(html);

    let mut discovery = discover(&document)?;
    if discovery.is_empty() {
        return Ok(None);
    }

    clear_markers(&document)?;

    let mut visited = AddressSet::new();
    let references = std::mem::take(&mut discovery.references);
    let Deduplicated { kept, duplicates } = deduplicate(references, base, &mut visited);

    // Duplicate links get no replacement; duplicate imports were already stripped
    for duplicate in duplicates.iter().filter(|r| r.is_link()) {
        if let Some(node) = discovery.anchor(duplicate.anchor()) {
            node.detach();
        }
    }

    for (id, node) in discovery.anchors.iter().enumerate() {
        if let Some(element) = node.as_element() {
            element
                .attributes
                .borrow_mut()
                .insert(ANCHOR_ATTRIBUTE, id.to_string());
        }
    }

    Ok(Some(Prepared {
        html: serialize_document(&document)?,
        work: kept,
        visited,
    }))
}

// Markers copied in from elsewhere would be mistaken for our own anchors
fn clear_markers(document: &NodeRef) -> Result<()> {
    let selector = format!("[{ANCHOR_ATTRIBUTE}]");
    for element in document
        .select(&selector)
        .map_err(|()| anyhow::anyhow!("Invalid anchor selector"))?
    {
        element.attributes.borrow_mut().remove(ANCHOR_ATTRIBUTE);
    }
    Ok(())
}
