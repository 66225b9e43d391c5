//! Reference discovery
//!
//! Walks a parsed document for stylesheet `<link>` elements and for `@import`
//! statements inside `<style>` blocks. Discovery mutates the tree it is given:
//! stylesheet preload/prefetch hints are removed and consumed `@import`
//! statements are stripped from their `<style>` element. The `<link>` elements
//! themselves stay in place as anchors until embedding.

use anyhow::Result;
use kuchiki::{ElementData, NodeDataRef, NodeRef};

use super::imports::{extract_imports, strip_statements};
use super::types::{AnchorId, StylesheetReference};

/// Everything discovery found in one document
#[derive(Default)]
pub struct Discovery {
    /// Links first in document order, then `@import` references in document order
    pub references: Vec<StylesheetReference>,
    /// Originating nodes, indexed by [`AnchorId`]
    pub anchors: Vec<NodeRef>,
    /// Number of preload/prefetch hints removed from the tree
    pub removed_hints: usize,
}

impl Discovery {
    #[must_use]
    pub fn anchor(&self, id: AnchorId) -> Option<&NodeRef> {
        self.anchors.get(id.0)
    }

    /// Whether discovery found or changed anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.removed_hints == 0
    }

    fn push_anchor(&mut self, node: &NodeRef) -> AnchorId {
        self.anchors.push(node.clone());
        AnchorId(self.anchors.len() - 1)
    }
}

enum LinkKind {
    Stylesheet { href: String, media: Option<String> },
    Hint,
    Other,
}

/// Collect stylesheet references from `document`
pub fn discover(document: &NodeRef) -> Result<Discovery> {
    let mut discovery = Discovery::default();

    // Collect first; hints are detached while walking
    let links: Vec<_> = document
        .select("link")
        .map_err(|()| anyhow::anyhow!("Invalid link selector"))?
        .collect();

    for link in links {
        match classify_link(&link) {
            LinkKind::Stylesheet { href, media } => {
                let anchor = discovery.push_anchor(link.as_node());
                discovery
                    .references
                    .push(StylesheetReference::link(href, anchor).with_media(media));
            }
            LinkKind::Hint => {
                link.as_node().detach();
                discovery.removed_hints += 1;
            }
            LinkKind::Other => {}
        }
    }

    let styles: Vec<_> = document
        .select("style")
        .map_err(|()| anyhow::anyhow!("Invalid style selector"))?
        .collect();

    for style in styles {
        let node = style.as_node();
        let css = node.text_contents();
        let imports = extract_imports(&css);
        if imports.is_empty() {
            continue;
        }

        let media = media_query(style.attributes.borrow().get("media"));
        let anchor = discovery.push_anchor(node);
        for import in &imports {
            log::debug!("Found @import {} in <style> block", import.path);
            discovery
                .references
                .push(StylesheetReference::from_statement(import, anchor).with_media(media.clone()));
        }

        replace_text(node, strip_statements(&css, &imports));
    }

    log::debug!(
        "Discovered {} stylesheet references, removed {} hints",
        discovery.references.len(),
        discovery.removed_hints
    );

    Ok(discovery)
}

fn classify_link(link: &NodeDataRef<ElementData>) -> LinkKind {
    let attrs = link.attributes.borrow();
    let rel = attrs.get("rel").unwrap_or_default();
    let href = attrs.get("href").map(str::trim).unwrap_or_default();

    let is_css_type = attrs
        .get("type")
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("text/css"));

    if is_css_type || has_rel(rel, "stylesheet") {
        if href.is_empty() {
            return LinkKind::Other;
        }
        return LinkKind::Stylesheet {
            href: href.to_string(),
            media: media_query(attrs.get("media")),
        };
    }

    let preloads_style = has_rel(rel, "preload")
        && attrs
            .get("as")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("style"));
    let prefetches_css = has_rel(rel, "prefetch") && href.to_ascii_lowercase().contains(".css");

    if preloads_style || prefetches_css {
        LinkKind::Hint
    } else {
        LinkKind::Other
    }
}

// An empty list and `all` place no restriction
fn media_query(value: Option<&str>) -> Option<String> {
    let media = value?.trim();
    (!media.is_empty() && !media.eq_ignore_ascii_case("all")).then(|| media.to_string())
}

fn has_rel(rel: &str, token: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|value| value.eq_ignore_ascii_case(token))
}

fn replace_text(node: &NodeRef, text: String) {
    for child in node.children().collect::<Vec<_>>() {
        child.detach();
    }
    node.append(NodeRef::new_text(text));
}
