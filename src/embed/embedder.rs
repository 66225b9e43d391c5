//! Embedding resolved stylesheets into the document
//!
//! Works on the serialized output of discovery: anchors are located through
//! [`ANCHOR_ATTRIBUTE`], each stylesheet becomes a `<style>` element placed
//! according to its [`InsertionMode`], and finally every marker is removed and
//! every anchored `<link>` detached, whether or not it got a replacement.

use std::collections::HashMap;

use anyhow::{Context, Result};
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;

use super::types::{AnchorId, EmbeddedStylesheet, InsertionMode};
use crate::utils::ANCHOR_ATTRIBUTE;

/// Write `stylesheets` into `html` in order and return the serialized result
pub fn embed(html: &str, stylesheets: &[EmbeddedStylesheet]) -> Result<String> {
    let document = kuchiki::parse_html().one(html);
    let anchors = collect_anchors(&document)?;

    for stylesheet in stylesheets {
        let style = style_element(&stylesheet.style_text())?;

        match (stylesheet.mode, anchors.get(&stylesheet.anchor)) {
            (InsertionMode::Replace | InsertionMode::InsertBefore, Some(anchor)) => {
                anchor.insert_before(style);
                log::debug!(
                    "Embedded {} before anchor {}",
                    stylesheet.address,
                    stylesheet.anchor.0
                );
            }
            (InsertionMode::Append, _) => append_to_head(&document, style)?,
            (_, None) => {
                log::warn!(
                    "Anchor {} for {} is gone, appending to <head>",
                    stylesheet.anchor.0,
                    stylesheet.address
                );
                append_to_head(&document, style)?;
            }
        }
    }

    for anchor in anchors.values() {
        let Some(element) = anchor.as_element() else {
            continue;
        };
        element.attributes.borrow_mut().remove(ANCHOR_ATTRIBUTE);
        if &*element.name.local == "link" {
            anchor.detach();
        }
    }

    serialize_document(&document)
}

/// Serialize a kuchiki tree back to HTML text
pub fn serialize_document(document: &NodeRef) -> Result<String> {
    let mut html_output = Vec::new();
    document
        .serialize(&mut html_output)
        .context("Failed to serialize HTML document")?;

    String::from_utf8(html_output).context("Failed to convert HTML bytes to UTF-8 string")
}

fn collect_anchors(document: &NodeRef) -> Result<HashMap<AnchorId, NodeRef>> {
    let selector = format!("[{ANCHOR_ATTRIBUTE}]");
    let mut anchors = HashMap::new();

    for element in document
        .select(&selector)
        .map_err(|()| anyhow::anyhow!("Invalid anchor selector"))?
    {
        let id = element
            .attributes
            .borrow()
            .get(ANCHOR_ATTRIBUTE)
            .and_then(|value| value.parse::<usize>().ok());

        match id {
            Some(id) => {
                anchors.insert(AnchorId(id), element.as_node().clone());
            }
            None => log::debug!("Ignoring malformed {ANCHOR_ATTRIBUTE} attribute"),
        }
    }

    Ok(anchors)
}

/// Build a detached `<style>` element holding `css`
fn style_element(css: &str) -> Result<NodeRef> {
    let fragment = kuchiki::parse_html().one(format!("<style type=\"text/css\">\n{css}\n</style>"));
    let style = fragment
        .select_first("style")
        .map_err(|()| anyhow::anyhow!("Failed to build <style> element"))?
        .as_node()
        .clone();
    style.detach();
    Ok(style)
}

fn append_to_head(document: &NodeRef, node: NodeRef) -> Result<()> {
    let head = document
        .select_first("head")
        .map_err(|()| anyhow::anyhow!("Document has no <head>"))?;
    head.as_node().append(node);
    Ok(())
}
