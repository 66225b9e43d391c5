//! Recursive stylesheet resolution
//!
//! Resolves one reference depth first: fetch, pull out nested `@import`
//! statements, resolve each of those the same way, then emit the stylesheet's
//! own body after everything it imported so the cascade order matches what a
//! browser would apply.

use std::future::Future;
use std::pin::Pin;

use super::dedup::AddressSet;
use super::downloaders::StylesheetFetcher;
use super::imports::{extract_imports, strip_statements};
use super::rewriter::{absolutize_css_urls, strip_nested_style_tags};
use super::types::{EmbeddedStylesheet, FetchStatus, Resolution, StylesheetReference};
use crate::utils::normalize_href;

/// Boxed future returned by [`Resolver::resolve`]
pub type ResolutionFuture<'a> = Pin<Box<dyn Future<Output = Resolution> + Send + 'a>>;

/// Drives fetching and import expansion for a single embedding run.
///
/// The visited set spans every level of recursion, so an address is fetched
/// at most once per run even across import cycles or diamond-shaped graphs.
pub struct Resolver<'f, F: StylesheetFetcher + ?Sized> {
    fetcher: &'f F,
    base: Option<&'f str>,
    visited: AddressSet,
}

impl<'f, F: StylesheetFetcher + ?Sized> Resolver<'f, F> {
    /// `visited` must already contain every top-level address that will be
    /// passed to [`resolve`](Self::resolve).
    #[must_use]
    pub fn new(fetcher: &'f F, base: Option<&'f str>, visited: AddressSet) -> Self {
        Self {
            fetcher,
            base,
            visited,
        }
    }

    /// Resolve `reference`, already normalized to `address`
    pub fn resolve<'a>(
        &'a mut self,
        reference: &'a StylesheetReference,
        address: &'a str,
    ) -> ResolutionFuture<'a>
    where
        'f: 'a,
    {
        Box::pin(async move {
            log::debug!("Resolving {} reference {address}", reference.origin);

            let outcome = self.fetcher.fetch(address).await;
            let body = match outcome.status {
                FetchStatus::Success { body, .. } => body,
                FetchStatus::Failure { reason } => {
                    return Resolution::not_found(outcome.address, reason);
                }
            };

            let body = strip_nested_style_tags(&body);
            let imports = extract_imports(&body);
            let mut resolution = Resolution::default();

            for import in &imports {
                // Nested imports share the top-level base
                let nested_address = normalize_href(&import.path, self.base);
                if !self.visited.insert(&nested_address) {
                    log::debug!("Skipping already visited import {nested_address} in {address}");
                    continue;
                }

                let nested = StylesheetReference::from_statement(import, reference.anchor());
                let nested_resolution = self.resolve(&nested, &nested_address).await;
                resolution.extend(nested_resolution);
            }

            let css = absolutize_css_urls(&strip_statements(&body, &imports), address);
            resolution.stylesheets.push(EmbeddedStylesheet {
                address: address.to_string(),
                css,
                condition: None,
                anchor: reference.anchor(),
                mode: reference.insertion_mode(),
            });

            for stylesheet in &mut resolution.stylesheets {
                reference.apply_conditions(stylesheet);
            }

            resolution
        })
    }

    /// Every address claimed so far, in claim order
    #[must_use]
    pub fn into_visited(self) -> AddressSet {
        self.visited
    }
}
