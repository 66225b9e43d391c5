//! Address deduplication
//!
//! Every stylesheet address is embedded at most once per run. [`AddressSet`]
//! remembers claimed addresses in claim order and is shared by the top-level
//! pass and the recursive import resolution.

use std::collections::HashSet;

use super::types::StylesheetReference;
use crate::utils::normalize_href;

/// Ordered set of normalized stylesheet addresses
#[derive(Debug, Clone, Default)]
pub struct AddressSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl AddressSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `address`. Returns `false` if it was already claimed.
    pub fn insert(&mut self, address: &str) -> bool {
        if self.seen.contains(address) {
            return false;
        }
        self.seen.insert(address.to_string());
        self.order.push(address.to_string());
        true
    }

    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.seen.contains(address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Claimed addresses in claim order
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Outcome of deduplicating a batch of references
#[derive(Debug, Default)]
pub struct Deduplicated {
    /// First occurrence of each address, with its normalized address
    pub kept: Vec<(StylesheetReference, String)>,
    /// Later occurrences of an already claimed address
    pub duplicates: Vec<StylesheetReference>,
}

/// Normalize every reference against `base` and split first occurrences from
/// repeats, claiming the kept addresses in `seen`.
///
/// Order of `kept` follows the order of `references`.
pub fn deduplicate(
    references: Vec<StylesheetReference>,
    base: Option<&str>,
    seen: &mut AddressSet,
) -> Deduplicated {
    let mut result = Deduplicated::default();

    for reference in references {
        let address = normalize_href(&reference.raw_href, base);
        if seen.insert(&address) {
            result.kept.push((reference, address));
        } else {
            log::debug!(
                "Dropping duplicate {} reference to {address}",
                reference.origin
            );
            result.duplicates.push(reference);
        }
    }

    result
}
