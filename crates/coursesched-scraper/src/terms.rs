//! Term discovery from the registration system's term-selection page.

use std::sync::Arc;

use coursesched_core::{MarkerProfile, Term};
use tokio::sync::RwLock;

use crate::fetch::Fetcher;
use crate::forms::parse_forms;

/// Memoized list of registration terms.
///
/// Populated lazily on first use and kept for the life of the directory.
/// Only a non-empty list is cached, so an empty result means "unknown" and is
/// retried on the next call. There is no at-most-once guarantee: concurrent
/// cold calls may each fetch.
#[derive(Debug)]
pub struct TermDirectory {
    fetcher: Fetcher,
    profile: Arc<MarkerProfile>,
    host: String,
    cache: RwLock<Vec<Term>>,
}

impl TermDirectory {
    #[must_use]
    pub fn new(fetcher: Fetcher, profile: Arc<MarkerProfile>, host: &str) -> Self {
        Self {
            fetcher,
            profile,
            host: host.to_string(),
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Term codes in page order, the default-selected term first.
    pub async fn get_terms(&self) -> Vec<Term> {
        {
            let cached = self.cache.read().await;
            if !cached.is_empty() {
                tracing::debug!(count = cached.len(), "serving terms from cache");
                return cached.to_vec();
            }
        }

        let page = self
            .fetcher
            .get(&self.host, &self.profile.term_page_path)
            .await;
        let terms = parse_terms(&page);
        if terms.is_empty() {
            tracing::warn!(host = %self.host, "no terms found on term selection page");
            return terms;
        }
        tracing::info!(count = terms.len(), "parsed registration terms");

        let mut cache = self.cache.write().await;
        if cache.is_empty() {
            *cache = terms;
        }
        cache.to_vec()
    }

    /// Clears the cached list and fetches it again.
    pub async fn refresh(&self) -> Vec<Term> {
        self.cache.write().await.clear();
        self.get_terms().await
    }
}

/// Values of the first multi-valued field of the page's first form.
///
/// The term dropdown is the only field on that form with more than one
/// candidate value. Empty values are dropped and duplicates keep their first
/// position.
fn parse_terms(html: &str) -> Vec<Term> {
    let Some(form) = parse_forms(html).into_iter().next() else {
        return Vec::new();
    };
    let Some(field) = form.inputs.into_iter().find(|input| input.values.len() > 1) else {
        return Vec::new();
    };

    let mut terms: Vec<Term> = Vec::new();
    for value in field.values {
        if !value.is_empty() && !terms.contains(&value) {
            terms.push(value);
        }
    }
    terms
}
