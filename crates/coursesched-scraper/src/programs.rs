//! Program catalog: the degree listing and per-program requirement pages.

use std::sync::Arc;

use coursesched_core::{MarkerProfile, Program, RequirementBlock};
use tokio::sync::RwLock;

use crate::fetch::Fetcher;
use crate::markup::{before_ci, find_ci, normalize_entities, rfind_ci, split_ci};
use crate::requirements::{extract_requirements, render_requirements};

const ANCHOR_OPEN: &str = "<a href=\"";

/// A program request: the listing, or one program's requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramQuery {
    pub selected: Option<usize>,
}

impl ProgramQuery {
    #[must_use]
    pub fn listing() -> Self {
        Self { selected: None }
    }

    #[must_use]
    pub fn detail(index: usize) -> Self {
        Self {
            selected: Some(index),
        }
    }

    /// Reads the selected index from a request query such as `"?3"` or
    /// `"/programs?3"`. Anything that is not an index selects the listing.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let raw = query.rsplit_once('?').map_or(query, |(_, q)| q);
        Self {
            selected: raw.trim().parse().ok(),
        }
    }
}

/// Scrapes the catalog and memoizes the program list.
///
/// The list is fetched lazily on first use and kept for the life of the
/// catalog. Only a non-empty list is cached. Concurrent cold calls may each
/// fetch; the first to finish populates the cache.
#[derive(Debug)]
pub struct ProgramCatalog {
    fetcher: Fetcher,
    profile: Arc<MarkerProfile>,
    host: String,
    cache: RwLock<Vec<Program>>,
}

impl ProgramCatalog {
    #[must_use]
    pub fn new(fetcher: Fetcher, profile: Arc<MarkerProfile>, host: &str) -> Self {
        Self {
            fetcher,
            profile,
            host: host.to_string(),
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Programs in listing order. Empty means the listing could not be read.
    pub async fn list_programs(&self) -> Vec<Program> {
        {
            let cached = self.cache.read().await;
            if !cached.is_empty() {
                tracing::debug!(count = cached.len(), "serving programs from cache");
                return cached.to_vec();
            }
        }

        let root = self
            .fetcher
            .get(&self.host, &self.profile.catalog_root_path)
            .await;
        let Some(href) = listing_link(&root, &self.profile.programs_link_marker) else {
            tracing::warn!(
                host = %self.host,
                marker = %self.profile.programs_link_marker,
                "program listing link not found on catalog root"
            );
            return Vec::new();
        };

        let (host, path) = split_host_path(&href, &self.host);
        let listing = self.fetcher.get(&host, &path).await;
        let programs = parse_program_list(&listing, &self.profile);
        tracing::info!(host = %host, path = %path, count = programs.len(), "parsed program listing");

        if programs.is_empty() {
            return programs;
        }
        let mut cache = self.cache.write().await;
        if cache.is_empty() {
            *cache = programs;
        }
        cache.to_vec()
    }

    /// Clears the cached list and fetches it again.
    pub async fn refresh(&self) -> Vec<Program> {
        self.cache.write().await.clear();
        self.list_programs().await
    }

    /// One program name per line.
    pub async fn list_programs_text(&self) -> String {
        self.list_programs()
            .await
            .iter()
            .map(|program| format!("{}\n", program.name))
            .collect()
    }

    /// Requirement blocks of the program at `index` in the listing, or `None`
    /// when the index is out of range.
    pub async fn program_requirements(&self, index: usize) -> Option<Vec<RequirementBlock>> {
        let programs = self.list_programs().await;
        let Some(program) = programs.get(index) else {
            tracing::debug!(index, count = programs.len(), "program index out of range");
            return None;
        };

        let (host, path) = split_host_path(&program.detail_path, &self.host);
        let page = self.fetcher.get(&host, &path).await;
        let blocks = extract_requirements(&page, &self.profile);
        tracing::info!(program = %program.name, years = blocks.len(), "parsed program requirements");
        Some(blocks)
    }

    /// The rendered requirements when the query selects a listed program,
    /// otherwise the program listing.
    pub async fn get_programs(&self, query: ProgramQuery) -> String {
        if let Some(index) = query.selected {
            if let Some(blocks) = self.program_requirements(index).await {
                return render_requirements(&blocks);
            }
        }
        self.list_programs_text().await
    }
}

/// `href` of the nearest anchor opened before `marker`.
fn listing_link(html: &str, marker: &str) -> Option<String> {
    let marker_at = find_ci(html, marker, 0)?;
    let before = &html[..marker_at];
    let anchor = rfind_ci(before, ANCHOR_OPEN)?;
    let href = before[anchor + ANCHOR_OPEN.len()..].split('"').next()?;
    (!href.is_empty()).then(|| href.to_string())
}

/// Splits a link into `(host, path)`. Relative links stay on `default_host`.
fn split_host_path(href: &str, default_host: &str) -> (String, String) {
    let href = href.replace("&amp;", "&");
    let absolute = href
        .strip_prefix("https://")
        .or_else(|| href.strip_prefix("http://"))
        .or_else(|| href.strip_prefix("//"));

    match absolute {
        Some(rest) => match rest.find('/') {
            Some(slash) => (rest[..slash].to_string(), rest[slash..].to_string()),
            None => (rest.to_string(), "/".to_string()),
        },
        None if href.starts_with('/') => (default_host.to_string(), href),
        None => (default_host.to_string(), format!("/{href}")),
    }
}

fn parse_program_list(html: &str, profile: &MarkerProfile) -> Vec<Program> {
    let start = rfind_ci(html, &profile.program_list_start)
        .map_or(0, |at| at + profile.program_list_start.len());
    let region = before_ci(&html[start..], &profile.program_list_end).replace("&#8211;", "-");

    split_ci(&region, ANCHOR_OPEN)
        .into_iter()
        .skip(1)
        .filter_map(|fragment| {
            let (path, rest) = fragment.split_once('"')?;
            let (_, text) = rest.split_once('>')?;
            let name = normalize_entities(text.split('<').next().unwrap_or_default());
            let name = name.trim();
            if path.is_empty() || name.is_empty() {
                return None;
            }
            Some(Program {
                name: name.to_string(),
                detail_path: path.to_string(),
            })
        })
        .collect()
}
