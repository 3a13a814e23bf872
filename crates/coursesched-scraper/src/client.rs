//! Facade bundling the three downstream operations.

use std::sync::Arc;

use coursesched_core::{AppConfig, MarkerProfile, Section, Term};

use crate::error::ScraperError;
use crate::fetch::Fetcher;
use crate::programs::{ProgramCatalog, ProgramQuery};
use crate::sections::{SectionQuery, SectionSearch};
use crate::terms::TermDirectory;

/// Terms, programs and sections behind one shared [`Fetcher`] and marker
/// profile.
///
/// Share one instance (behind an `Arc` if needed) so the term and program
/// caches are shared too.
#[derive(Debug)]
pub struct CampusClient {
    terms: TermDirectory,
    programs: ProgramCatalog,
    sections: SectionSearch,
}

impl CampusClient {
    #[must_use]
    pub fn new(
        fetcher: Fetcher,
        profile: MarkerProfile,
        registration_host: &str,
        catalog_host: &str,
    ) -> Self {
        let profile = Arc::new(profile);
        Self {
            terms: TermDirectory::new(fetcher.clone(), Arc::clone(&profile), registration_host),
            programs: ProgramCatalog::new(fetcher.clone(), Arc::clone(&profile), catalog_host),
            sections: SectionSearch::new(fetcher, profile, registration_host),
        }
    }

    /// Builds a client for the hosts and transport settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig, profile: MarkerProfile) -> Result<Self, ScraperError> {
        let fetcher = Fetcher::from_config(config)?;
        Ok(Self::new(
            fetcher,
            profile,
            &config.registration_host,
            &config.catalog_host,
        ))
    }

    pub async fn get_terms(&self) -> Vec<Term> {
        self.terms.get_terms().await
    }

    pub async fn get_programs(&self, query: ProgramQuery) -> String {
        self.programs.get_programs(query).await
    }

    pub async fn get_sections(&self, query: &SectionQuery) -> Vec<Section> {
        self.sections.get_sections(query).await
    }

    #[must_use]
    pub fn terms(&self) -> &TermDirectory {
        &self.terms
    }

    #[must_use]
    pub fn programs(&self) -> &ProgramCatalog {
        &self.programs
    }

    #[must_use]
    pub fn sections(&self) -> &SectionSearch {
        &self.sections
    }
}
