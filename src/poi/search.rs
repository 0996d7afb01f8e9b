//! POI search provider contract and a catalog-backed implementation.

use super::{PoiCandidate, PoiCategory};
use crate::geo::SearchRegion;
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors a search provider can report for a single query.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Search quota exceeded")]
    QuotaExceeded,

    #[error("Search timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to load place catalog: {0}")]
    Catalog(String),
}

/// Trait for location search backends.
///
/// One call covers one query term; callers fan out across terms themselves.
pub trait PoiSearchProvider: Send + Sync {
    /// Search for places matching `term` inside `region`.
    fn search(
        &self,
        term: &str,
        region: &SearchRegion,
    ) -> impl std::future::Future<Output = Result<Vec<PoiCandidate>, SearchError>> + Send;
}

/// A catalog entry: a place plus extra words it answers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPlace {
    #[serde(flatten)]
    pub candidate: PoiCandidate,
    /// Additional query terms matching this place (e.g. "arrêt de bus")
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CatalogPlace {
    fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return false;
        }
        let category = self.candidate.category;
        category.label(Language::French).to_lowercase() == term
            || category.label(Language::English).to_lowercase() == term
            || PoiCategory::from_provider_str(&term) == category && category != PoiCategory::Other
            || self.keywords.iter().any(|k| k.to_lowercase() == term)
            || self
                .candidate
                .normalized_name()
                .is_some_and(|name| name.contains(&term))
    }
}

/// Search provider answering from an in-memory place catalog.
#[derive(Debug, Clone, Default)]
pub struct FixtureSearchProvider {
    places: Vec<CatalogPlace>,
}

impl FixtureSearchProvider {
    /// Create a provider over the given catalog.
    pub fn new(places: Vec<CatalogPlace>) -> Self {
        Self { places }
    }

    /// Load a JSON array of catalog places.
    pub fn from_json_file(path: &Path) -> Result<Self, SearchError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Catalog(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    /// Parse a JSON array of catalog places.
    pub fn from_json_str(content: &str) -> Result<Self, SearchError> {
        let places: Vec<CatalogPlace> =
            serde_json::from_str(content).map_err(|e| SearchError::Catalog(e.to_string()))?;
        tracing::debug!("Loaded {} catalog places", places.len());
        Ok(Self::new(places))
    }

    /// Number of places in the catalog.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl PoiSearchProvider for FixtureSearchProvider {
    async fn search(
        &self,
        term: &str,
        region: &SearchRegion,
    ) -> Result<Vec<PoiCandidate>, SearchError> {
        let results = self
            .places
            .iter()
            .filter(|place| place.matches(term) && region.contains(&place.candidate.coordinate))
            .map(|place| place.candidate.clone().with_source_term(term))
            .collect();
        Ok(results)
    }
}
