//! Nearby POI discovery.
//!
//! One discovery cycle fans a search out across the category vocabulary,
//! merges the results, removes duplicates, ranks by distance and keeps the
//! closest few. Individual search failures never reach the caller.

use crate::geo::{Position, SearchRegion};
use crate::poi::{PoiCandidate, PoiSearchProvider, RankedPoi, SearchError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default acceptance radius in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 500.0;
/// Default number of POIs kept per cycle.
pub const DEFAULT_MAX_RESULTS: usize = 5;
/// Two same-named places closer than this are the same place.
pub const DEFAULT_DUPLICATE_THRESHOLD_METERS: f64 = 10.0;

/// Default French search vocabulary.
pub fn default_category_terms() -> Vec<String> {
    [
        "restaurant",
        "café",
        "pharmacie",
        "arrêt de bus",
        "boulangerie",
        "supermarché",
        "banque",
        "hôtel",
        "musée",
        "parc",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Discovery tuning.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// One search is issued per term
    pub category_terms: Vec<String>,
    /// Acceptance radius used when the caller does not pass one
    pub radius_meters: f64,
    /// Maximum POIs returned
    pub max_results: usize,
    /// Proximity under which same-named candidates collapse
    pub duplicate_threshold_meters: f64,
    /// Per-term search timeout
    pub search_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            category_terms: default_category_terms(),
            radius_meters: DEFAULT_RADIUS_METERS,
            max_results: DEFAULT_MAX_RESULTS,
            duplicate_threshold_meters: DEFAULT_DUPLICATE_THRESHOLD_METERS,
            search_timeout: Duration::from_secs(10),
        }
    }
}

/// Runs discovery cycles against a search provider.
pub struct DiscoveryEngine<P> {
    provider: Arc<P>,
    config: DiscoveryConfig,
}

impl<P> Clone for DiscoveryEngine<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
        }
    }
}

impl<P: PoiSearchProvider> DiscoveryEngine<P> {
    /// Create an engine over a shared provider.
    pub fn new(provider: Arc<P>, config: DiscoveryConfig) -> Self {
        Self { provider, config }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults(provider: Arc<P>) -> Self {
        Self::new(provider, DiscoveryConfig::default())
    }

    /// Engine configuration.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover using the configured radius.
    pub async fn discover_nearby(&self, location: Position) -> Vec<RankedPoi> {
        self.discover(location, self.config.radius_meters).await
    }

    /// Run one discovery cycle around `location`.
    ///
    /// Returns at most `max_results` POIs within `radius_meters`, closest
    /// first. An empty list means nothing was found.
    pub async fn discover(&self, location: Position, radius_meters: f64) -> Vec<RankedPoi> {
        debug!("Discovering POIs within {}m of {}", radius_meters, location);

        let region = SearchRegion::around(location, radius_meters);
        let searches = self
            .config
            .category_terms
            .iter()
            .map(|term| self.search_term(term, region));

        // Wait for every term to settle; order of results follows term order.
        let merged: Vec<PoiCandidate> = futures::future::join_all(searches)
            .await
            .into_iter()
            .flatten()
            .collect();

        let unique = deduplicate(merged, self.config.duplicate_threshold_meters);
        let ranked = rank_by_distance(unique, &location, radius_meters, self.config.max_results);

        debug!("Discovery returned {} POIs", ranked.len());
        for (index, poi) in ranked.iter().enumerate() {
            debug!(
                "{}. {} - {}m",
                index + 1,
                poi.candidate.name.as_deref().unwrap_or("<unnamed>"),
                poi.distance_meters as i64
            );
        }

        ranked
    }

    /// Search one term, converting failure into an empty result.
    async fn search_term(&self, term: &str, region: SearchRegion) -> Vec<PoiCandidate> {
        let timeout = self.config.search_timeout;
        let outcome = match tokio::time::timeout(timeout, self.provider.search(term, &region)).await
        {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(timeout.as_secs())),
        };

        match outcome {
            Ok(candidates) => {
                debug!("Found {} items for term: {}", candidates.len(), term);
                candidates
            }
            Err(e) => {
                warn!("Search failed for term {}: {}", term, e);
                Vec::new()
            }
        }
    }
}

/// Drop candidates that repeat an earlier one.
///
/// Two candidates are the same place when their names match case-insensitively
/// and they are less than `threshold_meters` apart. The first occurrence wins.
/// Unnamed candidates are never considered duplicates.
pub fn deduplicate(candidates: Vec<PoiCandidate>, threshold_meters: f64) -> Vec<PoiCandidate> {
    let mut unique: Vec<PoiCandidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let is_duplicate = candidate.normalized_name().is_some_and(|name| {
            unique.iter().any(|existing| {
                existing.normalized_name().as_deref() == Some(name.as_str())
                    && existing.coordinate.distance_to(&candidate.coordinate) < threshold_meters
            })
        });

        if !is_duplicate {
            unique.push(candidate);
        }
    }

    unique
}

/// Compute distances, keep those within the radius, sort and truncate.
///
/// Sorting is stable, so equal distances keep their input order.
pub fn rank_by_distance(
    candidates: Vec<PoiCandidate>,
    origin: &Position,
    radius_meters: f64,
    max_results: usize,
) -> Vec<RankedPoi> {
    let mut ranked: Vec<RankedPoi> = candidates
        .into_iter()
        .map(|candidate| RankedPoi::from_origin(candidate, origin))
        .filter(|poi| poi.distance_meters <= radius_meters)
        .collect();

    ranked.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    ranked.truncate(max_results);
    ranked
}
