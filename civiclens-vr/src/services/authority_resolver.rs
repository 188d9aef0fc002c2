//! Authority resolution via filtered POI waterfall search
//!
//! Queries run in order, most specific first; candidates are evaluated in
//! the order the search service ranks them. A candidate must clear the
//! block-list (rejects unrelated businesses outright) and then the
//! per-intent allow-list. The first survivor wins as Verified. Search
//! errors count as empty result sets, and when nothing survives the
//! resolver synthesizes a deterministic name — it never raises.

use std::sync::Arc;

use crate::models::{AuthorityConfidence, AuthorityMatch, GeoPoint, Intent};
use crate::models::routing::BLOCK_TERMS;
use crate::services::poi_client::PoiSearch;

const SEARCH_RADIUS_M: u32 = 5000;
const SEARCH_RESULT_LIMIT: u32 = 5;

/// Resolver tuning, curated defaults with per-deployment extension
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub radius_m: u32,
    pub limit: u32,
    /// Lowercased terms that reject a candidate name outright
    pub block_terms: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            radius_m: SEARCH_RADIUS_M,
            limit: SEARCH_RESULT_LIMIT,
            block_terms: BLOCK_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ResolverConfig {
    /// Extend the block-list with deployment-specific terms
    pub fn with_extra_block_terms(mut self, extra: &[String]) -> Self {
        self.block_terms
            .extend(extra.iter().map(|t| t.to_lowercase()));
        self
    }
}

/// Enforcement authority resolver
pub struct AuthorityResolver {
    poi: Arc<dyn PoiSearch>,
    config: ResolverConfig,
}

impl AuthorityResolver {
    pub fn new(poi: Arc<dyn PoiSearch>, config: ResolverConfig) -> Self {
        Self { poi, config }
    }

    /// Resolve the enforcement authority for a category at a location
    ///
    /// Infallible: degrades to a synthesized `"{place} {label}"` name
    /// when no verified candidate survives filtering.
    pub async fn resolve(
        &self,
        category_text: &str,
        place: &str,
        center: GeoPoint,
    ) -> AuthorityMatch {
        let intent = Intent::from_text(category_text);

        for query in intent.queries(place) {
            let candidates = match self
                .poi
                .search(&query, center, self.config.radius_m, self.config.limit)
                .await
            {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "POI query failed, continuing waterfall");
                    continue;
                }
            };

            for candidate in candidates {
                let name_lower = candidate.name.to_lowercase();

                if self.is_blocked(&name_lower) {
                    tracing::debug!(name = %candidate.name, "Candidate rejected by block-list");
                    continue;
                }

                if !intent.allow_terms().iter().any(|t| name_lower.contains(t)) {
                    tracing::debug!(name = %candidate.name, "Candidate missing allow-list term");
                    continue;
                }

                tracing::info!(
                    name = %candidate.name,
                    query = %query,
                    intent = ?intent,
                    "Verified authority found"
                );
                return AuthorityMatch {
                    name: candidate.name,
                    confidence: AuthorityConfidence::Verified,
                };
            }
        }

        let synthesized = AuthorityMatch::synthesized(place, intent);
        tracing::info!(
            name = %synthesized.name,
            intent = ?intent,
            "No verified candidate survived filtering, using synthesized authority"
        );
        synthesized
    }

    fn is_blocked(&self, name_lower: &str) -> bool {
        self.config.block_terms.iter().any(|t| name_lower.contains(t))
    }
}
