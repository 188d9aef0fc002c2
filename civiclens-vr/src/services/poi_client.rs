//! Point-of-interest search client
//!
//! Text search against a TomTom-style fuzzy search API, scoped to a
//! radius around the submission coordinates. Responses are untrusted and
//! parsed defensively; the resolver treats every failure here as "no
//! candidates from this query".

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::GeoPoint;

const TOMTOM_BASE_URL: &str = "https://api.tomtom.com/search/2/search";
const USER_AGENT: &str = "CivicLens/0.1.0 (https://github.com/civiclens/civiclens)";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// POI search client errors
#[derive(Debug, Error)]
pub enum PoiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One named place returned by the search service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiCandidate {
    pub name: String,
}

/// Ranked text search around a point
#[async_trait]
pub trait PoiSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        center: GeoPoint,
        radius_m: u32,
        limit: u32,
    ) -> Result<Vec<PoiCandidate>, PoiError>;
}

/// TomTom fuzzy search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    poi: Option<SearchPoi>,
}

#[derive(Debug, Deserialize)]
struct SearchPoi {
    name: String,
}

/// TomTom search API client
pub struct TomTomClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl TomTomClient {
    pub fn new(api_key: String) -> Result<Self, PoiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PoiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }
}

#[async_trait]
impl PoiSearch for TomTomClient {
    async fn search(
        &self,
        query: &str,
        center: GeoPoint,
        radius_m: u32,
        limit: u32,
    ) -> Result<Vec<PoiCandidate>, PoiError> {
        let url = format!(
            "{}/{}.json",
            TOMTOM_BASE_URL,
            urlencode(query)
        );

        tracing::debug!(query = %query, lat = center.lat, lon = center.lon, "Querying POI search API");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("lat", &center.lat.to_string()),
                ("lon", &center.lon.to_string()),
                ("radius", &radius_m.to_string()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| PoiError::NetworkError(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PoiError::ApiError(status.as_u16(), error_text));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| PoiError::ParseError(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .filter_map(|r| r.poi.map(|p| PoiCandidate { name: p.name }))
            .collect())
    }
}

/// POI search used when no API key is configured
///
/// Every query yields no candidates, so authority routing degrades to
/// synthesized names instead of failing.
pub struct DisabledPoiSearch;

#[async_trait]
impl PoiSearch for DisabledPoiSearch {
    async fn search(
        &self,
        query: &str,
        _center: GeoPoint,
        _radius_m: u32,
        _limit: u32,
    ) -> Result<Vec<PoiCandidate>, PoiError> {
        tracing::debug!(query = %query, "POI search disabled, returning no candidates");
        Ok(Vec::new())
    }
}

/// Minimal percent-encoding for the query path segment
fn urlencode(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for byte in query.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
