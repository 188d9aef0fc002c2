//! Shared test helpers: mock external services and app construction
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use civiclens_vr::models::{GeoPoint, ViolationReport};
use civiclens_vr::services::authority_resolver::ResolverConfig;
use civiclens_vr::services::model_gateway::{ModelError, ModelGateway, VisionModel};
use civiclens_vr::services::notifier::{AuthorityNotifier, NotifyError};
use civiclens_vr::services::poi_client::{PoiCandidate, PoiError, PoiSearch};
use civiclens_vr::AppState;

/// Scripted vision model outcome
pub enum ModelOutcome {
    Text(String),
    RateLimited,
    Unavailable,
}

/// Vision model with a fixed scripted outcome and a call counter
pub struct ScriptedModel {
    id: String,
    outcome: ModelOutcome,
    pub calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(id: &str, outcome: ModelOutcome) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn invoke(
        &self,
        _prompt: &str,
        _image: Option<&civiclens_vr::models::EvidenceImage>,
    ) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            ModelOutcome::Text(text) => Ok(text.clone()),
            ModelOutcome::RateLimited => Err(ModelError::RateLimited("busy".to_string())),
            ModelOutcome::Unavailable => Err(ModelError::NetworkError("down".to_string())),
        }
    }
}

/// POI search over a static in-memory data set keyed by query text
#[derive(Default)]
pub struct StaticPoiSearch {
    by_query: HashMap<String, Vec<String>>,
}

impl StaticPoiSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, names: &[&str]) -> Self {
        self.by_query
            .insert(query.to_string(), names.iter().map(|n| n.to_string()).collect());
        self
    }
}

#[async_trait]
impl PoiSearch for StaticPoiSearch {
    async fn search(
        &self,
        query: &str,
        _center: GeoPoint,
        _radius_m: u32,
        _limit: u32,
    ) -> Result<Vec<PoiCandidate>, PoiError> {
        Ok(self
            .by_query
            .get(query)
            .map(|names| {
                names
                    .iter()
                    .map(|n| PoiCandidate { name: n.clone() })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Notifier that counts dispatches
pub struct RecordingNotifier {
    pub calls: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AuthorityNotifier for RecordingNotifier {
    async fn dispatch(&self, _report: &ViolationReport) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Create a test app over an in-memory database with mocked externals
pub async fn create_test_app(
    models: Vec<Arc<dyn VisionModel>>,
    poi: StaticPoiSearch,
    notifier: Arc<RecordingNotifier>,
) -> (Router, SqlitePool) {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    civiclens_vr::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    let gateway =
        Arc::new(ModelGateway::new(models).with_cooldown(Duration::from_millis(10)));

    let state = AppState::new(
        pool.clone(),
        gateway,
        Arc::new(poi),
        notifier,
        ResolverConfig::default(),
    );

    (civiclens_vr::build_router(state), pool)
}

/// A verdict wire payload as the model would emit it
pub fn model_verdict_json() -> String {
    r#"```json
{
  "violation_detected": true,
  "category": "Traffic",
  "title": "Rider without helmet",
  "description": "Two-wheeler rider clearly visible without helmet",
  "applicable_law": "Section 129 MV Act",
  "estimated_fine": "Rs 1000",
  "severity": "High",
  "preventive_action": "Wear a helmet",
  "confidence": "confirmed"
}
```"#
        .to_string()
}
