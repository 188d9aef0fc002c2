//! civiclens-vr library interface
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::authority_resolver::{AuthorityResolver, ResolverConfig};
use crate::services::classifier::ViolationClassifier;
use crate::services::model_gateway::ModelGateway;
use crate::services::notifier::AuthorityNotifier;
use crate::services::poi_client::PoiSearch;
use crate::services::report_assembler::ReportAssembler;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Image classifier (model gateway + normalizer)
    pub classifier: Arc<ViolationClassifier>,
    /// Report assembler (resolver + persistence + notification)
    pub assembler: Arc<ReportAssembler>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        gateway: Arc<ModelGateway>,
        poi: Arc<dyn PoiSearch>,
        notifier: Arc<dyn AuthorityNotifier>,
        resolver_config: ResolverConfig,
    ) -> Self {
        let classifier = Arc::new(ViolationClassifier::new(gateway));
        let resolver = Arc::new(AuthorityResolver::new(poi, resolver_config));
        let assembler = Arc::new(ReportAssembler::new(db.clone(), resolver, notifier));

        Self {
            db,
            classifier,
            assembler,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Record the most recent hard failure for the health endpoint
    pub async fn record_error(&self, message: String) {
        *self.last_error.write().await = Some(message);
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::analyze_routes())
        .merge(api::report_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
