//! civiclens-vr - Violation Reports Microservice
//!
//! **Module Identity:**
//! - Name: civiclens-vr (Violation Reports)
//! - Port: 5830
//!
//! Runs the authority routing and violation report pipeline: image
//! classification via an external vision model, enforcement authority
//! resolution via POI search, report persistence, and best-effort
//! authority alert dispatch.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use civiclens_common::config::{RootFolderInitializer, RootFolderResolver};
use civiclens_vr::services::authority_resolver::ResolverConfig;
use civiclens_vr::services::model_gateway::ModelGateway;
use civiclens_vr::services::notifier::{AuthorityNotifier, DisabledNotifier, HttpNotifier};
use civiclens_vr::services::poi_client::{DisabledPoiSearch, PoiSearch, TomTomClient};
use civiclens_vr::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Bootstrap config must load before tracing so the level is known
    let toml_config = civiclens_common::config::load_toml_config("civiclens-vr")?;

    let level: Level = toml_config.logging.level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let port = civiclens_vr::config::port(&toml_config);

    info!("Starting civiclens-vr (Violation Reports) microservice");
    info!("Port: {}", port);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve and initialize the root folder
    let resolver = RootFolderResolver::new("civiclens-vr", &toml_config);
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());

    let db_pool = civiclens_vr::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    // Vision model gateway: configuration-driven ordered candidate list
    let model_api_key = civiclens_vr::config::resolve_model_api_key(&toml_config)?;
    let candidates = civiclens_vr::config::model_candidates(&toml_config);
    let gateway = Arc::new(ModelGateway::gemini(&model_api_key, &candidates)?);
    info!("Model gateway initialized ({} candidates)", candidates.len());

    // POI search degrades to synthesized routing without a key
    let poi: Arc<dyn PoiSearch> = match civiclens_vr::config::resolve_poi_api_key(&toml_config) {
        Some(key) => Arc::new(TomTomClient::new(key)?),
        None => Arc::new(DisabledPoiSearch),
    };

    // Authority alert dispatch is optional and best-effort
    let notifier: Arc<dyn AuthorityNotifier> = match toml_config.dispatch_url.clone() {
        Some(url) => {
            info!("Authority alerts will dispatch to {}", url);
            Arc::new(HttpNotifier::new(url)?)
        }
        None => Arc::new(DisabledNotifier),
    };

    let resolver_config =
        ResolverConfig::default().with_extra_block_terms(&toml_config.authority_blocklist_extra);

    let state = AppState::new(db_pool, gateway, poi, notifier, resolver_config);

    let app = civiclens_vr::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
