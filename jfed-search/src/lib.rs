//! jfed-search library - federated journal search
//!
//! Answers one search over a fixed set of independently-schemed SQLite
//! stores, each holding one publisher's (or registry's) journal catalog, and
//! returns a single deduplicated, filtered, sorted record set.

use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::Router;
use jfed_common::config::Environment;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod executor;
pub mod federation;
pub mod normalize;
pub mod predicate;
pub mod reconcile;
pub mod registry;
pub mod router;
pub mod stores;

use federation::FederationEngine;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FederationEngine>,
    /// Controls how much error detail reaches clients
    pub environment: Environment,
}

impl AppState {
    pub fn new(engine: FederationEngine, environment: Environment) -> Self {
        Self {
            engine: Arc::new(engine),
            environment,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            header::ACCESS_CONTROL_ALLOW_HEADERS,
        ]);

    Router::new()
        .route("/api/journals/search", post(api::search_journals))
        .merge(api::health_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
