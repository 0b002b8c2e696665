//! Meshboard server library logic.
//!
//! Serves a status page for a mesh node. Every page load queries the node's
//! admin endpoint, aggregates the link table per peer and renders the result
//! into an HTML template. Nothing is cached between requests.

pub mod api;
pub mod config;
pub mod render;

use axum::{routing::get, Extension, Json, Router};
use config::{Config, ConfigError};
use meshboard_admin::AdminClient;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

/// Static files served from [`AppState::static_dir`] at `/<name>`.
pub const STATIC_ASSETS: [&str; 3] = ["style.css", "chartist.min.css", "chartist.min.js"];

/// Application state shared across all request handlers.
///
/// Read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Node name shown in the page header.
    pub node_name: String,
    /// Client for the node's admin endpoint.
    pub admin: AdminClient,
    /// Page template, read on every dashboard request.
    pub template_path: PathBuf,
    /// Directory containing [`STATIC_ASSETS`].
    pub static_dir: PathBuf,
}

impl AppState {
    /// Builds the state from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the admin address is malformed or the admin
    /// timeout is 0.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            node_name: config.node.name.clone(),
            admin: config.admin_client()?,
            template_path: config.server.template.clone(),
            static_dir: config.server.static_dir.clone(),
        })
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(api::dashboard_handler))
        .route("/api/peers", get(api::peers_handler))
        .route("/health", get(health));

    for asset in STATIC_ASSETS {
        let path = state.static_dir.join(asset);
        router = router.route_service(&format!("/{asset}"), ServeFile::new(path));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
