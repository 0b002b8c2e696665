//! HTTP handlers for the dashboard and its JSON view.

use crate::render::{render_message, render_page};
use crate::AppState;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use meshboard_types::{aggregate, PeerMap, PeerSummary};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Response body for `GET /api/peers`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerReport {
    /// Configured node name.
    pub node_name: String,
    /// Bytes sent plus received across every link.
    pub total_bytes: u128,
    /// One entry per peer address, in address order.
    pub peers: Vec<PeerSummary>,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad gateway: {0}")]
    BadGateway(String),
    /// The page template could not be read, so there is no page to put an
    /// error into. Answered with a plain-text body.
    #[error("dashboard template unavailable")]
    TemplateUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadGateway(msg) => {
                let body = Json(serde_json::json!({
                    "error": msg
                }));
                (StatusCode::BAD_GATEWAY, body).into_response()
            }
            ApiError::TemplateUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "dashboard template unavailable",
            )
                .into_response(),
        }
    }
}

/// Queries the admin endpoint and aggregates its link table.
async fn fetch_peers(state: &AppState) -> Result<PeerMap, meshboard_admin::AdminError> {
    let links = state.admin.get_switch_peers().await?;
    let peers = aggregate(&links.switchpeers);
    tracing::debug!(
        links = links.switchpeers.len(),
        peers = peers.len(),
        total_bytes = peers.total_bytes,
        "aggregated switch peers"
    );
    Ok(peers)
}

/// Handler for `GET /`.
///
/// Admin endpoint failures are reported inside the page with a `200`; only a
/// missing or unreadable template produces an error status.
pub async fn dashboard_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Html<String>, ApiError> {
    let template = tokio::fs::read_to_string(&state.template_path)
        .await
        .map_err(|e| {
            tracing::error!(
                path = %state.template_path.display(),
                error = %e,
                "failed to read dashboard template"
            );
            ApiError::TemplateUnavailable
        })?;

    let page = match fetch_peers(&state).await {
        Ok(peers) => render_page(&template, &state.node_name, &peers),
        Err(e) => {
            tracing::warn!(
                endpoint = %state.admin.endpoint(),
                error = %e,
                "admin query failed"
            );
            render_message(&template, &state.node_name, e.user_message())
        }
    };

    Ok(Html(page))
}

/// Handler for `GET /api/peers`.
pub async fn peers_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<PeerReport>, ApiError> {
    let peers = fetch_peers(&state).await.map_err(|e| {
        tracing::warn!(
            endpoint = %state.admin.endpoint(),
            error = %e,
            "admin query failed"
        );
        ApiError::BadGateway(e.user_message().to_string())
    })?;

    Ok(Json(PeerReport {
        node_name: state.node_name.clone(),
        total_bytes: peers.total_bytes,
        peers: peers.peers.into_values().collect(),
    }))
}
