#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use meshboard_admin::{AdminClient, AdminEndpoint};
use meshboard_server::{app, AppState};
use std::net::SocketAddr;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt; // for oneshot

pub const TEMPLATE: &str = "<title>%HOSTNAME%</title><body>%PEERS%</body>";

/// Keeps the temporary asset directory alive for the duration of a test.
pub struct Fixture {
    pub dir: TempDir,
    pub app: Router,
}

/// Builds the app with a template and stylesheet in a fresh directory.
pub fn fixture(endpoint: AdminEndpoint, node_name: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("template.html"), TEMPLATE).unwrap();
    std::fs::write(dir.path().join("style.css"), "body { color: red; }").unwrap();

    let state = AppState {
        node_name: node_name.to_string(),
        admin: AdminClient::new(endpoint, Duration::from_secs(2)),
        template_path: dir.path().join("template.html"),
        static_dir: dir.path().to_path_buf(),
    };
    Fixture {
        app: app(state),
        dir,
    }
}

/// Starts a fake admin endpoint that answers every connection with `body`.
pub async fn spawn_admin(body: impl Into<String>) -> SocketAddr {
    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut req = vec![0u8; 1024];
                let _ = socket.read(&mut req).await;
                let _ = socket.write_all(body.as_bytes()).await;
            });
        }
    });
    addr
}

/// Returns an address nothing is listening on.
pub async fn dead_endpoint() -> AdminEndpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    AdminEndpoint::Tcp(addr.to_string())
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (
        parts.status,
        parts.headers,
        String::from_utf8_lossy(&bytes).to_string(),
    )
}

pub fn switch_peers(links: serde_json::Value) -> String {
    serde_json::json!({
        "status": "success",
        "response": { "switchpeers": links }
    })
    .to_string()
}
