//! Meshboard binary: serves the peer dashboard of a mesh node.
//!
//! Starts an axum HTTP server with structured logging and graceful shutdown
//! on SIGTERM/SIGINT.

use clap::Parser;
use meshboard_server::config::{self, Config, ConfigSource};
use meshboard_server::{app, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Web dashboard of peer traffic for a mesh node.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "meshboard.toml")]
    config: String,

    /// Friendly name of the node
    #[arg(long)]
    nodename: Option<String>,

    /// Admin endpoint, `unix:///path` or `host:port`
    #[arg(long)]
    adminaddr: Option<String>,

    /// Address and port to listen on
    #[arg(long)]
    listenaddr: Option<SocketAddr>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(name) = self.nodename {
            config.node.name = name;
        }
        if let Some(endpoint) = self.adminaddr {
            config.admin.endpoint = endpoint;
        }
        if let Some(listen) = self.listenaddr {
            config.server.listen = listen;
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (mut config, source) = config::load_config(Some(cli.config.as_str()))
        .expect("failed to load configuration: the server cannot start without valid config");
    let config_path = cli.config.clone();
    cli.apply(&mut config);

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match source {
        ConfigSource::File => tracing::info!(path = %config_path, "loaded config file"),
        ConfigSource::Defaults => {
            tracing::info!(path = %config_path, "config file not found, using defaults")
        }
    }

    let state = AppState::from_config(&config)
        .expect("invalid admin settings: check admin.endpoint, admin.timeout_secs or --adminaddr");

    tracing::info!(node_name = %state.node_name, "using node name");
    tracing::info!(endpoint = %state.admin.endpoint(), "using admin endpoint");
    tracing::info!(
        template = %state.template_path.display(),
        static_dir = %state.static_dir.display(),
        "serving page assets"
    );

    let addr = config.server.listen;
    tracing::info!(%addr, "starting meshboard server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address: is another process using this port?");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("meshboard server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
