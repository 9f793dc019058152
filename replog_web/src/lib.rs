#![forbid(unsafe_code)]

//! HTTP front end for the RepLog workout log.
//!
//! [`app`] is the complete request handler: method override in front of the
//! route table. The `replog` binary either serves it on a TCP listener or,
//! in serverless mode, leaves mounting it to an external host.

pub mod error;
pub mod method_override;
pub mod routes;
pub mod state;
pub mod views;

pub use method_override::{MethodOverride, MethodOverrideLayer};
pub use state::AppState;

use axum::extract::Request;
use axum::{Router, ServiceExt};
use replog_core::{Config, Result};
use tower::Layer;

/// The full request handler for `state`
pub fn app(state: AppState) -> MethodOverride<Router> {
    MethodOverrideLayer.layer(routes::router(state))
}

/// Connect the store and build the handler state from configuration
pub fn build_state(config: &Config) -> Result<AppState> {
    config.validate()?;
    let store = replog_core::connect(&config.database.url)?;
    Ok(AppState::new(store, config.assets.static_dir.clone()))
}

/// Serve until Ctrl-C, or return immediately in serverless mode
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config)?;

    if config.server.serverless {
        tracing::info!(
            "Serverless mode: request handler is exported through replog_web::app; not opening a listener"
        );
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    let addr = listener.local_addr()?;
    tracing::info!(addr = %addr, "RepLog running at http://localhost:{}", addr.port());

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
