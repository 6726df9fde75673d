pub mod handlers;
pub mod routes;
pub mod state;
pub mod static_files;
pub mod templates;

use axum::Router;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::WebConfig;
use crate::error::{AppError, Result};
use state::AppState;

pub fn build_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .merge(routes::ui_routes())
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Serves until Ctrl-C, then closes the active database connection.
pub async fn run_server(config: WebConfig, state: Arc<AppState>) -> Result<()> {
    let addr = resolve(&config.host, config.port).await?;
    let listener = bind_listener(addr)
        .map_err(|e| AppError::internal(format!("Unable to bind {}: {}", addr, e)))?;
    info!("Listening on http://{}", addr);

    let app = build_router(Arc::clone(&state), config.request_timeout());
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    state.db_session.shutdown().await;
    info!("Database session closed");

    served.map_err(|e| AppError::internal(format!("Server error: {}", e)))
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| AppError::configuration(format!("Invalid listen address {}: {}", host, e)))?
        .next()
        .ok_or_else(|| AppError::configuration(format!("Invalid listen address {}", host)))
}

fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    TcpListener::from_std(socket.into())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Unable to listen for shutdown signal: {}", e),
    }
}
