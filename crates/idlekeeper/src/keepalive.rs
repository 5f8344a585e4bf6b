//! Liveness endpoint for external uptime monitors.

use std::net::SocketAddr;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;

use crate::IdlekeeperError;

/// `GET /` answers `200 OK` with an empty body. Every other route is 404.
pub fn router() -> Router {
    Router::new().route("/", get(|| async { StatusCode::OK }))
}

/// A bound liveness server. Binding is separate from serving so that a port
/// conflict surfaces at startup.
pub struct KeepaliveServer {
    listener: TcpListener,
}

impl KeepaliveServer {
    pub async fn bind(addr: SocketAddr) -> Result<Self, IdlekeeperError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(IdlekeeperError::Keepalive)?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, IdlekeeperError> {
        self.listener.local_addr().map_err(IdlekeeperError::Keepalive)
    }

    /// Serves until the process exits.
    pub async fn run(self) -> Result<(), IdlekeeperError> {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!("keep-alive server listening on http://{addr}");
        }
        axum::serve(self.listener, router())
            .await
            .map_err(IdlekeeperError::Keepalive)
    }
}
