//! idlekeeper binary.
//!
//! Loads settings (see [`Settings::from_env`]), starts the liveness endpoint
//! on `0.0.0.0:$PORT` and supervises game sessions until a signal arrives.
//!
//! Exit status: `0` after Ctrl-C / SIGTERM, `1` on any fatal error.

use std::net::SocketAddr;
use std::process::ExitCode;

use idlekeeper::{IdlekeeperError, KeepaliveServer, Settings, Supervisor};
use idlekeeper_bridge::WebSocketConnector;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_status())
        }
    }
}

async fn run() -> Result<(), IdlekeeperError> {
    let settings = Settings::from_env()?;
    let connector = WebSocketConnector::new(settings.bridge.url.clone());
    let supervisor = Supervisor::new(&settings, connector)?;

    let keepalive =
        KeepaliveServer::bind(SocketAddr::from(([0, 0, 0, 0], settings.keepalive.port))).await?;
    info!(
        "web server started and listening on port {}",
        settings.keepalive.port
    );

    tokio::select! {
        result = supervisor.run() => result.map(|never| match never {}),
        result = keepalive.run() => result,
        () = shutdown_signal() => {
            warn!("received shutdown signal, exiting");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "could not install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
