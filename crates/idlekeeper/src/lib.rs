//! # idlekeeper
//!
//! Keeps an automated game-client presence alive on a remote server.
//!
//! The [`Supervisor`] owns one session at a time: it connects, reacts to the
//! session's lifecycle events through a single transition function
//! ([`transition`]), arms the anti-idle and chat behaviors once the player
//! has joined, and reconnects after a fixed delay when the session ends.
//! Kicks and errors are funneled into the same end-of-session path, so the
//! reconnect decision is made in exactly one place.
//!
//! A separate [`KeepaliveServer`] answers `GET /` with `200 OK` for external
//! uptime monitors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use idlekeeper::prelude::*;
//!
//! # async fn start() -> Result<(), IdlekeeperError> {
//! let settings = Settings::from_env()?;
//! let connector = WebSocketConnector::new(settings.bridge.url.clone());
//! let supervisor = Supervisor::new(&settings, connector)?;
//! let _ = supervisor.run().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod keepalive;
mod settings;
mod state;
mod supervisor;

pub use error::{IdlekeeperError, SettingsError};
pub use keepalive::{KeepaliveServer, router};
pub use settings::{
    AccountSection, BridgeSection, DEFAULT_SETTINGS_PATH, KeepaliveSection, PositionSection,
    ServerSection, Settings,
};
pub use state::{Action, LinkState, transition};
pub use supervisor::{ReconnectPolicy, Supervisor};

pub mod prelude {
    pub use crate::{
        IdlekeeperError, KeepaliveServer, LinkState, ReconnectPolicy, SettingsError, Settings,
        Supervisor,
    };
    pub use idlekeeper_behavior::{AntiIdleConfig, BehaviorConfig, ChatConfig};
    pub use idlekeeper_bridge::WebSocketConnector;
    pub use idlekeeper_session::{
        AuthMode, ConnectOptions, Connector, Control, Direction, GameSession, Position,
        SessionEvent, SessionId,
    };
}
