//! Session types: what a connection needs, and what a live one can do.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Control, EventReceiver, SessionError};

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Opaque identifier for one connection attempt.
///
/// Allocated by the supervisor, strictly increasing across reconnects, so a
/// larger id always means a newer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new `SessionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }

    /// The id that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ConnectOptions
// ---------------------------------------------------------------------------

/// How the account proves its identity to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Offline / cracked servers: the username is taken at face value.
    #[default]
    Offline,
    /// Microsoft account login.
    Microsoft,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => f.write_str("offline"),
            Self::Microsoft => f.write_str("microsoft"),
        }
    }
}

impl FromStr for AuthMode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "microsoft" => Ok(Self::Microsoft),
            _ => Err(SessionError::UnknownAuthMode(s.to_string())),
        }
    }
}

/// A point in the world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Everything a [`Connector`] needs to open a session.
///
/// Built once at startup and reused verbatim for every reconnect.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Account password, when the auth mode needs one.
    pub password: Option<String>,
    /// Game protocol version. `None` lets the protocol client negotiate.
    pub version: Option<String>,
    pub auth: AuthMode,
    /// Where to head right after joining. `None` disables the nudge.
    pub initial_position: Option<Position>,
}

impl ConnectOptions {
    /// `host:port`, for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A live connection to the game server.
///
/// All commands are fire-and-forget: a command issued against a session that
/// has already ended is silently dropped. Callers check
/// [`has_presence`](Self::has_presence) when they care.
pub trait GameSession: Send + Sync + 'static {
    /// The identifier this session was opened with.
    fn id(&self) -> SessionId;

    /// Whether the player entity currently exists in the world.
    ///
    /// `false` before login completes and after the session ended.
    fn has_presence(&self) -> bool;

    /// Holds (`true`) or releases (`false`) a control flag.
    fn set_control(&self, control: Control, active: bool);

    /// Current state of a control flag as last set on this session.
    fn control_state(&self, control: Control) -> bool;

    /// Turns the player to face the given point.
    fn look_at(&self, target: Position);

    /// Sends a chat message verbatim.
    fn chat(&self, message: &str);

    /// Terminates the session. The session's `End` event follows (once).
    fn end(&self, reason: &str);
}

/// Opens sessions.
///
/// `connect` does not wait for the network: it hands back the session
/// immediately and reports progress (or failure) through the event stream.
/// A connection that never gets anywhere still produces `Error` and then
/// `End`, so callers have a single place to handle every outcome.
pub trait Connector: Send + Sync + 'static {
    /// The session type this connector produces.
    type Session: GameSession;

    /// Starts a connection attempt.
    fn connect(&self, id: SessionId, options: &ConnectOptions) -> (Self::Session, EventReceiver);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_new_and_into_inner() {
        let id = SessionId::new(42);
        assert_eq!(id.into_inner(), 42);
        assert_eq!(id.next().into_inner(), 43);
    }

    #[test]
    fn test_session_id_display() {
        assert_eq!(SessionId::new(7).to_string(), "session-7");
    }

    #[test]
    fn test_session_id_orders_by_age() {
        let first = SessionId::new(1);
        assert!(first.next() > first);
    }

    #[test]
    fn test_auth_mode_parse() {
        assert_eq!("Microsoft".parse::<AuthMode>().unwrap(), AuthMode::Microsoft);
        assert_eq!("offline".parse::<AuthMode>().unwrap(), AuthMode::Offline);
        assert!(matches!(
            "mojang".parse::<AuthMode>(),
            Err(SessionError::UnknownAuthMode(_))
        ));
    }

    #[test]
    fn test_connect_options_address() {
        let options = ConnectOptions {
            host: "play.example.org".into(),
            port: 25565,
            username: "bot1".into(),
            password: None,
            version: None,
            auth: AuthMode::default(),
            initial_position: None,
        };
        assert_eq!(options.address(), "play.example.org:25565");
    }
}
