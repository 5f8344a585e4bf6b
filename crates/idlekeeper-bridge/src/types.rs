//! Messages exchanged with the protocol bridge.
//!
//! Both enums are internally tagged: every frame is a JSON object whose
//! `type` field names the variant, e.g.
//! `{"type":"SetControl","control":"jump","state":true}`.

use idlekeeper_session::{AuthMode, ConnectOptions, Control, Position, SessionEvent};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Client → bridge
// ---------------------------------------------------------------------------

/// A command sent from idlekeeper to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeCommand {
    /// First frame on every connection: which server and account to use.
    Connect {
        host: String,
        port: u16,
        username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        auth: AuthMode,
    },

    /// Hold or release a control flag.
    SetControl { control: Control, state: bool },

    /// Face a point in the world.
    Look { x: f64, y: f64, z: f64 },

    /// Send a chat message verbatim.
    Chat { message: String },

    /// Leave the server and close the connection.
    Quit { reason: String },
}

impl BridgeCommand {
    /// The `Connect` frame for the given options.
    pub fn connect(options: &ConnectOptions) -> Self {
        Self::Connect {
            host: options.host.clone(),
            port: options.port,
            username: options.username.clone(),
            password: options.password.clone(),
            version: options.version.clone(),
            auth: options.auth,
        }
    }

    /// The `Look` frame for a position.
    pub fn look(target: Position) -> Self {
        Self::Look {
            x: target.x,
            y: target.y,
            z: target.z,
        }
    }
}

// ---------------------------------------------------------------------------
// Bridge → client
// ---------------------------------------------------------------------------

/// A lifecycle event reported by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeEvent {
    Login,
    Spawn,
    Message { text: String },
    Kicked { reason: String },
    Error { message: String },
    End { reason: String },
}

impl BridgeEvent {
    /// Whether the player entity exists after this event.
    pub fn grants_presence(&self) -> bool {
        matches!(self, Self::Login | Self::Spawn)
    }
}

impl From<BridgeEvent> for SessionEvent {
    fn from(event: BridgeEvent) -> Self {
        match event {
            BridgeEvent::Login => Self::Login,
            BridgeEvent::Spawn => Self::Spawn,
            BridgeEvent::Message { text } => Self::Message { text },
            BridgeEvent::Kicked { reason } => Self::Kicked { reason },
            BridgeEvent::Error { message } => Self::Error { message },
            BridgeEvent::End { reason } => Self::End { reason },
        }
    }
}
