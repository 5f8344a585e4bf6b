//! Protocol-bridge client for idlekeeper.
//!
//! The game protocol is implemented out of process by a *bridge*. This crate
//! talks to that bridge over a WebSocket and exposes it through the
//! [`Connector`](idlekeeper_session::Connector) and
//! [`GameSession`](idlekeeper_session::GameSession) traits:
//!
//! - **Types** ([`BridgeCommand`], [`BridgeEvent`]) — the messages on the wire
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how they become bytes
//! - **Connector** ([`WebSocketConnector`], [`BridgeSession`]) — one
//!   WebSocket per session, driven by a background task
//!
//! ```text
//! GameSession calls → BridgeCommand → Codec → WebSocket → bridge
//! SessionEvent      ← BridgeEvent   ← Codec ← WebSocket ← bridge
//! ```

mod codec;
mod connector;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use connector::{BridgeSession, CONNECT_TIMEOUT, WebSocketConnector};
pub use error::BridgeError;
pub use types::{BridgeCommand, BridgeEvent};
