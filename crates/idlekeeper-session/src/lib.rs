//! Game session abstraction for idlekeeper.
//!
//! The game protocol itself lives outside this workspace. This crate defines
//! the seam the rest of the system talks to:
//!
//! 1. **Connecting** — a [`Connector`] turns [`ConnectOptions`] into a live
//!    [`GameSession`] plus a stream of [`SessionEvent`]s
//! 2. **Acting** — movement controls, look and chat on the [`GameSession`]
//! 3. **Observing** — lifecycle events delivered in the order the protocol
//!    client raised them, with `End` emitted exactly once per session
//!
//! # How it fits in the stack
//!
//! ```text
//! Supervisor / behaviors (above)  ← react to events, issue commands
//!     ↕
//! Session layer (this crate)      ← Connector, GameSession, SessionEvent
//!     ↕
//! Protocol client (below)         ← e.g. the WebSocket bridge
//! ```

mod control;
mod error;
mod event;
mod session;

pub use control::{Control, Direction};
pub use error::SessionError;
pub use event::{EventEmitter, EventReceiver, SessionEvent, event_channel};
pub use session::{AuthMode, ConnectOptions, Connector, GameSession, Position, SessionId};
