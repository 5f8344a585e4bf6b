//! WebSocket connector: one bridge connection per game session.
//!
//! [`WebSocketConnector::connect`] returns immediately. The WebSocket
//! handshake, the `Connect` frame and all later traffic happen in a spawned
//! task, so the supervisor sees progress (and failure) only through the
//! session's event stream:
//!
//! ```text
//! BridgeSession ──mpsc──► connection task ──frames──► bridge
//!       ▲                        │
//!       └──── Shared ◄───────────┘  (presence, held controls, EventEmitter)
//! ```
//!
//! The task owns the socket outright. The session handle only queues
//! commands, which keeps every `GameSession` method synchronous.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use idlekeeper_session::{
    ConnectOptions, Connector, Control, EventEmitter, EventReceiver, GameSession, Position,
    SessionEvent, SessionId, event_channel,
};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{BridgeCommand, BridgeError, BridgeEvent, Codec};

/// How long to wait for the bridge to accept the WebSocket handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Opens [`BridgeSession`]s against a bridge listening at `url`.
///
/// Generic over the [`Codec`] so the wire format is chosen once, when the
/// connector is built. `C: Clone` because each session's task gets its own
/// copy; codecs are expected to be cheap unit-like values.
#[derive(Debug, Clone)]
pub struct WebSocketConnector<C> {
    url: String,
    codec: C,
}

#[cfg(feature = "json")]
impl WebSocketConnector<crate::JsonCodec> {
    /// A connector speaking JSON to the bridge at `url` (`ws://host:port`).
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_codec(url, crate::JsonCodec)
    }
}

impl<C: Codec + Clone> WebSocketConnector<C> {
    /// A connector using a custom codec.
    pub fn with_codec(url: impl Into<String>, codec: C) -> Self {
        Self {
            url: url.into(),
            codec,
        }
    }

    /// The bridge URL every session connects to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<C: Codec + Clone> Connector for WebSocketConnector<C> {
    type Session = BridgeSession;

    fn connect(&self, id: SessionId, options: &ConnectOptions) -> (BridgeSession, EventReceiver) {
        let (emitter, events) = event_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            presence: AtomicBool::new(false),
            controls: Mutex::new(HashSet::new()),
            emitter,
        });

        tokio::spawn(drive(
            id,
            self.url.clone(),
            self.codec.clone(),
            BridgeCommand::connect(options),
            commands_rx,
            Arc::clone(&shared),
        ));

        let session = BridgeSession {
            id,
            shared,
            commands: commands_tx,
        };
        (session, events)
    }
}

// ---------------------------------------------------------------------------
// Session handle
// ---------------------------------------------------------------------------

/// State shared between the session handle and its connection task.
struct Shared {
    presence: AtomicBool,
    /// Control flags currently held, mirrored locally so reads never wait
    /// on the network.
    controls: Mutex<HashSet<Control>>,
    emitter: EventEmitter,
}

/// A game session backed by one WebSocket connection to the bridge.
///
/// Every method is fire-and-forget: commands go into an unbounded channel
/// and are written by the connection task in the order they were issued.
/// Once the task has exited, `send` fails and the command is dropped, which
/// is exactly the "commands to a closed session are ignored" contract of
/// [`GameSession`].
pub struct BridgeSession {
    id: SessionId,
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<BridgeCommand>,
}

impl BridgeSession {
    /// Queues a command for the connection task. Dropped if it has exited.
    fn send(&self, command: BridgeCommand) {
        let _ = self.commands.send(command);
    }
}

impl GameSession for BridgeSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn has_presence(&self) -> bool {
        self.shared.presence.load(Ordering::Acquire) && !self.shared.emitter.has_ended()
    }

    fn set_control(&self, control: Control, active: bool) {
        if let Ok(mut held) = self.shared.controls.lock() {
            if active {
                held.insert(control);
            } else {
                held.remove(&control);
            }
        }
        self.send(BridgeCommand::SetControl {
            control,
            state: active,
        });
    }

    fn control_state(&self, control: Control) -> bool {
        self.shared
            .controls
            .lock()
            .map(|held| held.contains(&control))
            .unwrap_or(false)
    }

    fn look_at(&self, target: Position) {
        self.send(BridgeCommand::look(target));
    }

    fn chat(&self, message: &str) {
        self.send(BridgeCommand::Chat {
            message: message.to_string(),
        });
    }

    fn end(&self, reason: &str) {
        self.shared.presence.store(false, Ordering::Release);
        self.send(BridgeCommand::Quit {
            reason: reason.to_string(),
        });
        // Ending is immediate from the caller's point of view; the connection
        // task only has to close the socket.
        self.shared.emitter.end(reason);
    }
}

// ---------------------------------------------------------------------------
// Connection task
// ---------------------------------------------------------------------------

/// Runs one bridge connection to completion and always finishes with `End`.
async fn drive<C: Codec>(
    id: SessionId,
    url: String,
    codec: C,
    hello: BridgeCommand,
    mut commands: mpsc::UnboundedReceiver<BridgeCommand>,
    shared: Arc<Shared>,
) {
    let reason = match run(&url, &codec, hello, &mut commands, &shared).await {
        Ok(reason) => reason,
        Err(e) => {
            tracing::debug!(session = %id, error = %e, "bridge connection failed");
            shared.emitter.emit(SessionEvent::Error {
                message: e.to_string(),
            });
            e.to_string()
        }
    };

    shared.presence.store(false, Ordering::Release);
    shared.emitter.end(reason);
    tracing::debug!(session = %id, "bridge connection task finished");
}

/// The connection itself. `Ok` carries the end reason.
///
/// Every fallible step uses `?`, so any handshake, send or receive failure
/// returns early as `Err`; [`drive`] turns that into `Error` + `End`.
/// Protocol-level outcomes (the bridge saying `End`, closing the socket, or
/// the handle asking to quit) return `Ok` with a reason instead.
async fn run<C: Codec>(
    url: &str,
    codec: &C,
    hello: BridgeCommand,
    commands: &mut mpsc::UnboundedReceiver<BridgeCommand>,
    shared: &Shared,
) -> Result<String, BridgeError> {
    let (mut ws, _) = tokio::time::timeout(CONNECT_TIMEOUT, tokio_tungstenite::connect_async(url))
        .await
        .map_err(|_| BridgeError::ConnectTimeout(url.to_string()))?
        .map_err(|source| BridgeError::Connect {
            url: url.to_string(),
            source,
        })?;

    if shared.emitter.has_ended() {
        let _ = ws.close(None).await;
        return Ok("session ended before the bridge answered".into());
    }
    send_frame(&mut ws, codec, &hello).await?;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(BridgeCommand::Quit { reason }) => {
                    let _ = send_frame(&mut ws, codec, &BridgeCommand::Quit { reason: reason.clone() }).await;
                    let _ = ws.close(None).await;
                    return Ok(reason);
                }
                Some(command) => send_frame(&mut ws, codec, &command).await?,
                None => {
                    let _ = ws.close(None).await;
                    return Ok("session handle dropped".into());
                }
            },
            frame = ws.next() => {
                let data = match frame {
                    Some(Ok(Message::Binary(data))) => data.to_vec(),
                    Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                    Some(Ok(Message::Close(_))) | None => {
                        return Ok("bridge closed the connection".into());
                    }
                    Some(Ok(_)) => continue, // ping/pong/frame
                    Some(Err(e)) => return Err(BridgeError::Receive(e)),
                };

                let event: BridgeEvent = match codec.decode(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "undecodable bridge frame, ignoring");
                        continue;
                    }
                };

                if let BridgeEvent::End { reason } = event {
                    return Ok(reason);
                }
                if event.grants_presence() {
                    shared.presence.store(true, Ordering::Release);
                }
                shared.emitter.emit(event.into());
            }
        }
    }
}

/// Encodes one command and writes it as a binary frame.
async fn send_frame<C: Codec>(
    ws: &mut WsStream,
    codec: &C,
    command: &BridgeCommand,
) -> Result<(), BridgeError> {
    let bytes = codec.encode(command)?;
    ws.send(Message::Binary(bytes.into()))
        .await
        .map_err(BridgeError::Send)
}
