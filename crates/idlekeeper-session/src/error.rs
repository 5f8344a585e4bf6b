//! Error types for the session layer.

/// Errors raised while describing or parsing session parameters.
///
/// Runtime failures of a live session (kicks, transport errors) are not
/// errors in this sense: they arrive as [`SessionEvent`](crate::SessionEvent)s
/// so that every failure funnels into the same end-of-session path.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The name does not match any control flag.
    #[error("unknown control: {0}")]
    UnknownControl(String),

    /// The name does not match any movement direction.
    #[error("unknown movement direction: {0}")]
    UnknownDirection(String),

    /// The name does not match any authentication mode.
    #[error("unknown auth mode: {0}")]
    UnknownAuthMode(String),
}
