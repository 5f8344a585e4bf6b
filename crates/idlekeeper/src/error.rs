//! Error types for the idlekeeper binary and library.

/// Problems with the settings file or environment overrides.
///
/// All of these are fatal at startup and never retried.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read, is not valid JSON,
    /// or does not fit [`Settings`](crate::Settings).
    #[error("invalid settings: {0}")]
    Config(#[from] config::ConfigError),

    /// A required identity field is empty after applying overrides.
    #[error("missing required setting: {0}")]
    MissingField(&'static str),

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Top-level error.
///
/// Every variant ends the process with status 1 so that a process manager
/// restarts it or raises an alert.
#[derive(Debug, thiserror::Error)]
pub enum IdlekeeperError {
    /// Settings could not be loaded or are incomplete.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The liveness endpoint could not bind or stopped serving.
    #[error("keep-alive endpoint failed: {0}")]
    Keepalive(#[source] std::io::Error),

    /// A session ended while auto-reconnect is disabled.
    #[error("session ended ({reason}) and auto-reconnect is disabled")]
    ReconnectDisabled { reason: String },
}

impl IdlekeeperError {
    /// Process exit status for this error.
    pub fn exit_status(&self) -> u8 {
        1
    }
}
