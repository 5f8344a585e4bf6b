//! Settings: a JSON file overridden by environment variables.
//!
//! Layered with the `config` crate:
//!
//! 1. the settings file, if it exists (`required(false)`)
//! 2. `BOT_*` / `PORT` overrides, each bound to one key
//! 3. validation of the identity fields
//!
//! Every section is optional in the file; missing keys take the `Default`
//! of their section.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat};
use idlekeeper_behavior::BehaviorConfig;
use idlekeeper_session::{AuthMode, ConnectOptions, Position};
use serde::{Deserialize, Serialize};

use crate::{ReconnectPolicy, SettingsError};

/// Settings file used when `IDLEKEEPER_SETTINGS` is not set.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Root of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub account: AccountSection,
    pub server: ServerSection,
    pub position: PositionSection,
    pub reconnect: ReconnectPolicy,
    /// `anti_idle`, `chat` and `chat_log` live at the top level of the file.
    #[serde(flatten)]
    pub behavior: BehaviorConfig,
    pub keepalive: KeepaliveSection,
    pub bridge: BridgeSection,
}

/// `account`: who logs in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSection {
    pub username: String,
    pub password: Option<String>,
    pub auth: AuthMode,
}

/// `server`: where to connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Protocol version; negotiated when absent.
    pub version: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 25565,
            version: None,
        }
    }
}

/// `position`: where to head after joining.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionSection {
    pub enabled: bool,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for PositionSection {
    fn default() -> Self {
        Self {
            enabled: false,
            x: 0.0,
            y: 64.0,
            z: 0.0,
        }
    }
}

impl PositionSection {
    /// The target, when enabled.
    pub fn target(&self) -> Option<Position> {
        self.enabled.then_some(Position {
            x: self.x,
            y: self.y,
            z: self.z,
        })
    }
}

/// `keepalive`: the liveness HTTP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepaliveSection {
    pub port: u16,
}

impl Default for KeepaliveSection {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// `bridge`: the protocol bridge speaking the game protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    pub url: String,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:25580".to_string(),
        }
    }
}

impl Settings {
    /// Parses a settings document.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Self::from_json_with_env(json, |_| None)
    }

    /// Parses a settings document, then applies overrides from `env`.
    /// Does not validate.
    pub fn from_json_with_env<F>(json: &str, env: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        layered(File::from_str(json, FileFormat::Json), env)
    }

    /// Reads `path` (defaults if it does not exist), applies overrides from
    /// `env`, and validates.
    pub fn load<F>(path: &Path, env: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no settings file, using defaults");
        }
        let file = File::from(path).format(FileFormat::Json).required(false);
        let settings = layered(file, env)?;
        settings.validate()?;
        Ok(settings)
    }

    /// [`load`](Self::load) from the process environment. The file path comes
    /// from `IDLEKEEPER_SETTINGS`, defaulting to [`DEFAULT_SETTINGS_PATH`].
    pub fn from_env() -> Result<Self, SettingsError> {
        let path = std::env::var_os("IDLEKEEPER_SETTINGS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
        Self::load(&path, |var| std::env::var(var).ok())
    }

    /// Username and host are required.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.account.username.trim().is_empty() {
            return Err(SettingsError::MissingField("username"));
        }
        if self.server.host.trim().is_empty() {
            return Err(SettingsError::MissingField("host"));
        }
        Ok(())
    }

    /// The immutable session configuration reused for every connection.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            host: self.server.host.clone(),
            port: self.server.port,
            username: self.account.username.clone(),
            password: self.account.password.clone(),
            version: self.server.version.clone(),
            auth: self.account.auth,
            initial_position: self.position.target(),
        }
    }
}

// ---------------------------------------------------------------------------
// Layering
// ---------------------------------------------------------------------------

/// Builds [`Settings`] from one file source plus environment overrides.
fn layered<S, F>(source: S, env: F) -> Result<Settings, SettingsError>
where
    S: config::Source + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    let builder = Config::builder().add_source(source);
    let config = env_overrides(builder, env)?.build()?;
    Ok(config.try_deserialize()?)
}

/// Binds each environment variable to its settings key. Empty values are
/// ignored so that `BOT_HOST=` does not wipe a configured host.
///
/// Typed values are parsed here rather than by `config`, so a bad value
/// names the variable it came from.
fn env_overrides<F>(
    builder: ConfigBuilder<DefaultState>,
    env: F,
) -> Result<ConfigBuilder<DefaultState>, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |var: &str| env(var).filter(|v| !v.trim().is_empty());

    let auth = parse_env::<AuthMode>("BOT_AUTH", lookup("BOT_AUTH"))?;
    let port = parse_env::<u16>("BOT_PORT_MC", lookup("BOT_PORT_MC"))?;
    let keepalive_port = parse_env::<u16>("PORT", lookup("PORT"))?;

    Ok(builder
        .set_override_option("account.username", lookup("BOT_USERNAME"))?
        .set_override_option("account.password", lookup("BOT_PASSWORD"))?
        .set_override_option("account.auth", auth.map(|a| a.to_string()))?
        .set_override_option("server.host", lookup("BOT_HOST"))?
        .set_override_option("server.port", port.map(i64::from))?
        .set_override_option("server.version", lookup("BOT_VERSION"))?
        .set_override_option("keepalive.port", keepalive_port.map(i64::from))?
        .set_override_option("bridge.url", lookup("BOT_BRIDGE_URL"))?)
}

fn parse_env<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, SettingsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| SettingsError::InvalidEnv {
                    var,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}
