//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use remuco_core::{ClientInfo, ConnectTarget, ConnectorOptions, PROTO_VERSION, RemucoError};

/// Top-level configuration for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection settings.
    pub connection: ConnectionConfig,
    /// UI selection.
    pub ui: UiConfig,
    /// Capabilities advertised to the host.
    pub client: CapabilitiesConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Player adapter host name or address.
    pub host: String,
    /// Player adapter port.
    pub port: u16,
    /// Connect / handshake timeout in milliseconds.
    pub timeout_ms: u64,
    /// Keep-alive interval in seconds.
    pub ping_interval_secs: u64,
}

/// UI selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Registry key of the main screen implementation.
    pub screen: String,
}

/// Capabilities advertised in the hello handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitiesConfig {
    /// Text encodings the client can render, in preference order.
    pub encodings: Vec<String>,
    /// Preferred cover-art edge length in pixels (0 = no images).
    pub image_size: u32,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter for diagnostic output.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            ui: UiConfig::default(),
            client: CapabilitiesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 34271,
            timeout_ms: 5000,
            ping_interval_secs: 5,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            screen: "console".into(),
        }
    }
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            encodings: vec!["UTF-8".into(), "ISO-8859-1".into()],
            image_size: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl ClientConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write default config to a file.
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let cfg = Self::default();
        let text = toml::to_string_pretty(&cfg).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }

    // ── Derived values ────────────────────────────────────────────

    /// The connect target, validated.
    pub fn connect_target(&self) -> Result<ConnectTarget, RemucoError> {
        ConnectTarget::new(self.connection.host.clone(), self.connection.port)
    }

    /// The client description sent during the handshake.
    pub fn client_info(&self) -> ClientInfo {
        ClientInfo {
            proto_version: PROTO_VERSION,
            encodings: self.client.encodings.clone(),
            image_size: self.client.image_size,
        }
    }

    /// Negotiation tunables.
    pub fn connector_options(&self) -> ConnectorOptions {
        let timeout = Duration::from_millis(self.connection.timeout_ms);
        ConnectorOptions {
            connect_timeout: timeout,
            hello_timeout: timeout,
            ping_interval: Duration::from_secs(self.connection.ping_interval_secs),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
