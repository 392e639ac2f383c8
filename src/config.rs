//! Startup configuration
//!
//! Read from `config.toml` in the platform configuration directory, with
//! every field optional. The binary applies command-line overrides on
//! top before anything is started, so every error here is reported
//! before the interface thread exists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::{DEFAULT_HEIGHT, DEFAULT_METER_SCALE, DEFAULT_WIDTH, MAX_DECKS, REFRESH_MS};
use crate::error::ConfigError;

/// How decks share the top of the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckArrangement {
    /// Side by side
    #[default]
    Horizontal,
    /// Stacked
    Vertical,
}

/// Window size and optional position, as `WxH` or `WxH+X+Y`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
    pub position: Option<(i32, i32)>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            position: None,
        }
    }
}

impl FromStr for Geometry {
    type Err = ConfigError;

    /// An empty string gives the default size
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidGeometry(s.to_string());

        if s.is_empty() {
            return Ok(Self::default());
        }

        let (size, position) = match s.split_once('+') {
            Some((size, rest)) => {
                let (x, y) = rest.split_once('+').ok_or_else(invalid)?;
                let x = x.parse::<i32>().map_err(|_| invalid())?;
                let y = y.parse::<i32>().map_err(|_| invalid())?;
                (size, Some((x, y)))
            }
            None => (s, None),
        };

        let (w, h) = size.split_once('x').ok_or_else(invalid)?;
        let width = w.parse::<i32>().map_err(|_| invalid())?;
        let height = h.parse::<i32>().map_err(|_| invalid())?;

        if width <= 0 || height <= 0 {
            return Err(invalid());
        }

        Ok(Self {
            width,
            height,
            position,
        })
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some((x, y)) = self.position {
            write!(f, "+{}+{}", x, y)?;
        }
        Ok(())
    }
}

/// `[interface]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// `WxH` or `WxH+X+Y`; empty for the default size
    pub geometry: String,
    pub arrangement: DeckArrangement,
    /// Interval between refresh ticks
    pub refresh_ms: u64,
    /// Initial closeup zoom
    pub meter_scale: u32,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            geometry: String::new(),
            arrangement: DeckArrangement::default(),
            refresh_ms: REFRESH_MS,
            meter_scale: DEFAULT_METER_SCALE,
        }
    }
}

/// `[remote]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    /// UDP port; "0" picks a free one
    pub port: String,
    pub bind_address: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: "0".to_string(),
            bind_address: "0.0.0.0".to_string(),
        }
    }
}

impl RemoteConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let port = self
            .port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(self.port.clone()))?;
        let ip = self
            .bind_address
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidPort(format!("{}:{}", self.bind_address, self.port)))?;
        Ok(SocketAddr::new(ip, port))
    }
}

/// Whole application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Number of decks, 1 to 3
    pub decks: usize,
    /// JSON record listing to browse
    pub library: Option<PathBuf>,
    pub interface: InterfaceConfig,
    pub remote: RemoteConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            decks: 2,
            library: None,
            interface: InterfaceConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl AppConfig {
    /// `config.toml` in the platform configuration directory
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "deckscope", "deckscope")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from `path`; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Write to `path`, creating its directory
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write(e.to_string()))?;
        }

        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))?;
        std::fs::write(path, text).map_err(|e| ConfigError::Write(e.to_string()))?;

        Ok(())
    }

    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        self.interface.geometry.parse()
    }

    /// Check everything that would otherwise fail at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decks == 0 || self.decks > MAX_DECKS {
            return Err(ConfigError::InvalidDeckCount(self.decks));
        }
        self.geometry()?;
        if self.remote.enabled {
            self.remote.socket_addr()?;
        }
        Ok(())
    }
}
