//! Error types for the deck interface

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Remote control error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Interface error: {0}")]
    Interface(#[from] InterfaceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Window geometry ('{0}') is not valid")]
    InvalidGeometry(String),

    #[error("Deck count {0} is not supported (expected 1 to {max})", max = crate::constants::MAX_DECKS)]
    InvalidDeckCount(usize),

    #[error("Remote control port ('{0}') is not valid")]
    InvalidPort(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to write configuration: {0}")]
    Write(String),
}

/// Drawing surface errors
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Surface size {width}x{height} is not valid")]
    InvalidSize { width: i32, height: i32 },

    #[error("Failed to allocate surface: {0}")]
    Allocation(String),
}

/// Remote control errors
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Socket bind failed: {0}")]
    BindFailed(String),

    #[error("Failed to encode message: {0}")]
    Encode(String),

    #[error("Failed to decode message: {0}")]
    Decode(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Remote control thread failed: {0}")]
    Thread(String),
}

/// Track import errors
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Cannot read '{0}'")]
    Unreadable(String),

    #[error("Decoding '{path}' failed: {message}")]
    DecodeFailed { path: String, message: String },

    #[error("Import worker is not running")]
    WorkerStopped,
}

/// Render thread errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("Failed to launch interface thread: {0}")]
    Spawn(String),

    #[error("Interface thread panicked")]
    Panicked,

    #[error("Display failure: {0}")]
    Display(#[from] DisplayError),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;
