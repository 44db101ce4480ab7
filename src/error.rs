//! Error types for the lane autopilot

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Lane autopilot error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (sockets, config and replay files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON error while reading a segment replay
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed wire record
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    /// Frame does not fit the requested crop box
    #[error("Crop box out of bounds: {0}")]
    CropOutOfBounds(String),

    /// No matching pairing reply arrived within the handshake window
    #[error("Pairing timed out (no reply for security code {security_code}; check the code)")]
    PairingTimeout {
        /// Security code that was offered
        security_code: u32,
    },

    /// Link operation not allowed in the current lifecycle state
    #[error("Invalid link state: {0}")]
    InvalidState(String),

    /// Worker thread panicked
    #[error("Thread panicked")]
    ThreadPanic,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
