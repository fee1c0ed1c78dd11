//! Error types for thermolink

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Thermolink error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Configuration error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration serialization error
    #[error("Configuration error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Discovery scanned the whole channel range without seeing a handshake
    #[error("No data logger detected on channels 0-{last_channel}")]
    NoDeviceFound {
        /// Highest channel identifier that was scanned
        last_channel: u8,
    },

    /// Sampling interval outside the device-supported range
    #[error("Sampling interval {0} is outside the supported range of 1-127 seconds")]
    InvalidInterval(f64),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
