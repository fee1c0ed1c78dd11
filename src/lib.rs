//! Thermolink - host-side serial logger for DS18B20 temperature devices
//!
//! Connects to a single Arduino-class temperature logger over a serial
//! link, negotiates its sampling interval, and records the incoming
//! stream to a timestamped CSV file until the operator cancels.

pub mod app;
pub mod cancel;
pub mod config;
pub mod discovery;
pub mod error;
pub mod ingest;
pub mod session;
pub mod sink;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
