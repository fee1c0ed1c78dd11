//! Device discovery over a range of serial channels
//!
//! The logger firmware announces itself by emitting a sentinel byte at
//! 200 Hz from boot until it receives a configuration byte. Discovery
//! walks the channel range in order, opens each port, waits out the
//! device's boot time, and polls for that sentinel under a bounded
//! attempt budget. The budget keeps an unresponsive port (or one held
//! by an unrelated peripheral) from stalling the scan indefinitely.

use crate::config::DiscoverySettings;
use crate::error::{Error, Result};
use crate::transport::{PortOpener, Transport};
use std::thread;
use std::time::Duration;

/// Handshake poll buffer size; the sentinel arrives in the first byte
const HANDSHAKE_READ_LEN: usize = 16;

/// Discovery parameters with all delays explicit
///
/// Built from [`DiscoverySettings`] for production; tests construct it
/// directly with zero-length delays to run in bounded wall time.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Channels 0..channel_count are scanned in order
    pub channel_count: u8,
    /// Presence byte expected from the device
    pub sentinel: u8,
    /// Handshake polls per channel before giving up on it
    pub attempt_budget: u32,
    /// Post-open delay covering device boot
    pub settle: Duration,
    /// Spacing between handshake polls
    pub poll_interval: Duration,
}

impl DiscoveryConfig {
    /// Combine configured discovery settings with the channel range
    pub fn from_settings(settings: &DiscoverySettings, channel_count: u8) -> Self {
        DiscoveryConfig {
            channel_count,
            sentinel: settings.sentinel,
            attempt_budget: settings.attempt_budget,
            settle: Duration::from_millis(settings.settle_ms),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        }
    }
}

/// A channel on which the sentinel was observed, with its port held open
pub struct ConfirmedChannel {
    /// Channel identifier the device answered on
    pub channel: u8,
    /// The open transport, ready for negotiation and ingestion
    pub transport: Box<dyn Transport>,
}

impl std::fmt::Debug for ConfirmedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmedChannel")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Scan the channel range for a logger and return the first that answers
///
/// Channels that fail to open or never produce the sentinel are skipped
/// silently (debug-logged only). Scanning stops at the first confirmed
/// channel; later channels are never opened. If the whole range is
/// exhausted, returns [`Error::NoDeviceFound`].
pub fn discover(opener: &mut dyn PortOpener, config: &DiscoveryConfig) -> Result<ConfirmedChannel> {
    for channel in 0..config.channel_count {
        let mut transport = match opener.open(channel) {
            Ok(t) => t,
            Err(e) => {
                log::debug!("Channel {} unavailable: {}", channel, e);
                continue;
            }
        };

        // Opening the port resets an Arduino-class device; give it time
        // to boot before expecting the sentinel.
        if !config.settle.is_zero() {
            thread::sleep(config.settle);
        }

        match wait_for_sentinel(transport.as_mut(), config) {
            Ok(true) => {
                log::info!("Channel {} confirmed", channel);
                return Ok(ConfirmedChannel { channel, transport });
            }
            Ok(false) => {
                log::debug!(
                    "Channel {} not responding within {} polls",
                    channel,
                    config.attempt_budget
                );
            }
            Err(e) => {
                log::debug!("Channel {} read error during handshake: {}", channel, e);
            }
        }
        // Dropping the transport closes the port before moving on
    }

    Err(Error::NoDeviceFound {
        last_channel: config.channel_count.saturating_sub(1),
    })
}

/// Poll one open channel for the sentinel within the attempt budget
///
/// Each poll reads into a fresh buffer; the channel is confirmed the
/// instant the first byte of a non-empty poll matches the sentinel.
fn wait_for_sentinel(transport: &mut dyn Transport, config: &DiscoveryConfig) -> Result<bool> {
    for _ in 0..config.attempt_budget {
        if !config.poll_interval.is_zero() {
            thread::sleep(config.poll_interval);
        }

        let mut buf = [0u8; HANDSHAKE_READ_LEN];
        let n = transport.read(&mut buf)?;
        if n > 0 && buf[0] == config.sentinel {
            return Ok(true);
        }
    }
    Ok(false)
}
