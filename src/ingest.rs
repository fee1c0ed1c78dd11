//! Streaming ingestion loop
//!
//! Once the channel is confirmed and the interval negotiated, the loop
//! polls the channel for small chunks and forwards each one verbatim to
//! the record file and the live display, in arrival order. There is no
//! data-driven termination: the session runs until the operator cancels
//! it, and the loop hands control back for teardown rather than closing
//! anything itself.

use crate::cancel::CancelSignal;
use crate::error::Result;
use crate::sink::RecordSink;
use crate::transport::Transport;
use std::io::Write;
use std::thread;
use std::time::Duration;

/// Ingestion loop tuning
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Bytes requested per poll; small so console echo stays live
    pub chunk_size: usize,
    /// Size of the single pre-loop discard poll that flushes boot chatter
    pub discard_size: usize,
    /// Sleep after an empty poll, keeping the loop off a busy-wait
    pub idle_wait: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            chunk_size: 2,
            discard_size: 4096,
            idle_wait: Duration::from_millis(5),
        }
    }
}

/// Run the ingestion loop until the cancel signal fires
///
/// Performs one discard poll up front, then per iteration: checks the
/// cancel signal (non-blocking), polls the channel into a fresh buffer,
/// and appends any bytes received to the sink and the display. Returns
/// the total number of bytes recorded.
pub fn run_ingest(
    transport: &mut dyn Transport,
    sink: &mut RecordSink,
    cancel: &mut dyn CancelSignal,
    display: &mut dyn Write,
    config: &IngestConfig,
) -> Result<u64> {
    // Residual boot-time chatter may still be on the wire; one large
    // poll discards it so the record starts at a clean line boundary.
    let mut discard = vec![0u8; config.discard_size];
    let flushed = transport.read(&mut discard)?;
    if flushed > 0 {
        log::debug!("Discarded {} residual bytes before ingestion", flushed);
    }

    let mut total: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let mut chunk = vec![0u8; config.chunk_size];
        let n = transport.read(&mut chunk)?;
        if n == 0 {
            if !config.idle_wait.is_zero() {
                thread::sleep(config.idle_wait);
            }
            continue;
        }

        sink.append(&chunk[..n])?;
        display.write_all(&chunk[..n])?;
        display.flush()?;
        total += n as u64;
    }

    log::info!("Ingestion stopped after {} bytes", total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelAfter;
    use crate::session::SamplingInterval;
    use crate::sink::RecordSink;
    use crate::transport::mock::MockTransport;
    use chrono::Local;
    use std::fs;

    fn test_config() -> IngestConfig {
        IngestConfig {
            chunk_size: 2,
            discard_size: 4096,
            idle_wait: Duration::ZERO,
        }
    }

    fn test_sink(dir: &std::path::Path) -> RecordSink {
        RecordSink::create(dir, SamplingInterval::new(1.0).unwrap(), Local::now()).unwrap()
    }

    #[test]
    fn test_chunks_recorded_in_arrival_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = test_sink(dir.path());
        let path = sink.path().to_path_buf();

        let mut transport = MockTransport::new();
        transport.push_empty_poll(); // consumed by the discard poll
        transport.push_poll(b"A1");
        transport.push_poll(b"B2");
        transport.push_poll(b"C3");

        let mut display = Vec::new();
        let mut cancel = CancelAfter::new(4);
        let total = run_ingest(
            &mut transport,
            &mut sink,
            &mut cancel,
            &mut display,
            &test_config(),
        )
        .unwrap();
        sink.close().unwrap();

        assert_eq!(total, 6);
        assert_eq!(display, b"A1B2C3");
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.ends_with("A1B2C3"));
    }

    #[test]
    fn test_boot_chatter_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = test_sink(dir.path());
        let path = sink.path().to_path_buf();

        let mut transport = MockTransport::new();
        transport.push_poll(b"WWWWWWWW"); // sentinel chatter left from discovery
        transport.push_poll(b"ok");

        let mut display = Vec::new();
        let mut cancel = CancelAfter::new(1);
        run_ingest(
            &mut transport,
            &mut sink,
            &mut cancel,
            &mut display,
            &test_config(),
        )
        .unwrap();
        sink.close().unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert!(!contents.contains('W'));
        assert!(contents.ends_with("ok"));
    }

    #[test]
    fn test_cancel_stops_within_one_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = test_sink(dir.path());

        let transport = MockTransport::new();
        transport.push_empty_poll(); // discard poll
        transport.push_poll(b"a1");
        transport.push_poll(b"b2");
        transport.push_poll(b"c3");

        let mut display = Vec::new();
        // Cancel asserts after the first loop check: at most one more
        // poll-and-append cycle may run.
        let mut cancel = CancelAfter::new(1);
        let mut t = transport.clone();
        run_ingest(&mut t, &mut sink, &mut cancel, &mut display, &test_config()).unwrap();

        assert!(display.len() <= 2, "display = {:?}", display);
        assert!(transport.polls_remaining() >= 2);
    }

    #[test]
    fn test_empty_polls_record_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = test_sink(dir.path());
        let path = sink.path().to_path_buf();

        let mut transport = MockTransport::new();
        transport.push_empty_poll(); // discard poll
        transport.push_empty_poll();
        transport.push_empty_poll();

        let mut display = Vec::new();
        let mut cancel = CancelAfter::new(5);
        let total = run_ingest(
            &mut transport,
            &mut sink,
            &mut cancel,
            &mut display,
            &test_config(),
        )
        .unwrap();
        sink.close().unwrap();

        assert_eq!(total, 0);
        assert!(display.is_empty());
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.ends_with("Sensor4 (Cel)\n"));
    }

    #[test]
    fn test_short_poll_appends_only_received_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = test_sink(dir.path());
        let path = sink.path().to_path_buf();

        let mut transport = MockTransport::new();
        transport.push_empty_poll(); // discard poll
        transport.push_poll(b"x"); // fewer bytes than chunk_size

        let mut display = Vec::new();
        let mut cancel = CancelAfter::new(2);
        let total = run_ingest(
            &mut transport,
            &mut sink,
            &mut cancel,
            &mut display,
            &test_config(),
        )
        .unwrap();
        sink.close().unwrap();

        assert_eq!(total, 1);
        assert_eq!(display, b"x");
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.ends_with("x"));
        assert!(!contents.ends_with("\0x"));
    }
}
