//! Mock transport for testing
//!
//! Reads are scripted per poll: each call to `read` consumes at most one
//! scripted chunk, so tests control exactly what every non-blocking poll
//! returns, including empty polls.

use super::{PortOpener, Transport};
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock transport for unit testing
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    polls: VecDeque<Vec<u8>>,
    written: Vec<u8>,
}

impl MockTransport {
    /// Create a mock transport with no scripted data
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the bytes returned by the next unscripted poll
    ///
    /// Chunks are consumed in FIFO order, one per `read` call. A chunk
    /// larger than the caller's buffer is truncated; the remainder is
    /// dropped, matching a device that outpaces a small poll buffer.
    pub fn push_poll(&self, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.polls.push_back(data.to_vec());
    }

    /// Script one poll that returns no data
    pub fn push_empty_poll(&self) {
        self.push_poll(&[]);
    }

    /// Get all bytes written to the transport so far
    pub fn written(&self) -> Vec<u8> {
        let inner = self.inner.lock().unwrap();
        inner.written.clone()
    }

    /// Number of scripted polls not yet consumed
    pub fn polls_remaining(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.polls.len()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        match inner.polls.pop_front() {
            Some(chunk) => {
                let n = chunk.len().min(buffer.len());
                buffer[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        inner.written.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.polls.front().map_or(0, Vec::len))
    }
}

/// Scripted behavior of one channel under a [`MockOpener`]
pub enum ChannelScript {
    /// Open fails (port busy or absent)
    Busy,
    /// Open succeeds but every poll returns nothing
    Silent,
    /// Open succeeds and the transport serves the given scripted polls
    Device(MockTransport),
}

/// Port opener returning scripted channels, for discovery tests
#[derive(Default)]
pub struct MockOpener {
    scripts: Vec<ChannelScript>,
    opened: Vec<u8>,
}

impl MockOpener {
    /// Build an opener from channel scripts, indexed by channel id
    pub fn new(scripts: Vec<ChannelScript>) -> Self {
        MockOpener {
            scripts,
            opened: Vec::new(),
        }
    }

    /// Channels that open() was attempted on, in order
    pub fn opened(&self) -> &[u8] {
        &self.opened
    }
}

impl PortOpener for MockOpener {
    fn open(&mut self, channel: u8) -> Result<Box<dyn Transport>> {
        self.opened.push(channel);
        match self.scripts.get(channel as usize) {
            Some(ChannelScript::Busy) | None => Err(Error::Other(format!(
                "mock channel {} unavailable",
                channel
            ))),
            Some(ChannelScript::Silent) => Ok(Box::new(MockTransport::new())),
            Some(ChannelScript::Device(transport)) => Ok(Box::new(transport.clone())),
        }
    }
}
