//! Cooperative cancellation for the ingestion loop
//!
//! The loop checks for cancellation once per iteration and exits within
//! one iteration of the signal being asserted. The check is abstracted
//! behind a trait so the loop is decoupled from any specific input
//! mechanism; production wires it to Ctrl-C and a console keystroke,
//! tests drive it directly.

use crate::error::{Error, Result};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Non-blocking cancellation check
pub trait CancelSignal {
    /// True once the operator has requested the session end
    fn is_cancelled(&mut self) -> bool;
}

/// Cancellation backed by a shared atomic flag
pub struct FlagCancel {
    flag: Arc<AtomicBool>,
}

impl FlagCancel {
    /// Wrap a shared flag
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        FlagCancel { flag }
    }
}

impl CancelSignal for FlagCancel {
    fn is_cancelled(&mut self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Install the operator cancellation sources and return the shared flag
///
/// Two paths set the flag: a Ctrl-C handler, and a watcher thread that
/// scans console lines for the exit key. The watcher owns stdin from
/// this point on, so install only after all interactive prompts are
/// done.
pub fn install_handlers(exit_key: u8) -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));

    let ctrlc_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        ctrlc_flag.store(true, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let key_flag = Arc::clone(&flag);
    thread::Builder::new()
        .name("key-watcher".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) if line.as_bytes().contains(&exit_key) => {
                        log::info!("Exit key pressed");
                        key_flag.store(true, Ordering::Relaxed);
                        break;
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        })
        .map_err(|e| Error::Other(format!("Failed to spawn key watcher: {}", e)))?;

    Ok(flag)
}

/// Cancel source that fires after a fixed number of checks; test helper
pub struct CancelAfter {
    remaining: u32,
}

impl CancelAfter {
    /// Cancel on the `checks`-th call to `is_cancelled`
    pub fn new(checks: u32) -> Self {
        CancelAfter { remaining: checks }
    }
}

impl CancelSignal for CancelAfter {
    fn is_cancelled(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_cancel_reflects_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut cancel = FlagCancel::new(Arc::clone(&flag));
        assert!(!cancel.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_cancel_after_counts_checks() {
        let mut cancel = CancelAfter::new(2);
        assert!(!cancel.is_cancelled());
        assert!(!cancel.is_cancelled());
        assert!(cancel.is_cancelled());
        assert!(cancel.is_cancelled());
    }
}
