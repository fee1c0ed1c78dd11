//! Session negotiation
//!
//! After a channel is confirmed, the host sends the logger exactly one
//! configuration byte: the sampling interval in seconds. The firmware
//! never acknowledges it, so this step is fire-and-forget; a garbled
//! interval byte surfaces only as data arriving at the wrong rate.

use crate::error::{Error, Result};
use crate::transport::Transport;
use std::io::{BufRead, Write};

/// Sampling interval accepted by the logger firmware, in whole seconds
///
/// Encoded on the wire as a single byte, which bounds it to [1,127].
/// Validated at construction so a value that exists is always sendable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingInterval(u8);

impl SamplingInterval {
    /// Validate an operator-supplied interval
    ///
    /// Fractional seconds are truncated, matching the single-byte wire
    /// encoding. Non-finite and out-of-range values are rejected.
    pub fn new(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() || !(1.0..=127.0).contains(&seconds) {
            return Err(Error::InvalidInterval(seconds));
        }
        Ok(SamplingInterval(seconds as u8))
    }

    /// Interval in whole seconds
    pub fn as_secs(self) -> u8 {
        self.0
    }

    /// Wire encoding of the interval
    pub fn encode(self) -> u8 {
        self.0
    }
}

/// Send the sampling interval to the confirmed channel
///
/// Writes exactly one byte and flushes. No acknowledgment is read back.
pub fn negotiate(transport: &mut dyn Transport, interval: SamplingInterval) -> Result<()> {
    transport.write(&[interval.encode()])?;
    transport.flush()?;
    log::info!("Sent sampling interval: {}s", interval.as_secs());
    Ok(())
}

/// Prompt the operator for a sampling interval, re-prompting until valid
///
/// Rejected input (unparseable or out of range) is discarded line by
/// line with a fresh prompt; nothing is ever sent to the device for a
/// rejected value. An exhausted input stream is an error, since the
/// session cannot proceed without an interval.
pub fn prompt_interval<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<SamplingInterval> {
    write!(
        output,
        "Enter number of seconds per sample between 1s and 127s: "
    )?;
    output.flush()?;

    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Other(
                "input closed before a sampling interval was entered".to_string(),
            ));
        }

        if let Ok(seconds) = line.trim().parse::<f64>() {
            if let Ok(interval) = SamplingInterval::new(seconds) {
                return Ok(interval);
            }
        }

        write!(
            output,
            "That is an invalid input, please enter number of seconds per sample between 1s and 127s: "
        )?;
        output.flush()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use std::io::Cursor;

    #[test]
    fn test_interval_bounds() {
        assert!(SamplingInterval::new(0.0).is_err());
        assert!(SamplingInterval::new(0.99).is_err());
        assert!(SamplingInterval::new(128.0).is_err());
        assert!(SamplingInterval::new(-5.0).is_err());
        assert!(SamplingInterval::new(f64::NAN).is_err());
        assert!(SamplingInterval::new(f64::INFINITY).is_err());

        assert_eq!(SamplingInterval::new(1.0).unwrap().as_secs(), 1);
        assert_eq!(SamplingInterval::new(127.0).unwrap().as_secs(), 127);
    }

    #[test]
    fn test_fractional_interval_truncates() {
        assert_eq!(SamplingInterval::new(2.9).unwrap().as_secs(), 2);
    }

    #[test]
    fn test_negotiate_sends_exactly_one_byte() {
        let mut mock = MockTransport::new();
        let interval = SamplingInterval::new(5.0).unwrap();
        negotiate(&mut mock, interval).unwrap();
        assert_eq!(mock.written(), vec![5u8]);
    }

    #[test]
    fn test_prompt_accepts_valid_input() {
        let mut input = Cursor::new(b"60\n".to_vec());
        let mut output = Vec::new();
        let interval = prompt_interval(&mut input, &mut output).unwrap();
        assert_eq!(interval.as_secs(), 60);
    }

    #[test]
    fn test_prompt_reprompts_on_invalid_input() {
        let mut input = Cursor::new(b"0\nabc\n500\n10\n".to_vec());
        let mut output = Vec::new();
        let interval = prompt_interval(&mut input, &mut output).unwrap();
        assert_eq!(interval.as_secs(), 10);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("invalid input").count(), 3);
    }

    #[test]
    fn test_prompt_rejection_sends_nothing() {
        // The prompt loop never touches the transport; only an accepted
        // value reaches negotiate().
        let mut input = Cursor::new(b"999\n7\n".to_vec());
        let mut output = Vec::new();
        let mut mock = MockTransport::new();

        let interval = prompt_interval(&mut input, &mut output).unwrap();
        assert!(mock.written().is_empty());

        negotiate(&mut mock, interval).unwrap();
        assert_eq!(mock.written(), vec![7u8]);
    }

    #[test]
    fn test_prompt_errors_on_exhausted_input() {
        let mut input = Cursor::new(b"not-a-number\n".to_vec());
        let mut output = Vec::new();
        assert!(prompt_interval(&mut input, &mut output).is_err());
    }
}
