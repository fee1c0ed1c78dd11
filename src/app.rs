//! Session orchestration
//!
//! One session: discover the logger, negotiate the sampling interval,
//! create the record file, ingest until cancelled, tear down. Operator
//! dialogue goes to the console directly; diagnostics go through the
//! log facade.

use crate::cancel::{self, FlagCancel};
use crate::config::AppConfig;
use crate::discovery::{discover, DiscoveryConfig};
use crate::error::{Error, Result};
use crate::ingest::{run_ingest, IngestConfig};
use crate::session::{negotiate, prompt_interval};
use crate::sink::RecordSink;
use crate::transport::SerialOpener;
use chrono::Local;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Console key that ends the session (followed by Enter)
const EXIT_KEY: u8 = b'e';

/// Delay between confirmation and sending the interval byte; the
/// firmware needs a moment after its announce phase before it reads
const NEGOTIATE_SETTLE: Duration = Duration::from_secs(2);

/// Run one full logging session
pub fn run(config: &AppConfig) -> Result<()> {
    println!("DS18B20 Temperature Data Logger");
    println!("--------------------------------------------------------------------------");
    println!("Establishing connection to logger...");

    let mut opener = SerialOpener::new(config.serial.baud_rate);
    let discovery_config =
        DiscoveryConfig::from_settings(&config.discovery, config.serial.channel_count);

    let confirmed = match discover(&mut opener, &discovery_config) {
        Ok(confirmed) => confirmed,
        Err(e @ Error::NoDeviceFound { .. }) => {
            log::error!("{}", e);
            println!("No data loggers were detected. Please check your connections & try again.");
            println!("Press Enter to exit.");
            wait_for_acknowledgment();
            return Err(e);
        }
        Err(e) => return Err(e),
    };
    println!("Channel {} was successfully established.", confirmed.channel);
    let mut transport = confirmed.transport;

    // Hold the interval prompt until the device is ready to accept it
    thread::sleep(NEGOTIATE_SETTLE);

    let interval = {
        let stdin = io::stdin();
        let stdout = io::stdout();
        prompt_interval(&mut stdin.lock(), &mut stdout.lock())?
    };
    negotiate(transport.as_mut(), interval)?;

    let sink_dir = Path::new(&config.output.directory);
    let mut sink = RecordSink::create(sink_dir, interval, Local::now())?;
    println!("\nPrinting data to: {}", sink.path().display());

    // Cancellation sources take over stdin; all prompts are done by now
    let flag = cancel::install_handlers(EXIT_KEY)?;
    let mut cancel = FlagCancel::new(flag);

    println!("--------------------------------------------------------------------------");
    println!("\nPress 'e' then Enter (or Ctrl-C) at any time to exit data logging.\n");
    println!("HH:MM:SS|Secs| T1(C)| T2(C)| T3(C)| T4(C)");

    let ingest_config = IngestConfig::default();
    let total = {
        let stdout = io::stdout();
        let mut display = stdout.lock();
        run_ingest(
            transport.as_mut(),
            &mut sink,
            &mut cancel,
            &mut display,
            &ingest_config,
        )?
    };

    sink.close()?;
    drop(transport); // closes the serial port

    println!("\n\nProgram has finished executing.");
    log::info!("Session complete: {} bytes recorded", total);
    Ok(())
}

/// Block until the operator presses Enter (fatal-error acknowledgment)
fn wait_for_acknowledgment() {
    let stdin = io::stdin();
    let mut line = String::new();
    let _ = io::stdout().flush();
    let _ = stdin.lock().read_line(&mut line);
}
