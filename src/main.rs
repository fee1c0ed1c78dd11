//! Thermolink - host-side serial logger for DS18B20 temperature devices

use std::env;
use std::path::Path;
use thermolink::{app, AppConfig, Result};

/// Parse config path from command line arguments.
///
/// Supports:
/// - `thermolink <path>` (positional)
/// - `thermolink --config <path>` (flag-based)
/// - `thermolink -c <path>` (short flag)
///
/// Defaults to `thermolink.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "thermolink.toml".to_string()
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Thermolink v0.1.0 starting...");

    let config_path = parse_config_path();

    // A missing default config file just means defaults; an explicit
    // path that fails to parse is a startup error.
    let config = if Path::new(&config_path).exists() {
        log::info!("Using config: {}", config_path);
        AppConfig::from_file(&config_path)?
    } else {
        log::info!("No config file at {}, using defaults", config_path);
        AppConfig::default()
    };

    app::run(&config)
}
