//! # DPad Mux
//!
//! Merge an auxiliary dual-directional D-pad into a gamepad's directional state.
//!
//! This application reads raw direction lines from an evdev input device,
//! conditions them (debounce, opposing-direction cleaning, combine modes)
//! and maps the result onto a digital D-pad or an analog stick.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use tracing_subscriber;

mod config;
mod error;
mod gamepad;
mod dual;
mod input;
mod journal;

use config::{Config, LogConfig};
use dual::DualDirectional;
use error::DpadMuxError;
use gamepad::GamepadState;
use input::evdev::{AuxPadDevice, PadEventMapper};
use journal::StateJournal;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of ticks between status log messages
const LOG_INTERVAL_TICKS: u64 = 1000;

/// Initialize the tracing subscriber.
///
/// Logs to stdout by default. When a log directory is configured, output goes
/// to a daily-rolling file instead; the returned guard must be kept alive so
/// buffered lines are flushed on shutdown.
fn init_tracing(log: &LogConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "dpad-mux.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

/// Main entry point for DPad Mux application
///
/// Initializes the application and runs the main conditioning loop that
/// continuously samples the auxiliary pad and updates the gamepad state
/// at the configured tick rate.
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (path from the first CLI argument, or the default)
///    - Set up logging with tracing subscriber
///    - Open the auxiliary pad device and start its event stream
///    - Configure the tick interval from the configured rate
///
/// 2. **Main Loop**
///    - Apply incoming evdev events to the direction lines as they arrive
///    - Each tick: sample lines, debounce, clean, combine and map the result
///    - Journal every gamepad state change (when enabled)
///    - Log status every 1000 ticks (~4 seconds at 250Hz)
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Stop the conditioning loop
///    - Log total tick and journal record counts
///    - Clean exit
///
/// # Errors
///
/// Returns error if:
/// - The configuration file cannot be read or fails validation
/// - Not all four direction keys are assigned
/// - No input device with the configured direction keys can be opened
///
/// # Examples
///
/// Run the application:
/// ```bash
/// cargo run --release
/// ```
///
/// Expected output:
/// ```text
/// INFO dpad_mux: DPad Mux v0.1.0 starting...
/// INFO dpad_mux::input::evdev: Found auxiliary pad at /dev/input/event3
/// INFO dpad_mux: Starting input conditioning loop at 250Hz
/// INFO dpad_mux: Processed 1000 ticks (250Hz, dpad: none)
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;

    // Initialize logging
    let _guard = init_tracing(&config.log);

    info!("DPad Mux v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from {}", config_path);

    // All four direction keys must be assigned before the pad is usable
    let keys = config
        .pad
        .direction_keys()
        .ok_or(DpadMuxError::PadUnavailable)?;

    // Open the auxiliary pad and convert it into an async event stream
    let device = AuxPadDevice::open(&config.pad.device_path, keys)?;
    info!("Auxiliary pad opened at: {}", device.device_path());
    if let Some(name) = device.name() {
        debug!("Auxiliary pad name: {}", name);
    }
    let mut events = device.into_event_stream()?;

    let mut mapper = PadEventMapper::new(keys);
    let mut dual = DualDirectional::new(config.dual_settings(), 0);
    let mut gamepad = GamepadState::new();

    let mut journal = if config.journal.enabled {
        Some(StateJournal::new(&config.journal)?)
    } else {
        None
    };

    // Create the tick interval (4ms period at the default 250Hz)
    let period_ms = 1000 / config.tick.rate_hz;
    let mut tick_interval = interval(Duration::from_millis(period_ms as u64));

    info!(
        "Starting input conditioning loop at {}Hz",
        config.tick.rate_hz
    );
    info!("Press Ctrl+C to exit");

    let started = std::time::Instant::now();
    let mut tick_count: u64 = 0;
    let mut last_log_count: u64 = 0;
    let mut last_state = gamepad;

    // Main conditioning loop
    loop {
        tokio::select! {
            // Sample and condition the direction lines at regular interval
            _ = tick_interval.tick() => {
                // Truncation to u32 wraps, matching the debounce arithmetic
                let now = started.elapsed().as_millis() as u32;

                gamepad.dpad = mapper.primary_mask();
                dual.preprocess(mapper.levels(), now, &mut gamepad);
                gamepad.process_dpad(config.gamepad.dpad_mode);
                dual.process(&mut gamepad);

                tick_count += 1;

                if gamepad != last_state {
                    debug!("Gamepad state changed: {:?}", gamepad);
                    if let Some(journal) = journal.as_mut() {
                        if let Err(e) = journal.record(&gamepad) {
                            warn!("Failed to journal state change: {}", e);
                        }
                    }
                    last_state = gamepad;
                }

                // Log status every LOG_INTERVAL_TICKS (~4 seconds at 250Hz)
                if tick_count - last_log_count >= LOG_INTERVAL_TICKS {
                    info!("Processed {} ticks ({}Hz, dpad: {})",
                        tick_count, config.tick.rate_hz, gamepad.dpad);
                    last_log_count = tick_count;
                }
            }

            // Apply pad events to the direction lines as they arrive
            event = events.next_event() => {
                match event {
                    Ok(event) => mapper.process_event(&event),
                    Err(e) => warn!("Pad event stream error: {}", e),
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total ticks processed: {}", tick_count);
                if let Some(journal) = journal.as_ref() {
                    info!("Journal records written: {}", journal.total_records());
                }
                break;
            }
        }
    }

    Ok(())
}
