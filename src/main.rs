pub mod config;
pub mod matrix;
pub mod scanner;

use crate::config::{JoyscanConfig, ProviderKind};
use crate::matrix::KeyEvent;
use crate::scanner::adc::Mcp3008Axes;
use crate::scanner::gpio::GpioButtons;
use crate::scanner::{gamepad, AxisSampler, ButtonSampler, ProviderError, ScannerHandle};
use color_eyre::{eyre::eyre, Result};
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    info!("Loading configuration");
    let config = JoyscanConfig::load().await?;

    let (axes, buttons) = build_providers(&config)
        .map_err(|e| eyre!("Failed to initialize input providers: {}", e))?;

    let (event_tx, mut event_rx) = mpsc::channel(100);

    let mut scanner = ScannerHandle::create(config.scan.clone(), axes, buttons, Some(event_tx))
        .map_err(|e| eyre!("Failed to create scanner: {}", e))?;

    scanner.enable();
    info!("Scanner enabled, press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }

            event = event_rx.recv() => {
                match event {
                    Some(event) => log_event(&event),
                    None => {
                        warn!("Event channel closed");
                        break;
                    }
                }
            }
        }
    }

    scanner
        .disable()
        .await
        .map_err(|e| eyre!("Failed to disable scanner: {}", e))?;
    info!("Scanner disabled, exiting");

    Ok(())
}

fn build_providers(
    config: &JoyscanConfig,
) -> Result<(Box<dyn AxisSampler>, Box<dyn ButtonSampler>), ProviderError> {
    match config.provider {
        ProviderKind::Gamepad => {
            let (axes, buttons) = gamepad::connect()?;
            Ok((Box::new(axes), Box::new(buttons)))
        }
        ProviderKind::AdcGpio => {
            let axes = Mcp3008Axes::new(config.hardware.adc_channel_x, config.hardware.adc_channel_y)?;
            let buttons = GpioButtons::new(&config.hardware.button_pins)?;
            Ok((Box::new(axes), Box::new(buttons)))
        }
    }
}

fn log_event(event: &KeyEvent) {
    info!(
        "Key event: row {} column {} {} at {}",
        event.row,
        event.column,
        if event.pressed { "pressed" } else { "released" },
        event.timestamp.format("%H:%M:%S%.3f")
    );
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
