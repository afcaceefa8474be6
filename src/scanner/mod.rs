//! Scan subsystem for polling input into key events
//!
//! Implements the acquisition and scheduling side of the adapter:
//!
//! 1. [`provider`] - sample acquisition traits
//! 2. [`gamepad`] / [`adc`] / [`gpio`] - hardware backends
//! 3. [`scanner`] - the scan engine and its lifecycle handle
//!
//! # Architecture
//!
//! ```text
//! Gamepad / ADC / GPIO ──► ScanEngine ──► mpsc::Sender<KeyEvent>
//!                          (poll loop)
//! ```
//!
//! The scan engine runs in its own tokio task while enabled, driven by an
//! interval at the configured poll period.

pub mod adc;
pub mod gamepad;
pub mod gpio;
pub mod provider;
pub mod scanner;

pub use provider::{AxisChannel, AxisSampler, ButtonSampler, ProviderError};
pub use scanner::{ScanEngine, ScanError, ScannerHandle};
