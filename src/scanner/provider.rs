//! Sample acquisition interfaces
//!
//! The scan engine pulls input through these traits and never talks to
//! hardware directly. Axis reads can fail and abort a cycle; button reads
//! cannot fail from the engine's perspective.

use thiserror::Error;

/// The two analog channels of the stick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisChannel {
    X,
    Y,
}

/// Errors raised by sample providers
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Underlying device unavailable at initialization; fatal
    #[error("Device not ready: {0}")]
    DeviceNotReady(String),

    /// A single acquisition failed; the cycle aborts, polling continues
    #[error("Sample acquisition failed: {0}")]
    AcquisitionFailed(String),
}

/// Yields a signed raw sample for one axis, or fails.
pub trait AxisSampler: Send {
    fn sample(&mut self, channel: AxisChannel) -> Result<i32, ProviderError>;
}

/// Yields the pressed state of one button.
///
/// Implementations map their own read failures to "not pressed"; buttons
/// degrade gracefully where axes do not.
pub trait ButtonSampler: Send {
    fn is_pressed(&mut self, index: u8) -> bool;
}
