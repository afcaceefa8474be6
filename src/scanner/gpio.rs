//! GPIO button provider for Raspberry Pi deployments

use crate::scanner::provider::{ButtonSampler, ProviderError};
use rppal::gpio::{Gpio, InputPin};
use tracing::info;

/// Button provider reading GPIO pins, in column order.
///
/// Pins are claimed as pull-up inputs; a button shorts its pin to ground, so
/// pressed reads as low. Indices past the configured pins read as released.
pub struct GpioButtons {
    pins: Vec<InputPin>,
}

impl GpioButtons {
    /// Claims the configured pins. Any unavailable pin is fatal.
    pub fn new(pin_numbers: &[u8]) -> Result<Self, ProviderError> {
        let gpio = Gpio::new()
            .map_err(|e| ProviderError::DeviceNotReady(format!("GPIO unavailable: {}", e)))?;

        let mut pins = Vec::with_capacity(pin_numbers.len());
        for &number in pin_numbers {
            let pin = gpio
                .get(number)
                .map_err(|e| {
                    ProviderError::DeviceNotReady(format!("Button pin {} not ready: {}", number, e))
                })?
                .into_input_pullup();
            pins.push(pin);
        }

        info!("GPIO button provider ready on pins {:?}", pin_numbers);
        Ok(Self { pins })
    }
}

impl ButtonSampler for GpioButtons {
    fn is_pressed(&mut self, index: u8) -> bool {
        self.pins
            .get(index as usize)
            .map(|pin| pin.is_low())
            .unwrap_or(false)
    }
}
