//! MCP3008 ADC axis provider for Raspberry Pi deployments
//!
//! Reads the stick potentiometers through an MCP3008 on the primary SPI bus.
//! Samples are 10 bit (0-1023); configure `center`/`deadzone`/`hysteresis`
//! accordingly when using this provider.

use crate::scanner::provider::{AxisChannel, AxisSampler, ProviderError};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::info;

const SPI_CLOCK_HZ: u32 = 1_350_000;
const MCP3008_CHANNELS: u8 = 8;

/// Axis provider reading two MCP3008 channels.
pub struct Mcp3008Axes {
    spi: Spi,
    channel_x: u8,
    channel_y: u8,
}

impl Mcp3008Axes {
    /// Opens the SPI bus and binds the two axis channels.
    pub fn new(channel_x: u8, channel_y: u8) -> Result<Self, ProviderError> {
        if channel_x >= MCP3008_CHANNELS || channel_y >= MCP3008_CHANNELS {
            return Err(ProviderError::DeviceNotReady(format!(
                "MCP3008 channels must be below {}, got {}/{}",
                MCP3008_CHANNELS, channel_x, channel_y
            )));
        }

        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| ProviderError::DeviceNotReady(format!("Failed to open SPI bus: {}", e)))?;

        info!(
            "MCP3008 axis provider ready on SPI0, channels X={} Y={}",
            channel_x, channel_y
        );

        Ok(Self {
            spi,
            channel_x,
            channel_y,
        })
    }

    fn read_channel(&mut self, channel: u8) -> Result<i32, ProviderError> {
        // start bit, single-ended mode, channel select in the upper nibble
        let write = [0x01, (0x08 | channel) << 4, 0x00];
        let mut read = [0u8; 3];

        self.spi
            .transfer(&mut read, &write)
            .map_err(|e| ProviderError::AcquisitionFailed(format!("SPI transfer failed: {}", e)))?;

        Ok((((read[1] & 0x03) as i32) << 8) | read[2] as i32)
    }
}

impl AxisSampler for Mcp3008Axes {
    fn sample(&mut self, channel: AxisChannel) -> Result<i32, ProviderError> {
        match channel {
            AxisChannel::X => self.read_channel(self.channel_x),
            AxisChannel::Y => self.read_channel(self.channel_y),
        }
    }
}
