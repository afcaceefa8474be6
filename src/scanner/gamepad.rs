//! Desktop gamepad provider backed by gilrs
//!
//! Rescales the left stick to a 12 bit raw range so the same thresholds work
//! for a gamepad on a desk and an ADC-wired stick on a Pi. Both halves of
//! the provider share one gilrs context; events are drained before every
//! read so the cached gamepad state is current.

use crate::scanner::provider::{AxisChannel, AxisSampler, ButtonSampler, ProviderError};
use gilrs::{Axis, Button, GamepadId, Gilrs};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Full scale of the synthesized raw sample range
const RAW_FULL_SCALE: f32 = 4095.0;

/// Gamepad buttons in column order, first `button_count` are used
const BUTTON_ORDER: [Button; 8] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::Select,
    Button::Start,
];

struct GamepadState {
    gilrs: Gilrs,
    active: GamepadId,
}

impl GamepadState {
    fn pump(&mut self) {
        while let Some(event) = self.gilrs.next_event() {
            debug!("Gamepad event: {:?}", event.event);
        }
    }
}

/// Axis half of the gamepad provider.
pub struct GamepadAxes {
    shared: Arc<Mutex<GamepadState>>,
}

/// Button half of the gamepad provider.
pub struct GamepadButtons {
    shared: Arc<Mutex<GamepadState>>,
}

/// Initializes gilrs and selects the first connected gamepad.
///
/// No gamepad at startup is fatal; a gamepad that disconnects later surfaces
/// as per-cycle acquisition failures instead.
pub fn connect() -> Result<(GamepadAxes, GamepadButtons), ProviderError> {
    info!("Initializing gilrs gamepad interface");
    let gilrs = Gilrs::new()
        .map_err(|e| ProviderError::DeviceNotReady(format!("Failed to initialize gilrs: {}", e)))?;

    let gamepads: Vec<(GamepadId, String)> = gilrs
        .gamepads()
        .map(|(id, gamepad)| (id, gamepad.name().to_string()))
        .collect();

    if gamepads.is_empty() {
        return Err(ProviderError::DeviceNotReady(
            "No gamepad connected".to_string(),
        ));
    }

    for (id, name) in &gamepads {
        info!("Found gamepad {}: {}", id, name);
    }

    let (active, name) = &gamepads[0];
    info!("Selected gamepad: {} ({})", name, active);

    let shared = Arc::new(Mutex::new(GamepadState {
        gilrs,
        active: *active,
    }));

    Ok((
        GamepadAxes {
            shared: shared.clone(),
        },
        GamepadButtons { shared },
    ))
}

impl AxisSampler for GamepadAxes {
    fn sample(&mut self, channel: AxisChannel) -> Result<i32, ProviderError> {
        let mut state = self
            .shared
            .lock()
            .map_err(|e| ProviderError::AcquisitionFailed(format!("Gamepad state poisoned: {}", e)))?;
        state.pump();

        let active = state.active;
        let gamepad = state.gilrs.gamepad(active);
        if !gamepad.is_connected() {
            return Err(ProviderError::AcquisitionFailed(
                "Gamepad disconnected".to_string(),
            ));
        }

        let axis = match channel {
            AxisChannel::X => Axis::LeftStickX,
            AxisChannel::Y => Axis::LeftStickY,
        };
        let value = gamepad.axis_data(axis).map(|data| data.value()).unwrap_or(0.0);

        // Stick-up and stick-left land below center, matching the ADC
        // orientation of a vertically mounted stick.
        let raw = match channel {
            AxisChannel::X => (value + 1.0) / 2.0 * RAW_FULL_SCALE,
            AxisChannel::Y => (1.0 - value) / 2.0 * RAW_FULL_SCALE,
        };

        Ok(raw as i32)
    }
}

impl ButtonSampler for GamepadButtons {
    fn is_pressed(&mut self, index: u8) -> bool {
        let Ok(mut state) = self.shared.lock() else {
            return false;
        };
        state.pump();

        let active = state.active;
        let gamepad = state.gilrs.gamepad(active);
        BUTTON_ORDER
            .get(index as usize)
            .map(|button| gamepad.is_pressed(*button))
            .unwrap_or(false)
    }
}
