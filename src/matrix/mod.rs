//! Column matrix decision core
//!
//! Pure transforms that turn sampled input into key events on a fixed grid
//! of columns:
//!
//! 1. [`axis`] - per-axis hysteresis quantization
//! 2. [`columns`] - aggregation into a 32 bit column mask
//! 3. [`emitter`] - diff of consecutive masks into per-column events
//!
//! # Architecture
//!
//! ```text
//! Samples ──► Quantizer ──► Aggregator ──► Emitter ──► KeyEvent
//!             (tri-state)   (ColumnMask)   (XOR diff)
//! ```
//!
//! All mutable session state lives in the scanner; everything in this module
//! is a function of its inputs.

pub mod axis;
pub mod columns;
pub mod emitter;
pub mod error;

pub use axis::{quantize, AxisDirection, AxisThresholds};
pub use columns::{
    aggregate, ColumnLayout, COL_DOWN, COL_LEFT, COL_RIGHT, COL_UP, DIRECTION_COLUMNS, MAX_COLUMNS,
};
pub use emitter::emit_changes;
pub use error::MatrixError;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Row reported with every event; the grid is a single row of columns.
pub const MATRIX_ROW: u8 = 0;

/// A single key state change on the column grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub row: u8,
    pub column: u8,
    pub pressed: bool,
    pub timestamp: DateTime<Local>,
}
