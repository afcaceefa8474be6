//! Column layout and mask packing
//!
//! Columns 0-3 are reserved for the stick directions; physical buttons start
//! at a configurable offset. All bit placement happens here so the
//! aggregation and emission logic stays free of scattered bit literals.

use crate::matrix::axis::AxisDirection;
use crate::matrix::error::MatrixError;

/// Column driven by stick-up
pub const COL_UP: u8 = 0;
/// Column driven by stick-down
pub const COL_DOWN: u8 = 1;
/// Column driven by stick-left
pub const COL_LEFT: u8 = 2;
/// Column driven by stick-right
pub const COL_RIGHT: u8 = 3;

/// Number of columns reserved for axis directions
pub const DIRECTION_COLUMNS: u8 = 4;

/// Width of the column mask; the grid cannot grow past this
pub const MAX_COLUMNS: u8 = 32;

pub(crate) const fn bit(column: u8) -> u32 {
    1u32 << column
}

/// Placement of the physical button columns on the grid.
///
/// Immutable per device instance. `button_offset` must leave the direction
/// columns untouched and the whole grid must fit the 32 bit mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Number of physical buttons
    pub button_count: u8,
    /// First column assigned to buttons
    pub button_offset: u8,
}

impl ColumnLayout {
    /// Total number of columns on the grid, directions included.
    pub fn total_columns(&self) -> u8 {
        self.button_offset + self.button_count
    }

    /// Checks the invariants that are fatal at initialization.
    pub fn validate(&self) -> Result<(), MatrixError> {
        if self.button_offset < DIRECTION_COLUMNS {
            return Err(MatrixError::InvalidLayout(format!(
                "button column offset {} overlaps the {} direction columns",
                self.button_offset, DIRECTION_COLUMNS
            )));
        }

        let total = self.button_offset as u16 + self.button_count as u16;
        if total > MAX_COLUMNS as u16 {
            return Err(MatrixError::InvalidLayout(format!(
                "{} total columns exceed the supported maximum of {}",
                total, MAX_COLUMNS
            )));
        }

        Ok(())
    }
}

/// Packs the decoded axis directions and button states into one column mask.
///
/// Axis inversion is applied here, on the decoded direction, so the
/// quantizer state stays in raw sample orientation. Opposite direction bits
/// are mutually exclusive by construction. Pure function of its inputs.
pub fn aggregate(
    axis_x: AxisDirection,
    axis_y: AxisDirection,
    buttons: &[bool],
    layout: &ColumnLayout,
    invert_x: bool,
    invert_y: bool,
) -> u32 {
    let effective_x = if invert_x { axis_x.invert() } else { axis_x };
    let effective_y = if invert_y { axis_y.invert() } else { axis_y };

    let mut mask = 0u32;

    match effective_y {
        AxisDirection::Negative => mask |= bit(COL_UP),
        AxisDirection::Positive => mask |= bit(COL_DOWN),
        AxisDirection::Neutral => {}
    }

    match effective_x {
        AxisDirection::Negative => mask |= bit(COL_LEFT),
        AxisDirection::Positive => mask |= bit(COL_RIGHT),
        AxisDirection::Neutral => {}
    }

    for (i, pressed) in buttons.iter().take(layout.button_count as usize).enumerate() {
        if *pressed {
            mask |= bit(layout.button_offset + i as u8);
        }
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_layout() -> ColumnLayout {
        ColumnLayout {
            button_count: 2,
            button_offset: 4,
        }
    }

    #[test]
    fn directions_map_to_reserved_columns() {
        let layout = test_layout();

        let mask = aggregate(
            AxisDirection::Negative,
            AxisDirection::Positive,
            &[],
            &layout,
            false,
            false,
        );
        assert_eq!(mask, bit(COL_LEFT) | bit(COL_DOWN));

        let mask = aggregate(
            AxisDirection::Positive,
            AxisDirection::Negative,
            &[],
            &layout,
            false,
            false,
        );
        assert_eq!(mask, bit(COL_RIGHT) | bit(COL_UP));
    }

    #[test]
    fn neutral_axes_set_no_direction_bits() {
        let layout = test_layout();
        let mask = aggregate(
            AxisDirection::Neutral,
            AxisDirection::Neutral,
            &[true, true],
            &layout,
            false,
            false,
        );
        assert_eq!(mask, bit(4) | bit(5));
    }

    #[test]
    fn inversion_swaps_direction_bits() {
        let layout = test_layout();
        let mask = aggregate(
            AxisDirection::Negative,
            AxisDirection::Negative,
            &[],
            &layout,
            true,
            true,
        );
        assert_eq!(mask, bit(COL_RIGHT) | bit(COL_DOWN));
    }

    #[test]
    fn buttons_land_at_the_configured_offset() {
        let layout = ColumnLayout {
            button_count: 3,
            button_offset: 8,
        };
        let mask = aggregate(
            AxisDirection::Neutral,
            AxisDirection::Neutral,
            &[true, false, true],
            &layout,
            false,
            false,
        );
        assert_eq!(mask, bit(8) | bit(10));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let layout = test_layout();
        let first = aggregate(
            AxisDirection::Positive,
            AxisDirection::Neutral,
            &[true, false],
            &layout,
            false,
            false,
        );
        let second = aggregate(
            AxisDirection::Positive,
            AxisDirection::Neutral,
            &[true, false],
            &layout,
            false,
            false,
        );
        assert_eq!(first, second);
    }

    #[test]
    fn layout_bounds() {
        assert!(test_layout().validate().is_ok());

        // offset + count = 32 is the last accepted grid
        let full = ColumnLayout {
            button_count: 28,
            button_offset: 4,
        };
        assert!(full.validate().is_ok());
        assert_eq!(full.total_columns(), MAX_COLUMNS);

        let oversized = ColumnLayout {
            button_count: 29,
            button_offset: 4,
        };
        assert!(oversized.validate().is_err());

        let overlapping = ColumnLayout {
            button_count: 1,
            button_offset: 3,
        };
        assert!(overlapping.validate().is_err());
    }
}
