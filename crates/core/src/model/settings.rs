use thiserror::Error;

use crate::timetable::LayoutConfig;

/// Height of one hour row on the timetable grid, in pixels.
pub const DEFAULT_ROW_HEIGHT: f64 = 64.0;
/// Gap between side-by-side events, in pixels.
pub const DEFAULT_COLUMN_GAP: f64 = 4.0;
/// Width of the event area of the timetable grid, in pixels.
pub const DEFAULT_GRID_WIDTH: f64 = 960.0;
/// Seed for the mock data generator.
pub const DEFAULT_SEED: u64 = 0x1E_C5;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    row_height: f64,
    column_gap: f64,
    grid_width: f64,
    seed: u64,
}

#[derive(Clone, Debug, Default)]
pub struct SettingsDraft {
    pub row_height: Option<f64>,
    pub column_gap: Option<f64>,
    pub grid_width: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("row height must be a positive number, got {0}")]
    InvalidRowHeight(f64),
    #[error("column gap must be a non-negative number, got {0}")]
    InvalidColumnGap(f64),
    #[error("grid width must be a positive number, got {0}")]
    InvalidGridWidth(f64),
}

impl SettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill unset fields with defaults and check the rest.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for non-finite or out-of-range dimensions.
    pub fn validate(self) -> Result<Settings, SettingsError> {
        let row_height = self.row_height.unwrap_or(DEFAULT_ROW_HEIGHT);
        if !row_height.is_finite() || row_height <= 0.0 {
            return Err(SettingsError::InvalidRowHeight(row_height));
        }
        let column_gap = self.column_gap.unwrap_or(DEFAULT_COLUMN_GAP);
        if !column_gap.is_finite() || column_gap < 0.0 {
            return Err(SettingsError::InvalidColumnGap(column_gap));
        }
        let grid_width = self.grid_width.unwrap_or(DEFAULT_GRID_WIDTH);
        if !grid_width.is_finite() || grid_width <= 0.0 {
            return Err(SettingsError::InvalidGridWidth(grid_width));
        }

        Ok(Settings {
            row_height,
            column_gap,
            grid_width,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
        })
    }
}

impl Settings {
    #[must_use]
    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    #[must_use]
    pub fn column_gap(&self) -> f64 {
        self.column_gap
    }

    #[must_use]
    pub fn grid_width(&self) -> f64 {
        self.grid_width
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            row_height: self.row_height,
            column_gap: self.column_gap,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            column_gap: DEFAULT_COLUMN_GAP,
            grid_width: DEFAULT_GRID_WIDTH,
            seed: DEFAULT_SEED,
        }
    }
}
