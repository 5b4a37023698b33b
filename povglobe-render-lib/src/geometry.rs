//! Display geometry and logical-to-physical column lookup

use derive_more::{Display, Error};
use num_integer::Integer;
use serde::{Deserialize, Serialize};

/// Largest supported width or height, keeps coordinates inside `i32`
pub const MAX_DIMENSION: usize = 1 << 15;

/// Physical layout of the LED strips mounted around the rotation axis.
///
/// The unrolled bitmap is `x_sectors * sector_width` columns wide and
/// `y_sectors * sector_height` rows high. Each sector is driven by one strip
/// of `sector_height` LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    /// Sectors around the rotation axis
    pub x_sectors: usize,
    /// Sectors stacked along the axis
    #[serde(default = "default_y_sectors")]
    pub y_sectors: usize,
    /// Bitmap columns covered by one sector per revolution
    pub sector_width: usize,
    /// LEDs per strip
    pub sector_height: usize,
}

const fn default_y_sectors() -> usize {
    1
}

impl Default for Geometry {
    fn default() -> Self {
        Self::GLOBE
    }
}

/// Where a logical column lives in the sector layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorColumn {
    /// Logical sector in `[0, x_sectors)`
    pub sector: usize,
    /// Column inside the sector in `[0, sector_width)`
    pub column: usize,
}

/// Physical position of a logical row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripRow {
    /// Stacked sector in `[0, y_sectors)`
    pub y_sector: usize,
    /// LED index inside the strip in `[0, sector_height)`
    pub led: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GeometryError {
    #[display("geometry dimensions must be non-zero")]
    Empty,
    #[display("geometry {width}x{height} exceeds the maximum dimension")]
    TooLarge { width: usize, height: usize },
}

impl Geometry {
    /// Two 60x60 sectors side by side
    pub const GLOBE: Self = Self {
        x_sectors: 2,
        y_sectors: 1,
        sector_width: 60,
        sector_height: 60,
    };

    /// Width of the unrolled bitmap
    #[must_use]
    pub const fn width(&self) -> usize {
        self.x_sectors * self.sector_width
    }

    /// Height of the unrolled bitmap
    #[must_use]
    pub const fn height(&self) -> usize {
        self.y_sectors * self.sector_height
    }

    /// Number of physical strips
    #[must_use]
    pub const fn strip_count(&self) -> usize {
        self.x_sectors * self.y_sectors
    }

    /// Total LEDs across all strips
    #[must_use]
    pub const fn led_count(&self) -> usize {
        self.strip_count() * self.sector_height
    }

    /// Check the dimensions are usable.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] for zero-sized or oversized layouts.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.x_sectors == 0
            || self.y_sectors == 0
            || self.sector_width == 0
            || self.sector_height == 0
        {
            return Err(GeometryError::Empty);
        }
        let width = self.x_sectors.saturating_mul(self.sector_width);
        let height = self.y_sectors.saturating_mul(self.sector_height);
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(GeometryError::TooLarge { width, height });
        }
        Ok(())
    }

    /// Reduce any column, including negative ones, into `[0, width)`
    #[must_use]
    pub fn wrap_column(&self, x: i64) -> usize {
        // width is bounded by MAX_DIMENSION, so the result always fits
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let wrapped = x.mod_floor(&(self.width() as i64)) as usize;
        wrapped
    }

    /// Split a wrapped logical column into its sector and in-sector column.
    ///
    /// # Panics
    ///
    /// Panics if `x` is not already reduced into `[0, width)`.
    #[must_use]
    pub fn locate(&self, x: usize) -> SectorColumn {
        assert!(
            x < self.width(),
            "column {x} outside display width {}",
            self.width()
        );
        let (sector, column) = x.div_rem(&self.sector_width);
        SectorColumn { sector, column }
    }

    /// Split a logical row into its stacked sector and LED index.
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside `[0, height)`.
    #[must_use]
    pub fn strip_row(&self, y: usize) -> StripRow {
        assert!(
            y < self.height(),
            "row {y} outside display height {}",
            self.height()
        );
        let (y_sector, led) = y.div_rem(&self.sector_height);
        StripRow { y_sector, led }
    }
}
