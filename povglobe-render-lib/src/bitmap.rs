//! Read-only bitmap tables the renderer scrolls across the globe

use derive_more::{Display, Error};
use rgb::RGB8;

use crate::geometry::Geometry;

/// Unrolled cylindrical bitmap stored column-major.
///
/// Column `x` occupies `pixels[x * height..(x + 1) * height]`, so one render
/// slice is a single contiguous copy.
#[derive(Debug, Clone)]
pub struct Bitmap {
    geometry: Geometry,
    pixels: Vec<RGB8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum BitmapError {
    #[display("bitmap has {actual} pixels, geometry needs {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

impl Bitmap {
    /// Wrap a column-major pixel table.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError::SizeMismatch`] if `pixels` does not cover the
    /// whole geometry.
    pub fn new(geometry: Geometry, pixels: Vec<RGB8>) -> Result<Self, BitmapError> {
        let expected = geometry.width() * geometry.height();
        if pixels.len() != expected {
            return Err(BitmapError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { geometry, pixels })
    }

    /// Build a bitmap by evaluating `f(x, y)` for every pixel
    pub fn from_fn(geometry: Geometry, mut f: impl FnMut(usize, usize) -> RGB8) -> Self {
        let height = geometry.height();
        let pixels = (0..geometry.width())
            .flat_map(|x| (0..height).map(move |y| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self { geometry, pixels }
    }

    /// All-black bitmap
    #[must_use]
    pub fn blank(geometry: Geometry) -> Self {
        Self {
            geometry,
            pixels: vec![RGB8::default(); geometry.width() * geometry.height()],
        }
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Full-height column `column` of logical `sector`
    #[must_use]
    pub fn column(&self, sector: usize, column: usize) -> &[RGB8] {
        let height = self.geometry.height();
        let start = (sector * self.geometry.sector_width + column) * height;
        &self.pixels[start..start + height]
    }

    /// Single pixel at logical `(x, y)`
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> RGB8 {
        self.pixels[x * self.geometry.height() + y]
    }
}

/// Longitude/latitude grid over a hue sweep, used when no image table is linked.
///
/// Every `spacing`-th column and row is drawn white; the rest cycles through
/// red, green and blue around the globe.
#[must_use]
pub fn graticule(geometry: Geometry, spacing: usize) -> Bitmap {
    let spacing = spacing.max(1);
    let width = geometry.width();
    Bitmap::from_fn(geometry, |x, y| {
        if x % spacing == 0 || y % spacing == 0 {
            return RGB8::new(255, 255, 255);
        }
        hue_wheel(x * 768 / width)
    })
}

/// Map a position in `[0, 768)` onto a red → green → blue → red sweep
fn hue_wheel(position: usize) -> RGB8 {
    // position is below 768, so every remainder fits in a u8
    #[allow(clippy::cast_possible_truncation)]
    let step = (position % 256) as u8;
    match position / 256 {
        0 => RGB8::new(255 - step, step, 0),
        1 => RGB8::new(0, 255 - step, step),
        _ => RGB8::new(step, 0, 255 - step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Geometry {
        Geometry {
            x_sectors: 2,
            y_sectors: 1,
            sector_width: 3,
            sector_height: 2,
        }
    }

    #[test]
    fn test_new_rejects_wrong_size() {
        let err = Bitmap::new(small(), vec![RGB8::default(); 5]).unwrap_err();
        assert_eq!(
            err,
            BitmapError::SizeMismatch {
                expected: 12,
                actual: 5
            }
        );
    }

    #[test]
    fn test_column_is_contiguous() {
        #[allow(clippy::cast_possible_truncation)]
        let bitmap = Bitmap::from_fn(small(), |x, y| RGB8::new(x as u8, y as u8, 0));
        // sector 1, column 2 is logical column 5
        let column = bitmap.column(1, 2);
        assert_eq!(column, &[RGB8::new(5, 0, 0), RGB8::new(5, 1, 0)]);
        assert_eq!(bitmap.pixel(4, 1), RGB8::new(4, 1, 0));
    }

    #[test]
    fn test_graticule_grid_lines() {
        let bitmap = graticule(Geometry::GLOBE, 10);
        assert_eq!(bitmap.pixel(0, 5), RGB8::new(255, 255, 255));
        assert_eq!(bitmap.pixel(5, 20), RGB8::new(255, 255, 255));
        assert_ne!(bitmap.pixel(5, 5), RGB8::new(255, 255, 255));
    }

    #[test]
    fn test_hue_wheel_endpoints() {
        assert_eq!(hue_wheel(0), RGB8::new(255, 0, 0));
        assert_eq!(hue_wheel(256), RGB8::new(0, 255, 0));
        assert_eq!(hue_wheel(512), RGB8::new(0, 0, 255));
    }
}
