//! Sector remapping for the two supported strip wirings
//!
//! With [`Wiring::Serial`] the strips are chained and every physical slot is a
//! contiguous run of pixels, so remapping is just picking the right bitmap
//! column for each slot.
//!
//! With [`Wiring::Parallel`] every strip is driven from its own bit lane of a
//! shared output word. One word carries a single color bit of the same LED
//! index for every strip:
//!
//! ```text
//!   word[led * 24 + channel * 8 + (7 - bit)]
//!        bit lane 0 -> strip of slot 0, y-sector 0
//!        bit lane 1 -> strip of slot 0, y-sector 1 (or slot 1 if unstacked)
//!        ...
//! ```
//!
//! The source table ([`LaneBitmap`]) is stored in the same layout with lanes
//! indexed by *logical* sector. Scrolling by whole sectors is then a rotation
//! of the lane bits, done with two precomputed masks and shifts per sector.

use derive_more::{Display, Error};
use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::geometry::Geometry;

/// Lane words per LED (3 channels × 8 bits)
pub const WORDS_PER_LED: usize = 24;

/// Bit lanes in one output word
pub const MAX_LANES: usize = u32::BITS as usize;

/// How the strips are connected to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wiring {
    /// Strips chained on one data line, flat pixel buffer
    #[default]
    Serial,
    /// One data line per strip, bit-interleaved lane words
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum RemapError {
    #[display("{lanes} strips exceed the 32 parallel lanes")]
    TooManyLanes { lanes: usize },
}

/// Mask with the low `n` bits set
#[inline]
const fn low_bits(n: usize) -> u32 {
    if n >= MAX_LANES {
        u32::MAX
    } else {
        (1 << n) - 1
    }
}

/// Per-sector rotation constants.
///
/// `apply` rebuilds a word as
/// `(src & mask_a) >> shift_a | (src & mask_b) << shift_b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LaneShift {
    mask_a: u32,
    shift_a: u32,
    mask_b: u32,
    shift_b: u32,
}

impl LaneShift {
    /// Rotate the low `lanes` bits right by `by`
    // lanes and by are bounded by MAX_LANES
    #[allow(clippy::cast_possible_truncation)]
    const fn rotate_right(lanes: usize, by: usize) -> Self {
        Self {
            mask_a: low_bits(lanes) & !low_bits(by),
            shift_a: by as u32,
            mask_b: low_bits(by),
            shift_b: (lanes - by) as u32,
        }
    }

    #[inline]
    fn apply(&self, word: u32) -> u32 {
        // shift_b can equal 32 when mask_b is empty; wrapping keeps that a no-op
        ((word & self.mask_a).wrapping_shr(self.shift_a))
            | ((word & self.mask_b).wrapping_shl(self.shift_b))
    }

    /// Undo `apply`: the lanes moved down by `shift_a` and up by `shift_b`
    #[inline]
    fn invert(&self, word: u32) -> u32 {
        ((word & self.mask_a.wrapping_shr(self.shift_a)).wrapping_shl(self.shift_a))
            | ((word & self.mask_b.wrapping_shl(self.shift_b)).wrapping_shr(self.shift_b))
    }
}

/// Bit-lane remapper for [`Wiring::Parallel`]
#[derive(Debug, Clone)]
pub struct LaneRemapper {
    lanes: usize,
    y_sectors: usize,
    shifts: Vec<LaneShift>,
}

impl LaneRemapper {
    /// Precompute the rotation for every logical sector.
    ///
    /// # Errors
    ///
    /// Returns [`RemapError::TooManyLanes`] if the geometry has more strips
    /// than bits in a lane word.
    pub fn new(geometry: &Geometry) -> Result<Self, RemapError> {
        let lanes = geometry.strip_count();
        if lanes > MAX_LANES {
            return Err(RemapError::TooManyLanes { lanes });
        }
        let shifts = (0..geometry.x_sectors)
            .map(|sector| LaneShift::rotate_right(lanes, sector * geometry.y_sectors))
            .collect();
        Ok(Self {
            lanes,
            y_sectors: geometry.y_sectors,
            shifts,
        })
    }

    /// Number of lanes in use
    #[must_use]
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Lane carrying `(slot, y_sector)`
    #[must_use]
    pub fn lane(&self, slot: usize, y_sector: usize) -> usize {
        slot * self.y_sectors + y_sector
    }

    /// Move the lanes of a source word so logical `sector` lands on slot 0
    #[inline]
    #[must_use]
    pub fn remap_word(&self, sector: usize, word: u32) -> u32 {
        self.shifts[sector].apply(word)
    }

    /// Inverse of [`remap_word`](Self::remap_word)
    #[must_use]
    pub fn unmap_word(&self, sector: usize, word: u32) -> u32 {
        self.shifts[sector].invert(word)
    }
}

/// Set one lane of an LED's 24 words to `color`
pub fn write_lane_pixel(words: &mut [u32], lane: usize, led: usize, color: RGB8) {
    let bit_mask = 1u32 << lane;
    let base = led * WORDS_PER_LED;
    for (channel, value) in [color.r, color.g, color.b].into_iter().enumerate() {
        for bit in 0..8 {
            let word = &mut words[base + channel * 8 + (7 - bit)];
            if value & (1 << bit) == 0 {
                *word &= !bit_mask;
            } else {
                *word |= bit_mask;
            }
        }
    }
}

/// Read one lane of an LED's 24 words back into a color
#[must_use]
pub fn read_lane_pixel(words: &[u32], lane: usize, led: usize) -> RGB8 {
    let base = led * WORDS_PER_LED;
    let mut channels = [0u8; 3];
    for (channel, value) in channels.iter_mut().enumerate() {
        for bit in 0..8 {
            if words[base + channel * 8 + (7 - bit)] & (1 << lane) != 0 {
                *value |= 1 << bit;
            }
        }
    }
    RGB8::new(channels[0], channels[1], channels[2])
}

/// Bitmap pre-transposed into lane words, one block per in-sector column.
///
/// Lane `sector * y_sectors + y_sector` of column `c` holds the pixels of
/// logical column `sector * sector_width + c`.
#[derive(Debug, Clone)]
pub struct LaneBitmap {
    words_per_column: usize,
    words: Vec<u32>,
}

impl LaneBitmap {
    /// Transpose `bitmap` into lane words
    #[must_use]
    pub fn from_bitmap(bitmap: &Bitmap, remapper: &LaneRemapper) -> Self {
        let geometry = *bitmap.geometry();
        let words_per_column = geometry.sector_height * WORDS_PER_LED;
        let mut words = vec![0u32; geometry.sector_width * words_per_column];

        for (column, block) in words.chunks_exact_mut(words_per_column).enumerate() {
            for sector in 0..geometry.x_sectors {
                let x = sector * geometry.sector_width + column;
                for y in 0..geometry.height() {
                    let row = geometry.strip_row(y);
                    let lane = remapper.lane(sector, row.y_sector);
                    write_lane_pixel(block, lane, row.led, bitmap.pixel(x, y));
                }
            }
        }

        Self {
            words_per_column,
            words,
        }
    }

    /// Lane words for in-sector `column`
    #[must_use]
    pub fn column(&self, column: usize) -> &[u32] {
        let start = column * self.words_per_column;
        &self.words[start..start + self.words_per_column]
    }

    #[must_use]
    pub fn words_per_column(&self) -> usize {
        self.words_per_column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn geometry(x_sectors: usize, y_sectors: usize) -> Geometry {
        Geometry {
            x_sectors,
            y_sectors,
            sector_width: 4,
            sector_height: 3,
        }
    }

    #[test]
    fn test_sector_zero_is_identity() {
        let remapper = LaneRemapper::new(&geometry(4, 1)).unwrap();
        assert_eq!(remapper.remap_word(0, 0b1011), 0b1011);
    }

    #[test]
    fn test_rotation_moves_logical_sector_to_slot_zero() {
        let remapper = LaneRemapper::new(&geometry(4, 1)).unwrap();
        // logical sector 2 set; rendering sector 2 first puts it in lane 0
        assert_eq!(remapper.remap_word(2, 0b0100), 0b0001);
        // logical sector 1 wraps around to the last lane
        assert_eq!(remapper.remap_word(2, 0b0010), 0b1000);
    }

    #[test]
    fn test_stacked_sectors_rotate_in_pairs() {
        let remapper = LaneRemapper::new(&geometry(3, 2)).unwrap();
        assert_eq!(remapper.lanes(), 6);
        // sector 1 lanes (2, 3) land on slot 0 lanes (0, 1)
        assert_eq!(remapper.remap_word(1, 0b00_1100), 0b00_0011);
    }

    #[test]
    fn test_full_width_lanes() {
        let g = Geometry {
            x_sectors: 32,
            y_sectors: 1,
            sector_width: 1,
            sector_height: 1,
        };
        let remapper = LaneRemapper::new(&g).unwrap();
        assert_eq!(remapper.remap_word(0, u32::MAX), u32::MAX);
        assert_eq!(remapper.remap_word(1, 1), 1 << 31);
        assert_eq!(remapper.remap_word(31, 1 << 31), 1);
    }

    #[test]
    fn test_too_many_lanes() {
        let err = LaneRemapper::new(&geometry(17, 2)).unwrap_err();
        assert_eq!(err, RemapError::TooManyLanes { lanes: 34 });
    }

    #[test]
    fn test_round_trip_patterns() {
        for (x_sectors, y_sectors) in [(2, 1), (3, 2), (8, 1), (16, 2)] {
            let remapper = LaneRemapper::new(&geometry(x_sectors, y_sectors)).unwrap();
            let used = low_bits(remapper.lanes());
            for pattern in [0, u32::MAX, 0xAAAA_AAAA, 0x5555_5555] {
                let word = pattern & used;
                for sector in 0..x_sectors {
                    let out = remapper.remap_word(sector, word);
                    assert_eq!(
                        out.count_ones(),
                        word.count_ones(),
                        "sector {sector} changed the bit count"
                    );
                    assert_eq!(remapper.unmap_word(sector, out), word);
                }
            }
        }
    }

    #[test]
    fn test_lane_pixel_round_trip() {
        let mut words = vec![0u32; WORDS_PER_LED * 2];
        let color = RGB8::new(0x81, 0x3C, 0xFF);
        write_lane_pixel(&mut words, 5, 1, color);
        assert_eq!(read_lane_pixel(&words, 5, 1), color);
        assert_eq!(read_lane_pixel(&words, 4, 1), RGB8::default());
        assert_eq!(read_lane_pixel(&words, 5, 0), RGB8::default());
        // MSB of red goes out first
        assert_eq!(words[WORDS_PER_LED], 1 << 5);

        write_lane_pixel(&mut words, 5, 1, RGB8::default());
        assert!(words.iter().all(|&w| w == 0));
    }

    #[test]
    fn test_lane_bitmap_transpose() {
        let g = geometry(2, 1);
        #[allow(clippy::cast_possible_truncation)]
        let bitmap = Bitmap::from_fn(g, |x, y| RGB8::new(x as u8, y as u8, 7));
        let remapper = LaneRemapper::new(&g).unwrap();
        let lanes = LaneBitmap::from_bitmap(&bitmap, &remapper);

        // column 1 of sector 1 is logical column 5
        let block = lanes.column(1);
        assert_eq!(block.len(), lanes.words_per_column());
        assert_eq!(read_lane_pixel(block, 1, 2), RGB8::new(5, 2, 7));
        assert_eq!(read_lane_pixel(block, 0, 2), RGB8::new(1, 2, 7));
    }

    proptest! {
        #[test]
        fn remap_is_a_bijection(
            word in any::<u32>(),
            x_sectors in 1usize..=16,
            y_sectors in 1usize..=2,
            sector in 0usize..16,
        ) {
            let remapper = LaneRemapper::new(&geometry(x_sectors, y_sectors)).unwrap();
            let sector = sector % x_sectors;
            let word = word & low_bits(remapper.lanes());
            let out = remapper.remap_word(sector, word);
            prop_assert_eq!(out & !low_bits(remapper.lanes()), 0);
            prop_assert_eq!(remapper.unmap_word(sector, out), word);
        }
    }
}
