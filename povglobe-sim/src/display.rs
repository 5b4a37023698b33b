//! Turning recorded column frames back into a terminal image

use std::fmt::Write;

use povglobe_render_lib::{Geometry, RGB8};

/// Luminance ramp for `--ascii`, darkest first
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// Reassemble one revolution of frames into rows of the physical display.
///
/// Frame `slice` lights column `slot * sector_width + slice` of every slot;
/// slot `p` occupies `[p * height, (p + 1) * height)` of the frame.
#[must_use]
pub fn unroll(geometry: &Geometry, frames: &[Vec<RGB8>]) -> Vec<Vec<RGB8>> {
    let height = geometry.height();
    let mut rows = vec![vec![RGB8::default(); geometry.width()]; height];
    for (slice, frame) in frames.iter().enumerate().take(geometry.sector_width) {
        for (slot, column) in frame.chunks_exact(height).enumerate() {
            let x = slot * geometry.sector_width + slice;
            for (y, pixel) in column.iter().enumerate() {
                rows[y][x] = *pixel;
            }
        }
    }
    rows
}

fn ascii_char(pixel: RGB8) -> char {
    let luma = (u32::from(pixel.r) * 30 + u32::from(pixel.g) * 59 + u32::from(pixel.b) * 11) / 100;
    let index = luma as usize * (ASCII_RAMP.len() - 1) / 255;
    char::from(ASCII_RAMP[index])
}

/// Render rows as text, two terminal cells per pixel in ANSI mode
#[must_use]
pub fn format_rows(rows: &[Vec<RGB8>], ascii: bool) -> String {
    let mut out = String::new();
    for row in rows {
        for &pixel in row {
            if ascii {
                out.push(ascii_char(pixel));
            } else {
                let _ = write!(out, "\x1b[48;2;{};{};{}m  ", pixel.r, pixel.g, pixel.b);
            }
        }
        if !ascii {
            out.push_str("\x1b[0m");
        }
        out.push('\n');
    }
    out
}
