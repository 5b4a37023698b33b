//! Column renderer: scrolls the bitmap, composites overlays and hands finished
//! buffers to the LED driver

use derive_more::{Display, Error, From};
use enumset::EnumSet;
use log::debug;
use num_integer::Integer;
use povglobe_protocol_lib::Command;
use rgb::RGB8;
use serde::{Deserialize, Serialize};

use crate::bitmap::{Bitmap, BitmapError};
use crate::geometry::{Geometry, GeometryError, SectorColumn};
use crate::overlay::{AnimationPreset, OverlayKind, Overlays, Palette, Point, RingShape};
use crate::remap::{
    read_lane_pixel, write_lane_pixel, LaneBitmap, LaneRemapper, RemapError, Wiring,
    WORDS_PER_LED,
};

/// Rendering settings, usually loaded from the device config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub wiring: Wiring,
    /// Overlay layers composited over the bitmap
    pub overlays: EnumSet<OverlayKind>,
    pub ring_shape: RingShape,
    pub palette: Palette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wiring: Wiring::default(),
            overlays: EnumSet::all(),
            ring_shape: RingShape::default(),
            palette: Palette::default(),
        }
    }
}

/// Mutable display state changed by commands between column slices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    /// Logical column aligned with the reference point, always in `[0, width)`
    pub rotation_offset: usize,
    pub overlays: Overlays,
}

/// One finished column buffer handed to the LED driver
#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    /// Flat buffer for chained strips, slot `p` at `[p * height, (p + 1) * height)`
    Pixels(&'a [RGB8]),
    /// Bit-interleaved words, one lane per strip
    Lanes {
        lanes: usize,
        leds_per_lane: usize,
        words: &'a [u32],
    },
}

impl<'a> Frame<'a> {
    /// Pixels in strip order, de-interleaving lane words if needed
    #[must_use]
    pub fn pixels(&self) -> FramePixels<'a> {
        FramePixels {
            frame: *self,
            index: 0,
        }
    }

    /// Total pixel count
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Frame::Pixels(pixels) => pixels.len(),
            Frame::Lanes {
                lanes,
                leds_per_lane,
                ..
            } => lanes * leds_per_lane,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Iterator returned by [`Frame::pixels`]
#[derive(Debug, Clone)]
pub struct FramePixels<'a> {
    frame: Frame<'a>,
    index: usize,
}

impl Iterator for FramePixels<'_> {
    type Item = RGB8;

    fn next(&mut self) -> Option<RGB8> {
        let pixel = match self.frame {
            Frame::Pixels(pixels) => pixels.get(self.index).copied(),
            Frame::Lanes {
                lanes,
                leds_per_lane,
                words,
            } => (self.index < lanes * leds_per_lane).then(|| {
                let (lane, led) = self.index.div_rem(&leds_per_lane);
                read_lane_pixel(words, lane, led)
            }),
        };
        self.index += usize::from(pixel.is_some());
        pixel
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.frame.len() - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for FramePixels<'_> {}

/// Hardware side of the renderer
pub trait LedDriver {
    type Error;

    /// Bring the strips into a known state. Called on reset.
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Transmit one column buffer, blocking until it is sent
    fn submit(&mut self, frame: Frame<'_>) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum RenderError {
    #[display("invalid geometry: {_0}")]
    Geometry(GeometryError),
    #[display("invalid bitmap: {_0}")]
    Bitmap(BitmapError),
    #[display("unsupported wiring: {_0}")]
    Remap(RemapError),
}

/// Per-wiring source table and output buffer
#[derive(Debug)]
enum Layout {
    Serial {
        bitmap: Bitmap,
        buffer: Vec<RGB8>,
    },
    Parallel {
        source: LaneBitmap,
        remapper: LaneRemapper,
        buffer: Vec<u32>,
    },
}

/// Renders one column slice at a time for every physical slot
#[derive(Debug)]
pub struct Renderer<D> {
    geometry: Geometry,
    layout: Layout,
    options: RenderOptions,
    state: RenderState,
    driver: D,
}

// Coordinates are bounded by MAX_DIMENSION, so these conversions never wrap.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
#[inline]
fn coord(value: usize) -> i32 {
    value as i32
}

#[allow(clippy::cast_possible_wrap)]
#[inline]
fn column_i64(value: usize) -> i64 {
    value as i64
}

impl<D: LedDriver> Renderer<D> {
    /// Build a renderer for `bitmap`, preparing the source table for the
    /// configured wiring. The driver is not touched until the first
    /// [`reset`](Self::reset) or [`show`](Self::show).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the geometry is unusable or the wiring
    /// cannot drive it.
    pub fn new(bitmap: Bitmap, driver: D, options: RenderOptions) -> Result<Self, RenderError> {
        let geometry = *bitmap.geometry();
        geometry.validate()?;

        let layout = match options.wiring {
            Wiring::Serial => Layout::Serial {
                buffer: vec![RGB8::default(); geometry.led_count()],
                bitmap,
            },
            Wiring::Parallel => {
                let remapper = LaneRemapper::new(&geometry)?;
                Layout::Parallel {
                    source: LaneBitmap::from_bitmap(&bitmap, &remapper),
                    buffer: vec![0; geometry.sector_height * WORDS_PER_LED],
                    remapper,
                }
            }
        };

        debug!(
            "Renderer ready: {}x{} sectors of {}x{}, {:?} wiring",
            geometry.x_sectors,
            geometry.y_sectors,
            geometry.sector_width,
            geometry.sector_height,
            options.wiring
        );

        Ok(Self {
            geometry,
            layout,
            options,
            state: RenderState::default(),
            driver,
        })
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    #[must_use]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Re-run the driver startup sequence and drop all targets.
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub fn reset(&mut self) -> Result<(), D::Error> {
        debug!("Resetting globe");
        self.clear_all_targets();
        self.driver.initialize()
    }

    /// Align logical column `x` with the reference point
    pub fn set_globe_position(&mut self, x: i32) {
        self.state.rotation_offset = self.geometry.wrap_column(i64::from(x));
        debug!("Rotation offset {}", self.state.rotation_offset);
    }

    pub fn set_reticle(&mut self, x: i32, y: i32) {
        debug!("Reticle at ({x}, {y})");
        self.state.overlays.reticle.set(Point::new(x, y));
    }

    pub fn clear_reticle(&mut self) {
        debug!("Reticle cleared");
        self.state.overlays.reticle.clear();
    }

    /// Occupy target slot `id` if it is free. Returns `true` if it was placed.
    pub fn set_target(&mut self, id: usize, x: i32, y: i32) -> bool {
        let placed = self.state.overlays.targets.set(id, Point::new(x, y));
        debug!("Target {id} at ({x}, {y}): placed={placed}");
        placed
    }

    /// Free target slot `id`. Returns `true` if it was occupied.
    pub fn clear_target(&mut self, id: usize) -> bool {
        let cleared = self.state.overlays.targets.clear(id);
        debug!("Target {id} cleared={cleared}");
        cleared
    }

    pub fn clear_all_targets(&mut self) {
        debug!("All targets cleared");
        self.state.overlays.targets.clear_all();
    }

    pub fn play_abduction_animation(&mut self, x: i32, y: i32) {
        self.play(AnimationPreset::Abduction, x, y);
    }

    pub fn play_scanner_animation(&mut self, x: i32, y: i32) {
        self.play(AnimationPreset::Scanner, x, y);
    }

    fn play(&mut self, preset: AnimationPreset, x: i32, y: i32) {
        self.state
            .overlays
            .play(preset, Point::new(x, y), &self.options.palette);
    }

    pub fn clear_animation(&mut self) {
        debug!("Animation cleared");
        self.state.overlays.clear_animation();
    }

    /// Step the running animation by one frame
    pub fn advance_animation(&mut self) {
        self.state.overlays.advance_animation();
    }

    /// Apply a decoded wire command.
    ///
    /// # Errors
    ///
    /// Only [`Command::Reset`] touches the driver and can fail.
    pub fn apply(&mut self, command: Command) -> Result<(), D::Error> {
        match command {
            Command::Reset => return self.reset(),
            Command::SetGlobePosition { x } => self.set_globe_position(x.into()),
            Command::ClearReticle => self.clear_reticle(),
            Command::SetReticle { x, y } => self.set_reticle(x.into(), y.into()),
            Command::ClearTarget { id } => {
                self.clear_target(id.into());
            }
            Command::SetTarget { id, x, y } => {
                self.set_target(id.into(), x.into(), y.into());
            }
            Command::ClearAnimation => self.clear_animation(),
            Command::PlayAbductionAnimation { x, y } => {
                self.play_abduction_animation(x.into(), y.into());
            }
            Command::PlayScannerAnimation { x, y } => {
                self.play_scanner_animation(x.into(), y.into());
            }
        }
        Ok(())
    }

    /// Render in-sector column `slice` for every slot and submit it.
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    ///
    /// # Panics
    ///
    /// Panics if `slice` is not below the sector width.
    pub fn show(&mut self, slice: usize) -> Result<(), D::Error> {
        let geometry = self.geometry;
        assert!(
            slice < geometry.sector_width,
            "slice {slice} outside sector width {}",
            geometry.sector_width
        );

        let overlays = &self.state.overlays;
        let options = &self.options;
        let composite = !options.overlays.is_empty() && !overlays.is_idle();
        let overlay_at = |x: usize, y: usize| {
            overlays.color_at(
                coord(x),
                coord(y),
                options.overlays,
                options.ring_shape,
                &options.palette,
            )
        };

        // Logical column shown on slot 0; slot p is p sectors further along
        let first = geometry.wrap_column(column_i64(self.state.rotation_offset + slice));
        let height = geometry.height();

        match &mut self.layout {
            Layout::Serial { bitmap, buffer } => {
                for (slot, out) in buffer.chunks_exact_mut(height).enumerate() {
                    let x = geometry
                        .wrap_column(column_i64(first + slot * geometry.sector_width));
                    let SectorColumn { sector, column } = geometry.locate(x);
                    out.copy_from_slice(bitmap.column(sector, column));
                    if composite {
                        for (y, pixel) in out.iter_mut().enumerate() {
                            if let Some(color) = overlay_at(x, y) {
                                *pixel = color;
                            }
                        }
                    }
                }
                self.driver.submit(Frame::Pixels(buffer))
            }
            Layout::Parallel {
                source,
                remapper,
                buffer,
            } => {
                let SectorColumn { sector, column } = geometry.locate(first);
                for (out, &word) in buffer.iter_mut().zip(source.column(column)) {
                    *out = remapper.remap_word(sector, word);
                }
                if composite {
                    for slot in 0..geometry.x_sectors {
                        let x = geometry
                            .wrap_column(column_i64(first + slot * geometry.sector_width));
                        for y in 0..height {
                            if let Some(color) = overlay_at(x, y) {
                                let row = geometry.strip_row(y);
                                let lane = remapper.lane(slot, row.y_sector);
                                write_lane_pixel(buffer, lane, row.led, color);
                            }
                        }
                    }
                }
                self.driver.submit(Frame::Lanes {
                    lanes: remapper.lanes(),
                    leds_per_lane: geometry.sector_height,
                    words: buffer,
                })
            }
        }
    }

    /// Submit an all-off buffer. Overlay state is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub fn show_blank(&mut self) -> Result<(), D::Error> {
        match &mut self.layout {
            Layout::Serial { buffer, .. } => {
                buffer.fill(RGB8::default());
                self.driver.submit(Frame::Pixels(buffer))
            }
            Layout::Parallel {
                remapper, buffer, ..
            } => {
                buffer.fill(0);
                self.driver.submit(Frame::Lanes {
                    lanes: remapper.lanes(),
                    leds_per_lane: self.geometry.sector_height,
                    words: buffer,
                })
            }
        }
    }

    /// Render a full revolution (every slice) and advance the animation once
    ///
    /// # Errors
    ///
    /// Propagates driver failures; the animation is only advanced if every
    /// slice was submitted.
    pub fn show_revolution(&mut self) -> Result<(), D::Error> {
        for slice in 0..self.geometry.sector_width {
            self.show(slice)?;
        }
        self.advance_animation();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::MAX_TARGETS;

    #[derive(Debug, Default)]
    struct RecordingDriver {
        initialized: usize,
        frames: Vec<Vec<RGB8>>,
    }

    impl LedDriver for RecordingDriver {
        type Error = std::convert::Infallible;

        fn initialize(&mut self) -> Result<(), Self::Error> {
            self.initialized += 1;
            Ok(())
        }

        fn submit(&mut self, frame: Frame<'_>) -> Result<(), Self::Error> {
            self.frames.push(frame.pixels().collect());
            Ok(())
        }
    }

    struct FailingDriver;

    impl LedDriver for FailingDriver {
        type Error = &'static str;

        fn initialize(&mut self) -> Result<(), Self::Error> {
            Err("init failed")
        }

        fn submit(&mut self, _frame: Frame<'_>) -> Result<(), Self::Error> {
            Err("transmit failed")
        }
    }

    fn small() -> Geometry {
        Geometry {
            x_sectors: 2,
            y_sectors: 1,
            sector_width: 3,
            sector_height: 2,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn coordinate_bitmap(geometry: Geometry) -> Bitmap {
        Bitmap::from_fn(geometry, |x, y| RGB8::new(x as u8, y as u8, 1))
    }

    fn renderer(geometry: Geometry, wiring: Wiring) -> Renderer<RecordingDriver> {
        let options = RenderOptions {
            wiring,
            ..RenderOptions::default()
        };
        Renderer::new(coordinate_bitmap(geometry), RecordingDriver::default(), options).unwrap()
    }

    fn last_frame(renderer: &Renderer<RecordingDriver>) -> &[RGB8] {
        renderer.driver().frames.last().unwrap()
    }

    #[test]
    fn test_serial_slots_show_consecutive_sectors() {
        let mut r = renderer(small(), Wiring::Serial);
        r.show(1).unwrap();
        assert_eq!(
            last_frame(&r),
            &[
                RGB8::new(1, 0, 1),
                RGB8::new(1, 1, 1),
                RGB8::new(4, 0, 1),
                RGB8::new(4, 1, 1),
            ]
        );
    }

    #[test]
    fn test_negative_position_wraps() {
        let mut r = renderer(small(), Wiring::Serial);
        r.set_globe_position(-1);
        assert_eq!(r.state().rotation_offset, 5);
        r.show(0).unwrap();
        let frame = last_frame(&r);
        assert_eq!(frame[0], RGB8::new(5, 0, 1));
        assert_eq!(frame[2], RGB8::new(2, 0, 1));
    }

    #[test]
    fn test_reticle_drawn_on_second_slot() {
        let geometry = Geometry {
            x_sectors: 2,
            y_sectors: 1,
            sector_width: 10,
            sector_height: 8,
        };
        let mut r = renderer(geometry, Wiring::Serial);
        r.set_reticle(12, 4);
        // slot 1 shows logical column 14 for slice 4: right edge of the square
        r.show(4).unwrap();
        let palette = Palette::default();
        let frame = last_frame(&r);
        assert_eq!(frame[8 + 4], palette.reticle);
        assert_eq!(frame[8 + 2], palette.reticle);
        assert_eq!(frame[8 + 7], RGB8::new(14, 7, 1));
        assert_eq!(frame[4], RGB8::new(4, 4, 1));
    }

    #[test]
    fn test_disabled_overlays_show_bitmap() {
        let options = RenderOptions {
            overlays: EnumSet::empty(),
            ..RenderOptions::default()
        };
        let mut r =
            Renderer::new(coordinate_bitmap(small()), RecordingDriver::default(), options).unwrap();
        r.set_target(0, 0, 0);
        r.show(0).unwrap();
        assert_eq!(last_frame(&r)[0], RGB8::new(0, 0, 1));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let geometry = Geometry {
            x_sectors: 3,
            y_sectors: 2,
            sector_width: 4,
            sector_height: 3,
        };
        let mut serial = renderer(geometry, Wiring::Serial);
        let mut parallel = renderer(geometry, Wiring::Parallel);
        for r in [&mut serial, &mut parallel] {
            r.set_reticle(5, 2);
            r.set_target(1, 10, 4);
            r.play_scanner_animation(5, 2);
            for _ in 0..6 {
                r.advance_animation();
            }
        }

        for offset in -5..20 {
            serial.set_globe_position(offset);
            parallel.set_globe_position(offset);
            for slice in 0..geometry.sector_width {
                serial.show(slice).unwrap();
                parallel.show(slice).unwrap();
                assert_eq!(
                    last_frame(&serial),
                    last_frame(&parallel),
                    "offset {offset} slice {slice}"
                );
            }
        }
    }

    #[test]
    fn test_show_blank_keeps_overlays() {
        for wiring in [Wiring::Serial, Wiring::Parallel] {
            let mut r = renderer(small(), wiring);
            r.set_reticle(1, 1);
            r.show_blank().unwrap();
            assert!(last_frame(&r).iter().all(|p| *p == RGB8::default()));
            assert_eq!(last_frame(&r).len(), 4);
            assert!(r.state().overlays.reticle.position().is_some());
        }
    }

    #[test]
    fn test_reset_initializes_and_clears_targets() {
        let mut r = renderer(small(), Wiring::Serial);
        r.set_reticle(1, 1);
        for id in 0..MAX_TARGETS {
            r.set_target(id, 0, 0);
        }
        r.apply(Command::Reset).unwrap();
        assert_eq!(r.driver().initialized, 1);
        assert!(r.state().overlays.targets.is_empty());
        assert!(r.state().overlays.reticle.position().is_some());
    }

    #[test]
    fn test_apply_dispatches_commands() {
        let mut r = renderer(small(), Wiring::Serial);
        r.apply(Command::SetGlobePosition { x: 7 }).unwrap();
        r.apply(Command::SetReticle { x: 1, y: -1 }).unwrap();
        r.apply(Command::SetTarget { id: 2, x: 3, y: 4 }).unwrap();
        r.apply(Command::SetTarget { id: 9, x: 3, y: 4 }).unwrap();
        r.apply(Command::PlayAbductionAnimation { x: 0, y: 0 })
            .unwrap();

        let state = r.state();
        assert_eq!(state.rotation_offset, 1);
        assert_eq!(state.overlays.reticle.position(), Some(Point::new(1, -1)));
        assert_eq!(state.overlays.targets.get(2), Some(Point::new(3, 4)));
        assert_eq!(state.overlays.targets.len(), 1);
        assert_eq!(
            state.overlays.animation.map(|a| a.preset()),
            Some(AnimationPreset::Abduction)
        );

        r.apply(Command::ClearTarget { id: 2 }).unwrap();
        r.apply(Command::ClearReticle).unwrap();
        r.apply(Command::ClearAnimation).unwrap();
        assert!(r.state().overlays.is_idle());
    }

    #[test]
    fn test_revolution_advances_animation_once() {
        let mut r = renderer(small(), Wiring::Serial);
        r.play_scanner_animation(0, 0);
        r.show_revolution().unwrap();
        assert_eq!(r.driver().frames.len(), 3);
        assert_eq!(r.state().overlays.animation.unwrap().remaining(), 29);
    }

    #[test]
    fn test_extreme_animation_origin_renders() {
        for ring_shape in [RingShape::Legacy, RingShape::Circle] {
            let options = RenderOptions {
                ring_shape,
                ..RenderOptions::default()
            };
            let mut r = Renderer::new(
                coordinate_bitmap(Geometry::GLOBE),
                RecordingDriver::default(),
                options,
            )
            .unwrap();
            for (x, y) in [(i16::MIN, i16::MIN), (i16::MAX, i16::MAX), (i16::MIN, i16::MAX)] {
                r.apply(Command::SetReticle { x, y }).unwrap();
                r.apply(Command::PlayScannerAnimation { x, y }).unwrap();
                r.set_globe_position(59);
                r.show(59).unwrap();
                // nothing on the globe is near the ring
                let frame = last_frame(&r);
                assert_eq!(frame[0], RGB8::new(118, 0, 1));
                assert_eq!(frame[60], RGB8::new(58, 0, 1));
            }
        }
    }

    #[test]
    fn test_clear_all_targets_keeps_other_overlays() {
        let mut r = renderer(small(), Wiring::Serial);
        r.set_reticle(1, 1);
        r.play_scanner_animation(0, 0);
        for id in 0..MAX_TARGETS {
            assert!(r.set_target(id, 2, 1));
        }
        r.clear_all_targets();
        assert!(r.state().overlays.targets.is_empty());
        assert!(r.state().overlays.reticle.position().is_some());
        assert!(r.state().overlays.animation.is_some());
        assert_eq!(r.driver().initialized, 0);

        // slots are free again
        assert!(r.set_target(0, 2, 1));
    }

    #[test]
    fn test_options_are_kept() {
        let options = RenderOptions {
            wiring: Wiring::Parallel,
            ring_shape: RingShape::Circle,
            ..RenderOptions::default()
        };
        let r = Renderer::new(
            coordinate_bitmap(small()),
            RecordingDriver::default(),
            options.clone(),
        )
        .unwrap();
        assert_eq!(r.options(), &options);
    }

    #[test]
    fn test_driver_errors_propagate() {
        let options = RenderOptions::default();
        let mut r = Renderer::new(coordinate_bitmap(small()), FailingDriver, options).unwrap();
        assert_eq!(r.show(0), Err("transmit failed"));
        assert_eq!(r.show_blank(), Err("transmit failed"));
        assert_eq!(r.reset(), Err("init failed"));
    }

    #[test]
    #[should_panic(expected = "outside sector width")]
    fn test_slice_out_of_range_panics() {
        let mut r = renderer(small(), Wiring::Serial);
        let _ = r.show(3);
    }

    #[test]
    fn test_too_many_lanes_rejected() {
        let geometry = Geometry {
            x_sectors: 33,
            y_sectors: 1,
            sector_width: 1,
            sector_height: 1,
        };
        let options = RenderOptions {
            wiring: Wiring::Parallel,
            ..RenderOptions::default()
        };
        let err = Renderer::new(Bitmap::blank(geometry), RecordingDriver::default(), options)
            .unwrap_err();
        assert_eq!(err, RenderError::Remap(RemapError::TooManyLanes { lanes: 33 }));
    }

    #[test]
    fn test_empty_geometry_rejected() {
        let geometry = Geometry {
            sector_height: 0,
            ..small()
        };
        let err = Renderer::new(
            Bitmap::blank(geometry),
            RecordingDriver::default(),
            RenderOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, RenderError::Geometry(GeometryError::Empty));
    }

    #[test]
    fn test_options_defaults_from_json() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());
        assert_eq!(options.overlays, EnumSet::all());

        let options: RenderOptions = serde_json::from_str(
            r#"{"wiring":"parallel","overlays":["reticle"],"ring_shape":"circle"}"#,
        )
        .unwrap();
        assert_eq!(options.wiring, Wiring::Parallel);
        assert_eq!(options.overlays, EnumSet::only(OverlayKind::Reticle));
        assert_eq!(options.ring_shape, RingShape::Circle);
    }
}
