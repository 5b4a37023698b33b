//! Overlay state composited over the bitmap: reticle, targets and animation

use enumset::{EnumSet, EnumSetType};
use log::debug;
use rgb::RGB8;
use serde::{Deserialize, Serialize};

/// Half-width of the reticle square
pub const RETICLE_RADIUS: i32 = 2;

/// Number of target slots
pub const MAX_TARGETS: usize = 4;

/// Ring hit tolerance in squared-distance units
const RING_TOLERANCE: i128 = 1;

/// Legacy ring center while no reticle is shown
const LEGACY_IDLE_CENTER: Point = Point::new(-1, -1);

/// Absolute distance along one axis, widened so no `i32` input overflows
#[inline]
fn distance(a: i32, b: i32) -> i64 {
    (i64::from(a) - i64::from(b)).abs()
}

/// A coordinate in the unrolled bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Overlay layers that can be composited, in precedence order
#[derive(Debug, EnumSetType, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Reticle,
    Targets,
    Animation,
}

/// Shape used for the animation ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingShape {
    /// Centered on the reticle, or on (-1, -1) while no reticle is shown, with
    /// the vertical term computed as `|dy| + |dy|`
    #[default]
    Legacy,
    /// True circle centered on the coordinates passed when the animation started
    Circle,
}

/// Overlay colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub reticle: RGB8,
    pub target: RGB8,
    pub abduction: RGB8,
    pub scanner: RGB8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            reticle: RGB8::new(255, 0, 0),
            target: RGB8::new(0, 255, 0),
            abduction: RGB8::new(255, 128, 0),
            scanner: RGB8::new(0, 0, 255),
        }
    }
}

/// The aiming marker; drawn as a hollow square
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reticle {
    position: Option<Point>,
}

impl Reticle {
    pub fn set(&mut self, position: Point) {
        self.position = Some(position);
    }

    pub fn clear(&mut self) {
        self.position = None;
    }

    /// Current position, `None` while hidden
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    #[must_use]
    pub fn is_hit(&self, x: i32, y: i32) -> bool {
        let Some(center) = self.position else {
            return false;
        };
        let radius = i64::from(RETICLE_RADIUS);
        let dx = distance(x, center.x);
        let dy = distance(y, center.y);
        (dx == radius && dy <= radius) || (dy == radius && dx <= radius)
    }
}

/// Fixed set of target markers addressed by id.
///
/// Setting an occupied slot is ignored until the slot is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    slots: [Option<Point>; MAX_TARGETS],
    occupied: usize,
}

impl Targets {
    /// Occupy slot `id`. Returns `true` if the slot was empty and is now set.
    pub fn set(&mut self, id: usize, position: Point) -> bool {
        match self.slots.get_mut(id) {
            Some(slot @ None) => {
                *slot = Some(position);
                self.occupied += 1;
                true
            }
            _ => false,
        }
    }

    /// Empty slot `id`. Returns `true` if it was occupied.
    pub fn clear(&mut self, id: usize) -> bool {
        match self.slots.get_mut(id) {
            Some(slot @ Some(_)) => {
                *slot = None;
                self.occupied -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn clear_all(&mut self) {
        for id in 0..MAX_TARGETS {
            self.clear(id);
        }
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<Point> {
        self.slots.get(id).copied().flatten()
    }

    /// Number of occupied slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupied
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    #[must_use]
    pub fn is_hit(&self, x: i32, y: i32) -> bool {
        let pixel = Point::new(x, y);
        self.slots.iter().any(|slot| *slot == Some(pixel))
    }
}

/// Built-in ring animations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPreset {
    /// Large, slow ring
    Abduction,
    /// Small, quick ring
    Scanner,
}

impl AnimationPreset {
    /// `(increment, frames_per_increment, frames)`
    const fn timing(self) -> (i32, u32, u32) {
        match self {
            Self::Abduction => (2, 10, 100),
            Self::Scanner => (1, 3, 30),
        }
    }

    const fn color(self, palette: &Palette) -> RGB8 {
        match self {
            Self::Abduction => palette.abduction,
            Self::Scanner => palette.scanner,
        }
    }
}

/// An expanding ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    preset: AnimationPreset,
    /// Frames left before the animation ends, always positive
    remaining: u32,
    radius: i32,
    increment: i32,
    frames_per_increment: u32,
    color: RGB8,
    origin: Point,
}

impl Animation {
    #[must_use]
    pub fn new(preset: AnimationPreset, origin: Point, palette: &Palette) -> Self {
        let (increment, frames_per_increment, frames) = preset.timing();
        Self {
            preset,
            remaining: frames,
            radius: 0,
            increment,
            frames_per_increment,
            color: preset.color(palette),
            origin,
        }
    }

    #[must_use]
    pub fn preset(&self) -> AnimationPreset {
        self.preset
    }

    /// Frames left, always positive while the animation exists
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    #[must_use]
    pub fn color(&self) -> RGB8 {
        self.color
    }

    /// Coordinates given when the animation was started
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Progress one frame. Returns `false` once the animation has ended.
    #[must_use]
    pub fn advance(&mut self) -> bool {
        if self.remaining % self.frames_per_increment == 0 {
            self.radius += self.increment;
        }
        self.remaining -= 1;
        self.remaining > 0
    }

    /// Ring test against a center chosen by the caller
    #[must_use]
    fn is_hit(&self, center: Point, x: i32, y: i32, shape: RingShape) -> bool {
        // squares of full-range i32 distances need more than 64 bits
        let dx = i128::from(distance(x, center.x));
        let dy = i128::from(distance(y, center.y));
        let vertical = match shape {
            RingShape::Legacy => dy + dy,
            RingShape::Circle => dy * dy,
        };
        let radius = i128::from(self.radius);
        (dx * dx + vertical - radius * radius).abs() <= RING_TOLERANCE
    }
}

/// All overlay state read by the renderer each pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlays {
    pub reticle: Reticle,
    pub targets: Targets,
    pub animation: Option<Animation>,
}

impl Overlays {
    /// Start `preset`, replacing any running animation
    pub fn play(&mut self, preset: AnimationPreset, origin: Point, palette: &Palette) {
        debug!("Starting {preset:?} animation at ({}, {})", origin.x, origin.y);
        self.animation = Some(Animation::new(preset, origin, palette));
    }

    /// One animation tick
    pub fn advance_animation(&mut self) {
        if let Some(animation) = self.animation.as_mut() {
            if !animation.advance() {
                debug!("{:?} animation finished", animation.preset);
                self.animation = None;
            }
        }
    }

    pub fn clear_animation(&mut self) {
        self.animation = None;
    }

    /// Check the animation ring for `(x, y)`
    #[must_use]
    pub fn is_animation_hit(&self, x: i32, y: i32, shape: RingShape) -> bool {
        let Some(animation) = &self.animation else {
            return false;
        };
        let center = match shape {
            RingShape::Legacy => self.reticle.position().unwrap_or(LEGACY_IDLE_CENTER),
            RingShape::Circle => animation.origin,
        };
        animation.is_hit(center, x, y, shape)
    }

    /// Overlay color for `(x, y)`, if any enabled layer covers it.
    ///
    /// Layers are tested reticle first, then targets, then animation; the
    /// first hit wins.
    #[must_use]
    pub fn color_at(
        &self,
        x: i32,
        y: i32,
        enabled: EnumSet<OverlayKind>,
        shape: RingShape,
        palette: &Palette,
    ) -> Option<RGB8> {
        if enabled.contains(OverlayKind::Reticle) && self.reticle.is_hit(x, y) {
            return Some(palette.reticle);
        }
        if enabled.contains(OverlayKind::Targets) && self.targets.is_hit(x, y) {
            return Some(palette.target);
        }
        if enabled.contains(OverlayKind::Animation) && self.is_animation_hit(x, y, shape) {
            return self.animation.map(|a| a.color);
        }
        None
    }

    /// Returns `true` if nothing would be drawn
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.reticle.position().is_none() && self.targets.is_empty() && self.animation.is_none()
    }
}
