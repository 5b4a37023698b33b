//! Rendering engine for the POV globe
//!
//! This library turns a stored cylindrical bitmap plus transient overlays
//! (reticle, targets, expanding rings) into per-column LED buffers for a
//! rotating array of strips. It is hardware-agnostic: the LED output goes
//! through the [`LedDriver`] trait, so everything here can be tested without
//! embedded hardware.

pub mod bitmap;
pub mod geometry;
pub mod overlay;
pub mod remap;
pub mod render;

pub use bitmap::{graticule, Bitmap, BitmapError};
pub use geometry::{Geometry, GeometryError};
pub use overlay::{AnimationPreset, OverlayKind, Overlays, Palette, Point, RingShape};
pub use remap::{RemapError, Wiring};
pub use render::{Frame, LedDriver, RenderError, RenderOptions, RenderState, Renderer};
pub use rgb::RGB8;
