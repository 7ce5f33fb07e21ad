//! crates/quranakh_core/src/coordinates.rs
//!
//! Conversion between pixel space (tied to one render size of the drawing
//! surface) and relative space (the unit square, independent of zoom).
//!
//! A `Point` never says which space it lives in. It is always read together
//! with the owning sketch's format version and, for pixel space, the current
//! surface dimensions.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sketch::Stroke;

/// A single 2D coordinate, in either pixel or relative space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Maps a pixel-space point into the unit square of `surface`.
    ///
    /// Each axis is normalized on its own (x by width, y by height).
    pub fn to_relative(self, surface: Dimensions) -> Self {
        Self {
            x: to_relative(self.x, surface.width),
            y: to_relative(self.y, surface.height),
        }
    }

    /// Maps a relative-space point onto a surface of the given size.
    pub fn to_pixel(self, surface: Dimensions) -> Self {
        Self {
            x: to_pixel(self.x, surface.width),
            y: to_pixel(self.y, surface.height),
        }
    }
}

/// Width and height of a drawing surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Which coordinate space a sketch is expected to be in when validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSpace {
    Pixel,
    Relative,
}

/// Converts one pixel coordinate to relative space.
///
/// A zero-sized surface yields `0` instead of dividing by zero.
pub fn to_relative(pixel: f64, surface_size: f64) -> f64 {
    if surface_size == 0.0 {
        return 0.0;
    }
    pixel / surface_size
}

/// Converts one relative coordinate back to pixel space.
pub fn to_pixel(relative: f64, surface_size: f64) -> f64 {
    relative * surface_size
}

/// Checks that every point of every stroke lies in the range `space` allows.
///
/// Relative data must stay within `[0, 1]`; pixel data must not be negative.
/// This is a diagnostic aid: a failure is logged and reported as `false`,
/// nothing is modified.
pub fn validate<A>(strokes: &[Stroke<A>], space: CoordinateSpace) -> bool {
    for (stroke_index, stroke) in strokes.iter().enumerate() {
        for (point_index, point) in stroke.points.iter().enumerate() {
            let in_range = match space {
                CoordinateSpace::Relative => {
                    (0.0..=1.0).contains(&point.x) && (0.0..=1.0).contains(&point.y)
                }
                CoordinateSpace::Pixel => point.x >= 0.0 && point.y >= 0.0,
            };
            if !in_range {
                warn!(
                    stroke_index,
                    point_index,
                    x = point.x,
                    y = point.y,
                    space = ?space,
                    "Sketch coordinate outside the expected range"
                );
                return false;
            }
        }
    }
    true
}
