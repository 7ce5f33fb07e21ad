//! crates/quranakh_core/src/sketch.rs
//!
//! Multi-stroke annotation drawings ("sketches") and their conversion between
//! the pixel space the capture surface draws in and the relative space they
//! are persisted in.
//!
//! Persisted shape, format version `"2.0"`:
//!
//! ```json
//! {
//!   "version": "2.0",
//!   "paths": [ { "paths": [ {"x": 0.25, "y": 0.5} ], "strokeColor": "#000", "strokeWidth": 4 } ],
//!   "containerDimensions": { "width": 1000, "height": 800 }
//! }
//! ```
//!
//! Documents without a version, or with any other version, are legacy pixel
//! data and are handed back exactly as stored.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::coordinates::{Dimensions, Point};

/// Format version tag written on relative-space documents.
pub const RELATIVE_FORMAT_VERSION: &str = "2.0";

/// Presentation fields of a stroke (color, width, draw mode, ...), kept opaque.
pub type StrokeAttributes = serde_json::Map<String, Value>;

/// One continuous pen stroke, in drawing order.
///
/// `attributes` is carried through every transform untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke<A = StrokeAttributes> {
    #[serde(rename = "paths")]
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub attributes: A,
}

impl<A: Clone> Stroke<A> {
    fn map_points(&self, f: impl Fn(Point) -> Point) -> Self {
        Self {
            points: self.points.iter().copied().map(f).collect(),
            attributes: self.attributes.clone(),
        }
    }
}

/// A stored sketch, tagged by coordinate format.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchDocument<A = StrokeAttributes> {
    /// Pixel-space data saved before relative coordinates were introduced.
    /// Kept as the stored JSON value; it is never decoded or rewritten.
    Legacy(Value),
    /// Unit-square data. `reference` is the surface size at save time and is
    /// kept for diagnostics only.
    Relative {
        strokes: Vec<Stroke<A>>,
        reference: Dimensions,
    },
}

impl<A> SketchDocument<A> {
    pub fn is_relative(&self) -> bool {
        matches!(self, SketchDocument::Relative { .. })
    }

    /// The decoded strokes of a relative document.
    pub fn relative_strokes(&self) -> Option<&[Stroke<A>]> {
        match self {
            SketchDocument::Legacy(_) => None,
            SketchDocument::Relative { strokes, .. } => Some(strokes),
        }
    }
}

impl<A: Serialize> SketchDocument<A> {
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl<A: DeserializeOwned> SketchDocument<A> {
    /// Reads a stored sketch. Only `"2.0"` documents are decoded; anything
    /// else is kept verbatim as legacy data.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        let tagged_relative = value
            .get("version")
            .and_then(Value::as_str)
            .is_some_and(|v| v == RELATIVE_FORMAT_VERSION);
        if !tagged_relative {
            return Ok(SketchDocument::Legacy(value));
        }

        let raw: RawRelativeSketch<A> = serde_json::from_value(value)?;
        Ok(SketchDocument::Relative {
            strokes: raw.paths,
            reference: raw.container_dimensions.unwrap_or_default(),
        })
    }
}

/// A sketch ready to draw on a surface of a given size.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelSketch<'a, A = StrokeAttributes> {
    /// Legacy data, exactly as stored.
    Legacy(&'a Value),
    /// Relative data rescaled to the requested surface.
    Scaled(Vec<Stroke<A>>),
}

impl<A: Serialize> PixelSketch<'_, A> {
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Converts a freshly captured pixel-space drawing into a relative document.
///
/// The input is not modified; `surface` is recorded as the reference size.
pub fn to_relative_document<A: Clone>(
    strokes: &[Stroke<A>],
    surface: Dimensions,
) -> SketchDocument<A> {
    SketchDocument::Relative {
        strokes: strokes
            .iter()
            .map(|stroke| stroke.map_points(|p| p.to_relative(surface)))
            .collect(),
        reference: surface,
    }
}

/// Produces a pixel-space sketch for a surface of the `current` size.
///
/// Legacy documents are borrowed as stored and never rescaled, which means
/// they do not follow zoom changes.
pub fn to_pixel_document<A: Clone>(
    stored: &SketchDocument<A>,
    current: Dimensions,
) -> PixelSketch<'_, A> {
    match stored {
        SketchDocument::Legacy(value) => {
            warn!(
                version = ?value.get("version"),
                "Rendering legacy pixel-space sketch without rescaling"
            );
            PixelSketch::Legacy(value)
        }
        SketchDocument::Relative { strokes, .. } => PixelSketch::Scaled(
            strokes
                .iter()
                .map(|stroke| stroke.map_points(|p| p.to_pixel(current)))
                .collect(),
        ),
    }
}

//=========================================================================================
// Wire Format
//=========================================================================================

#[derive(Deserialize)]
struct RawRelativeSketch<A> {
    #[serde(default = "Vec::new")]
    paths: Vec<Stroke<A>>,
    #[serde(default, rename = "containerDimensions")]
    container_dimensions: Option<Dimensions>,
}

#[derive(Serialize)]
struct RawRelativeSketchRef<'a, A> {
    version: &'static str,
    paths: &'a [Stroke<A>],
    #[serde(rename = "containerDimensions")]
    container_dimensions: Dimensions,
}

#[derive(Serialize)]
struct RawPixelSketchRef<'a, A> {
    paths: &'a [Stroke<A>],
}

impl<'de, A: DeserializeOwned> Deserialize<'de> for SketchDocument<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SketchDocument::from_json(value).map_err(D::Error::custom)
    }
}

impl<A: Serialize> Serialize for SketchDocument<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SketchDocument::Legacy(value) => value.serialize(serializer),
            SketchDocument::Relative { strokes, reference } => RawRelativeSketchRef {
                version: RELATIVE_FORMAT_VERSION,
                paths: strokes,
                container_dimensions: *reference,
            }
            .serialize(serializer),
        }
    }
}

impl<A: Serialize> Serialize for PixelSketch<'_, A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PixelSketch::Legacy(value) => value.serialize(serializer),
            PixelSketch::Scaled(strokes) => RawPixelSketchRef { paths: strokes }.serialize(serializer),
        }
    }
}
