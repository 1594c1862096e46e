//! Shape-based correction of plus/minus predictions.
//!
//! The classifier confuses `+` and `-` strokes of similar thickness. The box
//! aspect ratio settles it: wide flat strokes are minus signs, near-square ones
//! are plus signs. Between the two thresholds the model's answer stands.

use serde::Serialize;

use crate::labels::glyph_for_class;
use crate::region::BoundingBox;

/// Above this width/height ratio a `+`/`-` is forced to `-`.
pub const MINUS_ASPECT_THRESHOLD: f64 = 1.5;
/// Below this width/height ratio a `+`/`-` is forced to `+`.
pub const PLUS_ASPECT_THRESHOLD: f64 = 1.2;

/// A resolved glyph and the box it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Symbol {
    pub glyph: &'static str,
    pub bounding_box: BoundingBox,
}

pub fn correct_by_geometry(glyph: &'static str, bbox: &BoundingBox) -> &'static str {
    if glyph != "+" && glyph != "-" {
        return glyph;
    }
    let Some(aspect) = bbox.aspect_ratio() else {
        return glyph;
    };

    if aspect > MINUS_ASPECT_THRESHOLD {
        "-"
    } else if aspect < PLUS_ASPECT_THRESHOLD {
        "+"
    } else {
        glyph
    }
}

/// Maps a class index to its glyph and applies the geometry correction.
/// Returns `None` when the index is outside the class alphabet.
pub fn resolve_symbol(class_index: usize, bbox: BoundingBox) -> Option<Symbol> {
    let glyph = glyph_for_class(class_index)?;
    Some(Symbol {
        glyph: correct_by_geometry(glyph, &bbox),
        bounding_box: bbox,
    })
}
