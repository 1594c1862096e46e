use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image space, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Width over height, or `None` for a zero-height box.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.h == 0 {
            return None;
        }
        Some(f64::from(self.w) / f64::from(self.h))
    }

    /// Grows the box by `pad` on every side, clamped to a `width` x `height` image.
    /// Returns `(x, y, w, h)` of the clamped window.
    pub fn padded_within(&self, pad: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let x0 = self.x.saturating_sub(pad);
        let y0 = self.y.saturating_sub(pad);
        let x1 = self.x.saturating_add(self.w).saturating_add(pad).min(width);
        let y1 = self.y.saturating_add(self.h).saturating_add(pad).min(height);
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// A grayscale crop around one candidate symbol, paired with its unpadded box.
#[derive(Debug, Clone)]
pub struct SymbolRegion {
    pub bounding_box: BoundingBox,
    pub crop: GrayImage,
}
