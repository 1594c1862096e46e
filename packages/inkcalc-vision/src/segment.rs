//! Splits an equation image into ordered symbol regions.

use image::imageops;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use tracing::debug;

use crate::region::{BoundingBox, SymbolRegion};

/// Boxes narrower or shorter than this are treated as specks.
pub const MIN_SYMBOL_SIDE: u32 = 10;
/// Margin kept around each symbol when cropping.
pub const CROP_PADDING: u32 = 5;

/// Converts any supported pixel layout to 8-bit luma.
///
/// Alpha is composited over white first so strokes drawn on a transparent
/// canvas keep their contrast. Color uses BT.601 weights.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        _ => {
            let rgba = image.to_rgba8();
            let mut gray = GrayImage::new(rgba.width(), rgba.height());
            for (x, y, pixel) in rgba.enumerate_pixels() {
                let [r, g, b, a] = pixel.0;
                let alpha = f32::from(a) / 255.0;
                let over_white = |c: u8| f32::from(c) * alpha + 255.0 * (1.0 - alpha);
                let luma = 0.299 * over_white(r) + 0.587 * over_white(g) + 0.114 * over_white(b);
                gray.put_pixel(x, y, Luma([luma.round().clamp(0.0, 255.0) as u8]));
            }
            gray
        }
    }
}

/// Otsu threshold, inverted so ink becomes 255 and paper 0.
pub fn binarize(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    threshold(gray, level, ThresholdType::BinaryInverted)
}

/// Bounding boxes of the outermost ink components, in detection order.
/// Components nested inside another component's hole are not reported.
pub fn external_boxes(binary: &GrayImage) -> Vec<BoundingBox> {
    find_contours::<u32>(binary)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(bounding_rect)
        .collect()
}

fn bounding_rect(contour: &Contour<u32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Runs the full segmentation: grayscale, binarize, find external contours,
/// drop specks, order left to right and crop padded regions from the
/// grayscale image.
///
/// An image with no surviving symbols yields an empty list.
pub fn segment(image: &DynamicImage) -> Vec<SymbolRegion> {
    let gray = to_grayscale(image);
    let binary = binarize(&gray);

    let mut boxes: Vec<BoundingBox> = external_boxes(&binary)
        .into_iter()
        .filter(|b| b.w >= MIN_SYMBOL_SIDE && b.h >= MIN_SYMBOL_SIDE)
        .collect();
    // Stable: equal x keeps detection order.
    boxes.sort_by_key(|b| b.x);

    debug!(
        width = gray.width(),
        height = gray.height(),
        symbols = boxes.len(),
        "segmented equation image"
    );

    boxes
        .into_iter()
        .map(|bounding_box| {
            let (x, y, w, h) = bounding_box.padded_within(CROP_PADDING, gray.width(), gray.height());
            SymbolRegion {
                bounding_box,
                crop: imageops::crop_imm(&gray, x, y, w, h).to_image(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect;

    fn blank(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255]))
    }

    fn ink(img: &mut GrayImage, x: i32, y: i32, w: u32, h: u32) {
        draw_filled_rect_mut(img, Rect::at(x, y).of_size(w, h), Luma([0]));
    }

    #[test]
    fn test_blank_image_has_no_symbols() {
        let regions = segment(&DynamicImage::ImageLuma8(blank(120, 60)));
        assert!(regions.is_empty());
    }

    #[test]
    fn test_boxes_are_sorted_left_to_right() {
        let mut img = blank(200, 80);
        // Right-hand block sits higher, so raster order would find it first.
        ink(&mut img, 140, 5, 15, 30);
        ink(&mut img, 20, 30, 12, 25);
        ink(&mut img, 80, 40, 25, 10);

        let regions = segment(&DynamicImage::ImageLuma8(img));
        let boxes: Vec<BoundingBox> = regions.iter().map(|r| r.bounding_box).collect();
        assert_eq!(
            boxes,
            vec![
                BoundingBox::new(20, 30, 12, 25),
                BoundingBox::new(80, 40, 25, 10),
                BoundingBox::new(140, 5, 15, 30),
            ]
        );
    }

    #[test]
    fn test_specks_are_dropped() {
        let mut img = blank(100, 60);
        ink(&mut img, 10, 10, 15, 20);
        ink(&mut img, 50, 10, 9, 30);
        ink(&mut img, 70, 10, 30, 4);

        let regions = segment(&DynamicImage::ImageLuma8(img));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(10, 10, 15, 20));
    }

    #[test]
    fn test_nested_components_are_not_reported() {
        let mut img = blank(120, 120);
        draw_hollow_rect_mut(&mut img, Rect::at(10, 10).of_size(80, 80), Luma([0]));
        ink(&mut img, 40, 40, 15, 15);

        let regions = segment(&DynamicImage::ImageLuma8(img));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(10, 10, 80, 80));
    }

    #[test]
    fn test_crop_is_padded_and_clamped() {
        let mut img = blank(100, 60);
        ink(&mut img, 2, 20, 12, 12);
        ink(&mut img, 50, 20, 12, 12);

        let regions = segment(&DynamicImage::ImageLuma8(img));
        assert_eq!(regions.len(), 2);
        // Left edge clamped at 0.
        assert_eq!(regions[0].crop.dimensions(), (2 + 12 + 5, 12 + 10));
        assert_eq!(regions[1].crop.dimensions(), (12 + 10, 12 + 10));
        // Crops come from the grayscale image, not the binary one.
        assert_eq!(regions[1].crop.get_pixel(0, 0)[0], 255);
        assert_eq!(regions[1].crop.get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn test_color_input_is_grayed() {
        let mut img = RgbImage::from_pixel(80, 40, Rgb([250, 250, 250]));
        for y in 10..30 {
            for x in 10..25 {
                img.put_pixel(x, y, Rgb([20, 30, 200]));
            }
        }
        let regions = segment(&DynamicImage::ImageRgb8(img));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(10, 10, 15, 20));
    }

    #[test]
    fn test_transparent_background_is_white() {
        let mut img = RgbaImage::from_pixel(80, 40, Rgba([0, 0, 0, 0]));
        for y in 5..25 {
            for x in 30..42 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        let gray = to_grayscale(&DynamicImage::ImageRgba8(img.clone()));
        assert_eq!(gray.get_pixel(0, 0)[0], 255);
        assert_eq!(gray.get_pixel(35, 10)[0], 0);

        let regions = segment(&DynamicImage::ImageRgba8(img));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(30, 5, 12, 20));
    }
}
