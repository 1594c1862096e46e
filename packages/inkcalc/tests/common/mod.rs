//! Synthetic equation images shared by the integration tests.
#![allow(dead_code)]

use image::{GrayImage, Luma};

pub fn blank(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255]))
}

pub fn ink(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
    for py in y..y + h {
        for px in x..x + w {
            img.put_pixel(px, py, Luma([0]));
        }
    }
}

/// Three strokes: a tall digit, a wide flat operator, a tall digit.
/// The right-hand digit sits highest so raster order differs from reading order.
pub fn three_symbols() -> GrayImage {
    let mut img = blank(200, 80);
    ink(&mut img, 150, 5, 12, 30);
    ink(&mut img, 20, 30, 12, 25);
    ink(&mut img, 80, 40, 25, 10);
    img
}
