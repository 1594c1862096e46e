//! Per-symbol preprocessing into the classifier's canonical input.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use ndarray::{Array3, Array4, ArrayView3, Axis};

use crate::segment::{binarize, to_grayscale};

/// Side length of the square classifier input.
pub const SYMBOL_SIZE: u32 = 32;

/// A `SYMBOL_SIZE x SYMBOL_SIZE x 1` tensor with values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor(Array3<f32>);

impl NormalizedTensor {
    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.0.view()
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn into_inner(self) -> Array3<f32> {
        self.0
    }
}

/// Re-binarizes a grayscale crop with its own Otsu level, resizes it to the
/// canonical size and scales it to `[0, 1]` with a trailing channel axis.
pub fn normalize_symbol(crop: &GrayImage) -> NormalizedTensor {
    let binary = binarize(crop);
    let resized = imageops::resize(&binary, SYMBOL_SIZE, SYMBOL_SIZE, FilterType::Triangle);
    let size = SYMBOL_SIZE as usize;
    NormalizedTensor(Array3::from_shape_fn((size, size, 1), |(y, x, _)| {
        f32::from(resized.get_pixel(x as u32, y as u32)[0]) / 255.0
    }))
}

/// Same as [`normalize_symbol`] for crops that still carry color channels.
pub fn normalize_image(crop: &DynamicImage) -> NormalizedTensor {
    normalize_symbol(&to_grayscale(crop))
}

/// Stacks tensors into an `[n, 32, 32, 1]` batch, preserving order.
pub fn stack(batch: &[NormalizedTensor]) -> Array4<f32> {
    let size = SYMBOL_SIZE as usize;
    let mut stacked = Array4::<f32>::zeros((batch.len(), size, size, 1));
    for (mut slot, tensor) in stacked.axis_iter_mut(Axis(0)).zip(batch) {
        slot.assign(&tensor.0);
    }
    stacked
}
