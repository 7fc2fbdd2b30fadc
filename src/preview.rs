use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::foundation::core::{ALPHA_MAP_DIM, PACKED_CHANNELS, texel_index};
use crate::layers::set::LayerSet;

impl<T> LayerSet<T> {
    /// 2D overview of layers 1..=3 as the red, green and blue channels.
    pub fn overview_image(&self) -> RgbImage {
        let dim = ALPHA_MAP_DIM as u32;
        let packed = self.packed_display();
        RgbImage::from_fn(dim, dim, |x, z| {
            let at = texel_index(x as usize, z as usize) * PACKED_CHANNELS;
            Rgb([packed[at], packed[at + 1], packed[at + 2]])
        })
    }

    /// Visible weight of one layer as a grayscale image; `None` for an absent layer.
    pub fn layer_image(&self, layer: usize) -> Option<GrayImage> {
        if layer >= self.layer_count() {
            return None;
        }
        let dim = ALPHA_MAP_DIM as u32;
        Some(GrayImage::from_fn(dim, dim, |x, z| {
            Luma([self.layer_weights(texel_index(x as usize, z as usize))[layer]])
        }))
    }
}

#[cfg(test)]
#[path = "../tests/unit/preview.rs"]
mod tests;
