//! Letterbox preprocessing for YOLO-style detectors.
//!
//! The image is scaled to fit an `input_size × input_size` square without
//! changing its aspect ratio, centered, and padded with gray (114). Pixels are
//! scaled to [0, 1] in RGB order and laid out NCHW.

use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

const CHANNELS: usize = 3;

/// Padding color used by YOLO training pipelines.
const PAD_VALUE: u8 = 114;

/// Geometry needed to map model-space boxes back onto the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale applied to the source image
    pub scale: f32,
    /// Horizontal padding on the left, in model pixels
    pub pad_x: f32,
    /// Vertical padding on the top, in model pixels
    pub pad_y: f32,
    /// Source image width
    pub src_width: u32,
    /// Source image height
    pub src_height: u32,
}

impl Letterbox {
    /// Compute the letterbox geometry for a source size.
    pub fn compute(src_width: u32, src_height: u32, input_size: u32) -> Self {
        let scale = (input_size as f32 / src_width as f32)
            .min(input_size as f32 / src_height as f32);
        let new_w = (src_width as f32 * scale).round();
        let new_h = (src_height as f32 * scale).round();
        Self {
            scale,
            pad_x: ((input_size as f32 - new_w) / 2.0).floor(),
            pad_y: ((input_size as f32 - new_h) / 2.0).floor(),
            src_width,
            src_height,
        }
    }

    /// Map an x coordinate from model space to source pixels, clamped to the image.
    pub fn unmap_x(&self, x: f32) -> f32 {
        ((x - self.pad_x) / self.scale).clamp(0.0, self.src_width as f32)
    }

    /// Map a y coordinate from model space to source pixels, clamped to the image.
    pub fn unmap_y(&self, y: f32) -> f32 {
        ((y - self.pad_y) / self.scale).clamp(0.0, self.src_height as f32)
    }
}

/// Letterbox an image into an NCHW tensor.
pub fn preprocess(image: &DynamicImage, input_size: u32) -> (Array4<f32>, Letterbox) {
    let (width, height) = image.dimensions();
    let letterbox = Letterbox::compute(width, height, input_size);

    let new_w = ((width as f32 * letterbox.scale).round() as u32).clamp(1, input_size);
    let new_h = ((height as f32 * letterbox.scale).round() as u32).clamp(1, input_size);
    let resized = image
        .resize_exact(new_w, new_h, FilterType::Triangle)
        .to_rgb8();

    let mut canvas = RgbImage::from_pixel(input_size, input_size, Rgb([PAD_VALUE; 3]));
    image::imageops::replace(
        &mut canvas,
        &resized,
        letterbox.pad_x as i64,
        letterbox.pad_y as i64,
    );

    let size = input_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, size, size));
    let plane = size * size;

    // Write the raw buffer straight into NCHW order; tensor is freshly allocated
    // in standard layout, so the slice is always available.
    if let Some(tensor_data) = tensor.as_slice_mut() {
        for (i, pixel) in canvas.as_raw().chunks_exact(CHANNELS).enumerate() {
            for (c, &val) in pixel.iter().enumerate() {
                tensor_data[c * plane + i] = val as f32 / 255.0;
            }
        }
    }

    (tensor, letterbox)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_landscape() {
        let lb = Letterbox::compute(1280, 640, 640);
        assert_eq!(lb.scale, 0.5);
        assert_eq!(lb.pad_x, 0.0);
        assert_eq!(lb.pad_y, 160.0);
    }

    #[test]
    fn test_letterbox_unmap_roundtrip() {
        let lb = Letterbox::compute(1280, 640, 640);
        // Model-space point (320, 320) is the image center
        assert_eq!(lb.unmap_x(320.0), 640.0);
        assert_eq!(lb.unmap_y(320.0), 320.0);
        // Points in the padding clamp to the image edge
        assert_eq!(lb.unmap_y(10.0), 0.0);
        assert_eq!(lb.unmap_y(630.0), 640.0);
    }

    #[test]
    fn test_preprocess_shape_and_range() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 50, Rgb([255, 0, 0])));
        let (tensor, lb) = preprocess(&img, 64);
        assert_eq!(tensor.shape(), &[1, 3, 64, 64]);
        assert_eq!(lb.pad_y, 16.0);

        // Center pixel is image content: red channel 1.0, green 0.0
        assert!((tensor[[0, 0, 32, 32]] - 1.0).abs() < 0.01);
        assert!(tensor[[0, 1, 32, 32]].abs() < 0.01);

        // Top row is padding
        let pad = 114.0 / 255.0;
        assert!((tensor[[0, 1, 0, 0]] - pad).abs() < 1e-6);
    }
}
