use image::RgbImage;
use ndarray::{Array, Array4};

/// Converts an RGB image into the (1, 3, height, width) f32 tensor layout
/// detection models take as input, with channel values normalized to [0, 1].
pub fn convert_rgb_image_to_owned_array(rgb_image: &RgbImage) -> Array4<f32> {
    let mut image_array = Array::zeros((
        1,
        3,
        rgb_image.height() as usize,
        rgb_image.width() as usize,
    ));
    for pixel in rgb_image.enumerate_pixels() {
        let x = pixel.0 as usize;
        let y = pixel.1 as usize;
        let [r, g, b] = pixel.2.0;
        image_array[[0, 0, y, x]] = (r as f32) / 255.;
        image_array[[0, 1, y, x]] = (g as f32) / 255.;
        image_array[[0, 2, y, x]] = (b as f32) / 255.;
    }
    image_array
}
