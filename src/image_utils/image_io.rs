use image::{self, ImageError, RgbImage};
use std::path::Path;

/// Decodes the file at `filepath` into an 8-bit RGB raster.
///
/// The returned error covers the whole decode taxonomy: a missing or unreadable
/// file surfaces as `ImageError::IoError`, a corrupt or unsupported one as a
/// decoding error.
pub fn read_image_as_rgb8(filepath: &Path) -> Result<RgbImage, ImageError> {
    Ok(image::open(filepath)?.into_rgb8())
}
