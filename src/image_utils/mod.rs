pub mod annotate;
pub mod image_conversion;
pub mod image_io;
