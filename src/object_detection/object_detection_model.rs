use crate::annotations::detection::Detection;
use ndarray::ArrayView4;
use thiserror::Error;

/// Errors produced while running a detection model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("inference session failed: {0}")]
    Ort(#[from] ort::Error),
    #[error("model produced malformed output: {0}")]
    MalformedOutput(String),
}

/// Defines a trait that all object detection models must follow.
///
/// The pipeline only depends on this trait, so tests can substitute a fake
/// detector with known ground truth for the real ONNX-backed one.
pub trait ObjectDetectionModel {
    /// Runs the model on a single image already converted to a normalized
    /// (1, 3, height, width) tensor, returning every detection whose best
    /// class score is at least `confidence`. Duplicate suppression is the
    /// caller's responsibility.
    fn run_inference(
        &self,
        input_array: ArrayView4<f32>,
        confidence: f32,
    ) -> Result<Vec<Detection>, ModelError>;

    /// The width of the tensor the model expects.
    fn input_width(&self) -> u32;

    /// The height of the tensor the model expects.
    fn input_height(&self) -> u32;
}
