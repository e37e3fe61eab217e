use crate::annotations::detection::Detection;
use crate::image_utils::image_conversion::convert_rgb_image_to_owned_array;
use crate::image_utils::image_io::read_image_as_rgb8;
use crate::object_detection::object_detection_model::{ModelError, ObjectDetectionModel};
use crate::object_detection::object_detection_utils::non_maximum_suppression;
use image::imageops::{self, FilterType};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Everything that can go wrong between an image path and a count.
///
/// Callers can branch on the kind: a `Decode` error means the image could not
/// be analyzed at all, which is not the same thing as a successful analysis
/// that found nothing.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Inference(#[from] ModelError),
}

/// Settings fixed at pipeline construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Class id of the single category the pipeline counts.
    pub target_class: usize,
    /// Minimum class score for a candidate box to count as a detection.
    pub confidence: f32,
    /// IOU threshold above which two same-class boxes are considered duplicates.
    pub nms_iou_threshold: f32,
}

/// The image-to-count pipeline: decode an image from a path, run the detection
/// model on it, and keep only the detections of the configured target class.
///
/// The model is injected at construction so tests can swap in a fake detector.
/// Whether the underlying inference call tolerates concurrent use is not
/// established, so the handle sits behind a mutex and calls are serialized.
pub struct DetectorPipeline<M> {
    model: Mutex<M>,
    config: PipelineConfig,
}

impl<M: ObjectDetectionModel> DetectorPipeline<M> {
    pub fn new(model: M, config: PipelineConfig) -> Self {
        DetectorPipeline {
            model: Mutex::new(model),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs detection on the image at `image_path` and returns the target-class
    /// detections with box coordinates mapped back to the source image's
    /// resolution.
    pub fn detect(&self, image_path: &Path) -> Result<Vec<Detection>, PipelineError> {
        let image = read_image_as_rgb8(image_path).map_err(|source| PipelineError::Decode {
            path: image_path.to_path_buf(),
            source,
        })?;
        let (source_width, source_height) = image.dimensions();

        let model = self
            .model
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let input_width = model.input_width();
        let input_height = model.input_height();
        let resized = imageops::resize(&image, input_width, input_height, FilterType::Triangle);
        let input_array = convert_rgb_image_to_owned_array(&resized);
        let detections = model.run_inference(input_array.view(), self.config.confidence)?;
        drop(model);

        let class_counts = detections.iter().counts_by(|det| det.class_id());
        debug!(?class_counts, "raw detections by class");

        let matching: Vec<Detection> = detections
            .into_iter()
            .filter(|det| det.class_id() == self.config.target_class)
            .collect();
        let deduplicated = non_maximum_suppression(matching, self.config.nms_iou_threshold);

        let x_factor = source_width as f32 / input_width as f32;
        let y_factor = source_height as f32 / input_height as f32;
        Ok(deduplicated
            .into_iter()
            .map(|det| Detection {
                bbox: det.bbox.scale(x_factor, y_factor),
                confidence: det.confidence,
            })
            .collect())
    }

    /// The number of target-class instances in the image at `image_path`.
    pub fn count_matches(&self, image_path: &Path) -> Result<usize, PipelineError> {
        let count = self.detect(image_path)?.len();
        info!(
            image = %image_path.display(),
            class_id = self.config.target_class,
            count,
            "analysis complete"
        );
        Ok(count)
    }
}
