use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::Detection;
use crate::object_detection::object_detection_model::{ModelError, ObjectDetectionModel};
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use ndarray::{ArrayView4, Axis};
use ort::inputs;
use ort::session::SessionOutputs;
use std::path::Path;
use tracing::warn;

/// A pretrained YOLOv8 detector loaded from an ONNX export.
///
/// YOLOv8 takes a normalized (1, 3, height, width) tensor named "images" and
/// returns one "output0" tensor of shape (1, 4 + num_classes, num_candidates):
/// four center-x/center-y/width/height values followed by one score per class
/// for each candidate box.
pub struct Yolov8 {
    ort_session: OrtInferenceSession,
    input_width: u32,
    input_height: u32,
    model_name: String,
}

impl Yolov8 {
    pub fn new(
        model_path: &Path,
        input_width: u32,
        input_height: u32,
        model_name: String,
    ) -> ort::Result<Self> {
        let ort_session = OrtInferenceSession::new(model_path)?;
        Ok(Yolov8 {
            ort_session,
            input_width,
            input_height,
            model_name,
        })
    }
}

impl ObjectDetectionModel for Yolov8 {
    fn run_inference(
        &self,
        input_array: ArrayView4<f32>,
        confidence: f32,
    ) -> Result<Vec<Detection>, ModelError> {
        let outputs: SessionOutputs = self
            .ort_session
            .session
            .run(inputs!["images" => input_array]?)?;
        let output = outputs
            .get("output0")
            .ok_or_else(|| ModelError::MalformedOutput("missing output0 tensor".to_string()))?
            .try_extract_tensor::<f32>()?;
        // (1, 4 + num_classes, num_candidates) -> (num_candidates, 4 + num_classes, 1)
        let output = output.t();
        let mut detections: Vec<Detection> = Vec::new();
        for row in output.axis_iter(Axis(0)) {
            let row: Vec<_> = row.iter().copied().collect();
            let (class_id, prob) = row
                .iter()
                .skip(4) // skips bounding box coords.
                .enumerate()
                .map(|(index, value)| (index, *value))
                .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
                .ok_or_else(|| {
                    ModelError::MalformedOutput(format!(
                        "output row carries {} values, expected at least 5",
                        row.len()
                    ))
                })?;
            if prob < confidence {
                continue;
            }
            let x = row[0];
            let y = row[1];
            let w = row[2];
            let h = row[3];
            let bbox = BoundingBox::new(
                x - (w / 2.0),
                y - (h / 2.0),
                x + (w / 2.0),
                y + (h / 2.0),
                class_id,
            );
            match bbox {
                Ok(bbox) => detections.push(Detection {
                    bbox,
                    confidence: prob,
                }),
                // A degenerate box is dropped rather than failing the call.
                Err(reason) => warn!(model = %self.model_name, %reason, "skipping detection"),
            }
        }
        Ok(detections)
    }

    fn input_width(&self) -> u32 {
        self.input_width
    }

    fn input_height(&self) -> u32 {
        self.input_height
    }
}
