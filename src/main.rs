mod annotations;
mod image_utils;
mod object_detection;
mod pipeline;

use anyhow::{Context, Result, bail};
use clap::Parser;
use image_utils::annotate::draw_detections;
use image_utils::image_io::read_image_as_rgb8;
use object_detection::object_detection_utils::read_classes_txt_file;
use object_detection::yolov8::Yolov8;
use pipeline::{DetectorPipeline, PipelineConfig};
use std::path::PathBuf;
use tracing::{error, info, warn};

// YOLOv8 ONNX exports take a fixed 640x640 input.
const MODEL_INPUT_WIDTH: u32 = 640;
const MODEL_INPUT_HEIGHT: u32 = 640;

/// Counts instances of one object class in a still image using a pretrained
/// YOLOv8 ONNX model.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the YOLOv8 ONNX model file.
    #[arg(long, value_name = "FILE")]
    model: PathBuf,

    /// Image to analyze.
    #[arg(long, value_name = "FILE")]
    image: PathBuf,

    /// Class id to count within the model's label space.
    /// For COCO-pretrained models: 2 = car, 5 = bus, 7 = truck.
    #[arg(long, default_value = "2", value_name = "ID")]
    class_id: usize,

    /// Confidence threshold (0.0 - 1.0).
    #[arg(long, default_value = "0.25", value_name = "THRESHOLD")]
    confidence: f32,

    /// NMS IOU threshold (0.0 - 1.0).
    #[arg(long, default_value = "0.45", value_name = "THRESHOLD")]
    nms_threshold: f32,

    /// Optional class-names file, one name per line in class-id order.
    #[arg(long, value_name = "FILE")]
    classes: Option<PathBuf>,

    /// Also print the detections as JSON.
    #[arg(long)]
    json: bool,

    /// Save a copy of the image with the detection boxes drawn to this path.
    #[arg(long, value_name = "FILE")]
    annotate: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    if !args.model.exists() {
        bail!(
            "Model path does not exist, or cannot be read: {:?}",
            args.model
        );
    }
    let class_label = match &args.classes {
        Some(classes_path) => {
            let class_names = read_classes_txt_file(classes_path)
                .with_context(|| format!("could not read classes file {:?}", classes_path))?;
            class_names
                .get(args.class_id)
                .cloned()
                .unwrap_or_else(|| format!("class {}", args.class_id))
        }
        None => format!("class {}", args.class_id),
    };

    let model = Yolov8::new(
        &args.model,
        MODEL_INPUT_WIDTH,
        MODEL_INPUT_HEIGHT,
        "yolov8 onnx".to_string(),
    )
    .with_context(|| format!("could not load model from {:?}", args.model))?;
    info!(model = %args.model.display(), "model loaded");

    let pipeline = DetectorPipeline::new(
        model,
        PipelineConfig {
            target_class: args.class_id,
            confidence: args.confidence,
            nms_iou_threshold: args.nms_threshold,
        },
    );

    if !args.image.exists() {
        warn!(image = %args.image.display(), "image not found");
        println!("0");
        return Ok(());
    }

    // Demo contract: any analysis failure is reported and degrades to a
    // count of zero rather than aborting.
    match pipeline.detect(&args.image) {
        Ok(detections) => {
            info!(
                image = %args.image.display(),
                label = %class_label,
                count = detections.len(),
                "analysis complete"
            );
            if args.json {
                println!("{}", serde_json::to_string_pretty(&detections)?);
            }
            if let Some(annotated_path) = &args.annotate {
                let source = read_image_as_rgb8(&args.image)
                    .with_context(|| format!("could not re-read image {:?}", args.image))?;
                let annotated = draw_detections(&source, &detections);
                annotated
                    .save(annotated_path)
                    .with_context(|| format!("could not save annotated image to {:?}", annotated_path))?;
                info!(output = %annotated_path.display(), "annotated image saved");
            }
            println!("{}", detections.len());
        }
        Err(err) => {
            error!(image = %args.image.display(), error = %err, "analysis failed");
            println!("0");
        }
    }
    Ok(())
}
