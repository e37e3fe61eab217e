use crate::annotations::detection::Detection;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads a file with the class names into a vector so that the number ids
/// which come directly from the ORT inference session can be given meaning.
pub fn read_classes_txt_file(filepath: &Path) -> io::Result<Vec<String>> {
    BufReader::new(File::open(filepath)?).lines().collect()
}

/// Non maximum suppression is a way of removing duplicate detections.
///
/// Detections are ranked by confidence; any lower-confidence detection of the
/// same class overlapping a kept one by more than `iou_threshold` is dropped.
pub fn non_maximum_suppression(
    mut detections: Vec<Detection>,
    iou_threshold: f32,
) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut detections_to_remove: Vec<bool> = vec![false; detections.len()];
    for (current_index, current_det) in detections.iter().enumerate() {
        if detections_to_remove[current_index] {
            continue;
        }
        for (other_index, other_det) in detections[current_index + 1..].iter().enumerate() {
            if detections_to_remove[current_index + other_index + 1] {
                continue;
            }
            if current_det.class_id() != other_det.class_id() {
                continue;
            }
            let iou = current_det.bbox.intersection_over_union(&other_det.bbox);
            if iou > iou_threshold {
                detections_to_remove[current_index + other_index + 1] = true;
            }
        }
    }
    let mut drop_iter = detections_to_remove.iter();
    detections.retain(|_| !drop_iter.next().unwrap());
    detections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;
    use std::io::Write;

    fn det(left: f32, top: f32, right: f32, bottom: f32, class_id: usize, conf: f32) -> Detection {
        Detection {
            bbox: BoundingBox::new(left, top, right, bottom, class_id).unwrap(),
            confidence: conf,
        }
    }

    #[test]
    fn nms_no_overlap() {
        let dets = vec![det(0.0, 0.0, 1.0, 1.0, 0, 0.6), det(2.0, 2.0, 3.0, 3.0, 0, 0.6)];
        let nms_result = non_maximum_suppression(dets.clone(), 0.5);
        assert_eq!(nms_result, dets);
    }

    #[test]
    fn nms_standard_usage() {
        let dets = vec![
            det(0.0, 0.0, 4.0, 4.0, 0, 0.6),
            det(0.0, 0.0, 5.0, 5.0, 0, 0.55),
            det(10.0, 10.0, 14.0, 14.0, 0, 0.9),
        ];
        let nms_result = non_maximum_suppression(dets, 0.5);
        assert_eq!(
            nms_result,
            vec![det(10.0, 10.0, 14.0, 14.0, 0, 0.9), det(0.0, 0.0, 4.0, 4.0, 0, 0.6)]
        );
    }

    #[test]
    fn nms_keeps_overlapping_boxes_of_different_classes() {
        let dets = vec![det(0.0, 0.0, 4.0, 4.0, 2, 0.9), det(0.0, 0.0, 4.0, 4.0, 7, 0.8)];
        let nms_result = non_maximum_suppression(dets, 0.5);
        assert_eq!(nms_result.len(), 2);
    }

    #[test]
    fn reads_class_names_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let classes_path = dir.path().join("classes.txt");
        let mut file = File::create(&classes_path).unwrap();
        writeln!(file, "person").unwrap();
        writeln!(file, "bicycle").unwrap();
        writeln!(file, "car").unwrap();
        let classes = read_classes_txt_file(&classes_path).unwrap();
        assert_eq!(classes, vec!["person", "bicycle", "car"]);
        assert_eq!(classes[2], "car");
    }

    #[test]
    fn missing_classes_file_is_an_error() {
        assert!(read_classes_txt_file(Path::new("./does/not/exist.txt")).is_err());
    }
}
