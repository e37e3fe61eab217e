use serde::Serialize;

/// A struct representing a bounding box.
///
/// A bounding box is the axis-aligned rectangle an object detection model draws
/// around an object it found, tagged with the class id of the category the model
/// assigned. This project uses the standard convention of the left side of the
/// image being x=0 and the top of the image being y=0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    class_id: usize,
}

impl BoundingBox {
    /// Checks if a box has valid parameters before constructing.
    pub fn new(
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        class_id: usize,
    ) -> Result<Self, String> {
        if left > right {
            Err(format!(
                "Failed to create BoundingBox, value for left > value for right ({} > {}).",
                left, right
            ))
        } else if top > bottom {
            Err(format!(
                "Failed to create BoundingBox, value for top > value for bottom ({} > {}).",
                top, bottom
            ))
        } else {
            Ok(BoundingBox {
                left,
                top,
                right,
                bottom,
                class_id,
            })
        }
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn right(&self) -> f32 {
        self.right
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    pub fn class_id(&self) -> usize {
        self.class_id
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Scales all four coordinates, used to map boxes from the model's input
    /// resolution back to the source image's resolution.
    pub fn scale(&self, x_factor: f32, y_factor: f32) -> Self {
        BoundingBox {
            left: self.left * x_factor,
            top: self.top * y_factor,
            right: self.right * x_factor,
            bottom: self.bottom * y_factor,
            class_id: self.class_id,
        }
    }

    /// The proportion of two boxes' union that they both cover.
    ///
    /// Intersection over union is 0.0 for disjoint boxes and 1.0 for identical
    /// ones, and is the standard measure of whether two detections are
    /// duplicates of each other.
    pub fn intersection_over_union(&self, other: &BoundingBox) -> f32 {
        let intersection_width = (self.right.min(other.right) - self.left.max(other.left)).max(0.0);
        let intersection_height =
            (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0.0);
        let intersection_area = intersection_width * intersection_height;
        let union_area = self.area() + other.area() - intersection_area;
        if union_area == 0.0 {
            return 0.0;
        }
        intersection_area / union_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_left_greater_than_right() {
        assert!(BoundingBox::new(5.0, 0.0, 1.0, 1.0, 0).is_err());
    }

    #[test]
    fn rejects_top_greater_than_bottom() {
        assert!(BoundingBox::new(0.0, 5.0, 1.0, 1.0, 0).is_err());
    }

    #[test]
    fn area_of_unit_box() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0, 0).unwrap();
        assert_eq!(bbox.area(), 1.0);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0, 0).unwrap();
        let b = BoundingBox::new(2.0, 2.0, 3.0, 3.0, 0).unwrap();
        assert_eq!(a.intersection_over_union(&b), 0.0);
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = BoundingBox::new(0.0, 0.0, 4.0, 4.0, 0).unwrap();
        let b = BoundingBox::new(0.0, 0.0, 4.0, 4.0, 0).unwrap();
        assert_eq!(a.intersection_over_union(&b), 1.0);
    }

    #[test]
    fn iou_of_half_overlapping_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0, 0).unwrap();
        let b = BoundingBox::new(1.0, 0.0, 3.0, 2.0, 0).unwrap();
        let iou = a.intersection_over_union(&b);
        assert!((iou - (2.0 / 6.0)).abs() < 1e-6);
    }

    #[test]
    fn scale_maps_back_to_source_resolution() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0, 2).unwrap();
        let scaled = bbox.scale(2.0, 0.5);
        assert_eq!(scaled.left(), 20.0);
        assert_eq!(scaled.top(), 10.0);
        assert_eq!(scaled.right(), 60.0);
        assert_eq!(scaled.bottom(), 20.0);
        assert_eq!(scaled.class_id(), 2);
    }
}
