use crate::annotations::detection::Detection;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Draws each detection's bounding box onto a copy of the source image.
///
/// Boxes are clipped to the image bounds; a detection whose box degenerates to
/// zero width or height after clipping is still drawn as a 1x1 marker.
pub fn draw_detections(image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut annotated = image.clone();
    let (img_width, img_height) = annotated.dimensions();
    for detection in detections {
        let left = detection.bbox.left().max(0.0).round() as i32;
        let top = detection.bbox.top().max(0.0).round() as i32;
        let right = detection
            .bbox
            .right()
            .min(img_width.saturating_sub(1) as f32)
            .round() as i32;
        let bottom = detection
            .bbox
            .bottom()
            .min(img_height.saturating_sub(1) as f32)
            .round() as i32;
        let width = ((right - left).max(1)) as u32;
        let height = ((bottom - top).max(1)) as u32;
        draw_hollow_rect_mut(
            &mut annotated,
            Rect::at(left, top).of_size(width, height),
            BOX_COLOR,
        );
    }
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;

    #[test]
    fn draws_box_edges_and_leaves_source_untouched() {
        let image = RgbImage::new(10, 10);
        let detections = vec![Detection {
            bbox: BoundingBox::new(2.0, 2.0, 6.0, 6.0, 2).unwrap(),
            confidence: 0.9,
        }];
        let annotated = draw_detections(&image, &detections);
        assert_eq!(annotated.get_pixel(2, 2), &BOX_COLOR);
        assert_eq!(annotated.get_pixel(4, 2), &BOX_COLOR);
        assert_eq!(annotated.get_pixel(4, 4), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(2, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn clips_boxes_extending_past_the_image() {
        let image = RgbImage::new(8, 8);
        let detections = vec![Detection {
            bbox: BoundingBox::new(-3.0, -3.0, 20.0, 20.0, 2).unwrap(),
            confidence: 0.5,
        }];
        // Must not panic on out-of-bounds coordinates.
        let annotated = draw_detections(&image, &detections);
        assert_eq!(annotated.get_pixel(0, 0), &BOX_COLOR);
    }
}
