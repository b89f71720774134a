use image::{GrayImage, RgbImage};
use tracing::debug;

use crate::error::PlateError;
use crate::filter::filter_plate;
use crate::geometry::{aspect_ratio_in_range, contour_area, min_area_rect, normalize_angle};
use crate::hierarchy::ContourForest;
use crate::normalize::normalize_region;
use crate::ocr::OcrEngine;
use crate::session::{DetectionSession, RecognitionResult};

/// Contours enclosing less area than this cannot hold readable characters.
const MIN_CONTOUR_AREA: f64 = 400.0;
/// A plate shows at least this many nested contours, one per character.
const MIN_CHILD_CONTOURS: usize = 3;
/// Accepted width to height ratios; plates are much wider than tall.
const MIN_PLATE_RATIO: f32 = 3.0;
const MAX_PLATE_RATIO: f32 = 10.0;

/// Walk the sibling chain starting at `start` and propose rotated-rectangle
/// plate candidates, recursing into children where a rejected contour may
/// still enclose a plate.
///
/// Every accepted candidate is rectified, noise-filtered, recognized and
/// appended to the session. An engine failure aborts the remaining
/// candidates of this image.
pub fn find_license_plate<E: OcrEngine>(
    forest: &ContourForest,
    start: Option<usize>,
    gray: &GrayImage,
    color: &RgbImage,
    engine: &mut E,
    session: &mut DetectionSession,
) -> Result<(), PlateError> {
    let mut next = start;
    while let Some(idx) = next {
        let node = forest.node(idx);
        next = node.next_sibling;

        // a region without nested contours holds no characters
        let children = forest.child_count(idx);
        if children == 0 {
            continue;
        }

        let area = contour_area(&node.points);
        if area <= MIN_CONTOUR_AREA {
            debug!(idx, area, "contour too small");
            continue;
        }

        if children < MIN_CHILD_CONTOURS {
            // the plate may sit one nesting level further down
            find_license_plate(forest, node.first_child, gray, color, engine, session)?;
            continue;
        }

        let rect = normalize_angle(min_area_rect(&node.points));
        if !aspect_ratio_in_range(&rect, MIN_PLATE_RATIO, MAX_PLATE_RATIO) {
            debug!(idx, ratio = rect.aspect_ratio(), "aspect ratio out of range");
            if node.first_child.is_some() {
                find_license_plate(forest, node.first_child, gray, color, engine, session)?;
            }
            continue;
        }

        let (plate, plate_color) = match normalize_region(gray, color, &rect) {
            Some(crops) => crops,
            // degenerate geometry, drop this candidate
            None => continue,
        };
        let filtered = filter_plate(&plate);
        let text = engine.recognize(&filtered)?;
        debug!(idx, %text, "candidate accepted");
        session.push(RecognitionResult {
            text,
            region: rect,
            plate,
            plate_color,
            filtered,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {

    use image::{GrayImage, Luma, Rgb, RgbImage};
    use imageproc::point::Point;

    use crate::hierarchy::ContourNode;
    use crate::session::BestPolicy;

    use super::*;

    struct FixedOcr {
        text: &'static str,
        calls: usize,
    }

    impl FixedOcr {
        fn new(text: &'static str) -> Self {
            Self { text, calls: 0 }
        }
    }

    impl OcrEngine for FixedOcr {
        fn recognize(&mut self, _image: &GrayImage) -> Result<String, PlateError> {
            self.calls += 1;
            Ok(self.text.to_string())
        }
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn recognize(&mut self, _image: &GrayImage) -> Result<String, PlateError> {
            Err(PlateError::engine("engine exploded"))
        }
    }

    fn buffers() -> (GrayImage, RgbImage) {
        (
            GrayImage::from_pixel(400, 200, Luma([200u8])),
            RgbImage::from_pixel(400, 200, Rgb([200u8, 200, 200])),
        )
    }

    fn rect_points(x: i32, y: i32, w: i32, h: i32) -> Vec<Point<i32>> {
        vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]
    }

    // Plate-shaped contour with `child_count` children appended after it.
    fn plate_with_children(nodes: &mut Vec<ContourNode>, child_count: usize) -> usize {
        let plate_idx = nodes.len();
        nodes.push(ContourNode::new(rect_points(50, 70, 300, 60)));
        let mut prev: Option<usize> = None;
        for i in 0..child_count {
            let idx = nodes.len();
            nodes.push(ContourNode::new(rect_points(60 + 20 * i as i32, 80, 10, 10)));
            match prev {
                Some(p) => nodes[p].next_sibling = Some(idx),
                None => nodes[plate_idx].first_child = Some(idx),
            }
            prev = Some(idx);
        }
        plate_idx
    }

    fn run<E: OcrEngine>(
        forest: &ContourForest,
        engine: &mut E,
    ) -> Result<DetectionSession, PlateError> {
        let (gray, color) = buffers();
        let mut session = DetectionSession::new(BestPolicy::default());
        session.begin_search();
        find_license_plate(forest, forest.first_root(), &gray, &color, engine, &mut session)?;
        session.finish();
        Ok(session)
    }

    #[test]
    fn accepts_a_plate_shaped_contour_with_enough_children() {
        let mut nodes = Vec::new();
        let root = plate_with_children(&mut nodes, 3);
        let forest = ContourForest::new(nodes, Some(root));

        let mut engine = FixedOcr::new("ABC123");
        let session = run(&forest, &mut engine).unwrap();

        assert_eq!(session.len(), 1);
        assert_eq!(session.texts(), vec!["ABC123"]);
        assert_eq!(engine.calls, 1);

        // lockstep outputs
        assert_eq!(session.plates().len(), 1);
        assert_eq!(session.filtered_plates().len(), 1);
        assert_eq!(session.regions().len(), 1);

        let region = session.regions()[0];
        assert!((region.width - 300.0).abs() < 1.0);
        assert!((region.height - 60.0).abs() < 1.0);
    }

    #[test]
    fn contour_without_children_is_dropped() {
        let nodes = vec![ContourNode::new(rect_points(50, 70, 300, 60))];
        let forest = ContourForest::new(nodes, Some(0));

        let mut engine = FixedOcr::new("NEVER");
        let session = run(&forest, &mut engine).unwrap();

        assert!(session.is_empty());
        assert_eq!(engine.calls, 0);
    }

    #[test]
    fn small_contour_blocks_recursion_into_its_children() {
        // the child is a perfectly valid plate, but its parent is too small
        let mut nodes = vec![ContourNode::new(rect_points(0, 0, 15, 15))];
        let plate = plate_with_children(&mut nodes, 3);
        nodes[0].first_child = Some(plate);
        let forest = ContourForest::new(nodes, Some(0));

        let mut engine = FixedOcr::new("HIDDEN");
        let session = run(&forest, &mut engine).unwrap();

        assert!(session.is_empty());
        assert_eq!(engine.calls, 0);
    }

    #[test]
    fn plate_nested_under_a_sparse_contour_is_found() {
        // big frame with a single child: the actual plate
        let mut nodes = vec![ContourNode::new(rect_points(10, 10, 380, 180))];
        let plate = plate_with_children(&mut nodes, 3);
        nodes[0].first_child = Some(plate);
        let forest = ContourForest::new(nodes, Some(0));

        let mut engine = FixedOcr::new("NESTED1");
        let session = run(&forest, &mut engine).unwrap();

        assert_eq!(session.texts(), vec!["NESTED1"]);
    }

    #[test]
    fn plate_nested_under_a_bad_ratio_contour_is_found() {
        // square frame with three children; fails the ratio gate itself
        let mut nodes = vec![ContourNode::new(rect_points(20, 10, 180, 180))];
        let plate = plate_with_children(&mut nodes, 3);
        nodes[0].first_child = Some(plate);
        let dummy1 = nodes.len();
        nodes.push(ContourNode::new(rect_points(210, 20, 10, 10)));
        let dummy2 = nodes.len();
        nodes.push(ContourNode::new(rect_points(230, 20, 10, 10)));
        nodes[plate].next_sibling = Some(dummy1);
        nodes[dummy1].next_sibling = Some(dummy2);
        let forest = ContourForest::new(nodes, Some(0));

        let mut engine = FixedOcr::new("NESTED2");
        let session = run(&forest, &mut engine).unwrap();

        assert_eq!(session.texts(), vec!["NESTED2"]);
        assert_eq!(engine.calls, 1);
    }

    #[test]
    fn engine_failure_aborts_the_image() {
        let mut nodes = Vec::new();
        let root = plate_with_children(&mut nodes, 3);
        let forest = ContourForest::new(nodes, Some(root));

        assert!(run(&forest, &mut FailingOcr).is_err());
    }
}
