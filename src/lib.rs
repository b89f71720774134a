//! Locates license plate candidates in a photo, rectifies and cleans them,
//! and hands them to a pluggable text-recognition engine.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::edges::canny;
use tracing::info;

pub mod error;
pub mod filter;
pub mod geometry;
pub mod hierarchy;
pub mod normalize;
pub mod ocr;
pub mod search;
pub mod segment;
pub mod session;

pub use error::PlateError;
pub use geometry::RotatedRect;
pub use hierarchy::ContourForest;
pub use ocr::OcrEngine;
pub use session::{BestPolicy, DetectionSession, RecognitionResult, SessionState};

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 100.0;

/// Finds license plate candidates in a photo and runs every accepted one
/// through the recognition engine, one image per call.
pub struct LicensePlateDetector<E> {
    engine: E,
    policy: BestPolicy,
}

impl<E: OcrEngine> LicensePlateDetector<E> {
    pub fn new(engine: E) -> Self {
        Self::with_policy(engine, BestPolicy::default())
    }

    pub fn with_policy(engine: E, policy: BestPolicy) -> Self {
        Self { engine, policy }
    }

    /// Detect license plates in one image.
    ///
    /// Returns the finished per-image session. An image without a single
    /// accepted candidate ends in [`SessionState::NoneFound`]; errors are
    /// reserved for engine failures.
    pub fn detect(&mut self, img: &DynamicImage) -> Result<DetectionSession, PlateError> {
        let gray = img.to_luma8();
        let color = img.to_rgb8();
        let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);
        let forest = ContourForest::from_edges(&edges);

        let mut session = DetectionSession::new(self.policy);
        session.begin_search();
        search::find_license_plate(
            &forest,
            forest.first_root(),
            &gray,
            &color,
            &mut self.engine,
            &mut session,
        )?;
        session.finish();
        info!(
            candidates = session.len(),
            best = session.best().unwrap_or("<none>"),
            "detection finished"
        );
        Ok(session)
    }
}

/// Draw the outline of every accepted region onto a copy of the input.
pub fn annotate(img: &DynamicImage, session: &DetectionSession) -> RgbImage {
    const OUTLINE: Rgb<u8> = Rgb([255, 0, 0]);
    let mut out = img.to_rgb8();
    for region in session.regions() {
        let corners = region.corners();
        for i in 0..corners.len() {
            let from = corners[i];
            let to = corners[(i + 1) % corners.len()];
            draw_line_segment_mut(&mut out, from, to, OUTLINE);
        }
    }
    out
}

#[cfg(test)]
mod test {

    use image::{GrayImage, Luma, Rgb, RgbImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    use super::*;

    struct FixedOcr(&'static str);

    impl OcrEngine for FixedOcr {
        fn recognize(&mut self, _image: &GrayImage) -> Result<String, PlateError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn all_black_image_finds_nothing() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(320, 240));
        let mut detector = LicensePlateDetector::new(FixedOcr("NEVER"));

        let session = detector.detect(&img).unwrap();
        assert_eq!(session.state(), SessionState::NoneFound);
        assert!(session.is_empty());
        assert_eq!(session.best(), None);
    }

    // Plate drawn as a dark slab with light character bars, sitting on a
    // light background.
    fn drawn_plate_image() -> DynamicImage {
        let mut img = RgbImage::from_pixel(400, 200, Rgb([255u8, 255, 255]));
        draw_filled_rect_mut(&mut img, Rect::at(50, 70).of_size(300, 60), Rgb([0u8, 0, 0]));
        for i in 0..4 {
            let x = 90 + i * 60;
            draw_filled_rect_mut(&mut img, Rect::at(x, 85).of_size(18, 30), Rgb([255u8, 255, 255]));
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn drawn_plate_is_detected_end_to_end() {
        let mut detector = LicensePlateDetector::new(FixedOcr("ABC123"));
        let session = detector.detect(&drawn_plate_image()).unwrap();

        assert_eq!(session.state(), SessionState::Done);
        assert!(!session.is_empty());
        assert_eq!(session.best(), Some("ABC123"));

        let n = session.len();
        assert_eq!(session.texts().len(), n);
        assert_eq!(session.plates().len(), n);
        assert_eq!(session.filtered_plates().len(), n);
        assert_eq!(session.regions().len(), n);

        // the accepted region matches the drawn slab
        let region = session.regions()[0];
        assert!((region.width - 300.0).abs() < 10.0, "width {}", region.width);
        assert!((region.height - 60.0).abs() < 10.0, "height {}", region.height);
    }

    #[test]
    fn annotate_marks_the_region_outline() {
        let img = drawn_plate_image();
        let mut detector = LicensePlateDetector::new(FixedOcr("ABC123"));
        let session = detector.detect(&img).unwrap();

        let drawn = annotate(&img, &session);
        assert_eq!(drawn.dimensions(), (400, 200));
        let marked = drawn.pixels().filter(|p| **p == Rgb([255, 0, 0])).count();
        assert!(marked > 0);
    }
}
