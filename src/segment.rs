use image::imageops::grayscale;
use image::{Rgb, RgbImage};
use imageproc::contours::find_contours;
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use imageproc::point::Point;

use crate::geometry::{bounding_box, contour_area};

const CHAR_THRESHOLD: u8 = 120;
const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// At most this many blobs get a box; plates carry fewer characters.
const MAX_CHARACTER_BOXES: usize = 10;

/// Draw boxes around the largest character blobs of a plate crop.
///
/// Display aid only; recognition never sees this image.
pub fn draw_character_boxes(plate: &RgbImage) -> RgbImage {
    let gray = grayscale(plate);
    let blurred = gaussian_blur_f32(&gray, 1.0);
    let thresh = threshold(&blurred, CHAR_THRESHOLD, ThresholdType::BinaryInverted);
    let thick = dilate(&thresh, Norm::LInf, 1);

    let mut blobs: Vec<(f64, Vec<Point<i32>>)> = find_contours::<i32>(&thick)
        .into_iter()
        .filter(|c| c.parent.is_none())
        .map(|c| (contour_area(&c.points), c.points))
        .collect();
    // largest first; the stable sort keeps discovery order between equal areas
    blobs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut out = plate.clone();
    for (_, points) in blobs.iter().take(MAX_CHARACTER_BOXES) {
        if let Some(rect) = bounding_box(points) {
            draw_hollow_rect_mut(&mut out, rect, BOX_COLOR);
        }
    }
    out
}
