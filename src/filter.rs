use image::{GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::edges::canny;
use imageproc::morphology::open;
use imageproc::rect::Rect;

use crate::geometry::bounding_box;

/// Intensity below which a pixel counts as part of a dark character.
const CHAR_THRESHOLD: u8 = 120;
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 100.0;

/// Binarize a rectified plate crop and wipe everything not covered by a
/// character-sized blob.
///
/// Blobs are found on an edge map of the crop itself, not on the
/// binarized image; a blob qualifies when its bounding box spans more
/// than half the crop height.
pub fn filter_plate(plate: &GrayImage) -> GrayImage {
    let (width, height) = plate.dimensions();
    let mut thresh = threshold(plate, CHAR_THRESHOLD, ThresholdType::BinaryInverted);

    // the mask starts all white; character regions are painted black ("keep")
    let mut mask = GrayImage::from_pixel(width, height, Luma([255u8]));
    let edges = canny(plate, CANNY_LOW, CANNY_HIGH);
    for contour in find_contours::<i32>(&edges) {
        // outermost contours only
        if contour.parent.is_some() {
            continue;
        }
        let rect = match bounding_box(&contour.points) {
            Some(rect) => rect,
            None => continue,
        };
        if rect.height() <= height / 2 {
            continue;
        }
        draw_filled_rect_mut(&mut mask, grow_clamped(rect, width, height), Luma([0u8]));
    }

    // wherever the mask stayed white there is no character
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] != 0 {
            thresh.put_pixel(x, y, Luma([0u8]));
        }
    }

    // opening pass against speckle noise
    open(&thresh, Norm::LInf, 1)
}

/// Grow a box by one pixel per side, clamped to the image bounds.
fn grow_clamped(rect: Rect, width: u32, height: u32) -> Rect {
    let left = (rect.left() - 1).max(0);
    let top = (rect.top() - 1).max(0);
    let right = (rect.left() + rect.width() as i32 + 1).min(width as i32);
    let bottom = (rect.top() + rect.height() as i32 + 1).min(height as i32);
    Rect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32)
}
