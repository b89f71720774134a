use image::imageops::{crop_imm, resize, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use crate::geometry::{fit_scale, RotatedRect};

/// Bounding size the rectified crop is scaled towards; characters end up
/// near the height the recognition engine reads best.
const CANONICAL_SIZE: (f32, f32) = (240.0, 180.0);
/// Pixels trimmed from every edge to drop warp artifacts.
const EDGE_PIXELS: u32 = 3;

/// Rectify `rect` out of the gray and color buffers into upright crops of
/// identical size.
///
/// Returns `None` when the region degenerates to an empty image at any
/// step: zero rounded size, a non-invertible corner transform, or a crop
/// smaller than the trimmed border.
pub fn normalize_region(
    gray: &GrayImage,
    color: &RgbImage,
    rect: &RotatedRect,
) -> Option<(GrayImage, RgbImage)> {
    let width = rect.width.round() as i64;
    let height = rect.height.round() as i64;
    if width <= 0 || height <= 0 {
        return None;
    }
    let (width, height) = (width as u32, height as u32);

    // map bottom-left, top-left and top-right onto the upright target
    let corners = rect.corners();
    let target = [
        (0.0, height as f32 - 1.0),
        (0.0, 0.0),
        (width as f32 - 1.0, 0.0),
    ];
    let projection = affine_projection([corners[0], corners[1], corners[2]], target)?;

    let mut warped_gray = GrayImage::new(width, height);
    warp_into(gray, &projection, Interpolation::Bicubic, Luma([0u8]), &mut warped_gray);
    let mut warped_color = RgbImage::new(width, height);
    warp_into(color, &projection, Interpolation::Bicubic, Rgb([0u8, 0, 0]), &mut warped_color);

    let scale = fit_scale((rect.width, rect.height), CANONICAL_SIZE);
    let scaled_w = (rect.width * scale).round() as u32;
    let scaled_h = (rect.height * scale).round() as u32;
    if scaled_w <= 2 * EDGE_PIXELS || scaled_h <= 2 * EDGE_PIXELS {
        return None;
    }

    let scaled_gray = resize(&warped_gray, scaled_w, scaled_h, FilterType::CatmullRom);
    let scaled_color = resize(&warped_color, scaled_w, scaled_h, FilterType::CatmullRom);

    let trim_w = scaled_w - 2 * EDGE_PIXELS;
    let trim_h = scaled_h - 2 * EDGE_PIXELS;
    let plate = crop_imm(&scaled_gray, EDGE_PIXELS, EDGE_PIXELS, trim_w, trim_h).to_image();
    let plate_color = crop_imm(&scaled_color, EDGE_PIXELS, EDGE_PIXELS, trim_w, trim_h).to_image();
    Some((plate, plate_color))
}

/// Affine transform through three point correspondences, as a projection.
fn affine_projection(src: [(f32, f32); 3], dst: [(f32, f32); 3]) -> Option<Projection> {
    let [(x0, y0), (x1, y1), (x2, y2)] = src;
    let det = det3([[x0, y0, 1.0], [x1, y1, 1.0], [x2, y2, 1.0]]);
    if det.abs() < 1e-4 {
        return None;
    }

    let [(u0, v0), (u1, v1), (u2, v2)] = dst;
    let a = det3([[u0, y0, 1.0], [u1, y1, 1.0], [u2, y2, 1.0]]) / det;
    let b = det3([[x0, u0, 1.0], [x1, u1, 1.0], [x2, u2, 1.0]]) / det;
    let c = det3([[x0, y0, u0], [x1, y1, u1], [x2, y2, u2]]) / det;
    let d = det3([[v0, y0, 1.0], [v1, y1, 1.0], [v2, y2, 1.0]]) / det;
    let e = det3([[x0, v0, 1.0], [x1, v1, 1.0], [x2, v2, 1.0]]) / det;
    let f = det3([[x0, y0, v0], [x1, y1, v1], [x2, y2, v2]]) / det;

    Projection::from_matrix([a, b, c, d, e, f, 0.0, 0.0, 1.0])
}

fn det3(m: [[f32; 3]; 3]) -> f32 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

#[cfg(test)]
mod test {

    use super::*;

    fn gradient_pair(width: u32, height: u32) -> (GrayImage, RgbImage) {
        let gray = GrayImage::from_fn(width, height, |x, _| Luma([x.min(255) as u8]));
        let color = RgbImage::from_fn(width, height, |x, _| {
            let v = x.min(255) as u8;
            Rgb([v, v, v])
        });
        (gray, color)
    }

    #[test]
    fn crops_are_scaled_and_trimmed() {
        let (gray, color) = gradient_pair(100, 50);
        let rect = RotatedRect::new((50.0, 25.0), 40.0, 10.0, 0.0);

        // scale = min(240/40, 180/10) = 6, so 240x60 minus a 3px border
        let (plate, plate_color) = normalize_region(&gray, &color, &rect).unwrap();
        assert_eq!(plate.dimensions(), (234, 54));
        assert_eq!(plate_color.dimensions(), (234, 54));
    }

    #[test]
    fn crop_preserves_left_to_right_orientation() {
        let (gray, color) = gradient_pair(100, 50);
        let rect = RotatedRect::new((50.0, 25.0), 40.0, 10.0, 0.0);

        let (plate, _) = normalize_region(&gray, &color, &rect).unwrap();
        let left = plate.get_pixel(4, 27)[0];
        let right = plate.get_pixel(229, 27)[0];
        assert!(left < right, "left {} right {}", left, right);
    }

    #[test]
    fn zero_sized_rect_is_rejected() {
        let (gray, color) = gradient_pair(100, 50);
        let rect = RotatedRect::new((50.0, 25.0), 0.2, 10.0, 0.0);
        assert!(normalize_region(&gray, &color, &rect).is_none());
    }

    #[test]
    fn rect_vanishing_after_trim_is_rejected() {
        let (gray, color) = gradient_pair(100, 50);
        // scales to 240 wide but far under the 6 pixel trim in height
        let rect = RotatedRect::new((50.0, 25.0), 1000.0, 1.0, 0.0);
        assert!(normalize_region(&gray, &color, &rect).is_none());
    }
}
