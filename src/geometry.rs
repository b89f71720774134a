use imageproc::point::Point;
use imageproc::rect::Rect;

use std::mem;

/// A rectangle with center, size and rotation angle in degrees.
///
/// Coordinates follow image convention: y grows downward, positive angles
/// rotate from the x axis towards the y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub center: (f32, f32),
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl RotatedRect {
    pub fn new(center: (f32, f32), width: f32, height: f32, angle: f32) -> Self {
        Self { center, width, height, angle }
    }

    /// Corner points in bottom-left, top-left, top-right, bottom-right order.
    pub fn corners(&self) -> [(f32, f32); 4] {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let (cx, cy) = self.center;
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let corner = |x: f32, y: f32| (cx + x * cos - y * sin, cy + x * sin + y * cos);
        [
            corner(-hw, hh),
            corner(-hw, -hh),
            corner(hw, -hh),
            corner(hw, hh),
        ]
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Bring the angle into (-45, 45], swapping width and height as needed.
///
/// A rectangle repeats every 180 degrees and a 90 degree turn is the same
/// rectangle with the sides exchanged, so every input has an equivalent in
/// the target range. Idempotent.
pub fn normalize_angle(rect: RotatedRect) -> RotatedRect {
    let mut out = rect;
    let mut angle = out.angle.rem_euclid(180.0);
    if angle > 90.0 {
        angle -= 180.0;
    }
    if angle <= -45.0 {
        mem::swap(&mut out.width, &mut out.height);
        angle += 90.0;
    } else if angle > 45.0 {
        mem::swap(&mut out.width, &mut out.height);
        angle -= 90.0;
    }
    out.angle = angle;
    out
}

/// Width to height ratio gate, exclusive on both ends.
pub fn aspect_ratio_in_range(rect: &RotatedRect, lo: f32, hi: f32) -> bool {
    let ratio = rect.width / rect.height;
    lo < ratio && ratio < hi
}

/// Scale factor that fits `size` inside `bounding` without exceeding it.
pub fn fit_scale(size: (f32, f32), bounding: (f32, f32)) -> f32 {
    (bounding.0 / size.0).min(bounding.1 / size.1)
}

/// Absolute area enclosed by a closed point sequence (shoelace formula).
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        sum += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    sum.abs() as f64 / 2.0
}

/// Axis-aligned bounding box of a point set, inclusive of every pixel.
pub fn bounding_box(points: &[Point<i32>]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(Rect::at(min_x, min_y).of_size((max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32))
}

/// Minimum-area rotated rectangle enclosing `points`.
///
/// Convex hull first, then rotating calipers over the hull edges. Fewer
/// than three hull points degenerate to the axis-aligned bounding box.
pub fn min_area_rect(points: &[Point<i32>]) -> RotatedRect {
    let pts: Vec<(f32, f32)> = points.iter().map(|p| (p.x as f32, p.y as f32)).collect();
    let hull = convex_hull(&pts);
    if hull.len() < 3 {
        return axis_aligned_rect(&pts);
    }

    let mut best = RotatedRect::new((0.0, 0.0), 0.0, 0.0, 0.0);
    let mut best_area = f32::MAX;
    for i in 0..hull.len() {
        let (x1, y1) = hull[i];
        let (x2, y2) = hull[(i + 1) % hull.len()];
        let len = (x2 - x1).hypot(y2 - y1);
        if len < 1e-6 {
            continue;
        }
        // edge-aligned unit axes
        let (ux, uy) = ((x2 - x1) / len, (y2 - y1) / len);
        let (vx, vy) = (-uy, ux);

        let (mut min_u, mut max_u) = (f32::MAX, f32::MIN);
        let (mut min_v, mut max_v) = (f32::MAX, f32::MIN);
        for &(px, py) in &hull {
            let (dx, dy) = (px - x1, py - y1);
            let u = dx * ux + dy * uy;
            let v = dx * vx + dy * vy;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let (width, height) = (max_u - min_u, max_v - min_v);
        let area = width * height;
        if area < best_area {
            best_area = area;
            let cu = (min_u + max_u) / 2.0;
            let cv = (min_v + max_v) / 2.0;
            best = RotatedRect::new(
                (x1 + cu * ux + cv * vx, y1 + cu * uy + cv * vy),
                width,
                height,
                uy.atan2(ux).to_degrees(),
            );
        }
    }
    best
}

/// Andrew's monotone chain. Returns the hull in counterclockwise order
/// (image coordinates), without the closing point.
fn convex_hull(points: &[(f32, f32)]) -> Vec<(f32, f32)> {
    let mut pts: Vec<(f32, f32)> = points.to_vec();
    pts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: (f32, f32), a: (f32, f32), b: (f32, f32)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };

    let mut lower: Vec<(f32, f32)> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<(f32, f32)> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn axis_aligned_rect(points: &[(f32, f32)]) -> RotatedRect {
    if points.is_empty() {
        return RotatedRect::new((0.0, 0.0), 0.0, 0.0, 0.0);
    }
    let (mut min_x, mut max_x) = (f32::MAX, f32::MIN);
    let (mut min_y, mut max_y) = (f32::MAX, f32::MIN);
    for &(x, y) in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    RotatedRect::new(
        ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0),
        max_x - min_x,
        max_y - min_y,
        0.0,
    )
}
