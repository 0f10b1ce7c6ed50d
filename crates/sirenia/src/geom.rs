//! Geometry primitives shared by the allocator, the ribbon builder and the surfaces.
//!
//! Angles are in degrees, measured counter-clockwise from the positive x axis, in a y-up
//! coordinate system. Surfaces with a y-down convention flip the y axis themselves.

use serde::{Deserialize, Serialize};

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

/// Point at `radius` from `center` in direction `angle_deg`.
pub fn polar_point(center: Point, radius: f64, angle_deg: f64) -> Point {
    let theta = angle_deg.to_radians();
    point(
        center.x + radius * theta.cos(),
        center.y + radius * theta.sin(),
    )
}

/// A closed angular interval `[start, end]` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleSpan {
    pub start: f64,
    pub end: f64,
}

impl AngleSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn mid(&self) -> f64 {
        self.start + self.width() / 2.0
    }

    /// True when the two spans share more than a boundary point.
    pub fn overlaps(&self, other: &AngleSpan, tolerance: f64) -> bool {
        self.start < other.end - tolerance && other.start < self.end - tolerance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut it = points.into_iter();
        let p0 = it.next()?;
        let mut b = Self {
            min_x: p0.x,
            min_y: p0.y,
            max_x: p0.x,
            max_y: p0.y,
        };
        for p in it {
            b.include(p);
        }
        Some(b)
    }

    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(&mut self, other: &Bounds) {
        self.include(point(other.min_x, other.min_y));
        self.include(point(other.max_x, other.max_y));
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Samples a circular arc as a chain of cubic Bezier segments.
///
/// Returns `1 + 3n` points: the arc start, followed by `(control1, control2, end)` for each of
/// the `n` segments. `n` is `2^ceil(span / 90deg)`, so a zero span yields a single segment whose
/// points all coincide. When `end_deg < start_deg` the end is moved forward by whole turns, so the
/// arc always runs counter-clockwise from `start_deg`.
pub fn arc_bezier_points(center: Point, radius: f64, start_deg: f64, end_deg: f64) -> Vec<Point> {
    let eta1 = start_deg;
    let mut eta2 = end_deg - 360.0 * ((end_deg - start_deg) / 360.0).floor();
    // Keep a full turn from collapsing to zero through the floor above.
    if end_deg != start_deg && eta2 <= eta1 {
        eta2 += 360.0;
    }
    let (eta1, eta2) = (eta1.to_radians(), eta2.to_radians());

    let exponent = ((eta2 - eta1) / std::f64::consts::FRAC_PI_2).ceil().max(0.0);
    let n = 2_usize.pow(exponent as u32);

    let deta = (eta2 - eta1) / n as f64;
    let t = (0.5 * deta).tan();
    let alpha = deta.sin() * ((4.0 + 3.0 * t * t).sqrt() - 1.0) / 3.0;

    let at = |eta: f64, dx: f64, dy: f64| -> Point {
        point(
            center.x + radius * (eta.cos() + dx),
            center.y + radius * (eta.sin() + dy),
        )
    };

    let mut out = Vec::with_capacity(1 + 3 * n);
    out.push(at(eta1, 0.0, 0.0));
    for i in 0..n {
        let a = eta1 + deta * i as f64;
        let b = if i + 1 == n {
            eta2
        } else {
            eta1 + deta * (i + 1) as f64
        };
        let (sa, ca) = a.sin_cos();
        let (sb, cb) = b.sin_cos();
        out.push(at(a, -alpha * sa, alpha * ca));
        out.push(at(b, alpha * sb, -alpha * cb));
        out.push(at(b, 0.0, 0.0));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn polar_point_uses_counter_clockwise_degrees() {
        let p = polar_point(point(1.0, 1.0), 2.0, 90.0);
        assert!(close(p.x, 1.0));
        assert!(close(p.y, 3.0));
    }

    #[test]
    fn arc_segment_count_doubles_per_quadrant() {
        let c = point(0.0, 0.0);
        assert_eq!(arc_bezier_points(c, 1.0, 0.0, 0.0).len(), 4);
        assert_eq!(arc_bezier_points(c, 1.0, 0.0, 45.0).len(), 1 + 3 * 2);
        assert_eq!(arc_bezier_points(c, 1.0, 0.0, 135.0).len(), 1 + 3 * 4);
        assert_eq!(arc_bezier_points(c, 1.0, 0.0, 360.0).len(), 1 + 3 * 16);
    }

    #[test]
    fn arc_points_start_and_end_on_the_circle() {
        let c = point(0.5, -0.5);
        let pts = arc_bezier_points(c, 2.0, 30.0, 100.0);
        let first = pts[0];
        let last = pts[pts.len() - 1];
        let expected_first = polar_point(c, 2.0, 30.0);
        let expected_last = polar_point(c, 2.0, 100.0);
        assert!(close(first.x, expected_first.x) && close(first.y, expected_first.y));
        assert!(close(last.x, expected_last.x) && close(last.y, expected_last.y));
        // Segment end points lie on the circle as well.
        for p in pts.iter().step_by(3) {
            assert!(close((*p - c).length(), 2.0));
        }
    }

    #[test]
    fn zero_span_arc_collapses_to_one_point() {
        let pts = arc_bezier_points(point(0.0, 0.0), 1.0, 42.0, 42.0);
        for p in &pts {
            assert!(close(p.x, pts[0].x) && close(p.y, pts[0].y));
        }
    }

    #[test]
    fn reversed_angles_wrap_forward() {
        let pts = arc_bezier_points(point(0.0, 0.0), 1.0, 350.0, 10.0);
        // 20 degrees forward, one quadrant or less.
        assert_eq!(pts.len(), 1 + 3 * 2);
        let last = pts[pts.len() - 1];
        let expected = polar_point(point(0.0, 0.0), 1.0, 10.0);
        assert!(close(last.x, expected.x) && close(last.y, expected.y));
    }

    #[test]
    fn angle_span_overlap_ignores_shared_boundaries() {
        let a = AngleSpan::new(0.0, 10.0);
        let b = AngleSpan::new(10.0, 20.0);
        let c = AngleSpan::new(5.0, 15.0);
        assert!(!a.overlaps(&b, 1e-9));
        assert!(a.overlaps(&c, 1e-9));
        assert!(close(c.mid(), 10.0));
    }
}
