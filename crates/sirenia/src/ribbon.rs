//! Ribbon geometry: a closed cubic Bezier outline joining two endpoint sub-segments.

use crate::geom::{AngleSpan, Bounds, Point, arc_bezier_points};
use serde::{Deserialize, Serialize};

/// Vertex code, in the spirit of the usual "path codes" vocabulary of 2-D plotting backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathCode {
    MoveTo,
    LineTo,
    /// One of three consecutive vertices forming a cubic segment (control, control, end).
    Curve4,
    ClosePoly,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    Close,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RibbonPath {
    pub vertices: Vec<Point>,
    pub codes: Vec<PathCode>,
}

impl RibbonPath {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Groups vertices into typed segments. Trailing `Curve4` vertices that do not form a full
    /// triple are dropped.
    pub fn segments(&self) -> Vec<PathSegment> {
        let mut out = Vec::with_capacity(self.vertices.len() / 3 + 2);
        let mut i = 0;
        while i < self.vertices.len() {
            match self.codes.get(i) {
                Some(PathCode::MoveTo) => {
                    out.push(PathSegment::MoveTo(self.vertices[i]));
                    i += 1;
                }
                Some(PathCode::LineTo) => {
                    out.push(PathSegment::LineTo(self.vertices[i]));
                    i += 1;
                }
                Some(PathCode::Curve4) => {
                    if i + 2 >= self.vertices.len() {
                        break;
                    }
                    out.push(PathSegment::CubicTo(
                        self.vertices[i],
                        self.vertices[i + 1],
                        self.vertices[i + 2],
                    ));
                    i += 3;
                }
                Some(PathCode::ClosePoly) => {
                    out.push(PathSegment::Close);
                    i += 1;
                }
                None => break,
            }
        }
        out
    }

    /// Bounding box of all vertices, control points included.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter().copied())
    }
}

/// One end of a ribbon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibbonSide {
    /// Endpoint sub-segment on the arc.
    pub span: AngleSpan,
    /// Radius the side is measured from (normally the arc's outer radius).
    pub radius: f64,
    /// Extra inset between the arc's inner edge and the ribbon.
    pub margin: f64,
    pub arc_height: f64,
    pub center: Point,
}

impl RibbonSide {
    pub fn effective_radius(&self) -> f64 {
        self.radius - self.margin - self.arc_height
    }

    /// Arc samples along the side, from `span.start` to `span.end`.
    ///
    /// A span with `end <= start` is sampled as a single point, never as a wrap around the
    /// circle.
    pub fn sample(&self) -> Vec<Point> {
        let end = self.span.end.max(self.span.start);
        arc_bezier_points(self.center, self.effective_radius(), self.span.start, end)
    }
}

/// Builds the closed outline of a ribbon.
///
/// Layout of the path: start-side samples (first one is the `MoveTo`), a cubic through `bend`
/// to the first end-side sample, the remaining end-side samples, and a cubic through `bend`
/// back onto the first vertex. Every vertex after the first is a `Curve4` vertex.
///
/// A zero-width side collapses to a single repeated point; the result is a valid, visually
/// empty ribbon.
pub fn build_ribbon_path(start: &RibbonSide, end: &RibbonSide, bend: Point) -> RibbonPath {
    let start_pts = start.sample();
    let end_pts = end.sample();

    let mut vertices = Vec::with_capacity(start_pts.len() + end_pts.len() + 5);
    let mut codes = Vec::with_capacity(vertices.capacity());

    let first = start_pts[0];
    vertices.push(first);
    codes.push(PathCode::MoveTo);
    for p in &start_pts[1..] {
        vertices.push(*p);
        codes.push(PathCode::Curve4);
    }

    vertices.extend([bend, bend]);
    codes.extend([PathCode::Curve4, PathCode::Curve4]);
    for p in &end_pts {
        vertices.push(*p);
        codes.push(PathCode::Curve4);
    }

    vertices.extend([bend, bend, first]);
    codes.extend([PathCode::Curve4, PathCode::Curve4, PathCode::Curve4]);

    RibbonPath { vertices, codes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{point, polar_point};

    fn side(start: f64, end: f64) -> RibbonSide {
        RibbonSide {
            span: AngleSpan::new(start, end),
            radius: 1.0,
            margin: 0.05,
            arc_height: 0.1,
            center: point(0.0, 0.0),
        }
    }

    #[test]
    fn path_is_moveto_followed_by_whole_cubics() {
        let path = build_ribbon_path(&side(0.0, 30.0), &side(120.0, 200.0), point(0.0, 0.0));
        assert_eq!(path.codes[0], PathCode::MoveTo);
        assert!(path.codes[1..].iter().all(|c| *c == PathCode::Curve4));
        assert_eq!((path.len() - 1) % 3, 0);

        let segs = path.segments();
        assert!(matches!(segs[0], PathSegment::MoveTo(_)));
        assert_eq!(segs.len(), 1 + (path.len() - 1) / 3);
    }

    #[test]
    fn path_closes_on_its_first_vertex() {
        let path = build_ribbon_path(&side(10.0, 50.0), &side(90.0, 100.0), point(0.2, 0.1));
        assert_eq!(path.vertices.first(), path.vertices.last());
        let expected = polar_point(point(0.0, 0.0), 0.85, 10.0);
        assert!((path.vertices[0].x - expected.x).abs() < 1e-12);
        assert!((path.vertices[0].y - expected.y).abs() < 1e-12);
    }

    #[test]
    fn control_points_converge_on_the_bend_center() {
        let bend = point(0.3, -0.2);
        let start = side(0.0, 45.0);
        let path = build_ribbon_path(&start, &side(180.0, 225.0), bend);
        let n = start.sample().len();
        assert_eq!(path.vertices[n], bend);
        assert_eq!(path.vertices[n + 1], bend);
        let len = path.len();
        assert_eq!(path.vertices[len - 3], bend);
        assert_eq!(path.vertices[len - 2], bend);
    }

    #[test]
    fn reversed_side_is_sampled_as_a_point() {
        let s = side(247.767_832_329_782_35, 247.767_832_329_782_32);
        let pts = s.sample();
        assert_eq!(pts.len(), 4);
        assert!(pts.iter().all(|p| (*p - pts[0]).length() < 1e-12));

        let path = build_ribbon_path(&s, &side(90.0, 90.0), point(0.0, 0.0));
        assert_eq!(path.len(), 4 + 2 + 4 + 3);
    }

    #[test]
    fn zero_width_side_does_not_panic() {
        let path = build_ribbon_path(&side(40.0, 40.0), &side(90.0, 90.0), point(0.0, 0.0));
        assert_eq!(path.len(), 4 + 2 + 4 + 3);
        let b = path.bounds().unwrap();
        assert!(b.width().is_finite() && b.height().is_finite());
    }
}
