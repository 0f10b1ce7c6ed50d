//! The boundary between the layout engine and whatever draws it.

use crate::geom::Point;
use crate::ribbon::RibbonPath;
use crate::style::Style;

/// A drawing backend able to accept the primitives a chord diagram is made of.
///
/// Angles are in degrees, counter-clockwise, y-up. Backends with another convention convert on
/// their side.
pub trait RenderSurface {
    type Handle;

    /// Annular wedge from `start_angle` to `end_angle`, outer radius `radius`, radial thickness
    /// `width`.
    fn draw_wedge(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        width: f64,
        style: &Style,
    ) -> Self::Handle;

    /// Filled closed path built from `MoveTo`/`Curve4` vertices.
    fn draw_closed_path(&mut self, path: &RibbonPath, style: &Style) -> Self::Handle;

    fn annotate_text(&mut self, position: Point, text: &str, style: &Style) -> Self::Handle;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Wedge {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        width: f64,
        style: Style,
    },
    ClosedPath {
        path: RibbonPath,
        style: Style,
    },
    Text {
        position: Point,
        text: String,
        style: Style,
    },
}

/// Keeps every primitive in call order; handles are indices into [`RecordingSurface::primitives`].
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub primitives: Vec<Primitive>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, p: Primitive) -> usize {
        self.primitives.push(p);
        self.primitives.len() - 1
    }

    pub fn wedges(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Wedge { .. }))
    }

    pub fn paths(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::ClosedPath { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Text { .. }))
    }
}

impl RenderSurface for RecordingSurface {
    type Handle = usize;

    fn draw_wedge(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        width: f64,
        style: &Style,
    ) -> usize {
        self.push(Primitive::Wedge {
            center,
            radius,
            start_angle,
            end_angle,
            width,
            style: style.clone(),
        })
    }

    fn draw_closed_path(&mut self, path: &RibbonPath, style: &Style) -> usize {
        self.push(Primitive::ClosedPath {
            path: path.clone(),
            style: style.clone(),
        })
    }

    fn annotate_text(&mut self, position: Point, text: &str, style: &Style) -> usize {
        self.push(Primitive::Text {
            position,
            text: text.to_string(),
            style: style.clone(),
        })
    }
}
