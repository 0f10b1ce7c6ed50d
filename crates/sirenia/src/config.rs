use crate::error::{Error, Result};
use crate::geom::{Point, point};
use crate::scheduler::EndpointOrder;
use serde::{Deserialize, Serialize};

/// Geometry-affecting options of a chord diagram.
///
/// Every field has a default, so partial JSON/YAML documents deserialize cleanly. Changing any of
/// these through [`crate::ChordDiagram::set_options`] marks the diagram stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Empty angle left after every arc, in degrees.
    pub gap_angle: f64,
    /// Total angle shared by arcs and gaps, in degrees.
    pub max_angle: f64,
    /// Angle at which the first arc starts.
    pub rotation: f64,
    /// Distance from the center to the outer edge of every arc.
    pub radius: f64,
    /// Radial thickness of every arc.
    pub arc_height: f64,
    pub center: Point,
    /// Radial inset between the inner edge of the source arc and the ribbon.
    pub ribbon_start_margin: f64,
    /// Radial inset between the inner edge of the destination arc and the ribbon.
    pub ribbon_end_margin: f64,
    /// Overrides the arc radius on the source side of every ribbon.
    pub ribbon_start_radius: Option<f64>,
    /// Overrides the arc radius on the destination side of every ribbon.
    pub ribbon_end_radius: Option<f64>,
    /// Point the ribbon control points converge on; `center` when unset.
    pub bend_center: Option<Point>,
    pub endpoint_order: EndpointOrder,
    /// Radial distance between the outer arc edge and its label anchor.
    pub label_gap: f64,
    /// Rotate labels along the radius.
    pub label_rotate: bool,
    /// Ribbons take their per-element `fill` from the source arc, otherwise from the destination.
    pub ribbon_style_from_source: bool,
    /// Labels take their `color` from their arc's per-element `fill`.
    pub label_colored: bool,
    pub hide_ribbons: bool,
    pub hide_labels: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            gap_angle: 5.0,
            max_angle: 360.0,
            rotation: 0.0,
            radius: 1.0,
            arc_height: 0.1,
            center: point(0.0, 0.0),
            ribbon_start_margin: 0.05,
            ribbon_end_margin: 0.05,
            ribbon_start_radius: None,
            ribbon_end_radius: None,
            bend_center: None,
            endpoint_order: EndpointOrder::default(),
            label_gap: 0.02,
            label_rotate: true,
            ribbon_style_from_source: true,
            label_colored: false,
            hide_ribbons: false,
            hide_labels: false,
        }
    }
}

impl LayoutOptions {
    pub fn bend_center(&self) -> Point {
        self.bend_center.unwrap_or(self.center)
    }

    /// Rejects option values no layout can be computed from.
    ///
    /// The gap-versus-max-angle check needs the entity count and lives in the allocator.
    pub fn validate(&self) -> Result<()> {
        fn finite(option: &'static str, v: f64) -> Result<()> {
            if v.is_finite() {
                return Ok(());
            }
            Err(Error::InvalidOption {
                option,
                message: format!("must be finite, got {v}"),
            })
        }
        fn positive(option: &'static str, v: f64) -> Result<()> {
            finite(option, v)?;
            if v > 0.0 {
                return Ok(());
            }
            Err(Error::InvalidOption {
                option,
                message: format!("must be > 0, got {v}"),
            })
        }

        finite("gapAngle", self.gap_angle)?;
        if self.gap_angle < 0.0 {
            return Err(Error::InvalidOption {
                option: "gapAngle",
                message: format!("must be >= 0, got {}", self.gap_angle),
            });
        }
        positive("maxAngle", self.max_angle)?;
        finite("rotation", self.rotation)?;
        positive("radius", self.radius)?;
        positive("arcHeight", self.arc_height)?;
        finite("center.x", self.center.x)?;
        finite("center.y", self.center.y)?;
        finite("ribbonStartMargin", self.ribbon_start_margin)?;
        finite("ribbonEndMargin", self.ribbon_end_margin)?;
        if let Some(r) = self.ribbon_start_radius {
            positive("ribbonStartRadius", r)?;
        }
        if let Some(r) = self.ribbon_end_radius {
            positive("ribbonEndRadius", r)?;
        }
        if let Some(b) = self.bend_center {
            finite("bendCenter.x", b.x)?;
            finite("bendCenter.y", b.y)?;
        }
        finite("labelGap", self.label_gap)?;
        Ok(())
    }
}
