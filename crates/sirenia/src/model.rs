use crate::geom::{AngleSpan, Bounds, Point};
use crate::ribbon::RibbonPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Anything usable as an entity identifier: compared by equality, hashed, printed in error
/// messages and composite ribbon keys.
pub trait EntityKey: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T: Clone + Eq + Hash + fmt::Debug + fmt::Display> EntityKey for T {}

/// One weighted `(source, destination, amount)` edge.
///
/// Flows are identified by their position in the diagram; identical triples stay distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord<K> {
    pub source: K,
    pub destination: K,
    pub amount: f64,
}

impl<K> FlowRecord<K> {
    pub fn new(source: K, destination: K, amount: f64) -> Self {
        Self {
            source,
            destination,
            amount,
        }
    }

    pub fn is_self_loop(&self) -> bool
    where
        K: PartialEq,
    {
        self.source == self.destination
    }
}

impl<K> From<(K, K, f64)> for FlowRecord<K> {
    fn from((source, destination, amount): (K, K, f64)) -> Self {
        Self::new(source, destination, amount)
    }
}

impl<'a> From<(&'a str, &'a str, f64)> for FlowRecord<String> {
    fn from((source, destination, amount): (&'a str, &'a str, f64)) -> Self {
        Self::new(source.to_string(), destination.to_string(), amount)
    }
}

impl<K: fmt::Display> FlowRecord<K> {
    /// Stable composite key of the ribbon drawn for this flow at position `index`.
    pub fn ribbon_key(&self, index: usize) -> String {
        format!(
            "{}-{}-{}-{}",
            self.source, self.destination, self.amount, index
        )
    }
}

/// Running totals of one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStats {
    /// Sum of amounts over all flows where the entity is source or destination. A self-loop
    /// counts twice.
    pub total_amount: f64,
    /// Number of flows touching the entity; a self-loop is one flow.
    pub touch_count: usize,
}

/// The annular wedge of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcLayout<K> {
    pub key: K,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Distance from the center to the outer edge.
    pub radius: f64,
    /// Radial thickness.
    pub height: f64,
    pub center: Point,
}

impl<K> ArcLayout<K> {
    pub fn angle(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn span(&self) -> AngleSpan {
        AngleSpan::new(self.start_angle, self.end_angle)
    }

    pub fn mid_angle(&self) -> f64 {
        self.start_angle + self.angle() / 2.0
    }

    pub fn inner_radius(&self) -> f64 {
        self.radius - self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RibbonLayout<K> {
    /// Composite key, see [`FlowRecord::ribbon_key`].
    pub key: String,
    pub flow_index: usize,
    pub source: K,
    pub destination: K,
    pub amount: f64,
    /// Endpoint sub-segment on the source arc.
    pub source_span: AngleSpan,
    /// Endpoint sub-segment on the destination arc.
    pub destination_span: AngleSpan,
    pub start_radius: f64,
    pub end_radius: f64,
    pub start_margin: f64,
    pub end_margin: f64,
    pub bend_center: Point,
    pub path: RibbonPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Anchor point and orientation of an arc label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLayout<K> {
    pub key: K,
    pub text: String,
    /// Direction from the center, in degrees.
    pub angle: f64,
    pub position: Point,
    /// Text rotation in degrees, `None` when labels are not rotated.
    pub rotation: Option<f64>,
    pub anchor: TextAnchor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordDiagramLayout<K: EntityKey> {
    pub bounds: Option<Bounds>,
    pub arcs: indexmap::IndexMap<K, ArcLayout<K>>,
    /// One ribbon per flow, in flow order.
    pub ribbons: Vec<RibbonLayout<K>>,
    pub labels: Vec<LabelLayout<K>>,
}
