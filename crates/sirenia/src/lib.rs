#![forbid(unsafe_code)]

//! Headless chord diagram layout.
//!
//! `sirenia` turns a list of weighted `(source, destination, amount)` flows into the geometry of a
//! chord diagram:
//! - one arc per entity, sized by the total amount touching it ([`allocator`])
//! - one sub-segment of that arc per flow endpoint ([`scheduler`])
//! - one closed cubic Bezier outline per flow ([`ribbon`])
//!
//! [`ChordDiagram`] ties these together, caches the result, and emits it to any
//! [`RenderSurface`]. Nothing here draws pixels or writes files.
//!
//! ```
//! use sirenia::ChordDiagram;
//!
//! let mut diagram: ChordDiagram = ChordDiagram::from_flows([("a", "b", 2.0), ("b", "c", 2.0)]);
//! diagram.set_gap_angle(0.0);
//! let b = diagram.get_arc(&"b".to_string()).unwrap();
//! assert!((b.angle() - 180.0).abs() < 1e-9);
//! ```

pub mod allocator;
pub mod config;
pub mod diagram;
pub mod error;
pub mod geom;
pub mod label;
pub mod model;
mod presentation;
pub mod ribbon;
pub mod scheduler;
pub mod style;
pub mod surface;

pub use allocator::{AllocatorParams, allocate_arcs};
pub use config::LayoutOptions;
pub use diagram::{ChordDiagram, LayoutState};
pub use error::{Error, ErrorKind, Result};
pub use geom::{AngleSpan, Bounds, Point, arc_bezier_points, point, polar_point};
pub use model::{
    ArcLayout, ChordDiagramLayout, EntityKey, EntityStats, FlowRecord, LabelLayout, RibbonLayout,
    TextAnchor,
};
pub use presentation::DrawHandles;
pub use ribbon::{PathCode, PathSegment, RibbonPath, RibbonSide, build_ribbon_path};
pub use scheduler::{Direction, Endpoint, EndpointAllocation, EndpointOrder, IncidenceIndex};
pub use style::Style;
pub use surface::{Primitive, RecordingSurface, RenderSurface};
