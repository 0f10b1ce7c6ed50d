//! The diagram assembler: owns the flow list, runs allocation and scheduling, and caches the
//! resulting layout until the next mutation.

use crate::allocator::{AllocatorParams, allocate_arcs};
use crate::config::LayoutOptions;
use crate::error::{Error, Result};
use crate::geom::{AngleSpan, Bounds, arc_bezier_points};
use crate::label::layout_label;
use crate::model::{
    ArcLayout, ChordDiagramLayout, EntityKey, EntityStats, FlowRecord, LabelLayout, RibbonLayout,
};
use crate::presentation::Presentation;
use crate::ribbon::{RibbonSide, build_ribbon_path};
use crate::scheduler::{Direction, Endpoint, EndpointAllocation, IncidenceIndex};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

/// Whether a diagram currently holds a computed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    Unbuilt,
    Built,
}

/// Everything geometry depends on. Any change here drops the cached layout.
#[derive(Debug, Clone)]
pub(crate) struct DiagramInput<K: EntityKey> {
    pub(crate) flows: Vec<FlowRecord<K>>,
    /// Per-entity totals, in discovery order.
    pub(crate) totals: IndexMap<K, EntityStats>,
    pub(crate) order_override: Vec<K>,
    pub(crate) options: LayoutOptions,
}

#[derive(Debug, Clone)]
pub(crate) struct Built<K: EntityKey> {
    pub(crate) layout: ChordDiagramLayout<K>,
    pub(crate) endpoints: EndpointAllocation<K>,
    pub(crate) ribbon_keys: FxHashMap<String, usize>,
}

/// A chord diagram under construction.
///
/// Flows are appended with [`add_flow`](Self::add_flow); the layout is computed by
/// [`generate`](Self::generate), or implicitly by any accessor that needs it. Mutating the flow
/// set, the entity order or any [`LayoutOptions`] moves the diagram back to
/// [`LayoutState::Unbuilt`]. Style and visibility changes never do.
#[derive(Debug, Clone)]
pub struct ChordDiagram<K: EntityKey = String> {
    pub(crate) input: DiagramInput<K>,
    pub(crate) built: Option<Built<K>>,
    pub(crate) presentation: Presentation<K>,
}

impl<K: EntityKey> Default for ChordDiagram<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityKey> ChordDiagram<K> {
    pub fn new() -> Self {
        Self::with_options(LayoutOptions::default())
    }

    pub fn with_options(options: LayoutOptions) -> Self {
        Self {
            input: DiagramInput {
                flows: Vec::new(),
                totals: IndexMap::new(),
                order_override: Vec::new(),
                options,
            },
            built: None,
            presentation: Presentation::default(),
        }
    }

    /// Builds a diagram from `(source, destination, amount)` records.
    pub fn from_flows<F, I>(flows: I) -> Self
    where
        F: Into<FlowRecord<K>>,
        I: IntoIterator<Item = F>,
    {
        let mut d = Self::new();
        d.add_flows(flows);
        d
    }

    /// Appends one flow and returns its index. Every call adds a new edge, even for a triple that
    /// is already present.
    pub fn add_flow(&mut self, record: impl Into<FlowRecord<K>>) -> usize {
        let record = record.into();
        let self_loop = record.is_self_loop();
        for (i, key) in [&record.source, &record.destination].into_iter().enumerate() {
            let stats = self.input.totals.entry(key.clone()).or_default();
            stats.total_amount += record.amount;
            if i == 0 || !self_loop {
                stats.touch_count += 1;
            }
        }
        self.input.flows.push(record);
        self.invalidate("flow added");
        self.input.flows.len() - 1
    }

    pub fn add_flows<F, I>(&mut self, flows: I)
    where
        F: Into<FlowRecord<K>>,
        I: IntoIterator<Item = F>,
    {
        for f in flows {
            self.add_flow(f);
        }
    }

    pub fn flows(&self) -> &[FlowRecord<K>] {
        &self.input.flows
    }

    /// Per-entity totals in discovery order (first appearance in the flow list).
    pub fn entity_totals(&self) -> &IndexMap<K, EntityStats> {
        &self.input.totals
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.input.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        self.input.options = options;
        self.invalidate("options changed");
    }

    pub fn set_gap_angle(&mut self, gap_angle: f64) {
        self.input.options.gap_angle = gap_angle;
        self.invalidate("gap angle changed");
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.input.options.rotation = rotation;
        self.invalidate("rotation changed");
    }

    pub fn set_max_angle(&mut self, max_angle: f64) {
        self.input.options.max_angle = max_angle;
        self.invalidate("max angle changed");
    }

    /// Places the given entities first, in this order; the rest follow in discovery order.
    pub fn set_order<I: IntoIterator<Item = K>>(&mut self, order: I) {
        self.input.order_override = order.into_iter().collect();
        self.invalidate("order changed");
    }

    pub fn clear_order(&mut self) {
        self.input.order_override.clear();
        self.invalidate("order cleared");
    }

    /// Effective layout order. Override entries that name no known entity are kept here and
    /// rejected by [`generate`](Self::generate).
    pub fn order(&self) -> Vec<K> {
        self.input.effective_order()
    }

    pub fn state(&self) -> LayoutState {
        if self.built.is_some() {
            LayoutState::Built
        } else {
            LayoutState::Unbuilt
        }
    }

    pub fn is_stale(&self) -> bool {
        self.built.is_none()
    }

    fn invalidate(&mut self, reason: &'static str) {
        if self.built.take().is_some() {
            tracing::debug!(reason, "chord layout invalidated");
        }
    }

    /// Computes the layout if it is not cached yet.
    ///
    /// On error the diagram stays unbuilt; fix the input or options and call again.
    pub fn generate(&mut self) -> Result<&ChordDiagramLayout<K>> {
        let built = ensure_built(&self.input, &self.presentation, &mut self.built)?;
        Ok(&built.layout)
    }

    /// The cached layout, without building it.
    pub fn layout(&self) -> Option<&ChordDiagramLayout<K>> {
        self.built.as_ref().map(|b| &b.layout)
    }

    pub fn get_arc(&mut self, key: &K) -> Result<&ArcLayout<K>> {
        self.generate()?
            .arcs
            .get(key)
            .ok_or_else(|| Error::ArcNotFound {
                key: key.to_string(),
            })
    }

    /// Ribbon of the flow at `index`, checked against `record`.
    pub fn get_ribbon(&mut self, record: &FlowRecord<K>, index: usize) -> Result<&RibbonLayout<K>> {
        let matches = self.input.flows.get(index) == Some(record);
        let layout = self.generate()?;
        match layout.ribbons.get(index) {
            Some(ribbon) if matches => Ok(ribbon),
            _ => Err(Error::RibbonNotFound {
                key: record.ribbon_key(index),
            }),
        }
    }

    /// Ribbon by its composite `"{source}-{destination}-{amount}-{index}"` key.
    pub fn ribbon_by_key(&mut self, key: &str) -> Result<&RibbonLayout<K>> {
        let built = ensure_built(&self.input, &self.presentation, &mut self.built)?;
        built
            .ribbon_keys
            .get(key)
            .and_then(|i| built.layout.ribbons.get(*i))
            .ok_or_else(|| Error::RibbonNotFound {
                key: key.to_string(),
            })
    }

    pub fn arcs(&mut self) -> Result<impl Iterator<Item = &ArcLayout<K>>> {
        Ok(self.generate()?.arcs.values())
    }

    pub fn ribbons(&mut self) -> Result<&[RibbonLayout<K>]> {
        Ok(&self.generate()?.ribbons)
    }

    pub fn labels(&mut self) -> Result<&[LabelLayout<K>]> {
        Ok(&self.generate()?.labels)
    }

    /// Sub-segment of `key`'s arc owned by one end of flow `flow_index`.
    pub fn endpoint_span(
        &mut self,
        key: &K,
        flow_index: usize,
        direction: Direction,
    ) -> Result<AngleSpan> {
        let built = ensure_built(&self.input, &self.presentation, &mut self.built)?;
        built.endpoints.span(key, flow_index, direction)
    }

    /// All endpoint sub-segments of `key`'s arc, in angular order.
    pub fn endpoint_partition(&mut self, key: &K) -> Result<&[(Endpoint, AngleSpan)]> {
        let built = ensure_built(&self.input, &self.presentation, &mut self.built)?;
        built
            .endpoints
            .partition(key)
            .ok_or_else(|| Error::ArcNotFound {
                key: key.to_string(),
            })
    }
}

impl<K: EntityKey> DiagramInput<K> {
    pub(crate) fn effective_order(&self) -> Vec<K> {
        let mut out: IndexSet<K> =
            IndexSet::with_capacity(self.order_override.len() + self.totals.len());
        out.extend(self.order_override.iter().cloned());
        out.extend(self.totals.keys().cloned());
        out.into_iter().collect()
    }

    fn validate_flows(&self) -> Result<()> {
        for (index, f) in self.flows.iter().enumerate() {
            if !f.amount.is_finite() || f.amount < 0.0 {
                return Err(Error::InvalidAmount {
                    index,
                    amount: f.amount,
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn ensure_built<'a, K: EntityKey>(
    input: &DiagramInput<K>,
    presentation: &Presentation<K>,
    slot: &'a mut Option<Built<K>>,
) -> Result<&'a Built<K>> {
    let built = match slot.take() {
        Some(b) => b,
        None => build(input, presentation)?,
    };
    Ok(slot.insert(built))
}

fn build<K: EntityKey>(input: &DiagramInput<K>, presentation: &Presentation<K>) -> Result<Built<K>> {
    let _span = tracing::debug_span!(
        "chord_layout",
        entities = input.totals.len(),
        flows = input.flows.len()
    )
    .entered();

    let opts = &input.options;
    opts.validate()?;
    input.validate_flows()?;

    let order = input.effective_order();
    let spans = allocate_arcs(
        &order,
        &input.totals,
        &AllocatorParams {
            gap_angle: opts.gap_angle,
            max_angle: opts.max_angle,
            rotation: opts.rotation,
        },
    )?;

    let arcs: IndexMap<K, ArcLayout<K>> = spans
        .iter()
        .map(|(key, span)| {
            (
                key.clone(),
                ArcLayout {
                    key: key.clone(),
                    start_angle: span.start,
                    end_angle: span.end,
                    radius: opts.radius,
                    height: opts.arc_height,
                    center: opts.center,
                },
            )
        })
        .collect();

    let mut incidence = IncidenceIndex::new(opts.endpoint_order);
    for (i, f) in input.flows.iter().enumerate() {
        incidence.register(&f.source, i, Direction::Outgoing, f.amount);
        incidence.register(&f.destination, i, Direction::Incoming, f.amount);
    }
    let endpoints = EndpointAllocation::resolve(&incidence, &spans)?;

    let bend = opts.bend_center();
    let mut ribbons = Vec::with_capacity(input.flows.len());
    let mut ribbon_keys = FxHashMap::default();
    for (i, f) in input.flows.iter().enumerate() {
        let source_span = endpoints.span(&f.source, i, Direction::Outgoing)?;
        let destination_span = endpoints.span(&f.destination, i, Direction::Incoming)?;
        let start = RibbonSide {
            span: source_span,
            radius: opts.ribbon_start_radius.unwrap_or(opts.radius),
            margin: opts.ribbon_start_margin,
            arc_height: opts.arc_height,
            center: opts.center,
        };
        let end = RibbonSide {
            span: destination_span,
            radius: opts.ribbon_end_radius.unwrap_or(opts.radius),
            margin: opts.ribbon_end_margin,
            arc_height: opts.arc_height,
            center: opts.center,
        };
        let key = f.ribbon_key(i);
        ribbon_keys.insert(key.clone(), i);
        ribbons.push(RibbonLayout {
            key,
            flow_index: i,
            source: f.source.clone(),
            destination: f.destination.clone(),
            amount: f.amount,
            source_span,
            destination_span,
            start_radius: start.radius,
            end_radius: end.radius,
            start_margin: start.margin,
            end_margin: end.margin,
            bend_center: bend,
            path: build_ribbon_path(&start, &end, bend),
        });
    }

    let labels: Vec<LabelLayout<K>> = arcs
        .values()
        .map(|arc| {
            layout_label(
                arc,
                presentation.label_text(&arc.key),
                opts.label_gap,
                opts.label_rotate,
            )
        })
        .collect();

    let bounds = layout_bounds(&arcs, &ribbons, &labels);

    tracing::debug!(
        arcs = arcs.len(),
        ribbons = ribbons.len(),
        "chord layout generated"
    );

    Ok(Built {
        layout: ChordDiagramLayout {
            bounds,
            arcs,
            ribbons,
            labels,
        },
        endpoints,
        ribbon_keys,
    })
}

fn layout_bounds<K: EntityKey>(
    arcs: &IndexMap<K, ArcLayout<K>>,
    ribbons: &[RibbonLayout<K>],
    labels: &[LabelLayout<K>],
) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;
    let mut add = |b: Option<Bounds>| {
        let Some(b) = b else {
            return;
        };
        if let Some(acc) = bounds.as_mut() {
            acc.union(&b);
        } else {
            bounds = Some(b);
        }
    };
    for arc in arcs.values() {
        let outer = arc_bezier_points(arc.center, arc.radius, arc.start_angle, arc.end_angle);
        let inner = arc_bezier_points(
            arc.center,
            arc.inner_radius().max(0.0),
            arc.start_angle,
            arc.end_angle,
        );
        add(Bounds::from_points(outer.into_iter().chain(inner)));
    }
    for ribbon in ribbons {
        add(ribbon.path.bounds());
    }
    add(Bounds::from_points(labels.iter().map(|l| l.position)));
    bounds
}
