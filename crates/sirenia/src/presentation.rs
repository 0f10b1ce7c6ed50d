//! Display-only state of a diagram: style defaults, per-element overrides, visibility, label
//! text, and the `draw` pass that hands everything to a [`RenderSurface`].

use crate::diagram::{ChordDiagram, DiagramInput, ensure_built};
use crate::error::{Error, Result};
use crate::model::EntityKey;
use crate::style::Style;
use crate::surface::RenderSurface;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

#[derive(Debug, Clone)]
pub(crate) struct Presentation<K: EntityKey> {
    arc_style: Style,
    ribbon_style: Style,
    label_style: Style,
    arc_overrides: FxHashMap<K, Style>,
    ribbon_overrides: FxHashMap<usize, Style>,
    label_overrides: FxHashMap<K, Style>,
    hidden_arcs: FxHashSet<K>,
    hidden_ribbons: FxHashSet<usize>,
    hidden_labels: FxHashSet<K>,
    label_text: FxHashMap<K, String>,
}

impl<K: EntityKey> Default for Presentation<K> {
    fn default() -> Self {
        Self {
            arc_style: Style::from_value(serde_json::json!({ "alpha": 1.0 })),
            ribbon_style: Style::from_value(serde_json::json!({ "alpha": 0.6 })),
            label_style: Style::new(),
            arc_overrides: FxHashMap::default(),
            ribbon_overrides: FxHashMap::default(),
            label_overrides: FxHashMap::default(),
            hidden_arcs: FxHashSet::default(),
            hidden_ribbons: FxHashSet::default(),
            hidden_labels: FxHashSet::default(),
            label_text: FxHashMap::default(),
        }
    }
}

impl<K: EntityKey> Presentation<K> {
    pub(crate) fn label_text(&self, key: &K) -> String {
        self.label_text
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn arc_style(&self, key: &K) -> Style {
        match self.arc_overrides.get(key) {
            Some(o) => self.arc_style.merged(o),
            None => self.arc_style.clone(),
        }
    }

    fn ribbon_style(&self, input: &DiagramInput<K>, flow_index: usize) -> Style {
        let mut style = self.ribbon_style.clone();
        if let Some(f) = input.flows.get(flow_index) {
            let owner = if input.options.ribbon_style_from_source {
                &f.source
            } else {
                &f.destination
            };
            if let Some(fill) = self.arc_overrides.get(owner).and_then(|o| o.get("fill")) {
                style.set("fill", fill.clone());
            }
        }
        if let Some(o) = self.ribbon_overrides.get(&flow_index) {
            style.merge(o);
        }
        style
    }

    fn label_style(&self, input: &DiagramInput<K>, key: &K) -> Style {
        let mut style = self.label_style.clone();
        let arc_fill = self.arc_overrides.get(key).and_then(|o| o.get("fill"));
        if let (true, Some(fill)) = (input.options.label_colored, arc_fill) {
            style.set("color", fill.clone());
        }
        if let Some(o) = self.label_overrides.get(key) {
            style.merge(o);
        }
        style
    }
}

/// Handles returned by a surface for everything [`ChordDiagram::draw`] emitted.
#[derive(Debug, Clone)]
pub struct DrawHandles<K: EntityKey, H> {
    pub arcs: IndexMap<K, H>,
    /// `(flow index, handle)` in flow order.
    pub ribbons: Vec<(usize, H)>,
    pub labels: IndexMap<K, H>,
}

impl<K: EntityKey> ChordDiagram<K> {
    /// Merges `style` into the defaults of every arc.
    pub fn update_arcs(&mut self, style: &Style) {
        self.presentation.arc_style.merge(style);
    }

    pub fn update_ribbons(&mut self, style: &Style) {
        self.presentation.ribbon_style.merge(style);
    }

    pub fn update_labels(&mut self, style: &Style) {
        self.presentation.label_style.merge(style);
    }

    /// Merges `style` into the override of a single arc.
    pub fn update_arc(&mut self, key: &K, style: &Style) -> Result<()> {
        self.require_entity(key)?;
        self.presentation
            .arc_overrides
            .entry(key.clone())
            .or_default()
            .merge(style);
        Ok(())
    }

    pub fn update_ribbon(&mut self, flow_index: usize, style: &Style) -> Result<()> {
        self.require_flow(flow_index)?;
        self.presentation
            .ribbon_overrides
            .entry(flow_index)
            .or_default()
            .merge(style);
        Ok(())
    }

    pub fn update_label(&mut self, key: &K, style: &Style) -> Result<()> {
        self.require_entity(key)?;
        self.presentation
            .label_overrides
            .entry(key.clone())
            .or_default()
            .merge(style);
        Ok(())
    }

    pub fn hide_arc(&mut self, key: &K) {
        self.presentation.hidden_arcs.insert(key.clone());
    }

    pub fn show_arc(&mut self, key: &K) {
        self.presentation.hidden_arcs.remove(key);
    }

    pub fn is_arc_visible(&self, key: &K) -> bool {
        !self.presentation.hidden_arcs.contains(key)
    }

    pub fn hide_ribbon(&mut self, flow_index: usize) {
        self.presentation.hidden_ribbons.insert(flow_index);
    }

    pub fn show_ribbon(&mut self, flow_index: usize) {
        self.presentation.hidden_ribbons.remove(&flow_index);
    }

    pub fn is_ribbon_visible(&self, flow_index: usize) -> bool {
        !self.input.options.hide_ribbons && !self.presentation.hidden_ribbons.contains(&flow_index)
    }

    pub fn hide_label(&mut self, key: &K) {
        self.presentation.hidden_labels.insert(key.clone());
    }

    pub fn show_label(&mut self, key: &K) {
        self.presentation.hidden_labels.remove(key);
    }

    pub fn is_label_visible(&self, key: &K) -> bool {
        !self.input.options.hide_labels && !self.presentation.hidden_labels.contains(key)
    }

    /// Replaces label text per entity; entities missing from `mapping` keep their current text.
    pub fn map_labels<I: IntoIterator<Item = (K, String)>>(&mut self, mapping: I) {
        for (key, text) in mapping {
            self.presentation.label_text.insert(key, text);
        }
        // Label text is not geometry, so a built layout is patched rather than dropped.
        if let Some(built) = self.built.as_mut() {
            for label in &mut built.layout.labels {
                label.text = self.presentation.label_text(&label.key);
            }
        }
    }

    /// Sets `alpha` on every arc and ribbon.
    pub fn fade_all(&mut self, arc_alpha: f64, ribbon_alpha: f64) {
        let arc = alpha(arc_alpha);
        let ribbon = alpha(ribbon_alpha);
        for key in self.input.totals.keys() {
            self.presentation
                .arc_overrides
                .entry(key.clone())
                .or_default()
                .merge(&arc);
        }
        for i in 0..self.input.flows.len() {
            self.presentation
                .ribbon_overrides
                .entry(i)
                .or_default()
                .merge(&ribbon);
        }
    }

    /// Fades everything except the flows from `source` to `destination` and their two arcs.
    pub fn highlight_flow(
        &mut self,
        source: &K,
        destination: &K,
        arc_alpha: f64,
        ribbon_alpha: f64,
    ) -> Result<()> {
        self.require_entity(source)?;
        self.require_entity(destination)?;
        self.fade_all(arc_alpha, ribbon_alpha);
        self.emphasize_arc(source);
        self.emphasize_arc(destination);
        self.emphasize_ribbons(|f| &f.source == source && &f.destination == destination);
        Ok(())
    }

    /// Fades everything except `key`'s arc and the ribbons leaving it.
    pub fn highlight_source(&mut self, key: &K, arc_alpha: f64, ribbon_alpha: f64) -> Result<()> {
        self.require_entity(key)?;
        self.fade_all(arc_alpha, ribbon_alpha);
        self.emphasize_arc(key);
        self.emphasize_ribbons(|f| &f.source == key);
        Ok(())
    }

    /// Fades everything except `key`'s arc and the ribbons arriving at it.
    pub fn highlight_target(&mut self, key: &K, arc_alpha: f64, ribbon_alpha: f64) -> Result<()> {
        self.require_entity(key)?;
        self.fade_all(arc_alpha, ribbon_alpha);
        self.emphasize_arc(key);
        self.emphasize_ribbons(|f| &f.destination == key);
        Ok(())
    }

    pub fn highlight_arc(&mut self, key: &K, arc_alpha: f64, ribbon_alpha: f64) -> Result<()> {
        self.require_entity(key)?;
        self.fade_all(arc_alpha, ribbon_alpha);
        self.emphasize_arc(key);
        Ok(())
    }

    fn emphasize_arc(&mut self, key: &K) {
        self.presentation
            .arc_overrides
            .entry(key.clone())
            .or_default()
            .merge(&alpha(1.0));
    }

    fn emphasize_ribbons(&mut self, pick: impl Fn(&crate::FlowRecord<K>) -> bool) {
        let full = alpha(1.0);
        for (i, f) in self.input.flows.iter().enumerate() {
            if pick(f) {
                self.presentation
                    .ribbon_overrides
                    .entry(i)
                    .or_default()
                    .merge(&full);
            }
        }
    }

    fn require_entity(&self, key: &K) -> Result<()> {
        if self.input.totals.contains_key(key) {
            return Ok(());
        }
        Err(Error::ArcNotFound {
            key: key.to_string(),
        })
    }

    fn require_flow(&self, flow_index: usize) -> Result<()> {
        if flow_index < self.input.flows.len() {
            return Ok(());
        }
        Err(Error::RibbonNotFound {
            key: format!("#{flow_index}"),
        })
    }

    /// Effective style of an arc: defaults, then the arc's own overrides.
    pub fn arc_style(&self, key: &K) -> Style {
        self.presentation.arc_style(key)
    }

    /// Effective style of a ribbon: defaults, the `fill` of the arc it takes its color from, then
    /// the ribbon's own overrides.
    pub fn ribbon_style(&self, flow_index: usize) -> Style {
        self.presentation.ribbon_style(&self.input, flow_index)
    }

    /// Effective style of a label: defaults, the arc's `fill` as `color` when
    /// [`LayoutOptions::label_colored`](crate::LayoutOptions::label_colored) is set, then the
    /// label's own overrides.
    pub fn label_style(&self, key: &K) -> Style {
        self.presentation.label_style(&self.input, key)
    }

    /// Generates the layout if needed and emits every visible element: arcs first, then ribbons,
    /// then labels.
    pub fn draw<S: RenderSurface>(&mut self, surface: &mut S) -> Result<DrawHandles<K, S::Handle>> {
        let built = ensure_built(&self.input, &self.presentation, &mut self.built)?;
        let (input, p) = (&self.input, &self.presentation);
        let layout = &built.layout;

        let mut handles = DrawHandles {
            arcs: IndexMap::with_capacity(layout.arcs.len()),
            ribbons: Vec::with_capacity(layout.ribbons.len()),
            labels: IndexMap::with_capacity(layout.labels.len()),
        };

        for arc in layout.arcs.values() {
            if p.hidden_arcs.contains(&arc.key) {
                continue;
            }
            let h = surface.draw_wedge(
                arc.center,
                arc.radius,
                arc.start_angle,
                arc.end_angle,
                arc.height,
                &p.arc_style(&arc.key),
            );
            handles.arcs.insert(arc.key.clone(), h);
        }

        for ribbon in &layout.ribbons {
            if input.options.hide_ribbons || p.hidden_ribbons.contains(&ribbon.flow_index) {
                continue;
            }
            let h = surface.draw_closed_path(&ribbon.path, &p.ribbon_style(input, ribbon.flow_index));
            handles.ribbons.push((ribbon.flow_index, h));
        }

        for label in &layout.labels {
            if input.options.hide_labels || p.hidden_labels.contains(&label.key) {
                continue;
            }
            let mut style = Style::new();
            style.set("anchor", label.anchor.as_str());
            if let Some(rotation) = label.rotation {
                style.set("rotation", rotation);
            }
            style.merge(&p.label_style(input, &label.key));
            let h = surface.annotate_text(label.position, &label.text, &style);
            handles.labels.insert(label.key.clone(), h);
        }

        tracing::debug!(
            arcs = handles.arcs.len(),
            ribbons = handles.ribbons.len(),
            labels = handles.labels.len(),
            "chord diagram drawn"
        );
        Ok(handles)
    }
}

fn alpha(v: f64) -> Style {
    let mut s = Style::new();
    s.set("alpha", Value::from(v));
    s
}
