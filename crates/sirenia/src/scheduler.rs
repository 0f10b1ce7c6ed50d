//! Endpoint scheduling: partitions each arc among the flow endpoints attached to it.
//!
//! Endpoints are registered per entity in flow order. Widths are proportional to the flow amount
//! relative to the sum of all amounts on the arc. One direction gets the leading block of the arc
//! and the other direction starts past the whole of that block (see [`EndpointOrder`]).

use crate::error::{Error, Result};
use crate::geom::AngleSpan;
use crate::model::EntityKey;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which end of a flow an endpoint is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// The entity is the flow's destination.
    Incoming,
    /// The entity is the flow's source.
    Outgoing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => f.write_str("incoming"),
            Direction::Outgoing => f.write_str("outgoing"),
        }
    }
}

/// Which block of endpoints claims the start of an arc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndpointOrder {
    #[default]
    IncomingFirst,
    OutgoingFirst,
}

impl EndpointOrder {
    fn leading(self) -> Direction {
        match self {
            EndpointOrder::IncomingFirst => Direction::Incoming,
            EndpointOrder::OutgoingFirst => Direction::Outgoing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub flow_index: usize,
    pub direction: Direction,
    pub amount: f64,
}

/// Per-entity registry of incident flow endpoints, in registration order.
#[derive(Debug, Clone)]
pub struct IncidenceIndex<K: EntityKey> {
    order: EndpointOrder,
    by_entity: FxHashMap<K, Vec<Endpoint>>,
}

impl<K: EntityKey> IncidenceIndex<K> {
    pub fn new(order: EndpointOrder) -> Self {
        Self {
            order,
            by_entity: FxHashMap::default(),
        }
    }

    pub fn endpoint_order(&self) -> EndpointOrder {
        self.order
    }

    /// Records one endpoint of flow `flow_index` on `key`.
    ///
    /// A self-loop registers twice on the same entity, once per direction.
    pub fn register(&mut self, key: &K, flow_index: usize, direction: Direction, amount: f64) {
        self.by_entity.entry(key.clone()).or_default().push(Endpoint {
            flow_index,
            direction,
            amount,
        });
    }

    pub fn endpoints(&self, key: &K) -> &[Endpoint] {
        self.by_entity.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_registered(&self, key: &K, flow_index: usize, direction: Direction) -> bool {
        self.endpoints(key)
            .iter()
            .any(|e| e.flow_index == flow_index && e.direction == direction)
    }

    /// Splits `arc` into contiguous sub-segments, one per endpoint registered on `key`.
    ///
    /// The result is ordered along the arc: the leading direction's endpoints first (in
    /// registration order), then the other direction's. The last sub-segment ends exactly at
    /// `arc.end`.
    pub fn partition(&self, key: &K, arc: AngleSpan) -> Result<Vec<(Endpoint, AngleSpan)>> {
        let endpoints = self.endpoints(key);
        if endpoints.is_empty() {
            return Ok(Vec::new());
        }
        let total: f64 = endpoints.iter().map(|e| e.amount).sum();
        if total.is_nan() || total <= 0.0 {
            return Err(Error::ZeroEntityAmount {
                key: key.to_string(),
            });
        }

        let leading = self.order.leading();
        let ordered = endpoints
            .iter()
            .filter(|e| e.direction == leading)
            .chain(endpoints.iter().filter(|e| e.direction != leading));

        // Boundaries come from the running amount, clamped into the arc, so every sub-segment
        // has `end >= start` even for zero amounts at the tail.
        let boundary = |prefix: f64| (arc.start + arc.width() * prefix / total).min(arc.end);
        let mut out = Vec::with_capacity(endpoints.len());
        let mut prefix = 0.0;
        let mut start = arc.start;
        for endpoint in ordered {
            prefix += endpoint.amount;
            let end = boundary(prefix).max(start);
            out.push((*endpoint, AngleSpan::new(start, end)));
            start = end;
        }
        if let Some((_, last)) = out.last_mut() {
            last.end = arc.end;
        }
        Ok(out)
    }

    /// Sub-range of `arc` owned by one endpoint occurrence.
    ///
    /// Fails with [`Error::EndpointNotRegistered`] when the endpoint was never registered on `key`
    /// in that direction.
    pub fn endpoint_span(
        &self,
        key: &K,
        arc: AngleSpan,
        flow_index: usize,
        direction: Direction,
    ) -> Result<AngleSpan> {
        self.partition(key, arc)?
            .into_iter()
            .find(|(e, _)| e.flow_index == flow_index && e.direction == direction)
            .map(|(_, span)| span)
            .ok_or_else(|| Error::EndpointNotRegistered {
                key: key.to_string(),
                flow_index,
                direction,
            })
    }
}

/// Resolved endpoint sub-segments for every registered endpoint of a diagram.
#[derive(Debug, Clone)]
pub struct EndpointAllocation<K: EntityKey> {
    spans: FxHashMap<(usize, Direction), (K, AngleSpan)>,
    per_arc: IndexMap<K, Vec<(Endpoint, AngleSpan)>>,
}

impl<K: EntityKey> EndpointAllocation<K> {
    /// Partitions every arc of `arcs` once.
    pub fn resolve(index: &IncidenceIndex<K>, arcs: &IndexMap<K, AngleSpan>) -> Result<Self> {
        let mut spans = FxHashMap::default();
        let mut per_arc = IndexMap::with_capacity(arcs.len());
        for (key, arc) in arcs {
            let parts = index.partition(key, *arc)?;
            for (endpoint, span) in &parts {
                spans.insert((endpoint.flow_index, endpoint.direction), (key.clone(), *span));
            }
            per_arc.insert(key.clone(), parts);
        }
        Ok(Self { spans, per_arc })
    }

    pub fn span(&self, key: &K, flow_index: usize, direction: Direction) -> Result<AngleSpan> {
        match self.spans.get(&(flow_index, direction)) {
            Some((owner, span)) if owner == key => Ok(*span),
            _ => Err(Error::EndpointNotRegistered {
                key: key.to_string(),
                flow_index,
                direction,
            }),
        }
    }

    pub fn partition(&self, key: &K) -> Option<&[(Endpoint, AngleSpan)]> {
        self.per_arc.get(key).map(Vec::as_slice)
    }
}
