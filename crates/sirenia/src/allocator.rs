//! Arc allocation: splits the configured total angle among entities, proportional to the amount
//! of flow touching each one, with a fixed gap after every arc.

use crate::error::{Error, Result};
use crate::geom::AngleSpan;
use crate::model::{EntityKey, EntityStats};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocatorParams {
    pub gap_angle: f64,
    pub max_angle: f64,
    pub rotation: f64,
}

impl Default for AllocatorParams {
    fn default() -> Self {
        Self {
            gap_angle: 5.0,
            max_angle: 360.0,
            rotation: 0.0,
        }
    }
}

/// Assigns `(start, end)` angles to every entity in `order`.
///
/// `order` must list every entity of `totals` exactly once. The returned map preserves `order`.
pub fn allocate_arcs<K: EntityKey>(
    order: &[K],
    totals: &IndexMap<K, EntityStats>,
    params: &AllocatorParams,
) -> Result<IndexMap<K, AngleSpan>> {
    let entity_count = order.len();
    let mut amounts = Vec::with_capacity(entity_count);
    for key in order {
        let Some(stats) = totals.get(key) else {
            return Err(Error::UnknownEntity {
                key: key.to_string(),
            });
        };
        amounts.push(stats.total_amount);
    }

    let total_gap = params.gap_angle * entity_count as f64;
    if total_gap >= params.max_angle {
        return Err(Error::GapExceedsMaxAngle {
            gap: params.gap_angle,
            entity_count,
            total_gap,
            max_angle: params.max_angle,
        });
    }
    let sum: f64 = amounts.iter().sum();
    if sum.is_nan() || sum <= 0.0 {
        return Err(Error::ZeroTotalAmount);
    }
    if let Some(i) = amounts.iter().position(|a| a.is_nan() || *a <= 0.0) {
        return Err(Error::ZeroEntityAmount {
            key: order[i].to_string(),
        });
    }

    let available = params.max_angle - total_gap;
    let mut cursor = params.rotation;
    let mut out = IndexMap::with_capacity(entity_count);
    for (key, amount) in order.iter().zip(amounts) {
        let width = available * amount / sum;
        let span = AngleSpan::new(cursor, cursor + width);
        tracing::trace!(entity = %key, start = span.start, end = span.end, "allocated arc");
        out.insert(key.clone(), span);

        cursor += width + params.gap_angle;
        if cursor >= params.max_angle {
            cursor = cursor.rem_euclid(params.max_angle);
        }
    }
    Ok(out)
}
