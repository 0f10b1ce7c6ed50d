use crate::geom::polar_point;
use crate::model::{ArcLayout, EntityKey, LabelLayout, TextAnchor};

/// Places the label of `arc` just outside its outer edge, at the arc's mid angle.
pub fn layout_label<K: EntityKey>(
    arc: &ArcLayout<K>,
    text: String,
    label_gap: f64,
    rotate: bool,
) -> LabelLayout<K> {
    let angle = arc.mid_angle();
    let position = polar_point(arc.center, arc.radius + label_gap, angle);
    let dx = position.x - arc.center.x;
    let anchor = if dx.abs() < 1e-9 {
        TextAnchor::Middle
    } else if dx > 0.0 {
        TextAnchor::Start
    } else {
        TextAnchor::End
    };
    LabelLayout {
        key: arc.key.clone(),
        text,
        angle,
        position,
        rotation: rotate.then(|| label_rotation(angle)),
        anchor,
    }
}

/// Keeps text upright on the left half of the circle. `angle` may be outside `[0, 360)`.
pub fn label_rotation(angle: f64) -> f64 {
    let angle = angle.rem_euclid(360.0);
    if angle > 90.0 && angle < 180.0 {
        -(180.0 - angle).abs()
    } else if (180.0..=270.0).contains(&angle) {
        (180.0 - angle).abs()
    } else {
        angle
    }
}
