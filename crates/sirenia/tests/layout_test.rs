use sirenia::{
    ChordDiagram, Direction, EndpointOrder, Error, ErrorKind, FlowRecord, LayoutOptions,
    PathCode,
};

const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

fn k(s: &str) -> String {
    s.to_string()
}

fn diagram(flows: &[(&str, &str, f64)], gap: f64) -> ChordDiagram {
    let mut d = ChordDiagram::with_options(LayoutOptions {
        gap_angle: gap,
        ..Default::default()
    });
    d.add_flows(flows.iter().copied());
    d
}

fn mixed_flows() -> Vec<(&'static str, &'static str, f64)> {
    vec![
        ("apple", "orange", 3.0),
        ("orange", "kiwi", 1.5),
        ("kiwi", "apple", 4.0),
        ("apple", "apple", 2.0),
        ("pear", "orange", 0.5),
        ("apple", "orange", 3.0),
    ]
}

#[test]
fn allocation_covers_the_configured_angle() {
    for (gap, max_angle) in [(0.0, 360.0), (5.0, 360.0), (3.0, 270.0)] {
        let mut d = diagram(&mixed_flows(), gap);
        d.set_max_angle(max_angle);
        let layout = d.generate().unwrap();
        let spans: f64 = layout.arcs.values().map(|a| a.angle()).sum();
        assert_close(spans + gap * layout.arcs.len() as f64, max_angle);
    }
}

#[test]
fn arc_widths_are_proportional_to_totals() {
    let mut d = diagram(&mixed_flows(), 4.0);
    let totals = d.entity_totals().clone();
    let layout = d.generate().unwrap();
    let ratios: Vec<f64> = layout
        .arcs
        .values()
        .map(|a| a.angle() / totals[&a.key].total_amount)
        .collect();
    for r in &ratios {
        assert_close(*r, ratios[0]);
    }
}

#[test]
fn arcs_follow_each_other_without_overlap() {
    let mut d = diagram(&mixed_flows(), 5.0);
    let layout = d.generate().unwrap();
    let arcs: Vec<_> = layout.arcs.values().collect();
    assert_close(arcs[0].start_angle, 0.0);
    for pair in arcs.windows(2) {
        assert!(pair[0].angle() > 0.0);
        assert_close(pair[1].start_angle, pair[0].end_angle + 5.0);
    }
}

#[test]
fn endpoints_partition_every_arc() {
    let mut d = diagram(&mixed_flows(), 5.0);
    let keys: Vec<String> = d.entity_totals().keys().cloned().collect();
    for key in keys {
        let arc = d.get_arc(&key).unwrap().span();
        let parts = d.endpoint_partition(&key).unwrap().to_vec();
        assert_close(parts[0].1.start, arc.start);
        assert_close(parts[parts.len() - 1].1.end, arc.end);
        for pair in parts.windows(2) {
            assert_close(pair[1].1.start, pair[0].1.end);
            assert!(!pair[0].1.overlaps(&pair[1].1, EPS));
        }
    }
}

#[test]
fn endpoint_widths_follow_flow_amounts() {
    let mut d = diagram(&mixed_flows(), 5.0);
    let total = d.entity_totals()["orange"].total_amount;
    let arc = d.get_arc(&k("orange")).unwrap().angle();
    let parts = d.endpoint_partition(&k("orange")).unwrap().to_vec();
    for (endpoint, span) in parts {
        assert_close(span.width(), arc * endpoint.amount / total);
    }
}

#[test]
fn incoming_endpoints_come_first_by_default() {
    let mut d = diagram(&mixed_flows(), 5.0);
    let parts = d.endpoint_partition(&k("apple")).unwrap().to_vec();
    let directions: Vec<Direction> = parts.iter().map(|(e, _)| e.direction).collect();
    let first_outgoing = directions
        .iter()
        .position(|d| *d == Direction::Outgoing)
        .unwrap();
    assert!(
        directions[first_outgoing..]
            .iter()
            .all(|d| *d == Direction::Outgoing)
    );
    let incoming_flows: Vec<usize> = parts
        .iter()
        .filter(|(e, _)| e.direction == Direction::Incoming)
        .map(|(e, _)| e.flow_index)
        .collect();
    assert_eq!(incoming_flows, [2, 3]);
}

#[test]
fn outgoing_first_puts_sources_at_the_arc_start() {
    let mut d = diagram(&[("a", "b", 2.0), ("b", "c", 2.0)], 0.0);
    let mut opts = d.options().clone();
    opts.endpoint_order = EndpointOrder::OutgoingFirst;
    d.set_options(opts);
    let b = d.get_arc(&k("b")).unwrap().span();
    let out = d.endpoint_span(&k("b"), 1, Direction::Outgoing).unwrap();
    assert_close(out.start, b.start);
}

#[test]
fn self_loop_gets_two_distinct_sub_segments() {
    let mut d = diagram(&[("x", "y", 1.0), ("x", "x", 3.0)], 2.0);
    let x = k("x");
    let incoming = d.endpoint_span(&x, 1, Direction::Incoming).unwrap();
    let outgoing = d.endpoint_span(&x, 1, Direction::Outgoing).unwrap();
    assert!(!incoming.overlaps(&outgoing, EPS));
    assert_close(incoming.width(), outgoing.width());
    assert!(incoming.width() > 0.0);

    let ribbon = &d.ribbons().unwrap()[1];
    assert_eq!(ribbon.source_span, outgoing);
    assert_eq!(ribbon.destination_span, incoming);
}

#[test]
fn generate_is_idempotent() {
    let mut d = diagram(&mixed_flows(), 5.0);
    let first = d.generate().unwrap().clone();
    let second = d.generate().unwrap().clone();
    assert_eq!(first, second);

    // A full rebuild from the same input is bit-identical too.
    d.set_gap_angle(5.0);
    assert!(d.is_stale());
    let rebuilt = d.generate().unwrap().clone();
    assert_eq!(first, rebuilt);
}

#[test]
fn zero_amount_tail_flow_draws_an_empty_ribbon() {
    for n in 2..40 {
        let names: Vec<String> = (0..n).map(|i| format!("s{i}")).collect();
        let mut d = ChordDiagram::with_options(LayoutOptions {
            gap_angle: 1.0,
            ..Default::default()
        });
        for (i, name) in names.iter().enumerate() {
            d.add_flow((name.clone(), k("t"), 0.37 + 0.13 * i as f64));
        }
        d.add_flow(("z", "s0", 1.0));
        let tail = d.add_flow(("z", "t", 0.0));

        let ribbon = d.ribbons().unwrap()[tail].clone();
        for span in [ribbon.source_span, ribbon.destination_span] {
            assert!(span.end >= span.start, "n={n}: {span:?}");
            assert!(span.width() < EPS, "n={n}: {span:?}");
        }
        assert_eq!(ribbon.path.len(), 4 + 2 + 4 + 3, "n={n}");

        let span = d.endpoint_span(&k("t"), tail, Direction::Incoming).unwrap();
        assert_eq!(span, ribbon.destination_span);
    }
}

#[test]
fn zero_gap_is_legal() {
    let mut d = diagram(&mixed_flows(), 0.0);
    assert!(d.generate().is_ok());
}

#[test]
fn two_chain_scenario_over_a_full_circle() {
    let mut d = diagram(&[("a", "b", 2.0), ("b", "c", 2.0)], 0.0);
    let totals: Vec<f64> = d.entity_totals().values().map(|s| s.total_amount).collect();
    assert_eq!(totals, [2.0, 4.0, 2.0]);

    let a = d.get_arc(&k("a")).unwrap().clone();
    let b = d.get_arc(&k("b")).unwrap().clone();
    let c = d.get_arc(&k("c")).unwrap().clone();
    assert_close(a.start_angle, 0.0);
    assert_close(a.angle(), 90.0);
    assert_close(b.angle(), 180.0);
    assert_close(c.angle(), 90.0);
    assert_close(a.angle() + b.angle() + c.angle(), 360.0);

    let incoming = d.endpoint_span(&k("b"), 0, Direction::Incoming).unwrap();
    let outgoing = d.endpoint_span(&k("b"), 1, Direction::Outgoing).unwrap();
    assert_close(incoming.width(), 90.0);
    assert_close(outgoing.width(), 90.0);
    assert_close(incoming.start, b.start_angle);
    assert_close(outgoing.end, b.end_angle);
}

#[test]
fn two_chain_scenario_over_a_half_circle() {
    let mut d = diagram(&[("a", "b", 2.0), ("b", "c", 2.0)], 0.0);
    d.set_max_angle(180.0);
    assert_close(d.get_arc(&k("a")).unwrap().angle(), 45.0);
    assert_close(d.get_arc(&k("b")).unwrap().angle(), 90.0);
    assert_close(d.get_arc(&k("c")).unwrap().angle(), 45.0);
    let parts = d.endpoint_partition(&k("b")).unwrap().to_vec();
    assert_eq!(parts.len(), 2);
    for (_, span) in parts {
        assert_close(span.width(), 45.0);
    }
}

#[test]
fn pure_self_loop_scenario() {
    let gap = 5.0;
    let mut d = diagram(&[("x", "x", 5.0)], gap);
    let arc = d.get_arc(&k("x")).unwrap().clone();
    assert_close(arc.angle(), 360.0 - gap);

    let parts = d.endpoint_partition(&k("x")).unwrap().to_vec();
    assert_eq!(parts.len(), 2);
    assert_close(parts[0].1.width(), 180.0 - gap / 2.0);
    assert_close(parts[1].1.width(), 180.0 - gap / 2.0);
    assert_close(parts[0].1.end, parts[1].1.start);
    assert_close(parts[0].1.start, arc.start_angle);
    assert_close(parts[1].1.end, arc.end_angle);
}

#[test]
fn gaps_over_the_circle_fail_before_any_arc_exists() {
    let flows: Vec<(String, String, f64)> = (0..10)
        .map(|i| (format!("n{i}"), format!("n{}", (i + 1) % 10), 1.0))
        .collect();
    let mut d: ChordDiagram = ChordDiagram::with_options(LayoutOptions {
        gap_angle: 40.0,
        ..Default::default()
    });
    d.add_flows(flows);
    let err = d.generate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(matches!(
        err,
        Error::GapExceedsMaxAngle {
            entity_count: 10,
            ..
        }
    ));
    assert!(d.is_stale());
    assert!(d.get_arc(&k("n0")).is_err());
}

#[test]
fn all_zero_amounts_are_invalid_data() {
    let mut d = diagram(&[("a", "b", 0.0), ("b", "c", 0.0)], 0.0);
    assert_eq!(d.generate().unwrap_err(), Error::ZeroTotalAmount);
}

#[test]
fn zero_amount_flow_yields_an_empty_ribbon() {
    let mut d = diagram(&[("a", "b", 3.0), ("a", "b", 0.0)], 5.0);
    let ribbon = d.ribbons().unwrap()[1].clone();
    assert_eq!(ribbon.source_span.width(), 0.0);
    assert_eq!(ribbon.destination_span.width(), 0.0);
    assert_eq!(ribbon.path.codes[0], PathCode::MoveTo);
    assert!(ribbon.path.vertices.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
}

#[test]
fn explicit_order_places_entities_first() {
    let mut d = diagram(&[("a", "b", 1.0), ("b", "c", 1.0)], 0.0);
    d.set_order([k("c"), k("a")]);
    let keys: Vec<String> = d.arcs().unwrap().map(|a| a.key.clone()).collect();
    assert_eq!(keys, ["c", "a", "b"]);
    assert_close(d.get_arc(&k("c")).unwrap().start_angle, 0.0);
}

#[test]
fn unknown_order_entry_is_invalid_data() {
    let mut d = diagram(&[("a", "b", 1.0)], 0.0);
    d.set_order([k("ghost")]);
    let err = d.generate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn duplicate_triples_stay_distinct() {
    let mut d = diagram(&mixed_flows(), 5.0);
    let rec = FlowRecord::from(("apple", "orange", 3.0));
    let first = d.get_ribbon(&rec, 0).unwrap().clone();
    let last = d.get_ribbon(&rec, 5).unwrap().clone();
    assert_eq!(first.key, "apple-orange-3-0");
    assert_eq!(last.key, "apple-orange-3-5");
    assert!(!first.source_span.overlaps(&last.source_span, EPS));
    assert_eq!(d.ribbon_by_key("apple-orange-3-5").unwrap().flow_index, 5);
}

#[test]
fn rotation_offsets_the_first_arc() {
    let mut d = diagram(&[("a", "b", 1.0)], 0.0);
    d.set_rotation(90.0);
    let a = d.get_arc(&k("a")).unwrap().clone();
    let b = d.get_arc(&k("b")).unwrap().clone();
    assert_close(a.start_angle, 90.0);
    assert_close(b.start_angle, 270.0);
    assert_close(b.end_angle, 450.0);
}

#[test]
fn ribbon_geometry_uses_margins_and_bend_center() {
    let mut d = diagram(&[("a", "b", 1.0)], 0.0);
    let mut opts = d.options().clone();
    opts.radius = 2.0;
    opts.arc_height = 0.2;
    opts.ribbon_start_margin = 0.1;
    opts.bend_center = Some(sirenia::point(0.5, 0.0));
    d.set_options(opts);

    let ribbon = d.ribbons().unwrap()[0].clone();
    let first = ribbon.path.vertices[0];
    let r = (first.x * first.x + first.y * first.y).sqrt();
    assert_close(r, 2.0 - 0.1 - 0.2);
    assert!(ribbon.path.vertices.contains(&sirenia::point(0.5, 0.0)));
    assert_eq!(ribbon.path.vertices.first(), ribbon.path.vertices.last());
}

#[test]
fn layout_serializes_to_json() {
    let mut d = diagram(&[("a", "b", 1.0)], 0.0);
    let layout = d.generate().unwrap();
    let v = serde_json::to_value(layout).unwrap();
    assert!(v["arcs"]["a"]["startAngle"].is_null());
    assert_eq!(v["arcs"]["a"]["start_angle"], serde_json::json!(0.0));
    assert_eq!(v["ribbons"][0]["key"], serde_json::json!("a-b-1-0"));
    assert!(v["bounds"].is_object());
}
