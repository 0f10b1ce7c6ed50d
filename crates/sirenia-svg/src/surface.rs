use crate::SvgOptions;
use crate::util::{escape_xml, escape_xml_into, fmt, fmt_into, kebab_case};
use serde_json::Value;
use sirenia::{PathSegment, Point, RenderSurface, RibbonPath, Style, polar_point};
use std::fmt::Write as _;

/// Style keys consumed by the surface itself rather than copied through as attributes.
const RESERVED_KEYS: &[&str] = &["alpha", "anchor", "rotation", "color"];

/// Collects chord diagram primitives as SVG elements.
///
/// Layout coordinates are y-up; the surface flips y and multiplies by `scale`. Handles are the
/// element's position in [`SvgSurface::elements`].
#[derive(Debug, Clone)]
pub struct SvgSurface {
    scale: f64,
    default_fill: String,
    font_size: f64,
    font_family: String,
    elements: Vec<String>,
}

impl SvgSurface {
    pub fn new(options: &SvgOptions) -> Self {
        Self {
            scale: options.scale,
            default_fill: options.default_fill.clone(),
            font_size: options.font_size,
            font_family: options.font_family.clone(),
            elements: Vec::new(),
        }
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<String> {
        self.elements
    }

    fn push(&mut self, element: String) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    fn xy_into(&self, out: &mut String, p: Point) {
        fmt_into(out, p.x * self.scale);
        out.push(',');
        fmt_into(out, -p.y * self.scale);
    }

    fn arc_to(&self, out: &mut String, radius: f64, sweep: u8, to: Point) {
        let r = fmt(radius * self.scale);
        let _ = write!(out, "A{r},{r},0,0,{sweep},");
        self.xy_into(out, to);
    }

    fn wedge_path(
        &self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        width: f64,
    ) -> String {
        // Each half stays within 180 degrees, so the large-arc flag is always 0.
        let mid = start_angle + (end_angle - start_angle) / 2.0;
        let inner = radius - width;

        let mut d = String::with_capacity(160);
        d.push('M');
        self.xy_into(&mut d, polar_point(center, radius, start_angle));
        self.arc_to(&mut d, radius, 0, polar_point(center, radius, mid));
        self.arc_to(&mut d, radius, 0, polar_point(center, radius, end_angle));
        d.push('L');
        if inner > 0.0 {
            self.xy_into(&mut d, polar_point(center, inner, end_angle));
            self.arc_to(&mut d, inner, 1, polar_point(center, inner, mid));
            self.arc_to(&mut d, inner, 1, polar_point(center, inner, start_angle));
        } else {
            self.xy_into(&mut d, center);
        }
        d.push('Z');
        d
    }

    fn ribbon_path(&self, path: &RibbonPath) -> String {
        let mut d = String::with_capacity(path.len() * 16);
        let mut closed = false;
        for seg in path.segments() {
            match seg {
                PathSegment::MoveTo(p) => {
                    d.push('M');
                    self.xy_into(&mut d, p);
                }
                PathSegment::LineTo(p) => {
                    d.push('L');
                    self.xy_into(&mut d, p);
                }
                PathSegment::CubicTo(c1, c2, p) => {
                    d.push('C');
                    self.xy_into(&mut d, c1);
                    d.push(' ');
                    self.xy_into(&mut d, c2);
                    d.push(' ');
                    self.xy_into(&mut d, p);
                }
                PathSegment::Close => {
                    d.push('Z');
                    closed = true;
                }
            }
        }
        if !closed {
            d.push('Z');
        }
        d
    }

    fn shape(&mut self, class: &str, d: &str, style: &Style) -> usize {
        let mut el = format!(r#"<path class="{class}" d="{d}""#);
        let fill = style.get_str("fill").unwrap_or(&self.default_fill);
        let _ = write!(&mut el, r#" fill="{}""#, escape_xml(fill));
        if let Some(a) = style.get_f64("alpha") {
            let _ = write!(&mut el, r#" fill-opacity="{}""#, fmt(a));
        }
        pass_through_into(&mut el, style, &["fill"]);
        el.push_str("/>");
        self.push(el)
    }
}

/// Copies string and number style entries as kebab-case attributes.
fn pass_through_into(out: &mut String, style: &Style, skip: &[&str]) {
    for (key, value) in style.iter() {
        if RESERVED_KEYS.contains(&key.as_str()) || skip.contains(&key.as_str()) {
            continue;
        }
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.as_f64().map(fmt).unwrap_or_default(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        let _ = write!(out, r#" {}=""#, kebab_case(key));
        escape_xml_into(out, &value);
        out.push('"');
    }
}

impl RenderSurface for SvgSurface {
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
        let d = self.wedge_path(center, radius, start_angle, end_angle, width);
        self.shape("arc", &d, style)
    }

    fn draw_closed_path(&mut self, path: &RibbonPath, style: &Style) -> usize {
        let d = self.ribbon_path(path);
        self.shape("ribbon", &d, style)
    }

    fn annotate_text(&mut self, position: Point, text: &str, style: &Style) -> usize {
        let (x, y) = (fmt(position.x * self.scale), fmt(-position.y * self.scale));
        let anchor = style.get_str("anchor").unwrap_or("start");
        let mut el = format!(
            r#"<text class="label" x="{x}" y="{y}" text-anchor="{}" dominant-baseline="middle""#,
            escape_xml(anchor)
        );
        if let Some(rotation) = style.get_f64("rotation") {
            // Counter-clockwise in layout space is a negative SVG rotation.
            let _ = write!(&mut el, r#" transform="rotate({},{x},{y})""#, fmt(-rotation));
        }
        if style.get("fontSize").is_none() {
            let _ = write!(&mut el, r#" font-size="{}""#, fmt(self.font_size));
        }
        if style.get("fontFamily").is_none() {
            let _ = write!(&mut el, r#" font-family="{}""#, escape_xml(&self.font_family));
        }
        if let Some(color) = style.get_str("color") {
            let _ = write!(&mut el, r#" fill="{}""#, escape_xml(color));
        }
        if let Some(a) = style.get_f64("alpha") {
            let _ = write!(&mut el, r#" opacity="{}""#, fmt(a));
        }
        pass_through_into(&mut el, style, &[]);
        el.push('>');
        escape_xml_into(&mut el, text);
        el.push_str("</text>");
        self.push(el)
    }
}
