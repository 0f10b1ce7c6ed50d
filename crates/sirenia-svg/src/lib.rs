#![forbid(unsafe_code)]

//! SVG output for `sirenia` chord diagrams.
//!
//! [`SvgSurface`] implements [`sirenia::RenderSurface`]; [`render_svg`] draws a whole diagram onto
//! one and wraps the elements in an `<svg>` document sized from the layout bounds.

mod surface;
mod util;

pub use surface::SvgSurface;

use sirenia::{Bounds, ChordDiagram, EntityKey};
use std::fmt::Write as _;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] sirenia::Error),
    #[error("invalid SVG option `{option}`: {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Root element id.
    pub diagram_id: Option<String>,
    /// Output units per layout unit.
    pub scale: f64,
    /// Space around the layout bounds, in layout units. Labels are positioned by their anchor
    /// only, so this also has to fit label text.
    pub padding: f64,
    /// Fill of arcs and ribbons whose style has none.
    pub default_fill: String,
    pub font_size: f64,
    pub font_family: String,
    pub background: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            scale: 200.0,
            padding: 0.3,
            default_fill: "#808080".to_string(),
            font_size: 12.0,
            font_family: "sans-serif".to_string(),
            background: None,
        }
    }
}

impl SvgOptions {
    fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidOption {
                option: "scale",
                message: format!("must be a positive number, got {}", self.scale),
            });
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(Error::InvalidOption {
                option: "padding",
                message: format!("must be a non-negative number, got {}", self.padding),
            });
        }
        Ok(())
    }
}

/// Generates the layout if needed and renders every visible element to an SVG document.
pub fn render_svg<K: EntityKey>(
    diagram: &mut ChordDiagram<K>,
    options: &SvgOptions,
) -> Result<String> {
    options.validate()?;
    let mut surface = SvgSurface::new(options);
    diagram.draw(&mut surface)?;
    let bounds = diagram.layout().and_then(|l| l.bounds.clone());
    let elements = surface.into_elements();
    tracing::debug!(elements = elements.len(), "chord diagram rendered to svg");
    Ok(write_document(&elements, bounds.as_ref(), options))
}

fn write_document(elements: &[String], bounds: Option<&Bounds>, options: &SvgOptions) -> String {
    let b = bounds.cloned().unwrap_or(Bounds {
        min_x: -1.0,
        min_y: -1.0,
        max_x: 1.0,
        max_y: 1.0,
    });
    let s = options.scale;
    let pad = options.padding;
    // y is flipped, so the top edge comes from max_y.
    let vb_x = (b.min_x - pad) * s;
    let vb_y = -(b.max_y + pad) * s;
    let vb_w = ((b.width() + 2.0 * pad) * s).max(1.0);
    let vb_h = ((b.height() + 2.0 * pad) * s).max(1.0);

    let mut out = String::with_capacity(256 + elements.iter().map(String::len).sum::<usize>());
    out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg""#);
    if let Some(id) = options.diagram_id.as_deref() {
        let _ = write!(&mut out, r#" id="{}""#, util::escape_xml(id));
    }
    let _ = write!(
        &mut out,
        r#" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}" role="graphics-document document" aria-roledescription="chord">"#,
        x = util::fmt(vb_x),
        y = util::fmt(vb_y),
        w = util::fmt(vb_w),
        h = util::fmt(vb_h),
    );
    if let Some(bg) = options.background.as_deref() {
        let _ = write!(
            &mut out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            util::fmt(vb_x),
            util::fmt(vb_y),
            util::fmt(vb_w),
            util::fmt(vb_h),
            util::escape_xml(bg)
        );
    }
    out.push_str("<g>");
    for el in elements {
        out.push_str(el);
    }
    out.push_str("</g></svg>");
    out
}
