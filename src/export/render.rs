//! Static image rendering: SVG written directly, PNG rasterized from it.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use petgraph::visit::EdgeRef;
use rand::Rng;
use resvg::{tiny_skia, usvg};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::layout::{spring_layout, visual_graph, LayoutConfig};
use crate::error::{HeroNetError, Result};
use crate::graph::HeroNetwork;

const TITLE: &str = "Superhero Friendship Network";
const MARGIN: f64 = 80.0;
const TITLE_BAND: f64 = 90.0;
/// Points to pixels at 100 dpi.
const PT: f64 = 100.0 / 72.0;

/// Output format of a rendered network image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Guess the format from a file extension, defaulting to PNG.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or(ImageFormat::Png)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Svg => write!(f, "svg"),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = HeroNetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" | "raster" => Ok(ImageFormat::Png),
            "svg" | "vector" => Ok(ImageFormat::Svg),
            other => Err(HeroNetError::Validation(format!(
                "unknown image format: {}",
                other
            ))),
        }
    }
}

/// Canvas and layout settings for a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub raster_scale: f32,
    pub layout: LayoutConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 1600,
            raster_scale: 1.0,
            layout: LayoutConfig::default(),
        }
    }
}

/// Render the network in `format`. Node colors are drawn from `rng`.
pub fn render<R: Rng + ?Sized>(
    network: &HeroNetwork,
    format: ImageFormat,
    opts: &RenderOptions,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let svg = render_svg(network, opts, rng);
    match format {
        ImageFormat::Svg => Ok(svg.into_bytes()),
        ImageFormat::Png => rasterize(&svg, opts.raster_scale),
    }
}

/// Render the network and write it to `path`, format chosen by extension.
pub fn write_snapshot<R: Rng + ?Sized>(
    network: &HeroNetwork,
    path: &Path,
    opts: &RenderOptions,
    rng: &mut R,
) -> Result<()> {
    let format = ImageFormat::from_path(path);
    let bytes = render(network, format, opts, rng)?;
    fs::write(path, &bytes).map_err(|e| HeroNetError::io(path, e))?;
    info!(path = %path.display(), format = %format, bytes = bytes.len(), "snapshot written");
    Ok(())
}

/// Lay out the network and draw it as an SVG document.
pub fn render_svg<R: Rng + ?Sized>(
    network: &HeroNetwork,
    opts: &RenderOptions,
    rng: &mut R,
) -> String {
    let graph = visual_graph(network, rng);
    let positions = spring_layout(&graph, opts.layout);

    let width = f64::from(opts.width);
    let height = f64::from(opts.height);
    let to_canvas = |(x, y): (f64, f64)| {
        let cx = MARGIN + (x + 1.0) / 2.0 * (width - 2.0 * MARGIN);
        let cy = TITLE_BAND + (1.0 - (y + 1.0) / 2.0) * (height - TITLE_BAND - MARGIN);
        (cx, cy)
    };
    let points: Vec<(f64, f64)> = positions.into_iter().map(to_canvas).collect();

    let mut svg = String::with_capacity(1024 + 256 * graph.node_count());
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = opts.width,
        h = opts.height
    ));
    svg.push('\n');
    svg.push_str(r##"<rect width="100%" height="100%" fill="#ffffff"/>"##);
    svg.push('\n');
    svg.push_str(&format!(
        r#"<text x="{x:.1}" y="{y:.1}" font-family="sans-serif" font-size="{size:.1}" text-anchor="middle">{title}</text>"#,
        x = width / 2.0,
        y = TITLE_BAND / 2.0 + 10.0,
        size = 20.0 * PT,
        title = TITLE
    ));
    svg.push('\n');

    svg.push_str(r##"<g stroke="#AAAAAA" stroke-width="1.5" stroke-opacity="0.9">"##);
    svg.push('\n');
    for edge in graph.edge_references() {
        let (x1, y1) = points[edge.source().index()];
        let (x2, y2) = points[edge.target().index()];
        svg.push_str(&format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}"/>"#,
            x1, y1, x2, y2
        ));
        svg.push('\n');
    }
    svg.push_str("</g>\n");

    svg.push_str(&format!(
        r##"<g font-family="sans-serif" font-size="{:.1}" text-anchor="middle" fill="#333333" stroke="#ffffff" stroke-width="3" paint-order="stroke">"##,
        8.0 * PT
    ));
    svg.push('\n');
    for edge in graph.edge_references() {
        let (x1, y1) = points[edge.source().index()];
        let (x2, y2) = points[edge.target().index()];
        let label = format!(
            "{} ↔ {}",
            graph[edge.source()].name,
            graph[edge.target()].name
        );
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}">{}</text>"#,
            (x1 + x2) / 2.0,
            (y1 + y2) / 2.0,
            escape_xml(&label)
        ));
        svg.push('\n');
    }
    svg.push_str("</g>\n");

    for idx in graph.node_indices() {
        let node = &graph[idx];
        let (x, y) = points[idx.index()];
        // Marker size is an area in pt², like a scatter plot.
        let radius = node.size.sqrt() / 2.0 * PT;
        svg.push_str(&format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" fill-opacity="0.9"/>"#,
            x, y, radius, node.color
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" dy="0.35em" font-family="sans-serif" font-size="{:.1}" font-weight="bold" text-anchor="middle">{}</text>"#,
            x,
            y,
            12.0 * PT,
            escape_xml(&node.label())
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "rendered svg"
    );
    svg
}

/// Rasterize an SVG document to PNG bytes using the system fonts.
pub fn rasterize(svg: &str, scale: f32) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| HeroNetError::Render(format!("invalid svg: {}", e)))?;

    let size = tree
        .size()
        .to_int_size()
        .scale_by(scale)
        .ok_or_else(|| HeroNetError::Render(format!("invalid raster scale {}", scale)))?;
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| HeroNetError::Render("could not allocate pixmap".to_string()))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| HeroNetError::Render(format!("png encoding failed: {}", e)))
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
