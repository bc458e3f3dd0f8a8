//! Export views — read-only projections of the hero network.
//!
//! A node/link JSON structure for interactive front ends, and a laid-out
//! static image (SVG, or PNG rasterized from it).

pub mod json;
pub mod layout;
pub mod render;

pub use json::{graph_json, GraphJson, GraphNode};
pub use layout::{spring_layout, visual_graph, LayoutConfig, VisualGraph, VisualNode};
pub use render::{rasterize, render, render_svg, write_snapshot, ImageFormat, RenderOptions};
