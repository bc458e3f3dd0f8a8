//! Tool implementations — maps tool calls onto the hero service.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use super::types::{ToolDefinition, ToolsCallResult};
use crate::error::HeroNetError;
use crate::export::ImageFormat;
use crate::service::HeroService;

/// Every tool the server exposes, with its argument schema.
pub fn list_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "hero_stats",
            description: "Network summary: hero and connection totals, heroes added in \
                the last few days, and the most connected heroes.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: "hero_lookup",
            description: "One hero by name with emoji, creation date and friends. \
                Returns null when no hero has that name.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Hero name, e.g. 'Thor'" }
                },
                "required": ["name"]
            }),
        },
        ToolDefinition {
            name: "hero_graph",
            description: "Node/link JSON of the whole network for force-directed rendering.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: "add_hero",
            description: "Add a hero. created_at defaults to today.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "created_at": {
                        "type": "string",
                        "description": "YYYY-MM-DD or RFC 3339 timestamp"
                    }
                },
                "required": ["name"]
            }),
        },
        ToolDefinition {
            name: "add_connection",
            description: "Befriend two existing heroes by name. Reports success: false \
                when either is unknown or they are already friends.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "source": { "type": "string" },
                    "target": { "type": "string" }
                },
                "required": ["source", "target"]
            }),
        },
        ToolDefinition {
            name: "render_image",
            description: "Render the network. SVG is returned inline; PNG is written to \
                `output` (or the configured snapshot file) and the path returned.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "format": { "type": "string", "enum": ["png", "svg"], "default": "png" },
                    "output": { "type": "string" }
                }
            }),
        },
    ]
}

/// Dispatch a tool call to its handler.
pub fn call_tool(service: &mut HeroService, name: &str, arguments: &Value) -> ToolsCallResult {
    match name {
        "hero_stats" => ToolsCallResult::json(&service.get_stats()),
        "hero_lookup" => handle_lookup(service, arguments),
        "hero_graph" => ToolsCallResult::json(&service.get_graph()),
        "add_hero" => handle_add_hero(service, arguments),
        "add_connection" => handle_add_connection(service, arguments),
        "render_image" => handle_render(service, arguments),
        _ => ToolsCallResult::error(format!("Unknown tool: {}", name)),
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

fn handle_lookup(service: &HeroService, args: &Value) -> ToolsCallResult {
    let Some(name) = str_arg(args, "name") else {
        return ToolsCallResult::error("Missing required parameter: name");
    };
    ToolsCallResult::json(&service.get_hero(name))
}

fn handle_add_hero(service: &mut HeroService, args: &Value) -> ToolsCallResult {
    let name = str_arg(args, "name").unwrap_or_default();
    match service.add_hero(name, str_arg(args, "created_at")) {
        Ok(reply) => ToolsCallResult::json(&reply),
        Err(e) => ToolsCallResult::error(e.to_string()),
    }
}

fn handle_add_connection(service: &mut HeroService, args: &Value) -> ToolsCallResult {
    let source = str_arg(args, "source").unwrap_or_default();
    let target = str_arg(args, "target").unwrap_or_default();
    match service.add_connection(source, target) {
        Ok(reply) => ToolsCallResult::json(&reply),
        Err(e) => ToolsCallResult::error(e.to_string()),
    }
}

fn handle_render(service: &HeroService, args: &Value) -> ToolsCallResult {
    let format = match str_arg(args, "format").map(str::parse::<ImageFormat>) {
        None => ImageFormat::Png,
        Some(Ok(format)) => format,
        Some(Err(e)) => return ToolsCallResult::error(e.to_string()),
    };
    let output = str_arg(args, "output").map(PathBuf::from);

    match (format, output) {
        (ImageFormat::Svg, None) => match service.render_image(ImageFormat::Svg) {
            Ok(bytes) => ToolsCallResult::text(String::from_utf8_lossy(&bytes)),
            Err(e) => ToolsCallResult::error(e.to_string()),
        },
        (ImageFormat::Png, None) => match service.write_snapshot(None) {
            Ok(path) => written(ImageFormat::from_path(&path), &path),
            Err(e) => ToolsCallResult::error(e.to_string()),
        },
        (format, Some(path)) => {
            let written_to = service
                .render_image(format)
                .and_then(|bytes| fs::write(&path, bytes).map_err(|e| HeroNetError::io(&path, e)));
            match written_to {
                Ok(()) => written(format, &path),
                Err(e) => ToolsCallResult::error(e.to_string()),
            }
        }
    }
}

fn written(format: ImageFormat, path: &Path) -> ToolsCallResult {
    ToolsCallResult::json(&json!({
        "format": format.to_string(),
        "path": path.display().to_string(),
    }))
}
