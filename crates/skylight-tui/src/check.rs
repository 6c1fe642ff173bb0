//! `--check`: a plain-text report of what the configuration resolves to.

use std::fmt::Write as _;

use humantime::format_duration;

use skylight_config::ConfigError;
use skylight_core::layout::GridBand;
use skylight_core::{Configuration, LayoutEngine, RenderTree, TileDescriptor};

use crate::widgets::WidgetRegistry;

/// Render the report. `problems` usually comes from
/// [`skylight_config::validate`].
pub fn summary(
    config: &Configuration,
    registry: &WidgetRegistry,
    problems: &[ConfigError],
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Layout");
    match LayoutEngine::build(&config.layout) {
        RenderTree::Empty { message } => {
            let _ = writeln!(out, "  {message}");
        }
        RenderTree::Bands {
            top,
            middle,
            bottom,
        } => {
            let top: Vec<String> = top
                .tiles
                .iter()
                .map(|t| tile_label(&t.tile, &t.width.to_string(), registry))
                .collect();
            let _ = writeln!(out, "  top     {}", band_line(&top));
            let _ = writeln!(out, "  middle  {}", band_line(&grid_labels(&middle, registry)));
            let _ = writeln!(out, "  bottom  {}", band_line(&grid_labels(&bottom, registry)));
        }
    }

    let _ = writeln!(out, "Endpoints");
    if config.apis.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    let width = config.apis.keys().map(String::len).max().unwrap_or(0);
    for (name, api) in &config.apis {
        let mut line = format!("  {name:<width$}  {}", api.url.as_deref().unwrap_or("(no url)"));
        if let Some(var) = api.key_env.as_deref() {
            let _ = write!(line, " (key from ${var})");
        } else if api.key.is_some() {
            line.push_str(" (inline key)");
        }
        let _ = writeln!(out, "{line}");
    }

    let _ = writeln!(out, "Devices");
    if config.devices.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    let width = config.devices.keys().map(String::len).max().unwrap_or(0);
    for (id, device) in &config.devices {
        let _ = writeln!(out, "  {id:<width$}  {} ({})", device.entity, device.kind());
    }

    let r = &config.refresh;
    let periods = [
        ("weather", r.weather()),
        ("calendar", r.calendar()),
        ("shipments", r.shipments()),
        ("recipe", r.recipe()),
        ("note", r.note()),
        ("devices", r.devices()),
        ("notifications", r.notifications()),
        ("health", r.health()),
        ("reconnect", r.reconnect()),
        ("timeout", r.timeout()),
    ];
    let periods: Vec<String> = periods
        .iter()
        .map(|(name, period)| format!("{name} {}", format_duration(*period)))
        .collect();
    let _ = writeln!(out, "Refresh");
    let _ = writeln!(out, "  {}", periods.join(" · "));

    let _ = writeln!(out, "Problems");
    if problems.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for problem in problems {
        let _ = writeln!(out, "  - {problem}");
    }

    out
}

fn grid_labels(band: &GridBand, registry: &WidgetRegistry) -> Vec<String> {
    band.cells
        .iter()
        .map(|c| tile_label(&c.tile, &c.size.to_string(), registry))
        .collect()
}

fn tile_label(tile: &TileDescriptor, size: &str, registry: &WidgetRegistry) -> String {
    let mut label = format!("{} [{size}]", tile.kind);
    if !registry.contains(&tile.kind) {
        label.push_str(" (placeholder)");
    }
    label
}

fn band_line(labels: &[String]) -> String {
    if labels.is_empty() {
        "(none)".to_owned()
    } else {
        labels.join(" · ")
    }
}
