//! Chart.js option construction, caller-option merging, and the final
//! enforcement pass.
//!
//! Options are built as a JSON value, deep-merged with whatever the caller
//! put under `constraints.chart_options`, and then the enforcement pass runs
//! LAST: legends, tooltips, axes and gridlines come back on, datalabels are
//! forced on for primitive-data charts and off for object-data charts.
//! Caller options cannot undo the pass because nothing runs after it.

use serde_json::{json, Value};

use crate::pipeline::types::{ChartType, FormatHint};
use crate::render::theme::Palette;

/// Placeholder tokens swapped for JS function bodies after serialization.
/// JSON cannot carry functions; the emitters replace these quoted tokens
/// with the snippets below.
pub const DATALABEL_FORMATTER_TOKEN: &str = "__SG_DATALABEL_FMT__";
pub const TOOLTIP_LABEL_TOKEN: &str = "__SG_TOOLTIP_LABEL__";
pub const TICK_FORMATTER_TOKEN: &str = "__SG_TICK_FMT__";

/// Value-formatting JS for the given unit hint. Concatenation only; the
/// downstream fragment parser does not evaluate template literals.
pub fn js_value_formatter(hint: FormatHint) -> &'static str {
    match hint {
        FormatHint::Currency => {
            "function(value) { return '$' + Number(value).toLocaleString(); }"
        }
        FormatHint::Percentage => {
            "function(value) { return Number(value).toLocaleString() + '%'; }"
        }
        FormatHint::Number => "function(value) { return Number(value).toLocaleString(); }",
    }
}

/// Datalabel formatter: primitive values formatted per hint.
pub fn js_datalabel_formatter(hint: FormatHint) -> String {
    let inner = js_value_formatter(hint);
    format!("function(value, context) {{ return ({inner})(value); }}")
}

/// Tooltip label callback for object-data charts: surfaces the preserved
/// point label instead of `[object Object]`.
pub fn js_point_tooltip(hint: FormatHint) -> String {
    let fmt = js_value_formatter(hint);
    format!(
        "function(context) {{ var p = context.raw || {{}}; var name = p.label || context.label || ''; return name + ': ' + ({fmt})(p.y); }}"
    )
}

fn is_cartesian(chart_type: ChartType) -> bool {
    matches!(
        chart_type,
        ChartType::Line
            | ChartType::Area
            | ChartType::AreaStacked
            | ChartType::BarVertical
            | ChartType::BarHorizontal
            | ChartType::BarGrouped
            | ChartType::BarStacked
            | ChartType::Scatter
            | ChartType::Bubble
            | ChartType::Waterfall
            | ChartType::Mixed
    )
}

fn is_stacked(chart_type: ChartType) -> bool {
    matches!(chart_type, ChartType::AreaStacked | ChartType::BarStacked)
}

/// Base Chart.js options for a chart type. The enforcement pass re-applies
/// the non-negotiable parts of this after caller merging.
pub fn base_options(
    chart_type: ChartType,
    format_hint: FormatHint,
    palette: &Palette,
    title: Option<&str>,
) -> Value {
    let mut options = json!({
        "responsive": false,
        "maintainAspectRatio": false,
        "animation": { "duration": 300 },
        "plugins": {
            "legend": {
                "display": true,
                "position": "bottom",
                "labels": {
                    "color": palette.text_color,
                    "font": { "family": palette.font_family, "size": palette.label_size }
                }
            },
            "tooltip": { "enabled": true },
            "datalabels": {
                "display": !chart_type.has_object_data(),
                "color": palette.text_color,
                "font": { "family": palette.font_family, "size": palette.label_size, "weight": "600" },
                "formatter": DATALABEL_FORMATTER_TOKEN,
                "anchor": "end",
                "align": "top",
                "clamp": true
            }
        }
    });

    if let Some(text) = title {
        options["plugins"]["title"] = json!({
            "display": true,
            "text": text,
            "color": palette.text_color,
            "font": { "family": palette.font_family, "size": palette.title_size, "weight": "600" }
        });
    }

    if chart_type.has_object_data() {
        options["plugins"]["tooltip"] = json!({
            "enabled": true,
            "callbacks": { "label": TOOLTIP_LABEL_TOKEN }
        });
    }

    if is_cartesian(chart_type) {
        // Horizontal bars put the value axis on x.
        let (category_axis, value_axis) = if chart_type == ChartType::BarHorizontal {
            ("y", "x")
        } else {
            ("x", "y")
        };
        let axis_font = json!({ "family": palette.font_family, "size": palette.label_size });
        options["scales"] = json!({
            category_axis: {
                "grid": { "display": true, "color": palette.grid_color },
                "ticks": { "display": true, "color": palette.text_color, "font": axis_font.clone() },
                "title": {
                    "display": true,
                    "text": "Category",
                    "color": palette.text_color,
                    "font": axis_font.clone()
                }
            },
            value_axis: {
                "grid": { "display": true, "color": palette.grid_color },
                "ticks": {
                    "display": true,
                    "color": palette.text_color,
                    "font": axis_font.clone(),
                    "callback": TICK_FORMATTER_TOKEN
                },
                "title": {
                    "display": true,
                    "text": format_hint.axis_title(),
                    "color": palette.text_color,
                    "font": axis_font
                }
            }
        });
        if chart_type == ChartType::BarHorizontal {
            options["indexAxis"] = json!("y");
        }
        if is_stacked(chart_type) {
            options["scales"]["x"]["stacked"] = json!(true);
            options["scales"]["y"]["stacked"] = json!(true);
        }
    }

    options
}

/// Recursive merge: objects merge key-wise, everything else is replaced by
/// the overlay.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value.clone(),
    }
}

pub(crate) fn set_path(value: &mut Value, path: &[&str], leaf: Value) {
    let mut cursor = value;
    for segment in &path[..path.len() - 1] {
        if !cursor.get(*segment).is_some_and(Value::is_object) {
            cursor[*segment] = json!({});
        }
        cursor = &mut cursor[*segment];
    }
    cursor[path[path.len() - 1]] = leaf;
}

/// The enforcement pass. Runs after caller merging and cannot be undone:
/// legends, tooltips, axes, axis titles and gridlines on; datalabels on for
/// primitive-data charts and off for object-data charts.
pub fn enforce_invariants(
    options: &mut Value,
    chart_type: ChartType,
    format_hint: FormatHint,
    palette: &Palette,
) {
    set_path(options, &["plugins", "legend", "display"], json!(true));
    set_path(options, &["plugins", "tooltip", "enabled"], json!(true));
    set_path(
        options,
        &["plugins", "datalabels", "display"],
        json!(!chart_type.has_object_data()),
    );

    if is_cartesian(chart_type) {
        let value_axis = if chart_type == ChartType::BarHorizontal { "x" } else { "y" };
        for axis in ["x", "y"] {
            set_path(options, &["scales", axis, "grid", "display"], json!(true));
            set_path(options, &["scales", axis, "ticks", "display"], json!(true));
            set_path(options, &["scales", axis, "title", "display"], json!(true));
        }
        // Re-assert the value-axis title text so it cannot be blanked.
        let title = options["scales"][value_axis]["title"]["text"].as_str();
        if title.is_none_or(|t| t.trim().is_empty()) {
            set_path(
                options,
                &["scales", value_axis, "title", "text"],
                json!(format_hint.axis_title()),
            );
            set_path(
                options,
                &["scales", value_axis, "title", "color"],
                json!(palette.text_color),
            );
        }
    }
}
