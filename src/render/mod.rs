//! Chart HTML generation.
//!
//! Each emitted fragment is self-contained: a fixed-size container, the
//! loader script tags its renderer needs (exactly once per fragment), a
//! mount element, optionally the editor overlay, and an IIFE-wrapped
//! initializer that constructs the chart and registers the instance in
//! `window.__slideCharts` keyed by chart id. The initializer introduces no
//! identifier into the global scope; everything lives inside the IIFE.

pub mod apexcharts;
pub mod chartjs;
pub mod editor;
pub mod options;
pub mod theme;

use serde_json::Value;

use crate::error::ServiceError;
use crate::pipeline::shape::ShapedChartData;
use crate::pipeline::types::{ChartArtifact, ChartLibrary, ChartType, FormatHint, Theme};
use editor::EditorContext;
use options::{
    deep_merge, enforce_invariants, js_datalabel_formatter, js_point_tooltip, js_value_formatter,
    DATALABEL_FORMATTER_TOKEN, TICK_FORMATTER_TOKEN, TOOLTIP_LABEL_TOKEN,
};
use theme::Palette;

const CHARTJS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.3/dist/chart.umd.min.js";
const DATALABELS_CDN: &str =
    "https://cdn.jsdelivr.net/npm/chartjs-plugin-datalabels@2.2.0/dist/chartjs-plugin-datalabels.min.js";
const SANKEY_CDN: &str =
    "https://cdn.jsdelivr.net/npm/chartjs-chart-sankey@0.12.1/dist/chartjs-chart-sankey.min.js";
const APEXCHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/apexcharts@3.49.2/dist/apexcharts.min.js";

/// Everything an emitter needs to produce one fragment.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub shaped: &'a ShapedChartData,
    pub chart_type: ChartType,
    pub chart_id: &'a str,
    pub presentation_id: &'a str,
    pub theme: Theme,
    pub width: u32,
    pub height: u32,
    pub title: Option<&'a str>,
    pub editor: bool,
    pub data_base_url: &'a str,
    pub caller_options: Option<&'a Value>,
}

/// Chart types that carry the editor overlay: single-dataset Chart.js
/// families whose data the family tables can represent.
pub fn editor_supported(chart_type: ChartType) -> bool {
    matches!(
        chart_type,
        ChartType::Line
            | ChartType::Area
            | ChartType::BarVertical
            | ChartType::BarHorizontal
            | ChartType::Pie
            | ChartType::Doughnut
            | ChartType::PolarArea
            | ChartType::Radar
            | ChartType::Scatter
            | ChartType::Bubble
    )
}

/// Escape a JSON blob for embedding inside a `<script>` element.
fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}

pub(crate) fn js_string(value: &str) -> String {
    script_safe(serde_json::to_string(value).unwrap_or_default())
}

fn swap_callback_tokens(json: String, hint: FormatHint) -> String {
    json.replace(
        &format!("\"{DATALABEL_FORMATTER_TOKEN}\""),
        &js_datalabel_formatter(hint),
    )
    .replace(&format!("\"{TOOLTIP_LABEL_TOKEN}\""), &js_point_tooltip(hint))
    .replace(&format!("\"{TICK_FORMATTER_TOKEN}\""), js_value_formatter(hint))
}

pub fn generate(request: &RenderRequest<'_>) -> Result<ChartArtifact, ServiceError> {
    let library = request.chart_type.library();
    let html_fragment = match library {
        ChartLibrary::Chartjs => chartjs_fragment(request)?,
        ChartLibrary::Apexcharts => apex_fragment(request)?,
    };
    Ok(ChartArtifact {
        chart_id: request.chart_id.to_string(),
        html_fragment,
        library,
        chart_type: request.chart_type,
        width: request.width,
        height: request.height,
    })
}

fn container_open(width: u32, height: u32) -> String {
    format!(
        "<div style=\"width: {width}px; height: {height}px; background: white; padding: 20px; box-sizing: border-box; position: relative;\">"
    )
}

fn loader_tags(library: ChartLibrary, chart_type: ChartType) -> String {
    match library {
        ChartLibrary::Chartjs => {
            let mut tags = format!(
                "<script src=\"{CHARTJS_CDN}\"></script>\n<script src=\"{DATALABELS_CDN}\"></script>\n"
            );
            if chart_type == ChartType::Sankey {
                tags.push_str(&format!("<script src=\"{SANKEY_CDN}\"></script>\n"));
            }
            tags
        }
        ChartLibrary::Apexcharts => format!("<script src=\"{APEXCHARTS_CDN}\"></script>\n"),
    }
}

fn chartjs_fragment(request: &RenderRequest<'_>) -> Result<String, ServiceError> {
    let palette = Palette::for_theme(request.theme);
    let hint = request.shaped.format_hint();
    let mut config = chartjs::build_config(
        request.shaped,
        request.chart_type,
        hint,
        &palette,
        request.title,
    )?;
    if let Some(caller) = request.caller_options {
        deep_merge(&mut config["options"], caller);
    }
    enforce_invariants(&mut config["options"], request.chart_type, hint, &palette);

    let config_json = swap_callback_tokens(
        script_safe(serde_json::to_string(&config).map_err(|e| {
            ServiceError::chart_generation(format!("config serialization failed: {e}"))
        })?),
        hint,
    );

    let cid = request.chart_id;
    let inner_width = request.width.saturating_sub(40);
    let inner_height = request.height.saturating_sub(40);
    let with_editor = request.editor && editor_supported(request.chart_type);

    let editor_ctx = EditorContext {
        chart_id: cid,
        presentation_id: request.presentation_id,
        data_base_url: request.data_base_url,
    };
    let editor_markup = if with_editor {
        editor::markup(&editor_ctx, request.chart_type.editor_family())
    } else {
        String::new()
    };
    let editor_script = if with_editor {
        editor::script(&editor_ctx, request.chart_type.editor_family())
    } else {
        String::new()
    };
    let boot = if with_editor {
        concat!(
            "    loadSavedData(function(saved) {\n",
            "      if (saved) { applySavedData(saved); }\n",
            "      var chart = new Chart(canvas.getContext('2d'), config);\n",
            "      registry[chartId] = chart;\n",
            "      initEditor(chart);\n",
            "    });\n",
        )
    } else {
        concat!(
            "    var chart = new Chart(canvas.getContext('2d'), config);\n",
            "    registry[chartId] = chart;\n",
        )
    };

    let mut fragment = container_open(request.width, request.height);
    fragment.push('\n');
    fragment.push_str(&loader_tags(ChartLibrary::Chartjs, request.chart_type));
    fragment.push_str(&format!(
        "<canvas id=\"{cid}\" width=\"{inner_width}\" height=\"{inner_height}\"></canvas>\n"
    ));
    fragment.push_str(&editor_markup);
    if !editor_markup.is_empty() {
        fragment.push('\n');
    }
    fragment.push_str("<script>\n(function() {\n");
    fragment.push_str(&format!("var chartId = '{cid}';\n"));
    fragment.push_str(&format!("var config = {config_json};\n"));
    fragment.push_str(&editor_script);
    fragment.push_str(concat!(
        "var mountChart = function() {\n",
        "  var canvas = document.getElementById(chartId);\n",
        "  if (!canvas || typeof Chart === 'undefined') { setTimeout(mountChart, 50); return; }\n",
        "  if (typeof ChartDataLabels !== 'undefined') { Chart.register(ChartDataLabels); }\n",
        "  var registry = window.__slideCharts = window.__slideCharts || {};\n",
    ));
    fragment.push_str(boot);
    fragment.push_str("};\nmountChart();\n})();\n</script>\n</div>");
    Ok(fragment)
}

fn apex_fragment(request: &RenderRequest<'_>) -> Result<String, ServiceError> {
    let palette = Palette::for_theme(request.theme);
    let hint = request.shaped.format_hint();
    let inner_width = request.width.saturating_sub(40);
    let inner_height = request.height.saturating_sub(40);
    let mut apex_options = apexcharts::build_options(
        request.shaped,
        request.chart_type,
        hint,
        &palette,
        request.title,
        inner_width,
        inner_height,
    )?;
    if let Some(caller) = request.caller_options {
        deep_merge(&mut apex_options, caller);
    }
    apexcharts::enforce_invariants(&mut apex_options, hint);

    let options_json = script_safe(serde_json::to_string(&apex_options).map_err(|e| {
        ServiceError::chart_generation(format!("options serialization failed: {e}"))
    })?);

    let cid = request.chart_id;
    let mut fragment = container_open(request.width, request.height);
    fragment.push('\n');
    fragment.push_str(&loader_tags(ChartLibrary::Apexcharts, request.chart_type));
    fragment.push_str(&format!("<div id=\"{cid}\"></div>\n"));
    fragment.push_str("<script>\n(function() {\n");
    fragment.push_str(&format!("var chartId = '{cid}';\n"));
    fragment.push_str(&format!("var chartOptions = {options_json};\n"));
    fragment.push_str(concat!(
        "var mountChart = function() {\n",
        "  var el = document.getElementById(chartId);\n",
        "  if (!el || typeof ApexCharts === 'undefined') { setTimeout(mountChart, 50); return; }\n",
        "  var registry = window.__slideCharts = window.__slideCharts || {};\n",
        "  var chart = new ApexCharts(el, chartOptions);\n",
        "  chart.render();\n",
        "  registry[chartId] = chart;\n",
        "};\nmountChart();\n",
    ));
    fragment.push_str("})();\n</script>\n</div>");
    Ok(fragment)
}
