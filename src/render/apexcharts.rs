//! ApexCharts option builders for the four types ApexCharts renders
//! natively: treemap, heatmap, boxplot, candlestick. Same contract as the
//! Chart.js builders: a JSON options value, merged with caller options, then
//! an enforcement pass that caller options cannot undo.

use serde_json::{json, Value};

use crate::error::ServiceError;
use crate::pipeline::shape::ShapedChartData;
use crate::pipeline::types::{ChartType, FormatHint};
use crate::render::theme::Palette;

fn mismatch(chart_type: ChartType) -> ServiceError {
    ServiceError::chart_generation(format!(
        "shaped data does not match chart_type '{}'",
        chart_type.as_str()
    ))
}

pub fn apex_type(chart_type: ChartType) -> &'static str {
    match chart_type {
        ChartType::Treemap => "treemap",
        ChartType::Heatmap => "heatmap",
        ChartType::Boxplot => "boxPlot",
        ChartType::Candlestick => "candlestick",
        _ => "bar",
    }
}

pub fn build_options(
    shaped: &ShapedChartData,
    chart_type: ChartType,
    format_hint: FormatHint,
    palette: &Palette,
    title: Option<&str>,
    width: u32,
    height: u32,
) -> Result<Value, ServiceError> {
    let series = build_series(shaped, chart_type, palette)?;
    let mut options = json!({
        "chart": {
            "type": apex_type(chart_type),
            "width": width,
            "height": height,
            "fontFamily": palette.font_family,
            "toolbar": { "show": false },
            "animations": { "enabled": false }
        },
        "series": series,
        "colors": palette.colors,
        "legend": { "show": true, "position": "bottom" },
        "tooltip": { "enabled": true },
        "dataLabels": { "enabled": true },
        "grid": { "show": true, "borderColor": palette.grid_color },
        "xaxis": {
            "labels": { "show": true, "style": { "colors": palette.text_color } }
        },
        "yaxis": {
            "labels": { "show": true, "style": { "colors": palette.text_color } },
            "title": { "text": format_hint.axis_title(), "style": { "color": palette.text_color } }
        }
    });
    if let Some(text) = title {
        options["title"] = json!({
            "text": text,
            "style": { "color": palette.text_color, "fontWeight": 600 }
        });
    }
    if chart_type == ChartType::Heatmap {
        options["plotOptions"] = json!({
            "heatmap": { "shadeIntensity": 0.6, "radius": 2 }
        });
    }
    Ok(options)
}

fn build_series(
    shaped: &ShapedChartData,
    chart_type: ChartType,
    _palette: &Palette,
) -> Result<Value, ServiceError> {
    match chart_type {
        ChartType::Treemap => {
            let ShapedChartData::SingleSeries { labels, values, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            let tiles: Vec<Value> = labels
                .iter()
                .zip(values)
                .map(|(label, value)| json!({ "x": label, "y": value }))
                .collect();
            Ok(json!([{ "data": tiles }]))
        }

        // One apex series per y label, one cell per x label.
        ChartType::Heatmap => {
            let ShapedChartData::Matrix { x_labels, y_labels, values } = shaped else {
                return Err(mismatch(chart_type));
            };
            let rows: Vec<Value> = y_labels
                .iter()
                .zip(values)
                .map(|(y_label, row)| {
                    let cells: Vec<Value> = x_labels
                        .iter()
                        .zip(row)
                        .map(|(x_label, value)| json!({ "x": x_label, "y": value }))
                        .collect();
                    json!({ "name": y_label, "data": cells })
                })
                .collect();
            Ok(json!(rows))
        }

        ChartType::Boxplot => {
            let ShapedChartData::Boxplot { labels, datasets } = shaped else {
                return Err(mismatch(chart_type));
            };
            let Some(dataset) = datasets.first() else {
                return Err(ServiceError::chart_generation("boxplot requires a dataset"));
            };
            let boxes: Vec<Value> = labels
                .iter()
                .zip(&dataset.data)
                .map(|(label, row)| json!({ "x": label, "y": row }))
                .collect();
            Ok(json!([{ "name": dataset.label, "type": "boxPlot", "data": boxes }]))
        }

        ChartType::Candlestick => {
            let ShapedChartData::Ohlc { labels, datasets } = shaped else {
                return Err(mismatch(chart_type));
            };
            let Some(dataset) = datasets.first() else {
                return Err(ServiceError::chart_generation("candlestick requires a dataset"));
            };
            let bars: Vec<Value> = labels
                .iter()
                .zip(&dataset.data)
                .map(|(label, bar)| json!({ "x": label, "y": [bar.o, bar.h, bar.l, bar.c] }))
                .collect();
            Ok(json!([{ "name": dataset.label, "data": bars }]))
        }

        _ => Err(mismatch(chart_type)),
    }
}

/// Enforcement pass for ApexCharts options; mirrors the Chart.js pass.
pub fn enforce_invariants(options: &mut Value, format_hint: FormatHint) {
    use crate::render::options::set_path;

    set_path(options, &["legend", "show"], json!(true));
    set_path(options, &["tooltip", "enabled"], json!(true));
    set_path(options, &["dataLabels", "enabled"], json!(true));
    set_path(options, &["grid", "show"], json!(true));
    set_path(options, &["xaxis", "labels", "show"], json!(true));
    set_path(options, &["yaxis", "labels", "show"], json!(true));
    let title = options["yaxis"]["title"]["text"].as_str();
    if title.is_none_or(|t| t.trim().is_empty()) {
        set_path(options, &["yaxis", "title", "text"], json!(format_hint.axis_title()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::shape::BoxplotDataset;
    use crate::pipeline::types::Theme;
    use crate::render::options::deep_merge;

    fn palette() -> Palette {
        Palette::for_theme(Theme::Professional)
    }

    #[test]
    fn heatmap_series_mirror_the_matrix() {
        let shaped = ShapedChartData::Matrix {
            x_labels: vec!["Mon".into(), "Tue".into()],
            y_labels: vec!["Week 1".into(), "Week 2".into()],
            values: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        };
        let options = build_options(
            &shaped,
            ChartType::Heatmap,
            FormatHint::Number,
            &palette(),
            None,
            600,
            400,
        )
        .unwrap();
        assert_eq!(options["chart"]["type"], "heatmap");
        assert_eq!(options["series"][0]["name"], "Week 1");
        assert_eq!(options["series"][1]["data"][1]["y"], 4.0);
    }

    #[test]
    fn caller_cannot_hide_apex_legend() {
        let shaped = ShapedChartData::Boxplot {
            labels: vec!["a".into(), "b".into()],
            datasets: vec![BoxplotDataset {
                label: "Spread".into(),
                data: vec![[1.0, 2.0, 3.0, 4.0, 5.0], [2.0, 3.0, 4.0, 5.0, 6.0]],
            }],
        };
        let mut options = build_options(
            &shaped,
            ChartType::Boxplot,
            FormatHint::Number,
            &palette(),
            None,
            600,
            400,
        )
        .unwrap();
        deep_merge(
            &mut options,
            &json!({ "legend": { "show": false }, "dataLabels": { "enabled": false } }),
        );
        enforce_invariants(&mut options, FormatHint::Number);
        assert_eq!(options["legend"]["show"], json!(true));
        assert_eq!(options["dataLabels"]["enabled"], json!(true));
    }
}
