//! Chart.js config builders: one function per native family, each producing
//! the full `{type, data, options}` config as a JSON value. The caller
//! merges constraints and runs the enforcement pass before serialization.

use serde_json::{json, Value};

use crate::error::ServiceError;
use crate::pipeline::shape::ShapedChartData;
use crate::pipeline::types::{ChartType, FormatHint};
use crate::render::options::base_options;
use crate::render::theme::Palette;

fn mismatch(chart_type: ChartType) -> ServiceError {
    ServiceError::chart_generation(format!(
        "shaped data does not match chart_type '{}'",
        chart_type.as_str()
    ))
}

/// The Chart.js `type` discriminator for each supported chart type.
pub fn chartjs_type(chart_type: ChartType) -> &'static str {
    match chart_type {
        ChartType::Line | ChartType::Area => "line",
        ChartType::AreaStacked => "line",
        ChartType::BarVertical
        | ChartType::BarHorizontal
        | ChartType::BarGrouped
        | ChartType::BarStacked
        | ChartType::Waterfall
        | ChartType::Mixed => "bar",
        ChartType::Pie => "pie",
        ChartType::Doughnut => "doughnut",
        ChartType::Scatter => "scatter",
        ChartType::Bubble => "bubble",
        ChartType::Radar => "radar",
        ChartType::PolarArea => "polarArea",
        ChartType::Sankey => "sankey",
        // Rendered by ApexCharts; never reaches a Chart.js config.
        ChartType::Treemap | ChartType::Heatmap | ChartType::Boxplot | ChartType::Candlestick => {
            "bar"
        }
    }
}

pub fn build_config(
    shaped: &ShapedChartData,
    chart_type: ChartType,
    format_hint: FormatHint,
    palette: &Palette,
    title: Option<&str>,
) -> Result<Value, ServiceError> {
    let data = build_data(shaped, chart_type, palette)?;
    let options = base_options(chart_type, format_hint, palette, title);
    Ok(json!({
        "type": chartjs_type(chart_type),
        "data": data,
        "options": options,
    }))
}

fn build_data(
    shaped: &ShapedChartData,
    chart_type: ChartType,
    palette: &Palette,
) -> Result<Value, ServiceError> {
    match chart_type {
        ChartType::Line | ChartType::Area => {
            let ShapedChartData::SingleSeries { labels, values, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            let fill = chart_type == ChartType::Area;
            let background = if fill {
                palette.color_with_alpha(0, 0.2)
            } else {
                palette.color(0).to_string()
            };
            Ok(json!({
                "labels": labels,
                "datasets": [{
                    "label": "Value",
                    "data": values,
                    "borderColor": palette.color(0),
                    "backgroundColor": background,
                    "borderWidth": 3,
                    "pointRadius": 4,
                    "pointBackgroundColor": palette.color(0),
                    "fill": fill,
                    "tension": 0.3
                }]
            }))
        }

        ChartType::BarVertical | ChartType::BarHorizontal => {
            let ShapedChartData::SingleSeries { labels, values, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            let colors: Vec<&str> = (0..values.len()).map(|i| palette.color(i)).collect();
            Ok(json!({
                "labels": labels,
                "datasets": [{
                    "label": "Value",
                    "data": values,
                    "backgroundColor": colors,
                    "borderRadius": 4
                }]
            }))
        }

        ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea => {
            let ShapedChartData::SingleSeries { labels, values, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            let colors: Vec<&str> = (0..values.len()).map(|i| palette.color(i)).collect();
            Ok(json!({
                "labels": labels,
                "datasets": [{
                    "data": values,
                    "backgroundColor": colors,
                    "borderColor": "#ffffff",
                    "borderWidth": 2
                }]
            }))
        }

        ChartType::AreaStacked | ChartType::BarGrouped | ChartType::BarStacked | ChartType::Mixed => {
            let ShapedChartData::MultiDataset { labels, datasets, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            let rendered: Vec<Value> = datasets
                .iter()
                .enumerate()
                .map(|(i, dataset)| {
                    let mut entry = json!({
                        "label": dataset.label,
                        "data": dataset.data,
                        "backgroundColor": palette.color(i),
                        "borderColor": palette.color(i),
                    });
                    match chart_type {
                        ChartType::AreaStacked => {
                            entry["fill"] = json!(true);
                            entry["backgroundColor"] = json!(palette.color_with_alpha(i, 0.35));
                            entry["tension"] = json!(0.3);
                        }
                        ChartType::Mixed => {
                            let kind = dataset.kind.as_deref().unwrap_or("bar");
                            entry["type"] = json!(kind);
                            if kind == "line" {
                                entry["tension"] = json!(0.3);
                                entry["borderWidth"] = json!(3);
                            }
                        }
                        _ => {
                            entry["borderRadius"] = json!(4);
                        }
                    }
                    entry
                })
                .collect();
            Ok(json!({ "labels": labels, "datasets": rendered }))
        }

        ChartType::Radar => {
            let ShapedChartData::MultiDataset { labels, datasets, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            if datasets.is_empty() {
                return Err(ServiceError::chart_generation("radar requires a dataset"));
            }
            let rendered: Vec<Value> = datasets
                .iter()
                .enumerate()
                .map(|(i, dataset)| {
                    json!({
                        "label": dataset.label,
                        "data": dataset.data,
                        "borderColor": palette.color(i),
                        "backgroundColor": palette.color_with_alpha(i, 0.25),
                        "pointBackgroundColor": palette.color(i),
                        "borderWidth": 2,
                        "fill": true
                    })
                })
                .collect();
            Ok(json!({ "labels": labels, "datasets": rendered }))
        }

        ChartType::Scatter => {
            let ShapedChartData::PointSeries { datasets, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            let rendered: Vec<Value> = datasets
                .iter()
                .enumerate()
                .map(|(i, dataset)| {
                    json!({
                        "label": dataset.label,
                        "data": dataset.data,
                        // opaque fill, never rgba
                        "backgroundColor": palette.color(i),
                        "borderColor": palette.color(i),
                        "pointRadius": 10,
                        "pointHoverRadius": 12
                    })
                })
                .collect();
            Ok(json!({ "datasets": rendered }))
        }

        ChartType::Bubble => {
            let ShapedChartData::PointSeries { datasets, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            let rendered: Vec<Value> = datasets
                .iter()
                .enumerate()
                .map(|(i, dataset)| {
                    json!({
                        "label": dataset.label,
                        "data": dataset.data,
                        "backgroundColor": palette.color_with_alpha(i, 0.7),
                        "borderColor": palette.color(i),
                        "borderWidth": 1
                    })
                })
                .collect();
            Ok(json!({ "datasets": rendered }))
        }

        // Floating bars: each step spans [running, running + delta].
        ChartType::Waterfall => {
            let ShapedChartData::SingleSeries { labels, values, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            let mut running = 0.0_f64;
            let mut spans = Vec::with_capacity(values.len());
            let mut colors = Vec::with_capacity(values.len());
            for delta in values {
                let start = running;
                running += delta;
                spans.push(json!([start, running]));
                colors.push(if *delta >= 0.0 {
                    palette.color(2)
                } else {
                    palette.color(5)
                });
            }
            Ok(json!({
                "labels": labels,
                "datasets": [{
                    "label": "Change",
                    "data": spans,
                    "backgroundColor": colors,
                    "borderRadius": 4
                }]
            }))
        }

        ChartType::Sankey => {
            let ShapedChartData::Flow { links, .. } = shaped else {
                return Err(mismatch(chart_type));
            };
            let flows: Vec<Value> = links
                .iter()
                .map(|link| json!({ "from": link.source, "to": link.target, "flow": link.value }))
                .collect();
            Ok(json!({
                "datasets": [{
                    "label": "Flow",
                    "data": flows,
                    "colorFrom": palette.color(0),
                    "colorTo": palette.color(1),
                    "colorMode": "gradient"
                }]
            }))
        }

        ChartType::Treemap | ChartType::Heatmap | ChartType::Boxplot | ChartType::Candlestick => {
            Err(mismatch(chart_type))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::shape::{PointDataset, ShapedPoint};
    use crate::pipeline::types::Theme;

    fn palette() -> Palette {
        Palette::for_theme(Theme::Professional)
    }

    #[test]
    fn line_config_has_the_line_discriminator() {
        let shaped = ShapedChartData::SingleSeries {
            labels: vec!["Q1".into(), "Q2".into()],
            values: vec![1.0, 2.0],
            format_hint: FormatHint::Currency,
        };
        let config =
            build_config(&shaped, ChartType::Line, FormatHint::Currency, &palette(), None).unwrap();
        assert_eq!(config["type"], "line");
        assert_eq!(config["data"]["labels"][0], "Q1");
        assert_eq!(config["data"]["datasets"][0]["fill"], false);
    }

    #[test]
    fn scatter_points_keep_labels_and_big_radius() {
        let shaped = ShapedChartData::PointSeries {
            datasets: vec![PointDataset {
                label: "S".into(),
                data: vec![ShapedPoint { x: 0.0, y: 95.0, label: "Jan - $20K".into(), r: None }],
            }],
            format_hint: FormatHint::Number,
        };
        let config =
            build_config(&shaped, ChartType::Scatter, FormatHint::Number, &palette(), None)
                .unwrap();
        let dataset = &config["data"]["datasets"][0];
        assert_eq!(dataset["pointRadius"], 10);
        assert_eq!(dataset["data"][0]["label"], "Jan - $20K");
        // opaque hex color, not an rgba with alpha
        assert!(dataset["backgroundColor"].as_str().unwrap().starts_with('#'));
    }

    #[test]
    fn waterfall_emits_floating_spans() {
        let shaped = ShapedChartData::SingleSeries {
            labels: vec!["start".into(), "up".into(), "down".into()],
            values: vec![100.0, 30.0, -20.0],
            format_hint: FormatHint::Number,
        };
        let config =
            build_config(&shaped, ChartType::Waterfall, FormatHint::Number, &palette(), None)
                .unwrap();
        let spans = &config["data"]["datasets"][0]["data"];
        assert_eq!(spans[0], json!([0.0, 100.0]));
        assert_eq!(spans[1], json!([100.0, 130.0]));
        assert_eq!(spans[2], json!([130.0, 110.0]));
    }

    #[test]
    fn mismatched_shape_is_a_generation_failure() {
        let shaped = ShapedChartData::SingleSeries {
            labels: vec!["a".into(), "b".into()],
            values: vec![1.0, 2.0],
            format_hint: FormatHint::Number,
        };
        let err = build_config(&shaped, ChartType::Scatter, FormatHint::Number, &palette(), None)
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ChartGenerationFailed);
    }
}
