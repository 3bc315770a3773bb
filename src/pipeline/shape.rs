//! Data shaping: the caller's payload transformed into the shape the target
//! chart family renders.
//!
//! Each chart family wants a different payload; the shaper owns every one of
//! those transformations so the emitters receive exactly the structure they
//! serialize. Scatter and bubble preserve the caller's label on every point
//! for tooltips; bubble radii scale linearly from the value range into
//! [8, 40] px.

use serde::Serialize;

use crate::error::{ErrorCode, ServiceError};
use crate::pipeline::types::{
    AnalyticsType, ChartDataPoint, ChartType, FlowLink, FlowNode, FormatHint, OhlcBar, RequestData,
};

pub const BUBBLE_MIN_RADIUS: f64 = 8.0;
pub const BUBBLE_MAX_RADIUS: f64 = 40.0;

#[derive(Debug, Clone, Serialize)]
pub struct ShapedDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One x/y observation with the caller's label carried as a side channel for
/// tooltips. `r` is present for bubble only.
#[derive(Debug, Clone, Serialize)]
pub struct ShapedPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointDataset {
    pub label: String,
    pub data: Vec<ShapedPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxplotDataset {
    pub label: String,
    pub data: Vec<[f64; 5]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OhlcDataset {
    pub label: String,
    pub data: Vec<OhlcBar>,
}

/// Tagged variant over the per-chart-family payload shapes.
#[derive(Debug, Clone)]
pub enum ShapedChartData {
    SingleSeries {
        labels: Vec<String>,
        values: Vec<f64>,
        format_hint: FormatHint,
    },
    MultiDataset {
        labels: Vec<String>,
        datasets: Vec<ShapedDataset>,
        format_hint: FormatHint,
    },
    PointSeries {
        datasets: Vec<PointDataset>,
        format_hint: FormatHint,
    },
    Matrix {
        x_labels: Vec<String>,
        y_labels: Vec<String>,
        values: Vec<Vec<f64>>,
    },
    Boxplot {
        labels: Vec<String>,
        datasets: Vec<BoxplotDataset>,
    },
    Ohlc {
        labels: Vec<String>,
        datasets: Vec<OhlcDataset>,
    },
    Flow {
        nodes: Vec<FlowNode>,
        links: Vec<FlowLink>,
    },
}

impl ShapedChartData {
    pub fn format_hint(&self) -> FormatHint {
        match self {
            Self::SingleSeries { format_hint, .. }
            | Self::MultiDataset { format_hint, .. }
            | Self::PointSeries { format_hint, .. } => *format_hint,
            _ => FormatHint::Number,
        }
    }
}

/// Derive the value-format hint from the analytics semantics, with narrative
/// cues as tiebreaker for the neutral analytics types.
pub fn derive_format_hint(analytics_type: AnalyticsType, narrative: &str) -> FormatHint {
    match analytics_type {
        AnalyticsType::RevenueOverTime => FormatHint::Currency,
        AnalyticsType::MarketShare | AnalyticsType::YoyGrowth => FormatHint::Percentage,
        _ => {
            let lowered = narrative.to_lowercase();
            if lowered.contains('$') || lowered.contains("revenue") || lowered.contains("cost") {
                FormatHint::Currency
            } else if lowered.contains('%')
                || lowered.contains("share")
                || lowered.contains("percent")
            {
                FormatHint::Percentage
            } else {
                FormatHint::Number
            }
        }
    }
}

fn family_mismatch(chart_type: ChartType, wanted: &str) -> ServiceError {
    ServiceError::new(
        ErrorCode::InvalidDataPoints,
        format!(
            "chart_type '{}' needs a {wanted} payload",
            chart_type.as_str()
        ),
    )
    .with_field("data")
}

/// Scale a value into the bubble radius range. A degenerate range maps every
/// value to the minimum radius.
fn bubble_radius(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        return BUBBLE_MIN_RADIUS;
    }
    BUBBLE_MIN_RADIUS + (value - min) / (max - min) * (BUBBLE_MAX_RADIUS - BUBBLE_MIN_RADIUS)
}

fn point_series(points: &[ChartDataPoint], series_label: &str, with_radius: bool) -> PointDataset {
    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|p| p.value)
        .fold(f64::NEG_INFINITY, f64::max);
    PointDataset {
        label: series_label.to_string(),
        data: points
            .iter()
            .enumerate()
            .map(|(i, p)| ShapedPoint {
                x: i as f64,
                y: p.value,
                label: p.label.clone(),
                r: with_radius.then(|| bubble_radius(p.value, min, max)),
            })
            .collect(),
    }
}

/// Shape validated request data for the resolved chart type.
///
/// `series_label` names the dataset where the family requires one (radar,
/// scatter, bubble, single-dataset multi charts); callers pass the slide
/// title when present.
pub fn shape(
    data: &RequestData,
    chart_type: ChartType,
    format_hint: FormatHint,
    series_label: &str,
) -> Result<ShapedChartData, ServiceError> {
    match chart_type {
        ChartType::Line
        | ChartType::Area
        | ChartType::BarVertical
        | ChartType::BarHorizontal
        | ChartType::Pie
        | ChartType::Doughnut
        | ChartType::PolarArea
        | ChartType::Waterfall
        | ChartType::Treemap => match data {
            RequestData::Points(points) => Ok(ShapedChartData::SingleSeries {
                labels: points.iter().map(|p| p.label.clone()).collect(),
                values: points.iter().map(|p| p.value).collect(),
                format_hint,
            }),
            _ => Err(family_mismatch(chart_type, "label/value point")),
        },

        ChartType::AreaStacked
        | ChartType::BarGrouped
        | ChartType::BarStacked
        | ChartType::Mixed => match data {
            RequestData::Series(series) => Ok(ShapedChartData::MultiDataset {
                labels: series.labels.clone(),
                datasets: series
                    .series
                    .iter()
                    .map(|s| ShapedDataset {
                        label: s.name.clone(),
                        data: s.values.clone(),
                        kind: s.kind.clone(),
                    })
                    .collect(),
                format_hint,
            }),
            RequestData::Points(points) => Ok(ShapedChartData::MultiDataset {
                labels: points.iter().map(|p| p.label.clone()).collect(),
                datasets: vec![ShapedDataset {
                    label: series_label.to_string(),
                    data: points.iter().map(|p| p.value).collect(),
                    kind: None,
                }],
                format_hint,
            }),
            _ => Err(family_mismatch(chart_type, "multi-series or point")),
        },

        // Radar re-keys label/value pairs into axis labels plus one dataset.
        // The dataset list is never empty.
        ChartType::Radar => match data {
            RequestData::Points(points) => Ok(ShapedChartData::MultiDataset {
                labels: points.iter().map(|p| p.label.clone()).collect(),
                datasets: vec![ShapedDataset {
                    label: series_label.to_string(),
                    data: points.iter().map(|p| p.value).collect(),
                    kind: None,
                }],
                format_hint,
            }),
            RequestData::Series(series) => Ok(ShapedChartData::MultiDataset {
                labels: series.labels.clone(),
                datasets: series
                    .series
                    .iter()
                    .map(|s| ShapedDataset {
                        label: s.name.clone(),
                        data: s.values.clone(),
                        kind: None,
                    })
                    .collect(),
                format_hint,
            }),
            _ => Err(family_mismatch(chart_type, "label/value point")),
        },

        ChartType::Scatter => match data {
            RequestData::Points(points) => Ok(ShapedChartData::PointSeries {
                datasets: vec![point_series(points, series_label, false)],
                format_hint,
            }),
            _ => Err(family_mismatch(chart_type, "label/value point")),
        },

        ChartType::Bubble => match data {
            RequestData::Points(points) => Ok(ShapedChartData::PointSeries {
                datasets: vec![point_series(points, series_label, true)],
                format_hint,
            }),
            _ => Err(family_mismatch(chart_type, "label/value point")),
        },

        ChartType::Heatmap => match data {
            RequestData::Matrix(matrix) => Ok(ShapedChartData::Matrix {
                x_labels: matrix.x_labels.clone(),
                y_labels: matrix.y_labels.clone(),
                values: matrix.values.clone(),
            }),
            _ => Err(family_mismatch(chart_type, "matrix")),
        },

        ChartType::Boxplot => match data {
            RequestData::Boxplot(boxplot) => Ok(ShapedChartData::Boxplot {
                labels: boxplot.labels.clone(),
                datasets: vec![BoxplotDataset {
                    label: boxplot
                        .series_name
                        .clone()
                        .unwrap_or_else(|| series_label.to_string()),
                    data: boxplot.rows.clone(),
                }],
            }),
            _ => Err(family_mismatch(chart_type, "boxplot five-number")),
        },

        ChartType::Candlestick => match data {
            RequestData::Ohlc(ohlc) => Ok(ShapedChartData::Ohlc {
                labels: ohlc.labels.clone(),
                datasets: vec![OhlcDataset {
                    label: ohlc
                        .series_name
                        .clone()
                        .unwrap_or_else(|| series_label.to_string()),
                    data: ohlc.bars.clone(),
                }],
            }),
            _ => Err(family_mismatch(chart_type, "OHLC")),
        },

        ChartType::Sankey => match data {
            RequestData::Flow(flow) => Ok(ShapedChartData::Flow {
                nodes: flow.nodes.clone(),
                links: flow.links.clone(),
            }),
            _ => Err(family_mismatch(chart_type, "node/link flow")),
        },
    }
}
