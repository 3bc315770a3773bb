//! Request and domain types for the slide generation pipeline.
//!
//! The closed enums here are the contract: analytics types name the business
//! question, chart types name the visual form, layouts name the slide
//! template. Dispatch over them is exhaustive; adding a variant without
//! handling it everywhere is a compile error.

use garde::Validate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Slide composition template. Fixed pixel dimensions per layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Layout {
    L01,
    L02,
    L03,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::L01, Layout::L02, Layout::L03];

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::L01 => "L01",
            Layout::L02 => "L02",
            Layout::L03 => "L03",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "L01" | "l01" => Some(Layout::L01),
            "L02" | "l02" => Some(Layout::L02),
            "L03" | "l03" => Some(Layout::L03),
            _ => None,
        }
    }
}

/// Caller-facing semantic label naming the business question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsType {
    RevenueOverTime,
    QuarterlyComparison,
    MarketShare,
    YoyGrowth,
    KpiMetrics,
    CategoryRanking,
    CorrelationAnalysis,
    MultidimensionalAnalysis,
    MultiMetricComparison,
}

impl AnalyticsType {
    pub const ALL: [AnalyticsType; 9] = [
        AnalyticsType::RevenueOverTime,
        AnalyticsType::QuarterlyComparison,
        AnalyticsType::MarketShare,
        AnalyticsType::YoyGrowth,
        AnalyticsType::KpiMetrics,
        AnalyticsType::CategoryRanking,
        AnalyticsType::CorrelationAnalysis,
        AnalyticsType::MultidimensionalAnalysis,
        AnalyticsType::MultiMetricComparison,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalyticsType::RevenueOverTime => "revenue_over_time",
            AnalyticsType::QuarterlyComparison => "quarterly_comparison",
            AnalyticsType::MarketShare => "market_share",
            AnalyticsType::YoyGrowth => "yoy_growth",
            AnalyticsType::KpiMetrics => "kpi_metrics",
            AnalyticsType::CategoryRanking => "category_ranking",
            AnalyticsType::CorrelationAnalysis => "correlation_analysis",
            AnalyticsType::MultidimensionalAnalysis => "multidimensional_analysis",
            AnalyticsType::MultiMetricComparison => "multi_metric_comparison",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

/// Rendering library a chart type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartLibrary {
    Chartjs,
    Apexcharts,
}

impl ChartLibrary {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartLibrary::Chartjs => "chartjs",
            ChartLibrary::Apexcharts => "apexcharts",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chartjs" => Some(ChartLibrary::Chartjs),
            "apexcharts" => Some(ChartLibrary::Apexcharts),
            _ => None,
        }
    }
}

/// Visual form the answer takes. `heatmap` accepts the alias `matrix`,
/// `candlestick` the alias `financial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Line,
    Area,
    AreaStacked,
    BarVertical,
    BarHorizontal,
    BarGrouped,
    BarStacked,
    Pie,
    Doughnut,
    Scatter,
    Bubble,
    Radar,
    PolarArea,
    Waterfall,
    Mixed,
    Treemap,
    #[serde(alias = "matrix")]
    Heatmap,
    Boxplot,
    #[serde(alias = "financial")]
    Candlestick,
    Sankey,
}

/// Editor table family; decides the column headers and the data shape the
/// save handler rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFamily {
    /// Label / Value columns.
    LabelValue,
    /// X / Y columns.
    Xy,
    /// X / Y / Radius columns.
    Xyr,
}

impl ChartType {
    pub const ALL: [ChartType; 20] = [
        ChartType::Line,
        ChartType::Area,
        ChartType::AreaStacked,
        ChartType::BarVertical,
        ChartType::BarHorizontal,
        ChartType::BarGrouped,
        ChartType::BarStacked,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::Scatter,
        ChartType::Bubble,
        ChartType::Radar,
        ChartType::PolarArea,
        ChartType::Waterfall,
        ChartType::Mixed,
        ChartType::Treemap,
        ChartType::Heatmap,
        ChartType::Boxplot,
        ChartType::Candlestick,
        ChartType::Sankey,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::AreaStacked => "area_stacked",
            ChartType::BarVertical => "bar_vertical",
            ChartType::BarHorizontal => "bar_horizontal",
            ChartType::BarGrouped => "bar_grouped",
            ChartType::BarStacked => "bar_stacked",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Radar => "radar",
            ChartType::PolarArea => "polar_area",
            ChartType::Waterfall => "waterfall",
            ChartType::Mixed => "mixed",
            ChartType::Treemap => "treemap",
            ChartType::Heatmap => "heatmap",
            ChartType::Boxplot => "boxplot",
            ChartType::Candlestick => "candlestick",
            ChartType::Sankey => "sankey",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "matrix" => Some(ChartType::Heatmap),
            "financial" => Some(ChartType::Candlestick),
            other => Self::ALL.into_iter().find(|c| c.as_str() == other),
        }
    }

    /// Which library renders this type. The four plugin-era types that
    /// ApexCharts supports natively render there; everything else is
    /// Chart.js (sankey via its chart plugin).
    pub fn library(self) -> ChartLibrary {
        match self {
            ChartType::Treemap
            | ChartType::Heatmap
            | ChartType::Boxplot
            | ChartType::Candlestick => ChartLibrary::Apexcharts,
            _ => ChartLibrary::Chartjs,
        }
    }

    /// Chart types whose data points are structured objects rather than
    /// primitives. Datalabels are suppressed for exactly these.
    pub fn has_object_data(self) -> bool {
        matches!(self, ChartType::Scatter | ChartType::Bubble)
    }

    pub fn editor_family(self) -> EditorFamily {
        match self {
            ChartType::Scatter => EditorFamily::Xy,
            ChartType::Bubble => EditorFamily::Xyr,
            _ => EditorFamily::LabelValue,
        }
    }
}

/// Named color/typography palette for emitted fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Professional,
    Corporate,
    Vibrant,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Professional => "professional",
            Theme::Corporate => "corporate",
            Theme::Vibrant => "vibrant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "professional" => Some(Theme::Professional),
            "corporate" => Some(Theme::Corporate),
            "vibrant" => Some(Theme::Vibrant),
            _ => None,
        }
    }
}

/// Unit hint for axis titles and value formatting in emitted fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    Currency,
    Percentage,
    Number,
}

impl FormatHint {
    pub fn axis_title(self) -> &'static str {
        match self {
            FormatHint::Currency => "Amount ($)",
            FormatHint::Percentage => "Percentage (%)",
            FormatHint::Number => "Value",
        }
    }
}

/// One labelled observation. Equality is on the label; labels must be unique
/// within a request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ChartDataPoint {
    #[garde(length(min = 1, max = 100))]
    pub label: String,
    #[garde(custom(validate_finite))]
    pub value: f64,
}

fn validate_finite(value: &f64, _ctx: &()) -> garde::Result {
    if value.is_finite() {
        Ok(())
    } else {
        Err(garde::Error::new("value must be a finite number"))
    }
}

/// One named series in a multi-series payload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SeriesEntry {
    pub name: String,
    pub values: Vec<f64>,
    /// Per-dataset render type override, only meaningful for `mixed`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MultiSeriesData {
    pub labels: Vec<String>,
    pub series: Vec<SeriesEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MatrixData {
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct OhlcBar {
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OhlcData {
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    pub bars: Vec<OhlcBar>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FlowNode {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FlowLink {
    pub source: String,
    pub target: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FlowData {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

/// Five-number summaries per label: `[min, q1, median, q3, max]` rows.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BoxplotData {
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    pub rows: Vec<[f64; 5]>,
}

/// The caller's dataset in one of the accepted payload containers. Key sets
/// are disjoint, so untagged deserialization is unambiguous.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RequestData {
    Points(Vec<ChartDataPoint>),
    Series(MultiSeriesData),
    Matrix(MatrixData),
    Flow(FlowData),
    Ohlc(OhlcData),
    Boxplot(BoxplotData),
}

impl RequestData {
    /// Number of primitive observations, used for range validation and
    /// response metadata.
    pub fn point_count(&self) -> usize {
        match self {
            RequestData::Points(points) => points.len(),
            RequestData::Series(s) => s.labels.len(),
            RequestData::Matrix(m) => m.x_labels.len() * m.y_labels.len(),
            RequestData::Flow(f) => f.links.len(),
            RequestData::Ohlc(o) => o.bars.len(),
            RequestData::Boxplot(b) => b.rows.len(),
        }
    }
}

/// Optional presentation context passed through to fragments and prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SlideContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_name: Option<String>,
}

/// Per-slide request body for `POST /api/v1/analytics/{layout}/{analytics_type}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct AnalyticsRequest {
    /// Identifier of the presentation this slide belongs to.
    #[garde(length(min = 1, max = 128))]
    pub presentation_id: String,
    /// Identifier of the slide within the presentation.
    #[garde(length(min = 1, max = 128))]
    pub slide_id: String,
    /// 1-based slide position.
    #[garde(range(min = 1))]
    pub slide_number: u32,
    /// Narrative description driving chart inference and observations.
    #[garde(length(min = 1, max = 2000))]
    pub narrative: String,
    #[garde(skip)]
    pub data: RequestData,
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<SlideContext>,
    /// Opaque caller options; recognized keys: `editor` (bool),
    /// `chart_options` (merged into the chart config before enforcement),
    /// `company_logo`.
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<serde_json::Map<String, serde_json::Value>>,
    /// Explicit chart type; overrides the analytics-type mapping when valid.
    #[garde(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
}

/// A fully addressed unit of work: body plus the path-derived coordinates.
#[derive(Debug, Clone)]
pub struct SlideJob {
    pub request: AnalyticsRequest,
    pub analytics_type: AnalyticsType,
    pub layout: Layout,
}

/// One self-contained chart fragment plus its addressing metadata.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChartArtifact {
    pub chart_id: String,
    pub html_fragment: String,
    pub library: ChartLibrary,
    pub chart_type: ChartType,
    pub width: u32,
    pub height: u32,
}

/// Where an insight's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Llm,
    Fallback,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Insight {
    pub text: String,
    pub source: InsightSource,
}

/// Response content map. Absent element keys are not emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SlideContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
}

/// Deterministic chart id, stable across retries for the same
/// (presentation_id, slide_id, sequence).
pub fn chart_id(presentation_id: &str, slide_id: &str, sequence: u32) -> String {
    let name = format!("{presentation_id}:{slide_id}:{sequence}");
    let id = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, name.as_bytes());
    format!("chart_{}", id.simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_type_roundtrip_and_aliases() {
        for ct in ChartType::ALL {
            assert_eq!(ChartType::parse(ct.as_str()), Some(ct));
        }
        assert_eq!(ChartType::parse("matrix"), Some(ChartType::Heatmap));
        assert_eq!(ChartType::parse("financial"), Some(ChartType::Candlestick));
        assert_eq!(ChartType::parse("gauge"), None);
    }

    #[test]
    fn analytics_type_closed_set() {
        assert_eq!(AnalyticsType::ALL.len(), 9);
        for at in AnalyticsType::ALL {
            assert_eq!(AnalyticsType::parse(at.as_str()), Some(at));
        }
        assert_eq!(AnalyticsType::parse("sentiment"), None);
    }

    #[test]
    fn chart_id_is_deterministic_and_unique_per_slide() {
        let a = chart_id("pres-1", "slide-1", 1);
        let b = chart_id("pres-1", "slide-1", 1);
        let c = chart_id("pres-1", "slide-2", 1);
        let d = chart_id("pres-1", "slide-1", 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert!(a.starts_with("chart_"));
    }

    #[test]
    fn request_data_untagged_deserialization() {
        let points: RequestData =
            serde_json::from_str(r#"[{"label":"Q1","value":1.0},{"label":"Q2","value":2.0}]"#)
                .unwrap();
        assert!(matches!(points, RequestData::Points(ref p) if p.len() == 2));

        let matrix: RequestData = serde_json::from_str(
            r#"{"x_labels":["a"],"y_labels":["b"],"values":[[1.0]]}"#,
        )
        .unwrap();
        assert!(matches!(matrix, RequestData::Matrix(_)));

        let flow: RequestData = serde_json::from_str(
            r#"{"nodes":[{"id":"a"},{"id":"b"}],"links":[{"source":"a","target":"b","value":3.0}]}"#,
        )
        .unwrap();
        assert!(matches!(flow, RequestData::Flow(_)));

        let ohlc: RequestData = serde_json::from_str(
            r#"{"labels":["d1"],"bars":[{"o":1.0,"h":2.0,"l":0.5,"c":1.5}]}"#,
        )
        .unwrap();
        assert!(matches!(ohlc, RequestData::Ohlc(_)));

        let boxplot: RequestData =
            serde_json::from_str(r#"{"labels":["d1"],"rows":[[1.0,2.0,3.0,4.0,5.0]]}"#).unwrap();
        assert!(matches!(boxplot, RequestData::Boxplot(_)));
    }

    #[test]
    fn object_data_types_are_exactly_scatter_and_bubble() {
        let object_data: Vec<_> = ChartType::ALL
            .into_iter()
            .filter(|c| c.has_object_data())
            .collect();
        assert_eq!(object_data, vec![ChartType::Scatter, ChartType::Bubble]);
    }
}
