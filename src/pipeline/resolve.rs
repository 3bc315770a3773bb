//! Analytics-type to chart-type resolution.
//!
//! Precedence: an explicit, valid `chart_type` wins; otherwise the canonical
//! analytics mapping applies; narrative keyword inference is the last resort
//! before the logged `bar_vertical` default.

use crate::catalog;
use crate::error::{ErrorCode, ServiceError};
use crate::pipeline::types::{AnalyticsType, ChartType, Layout};

/// Canonical analytics-type mapping.
pub fn chart_for_analytics(analytics_type: AnalyticsType) -> ChartType {
    match analytics_type {
        AnalyticsType::RevenueOverTime => ChartType::Line,
        AnalyticsType::QuarterlyComparison | AnalyticsType::YoyGrowth => ChartType::BarVertical,
        AnalyticsType::MarketShare => ChartType::Pie,
        AnalyticsType::KpiMetrics => ChartType::Doughnut,
        AnalyticsType::CategoryRanking => ChartType::BarHorizontal,
        AnalyticsType::CorrelationAnalysis => ChartType::Scatter,
        AnalyticsType::MultidimensionalAnalysis => ChartType::Bubble,
        AnalyticsType::MultiMetricComparison => ChartType::Radar,
    }
}

/// Narrative keyword table consulted only when no chart type can be derived
/// otherwise. First match wins; keywords are matched case-insensitively as
/// substrings.
const KEYWORD_TABLE: &[(&str, ChartType)] = &[
    ("over time", ChartType::Line),
    ("trend", ChartType::Line),
    ("trajectory", ChartType::Line),
    ("growth", ChartType::Line),
    ("share", ChartType::Pie),
    ("proportion", ChartType::Pie),
    ("composition", ChartType::Pie),
    ("breakdown", ChartType::Doughnut),
    ("correlat", ChartType::Scatter),
    ("relationship", ChartType::Scatter),
    ("rank", ChartType::BarHorizontal),
    ("top ", ChartType::BarHorizontal),
    ("flow", ChartType::Sankey),
    ("funnel", ChartType::Sankey),
    ("distribution", ChartType::Boxplot),
    ("spread", ChartType::Boxplot),
    ("versus", ChartType::BarVertical),
    ("compar", ChartType::BarVertical),
];

pub fn infer_from_narrative(narrative: &str) -> Option<ChartType> {
    let lowered = narrative.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, chart)| *chart)
}

/// Resolve the chart type for a request.
///
/// An unknown explicit `chart_type` string is rejected with the
/// layout-compatible list in `details`. Inference never fails: if nothing
/// matches it falls back to `bar_vertical` and logs a warning.
pub fn resolve(
    explicit: Option<&str>,
    analytics_type: Option<AnalyticsType>,
    narrative: &str,
    layout: Layout,
) -> Result<ChartType, ServiceError> {
    if let Some(requested) = explicit.filter(|s| !s.is_empty()) {
        let Some(chart) = ChartType::parse(requested) else {
            return Err(ServiceError::new(
                ErrorCode::InvalidChartType,
                format!("unknown chart_type '{requested}'"),
            )
            .with_field("chart_type")
            .with_details(serde_json::json!({
                "compatible": catalog::layout_compatible_ids(layout),
            })));
        };
        let spec = catalog::find_chart_type(chart);
        if !spec.supported_layouts.contains(&layout) {
            return Err(ServiceError::new(
                ErrorCode::InvalidChartType,
                format!(
                    "chart_type '{requested}' is not available for layout {}",
                    layout.as_str()
                ),
            )
            .with_field("chart_type")
            .with_details(serde_json::json!({
                "compatible": catalog::layout_compatible_ids(layout),
            })));
        }
        return Ok(chart);
    }

    if let Some(analytics_type) = analytics_type {
        return Ok(chart_for_analytics(analytics_type));
    }

    if let Some(inferred) = infer_from_narrative(narrative) {
        return Ok(inferred);
    }

    tracing::warn!("no chart type derivable; defaulting to bar_vertical");
    Ok(ChartType::BarVertical)
}
