//! Wire-level success response types.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use crate::catalog::ChartTypeSpec;
use crate::error::ErrorBody;
use crate::pipeline::types::{
    AnalyticsType, ChartLibrary, ChartType, InsightSource, Layout, SlideContent, Theme,
};

pub const SERVICE_NAME: &str = "slidegraph";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ResponseMetadata {
    pub service: &'static str,
    pub version: &'static str,
    pub library: ChartLibrary,
    pub layout: Layout,
    pub chart_type: ChartType,
    pub analytics_type: AnalyticsType,
    pub data_points: usize,
    pub generation_time_ms: u64,
    pub theme: Theme,
    pub generated_at: DateTime<Utc>,
    pub insight_source: InsightSource,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SlideResponse {
    pub content: SlideContent,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchSlideResult {
    pub success: bool,
    pub slide_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<SlideContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchResponse {
    pub presentation_id: String,
    pub slides: Vec<BatchSlideResult>,
    pub total: usize,
    pub successful: usize,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChartTypesResponse {
    pub summary: String,
    pub chart_types: Vec<ChartTypeSpec>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct LayoutChartTypesResponse {
    pub layout: Layout,
    pub chart_types: Vec<ChartTypeSpec>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct StatsResponse {
    pub requests_total: u64,
    pub slides_generated: u64,
    pub validation_failures: u64,
    pub insight_fallbacks: u64,
    pub by_analytics_type: std::collections::BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChartDataUpsertResponse {
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChartDataListResponse {
    pub presentation_id: String,
    pub records: Vec<crate::store::ChartRecord>,
}
