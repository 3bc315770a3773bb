//! HTTP surface: axum router, handlers and shared state.
//!
//! Handlers stay thin: parse path coordinates, enforce the rate window,
//! delegate to the pipeline, count the outcome. All domain failures arrive
//! as [`ServiceError`] and serialize through its `IntoResponse`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use schemars::JsonSchema;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::catalog;
use crate::config::Config;
use crate::error::{ErrorCategory, ErrorCode, ServiceError};
use crate::insight::InsightGenerator;
use crate::pipeline::types::{
    AnalyticsRequest, AnalyticsType, ChartLibrary, ChartType, InsightSource, Layout, RequestData,
    SlideContext, SlideJob,
};
use crate::pipeline::SlideGenerator;
use crate::response::{
    BatchResponse, BatchSlideResult, ChartDataListResponse, ChartDataUpsertResponse,
    ChartTypesResponse, LayoutChartTypesResponse, SlideResponse, StatsResponse,
};
use crate::store::{ChartDataStore, ChartDataUpsert, InMemoryChartStore};

const BATCH_CONCURRENCY: usize = 4;

/// Non-authoritative request counters exposed on `/stats`.
#[derive(Default)]
pub struct Stats {
    requests_total: AtomicU64,
    slides_generated: AtomicU64,
    validation_failures: AtomicU64,
    insight_fallbacks: AtomicU64,
    by_analytics_type: DashMap<&'static str, u64>,
}

impl Stats {
    fn record_outcome(&self, result: &Result<SlideResponse, ServiceError>) {
        match result {
            Ok(response) => {
                self.slides_generated.fetch_add(1, Ordering::Relaxed);
                if response.metadata.insight_source == InsightSource::Fallback {
                    self.insight_fallbacks.fetch_add(1, Ordering::Relaxed);
                }
                *self
                    .by_analytics_type
                    .entry(response.metadata.analytics_type.as_str())
                    .or_insert(0) += 1;
            }
            Err(err) if err.category() == ErrorCategory::Validation => {
                self.validation_failures.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {}
        }
    }

    fn snapshot(&self) -> StatsResponse {
        StatsResponse {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            slides_generated: self.slides_generated.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            insight_fallbacks: self.insight_fallbacks.load(Ordering::Relaxed),
            by_analytics_type: self
                .by_analytics_type
                .iter()
                .map(|entry| ((*entry.key()).to_string(), *entry.value()))
                .collect(),
        }
    }
}

/// Fixed-window per-minute limiter for the analytics endpoints. A limit of
/// zero disables it.
pub struct RateLimiter {
    limit: u32,
    window: Mutex<(i64, u32)>,
}

impl RateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            window: Mutex::new((0, 0)),
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.limit == 0 {
            return Ok(());
        }
        let now = chrono::Utc::now().timestamp();
        let minute = now / 60;
        let mut window = self
            .window
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if window.0 != minute {
            *window = (minute, 0);
        }
        if window.1 >= self.limit {
            let retry_after = (60 - now.rem_euclid(60)) as u64;
            return Err(ServiceError::rate_limited(retry_after));
        }
        window.1 += 1;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<SlideGenerator>,
    pub store: Arc<dyn ChartDataStore>,
    pub stats: Arc<Stats>,
    pub rate_limiter: Arc<RateLimiter>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let generator = SlideGenerator::new(
            InsightGenerator::from_env(),
            config.default_theme,
            config.chart_data_base_url.clone(),
        );
        Self {
            generator: Arc::new(generator),
            store: Arc::new(InMemoryChartStore::new()),
            stats: Arc::new(Stats::default()),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_per_minute)),
            request_timeout: config.request_timeout,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/analytics/{layout}/{analytics_type}",
            post(generate_slide),
        )
        .route("/api/v1/analytics/batch", post(generate_batch))
        .route("/api/v1/chart-types", get(list_chart_types))
        .route("/api/v1/chart-types/{selector}", get(chart_types_selector))
        .route(
            "/api/v1/layouts/{layout}/chart-types",
            get(layout_chart_types),
        )
        .route("/api/v1/chart-data", post(upsert_chart_data))
        .route("/api/v1/chart-data/{presentation_id}", get(get_chart_data))
        .route("/health", get(|| async { "ok" }))
        .route("/stats", get(stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn parse_layout(raw: &str) -> Result<Layout, ServiceError> {
    Layout::parse(raw).ok_or_else(|| {
        ServiceError::new(ErrorCode::InvalidLayout, format!("unknown layout '{raw}'"))
            .with_field("layout")
            .with_details(serde_json::json!({
                "allowed": Layout::ALL.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            }))
    })
}

fn parse_analytics_type(raw: &str) -> Result<AnalyticsType, ServiceError> {
    AnalyticsType::parse(raw).ok_or_else(|| {
        ServiceError::new(
            ErrorCode::InvalidAnalyticsType,
            format!("unknown analytics_type '{raw}'"),
        )
        .with_field("analytics_type")
        .with_details(serde_json::json!({
            "allowed": AnalyticsType::ALL.iter().map(|a| a.as_str()).collect::<Vec<_>>(),
        }))
    })
}

async fn run_job(state: &AppState, job: SlideJob) -> Result<SlideResponse, ServiceError> {
    let result = match tokio::time::timeout(
        state.request_timeout,
        state.generator.generate_slide(job),
    )
    .await
    {
        Ok(result) => result,
        // Deadline expiry cancels the in-flight subtasks with the future.
        Err(_) => Err(ServiceError::chart_generation("request deadline exceeded")),
    };
    state.stats.record_outcome(&result);
    result
}

async fn generate_slide(
    State(state): State<AppState>,
    Path((layout, analytics_type)): Path<(String, String)>,
    Json(request): Json<AnalyticsRequest>,
) -> Result<Json<SlideResponse>, ServiceError> {
    state.stats.requests_total.fetch_add(1, Ordering::Relaxed);
    state.rate_limiter.check()?;
    let layout = parse_layout(&layout)?;
    let analytics_type = parse_analytics_type(&analytics_type)?;
    let job = SlideJob {
        request,
        analytics_type,
        layout,
    };
    run_job(&state, job).await.map(Json)
}

/// One slide inside a batch request: the per-slide body plus its own
/// coordinates.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchSlide {
    pub slide_id: String,
    pub slide_number: u32,
    pub narrative: String,
    pub data: RequestData,
    #[serde(default)]
    pub context: Option<SlideContext>,
    #[serde(default)]
    pub constraints: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub chart_type: Option<String>,
    pub analytics_type: String,
    pub layout: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchRequest {
    pub presentation_id: String,
    pub slides: Vec<BatchSlide>,
}

async fn process_batch_slide(
    state: &AppState,
    presentation_id: &str,
    slide: BatchSlide,
) -> BatchSlideResult {
    let slide_id = slide.slide_id.clone();
    let result = async {
        let layout = parse_layout(&slide.layout)?;
        let analytics_type = parse_analytics_type(&slide.analytics_type)?;
        let job = SlideJob {
            request: AnalyticsRequest {
                presentation_id: presentation_id.to_string(),
                slide_id: slide.slide_id,
                slide_number: slide.slide_number,
                narrative: slide.narrative,
                data: slide.data,
                context: slide.context,
                constraints: slide.constraints,
                chart_type: slide.chart_type,
            },
            analytics_type,
            layout,
        };
        run_job(state, job).await
    }
    .await;

    match result {
        Ok(response) => BatchSlideResult {
            success: true,
            slide_id,
            content: Some(response.content),
            metadata: Some(response.metadata),
            error: None,
        },
        Err(err) => BatchSlideResult {
            success: false,
            slide_id,
            content: None,
            metadata: None,
            error: Some(err.envelope().error),
        },
    }
}

async fn generate_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ServiceError> {
    state.stats.requests_total.fetch_add(1, Ordering::Relaxed);
    state.rate_limiter.check()?;

    let presentation_id = request.presentation_id.clone();
    // Bounded fan-out, input order preserved; one failed slide never fails
    // the batch.
    let slides: Vec<BatchSlideResult> = stream::iter(request.slides)
        .map(|slide| process_batch_slide(&state, &presentation_id, slide))
        .buffered(BATCH_CONCURRENCY)
        .collect()
        .await;

    let successful = slides.iter().filter(|s| s.success).count();
    Ok(Json(BatchResponse {
        total: slides.len(),
        successful,
        presentation_id: request.presentation_id,
        slides,
    }))
}

async fn list_chart_types() -> Json<ChartTypesResponse> {
    let chart_types = catalog::all_chart_types();
    let chartjs = chart_types
        .iter()
        .filter(|s| s.library == ChartLibrary::Chartjs)
        .count();
    let summary = format!(
        "{} chart types available: {} chartjs, {} apexcharts",
        chart_types.len(),
        chartjs,
        chart_types.len() - chartjs
    );
    Json(ChartTypesResponse {
        summary,
        chart_types,
    })
}

/// `{selector}` is a library name or a chart id; a library filters, an id
/// returns the single spec.
async fn chart_types_selector(
    Path(selector): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    if let Some(library) = ChartLibrary::parse(&selector) {
        let chart_types = catalog::by_library(library);
        return Ok(Json(serde_json::json!({
            "summary": format!("{} {} chart types", chart_types.len(), library.as_str()),
            "chart_types": chart_types,
        })));
    }
    let Some(chart_type) = ChartType::parse(&selector) else {
        return Err(ServiceError::new(
            ErrorCode::ChartNotFound,
            format!("unknown chart type '{selector}'"),
        )
        .with_details(serde_json::json!({
            "known": ChartType::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        })));
    };
    Ok(Json(
        serde_json::to_value(catalog::find_chart_type(chart_type)).unwrap_or_default(),
    ))
}

async fn layout_chart_types(
    Path(layout): Path<String>,
) -> Result<Json<LayoutChartTypesResponse>, ServiceError> {
    let layout = parse_layout(&layout)?;
    Ok(Json(LayoutChartTypesResponse {
        layout,
        chart_types: catalog::by_layout(layout),
    }))
}

async fn upsert_chart_data(
    State(state): State<AppState>,
    Json(upsert): Json<ChartDataUpsert>,
) -> Result<Json<ChartDataUpsertResponse>, ServiceError> {
    if upsert.chart_id.trim().is_empty() {
        return Err(ServiceError::empty_field("chart_id"));
    }
    if upsert.presentation_id.trim().is_empty() {
        return Err(ServiceError::empty_field("presentation_id"));
    }
    let updated_at = state.store.upsert(upsert).await?;
    Ok(Json(ChartDataUpsertResponse { updated_at }))
}

async fn get_chart_data(
    State(state): State<AppState>,
    Path(presentation_id): Path<String>,
) -> Result<Json<ChartDataListResponse>, ServiceError> {
    let records = state.store.for_presentation(&presentation_id).await?;
    Ok(Json(ChartDataListResponse {
        presentation_id,
        records,
    }))
}

async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.stats.snapshot())
}
