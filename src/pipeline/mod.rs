//! The slide generation pipeline.
//!
//! Single entry: validate → resolve → shape → chart generation and insight
//! generation fanned out concurrently → assemble. Chart failure is fatal;
//! insight failure degrades to the deterministic fallback inside the
//! generator, so only a provider rate limit can surface from that side.
//! The first failure in the concurrent section cancels the sibling task
//! instead of driving it to completion.

pub mod assemble;
pub mod resolve;
pub mod shape;
pub mod summary;
pub mod types;
pub mod validate;

use std::time::Instant;

use chrono::Utc;

use crate::catalog;
use crate::error::{ErrorCode, ServiceError};
use crate::insight::{InsightGenerator, InsightParams};
use crate::pipeline::assemble::{chart_dimensions, SlideChrome};
use crate::pipeline::summary::DataSummary;
use crate::pipeline::types::{
    chart_id, ChartArtifact, ChartType, Insight, Layout, SlideJob, Theme,
};
use crate::render::{self, RenderRequest};
use crate::response::{ResponseMetadata, SlideResponse, SERVICE_NAME, SERVICE_VERSION};

pub struct SlideGenerator {
    insight: InsightGenerator,
    default_theme: Theme,
    chart_data_base_url: String,
}

/// Concurrent fan-out for the two generation subtasks. `try_join!` returns
/// on the first error and drops the sibling future, so a fatal chart
/// failure cancels an in-flight insight call immediately (and a surfaced
/// rate limit cancels chart generation).
async fn generate_concurrently<C, I>(
    charts_fut: C,
    insight_fut: I,
) -> Result<(Vec<ChartArtifact>, Insight), ServiceError>
where
    C: std::future::Future<Output = Result<Vec<ChartArtifact>, ServiceError>>,
    I: std::future::Future<Output = Result<Insight, ServiceError>>,
{
    futures::try_join!(charts_fut, insight_fut)
}

/// Companion chart for the second L03 panel: a complementary view of the
/// same data.
fn companion_chart_type(primary: ChartType) -> ChartType {
    match primary {
        ChartType::BarVertical
        | ChartType::BarHorizontal
        | ChartType::BarGrouped
        | ChartType::BarStacked => ChartType::Line,
        _ => ChartType::BarVertical,
    }
}

impl SlideGenerator {
    pub fn new(
        insight: InsightGenerator,
        default_theme: Theme,
        chart_data_base_url: String,
    ) -> Self {
        Self {
            insight,
            default_theme,
            chart_data_base_url,
        }
    }

    pub async fn generate_slide(&self, job: SlideJob) -> Result<SlideResponse, ServiceError> {
        let started = Instant::now();
        let job = validate::validate(job)?;
        let request = &job.request;

        let chart_type = resolve::resolve(
            request.chart_type.as_deref(),
            Some(job.analytics_type),
            &request.narrative,
            job.layout,
        )?;

        let spec = catalog::find_chart_type(chart_type);
        let data_points = request.data.point_count();
        if data_points < spec.min_points || data_points > spec.max_points {
            return Err(ServiceError::new(
                ErrorCode::DataRangeError,
                format!(
                    "{} charts take between {} and {} data points, got {data_points}",
                    chart_type.as_str(),
                    spec.min_points,
                    spec.max_points
                ),
            )
            .with_details(serde_json::json!({
                "count": data_points,
                "min": spec.min_points,
                "max": spec.max_points,
            })));
        }

        let context = request.context.clone().unwrap_or_default();
        let theme = context
            .theme
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or(self.default_theme);
        let series_label = context.slide_title.clone().unwrap_or_else(|| "Series".to_string());
        let format_hint = shape::derive_format_hint(job.analytics_type, &request.narrative);
        let shaped = shape::shape(&request.data, chart_type, format_hint, &series_label)?;
        let data_summary = DataSummary::from_shaped(&shaped);

        let constraints = request.constraints.clone().unwrap_or_default();
        let editor = constraints
            .get("editor")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true);
        let caller_options = constraints.get("chart_options").cloned();
        let company_logo = constraints
            .get("company_logo")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string);

        let (width, height) = chart_dimensions(job.layout);
        let title = context.slide_title.clone();

        let charts_fut = async {
            let primary_id = chart_id(&request.presentation_id, &request.slide_id, 1);
            let primary = render::generate(&RenderRequest {
                shaped: &shaped,
                chart_type,
                chart_id: &primary_id,
                presentation_id: &request.presentation_id,
                theme,
                width,
                height,
                title: title.as_deref(),
                editor,
                data_base_url: &self.chart_data_base_url,
                caller_options: caller_options.as_ref(),
            })?;

            let mut artifacts = vec![primary];
            if job.layout == Layout::L03 {
                artifacts.push(self.render_companion(
                    &job,
                    chart_type,
                    &shaped,
                    theme,
                    width,
                    height,
                    title.as_deref(),
                    caller_options.as_ref(),
                )?);
            }
            Ok::<Vec<ChartArtifact>, ServiceError>(artifacts)
        };

        let insight_params = InsightParams {
            narrative: &request.narrative,
            summary: &data_summary,
            analytics_type: job.analytics_type,
            chart_type,
            layout: job.layout,
            audience: context.audience.as_deref(),
            format_hint,
        };
        let insight_fut = self.insight.generate(&insight_params);

        let (charts, insight) = generate_concurrently(charts_fut, insight_fut).await?;

        let chrome = SlideChrome {
            slide_title: context.slide_title.clone(),
            subtitle: context.subtitle.clone(),
            presentation_name: context.presentation_name.clone(),
            company_logo,
        };
        let content = assemble::assemble(job.layout, &charts, &insight, &chrome)?;

        Ok(SlideResponse {
            content,
            metadata: ResponseMetadata {
                service: SERVICE_NAME,
                version: SERVICE_VERSION,
                library: chart_type.library(),
                layout: job.layout,
                chart_type,
                analytics_type: job.analytics_type,
                data_points,
                generation_time_ms: started.elapsed().as_millis() as u64,
                theme,
                generated_at: Utc::now(),
                insight_source: insight.source,
            },
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn render_companion(
        &self,
        job: &SlideJob,
        primary: ChartType,
        primary_shaped: &shape::ShapedChartData,
        theme: Theme,
        width: u32,
        height: u32,
        title: Option<&str>,
        caller_options: Option<&serde_json::Value>,
    ) -> Result<ChartArtifact, ServiceError> {
        let request = &job.request;
        let secondary_id = chart_id(&request.presentation_id, &request.slide_id, 2);
        let companion = companion_chart_type(primary);
        let format_hint = primary_shaped.format_hint();
        let series_label = title.unwrap_or("Series");

        // Container payloads may not reshape into the companion family; fall
        // back to a second rendering of the primary type.
        let (companion_type, companion_shaped) =
            match shape::shape(&request.data, companion, format_hint, series_label) {
                Ok(shaped) => (companion, shaped),
                Err(_) => (primary, primary_shaped.clone()),
            };

        render::generate(&RenderRequest {
            shaped: &companion_shaped,
            chart_type: companion_type,
            chart_id: &secondary_id,
            presentation_id: &request.presentation_id,
            theme,
            width,
            height,
            title,
            editor: false,
            data_base_url: &self.chart_data_base_url,
            caller_options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::InsightGenerator;
    use crate::pipeline::types::{
        AnalyticsRequest, AnalyticsType, ChartDataPoint, InsightSource, RequestData,
    };
    use std::time::Duration;

    fn generator() -> SlideGenerator {
        SlideGenerator::new(
            InsightGenerator::new(None, Duration::from_secs(1)),
            Theme::Professional,
            String::new(),
        )
    }

    fn job(analytics_type: AnalyticsType, layout: Layout, pairs: &[(&str, f64)]) -> SlideJob {
        SlideJob {
            request: AnalyticsRequest {
                presentation_id: "pres-1".into(),
                slide_id: "slide-1".into(),
                slide_number: 1,
                narrative: "Quarterly revenue grew strongly through the year".into(),
                data: RequestData::Points(
                    pairs
                        .iter()
                        .map(|(label, value)| ChartDataPoint {
                            label: (*label).to_string(),
                            value: *value,
                        })
                        .collect(),
                ),
                context: None,
                constraints: None,
                chart_type: None,
            },
            analytics_type,
            layout,
        }
    }

    #[tokio::test]
    async fn l02_revenue_request_produces_line_chart_and_observations() {
        let response = generator()
            .generate_slide(job(
                AnalyticsType::RevenueOverTime,
                Layout::L02,
                &[("Q1", 125_000.0), ("Q2", 145_000.0), ("Q3", 195_000.0), ("Q4", 220_000.0)],
            ))
            .await
            .unwrap();

        assert_eq!(response.metadata.chart_type, ChartType::Line);
        let chart = response.content.element_3.unwrap();
        assert!(chart.contains("\"type\":\"line\""));
        assert!(chart.contains("Amount ($)"));
        let panel = response.content.element_2.unwrap();
        assert!(panel.contains("width: 540px"));
    }

    #[tokio::test]
    async fn chart_ids_are_stable_across_retries() {
        let first = generator()
            .generate_slide(job(
                AnalyticsType::MarketShare,
                Layout::L02,
                &[("NA", 45.0), ("EU", 30.0), ("APAC", 20.0), ("Other", 5.0)],
            ))
            .await
            .unwrap();
        let second = generator()
            .generate_slide(job(
                AnalyticsType::MarketShare,
                Layout::L02,
                &[("NA", 45.0), ("EU", 30.0), ("APAC", 20.0), ("Other", 5.0)],
            ))
            .await
            .unwrap();
        // the deterministic chart portion is byte-identical
        assert_eq!(first.content.element_3, second.content.element_3);
    }

    #[tokio::test]
    async fn catalog_bounds_are_enforced_per_chart_type() {
        // pie takes at most 8 slices
        let pairs: Vec<(String, f64)> = (0..9).map(|i| (format!("s{i}"), 1.0)).collect();
        let refs: Vec<(&str, f64)> = pairs.iter().map(|(l, v)| (l.as_str(), *v)).collect();
        let err = generator()
            .generate_slide(job(AnalyticsType::MarketShare, Layout::L02, &refs))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DataRangeError);
        assert_eq!(err.details.unwrap()["max"], 8);
    }

    #[tokio::test]
    async fn l03_produces_two_charts_and_two_descriptions() {
        let response = generator()
            .generate_slide(job(
                AnalyticsType::QuarterlyComparison,
                Layout::L03,
                &[("Q1", 10.0), ("Q2", 20.0), ("Q3", 30.0)],
            ))
            .await
            .unwrap();
        let left = response.content.element_4.unwrap();
        let right = response.content.element_2.unwrap();
        assert!(left.contains("\"type\":\"bar\""));
        assert!(right.contains("\"type\":\"line\""));
        assert_ne!(left, right);
        assert!(response.content.element_3.is_some());
        assert!(response.content.element_5.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_chart_failure_cancels_the_insight_task() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let insight_finished = Arc::new(AtomicBool::new(false));
        let flag = insight_finished.clone();
        let insight_fut = async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(Insight {
                text: "late observations".into(),
                source: InsightSource::Fallback,
            })
        };
        let charts_fut = async {
            Err::<Vec<ChartArtifact>, ServiceError>(ServiceError::chart_generation(
                "emitter failed",
            ))
        };

        let err = generate_concurrently(charts_fut, insight_fut)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ChartGenerationFailed);
        assert!(
            !insight_finished.load(Ordering::SeqCst),
            "insight task was driven to completion after a fatal chart failure"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn surfaced_rate_limit_cancels_the_chart_task() {
        let charts_fut = async {
            futures::future::pending::<()>().await;
            Ok::<Vec<ChartArtifact>, ServiceError>(Vec::new())
        };
        let insight_fut = async { Err::<Insight, ServiceError>(ServiceError::rate_limited(30)) };

        let err = generate_concurrently(charts_fut, insight_fut)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RateLimitExceeded);
    }

    #[tokio::test]
    async fn editor_can_be_disabled_via_constraints() {
        let mut j = job(
            AnalyticsType::RevenueOverTime,
            Layout::L02,
            &[("Q1", 1.0), ("Q2", 2.0)],
        );
        let mut constraints = serde_json::Map::new();
        constraints.insert("editor".into(), serde_json::json!(false));
        j.request.constraints = Some(constraints);
        let response = generator().generate_slide(j).await.unwrap();
        assert!(!response.content.element_3.unwrap().contains("Edit Data"));
    }
}
