//! Insight generation: LLM-backed observations with a deterministic
//! fallback.
//!
//! The generator is never fatal to a slide: any provider failure, timeout or
//! empty completion falls back to the data-derived summary text. The single
//! exception is a provider rate limit, which the pipeline surfaces as
//! `RATE_LIMIT_EXCEEDED` so callers can honor `retry_after`.

pub mod fallback;
pub mod prompt;
pub mod provider;

use std::time::Duration;

use crate::error::ServiceError;
use crate::pipeline::summary::DataSummary;
use crate::pipeline::types::{
    AnalyticsType, ChartType, FormatHint, Insight, InsightSource, Layout,
};
use provider::{LlmCallError, LlmClient};

/// Observed character budgets per layout.
pub const L02_CHAR_BUDGET: usize = 500;
pub const PANEL_CHAR_BUDGET: usize = 250;

pub const DEFAULT_SOFT_TIMEOUT_SECS: u64 = 10;

const COMPLETION_MAX_TOKENS: u32 = 300;

pub fn char_budget(layout: Layout) -> usize {
    match layout {
        Layout::L02 => L02_CHAR_BUDGET,
        Layout::L01 => PANEL_CHAR_BUDGET,
        // Two description panels; the assembler re-truncates each half.
        Layout::L03 => 2 * PANEL_CHAR_BUDGET,
    }
}

/// Truncate to the budget on a word boundary, marking the cut with an
/// ellipsis. The result never exceeds `budget` characters.
pub fn truncate_to(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let keep = budget.saturating_sub(1);
    let cut: String = text.chars().take(keep).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > keep / 2 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}\u{2026}", trimmed.trim_end())
}

pub struct InsightParams<'a> {
    pub narrative: &'a str,
    pub summary: &'a DataSummary,
    pub analytics_type: AnalyticsType,
    pub chart_type: ChartType,
    pub layout: Layout,
    pub audience: Option<&'a str>,
    pub format_hint: FormatHint,
}

pub struct InsightGenerator {
    client: Option<LlmClient>,
    soft_timeout: Duration,
}

impl InsightGenerator {
    pub fn new(client: Option<LlmClient>, soft_timeout: Duration) -> Self {
        Self { client, soft_timeout }
    }

    pub fn from_env() -> Self {
        let soft_timeout = std::env::var("INSIGHT_SOFT_TIMEOUT_S")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SOFT_TIMEOUT_SECS);
        Self::new(LlmClient::from_env(), Duration::from_secs(soft_timeout))
    }

    pub fn model(&self) -> Option<&str> {
        self.client.as_ref().map(LlmClient::model)
    }

    /// Generate observations for a slide. Always returns a usable insight
    /// except on provider rate limiting.
    pub async fn generate(&self, params: &InsightParams<'_>) -> Result<Insight, ServiceError> {
        let budget = char_budget(params.layout);

        if let Some(client) = &self.client {
            let prompt = prompt::build_prompt(
                params.narrative,
                params.summary,
                params.analytics_type,
                params.chart_type,
                params.layout,
                params.audience,
            );
            match tokio::time::timeout(
                self.soft_timeout,
                client.complete(&prompt, COMPLETION_MAX_TOKENS),
            )
            .await
            {
                Ok(Ok(text)) => {
                    return Ok(Insight {
                        text: truncate_to(&text, budget),
                        source: InsightSource::Llm,
                    });
                }
                Ok(Err(LlmCallError::RateLimited { retry_after })) => {
                    return Err(ServiceError::rate_limited(retry_after));
                }
                Ok(Err(LlmCallError::Failed(reason))) => {
                    tracing::warn!(%reason, "llm call failed; using fallback insight");
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_s = self.soft_timeout.as_secs(),
                        "llm call timed out; using fallback insight"
                    );
                }
            }
        }

        let text = fallback::generate(params.analytics_type, params.summary, params.format_hint);
        Ok(Insight {
            text: truncate_to(&text, budget),
            source: InsightSource::Fallback,
        })
    }
}
