//! Deterministic prompt construction. Identical inputs produce identical
//! prompts, which keeps the generator idempotent over identical requests.

use crate::pipeline::summary::DataSummary;
use crate::pipeline::types::{AnalyticsType, ChartType, Layout};

fn layout_instruction(layout: Layout) -> &'static str {
    match layout {
        Layout::L02 => {
            "Write 2-3 short paragraphs of slide observations, 500 characters at most, separated by blank lines."
        }
        Layout::L01 | Layout::L03 => {
            "Write one concise paragraph of slide observations, 250 characters at most."
        }
    }
}

fn describe(summary: &DataSummary) -> String {
    let mut parts = vec![format!("{} data points", summary.count)];
    parts.push(format!("total {:.2}", summary.total));
    parts.push(format!("mean {:.2}", summary.mean));
    if let Some(max) = &summary.max {
        parts.push(format!("highest '{}' at {:.2}", max.label, max.value));
    }
    if let Some(min) = &summary.min {
        parts.push(format!("lowest '{}' at {:.2}", min.label, min.value));
    }
    if let Some((from, to, delta)) = &summary.largest_delta {
        parts.push(format!("largest move {delta:+.2} from '{from}' to '{to}'"));
    }
    if let Some(growth) = summary.growth_pct {
        parts.push(format!("first-to-last change {growth:+.1}%"));
    }
    parts.join("; ")
}

pub fn build_prompt(
    narrative: &str,
    summary: &DataSummary,
    analytics_type: AnalyticsType,
    chart_type: ChartType,
    layout: Layout,
    audience: Option<&str>,
) -> String {
    let audience_line = audience
        .filter(|a| !a.is_empty())
        .map(|a| format!("Audience: {a}.\n"))
        .unwrap_or_default();
    format!(
        "You are writing presenter observations for a business slide.\n\
         Analysis focus: {analytics}.\n\
         Chart shown: {chart}.\n\
         {audience_line}\
         Narrative from the author: {narrative}\n\
         Data summary: {data}.\n\
         {instruction}\n\
         Plain text only, no headings, no bullet markers.",
        analytics = analytics_type.as_str().replace('_', " "),
        chart = chart_type.as_str().replace('_', " "),
        audience_line = audience_line,
        narrative = narrative,
        data = describe(summary),
        instruction = layout_instruction(layout),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::shape::ShapedChartData;
    use crate::pipeline::types::FormatHint;

    #[test]
    fn prompt_is_deterministic_and_mentions_the_budget() {
        let shaped = ShapedChartData::SingleSeries {
            labels: vec!["Q1".into(), "Q2".into()],
            values: vec![10.0, 20.0],
            format_hint: FormatHint::Currency,
        };
        let summary = DataSummary::from_shaped(&shaped);
        let build = || {
            build_prompt(
                "Revenue ramp",
                &summary,
                AnalyticsType::RevenueOverTime,
                ChartType::Line,
                Layout::L02,
                Some("executives"),
            )
        };
        assert_eq!(build(), build());
        assert!(build().contains("500 characters"));
        assert!(build().contains("Audience: executives."));
    }
}
