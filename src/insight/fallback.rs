//! Deterministic fallback observations built from the data summary.
//!
//! Produces usable slide text for every analytics type without any external
//! call, so the pipeline never surfaces an insight failure to the client.

use crate::pipeline::summary::DataSummary;
use crate::pipeline::types::{AnalyticsType, FormatHint};

fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Render a value for prose per the unit hint.
pub fn format_value(hint: FormatHint, value: f64) -> String {
    let whole = value.fract().abs() < 1e-9 && value.abs() < 1e15;
    match hint {
        FormatHint::Currency => {
            if whole {
                format!("${}", group_thousands(value as i64))
            } else {
                format!("${value:.2}")
            }
        }
        FormatHint::Percentage => {
            if whole {
                format!("{}%", group_thousands(value as i64))
            } else {
                format!("{value:.1}%")
            }
        }
        FormatHint::Number => {
            if whole {
                group_thousands(value as i64)
            } else {
                format!("{value:.1}")
            }
        }
    }
}

fn share_of_total(value: f64, total: f64) -> Option<f64> {
    (total.abs() > f64::EPSILON).then(|| value / total * 100.0)
}

pub fn generate(analytics_type: AnalyticsType, summary: &DataSummary, hint: FormatHint) -> String {
    let fmt = |v: f64| format_value(hint, v);
    let max = summary.max.as_ref();
    let min = summary.min.as_ref();

    match analytics_type {
        AnalyticsType::RevenueOverTime => {
            let mut text = format!(
                "Total across the {} periods reached {}.",
                summary.count,
                fmt(summary.total)
            );
            if let (Some(growth), Some(first), Some(last)) =
                (summary.growth_pct, &summary.first, &summary.last)
            {
                text.push_str(&format!(
                    " That is {growth:+.1}% from {} to {}.",
                    first.label, last.label
                ));
            }
            let mut detail = String::new();
            if let (Some(max), Some(min)) = (max, min) {
                detail.push_str(&format!(
                    "{} was the strongest period at {}, while {} trailed at {}.",
                    max.label,
                    fmt(max.value),
                    min.label,
                    fmt(min.value)
                ));
            }
            if let Some((from, to, delta)) = &summary.largest_delta {
                detail.push_str(&format!(
                    " The largest single move was {} between {from} and {to}.",
                    fmt(delta.abs())
                ));
            }
            join_paragraphs(text, detail)
        }

        AnalyticsType::QuarterlyComparison | AnalyticsType::YoyGrowth => {
            let mut text = format!("Across {} periods the average was {}.", summary.count, fmt(summary.mean));
            if let (Some(max), Some(min)) = (max, min) {
                text = format!(
                    "{} leads at {}, ahead of {} at {}.",
                    max.label,
                    fmt(max.value),
                    min.label,
                    fmt(min.value)
                );
            }
            let detail = summary
                .growth_pct
                .map(|growth| format!("End-to-end the series moved {growth:+.1}%, averaging {}.", fmt(summary.mean)))
                .unwrap_or_default();
            join_paragraphs(text, detail)
        }

        AnalyticsType::MarketShare => {
            let mut text = String::new();
            if let Some(max) = max {
                text.push_str(&format!("{} holds the largest share at {}", max.label, fmt(max.value)));
                if let Some(pct) = share_of_total(max.value, summary.total) {
                    text.push_str(&format!(" ({pct:.0}% of the total)"));
                }
                text.push('.');
            }
            let detail = min
                .map(|min| {
                    format!(
                        "The smallest segment is {} at {}; the {} segments sum to {}.",
                        min.label,
                        fmt(min.value),
                        summary.count,
                        fmt(summary.total)
                    )
                })
                .unwrap_or_default();
            join_paragraphs(text, detail)
        }

        AnalyticsType::KpiMetrics => {
            let mut text = format!(
                "The {} tracked metrics average {}.",
                summary.count,
                fmt(summary.mean)
            );
            if let (Some(max), Some(min)) = (max, min) {
                text.push_str(&format!(
                    " {} is ahead at {}, {} needs attention at {}.",
                    max.label,
                    fmt(max.value),
                    min.label,
                    fmt(min.value)
                ));
            }
            join_paragraphs(text, String::new())
        }

        AnalyticsType::CategoryRanking => {
            let mut text = String::new();
            if let Some(max) = max {
                text.push_str(&format!("{} ranks first at {}.", max.label, fmt(max.value)));
            }
            let detail = min
                .map(|min| {
                    format!(
                        "{} closes the ranking at {}; the average across all {} categories is {}.",
                        min.label,
                        fmt(min.value),
                        summary.count,
                        fmt(summary.mean)
                    )
                })
                .unwrap_or_default();
            join_paragraphs(text, detail)
        }

        AnalyticsType::CorrelationAnalysis => {
            let mut text = format!("The {} observations span ", summary.count);
            match (min, max) {
                (Some(min), Some(max)) => text.push_str(&format!(
                    "{} ({}) to {} ({}).",
                    fmt(min.value),
                    min.label,
                    fmt(max.value),
                    max.label
                )),
                _ => text.push_str("a narrow range."),
            }
            let detail = summary
                .growth_pct
                .map(|growth| {
                    format!("Ordered by position the series trends {growth:+.1}% end to end, suggesting a directional relationship.")
                })
                .unwrap_or_default();
            join_paragraphs(text, detail)
        }

        AnalyticsType::MultidimensionalAnalysis => {
            let mut text = String::new();
            if let (Some(max), Some(min)) = (max, min) {
                text.push_str(&format!(
                    "{} carries the most weight at {}; {} is the smallest at {}.",
                    max.label,
                    fmt(max.value),
                    min.label,
                    fmt(min.value)
                ));
            }
            let detail = format!(
                "Across all {} entries the combined value is {} with a mean of {}.",
                summary.count,
                fmt(summary.total),
                fmt(summary.mean)
            );
            join_paragraphs(text, detail)
        }

        AnalyticsType::MultiMetricComparison => {
            let mut text = String::new();
            if let (Some(max), Some(min)) = (max, min) {
                text.push_str(&format!(
                    "{} is the strongest dimension at {}, {} the weakest at {}.",
                    max.label,
                    fmt(max.value),
                    min.label,
                    fmt(min.value)
                ));
            }
            let detail = format!(
                "The profile averages {} across its {} dimensions.",
                fmt(summary.mean),
                summary.count
            );
            join_paragraphs(text, detail)
        }
    }
}

fn join_paragraphs(first: String, second: String) -> String {
    match (first.is_empty(), second.is_empty()) {
        (false, false) => format!("{first}\n\n{second}"),
        (false, true) => first,
        (true, false) => second,
        (true, true) => "Data summary unavailable for this slide.".to_string(),
    }
}
