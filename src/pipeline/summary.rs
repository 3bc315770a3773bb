//! Small textual features extracted from shaped data in a single pass.
//! Feeds both the LLM prompt and the deterministic fallback insight.

use crate::pipeline::shape::ShapedChartData;

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

/// Summary statistics over the primary series of a shaped payload.
#[derive(Debug, Clone)]
pub struct DataSummary {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub min: Option<LabeledValue>,
    pub max: Option<LabeledValue>,
    pub first: Option<LabeledValue>,
    pub last: Option<LabeledValue>,
    /// Largest absolute step between adjacent points: (from, to, delta).
    pub largest_delta: Option<(String, String, f64)>,
    /// First-to-last percentage change, when the first value is non-zero.
    pub growth_pct: Option<f64>,
}

impl DataSummary {
    fn from_pairs(pairs: &[(String, f64)]) -> Self {
        let count = pairs.len();
        let total: f64 = pairs.iter().map(|(_, v)| v).sum();
        let mean = if count > 0 { total / count as f64 } else { 0.0 };

        let mut min: Option<LabeledValue> = None;
        let mut max: Option<LabeledValue> = None;
        let mut largest_delta: Option<(String, String, f64)> = None;

        for (i, (label, value)) in pairs.iter().enumerate() {
            if min.as_ref().is_none_or(|m| *value < m.value) {
                min = Some(LabeledValue { label: label.clone(), value: *value });
            }
            if max.as_ref().is_none_or(|m| *value > m.value) {
                max = Some(LabeledValue { label: label.clone(), value: *value });
            }
            if i > 0 {
                let (prev_label, prev_value) = &pairs[i - 1];
                let delta = value - prev_value;
                if largest_delta
                    .as_ref()
                    .is_none_or(|(_, _, d)| delta.abs() > d.abs())
                {
                    largest_delta = Some((prev_label.clone(), label.clone(), delta));
                }
            }
        }

        let first = pairs.first().map(|(l, v)| LabeledValue { label: l.clone(), value: *v });
        let last = pairs.last().map(|(l, v)| LabeledValue { label: l.clone(), value: *v });
        let growth_pct = match (&first, &last) {
            (Some(f), Some(l)) if f.value.abs() > f64::EPSILON => {
                Some((l.value - f.value) / f.value.abs() * 100.0)
            }
            _ => None,
        };

        Self {
            count,
            total,
            mean,
            min,
            max,
            first,
            last,
            largest_delta,
            growth_pct,
        }
    }

    pub fn from_shaped(shaped: &ShapedChartData) -> Self {
        let pairs: Vec<(String, f64)> = match shaped {
            ShapedChartData::SingleSeries { labels, values, .. } => labels
                .iter()
                .cloned()
                .zip(values.iter().copied())
                .collect(),
            ShapedChartData::MultiDataset { labels, datasets, .. } => datasets
                .first()
                .map(|d| labels.iter().cloned().zip(d.data.iter().copied()).collect())
                .unwrap_or_default(),
            ShapedChartData::PointSeries { datasets, .. } => datasets
                .first()
                .map(|d| d.data.iter().map(|p| (p.label.clone(), p.y)).collect())
                .unwrap_or_default(),
            ShapedChartData::Matrix { x_labels, y_labels, values } => values
                .iter()
                .enumerate()
                .flat_map(|(y, row)| {
                    row.iter().enumerate().map(move |(x, v)| (y, x, *v))
                })
                .map(|(y, x, v)| {
                    let label = format!(
                        "{}/{}",
                        y_labels.get(y).map_or("", String::as_str),
                        x_labels.get(x).map_or("", String::as_str)
                    );
                    (label, v)
                })
                .collect(),
            ShapedChartData::Boxplot { labels, datasets } => datasets
                .first()
                .map(|d| {
                    labels
                        .iter()
                        .cloned()
                        .zip(d.data.iter().map(|row| row[2])) // medians
                        .collect()
                })
                .unwrap_or_default(),
            ShapedChartData::Ohlc { labels, datasets } => datasets
                .first()
                .map(|d| {
                    labels
                        .iter()
                        .cloned()
                        .zip(d.data.iter().map(|bar| bar.c))
                        .collect()
                })
                .unwrap_or_default(),
            ShapedChartData::Flow { links, .. } => links
                .iter()
                .map(|l| (format!("{} -> {}", l.source, l.target), l.value))
                .collect(),
        };
        Self::from_pairs(&pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::FormatHint;

    fn single(pairs: &[(&str, f64)]) -> ShapedChartData {
        ShapedChartData::SingleSeries {
            labels: pairs.iter().map(|(l, _)| (*l).to_string()).collect(),
            values: pairs.iter().map(|(_, v)| *v).collect(),
            format_hint: FormatHint::Currency,
        }
    }

    #[test]
    fn summary_computes_extremes_and_growth() {
        let shaped = single(&[("Q1", 125_000.0), ("Q2", 145_000.0), ("Q3", 195_000.0), ("Q4", 220_000.0)]);
        let summary = DataSummary::from_shaped(&shaped);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.total, 685_000.0);
        assert_eq!(summary.min.as_ref().unwrap().label, "Q1");
        assert_eq!(summary.max.as_ref().unwrap().label, "Q4");
        let (from, to, delta) = summary.largest_delta.unwrap();
        assert_eq!((from.as_str(), to.as_str()), ("Q2", "Q3"));
        assert_eq!(delta, 50_000.0);
        assert!((summary.growth_pct.unwrap() - 76.0).abs() < 0.01);
    }

    #[test]
    fn zero_first_value_yields_no_growth_pct() {
        let shaped = single(&[("a", 0.0), ("b", 10.0)]);
        let summary = DataSummary::from_shaped(&shaped);
        assert!(summary.growth_pct.is_none());
    }
}
