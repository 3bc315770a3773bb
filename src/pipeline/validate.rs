//! Centralized request validation.
//!
//! Garde owns the structural field constraints on [`AnalyticsRequest`]; this
//! module trims, runs garde, applies the cross-field rules no derive can
//! express (duplicate labels, finiteness, per-container shape rules) and
//! converts every failure into a [`ServiceError`] with a stable code.
//! A request that passes here never fails validation downstream.

use garde::Validate;

use crate::error::{ErrorCode, ServiceError};
use crate::pipeline::types::{AnalyticsRequest, RequestData, SlideJob};

const MIN_POINTS: usize = 2;
const MAX_POINTS: usize = 50;
const MAX_LABEL_LEN: usize = 100;

/// Validate and normalize a slide job. String fields come back trimmed.
pub fn validate(mut job: SlideJob) -> Result<SlideJob, ServiceError> {
    trim_request(&mut job.request);

    for (field, value) in [
        ("presentation_id", &job.request.presentation_id),
        ("slide_id", &job.request.slide_id),
        ("narrative", &job.request.narrative),
    ] {
        if value.is_empty() {
            return Err(ServiceError::empty_field(field));
        }
    }

    if let Err(report) = job.request.validate() {
        return Err(garde_error(&report));
    }

    validate_data(&job.request.data)?;

    Ok(job)
}

fn trim_request(request: &mut AnalyticsRequest) {
    trim_in_place(&mut request.presentation_id);
    trim_in_place(&mut request.slide_id);
    trim_in_place(&mut request.narrative);
    if let Some(chart_type) = request.chart_type.as_mut() {
        trim_in_place(chart_type);
    }
    if let RequestData::Points(points) = &mut request.data {
        for point in points {
            trim_in_place(&mut point.label);
        }
    }
    if let Some(context) = request.context.as_mut() {
        for value in [
            context.slide_title.as_mut(),
            context.subtitle.as_mut(),
            context.presentation_name.as_mut(),
            context.audience.as_mut(),
            context.theme.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            trim_in_place(value);
        }
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Map the first garde report entry onto the error taxonomy. The report path
/// names the offending field; the code follows from which field it is.
fn garde_error(report: &garde::Report) -> ServiceError {
    let Some((path, error)) = report.iter().next() else {
        return ServiceError::new(ErrorCode::InvalidDataPoints, "validation failed");
    };
    let field = path.to_string();
    let code = if field.contains("label") {
        ErrorCode::InvalidLabels
    } else if field.contains("value") {
        ErrorCode::InvalidValues
    } else {
        ErrorCode::EmptyField
    };
    ServiceError::new(code, format!("{field}: {error}")).with_field(field)
}

fn validate_data(data: &RequestData) -> Result<(), ServiceError> {
    match data {
        RequestData::Points(points) => validate_points(points),
        RequestData::Series(series) => validate_series(series),
        RequestData::Matrix(matrix) => validate_matrix(matrix),
        RequestData::Flow(flow) => validate_flow(flow),
        RequestData::Ohlc(ohlc) => validate_ohlc(ohlc),
        RequestData::Boxplot(boxplot) => validate_boxplot(boxplot),
    }
}

fn check_count(count: usize, what: &str) -> Result<(), ServiceError> {
    if !(MIN_POINTS..=MAX_POINTS).contains(&count) {
        return Err(ServiceError::new(
            ErrorCode::DataRangeError,
            format!("{what} count {count} is outside the accepted range [{MIN_POINTS}, {MAX_POINTS}]"),
        )
        .with_details(serde_json::json!({
            "count": count,
            "min": MIN_POINTS,
            "max": MAX_POINTS,
        })));
    }
    Ok(())
}

fn check_label(label: &str, field: String) -> Result<(), ServiceError> {
    if label.trim().is_empty() {
        return Err(ServiceError::new(
            ErrorCode::InvalidLabels,
            "labels must contain at least one non-whitespace character",
        )
        .with_field(field));
    }
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(ServiceError::new(
            ErrorCode::InvalidLabels,
            format!("labels must be at most {MAX_LABEL_LEN} characters"),
        )
        .with_field(field));
    }
    Ok(())
}

fn check_finite(value: f64, field: String) -> Result<(), ServiceError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(
            ServiceError::new(ErrorCode::InvalidValues, "values must be finite numbers")
                .with_field(field),
        )
    }
}

fn check_unique<'a, I>(labels: I, what: &str) -> Result<(), ServiceError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(ServiceError::new(
                ErrorCode::DuplicateLabels,
                format!("duplicate {what} '{label}'"),
            )
            .with_details(serde_json::json!({ "duplicate": label })));
        }
    }
    Ok(())
}

fn validate_points(points: &[crate::pipeline::types::ChartDataPoint]) -> Result<(), ServiceError> {
    check_count(points.len(), "data point")?;
    for (i, point) in points.iter().enumerate() {
        check_label(&point.label, format!("data[{i}].label"))?;
        check_finite(point.value, format!("data[{i}].value"))?;
    }
    check_unique(points.iter().map(|p| p.label.as_str()), "label")
}

fn validate_series(series: &crate::pipeline::types::MultiSeriesData) -> Result<(), ServiceError> {
    check_count(series.labels.len(), "label")?;
    if series.series.is_empty() {
        return Err(ServiceError::new(
            ErrorCode::InvalidDataPoints,
            "multi-series payloads need at least one series",
        ));
    }
    for (i, label) in series.labels.iter().enumerate() {
        check_label(label, format!("data.labels[{i}]"))?;
    }
    check_unique(series.labels.iter().map(String::as_str), "label")?;
    check_unique(series.series.iter().map(|s| s.name.as_str()), "series name")?;
    for (i, entry) in series.series.iter().enumerate() {
        check_label(&entry.name, format!("data.series[{i}].name"))?;
        if entry.values.len() != series.labels.len() {
            return Err(ServiceError::new(
                ErrorCode::MismatchedLengths,
                format!(
                    "series '{}' has {} values for {} labels",
                    entry.name,
                    entry.values.len(),
                    series.labels.len()
                ),
            ));
        }
        for (j, value) in entry.values.iter().enumerate() {
            check_finite(*value, format!("data.series[{i}].values[{j}]"))?;
        }
    }
    Ok(())
}

fn validate_matrix(matrix: &crate::pipeline::types::MatrixData) -> Result<(), ServiceError> {
    if matrix.x_labels.is_empty() || matrix.y_labels.is_empty() {
        return Err(ServiceError::new(
            ErrorCode::InvalidDataPoints,
            "matrix payloads need non-empty x_labels and y_labels",
        ));
    }
    for (i, label) in matrix.x_labels.iter().enumerate() {
        check_label(label, format!("data.x_labels[{i}]"))?;
    }
    for (i, label) in matrix.y_labels.iter().enumerate() {
        check_label(label, format!("data.y_labels[{i}]"))?;
    }
    check_unique(matrix.x_labels.iter().map(String::as_str), "x label")?;
    check_unique(matrix.y_labels.iter().map(String::as_str), "y label")?;
    if matrix.values.len() != matrix.y_labels.len() {
        return Err(ServiceError::new(
            ErrorCode::MismatchedLengths,
            format!(
                "matrix has {} rows for {} y_labels",
                matrix.values.len(),
                matrix.y_labels.len()
            ),
        ));
    }
    for (i, row) in matrix.values.iter().enumerate() {
        if row.len() != matrix.x_labels.len() {
            return Err(ServiceError::new(
                ErrorCode::MismatchedLengths,
                format!(
                    "matrix row {i} has {} values for {} x_labels",
                    row.len(),
                    matrix.x_labels.len()
                ),
            ));
        }
        for (j, value) in row.iter().enumerate() {
            check_finite(*value, format!("data.values[{i}][{j}]"))?;
        }
    }
    Ok(())
}

fn validate_flow(flow: &crate::pipeline::types::FlowData) -> Result<(), ServiceError> {
    if flow.nodes.len() < 2 || flow.links.is_empty() {
        return Err(ServiceError::new(
            ErrorCode::InvalidDataPoints,
            "flow payloads need at least two nodes and one link",
        ));
    }
    for (i, node) in flow.nodes.iter().enumerate() {
        check_label(&node.id, format!("data.nodes[{i}].id"))?;
    }
    check_unique(flow.nodes.iter().map(|n| n.id.as_str()), "node id")?;
    let ids: std::collections::HashSet<&str> =
        flow.nodes.iter().map(|n| n.id.as_str()).collect();
    for (i, link) in flow.links.iter().enumerate() {
        for endpoint in [&link.source, &link.target] {
            if !ids.contains(endpoint.as_str()) {
                return Err(ServiceError::new(
                    ErrorCode::InvalidDataPoints,
                    format!("link references undeclared node '{endpoint}'"),
                )
                .with_field(format!("data.links[{i}]")));
            }
        }
        check_finite(link.value, format!("data.links[{i}].value"))?;
    }
    Ok(())
}

fn validate_ohlc(ohlc: &crate::pipeline::types::OhlcData) -> Result<(), ServiceError> {
    check_count(ohlc.bars.len(), "bar")?;
    if ohlc.labels.len() != ohlc.bars.len() {
        return Err(ServiceError::new(
            ErrorCode::MismatchedLengths,
            format!("{} labels for {} bars", ohlc.labels.len(), ohlc.bars.len()),
        ));
    }
    for (i, label) in ohlc.labels.iter().enumerate() {
        check_label(label, format!("data.labels[{i}]"))?;
    }
    check_unique(ohlc.labels.iter().map(String::as_str), "label")?;
    for (i, bar) in ohlc.bars.iter().enumerate() {
        for (name, value) in [("o", bar.o), ("h", bar.h), ("l", bar.l), ("c", bar.c)] {
            check_finite(value, format!("data.bars[{i}].{name}"))?;
        }
        let body_low = bar.o.min(bar.c);
        let body_high = bar.o.max(bar.c);
        if !(bar.l <= body_low && body_high <= bar.h) {
            return Err(ServiceError::new(
                ErrorCode::InvalidValues,
                format!("bar {i} violates l <= min(o,c) <= max(o,c) <= h"),
            )
            .with_field(format!("data.bars[{i}]")));
        }
    }
    Ok(())
}

fn validate_boxplot(boxplot: &crate::pipeline::types::BoxplotData) -> Result<(), ServiceError> {
    check_count(boxplot.rows.len(), "row")?;
    if boxplot.labels.len() != boxplot.rows.len() {
        return Err(ServiceError::new(
            ErrorCode::MismatchedLengths,
            format!(
                "{} labels for {} rows",
                boxplot.labels.len(),
                boxplot.rows.len()
            ),
        ));
    }
    for (i, label) in boxplot.labels.iter().enumerate() {
        check_label(label, format!("data.labels[{i}]"))?;
    }
    check_unique(boxplot.labels.iter().map(String::as_str), "label")?;
    for (i, row) in boxplot.rows.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            check_finite(*value, format!("data.rows[{i}][{j}]"))?;
        }
        if !row.windows(2).all(|w| w[0] <= w[1]) {
            return Err(ServiceError::new(
                ErrorCode::InvalidValues,
                format!("row {i} violates min <= q1 <= median <= q3 <= max"),
            )
            .with_field(format!("data.rows[{i}]")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{
        AnalyticsType, BoxplotData, ChartDataPoint, FlowData, FlowLink, FlowNode, Layout,
        MatrixData, OhlcBar, OhlcData,
    };

    fn job_with(data: RequestData) -> SlideJob {
        SlideJob {
            request: AnalyticsRequest {
                presentation_id: "pres-1".into(),
                slide_id: "slide-1".into(),
                slide_number: 1,
                narrative: "Revenue grew steadily across the year".into(),
                data,
                context: None,
                constraints: None,
                chart_type: None,
            },
            analytics_type: AnalyticsType::RevenueOverTime,
            layout: Layout::L02,
        }
    }

    fn points(pairs: &[(&str, f64)]) -> RequestData {
        RequestData::Points(
            pairs
                .iter()
                .map(|(label, value)| ChartDataPoint {
                    label: (*label).to_string(),
                    value: *value,
                })
                .collect(),
        )
    }

    #[test]
    fn accepts_and_trims_a_valid_request() {
        let mut job = job_with(points(&[("Q1", 1.0), ("Q2", 2.0)]));
        job.request.narrative = "  padded  ".into();
        let job = validate(job).unwrap();
        assert_eq!(job.request.narrative, "padded");
    }

    #[test]
    fn rejects_empty_fields_after_trim() {
        let mut job = job_with(points(&[("Q1", 1.0), ("Q2", 2.0)]));
        job.request.slide_id = "   ".into();
        let err = validate(job).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyField);
        assert_eq!(err.field.as_deref(), Some("slide_id"));
    }

    #[test]
    fn rejects_too_few_and_too_many_points() {
        let err = validate(job_with(points(&[("only", 1.0)]))).unwrap_err();
        assert_eq!(err.code, ErrorCode::DataRangeError);

        let many: Vec<(String, f64)> = (0..51).map(|i| (format!("p{i}"), f64::from(i))).collect();
        let many_refs: Vec<(&str, f64)> = many.iter().map(|(l, v)| (l.as_str(), *v)).collect();
        let err = validate(job_with(points(&many_refs))).unwrap_err();
        assert_eq!(err.code, ErrorCode::DataRangeError);
        assert_eq!(err.details.unwrap()["count"], 51);
    }

    #[test]
    fn rejects_non_finite_values() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = validate(job_with(points(&[("a", 1.0), ("b", bad)]))).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidValues);
        }
    }

    #[test]
    fn rejects_duplicate_labels() {
        let err = validate(job_with(points(&[("Q1", 1.0), ("Q1", 2.0)]))).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateLabels);
        assert_eq!(err.details.unwrap()["duplicate"], "Q1");
    }

    #[test]
    fn rejects_overlong_and_blank_labels() {
        let long = "x".repeat(101);
        let err = validate(job_with(points(&[(long.as_str(), 1.0), ("b", 2.0)]))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLabels);

        let err = validate(job_with(points(&[("  ", 1.0), ("b", 2.0)]))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLabels);
    }

    #[test]
    fn rejects_unordered_boxplot_rows() {
        let data = RequestData::Boxplot(BoxplotData {
            labels: vec!["a".into(), "b".into()],
            series_name: None,
            rows: vec![[1.0, 2.0, 3.0, 4.0, 5.0], [1.0, 3.0, 2.0, 4.0, 5.0]],
        });
        let err = validate(job_with(data)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValues);
    }

    #[test]
    fn rejects_ohlc_bounds_violation() {
        let data = RequestData::Ohlc(OhlcData {
            labels: vec!["d1".into(), "d2".into()],
            series_name: None,
            bars: vec![
                OhlcBar { o: 1.0, h: 2.0, l: 0.5, c: 1.5 },
                OhlcBar { o: 1.0, h: 1.2, l: 0.5, c: 1.5 },
            ],
        });
        let err = validate(job_with(data)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValues);
    }

    #[test]
    fn rejects_undeclared_sankey_nodes() {
        let data = RequestData::Flow(FlowData {
            nodes: vec![FlowNode { id: "a".into() }, FlowNode { id: "b".into() }],
            links: vec![FlowLink {
                source: "a".into(),
                target: "ghost".into(),
                value: 1.0,
            }],
        });
        let err = validate(job_with(data)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDataPoints);
    }

    #[test]
    fn rejects_matrix_dimension_mismatch() {
        let data = RequestData::Matrix(MatrixData {
            x_labels: vec!["x1".into(), "x2".into()],
            y_labels: vec!["y1".into()],
            values: vec![vec![1.0]],
        });
        let err = validate(job_with(data)).unwrap_err();
        assert_eq!(err.code, ErrorCode::MismatchedLengths);
    }
}
