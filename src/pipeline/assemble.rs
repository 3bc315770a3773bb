//! Layout assembly: chart artifacts plus insight text composed into the
//! response content map, pixel-exact for the L02 observations panel.
//!
//! User-derived text is HTML-escaped at this boundary. Chart fragments are
//! concatenated raw; the generator owns those strings.

use html_escape::encode_text;

use crate::error::ServiceError;
use crate::insight::{truncate_to, PANEL_CHAR_BUDGET};
use crate::pipeline::types::{ChartArtifact, Insight, Layout, SlideContent};

/// Chart container size per layout, in pixels.
pub fn chart_dimensions(layout: Layout) -> (u32, u32) {
    match layout {
        Layout::L02 => (1260, 720),
        Layout::L01 => (1160, 700),
        Layout::L03 => (600, 660),
    }
}

/// Presentation-level strings flowing into the content map.
#[derive(Debug, Clone, Default)]
pub struct SlideChrome {
    pub slide_title: Option<String>,
    pub subtitle: Option<String>,
    pub presentation_name: Option<String>,
    pub company_logo: Option<String>,
}

/// Split insight text into paragraphs: blank lines first, then single
/// newlines, then the whole string.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let split_on = if text.contains("\n\n") { "\n\n" } else { "\n" };
    let parts: Vec<String> = text
        .split(split_on)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToString::to_string)
        .collect();
    if parts.is_empty() {
        vec![text.trim().to_string()]
    } else {
        parts
    }
}

/// The L02 observations panel: fixed 540x720 card with heading and body
/// paragraphs. Every margin and color here is part of the external contract.
pub fn observations_panel(heading: &str, insight_text: &str) -> String {
    let paragraphs = split_paragraphs(insight_text);
    let last = paragraphs.len().saturating_sub(1);
    let body: String = paragraphs
        .iter()
        .enumerate()
        .map(|(i, paragraph)| {
            let margin = if i == last { "margin: 0;" } else { "margin: 0 0 12px 0;" };
            format!(
                "<p style=\"font-size: 16px; line-height: 1.6; color: #374151; {margin}\">{}</p>",
                encode_text(paragraph)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        concat!(
            "<div style=\"width: 540px; height: 720px; padding: 40px 32px; background: #f8f9fa; ",
            "border-radius: 8px; overflow-y: auto; box-sizing: border-box;\">\n",
            "<h3 style=\"font-family: Inter, sans-serif; font-size: 20px; font-weight: 600; ",
            "color: #1f2937; margin: 0 0 16px 0; line-height: 1.3;\">{heading}</h3>\n",
            "{body}\n",
            "</div>",
        ),
        heading = encode_text(heading),
        body = body,
    )
}

/// Compose the content map for a layout. L02 wants one chart, L03 two; the
/// orchestrator supplies them in sequence order.
pub fn assemble(
    layout: Layout,
    charts: &[ChartArtifact],
    insight: &Insight,
    chrome: &SlideChrome,
) -> Result<SlideContent, ServiceError> {
    let missing = || {
        ServiceError::new(
            crate::error::ErrorCode::LayoutAssemblyFailed,
            format!("layout {} is missing a chart artifact", layout.as_str()),
        )
    };

    let mut content = SlideContent {
        slide_title: Some(chrome.slide_title.clone().unwrap_or_default()),
        element_1: Some(chrome.subtitle.clone().unwrap_or_default()),
        presentation_name: Some(chrome.presentation_name.clone().unwrap_or_default()),
        company_logo: Some(chrome.company_logo.clone().unwrap_or_default()),
        ..SlideContent::default()
    };

    match layout {
        Layout::L02 => {
            let chart = charts.first().ok_or_else(missing)?;
            let heading = chrome
                .slide_title
                .clone()
                .unwrap_or_else(|| "Key Observations".to_string());
            content.element_3 = Some(chart.html_fragment.clone());
            content.element_2 = Some(observations_panel(&heading, &insight.text));
        }
        Layout::L01 => {
            let chart = charts.first().ok_or_else(missing)?;
            content.element_4 = Some(chart.html_fragment.clone());
            content.element_3 = Some(insight.text.clone());
        }
        Layout::L03 => {
            let left = charts.first().ok_or_else(missing)?;
            let right = charts.get(1).ok_or_else(missing)?;
            content.element_4 = Some(left.html_fragment.clone());
            content.element_2 = Some(right.html_fragment.clone());
            let paragraphs = split_paragraphs(&insight.text);
            let (first, rest) = paragraphs
                .split_first()
                .map(|(f, r)| (f.clone(), r.join(" ")))
                .unwrap_or_default();
            let second = if rest.trim().is_empty() { first.clone() } else { rest };
            content.element_3 = Some(truncate_to(&first, PANEL_CHAR_BUDGET));
            content.element_5 = Some(truncate_to(&second, PANEL_CHAR_BUDGET));
        }
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{ChartLibrary, ChartType, InsightSource};

    fn artifact(id: &str) -> ChartArtifact {
        ChartArtifact {
            chart_id: id.to_string(),
            html_fragment: format!("<div id=\"{id}\">chart</div>"),
            library: ChartLibrary::Chartjs,
            chart_type: ChartType::Line,
            width: 1260,
            height: 720,
        }
    }

    fn insight(text: &str) -> Insight {
        Insight {
            text: text.to_string(),
            source: InsightSource::Fallback,
        }
    }

    #[test]
    fn l02_panel_matches_the_documented_css() {
        let panel = observations_panel("Revenue", "First paragraph.\n\nSecond paragraph.");
        assert!(panel.contains("width: 540px; height: 720px; padding: 40px 32px; background: #f8f9fa;"));
        assert!(panel.contains("border-radius: 8px; overflow-y: auto; box-sizing: border-box;"));
        assert!(panel.contains("font-size: 20px; font-weight: 600;"));
        assert!(panel.contains("margin: 0 0 16px 0; line-height: 1.3;"));
        assert!(panel.contains("margin: 0 0 12px 0;"));
        // the last paragraph closes with a bare margin
        assert!(panel.contains("color: #374151; margin: 0;\">Second paragraph.</p>"));
    }

    #[test]
    fn paragraph_split_prefers_blank_lines() {
        assert_eq!(split_paragraphs("a\n\nb\nc"), vec!["a", "b\nc"]);
        assert_eq!(split_paragraphs("a\nb"), vec!["a", "b"]);
        assert_eq!(split_paragraphs("plain"), vec!["plain"]);
    }

    #[test]
    fn user_text_is_html_escaped() {
        let panel = observations_panel("<script>alert(1)</script>", "a < b & c");
        assert!(!panel.contains("<script>alert"));
        assert!(panel.contains("&lt;script&gt;"));
        assert!(panel.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn l02_content_keys() {
        let content = assemble(
            Layout::L02,
            &[artifact("chart_1")],
            &insight("Observation."),
            &SlideChrome {
                slide_title: Some("Revenue".into()),
                ..SlideChrome::default()
            },
        )
        .unwrap();
        assert!(content.element_2.is_some());
        assert!(content.element_3.is_some());
        assert!(content.element_4.is_none());
        assert!(content.element_5.is_none());
        assert_eq!(content.slide_title.as_deref(), Some("Revenue"));
    }

    #[test]
    fn l01_content_keys() {
        let content = assemble(
            Layout::L01,
            &[artifact("chart_1")],
            &insight("Short insight."),
            &SlideChrome::default(),
        )
        .unwrap();
        assert_eq!(content.element_3.as_deref(), Some("Short insight."));
        assert!(content.element_4.is_some());
        assert!(content.element_2.is_none());
    }

    #[test]
    fn l03_requires_two_charts_and_splits_the_insight() {
        let err = assemble(
            Layout::L03,
            &[artifact("chart_1")],
            &insight("a\n\nb"),
            &SlideChrome::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::LayoutAssemblyFailed);

        let content = assemble(
            Layout::L03,
            &[artifact("chart_1"), artifact("chart_2")],
            &insight("Left panel text.\n\nRight panel text."),
            &SlideChrome::default(),
        )
        .unwrap();
        assert_eq!(content.element_3.as_deref(), Some("Left panel text."));
        assert_eq!(content.element_5.as_deref(), Some("Right panel text."));
        assert!(content.element_4.is_some());
        assert!(content.element_2.is_some());
    }
}
