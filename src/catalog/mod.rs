//! Static chart-type catalog.
//!
//! Process-constant registry mapping every chart type id to its
//! capabilities. The discovery endpoints are pure projections over this
//! data; nothing here does I/O.

pub mod apexcharts;
pub mod chartjs;
mod helpers;

pub use helpers::{ChartTypeSpec, DataRequirements};

use crate::pipeline::types::{ChartLibrary, ChartType, Layout};

pub fn all_chart_types() -> Vec<ChartTypeSpec> {
    let mut specs = chartjs::all();
    specs.extend(apexcharts::all());
    specs
}

pub fn find_chart_type(id: ChartType) -> ChartTypeSpec {
    // The per-library modules cover the whole enum; the expect is guarded by
    // the totality test below.
    all_chart_types()
        .into_iter()
        .find(|s| s.id == id)
        .unwrap_or_else(|| unreachable!("catalog entry missing for {}", id.as_str()))
}

pub fn by_library(library: ChartLibrary) -> Vec<ChartTypeSpec> {
    all_chart_types()
        .into_iter()
        .filter(|s| s.library == library)
        .collect()
}

pub fn by_layout(layout: Layout) -> Vec<ChartTypeSpec> {
    all_chart_types()
        .into_iter()
        .filter(|s| s.supported_layouts.contains(&layout))
        .collect()
}

/// Chart types usable for the given layout, as snake_case ids. Used for the
/// `details` payload of `INVALID_CHART_TYPE` rejections.
pub fn layout_compatible_ids(layout: Layout) -> Vec<&'static str> {
    by_layout(layout).into_iter().map(|s| s.id.as_str()).collect()
}
