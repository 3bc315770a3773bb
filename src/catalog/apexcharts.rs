//! ApexCharts-rendered chart types. These four are native ApexCharts forms,
//! so they ship with the apexcharts bundle instead of Chart.js plugins.

use super::helpers::*;

pub fn treemap() -> ChartTypeSpec {
    spec(
        ChartType::Treemap,
        "Treemap",
        "Nested rectangles sized by value for hierarchical composition",
        (2, 30),
        "5-20 tiles read best",
        &["portfolio weight", "category share at a glance"],
        &["label", "value"],
        &["labels unique", "values finite and non-negative"],
    )
}

pub fn heatmap() -> ChartTypeSpec {
    spec_layouts(
        ChartType::Heatmap,
        "Heatmap",
        "Matrix of cells colored by magnitude over two category axes",
        (2, 2500),
        "up to ~20x20 cells read best",
        &["intensity grids", "cohort matrices"],
        &["x_labels", "y_labels", "values"],
        &["row count equals y_labels", "row length equals x_labels"],
        &[Layout::L01, Layout::L02],
    )
}

pub fn boxplot() -> ChartTypeSpec {
    spec(
        ChartType::Boxplot,
        "Box Plot",
        "Five-number summary per category showing spread and skew",
        (2, 20),
        "3-10 boxes read best",
        &["distribution comparison", "variance review"],
        &["labels", "rows"],
        &["each row is [min, q1, median, q3, max] in order"],
    )
}

pub fn candlestick() -> ChartTypeSpec {
    spec(
        ChartType::Candlestick,
        "Candlestick Chart",
        "Open/high/low/close bars over an ordered dimension",
        (2, 50),
        "10-40 bars read best",
        &["price history", "range-bound metrics over time"],
        &["labels", "bars"],
        &["each bar satisfies l <= min(o,c) <= max(o,c) <= h"],
    )
}

pub fn all() -> Vec<ChartTypeSpec> {
    vec![treemap(), heatmap(), boxplot(), candlestick()]
}
