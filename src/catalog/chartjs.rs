//! Chart.js-rendered chart types: the fifteen native forms plus sankey,
//! which ships through the chartjs-chart-sankey plugin.

use super::helpers::*;

pub fn line() -> ChartTypeSpec {
    spec(
        ChartType::Line,
        "Line Chart",
        "Continuous trend over an ordered dimension, typically time",
        (2, 50),
        "4-12 points read best",
        &["revenue over time", "growth trends", "time series"],
        &["label", "value"],
        &["labels unique", "values finite"],
    )
}

pub fn area() -> ChartTypeSpec {
    spec(
        ChartType::Area,
        "Area Chart",
        "Line chart with the region under the curve filled to show magnitude",
        (2, 50),
        "4-12 points read best",
        &["cumulative totals", "volume over time"],
        &["label", "value"],
        &["labels unique", "values finite"],
    )
}

pub fn area_stacked() -> ChartTypeSpec {
    spec(
        ChartType::AreaStacked,
        "Stacked Area Chart",
        "Multiple series stacked to show part-to-whole evolution",
        (2, 30),
        "3-8 periods with 2-5 series",
        &["segment contribution over time"],
        &["labels", "series"],
        &["every series matches the label count"],
    )
}

pub fn bar_vertical() -> ChartTypeSpec {
    spec(
        ChartType::BarVertical,
        "Vertical Bar Chart",
        "Discrete category comparison on a vertical value axis",
        (2, 20),
        "3-8 categories read best",
        &["quarterly comparison", "year-over-year growth"],
        &["label", "value"],
        &["labels unique", "values finite"],
    )
}

pub fn bar_horizontal() -> ChartTypeSpec {
    spec(
        ChartType::BarHorizontal,
        "Horizontal Bar Chart",
        "Category comparison with long labels or ranked ordering",
        (2, 20),
        "3-10 categories read best",
        &["category ranking", "top-N lists"],
        &["label", "value"],
        &["labels unique", "values finite"],
    )
}

pub fn bar_grouped() -> ChartTypeSpec {
    spec(
        ChartType::BarGrouped,
        "Grouped Bar Chart",
        "Side-by-side bars comparing multiple series per category",
        (2, 20),
        "3-6 categories with 2-4 series",
        &["plan versus actual", "multi-metric by category"],
        &["labels", "series"],
        &["every series matches the label count"],
    )
}

pub fn bar_stacked() -> ChartTypeSpec {
    spec(
        ChartType::BarStacked,
        "Stacked Bar Chart",
        "Bars stacked to show part-to-whole per category",
        (2, 20),
        "3-8 categories with 2-5 series",
        &["composition by category"],
        &["labels", "series"],
        &["every series matches the label count"],
    )
}

pub fn pie() -> ChartTypeSpec {
    spec(
        ChartType::Pie,
        "Pie Chart",
        "Proportional slices of a whole",
        (2, 8),
        "3-6 slices read best",
        &["market share", "portfolio composition"],
        &["label", "value"],
        &["labels unique", "values finite", "at most 8 slices"],
    )
}

pub fn doughnut() -> ChartTypeSpec {
    spec(
        ChartType::Doughnut,
        "Doughnut Chart",
        "Pie with a hollow center leaving room for a KPI callout",
        (2, 8),
        "3-6 segments read best",
        &["kpi metrics", "goal attainment"],
        &["label", "value"],
        &["labels unique", "values finite", "at most 8 segments"],
    )
}

pub fn scatter() -> ChartTypeSpec {
    spec(
        ChartType::Scatter,
        "Scatter Plot",
        "Individual observations positioned by two quantities",
        (3, 50),
        "5-30 points read best",
        &["correlation analysis", "outlier detection"],
        &["label", "value"],
        &["labels unique", "values finite"],
    )
}

pub fn bubble() -> ChartTypeSpec {
    spec(
        ChartType::Bubble,
        "Bubble Chart",
        "Scatter plot with a third quantity encoded as bubble size",
        (3, 30),
        "4-15 bubbles read best",
        &["multidimensional analysis", "portfolio sizing"],
        &["label", "value"],
        &["labels unique", "values finite"],
    )
}

pub fn radar() -> ChartTypeSpec {
    spec(
        ChartType::Radar,
        "Radar Chart",
        "Multiple metrics on radial axes forming a comparable silhouette",
        (3, 12),
        "4-8 axes read best",
        &["multi-metric comparison", "capability profiles"],
        &["label", "value"],
        &["labels unique", "values finite", "at least 3 axes"],
    )
}

pub fn polar_area() -> ChartTypeSpec {
    spec(
        ChartType::PolarArea,
        "Polar Area Chart",
        "Equal-angle segments with value encoded as radius",
        (3, 12),
        "4-8 segments read best",
        &["cyclic category comparison"],
        &["label", "value"],
        &["labels unique", "values finite"],
    )
}

pub fn waterfall() -> ChartTypeSpec {
    spec(
        ChartType::Waterfall,
        "Waterfall Chart",
        "Sequential deltas bridging a start value to an end value",
        (3, 20),
        "4-10 steps read best",
        &["bridge analysis", "contribution to change"],
        &["label", "value"],
        &["labels unique", "values finite", "values are signed deltas"],
    )
}

pub fn mixed() -> ChartTypeSpec {
    spec(
        ChartType::Mixed,
        "Mixed Chart",
        "Bar and line series combined on shared category axes",
        (2, 30),
        "4-12 categories with 2-3 series",
        &["volume with trend overlay"],
        &["labels", "series"],
        &["every series matches the label count", "series may set type line|bar"],
    )
}

pub fn sankey() -> ChartTypeSpec {
    spec_layouts(
        ChartType::Sankey,
        "Sankey Diagram",
        "Weighted flows between stages, rendered via the sankey plugin",
        (2, 50),
        "2-6 stages with up to ~20 links",
        &["funnel flows", "budget allocation"],
        &["nodes", "links"],
        &["links reference declared node ids", "link values finite"],
        &[Layout::L01, Layout::L02],
    )
}

pub fn all() -> Vec<ChartTypeSpec> {
    vec![
        line(),
        area(),
        area_stacked(),
        bar_vertical(),
        bar_horizontal(),
        bar_grouped(),
        bar_stacked(),
        pie(),
        doughnut(),
        scatter(),
        bubble(),
        radar(),
        polar_area(),
        waterfall(),
        mixed(),
        sankey(),
    ]
}
