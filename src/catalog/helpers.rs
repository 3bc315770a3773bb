pub use crate::pipeline::types::{ChartLibrary, ChartType, Layout};

use schemars::JsonSchema;
use serde::Serialize;

/// Immutable catalog entry describing one chart type's capabilities.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChartTypeSpec {
    pub id: ChartType,
    pub name: String,
    pub description: String,
    pub library: ChartLibrary,
    pub supported_layouts: Vec<Layout>,
    pub min_points: usize,
    pub max_points: usize,
    pub optimal_range: String,
    pub use_cases: Vec<String>,
    pub data_requirements: DataRequirements,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DataRequirements {
    pub fields: Vec<String>,
    pub validation_rules: Vec<String>,
}

pub fn spec(
    id: ChartType,
    name: &str,
    description: &str,
    (min_points, max_points): (usize, usize),
    optimal_range: &str,
    use_cases: &[&str],
    fields: &[&str],
    validation_rules: &[&str],
) -> ChartTypeSpec {
    ChartTypeSpec {
        id,
        name: name.to_string(),
        description: description.to_string(),
        library: id.library(),
        supported_layouts: Layout::ALL.to_vec(),
        min_points,
        max_points,
        optimal_range: optimal_range.to_string(),
        use_cases: use_cases.iter().map(ToString::to_string).collect(),
        data_requirements: DataRequirements {
            fields: fields.iter().map(ToString::to_string).collect(),
            validation_rules: validation_rules.iter().map(ToString::to_string).collect(),
        },
    }
}

/// Same as [`spec`] but restricted to a subset of layouts. Dual-chart L03
/// panels are narrower than the L02 canvas, so dense chart types opt out.
pub fn spec_layouts(
    id: ChartType,
    name: &str,
    description: &str,
    points: (usize, usize),
    optimal_range: &str,
    use_cases: &[&str],
    fields: &[&str],
    validation_rules: &[&str],
    layouts: &[Layout],
) -> ChartTypeSpec {
    let mut s = spec(
        id,
        name,
        description,
        points,
        optimal_range,
        use_cases,
        fields,
        validation_rules,
    );
    s.supported_layouts = layouts.to_vec();
    s
}
