use crate::aggregate::AggregatedSeries;
use crate::models::{ChartType, PaletteName, WidgetConfig};
use serde::Serialize;

const DEFAULT_COLORS: &[&str] = &[
    "#0d6efd", "#6610f2", "#198754", "#dc3545", "#fd7e14", "#20c997", "#6f42c1",
];
const CATEGORICAL_COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
const PASTEL_COLORS: &[&str] = &[
    "#a6cee3", "#b2df8a", "#fb9a99", "#fdbf6f", "#cab2d6", "#ffff99", "#1f78b4", "#33a02c",
    "#e31a1c", "#ff7f00",
];
const VIBRANT_COLORS: &[&str] = &[
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];
const MUI_COLORS: &[&str] = &[
    "#1976d2", "#9c27b0", "#2e7d32", "#ed6c02", "#d32f2f", "#0288d1", "#6a1b9a", "#43a047",
    "#ff9800", "#c2185b",
];

pub fn palette_colors(name: Option<PaletteName>) -> &'static [&'static str] {
    match name {
        Some(PaletteName::Categorical) => CATEGORICAL_COLORS,
        Some(PaletteName::Pastel) => PASTEL_COLORS,
        Some(PaletteName::Vibrant) => VIBRANT_COLORS,
        Some(PaletteName::Mui) => MUI_COLORS,
        Some(PaletteName::Default) | None => DEFAULT_COLORS,
    }
}

/// Color for the row or series at `index`, wrapping when the palette is
/// shorter than the row count.
pub fn palette_color(name: Option<PaletteName>, index: usize) -> String {
    let colors = palette_colors(name);
    colors[index % colors.len()].to_string()
}

/// Named degradation policy: a line chart cannot meaningfully compare
/// multiple series without stacking, so multi-series data silently renders
/// as grouped bars instead of erroring.
pub fn degrade_chart_type(requested: ChartType, series: &AggregatedSeries) -> ChartType {
    if requested == ChartType::Line && series.is_multi_series() {
        ChartType::Bar
    } else {
        requested
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Coloring of one bar series: a single fill, or one fill per category when
/// a lone series carries the whole chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesColor {
    Uniform(String),
    PerCategory(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarSeries {
    pub key: String,
    pub values: Vec<f64>,
    pub color: SeriesColor,
}

/// Fully resolved visual form of one widget, ready for the page to paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ChartSpec {
    Pie {
        slices: Vec<PieSlice>,
    },
    Bar {
        categories: Vec<String>,
        series: Vec<BarSeries>,
    },
    Line {
        categories: Vec<String>,
        values: Vec<f64>,
        color: String,
    },
}

/// Pure mapping from a widget's configuration and aggregated series to its
/// chart spec. Applies the degradation policy first, so callers never need
/// to inspect the series shape themselves.
pub fn render_chart(config: &WidgetConfig, series: &AggregatedSeries) -> ChartSpec {
    match degrade_chart_type(config.chart, series) {
        ChartType::Pie => {
            let slices = flat_view(series)
                .into_iter()
                .enumerate()
                .map(|(index, (name, value))| PieSlice {
                    name,
                    value,
                    color: palette_color(config.palette, index),
                })
                .collect();
            ChartSpec::Pie { slices }
        }
        ChartType::Line => {
            let rows = flat_view(series);
            ChartSpec::Line {
                categories: rows.iter().map(|(name, _)| name.clone()).collect(),
                values: rows.into_iter().map(|(_, value)| value).collect(),
                color: palette_color(config.palette, 0),
            }
        }
        ChartType::Bar => match series {
            AggregatedSeries::Flat { rows } => {
                let categories: Vec<String> = rows.iter().map(|row| row.name.clone()).collect();
                let colors = (0..rows.len())
                    .map(|index| palette_color(config.palette, index))
                    .collect();
                ChartSpec::Bar {
                    categories,
                    series: vec![BarSeries {
                        key: "value".to_string(),
                        values: rows.iter().map(|row| row.value).collect(),
                        color: SeriesColor::PerCategory(colors),
                    }],
                }
            }
            AggregatedSeries::Matrix { rows, series_keys } => {
                let categories: Vec<String> = rows.iter().map(|row| row.name.clone()).collect();
                let series = series_keys
                    .iter()
                    .enumerate()
                    .map(|(index, key)| BarSeries {
                        key: key.clone(),
                        values: rows.iter().map(|row| row.cells[index]).collect(),
                        color: SeriesColor::Uniform(palette_color(config.palette, index)),
                    })
                    .collect();
                ChartSpec::Bar { categories, series }
            }
        },
    }
}

// Pie (and a defensively handled line) ignore series splitting: matrix rows
// collapse to their per-category totals.
fn flat_view(series: &AggregatedSeries) -> Vec<(String, f64)> {
    match series {
        AggregatedSeries::Flat { rows } => rows
            .iter()
            .map(|row| (row.name.clone(), row.value))
            .collect(),
        AggregatedSeries::Matrix { rows, .. } => rows
            .iter()
            .map(|row| (row.name.clone(), row.cells.iter().sum()))
            .collect(),
    }
}
