use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    Pie,
    Bar,
    Line,
}

impl ChartType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pie => "pie",
            Self::Bar => "bar",
            Self::Line => "line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    Count,
    Value,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Value => "value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteName {
    Default,
    Categorical,
    Pastel,
    Vibrant,
    Mui,
}

impl PaletteName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Categorical => "categorical",
            Self::Pastel => "pastel",
            Self::Vibrant => "vibrant",
            Self::Mui => "mui",
        }
    }
}

/// One user-configured chart. Serialized form matches the legacy browser
/// payload stored under `<scope>:widgets`, so persisted dashboards from the
/// web client keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub chart: ChartType,
    pub x_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_field: Option<String>,
    pub metric: MetricKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<PaletteName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md: Option<u8>,
}

impl WidgetConfig {
    /// Configured width in 12-column grid units. Anything outside the
    /// supported set falls back to the half-width default.
    pub fn grid_width(&self) -> i32 {
        match self.md {
            Some(4) => 4,
            Some(8) => 8,
            Some(12) => 12,
            _ => 6,
        }
    }
}

/// Everything a widget needs except its identity; `add_widget` assigns the
/// id, `edit_widget` keeps the existing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub chart: ChartType,
    pub x_field: String,
    #[serde(default)]
    pub y_field: Option<String>,
    pub metric: MetricKind,
    #[serde(default)]
    pub palette: Option<PaletteName>,
    #[serde(default)]
    pub md: Option<u8>,
}

/// Grid placement for one widget within a breakpoint. `i` carries the widget
/// id, matching the grid library's item contract; extra fields the library
/// writes (drag state, constraints) are dropped on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub i: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Breakpoint name -> placements. Only [`CANONICAL_BREAKPOINT`] is
/// authoritative; other breakpoints are carried opaquely for the grid UI.
pub type Layouts = BTreeMap<String, Vec<LayoutEntry>>;

pub const CANONICAL_BREAKPOINT: &str = "lg";

pub fn empty_layouts() -> Layouts {
    let mut layouts = Layouts::new();
    layouts.insert(CANONICAL_BREAKPOINT.to_string(), Vec::new());
    layouts
}

/// The persisted pair, loaded and saved together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub widgets: Vec<WidgetConfig>,
    pub layouts: Layouts,
}

/// Planning record (PCA row) as served by the procurement API. Field names
/// follow the backend wire format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PcaRecord {
    pub id: String,
    pub numero_contratacao: String,
    pub status_contratacao: Option<String>,
    pub situacao_execucao: Option<String>,
    pub titulo_contratacao: Option<String>,
    pub categoria_contratacao: Option<String>,
    pub valor_total: Option<f64>,
    pub area_requisitante: Option<String>,
    pub area_demandante: Option<String>,
    pub ano_pca: Option<i32>,
    pub data_estimada_inicio: Option<NaiveDate>,
    pub data_estimada_conclusao: Option<NaiveDate>,
    pub atrasada: bool,
    pub vencida: bool,
}

/// Bidding record (licitação row) as served by the procurement API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LicitacaoRecord {
    pub id: String,
    pub nup: String,
    pub numero_contratacao: Option<String>,
    pub ano: Option<i32>,
    pub area_demandante: Option<String>,
    pub responsavel_instrucao: Option<String>,
    pub modalidade: Option<String>,
    pub objeto: Option<String>,
    pub pregoeiro: Option<String>,
    pub valor_estimado: Option<f64>,
    pub valor_homologado: Option<f64>,
    pub data_homologacao: Option<NaiveDate>,
    pub status: Option<String>,
    pub economia: Option<f64>,
}
