pub mod aggregate;
pub mod catalog;
pub mod chart;
pub mod db;
pub mod engine;
pub mod errors;
pub mod models;
pub mod persistence;
pub mod source;

pub use crate::aggregate::{aggregate, AggregatedSeries, MatrixRow, SeriesRow};
pub use crate::catalog::{licitacao_catalog, pca_catalog, FieldCatalog, FieldSpec, TOTAL_FIELD};
pub use crate::chart::{degrade_chart_type, render_chart, ChartSpec};
pub use crate::db::Database;
pub use crate::engine::{DashboardEngine, WidgetChart};
pub use crate::errors::{AppError, AppResult};
pub use crate::models::{
    ChartType, DashboardSnapshot, LayoutEntry, Layouts, LicitacaoRecord, MetricKind, PaletteName,
    PcaRecord, WidgetConfig, WidgetDraft, CANONICAL_BREAKPOINT,
};
pub use crate::persistence::{
    DashboardScope, KeyValueStore, PersistenceAdapter, ANONYMOUS_USER_ID,
};
pub use crate::source::{fetch_all_records, RecordSource, MAX_PAGES, PAGE_SIZE};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn init_tracing(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "dashboards.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
