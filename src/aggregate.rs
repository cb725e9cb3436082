use crate::catalog::FieldCatalog;
use crate::models::MetricKind;
use serde::Serialize;
use std::collections::HashMap;

/// Label every missing, null, or empty grouping value is folded into, so no
/// record is dropped from a chart.
pub const MISSING_GROUP_LABEL: &str = "—";

/// Row label of the collapsed single bucket in total mode.
pub const TOTAL_BUCKET_LABEL: &str = "Total";

/// Normalization policy for grouping values: absent values become the
/// placeholder label instead of dropping the record.
pub fn normalize_group_key(value: Option<String>) -> String {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => MISSING_GROUP_LABEL.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRow {
    pub name: String,
    pub value: f64,
}

/// One category row of a multi-series aggregation. `cells` is aligned with
/// the `series_keys` returned next to it; unobserved combinations hold 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRow {
    pub name: String,
    pub cells: Vec<f64>,
}

/// Chart-ready aggregation output. Row order and series-key order are the
/// first-seen order of distinct values in the input, which keeps rendered
/// legend order stable across reloads of the same dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum AggregatedSeries {
    Flat {
        rows: Vec<SeriesRow>,
    },
    #[serde(rename_all = "camelCase")]
    Matrix {
        rows: Vec<MatrixRow>,
        series_keys: Vec<String>,
    },
}

impl AggregatedSeries {
    /// True when the data carries series keys, i.e. the renderer must draw
    /// one series per key.
    pub fn is_multi_series(&self) -> bool {
        matches!(self, Self::Matrix { .. })
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Flat { rows } => rows.is_empty(),
            Self::Matrix { rows, .. } => rows.is_empty(),
        }
    }
}

/// Derives chart-ready series from raw records.
///
/// Grouping by `x_field` with an optional `y_field` sub-grouping; `metric`
/// decides whether each record contributes 1 (`count`) or the dataset's
/// amount field (`value`). Fields that collapse to total produce a single
/// bucket, or plain y-grouping when `y_field` is set.
pub fn aggregate<R>(
    records: &[R],
    catalog: &FieldCatalog<R>,
    x_field: &str,
    metric: MetricKind,
    y_field: Option<&str>,
) -> AggregatedSeries {
    let contribution = |record: &R| match metric {
        MetricKind::Count => 1.0,
        MetricKind::Value => catalog.amount(record),
    };

    if catalog.collapses_to_total(x_field) {
        let Some(y_field) = y_field else {
            let value = records.iter().map(contribution).sum();
            return AggregatedSeries::Flat {
                rows: vec![SeriesRow {
                    name: TOTAL_BUCKET_LABEL.to_string(),
                    value,
                }],
            };
        };
        let mut rows = Vec::new();
        for record in records {
            let name = normalize_group_key(catalog.group_value(y_field, record));
            bump(&mut rows, name, contribution(record));
        }
        return AggregatedSeries::Flat { rows };
    }

    let Some(y_field) = y_field else {
        let mut rows = Vec::new();
        for record in records {
            let name = normalize_group_key(catalog.group_value(x_field, record));
            bump(&mut rows, name, contribution(record));
        }
        return AggregatedSeries::Flat { rows };
    };

    let mut categories: Vec<String> = Vec::new();
    let mut series_keys: Vec<String> = Vec::new();
    let mut cells: HashMap<(usize, usize), f64> = HashMap::new();
    for record in records {
        let x = normalize_group_key(catalog.group_value(x_field, record));
        let y = normalize_group_key(catalog.group_value(y_field, record));
        let xi = first_seen_index(&mut categories, x);
        let yi = first_seen_index(&mut series_keys, y);
        *cells.entry((xi, yi)).or_insert(0.0) += contribution(record);
    }

    let rows = categories
        .into_iter()
        .enumerate()
        .map(|(xi, name)| MatrixRow {
            name,
            cells: (0..series_keys.len())
                .map(|yi| cells.get(&(xi, yi)).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();

    AggregatedSeries::Matrix { rows, series_keys }
}

fn bump(rows: &mut Vec<SeriesRow>, name: String, add: f64) {
    if let Some(row) = rows.iter_mut().find(|row| row.name == name) {
        row.value += add;
    } else {
        rows.push(SeriesRow { name, value: add });
    }
}

fn first_seen_index(order: &mut Vec<String>, value: String) -> usize {
    if let Some(index) = order.iter().position(|seen| *seen == value) {
        index
    } else {
        order.push(value);
        order.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::{aggregate, AggregatedSeries, MISSING_GROUP_LABEL, TOTAL_BUCKET_LABEL};
    use crate::catalog::{pca_catalog, TOTAL_FIELD};
    use crate::models::{MetricKind, PcaRecord};

    fn record(status: Option<&str>, area: Option<&str>, valor: Option<f64>) -> PcaRecord {
        PcaRecord {
            status_contratacao: status.map(ToString::to_string),
            area_requisitante: area.map(ToString::to_string),
            valor_total: valor,
            ..PcaRecord::default()
        }
    }

    fn flat_rows(series: AggregatedSeries) -> Vec<(String, f64)> {
        match series {
            AggregatedSeries::Flat { rows } => {
                rows.into_iter().map(|row| (row.name, row.value)).collect()
            }
            AggregatedSeries::Matrix { .. } => panic!("expected flat series"),
        }
    }

    #[test]
    fn counts_group_in_first_seen_order() {
        let records = vec![
            record(Some("A"), None, None),
            record(Some("A"), None, None),
            record(Some("B"), None, None),
        ];
        let series = aggregate(
            &records,
            &pca_catalog(),
            "status_contratacao",
            MetricKind::Count,
            None,
        );
        assert_eq!(
            flat_rows(series),
            vec![("A".to_string(), 2.0), ("B".to_string(), 1.0)]
        );
    }

    #[test]
    fn single_group_count_equals_record_count() {
        let records = vec![record(Some("A"), None, None); 7];
        let series = aggregate(
            &records,
            &pca_catalog(),
            "status_contratacao",
            MetricKind::Count,
            None,
        );
        assert_eq!(flat_rows(series), vec![("A".to_string(), 7.0)]);
    }

    #[test]
    fn missing_values_land_in_the_placeholder_bucket() {
        let records = vec![record(None, None, None), record(Some("A"), None, None)];
        let series = aggregate(
            &records,
            &pca_catalog(),
            "status_contratacao",
            MetricKind::Count,
            None,
        );
        assert_eq!(
            flat_rows(series),
            vec![
                (MISSING_GROUP_LABEL.to_string(), 1.0),
                ("A".to_string(), 1.0)
            ]
        );
    }

    #[test]
    fn unknown_field_groups_everything_under_placeholder() {
        let records = vec![record(Some("A"), None, None), record(Some("B"), None, None)];
        let series = aggregate(&records, &pca_catalog(), "no_such_field", MetricKind::Count, None);
        assert_eq!(
            flat_rows(series),
            vec![(MISSING_GROUP_LABEL.to_string(), 2.0)]
        );
    }

    #[test]
    fn sum_of_missing_amounts_is_zero_never_nan() {
        let records = vec![
            record(Some("A"), None, None),
            record(Some("A"), None, Some(0.0)),
            record(Some("B"), None, None),
        ];
        let series = aggregate(
            &records,
            &pca_catalog(),
            "status_contratacao",
            MetricKind::Value,
            None,
        );
        for (_, value) in flat_rows(series) {
            assert_eq!(value, 0.0);
            assert!(!value.is_nan());
        }
    }

    #[test]
    fn aggregation_is_deterministic_for_fixed_input_order() {
        let records = vec![
            record(Some("B"), Some("TI"), Some(10.0)),
            record(Some("A"), Some("RH"), Some(5.0)),
            record(Some("B"), Some("RH"), Some(2.5)),
        ];
        let catalog = pca_catalog();
        let first = aggregate(
            &records,
            &catalog,
            "status_contratacao",
            MetricKind::Value,
            Some("area_requisitante"),
        );
        let second = aggregate(
            &records,
            &catalog,
            "status_contratacao",
            MetricKind::Value,
            Some("area_requisitante"),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn series_keys_cover_values_seen_in_a_single_group() {
        let records = vec![
            record(Some("A"), Some("TI"), None),
            record(Some("A"), Some("RH"), None),
            record(Some("B"), Some("Obras"), None),
        ];
        let series = aggregate(
            &records,
            &pca_catalog(),
            "status_contratacao",
            MetricKind::Count,
            Some("area_requisitante"),
        );
        let AggregatedSeries::Matrix { rows, series_keys } = series else {
            panic!("expected matrix series");
        };
        assert_eq!(series_keys, vec!["TI", "RH", "Obras"]);
        // Unobserved combinations are zero-filled, cells align with keys.
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[0].cells, vec![1.0, 1.0, 0.0]);
        assert_eq!(rows[1].name, "B");
        assert_eq!(rows[1].cells, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn total_mode_collapses_to_a_single_bucket() {
        let records = vec![
            record(Some("A"), None, Some(10.0)),
            record(Some("B"), None, Some(2.5)),
        ];
        let catalog = pca_catalog();

        let counted = aggregate(&records, &catalog, TOTAL_FIELD, MetricKind::Count, None);
        assert_eq!(
            flat_rows(counted),
            vec![(TOTAL_BUCKET_LABEL.to_string(), 2.0)]
        );

        let summed = aggregate(&records, &catalog, "numero_contratacao", MetricKind::Value, None);
        assert_eq!(
            flat_rows(summed),
            vec![(TOTAL_BUCKET_LABEL.to_string(), 12.5)]
        );
    }

    #[test]
    fn total_mode_with_sub_grouping_groups_by_y_only() {
        let records = vec![
            record(Some("A"), Some("TI"), None),
            record(Some("B"), Some("TI"), None),
            record(Some("A"), Some("RH"), None),
        ];
        let series = aggregate(
            &records,
            &pca_catalog(),
            TOTAL_FIELD,
            MetricKind::Count,
            Some("area_requisitante"),
        );
        assert_eq!(
            flat_rows(series),
            vec![("TI".to_string(), 2.0), ("RH".to_string(), 1.0)]
        );
    }

    #[test]
    fn empty_input_produces_empty_series() {
        let series = aggregate(
            &[],
            &pca_catalog(),
            "status_contratacao",
            MetricKind::Count,
            None,
        );
        assert!(series.is_empty());
    }
}
