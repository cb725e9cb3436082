use crate::models::{LicitacaoRecord, PcaRecord};

/// Sentinel grouping key meaning "one bucket for everything". Offered in the
/// field pickers instead of high-cardinality dimensions that would pollute a
/// chart with hundreds of categories.
pub const TOTAL_FIELD: &str = "__total__";

/// One configurable grouping dimension: a stable key (what widget configs
/// store), a display label, and a typed accessor into the record shape.
pub struct FieldSpec<R> {
    pub key: &'static str,
    pub label: &'static str,
    /// Grouping by this field collapses to the single total bucket, same as
    /// [`TOTAL_FIELD`] (contract numbers are unique per row, so grouping by
    /// them is only ever asked for as "how many in total").
    pub collapses_to_total: bool,
    pub get: fn(&R) -> Option<String>,
}

/// The grouping dimensions and amount accessor registered once per dataset
/// shape. Widget configs refer to fields by key; resolution happens here
/// instead of dynamic indexing into untyped rows.
pub struct FieldCatalog<R> {
    pub dataset: &'static str,
    pub fields: Vec<FieldSpec<R>>,
    amount: fn(&R) -> f64,
}

impl<R> FieldCatalog<R> {
    pub fn field(&self, key: &str) -> Option<&FieldSpec<R>> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Grouping value of `record` under `key`. Unknown keys resolve to
    /// `None`, which the aggregation maps to the placeholder bucket, so a
    /// stale persisted widget still renders instead of erroring.
    pub fn group_value(&self, key: &str, record: &R) -> Option<String> {
        let spec = self.field(key)?;
        (spec.get)(record).filter(|value| !value.is_empty())
    }

    pub fn collapses_to_total(&self, key: &str) -> bool {
        key == TOTAL_FIELD
            || self
                .field(key)
                .map(|field| field.collapses_to_total)
                .unwrap_or(false)
    }

    /// Numeric amount used by the `value` metric. Missing amounts count as 0.
    pub fn amount(&self, record: &R) -> f64 {
        (self.amount)(record)
    }
}

/// Dimensions offered on the planning (PCA) dashboards.
pub fn pca_catalog() -> FieldCatalog<PcaRecord> {
    FieldCatalog {
        dataset: "planejamento",
        fields: vec![
            FieldSpec {
                key: "situacao_execucao",
                label: "Situação da Execução",
                collapses_to_total: false,
                get: |record| record.situacao_execucao.clone(),
            },
            FieldSpec {
                key: "categoria_contratacao",
                label: "Categorias",
                collapses_to_total: false,
                get: |record| record.categoria_contratacao.clone(),
            },
            FieldSpec {
                key: "area_requisitante",
                label: "Área Requisitante",
                collapses_to_total: false,
                get: |record| record.area_requisitante.clone(),
            },
            FieldSpec {
                key: "area_demandante",
                label: "Área Demandante",
                collapses_to_total: false,
                get: |record| record.area_demandante.clone(),
            },
            FieldSpec {
                key: "status_contratacao",
                label: "Status da Contratação",
                collapses_to_total: false,
                get: |record| record.status_contratacao.clone(),
            },
            FieldSpec {
                key: "numero_contratacao",
                label: "Total de Contratações",
                collapses_to_total: true,
                get: |record| Some(record.numero_contratacao.clone()),
            },
            FieldSpec {
                key: "ano_pca",
                label: "Ano do PCA",
                collapses_to_total: false,
                get: |record| record.ano_pca.map(|ano| ano.to_string()),
            },
        ],
        amount: |record| record.valor_total.unwrap_or(0.0),
    }
}

/// Dimensions offered on the bidding (licitação) dashboards. The `value`
/// metric sums the homologated amount.
pub fn licitacao_catalog() -> FieldCatalog<LicitacaoRecord> {
    FieldCatalog {
        dataset: "licitacao",
        fields: vec![
            FieldSpec {
                key: "status",
                label: "Status",
                collapses_to_total: false,
                get: |record| record.status.clone(),
            },
            FieldSpec {
                key: "modalidade",
                label: "Modalidade",
                collapses_to_total: false,
                get: |record| record.modalidade.clone(),
            },
            FieldSpec {
                key: "area_demandante",
                label: "Área Demandante",
                collapses_to_total: false,
                get: |record| record.area_demandante.clone(),
            },
            FieldSpec {
                key: "pregoeiro",
                label: "Pregoeiro",
                collapses_to_total: false,
                get: |record| record.pregoeiro.clone(),
            },
            FieldSpec {
                key: "ano",
                label: "Ano",
                collapses_to_total: false,
                get: |record| record.ano.map(|ano| ano.to_string()),
            },
        ],
        amount: |record| record.valor_homologado.unwrap_or(0.0),
    }
}
