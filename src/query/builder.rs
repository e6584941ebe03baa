use crate::config::QueryConfig;
use crate::document::{CREATED_AT_FIELD, ID_FIELD};

use super::backend::DocumentQuery;
use super::params::{FilterParam, ListParams};
use super::types::{CmpOp, Filter, Projection, SortSpec};

/// Translates one list request into a configured query.
///
/// Constructed once per request around a base query and the request's
/// parameters; each transformation consumes the builder and returns a new one
/// wrapping the updated query, so chaining never mutates in place. The
/// builder itself cannot fail: every malformed or missing input maps to a
/// defined default.
pub struct QueryBuilder<Q> {
    query: Q,
    params: ListParams,
    config: QueryConfig,
}

impl<Q: DocumentQuery> QueryBuilder<Q> {
    pub fn new(query: Q, params: ListParams) -> Self {
        Self::with_config(query, params, QueryConfig::default())
    }

    pub fn with_config(query: Q, params: ListParams, config: QueryConfig) -> Self {
        Self { query, params, config }
    }

    /// Translates the non-reserved parameters into match criteria. An empty
    /// filter set is a full scan. Field names are not validated against any
    /// schema; unknown fields match nothing at execution.
    #[must_use]
    pub fn filter(self) -> Self {
        let Self { query, params, config } = self;
        let mut conds = Vec::new();
        for (field, param) in params.filters() {
            match param {
                FilterParam::Scalar(v) => {
                    conds.push(Filter::Cmp { path: field.clone(), op: CmpOp::Eq, value: v.clone() });
                }
                FilterParam::Cmp(ops) => {
                    for (op, v) in ops {
                        conds.push(Filter::Cmp { path: field.clone(), op: *op, value: v.clone() });
                    }
                }
            }
        }
        let filter = if conds.is_empty() { Filter::True } else { Filter::And(conds) };
        Self { query: query.find(filter), params, config }
    }

    /// Applies the `sort` control string: comma-separated fields, leading `-`
    /// for descending. Absent sort falls back to newest-first with an
    /// identifier tie-break so pagination stays stable across pages.
    #[must_use]
    pub fn sort(self) -> Self {
        let Self { query, params, config } = self;
        let mut spec = params.sort.as_deref().map(parse_sort).unwrap_or_default();
        if spec.is_empty() {
            spec = default_sort();
        }
        Self { query: query.sort(spec), params, config }
    }

    /// Applies the `fields` control string as a projection. Absent projection
    /// means all fields except the internal version field.
    #[must_use]
    pub fn limit_fields(self) -> Self {
        let Self { query, params, config } = self;
        let projection = params.fields.as_deref().map(parse_fields).unwrap_or_default();
        Self { query: query.select(projection), params, config }
    }

    /// Derives `skip`/`limit` from `page` and `limit` under the
    /// numeric-or-default policy. No upper bound on `limit` is enforced here.
    #[must_use]
    pub fn paginate(self) -> Self {
        let Self { query, params, config } = self;
        let page = positive_or(params.page.as_deref(), config.default_page);
        let limit = positive_or(params.limit.as_deref(), config.default_limit);
        let skip = (page - 1).saturating_mul(limit);
        Self { query: query.skip(skip).limit(limit), params, config }
    }

    /// All four transformations in the canonical order. Pagination must come
    /// last; the other three commute.
    #[must_use]
    pub fn apply(self) -> Q {
        self.filter().sort().limit_fields().paginate().into_query()
    }

    pub fn into_query(self) -> Q {
        self.query
    }
}

/// The deterministic total order used when the request names no sort:
/// creation time descending, identifier ascending on ties.
#[must_use]
pub fn default_sort() -> Vec<SortSpec> {
    vec![SortSpec::desc(CREATED_AT_FIELD), SortSpec::asc(ID_FIELD)]
}

fn parse_sort(raw: &str) -> Vec<SortSpec> {
    raw.split(',')
        .filter_map(|part| {
            let part = part.trim();
            match part.strip_prefix('-') {
                Some("") => None,
                Some(field) => Some(SortSpec::desc(field)),
                None if part.is_empty() => None,
                None => Some(SortSpec::asc(part)),
            }
        })
        .collect()
}

fn parse_fields(raw: &str) -> Projection {
    let fields: Vec<String> =
        raw.split(',').map(str::trim).filter(|f| !f.is_empty()).map(String::from).collect();
    if fields.is_empty() { Projection::All } else { Projection::Fields(fields) }
}

fn positive_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok()).filter(|n| *n >= 1).unwrap_or(default)
}
