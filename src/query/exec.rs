use crate::collection::Collection;
use crate::document::{Document, VERSION_FIELD};
use crate::errors::DbError;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use super::backend::DocumentQuery;
use super::cursor::Cursor;
use super::eval::{compare_docs, eval_filter, project_fields};
use super::types::{
    Filter, FindOptions, MAX_LIMIT, MAX_PROJECTION_FIELDS, MAX_SORT_FIELDS, Projection,
};

/// Runs a fully shaped query against a collection: filter, then sort, then
/// project, then skip/limit. Pagination past the end of the result set yields
/// an empty result, not an error.
pub fn find_docs(col: &Arc<Collection>, filter: &Filter, opts: &FindOptions) -> Cursor {
    let bench_start = Instant::now();
    let deadline = opts
        .timeout_ms
        .map(|ms| bench_start + std::time::Duration::from_millis(ms));

    let mut docs: Vec<Document> = Vec::new();
    for id in col.list_ids() {
        if let Some(dl) = deadline
            && Instant::now() > dl
        {
            break;
        }
        if let Some(d) = col.find_document(&id)
            && eval_filter(&d.data, filter)
        {
            docs.push(d);
        }
    }

    if let Some(sort) = &opts.sort {
        if sort.len() > MAX_SORT_FIELDS {
            log::warn!("sort spec too long: {}", sort.len());
        }
        docs.sort_by(|a, b| compare_docs(&a.data, &b.data, sort));
    }

    match &opts.projection {
        Projection::All => {
            for d in &mut docs {
                d.data.remove(VERSION_FIELD);
            }
        }
        Projection::Fields(fields) => {
            let fields: Vec<String> = fields.iter().take(MAX_PROJECTION_FIELDS).cloned().collect();
            for d in &mut docs {
                d.data = project_fields(&d.data, &fields);
            }
        }
    }

    let skip = opts.skip.unwrap_or(0);
    let limit = opts.limit.unwrap_or(usize::MAX).min(MAX_LIMIT);
    let end = skip.saturating_add(limit).min(docs.len());
    let docs = if skip >= docs.len() { Vec::new() } else { docs[skip..end].to_vec() };
    log::debug!(
        "{{\"query\":\"find\",\"collection\":\"{}\",\"duration_ms\":{},\"result_count\":{},\"limit\":{},\"skip\":{}}}",
        col.name_str(),
        bench_start.elapsed().as_millis(),
        docs.len(),
        opts.limit.unwrap_or(0),
        skip
    );
    Cursor::new(docs)
}

/// Total number of documents matching the filter, for callers shaping
/// `{status, results, data}` response envelopes.
#[must_use]
pub fn count_docs(col: &Arc<Collection>, filter: &Filter) -> usize {
    let start = Instant::now();
    let mut n = 0usize;
    for id in col.list_ids() {
        if let Some(d) = col.find_document(&id)
            && eval_filter(&d.data, filter)
        {
            n += 1;
        }
    }
    log::debug!(
        "{{\"query\":\"count\",\"collection\":\"{}\",\"duration_ms\":{},\"result_count\":{}}}",
        col.name_str(),
        start.elapsed().as_millis(),
        n
    );
    n
}

/// The embedded store's implementation of [`DocumentQuery`].
///
/// Accumulates the descriptor through the shaping calls and runs the scan on
/// the blocking pool at execution time.
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    collection: Arc<Collection>,
    filter: Filter,
    opts: FindOptions,
}

impl MemoryQuery {
    #[must_use]
    pub fn new(collection: Arc<Collection>) -> Self {
        Self { collection, filter: Filter::True, opts: FindOptions::default() }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.opts.timeout_ms = Some(timeout_ms);
        self
    }

    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    #[must_use]
    pub fn options(&self) -> &FindOptions {
        &self.opts
    }
}

impl DocumentQuery for MemoryQuery {
    fn find(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    fn sort(mut self, sort: Vec<super::types::SortSpec>) -> Self {
        self.opts.sort = Some(sort);
        self
    }

    fn select(mut self, projection: Projection) -> Self {
        self.opts.projection = projection;
        self
    }

    fn skip(mut self, n: usize) -> Self {
        self.opts.skip = Some(n);
        self
    }

    fn limit(mut self, n: usize) -> Self {
        self.opts.limit = Some(n);
        self
    }

    fn execute(self) -> impl Future<Output = Result<Cursor, DbError>> + Send {
        async move {
            let Self { collection, filter, opts } = self;
            tokio::task::spawn_blocking(move || find_docs(&collection, &filter, &opts))
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))
        }
    }
}
