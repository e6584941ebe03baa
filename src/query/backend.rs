use crate::errors::DbError;
use std::future::Future;

use super::cursor::Cursor;
use super::types::{Filter, Projection, SortSpec};

/// The composable query a backend exposes for execution.
///
/// The five shaping operations consume and return the query so that callers
/// can chain them without hidden mutation; `execute` is the request's single
/// suspension point. Backends own type validation and safety limits; a
/// filter over a field the backend does not know simply matches nothing.
pub trait DocumentQuery: Sized {
    fn find(self, filter: Filter) -> Self;
    fn sort(self, sort: Vec<SortSpec>) -> Self;
    fn select(self, projection: Projection) -> Self;
    fn skip(self, n: usize) -> Self;
    fn limit(self, n: usize) -> Self;

    fn execute(self) -> impl Future<Output = Result<Cursor, DbError>> + Send;
}
