// Submodules for separation of concerns
mod backend;
mod builder;
mod cursor;
mod eval;
mod exec;
mod params;
mod types;

// Public API re-exports
pub use backend::DocumentQuery;
pub use builder::{QueryBuilder, default_sort};
pub use cursor::Cursor;
pub use eval::{compare_bson, compare_docs, eval_filter, project_fields};
pub use exec::{MemoryQuery, count_docs, find_docs};
pub use params::{FilterParam, ListParams};
pub use types::{CmpOp, Filter, FindOptions, Order, Projection, SortSpec};
