use bson::Bson;
use serde::{Deserialize, Serialize};

// Safety limits enforced by the execution layer, never by the builder
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_SORT_FIELDS: usize = 8;
pub(crate) const MAX_PROJECTION_FIELDS: usize = 64;
pub(crate) const MAX_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Asc }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Desc }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    /// Recognizes the comparison keys accepted in list-request parameters.
    /// Anything else is treated as equality (or dropped, if nested).
    #[must_use]
    pub fn from_param_key(key: &str) -> Option<Self> {
        match key {
            "gte" => Some(Self::Gte),
            "gt" => Some(Self::Gt),
            "lte" => Some(Self::Lte),
            "lt" => Some(Self::Lt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Cmp { path: String, op: CmpOp, value: Bson },
}

/// Which fields of a record to return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// Every field except the internal version field.
    #[default]
    All,
    /// The listed fields, plus the identifier.
    Fields(Vec<String>),
}

/// Options for `find_docs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    pub projection: Projection,
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}
