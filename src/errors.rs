use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Collection not found: {0}")]
    NoSuchCollection(String),

    #[error("Collection already exists: {0}")]
    CollectionAlreadyExists(String),

    #[error("Document not found: {0}")]
    NoSuchDocument(String),

    #[error("Query error: {0}")]
    QueryError(String),
}
