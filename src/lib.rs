pub mod collection;
pub mod config;
pub mod document;
pub mod errors;
pub mod logger;
pub mod query;
pub mod types;

use crate::collection::Collection;
use crate::config::QueryConfig;
use crate::document::Document;
use crate::errors::DbError;
use crate::query::{Cursor, DocumentQuery, ListParams, MemoryQuery, QueryBuilder};
use crate::types::{CollectionName, DocumentId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// The embedded document store: named collections plus the list-request
/// query pipeline over them.
#[derive(Default)]
pub struct Store {
    collections: RwLock<HashMap<CollectionName, Arc<Collection>>>,
    config: QueryConfig,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    #[must_use]
    pub fn with_config(config: QueryConfig) -> Self {
        Store { collections: RwLock::new(HashMap::new()), config }
    }

    /// Creates a new collection with the given name, or returns the existing
    /// one.
    pub fn create_collection(&self, name: &str) -> Arc<Collection> {
        let mut cols = self.collections.write();
        cols.entry(name.to_string())
            .or_insert_with(|| Arc::new(Collection::new(name.to_string())))
            .clone()
    }

    /// Retrieves a collection by its name.
    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    /// Deletes a collection by its name.
    pub fn delete_collection(&self, name: &str) -> bool {
        self.collections.write().remove(name).is_some()
    }

    /// Lists the names of all collections.
    pub fn list_collection_names(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    /// Rename a collection.
    ///
    /// # Errors
    /// Returns an error if the source is missing or the target name is taken.
    pub fn rename_collection(&self, old: &str, new: &str) -> Result<(), DbError> {
        let mut cols = self.collections.write();
        if cols.contains_key(new) {
            return Err(DbError::CollectionAlreadyExists(new.to_string()));
        }
        let col = cols.remove(old).ok_or_else(|| DbError::NoSuchCollection(old.to_string()))?;
        col.set_name(new.to_string());
        cols.insert(new.to_string(), col);
        Ok(())
    }

    /// Inserts a document into the specified collection.
    ///
    /// # Errors
    /// Returns an error if the collection does not exist.
    pub fn insert_document(
        &self,
        collection_name: &str,
        data: bson::Document,
    ) -> Result<DocumentId, DbError> {
        let collection = self
            .get_collection(collection_name)
            .ok_or_else(|| DbError::NoSuchCollection(collection_name.to_string()))?;
        Ok(collection.insert_document(Document::new(data)))
    }

    // --- Query API (façade over the query module) ---

    /// Runs the full list pipeline (filter, sort, projection, pagination)
    /// against a collection.
    ///
    /// # Errors
    /// Returns an error if the collection does not exist or execution fails.
    pub async fn find(&self, collection_name: &str, params: ListParams) -> Result<Cursor, DbError> {
        let col = self
            .get_collection(collection_name)
            .ok_or_else(|| DbError::NoSuchCollection(collection_name.to_string()))?;
        QueryBuilder::with_config(MemoryQuery::new(col), params, self.config.clone())
            .apply()
            .execute()
            .await
    }

    /// Counts the documents matching the request's filter, ignoring its
    /// sort, projection and pagination parameters.
    ///
    /// # Errors
    /// Returns an error if the collection does not exist or execution fails.
    pub async fn count(&self, collection_name: &str, params: ListParams) -> Result<usize, DbError> {
        let col = self
            .get_collection(collection_name)
            .ok_or_else(|| DbError::NoSuchCollection(collection_name.to_string()))?;
        let query = QueryBuilder::with_config(MemoryQuery::new(col.clone()), params, self.config.clone())
            .filter()
            .into_query();
        let filter = query.filter().clone();
        tokio::task::spawn_blocking(move || query::count_docs(&col, &filter))
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))
    }
}

/// Initializes the logging system.
///
/// This function should be called once, before any other operations.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    logger::init()?;
    Ok(())
}
