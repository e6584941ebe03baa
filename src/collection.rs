use crate::document::Document;
use crate::types::DocumentId;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct Collection {
    pub name: Arc<RwLock<String>>,
    docs: RwLock<BTreeMap<DocumentId, Document>>,
}

impl Collection {
    #[must_use]
    pub fn new(name: String) -> Self {
        Collection { name: Arc::new(RwLock::new(name)), docs: RwLock::new(BTreeMap::new()) }
    }

    pub fn insert_document(&self, document: Document) -> DocumentId {
        let doc_id = document.id;
        self.docs.write().insert(doc_id, document);
        doc_id
    }

    pub fn find_document(&self, id: &DocumentId) -> Option<Document> {
        self.docs.read().get(id).cloned()
    }

    pub fn update_document(&self, id: &DocumentId, new_document: Document) -> bool {
        let mut docs = self.docs.write();
        if docs.contains_key(id) {
            docs.insert(*id, new_document);
            true
        } else {
            false
        }
    }

    pub fn delete_document(&self, id: &DocumentId) -> bool {
        self.docs.write().remove(id).is_some()
    }

    /// Identifiers of every stored document, in identifier order.
    pub fn list_ids(&self) -> Vec<DocumentId> {
        self.docs.read().keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    pub fn set_name(&self, new_name: String) {
        *self.name.write() = new_name;
    }

    /// Returns the collection's name as a String (cloned), hiding the RwLock.
    pub fn name_str(&self) -> String {
        self.name.read().clone()
    }
}
