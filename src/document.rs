use crate::types::DocumentId;
use bson::{Bson, Document as BsonDocument};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Field the store always stamps with the document's identifier.
pub const ID_FIELD: &str = "_id";
/// Field the store stamps with the creation timestamp.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Internal version field, excluded from results unless explicitly projected.
pub const VERSION_FIELD: &str = "__v";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub data: BsonDocument,
}

impl Document {
    /// Wraps a BSON payload, stamping `_id`, `createdAt` and `__v` when the
    /// payload does not carry them already. A supplied `_id` is adopted when
    /// it parses as a UUID; anything else is overwritten so the stored key
    /// and the payload never diverge.
    #[must_use]
    pub fn new(mut data: BsonDocument) -> Self {
        let id = data
            .get_str(ID_FIELD)
            .ok()
            .and_then(|s| s.parse::<uuid::Uuid>().ok())
            .map_or_else(DocumentId::new, DocumentId::from);
        data.insert(ID_FIELD, Bson::String(id.to_string()));
        if !data.contains_key(CREATED_AT_FIELD) {
            let now = bson::DateTime::from_millis(Utc::now().timestamp_millis());
            data.insert(CREATED_AT_FIELD, Bson::DateTime(now));
        }
        if !data.contains_key(VERSION_FIELD) {
            data.insert(VERSION_FIELD, Bson::Int32(0));
        }
        Self { id, data }
    }

    /// Replaces the payload, preserving the stamped fields and bumping `__v`.
    pub fn update(&mut self, new_data: BsonDocument) {
        let id = self.data.get(ID_FIELD).cloned();
        let created = self.data.get(CREATED_AT_FIELD).cloned();
        let version = match self.data.get(VERSION_FIELD) {
            Some(Bson::Int32(v)) => v.saturating_add(1),
            _ => 0,
        };
        self.data = new_data;
        if let Some(id) = id {
            self.data.insert(ID_FIELD, id);
        }
        if let Some(created) = created {
            self.data.insert(CREATED_AT_FIELD, created);
        }
        self.data.insert(VERSION_FIELD, Bson::Int32(version));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn supplied_uuid_id_is_adopted() {
        let raw = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let d = Document::new(doc! {"_id": raw, "x": 1});
        assert_eq!(d.id.to_string(), raw);
        assert_eq!(d.data.get_str(ID_FIELD).unwrap(), raw);
    }

    #[test]
    fn non_uuid_id_is_overwritten_to_stay_consistent() {
        let d = Document::new(doc! {"_id": "tour-42", "x": 1});
        assert_eq!(d.data.get_str(ID_FIELD).unwrap(), d.id.to_string());
    }

    #[test]
    fn missing_id_is_stamped() {
        let d = Document::new(doc! {"x": 1});
        assert_eq!(d.data.get_str(ID_FIELD).unwrap(), d.id.to_string());
        assert!(d.data.get_datetime(CREATED_AT_FIELD).is_ok());
        assert_eq!(d.data.get_i32(VERSION_FIELD).unwrap(), 0);
    }
}
