use crate::core::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Store-maintained bookkeeping. Stamped on save, never by callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A single record instance: a typed attribute map plus an identity the
/// store assigns on first save. Columns never written read back as
/// `Value::Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: Option<Uuid>,
    type_name: String,
    #[serde(default)]
    owner_id: Option<Uuid>,
    values: BTreeMap<String, Value>,
    metadata: RecordMetadata,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: None,
            type_name: type_name.into(),
            owner_id: None,
            values: BTreeMap::new(),
            metadata: RecordMetadata::default(),
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Foreign-key-style back reference: the id of the record this one
    /// belongs to. Stamped by the facade when an extension is saved.
    pub fn owner_id(&self) -> Option<Uuid> {
        self.owner_id
    }

    pub(crate) fn set_owner(&mut self, owner: Uuid) {
        self.owner_id = Some(owner);
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn get(&self, column: &str) -> Value {
        self.values.get(column).cloned().unwrap_or(Value::Null)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    /// Assigns identity on first save and stamps timestamps. Called by the
    /// store as part of `save`; not part of the public mutation surface.
    pub(crate) fn mark_saved(&mut self, now: DateTime<Utc>) -> Uuid {
        let id = match self.id {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                self.id = Some(id);
                self.metadata.created_at = Some(now);
                id
            }
        };
        self.metadata.updated_at = Some(now);
        id
    }
}
