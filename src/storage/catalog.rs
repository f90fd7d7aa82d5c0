use crate::core::{Error, Result, Schema};
use crate::record::Record;
use std::collections::HashMap;
use uuid::Uuid;

/// Resolves a record type name to its column metadata. The binding queries
/// this once, at configuration time.
pub trait SchemaProvider {
    fn schema(&self, type_name: &str) -> Result<&Schema>;
}

/// Synchronous persistence operations. `save` assigns identity on first
/// call; `destroy` removes the row; `find_owned` resolves the row of
/// `type_name` whose owner id equals `owner`, which is how a re-wrapped
/// primary finds its existing extension instead of growing a duplicate.
/// All report failures through the normal error channel, no retries at
/// this layer.
pub trait RecordStore {
    fn save(&mut self, record: &mut Record) -> Result<()>;
    fn destroy(&mut self, record: &Record) -> Result<()>;
    fn find_owned(&self, type_name: &str, owner: Uuid) -> Option<Record>;
}

/// Catalog holds only metadata: record type name -> schema. Registered once
/// at setup, read-only afterward.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    schemas: HashMap<String, Schema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: impl Into<String>, schema: Schema) -> Result<()> {
        let name = type_name.into();
        if self.schemas.contains_key(&name) {
            return Err(Error::ConstraintViolation(format!(
                "Record type '{}' is already registered",
                name
            )));
        }
        self.schemas.insert(name, schema);
        Ok(())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    pub fn list_types(&self) -> Vec<&str> {
        self.schemas.keys().map(|s| s.as_str()).collect()
    }
}

impl SchemaProvider for Catalog {
    fn schema(&self, type_name: &str) -> Result<&Schema> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};

    #[test]
    fn test_register_and_resolve() {
        let mut catalog = Catalog::new();
        let schema = Schema::new(vec![Column::new("id", DataType::Text)]);
        catalog.register("user", schema).unwrap();

        assert!(catalog.contains("user"));
        assert!(catalog.schema("user").is_ok());
        assert!(matches!(
            catalog.schema("ghost"),
            Err(Error::UnknownType(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut catalog = Catalog::new();
        let schema = Schema::new(vec![Column::new("id", DataType::Text)]);
        catalog.register("user", schema.clone()).unwrap();
        assert!(catalog.register("user", schema).is_err());
    }
}
