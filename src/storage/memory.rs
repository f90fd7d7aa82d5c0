use super::catalog::{Catalog, RecordStore, SchemaProvider};
use crate::core::{Error, Result, Schema};
use crate::record::Record;
use chrono::Utc;
use log::debug;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory reference store: one row map per registered record type, rows
/// keyed by record id. Enforces schema constraints on save and stamps
/// record metadata. No versioning and no locking; concurrent callers must
/// bring their own coordination.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: Catalog,
    rows: HashMap<String, HashMap<Uuid, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: impl Into<String>, schema: Schema) -> Result<()> {
        let name = type_name.into();
        self.catalog.register(name.clone(), schema)?;
        self.rows.insert(name, HashMap::new());
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn find(&self, type_name: &str, id: Uuid) -> Option<&Record> {
        self.rows.get(type_name).and_then(|table| table.get(&id))
    }

    pub fn row_count(&self, type_name: &str) -> usize {
        self.rows.get(type_name).map(|table| table.len()).unwrap_or(0)
    }

    pub(super) fn tables(&self) -> &HashMap<String, HashMap<Uuid, Record>> {
        &self.rows
    }

    pub(super) fn restore(
        &mut self,
        catalog: Catalog,
        rows: HashMap<String, HashMap<Uuid, Record>>,
    ) {
        self.catalog = catalog;
        self.rows = rows;
    }

    fn validate_against_schema(&self, record: &Record) -> Result<()> {
        let schema = self.catalog.schema(record.type_name())?;
        for (column_name, value) in record.values() {
            let column = schema.column(column_name).ok_or_else(|| {
                Error::UnknownAttribute(column_name.clone(), record.type_name().to_string())
            })?;
            column.validate(value)?;
        }
        Ok(())
    }
}

impl SchemaProvider for MemoryStore {
    fn schema(&self, type_name: &str) -> Result<&Schema> {
        self.catalog.schema(type_name)
    }
}

impl RecordStore for MemoryStore {
    fn save(&mut self, record: &mut Record) -> Result<()> {
        self.validate_against_schema(record)?;

        let id = record.mark_saved(Utc::now());
        let table = self
            .rows
            .get_mut(record.type_name())
            .ok_or_else(|| Error::UnknownType(record.type_name().to_string()))?;
        table.insert(id, record.clone());
        debug!("saved {} row {}", record.type_name(), id);
        Ok(())
    }

    fn destroy(&mut self, record: &Record) -> Result<()> {
        let id = record
            .id()
            .ok_or_else(|| Error::NotPersisted(record.type_name().to_string()))?;
        let table = self
            .rows
            .get_mut(record.type_name())
            .ok_or_else(|| Error::UnknownType(record.type_name().to_string()))?;
        table.remove(&id);
        debug!("destroyed {} row {}", record.type_name(), id);
        Ok(())
    }

    fn find_owned(&self, type_name: &str, owner: Uuid) -> Option<Record> {
        self.rows
            .get(type_name)?
            .values()
            .find(|record| record.owner_id() == Some(owner))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType, Value};

    fn store_with_users() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .register(
                "user",
                Schema::new(vec![
                    Column::new("name", DataType::Text).not_null(),
                    Column::new("age", DataType::Integer),
                ]),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_save_assigns_id_once() {
        let mut store = store_with_users();
        let mut user = Record::new("user");
        user.set("name", "Alice");

        store.save(&mut user).unwrap();
        let id = user.id().unwrap();
        assert_eq!(store.row_count("user"), 1);

        user.set("age", 30i64);
        store.save(&mut user).unwrap();
        assert_eq!(user.id().unwrap(), id);
        assert_eq!(store.row_count("user"), 1);
        assert_eq!(store.find("user", id).unwrap().get("age"), Value::Integer(30));
    }

    #[test]
    fn test_save_enforces_schema() {
        let mut store = store_with_users();

        let mut user = Record::new("user");
        user.set("name", Value::Null);
        let err = store.save(&mut user).unwrap_err();
        assert!(err.to_string().contains("cannot be NULL"));

        let mut user = Record::new("user");
        user.set("name", "Bob");
        user.set("age", "old");
        let err = store.save(&mut user).unwrap_err();
        assert!(err.to_string().contains("expects type INTEGER"));

        let mut user = Record::new("user");
        user.set("name", "Bob");
        user.set("shoe_size", 43i64);
        assert!(store.save(&mut user).is_err());
    }

    #[test]
    fn test_destroy() {
        let mut store = store_with_users();
        let mut user = Record::new("user");
        user.set("name", "Alice");
        store.save(&mut user).unwrap();

        store.destroy(&user).unwrap();
        assert_eq!(store.row_count("user"), 0);

        let unsaved = Record::new("user");
        assert!(matches!(store.destroy(&unsaved), Err(Error::NotPersisted(_))));
    }
}
