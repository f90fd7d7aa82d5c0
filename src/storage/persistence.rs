use super::catalog::{Catalog, SchemaProvider};
use super::memory::MemoryStore;
use crate::core::{Error, Result, Schema};
use crate::record::Record;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Serialized form of a [`MemoryStore`]: schemas plus all rows, written as
/// a single JSON document.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    schemas: HashMap<String, Schema>,
    rows: HashMap<String, HashMap<Uuid, Record>>,
}

impl StoreSnapshot {
    fn capture(store: &MemoryStore) -> Self {
        let schemas = store
            .catalog()
            .list_types()
            .into_iter()
            .map(|name| {
                // Registered types always resolve.
                let schema = store.catalog().schema(name).cloned().unwrap_or_else(|_| Schema::new(Vec::new()));
                (name.to_string(), schema)
            })
            .collect();
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            created_at: Utc::now(),
            schemas,
            rows: store.tables().clone(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.values().map(|table| table.len()).sum()
    }
}

impl MemoryStore {
    /// Writes the full store state to `path`. The write is atomic: content
    /// goes to a temp file in the same directory, then replaces the target.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let snapshot = StoreSnapshot::capture(self);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let temp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path)
            .map_err(|e| Error::Io(e.error))?;
        debug!("snapshot written: {} rows to {}", snapshot.row_count(), path.display());
        Ok(())
    }

    /// Replaces the store's catalog and rows with the snapshot at `path`.
    pub fn load_snapshot<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::open(path.as_ref())?;
        let snapshot: StoreSnapshot = serde_json::from_reader(file)?;
        if snapshot.version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::ConstraintViolation(format!(
                "Unsupported snapshot format version {}",
                snapshot.version
            )));
        }

        let mut catalog = Catalog::new();
        for (name, schema) in snapshot.schemas {
            catalog.register(name, schema)?;
        }
        self.restore(catalog, snapshot.rows);
        Ok(())
    }
}
