// ============================================================================
// recordext Library
// ============================================================================
//
// Extension-record delegation for embedded record stores. A "primary"
// record type delegates a configurable set of column accessors to an
// associated "extension" record: the extension is materialized lazily on
// first access, saved whenever the primary is saved, destroyed with it,
// and its validation errors merge back into the primary's error set.

pub mod core;
pub mod facade;
pub mod record;
pub mod storage;
pub mod validate;

// Re-export main types for convenience
pub use crate::core::{Column, DataType, Error, Result, Schema, Value};
pub use facade::{BindOptions, ExtendedRecord, ExtensionBinding};
pub use record::{Record, RecordMetadata};
pub use storage::{Catalog, MemoryStore, RecordStore, SchemaProvider};
pub use validate::Errors;

/// Convenience alias for [`ExtensionBinding::bind`].
///
/// # Examples
///
/// ```
/// use recordext::{BindOptions, Column, DataType, ExtendedRecord, ExtensionBinding,
///                 MemoryStore, Record, Schema};
///
/// # fn main() -> recordext::Result<()> {
/// let mut store = MemoryStore::new();
/// store.register("user", Schema::new(vec![
///     Column::new("id", DataType::Text),
///     Column::new("name", DataType::Text),
/// ]))?;
/// store.register("user_extension", Schema::new(vec![
///     Column::new("id", DataType::Text),
///     Column::new("can_set_as_final", DataType::Boolean),
/// ]))?;
///
/// let binding = ExtensionBinding::bind(&store, "user", "user_extension",
///                                      BindOptions::new())?;
/// let mut user = ExtendedRecord::new(binding.into(), Record::new("user"))?;
///
/// assert!(!user.is_set("can_set_as_final")?);   // extension materialized, default falsy
/// user.set("can_set_as_final", true)?;
/// assert!(user.is_set("can_set_as_final")?);
///
/// user.save(&mut store)?;                       // persists user AND its extension
/// # Ok(())
/// # }
/// ```
pub fn bind(
    provider: &impl SchemaProvider,
    primary_type: &str,
    extension_type: &str,
    options: BindOptions,
) -> Result<ExtensionBinding> {
    ExtensionBinding::bind(provider, primary_type, extension_type, options)
}
