use super::binding::ExtensionBinding;
use crate::core::{Error, Result, Value};
use crate::record::Record;
use crate::storage::RecordStore;
use crate::validate::{validate_record, Errors};
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

/// A primary record paired with its lazily materialized extension.
///
/// The extension starts absent and is materialized (in memory, unsaved) by
/// the first delegated access or by `save`. Materialization is idempotent:
/// later accesses reuse the same instance. `destroy` consumes the wrapper,
/// so nothing can touch the pair after the cascade ran.
///
/// Save ordering is primary first, extension second, in one synchronous
/// call. If the extension save fails after the primary save succeeded, the
/// error is [`Error::ExtensionSaveFailed`] and the primary row stays saved;
/// this layer does not roll back, and callers wanting atomicity must bring
/// a transactional store.
#[derive(Debug, Clone)]
pub struct ExtendedRecord {
    binding: Arc<ExtensionBinding>,
    primary: Record,
    extension: Option<Record>,
}

impl ExtendedRecord {
    /// Wraps `primary` under `binding`. Fails if the record's type does not
    /// match the binding's primary type.
    pub fn new(binding: Arc<ExtensionBinding>, primary: Record) -> Result<Self> {
        if primary.type_name() != binding.primary_type() {
            return Err(Error::TypeMismatch(format!(
                "Binding is for '{}', got a '{}' record",
                binding.primary_type(),
                primary.type_name()
            )));
        }
        Ok(Self {
            binding,
            primary,
            extension: None,
        })
    }

    /// Wraps an already-persisted `primary`, attaching its existing
    /// extension from the store (resolved by owner id) instead of starting
    /// absent. This is the constructor for the reload flow; a fresh record
    /// goes through [`new`](Self::new).
    pub fn load(
        binding: Arc<ExtensionBinding>,
        primary: Record,
        store: &impl RecordStore,
    ) -> Result<Self> {
        let mut wrapped = Self::new(binding, primary)?;
        if let Some(owner) = wrapped.primary.id() {
            wrapped.extension =
                store.find_owned(wrapped.binding.extension_type(), owner);
        }
        Ok(wrapped)
    }

    pub fn binding(&self) -> &ExtensionBinding {
        &self.binding
    }

    pub fn primary(&self) -> &Record {
        &self.primary
    }

    /// Direct access to the primary's own attributes. Delegated names go
    /// through [`get`](Self::get) / [`set`](Self::set) instead.
    pub fn primary_mut(&mut self) -> &mut Record {
        &mut self.primary
    }

    pub fn has_extension(&self) -> bool {
        self.extension.is_some()
    }

    pub fn extension(&self) -> Option<&Record> {
        self.extension.as_ref()
    }

    pub fn extension_id(&self) -> Option<Uuid> {
        self.extension.as_ref().and_then(Record::id)
    }

    fn materialize(&mut self) -> &mut Record {
        let binding = &self.binding;
        self.extension.get_or_insert_with(|| {
            debug!(
                "materializing {} for {} record",
                binding.extension_type(),
                binding.primary_type()
            );
            Record::new(binding.extension_type())
        })
    }

    fn resolve(&self, name: &str) -> Result<String> {
        self.binding
            .resolve(name)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::UnknownAttribute(
                    name.to_string(),
                    self.binding.primary_type().to_string(),
                )
            })
    }

    /// Reads a delegated attribute, materializing the extension first.
    pub fn get(&mut self, name: &str) -> Result<Value> {
        let column = self.resolve(name)?;
        Ok(self.materialize().get(&column))
    }

    /// Writes a delegated attribute. Nothing is persisted until the next
    /// [`save`](Self::save).
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let column = self.resolve(name)?;
        self.materialize().set(column, value);
        Ok(())
    }

    /// Presence predicate: the storage layer's truthiness of the delegated
    /// column, false for a never-set column.
    pub fn is_set(&mut self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.as_bool())
    }

    /// Schema descriptor for an attribute name, native or delegated. Pure
    /// metadata, does not materialize the extension.
    pub fn column_for_attribute(&self, name: &str) -> Option<&crate::core::Column> {
        self.binding.column_for_attribute(name)
    }

    /// Validates the primary and, only when the primary is clean, the
    /// extension, merging its errors under effective attribute names.
    /// Skipping extension validation for an already-invalid primary avoids
    /// reporting against a half-constructed extension.
    pub fn validate(&mut self) -> Errors {
        let mut errors = Errors::new();
        validate_record(
            self.binding.primary_schema(),
            self.primary.values(),
            &mut errors,
        );
        if !errors.is_empty() {
            return errors;
        }

        let binding = self.binding.clone();
        let extension = self.materialize();
        let mut extension_errors = Errors::new();
        validate_record(
            binding.extension_schema(),
            extension.values(),
            &mut extension_errors,
        );
        errors.merge_with(extension_errors, |field| binding.effective_name(field));
        errors
    }

    /// Saves the pair: validate, save the primary, then save the (possibly
    /// just-materialized) extension. See the type docs for the
    /// partial-failure contract.
    pub fn save(&mut self, store: &mut impl RecordStore) -> Result<()> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(Error::Invalid(errors));
        }

        store.save(&mut self.primary)?;
        let owner = self
            .primary
            .id()
            .ok_or_else(|| Error::NotPersisted(self.binding.primary_type().to_string()))?;

        // A wrapper built without `load` may not have seen the persisted
        // extension yet; resolve by owner id before creating a new row.
        if self.extension.is_none() {
            self.extension = store.find_owned(self.binding.extension_type(), owner);
        }
        let extension = self.materialize();
        extension.set_owner(owner);
        store
            .save(extension)
            .map_err(|source| Error::ExtensionSaveFailed {
                source: Box::new(source),
            })?;
        debug!(
            "synced {} after saving {} record",
            self.binding.extension_type(),
            self.binding.primary_type()
        );
        Ok(())
    }

    /// Destroys the pair: cascade to the extension first, then the primary.
    /// The cascade covers the materialized extension or, failing that, a
    /// stored one resolved by owner id; with neither it is a no-op. Store
    /// failures propagate untouched; a failed cascade leaves the primary
    /// intact. Consuming `self` makes the destroyed state terminal.
    pub fn destroy(mut self, store: &mut impl RecordStore) -> Result<()> {
        let extension = match self.extension.take() {
            Some(extension) => Some(extension),
            // Never materialized here, but a persisted primary may still
            // own a stored extension row.
            None => self
                .primary
                .id()
                .and_then(|owner| store.find_owned(self.binding.extension_type(), owner)),
        };
        if let Some(extension) = extension {
            if extension.is_persisted() {
                store.destroy(&extension)?;
                debug!(
                    "cascade destroyed {} of {} record",
                    self.binding.extension_type(),
                    self.binding.primary_type()
                );
            }
        }
        if self.primary.is_persisted() {
            store.destroy(&self.primary)?;
        }
        Ok(())
    }
}
