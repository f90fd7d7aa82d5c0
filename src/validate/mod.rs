//! Validation collaborator: an accumulating error collection plus
//! schema-driven record checks. Validation never throws; failures collect
//! into [`Errors`] and surface through the normal "record is invalid"
//! signal on save.

use crate::core::{Schema, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field name -> ordered error messages. Field order is deterministic
/// (sorted), message order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Errors {
    entries: BTreeMap<String, Vec<String>>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.entries.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.entries.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total message count across all fields.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Merges `other` into self, re-keying every field through `rekey`.
    /// This is how extension errors land in the primary's error set under
    /// their effective (possibly prefixed) attribute names.
    pub fn merge_with<F>(&mut self, other: Errors, mut rekey: F)
    where
        F: FnMut(&str) -> String,
    {
        for (field, messages) in other.entries {
            let key = rekey(&field);
            self.entries.entry(key).or_default().extend(messages);
        }
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.entries {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{} {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Per-column nullability and type checks, errors keyed by column name.
/// Columns absent from the record count as NULL, so a NOT NULL column that
/// was never set still reports an error.
pub fn validate_record(
    schema: &Schema,
    values: &BTreeMap<String, Value>,
    errors: &mut Errors,
) {
    for column in schema.columns() {
        let value = values.get(&column.name).cloned().unwrap_or(Value::Null);
        if let Err(e) = column.validate(&value) {
            errors.add(&column.name, e.to_string());
        }
    }
    for name in values.keys() {
        if !schema.has_column(name) {
            errors.add(name, format!("'{}' is not a known column", name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};

    #[test]
    fn test_errors_accumulate_in_order() {
        let mut errors = Errors::new();
        errors.add("name", "cannot be blank");
        errors.add("name", "is too short");
        errors.add("age", "must be a number");

        assert!(!errors.is_empty());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("name"), ["cannot be blank", "is too short"]);
        assert_eq!(errors.get("missing"), [""; 0]);
    }

    #[test]
    fn test_merge_with_rekeys() {
        let mut primary = Errors::new();
        let mut extension = Errors::new();
        extension.add("level", "must be positive");

        primary.merge_with(extension, |field| format!("profile_{}", field));
        assert_eq!(primary.get("profile_level"), ["must be positive"]);
        assert!(primary.get("level").is_empty());
    }

    #[test]
    fn test_validate_record_reports_unset_not_null() {
        let schema = Schema::new(vec![
            Column::new("name", DataType::Text).not_null(),
            Column::new("age", DataType::Integer),
        ]);
        let mut values = BTreeMap::new();
        values.insert("age".to_string(), Value::Text("old".into()));

        let mut errors = Errors::new();
        validate_record(&schema, &values, &mut errors);
        assert_eq!(errors.get("name").len(), 1);
        assert!(errors.get("age")[0].contains("expects type INTEGER"));
    }

    #[test]
    fn test_validate_record_flags_unknown_columns() {
        let schema = Schema::new(vec![Column::new("name", DataType::Text)]);
        let mut values = BTreeMap::new();
        values.insert("ghost".to_string(), Value::Integer(1));

        let mut errors = Errors::new();
        validate_record(&schema, &values, &mut errors);
        assert!(!errors.get("ghost").is_empty());
    }
}
