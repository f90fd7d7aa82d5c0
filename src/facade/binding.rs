use crate::core::{Column, Error, Result, Schema};
use crate::storage::SchemaProvider;
use log::debug;
use std::collections::BTreeMap;

/// Identifier column, always excluded from delegation.
const ID_COLUMN: &str = "id";

/// Options for [`ExtensionBinding::bind`].
#[derive(Debug, Clone, Default)]
pub struct BindOptions {
    except: Vec<String>,
    prefix: bool,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes a column from delegation. The identifier column is excluded
    /// whether or not it is listed here.
    pub fn except(mut self, column: impl Into<String>) -> Self {
        self.except.push(column.into());
        self
    }

    /// Prefixes every delegated attribute with the extension type name,
    /// avoiding collisions with the primary's own columns.
    pub fn with_prefix(mut self) -> Self {
        self.prefix = true;
        self
    }
}

/// The typed facade computed once per primary/extension type pair: which
/// extension columns are reachable from the primary, and under which
/// effective names. Immutable after `bind`.
#[derive(Debug, Clone)]
pub struct ExtensionBinding {
    primary_type: String,
    extension_type: String,
    primary_schema: Schema,
    extension_schema: Schema,
    // effective attribute name -> extension column name
    delegated: BTreeMap<String, String>,
    prefix: Option<String>,
}

impl ExtensionBinding {
    /// Resolves both schemas and computes the delegated attribute map.
    ///
    /// Fails with [`Error::UnknownType`] when either type is not known to
    /// the provider, and with [`Error::AttributeCollision`] when an
    /// effective attribute name shadows one of the primary's own columns.
    pub fn bind(
        provider: &impl SchemaProvider,
        primary_type: &str,
        extension_type: &str,
        options: BindOptions,
    ) -> Result<Self> {
        let primary_schema = provider.schema(primary_type)?.clone();
        let extension_schema = provider.schema(extension_type)?.clone();

        let prefix = options
            .prefix
            .then(|| format!("{}_", extension_type));

        let mut delegated = BTreeMap::new();
        for column in extension_schema.column_names() {
            if column == ID_COLUMN || options.except.iter().any(|c| c == column) {
                continue;
            }
            let effective = match &prefix {
                Some(p) => format!("{}{}", p, column),
                None => column.to_string(),
            };
            if primary_schema.has_column(&effective) || delegated.contains_key(&effective) {
                return Err(Error::AttributeCollision(
                    effective,
                    primary_type.to_string(),
                ));
            }
            delegated.insert(effective, column.to_string());
        }

        debug!(
            "bound {} -> {}: {} delegated attribute(s)",
            primary_type,
            extension_type,
            delegated.len()
        );

        Ok(Self {
            primary_type: primary_type.to_string(),
            extension_type: extension_type.to_string(),
            primary_schema,
            extension_schema,
            delegated,
            prefix,
        })
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn extension_type(&self) -> &str {
        &self.extension_type
    }

    pub fn primary_schema(&self) -> &Schema {
        &self.primary_schema
    }

    pub fn extension_schema(&self) -> &Schema {
        &self.extension_schema
    }

    /// (effective name, underlying extension column) pairs, in name order.
    pub fn delegated_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.delegated
            .iter()
            .map(|(name, column)| (name.as_str(), column.as_str()))
    }

    pub fn is_delegated(&self, name: &str) -> bool {
        self.delegated.contains_key(name)
    }

    /// Underlying extension column for an effective attribute name.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.delegated.get(name).map(String::as_str)
    }

    /// Effective attribute name for an extension column: the prefix applied
    /// when the binding was configured with one. Used to re-key extension
    /// validation errors into the primary's error set.
    pub fn effective_name(&self, column: &str) -> String {
        match &self.prefix {
            Some(p) => format!("{}{}", p, column),
            None => column.to_string(),
        }
    }

    /// Column descriptor for an attribute name: the underlying extension
    /// column for delegated names, the primary's own column otherwise.
    /// Metadata-driven callers see delegated attributes exactly like native
    /// ones.
    pub fn column_for_attribute(&self, name: &str) -> Option<&Column> {
        match self.resolve(name) {
            Some(column) => self.extension_schema.column(column),
            None => self.primary_schema.column(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;
    use crate::storage::Catalog;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .register(
                "user",
                Schema::new(vec![
                    Column::new("id", DataType::Text),
                    Column::new("name", DataType::Text),
                ]),
            )
            .unwrap();
        catalog
            .register(
                "user_extension",
                Schema::new(vec![
                    Column::new("id", DataType::Text),
                    Column::new("can_set_as_final", DataType::Boolean),
                    Column::new("level", DataType::Integer),
                ]),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_id_never_delegated() {
        let binding = ExtensionBinding::bind(
            &catalog(),
            "user",
            "user_extension",
            BindOptions::new(),
        )
        .unwrap();
        let names: Vec<_> = binding.delegated_attributes().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["can_set_as_final", "level"]);
        assert!(!binding.is_delegated("id"));
    }

    #[test]
    fn test_except_excludes_columns() {
        let binding = ExtensionBinding::bind(
            &catalog(),
            "user",
            "user_extension",
            BindOptions::new().except("level"),
        )
        .unwrap();
        assert!(binding.is_delegated("can_set_as_final"));
        assert!(!binding.is_delegated("level"));
    }

    #[test]
    fn test_prefix_renames_attributes() {
        let binding = ExtensionBinding::bind(
            &catalog(),
            "user",
            "user_extension",
            BindOptions::new().with_prefix(),
        )
        .unwrap();
        assert!(binding.is_delegated("user_extension_level"));
        assert!(!binding.is_delegated("level"));
        assert_eq!(binding.resolve("user_extension_level"), Some("level"));
    }

    #[test]
    fn test_unknown_type_fails_bind() {
        let err = ExtensionBinding::bind(
            &catalog(),
            "user",
            "ghost_extension",
            BindOptions::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownType(_)));
    }

    #[test]
    fn test_collision_with_primary_column_fails_bind() {
        let mut catalog = catalog();
        catalog
            .register(
                "account",
                Schema::new(vec![Column::new("level", DataType::Integer)]),
            )
            .unwrap();
        let err = ExtensionBinding::bind(
            &catalog,
            "account",
            "user_extension",
            BindOptions::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AttributeCollision(name, _) if name == "level"));
    }

    #[test]
    fn test_duplicate_effective_name_fails_bind() {
        let mut catalog = catalog();
        // Schema::new does not reject repeated column names; the binding must.
        catalog
            .register(
                "sloppy_extension",
                Schema::new(vec![
                    Column::new("level", DataType::Integer),
                    Column::new("level", DataType::Text),
                ]),
            )
            .unwrap();
        let err = ExtensionBinding::bind(
            &catalog,
            "user",
            "sloppy_extension",
            BindOptions::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AttributeCollision(name, _) if name == "level"));
    }

    #[test]
    fn test_column_for_attribute_covers_both_sides() {
        let binding = ExtensionBinding::bind(
            &catalog(),
            "user",
            "user_extension",
            BindOptions::new(),
        )
        .unwrap();

        let delegated = binding.column_for_attribute("can_set_as_final").unwrap();
        assert_eq!(delegated.data_type, DataType::Boolean);

        let native = binding.column_for_attribute("name").unwrap();
        assert_eq!(native.data_type, DataType::Text);

        assert!(binding.column_for_attribute("ghost").is_none());
    }
}
