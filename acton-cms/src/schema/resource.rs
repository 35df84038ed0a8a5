//! Resource schemas: a plural name plus an ordered field list

use super::field::{is_identifier, FieldOptions, FieldSpec, FieldType};
use super::naming::Naming;
use crate::error::{ActonCmsError, Result};
use serde_json::Value;

/// Columns the framework adds to module tables, and keys the record
/// payload writes over attributes
const RESERVED_FIELDS: [&str; 12] = [
    "id",
    "created_at",
    "updated_at",
    "deleted_at",
    "published",
    "position",
    "featured",
    "locale",
    "active",
    "tags",
    "blocks",
    "translations",
];

/// Immutable description of one module resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSchema {
    name_plural: String,
    fields: Vec<FieldSpec>,
}

impl ResourceSchema {
    /// Build a schema from raw field options, in declaration order
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::InvalidSchema`] if a name segment is not an
    /// identifier, a field is declared twice, a field takes a name the
    /// framework owns, or a field fails to resolve.
    pub fn new<I, N>(name_plural: &str, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, FieldOptions)>,
        N: AsRef<str>,
    {
        let name_plural = name_plural.trim();
        if name_plural.is_empty() {
            return Err(ActonCmsError::invalid_schema(
                name_plural,
                "resource name cannot be empty",
            ));
        }
        if let Some(segment) = name_plural.split('.').find(|s| !is_identifier(s)) {
            return Err(ActonCmsError::invalid_schema(
                name_plural,
                format!("name segment '{segment}' must be a letter or underscore followed by letters, digits or underscores"),
            ));
        }
        let foreign_key = Naming::foreign_key(name_plural);

        let mut resolved: Vec<FieldSpec> = Vec::new();
        for (name, options) in fields {
            let field = FieldSpec::resolve(name_plural, name.as_ref(), &options)?;
            if RESERVED_FIELDS.contains(&field.name.as_str()) || field.name == foreign_key {
                return Err(ActonCmsError::invalid_schema(
                    name_plural,
                    format!("field '{}' is managed by the framework", field.name),
                ));
            }
            if resolved.iter().any(|existing| existing.name == field.name) {
                return Err(ActonCmsError::invalid_schema(
                    name_plural,
                    format!("field '{}' declared twice", field.name),
                ));
            }
            resolved.push(field);
        }

        Ok(Self {
            name_plural: name_plural.to_string(),
            fields: resolved,
        })
    }

    /// Schema with the stock field list: a single `title` string
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::InvalidSchema`] if the name is empty.
    pub fn with_default_fields(name_plural: &str) -> Result<Self> {
        Self::new(name_plural, [("title", FieldOptions::new())])
    }

    /// Build a schema from a JSON object of `name → options`
    ///
    /// # Example
    ///
    /// ```
    /// use acton_cms::schema::ResourceSchema;
    /// use serde_json::json;
    ///
    /// let schema = ResourceSchema::from_json("events", &json!({
    ///     "title": {},
    ///     "startsAt": {"type": "dateTime"},
    ///     "isFeatured": {"type": "boolean", "default": true},
    /// })).unwrap();
    ///
    /// assert_eq!(schema.field_names(), vec!["title", "startsAt", "isFeatured"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::InvalidSchema`] if the value is not an
    /// object of option objects, or any field fails to resolve.
    pub fn from_json(name_plural: &str, fields: &Value) -> Result<Self> {
        let Value::Object(map) = fields else {
            return Err(ActonCmsError::invalid_schema(
                name_plural,
                "fields must be a JSON object",
            ));
        };

        let options = map
            .iter()
            .map(|(name, raw)| {
                serde_json::from_value::<FieldOptions>(raw.clone())
                    .map(|opts| (name.clone(), opts))
                    .map_err(|e| {
                        ActonCmsError::invalid_schema(name_plural, format!("field '{name}': {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(name_plural, options)
    }

    /// Build a schema from CLI shorthand definitions
    ///
    /// # Errors
    ///
    /// See [`FieldSpec::parse`].
    pub fn from_shorthand<S: AsRef<str>>(name_plural: &str, specs: &[S]) -> Result<Self> {
        let options = specs
            .iter()
            .map(|spec| FieldSpec::parse_options(name_plural, spec.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(name_plural, options)
    }

    /// Plural resource name as registered (may be dotted)
    #[must_use]
    pub fn name_plural(&self) -> &str {
        &self.name_plural
    }

    /// Singular resource name
    #[must_use]
    pub fn name_singular(&self) -> String {
        Naming::singular(&self.name_plural)
    }

    /// Model type name
    #[must_use]
    pub fn model_name(&self) -> String {
        Naming::model_name(&self.name_plural)
    }

    /// Main table name
    #[must_use]
    pub fn table_name(&self) -> String {
        Naming::table_name(&self.name_plural)
    }

    /// All fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All field names in declaration order
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Fields stored on the main table
    pub fn main_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.translatable)
    }

    /// Fields stored on the translations table
    pub fn translatable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.translatable)
    }

    /// Fields of type `dateTime`
    pub fn date_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.field_type == FieldType::DateTime)
    }
}
