//! Field definitions for module schemas
//!
//! A field is declared with a name and a small option bag, the same shape a
//! caller writes in JSON:
//!
//! ```json
//! {
//!   "title": { "translatable": true },
//!   "startsAt": { "type": "dateTime" },
//!   "isFeatured": { "type": "boolean", "default": true }
//! }
//! ```
//!
//! or as CLI shorthand:
//!
//! ```text
//! title:string:translatable
//! startsAt:dateTime
//! isFeatured:boolean:default=true
//! summary:string:required
//! ```
//!
//! Unknown type tags fall back to `string`. When unspecified, `nullable`
//! is `true`, `translatable` is `false`, and the default is `false` for
//! booleans and `null` for everything else.

use crate::error::{ActonCmsError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// Whether `name` is usable as a column or path segment
pub(crate) fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FieldType {
    /// Short string (VARCHAR)
    #[default]
    #[serde(rename = "string")]
    String,
    /// Boolean flag
    #[serde(rename = "boolean")]
    Boolean,
    /// Date and time without zone
    #[serde(rename = "dateTime")]
    DateTime,
}

impl FieldType {
    /// Parse a type tag, returning `None` for unknown tags
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "string" => Some(Self::String),
            "boolean" | "bool" => Some(Self::Boolean),
            "datetime" => Some(Self::DateTime),
            _ => None,
        }
    }

    /// Parse a type tag, defaulting unknown tags to `string`
    #[must_use]
    pub fn from_tag_or_default(tag: &str, field_name: &str) -> Self {
        Self::from_tag(tag).unwrap_or_else(|| {
            tracing::warn!(field = field_name, tag, "Unknown field type, using string");
            Self::String
        })
    }

    /// Default value used when the field declares none
    #[must_use]
    pub const fn implicit_default(self) -> FieldValue {
        match self {
            Self::Boolean => FieldValue::Bool(false),
            Self::String | Self::DateTime => FieldValue::Null,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
            Self::DateTime => write!(f, "dateTime"),
        }
    }
}

/// A typed scalar value: column defaults and cast attribute values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// SQL `NULL` / JSON `null`
    Null,
    /// Boolean value
    Bool(bool),
    /// String value
    Text(String),
    /// Timestamp value
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    /// Cast a JSON value to this field type
    ///
    /// Booleans accept `true`/`false`, `"1"`/`"0"`, `"true"`/`"false"` and
    /// `1`/`0`. Timestamps accept RFC 3339 and `YYYY-MM-DD HH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::BadRequest`] when the value cannot be cast.
    pub fn cast(field_type: FieldType, value: &Value) -> Result<Self> {
        match (field_type, value) {
            (_, Value::Null) => Ok(Self::Null),
            (FieldType::String, Value::String(s)) => Ok(Self::Text(s.clone())),
            (FieldType::String, Value::Number(n)) => Ok(Self::Text(n.to_string())),
            (FieldType::String, Value::Bool(b)) => Ok(Self::Text(b.to_string())),
            (FieldType::Boolean, Value::Bool(b)) => Ok(Self::Bool(*b)),
            (FieldType::Boolean, Value::Number(n)) => match n.as_i64() {
                Some(0) => Ok(Self::Bool(false)),
                Some(1) => Ok(Self::Bool(true)),
                _ => Err(ActonCmsError::BadRequest(format!("'{n}' is not a boolean"))),
            },
            (FieldType::Boolean, Value::String(s)) => match s.to_lowercase().as_str() {
                "1" | "true" | "on" => Ok(Self::Bool(true)),
                "0" | "false" | "off" | "" => Ok(Self::Bool(false)),
                _ => Err(ActonCmsError::BadRequest(format!("'{s}' is not a boolean"))),
            },
            (FieldType::DateTime, Value::String(s)) => parse_timestamp(s)
                .map(Self::Timestamp)
                .ok_or_else(|| ActonCmsError::BadRequest(format!("'{s}' is not a date-time"))),
            (field_type, other) => Err(ActonCmsError::BadRequest(format!(
                "{other} is not a valid {field_type} value"
            ))),
        }
    }

    /// Whether this is `Null`
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// JSON representation
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Text(s) => Value::String(s.clone()),
            Self::Timestamp(ts) => Value::String(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// SQL literal for a column default
    #[must_use]
    pub fn sql_literal(&self, numeric_booleans: bool) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) if numeric_booleans => u8::from(*b).to_string(),
            Self::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S").ok())
}

/// Raw field options as supplied by the caller
///
/// Every key is optional; see the module docs for the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Type tag (`string`, `boolean`, `dateTime`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,

    /// Explicit default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Whether the column accepts null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Whether the field lives on the translations table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translatable: Option<bool>,
}

impl FieldOptions {
    /// Empty options: a nullable string defaulting to null
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type tag
    #[must_use]
    pub fn of_type(mut self, tag: impl Into<String>) -> Self {
        self.field_type = Some(tag.into());
        self
    }

    /// Set an explicit default
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set nullability
    #[must_use]
    pub const fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Mark the field translatable
    #[must_use]
    pub const fn translatable(mut self) -> Self {
        self.translatable = Some(true);
        self
    }
}

/// A resolved field: every option has a concrete value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Field (and column) name
    pub name: String,
    /// Storage type
    pub field_type: FieldType,
    /// Column default
    pub default: FieldValue,
    /// Whether the column accepts null
    pub nullable: bool,
    /// Whether the field lives on the translations table
    pub translatable: bool,
}

impl FieldSpec {
    /// Resolve raw options into a field
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::InvalidSchema`] if the name is not an
    /// identifier or the default does not match the field type.
    pub fn resolve(resource: &str, name: &str, options: &FieldOptions) -> Result<Self> {
        if !is_identifier(name) {
            return Err(ActonCmsError::invalid_schema(
                resource,
                format!("field name '{name}' must be alphanumeric + underscore"),
            ));
        }

        let field_type = options
            .field_type
            .as_deref()
            .map_or(FieldType::String, |tag| FieldType::from_tag_or_default(tag, name));

        let default = match &options.default {
            None => field_type.implicit_default(),
            Some(value) => FieldValue::cast(field_type, value).map_err(|_| {
                ActonCmsError::invalid_schema(
                    resource,
                    format!("default {value} of '{name}' does not match type {field_type}"),
                )
            })?,
        };

        Ok(Self {
            name: name.to_string(),
            field_type,
            default,
            nullable: options.nullable.unwrap_or(true),
            translatable: options.translatable.unwrap_or(false),
        })
    }

    /// Parse CLI shorthand: `name[:type][:modifier]*`
    ///
    /// Modifiers: `translatable`, `nullable`, `required`, `default=<value>`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use acton_cms::schema::{FieldSpec, FieldType, FieldValue};
    /// let field = FieldSpec::parse("events", "isFeatured:boolean:default=true").unwrap();
    /// assert_eq!(field.field_type, FieldType::Boolean);
    /// assert_eq!(field.default, FieldValue::Bool(true));
    ///
    /// let field = FieldSpec::parse("events", "title:string:translatable").unwrap();
    /// assert!(field.translatable);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::InvalidSchema`] for an empty name, an
    /// unknown modifier, or a default that does not match the type.
    pub fn parse(resource: &str, input: &str) -> Result<Self> {
        Self::parse_options(resource, input)
            .and_then(|(name, options)| Self::resolve(resource, &name, &options))
    }

    /// Parse CLI shorthand into a name and raw options
    ///
    /// # Errors
    ///
    /// See [`FieldSpec::parse`].
    pub fn parse_options(resource: &str, input: &str) -> Result<(String, FieldOptions)> {
        let mut parts = input.split(':');
        let name = parts.next().unwrap_or_default().trim().to_string();
        if name.is_empty() {
            return Err(ActonCmsError::invalid_schema(
                resource,
                format!("field definition '{input}' has no name"),
            ));
        }

        let mut options = FieldOptions::new();
        for part in parts {
            let part = part.trim();
            match part.to_lowercase().as_str() {
                "translatable" => options.translatable = Some(true),
                "nullable" => options.nullable = Some(true),
                "required" => options.nullable = Some(false),
                lower if lower.starts_with("default=") => {
                    let raw = part.get("default=".len()..).unwrap_or_default();
                    let value = serde_json::from_str(raw)
                        .unwrap_or_else(|_| Value::String(raw.to_string()));
                    options.default = Some(value);
                }
                _ if options.field_type.is_none() => options.field_type = Some(part.to_string()),
                unknown => {
                    return Err(ActonCmsError::invalid_schema(
                        resource,
                        format!(
                            "unknown modifier '{unknown}'. Valid modifiers: translatable, nullable, required, default=<value>"
                        ),
                    ));
                }
            }
        }

        Ok((name, options))
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.field_type)?;
        if self.translatable {
            write!(f, ":translatable")?;
        }
        if !self.nullable {
            write!(f, ":required")?;
        }
        if self.default != self.field_type.implicit_default() {
            write!(f, ":default={}", self.default.to_json())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_implicit_defaults() {
        let title = FieldSpec::resolve("events", "title", &FieldOptions::new()).unwrap();
        assert_eq!(title.field_type, FieldType::String);
        assert_eq!(title.default, FieldValue::Null);
        assert!(title.nullable);
        assert!(!title.translatable);

        let flag =
            FieldSpec::resolve("events", "flag", &FieldOptions::new().of_type("boolean")).unwrap();
        assert_eq!(flag.default, FieldValue::Bool(false));

        let starts =
            FieldSpec::resolve("events", "startsAt", &FieldOptions::new().of_type("dateTime"))
                .unwrap();
        assert_eq!(starts.field_type, FieldType::DateTime);
        assert_eq!(starts.default, FieldValue::Null);
    }

    #[test]
    fn test_unknown_type_defaults_to_string() {
        let field =
            FieldSpec::resolve("events", "body", &FieldOptions::new().of_type("markdown")).unwrap();
        assert_eq!(field.field_type, FieldType::String);
    }

    #[test]
    fn test_mismatched_default_rejected() {
        let options = FieldOptions::new().of_type("boolean").default_value("maybe");
        let err = FieldSpec::resolve("events", "flag", &options).unwrap_err();
        assert!(matches!(err, ActonCmsError::InvalidSchema { .. }));
    }

    #[test]
    fn test_invalid_name_rejected() {
        assert!(FieldSpec::resolve("events", "starts-at", &FieldOptions::new()).is_err());
        assert!(FieldSpec::resolve("events", "1st", &FieldOptions::new()).is_err());
    }

    #[test]
    fn test_options_deserialize_from_json() {
        let options: FieldOptions =
            serde_json::from_value(json!({"type": "boolean", "default": true})).unwrap();
        let field = FieldSpec::resolve("events", "isFeatured", &options).unwrap();
        assert_eq!(field.default, FieldValue::Bool(true));
        assert!(field.nullable);
    }

    #[test]
    fn test_parse_shorthand() {
        let field = FieldSpec::parse("events", "startsAt:dateTime:required").unwrap();
        assert_eq!(field.field_type, FieldType::DateTime);
        assert!(!field.nullable);

        let field = FieldSpec::parse("events", "title").unwrap();
        assert_eq!(field.field_type, FieldType::String);

        let field = FieldSpec::parse("events", "venue:string:default=Main hall").unwrap();
        assert_eq!(field.default, FieldValue::Text("Main hall".into()));

        assert!(FieldSpec::parse("events", ":string").is_err());
        assert!(FieldSpec::parse("events", "title:string:sortable").is_err());
    }

    #[test]
    fn test_cast_values() {
        assert_eq!(
            FieldValue::cast(FieldType::Boolean, &json!("1")).unwrap(),
            FieldValue::Bool(true)
        );
        assert_eq!(
            FieldValue::cast(FieldType::DateTime, &json!("2024-05-01T10:00:00Z"))
                .unwrap()
                .to_json(),
            json!("2024-05-01 10:00:00")
        );
        assert!(FieldValue::cast(FieldType::DateTime, &json!("tomorrow")).is_err());
        assert!(FieldValue::cast(FieldType::Boolean, &json!([true])).is_err());
    }

    #[test]
    fn test_sql_literals() {
        assert_eq!(FieldValue::Bool(true).sql_literal(false), "TRUE");
        assert_eq!(FieldValue::Bool(true).sql_literal(true), "1");
        assert_eq!(FieldValue::Text("O'Hare".into()).sql_literal(false), "'O''Hare'");
        assert_eq!(FieldValue::Null.sql_literal(false), "NULL");
    }

    #[test]
    fn test_display() {
        let field = FieldSpec::parse("events", "isFeatured:boolean:default=true").unwrap();
        assert_eq!(field.to_string(), "isFeatured:boolean:default=true");
    }
}
