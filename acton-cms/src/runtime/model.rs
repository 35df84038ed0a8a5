//! Attribute filling driven by a [`ModelDescriptor`]

use crate::descriptor::ModelDescriptor;
use crate::error::{ActonCmsError, Result};
use crate::schema::FieldValue;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A model type expressed as data
#[derive(Debug, Clone)]
pub struct Model {
    descriptor: Arc<ModelDescriptor>,
}

impl Model {
    /// Wrap a descriptor
    #[must_use]
    pub const fn new(descriptor: Arc<ModelDescriptor>) -> Self {
        Self { descriptor }
    }

    /// The descriptor this model follows
    #[must_use]
    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Default value of every fillable attribute
    #[must_use]
    pub fn defaults(&self) -> Map<String, Value> {
        self.descriptor
            .fillable
            .iter()
            .filter_map(|name| self.descriptor.attribute(name))
            .map(|field| (field.name.clone(), field.default.to_json()))
            .collect()
    }

    /// Cast fillable keys of `input` onto `attributes`
    ///
    /// Keys that are not fillable are ignored. Translated attributes are
    /// left to the translation handler.
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::BadRequest`] when a value does not cast to
    /// its field type, or when `null` is given for a non-nullable field.
    pub fn fill(&self, attributes: &mut Map<String, Value>, input: &Map<String, Value>) -> Result<()> {
        for name in &self.descriptor.fillable {
            let Some(raw) = input.get(name) else {
                continue;
            };
            let Some(field) = self.descriptor.attribute(name) else {
                continue;
            };
            let value = FieldValue::cast(field.field_type, raw)?;
            if value.is_null() && !field.nullable {
                return Err(ActonCmsError::BadRequest(format!("'{name}' is required")));
            }
            attributes.insert(name.clone(), value.to_json());
        }
        Ok(())
    }

    /// Fresh attribute set: defaults overlaid with `input`
    ///
    /// # Errors
    ///
    /// As [`Model::fill`]; additionally a non-nullable field that is still
    /// `null` after filling is rejected.
    pub fn build(&self, input: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut attributes = self.defaults();
        self.fill(&mut attributes, input)?;
        self.check_required(&attributes)?;
        Ok(attributes)
    }

    fn check_required(&self, attributes: &Map<String, Value>) -> Result<()> {
        for name in &self.descriptor.fillable {
            let Some(field) = self.descriptor.attribute(name) else {
                continue;
            };
            if !field.nullable && attributes.get(name).is_none_or(Value::is_null) {
                return Err(ActonCmsError::BadRequest(format!("'{name}' is required")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ClassSynthesizer, ControllerOverrides};
    use crate::schema::ResourceSchema;
    use serde_json::json;

    fn model() -> Model {
        let schema = ResourceSchema::from_json(
            "events",
            &json!({
                "title": {"translatable": true},
                "venue": {"nullable": false, "default": "TBA"},
                "startsAt": {"type": "dateTime"},
                "isFeatured": {"type": "boolean"},
            }),
        )
        .unwrap();
        let descriptors = ClassSynthesizer::derive(&schema, &ControllerOverrides::default());
        Model::new(Arc::new(descriptors.model))
    }

    fn input(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults() {
        let defaults = model().defaults();
        assert_eq!(defaults["venue"], json!("TBA"));
        assert_eq!(defaults["startsAt"], Value::Null);
        assert_eq!(defaults["isFeatured"], json!(false));
        assert!(!defaults.contains_key("title"));
    }

    #[test]
    fn test_build_casts_and_ignores_unknown_keys() {
        let attributes = model()
            .build(&input(json!({
                "startsAt": "2024-05-01T10:00:00Z",
                "isFeatured": "1",
                "unknown": 42,
                "title": "ignored here",
            })))
            .unwrap();

        assert_eq!(attributes["startsAt"], json!("2024-05-01 10:00:00"));
        assert_eq!(attributes["isFeatured"], json!(true));
        assert!(!attributes.contains_key("unknown"));
        assert!(!attributes.contains_key("title"));
    }

    #[test]
    fn test_null_for_required_field_is_rejected() {
        let err = model().build(&input(json!({"venue": null}))).unwrap_err();
        assert!(matches!(err, ActonCmsError::BadRequest(msg) if msg.contains("venue")));
    }

    #[test]
    fn test_bad_cast_is_rejected() {
        let err = model()
            .build(&input(json!({"startsAt": "next tuesday"})))
            .unwrap_err();
        assert!(matches!(err, ActonCmsError::BadRequest(_)));
    }
}
