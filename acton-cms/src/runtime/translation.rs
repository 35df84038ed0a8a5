//! Per-locale attribute handling

use crate::config::LocaleSettings;
use crate::error::{ActonCmsError, Result};
use crate::schema::{FieldType, FieldValue};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One row of the translations table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Translation {
    /// Whether the locale is live
    pub active: bool,
    /// Translated attribute values
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

/// Translations of a record, keyed by locale
pub type Translations = BTreeMap<String, Translation>;

/// Reads translated attributes out of request input
#[derive(Debug, Clone)]
pub struct TranslationHandler {
    attributes: Vec<String>,
    locales: LocaleSettings,
}

impl TranslationHandler {
    /// Handler for the given translated attributes
    #[must_use]
    pub const fn new(attributes: Vec<String>, locales: LocaleSettings) -> Self {
        Self { attributes, locales }
    }

    /// Locale used for scalar input and lookups
    #[must_use]
    pub fn fallback_locale(&self) -> &str {
        &self.locales.fallback
    }

    /// Apply input onto existing translations
    ///
    /// Each translated attribute may be a scalar, stored under the fallback
    /// locale, or a `{locale: value}` object. An `active` object of
    /// `{locale: bool}` toggles locales.
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::BadRequest`] for unknown locales or values
    /// that are not strings.
    pub fn apply(&self, translations: &mut Translations, input: &Map<String, Value>) -> Result<()> {
        for attribute in &self.attributes {
            match input.get(attribute) {
                None => {}
                Some(Value::Object(per_locale)) => {
                    for (locale, value) in per_locale {
                        self.set(translations, locale, attribute, value)?;
                    }
                }
                Some(value) => self.set(translations, &self.locales.fallback, attribute, value)?,
            }
        }

        if let Some(active) = input.get("active") {
            let Value::Object(active) = active else {
                return Err(ActonCmsError::BadRequest(
                    "'active' must map locales to booleans".into(),
                ));
            };
            for (locale, flag) in active {
                self.check_locale(locale)?;
                let FieldValue::Bool(flag) = FieldValue::cast(FieldType::Boolean, flag)? else {
                    continue;
                };
                translations.entry(locale.clone()).or_default().active = flag;
            }
        }
        Ok(())
    }

    /// Value of an attribute in a locale, falling back to the fallback locale
    #[must_use]
    pub fn translated<'a>(
        &self,
        translations: &'a Translations,
        attribute: &str,
        locale: &str,
    ) -> Option<&'a Value> {
        translations
            .get(locale)
            .and_then(|t| t.values.get(attribute))
            .or_else(|| {
                translations
                    .get(&self.locales.fallback)
                    .and_then(|t| t.values.get(attribute))
            })
    }

    fn set(
        &self,
        translations: &mut Translations,
        locale: &str,
        attribute: &str,
        value: &Value,
    ) -> Result<()> {
        self.check_locale(locale)?;
        let text = match FieldValue::cast(FieldType::String, value)? {
            FieldValue::Text(text) => text,
            FieldValue::Null => String::new(),
            other => other.to_json().to_string(),
        };
        translations
            .entry(locale.to_string())
            .or_default()
            .values
            .insert(attribute.to_string(), Value::String(text));
        Ok(())
    }

    fn check_locale(&self, locale: &str) -> Result<()> {
        if self.locales.available.iter().any(|l| l == locale) {
            Ok(())
        } else {
            Err(ActonCmsError::BadRequest(format!("Unknown locale '{locale}'")))
        }
    }
}
