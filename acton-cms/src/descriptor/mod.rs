//! Class synthesis as data
//!
//! A module needs a model, a translation model, a repository and a
//! controller. Rather than generating types, each is a descriptor value
//! derived from the [`ResourceSchema`]; the generic runtime in
//! [`crate::runtime`] is parameterized by them.
//!
//! Descriptors are cached per resource name by [`ClassSynthesizer`]. The
//! first description of a name is the one every later caller sees.

pub mod form;

pub use form::{ColumnPresenter, Form, FormField, InputKind, TableColumn, TableColumns};

use crate::schema::{FieldSpec, Naming, ResourceSchema};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Optional behaviour a model or repository carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Per-locale attributes in the translations table
    Translations,
    /// Ordered content blocks
    Blocks,
}

/// Capabilities every module is synthesized with
pub const MODULE_CAPABILITIES: [Capability; 2] = [Capability::Translations, Capability::Blocks];

/// Model descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    /// `Event`
    pub type_name: String,
    /// `events`
    pub table: String,
    /// Attributes stored on the main table
    pub fillable: Vec<String>,
    /// Attributes stored per locale
    pub translated_attributes: Vec<String>,
    /// Date-time attributes
    pub dates: Vec<String>,
    /// `event_id`
    pub translation_foreign_key: String,
    /// `EventTranslation`
    pub translation_model: String,
    /// Attached behaviours
    pub capabilities: Vec<Capability>,
    /// Resolved fields, in declaration order
    pub attributes: Vec<FieldSpec>,
}

impl ModelDescriptor {
    /// Whether the model carries a capability
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Resolved field by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&FieldSpec> {
        self.attributes.iter().find(|f| f.name == name)
    }

    /// Whether an attribute is stored per locale
    #[must_use]
    pub fn is_translated(&self, name: &str) -> bool {
        self.translated_attributes.iter().any(|a| a == name)
    }
}

/// Translation model descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationModelDescriptor {
    /// `EventTranslation`
    pub type_name: String,
    /// `event_translations`
    pub table: String,
    /// Translatable attributes plus `active`
    pub fillable: Vec<String>,
}

/// Repository descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    /// `EventRepository`
    pub type_name: String,
    /// The one dependency: the model it persists
    pub model: String,
    /// Attached handlers
    pub capabilities: Vec<Capability>,
}

/// Controller customizations supplied at module definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerOverrides {
    /// Setup methods applied in order
    pub setup_methods: Vec<String>,
    /// Form to use instead of the stock one
    pub form: Option<Form>,
    /// Index columns to use instead of the stock ones
    pub table_columns: Option<TableColumns>,
    /// Extra properties, kept verbatim
    pub additional_props: Map<String, Value>,
}

/// Controller descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerDescriptor {
    /// `EventController`
    pub type_name: String,
    /// `events`
    pub module_name: String,
    /// Setup methods applied at construction
    pub setup_methods: Vec<String>,
    /// Custom form, if any
    pub form: Option<Form>,
    /// Custom index columns, if any
    pub table_columns: Option<TableColumns>,
    /// Extra properties
    pub additional_props: Map<String, Value>,
}

impl ControllerDescriptor {
    /// Custom form or the stock one for these fields
    #[must_use]
    pub fn form_for(&self, fields: &[FieldSpec]) -> Form {
        self.form.clone().unwrap_or_else(|| Form::stock(fields))
    }

    /// Custom index columns or the stock ones for these fields
    #[must_use]
    pub fn table_columns_for(&self, fields: &[FieldSpec]) -> TableColumns {
        self.table_columns
            .clone()
            .unwrap_or_else(|| TableColumns::stock(fields))
    }
}

/// The four descriptors of one module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDescriptors {
    /// Model
    pub model: ModelDescriptor,
    /// Translation model
    pub translation_model: TranslationModelDescriptor,
    /// Repository
    pub repository: RepositoryDescriptor,
    /// Controller
    pub controller: ControllerDescriptor,
}

/// Derives and caches module descriptors
#[derive(Debug, Default)]
pub struct ClassSynthesizer {
    cache: RwLock<HashMap<String, Arc<ModuleDescriptors>>>,
}

impl ClassSynthesizer {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptors for a schema, from cache when already described
    ///
    /// A cached entry is returned as is, even if `overrides` differ.
    pub fn describe(
        &self,
        schema: &ResourceSchema,
        overrides: &ControllerOverrides,
    ) -> Arc<ModuleDescriptors> {
        let name = schema.name_plural();
        if let Some(cached) = self.cache.read().get(name) {
            tracing::debug!(resource = name, "Reusing cached descriptors");
            return Arc::clone(cached);
        }

        let mut cache = self.cache.write();
        Arc::clone(cache.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!(resource = name, "Synthesizing descriptors");
            Arc::new(Self::derive(schema, overrides))
        }))
    }

    /// Cached descriptors for a resource
    #[must_use]
    pub fn get(&self, name_plural: &str) -> Option<Arc<ModuleDescriptors>> {
        self.cache.read().get(name_plural).cloned()
    }

    /// Derive descriptors without touching the cache
    #[must_use]
    pub fn derive(schema: &ResourceSchema, overrides: &ControllerOverrides) -> ModuleDescriptors {
        let model_name = schema.model_name();
        let translation_model = format!("{model_name}Translation");
        let translated_attributes = names(schema.translatable_fields());

        let model = ModelDescriptor {
            type_name: model_name.clone(),
            table: schema.table_name(),
            fillable: names(schema.main_fields()),
            translated_attributes: translated_attributes.clone(),
            dates: names(schema.date_fields()),
            translation_foreign_key: Naming::foreign_key(schema.name_plural()),
            translation_model: translation_model.clone(),
            capabilities: MODULE_CAPABILITIES.to_vec(),
            attributes: schema.fields().to_vec(),
        };

        let mut translation_fillable = translated_attributes;
        translation_fillable.push("active".to_string());
        let translation_model = TranslationModelDescriptor {
            type_name: translation_model,
            table: Naming::translations_table(schema.name_plural()),
            fillable: translation_fillable,
        };

        let repository = RepositoryDescriptor {
            type_name: format!("{model_name}Repository"),
            model: model_name.clone(),
            capabilities: MODULE_CAPABILITIES.to_vec(),
        };

        let controller_type = format!("{model_name}Controller");
        let controller = ControllerDescriptor {
            module_name: Naming::pluralize(
                &controller_type.trim_end_matches("Controller").to_lowercase(),
            ),
            type_name: controller_type,
            setup_methods: overrides.setup_methods.clone(),
            form: overrides.form.clone(),
            table_columns: overrides.table_columns.clone(),
            additional_props: overrides.additional_props.clone(),
        };

        ModuleDescriptors {
            model,
            translation_model,
            repository,
            controller,
        }
    }
}

fn names<'a>(fields: impl Iterator<Item = &'a FieldSpec>) -> Vec<String> {
    fields.map(|f| f.name.clone()).collect()
}
