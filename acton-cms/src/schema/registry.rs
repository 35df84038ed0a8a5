//! Schema registry: the start-up owned map of resource name → schema

use super::field::FieldOptions;
use super::resource::ResourceSchema;
use crate::error::{ActonCmsError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registered resource schemas, keyed by plural name
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<BTreeMap<String, Arc<ResourceSchema>>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource from raw field options
    ///
    /// Registering an identical schema twice returns the first instance.
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::InvalidSchema`] if the fields fail to
    /// resolve, or the name is already registered with a different shape.
    pub fn register<I, N>(&self, name_plural: &str, fields: I) -> Result<Arc<ResourceSchema>>
    where
        I: IntoIterator<Item = (N, FieldOptions)>,
        N: AsRef<str>,
    {
        self.insert(ResourceSchema::new(name_plural, fields)?)
    }

    /// Register an already-built schema
    ///
    /// # Errors
    ///
    /// See [`SchemaRegistry::register`].
    pub fn insert(&self, schema: ResourceSchema) -> Result<Arc<ResourceSchema>> {
        let mut schemas = self.schemas.write();

        if let Some(existing) = schemas.get(schema.name_plural()) {
            if **existing == schema {
                tracing::debug!(resource = schema.name_plural(), "Schema already registered");
                return Ok(Arc::clone(existing));
            }
            return Err(ActonCmsError::invalid_schema(
                schema.name_plural(),
                "already registered with a different field list",
            ));
        }

        tracing::info!(
            resource = schema.name_plural(),
            fields = schema.fields().len(),
            "Registered resource schema"
        );
        let schema = Arc::new(schema);
        schemas.insert(schema.name_plural().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Look up a schema by plural name
    #[must_use]
    pub fn get(&self, name_plural: &str) -> Option<Arc<ResourceSchema>> {
        self.schemas.read().get(name_plural).cloned()
    }

    /// Registered plural names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.schemas.read().keys().cloned().collect()
    }
}
