//! Anonymous modules: a whole admin module from a name and a field list
//!
//! ```rust,no_run
//! use acton_cms::prelude::*;
//! use serde_json::json;
//!
//! # async fn example() -> acton_cms::error::Result<()> {
//! let state = CmsState::new();
//! let store = MemorySchemaStore::new();
//!
//! let events = AnonymousModule::make("events")
//!     .with_fields([
//!         ("title", FieldOptions::new().translatable()),
//!         ("startsAt", FieldOptions::new().of_type("dateTime")),
//!         ("isFeatured", FieldOptions::new().of_type("boolean").default_value(json!(true))),
//!     ])
//!     .with_setup_methods(["enableReorder"])
//!     .boot(&state, &store)
//!     .await?;
//!
//! assert_eq!(events.descriptors.model.type_name, "Event");
//! let app = state.router();
//! # Ok(())
//! # }
//! ```
//!
//! Booting runs, in order: schema registration, descriptor synthesis,
//! table materialization, route binding and registration, and the
//! navigation entry.

use crate::descriptor::{ControllerOverrides, Form, ModuleDescriptors, TableColumns};
use crate::entity::{EntitySynthesizer, Materialization, SchemaStore};
use crate::error::Result;
use crate::routing::{Operation, RouteOptions, RouteTable};
use crate::runtime::{IndexOptions, ModuleController, Repository};
use crate::schema::{FieldOptions, Naming, ResourceSchema};
use crate::state::CmsState;
use serde_json::Value;
use std::sync::Arc;

/// Builder for a module defined at runtime
#[derive(Debug, Clone)]
pub struct AnonymousModule {
    name_plural: String,
    fields: Vec<(String, FieldOptions)>,
    overrides: ControllerOverrides,
    route_options: RouteOptions,
}

impl AnonymousModule {
    /// Start a module; the field list defaults to a single `title` string
    #[must_use]
    pub fn make(name_plural: impl Into<String>) -> Self {
        Self {
            name_plural: name_plural.into(),
            fields: vec![("title".to_string(), FieldOptions::new())],
            overrides: ControllerOverrides::default(),
            route_options: RouteOptions::default(),
        }
    }

    /// Replace the field list
    #[must_use]
    pub fn with_fields<I, N>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (N, FieldOptions)>,
        N: Into<String>,
    {
        self.fields = fields
            .into_iter()
            .map(|(name, options)| (name.into(), options))
            .collect();
        self
    }

    /// Custom index columns
    #[must_use]
    pub fn with_table_columns(mut self, columns: TableColumns) -> Self {
        self.overrides.table_columns = Some(columns);
        self
    }

    /// Custom form
    #[must_use]
    pub fn with_form_fields(mut self, form: Form) -> Self {
        self.overrides.form = Some(form);
        self
    }

    /// Controller setup methods, applied in order
    #[must_use]
    pub fn with_setup_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.setup_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Extra controller property
    #[must_use]
    pub fn with_additional_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides
            .additional_props
            .insert(key.into(), value.into());
        self
    }

    /// Narrow the catalog routes
    #[must_use]
    pub fn with_route_options(mut self, options: RouteOptions) -> Self {
        self.route_options = options;
        self
    }

    /// Plural name
    #[must_use]
    pub fn name_plural(&self) -> &str {
        &self.name_plural
    }

    /// Boot the module into `state`, materializing its tables in `store`
    ///
    /// Booting a name that is already booted with the same fields reuses
    /// its descriptors, repository and controller; routes are registered
    /// again and the navigation entry rewritten.
    ///
    /// # Errors
    ///
    /// - [`ActonCmsError::InvalidSchema`](crate::error::ActonCmsError::InvalidSchema)
    ///   for bad fields or a redefinition with different fields
    /// - [`ActonCmsError::Config`](crate::error::ActonCmsError::Config) for an
    ///   unknown setup method
    /// - storage errors from materialization
    pub async fn boot(&self, state: &CmsState, store: &dyn SchemaStore) -> Result<BootedModule> {
        let mut options = IndexOptions::default();
        for method in &self.overrides.setup_methods {
            options.apply(method)?;
        }

        let schema = state
            .schemas()
            .insert(ResourceSchema::new(&self.name_plural, self.fields.clone())?)?;
        let descriptors = state.classes().describe(&schema, &self.overrides);
        let routes = RouteTable::bind(&schema, &state.config().admin, &self.route_options);

        let (repository, controller) = match state.module(schema.name_plural()) {
            Some(existing) if Arc::ptr_eq(&existing.descriptors, &descriptors) => {
                (existing.repository, existing.controller)
            }
            _ => {
                let repository = Arc::new(Repository::new(
                    &descriptors,
                    state.config().locales.clone(),
                ));
                let controller = Arc::new(ModuleController::new(
                    Arc::clone(&descriptors),
                    Arc::clone(&repository),
                    routes.base_path.clone(),
                )?);
                (repository, controller)
            }
        };

        let materialization = EntitySynthesizer::materialize(store, &schema).await?;

        state.routes().register(&routes, &controller);
        let index_path = routes
            .route(Operation::Index)
            .map_or_else(|| format!("{}/", routes.base_path), |r| r.path.clone());
        state.navigation().register_module(
            schema.name_plural(),
            &Naming::title(schema.name_plural()),
            &index_path,
        );

        let module = BootedModule {
            schema,
            descriptors,
            materialization,
            routes,
            repository,
            controller,
        };
        state.insert_module(module.clone());

        tracing::info!(
            module = %self.name_plural,
            tables_created = module.materialization.created(),
            "Booted anonymous module"
        );
        Ok(module)
    }
}

/// Everything a booted module consists of
#[derive(Debug, Clone)]
pub struct BootedModule {
    /// Registered schema
    pub schema: Arc<ResourceSchema>,
    /// Model, translation model, repository and controller descriptors
    pub descriptors: Arc<ModuleDescriptors>,
    /// Table definitions and whether this boot created them
    pub materialization: Materialization,
    /// Bound routes
    pub routes: RouteTable,
    /// Record store
    pub repository: Arc<Repository>,
    /// Operation handler
    pub controller: Arc<ModuleController>,
}

impl BootedModule {
    /// Path of a named operation, with the id substituted
    #[must_use]
    pub fn path(&self, operation: Operation, id: Option<&str>) -> Option<String> {
        self.routes.route(operation).map(|r| r.url(id))
    }
}
