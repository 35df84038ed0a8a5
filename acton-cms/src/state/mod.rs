//! Application state shared by start-up code and handlers
//!
//! Holds the registries every booted module writes into: schemas,
//! descriptors, routes, navigation and the booted modules themselves.

use crate::{
    config::ActonCmsConfig, descriptor::ClassSynthesizer, module::BootedModule,
    navigation::Navigation, routing::RouteRegistry, schema::SchemaRegistry,
};
use axum::Router;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared acton-cms state
///
/// Cheap to clone; every clone sees the same registries.
///
/// # Example
///
/// ```rust
/// use acton_cms::state::CmsState;
///
/// let state = CmsState::new();
/// assert_eq!(state.config().admin.app_path, "admin");
/// assert!(state.routes().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct CmsState {
    config: Arc<ActonCmsConfig>,
    schemas: Arc<SchemaRegistry>,
    classes: Arc<ClassSynthesizer>,
    routes: Arc<RouteRegistry>,
    navigation: Arc<Navigation>,
    modules: Arc<RwLock<BTreeMap<String, BootedModule>>>,
}

impl CmsState {
    /// State with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State with the given configuration
    #[must_use]
    pub fn with_config(config: ActonCmsConfig) -> Self {
        Self {
            config: Arc::new(config),
            ..Self::default()
        }
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &ActonCmsConfig {
        &self.config
    }

    /// Schema registry
    #[must_use]
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Descriptor cache
    #[must_use]
    pub fn classes(&self) -> &ClassSynthesizer {
        &self.classes
    }

    /// Route registry
    #[must_use]
    pub fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    /// Navigation map
    #[must_use]
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// A booted module by plural name
    #[must_use]
    pub fn module(&self, name_plural: &str) -> Option<BootedModule> {
        self.modules.read().get(name_plural).cloned()
    }

    /// Names of booted modules, sorted
    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }

    pub(crate) fn insert_module(&self, module: BootedModule) {
        self.modules
            .write()
            .insert(module.schema.name_plural().to_string(), module);
    }

    /// axum router serving every registered module route
    #[must_use]
    pub fn router(&self) -> Router {
        self.routes.router(&self.config.admin)
    }
}

impl std::fmt::Debug for CmsState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsState")
            .field("config", &self.config)
            .field("schemas", &self.schemas.names())
            .field("routes", &self.routes.len())
            .field("modules", &self.module_names())
            .finish_non_exhaustive()
    }
}
