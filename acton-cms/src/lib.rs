//! acton-cms: anonymous admin modules for axum applications
//!
//! Define a CMS module from a plural name and a field list, and get:
//!
//! - a registered, validated resource schema
//! - main, translations, slugs and revisions tables in your database
//! - model, translation model, repository and controller descriptors
//! - the six CRUD routes plus the module operation catalog, named
//!   `twill.{module}.{operation}`, mounted under the admin prefix behind the
//!   admin guard
//! - an entry in the admin navigation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use acton_cms::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     acton_cms::observability::init()?;
//!
//!     let config = ActonCmsConfig::load_for_service("acton-cms")?;
//!     let state = CmsState::with_config(config);
//!     let store = SqliteSchemaStore::connect("sqlite://./cms.db?mode=rwc", 5).await?;
//!
//!     AnonymousModule::make("events")
//!         .with_fields([
//!             ("title", FieldOptions::new().translatable()),
//!             ("startsAt", FieldOptions::new().of_type("dateTime")),
//!         ])
//!         .boot(&state, &store)
//!         .await?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, state.router()).await?;
//!     Ok(())
//! }
//! ```
//!
//! The router expects an upstream layer to place an
//! [`AdminSession`](middleware::AdminSession) in request extensions for
//! logged-in admins.

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod module;
pub mod navigation;
pub mod observability;
pub mod routing;
pub mod runtime;
pub mod schema;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude {
    //! Convenience re-exports for common types
    //!
    //! ```rust
    //! use acton_cms::prelude::*;
    //! ```

    pub use crate::config::{ActonCmsConfig, AdminSettings, LocaleSettings};
    pub use crate::descriptor::{
        ClassSynthesizer, Form, FormField, InputKind, ModuleDescriptors, TableColumn,
        TableColumns,
    };
    pub use crate::entity::{
        Dialect, EntitySynthesizer, Materialization, MemorySchemaStore, PgSchemaStore,
        SchemaStore, SqliteSchemaStore,
    };
    pub use crate::error::{ActonCmsError, Result};
    pub use crate::middleware::{AdminAuth, AdminSession};
    pub use crate::module::{AnonymousModule, BootedModule};
    pub use crate::navigation::{Navigation, NavigationLink};
    pub use crate::routing::{Operation, RouteOptions, RouteRegistry, RouteTable};
    pub use crate::runtime::{ModuleController, OperationRequest, Repository};
    pub use crate::schema::{FieldOptions, FieldType, ResourceSchema, SchemaRegistry};
    pub use crate::state::CmsState;

    pub use axum;
    pub use serde_json::json;
}
