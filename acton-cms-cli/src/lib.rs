//! acton-cms CLI library

#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

pub mod commands;
pub mod render;

pub use commands::{MigrateCommand, RollbackCommand, RoutesCommand, ScaffoldCommand};

use acton_cms::config::ActonCmsConfig;
use acton_cms::entity::{Dialect, PgSchemaStore, SchemaStore, SqliteSchemaStore};
use acton_cms::routing::RouteOptions;
use acton_cms::schema::ResourceSchema;
use anyhow::{Context, Result};
use std::path::Path;

/// Module definition shared by every command
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ModuleArgs {
    /// Plural module name (e.g., `events`, `blog.posts`)
    pub name: String,

    /// Field definitions (e.g., `title:string:translatable`, `startsAt:dateTime`)
    ///
    /// Defaults to a single `title` string.
    pub fields: Vec<String>,

    /// Keep only these catalog routes (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Drop these catalog routes (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub except: Vec<String>,
}

impl ModuleArgs {
    /// Module args for a name and field list
    #[must_use]
    pub fn new<S: Into<String>>(name: impl Into<String>, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Validated resource schema
    pub fn schema(&self) -> Result<ResourceSchema> {
        let schema = if self.fields.is_empty() {
            ResourceSchema::with_default_fields(&self.name)
        } else {
            ResourceSchema::from_shorthand(&self.name, &self.fields)
        };
        schema.with_context(|| format!("Invalid definition for module '{}'", self.name))
    }

    /// Catalog narrowing from `--only` and `--except`
    #[must_use]
    pub fn route_options(&self) -> RouteOptions {
        let mut options = RouteOptions::new();
        if !self.only.is_empty() {
            options = options.only(self.only.iter().cloned());
        }
        if !self.except.is_empty() {
            options = options.except(self.except.iter().cloned());
        }
        options
    }
}

/// SQL dialect for rendered DDL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DatabaseBackend {
    /// `SQLite`
    Sqlite,
    /// `PostgreSQL` (default)
    #[default]
    Postgres,
}

impl From<DatabaseBackend> for Dialect {
    fn from(backend: DatabaseBackend) -> Self {
        match backend {
            DatabaseBackend::Sqlite => Self::Sqlite,
            DatabaseBackend::Postgres => Self::Postgres,
        }
    }
}

/// Load configuration from an explicit file or the standard locations
pub fn load_config(path: Option<&Path>) -> Result<ActonCmsConfig> {
    match path {
        Some(path) => {
            let path_str = path
                .to_str()
                .with_context(|| format!("Config path is not UTF-8: {}", path.display()))?;
            ActonCmsConfig::load_from(path_str)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => ActonCmsConfig::load_for_service("acton-cms").context("Failed to load config"),
    }
}

/// Database url from the flag, falling back to `database.url` in config
pub fn database_url(flag: Option<&str>, config: &ActonCmsConfig) -> Result<String> {
    flag.map(ToString::to_string)
        .or_else(|| config.database.url.clone())
        .context("No database url: pass --database-url or set database.url (ACTON_DATABASE__URL)")
}

/// Connect the schema store matching the url's scheme
pub async fn connect(url: &str, max_connections: u32) -> Result<Box<dyn SchemaStore>> {
    let dialect = Dialect::from_url(url)
        .with_context(|| format!("Unsupported database url '{url}' (expected postgres:// or sqlite:)"))?;
    tracing::debug!(?dialect, "Connecting schema store");
    let store: Box<dyn SchemaStore> = match dialect {
        Dialect::Sqlite => Box::new(
            SqliteSchemaStore::connect(url, max_connections)
                .await
                .context("Failed to connect to SQLite")?,
        ),
        Dialect::Postgres => Box::new(
            PgSchemaStore::connect(url, max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?,
        ),
    };
    Ok(store)
}
