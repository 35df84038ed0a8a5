//! Schema stores: where table definitions are applied
//!
//! The synthesizer only decides names, types, defaults and nullability. A
//! [`SchemaStore`] turns those decisions into real tables. Three stores ship
//! with the crate:
//!
//! - [`PgSchemaStore`] over a `sqlx::PgPool`
//! - [`SqliteSchemaStore`] over a `sqlx::SqlitePool`
//! - [`MemorySchemaStore`], an in-process catalog for dry runs and tests

use super::table::{Dialect, TableDefinition};
use crate::error::{ActonCmsError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::{postgres::PgPoolOptions, sqlite::SqlitePoolOptions, PgPool, SqlitePool};
use std::collections::BTreeMap;

/// Storage collaborator for DDL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Whether a table with this name exists
    async fn has_table(&self, name: &str) -> Result<bool>;

    /// Create a table; fails if it already exists
    async fn create_table(&self, table: &TableDefinition) -> Result<()>;

    /// Drop a table if it exists
    async fn drop_table(&self, name: &str) -> Result<()>;
}

/// In-process table catalog
///
/// Keeps the definitions it was asked to create so callers can inspect them.
#[derive(Debug, Default)]
pub struct MemorySchemaStore {
    tables: RwLock<BTreeMap<String, TableDefinition>>,
}

impl MemorySchemaStore {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Definition of a created table
    #[must_use]
    pub fn table(&self, name: &str) -> Option<TableDefinition> {
        self.tables.read().get(name).cloned()
    }

    /// Names of all created tables, sorted
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }
}

#[async_trait]
impl SchemaStore for MemorySchemaStore {
    async fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.tables.read().contains_key(name))
    }

    async fn create_table(&self, table: &TableDefinition) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(&table.name) {
            return Err(ActonCmsError::TableExists(table.name.clone()));
        }
        tables.insert(table.name.clone(), table.clone());
        Ok(())
    }

    async fn drop_table(&self, name: &str) -> Result<()> {
        self.tables.write().remove(name);
        Ok(())
    }
}

/// `SQLite` schema store
#[derive(Debug, Clone)]
pub struct SqliteSchemaStore {
    pool: SqlitePool,
}

impl SqliteSchemaStore {
    /// Wrap an existing pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a database url
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::Database`] if the connection fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SchemaStore for SqliteSchemaStore {
    async fn has_table(&self, name: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn create_table(&self, table: &TableDefinition) -> Result<()> {
        if self.has_table(&table.name).await? {
            return Err(ActonCmsError::TableExists(table.name.clone()));
        }
        for statement in table.create_statements(Dialect::Sqlite) {
            tracing::trace!(%statement, "Executing DDL");
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn drop_table(&self, name: &str) -> Result<()> {
        sqlx::query(&TableDefinition::drop_statement(name))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// `PostgreSQL` schema store
#[derive(Debug, Clone)]
pub struct PgSchemaStore {
    pool: PgPool,
}

impl PgSchemaStore {
    /// Wrap an existing pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to a database url
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::Database`] if the connection fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SchemaStore for PgSchemaStore {
    async fn has_table(&self, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1)",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_table(&self, table: &TableDefinition) -> Result<()> {
        if self.has_table(&table.name).await? {
            return Err(ActonCmsError::TableExists(table.name.clone()));
        }
        for statement in table.create_statements(Dialect::Postgres) {
            tracing::trace!(%statement, "Executing DDL");
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn drop_table(&self, name: &str) -> Result<()> {
        sqlx::query(&TableDefinition::drop_statement(name))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_lifecycle() {
        let store = MemorySchemaStore::new();
        let table = TableDefinition::new("events");

        assert!(!store.has_table("events").await.unwrap());
        store.create_table(&table).await.unwrap();
        assert!(store.has_table("events").await.unwrap());
        assert_eq!(store.table_names(), vec!["events"]);

        let err = store.create_table(&table).await.unwrap_err();
        assert!(matches!(err, ActonCmsError::TableExists(name) if name == "events"));

        store.drop_table("events").await.unwrap();
        store.drop_table("events").await.unwrap();
        assert!(store.table("events").is_none());
    }
}
