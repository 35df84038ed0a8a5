//! Persistence schema synthesis
//!
//! Turns a [`ResourceSchema`](crate::schema::ResourceSchema) into the main,
//! translations, slugs and revisions tables and applies them through a
//! [`SchemaStore`].

pub mod defaults;
pub mod store;
pub mod synthesizer;
pub mod table;

pub use store::{MemorySchemaStore, PgSchemaStore, SchemaStore, SqliteSchemaStore};
pub use synthesizer::{EntitySynthesizer, Materialization, PersistedSchema};
pub use table::{
    ColumnDefinition, ColumnOrigin, ColumnType, Dialect, ForeignKey, IndexDefinition,
    TableDefinition,
};
