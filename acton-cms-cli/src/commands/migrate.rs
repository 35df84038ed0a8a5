//! Create a module's tables in a database

use crate::{connect, ModuleArgs};
use acton_cms::entity::{EntitySynthesizer, Materialization, SchemaStore};
use anyhow::{Context, Result};
use console::style;

/// Create the main, translations, slugs and revisions tables
pub struct MigrateCommand {
    module: ModuleArgs,
    database_url: String,
    max_connections: u32,
}

impl MigrateCommand {
    /// Create the command
    #[must_use]
    pub const fn new(module: ModuleArgs, database_url: String, max_connections: u32) -> Self {
        Self {
            module,
            database_url,
            max_connections,
        }
    }

    /// Materialize against an already connected store
    pub async fn run(&self, store: &dyn SchemaStore) -> Result<Materialization> {
        let schema = self.module.schema()?;
        EntitySynthesizer::materialize(store, &schema)
            .await
            .with_context(|| format!("Failed to create tables for '{}'", self.module.name))
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        println!(
            "{} {}",
            style("Creating").green().bold(),
            style(format!("tables for {}...", self.module.name)).bold()
        );
        println!();

        let store = connect(&self.database_url, self.max_connections).await?;
        let outcome = self.run(store.as_ref()).await?;

        let tables = outcome.schema().creation_order();
        if outcome.created() {
            for table in tables {
                println!("  {} {}", style("✓").green(), table.name);
            }
            println!();
            println!("{}", style("✓ Tables created successfully!").green().bold());
        } else {
            println!(
                "  {} {} already exists, nothing to do",
                style("!").yellow(),
                style(&tables[0].name).bold()
            );
        }

        Ok(())
    }
}
