//! Drop a module's tables

use crate::{connect, ModuleArgs};
use acton_cms::entity::{EntitySynthesizer, SchemaStore};
use anyhow::{Context, Result};
use console::style;

/// Drop the revisions, translations, slugs and main tables
pub struct RollbackCommand {
    module: ModuleArgs,
    database_url: String,
    max_connections: u32,
}

impl RollbackCommand {
    /// Create the command
    #[must_use]
    pub const fn new(module: ModuleArgs, database_url: String, max_connections: u32) -> Self {
        Self {
            module,
            database_url,
            max_connections,
        }
    }

    /// Drop against an already connected store; returns the dropped names
    pub async fn run(&self, store: &dyn SchemaStore) -> Result<Vec<String>> {
        let schema = self.module.schema()?;
        EntitySynthesizer::rollback(store, &schema)
            .await
            .with_context(|| format!("Failed to drop tables for '{}'", self.module.name))?;
        Ok(EntitySynthesizer::plan(&schema)
            .drop_order()
            .iter()
            .map(ToString::to_string)
            .collect())
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        println!(
            "{} {}",
            style("Dropping").yellow().bold(),
            style(format!("tables for {}...", self.module.name)).bold()
        );
        println!();

        let store = connect(&self.database_url, self.max_connections).await?;
        for name in self.run(store.as_ref()).await? {
            println!("  {} {}", style("✓").green(), name);
        }

        println!();
        println!("{}", style("✓ Tables dropped").green().bold());
        Ok(())
    }
}
