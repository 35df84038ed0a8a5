//! Route listing for a module

use crate::{render, ModuleArgs};
use acton_cms::config::AdminSettings;
use acton_cms::routing::RouteTable;
use anyhow::Result;
use console::style;

/// Print the routes a module would register
pub struct RoutesCommand {
    module: ModuleArgs,
}

impl RoutesCommand {
    /// Create the command
    #[must_use]
    pub const fn new(module: ModuleArgs) -> Self {
        Self { module }
    }

    /// Bound route table
    pub fn table(&self, admin: &AdminSettings) -> Result<RouteTable> {
        let schema = self.module.schema()?;
        Ok(RouteTable::bind(&schema, admin, &self.module.route_options()))
    }

    /// Execute the command
    pub fn execute(&self, admin: &AdminSettings) -> Result<()> {
        let table = self.table(admin)?;
        println!(
            "{} {} {}",
            style(table.routes.len()).green().bold(),
            style("routes for").bold(),
            style(&table.module).green().bold()
        );
        println!();
        print!("{}", render::routes(&table));
        println!();
        println!(
            "{} {}",
            style("Middleware:").dim(),
            style(admin.middleware().join(", ")).dim()
        );
        Ok(())
    }
}
