//! Module preview
//!
//! Shows everything booting a module would produce, without touching a
//! database: the four tables and their DDL, the synthesized descriptors and
//! the bound routes.
//!
//! # Example
//!
//! ```bash
//! acton-cms scaffold events \
//!   title:string:translatable \
//!   startsAt:dateTime \
//!   isFeatured:boolean:default=true \
//!   --dialect sqlite --out database/cms
//! ```

use crate::{render, DatabaseBackend, ModuleArgs};
use acton_cms::config::AdminSettings;
use acton_cms::descriptor::{ClassSynthesizer, ControllerOverrides};
use acton_cms::entity::EntitySynthesizer;
use acton_cms::routing::RouteTable;
use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

/// A file written by `--out`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory
    pub path: PathBuf,
    /// File contents
    pub content: String,
    /// What the file holds
    pub description: String,
}

/// Preview a module's tables, descriptors and routes
pub struct ScaffoldCommand {
    module: ModuleArgs,
    backend: DatabaseBackend,
    out: Option<PathBuf>,
}

impl ScaffoldCommand {
    /// Create the command
    #[must_use]
    pub const fn new(module: ModuleArgs, backend: DatabaseBackend, out: Option<PathBuf>) -> Self {
        Self {
            module,
            backend,
            out,
        }
    }

    /// Files the preview consists of: DDL, descriptors and routes
    pub fn generate(&self, admin: &AdminSettings) -> Result<Vec<GeneratedFile>> {
        let schema = self.module.schema()?;
        let tables = EntitySynthesizer::plan(&schema);
        let descriptors = ClassSynthesizer::derive(&schema, &ControllerOverrides::default());
        let routes = RouteTable::bind(&schema, admin, &self.module.route_options());
        let stem = schema.table_name();

        Ok(vec![
            GeneratedFile {
                path: PathBuf::from(format!("{stem}_tables.sql")),
                content: render::ddl(&tables, self.backend.into()),
                description: "table DDL".to_string(),
            },
            GeneratedFile {
                path: PathBuf::from(format!("{stem}_descriptors.json")),
                content: render::descriptors(&descriptors)?,
                description: "model, repository and controller descriptors".to_string(),
            },
            GeneratedFile {
                path: PathBuf::from(format!("{stem}_routes.txt")),
                content: render::routes(&routes),
                description: "route list".to_string(),
            },
        ])
    }

    /// Print the preview, or write it when `--out` is set
    pub fn execute(&self, admin: &AdminSettings) -> Result<()> {
        println!(
            "\n{} {} {}",
            style("Scaffolding module").cyan().bold(),
            style(&self.module.name).green().bold(),
            style("...").cyan().bold()
        );

        let schema = self.module.schema()?;
        println!("\n{}", style("Tables:").cyan().bold());
        print!("{}", render::table_summary(&EntitySynthesizer::plan(&schema)));

        let files = self.generate(admin)?;

        let Some(out) = &self.out else {
            for file in &files {
                println!("\n{} {}", style("──").dim(), style(&file.description).bold());
                print!("{}", file.content);
            }
            return Ok(());
        };

        write_files(out, &files)?;
        println!(
            "\n{} {} files:",
            style("Generated").green().bold(),
            files.len()
        );
        for file in &files {
            println!(
                "  {} {} ({})",
                style("✓").green(),
                style(out.join(&file.path).display()).dim(),
                style(&file.description).dim()
            );
        }

        println!("\n{}", style("Next steps:").cyan().bold());
        println!(
            "  1. Create the tables: {}",
            style(format!("acton-cms migrate {}", self.module.name)).yellow()
        );
        println!(
            "  2. Boot it in your app: {}",
            style(format!("AnonymousModule::make(\"{}\")", self.module.name)).yellow()
        );

        Ok(())
    }
}

/// Write generated files below `root`, creating directories as needed
pub fn write_files(root: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let full_path = root.join(&file.path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&full_path, &file.content)
            .with_context(|| format!("Failed to write file: {}", full_path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_names_files_after_table() {
        let command = ScaffoldCommand::new(
            ModuleArgs::new("blog.posts", ["title"]),
            DatabaseBackend::Postgres,
            None,
        );
        let files = command.generate(&AdminSettings::default()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.path.display().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "blog_posts_tables.sql",
                "blog_posts_descriptors.json",
                "blog_posts_routes.txt"
            ]
        );
        assert!(files[2].content.contains("/admin/blog/posts/"));
    }

    #[test]
    fn test_generate_rejects_bad_field() {
        let command = ScaffoldCommand::new(
            ModuleArgs::new("events", ["title:string:sparkly"]),
            DatabaseBackend::Sqlite,
            None,
        );
        assert!(command.generate(&AdminSettings::default()).is_err());
    }
}
