//! acton-cms CLI tool

#![forbid(unsafe_code)]

use acton_cms::observability::{self, ObservabilityConfig};
use acton_cms_cli_lib::{
    database_url, load_config, DatabaseBackend, MigrateCommand, ModuleArgs, RollbackCommand,
    RoutesCommand, ScaffoldCommand,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "acton-cms")]
#[command(version)]
#[command(about = "CLI tool for acton-cms modules", long_about = None)]
struct Cli {
    /// Config file (defaults to the standard locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview a module's tables, descriptors and routes
    Scaffold {
        #[command(flatten)]
        module: ModuleArgs,
        /// SQL dialect for the DDL
        #[arg(long, value_enum, default_value_t)]
        dialect: DatabaseBackend,
        /// Write the preview to this directory instead of printing it
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the routes a module registers
    Routes {
        #[command(flatten)]
        module: ModuleArgs,
    },
    /// Create a module's tables
    Migrate {
        #[command(flatten)]
        module: ModuleArgs,
        /// Database url (`postgres://…` or `sqlite:…`)
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Drop a module's tables
    Rollback {
        #[command(flatten)]
        module: ModuleArgs,
        /// Database url (`postgres://…` or `sqlite:…`)
        #[arg(long)]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        observability::init_with(&ObservabilityConfig::new("acton-cms").with_verbose())?;
    }
    let config = load_config(cli.config.as_deref())?;
    let pool_size = config.database.max_connections;

    match cli.command {
        Commands::Scaffold {
            module,
            dialect,
            out,
        } => {
            ScaffoldCommand::new(module, dialect, out).execute(&config.admin)?;
        }
        Commands::Routes { module } => {
            RoutesCommand::new(module).execute(&config.admin)?;
        }
        Commands::Migrate {
            module,
            database_url: url,
        } => {
            let url = database_url(url.as_deref(), &config)?;
            MigrateCommand::new(module, url, pool_size).execute().await?;
        }
        Commands::Rollback {
            module,
            database_url: url,
        } => {
            let url = database_url(url.as_deref(), &config)?;
            RollbackCommand::new(module, url, pool_size).execute().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scaffold() {
        let cli = Cli::try_parse_from([
            "acton-cms",
            "scaffold",
            "events",
            "title:string:translatable",
            "startsAt:dateTime",
            "--dialect",
            "sqlite",
            "--except",
            "duplicate,tags",
        ])
        .unwrap();

        let Commands::Scaffold { module, dialect, out } = cli.command else {
            panic!("expected scaffold");
        };
        assert_eq!(module.name, "events");
        assert_eq!(module.fields.len(), 2);
        assert_eq!(module.except, vec!["duplicate", "tags"]);
        assert_eq!(dialect, DatabaseBackend::Sqlite);
        assert!(out.is_none());
    }

    #[test]
    fn test_parse_migrate_with_global_config() {
        let cli = Cli::try_parse_from([
            "acton-cms",
            "migrate",
            "events",
            "--database-url",
            "sqlite::memory:",
            "--config",
            "cms.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cms.toml")));
        assert!(matches!(
            cli.command,
            Commands::Migrate { database_url: Some(ref url), .. } if url == "sqlite::memory:"
        ));
    }
}
