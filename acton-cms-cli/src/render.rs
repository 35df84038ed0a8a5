//! Plain-text renderings shared by the commands

use acton_cms::descriptor::ModuleDescriptors;
use acton_cms::entity::{Dialect, PersistedSchema};
use acton_cms::routing::RouteTable;
use anyhow::Result;
use std::fmt::Write as _;

/// DDL for all four tables, statements terminated with `;`
#[must_use]
pub fn ddl(tables: &PersistedSchema, dialect: Dialect) -> String {
    tables
        .creation_order()
        .iter()
        .flat_map(|table| table.create_statements(dialect))
        .map(|statement| format!("{statement};\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Table summary: one line per table with its schema columns
#[must_use]
pub fn table_summary(tables: &PersistedSchema) -> String {
    let mut out = String::new();
    for table in tables.creation_order() {
        let columns: Vec<&str> = table.schema_columns().map(|c| c.name.as_str()).collect();
        let columns = if columns.is_empty() {
            "-".to_string()
        } else {
            columns.join(", ")
        };
        let _ = writeln!(out, "{:<28} {columns}", table.name);
    }
    out
}

/// Descriptors as pretty JSON
pub fn descriptors(descriptors: &ModuleDescriptors) -> Result<String> {
    Ok(serde_json::to_string_pretty(descriptors)?)
}

/// Route list: verb, path and name, aligned
#[must_use]
pub fn routes(table: &RouteTable) -> String {
    let width = table
        .routes
        .iter()
        .map(|r| r.path.len())
        .max()
        .unwrap_or_default();
    let mut out = String::new();
    for route in &table.routes {
        let _ = writeln!(
            out,
            "{:<6} {:<width$}  {}",
            route.verb.to_string(),
            route.path,
            route.name
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use acton_cms::config::AdminSettings;
    use acton_cms::descriptor::{ClassSynthesizer, ControllerOverrides};
    use acton_cms::entity::EntitySynthesizer;
    use acton_cms::routing::RouteOptions;
    use acton_cms::schema::ResourceSchema;

    fn events() -> ResourceSchema {
        ResourceSchema::from_shorthand("events", &["title:string:translatable", "startsAt:dateTime"])
            .unwrap()
    }

    #[test]
    fn test_ddl_covers_all_tables() {
        let sql = ddl(&EntitySynthesizer::plan(&events()), Dialect::Sqlite);
        for table in ["events", "event_translations", "event_slugs", "event_revisions"] {
            assert!(sql.contains(&format!("CREATE TABLE \"{table}\"")), "{table}");
        }
        assert!(sql.trim_end().ends_with(';'));
    }

    #[test]
    fn test_table_summary_lists_schema_columns() {
        let summary = table_summary(&EntitySynthesizer::plan(&events()));
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("events"));
        assert!(lines[0].ends_with("startsAt"));
        assert!(lines[1].ends_with("title"));
        assert!(lines[2].ends_with('-'));
    }

    #[test]
    fn test_routes_are_aligned() {
        let table = RouteTable::bind(&events(), &AdminSettings::default(), &RouteOptions::new());
        let listing = routes(&table);
        assert_eq!(listing.lines().count(), 21);
        let first = listing.lines().next().unwrap();
        assert!(first.starts_with("GET"));
        assert!(first.ends_with("twill.events.index"));
    }

    #[test]
    fn test_descriptors_json() {
        let descriptors =
            ClassSynthesizer::derive(&events(), &ControllerOverrides::default());
        let json: serde_json::Value =
            serde_json::from_str(&super::descriptors(&descriptors).unwrap()).unwrap();
        assert_eq!(json["model"]["type_name"], "Event");
        assert_eq!(json["controller"]["type_name"], "EventController");
    }
}
