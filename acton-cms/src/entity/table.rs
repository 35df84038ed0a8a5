//! Table definitions and DDL rendering
//!
//! A [`TableDefinition`] is plain data: the columns, indexes and foreign
//! keys the synthesizer decided on. Rendering to SQL happens per
//! [`Dialect`] so the same definition can target PostgreSQL or SQLite.

use crate::schema::{FieldType, FieldValue};
use serde::Serialize;
use std::fmt;

/// SQL dialect used to render DDL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Dialect {
    /// `PostgreSQL`
    #[default]
    Postgres,
    /// `SQLite`
    Sqlite,
}

impl Dialect {
    /// Pick a dialect from a connection url
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }
}

/// Column storage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    /// Auto-incrementing primary key
    Increments,
    /// Unsigned integer reference to another table's id
    ForeignId,
    /// VARCHAR(255)
    String,
    /// BOOLEAN
    Boolean,
    /// TIMESTAMP
    Timestamp,
    /// INTEGER
    Integer,
    /// JSON document
    Json,
}

impl ColumnType {
    /// SQL type for a dialect
    #[must_use]
    pub const fn sql_type(self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (Self::Increments, Dialect::Postgres) => "BIGSERIAL PRIMARY KEY",
            (Self::Increments, Dialect::Sqlite) => "INTEGER PRIMARY KEY AUTOINCREMENT",
            (Self::ForeignId, _) => "BIGINT",
            (Self::String, _) => "VARCHAR(255)",
            (Self::Boolean, _) => "BOOLEAN",
            (Self::Timestamp, _) => "TIMESTAMP",
            (Self::Integer, _) => "INTEGER",
            (Self::Json, Dialect::Postgres) => "JSONB",
            (Self::Json, Dialect::Sqlite) => "TEXT",
        }
    }
}

impl From<FieldType> for ColumnType {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => Self::String,
            FieldType::Boolean => Self::Boolean,
            FieldType::DateTime => Self::Timestamp,
        }
    }
}

/// Who decided a column exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnOrigin {
    /// Added by the framework for every table of its kind
    Framework,
    /// Declared in the resource schema
    Schema,
}

/// One column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Storage type
    pub column_type: ColumnType,
    /// Whether the column accepts null
    pub nullable: bool,
    /// Column default, if any
    pub default: Option<FieldValue>,
    /// Framework or schema column
    pub origin: ColumnOrigin,
}

impl ColumnDefinition {
    /// Framework column with no default
    #[must_use]
    pub fn framework(name: &str, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            nullable,
            default: None,
            origin: ColumnOrigin::Framework,
        }
    }

    /// Set a default
    #[must_use]
    pub fn with_default(mut self, default: FieldValue) -> Self {
        self.default = Some(default);
        self
    }

    fn render(&self, dialect: Dialect) -> String {
        let mut sql = format!("{} {}", quote(&self.name), self.column_type.sql_type(dialect));
        if self.column_type != ColumnType::Increments {
            if !self.nullable {
                sql.push_str(" NOT NULL");
            }
            if let Some(default) = &self.default {
                sql.push_str(" DEFAULT ");
                sql.push_str(&default.sql_literal(dialect == Dialect::Sqlite));
            }
        }
        sql
    }
}

/// Foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    /// Local column
    pub column: String,
    /// Referenced table
    pub references_table: String,
    /// Referenced column
    pub references_column: String,
    /// Delete children with the parent
    pub cascade: bool,
}

/// Secondary index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDefinition {
    /// Index name
    pub name: String,
    /// Indexed columns
    pub columns: Vec<String>,
    /// Unique constraint rather than a plain index
    pub unique: bool,
}

/// Complete description of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDefinition {
    /// Table name
    pub name: String,
    /// Columns in creation order
    pub columns: Vec<ColumnDefinition>,
    /// Indexes and unique constraints
    pub indexes: Vec<IndexDefinition>,
    /// Foreign keys
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDefinition {
    /// Empty table
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Append a column
    pub fn push(&mut self, column: ColumnDefinition) -> &mut Self {
        self.columns.push(column);
        self
    }

    /// Append a schema-declared column
    pub fn push_field(
        &mut self,
        name: &str,
        field_type: FieldType,
        nullable: bool,
        default: Option<FieldValue>,
    ) -> &mut Self {
        self.columns.push(ColumnDefinition {
            name: name.to_string(),
            column_type: field_type.into(),
            nullable,
            default,
            origin: ColumnOrigin::Schema,
        });
        self
    }

    /// Add a plain index `{table}_{columns}_index`
    pub fn index(&mut self, columns: &[&str]) -> &mut Self {
        let name = format!("{}_{}_index", self.name, columns.join("_"));
        self.indexes.push(IndexDefinition {
            name,
            columns: columns.iter().map(ToString::to_string).collect(),
            unique: false,
        });
        self
    }

    /// Add a named unique constraint
    pub fn unique(&mut self, name: impl Into<String>, columns: &[&str]) -> &mut Self {
        self.indexes.push(IndexDefinition {
            name: name.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
            unique: true,
        });
        self
    }

    /// Add a foreign key on `column` → `table.id`
    pub fn foreign(&mut self, column: &str, table: &str, cascade: bool) -> &mut Self {
        self.foreign_keys.push(ForeignKey {
            column: column.to_string(),
            references_table: table.to_string(),
            references_column: "id".to_string(),
            cascade,
        });
        self
    }

    /// Look up a column
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns declared by the resource schema
    pub fn schema_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns
            .iter()
            .filter(|c| c.origin == ColumnOrigin::Schema)
    }

    /// Columns added by the framework
    pub fn framework_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns
            .iter()
            .filter(|c| c.origin == ColumnOrigin::Framework)
    }

    /// Render the statements that create this table
    ///
    /// The first statement is `CREATE TABLE`; plain indexes follow as
    /// separate `CREATE INDEX` statements.
    #[must_use]
    pub fn create_statements(&self, dialect: Dialect) -> Vec<String> {
        let mut body: Vec<String> = self.columns.iter().map(|c| c.render(dialect)).collect();

        for index in self.indexes.iter().filter(|i| i.unique) {
            body.push(format!(
                "CONSTRAINT {} UNIQUE ({})",
                quote(&index.name),
                quote_list(&index.columns)
            ));
        }

        for fk in &self.foreign_keys {
            let mut constraint = format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                quote(&fk.column),
                quote(&fk.references_table),
                quote(&fk.references_column)
            );
            if fk.cascade {
                constraint.push_str(" ON DELETE CASCADE");
            }
            body.push(constraint);
        }

        let mut statements = vec![format!(
            "CREATE TABLE {} (\n    {}\n)",
            quote(&self.name),
            body.join(",\n    ")
        )];

        statements.extend(self.indexes.iter().filter(|i| !i.unique).map(|index| {
            format!(
                "CREATE INDEX {} ON {} ({})",
                quote(&index.name),
                quote(&self.name),
                quote_list(&index.columns)
            )
        }));

        statements
    }

    /// Render the statement that drops this table
    #[must_use]
    pub fn drop_statement(name: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", quote(name))
    }
}

impl fmt::Display for TableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.create_statements(Dialect::default()).join(";\n"))
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn quote_list(identifiers: &[String]) -> String {
    identifiers
        .iter()
        .map(|i| quote(i))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableDefinition {
        let mut table = TableDefinition::new("event_translations");
        table
            .push(ColumnDefinition::framework("id", ColumnType::Increments, false))
            .push(ColumnDefinition::framework("event_id", ColumnType::ForeignId, false))
            .push(ColumnDefinition::framework("locale", ColumnType::String, false))
            .push(
                ColumnDefinition::framework("active", ColumnType::Boolean, false)
                    .with_default(FieldValue::Bool(false)),
            )
            .push_field("title", FieldType::String, false, None)
            .index(&["locale"])
            .unique("event_id_locale_unique", &["event_id", "locale"])
            .foreign("event_id", "events", true);
        table
    }

    #[test]
    fn test_postgres_rendering() {
        let statements = sample().create_statements(Dialect::Postgres);
        assert_eq!(statements.len(), 2);

        let create = &statements[0];
        assert!(create.starts_with("CREATE TABLE \"event_translations\""));
        assert!(create.contains("\"id\" BIGSERIAL PRIMARY KEY"));
        assert!(create.contains("\"active\" BOOLEAN NOT NULL DEFAULT FALSE"));
        assert!(create.contains("CONSTRAINT \"event_id_locale_unique\" UNIQUE (\"event_id\", \"locale\")"));
        assert!(create.contains(
            "FOREIGN KEY (\"event_id\") REFERENCES \"events\" (\"id\") ON DELETE CASCADE"
        ));
        assert_eq!(
            statements[1],
            "CREATE INDEX \"event_translations_locale_index\" ON \"event_translations\" (\"locale\")"
        );
    }

    #[test]
    fn test_sqlite_rendering() {
        let create = &sample().create_statements(Dialect::Sqlite)[0];
        assert!(create.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(create.contains("\"active\" BOOLEAN NOT NULL DEFAULT 0"));
    }

    #[test]
    fn test_column_partitions() {
        let table = sample();
        assert_eq!(table.schema_columns().count(), 1);
        assert_eq!(table.framework_columns().count(), 4);
    }

    #[test]
    fn test_dialect_from_url() {
        assert_eq!(Dialect::from_url("postgres://localhost/app"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_url("sqlite::memory:"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_url("mysql://localhost"), None);
    }
}
