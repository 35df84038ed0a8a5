//! Framework-managed columns shared by every module table set

use super::table::{ColumnDefinition, ColumnType, TableDefinition};
use crate::schema::FieldValue;

/// id, soft-delete marker, timestamps, publish flag and position
pub fn default_table_fields(table: &mut TableDefinition) {
    table.push(ColumnDefinition::framework("id", ColumnType::Increments, false));
    soft_deletes(table);
    timestamps(table);
    table
        .push(
            ColumnDefinition::framework("published", ColumnType::Boolean, false)
                .with_default(FieldValue::Bool(false)),
        )
        .push(ColumnDefinition::framework("position", ColumnType::Integer, true));
}

/// id, owner key, soft-delete marker, timestamps, locale and active flag
///
/// The owner key cascades on delete and `(owner, locale)` is unique.
pub fn default_translations_table_fields(table: &mut TableDefinition, singular: &str, main_table: &str) {
    let foreign_key = format!("{singular}_id");
    table
        .push(ColumnDefinition::framework("id", ColumnType::Increments, false))
        .push(ColumnDefinition::framework(&foreign_key, ColumnType::ForeignId, false));
    soft_deletes(table);
    timestamps(table);
    table
        .push(ColumnDefinition::framework("locale", ColumnType::String, false))
        .push(
            ColumnDefinition::framework("active", ColumnType::Boolean, false)
                .with_default(FieldValue::Bool(false)),
        )
        .index(&["locale"])
        .unique(format!("{singular}_id_locale_unique"), &[foreign_key.as_str(), "locale"])
        .foreign(&foreign_key, main_table, true);
}

/// id, soft-delete marker, timestamps, slug, locale, active flag and owner key
pub fn default_slugs_table_fields(table: &mut TableDefinition, singular: &str, main_table: &str) {
    let foreign_key = format!("{singular}_id");
    table.push(ColumnDefinition::framework("id", ColumnType::Increments, false));
    soft_deletes(table);
    timestamps(table);
    table
        .push(ColumnDefinition::framework("slug", ColumnType::String, false))
        .push(ColumnDefinition::framework("locale", ColumnType::String, false))
        .push(
            ColumnDefinition::framework("active", ColumnType::Boolean, false)
                .with_default(FieldValue::Bool(false)),
        )
        .push(ColumnDefinition::framework(&foreign_key, ColumnType::ForeignId, false))
        .index(&["locale"])
        .foreign(&foreign_key, main_table, true);
}

/// id, timestamps, JSON payload, owner key and nullable author
pub fn default_revisions_table_fields(table: &mut TableDefinition, singular: &str, main_table: &str) {
    let foreign_key = format!("{singular}_id");
    table.push(ColumnDefinition::framework("id", ColumnType::Increments, false));
    timestamps(table);
    table
        .push(ColumnDefinition::framework("payload", ColumnType::Json, false))
        .push(ColumnDefinition::framework(&foreign_key, ColumnType::ForeignId, false))
        .push(ColumnDefinition::framework("user_id", ColumnType::ForeignId, true))
        .foreign(&foreign_key, main_table, true);
}

fn soft_deletes(table: &mut TableDefinition) {
    table.push(ColumnDefinition::framework("deleted_at", ColumnType::Timestamp, true));
}

fn timestamps(table: &mut TableDefinition) {
    table
        .push(ColumnDefinition::framework("created_at", ColumnType::Timestamp, true))
        .push(ColumnDefinition::framework("updated_at", ColumnType::Timestamp, true));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(table: &TableDefinition) -> Vec<&str> {
        table.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_main_table_columns() {
        let mut table = TableDefinition::new("events");
        default_table_fields(&mut table);
        assert_eq!(
            names(&table),
            vec!["id", "deleted_at", "created_at", "updated_at", "published", "position"]
        );
        assert_eq!(
            table.column("published").unwrap().default,
            Some(FieldValue::Bool(false))
        );
    }

    #[test]
    fn test_translation_table_constraints() {
        let mut table = TableDefinition::new("event_translations");
        default_translations_table_fields(&mut table, "event", "events");

        assert!(table.column("event_id").is_some());
        assert_eq!(table.foreign_keys[0].references_table, "events");
        assert!(table.foreign_keys[0].cascade);
        assert!(table
            .indexes
            .iter()
            .any(|i| i.unique && i.name == "event_id_locale_unique"));
    }

    #[test]
    fn test_revisions_table_columns() {
        let mut table = TableDefinition::new("event_revisions");
        default_revisions_table_fields(&mut table, "event", "events");
        assert_eq!(
            names(&table),
            vec!["id", "created_at", "updated_at", "payload", "event_id", "user_id"]
        );
        assert!(table.column("user_id").unwrap().nullable);
    }
}
