//! Entity synthesizer: resource schema → the four module tables

use super::defaults::{
    default_revisions_table_fields, default_slugs_table_fields, default_table_fields,
    default_translations_table_fields,
};
use super::store::SchemaStore;
use super::table::TableDefinition;
use crate::error::{ActonCmsError, Result};
use crate::schema::{Naming, ResourceSchema};
use serde::Serialize;

/// The four tables backing one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedSchema {
    /// Entity table (`events`)
    pub main: TableDefinition,
    /// Translations table (`event_translations`)
    pub translations: TableDefinition,
    /// Slugs table (`event_slugs`)
    pub slugs: TableDefinition,
    /// Revisions table (`event_revisions`)
    pub revisions: TableDefinition,
}

impl PersistedSchema {
    /// Tables in creation order
    #[must_use]
    pub fn creation_order(&self) -> [&TableDefinition; 4] {
        [&self.main, &self.translations, &self.slugs, &self.revisions]
    }

    /// Table names in drop order: revisions, translations, slugs, main
    #[must_use]
    pub fn drop_order(&self) -> [&str; 4] {
        [
            self.revisions.name.as_str(),
            self.translations.name.as_str(),
            self.slugs.name.as_str(),
            self.main.name.as_str(),
        ]
    }
}

/// Result of [`EntitySynthesizer::materialize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialization {
    /// All four tables were created
    Created(PersistedSchema),
    /// The main table already existed; nothing was touched
    Skipped(PersistedSchema),
}

impl Materialization {
    /// The table set, whichever way it went
    #[must_use]
    pub const fn schema(&self) -> &PersistedSchema {
        match self {
            Self::Created(schema) | Self::Skipped(schema) => schema,
        }
    }

    /// Whether tables were created by this call
    #[must_use]
    pub const fn created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Derives and applies module table definitions
pub struct EntitySynthesizer;

impl EntitySynthesizer {
    /// Derive the four table definitions for a schema
    ///
    /// Pure: the same schema always yields the same definitions.
    #[must_use]
    pub fn plan(schema: &ResourceSchema) -> PersistedSchema {
        let name = schema.name_plural();
        let main_table = schema.table_name();
        let singular = Naming::table_singular(name);

        let mut main = TableDefinition::new(&main_table);
        default_table_fields(&mut main);
        for field in schema.main_fields() {
            main.push_field(
                &field.name,
                field.field_type,
                field.nullable,
                Some(field.default.clone()),
            );
        }

        let mut translations = TableDefinition::new(Naming::translations_table(name));
        default_translations_table_fields(&mut translations, &singular, &main_table);
        for field in schema.translatable_fields() {
            translations.push_field(&field.name, crate::schema::FieldType::String, false, None);
        }

        let mut slugs = TableDefinition::new(Naming::slugs_table(name));
        default_slugs_table_fields(&mut slugs, &singular, &main_table);

        let mut revisions = TableDefinition::new(Naming::revisions_table(name));
        default_revisions_table_fields(&mut revisions, &singular, &main_table);

        PersistedSchema {
            main,
            translations,
            slugs,
            revisions,
        }
    }

    /// Create the module tables unless the main table already exists
    ///
    /// Only the main table is checked: when it exists the other three are
    /// assumed present and the call is a no-op.
    ///
    /// # Errors
    ///
    /// - The store's own error if the existence check or the first table fails
    /// - [`ActonCmsError::PartialMaterialization`] if a later table fails;
    ///   tables already created are left in place
    pub async fn materialize(
        store: &dyn SchemaStore,
        schema: &ResourceSchema,
    ) -> Result<Materialization> {
        let planned = Self::plan(schema);

        if store.has_table(&planned.main.name).await? {
            tracing::debug!(
                resource = schema.name_plural(),
                table = %planned.main.name,
                "Main table exists, skipping materialization"
            );
            return Ok(Materialization::Skipped(planned));
        }

        let mut created: Vec<String> = Vec::with_capacity(4);
        for table in planned.creation_order() {
            if let Err(source) = store.create_table(table).await {
                if created.is_empty() {
                    return Err(source);
                }
                tracing::error!(
                    resource = schema.name_plural(),
                    table = %table.name,
                    ?created,
                    error = %source,
                    "Module tables partially created"
                );
                return Err(ActonCmsError::PartialMaterialization {
                    table: table.name.clone(),
                    created,
                    source: Box::new(source),
                });
            }
            created.push(table.name.clone());
        }

        tracing::info!(resource = schema.name_plural(), tables = ?created, "Materialized module tables");
        Ok(Materialization::Created(planned))
    }

    /// Drop the module tables: revisions, translations, slugs, main
    ///
    /// # Errors
    ///
    /// Returns the store's error for the first drop that fails.
    pub async fn rollback(store: &dyn SchemaStore, schema: &ResourceSchema) -> Result<()> {
        let planned = Self::plan(schema);
        for name in planned.drop_order() {
            store.drop_table(name).await?;
        }
        tracing::info!(resource = schema.name_plural(), "Dropped module tables");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::store::{MemorySchemaStore, MockSchemaStore};
    use crate::entity::ColumnType;
    use crate::schema::{FieldOptions, FieldValue};
    use mockall::Sequence;
    use proptest::prelude::*;
    use serde_json::json;

    fn events() -> ResourceSchema {
        ResourceSchema::from_json(
            "events",
            &json!({
                "title": {},
                "startsAt": {"type": "dateTime"},
                "isFeatured": {"type": "boolean", "default": true},
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_events_plan() {
        let planned = EntitySynthesizer::plan(&events());

        assert_eq!(planned.main.name, "events");
        let schema_columns: Vec<_> = planned.main.schema_columns().collect();
        assert_eq!(schema_columns.len(), 3);

        let title = planned.main.column("title").unwrap();
        assert_eq!(title.column_type, ColumnType::String);
        assert!(title.nullable);
        assert_eq!(title.default, Some(FieldValue::Null));

        let starts = planned.main.column("startsAt").unwrap();
        assert_eq!(starts.column_type, ColumnType::Timestamp);
        assert_eq!(starts.default, Some(FieldValue::Null));

        let featured = planned.main.column("isFeatured").unwrap();
        assert_eq!(featured.column_type, ColumnType::Boolean);
        assert!(featured.nullable);
        assert_eq!(featured.default, Some(FieldValue::Bool(true)));

        assert_eq!(planned.translations.name, "event_translations");
        assert_eq!(planned.translations.schema_columns().count(), 0);
        assert_eq!(planned.slugs.name, "event_slugs");
        assert_eq!(planned.revisions.name, "event_revisions");
    }

    #[test]
    fn test_boolean_default_is_false() {
        let schema = ResourceSchema::from_shorthand("posts", &["draft:boolean"]).unwrap();
        let planned = EntitySynthesizer::plan(&schema);
        assert_eq!(
            planned.main.column("draft").unwrap().default,
            Some(FieldValue::Bool(false))
        );
    }

    #[test]
    fn test_translatable_fields_move_to_translation_table() {
        let schema =
            ResourceSchema::from_shorthand("posts", &["title:string:translatable", "slugline"])
                .unwrap();
        let planned = EntitySynthesizer::plan(&schema);

        assert!(planned.main.column("title").is_none());
        let title = planned.translations.column("title").unwrap();
        assert_eq!(title.column_type, ColumnType::String);
        assert!(!title.nullable);
    }

    #[tokio::test]
    async fn test_materialize_is_idempotent() {
        let store = MemorySchemaStore::new();
        let schema = events();

        let first = EntitySynthesizer::materialize(&store, &schema).await.unwrap();
        assert!(first.created());

        let second = EntitySynthesizer::materialize(&store, &schema).await.unwrap();
        assert!(!second.created());
        assert_eq!(
            store.table_names(),
            vec!["event_revisions", "event_slugs", "event_translations", "events"]
        );
    }

    #[tokio::test]
    async fn test_rollback_drops_in_reverse_dependency_order() {
        let mut store = MockSchemaStore::new();
        let mut seq = Sequence::new();
        for name in ["event_revisions", "event_translations", "event_slugs", "events"] {
            store
                .expect_drop_table()
                .withf(move |table: &str| table == name)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }

        EntitySynthesizer::rollback(&store, &events()).await.unwrap();
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported_not_compensated() {
        let mut store = MockSchemaStore::new();
        store.expect_has_table().returning(|_| Ok(false));
        store
            .expect_create_table()
            .withf(|table: &TableDefinition| table.name == "events")
            .returning(|_| Ok(()));
        store
            .expect_create_table()
            .withf(|table: &TableDefinition| table.name == "event_translations")
            .returning(|_| Err(ActonCmsError::Config("disk full".into())));
        store.expect_drop_table().never();

        let err = EntitySynthesizer::materialize(&store, &events())
            .await
            .unwrap_err();
        match err {
            ActonCmsError::PartialMaterialization { table, created, .. } => {
                assert_eq!(table, "event_translations");
                assert_eq!(created, vec!["events"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_first_table_failure_is_passed_through() {
        let mut store = MockSchemaStore::new();
        store.expect_has_table().returning(|_| Ok(false));
        store
            .expect_create_table()
            .returning(|_| Err(ActonCmsError::Config("read only".into())));

        let err = EntitySynthesizer::materialize(&store, &events())
            .await
            .unwrap_err();
        assert!(matches!(err, ActonCmsError::Config(_)));
    }

    proptest! {
        #[test]
        fn prop_column_counts_follow_translatable_split(flags in proptest::collection::vec(any::<bool>(), 0..12)) {
            let fields: Vec<(String, FieldOptions)> = flags
                .iter()
                .enumerate()
                .map(|(i, translatable)| {
                    let options = if *translatable { FieldOptions::new().translatable() } else { FieldOptions::new() };
                    (format!("field_{i}"), options)
                })
                .collect();
            let schema = ResourceSchema::new("items", fields).unwrap();
            let planned = EntitySynthesizer::plan(&schema);

            let translated = flags.iter().filter(|t| **t).count();
            prop_assert_eq!(planned.main.schema_columns().count(), flags.len() - translated);
            prop_assert_eq!(planned.translations.schema_columns().count(), translated);
            prop_assert_eq!(planned.main.framework_columns().count(), 6);
            prop_assert_eq!(planned.translations.framework_columns().count(), 7);
        }
    }
}
