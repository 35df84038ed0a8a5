//! Materializing module tables against an in-memory SQLite database

use acton_cms::prelude::*;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;

async fn store() -> SqliteSchemaStore {
    // One connection: every in-memory connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqliteSchemaStore::new(pool)
}

fn events() -> ResourceSchema {
    ResourceSchema::from_json(
        "events",
        &json!({
            "title": {"translatable": true},
            "startsAt": {"type": "dateTime"},
            "isFeatured": {"type": "boolean", "default": true},
        }),
    )
    .unwrap()
}

async fn columns(store: &SqliteSchemaStore, table: &str) -> Vec<String> {
    sqlx::query_scalar("SELECT name FROM pragma_table_info(?) ORDER BY cid")
        .bind(table)
        .fetch_all(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_materialize_creates_four_tables() {
    let store = store().await;
    let schema = events();

    let outcome = EntitySynthesizer::materialize(&store, &schema).await.unwrap();
    assert!(outcome.created());

    for table in ["events", "event_translations", "event_slugs", "event_revisions"] {
        assert!(store.has_table(table).await.unwrap(), "{table} missing");
    }

    let main = columns(&store, "events").await;
    assert!(main.contains(&"startsAt".to_string()));
    assert!(main.contains(&"isFeatured".to_string()));
    assert!(!main.contains(&"title".to_string()));

    let translations = columns(&store, "event_translations").await;
    assert!(translations.contains(&"title".to_string()));
    assert!(translations.contains(&"event_id".to_string()));
}

#[tokio::test]
async fn test_materialize_is_idempotent() {
    let store = store().await;
    let schema = events();

    EntitySynthesizer::materialize(&store, &schema).await.unwrap();
    let second = EntitySynthesizer::materialize(&store, &schema).await.unwrap();
    assert!(!second.created());
}

#[tokio::test]
async fn test_column_defaults_apply_on_insert() {
    let store = store().await;
    EntitySynthesizer::materialize(&store, &events()).await.unwrap();

    sqlx::query("INSERT INTO events (\"startsAt\") VALUES (NULL)")
        .execute(store.pool())
        .await
        .unwrap();
    let (featured, published): (bool, bool) =
        sqlx::query_as("SELECT \"isFeatured\", published FROM events")
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert!(featured);
    assert!(!published);
}

#[tokio::test]
async fn test_rollback_drops_everything() {
    let store = store().await;
    let schema = events();
    EntitySynthesizer::materialize(&store, &schema).await.unwrap();

    EntitySynthesizer::rollback(&store, &schema).await.unwrap();
    for table in ["events", "event_translations", "event_slugs", "event_revisions"] {
        assert!(!store.has_table(table).await.unwrap(), "{table} still present");
    }

    // Rolling back twice is harmless
    EntitySynthesizer::rollback(&store, &schema).await.unwrap();
    assert!(EntitySynthesizer::materialize(&store, &schema)
        .await
        .unwrap()
        .created());
}
