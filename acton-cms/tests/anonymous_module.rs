//! Integration tests for booting anonymous modules
//!
//! Boots an `events` module and drives it through the HTTP router.

use acton_cms::prelude::*;
use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::{self, Next},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

async fn boot_events(state: &CmsState, store: &MemorySchemaStore) -> BootedModule {
    AnonymousModule::make("events")
        .with_fields([
            ("title", FieldOptions::new().translatable()),
            ("startsAt", FieldOptions::new().of_type("dateTime")),
            (
                "isFeatured",
                FieldOptions::new().of_type("boolean").default_value(true),
            ),
        ])
        .with_setup_methods(["enableReorder", "enableDuplicate"])
        .boot(state, store)
        .await
        .unwrap()
}

fn logged_in(app: Router) -> axum_test::TestServer {
    let app = app.layer(middleware::from_fn(|mut req: Request, next: Next| {
        req.extensions_mut()
            .insert(AdminSession::new("42", "twill_users"));
        next.run(req)
    }));
    axum_test::TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_events_tables() {
    let state = CmsState::new();
    let store = MemorySchemaStore::new();
    boot_events(&state, &store).await;

    assert_eq!(
        store.table_names(),
        vec!["event_revisions", "event_slugs", "event_translations", "events"]
    );

    let events = store.table("events").unwrap();
    let schema_columns: Vec<&str> = events.schema_columns().map(|c| c.name.as_str()).collect();
    assert_eq!(schema_columns, vec!["startsAt", "isFeatured"]);

    let translations = store.table("event_translations").unwrap();
    let translated: Vec<&str> = translations
        .schema_columns()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(translated, vec!["title"]);
}

#[tokio::test]
async fn test_default_events_module_has_no_translated_columns() {
    let state = CmsState::new();
    let store = MemorySchemaStore::new();
    AnonymousModule::make("events")
        .with_fields([
            ("title", FieldOptions::new()),
            ("startsAt", FieldOptions::new().of_type("dateTime")),
        ])
        .boot(&state, &store)
        .await
        .unwrap();

    assert_eq!(
        store.table("event_translations").unwrap().schema_columns().count(),
        0
    );
}

#[tokio::test]
async fn test_route_names_and_paths() {
    let state = CmsState::new();
    let store = MemorySchemaStore::new();
    boot_events(&state, &store).await;

    let routes = state.routes();
    assert_eq!(routes.len(), 21);

    let index = routes.route("twill.events.index").unwrap();
    assert_eq!(index.path, "/admin/events/");
    assert_eq!(index.operation, Operation::Index);

    let publish = routes.route("twill.events.publish").unwrap();
    assert_eq!(publish.path, "/admin/events/publish");
    assert_eq!(publish.verb.to_string(), "PUT");
    assert_eq!(publish.middleware, vec!["web", "twill_auth:twill_users"]);

    let navigation = state.navigation().get("events").unwrap();
    assert_eq!(navigation.title, "Events");
    assert!(navigation.module);
}

#[tokio::test]
async fn test_crud_flow_over_http() {
    let state = CmsState::new();
    let store = MemorySchemaStore::new();
    let module = boot_events(&state, &store).await;
    let server = logged_in(state.router());

    let stored = server
        .post("/admin/events/store")
        .json(&json!({"title": "Launch", "startsAt": "2025-03-01 18:00:00"}))
        .await;
    stored.assert_status(StatusCode::CREATED);
    let stored: Value = stored.json();
    assert_eq!(stored["item"]["title"], "Launch");
    assert_eq!(stored["item"]["isFeatured"], true);
    assert_eq!(stored["redirect"], "/admin/events/1/edit");

    let edit: Value = server.get("/admin/events/1/edit").await.json();
    assert_eq!(edit["item"]["startsAt"], "2025-03-01 18:00:00");
    assert_eq!(edit["revisions"][0]["user_id"], "42");

    let updated: Value = server
        .put("/admin/events/1")
        .json(&json!({"title": "Launch party"}))
        .await
        .json();
    assert_eq!(updated["item"]["title"], "Launch party");

    server
        .put("/admin/events/publish")
        .json(&json!({"id": 1, "active": false}))
        .await
        .assert_status_ok();
    assert!(module.repository.find(1).unwrap().published);

    let browser: Value = server.get("/admin/events/browser").await.json();
    assert_eq!(browser["data"][0]["name"], "Launch party");

    server.delete("/admin/events/1").await.assert_status_ok();
    let index: Value = server.get("/admin/events/").await.json();
    assert_eq!(index["items"].as_array().unwrap().len(), 0);
    assert_eq!(index["options"]["reorder"], true);

    let trash: Value = server.get("/admin/events/").add_query_param("status", "trash").await.json();
    assert_eq!(trash["items"][0]["id"], 1);

    server
        .put("/admin/events/restore")
        .json(&json!({"id": 1}))
        .await
        .assert_status_ok();
    let index: Value = server.get("/admin/events/").await.json();
    assert_eq!(index["items"].as_array().unwrap().len(), 1);

    let revision: Value = server
        .get("/admin/events/restoreRevision/1")
        .add_query_param("revisionId", "1")
        .await
        .json();
    assert_eq!(revision["item"]["title"], "Launch");
}

#[tokio::test]
async fn test_catalog_operations_over_http() {
    let state = CmsState::new();
    let store = MemorySchemaStore::new();
    let module = boot_events(&state, &store).await;
    let server = logged_in(state.router());

    for title in ["One", "Two", "Three"] {
        server
            .post("/admin/events/store")
            .json(&json!({"title": title, "tags": ["music", "live"]}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    server
        .post("/admin/events/reorder")
        .json(&json!({"ids": [3, 1, 2]}))
        .await
        .assert_status_ok();
    let index: Value = server.get("/admin/events/").await.json();
    let order: Vec<u64> = index["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_u64().unwrap())
        .collect();
    assert_eq!(order, vec![3, 1, 2]);

    server
        .post("/admin/events/bulkPublish")
        .json(&json!({"ids": "1,2", "publish": true}))
        .await
        .assert_status_ok();
    server
        .post("/admin/events/bulkFeature")
        .json(&json!({"ids": [2], "feature": true}))
        .await
        .assert_status_ok();
    assert!(module.repository.find(2).unwrap().featured);

    let tags: Value = server
        .get("/admin/events/tags")
        .add_query_param("q", "mus")
        .await
        .json();
    assert_eq!(tags["items"], json!([{"id": "music", "text": "music"}]));

    let preview: Value = server
        .put("/admin/events/preview/1")
        .json(&json!({"title": "Preview only"}))
        .await
        .json();
    assert_eq!(preview["item"]["title"], "Preview only");
    let edit: Value = server.get("/admin/events/1/edit").await.json();
    assert_eq!(edit["item"]["title"], "One");

    let duplicate = server.put("/admin/events/duplicate/1").await;
    duplicate.assert_status(StatusCode::CREATED);
    let duplicate: Value = duplicate.json();
    assert_eq!(duplicate["item"]["id"], 4);
    assert_eq!(duplicate["item"]["published"], false);
    assert_eq!(duplicate["item"]["title"], "One");

    server
        .post("/admin/events/bulkDelete")
        .json(&json!({"ids": [1, 4]}))
        .await
        .assert_status_ok();
    server
        .post("/admin/events/bulkForceDelete")
        .json(&json!({"ids": [4]}))
        .await
        .assert_status_ok();
    server
        .post("/admin/events/bulkRestore")
        .json(&json!({"ids": [1]}))
        .await
        .assert_status_ok();
    server
        .put("/admin/events/forceDelete")
        .json(&json!({"id": 2}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let counts: Value = server.get("/admin/events/").await.json();
    assert_eq!(counts["counts"]["all"], 3);
    assert_eq!(counts["counts"]["trash"], 0);
}

#[tokio::test]
async fn test_bad_input_is_rejected_as_json() {
    let state = CmsState::new();
    let store = MemorySchemaStore::new();
    boot_events(&state, &store).await;
    let server = logged_in(state.router());

    let response = server
        .post("/admin/events/store")
        .json(&json!({"startsAt": "whenever"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("whenever"));

    server
        .get("/admin/events/abc/edit")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unauthenticated_requests_are_rejected() {
    let state = CmsState::new();
    let store = MemorySchemaStore::new();
    boot_events(&state, &store).await;

    let htmx = Request::builder()
        .uri("/admin/events/")
        .header("HX-Request", "true")
        .body(Body::empty())
        .unwrap();
    let response = state.router().oneshot(htmx).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["HX-Redirect"], "/admin/login");

    let browser = Request::builder()
        .method("PUT")
        .uri("/admin/events/publish")
        .body(Body::empty())
        .unwrap();
    let response = state.router().oneshot(browser).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/login");
}

#[tokio::test]
async fn test_custom_admin_prefix() {
    let mut config = ActonCmsConfig::default();
    config.admin.app_path = "backoffice".into();
    config.admin.route_name_prefix = "cms".into();
    let state = CmsState::with_config(config);
    let store = MemorySchemaStore::new();
    boot_events(&state, &store).await;

    let index = state.routes().route("cms.events.index").unwrap();
    assert_eq!(index.path, "/backoffice/events/");

    let server = logged_in(state.router());
    server.get("/backoffice/events/").await.assert_status_ok();
}
