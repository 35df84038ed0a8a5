//! Module controller: answers admin operations for one module
//!
//! The controller is built once per module at boot and shared by every
//! route handler of that module. Responses are JSON; the admin UI (or any
//! other client) renders them.

use super::record::Record;
use super::repository::{Repository, Scope};
use crate::descriptor::{ModuleDescriptors, TableColumns};
use crate::error::{ActonCmsError, Result};
use crate::routing::Operation;
use crate::schema::{FieldType, FieldValue};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Listing capabilities toggled by setup methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct IndexOptions {
    /// Drag-and-drop ordering
    pub reorder: bool,
    /// Single feature toggle
    pub feature: bool,
    /// Bulk feature
    pub bulk_feature: bool,
    /// Duplicate action
    pub duplicate: bool,
    /// Publish toggle
    pub publish: bool,
    /// Bulk publish
    pub bulk_publish: bool,
    /// Create button
    pub create: bool,
    /// Edit link
    pub edit: bool,
    /// Delete action
    pub delete: bool,
    /// Restore action
    pub restore: bool,
    /// Bulk restore
    pub bulk_restore: bool,
    /// Force delete action
    pub force_delete: bool,
    /// Bulk force delete
    pub bulk_force_delete: bool,
    /// Bulk delete
    pub bulk_delete: bool,
    /// Permalink display
    pub permalink: bool,
    /// Thumbnail column
    pub show_image: bool,
    /// Edit in a modal instead of a page
    pub edit_in_modal: bool,
    /// Go straight to the edit page after create
    pub skip_create_modal: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            reorder: false,
            feature: false,
            bulk_feature: false,
            duplicate: false,
            publish: true,
            bulk_publish: true,
            create: true,
            edit: true,
            delete: true,
            restore: true,
            bulk_restore: true,
            force_delete: true,
            bulk_force_delete: true,
            bulk_delete: true,
            permalink: true,
            show_image: false,
            edit_in_modal: false,
            skip_create_modal: false,
        }
    }
}

impl IndexOptions {
    /// Apply one setup method by name
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::Config`] for an unknown method.
    pub fn apply(&mut self, method: &str) -> Result<()> {
        let (flag, value) = match method {
            "enableReorder" => (&mut self.reorder, true),
            "enableFeature" => (&mut self.feature, true),
            "enableBulkFeature" => (&mut self.bulk_feature, true),
            "enableDuplicate" => (&mut self.duplicate, true),
            "disablePublish" => (&mut self.publish, false),
            "disableBulkPublish" => (&mut self.bulk_publish, false),
            "disableCreate" => (&mut self.create, false),
            "disableEdit" => (&mut self.edit, false),
            "disableDelete" => (&mut self.delete, false),
            "disableRestore" => (&mut self.restore, false),
            "disableBulkRestore" => (&mut self.bulk_restore, false),
            "disableForceDelete" => (&mut self.force_delete, false),
            "disableBulkForceDelete" => (&mut self.bulk_force_delete, false),
            "disableBulkDelete" => (&mut self.bulk_delete, false),
            "disablePermalink" => (&mut self.permalink, false),
            "enableShowImage" => (&mut self.show_image, true),
            "enableEditInModal" => (&mut self.edit_in_modal, true),
            "enableSkipCreateModal" => (&mut self.skip_create_modal, true),
            other => {
                return Err(ActonCmsError::Config(format!(
                    "Unknown controller setup method '{other}'"
                )))
            }
        };
        *flag = value;
        Ok(())
    }
}

/// Input of one operation
#[derive(Debug, Clone, Default)]
pub struct OperationRequest {
    /// Record id from the path
    pub id: Option<String>,
    /// Query string parameters
    pub query: HashMap<String, String>,
    /// JSON body (empty when none was sent)
    pub body: Map<String, Value>,
    /// Authenticated admin user
    pub user_id: Option<String>,
}

impl OperationRequest {
    /// Empty request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set a query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the JSON body; anything but an object is ignored
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        if let Value::Object(body) = body {
            self.body = body;
        }
        self
    }

    /// Set the acting user
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Parse a raw request body
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::BadRequest`] when the body is not a JSON object.
    pub fn parse_body(raw: &[u8]) -> Result<Map<String, Value>> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice(raw) {
            Ok(Value::Object(body)) => Ok(body),
            Ok(other) => Err(ActonCmsError::BadRequest(format!(
                "Expected a JSON object body, got {other}"
            ))),
            Err(e) => Err(ActonCmsError::BadRequest(format!("Invalid JSON body: {e}"))),
        }
    }

    fn path_id(&self) -> Result<u64> {
        let raw = self
            .id
            .as_deref()
            .ok_or_else(|| ActonCmsError::BadRequest("Missing record id".into()))?;
        parse_id(raw)
    }

    fn body_id(&self) -> Result<u64> {
        match self.body.get("id") {
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| ActonCmsError::BadRequest(format!("Invalid id {n}"))),
            Some(Value::String(s)) => parse_id(s),
            _ => Err(ActonCmsError::BadRequest("Missing 'id'".into())),
        }
    }

    fn body_ids(&self) -> Result<Vec<u64>> {
        let raw = self
            .body
            .get("ids")
            .ok_or_else(|| ActonCmsError::BadRequest("Missing 'ids'".into()))?;
        let mut ids: Vec<u64> = Vec::new();
        for item in super::list_values(raw)? {
            let id = parse_id(&item)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn body_flag(&self, key: &str) -> Result<bool> {
        match self.body.get(key) {
            None => Ok(false),
            Some(raw) => match FieldValue::cast(FieldType::Boolean, raw)? {
                FieldValue::Bool(flag) => Ok(flag),
                _ => Ok(false),
            },
        }
    }
}

fn parse_id(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ActonCmsError::BadRequest(format!("'{raw}' is not a record id")))
}

/// JSON answer with a status code
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResponse {
    /// HTTP status
    pub status: StatusCode,
    /// JSON body
    pub body: Value,
}

impl OperationResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    fn created(body: Value) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }

    fn message(message: impl Into<String>) -> Self {
        Self::ok(json!({ "message": message.into(), "variant": "success" }))
    }
}

impl IntoResponse for OperationResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Controller shared by all routes of a module
#[derive(Debug)]
pub struct ModuleController {
    descriptors: Arc<ModuleDescriptors>,
    repository: Arc<Repository>,
    options: IndexOptions,
    base_path: String,
    title_column: String,
}

impl ModuleController {
    /// Build a controller, applying its setup methods
    ///
    /// `base_path` is the module's path below the host (`/admin/events`);
    /// edit links are built from it.
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::Config`] when a setup method is unknown.
    pub fn new(
        descriptors: Arc<ModuleDescriptors>,
        repository: Arc<Repository>,
        base_path: impl Into<String>,
    ) -> Result<Self> {
        let mut options = IndexOptions::default();
        for method in &descriptors.controller.setup_methods {
            options.apply(method)?;
        }
        let title_column = descriptors
            .controller
            .additional_props
            .get("titleColumnKey")
            .and_then(Value::as_str)
            .unwrap_or("title")
            .to_string();

        Ok(Self {
            descriptors,
            repository,
            options,
            base_path: base_path.into(),
            title_column,
        })
    }

    /// Module name (`events`)
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.descriptors.controller.module_name
    }

    /// Listing options after setup methods
    #[must_use]
    pub const fn index_options(&self) -> &IndexOptions {
        &self.options
    }

    /// Descriptors the controller was built from
    #[must_use]
    pub fn descriptors(&self) -> &ModuleDescriptors {
        &self.descriptors
    }

    /// Repository the controller drives
    #[must_use]
    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    /// Index columns, custom or stock
    #[must_use]
    pub fn table_columns(&self) -> TableColumns {
        self.descriptors
            .controller
            .table_columns_for(&self.descriptors.model.attributes)
    }

    /// Edit page path for a record
    #[must_use]
    pub fn edit_path(&self, id: u64) -> String {
        format!("{}/{id}/edit", self.base_path)
    }

    /// Run one operation
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::BadRequest`] for malformed input,
    /// [`ActonCmsError::NotFound`] for unknown records.
    pub fn handle(&self, operation: Operation, request: &OperationRequest) -> Result<OperationResponse> {
        let repo = &self.repository;
        let model = &self.descriptors.model.type_name;
        let user = request.user_id.as_deref();
        tracing::debug!(module = self.module_name(), %operation, "Handling operation");

        let response = match operation {
            Operation::Index => self.index(request)?,
            Operation::Create => OperationResponse::ok(json!({
                "form": self.descriptors.controller.form_for(&self.descriptors.model.attributes),
                "defaults": repo.defaults(),
            })),
            Operation::Store => {
                let record = repo.create(&request.body, user)?;
                OperationResponse::created(self.item_with_redirect(&record))
            }
            Operation::Edit => {
                let record = repo.find(request.path_id()?)?;
                OperationResponse::ok(json!({
                    "item": self.item(&record),
                    "form": self.descriptors.controller.form_for(&self.descriptors.model.attributes),
                    "revisions": repo.revisions(record.id),
                }))
            }
            Operation::Update => {
                let record = repo.update(request.path_id()?, &request.body, user)?;
                OperationResponse::ok(json!({ "item": self.item(&record) }))
            }
            Operation::Destroy => {
                repo.delete(&[request.path_id()?])?;
                OperationResponse::message(format!("{model} moved to trash!"))
            }
            Operation::Publish => {
                let published = !request.body_flag("active")?;
                repo.publish(&[request.body_id()?], published)?;
                let verb = if published { "published" } else { "unpublished" };
                OperationResponse::message(format!("{model} {verb}!"))
            }
            Operation::BulkPublish => {
                let published = request.body_flag("publish")?;
                repo.publish(&request.body_ids()?, published)?;
                let verb = if published { "published" } else { "unpublished" };
                OperationResponse::message(format!("Items {verb}!"))
            }
            Operation::Feature => {
                let featured = !request.body_flag("active")?;
                repo.feature(&[request.body_id()?], featured)?;
                let verb = if featured { "featured" } else { "unfeatured" };
                OperationResponse::message(format!("{model} {verb}!"))
            }
            Operation::BulkFeature => {
                let featured = request.body_flag("feature")?;
                repo.feature(&request.body_ids()?, featured)?;
                let verb = if featured { "featured" } else { "unfeatured" };
                OperationResponse::message(format!("Items {verb}!"))
            }
            Operation::Reorder => {
                repo.reorder(&request.body_ids()?)?;
                OperationResponse::message(format!("{model} order has been saved!"))
            }
            Operation::Restore => {
                repo.restore(&[request.body_id()?])?;
                OperationResponse::message(format!("{model} restored!"))
            }
            Operation::BulkRestore => {
                repo.restore(&request.body_ids()?)?;
                OperationResponse::message("Items restored!")
            }
            Operation::ForceDelete => {
                repo.force_delete(&[request.body_id()?])?;
                OperationResponse::message(format!("{model} destroyed!"))
            }
            Operation::BulkForceDelete => {
                repo.force_delete(&request.body_ids()?)?;
                OperationResponse::message("Items destroyed!")
            }
            Operation::BulkDelete => {
                repo.delete(&request.body_ids()?)?;
                OperationResponse::message("Items moved to trash!")
            }
            Operation::Browser => OperationResponse::ok(json!({ "data": self.browser_items() })),
            Operation::Tags => {
                let items: Vec<Value> = repo
                    .tags(request.query.get("q").map(String::as_str))
                    .into_iter()
                    .map(|tag| json!({ "id": tag, "text": tag }))
                    .collect();
                OperationResponse::ok(json!({ "items": items }))
            }
            Operation::Preview => {
                let record = repo.preview(request.path_id()?, &request.body)?;
                OperationResponse::ok(json!({ "item": self.item(&record) }))
            }
            Operation::Duplicate => {
                let record = repo.duplicate(request.path_id()?, user)?;
                OperationResponse::created(self.item_with_redirect(&record))
            }
            Operation::RestoreRevision => {
                let id = request.path_id()?;
                let revision_id = request
                    .query
                    .get("revisionId")
                    .ok_or_else(|| ActonCmsError::BadRequest("Missing 'revisionId'".into()))
                    .and_then(|raw| parse_id(raw))?;
                let revision = repo.revision(id, revision_id)?;
                OperationResponse::ok(json!({
                    "item": revision.payload(repo.locale()),
                    "revision": revision,
                }))
            }
        };
        Ok(response)
    }

    fn index(&self, request: &OperationRequest) -> Result<OperationResponse> {
        let repo = &self.repository;
        let scope = match request.query.get("status").map(String::as_str) {
            None | Some("all") => Scope::All,
            Some("published") => Scope::Published,
            Some("draft") => Scope::Draft,
            Some("trash") => Scope::Trash,
            Some(other) => {
                return Err(ActonCmsError::BadRequest(format!("Unknown status '{other}'")))
            }
        };
        let items: Vec<Value> = repo.list(scope).iter().map(|r| self.item(r)).collect();

        Ok(OperationResponse::ok(json!({
            "module": self.module_name(),
            "items": items,
            "counts": {
                "all": repo.count(Scope::All),
                "published": repo.count(Scope::Published),
                "draft": repo.count(Scope::Draft),
                "trash": repo.count(Scope::Trash),
            },
            "options": self.options,
            "tableColumns": self.table_columns(),
        })))
    }

    fn browser_items(&self) -> Vec<Value> {
        let repo = &self.repository;
        repo.list(Scope::Published)
            .iter()
            .map(|record| {
                json!({
                    "id": record.id,
                    "name": self.title_of(record),
                    "edit": self.edit_path(record.id),
                })
            })
            .collect()
    }

    fn title_of(&self, record: &Record) -> Value {
        record
            .attributes
            .get(&self.title_column)
            .cloned()
            .or_else(|| {
                self.repository
                    .translated(record, &self.title_column, self.repository.locale())
            })
            .unwrap_or(Value::Null)
    }

    fn item(&self, record: &Record) -> Value {
        record.to_json(self.repository.locale())
    }

    fn item_with_redirect(&self, record: &Record) -> Value {
        json!({
            "item": self.item(record),
            "redirect": self.edit_path(record.id),
        })
    }
}
