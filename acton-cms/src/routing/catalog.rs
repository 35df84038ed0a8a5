//! Route catalog: the operations a module exposes and where they live
//!
//! Every module gets six CRUD routes and, by default, all fifteen catalog
//! routes. [`RouteOptions`] narrows the catalog; CRUD routes are always
//! present.
//!
//! | operation         | verb   | path                              |
//! |-------------------|--------|-----------------------------------|
//! | `index`           | GET    | `/{admin}/{slug}/`                |
//! | `edit`            | GET    | `/{admin}/{slug}/{singular}/edit` |
//! | `create`          | POST   | `/{admin}/{slug}/create`          |
//! | `store`           | POST   | `/{admin}/{slug}/store`           |
//! | `destroy`         | DELETE | `/{admin}/{slug}/{singular}`      |
//! | `update`          | PUT    | `/{admin}/{slug}/{singular}`      |
//! | `browser`, `tags` | GET    | `/{admin}/{slug}/{op}`            |
//! | `restoreRevision` | GET    | `/{admin}/{slug}/{op}/{id}`       |
//! | `duplicate`, `preview` | PUT | `/{admin}/{slug}/{op}/{id}`     |
//! | `publish`, `feature`, `restore`, `forceDelete` | PUT | `/{admin}/{slug}/{op}` |
//! | `reorder`, `bulk*` | POST  | `/{admin}/{slug}/{op}`            |

use crate::config::AdminSettings;
use crate::schema::{Naming, ResourceSchema};
use axum::routing::MethodFilter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP verb of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Verb {
    /// axum method filter
    #[must_use]
    pub const fn filter(self) -> MethodFilter {
        match self {
            Self::Get => MethodFilter::GET,
            Self::Post => MethodFilter::POST,
            Self::Put => MethodFilter::PUT,
            Self::Delete => MethodFilter::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// An admin operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// List records
    Index,
    /// Edit form for one record
    Edit,
    /// Create form
    Create,
    /// Persist a new record
    Store,
    /// Move a record to the trash
    Destroy,
    /// Persist changes to a record
    Update,
    /// Set positions
    Reorder,
    /// Toggle the publish flag
    Publish,
    /// Set the publish flag on many records
    BulkPublish,
    /// Picker listing for other modules
    Browser,
    /// Toggle the feature flag
    Feature,
    /// Set the feature flag on many records
    BulkFeature,
    /// Tag suggestions
    Tags,
    /// Render unsaved changes
    Preview,
    /// Take a record out of the trash
    Restore,
    /// Take many records out of the trash
    BulkRestore,
    /// Permanently remove a trashed record
    ForceDelete,
    /// Permanently remove many trashed records
    BulkForceDelete,
    /// Move many records to the trash
    BulkDelete,
    /// A record as of a revision
    RestoreRevision,
    /// Copy a record
    Duplicate,
}

impl Operation {
    /// Routes every module has
    pub const CRUD: [Self; 6] = [
        Self::Index,
        Self::Edit,
        Self::Create,
        Self::Store,
        Self::Destroy,
        Self::Update,
    ];

    /// Routes `only` / `except` choose from
    pub const CATALOG: [Self; 15] = [
        Self::Reorder,
        Self::Publish,
        Self::BulkPublish,
        Self::Browser,
        Self::Feature,
        Self::BulkFeature,
        Self::Tags,
        Self::Preview,
        Self::Restore,
        Self::BulkRestore,
        Self::ForceDelete,
        Self::BulkForceDelete,
        Self::BulkDelete,
        Self::RestoreRevision,
        Self::Duplicate,
    ];

    /// Name used in route names and options
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Edit => "edit",
            Self::Create => "create",
            Self::Store => "store",
            Self::Destroy => "destroy",
            Self::Update => "update",
            Self::Reorder => "reorder",
            Self::Publish => "publish",
            Self::BulkPublish => "bulkPublish",
            Self::Browser => "browser",
            Self::Feature => "feature",
            Self::BulkFeature => "bulkFeature",
            Self::Tags => "tags",
            Self::Preview => "preview",
            Self::Restore => "restore",
            Self::BulkRestore => "bulkRestore",
            Self::ForceDelete => "forceDelete",
            Self::BulkForceDelete => "bulkForceDelete",
            Self::BulkDelete => "bulkDelete",
            Self::RestoreRevision => "restoreRevision",
            Self::Duplicate => "duplicate",
        }
    }

    /// Look an operation up by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::CRUD
            .into_iter()
            .chain(Self::CATALOG)
            .find(|op| op.name() == name)
    }

    /// HTTP verb
    #[must_use]
    pub const fn verb(self) -> Verb {
        match self {
            Self::Index | Self::Edit | Self::Browser | Self::Tags | Self::RestoreRevision => {
                Verb::Get
            }
            Self::Create
            | Self::Store
            | Self::Reorder
            | Self::BulkPublish
            | Self::BulkFeature
            | Self::BulkDelete
            | Self::BulkRestore
            | Self::BulkForceDelete => Verb::Post,
            Self::Update
            | Self::Publish
            | Self::Feature
            | Self::Restore
            | Self::ForceDelete
            | Self::Duplicate
            | Self::Preview => Verb::Put,
            Self::Destroy => Verb::Delete,
        }
    }

    /// Whether the path carries a record id
    #[must_use]
    pub const fn takes_id(self) -> bool {
        matches!(
            self,
            Self::Edit
                | Self::Destroy
                | Self::Update
                | Self::RestoreRevision
                | Self::Duplicate
                | Self::Preview
        )
    }

    /// Path below the module prefix, as an axum pattern
    #[must_use]
    pub fn path_suffix(self, singular: &str) -> String {
        match self {
            Self::Index => "/".to_string(),
            Self::Edit => format!("/{{{singular}}}/edit"),
            Self::Create | Self::Store => format!("/{}", self.name()),
            Self::Destroy | Self::Update => format!("/{{{singular}}}"),
            Self::RestoreRevision | Self::Duplicate | Self::Preview => {
                format!("/{}/{{id}}", self.name())
            }
            _ => format!("/{}", self.name()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Narrows the catalog routes a module registers
///
/// `only` takes precedence when both are set. Names that are not catalog
/// operations are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Keep just these catalog routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only: Option<Vec<String>>,
    /// Drop these catalog routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub except: Option<Vec<String>>,
}

impl RouteOptions {
    /// All catalog routes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the named catalog routes
    #[must_use]
    pub fn only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Drop the named catalog routes
    #[must_use]
    pub fn except<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Catalog operations selected, in catalog order
    #[must_use]
    pub fn catalog(&self) -> Vec<Operation> {
        let listed = |names: &[String], op: Operation| names.iter().any(|n| n == op.name());
        match (&self.only, &self.except) {
            (Some(only), _) => Operation::CATALOG
                .into_iter()
                .filter(|op| listed(only, *op))
                .collect(),
            (None, Some(except)) => Operation::CATALOG
                .into_iter()
                .filter(|op| !listed(except, *op))
                .collect(),
            (None, None) => Operation::CATALOG.to_vec(),
        }
    }
}

/// One bound route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    /// `twill.events.index`
    pub name: String,
    /// HTTP verb
    pub verb: Verb,
    /// axum path pattern
    pub path: String,
    /// Operation dispatched
    pub operation: Operation,
    /// Middleware names applied
    pub middleware: Vec<String>,
}

impl RouteDefinition {
    /// Concrete path with the record id substituted
    #[must_use]
    pub fn url(&self, id: Option<&str>) -> String {
        match (id, self.path.find('{')) {
            (Some(id), Some(start)) => {
                let end = self.path[start..]
                    .find('}')
                    .map_or(self.path.len(), |offset| start + offset + 1);
                format!("{}{id}{}", &self.path[..start], &self.path[end..])
            }
            _ => self.path.clone(),
        }
    }
}

/// The routes of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    /// Module name (`events`, `blog.posts`)
    pub module: String,
    /// Route-name prefix recorded for the module (`events`)
    pub name_prefix: String,
    /// Path below the admin prefix (`/admin/events`)
    pub base_path: String,
    /// Bound routes: CRUD first, then catalog
    pub routes: Vec<RouteDefinition>,
}

impl RouteTable {
    /// Bind a module's routes under the admin settings
    #[must_use]
    pub fn bind(schema: &ResourceSchema, admin: &AdminSettings, options: &RouteOptions) -> Self {
        let module = schema.name_plural();
        let singular = schema.name_singular();
        let base_path = format!("{}/{}", admin.path_prefix(), Naming::path_slug(module));
        let middleware = admin.middleware();

        let routes = Operation::CRUD
            .into_iter()
            .chain(options.catalog())
            .map(|operation| RouteDefinition {
                name: format!("{}.{module}.{}", admin.route_name_prefix, operation.name()),
                verb: operation.verb(),
                path: format!("{base_path}{}", operation.path_suffix(&singular)),
                operation,
                middleware: middleware.clone(),
            })
            .collect();

        Self {
            module: module.to_string(),
            name_prefix: module.to_string(),
            base_path,
            routes,
        }
    }

    /// Route by operation
    #[must_use]
    pub fn route(&self, operation: Operation) -> Option<&RouteDefinition> {
        self.routes.iter().find(|r| r.operation == operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> ResourceSchema {
        ResourceSchema::with_default_fields("events").unwrap()
    }

    #[test]
    fn test_full_route_table() {
        let table = RouteTable::bind(&events(), &AdminSettings::default(), &RouteOptions::new());
        assert_eq!(table.routes.len(), 21);

        let index = table.route(Operation::Index).unwrap();
        assert_eq!(index.name, "twill.events.index");
        assert_eq!(index.path, "/admin/events/");
        assert_eq!(index.verb, Verb::Get);
        assert_eq!(index.middleware, vec!["web", "twill_auth:twill_users"]);

        let publish = table.route(Operation::Publish).unwrap();
        assert_eq!(publish.name, "twill.events.publish");
        assert_eq!(publish.path, "/admin/events/publish");
        assert_eq!(publish.verb, Verb::Put);

        let edit = table.route(Operation::Edit).unwrap();
        assert_eq!(edit.path, "/admin/events/{event}/edit");
        assert_eq!(edit.url(Some("3")), "/admin/events/3/edit");

        let revision = table.route(Operation::RestoreRevision).unwrap();
        assert_eq!(revision.path, "/admin/events/restoreRevision/{id}");
        assert_eq!(revision.verb, Verb::Get);
    }

    #[test]
    fn test_verbs_match_catalog() {
        let posts: Vec<_> = Operation::CATALOG
            .into_iter()
            .filter(|op| op.verb() == Verb::Post)
            .map(Operation::name)
            .collect();
        assert_eq!(
            posts,
            vec![
                "reorder",
                "bulkPublish",
                "bulkFeature",
                "bulkRestore",
                "bulkForceDelete",
                "bulkDelete"
            ]
        );
    }

    #[test]
    fn test_only_narrows_catalog() {
        let options = RouteOptions::new().only(["publish", "browser", "nonsense"]);
        let table = RouteTable::bind(&events(), &AdminSettings::default(), &options);
        assert_eq!(table.routes.len(), 8);
        assert!(table.route(Operation::Publish).is_some());
        assert!(table.route(Operation::Reorder).is_none());
    }

    #[test]
    fn test_except_narrows_catalog_and_only_wins() {
        let except = RouteOptions::new().except(["duplicate", "preview"]);
        assert_eq!(except.catalog().len(), 13);

        let both = RouteOptions::new().only(["tags"]).except(["tags"]);
        assert_eq!(both.catalog(), vec![Operation::Tags]);
    }

    #[test]
    fn test_crud_routes_survive_empty_only() {
        let options = RouteOptions::new().only(Vec::<String>::new());
        let table = RouteTable::bind(&events(), &AdminSettings::default(), &options);
        assert_eq!(table.routes.len(), 6);
    }

    #[test]
    fn test_nested_module_paths() {
        let schema = ResourceSchema::with_default_fields("blog.posts").unwrap();
        let table = RouteTable::bind(&schema, &AdminSettings::default(), &RouteOptions::new());
        let index = table.route(Operation::Index).unwrap();
        assert_eq!(index.name, "twill.blog.posts.index");
        assert_eq!(index.path, "/admin/blog/posts/");
        assert_eq!(
            table.route(Operation::Update).unwrap().path,
            "/admin/blog/posts/{post}"
        );
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::CRUD.into_iter().chain(Operation::CATALOG) {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("explode"), None);
    }
}
