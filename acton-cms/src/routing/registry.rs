//! Route registry and axum router assembly
//!
//! Routes are keyed by name. Registering a name twice replaces the earlier
//! route; the replacement is logged at `debug` and otherwise silent.

use super::catalog::{Operation, RouteDefinition, RouteTable, Verb};
use crate::config::AdminSettings;
use crate::error::Result;
use crate::middleware::{AdminAuth, AdminSession};
use crate::runtime::{ModuleController, OperationRequest, OperationResponse};
use axum::{
    body::Bytes,
    extract::{Path, Query, Request},
    middleware::{self, Next},
    routing::MethodRouter,
    Extension, Router,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
struct RegisteredRoute {
    definition: RouteDefinition,
    controller: Arc<ModuleController>,
    sequence: u64,
}

#[derive(Debug, Default)]
struct Routes {
    by_name: BTreeMap<String, RegisteredRoute>,
    module_prefixes: BTreeMap<String, String>,
    sequence: u64,
}

/// All module routes of an application
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: RwLock<Routes>,
}

impl RouteRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module's routes against its controller
    pub fn register(&self, table: &RouteTable, controller: &Arc<ModuleController>) {
        let mut routes = self.routes.write();
        routes
            .module_prefixes
            .insert(table.module.clone(), table.name_prefix.clone());

        for definition in &table.routes {
            routes.sequence += 1;
            let registered = RegisteredRoute {
                definition: definition.clone(),
                controller: Arc::clone(controller),
                sequence: routes.sequence,
            };
            if routes
                .by_name
                .insert(definition.name.clone(), registered)
                .is_some()
            {
                tracing::debug!(route = %definition.name, "Route name re-registered, last registration wins");
            }
        }
        tracing::info!(
            module = %table.module,
            routes = table.routes.len(),
            base_path = %table.base_path,
            "Registered module routes"
        );
    }

    /// Route by name
    #[must_use]
    pub fn route(&self, name: &str) -> Option<RouteDefinition> {
        self.routes
            .read()
            .by_name
            .get(name)
            .map(|r| r.definition.clone())
    }

    /// Concrete path for a named route
    #[must_use]
    pub fn url(&self, name: &str, id: Option<&str>) -> Option<String> {
        self.route(name).map(|r| r.url(id))
    }

    /// Every registered route, sorted by name
    #[must_use]
    pub fn definitions(&self) -> Vec<RouteDefinition> {
        self.routes
            .read()
            .by_name
            .values()
            .map(|r| r.definition.clone())
            .collect()
    }

    /// Route-name prefix recorded for a module
    #[must_use]
    pub fn module_prefix(&self, module: &str) -> Option<String> {
        self.routes.read().module_prefixes.get(module).cloned()
    }

    /// Number of registered route names
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.read().by_name.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build an axum router over the registered routes
    ///
    /// Every route sits behind the admin guard and a trace layer. When two
    /// names share a path and verb, the later registration serves it.
    #[must_use]
    pub fn router(&self, admin: &AdminSettings) -> Router {
        let mut by_path: BTreeMap<String, HashMap<Verb, RegisteredRoute>> = BTreeMap::new();
        for route in self.routes.read().by_name.values() {
            let verbs = by_path.entry(route.definition.path.clone()).or_default();
            let newer = verbs
                .get(&route.definition.verb)
                .is_none_or(|existing| existing.sequence < route.sequence);
            if newer {
                verbs.insert(route.definition.verb, route.clone());
            }
        }

        let mut router = Router::new();
        for (path, verbs) in by_path {
            let mut method_router: MethodRouter = MethodRouter::new();
            for (verb, route) in verbs {
                method_router = attach(method_router, verb, route.definition.operation, route.controller);
            }
            router = router.route(&path, method_router);
        }

        let guard = AdminAuth::new(&admin.auth_guard, &admin.login_path);
        router
            .layer(middleware::from_fn(move |req: Request, next: Next| {
                guard.clone().handle(req, next)
            }))
            .layer(TraceLayer::new_for_http())
    }
}

fn attach(
    method_router: MethodRouter,
    verb: Verb,
    operation: Operation,
    controller: Arc<ModuleController>,
) -> MethodRouter {
    if operation.takes_id() {
        method_router.on(
            verb.filter(),
            move |Path(id): Path<String>,
                  Query(query): Query<HashMap<String, String>>,
                  Extension(session): Extension<AdminSession>,
                  body: Bytes| {
                let controller = Arc::clone(&controller);
                async move { dispatch(&controller, operation, Some(id), query, &session, &body) }
            },
        )
    } else {
        method_router.on(
            verb.filter(),
            move |Query(query): Query<HashMap<String, String>>,
                  Extension(session): Extension<AdminSession>,
                  body: Bytes| {
                let controller = Arc::clone(&controller);
                async move { dispatch(&controller, operation, None, query, &session, &body) }
            },
        )
    }
}

fn dispatch(
    controller: &ModuleController,
    operation: Operation,
    id: Option<String>,
    query: HashMap<String, String>,
    session: &AdminSession,
    body: &[u8],
) -> Result<OperationResponse> {
    let request = OperationRequest {
        id,
        query,
        body: OperationRequest::parse_body(body)?,
        user_id: Some(session.user_id.clone()),
    };
    controller.handle(operation, &request)
}
