//! Admin authentication guard
//!
//! Every module route sits behind this middleware. The host application's
//! login flow is responsible for putting an [`AdminSession`] into the
//! request extensions; the guard only checks that one is there and that it
//! was issued by the configured guard.
//!
//! ```rust,no_run
//! use acton_cms::middleware::{AdminAuth, AdminSession};
//! use axum::{extract::Request, middleware::{self, Next}, routing::get, Router};
//!
//! # async fn example() {
//! let guard = AdminAuth::new("twill_users", "/admin/login");
//! let app: Router = Router::new()
//!     .route("/admin/events/", get(|| async { "ok" }))
//!     .layer(middleware::from_fn(move |req: Request, next: Next| {
//!         guard.clone().handle(req, next)
//!     }));
//! # }
//! ```

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

/// Authenticated admin user, placed in request extensions upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    /// Admin user id
    pub user_id: String,
    /// Guard that authenticated the user (`twill_users`)
    pub guard: String,
}

impl AdminSession {
    /// Session for a user under a guard
    #[must_use]
    pub fn new(user_id: impl Into<String>, guard: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            guard: guard.into(),
        }
    }
}

/// Middleware rejecting requests without a matching [`AdminSession`]
///
/// HTMX requests get a 401 with an `HX-Redirect` header; other requests
/// are redirected to the login page.
#[derive(Clone, Debug)]
pub struct AdminAuth {
    guard: String,
    login_path: String,
}

impl AdminAuth {
    /// Guard name and where to send unauthenticated users
    #[must_use]
    pub fn new(guard: impl Into<String>, login_path: impl Into<String>) -> Self {
        Self {
            guard: guard.into(),
            login_path: login_path.into(),
        }
    }

    /// Middleware name as recorded on routes (`twill_auth:twill_users`)
    #[must_use]
    pub fn name(&self) -> String {
        format!("twill_auth:{}", self.guard)
    }

    /// Run the guard
    ///
    /// # Errors
    ///
    /// Returns [`AdminAuthError`] when no session for this guard is present.
    pub async fn handle(self, request: Request, next: Next) -> Result<Response, AdminAuthError> {
        let authenticated = request
            .extensions()
            .get::<AdminSession>()
            .is_some_and(|session| session.guard == self.guard);

        if !authenticated {
            let is_htmx = request
                .headers()
                .get("HX-Request")
                .and_then(|v| v.to_str().ok())
                == Some("true");
            tracing::debug!(path = %request.uri().path(), guard = %self.guard, "Unauthenticated admin request");

            if is_htmx {
                return Err(AdminAuthError::Unauthorized(self.login_path));
            }
            return Err(AdminAuthError::RedirectToLogin(self.login_path));
        }

        Ok(next.run(request).await)
    }
}

/// Rejection produced by [`AdminAuth`]
#[derive(Debug)]
pub enum AdminAuthError {
    /// HTMX request; carries the login path
    Unauthorized(String),
    /// Browser request; carries the login path
    RedirectToLogin(String),
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized(login_path) => (
                StatusCode::UNAUTHORIZED,
                [("HX-Redirect", login_path.as_str())],
                "Unauthorized",
            )
                .into_response(),
            Self::RedirectToLogin(login_path) => Redirect::to(&login_path).into_response(),
        }
    }
}
