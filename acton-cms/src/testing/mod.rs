//! Test server utilities using axum-test
//!
//! Wraps `axum_test::TestServer` and, for admin routes, injects an
//! [`AdminSession`] the way a host application's login layer would.

use crate::middleware::AdminSession;
use axum::{
    extract::Request,
    middleware::{self, Next},
    Router,
};

/// Test server wrapper for router tests
pub struct TestServer {
    inner: axum_test::TestServer,
}

impl TestServer {
    /// Serve a router as is
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be started
    pub fn new(app: Router) -> anyhow::Result<Self> {
        let inner = axum_test::TestServer::new(app)?;
        Ok(Self { inner })
    }

    /// Serve a router with every request carrying `session`
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be started
    pub fn authenticated(app: Router, session: AdminSession) -> anyhow::Result<Self> {
        let app = app.layer(middleware::from_fn(move |mut req: Request, next: Next| {
            req.extensions_mut().insert(session.clone());
            next.run(req)
        }));
        Self::new(app)
    }

    /// GET request
    pub fn get(&self, path: &str) -> axum_test::TestRequest {
        self.inner.get(path)
    }

    /// POST request
    pub fn post(&self, path: &str) -> axum_test::TestRequest {
        self.inner.post(path)
    }

    /// PUT request
    pub fn put(&self, path: &str) -> axum_test::TestRequest {
        self.inner.put(path)
    }

    /// DELETE request
    pub fn delete(&self, path: &str) -> axum_test::TestRequest {
        self.inner.delete(path)
    }
}
