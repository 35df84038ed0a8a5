//! Middleware applied to module routes
//!
//! Module routes carry two middleware names, `web` and
//! `twill_auth:{guard}`. `web` is the `tower-http` trace layer; the auth
//! guard is [`AdminAuth`].

pub mod auth;

pub use auth::{AdminAuth, AdminAuthError, AdminSession};
