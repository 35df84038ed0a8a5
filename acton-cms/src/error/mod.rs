//! Error types and error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Framework error type
#[derive(Debug, Error)]
pub enum ActonCmsError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Resource schema rejected at registration
    #[error("Invalid schema for '{resource}': {reason}")]
    InvalidSchema {
        /// Plural resource name
        resource: String,
        /// Why the schema was rejected
        reason: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Table already present in the schema store
    #[error("Table already exists: {0}")]
    TableExists(String),

    /// A table failed to create after earlier tables of the same set succeeded
    #[error("Partial materialization: creating '{table}' failed after {created:?} were created: {source}")]
    PartialMaterialization {
        /// Table whose creation failed
        table: String,
        /// Tables created before the failure, in creation order
        created: Vec<String>,
        /// Underlying store error
        #[source]
        source: Box<ActonCmsError>,
    },

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not Found (404)
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ActonCmsError {
    pub(crate) fn invalid_schema(resource: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            resource: resource.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP status code this error maps to
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidSchema { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Config(_)
            | Self::Database(_)
            | Self::TableExists(_)
            | Self::PartialMaterialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ActonCmsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result alias used across the crate
pub type Result<T, E = ActonCmsError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ActonCmsError::NotFound("events/1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ActonCmsError::BadRequest("ids".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ActonCmsError::TableExists("events".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_partial_materialization_message() {
        let err = ActonCmsError::PartialMaterialization {
            table: "event_translations".into(),
            created: vec!["events".into()],
            source: Box::new(ActonCmsError::Config("disk full".into())),
        };
        let message = err.to_string();
        assert!(message.contains("event_translations"));
        assert!(message.contains("\"events\""));
    }
}
