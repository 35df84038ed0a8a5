//! Generic module runtime
//!
//! One set of types serves every module: a [`Model`] fills attributes as
//! its descriptor says, a [`Repository`] stores records, and a
//! [`ModuleController`] answers the admin operations.

pub mod block;
pub mod controller;
pub mod model;
pub mod record;
pub mod repository;
pub mod translation;

pub use block::{Block, BlockHandler};
pub use controller::{IndexOptions, ModuleController, OperationRequest, OperationResponse};
pub use model::Model;
pub use record::{Record, Revision};
pub use repository::{Repository, Scope};
pub use translation::{Translation, TranslationHandler, Translations};

use crate::error::{ActonCmsError, Result};
use serde_json::Value;

/// Split a list given as a JSON array or a comma-separated string
///
/// Blank entries are dropped and surrounding whitespace trimmed.
pub(crate) fn list_values(value: &Value) -> Result<Vec<String>> {
    let items: Vec<String> = match value {
        Value::Null => Vec::new(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(ActonCmsError::BadRequest(format!("Unexpected list item {other}"))),
            })
            .collect::<Result<_>>()?,
        other => {
            return Err(ActonCmsError::BadRequest(format!(
                "Expected a list, got {other}"
            )))
        }
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}
