//! Ordered content blocks

use crate::error::{ActonCmsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block kind (`text`, `image`, …)
    #[serde(rename = "type")]
    pub block_type: String,
    /// 0-based position within the record
    #[serde(default)]
    pub position: usize,
    /// Free-form content
    #[serde(default)]
    pub content: Value,
}

/// Reads the `blocks` key of request input
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockHandler;

impl BlockHandler {
    /// Blocks in input order, or `None` when the input has no `blocks` key
    ///
    /// # Errors
    ///
    /// Returns [`ActonCmsError::BadRequest`] when `blocks` is not an array of
    /// `{type, content}` objects.
    pub fn extract(input: &Map<String, Value>) -> Result<Option<Vec<Block>>> {
        let Some(raw) = input.get("blocks") else {
            return Ok(None);
        };
        let mut blocks: Vec<Block> = serde_json::from_value(raw.clone())
            .map_err(|e| ActonCmsError::BadRequest(format!("Invalid blocks: {e}")))?;
        for (position, block) in blocks.iter_mut().enumerate() {
            if block.block_type.trim().is_empty() {
                return Err(ActonCmsError::BadRequest(format!(
                    "Block {position} has no type"
                )));
            }
            block.position = position;
        }
        Ok(Some(blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blocks_are_renumbered_in_input_order() {
        let input = json!({"blocks": [
            {"type": "text", "content": {"body": "a"}, "position": 7},
            {"type": "image", "content": {"src": "b.png"}},
        ]});
        let blocks = BlockHandler::extract(input.as_object().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(blocks[0].position, 0);
        assert_eq!(blocks[1].position, 1);
        assert_eq!(blocks[1].block_type, "image");
    }

    #[test]
    fn test_missing_key_means_untouched() {
        assert!(BlockHandler::extract(&Map::new()).unwrap().is_none());
    }

    #[test]
    fn test_untyped_block_is_rejected() {
        let input = json!({"blocks": [{"type": "", "content": null}]});
        assert!(BlockHandler::extract(input.as_object().unwrap()).is_err());
    }
}
