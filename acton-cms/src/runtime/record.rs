//! Stored records and their revisions

use super::block::Block;
use super::translation::Translations;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{json, Map, Value};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One module item
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Primary key
    pub id: u64,
    /// Main-table attributes, already cast
    pub attributes: Map<String, Value>,
    /// Per-locale attributes
    pub translations: Translations,
    /// Content blocks
    pub blocks: Vec<Block>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Publish flag
    pub published: bool,
    /// Feature flag
    pub featured: bool,
    /// Manual sort position
    pub position: Option<u32>,
    /// Creation time (UTC)
    pub created_at: NaiveDateTime,
    /// Last update (UTC)
    pub updated_at: NaiveDateTime,
    /// Soft-delete marker
    pub deleted_at: Option<NaiveDateTime>,
}

impl Record {
    /// Whether the record is in the trash
    #[must_use]
    pub const fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// JSON view of the record
    ///
    /// Attributes are flattened to the top level. Translated attributes in
    /// `locale` are flattened too, and the full set is kept under
    /// `translations`.
    #[must_use]
    pub fn to_json(&self, locale: &str) -> Value {
        let mut object = Map::new();
        object.insert("id".into(), json!(self.id));
        for (key, value) in &self.attributes {
            object.insert(key.clone(), value.clone());
        }
        if let Some(translation) = self.translations.get(locale) {
            for (key, value) in &translation.values {
                object.insert(key.clone(), value.clone());
            }
        }
        object.insert("published".into(), json!(self.published));
        object.insert("featured".into(), json!(self.featured));
        object.insert("position".into(), json!(self.position));
        object.insert("tags".into(), json!(self.tags));
        object.insert("blocks".into(), json!(self.blocks));
        object.insert("translations".into(), json!(self.translations));
        object.insert("created_at".into(), json!(format_ts(self.created_at)));
        object.insert("updated_at".into(), json!(format_ts(self.updated_at)));
        object.insert(
            "deleted_at".into(),
            json!(self.deleted_at.map(format_ts)),
        );
        Value::Object(object)
    }
}

/// Snapshot taken on every store and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Revision {
    /// Revision key
    pub id: u64,
    /// Record the snapshot belongs to
    pub record_id: u64,
    /// Admin user who saved, if known
    pub user_id: Option<String>,
    /// When the snapshot was taken
    #[serde(serialize_with = "serialize_ts")]
    pub created_at: NaiveDateTime,
    /// The record as saved
    #[serde(skip)]
    pub snapshot: Record,
}

impl Revision {
    /// JSON payload as stored in the revisions table
    #[must_use]
    pub fn payload(&self, locale: &str) -> Value {
        self.snapshot.to_json(locale)
    }
}

fn format_ts(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn serialize_ts<S: serde::Serializer>(
    ts: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_ts(*ts))
}
