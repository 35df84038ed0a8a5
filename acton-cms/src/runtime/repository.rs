//! In-memory module repository
//!
//! Holds the records of one module behind a single lock. Translation and
//! block handling are optional sub-components attached according to the
//! repository descriptor's capabilities.

use super::block::BlockHandler;
use super::model::Model;
use super::record::{Record, Revision};
use super::translation::{TranslationHandler, Translations};
use crate::config::LocaleSettings;
use crate::descriptor::{Capability, ModuleDescriptors, RepositoryDescriptor};
use crate::error::{ActonCmsError, Result};
use crate::schema::{FieldType, FieldValue};
use chrono::{NaiveDateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Which records a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Everything not in the trash
    #[default]
    All,
    /// Published, not trashed
    Published,
    /// Unpublished, not trashed
    Draft,
    /// Trashed only
    Trash,
}

impl Scope {
    fn includes(self, record: &Record) -> bool {
        match self {
            Self::All => !record.is_trashed(),
            Self::Published => !record.is_trashed() && record.published,
            Self::Draft => !record.is_trashed() && !record.published,
            Self::Trash => record.is_trashed(),
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    records: BTreeMap<u64, Record>,
    revisions: Vec<Revision>,
    next_id: u64,
    next_revision_id: u64,
}

impl Store {
    fn get(&self, id: u64) -> Result<&Record> {
        self.records
            .get(&id)
            .filter(|r| !r.is_trashed())
            .ok_or_else(|| ActonCmsError::NotFound(format!("Record {id}")))
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut Record> {
        self.records
            .get_mut(&id)
            .filter(|r| !r.is_trashed())
            .ok_or_else(|| ActonCmsError::NotFound(format!("Record {id}")))
    }

    fn trashed_mut(&mut self, id: u64) -> Result<&mut Record> {
        self.records
            .get_mut(&id)
            .filter(|r| r.is_trashed())
            .ok_or_else(|| ActonCmsError::NotFound(format!("Trashed record {id}")))
    }

    fn insert(&mut self, mut record: Record) -> u64 {
        self.next_id += 1;
        record.id = self.next_id;
        self.records.insert(record.id, record);
        self.next_id
    }

    fn snapshot(&mut self, record_id: u64, user_id: Option<&str>) {
        let Some(record) = self.records.get(&record_id) else {
            return;
        };
        self.next_revision_id += 1;
        let revision = Revision {
            id: self.next_revision_id,
            record_id,
            user_id: user_id.map(str::to_string),
            created_at: record.updated_at,
            snapshot: record.clone(),
        };
        self.revisions.push(revision);
    }
}

/// Records of one module
#[derive(Debug)]
pub struct Repository {
    descriptor: RepositoryDescriptor,
    model: Model,
    translations: Option<TranslationHandler>,
    blocks: Option<BlockHandler>,
    locales: LocaleSettings,
    store: RwLock<Store>,
}

impl Repository {
    /// Repository for a described module
    #[must_use]
    pub fn new(descriptors: &ModuleDescriptors, locales: LocaleSettings) -> Self {
        let capabilities = &descriptors.repository.capabilities;
        let translations = capabilities.contains(&Capability::Translations).then(|| {
            TranslationHandler::new(
                descriptors.model.translated_attributes.clone(),
                locales.clone(),
            )
        });
        let blocks = capabilities
            .contains(&Capability::Blocks)
            .then_some(BlockHandler);

        Self {
            descriptor: descriptors.repository.clone(),
            model: Model::new(Arc::new(descriptors.model.clone())),
            translations,
            blocks,
            locales,
            store: RwLock::new(Store::default()),
        }
    }

    /// Repository descriptor
    #[must_use]
    pub const fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    /// Model this repository persists
    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// Locale used for JSON views
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locales.fallback
    }

    /// Defaults a create form starts from
    #[must_use]
    pub fn defaults(&self) -> Map<String, Value> {
        self.model.defaults()
    }

    /// Records in a scope, ordered by position then id
    #[must_use]
    pub fn list(&self, scope: Scope) -> Vec<Record> {
        let store = self.store.read();
        let mut records: Vec<Record> = store
            .records
            .values()
            .filter(|r| scope.includes(r))
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.position.unwrap_or(u32::MAX), r.id));
        records
    }

    /// Number of records in a scope
    #[must_use]
    pub fn count(&self, scope: Scope) -> usize {
        self.store
            .read()
            .records
            .values()
            .filter(|r| scope.includes(r))
            .count()
    }

    /// A record that is not trashed
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] if absent or trashed.
    pub fn find(&self, id: u64) -> Result<Record> {
        self.store.read().get(id).cloned()
    }

    /// Create a record from input
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::BadRequest`] when input fails to cast or validate.
    pub fn create(&self, input: &Map<String, Value>, user_id: Option<&str>) -> Result<Record> {
        let now = now();
        let mut record = Record {
            id: 0,
            attributes: self.model.build(input)?,
            translations: Translations::new(),
            blocks: Vec::new(),
            tags: Vec::new(),
            published: false,
            featured: false,
            position: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.apply_relations(&mut record, input)?;

        let mut store = self.store.write();
        let id = store.insert(record);
        store.snapshot(id, user_id);
        tracing::debug!(model = %self.descriptor.model, id, "Record created");
        store.get(id).cloned()
    }

    /// Update a record from input
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] or [`ActonCmsError::BadRequest`].
    pub fn update(&self, id: u64, input: &Map<String, Value>, user_id: Option<&str>) -> Result<Record> {
        let mut store = self.store.write();
        let mut updated = store.get(id)?.clone();
        self.merge(&mut updated, input)?;
        updated.updated_at = now();
        *store.get_mut(id)? = updated;
        store.snapshot(id, user_id);
        tracing::debug!(model = %self.descriptor.model, id, "Record updated");
        store.get(id).cloned()
    }

    /// The record with input applied, without saving it
    ///
    /// # Errors
    ///
    /// As [`Repository::update`].
    pub fn preview(&self, id: u64, input: &Map<String, Value>) -> Result<Record> {
        let mut record = self.find(id)?;
        self.merge(&mut record, input)?;
        Ok(record)
    }

    /// Move records to the trash
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] if any id is missing or already trashed;
    /// nothing is changed in that case.
    pub fn delete(&self, ids: &[u64]) -> Result<()> {
        let ids = distinct(ids);
        let mut store = self.store.write();
        for id in &ids {
            store.get(*id)?;
        }
        let now = now();
        for id in &ids {
            store.get_mut(*id)?.deleted_at = Some(now);
        }
        Ok(())
    }

    /// Take records out of the trash
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] if any id is not in the trash.
    pub fn restore(&self, ids: &[u64]) -> Result<()> {
        let ids = distinct(ids);
        let mut store = self.store.write();
        for id in &ids {
            store.trashed_mut(*id)?;
        }
        for id in &ids {
            store.trashed_mut(*id)?.deleted_at = None;
        }
        Ok(())
    }

    /// Permanently remove trashed records and their revisions
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] if any id is not in the trash.
    pub fn force_delete(&self, ids: &[u64]) -> Result<()> {
        let ids = distinct(ids);
        let mut store = self.store.write();
        for id in &ids {
            store.trashed_mut(*id)?;
        }
        for id in &ids {
            store.records.remove(id);
        }
        store.revisions.retain(|r| !ids.contains(&r.record_id));
        Ok(())
    }

    /// Set the publish flag
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] if any id is missing.
    pub fn publish(&self, ids: &[u64], published: bool) -> Result<()> {
        self.set_flag(ids, |record| record.published = published)
    }

    /// Set the feature flag
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] if any id is missing.
    pub fn feature(&self, ids: &[u64], featured: bool) -> Result<()> {
        self.set_flag(ids, |record| record.featured = featured)
    }

    /// Assign positions 1..n in the given order; repeated ids keep their
    /// first position
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] if any id is missing.
    pub fn reorder(&self, ids: &[u64]) -> Result<()> {
        let ids = distinct(ids);
        let mut store = self.store.write();
        for id in &ids {
            store.get(*id)?;
        }
        for (position, id) in (1..).zip(&ids) {
            store.get_mut(*id)?.position = Some(position);
        }
        Ok(())
    }

    /// Unpublished copy of a record, translations and blocks included
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] if the source is missing.
    pub fn duplicate(&self, id: u64, user_id: Option<&str>) -> Result<Record> {
        let mut store = self.store.write();
        let now = now();
        let mut copy = store.get(id)?.clone();
        copy.published = false;
        copy.featured = false;
        copy.position = None;
        copy.created_at = now;
        copy.updated_at = now;

        let new_id = store.insert(copy);
        store.snapshot(new_id, user_id);
        tracing::debug!(model = %self.descriptor.model, from = id, to = new_id, "Record duplicated");
        store.get(new_id).cloned()
    }

    /// Distinct tags, optionally filtered by a case-insensitive substring
    #[must_use]
    pub fn tags(&self, query: Option<&str>) -> Vec<String> {
        let needle = query.map(str::to_lowercase).unwrap_or_default();
        let store = self.store.read();
        store
            .records
            .values()
            .flat_map(|r| r.tags.iter())
            .filter(|tag| tag.to_lowercase().contains(&needle))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Revisions of a record, oldest first
    #[must_use]
    pub fn revisions(&self, id: u64) -> Vec<Revision> {
        self.store
            .read()
            .revisions
            .iter()
            .filter(|r| r.record_id == id)
            .cloned()
            .collect()
    }

    /// A record as it was at a revision
    ///
    /// # Errors
    ///
    /// [`ActonCmsError::NotFound`] if the record or revision is missing.
    pub fn revision(&self, id: u64, revision_id: u64) -> Result<Revision> {
        let store = self.store.read();
        store.get(id)?;
        store
            .revisions
            .iter()
            .find(|r| r.record_id == id && r.id == revision_id)
            .cloned()
            .ok_or_else(|| ActonCmsError::NotFound(format!("Revision {revision_id} of record {id}")))
    }

    /// Translated attribute in a locale, with fallback
    #[must_use]
    pub fn translated(&self, record: &Record, attribute: &str, locale: &str) -> Option<Value> {
        self.translations
            .as_ref()
            .and_then(|handler| handler.translated(&record.translations, attribute, locale))
            .cloned()
    }

    fn merge(&self, record: &mut Record, input: &Map<String, Value>) -> Result<()> {
        self.model.fill(&mut record.attributes, input)?;
        self.apply_relations(record, input)
    }

    fn apply_relations(&self, record: &mut Record, input: &Map<String, Value>) -> Result<()> {
        if let Some(handler) = &self.translations {
            handler.apply(&mut record.translations, input)?;
        }
        if self.blocks.is_some() {
            if let Some(blocks) = BlockHandler::extract(input)? {
                record.blocks = blocks;
            }
        }
        if let Some(tags) = input.get("tags") {
            record.tags = super::list_values(tags)?;
        }
        if let Some(published) = input.get("published") {
            if let FieldValue::Bool(published) = FieldValue::cast(FieldType::Boolean, published)? {
                record.published = published;
            }
        }
        Ok(())
    }

    fn set_flag(&self, ids: &[u64], set: impl Fn(&mut Record)) -> Result<()> {
        let ids = distinct(ids);
        let mut store = self.store.write();
        for id in &ids {
            store.get(*id)?;
        }
        for id in &ids {
            set(store.get_mut(*id)?);
        }
        Ok(())
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Ids in first-seen order, repeats dropped
fn distinct(ids: &[u64]) -> Vec<u64> {
    let mut seen = BTreeSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
