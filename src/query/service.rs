/*!
 * Query service for translation links.
 *
 * This module handles:
 * - Cache-through reads keyed by the rendered query text
 * - Creating and removing translation links
 * - Resolving an object's locale, its link details and its siblings
 * - Building the per-locale front page slug list
 */

use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use super::cache::{CachedValue, QueryCache};
use super::logger::{LOG_CONTEXT, QueryLogger};
use crate::database::models::{
    ObjectKind, PreparedQuery, QueryMode, QueryResult, Row, TranslationRecord,
};
use crate::database::store::TranslationStore;
use crate::errors::{QueryError, StoreError};
use crate::providers::{
    ContentObject, ContentProvider, LocaleProvider, NewContentObject, SiteSettings, Term,
};

/// Outcome of looking up the link details of an object
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationDetails {
    /// A stored link exists
    Stored(TranslationRecord),
    /// No link exists and the object is in the default locale, so it is an
    /// original. The record is transient and was never saved.
    DefaultLocaleOriginal(TranslationRecord),
    /// No link exists, yet the object does not resolve to the default
    /// locale. Callers decide how to treat the absence.
    Untracked,
}

impl TranslationDetails {
    /// The record, stored or transient
    pub fn record(&self) -> Option<&TranslationRecord> {
        match self {
            TranslationDetails::Stored(record) | TranslationDetails::DefaultLocaleOriginal(record) => {
                Some(record)
            }
            TranslationDetails::Untracked => None,
        }
    }

    /// Take the record, stored or transient
    pub fn into_record(self) -> Option<TranslationRecord> {
        match self {
            TranslationDetails::Stored(record) | TranslationDetails::DefaultLocaleOriginal(record) => {
                Some(record)
            }
            TranslationDetails::Untracked => None,
        }
    }
}

/// Orchestrates the cache, the store and the CMS collaborators
pub struct QueryService {
    store: Arc<dyn TranslationStore>,
    content: Arc<dyn ContentProvider>,
    locales: Arc<dyn LocaleProvider>,
    site: Arc<dyn SiteSettings>,
    cache: QueryCache,
    logger: QueryLogger,
}

impl QueryService {
    /// Create a service with an enabled, empty cache
    pub fn new(
        store: Arc<dyn TranslationStore>,
        content: Arc<dyn ContentProvider>,
        locales: Arc<dyn LocaleProvider>,
        site: Arc<dyn SiteSettings>,
    ) -> Self {
        Self {
            store,
            content,
            locales,
            site,
            cache: QueryCache::default(),
            logger: QueryLogger::new(),
        }
    }

    /// Replace the cache, e.g. with a disabled one
    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = cache;
        self
    }

    /// The cache in front of the store
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Cache statistics as (hits, misses, hit rate)
    pub fn cache_stats(&self) -> (usize, usize, f64) {
        self.cache.stats()
    }

    fn table(&self) -> &str {
        self.store.translations_table()
    }

    fn default_locale(&self) -> String {
        self.locales.default_locale()
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Create or upgrade the translations table
    pub fn create_schema(&self) -> Result<(), QueryError> {
        self.store.create_schema()?;
        self.logger
            .log("Created or updated the Polyglot table.", LOG_CONTEXT);
        Ok(())
    }

    // =========================================================================
    // Cache-through reads
    // =========================================================================

    /// Serve `key` from the cache, or load, cache and return it
    fn cache_through<T: Clone, E>(
        &self,
        key: &str,
        label: &str,
        extract: impl FnOnce(CachedValue) -> Option<T>,
        wrap: impl FnOnce(T) -> CachedValue,
        load: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.logger.log_query_start();

        if let Some(value) = self.cache.get_as(key, extract) {
            self.logger.log_query_completion(label, true);
            return Ok(value);
        }

        let value = load()?;
        self.cache.set(key, wrap(value.clone()));
        self.logger.log_query_completion(label, false);

        Ok(value)
    }

    /// Run a query through the cache.
    ///
    /// The key is the rendered query text: two calls share a cache entry
    /// exactly when their statements and bound values render identically.
    pub fn run_cachable_query(
        &self,
        query: &PreparedQuery,
        mode: QueryMode,
    ) -> Result<QueryResult, QueryError> {
        let key = query.rendered();

        self.cache_through(
            &key,
            &key,
            |cached| match cached {
                CachedValue::Query(result) if result.mode() == mode => Some(result),
                _ => None,
            },
            CachedValue::Query,
            || self.store.execute(query, mode).map_err(QueryError::from),
        )
    }

    /// Look up an object through the cache (key `get_post_<id>`)
    pub fn find_cached_object_by_id(&self, id: i64) -> Option<ContentObject> {
        let Ok(object) = self.cache_through::<_, Infallible>(
            &format!("get_post_{}", id),
            &format!("Loaded object ID #{}", id),
            |cached| match cached {
                CachedValue::Object(object) => Some(object),
                _ => None,
            },
            CachedValue::Object,
            || Ok(self.content.object_by_id(id)),
        );
        object
    }

    /// Look up the terms of an object through the cache
    /// (key `get_taxonomy_<id>_<taxonomy>`)
    pub fn find_cached_terms(&self, taxonomy: &str, id: i64) -> Vec<Term> {
        let Ok(terms) = self.cache_through::<_, Infallible>(
            &format!("get_taxonomy_{}_{}", id, taxonomy),
            &format!("Loaded taxonomy ID #{}", id),
            |cached| match cached {
                CachedValue::Terms(terms) => Some(terms),
                _ => None,
            },
            CachedValue::Terms,
            || Ok(self.content.terms_for(id, taxonomy)),
        );
        terms
    }

    // =========================================================================
    // Translation links
    // =========================================================================

    /// Unsaved record describing `object` as a default-locale original
    pub fn create_translation_entity(&self, object: &ContentObject) -> TranslationRecord {
        TranslationRecord {
            record_id: None,
            object_id: object.id,
            object_kind: object.kind,
            object_type: object.object_type.clone(),
            translation_of: None,
            translation_locale: self.default_locale(),
            object_slug: Some(object.slug.clone()).filter(|s| !s.is_empty()),
        }
    }

    /// Duplicate an original into `target_locale` and link the copy.
    ///
    /// The copy is created before the link is written and the two steps
    /// are not atomic: when the link insert fails, the copy stays and its
    /// id is reported in `QueryError::Persist::orphaned_object_id`.
    pub fn create_translation(
        &self,
        original_id: i64,
        original_type: &str,
        original_kind: ObjectKind,
        target_locale: &str,
    ) -> Result<i64, QueryError> {
        let translation_id = match original_kind {
            ObjectKind::ContentItem => {
                self.duplicate_content_item(original_id, original_type, target_locale)?
            }
            ObjectKind::TaxonomyTerm => return Err(QueryError::UnsupportedKind(original_kind)),
        };

        let record = TranslationRecord::new_translation(
            translation_id,
            original_kind,
            original_type,
            original_id,
            target_locale,
        );

        self.store
            .insert(self.table(), &record.insert_values())
            .map_err(|source| {
                warn!(
                    "Object #{} was created but linking it to #{} failed: {}",
                    translation_id, original_id, source
                );
                QueryError::Persist {
                    orphaned_object_id: Some(translation_id),
                    source,
                }
            })?;

        info!(
            "Linked #{} as the {} translation of #{}",
            translation_id, target_locale, original_id
        );
        Ok(translation_id)
    }

    fn duplicate_content_item(
        &self,
        original_id: i64,
        original_type: &str,
        target_locale: &str,
    ) -> Result<i64, QueryError> {
        let original_title = self.content.title(original_id).unwrap_or_default();
        let fields = NewContentObject {
            title: format!("{} ({})", original_title, target_locale),
            object_type: original_type.to_string(),
        };

        match self.content.create_object(fields) {
            Ok(id) if id > 0 => Ok(id),
            Ok(id) => Err(QueryError::CreateObject {
                original_id,
                reason: format!("provider returned id {}", id),
            }),
            Err(e) => Err(QueryError::CreateObject {
                original_id,
                reason: e.to_string(),
            }),
        }
    }

    /// Remove every link of an object. The object itself is kept.
    pub fn unlink_translation(&self, object_id: i64, object_kind: ObjectKind) -> Result<usize, QueryError> {
        self.store
            .delete(
                self.table(),
                &[("obj_id", object_id.into()), ("obj_kind", object_kind.into())],
            )
            .map_err(|source| QueryError::Persist {
                orphaned_object_id: None,
                source,
            })
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// All translations of `object`, oldest link first
    pub fn find_all_translations_of_original(
        &self,
        object: &ContentObject,
    ) -> Result<Vec<TranslationRecord>, QueryError> {
        self.find_all_translations_of_original_id(object.id, object.kind)
    }

    /// All translations of the original `id`, oldest link first, with the
    /// slug of each translated object attached
    pub fn find_all_translations_of_original_id(
        &self,
        id: i64,
        kind: ObjectKind,
    ) -> Result<Vec<TranslationRecord>, QueryError> {
        let query = PreparedQuery::new(format!(
            "SELECT * FROM {} WHERE translation_of = ? AND obj_kind = ? ORDER BY polyglot_ID ASC",
            self.table()
        ))
        .bind(id)
        .bind(kind);

        let rows = self.run_cachable_query(&query, QueryMode::Rows)?.into_rows()?;
        let mut records = rows_to_records(&rows, &self.default_locale())?;

        for record in &mut records {
            record.object_slug = self
                .find_cached_object_by_id(record.object_id)
                .map(|object| object.slug);
        }

        Ok(records)
    }

    /// Link details of `object`, earliest link first
    pub fn find_details(&self, object: &ContentObject) -> Result<TranslationDetails, QueryError> {
        let query = PreparedQuery::new(format!(
            "SELECT * FROM {} WHERE obj_id = ? AND obj_kind = ? ORDER BY polyglot_ID ASC LIMIT 1",
            self.table()
        ))
        .bind(object.id)
        .bind(object.kind);

        match self.run_cachable_query(&query, QueryMode::SingleRow)?.into_row()? {
            Some(row) => Ok(TranslationDetails::Stored(TranslationRecord::from_row(
                &row,
                &self.default_locale(),
            )?)),
            None if self.is_in_default_locale(object)? => Ok(
                TranslationDetails::DefaultLocaleOriginal(self.create_translation_entity(object)),
            ),
            None => Ok(TranslationDetails::Untracked),
        }
    }

    /// Every link sharing the original of `object`, including its own.
    ///
    /// Empty when `object` has no link, which is the case for originals.
    pub fn find_original_translation_details(
        &self,
        object: &ContentObject,
    ) -> Result<Vec<TranslationRecord>, QueryError> {
        let table = self.table();
        let query = PreparedQuery::new(format!(
            "SELECT * FROM {t} WHERE translation_of = \
             (SELECT translation_of FROM {t} WHERE obj_id = ? AND obj_kind = ? ORDER BY polyglot_ID ASC LIMIT 1) \
             AND obj_kind = ? ORDER BY polyglot_ID ASC",
            t = table
        ))
        .bind(object.id)
        .bind(object.kind)
        .bind(object.kind);

        let rows = self.run_cachable_query(&query, QueryMode::Rows)?.into_rows()?;
        Ok(rows_to_records(&rows, &self.default_locale())?)
    }

    /// Locale of `object`: the earliest link's locale, else the default.
    ///
    /// Never consults `find_details`, which depends on this method.
    pub fn find_object_locale(&self, object: &ContentObject) -> Result<String, QueryError> {
        let query = PreparedQuery::new(format!(
            "SELECT translation_locale FROM {} WHERE obj_id = ? AND obj_kind = ? ORDER BY polyglot_ID ASC",
            self.table()
        ))
        .bind(object.id)
        .bind(object.kind);

        match self.run_cachable_query(&query, QueryMode::Scalar)?.into_scalar()? {
            Some(Value::String(locale)) => Ok(locale),
            Some(other) => Err(StoreError::Decode(format!(
                "translation_locale of object #{} is not text: {}",
                object.id, other
            ))
            .into()),
            None => Ok(self.default_locale()),
        }
    }

    /// Whether `object` resolves to the default locale
    pub fn is_in_default_locale(&self, object: &ContentObject) -> Result<bool, QueryError> {
        Ok(self.find_object_locale(object)? == self.default_locale())
    }

    // =========================================================================
    // Front page
    // =========================================================================

    /// Front page object id, `None` unless a static front page is configured
    pub fn default_home_object_id(&self) -> Option<i64> {
        if !self.site.is_home_paging_enabled() {
            return None;
        }
        self.site.home_object_id().filter(|id| *id > 0)
    }

    /// Map of locale to the slug of the front page's translation in it
    pub fn generate_locale_home_url_list(&self) -> Result<BTreeMap<String, String>, QueryError> {
        let mut slugs = BTreeMap::new();

        let Some(home_id) = self.default_home_object_id() else {
            return Ok(slugs);
        };

        for record in self.find_all_translations_of_original_id(home_id, ObjectKind::ContentItem)? {
            match record.object_slug {
                Some(slug) => {
                    slugs.insert(record.translation_locale, slug);
                }
                None => warn!(
                    "Front page translation #{} ({}) has no slug",
                    record.object_id, record.translation_locale
                ),
            }
        }

        Ok(slugs)
    }
}

/// Convert rows of the translations table into records
fn rows_to_records(rows: &[Row], fallback_locale: &str) -> Result<Vec<TranslationRecord>, StoreError> {
    rows.iter()
        .map(|row| TranslationRecord::from_row(row, fallback_locale))
        .collect()
}
