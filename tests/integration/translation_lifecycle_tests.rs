/*!
 * Integration tests for creating and removing translation links
 */

use std::sync::Arc;

use anyhow::Result;
use polyglot::app_config::SiteConfig;
use polyglot::database::schema::{self, TableNames};
use polyglot::providers::memory::CreateBehavior;
use polyglot::{
    ContentProvider, MemoryContentProvider, ObjectKind, QueryError, QueryService, SqliteStore,
    TranslationDetails,
};

use crate::common::{self, CountingStore, page};

fn service_with_behavior(behavior: CreateBehavior) -> (QueryService, CountingStore, Arc<MemoryContentProvider>) {
    let store = CountingStore::new();
    let content = Arc::new(
        MemoryContentProvider::with_objects([page(5, "About", "about")]).with_create_behavior(behavior),
    );
    let service = QueryService::new(
        Arc::new(store.clone()),
        content.clone(),
        Arc::new(common::i18n()),
        Arc::new(SiteConfig::default()),
    );
    (service, store, content)
}

#[test]
fn test_createTranslation_withContentItem_shouldCreateObjectAndLink() {
    let fx = common::fixture();

    let new_id = fx
        .service
        .create_translation(5, "page", ObjectKind::ContentItem, "it_IT")
        .unwrap();

    assert!(new_id > 11);
    assert_eq!(fx.content.title(new_id).as_deref(), Some("About (it_IT)"));
    assert_eq!(fx.store.row_count(), 1);

    let translation = fx.service.find_cached_object_by_id(new_id).unwrap();
    assert_eq!(fx.service.find_object_locale(&translation).unwrap(), "it_IT");

    let record = fx.service.find_details(&translation).unwrap().into_record().unwrap();
    assert_eq!(record.translation_of, Some(5));
    assert_eq!(record.object_type, "page");
    assert!(record.is_saved());
}

#[test]
fn test_createTranslation_withUnsupportedKind_shouldFailWithoutWrites() {
    let fx = common::fixture();

    let result = fx
        .service
        .create_translation(5, "category", ObjectKind::TaxonomyTerm, "fr_FR");

    assert!(matches!(result, Err(QueryError::UnsupportedKind(ObjectKind::TaxonomyTerm))));
    assert_eq!(fx.store.write_count(), 0);
    assert_eq!(fx.content.len(), 3);
}

#[test]
fn test_createTranslation_whenProviderFails_shouldReturnCreateObjectError() {
    let (service, store, _) = service_with_behavior(CreateBehavior::Failing);

    let result = service.create_translation(5, "page", ObjectKind::ContentItem, "fr_FR");

    assert!(matches!(result, Err(QueryError::CreateObject { original_id: 5, .. })));
    assert_eq!(store.write_count(), 0);
}

#[test]
fn test_createTranslation_whenProviderReturnsZero_shouldReturnCreateObjectError() {
    let (service, store, _) = service_with_behavior(CreateBehavior::ZeroId);

    let result = service.create_translation(5, "page", ObjectKind::ContentItem, "fr_FR");

    match result {
        Err(QueryError::CreateObject { reason, .. }) => assert!(reason.contains("0")),
        other => panic!("expected CreateObject error, got {:?}", other),
    }
    assert_eq!(store.row_count(), 0);
}

#[test]
fn test_createTranslation_whenLinkInsertFails_shouldReportOrphanedObject() {
    let (service, store, content) = service_with_behavior(CreateBehavior::Assign);
    store.set_fail_inserts(true);

    let result = service.create_translation(5, "page", ObjectKind::ContentItem, "fr_FR");

    let orphan = match result {
        Err(QueryError::Persist { orphaned_object_id: Some(id), .. }) => id,
        other => panic!("expected Persist error with orphan, got {:?}", other),
    };
    // The created object is left in place
    assert!(content.object_by_id(orphan).is_some());
    assert_eq!(store.row_count(), 0);
}

#[test]
fn test_unlinkTranslation_shouldRemoveOnlyMatchingRows() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");
    fx.store.link(10, 5, "fr_FR");
    fx.store.link(11, 5, "de_DE");

    let removed = fx.service.unlink_translation(10, ObjectKind::ContentItem).unwrap();

    assert_eq!(removed, 2);
    assert_eq!(fx.store.row_count(), 1);
    let remaining = fx
        .service
        .find_all_translations_of_original_id(5, ObjectKind::ContentItem)
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].object_id, 11);
}

#[test]
fn test_unlinkTranslation_withOtherKind_shouldLeaveRowsUntouched() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");

    let removed = fx.service.unlink_translation(10, ObjectKind::TaxonomyTerm).unwrap();

    assert_eq!(removed, 0);
    assert_eq!(fx.store.row_count(), 1);
    // The content object itself is never touched
    assert!(fx.content.object_by_id(10).is_some());
}

#[test]
fn test_onDiskStore_shouldKeepLinksAndVersionAcrossReopen() -> Result<()> {
    common::init_logging();
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("polyglot.db");
    let content = Arc::new(MemoryContentProvider::with_objects([page(5, "About", "about")]));

    let new_id = {
        let store = SqliteStore::open(&db_path, "wp_")?;
        let service = QueryService::new(
            Arc::new(store),
            content.clone(),
            Arc::new(common::i18n()),
            Arc::new(SiteConfig::default()),
        );
        service.create_schema()?;
        service.create_translation(5, "page", ObjectKind::ContentItem, "fr_FR")?
    };

    let store = SqliteStore::open(&db_path, "wp_")?;
    let version = store
        .connection()
        .execute(|conn| schema::get_schema_version(conn, &TableNames::with_prefix("wp_")))?;
    assert_eq!(version.as_deref(), Some(schema::SCHEMA_VERSION));

    let service = QueryService::new(
        Arc::new(store),
        content.clone(),
        Arc::new(common::i18n()),
        Arc::new(SiteConfig::default()),
    );
    service.create_schema()?;

    let translation = content.object_by_id(new_id).expect("object was created");
    match service.find_details(&translation)? {
        TranslationDetails::Stored(record) => assert_eq!(record.translation_locale, "fr_FR"),
        other => panic!("expected stored details, got {:?}", other),
    }

    Ok(())
}
