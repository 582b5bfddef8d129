/*!
 * Integration tests for cache-through reads and locale resolution
 */

use polyglot::database::{PreparedQuery, QueryMode};
use polyglot::{ObjectKind, QueryCache, TranslationDetails};

use crate::common::{self, DEFAULT_LOCALE, page};

#[test]
fn test_runCachableQuery_calledTwiceWithSameText_shouldHitStoreOnce() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");

    let query = PreparedQuery::new("SELECT * FROM wp_polyglot WHERE obj_id = ?").bind(10_i64);
    let first = fx.service.run_cachable_query(&query, QueryMode::Rows).unwrap();
    let second = fx.service.run_cachable_query(&query, QueryMode::Rows).unwrap();

    assert_eq!(first, second);
    assert_eq!(fx.store.execute_count(), 1);
    assert_eq!(fx.service.cache_stats().0, 1);
}

#[test]
fn test_runCachableQuery_withDifferentBoundValue_shouldMiss() {
    let fx = common::fixture();

    let sql = "SELECT * FROM wp_polyglot WHERE obj_id = ?";
    fx.service
        .run_cachable_query(&PreparedQuery::new(sql).bind(10_i64), QueryMode::Rows)
        .unwrap();
    fx.service
        .run_cachable_query(&PreparedQuery::new(sql).bind(11_i64), QueryMode::Rows)
        .unwrap();

    assert_eq!(fx.store.execute_count(), 2);
}

#[test]
fn test_runCachableQuery_withEquivalentButDifferentText_shouldMiss() {
    let fx = common::fixture();

    fx.service
        .run_cachable_query(&PreparedQuery::new("SELECT 1"), QueryMode::Scalar)
        .unwrap();
    fx.service
        .run_cachable_query(&PreparedQuery::new("SELECT  1"), QueryMode::Scalar)
        .unwrap();

    assert_eq!(fx.store.execute_count(), 2);
}

#[test]
fn test_runCachableQuery_withDisabledCache_shouldAlwaysHitStore() {
    let fx = common::fixture();
    let service = fx.service.with_cache(QueryCache::new(false));

    let query = PreparedQuery::new("SELECT 1");
    service.run_cachable_query(&query, QueryMode::Scalar).unwrap();
    service.run_cachable_query(&query, QueryMode::Scalar).unwrap();

    assert_eq!(fx.store.execute_count(), 2);
}

#[test]
fn test_findAllTranslationsOfOriginalId_shouldReturnRecordsInInsertionOrder() {
    let fx = common::fixture();
    let first = fx.store.link(10, 5, "fr_FR");
    let second = fx.store.link(11, 5, "de_DE");
    fx.store.link(12, 6, "fr_FR");

    let records = fx
        .service
        .find_all_translations_of_original_id(5, ObjectKind::ContentItem)
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].record_id, Some(first));
    assert_eq!(records[0].object_id, 10);
    assert_eq!(records[0].translation_locale, "fr_FR");
    assert_eq!(records[0].object_slug.as_deref(), Some("a-propos"));
    assert_eq!(records[1].record_id, Some(second));
    assert_eq!(records[1].object_id, 11);
    assert_eq!(records[1].translation_locale, "de_DE");
    assert!(records.windows(2).all(|w| w[0].record_id < w[1].record_id));
}

#[test]
fn test_findAllTranslationsOfOriginal_withOtherKind_shouldNotMatch() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");

    let records = fx
        .service
        .find_all_translations_of_original_id(5, ObjectKind::TaxonomyTerm)
        .unwrap();

    assert!(records.is_empty());
}

#[test]
fn test_findDetails_withDefaultLocaleOriginal_shouldSynthesizeUnsavedEntity() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");

    let details = fx.service.find_details(&page(5, "About", "about")).unwrap();

    match details {
        TranslationDetails::DefaultLocaleOriginal(record) => {
            assert!(!record.is_saved());
            assert_eq!(record.translation_of, None);
            assert_eq!(record.translation_locale, DEFAULT_LOCALE);
            assert_eq!(record.object_id, 5);
        }
        other => panic!("expected a default-locale original, got {:?}", other),
    }
}

#[test]
fn test_findDetails_withStoredLink_shouldReturnEarliestRecord() {
    let fx = common::fixture();
    let first = fx.store.link(10, 5, "fr_FR");
    fx.store.link(10, 5, "fr_CA");

    let details = fx.service.find_details(&page(10, "About (fr_FR)", "a-propos")).unwrap();

    let record = details.into_record().expect("record expected");
    assert_eq!(record.record_id, Some(first));
    assert_eq!(record.translation_of, Some(5));
    assert_eq!(record.translation_locale, "fr_FR");
}

#[test]
fn test_findDetails_withNullStoredLocale_shouldAgreeWithFindObjectLocale() {
    let fx = common::fixture();
    let record_id = fx.store.link_without_locale(5);
    let object = page(5, "About", "about");

    let locale = fx.service.find_object_locale(&object).unwrap();
    let details = fx.service.find_details(&object).unwrap();

    assert_eq!(locale, DEFAULT_LOCALE);
    match details {
        TranslationDetails::Stored(record) => {
            assert_eq!(record.record_id, Some(record_id));
            assert_eq!(record.translation_locale, locale);
        }
        other => panic!("expected the stored row, got {:?}", other),
    }
}

#[test]
fn test_findDetails_withStaleLocaleAfterUnlink_shouldReportUntracked() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");
    let translation = page(10, "About (fr_FR)", "a-propos");

    // Warm the locale query, then remove the link behind the cache
    assert_eq!(fx.service.find_object_locale(&translation).unwrap(), "fr_FR");
    fx.service.unlink_translation(10, ObjectKind::ContentItem).unwrap();

    let details = fx.service.find_details(&translation).unwrap();

    assert_eq!(details, TranslationDetails::Untracked);
    assert!(details.record().is_none());
}

#[test]
fn test_findObjectLocale_withoutRecord_shouldFallBackToDefaultLocale() {
    let fx = common::fixture();

    let locale = fx.service.find_object_locale(&page(5, "About", "about")).unwrap();

    assert_eq!(locale, DEFAULT_LOCALE);
}

#[test]
fn test_findObjectLocale_withRecords_shouldUseEarliestRecord() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");
    fx.store.link(10, 5, "fr_CA");

    let locale = fx.service.find_object_locale(&page(10, "", "")).unwrap();

    assert_eq!(locale, "fr_FR");
}

#[test]
fn test_findDetails_repeated_shouldReuseCachedQueries() {
    let fx = common::fixture();
    let original = page(5, "About", "about");

    fx.service.find_details(&original).unwrap();
    let executes_after_first = fx.store.execute_count();
    fx.service.find_details(&original).unwrap();

    // details query plus the locale check, both served from memory the second time
    assert_eq!(executes_after_first, 2);
    assert_eq!(fx.store.execute_count(), 2);
}

#[test]
fn test_findOriginalTranslationDetails_shouldReturnAllSiblingsIncludingSelf() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");
    fx.store.link(11, 5, "de_DE");
    fx.store.link(20, 6, "de_DE");

    let siblings = fx
        .service
        .find_original_translation_details(&page(11, "About (de_DE)", "uber-uns"))
        .unwrap();

    let ids: Vec<i64> = siblings.iter().map(|r| r.object_id).collect();
    assert_eq!(ids, vec![10, 11]);
    assert!(siblings.iter().all(|r| r.translation_of == Some(5)));
}

#[test]
fn test_findOriginalTranslationDetails_withOriginal_shouldReturnEmpty() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");

    let siblings = fx
        .service
        .find_original_translation_details(&page(5, "About", "about"))
        .unwrap();

    assert!(siblings.is_empty());
}

#[test]
fn test_generateLocaleHomeUrlList_withoutFrontPage_shouldReturnEmptyMap() {
    let fx = common::fixture();
    fx.store.link(10, 5, "fr_FR");

    let slugs = fx.service.generate_locale_home_url_list().unwrap();

    assert!(slugs.is_empty());
    assert_eq!(fx.store.execute_count(), 0);
}

#[test]
fn test_generateLocaleHomeUrlList_withFrontPage_shouldMapLocalesToSlugs() {
    let fx = common::fixture_with(
        vec![
            page(5, "Home", "home"),
            page(10, "Accueil", "accueil"),
            page(11, "Startseite", "startseite"),
        ],
        common::static_front_page(5),
    );
    fx.store.link(10, 5, "fr_FR");
    fx.store.link(11, 5, "de_DE");

    let slugs = fx.service.generate_locale_home_url_list().unwrap();

    assert_eq!(slugs.len(), 2);
    assert_eq!(slugs.get("fr_FR").map(String::as_str), Some("accueil"));
    assert_eq!(slugs.get("de_DE").map(String::as_str), Some("startseite"));
    assert!(!slugs.contains_key(DEFAULT_LOCALE));
}

#[test]
fn test_generateLocaleHomeUrlList_withUnknownTranslationObject_shouldSkipIt() {
    let fx = common::fixture_with(vec![page(5, "Home", "home")], common::static_front_page(5));
    fx.store.link(10, 5, "fr_FR");

    let slugs = fx.service.generate_locale_home_url_list().unwrap();

    assert!(slugs.is_empty());
    assert_eq!(fx.content.lookup_count(), 1);
}
