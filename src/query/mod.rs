/*!
 * Cached query layer over the translation store.
 *
 * This module provides:
 * - `cache`: the in-memory query result cache
 * - `logger`: query timing and event logging
 * - `service`: cache-through reads, link management and locale resolution
 */

pub mod cache;
pub mod logger;
pub mod service;

// Re-export main types
pub use cache::{CachedValue, QueryCache};
pub use logger::QueryLogger;
pub use service::{QueryService, TranslationDetails};
