/*!
 * Collaborator interfaces consumed by the query service.
 *
 * The query service never reaches for ambient state. Everything it needs
 * from the surrounding CMS is handed to it through these traits:
 * - `LocaleProvider`: the default locale
 * - `ContentProvider`: titles, object creation, lookups and terms
 * - `SiteSettings`: front page configuration
 */

use anyhow::Result;
use std::fmt::Debug;

pub mod content;
pub mod memory;

pub use content::{ContentObject, NewContentObject, Term};
pub use memory::MemoryContentProvider;

/// Source of the site's default locale
pub trait LocaleProvider: Send + Sync + Debug {
    /// Locale code objects are authored in, e.g. `en_US`
    fn default_locale(&self) -> String;
}

/// Access to the CMS object model
pub trait ContentProvider: Send + Sync + Debug {
    /// Title of an object, if it exists
    fn title(&self, id: i64) -> Option<String>;

    /// Create an object and return its id.
    ///
    /// # Returns
    /// * `Result<i64>` - the new id; an id `<= 0` also signals failure
    fn create_object(&self, fields: NewContentObject) -> Result<i64>;

    /// Look up an object by id
    fn object_by_id(&self, id: i64) -> Option<ContentObject>;

    /// Terms of `taxonomy` attached to an object
    fn terms_for(&self, id: i64, taxonomy: &str) -> Vec<Term>;
}

/// Front page configuration of the site
pub trait SiteSettings: Send + Sync + Debug {
    /// Object shown as the front page, if one is configured
    fn home_object_id(&self) -> Option<i64>;

    /// Whether the front page shows a static object rather than a listing
    fn is_home_paging_enabled(&self) -> bool;
}
