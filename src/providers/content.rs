/*!
 * Content object types exchanged with the content provider.
 */

use serde::{Deserialize, Serialize};

use crate::database::models::ObjectKind;

/// A content object as seen by the translation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentObject {
    /// Object identifier
    pub id: i64,
    /// Storage category
    #[serde(default = "default_kind")]
    pub kind: ObjectKind,
    /// Subtype, e.g. `page` or `post`
    pub object_type: String,
    /// Human readable title
    #[serde(default)]
    pub title: String,
    /// URL slug
    #[serde(default)]
    pub slug: String,
}

impl ContentObject {
    /// Create a content item
    pub fn content_item(id: i64, object_type: &str, title: &str, slug: &str) -> Self {
        Self {
            id,
            kind: ObjectKind::ContentItem,
            object_type: object_type.to_string(),
            title: title.to_string(),
            slug: slug.to_string(),
        }
    }
}

fn default_kind() -> ObjectKind {
    ObjectKind::ContentItem
}

/// Fields for an object about to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContentObject {
    /// Title of the new object
    pub title: String,
    /// Subtype of the new object
    pub object_type: String,
}

/// A taxonomy term attached to an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Term identifier
    pub id: i64,
    /// Taxonomy the term belongs to
    pub taxonomy: String,
    /// Display name
    pub name: String,
    /// URL slug
    pub slug: String,
}
