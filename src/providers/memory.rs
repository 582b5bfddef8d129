/*!
 * In-memory content provider.
 *
 * Keeps content objects and terms in process memory. Used by the CLI,
 * which seeds it from a JSON catalog, and by tests, which can also make
 * object creation fail:
 * - `CreateBehavior::Assign` - new objects get the next free id
 * - `CreateBehavior::ZeroId` - creation "succeeds" with id 0
 * - `CreateBehavior::Failing` - creation returns an error
 */

use anyhow::{Context, Result, anyhow};
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ContentObject, ContentProvider, NewContentObject, Term};
use crate::database::models::ObjectKind;

/// How `create_object` behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateBehavior {
    /// Assign the next free id
    #[default]
    Assign,
    /// Report id 0
    ZeroId,
    /// Return an error
    Failing,
}

#[derive(Debug, Default)]
struct Catalog {
    objects: HashMap<i64, ContentObject>,
    terms: HashMap<(i64, String), Vec<Term>>,
    next_id: i64,
}

/// Content provider backed by a map
#[derive(Debug, Clone, Default)]
pub struct MemoryContentProvider {
    catalog: Arc<RwLock<Catalog>>,
    behavior: CreateBehavior,
    lookups: Arc<AtomicUsize>,
}

impl MemoryContentProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding `objects`
    pub fn with_objects(objects: impl IntoIterator<Item = ContentObject>) -> Self {
        let provider = Self::new();
        for object in objects {
            provider.add_object(object);
        }
        provider
    }

    /// Load a JSON array of content objects
    pub fn from_catalog_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
        let objects: Vec<ContentObject> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {:?}", path))?;

        debug!("Loaded {} content object(s) from {:?}", objects.len(), path);
        Ok(Self::with_objects(objects))
    }

    /// Change how object creation behaves
    pub fn with_create_behavior(mut self, behavior: CreateBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Store or replace an object
    pub fn add_object(&self, object: ContentObject) {
        let mut catalog = self.catalog.write();
        catalog.next_id = catalog.next_id.max(object.id);
        catalog.objects.insert(object.id, object);
    }

    /// Attach terms of `taxonomy` to an object
    pub fn set_terms(&self, id: i64, taxonomy: &str, terms: Vec<Term>) {
        self.catalog
            .write()
            .terms
            .insert((id, taxonomy.to_string()), terms);
    }

    /// Number of objects held
    pub fn len(&self) -> usize {
        self.catalog.read().objects.len()
    }

    /// Whether no objects are held
    pub fn is_empty(&self) -> bool {
        self.catalog.read().objects.is_empty()
    }

    /// Number of `object_by_id` and `terms_for` calls served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ContentProvider for MemoryContentProvider {
    fn title(&self, id: i64) -> Option<String> {
        self.catalog.read().objects.get(&id).map(|o| o.title.clone())
    }

    fn create_object(&self, fields: NewContentObject) -> Result<i64> {
        match self.behavior {
            CreateBehavior::Failing => Err(anyhow!("Refusing to create '{}'", fields.title)),
            CreateBehavior::ZeroId => Ok(0),
            CreateBehavior::Assign => {
                let mut catalog = self.catalog.write();
                catalog.next_id += 1;
                let id = catalog.next_id;
                let slug = slugify(&fields.title);

                catalog.objects.insert(
                    id,
                    ContentObject {
                        id,
                        kind: ObjectKind::ContentItem,
                        object_type: fields.object_type,
                        title: fields.title,
                        slug,
                    },
                );

                Ok(id)
            }
        }
    }

    fn object_by_id(&self, id: i64) -> Option<ContentObject> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.catalog.read().objects.get(&id).cloned()
    }

    fn terms_for(&self, id: i64, taxonomy: &str) -> Vec<Term> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.catalog
            .read()
            .terms
            .get(&(id, taxonomy.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Lowercase, ASCII alphanumerics kept, runs of anything else become `-`
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
