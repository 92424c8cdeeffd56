//! Derived catalog view models.
//!
//! Categories and pages are ephemeral: every request rebuilds them from a
//! fresh listing of the backing store, and they are never mutated after
//! construction. Identity is positional or name-derived, not persisted.

use serde::{Deserialize, Serialize};

/// A browsable category, derived from one top-level key prefix.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Equal to `slug`; kept as a separate field for API compatibility.
    pub id: String,

    /// Category name exactly as it appears as a key prefix.
    pub name: String,

    /// Lower-cased, whitespace-collapsed-to-hyphen form of `name`.
    pub slug: String,

    /// Download URL of the chosen cover object, or the placeholder path.
    pub cover_image: String,

    /// Number of content pages under this category's prefix.
    pub page_count: usize,
}

/// A single downloadable coloring page within a category.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// `<categorySlug>-page-<1-based position>`, assigned after sorting.
    /// Shifts whenever the backing set changes; see DESIGN.md.
    pub id: String,

    /// Human-readable title derived from the file name.
    pub name: String,

    /// Bare file name (final key segment).
    pub file_name: String,

    pub thumbnail_url: String,
    pub download_url: String,

    /// Full object key in the backing store.
    pub object_key: String,

    /// Owning category name and slug.
    pub category: String,
    pub category_slug: String,
}

/// Result of resolving one category slug to its page listing.
///
/// `category: None` means the slug matched no current category. That is a
/// normal outcome, distinct from a backing-store failure (which surfaces as
/// an error from the deriver instead).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPages {
    pub category: Option<Category>,
    pub pages: Vec<Page>,
}

impl CategoryPages {
    /// The "no such category" value.
    pub fn not_found() -> Self {
        Self {
            category: None,
            pages: Vec::new(),
        }
    }
}
