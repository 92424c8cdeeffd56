//! src/catalog/mod.rs
//!
//! CatalogService — derives the browsable catalog from the backing store's
//! key space on every call. No state is held between calls and nothing is
//! cached: two derivations against an unchanged store return identical
//! results, and a changed store is reflected immediately.
//!
//! Per-category sub-listings fan out as independent tasks joined at a
//! single barrier. A failing sub-listing drops only its own category; only
//! a failure of the top-level listing surfaces as an error, and the HTTP
//! boundary degrades that to an empty result.

pub mod classify;

use crate::{
    models::{
        catalog::{Category, CategoryPages, Page},
        object::ObjectRecord,
    },
    store::{ObjectStore, StoreResult},
};
use std::collections::HashMap;
use tokio::task::JoinSet;

#[derive(Clone)]
pub struct CatalogService<S> {
    store: S,
    public_base_url: String,
    placeholder_image: String,
}

impl<S> CatalogService<S>
where
    S: ObjectStore + Clone + Send + Sync + 'static,
{
    pub fn new(
        store: S,
        public_base_url: impl Into<String>,
        placeholder_image: impl Into<String>,
    ) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into(),
            placeholder_image: placeholder_image.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Download URL for an object key, under the configured public base.
    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/api/download/{}",
            self.public_base_url.trim_end_matches('/'),
            key
        )
    }

    /// Derive the ordered set of qualifying categories.
    ///
    /// Lists depth-1 prefixes, lists each prefix's objects concurrently,
    /// classifies, drops zero-page categories, and sorts case-insensitively
    /// by name. Prefix listing order is preserved across the join so ties
    /// and cover selection stay deterministic.
    pub async fn categories(&self) -> StoreResult<Vec<Category>> {
        let prefixes = self.store.list_prefixes().await?;

        let mut tasks = JoinSet::new();
        for (idx, prefix) in prefixes.into_iter().enumerate() {
            let store = self.store.clone();
            tasks.spawn(async move {
                let listed = store.list_objects(&prefix).await;
                (idx, prefix, listed)
            });
        }

        let mut derived: Vec<(usize, Category)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (idx, prefix, listed) = match joined {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!("category listing task failed to join: {}", err);
                    continue;
                }
            };
            let objects = match listed {
                Ok(objects) => objects,
                Err(err) => {
                    tracing::warn!("skipping category `{}`: listing failed: {}", prefix, err);
                    continue;
                }
            };
            if let Some(category) = self.derive_category(&prefix, &objects) {
                derived.push((idx, category));
            }
        }

        derived.sort_by_key(|(idx, _)| *idx);
        let mut categories: Vec<Category> = derived.into_iter().map(|(_, c)| c).collect();
        categories.sort_by_key(|c| c.name.to_lowercase());
        report_slug_collisions(&categories);
        Ok(categories)
    }

    /// Build one category descriptor from its full listing, or `None` if it
    /// holds no content pages.
    fn derive_category(&self, prefix: &str, objects: &[ObjectRecord]) -> Option<Category> {
        let scan = classify::scan_listing(objects);
        if scan.page_keys.is_empty() {
            return None;
        }
        let name = prefix.trim_end_matches('/').to_string();
        let slug = classify::slugify(&name);
        Some(Category {
            id: slug.clone(),
            name,
            slug,
            cover_image: scan
                .cover_key
                .map(|key| self.object_url(&key))
                .unwrap_or_else(|| self.placeholder_image.clone()),
            page_count: scan.page_keys.len(),
        })
    }

    /// Resolve a slug against a fresh category derivation and list its
    /// pages. An unknown slug yields `category: None` with no pages — a
    /// normal outcome, not an error.
    pub async fn category_pages(&self, slug: &str) -> StoreResult<CategoryPages> {
        let categories = self.categories().await?;
        let Some(category) = categories.into_iter().find(|c| c.slug == slug) else {
            return Ok(CategoryPages::not_found());
        };

        let pages = self.pages_for(&category).await?;
        Ok(CategoryPages {
            category: Some(category),
            pages,
        })
    }

    /// List and build the ordered pages of one already-derived category.
    async fn pages_for(&self, category: &Category) -> StoreResult<Vec<Page>> {
        let objects = self
            .store
            .list_objects(&format!("{}/", category.name))
            .await?;
        Ok(self.build_pages(category, &objects))
    }

    fn build_pages(&self, category: &Category, objects: &[ObjectRecord]) -> Vec<Page> {
        let mut pages: Vec<Page> = objects
            .iter()
            .filter(|o| classify::is_content_page(&o.key))
            .map(|o| {
                let file_name = o.file_name().to_string();
                Page {
                    // Assigned below, once the final order is known.
                    id: String::new(),
                    name: classify::humanize_file_name(&file_name),
                    file_name,
                    thumbnail_url: self.object_url(&o.key),
                    download_url: self.object_url(&o.key),
                    object_key: o.key.clone(),
                    category: category.name.clone(),
                    category_slug: category.slug.clone(),
                }
            })
            .collect();

        // Stable sort: listing order breaks case-insensitive name ties.
        pages.sort_by_key(|p| p.name.to_lowercase());
        for (position, page) in pages.iter_mut().enumerate() {
            page.id = format!("{}-page-{}", category.slug, position + 1);
        }
        pages
    }

    /// Flat index of every page across every category: categories in
    /// catalog order, each category's pages in page order, concatenated.
    ///
    /// Page listings fan out per category; a failing category contributes
    /// nothing instead of aborting its siblings.
    pub async fn all_pages(&self) -> StoreResult<Vec<Page>> {
        let categories = self.categories().await?;

        let mut tasks = JoinSet::new();
        for (idx, category) in categories.into_iter().enumerate() {
            let service = self.clone();
            tasks.spawn(async move {
                let pages = service.pages_for(&category).await;
                (idx, category, pages)
            });
        }

        let mut slots: Vec<(usize, Vec<Page>)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (idx, category, pages) = match joined {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!("page listing task failed to join: {}", err);
                    continue;
                }
            };
            match pages {
                Ok(pages) => slots.push((idx, pages)),
                Err(err) => {
                    tracing::warn!(
                        "dropping pages of category `{}`: listing failed: {}",
                        category.name,
                        err
                    );
                }
            }
        }

        slots.sort_by_key(|(idx, _)| *idx);
        Ok(slots.into_iter().flat_map(|(_, pages)| pages).collect())
    }

    /// Filter the full index by a case-folded substring match on page name
    /// or owning category name. An empty query returns the index verbatim.
    pub async fn search(&self, query: &str) -> StoreResult<Vec<Page>> {
        let pages = self.all_pages().await?;
        if query.is_empty() {
            return Ok(pages);
        }
        let needle = query.to_lowercase();
        Ok(pages
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .collect())
    }
}

/// Two names differing only in case or whitespace collapse to one slug;
/// lookups then resolve to whichever sorts first. Flag it rather than
/// silently shadowing a category.
fn report_slug_collisions(categories: &[Category]) {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for category in categories {
        if let Some(first) = seen.insert(&category.slug, &category.name) {
            tracing::warn!(
                "categories `{}` and `{}` collide on slug `{}`; lookups resolve to `{}`",
                first,
                category.name,
                category.slug,
                first
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ObjectReader, StoreError, StoreResult};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::io;

    /// In-memory listing collaborator with per-prefix failure injection.
    #[derive(Clone, Default)]
    struct MemoryStore {
        objects: Vec<ObjectRecord>,
        fail_top_level: bool,
        failing_prefixes: Vec<String>,
    }

    impl MemoryStore {
        fn with_keys(keys: &[&str]) -> Self {
            Self {
                objects: keys.iter().map(|k| record(k)).collect(),
                ..Self::default()
            }
        }
    }

    fn record(key: &str) -> ObjectRecord {
        ObjectRecord {
            key: key.to_string(),
            size_bytes: 1024,
            content_type: None,
            etag: None,
            last_modified: Utc::now(),
        }
    }

    fn unavailable() -> StoreError {
        StoreError::Io(io::Error::other("backing store unavailable"))
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn list_prefixes(&self) -> StoreResult<Vec<String>> {
            if self.fail_top_level {
                return Err(unavailable());
            }
            let mut prefixes = Vec::new();
            for object in &self.objects {
                if let Some(pos) = object.key.find('/') {
                    let prefix = object.key[..pos + 1].to_string();
                    if !prefixes.contains(&prefix) {
                        prefixes.push(prefix);
                    }
                }
            }
            Ok(prefixes)
        }

        async fn list_objects(&self, prefix: &str) -> StoreResult<Vec<ObjectRecord>> {
            if self.failing_prefixes.iter().any(|p| p == prefix) {
                return Err(unavailable());
            }
            Ok(self
                .objects
                .iter()
                .filter(|o| o.key.starts_with(prefix))
                .cloned()
                .collect())
        }

        async fn get_object(&self, key: &str) -> StoreResult<(ObjectRecord, ObjectReader)> {
            Err(StoreError::ObjectNotFound(key.to_string()))
        }
    }

    fn service(store: MemoryStore) -> CatalogService<MemoryStore> {
        CatalogService::new(store, "", "/assets/placeholder.png")
    }

    fn sample_service() -> CatalogService<MemoryStore> {
        service(MemoryStore::with_keys(&[
            "Animals/cover.jpg",
            "Animals/lion.jpg",
            "Animals/Tiger.png",
            "Birds/cover.png",
            "Birds/eagle.pdf",
        ]))
    }

    #[tokio::test]
    async fn derives_ordered_categories_with_counts_and_covers() {
        let catalog = sample_service();
        let categories = catalog.categories().await.unwrap();

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Animals");
        assert_eq!(categories[0].slug, "animals");
        assert_eq!(categories[0].page_count, 2);
        assert_eq!(categories[0].cover_image, "/api/download/Animals/cover.jpg");
        assert_eq!(categories[1].name, "Birds");
        assert_eq!(categories[1].page_count, 1);
    }

    #[tokio::test]
    async fn zero_page_categories_are_excluded() {
        let catalog = service(MemoryStore::with_keys(&[
            "Empty/cover.jpg",
            "Animals/lion.jpg",
        ]));
        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Animals");
    }

    #[tokio::test]
    async fn missing_cover_falls_back_to_placeholder() {
        let catalog = service(MemoryStore::with_keys(&["Animals/lion.jpg"]));
        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories[0].cover_image, "/assets/placeholder.png");
    }

    #[tokio::test]
    async fn large_category_promotes_first_image_to_cover() {
        let keys: Vec<String> = ["ant", "bee", "cat", "dog", "elk", "fox"]
            .iter()
            .map(|n| format!("Big/{n}.jpg"))
            .collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let catalog = service(MemoryStore::with_keys(&refs));

        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories[0].cover_image, "/api/download/Big/ant.jpg");
        // The promoted cover is still a content page.
        assert_eq!(categories[0].page_count, 6);
    }

    #[tokio::test]
    async fn category_pages_sorts_names_and_assigns_positional_ids() {
        let catalog = sample_service();
        let result = catalog.category_pages("animals").await.unwrap();

        let category = result.category.unwrap();
        assert_eq!(category.name, "Animals");
        let names: Vec<&str> = result.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Lion", "Tiger"]);
        let ids: Vec<&str> = result.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["animals-page-1", "animals-page-2"]);
        assert_eq!(result.pages[1].object_key, "Animals/Tiger.png");
        assert_eq!(result.pages[1].download_url, result.pages[1].thumbnail_url);
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found_not_an_error() {
        let catalog = sample_service();
        let result = catalog.category_pages("nonexistent").await.unwrap();
        assert_eq!(result, CategoryPages::not_found());
    }

    #[tokio::test]
    async fn page_and_category_derivers_agree_on_counts() {
        let catalog = service(MemoryStore::with_keys(&[
            "Animals/cover.jpg",
            "Animals/lion.jpg",
            "Animals/tiger-page-2.pdf",
            "Birds/category.png",
            "Birds/eagle.png",
            "Birds/owl_and_moon.jpg",
        ]));

        let categories = catalog.categories().await.unwrap();
        let mut total = 0;
        for category in &categories {
            let result = catalog.category_pages(&category.slug).await.unwrap();
            assert_eq!(result.pages.len(), category.page_count);
            total += category.page_count;
        }
        assert_eq!(catalog.all_pages().await.unwrap().len(), total);
    }

    #[tokio::test]
    async fn full_index_concatenates_in_catalog_order() {
        let catalog = sample_service();
        let pages = catalog.all_pages().await.unwrap();
        let slugs: Vec<&str> = pages.iter().map(|p| p.category_slug.as_str()).collect();
        assert_eq!(slugs, vec!["animals", "animals", "birds"]);
    }

    #[tokio::test]
    async fn empty_query_returns_full_index() {
        let catalog = sample_service();
        assert_eq!(
            catalog.search("").await.unwrap(),
            catalog.all_pages().await.unwrap()
        );
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_page_and_category_names() {
        let catalog = sample_service();

        let hits = catalog.search("tiger").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Tiger");
        assert_eq!(hits[0].category, "Animals");
        assert_eq!(hits, catalog.search("TIGER").await.unwrap());

        // Category-name matches pull in the whole category.
        assert_eq!(catalog.search("birds").await.unwrap().len(), 1);
        assert!(catalog.search("zebra").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn derivation_is_idempotent_against_unchanged_store() {
        let catalog = sample_service();
        assert_eq!(
            catalog.categories().await.unwrap(),
            catalog.categories().await.unwrap()
        );
        assert_eq!(
            catalog.all_pages().await.unwrap(),
            catalog.all_pages().await.unwrap()
        );
    }

    #[tokio::test]
    async fn failing_sub_listing_drops_only_its_category() {
        let mut store = MemoryStore::with_keys(&[
            "Animals/lion.jpg",
            "Birds/eagle.pdf",
        ]);
        store.failing_prefixes = vec!["Birds/".to_string()];
        let catalog = service(store);

        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Animals");
    }

    #[tokio::test]
    async fn top_level_listing_failure_surfaces_as_error() {
        let store = MemoryStore {
            fail_top_level: true,
            ..MemoryStore::default()
        };
        assert!(service(store).categories().await.is_err());
    }

    #[tokio::test]
    async fn slug_collisions_keep_both_categories() {
        let catalog = service(MemoryStore::with_keys(&[
            "Wild Cats/lynx.jpg",
            "wild cats/puma.jpg",
        ]));
        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].slug, categories[1].slug);
    }
}
