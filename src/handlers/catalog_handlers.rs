//! HTTP handlers for the derived catalog.
//!
//! Derivation failures are swallowed here, at the query boundary: the
//! client gets an empty result and the failure lands in the log at `warn`.
//! An unknown category slug is the one outcome that must stay
//! distinguishable from a failed listing, so it maps to 404 instead.

use crate::{
    catalog::CatalogService,
    errors::AppError,
    models::catalog::{Category, CategoryPages, Page},
    store::SqliteStore,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET `/api/categories` — ordered category list.
pub async fn list_categories(
    State(catalog): State<CatalogService<SqliteStore>>,
) -> Json<Vec<Category>> {
    match catalog.categories().await {
        Ok(categories) => Json(categories),
        Err(err) => {
            tracing::warn!("category derivation failed, serving empty catalog: {}", err);
            Json(Vec::new())
        }
    }
}

/// GET `/api/category/{slug}` — one category with its ordered pages.
pub async fn get_category_pages(
    State(catalog): State<CatalogService<SqliteStore>>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryPages>, AppError> {
    match catalog.category_pages(&slug).await {
        Ok(CategoryPages { category: None, .. }) => {
            Err(AppError::not_found(format!("category `{}` not found", slug)))
        }
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            tracing::warn!(
                "page derivation for `{}` failed, serving empty result: {}",
                slug,
                err
            );
            Ok(Json(CategoryPages::not_found()))
        }
    }
}

/// GET `/api/pages` — flat index of every page across every category.
pub async fn list_all_pages(
    State(catalog): State<CatalogService<SqliteStore>>,
) -> Json<Vec<Page>> {
    match catalog.all_pages().await {
        Ok(pages) => Json(pages),
        Err(err) => {
            tracing::warn!("page index derivation failed, serving empty index: {}", err);
            Json(Vec::new())
        }
    }
}

/// GET `/api/search?q=` — substring filter over the flat index.
/// Missing or empty `q` returns the unfiltered index.
pub async fn search_pages(
    State(catalog): State<CatalogService<SqliteStore>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Page>> {
    let q = query.q.unwrap_or_default();
    match catalog.search(&q).await {
        Ok(pages) => Json(pages),
        Err(err) => {
            tracing::warn!("search for `{}` failed, serving empty result: {}", q, err);
            Json(Vec::new())
        }
    }
}
