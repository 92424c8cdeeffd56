//! Defines routes for the catalog API and raw object access.
//!
//! ## Structure
//! - **Catalog endpoints** (read-only, derived fresh per request)
//!   - `GET /api/categories`       — ordered category list
//!   - `GET /api/category/{slug}`  — one category's ordered pages
//!   - `GET /api/pages`            — flat index across all categories
//!   - `GET /api/search?q=`        — substring filter over the index
//!
//! - **Object endpoints**
//!   - `GET /api/download/{*key}`  — stream payload as attachment
//!   - `PUT /api/objects/{*key}`   — streamed ingest
//!
//! The wildcard `*key` allows nested keys like `Animals/cute-lion.jpg`.

use crate::{
    catalog::CatalogService,
    handlers::{
        catalog_handlers::{get_category_pages, list_all_pages, list_categories, search_pages},
        health_handlers::{healthz, readyz},
        object_handlers::{download_object, ingest_object},
    },
    store::SqliteStore,
};
use axum::{
    Router,
    routing::{get, put},
};

/// Build and return the router for all catalog and object routes.
///
/// The router carries shared state (`CatalogService`) to all handlers.
pub fn routes() -> Router<CatalogService<SqliteStore>> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // catalog endpoints
        .route("/api/categories", get(list_categories))
        .route("/api/category/{slug}", get(get_category_pages))
        .route("/api/pages", get(list_all_pages))
        .route("/api/search", get(search_pages))
        // object endpoints
        .route("/api/download/{*key}", get(download_object))
        .route("/api/objects/{*key}", put(ingest_object))
}
