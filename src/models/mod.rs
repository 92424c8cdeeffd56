//! Data models for the catalog service.
//!
//! `object` holds the raw record supplied by the backing store; `catalog`
//! holds the derived, per-request view models (categories and pages). The
//! view models serialize as camelCase JSON for the query-facing API.

pub mod catalog;
pub mod object;
