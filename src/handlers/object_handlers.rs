//! HTTP handlers for raw object access.
//! Streams payloads in both directions to avoid buffering in memory and
//! delegates storage concerns to `SqliteStore`.
//!
//! Unlike the catalog handlers, failures here propagate: there is no
//! meaningful empty substitute for a missing file.

use crate::{
    catalog::CatalogService,
    errors::AppError,
    store::{ObjectStore, SqliteStore},
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use std::io;
use tokio_util::io::ReaderStream;

/// GET `/api/download/{*key}` — stream one object back as an attachment.
pub async fn download_object(
    State(catalog): State<CatalogService<SqliteStore>>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let (record, reader) = catalog.store().get_object(&key).await?;

    let file_name = record.file_name().to_string();
    let content_type = record
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".into());

    let mut response = Response::new(Body::from_stream(ReaderStream::new(reader)));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&record.size_bytes.max(0).to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    headers.insert(
        header::LAST_MODIFIED,
        HeaderValue::from_str(&record.last_modified.to_rfc2822())
            .unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    if let Some(etag) = record.etag.as_deref() {
        if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", etag)) {
            headers.insert(header::ETAG, value);
        }
    }

    Ok(response)
}

/// PUT `/api/objects/{*key}` — streamed ingest of one object.
pub async fn ingest_object(
    State(catalog): State<CatalogService<SqliteStore>>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let stream = body
        .into_data_stream()
        .map(|chunk| chunk.map_err(io::Error::other));

    let record = catalog
        .store()
        .put_object_stream(&key, content_type, stream)
        .await?;

    let mut resp_headers = HeaderMap::new();
    if let Some(etag) = record.etag.as_deref() {
        if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", etag)) {
            resp_headers.insert(header::ETAG, value);
        }
    }

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    *response.headers_mut() = resp_headers;
    Ok(response)
}
