use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use crate::auth::RequireUser;
use crate::media::{MediaKind, ValidatedUpload, validate_document};
use crate::server::AppState;
use crate::server::dto::{PublisherDetail, PublisherSummary};
use crate::server::payload::{Payload, ResourceId};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::require;
use crate::types::Publisher;

use super::{persist_or_discard, store_uploads};

const DOCUMENT: &str = "document";

fn validate_optional_document(
    payload: &Payload,
    max_bytes: usize,
) -> Result<Option<ValidatedUpload>, ApiError> {
    payload
        .file(DOCUMENT)
        .map(|upload| validate_document(upload, DOCUMENT, max_bytes).map_err(ApiError::from))
        .transpose()
}

pub async fn list_publishers(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let publishers = state
        .store
        .list_publishers(auth.user.id)
        .api_err("Failed to list documents")?;

    let data: Vec<PublisherSummary> = publishers.iter().map(PublisherSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(data)))
}

pub async fn create_publisher(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;
    let fields = &payload.fields;

    let document_type = require(fields.choice("document_type")?, "document_type")?;
    let is_published = fields.boolean("is_published")?.unwrap_or(false);
    let document = validate_optional_document(&payload, state.config.max_upload_bytes)?
        .ok_or_else(|| ApiError::validation(DOCUMENT, "No file was submitted."))?;

    let stored = store_uploads(&state, MediaKind::Document, std::slice::from_ref(&document)).await?;
    let Some(path) = stored.first().cloned() else {
        return Err(ApiError::internal("Failed to store uploaded files"));
    };

    let mut publisher = Publisher {
        id: 0,
        user_id: Some(owner),
        document: path,
        document_type,
        is_published,
        created_at: Utc::now(),
    };

    let write = store.create_publisher(&publisher);
    publisher.id = persist_or_discard(&state, &stored, write, "Failed to create document").await?;

    tracing::info!("Created document {} for user {}", publisher.id, owner);

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(PublisherDetail::from(&publisher))),
    ))
}

pub async fn get_publisher(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let publisher = state
        .store
        .get_publisher(id, auth.user.id)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(PublisherDetail::from(&publisher))))
}

/// Updates `document_type` / `is_published`, and replaces the file when a new
/// `document` part is sent.
pub async fn update_publisher(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let fields = &payload.fields;

    let mut publisher = store
        .get_publisher(id, auth.user.id)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    if let Some(document_type) = fields.choice("document_type")? {
        publisher.document_type = document_type;
    }
    if let Some(is_published) = fields.boolean("is_published")? {
        publisher.is_published = is_published;
    }
    let document = validate_optional_document(&payload, state.config.max_upload_bytes)?;

    let stored = store_uploads(&state, MediaKind::Document, document.as_slice()).await?;
    let previous_document = stored
        .first()
        .map(|path| std::mem::replace(&mut publisher.document, path.clone()));

    let write = store.update_publisher(&publisher);
    persist_or_discard(&state, &stored, write, "Failed to update document").await?;

    if let Some(previous) = previous_document {
        state.media.remove_all(&[previous]).await;
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(PublisherDetail::from(&publisher))))
}

pub async fn delete_publisher(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let publisher = store
        .get_publisher(id, owner)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    if !store
        .delete_publisher(id, owner)
        .api_err("Failed to delete document")?
    {
        return Err(ApiError::not_found("Document not found"));
    }

    state.media.remove_all(&[publisher.document]).await;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
