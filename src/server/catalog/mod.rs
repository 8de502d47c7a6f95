mod artifacts;
mod chiefs;
mod cultures;
mod ethnic_groups;
mod events;
mod publisher;
mod sites;
mod tags;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use serde::Deserialize;

use crate::error::Result as StoreResult;
use crate::media::{ImageKind, ImageParent, MediaKind, Upload, ValidatedUpload, validate_image};
use crate::server::AppState;
use crate::server::payload::Payload;
use crate::server::response::{ApiError, StoreResultExt};
use crate::types::Image;

pub const UPLOADED_IMAGES: &str = "uploaded_images";
pub const IMAGE: &str = "image";

/// `?tags=1,2` filter on tag-bearing list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TagFilterParams {
    pub tags: Option<String>,
}

pub fn catalog_router() -> Router<Arc<AppState>> {
    Router::new()
        // Ethnic groups
        .route(
            "/ethnic_groups/",
            get(ethnic_groups::list_ethnic_groups).post(ethnic_groups::create_ethnic_group),
        )
        .route("/ethnic_groups/tags/", get(tags::list_ethnic_group_tags))
        .route(
            "/ethnic_groups/tags/{id}/",
            patch(tags::update_tag).delete(tags::delete_tag),
        )
        .route(
            "/ethnic_groups/{id}/",
            get(ethnic_groups::get_ethnic_group)
                .patch(ethnic_groups::update_ethnic_group)
                .delete(ethnic_groups::delete_ethnic_group),
        )
        .route(
            "/ethnic_groups/{id}/upload-image/",
            post(ethnic_groups::upload_image),
        )
        // Cultures
        .route(
            "/cultures/",
            get(cultures::list_cultures).post(cultures::create_culture),
        )
        .route("/cultures/tags/", get(tags::list_culture_tags))
        .route(
            "/cultures/tags/{id}/",
            patch(tags::update_tag).delete(tags::delete_tag),
        )
        .route(
            "/cultures/{id}/",
            get(cultures::get_culture)
                .patch(cultures::update_culture)
                .delete(cultures::delete_culture),
        )
        .route("/cultures/{id}/upload-image/", post(cultures::upload_image))
        // Chiefs
        .route(
            "/chiefs/",
            get(chiefs::list_chiefs).post(chiefs::create_chief),
        )
        .route(
            "/chiefs/{id}/",
            get(chiefs::get_chief)
                .patch(chiefs::update_chief)
                .delete(chiefs::delete_chief),
        )
        // Sites
        .route("/sites/", get(sites::list_sites).post(sites::create_site))
        .route(
            "/sites/{id}/",
            get(sites::get_site)
                .patch(sites::update_site)
                .delete(sites::delete_site),
        )
        // Artifacts
        .route(
            "/artifacts/",
            get(artifacts::list_artifacts).post(artifacts::create_artifact),
        )
        .route(
            "/artifacts/{id}/",
            get(artifacts::get_artifact)
                .patch(artifacts::update_artifact)
                .delete(artifacts::delete_artifact),
        )
        // Events
        .route("/events/", get(events::list_events).post(events::create_event))
        .route(
            "/events/{id}/",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        // Published documents
        .route(
            "/publisher/",
            get(publisher::list_publishers).post(publisher::create_publisher),
        )
        .route(
            "/publisher/{id}/",
            get(publisher::get_publisher)
                .patch(publisher::update_publisher)
                .delete(publisher::delete_publisher),
        )
}

/// Checks that a client-supplied foreign key names a row the requester owns.
fn resolve_link<T>(
    value: Option<i64>,
    field: &str,
    lookup: impl FnOnce(i64) -> StoreResult<Option<T>>,
) -> Result<Option<i64>, ApiError> {
    let Some(id) = value else {
        return Ok(None);
    };

    match lookup(id).api_err("Failed to resolve related record")? {
        Some(_) => Ok(Some(id)),
        None => Err(ApiError::validation(
            field,
            format!("Invalid pk \"{id}\" - object does not exist."),
        )),
    }
}

/// Validates every upload in `field` before anything is written.
fn validate_uploads(
    payload: &Payload,
    field: &str,
    max_bytes: usize,
) -> Result<Vec<ValidatedUpload>, ApiError> {
    payload
        .files_named(field)
        .map(|upload| validate_image(upload, field, max_bytes).map_err(ApiError::from))
        .collect()
}

/// Validates the single image in `field`, which must be present.
fn validate_single_image(
    payload: &Payload,
    field: &str,
    max_bytes: usize,
) -> Result<ValidatedUpload, ApiError> {
    let upload: &Upload = payload
        .file(field)
        .ok_or_else(|| ApiError::validation(field, "No file was submitted."))?;
    validate_image(upload, field, max_bytes).map_err(ApiError::from)
}

/// Validates the `image` part when one was sent.
fn validate_optional_image(
    payload: &Payload,
    max_bytes: usize,
) -> Result<Option<ValidatedUpload>, ApiError> {
    payload
        .file(IMAGE)
        .map(|upload| validate_image(upload, IMAGE, max_bytes).map_err(ApiError::from))
        .transpose()
}

/// Writes a validated batch to storage. On failure nothing is left behind.
async fn store_uploads(
    state: &AppState,
    kind: MediaKind,
    uploads: &[ValidatedUpload],
) -> Result<Vec<String>, ApiError> {
    if uploads.is_empty() {
        return Ok(Vec::new());
    }
    state
        .media
        .put_all(kind, uploads)
        .await
        .api_err("Failed to store uploaded files")
}

/// Runs a store write that references freshly stored files, removing the files
/// again when the write fails.
async fn persist_or_discard<T>(
    state: &AppState,
    stored: &[String],
    write: StoreResult<T>,
    message: &'static str,
) -> Result<T, ApiError> {
    match write {
        Ok(value) => Ok(value),
        Err(e) => {
            state.media.remove_all(stored).await;
            Err(ApiError::from_store(e, message))
        }
    }
}

fn image_paths(images: &[Image]) -> Vec<String> {
    images.iter().map(|i| i.image.clone()).collect()
}

fn list_images(state: &AppState, kind: ImageKind, id: i64) -> Result<Vec<Image>, ApiError> {
    state
        .store
        .list_images(ImageParent::new(kind, id))
        .api_err("Failed to list images")
}
