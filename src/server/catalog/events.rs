use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireUser;
use crate::error::Result as StoreResult;
use crate::media::{ImageKind, MediaKind};
use crate::server::AppState;
use crate::server::dto::{EventDetail, EventSummary};
use crate::server::payload::{Payload, ResourceId};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{Fields, NAME_MAX_LEN, require};
use crate::types::Event;

use super::{
    UPLOADED_IMAGES, image_paths, list_images, persist_or_discard,
    store_uploads, validate_uploads,
};

fn merge_fields(event: &mut Event, fields: &Fields) -> StoreResult<()> {
    if let Some(name) = fields.text("name", Some(NAME_MAX_LEN), false)? {
        event.name = name;
    }
    if let Some(description) = fields.text("description", None, true)? {
        event.description = description;
    }
    if let Some(event_type) = fields.nullable_choice("event_type")? {
        event.event_type = event_type;
    }
    Ok(())
}

pub async fn list_events(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let events = state
        .store
        .list_events(auth.user.id)
        .api_err("Failed to list events")?;

    let data: Vec<EventSummary> = events.iter().map(EventSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(data)))
}

pub async fn create_event(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;
    let fields = &payload.fields;

    let mut event = Event {
        id: 0,
        user_id: Some(owner),
        name: require(fields.text("name", Some(NAME_MAX_LEN), false)?, "name")?,
        description: String::new(),
        event_type: None,
    };
    merge_fields(&mut event, fields)?;

    let uploads = validate_uploads(&payload, UPLOADED_IMAGES, state.config.max_upload_bytes)?;
    let stored = store_uploads(&state, MediaKind::Event, &uploads).await?;

    let write = store.create_event(&event, &stored);
    event.id = persist_or_discard(&state, &stored, write, "Failed to create event").await?;

    let images = list_images(&state, ImageKind::Event, event.id)?;

    tracing::info!("Created event {} for user {}", event.id, owner);

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(EventDetail::new(&event, images))),
    ))
}

pub async fn get_event(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let event = state
        .store
        .get_event(id, auth.user.id)
        .api_err("Failed to get event")?
        .or_not_found("Event not found")?;

    let images = list_images(&state, ImageKind::Event, event.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(EventDetail::new(&event, images))))
}

pub async fn update_event(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut event = store
        .get_event(id, auth.user.id)
        .api_err("Failed to get event")?
        .or_not_found("Event not found")?;

    merge_fields(&mut event, &payload.fields)?;
    let uploads = validate_uploads(&payload, UPLOADED_IMAGES, state.config.max_upload_bytes)?;

    let stored = store_uploads(&state, MediaKind::Event, &uploads).await?;
    let write = store.update_event(&event, &stored);
    persist_or_discard(&state, &stored, write, "Failed to update event").await?;

    let images = list_images(&state, ImageKind::Event, event.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(EventDetail::new(&event, images))))
}

pub async fn delete_event(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let event = store
        .get_event(id, owner)
        .api_err("Failed to get event")?
        .or_not_found("Event not found")?;
    let images = list_images(&state, ImageKind::Event, event.id)?;

    if !store.delete_event(id, owner).api_err("Failed to delete event")? {
        return Err(ApiError::not_found("Event not found"));
    }

    state.media.remove_all(&image_paths(&images)).await;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
