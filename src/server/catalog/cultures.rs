use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::media::{MediaKind, public_url};
use crate::server::AppState;
use crate::server::dto::{CultureDetail, CultureSummary, ImageResponse};
use crate::server::payload::{Payload, ResourceId};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{NAME_MAX_LEN, parse_id_list, require};
use crate::store::Store;
use crate::tagging::{TagKind, TagTarget, normalize_descriptors};
use crate::types::Culture;

use super::{
    IMAGE, TagFilterParams, persist_or_discard, resolve_link, store_uploads,
    validate_optional_image, validate_single_image,
};

fn target(id: i64) -> TagTarget {
    TagTarget::new(TagKind::Culture, id)
}

fn resolve_ethnic_group(
    store: &dyn Store,
    owner: i64,
    value: Option<i64>,
) -> Result<Option<i64>, ApiError> {
    resolve_link(value, "ethnic_group", |id| store.get_ethnic_group(id, owner))
}

pub async fn list_cultures(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<TagFilterParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let tag_ids = match params.tags.as_deref() {
        Some(raw) => parse_id_list(raw, "tags")?,
        None => Vec::new(),
    };

    let cultures = store
        .list_cultures(owner, &tag_ids)
        .api_err("Failed to list cultures")?;

    let mut data = Vec::with_capacity(cultures.len());
    for culture in &cultures {
        let tags = store
            .list_target_tags(target(culture.id))
            .api_err("Failed to list tags")?;
        data.push(CultureSummary::new(culture, tags));
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(data)))
}

pub async fn create_culture(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;
    let fields = &payload.fields;

    let name = require(fields.text("name", Some(NAME_MAX_LEN), false)?, "name")?;
    let description = require(fields.text("description", None, false)?, "description")?;
    let ethnic_group = fields.nullable_integer("ethnic_group")?.flatten();
    let ethnic_group_id = resolve_ethnic_group(store, owner, ethnic_group)?;

    let tag_names = normalize_descriptors(&fields.tags("tags")?.unwrap_or_default())?;
    let image = validate_optional_image(&payload, state.config.max_upload_bytes)?;

    let stored = store_uploads(&state, MediaKind::Culture, image.as_slice()).await?;

    let mut culture = Culture {
        id: 0,
        user_id: Some(owner),
        ethnic_group_id,
        name,
        description,
        image: stored.first().cloned(),
    };

    let write = store.create_culture(&culture, &tag_names);
    culture.id = persist_or_discard(&state, &stored, write, "Failed to create culture").await?;

    let tags = store
        .list_target_tags(target(culture.id))
        .api_err("Failed to list tags")?;

    tracing::info!("Created culture {} for user {}", culture.id, owner);

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(CultureDetail::new(&culture, tags))),
    ))
}

pub async fn get_culture(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let culture = store
        .get_culture(id, auth.user.id)
        .api_err("Failed to get culture")?
        .or_not_found("Culture not found")?;

    let tags = store
        .list_target_tags(target(culture.id))
        .api_err("Failed to list tags")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(CultureDetail::new(&culture, tags))))
}

pub async fn update_culture(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;
    let fields = &payload.fields;

    let mut culture = store
        .get_culture(id, owner)
        .api_err("Failed to get culture")?
        .or_not_found("Culture not found")?;

    if let Some(name) = fields.text("name", Some(NAME_MAX_LEN), false)? {
        culture.name = name;
    }
    if let Some(description) = fields.text("description", None, false)? {
        culture.description = description;
    }
    if let Some(ethnic_group) = fields.nullable_integer("ethnic_group")? {
        culture.ethnic_group_id = resolve_ethnic_group(store, owner, ethnic_group)?;
    }

    let tag_names = fields
        .tags("tags")?
        .map(|descriptors| normalize_descriptors(&descriptors))
        .transpose()?;
    let image = validate_optional_image(&payload, state.config.max_upload_bytes)?;

    let stored = store_uploads(&state, MediaKind::Culture, image.as_slice()).await?;
    let previous_image = match stored.first() {
        Some(path) => culture.image.replace(path.clone()),
        None => None,
    };

    let write = store.update_culture(&culture, tag_names.as_deref());
    persist_or_discard(&state, &stored, write, "Failed to update culture").await?;

    if let Some(previous) = previous_image {
        state.media.remove_all(&[previous]).await;
    }

    let tags = store
        .list_target_tags(target(culture.id))
        .api_err("Failed to list tags")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(CultureDetail::new(&culture, tags))))
}

pub async fn delete_culture(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let culture = store
        .get_culture(id, owner)
        .api_err("Failed to get culture")?
        .or_not_found("Culture not found")?;

    if !store
        .delete_culture(id, owner)
        .api_err("Failed to delete culture")?
    {
        return Err(ApiError::not_found("Culture not found"));
    }

    if let Some(image) = culture.image {
        state.media.remove_all(&[image]).await;
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn upload_image(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut culture = store
        .get_culture(id, auth.user.id)
        .api_err("Failed to get culture")?
        .or_not_found("Culture not found")?;

    let upload = validate_single_image(&payload, IMAGE, state.config.max_upload_bytes)?;
    let stored = store_uploads(&state, MediaKind::Culture, std::slice::from_ref(&upload)).await?;

    let previous_image = culture.image.take();
    culture.image = stored.first().cloned();

    let write = store.update_culture(&culture, None);
    persist_or_discard(&state, &stored, write, "Failed to save image").await?;

    if let Some(previous) = previous_image {
        state.media.remove_all(&[previous]).await;
    }

    let image = culture.image.as_deref().map(public_url).unwrap_or_default();
    Ok::<_, ApiError>(Json(ApiResponse::success(ImageResponse {
        id: culture.id,
        image,
    })))
}
