use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::error::{Error, Result as StoreResult};
use crate::media::{MediaKind, public_url};
use crate::server::AppState;
use crate::server::dto::{EthnicGroupDetail, EthnicGroupSummary, ImageResponse};
use crate::server::payload::{Payload, ResourceId};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{
    Fields, GEOGRAPHY_MAX_LEN, NAME_MAX_LEN, parse_id_list, require,
};
use crate::tagging::{TagKind, TagTarget, normalize_descriptors};
use crate::types::EthnicGroup;

use super::{
    IMAGE, TagFilterParams, persist_or_discard, store_uploads, validate_optional_image,
    validate_single_image,
};

fn target(id: i64) -> TagTarget {
    TagTarget::new(TagKind::EthnicGroup, id)
}

fn check_population(population: i64) -> StoreResult<i64> {
    if population < 0 {
        return Err(Error::validation(
            "population",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    Ok(population)
}

/// Applies the supplied fields over `group`.
fn merge_fields(group: &mut EthnicGroup, fields: &Fields) -> StoreResult<()> {
    if let Some(name) = fields.text("name", Some(NAME_MAX_LEN), false)? {
        group.name = name;
    }
    if let Some(description) = fields.text("description", None, false)? {
        group.description = description;
    }
    if let Some(language) = fields.text("language", Some(NAME_MAX_LEN), false)? {
        group.language = language;
    }
    if let Some(population) = fields.integer("population")? {
        group.population = check_population(population)?;
    }
    if let Some(geography) = fields.text("geography", Some(GEOGRAPHY_MAX_LEN), false)? {
        group.geography = geography;
    }
    if let Some(history) = fields.text("history", None, false)? {
        group.history = history;
    }
    Ok(())
}

pub async fn list_ethnic_groups(
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

    let groups = store
        .list_ethnic_groups(owner, &tag_ids)
        .api_err("Failed to list ethnic groups")?;

    let mut data = Vec::with_capacity(groups.len());
    for group in &groups {
        let tags = store
            .list_target_tags(target(group.id))
            .api_err("Failed to list tags")?;
        data.push(EthnicGroupSummary::new(group, tags));
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(data)))
}

pub async fn create_ethnic_group(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;
    let fields = &payload.fields;

    let mut group = EthnicGroup {
        id: 0,
        user_id: owner,
        name: require(fields.text("name", Some(NAME_MAX_LEN), false)?, "name")?,
        description: require(fields.text("description", None, false)?, "description")?,
        language: require(fields.text("language", Some(NAME_MAX_LEN), false)?, "language")?,
        population: check_population(require(fields.integer("population")?, "population")?)?,
        geography: require(
            fields.text("geography", Some(GEOGRAPHY_MAX_LEN), false)?,
            "geography",
        )?,
        history: require(fields.text("history", None, false)?, "history")?,
        image: None,
    };

    let tag_names = normalize_descriptors(&fields.tags("tags")?.unwrap_or_default())?;
    let image = validate_optional_image(&payload, state.config.max_upload_bytes)?;

    let stored = store_uploads(&state, MediaKind::EthnicGroup, image.as_slice()).await?;
    group.image = stored.first().cloned();

    let write = store.create_ethnic_group(&group, &tag_names);
    group.id = persist_or_discard(&state, &stored, write, "Failed to create ethnic group").await?;

    let tags = store
        .list_target_tags(target(group.id))
        .api_err("Failed to list tags")?;

    tracing::info!("Created ethnic group {} for user {}", group.id, owner);

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(EthnicGroupDetail::new(&group, tags))),
    ))
}

pub async fn get_ethnic_group(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let group = store
        .get_ethnic_group(id, auth.user.id)
        .api_err("Failed to get ethnic group")?
        .or_not_found("Ethnic group not found")?;

    let tags = store
        .list_target_tags(target(group.id))
        .api_err("Failed to list tags")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(EthnicGroupDetail::new(&group, tags))))
}

pub async fn update_ethnic_group(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let mut group = store
        .get_ethnic_group(id, owner)
        .api_err("Failed to get ethnic group")?
        .or_not_found("Ethnic group not found")?;

    merge_fields(&mut group, &payload.fields)?;

    let tag_names = payload.fields
        .tags("tags")?
        .map(|descriptors| normalize_descriptors(&descriptors))
        .transpose()?;
    let image = validate_optional_image(&payload, state.config.max_upload_bytes)?;

    let stored = store_uploads(&state, MediaKind::EthnicGroup, image.as_slice()).await?;
    let previous_image = match stored.first() {
        Some(path) => group.image.replace(path.clone()),
        None => None,
    };

    let write = store.update_ethnic_group(&group, tag_names.as_deref());
    persist_or_discard(&state, &stored, write, "Failed to update ethnic group").await?;

    if let Some(previous) = previous_image {
        state.media.remove_all(&[previous]).await;
    }

    let tags = store
        .list_target_tags(target(group.id))
        .api_err("Failed to list tags")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(EthnicGroupDetail::new(&group, tags))))
}

pub async fn delete_ethnic_group(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let group = store
        .get_ethnic_group(id, owner)
        .api_err("Failed to get ethnic group")?
        .or_not_found("Ethnic group not found")?;

    if !store
        .delete_ethnic_group(id, owner)
        .api_err("Failed to delete ethnic group")?
    {
        return Err(ApiError::not_found("Ethnic group not found"));
    }

    if let Some(image) = group.image {
        state.media.remove_all(&[image]).await;
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// Sets the group's single image from the multipart `image` part.
pub async fn upload_image(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut group = store
        .get_ethnic_group(id, auth.user.id)
        .api_err("Failed to get ethnic group")?
        .or_not_found("Ethnic group not found")?;

    let upload = validate_single_image(&payload, IMAGE, state.config.max_upload_bytes)?;
    let stored = store_uploads(&state, MediaKind::EthnicGroup, std::slice::from_ref(&upload)).await?;

    let previous_image = group.image.take();
    group.image = stored.first().cloned();

    let write = store.update_ethnic_group(&group, None);
    persist_or_discard(&state, &stored, write, "Failed to save image").await?;

    if let Some(previous) = previous_image {
        state.media.remove_all(&[previous]).await;
    }

    let image = group.image.as_deref().map(public_url).unwrap_or_default();
    Ok::<_, ApiError>(Json(ApiResponse::success(ImageResponse { id: group.id, image })))
}
