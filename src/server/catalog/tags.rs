use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::TagResponse;
use crate::server::payload::{Payload, ResourceId};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::parse_flag;
use crate::tagging::{TagKind, validate_tag_name};

#[derive(Debug, Default, Deserialize)]
pub struct TagListParams {
    pub assigned_only: Option<String>,
}

async fn list_tags(
    owner: i64,
    state: &AppState,
    kind: TagKind,
    params: &TagListParams,
) -> Result<Json<ApiResponse<Vec<TagResponse>>>, ApiError> {
    let assigned_only = parse_flag(params.assigned_only.as_deref(), "assigned_only")?;

    let tags = state
        .store
        .list_tags(owner, kind, assigned_only)
        .api_err("Failed to list tags")?;

    let data = tags.into_iter().map(TagResponse::from).collect();
    Ok(Json(ApiResponse::success(data)))
}

pub async fn list_ethnic_group_tags(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<TagListParams>,
) -> impl IntoResponse {
    list_tags(auth.user.id, &state, TagKind::EthnicGroup, &params).await
}

pub async fn list_culture_tags(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<TagListParams>,
) -> impl IntoResponse {
    list_tags(auth.user.id, &state, TagKind::Culture, &params).await
}

/// Renames a tag. The tag is shared, so the new name shows up on every entity
/// carrying it.
pub async fn update_tag(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut tag = store
        .get_tag(id, auth.user.id)
        .api_err("Failed to get tag")?
        .or_not_found("Tag not found")?;

    // PATCH without a name leaves the tag as is
    if let Some(name) = payload.fields.text("name", None, true)? {
        tag.name = validate_tag_name(&name, "name")?;
        store.update_tag(&tag).api_err("Failed to update tag")?;
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(TagResponse::from(tag))))
}

pub async fn delete_tag(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    if !state
        .store
        .delete_tag(id, auth.user.id)
        .api_err("Failed to delete tag")?
    {
        return Err(ApiError::not_found("Tag not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
