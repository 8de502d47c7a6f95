use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireUser;
use crate::error::Result as StoreResult;
use crate::media::{ImageKind, MediaKind};
use crate::server::AppState;
use crate::server::dto::{ArtifactDetail, ArtifactSummary};
use crate::server::payload::{Payload, ResourceId};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{Fields, NAME_MAX_LEN, require};
use crate::store::Store;
use crate::types::Artifact;

use super::{
    UPLOADED_IMAGES, image_paths, list_images, persist_or_discard, resolve_link,
    store_uploads, validate_uploads,
};

fn merge_fields(artifact: &mut Artifact, fields: &Fields) -> StoreResult<()> {
    if let Some(name) = fields.text("artifact_name", Some(NAME_MAX_LEN), false)? {
        artifact.artifact_name = name;
    }
    if let Some(artifact_type) = fields.text("artifact_type", Some(NAME_MAX_LEN), true)? {
        artifact.artifact_type = artifact_type;
    }
    if let Some(description) = fields.text("description", None, true)? {
        artifact.description = description;
    }
    if let Some(significance) = fields.nullable_number("historical_significance")? {
        artifact.historical_significance = significance;
    }
    if let Some(significance) = fields.nullable_number("cultural_significance")? {
        artifact.cultural_significance = significance;
    }
    Ok(())
}

fn merge_links(
    artifact: &mut Artifact,
    fields: &Fields,
    store: &dyn Store,
    owner: i64,
) -> Result<(), ApiError> {
    if let Some(ethnic_group) = fields.nullable_integer("ethnic_group")? {
        artifact.ethnic_group_id =
            resolve_link(ethnic_group, "ethnic_group", |id| store.get_ethnic_group(id, owner))?;
    }
    if let Some(culture) = fields.nullable_integer("culture")? {
        artifact.culture_id =
            resolve_link(culture, "culture", |id| store.get_culture(id, owner))?;
    }
    if let Some(site) = fields.nullable_integer("site")? {
        artifact.site_id = resolve_link(site, "site", |id| store.get_site(id, owner))?;
    }
    Ok(())
}

pub async fn list_artifacts(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let artifacts = state
        .store
        .list_artifacts(auth.user.id)
        .api_err("Failed to list artifacts")?;

    let data: Vec<ArtifactSummary> = artifacts.iter().map(ArtifactSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(data)))
}

pub async fn create_artifact(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;
    let fields = &payload.fields;

    let mut artifact = Artifact {
        id: 0,
        user_id: Some(owner),
        ethnic_group_id: None,
        culture_id: None,
        site_id: None,
        artifact_name: require(
            fields.text("artifact_name", Some(NAME_MAX_LEN), false)?,
            "artifact_name",
        )?,
        artifact_type: String::new(),
        description: String::new(),
        historical_significance: None,
        cultural_significance: None,
    };
    merge_fields(&mut artifact, fields)?;
    merge_links(&mut artifact, fields, store, owner)?;

    let uploads = validate_uploads(&payload, UPLOADED_IMAGES, state.config.max_upload_bytes)?;
    let stored = store_uploads(&state, MediaKind::Artifact, &uploads).await?;

    let write = store.create_artifact(&artifact, &stored);
    artifact.id = persist_or_discard(&state, &stored, write, "Failed to create artifact").await?;

    let images = list_images(&state, ImageKind::Artifact, artifact.id)?;

    tracing::info!("Created artifact {} for user {}", artifact.id, owner);

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(ArtifactDetail::new(&artifact, images))),
    ))
}

pub async fn get_artifact(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let artifact = state
        .store
        .get_artifact(id, auth.user.id)
        .api_err("Failed to get artifact")?
        .or_not_found("Artifact not found")?;

    let images = list_images(&state, ImageKind::Artifact, artifact.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(ArtifactDetail::new(
        &artifact, images,
    ))))
}

pub async fn update_artifact(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let mut artifact = store
        .get_artifact(id, owner)
        .api_err("Failed to get artifact")?
        .or_not_found("Artifact not found")?;

    merge_fields(&mut artifact, &payload.fields)?;
    merge_links(&mut artifact, &payload.fields, store, owner)?;
    let uploads = validate_uploads(&payload, UPLOADED_IMAGES, state.config.max_upload_bytes)?;

    let stored = store_uploads(&state, MediaKind::Artifact, &uploads).await?;
    let write = store.update_artifact(&artifact, &stored);
    persist_or_discard(&state, &stored, write, "Failed to update artifact").await?;

    let images = list_images(&state, ImageKind::Artifact, artifact.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(ArtifactDetail::new(
        &artifact, images,
    ))))
}

pub async fn delete_artifact(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let artifact = store
        .get_artifact(id, owner)
        .api_err("Failed to get artifact")?
        .or_not_found("Artifact not found")?;
    let images = list_images(&state, ImageKind::Artifact, artifact.id)?;

    if !store
        .delete_artifact(id, owner)
        .api_err("Failed to delete artifact")?
    {
        return Err(ApiError::not_found("Artifact not found"));
    }

    state.media.remove_all(&image_paths(&images)).await;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
