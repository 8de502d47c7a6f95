use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireUser;
use crate::error::Result as StoreResult;
use crate::media::{ImageKind, MediaKind};
use crate::server::AppState;
use crate::server::dto::{SiteDetail, SiteSummary};
use crate::server::payload::{Payload, ResourceId};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{Fields, NAME_MAX_LEN, check_range, require};
use crate::store::Store;
use crate::types::Site;

use super::{
    UPLOADED_IMAGES, image_paths, list_images, persist_or_discard, resolve_link,
    store_uploads, validate_uploads,
};

const RANK_MIN: i64 = 1;
const RANK_MAX: i64 = 5;

fn merge_fields(site: &mut Site, fields: &Fields) -> StoreResult<()> {
    if let Some(site_name) = fields.text("site_name", Some(NAME_MAX_LEN), false)? {
        site.site_name = site_name;
    }
    if let Some(site_type) = fields.choice("site_type")? {
        site.site_type = site_type;
    }
    if let Some(importance) = fields.integer("importance")? {
        site.importance = check_range(importance, "importance", RANK_MIN, RANK_MAX)?;
    }
    if let Some(sensitivity) = fields.integer("sensitivity")? {
        site.sensitivity = check_range(sensitivity, "sensitivity", RANK_MIN, RANK_MAX)?;
    }
    if let Some(latitude) = fields.nullable_number("latitude")? {
        site.latitude = latitude
            .map(|v| check_range(v, "latitude", -90.0, 90.0))
            .transpose()?;
    }
    if let Some(longitude) = fields.nullable_number("longitude")? {
        site.longitude = longitude
            .map(|v| check_range(v, "longitude", -180.0, 180.0))
            .transpose()?;
    }
    if let Some(description) = fields.text("description", None, true)? {
        site.description = description;
    }
    Ok(())
}

/// Resolves whichever of the `ethnic_group` / `culture` links were supplied.
fn merge_links(
    site: &mut Site,
    fields: &Fields,
    store: &dyn Store,
    owner: i64,
) -> Result<(), ApiError> {
    if let Some(ethnic_group) = fields.nullable_integer("ethnic_group")? {
        site.ethnic_group_id =
            resolve_link(ethnic_group, "ethnic_group", |id| store.get_ethnic_group(id, owner))?;
    }
    if let Some(culture) = fields.nullable_integer("culture")? {
        site.culture_id = resolve_link(culture, "culture", |id| store.get_culture(id, owner))?;
    }
    Ok(())
}

pub async fn list_sites(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let sites = state
        .store
        .list_sites(auth.user.id)
        .api_err("Failed to list sites")?;

    let data: Vec<SiteSummary> = sites.iter().map(SiteSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(data)))
}

pub async fn create_site(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;
    let fields = &payload.fields;

    let mut site = Site {
        id: 0,
        user_id: Some(owner),
        ethnic_group_id: None,
        culture_id: None,
        site_name: require(
            fields.text("site_name", Some(NAME_MAX_LEN), false)?,
            "site_name",
        )?,
        site_type: require(fields.choice("site_type")?, "site_type")?,
        importance: RANK_MIN,
        sensitivity: RANK_MIN,
        latitude: None,
        longitude: None,
        description: String::new(),
    };
    merge_fields(&mut site, fields)?;
    merge_links(&mut site, fields, store, owner)?;

    let uploads = validate_uploads(&payload, UPLOADED_IMAGES, state.config.max_upload_bytes)?;
    let stored = store_uploads(&state, MediaKind::Site, &uploads).await?;

    let write = store.create_site(&site, &stored);
    site.id = persist_or_discard(&state, &stored, write, "Failed to create site").await?;

    let images = list_images(&state, ImageKind::Site, site.id)?;

    tracing::info!(
        "Created site {} with {} image(s) for user {}",
        site.id,
        images.len(),
        owner
    );

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(SiteDetail::new(&site, images))),
    ))
}

pub async fn get_site(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let site = state
        .store
        .get_site(id, auth.user.id)
        .api_err("Failed to get site")?
        .or_not_found("Site not found")?;

    let images = list_images(&state, ImageKind::Site, site.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(SiteDetail::new(&site, images))))
}

/// Updates the supplied fields. Any `uploaded_images` are appended to the
/// existing gallery.
pub async fn update_site(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let mut site = store
        .get_site(id, owner)
        .api_err("Failed to get site")?
        .or_not_found("Site not found")?;

    merge_fields(&mut site, &payload.fields)?;
    merge_links(&mut site, &payload.fields, store, owner)?;
    let uploads = validate_uploads(&payload, UPLOADED_IMAGES, state.config.max_upload_bytes)?;

    let stored = store_uploads(&state, MediaKind::Site, &uploads).await?;
    let write = store.update_site(&site, &stored);
    persist_or_discard(&state, &stored, write, "Failed to update site").await?;

    let images = list_images(&state, ImageKind::Site, site.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(SiteDetail::new(&site, images))))
}

pub async fn delete_site(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let site = store
        .get_site(id, owner)
        .api_err("Failed to get site")?
        .or_not_found("Site not found")?;
    let images = list_images(&state, ImageKind::Site, site.id)?;

    if !store.delete_site(id, owner).api_err("Failed to delete site")? {
        return Err(ApiError::not_found("Site not found"));
    }

    state.media.remove_all(&image_paths(&images)).await;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
