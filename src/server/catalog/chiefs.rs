use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireUser;
use crate::error::Result as StoreResult;
use crate::server::AppState;
use crate::server::dto::{ChiefDetail, ChiefSummary};
use crate::server::payload::{Payload, ResourceId};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{Fields, NAME_MAX_LEN, require};
use crate::types::Chief;

use super::resolve_link;

/// Applies the supplied plain fields over `chief`. Links are resolved separately.
fn merge_fields(chief: &mut Chief, fields: &Fields) -> StoreResult<()> {
    if let Some(name) = fields.text("name", Some(NAME_MAX_LEN), false)? {
        chief.name = name;
    }
    if let Some(chief_type) = fields.nullable_choice("type")? {
        chief.chief_type = chief_type;
    }
    if let Some(date_of_birth) = fields.nullable_date("date_of_birth")? {
        chief.date_of_birth = date_of_birth;
    }
    if let Some(date_of_appointment) = fields.nullable_date("date_of_appointment")? {
        chief.date_of_appointment = date_of_appointment;
    }
    if let Some(is_current) = fields.boolean("is_current")? {
        chief.is_current = is_current;
    }
    if let Some(bio) = fields.text("bio", None, true)? {
        chief.bio = bio;
    }
    Ok(())
}

pub async fn list_chiefs(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let chiefs = state
        .store
        .list_chiefs(auth.user.id)
        .api_err("Failed to list chiefs")?;

    let data: Vec<ChiefSummary> = chiefs.iter().map(ChiefSummary::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(data)))
}

pub async fn create_chief(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;
    let fields = &payload.fields;

    let mut chief = Chief {
        id: 0,
        user_id: Some(owner),
        ethnic_group_id: None,
        name: require(fields.text("name", Some(NAME_MAX_LEN), false)?, "name")?,
        chief_type: None,
        date_of_birth: None,
        date_of_appointment: None,
        is_current: false,
        bio: String::new(),
    };
    merge_fields(&mut chief, fields)?;

    let ethnic_group = fields.nullable_integer("ethnic_group")?.flatten();
    chief.ethnic_group_id =
        resolve_link(ethnic_group, "ethnic_group", |id| store.get_ethnic_group(id, owner))?;

    chief.id = store.create_chief(&chief).api_err("Failed to create chief")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(ChiefDetail::from(&chief))),
    ))
}

pub async fn get_chief(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    let chief = state
        .store
        .get_chief(id, auth.user.id)
        .api_err("Failed to get chief")?
        .or_not_found("Chief not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(ChiefDetail::from(&chief))))
}

pub async fn update_chief(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let owner = auth.user.id;

    let mut chief = store
        .get_chief(id, owner)
        .api_err("Failed to get chief")?
        .or_not_found("Chief not found")?;

    merge_fields(&mut chief, &payload.fields)?;
    if let Some(ethnic_group) = payload.fields.nullable_integer("ethnic_group")? {
        chief.ethnic_group_id =
            resolve_link(ethnic_group, "ethnic_group", |id| store.get_ethnic_group(id, owner))?;
    }

    store.update_chief(&chief).api_err("Failed to update chief")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(ChiefDetail::from(&chief))))
}

pub async fn delete_chief(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> impl IntoResponse {
    if !state
        .store
        .delete_chief(id, auth.user.id)
        .api_err("Failed to delete chief")?
    {
        return Err(ApiError::not_found("Chief not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
