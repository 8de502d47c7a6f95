use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use crate::auth::{
    RequireUser, authenticate, hash_password, issue_token, normalize_email, validate_password,
};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{TokenResponse, UserResponse};
use crate::server::payload::Payload;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::require;
use crate::types::User;

const USER_NAME_MAX_LEN: usize = 255;

pub fn account_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/create/", post(create_user))
        .route("/user/token/", post(obtain_token))
        .route(
            "/user/profile/",
            get(get_profile).patch(update_profile).post(profile_method_not_allowed),
        )
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let fields = &payload.fields;

    let email = normalize_email(&require(fields.text("email", None, false)?, "email")?)?;
    let password = require(fields.text("password", None, false)?, "password")?;
    validate_password(&password)?;
    let name = require(
        fields.text("name", Some(USER_NAME_MAX_LEN), false)?,
        "name",
    )?;

    let mut user = User {
        id: 0,
        email,
        name,
        password_hash: hash_password(&password)?,
        is_active: true,
        is_staff: false,
        created_at: Utc::now(),
    };
    user.id = state
        .store
        .create_user(&user)
        .api_err("Failed to create user")?;

    tracing::info!("Registered user {}", user.id);

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserResponse::from(&user))),
    ))
}

/// Exchanges email and password for a fresh token.
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let fields = &payload.fields;

    let email = require(fields.text("email", None, false)?, "email")?;
    let password = require(fields.text("password", None, false)?, "password")?;

    let user = match authenticate(store, &email, &password) {
        Ok(user) => user,
        Err(Error::Unauthorized) => {
            return Err(ApiError::validation(
                "non_field_errors",
                "Unable to authenticate with provided credentials.",
            ));
        }
        Err(e) => return Err(ApiError::from_store(e, "Failed to authenticate")),
    };

    let token = issue_token(store, user.id, state.config.token_ttl())
        .api_err("Failed to create token")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(TokenResponse { token })))
}

pub async fn get_profile(auth: RequireUser) -> impl IntoResponse {
    Json(ApiResponse::success(UserResponse::from(&auth.user)))
}

/// Updates `name` and/or `password`. Email is fixed after registration.
pub async fn update_profile(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    payload: Payload,
) -> impl IntoResponse {
    let fields = &payload.fields;
    let mut user = auth.user;

    if let Some(name) = fields.text("name", Some(USER_NAME_MAX_LEN), false)? {
        user.name = name;
    }
    if let Some(password) = fields.text("password", None, false)? {
        validate_password(&password)?;
        user.password_hash = hash_password(&password)?;
    }

    state
        .store
        .update_user(&user)
        .api_err("Failed to update user")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(UserResponse::from(&user))))
}

async fn profile_method_not_allowed(_auth: RequireUser) -> ApiError {
    ApiError::method_not_allowed(Method::POST.as_str())
}
