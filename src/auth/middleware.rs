use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::helpers::{TokenValidationError, extract_token_from_header, validate_token};
use crate::server::AppState;
use crate::server::response::ApiError;
use crate::types::{Token, User};

/// Extractor for endpoints that act on behalf of a signed-in account.
///
/// Every catalogue and profile handler takes this first, so an unauthenticated
/// request is rejected with 401 before its body or path is looked at.
pub struct RequireUser {
    pub token: Token,
    pub user: User,
}

impl From<TokenValidationError> for ApiError {
    fn from(e: TokenValidationError) -> Self {
        match e {
            TokenValidationError::InvalidScheme => {
                ApiError::unauthorized("Invalid authorization scheme.")
            }
            TokenValidationError::InvalidToken => ApiError::unauthorized("Invalid token."),
            TokenValidationError::TokenExpired => ApiError::unauthorized("Token expired."),
            TokenValidationError::InactiveUser => {
                ApiError::unauthorized("User inactive or deleted.")
            }
            TokenValidationError::InternalError => ApiError::internal("Internal server error"),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let raw = extract_token_from_header(header)?.ok_or_else(|| {
            ApiError::unauthorized("Authentication credentials were not provided.")
        })?;

        let validated = validate_token(state.store.as_ref(), &raw)?;
        Ok(RequireUser {
            token: validated.token,
            user: validated.user,
        })
    }
}
