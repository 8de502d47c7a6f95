use chrono::Utc;

use super::{TokenGenerator, parse_token};
use crate::store::Store;
use crate::types::{Token, User};

#[derive(Debug, PartialEq, Eq)]
pub enum TokenValidationError {
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    InactiveUser,
    InternalError,
}

pub struct ValidatedToken {
    pub token: Token,
    pub user: User,
}

/// Validates a raw token string against the store.
/// Returns the validated token and the active user it belongs to.
pub fn validate_token(
    store: &dyn Store,
    raw_token: &str,
) -> Result<ValidatedToken, TokenValidationError> {
    let lookup = parse_token(raw_token).map_err(|_| TokenValidationError::InvalidToken)?;

    let token = store
        .get_token_by_lookup(lookup)
        .map_err(|_| TokenValidationError::InternalError)?
        .ok_or(TokenValidationError::InvalidToken)?;

    let generator = TokenGenerator::new();
    if !generator
        .verify(raw_token, &token.token_hash)
        .map_err(|_| TokenValidationError::InternalError)?
    {
        return Err(TokenValidationError::InvalidToken);
    }

    if let Some(expires_at) = &token.expires_at {
        if expires_at < &Utc::now() {
            return Err(TokenValidationError::TokenExpired);
        }
    }

    let user = store
        .get_user(token.user_id)
        .map_err(|_| TokenValidationError::InternalError)?
        .ok_or(TokenValidationError::InvalidToken)?;

    if !user.is_active {
        return Err(TokenValidationError::InactiveUser);
    }

    if let Err(e) = store.update_token_last_used(&token.id) {
        tracing::warn!("Failed to update token last_used_at: {e}");
    }

    Ok(ValidatedToken { token, user })
}

/// Extracts token from Authorization header (`Bearer` or `Token` scheme).
/// Returns None if no auth header is present.
/// Returns Err if the auth scheme is unsupported.
pub fn extract_token_from_header(
    auth_header: Option<&str>,
) -> Result<Option<String>, TokenValidationError> {
    let Some(header) = auth_header else {
        return Ok(None);
    };

    let (scheme, value) = header
        .trim()
        .split_once(' ')
        .ok_or(TokenValidationError::InvalidScheme)?;

    if !scheme.eq_ignore_ascii_case("bearer") && !scheme.eq_ignore_ascii_case("token") {
        return Err(TokenValidationError::InvalidScheme);
    }

    let value = value.trim();
    if value.is_empty() {
        return Err(TokenValidationError::InvalidToken);
    }
    Ok(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issue_token;
    use crate::store::SqliteStore;
    use crate::store::test_support::seed_user;
    use tempfile::TempDir;

    #[test]
    fn test_extract_schemes() {
        assert_eq!(extract_token_from_header(None), Ok(None));
        assert_eq!(
            extract_token_from_header(Some("Bearer abc")),
            Ok(Some("abc".to_string()))
        );
        assert_eq!(
            extract_token_from_header(Some("Token abc")),
            Ok(Some("abc".to_string()))
        );
        assert_eq!(
            extract_token_from_header(Some("Basic abc")),
            Err(TokenValidationError::InvalidScheme)
        );
        assert_eq!(
            extract_token_from_header(Some("Bearer ")),
            Err(TokenValidationError::InvalidScheme)
        );
    }

    #[test]
    fn test_validate_token() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        let owner = seed_user(&store, "owner@example.com");

        let raw = issue_token(&store, owner, None).unwrap();
        let validated = validate_token(&store, &raw).unwrap();
        assert_eq!(validated.user.id, owner);

        assert_eq!(
            validate_token(&store, "heritage_00000000_00000000000000000000000000000000").err(),
            Some(TokenValidationError::InvalidToken)
        );
        assert_eq!(
            validate_token(&store, "garbage").err(),
            Some(TokenValidationError::InvalidToken)
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        let owner = seed_user(&store, "owner@example.com");

        let raw = issue_token(&store, owner, Some(chrono::Duration::seconds(-1))).unwrap();
        assert_eq!(
            validate_token(&store, &raw).err(),
            Some(TokenValidationError::TokenExpired)
        );
    }
}
