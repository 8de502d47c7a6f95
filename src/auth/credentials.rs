use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::TokenGenerator;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Token, User};

pub const MIN_PASSWORD_LEN: usize = 5;
const MAX_TOKEN_ATTEMPTS: u32 = 3;

/// Lowercases the domain part of an email address and checks its shape.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim();
    let (local, domain) = email
        .rsplit_once('@')
        .filter(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .ok_or_else(|| Error::validation("email", "Enter a valid email address."))?;

    if email.chars().any(char::is_whitespace) {
        return Err(Error::validation("email", "Enter a valid email address."));
    }

    Ok(format!("{local}@{}", domain.to_lowercase()))
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(
            "password",
            format!("Ensure this field has at least {MIN_PASSWORD_LEN} characters."),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Hash(format!("failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| Error::Hash(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Hash(format!("failed to verify password: {e}"))),
    }
}

/// Resolves email and password to an active user.
///
/// Every failure comes back as `Unauthorized`, whatever the cause.
pub fn authenticate(store: &dyn Store, email: &str, password: &str) -> Result<User> {
    let email = normalize_email(email).map_err(|_| Error::Unauthorized)?;
    let user = store.get_user_by_email(&email)?.ok_or(Error::Unauthorized)?;

    if !user.is_active || !verify_password(password, &user.password_hash)? {
        return Err(Error::Unauthorized);
    }
    Ok(user)
}

/// Creates a token for `user_id` and returns the raw value. Only its hash is stored.
pub fn issue_token(store: &dyn Store, user_id: i64, ttl: Option<Duration>) -> Result<String> {
    let generator = TokenGenerator::new();

    for _ in 0..MAX_TOKEN_ATTEMPTS {
        let issued = generator.generate()?;

        let now = Utc::now();
        let token = Token {
            id: Uuid::new_v4().to_string(),
            token_hash: issued.hash,
            token_lookup: issued.lookup,
            user_id,
            created_at: now,
            expires_at: ttl.map(|ttl| now + ttl),
            last_used_at: None,
        };

        match store.create_token(&token) {
            Ok(()) => return Ok(issued.raw),
            Err(Error::TokenLookupCollision) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(Error::TokenLookupCollision)
}
