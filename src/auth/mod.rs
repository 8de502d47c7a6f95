mod credentials;
mod helpers;
mod middleware;
mod token;

pub use credentials::{
    MIN_PASSWORD_LEN, authenticate, hash_password, issue_token, normalize_email,
    validate_password, verify_password,
};
pub use helpers::{TokenValidationError, ValidatedToken, extract_token_from_header, validate_token};
pub use middleware::RequireUser;
pub use token::{IssuedToken, TokenGenerator, parse_token};
