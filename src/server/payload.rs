use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use bytes::Bytes;
use serde_json::Value;

use super::response::ApiError;
use super::validation::Fields;
use crate::media::Upload;

/// Name of the multipart text part holding the entity fields as JSON.
pub const DATA_PART: &str = "data";

/// A request body read either as a JSON object or as `multipart/form-data`.
///
/// In multipart bodies the `data` part carries a JSON object; other text parts
/// become string fields and parts with a file name become uploads.
#[derive(Debug, Default)]
pub struct Payload {
    pub fields: Fields,
    pub files: Vec<Upload>,
}

impl Payload {
    pub fn files_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Upload> + 'a {
        self.files.iter().filter(move |f| f.field == name)
    }

    #[must_use]
    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.iter().find(|f| f.field == name)
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with("multipart/form-data"))
}

fn parse_json_object(raw: &[u8], field: &str) -> Result<Fields, ApiError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| ApiError::validation(field, format!("JSON parse error - {e}")))?;
    Fields::from_value(value).map_err(ApiError::from)
}

impl<S: Send + Sync> FromRequest<S> for Payload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError {
                    status: e.status(),
                    message: e.body_text(),
                    field: None,
                })?;

            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Payload::default());
            }
            return Ok(Payload {
                fields: parse_json_object(&body, "non_field_errors")?,
                files: Vec::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError {
                status: e.status(),
                message: e.body_text(),
                field: None,
            })?;

        let mut payload = Payload::default();
        let mut data = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| ApiError {
            status: e.status(),
            message: e.body_text(),
            field: None,
        })? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            let bytes = field.bytes().await.map_err(|e| ApiError {
                status: e.status(),
                message: e.body_text(),
                field: Some(name.clone()),
            })?;

            if file_name.is_some() {
                payload.files.push(Upload {
                    field: name,
                    file_name,
                    content_type,
                    data: bytes,
                });
            } else if name == DATA_PART {
                data = Some(parse_json_object(&bytes, DATA_PART)?);
            } else {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|_| ApiError::validation(name.clone(), "Not a valid string."))?;
                payload.fields.insert(name, Value::String(text));
            }
        }

        if let Some(data) = data {
            payload.fields.merge(data);
        }
        Ok(payload)
    }
}

/// Integer id from the last path segment. Non-numeric ids are reported as not found.
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for ResourceId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found("Not found."))?;

        raw.parse::<i64>()
            .map(ResourceId)
            .map_err(|_| ApiError::not_found("Not found."))
    }
}
