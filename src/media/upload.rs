use bytes::Bytes;

use crate::error::{Error, Result};

/// A file part received from a multipart request, not yet validated.
#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// An upload that passed validation, ready to be written to storage.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub extension: &'static str,
    pub data: Bytes,
}

struct FileRule {
    extensions: &'static [&'static str],
    content_types: &'static [&'static str],
    signature: fn(&[u8]) -> bool,
    canonical_extension: &'static str,
}

const IMAGE_RULES: &[FileRule] = &[
    FileRule {
        extensions: &["png"],
        content_types: &["image/png"],
        signature: is_png,
        canonical_extension: "png",
    },
    FileRule {
        extensions: &["jpg", "jpeg"],
        content_types: &["image/jpeg", "image/jpg", "image/pjpeg"],
        signature: is_jpeg,
        canonical_extension: "jpg",
    },
    FileRule {
        extensions: &["gif"],
        content_types: &["image/gif"],
        signature: is_gif,
        canonical_extension: "gif",
    },
    FileRule {
        extensions: &["webp"],
        content_types: &["image/webp"],
        signature: is_webp,
        canonical_extension: "webp",
    },
];

const DOCUMENT_RULES: &[FileRule] = &[FileRule {
    extensions: &["pdf"],
    content_types: &["application/pdf"],
    signature: is_pdf,
    canonical_extension: "pdf",
}];

fn is_png(data: &[u8]) -> bool {
    data.starts_with(b"\x89PNG\r\n\x1a\n")
}

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8, 0xFF])
}

fn is_gif(data: &[u8]) -> bool {
    data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a")
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP"
}

fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF-")
}

fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn validate(
    upload: &Upload,
    field: &str,
    max_bytes: usize,
    rules: &'static [FileRule],
    kind: &str,
) -> Result<ValidatedUpload> {
    if upload.data.is_empty() {
        return Err(Error::validation(field, "The submitted file is empty."));
    }

    if upload.data.len() > max_bytes {
        return Err(Error::validation(
            field,
            format!(
                "File size ({} bytes) exceeds the maximum allowed size ({max_bytes} bytes).",
                upload.data.len()
            ),
        ));
    }

    let allowed = rules
        .iter()
        .flat_map(|r| r.extensions.iter().copied())
        .collect::<Vec<_>>()
        .join(", ");

    let extension = upload
        .file_name
        .as_deref()
        .and_then(extension_of)
        .ok_or_else(|| {
            Error::validation(
                field,
                format!("File name must have one of the extensions: {allowed}."),
            )
        })?;

    let rule = rules
        .iter()
        .find(|r| r.extensions.contains(&extension.as_str()))
        .ok_or_else(|| {
            Error::validation(
                field,
                format!("File extension \"{extension}\" is not allowed. Allowed extensions are: {allowed}."),
            )
        })?;

    // Missing content types are tolerated; the signature check below still applies.
    if let Some(content_type) = upload.content_type.as_deref() {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !rule.content_types.contains(&essence.as_str()) {
            return Err(Error::validation(
                field,
                format!("Content type \"{essence}\" is not a valid {kind} type."),
            ));
        }
    }

    if !(rule.signature)(&upload.data) {
        return Err(Error::validation(
            field,
            format!("Upload a valid {kind}. The file you uploaded is not a valid {kind} or is corrupted."),
        ));
    }

    Ok(ValidatedUpload {
        extension: rule.canonical_extension,
        data: upload.data.clone(),
    })
}

/// Validates an image upload by extension, declared content type, signature and size.
pub fn validate_image(upload: &Upload, field: &str, max_bytes: usize) -> Result<ValidatedUpload> {
    validate(upload, field, max_bytes, IMAGE_RULES, "image")
}

/// Validates a document upload. Only PDF files are accepted.
pub fn validate_document(
    upload: &Upload,
    field: &str,
    max_bytes: usize,
) -> Result<ValidatedUpload> {
    validate(upload, field, max_bytes, DOCUMENT_RULES, "PDF document")
}

/// Content type to serve a stored file with, derived from its extension.
#[must_use]
pub fn content_type_for(path: &str) -> &'static str {
    match extension_of(path).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
