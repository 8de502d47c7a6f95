mod storage;
mod upload;

pub use storage::{MediaStorage, public_url};
pub use upload::{Upload, ValidatedUpload, content_type_for, validate_document, validate_image};

/// Directory namespace for stored files, one per kind of owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    EthnicGroup,
    Culture,
    Event,
    Site,
    Artifact,
    Document,
}

impl MediaKind {
    pub const ALL: &'static [MediaKind] = &[
        MediaKind::EthnicGroup,
        MediaKind::Culture,
        MediaKind::Event,
        MediaKind::Site,
        MediaKind::Artifact,
        MediaKind::Document,
    ];

    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            MediaKind::EthnicGroup => "ethnic_group",
            MediaKind::Culture => "culture",
            MediaKind::Event => "event",
            MediaKind::Site => "site",
            MediaKind::Artifact => "artifact",
            MediaKind::Document => "document",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.dir_name() == name)
    }
}

/// Entities owning a child image table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Event,
    Site,
    Artifact,
}

impl ImageKind {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            ImageKind::Event => "event_images",
            ImageKind::Site => "site_images",
            ImageKind::Artifact => "artifact_images",
        }
    }

    #[must_use]
    pub const fn parent_column(self) -> &'static str {
        match self {
            ImageKind::Event => "event_id",
            ImageKind::Site => "site_id",
            ImageKind::Artifact => "artifact_id",
        }
    }
}

/// A specific parent row whose child images are being read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageParent {
    pub kind: ImageKind,
    pub id: i64,
}

impl ImageParent {
    #[must_use]
    pub const fn new(kind: ImageKind, id: i64) -> Self {
        Self { kind, id }
    }
}
