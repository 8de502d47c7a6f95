//! Outbound representations. Every entity has a summary (list) and a detail
//! (single resource) projection; the detail is a superset of the summary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::media::public_url;
use crate::types::*;

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

fn tag_list(tags: Vec<Tag>) -> Vec<TagResponse> {
    tags.into_iter().map(TagResponse::from).collect()
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: i64,
    pub image: String,
}

impl From<Image> for ImageResponse {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            image: public_url(&image.image),
        }
    }
}

fn image_list(images: Vec<Image>) -> Vec<ImageResponse> {
    images.into_iter().map(ImageResponse::from).collect()
}

fn media_url(stored: Option<&str>) -> Option<String> {
    stored.map(public_url)
}

// Accounts

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// Ethnic groups

#[derive(Debug, Serialize)]
pub struct EthnicGroupSummary {
    pub id: i64,
    pub name: String,
    pub language: String,
    pub population: i64,
    pub geography: String,
    pub history: String,
    pub tags: Vec<TagResponse>,
}

#[derive(Debug, Serialize)]
pub struct EthnicGroupDetail {
    #[serde(flatten)]
    pub summary: EthnicGroupSummary,
    pub description: String,
    pub image: Option<String>,
}

impl EthnicGroupSummary {
    #[must_use]
    pub fn new(group: &EthnicGroup, tags: Vec<Tag>) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            language: group.language.clone(),
            population: group.population,
            geography: group.geography.clone(),
            history: group.history.clone(),
            tags: tag_list(tags),
        }
    }
}

impl EthnicGroupDetail {
    #[must_use]
    pub fn new(group: &EthnicGroup, tags: Vec<Tag>) -> Self {
        Self {
            summary: EthnicGroupSummary::new(group, tags),
            description: group.description.clone(),
            image: media_url(group.image.as_deref()),
        }
    }
}

// Cultures

#[derive(Debug, Serialize)]
pub struct CultureSummary {
    pub id: i64,
    pub name: String,
    pub ethnic_group: Option<i64>,
    pub tags: Vec<TagResponse>,
}

#[derive(Debug, Serialize)]
pub struct CultureDetail {
    #[serde(flatten)]
    pub summary: CultureSummary,
    pub description: String,
    pub image: Option<String>,
}

impl CultureSummary {
    #[must_use]
    pub fn new(culture: &Culture, tags: Vec<Tag>) -> Self {
        Self {
            id: culture.id,
            name: culture.name.clone(),
            ethnic_group: culture.ethnic_group_id,
            tags: tag_list(tags),
        }
    }
}

impl CultureDetail {
    #[must_use]
    pub fn new(culture: &Culture, tags: Vec<Tag>) -> Self {
        Self {
            summary: CultureSummary::new(culture, tags),
            description: culture.description.clone(),
            image: media_url(culture.image.as_deref()),
        }
    }
}

// Chiefs

#[derive(Debug, Serialize)]
pub struct ChiefSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub chief_type: Option<ChiefType>,
}

#[derive(Debug, Serialize)]
pub struct ChiefDetail {
    #[serde(flatten)]
    pub summary: ChiefSummary,
    pub ethnic_group: Option<i64>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_appointment: Option<NaiveDate>,
    pub is_current: bool,
    pub bio: String,
}

impl From<&Chief> for ChiefSummary {
    fn from(chief: &Chief) -> Self {
        Self {
            id: chief.id,
            name: chief.name.clone(),
            chief_type: chief.chief_type,
        }
    }
}

impl From<&Chief> for ChiefDetail {
    fn from(chief: &Chief) -> Self {
        Self {
            summary: ChiefSummary::from(chief),
            ethnic_group: chief.ethnic_group_id,
            date_of_birth: chief.date_of_birth,
            date_of_appointment: chief.date_of_appointment,
            is_current: chief.is_current,
            bio: chief.bio.clone(),
        }
    }
}

// Sites

#[derive(Debug, Serialize)]
pub struct SiteSummary {
    pub id: i64,
    pub site_name: String,
    pub site_type: SiteType,
}

#[derive(Debug, Serialize)]
pub struct SiteDetail {
    #[serde(flatten)]
    pub summary: SiteSummary,
    pub ethnic_group: Option<i64>,
    pub culture: Option<i64>,
    pub importance: i64,
    pub sensitivity: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
    pub images: Vec<ImageResponse>,
}

impl From<&Site> for SiteSummary {
    fn from(site: &Site) -> Self {
        Self {
            id: site.id,
            site_name: site.site_name.clone(),
            site_type: site.site_type,
        }
    }
}

impl SiteDetail {
    #[must_use]
    pub fn new(site: &Site, images: Vec<Image>) -> Self {
        Self {
            summary: SiteSummary::from(site),
            ethnic_group: site.ethnic_group_id,
            culture: site.culture_id,
            importance: site.importance,
            sensitivity: site.sensitivity,
            latitude: site.latitude,
            longitude: site.longitude,
            description: site.description.clone(),
            images: image_list(images),
        }
    }
}

// Artifacts

#[derive(Debug, Serialize)]
pub struct ArtifactSummary {
    pub id: i64,
    pub artifact_name: String,
    pub artifact_type: String,
}

#[derive(Debug, Serialize)]
pub struct ArtifactDetail {
    #[serde(flatten)]
    pub summary: ArtifactSummary,
    pub description: String,
    pub historical_significance: Option<f64>,
    pub cultural_significance: Option<f64>,
    pub ethnic_group: Option<i64>,
    pub culture: Option<i64>,
    pub site: Option<i64>,
    pub images: Vec<ImageResponse>,
}

impl From<&Artifact> for ArtifactSummary {
    fn from(artifact: &Artifact) -> Self {
        Self {
            id: artifact.id,
            artifact_name: artifact.artifact_name.clone(),
            artifact_type: artifact.artifact_type.clone(),
        }
    }
}

impl ArtifactDetail {
    #[must_use]
    pub fn new(artifact: &Artifact, images: Vec<Image>) -> Self {
        Self {
            summary: ArtifactSummary::from(artifact),
            description: artifact.description.clone(),
            historical_significance: artifact.historical_significance,
            cultural_significance: artifact.cultural_significance,
            ethnic_group: artifact.ethnic_group_id,
            culture: artifact.culture_id,
            site: artifact.site_id,
            images: image_list(images),
        }
    }
}

// Events

#[derive(Debug, Serialize)]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    pub event_type: Option<EventType>,
}

#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub summary: EventSummary,
    pub description: String,
    pub images: Vec<ImageResponse>,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            event_type: event.event_type,
        }
    }
}

impl EventDetail {
    #[must_use]
    pub fn new(event: &Event, images: Vec<Image>) -> Self {
        Self {
            summary: EventSummary::from(event),
            description: event.description.clone(),
            images: image_list(images),
        }
    }
}

// Publisher

#[derive(Debug, Serialize)]
pub struct PublisherSummary {
    pub id: i64,
    pub document_type: DocumentType,
    pub is_published: bool,
}

#[derive(Debug, Serialize)]
pub struct PublisherDetail {
    #[serde(flatten)]
    pub summary: PublisherSummary,
    pub document: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Publisher> for PublisherSummary {
    fn from(publisher: &Publisher) -> Self {
        Self {
            id: publisher.id,
            document_type: publisher.document_type,
            is_published: publisher.is_published,
        }
    }
}

impl From<&Publisher> for PublisherDetail {
    fn from(publisher: &Publisher) -> Self {
        Self {
            summary: PublisherSummary::from(publisher),
            document: public_url(&publisher.document),
            created_at: publisher.created_at,
        }
    }
}
