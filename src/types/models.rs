use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ChiefType, DocumentType, EventType, SiteType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthnicGroup {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub language: String,
    pub population: i64,
    pub geography: String,
    pub history: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Culture {
    pub id: i64,
    pub user_id: Option<i64>,
    pub ethnic_group_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chief {
    pub id: i64,
    pub user_id: Option<i64>,
    pub ethnic_group_id: Option<i64>,
    pub name: String,
    pub chief_type: Option<ChiefType>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_appointment: Option<NaiveDate>,
    pub is_current: bool,
    pub bio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub user_id: Option<i64>,
    pub ethnic_group_id: Option<i64>,
    pub culture_id: Option<i64>,
    pub site_name: String,
    pub site_type: SiteType,
    pub importance: i64,
    pub sensitivity: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: i64,
    pub user_id: Option<i64>,
    pub ethnic_group_id: Option<i64>,
    pub culture_id: Option<i64>,
    pub site_id: Option<i64>,
    pub artifact_name: String,
    pub artifact_type: String,
    pub description: String,
    pub historical_significance: Option<f64>,
    pub cultural_significance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub event_type: Option<EventType>,
}

/// A published document record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    pub id: i64,
    pub user_id: Option<i64>,
    pub document: String,
    pub document_type: DocumentType,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// A row of one of the child image tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub image: String,
}
