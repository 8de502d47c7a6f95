mod schema;
mod sqlite;
#[cfg(test)]
pub(crate) mod test_support;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::media::ImageParent;
use crate::tagging::{TagKind, TagTarget};
use crate::types::*;

/// Store defines the database interface.
///
/// Every read and write of catalog rows takes the owner explicitly; rows owned
/// by someone else behave as if they did not exist. `create_*` ignores the
/// `id` of the given value and returns the assigned one.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<i64>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn delete_user(&self, id: i64) -> Result<bool>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;

    // Tag operations
    fn get_tag(&self, id: i64, owner_id: i64) -> Result<Option<Tag>>;
    fn list_tags(&self, owner_id: i64, kind: TagKind, assigned_only: bool) -> Result<Vec<Tag>>;
    fn update_tag(&self, tag: &Tag) -> Result<()>;
    fn delete_tag(&self, id: i64, owner_id: i64) -> Result<bool>;
    fn count_tags(&self, owner_id: i64) -> Result<i64>;

    // Tag associations (many-to-many)
    fn list_target_tags(&self, target: TagTarget) -> Result<Vec<Tag>>;

    // Ethnic group operations; `tags` are names resolved to the owner's tags
    // in the same transaction as the row write. On update, `Some` replaces the
    // group's tags and `None` leaves them alone.
    fn create_ethnic_group(&self, group: &EthnicGroup, tags: &[String]) -> Result<i64>;
    fn get_ethnic_group(&self, id: i64, owner_id: i64) -> Result<Option<EthnicGroup>>;
    fn list_ethnic_groups(&self, owner_id: i64, tag_ids: &[i64]) -> Result<Vec<EthnicGroup>>;
    fn update_ethnic_group(&self, group: &EthnicGroup, tags: Option<&[String]>) -> Result<()>;
    fn delete_ethnic_group(&self, id: i64, owner_id: i64) -> Result<bool>;

    // Culture operations, tagged like ethnic groups
    fn create_culture(&self, culture: &Culture, tags: &[String]) -> Result<i64>;
    fn get_culture(&self, id: i64, owner_id: i64) -> Result<Option<Culture>>;
    fn list_cultures(&self, owner_id: i64, tag_ids: &[i64]) -> Result<Vec<Culture>>;
    fn update_culture(&self, culture: &Culture, tags: Option<&[String]>) -> Result<()>;
    fn delete_culture(&self, id: i64, owner_id: i64) -> Result<bool>;

    // Chief operations
    fn create_chief(&self, chief: &Chief) -> Result<i64>;
    fn get_chief(&self, id: i64, owner_id: i64) -> Result<Option<Chief>>;
    fn list_chiefs(&self, owner_id: i64) -> Result<Vec<Chief>>;
    fn update_chief(&self, chief: &Chief) -> Result<()>;
    fn delete_chief(&self, id: i64, owner_id: i64) -> Result<bool>;

    // Site operations; images are inserted in the same transaction as the row
    // write, and on update are appended to the existing ones
    fn create_site(&self, site: &Site, images: &[String]) -> Result<i64>;
    fn get_site(&self, id: i64, owner_id: i64) -> Result<Option<Site>>;
    fn list_sites(&self, owner_id: i64) -> Result<Vec<Site>>;
    fn update_site(&self, site: &Site, images: &[String]) -> Result<()>;
    fn delete_site(&self, id: i64, owner_id: i64) -> Result<bool>;

    // Artifact operations
    fn create_artifact(&self, artifact: &Artifact, images: &[String]) -> Result<i64>;
    fn get_artifact(&self, id: i64, owner_id: i64) -> Result<Option<Artifact>>;
    fn list_artifacts(&self, owner_id: i64) -> Result<Vec<Artifact>>;
    fn update_artifact(&self, artifact: &Artifact, images: &[String]) -> Result<()>;
    fn delete_artifact(&self, id: i64, owner_id: i64) -> Result<bool>;

    // Event operations
    fn create_event(&self, event: &Event, images: &[String]) -> Result<i64>;
    fn get_event(&self, id: i64, owner_id: i64) -> Result<Option<Event>>;
    fn list_events(&self, owner_id: i64) -> Result<Vec<Event>>;
    fn update_event(&self, event: &Event, images: &[String]) -> Result<()>;
    fn delete_event(&self, id: i64, owner_id: i64) -> Result<bool>;

    // Publisher operations
    fn create_publisher(&self, publisher: &Publisher) -> Result<i64>;
    fn get_publisher(&self, id: i64, owner_id: i64) -> Result<Option<Publisher>>;
    fn list_publishers(&self, owner_id: i64) -> Result<Vec<Publisher>>;
    fn update_publisher(&self, publisher: &Publisher) -> Result<()>;
    fn delete_publisher(&self, id: i64, owner_id: i64) -> Result<bool>;

    // Child image operations
    fn list_images(&self, parent: ImageParent) -> Result<Vec<Image>>;
}
