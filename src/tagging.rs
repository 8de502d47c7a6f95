//! Tag names, targets and attach modes shared by every tag-bearing entity.
//! The store resolves names to rows inside the entity's write transaction.

use serde::Deserialize;

use crate::error::{Error, Result};

pub const MAX_TAG_NAME_LEN: usize = 100;

/// Entity types that carry a tag collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    EthnicGroup,
    Culture,
}

impl TagKind {
    #[must_use]
    pub const fn join_table(self) -> &'static str {
        match self {
            TagKind::EthnicGroup => "ethnic_group_tags",
            TagKind::Culture => "culture_tags",
        }
    }

    #[must_use]
    pub const fn entity_column(self) -> &'static str {
        match self {
            TagKind::EthnicGroup => "ethnic_group_id",
            TagKind::Culture => "culture_id",
        }
    }
}

/// The row whose tag collection is being changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagTarget {
    pub kind: TagKind,
    pub id: i64,
}

impl TagTarget {
    #[must_use]
    pub const fn new(kind: TagKind, id: i64) -> Self {
        Self { kind, id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    /// Keep existing associations and add the given tags.
    Append,
    /// Clear existing associations first. An empty list detaches everything.
    Replace,
}

/// Client-supplied reference to a tag, by name.
#[derive(Debug, Clone, Deserialize)]
pub struct TagDescriptor {
    pub name: String,
}

impl TagDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub fn validate_tag_name(name: &str, field: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation(field, "Tag name cannot be empty."));
    }
    if name.chars().count() > MAX_TAG_NAME_LEN {
        return Err(Error::validation(
            field,
            format!("Tag name cannot exceed {MAX_TAG_NAME_LEN} characters."),
        ));
    }
    Ok(name.to_string())
}

/// Trims and validates descriptor names, collapsing duplicates while keeping order.
pub fn normalize_descriptors(descriptors: &[TagDescriptor]) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let name = validate_tag_name(&descriptor.name, "tags")?;
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}
