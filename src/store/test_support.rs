//! Row seeding helpers for unit tests.

use chrono::Utc;

use super::{SqliteStore, Store};
use crate::types::{Culture, EthnicGroup, User};

pub fn user(email: &str) -> User {
    User {
        id: 0,
        email: email.to_string(),
        name: "Test User".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        is_active: true,
        is_staff: false,
        created_at: Utc::now(),
    }
}

pub fn seed_user(store: &SqliteStore, email: &str) -> i64 {
    store.create_user(&user(email)).unwrap()
}

pub fn seed_ethnic_group(store: &SqliteStore, owner: i64, name: &str) -> i64 {
    seed_tagged_group(store, owner, name, &[])
}

pub fn seed_tagged_group(store: &SqliteStore, owner: i64, name: &str, tags: &[&str]) -> i64 {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    store
        .create_ethnic_group(
            &EthnicGroup {
                id: 0,
                user_id: owner,
                name: name.to_string(),
                description: "description".to_string(),
                language: "Setswana".to_string(),
                population: 1000,
                geography: "geography".to_string(),
                history: "history".to_string(),
                image: None,
            },
            &tags,
        )
        .unwrap()
}

pub fn seed_culture(store: &SqliteStore, owner: i64, name: &str) -> i64 {
    seed_tagged_culture(store, owner, name, &[])
}

pub fn seed_tagged_culture(store: &SqliteStore, owner: i64, name: &str, tags: &[&str]) -> i64 {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    store
        .create_culture(
            &Culture {
                id: 0,
                user_id: Some(owner),
                ethnic_group_id: None,
                name: name.to_string(),
                description: "description".to_string(),
                image: None,
            },
            &tags,
        )
        .unwrap()
}
