use std::path::Path;

use chrono::Utc;
use inquire::{Confirm, Password};

use crate::auth::{MIN_PASSWORD_LEN, hash_password, normalize_email, validate_password};
use crate::media::MediaStorage;
use crate::store::Store;
use crate::types::User;

use super::init_store;

fn confirm_action(message: &str, yes: bool, non_interactive: bool) -> anyhow::Result<bool> {
    if yes {
        Ok(true)
    } else if non_interactive {
        anyhow::bail!("--yes is required for destructive operations in non-interactive mode");
    } else {
        Ok(Confirm::new(message).with_default(false).prompt()?)
    }
}

fn prompt_password() -> anyhow::Result<String> {
    let password = Password::new("Password:")
        .with_validator(|input: &str| {
            if input.chars().count() < MIN_PASSWORD_LEN {
                Ok(inquire::validator::Validation::Invalid(
                    format!("Password must be at least {MIN_PASSWORD_LEN} characters").into(),
                ))
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;
    Ok(password)
}

pub fn run_user_create(
    data_dir: String,
    email: String,
    name: String,
    staff: bool,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let email = normalize_email(&email)?;
    let name = name.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("--name cannot be empty");
    }

    if store.get_user_by_email(&email)?.is_some() {
        anyhow::bail!("User '{}' already exists", email);
    }

    let password = match password {
        Some(password) => password,
        None if non_interactive => {
            anyhow::bail!("--password is required in non-interactive mode");
        }
        None => prompt_password()?,
    };
    validate_password(&password)?;

    let user = User {
        id: 0,
        email: email.clone(),
        name,
        password_hash: hash_password(&password)?,
        is_active: true,
        is_staff: staff,
        created_at: Utc::now(),
    };
    let id = store.create_user(&user)?;

    println!();
    if staff {
        println!("Created staff user '{email}' (id {id})");
    } else {
        println!("Created user '{email}' (id {id})");
    }
    println!();

    Ok(())
}

pub async fn run_user_remove(
    data_dir: String,
    email: String,
    yes: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let email = normalize_email(&email)?;
    let Some(user) = store.get_user_by_email(&email)? else {
        anyhow::bail!("User '{}' not found", email);
    };

    let confirmed = confirm_action(
        &format!(
            "Delete user '{email}'? Their tokens, tags and ethnic groups will also be deleted."
        ),
        yes,
        non_interactive,
    )?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    // Ethnic groups cascade with the user, so their files go too
    let images: Vec<String> = store
        .list_ethnic_groups(user.id, &[])?
        .into_iter()
        .filter_map(|group| group.image)
        .collect();

    store.delete_user(user.id)?;
    MediaStorage::new(Path::new(&data_dir))
        .remove_all(&images)
        .await;

    println!();
    println!("Deleted user '{email}'");
    println!();

    Ok(())
}
