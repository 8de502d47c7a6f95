use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::media::{ImageKind, ImageParent};
use crate::tagging::{TagKind, TagMode, TagTarget};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

const DATE_FORMAT: &str = "%Y-%m-%d";

fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn date_column(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|e| conversion_error(idx, format!("invalid date '{s}': {e}")))
        })
        .transpose()
}

fn choice_column<T: FromStr<Err = String>>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let value: String = row.get(idx)?;
    value.parse().map_err(|e| conversion_error(idx, e))
}

fn optional_choice_column<T: FromStr<Err = String>>(
    row: &Row,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| s.parse().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

const USER_COLUMNS: &str = "id, email, name, password_hash, is_active, is_staff, created_at";

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        is_active: row.get(4)?,
        is_staff: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
    })
}

const ETHNIC_GROUP_COLUMNS: &str =
    "id, user_id, name, description, language, population, geography, history, image";

fn row_to_ethnic_group(row: &Row) -> rusqlite::Result<EthnicGroup> {
    Ok(EthnicGroup {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        language: row.get(4)?,
        population: row.get(5)?,
        geography: row.get(6)?,
        history: row.get(7)?,
        image: row.get(8)?,
    })
}

const CULTURE_COLUMNS: &str = "id, user_id, ethnic_group_id, name, description, image";

fn row_to_culture(row: &Row) -> rusqlite::Result<Culture> {
    Ok(Culture {
        id: row.get(0)?,
        user_id: row.get(1)?,
        ethnic_group_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        image: row.get(5)?,
    })
}

const CHIEF_COLUMNS: &str = "id, user_id, ethnic_group_id, name, chief_type, date_of_birth, \
                             date_of_appointment, is_current, bio";

fn row_to_chief(row: &Row) -> rusqlite::Result<Chief> {
    Ok(Chief {
        id: row.get(0)?,
        user_id: row.get(1)?,
        ethnic_group_id: row.get(2)?,
        name: row.get(3)?,
        chief_type: optional_choice_column(row, 4)?,
        date_of_birth: date_column(row, 5)?,
        date_of_appointment: date_column(row, 6)?,
        is_current: row.get(7)?,
        bio: row.get(8)?,
    })
}

const SITE_COLUMNS: &str = "id, user_id, ethnic_group_id, culture_id, site_name, site_type, \
                            importance, sensitivity, latitude, longitude, description";

fn row_to_site(row: &Row) -> rusqlite::Result<Site> {
    Ok(Site {
        id: row.get(0)?,
        user_id: row.get(1)?,
        ethnic_group_id: row.get(2)?,
        culture_id: row.get(3)?,
        site_name: row.get(4)?,
        site_type: choice_column(row, 5)?,
        importance: row.get(6)?,
        sensitivity: row.get(7)?,
        latitude: row.get(8)?,
        longitude: row.get(9)?,
        description: row.get(10)?,
    })
}

const ARTIFACT_COLUMNS: &str = "id, user_id, ethnic_group_id, culture_id, site_id, artifact_name, \
                                artifact_type, description, historical_significance, \
                                cultural_significance";

fn row_to_artifact(row: &Row) -> rusqlite::Result<Artifact> {
    Ok(Artifact {
        id: row.get(0)?,
        user_id: row.get(1)?,
        ethnic_group_id: row.get(2)?,
        culture_id: row.get(3)?,
        site_id: row.get(4)?,
        artifact_name: row.get(5)?,
        artifact_type: row.get(6)?,
        description: row.get(7)?,
        historical_significance: row.get(8)?,
        cultural_significance: row.get(9)?,
    })
}

const EVENT_COLUMNS: &str = "id, user_id, name, description, event_type";

fn row_to_event(row: &Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        event_type: optional_choice_column(row, 4)?,
    })
}

const PUBLISHER_COLUMNS: &str = "id, user_id, document, document_type, is_published, created_at";

fn row_to_publisher(row: &Row) -> rusqlite::Result<Publisher> {
    Ok(Publisher {
        id: row.get(0)?,
        user_id: row.get(1)?,
        document: row.get(2)?,
        document_type: choice_column(row, 3)?,
        is_published: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

/// Fetches a single row owned by `owner_id`.
fn get_owned<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    id: i64,
    owner_id: i64,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    conn.query_row(
        &format!("SELECT {columns} FROM {table} WHERE id = ?1 AND user_id = ?2"),
        params![id, owner_id],
        map,
    )
    .optional()
    .map_err(Error::from)
}

/// Lists the owner's rows, newest first. A non-empty `tags` filter keeps rows
/// carrying at least one of the given tag ids.
fn list_owned<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    owner_id: i64,
    tags: Option<(TagKind, &[i64])>,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut sql = format!("SELECT {columns} FROM {table} WHERE user_id = ?1");
    let mut values = vec![owner_id];

    if let Some((kind, tag_ids)) = tags.filter(|(_, ids)| !ids.is_empty()) {
        let placeholders = (0..tag_ids.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM {join} jt WHERE jt.{column} = {table}.id AND jt.tag_id IN ({placeholders}))",
            join = kind.join_table(),
            column = kind.entity_column(),
        ));
        values.extend_from_slice(tag_ids);
    }
    sql.push_str(" ORDER BY id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), map)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn delete_owned(conn: &Connection, table: &str, id: i64, owner_id: i64) -> Result<bool> {
    let rows = conn.execute(
        &format!("DELETE FROM {table} WHERE id = ?1 AND user_id = ?2"),
        params![id, owner_id],
    )?;
    Ok(rows > 0)
}

fn expect_updated(rows: usize) -> Result<()> {
    if rows == 0 {
        return Err(Error::NotFound);
    }
    Ok(())
}

fn query_target_tags(conn: &Connection, target: TagTarget) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT t.id, t.user_id, t.name FROM tags t
         JOIN {join} jt ON jt.tag_id = t.id
         WHERE jt.{column} = ?1
         ORDER BY t.id",
        join = target.kind.join_table(),
        column = target.kind.entity_column(),
    ))?;

    let rows = stmt.query_map(params![target.id], row_to_tag)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn insert_images(conn: &Connection, parent: ImageParent, images: &[String]) -> Result<Vec<Image>> {
    let sql = format!(
        "INSERT INTO {} ({}, image) VALUES (?1, ?2)",
        parent.kind.table(),
        parent.kind.parent_column()
    );

    let mut inserted = Vec::with_capacity(images.len());
    for image in images {
        conn.execute(&sql, params![parent.id, image])?;
        inserted.push(Image {
            id: conn.last_insert_rowid(),
            image: image.clone(),
        });
    }
    Ok(inserted)
}

/// Resolves each name to the owner's canonical tag, creating missing ones, and
/// attaches it to `target`. Runs inside the caller's transaction.
fn attach_tag_names(
    conn: &Connection,
    owner_id: i64,
    target: TagTarget,
    names: &[String],
    mode: TagMode,
) -> Result<()> {
    let join = target.kind.join_table();
    let column = target.kind.entity_column();

    if mode == TagMode::Replace {
        conn.execute(
            &format!("DELETE FROM {join} WHERE {column} = ?1"),
            params![target.id],
        )?;
    }

    for name in names {
        // (user_id, name) is unique, so racing creators converge on one row
        conn.execute(
            "INSERT INTO tags (user_id, name) VALUES (?1, ?2)
             ON CONFLICT(user_id, name) DO NOTHING",
            params![owner_id, name],
        )?;
        let tag_id: i64 = conn.query_row(
            "SELECT id FROM tags WHERE user_id = ?1 AND name = ?2",
            params![owner_id, name],
            |row| row.get(0),
        )?;
        conn.execute(
            &format!("INSERT OR IGNORE INTO {join} ({column}, tag_id) VALUES (?1, ?2)"),
            params![target.id, tag_id],
        )?;
    }

    tracing::debug!(
        "Attached {} tag(s) to {:?} {} ({:?})",
        names.len(),
        target.kind,
        target.id,
        mode
    );
    Ok(())
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<i64> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (email, name, password_hash, is_active, is_staff, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.email,
                user.name,
                user.password_hash,
                user.is_active,
                user.is_staff,
                format_datetime(&user.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_constraint_violation(&e) => Err(Error::validation(
                "email",
                "A user with this email already exists.",
            )),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .optional()
            .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                row_to_user,
            )
            .optional()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET name = ?1, password_hash = ?2, is_active = ?3, is_staff = ?4
             WHERE id = ?5",
            params![
                user.name,
                user.password_hash,
                user.is_active,
                user.is_staff,
                user.id
            ],
        )?;
        expect_updated(rows)
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::TokenLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at
             FROM tokens WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Token {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    user_id: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
                    last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    // Tag operations

    fn get_tag(&self, id: i64, owner_id: i64) -> Result<Option<Tag>> {
        let conn = self.conn();
        get_owned(&conn, "tags", "id, user_id, name", id, owner_id, row_to_tag)
    }

    fn list_tags(&self, owner_id: i64, kind: TagKind, assigned_only: bool) -> Result<Vec<Tag>> {
        let mut sql = "SELECT id, user_id, name FROM tags WHERE user_id = ?1".to_string();
        if assigned_only {
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM {} jt WHERE jt.tag_id = tags.id)",
                kind.join_table()
            ));
        }
        sql.push_str(" ORDER BY name DESC");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner_id], row_to_tag)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_tag(&self, tag: &Tag) -> Result<()> {
        let result = self.conn().execute(
            "UPDATE tags SET name = ?1 WHERE id = ?2 AND user_id = ?3",
            params![tag.name, tag.id, tag.user_id],
        );

        match result {
            Ok(rows) => expect_updated(rows),
            Err(e) if is_constraint_violation(&e) => Err(Error::validation(
                "name",
                "A tag with this name already exists.",
            )),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn delete_tag(&self, id: i64, owner_id: i64) -> Result<bool> {
        delete_owned(&self.conn(), "tags", id, owner_id)
    }

    fn count_tags(&self, owner_id: i64) -> Result<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM tags WHERE user_id = ?1",
                params![owner_id],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    // Tag associations

    fn list_target_tags(&self, target: TagTarget) -> Result<Vec<Tag>> {
        query_target_tags(&self.conn(), target)
    }

    // Ethnic group operations

    fn create_ethnic_group(&self, group: &EthnicGroup, tags: &[String]) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO ethnic_groups
                 (user_id, name, description, language, population, geography, history, image)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                group.user_id,
                group.name,
                group.description,
                group.language,
                group.population,
                group.geography,
                group.history,
                group.image,
            ],
        )?;
        let id = tx.last_insert_rowid();
        attach_tag_names(
            &tx,
            group.user_id,
            TagTarget::new(TagKind::EthnicGroup, id),
            tags,
            TagMode::Append,
        )?;

        tx.commit()?;
        Ok(id)
    }

    fn get_ethnic_group(&self, id: i64, owner_id: i64) -> Result<Option<EthnicGroup>> {
        let conn = self.conn();
        get_owned(&conn, "ethnic_groups", ETHNIC_GROUP_COLUMNS, id, owner_id, row_to_ethnic_group)
    }

    fn list_ethnic_groups(&self, owner_id: i64, tag_ids: &[i64]) -> Result<Vec<EthnicGroup>> {
        let conn = self.conn();
        list_owned(
            &conn,
            "ethnic_groups",
            ETHNIC_GROUP_COLUMNS,
            owner_id,
            Some((TagKind::EthnicGroup, tag_ids)),
            row_to_ethnic_group,
        )
    }

    fn update_ethnic_group(&self, group: &EthnicGroup, tags: Option<&[String]>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE ethnic_groups SET name = ?1, description = ?2, language = ?3, population = ?4,
                 geography = ?5, history = ?6, image = ?7
             WHERE id = ?8 AND user_id = ?9",
            params![
                group.name,
                group.description,
                group.language,
                group.population,
                group.geography,
                group.history,
                group.image,
                group.id,
                group.user_id,
            ],
        )?;
        expect_updated(rows)?;

        if let Some(names) = tags {
            let target = TagTarget::new(TagKind::EthnicGroup, group.id);
            attach_tag_names(&tx, group.user_id, target, names, TagMode::Replace)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_ethnic_group(&self, id: i64, owner_id: i64) -> Result<bool> {
        delete_owned(&self.conn(), "ethnic_groups", id, owner_id)
    }

    // Culture operations

    fn create_culture(&self, culture: &Culture, tags: &[String]) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO cultures (user_id, ethnic_group_id, name, description, image)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                culture.user_id,
                culture.ethnic_group_id,
                culture.name,
                culture.description,
                culture.image,
            ],
        )?;
        let id = tx.last_insert_rowid();
        // Tags belong to a user, so an unowned culture carries none
        if let Some(owner_id) = culture.user_id {
            let target = TagTarget::new(TagKind::Culture, id);
            attach_tag_names(&tx, owner_id, target, tags, TagMode::Append)?;
        }

        tx.commit()?;
        Ok(id)
    }

    fn get_culture(&self, id: i64, owner_id: i64) -> Result<Option<Culture>> {
        let conn = self.conn();
        get_owned(&conn, "cultures", CULTURE_COLUMNS, id, owner_id, row_to_culture)
    }

    fn list_cultures(&self, owner_id: i64, tag_ids: &[i64]) -> Result<Vec<Culture>> {
        let conn = self.conn();
        list_owned(
            &conn,
            "cultures",
            CULTURE_COLUMNS,
            owner_id,
            Some((TagKind::Culture, tag_ids)),
            row_to_culture,
        )
    }

    fn update_culture(&self, culture: &Culture, tags: Option<&[String]>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE cultures SET ethnic_group_id = ?1, name = ?2, description = ?3, image = ?4
             WHERE id = ?5 AND user_id = ?6",
            params![
                culture.ethnic_group_id,
                culture.name,
                culture.description,
                culture.image,
                culture.id,
                culture.user_id,
            ],
        )?;
        expect_updated(rows)?;

        // The update only matches owned rows, so `user_id` is set here
        if let (Some(names), Some(owner_id)) = (tags, culture.user_id) {
            let target = TagTarget::new(TagKind::Culture, culture.id);
            attach_tag_names(&tx, owner_id, target, names, TagMode::Replace)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_culture(&self, id: i64, owner_id: i64) -> Result<bool> {
        delete_owned(&self.conn(), "cultures", id, owner_id)
    }

    // Chief operations

    fn create_chief(&self, chief: &Chief) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO chiefs (user_id, ethnic_group_id, name, chief_type, date_of_birth,
                 date_of_appointment, is_current, bio)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                chief.user_id,
                chief.ethnic_group_id,
                chief.name,
                chief.chief_type.map(ChiefType::as_str),
                chief.date_of_birth.as_ref().map(format_date),
                chief.date_of_appointment.as_ref().map(format_date),
                chief.is_current,
                chief.bio,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_chief(&self, id: i64, owner_id: i64) -> Result<Option<Chief>> {
        let conn = self.conn();
        get_owned(&conn, "chiefs", CHIEF_COLUMNS, id, owner_id, row_to_chief)
    }

    fn list_chiefs(&self, owner_id: i64) -> Result<Vec<Chief>> {
        let conn = self.conn();
        list_owned(&conn, "chiefs", CHIEF_COLUMNS, owner_id, None, row_to_chief)
    }

    fn update_chief(&self, chief: &Chief) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE chiefs SET ethnic_group_id = ?1, name = ?2, chief_type = ?3, date_of_birth = ?4,
                 date_of_appointment = ?5, is_current = ?6, bio = ?7
             WHERE id = ?8 AND user_id = ?9",
            params![
                chief.ethnic_group_id,
                chief.name,
                chief.chief_type.map(ChiefType::as_str),
                chief.date_of_birth.as_ref().map(format_date),
                chief.date_of_appointment.as_ref().map(format_date),
                chief.is_current,
                chief.bio,
                chief.id,
                chief.user_id,
            ],
        )?;
        expect_updated(rows)
    }

    fn delete_chief(&self, id: i64, owner_id: i64) -> Result<bool> {
        delete_owned(&self.conn(), "chiefs", id, owner_id)
    }

    // Site operations

    fn create_site(&self, site: &Site, images: &[String]) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO sites (user_id, ethnic_group_id, culture_id, site_name, site_type,
                 importance, sensitivity, latitude, longitude, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                site.user_id,
                site.ethnic_group_id,
                site.culture_id,
                site.site_name,
                site.site_type.as_str(),
                site.importance,
                site.sensitivity,
                site.latitude,
                site.longitude,
                site.description,
            ],
        )?;
        let id = tx.last_insert_rowid();
        insert_images(&tx, ImageParent::new(ImageKind::Site, id), images)?;

        tx.commit()?;
        Ok(id)
    }

    fn get_site(&self, id: i64, owner_id: i64) -> Result<Option<Site>> {
        let conn = self.conn();
        get_owned(&conn, "sites", SITE_COLUMNS, id, owner_id, row_to_site)
    }

    fn list_sites(&self, owner_id: i64) -> Result<Vec<Site>> {
        let conn = self.conn();
        list_owned(&conn, "sites", SITE_COLUMNS, owner_id, None, row_to_site)
    }

    fn update_site(&self, site: &Site, images: &[String]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE sites SET ethnic_group_id = ?1, culture_id = ?2, site_name = ?3, site_type = ?4,
                 importance = ?5, sensitivity = ?6, latitude = ?7, longitude = ?8, description = ?9
             WHERE id = ?10 AND user_id = ?11",
            params![
                site.ethnic_group_id,
                site.culture_id,
                site.site_name,
                site.site_type.as_str(),
                site.importance,
                site.sensitivity,
                site.latitude,
                site.longitude,
                site.description,
                site.id,
                site.user_id,
            ],
        )?;
        expect_updated(rows)?;
        insert_images(&tx, ImageParent::new(ImageKind::Site, site.id), images)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_site(&self, id: i64, owner_id: i64) -> Result<bool> {
        delete_owned(&self.conn(), "sites", id, owner_id)
    }

    // Artifact operations

    fn create_artifact(&self, artifact: &Artifact, images: &[String]) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO artifacts (user_id, ethnic_group_id, culture_id, site_id, artifact_name,
                 artifact_type, description, historical_significance, cultural_significance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                artifact.user_id,
                artifact.ethnic_group_id,
                artifact.culture_id,
                artifact.site_id,
                artifact.artifact_name,
                artifact.artifact_type,
                artifact.description,
                artifact.historical_significance,
                artifact.cultural_significance,
            ],
        )?;
        let id = tx.last_insert_rowid();
        insert_images(&tx, ImageParent::new(ImageKind::Artifact, id), images)?;

        tx.commit()?;
        Ok(id)
    }

    fn get_artifact(&self, id: i64, owner_id: i64) -> Result<Option<Artifact>> {
        let conn = self.conn();
        get_owned(&conn, "artifacts", ARTIFACT_COLUMNS, id, owner_id, row_to_artifact)
    }

    fn list_artifacts(&self, owner_id: i64) -> Result<Vec<Artifact>> {
        let conn = self.conn();
        list_owned(&conn, "artifacts", ARTIFACT_COLUMNS, owner_id, None, row_to_artifact)
    }

    fn update_artifact(&self, artifact: &Artifact, images: &[String]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE artifacts SET ethnic_group_id = ?1, culture_id = ?2, site_id = ?3,
                 artifact_name = ?4, artifact_type = ?5, description = ?6,
                 historical_significance = ?7, cultural_significance = ?8
             WHERE id = ?9 AND user_id = ?10",
            params![
                artifact.ethnic_group_id,
                artifact.culture_id,
                artifact.site_id,
                artifact.artifact_name,
                artifact.artifact_type,
                artifact.description,
                artifact.historical_significance,
                artifact.cultural_significance,
                artifact.id,
                artifact.user_id,
            ],
        )?;
        expect_updated(rows)?;
        insert_images(&tx, ImageParent::new(ImageKind::Artifact, artifact.id), images)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_artifact(&self, id: i64, owner_id: i64) -> Result<bool> {
        delete_owned(&self.conn(), "artifacts", id, owner_id)
    }

    // Event operations

    fn create_event(&self, event: &Event, images: &[String]) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO events (user_id, name, description, event_type) VALUES (?1, ?2, ?3, ?4)",
            params![
                event.user_id,
                event.name,
                event.description,
                event.event_type.map(EventType::as_str),
            ],
        )?;
        let id = tx.last_insert_rowid();
        insert_images(&tx, ImageParent::new(ImageKind::Event, id), images)?;

        tx.commit()?;
        Ok(id)
    }

    fn get_event(&self, id: i64, owner_id: i64) -> Result<Option<Event>> {
        let conn = self.conn();
        get_owned(&conn, "events", EVENT_COLUMNS, id, owner_id, row_to_event)
    }

    fn list_events(&self, owner_id: i64) -> Result<Vec<Event>> {
        let conn = self.conn();
        list_owned(&conn, "events", EVENT_COLUMNS, owner_id, None, row_to_event)
    }

    fn update_event(&self, event: &Event, images: &[String]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE events SET name = ?1, description = ?2, event_type = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![
                event.name,
                event.description,
                event.event_type.map(EventType::as_str),
                event.id,
                event.user_id,
            ],
        )?;
        expect_updated(rows)?;
        insert_images(&tx, ImageParent::new(ImageKind::Event, event.id), images)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_event(&self, id: i64, owner_id: i64) -> Result<bool> {
        delete_owned(&self.conn(), "events", id, owner_id)
    }

    // Publisher operations

    fn create_publisher(&self, publisher: &Publisher) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO publisher_documents (user_id, document, document_type, is_published, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                publisher.user_id,
                publisher.document,
                publisher.document_type.as_str(),
                publisher.is_published,
                format_datetime(&publisher.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_publisher(&self, id: i64, owner_id: i64) -> Result<Option<Publisher>> {
        let conn = self.conn();
        get_owned(
            &conn,
            "publisher_documents",
            PUBLISHER_COLUMNS,
            id,
            owner_id,
            row_to_publisher,
        )
    }

    fn list_publishers(&self, owner_id: i64) -> Result<Vec<Publisher>> {
        let conn = self.conn();
        list_owned(
            &conn,
            "publisher_documents",
            PUBLISHER_COLUMNS,
            owner_id,
            None,
            row_to_publisher,
        )
    }

    fn update_publisher(&self, publisher: &Publisher) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE publisher_documents SET document = ?1, document_type = ?2, is_published = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![
                publisher.document,
                publisher.document_type.as_str(),
                publisher.is_published,
                publisher.id,
                publisher.user_id,
            ],
        )?;
        expect_updated(rows)
    }

    fn delete_publisher(&self, id: i64, owner_id: i64) -> Result<bool> {
        delete_owned(&self.conn(), "publisher_documents", id, owner_id)
    }

    // Child image operations

    fn list_images(&self, parent: ImageParent) -> Result<Vec<Image>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, image FROM {} WHERE {} = ?1 ORDER BY id",
            parent.kind.table(),
            parent.kind.parent_column()
        ))?;

        let rows = stmt.query_map(params![parent.id], |row| {
            Ok(Image {
                id: row.get(0)?,
                image: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
