pub const SCHEMA: &str = r#"
-- Accounts; the email is the login identifier
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL DEFAULT '',
    password_hash TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_staff INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Tokens are auth credentials for users
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- lookup segment of the token for fast lookup
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,                   -- NULL = never
    last_used_at TEXT
);

-- Tags, unique per owner
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,

    UNIQUE(user_id, name)
);

-- Ethnic groups are deleted together with their owner
CREATE TABLE IF NOT EXISTS ethnic_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    language TEXT NOT NULL,
    population INTEGER NOT NULL CHECK (population >= 0),
    geography TEXT NOT NULL,
    history TEXT NOT NULL,
    image TEXT
);

CREATE TABLE IF NOT EXISTS ethnic_group_tags (
    ethnic_group_id INTEGER NOT NULL REFERENCES ethnic_groups(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (ethnic_group_id, tag_id)
);

-- Remaining records survive their owner and parents with the link cleared
CREATE TABLE IF NOT EXISTS cultures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    ethnic_group_id INTEGER REFERENCES ethnic_groups(id) ON DELETE SET NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    image TEXT
);

CREATE TABLE IF NOT EXISTS culture_tags (
    culture_id INTEGER NOT NULL REFERENCES cultures(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (culture_id, tag_id)
);

CREATE TABLE IF NOT EXISTS chiefs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    ethnic_group_id INTEGER REFERENCES ethnic_groups(id) ON DELETE SET NULL,
    name TEXT NOT NULL,
    chief_type TEXT CHECK (chief_type IN ('paramount', 'subchief', 'divisional')),
    date_of_birth TEXT,
    date_of_appointment TEXT,
    is_current INTEGER NOT NULL DEFAULT 0,
    bio TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS sites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    ethnic_group_id INTEGER REFERENCES ethnic_groups(id) ON DELETE SET NULL,
    culture_id INTEGER REFERENCES cultures(id) ON DELETE SET NULL,
    site_name TEXT NOT NULL,
    site_type TEXT NOT NULL CHECK (site_type IN ('cultural', 'natural')),
    importance INTEGER NOT NULL DEFAULT 1,
    sensitivity INTEGER NOT NULL DEFAULT 1,
    latitude REAL,
    longitude REAL,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS site_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_id INTEGER NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
    image TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS artifacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    ethnic_group_id INTEGER REFERENCES ethnic_groups(id) ON DELETE SET NULL,
    culture_id INTEGER REFERENCES cultures(id) ON DELETE SET NULL,
    site_id INTEGER REFERENCES sites(id) ON DELETE SET NULL,
    artifact_name TEXT NOT NULL,
    artifact_type TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    historical_significance REAL,
    cultural_significance REAL
);

CREATE TABLE IF NOT EXISTS artifact_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artifact_id INTEGER NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
    image TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    event_type TEXT CHECK (event_type IN ('traditional', 'festive', 'ritual'))
);

CREATE TABLE IF NOT EXISTS event_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    image TEXT NOT NULL
);

-- Published documents (PDF only, enforced on upload)
CREATE TABLE IF NOT EXISTS publisher_documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    document TEXT NOT NULL,
    document_type TEXT NOT NULL
        CHECK (document_type IN ('article', 'book', 'journal', 'report', 'thesis', 'other')),
    is_published INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Create indexes
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
CREATE INDEX IF NOT EXISTS idx_tags_user ON tags(user_id);
CREATE INDEX IF NOT EXISTS idx_ethnic_groups_user ON ethnic_groups(user_id);
CREATE INDEX IF NOT EXISTS idx_ethnic_group_tags_tag ON ethnic_group_tags(tag_id);
CREATE INDEX IF NOT EXISTS idx_cultures_user ON cultures(user_id);
CREATE INDEX IF NOT EXISTS idx_culture_tags_tag ON culture_tags(tag_id);
CREATE INDEX IF NOT EXISTS idx_chiefs_user ON chiefs(user_id);
CREATE INDEX IF NOT EXISTS idx_sites_user ON sites(user_id);
CREATE INDEX IF NOT EXISTS idx_site_images_site ON site_images(site_id);
CREATE INDEX IF NOT EXISTS idx_artifacts_user ON artifacts(user_id);
CREATE INDEX IF NOT EXISTS idx_artifact_images_artifact ON artifact_images(artifact_id);
CREATE INDEX IF NOT EXISTS idx_events_user ON events(user_id);
CREATE INDEX IF NOT EXISTS idx_event_images_event ON event_images(event_id);
CREATE INDEX IF NOT EXISTS idx_publisher_documents_user ON publisher_documents(user_id);
"#;
