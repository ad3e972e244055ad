//! SQLite schema for the threat-intelligence store

use rusqlite::Connection;

use crate::error::StoreError;

/// Schema version recorded in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS threat_actors (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    country TEXT,
    motivation TEXT,
    first_seen TEXT,
    last_seen TEXT,
    confidence_level INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS campaigns (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    start_date TEXT,
    end_date TEXT,
    target_sectors TEXT NOT NULL DEFAULT '[]',
    target_regions TEXT NOT NULL DEFAULT '[]',
    threat_actor_id TEXT REFERENCES threat_actors(id),
    severity TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS indicators (
    id TEXT PRIMARY KEY NOT NULL,
    type TEXT NOT NULL CHECK (type IN ('ip', 'domain', 'url', 'hash')),
    value TEXT NOT NULL,
    description TEXT,
    severity TEXT,
    confidence INTEGER NOT NULL DEFAULT 0,
    first_seen TEXT,
    last_seen TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    tags TEXT NOT NULL DEFAULT '[]',
    metadata TEXT,
    source TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS indicator_campaigns (
    indicator_id TEXT NOT NULL REFERENCES indicators(id),
    campaign_id TEXT NOT NULL REFERENCES campaigns(id),
    added_at TEXT NOT NULL,
    PRIMARY KEY (indicator_id, campaign_id)
);

CREATE TABLE IF NOT EXISTS indicator_actors (
    indicator_id TEXT NOT NULL REFERENCES indicators(id),
    actor_id TEXT NOT NULL REFERENCES threat_actors(id),
    attribution_confidence INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (indicator_id, actor_id)
);

CREATE INDEX IF NOT EXISTS idx_indicators_type ON indicators(type);
CREATE INDEX IF NOT EXISTS idx_indicators_created_at ON indicators(created_at);
CREATE INDEX IF NOT EXISTS idx_indicator_campaigns_campaign ON indicator_campaigns(campaign_id);
CREATE INDEX IF NOT EXISTS idx_indicator_actors_actor ON indicator_actors(actor_id);
CREATE INDEX IF NOT EXISTS idx_campaigns_status ON campaigns(status);
"#;

/// Create missing tables and stamp the schema version.
///
/// A database stamped with a different non-zero version is refused rather
/// than rebuilt, since it holds data this process does not own.
pub fn initialize(conn: &Connection) -> Result<(), StoreError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |r| r.get(0))
        .unwrap_or(0);

    if version != 0 && version != SCHEMA_VERSION {
        return Err(StoreError::SchemaVersion {
            found: version,
            expected: SCHEMA_VERSION,
        });
    }

    conn.execute_batch(SCHEMA)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    Ok(())
}
