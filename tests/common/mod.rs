//! Shared fixtures for integration tests

#![allow(dead_code)]

use rusqlite::Connection;
use std::path::{Path, PathBuf};

use threatlens::SqliteStore;

/// Seed data: two actors, two campaigns, five indicators.
///
/// `c-1` (active) holds i-1..i-4, `c-2` (inactive) holds i-5.
/// i-4 is linked on a Sunday and i-2 on the following Monday.
pub const SEED: &str = r#"
INSERT INTO threat_actors (id, name, country, confidence_level, created_at, updated_at) VALUES
    ('ta-1', 'Ember Bear', 'RU', 70, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z'),
    ('ta-2', 'Quiet Heron', NULL, 40, '2024-01-02T00:00:00Z', '2024-01-02T00:00:00Z'),
    ('ta-3', 'Salt Moth', NULL, 30, '2024-01-03T00:00:00Z', '2024-01-03T00:00:00Z');

INSERT INTO campaigns (id, name, status, created_at, updated_at) VALUES
    ('c-1', 'Night Harvest', 'active', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z'),
    ('c-2', 'Old Frost', 'inactive', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z');

INSERT INTO indicators (id, type, value, confidence, first_seen, last_seen, created_at, updated_at) VALUES
    ('i-1', 'ip', '10.0.0.1', 90, '2024-03-04T10:00:00Z', '2024-03-12T00:00:00Z', '2024-03-04T10:00:00Z', '2024-03-04T10:00:00Z'),
    ('i-2', 'domain', 'Evil.Example', 60, NULL, NULL, '2024-03-05T00:00:00Z', '2024-03-05T00:00:00Z'),
    ('i-3', 'url', 'http://evil.example/100%_off', 55, '2024-03-06T00:00:00Z', '2024-03-06T00:00:00Z', '2024-03-06T00:00:00Z', '2024-03-06T00:00:00Z'),
    ('i-4', 'ip', '10.0.0.2', 40, '2024-03-10T23:00:00Z', '2024-03-20T00:00:00Z', '2024-03-07T00:00:00Z', '2024-03-07T00:00:00Z'),
    ('i-5', 'hash', 'd41d8cd98f00b204e9800998ecf8427e', 80, '2023-12-01T00:00:00Z', '2023-12-02T00:00:00Z', '2024-03-08T00:00:00Z', '2024-03-08T00:00:00Z');

INSERT INTO indicator_campaigns (indicator_id, campaign_id, added_at) VALUES
    ('i-1', 'c-1', '2024-03-04T12:00:00Z'),
    ('i-2', 'c-1', '2024-03-11T08:00:00Z'),
    ('i-3', 'c-1', '2024-03-06T00:00:00Z'),
    ('i-4', 'c-1', '2024-03-10T23:30:00Z'),
    ('i-5', 'c-2', '2023-12-01T00:00:00Z');

INSERT INTO indicator_actors (indicator_id, actor_id, attribution_confidence) VALUES
    ('i-1', 'ta-1', 85),
    ('i-4', 'ta-1', 50),
    ('i-2', 'ta-2', 65),
    ('i-5', 'ta-3', 20);
"#;

/// Create a schema'd database at `path` and load [`SEED`].
pub fn seed_database(path: &Path) {
    SqliteStore::open(path).unwrap();
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(SEED).unwrap();
}

/// Run extra SQL against the database.
pub fn execute(path: &Path, sql: &str) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(sql).unwrap();
}

/// Write a config file pointing at `database`.
pub fn write_config(dir: &Path, database: &Path, extra: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    let contents = format!("database:\n  path: {}\n{}", database.display(), extra);
    std::fs::write(&path, contents).unwrap();
    path
}
