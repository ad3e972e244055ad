//! SQLite-backed threat-intelligence store
//!
//! Blocking `rusqlite` calls run on tokio's blocking pool; the connection is
//! shared behind a mutex.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::schema;
use super::{DashboardFetcher, IndicatorFetcher, SearchFetcher, TimelineFetcher};
use crate::cache::ResourceKind;
use crate::error::{Error, Result, StoreError};
use crate::models::{
    CampaignDetail, CampaignSummary, CampaignTimeline, DashboardSummary, Indicator,
    IndicatorSearchResult, IndicatorType, IndicatorWithRelations, RelatedIndicator, ThreatActor,
    ThreatActorSummary, ThreatActorWithCount, TimelineIndicator, TimelinePeriod, TimelineSummary,
};
use crate::query::sql::{FOLD_CASE_FN, fold_case};
use crate::query::{DashboardPlan, SearchPlan, Statement, TimelinePlan};

/// Related indicators returned with an indicator detail
const RELATED_LIMIT: i64 = 5;

const INDICATOR_QUERY: &str = "SELECT id, type, value, description, severity, confidence, \
     first_seen, last_seen, is_active, tags, metadata, source, created_at, updated_at \
     FROM indicators WHERE id = ?1";

const INDICATOR_ACTORS_QUERY: &str = "SELECT ta.id, ta.name, ia.attribution_confidence \
     FROM threat_actors ta JOIN indicator_actors ia ON ia.actor_id = ta.id \
     WHERE ia.indicator_id = ?1 ORDER BY ta.name, ta.id";

const INDICATOR_CAMPAIGNS_QUERY: &str = "SELECT c.id, c.name, c.status \
     FROM campaigns c JOIN indicator_campaigns ic ON ic.campaign_id = c.id \
     WHERE ic.indicator_id = ?1 ORDER BY c.name, c.id";

const RELATED_INDICATORS_QUERY: &str = "SELECT DISTINCT i.id, i.type, i.value, i.last_seen \
     FROM indicators i JOIN indicator_campaigns ic ON ic.indicator_id = i.id \
     WHERE ic.campaign_id IN (SELECT campaign_id FROM indicator_campaigns WHERE indicator_id = ?1) \
     AND i.id != ?1 \
     ORDER BY julianday(i.last_seen) DESC NULLS LAST, i.id ASC LIMIT ?2";

/// Threat-intelligence store on a single SQLite connection
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        log::debug!("Opening data store at {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        register_functions(&conn)?;
        schema::initialize(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, label: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let started = Instant::now();

        let result = tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?;

        log::debug!("Store {} took {:?}", label, started.elapsed());
        result
    }
}

/// Install the SQL functions the composed queries call.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| fold_case(&t)))
        },
    )
}

// ============================================================================
// Row decoding
// ============================================================================

/// Parse a stored timestamp. Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and
/// bare dates, all read as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }
    Err(StoreError::InvalidRow(format!("invalid timestamp '{}'", raw)))
}

fn parse_optional_timestamp(
    raw: Option<String>,
) -> std::result::Result<Option<DateTime<Utc>>, StoreError> {
    raw.as_deref().map(parse_timestamp).transpose()
}

fn parse_type(raw: &str) -> std::result::Result<IndicatorType, StoreError> {
    raw.parse().map_err(StoreError::InvalidRow)
}

fn parse_string_list(raw: &str) -> std::result::Result<Vec<String>, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::InvalidRow(format!("invalid list '{}': {}", raw, e)))
}

fn count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

/// Raw `indicators` row before decoding
struct IndicatorRow {
    id: String,
    indicator_type: String,
    value: String,
    description: Option<String>,
    severity: Option<String>,
    confidence: i64,
    first_seen: Option<String>,
    last_seen: Option<String>,
    is_active: bool,
    tags: String,
    metadata: Option<String>,
    source: Option<String>,
    created_at: String,
    updated_at: String,
}

impl IndicatorRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            indicator_type: row.get(1)?,
            value: row.get(2)?,
            description: row.get(3)?,
            severity: row.get(4)?,
            confidence: row.get(5)?,
            first_seen: row.get(6)?,
            last_seen: row.get(7)?,
            is_active: row.get(8)?,
            tags: row.get(9)?,
            metadata: row.get(10)?,
            source: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }
}

impl TryFrom<IndicatorRow> for Indicator {
    type Error = StoreError;

    fn try_from(row: IndicatorRow) -> std::result::Result<Self, Self::Error> {
        Ok(Indicator {
            indicator_type: parse_type(&row.indicator_type)?,
            first_seen: parse_optional_timestamp(row.first_seen)?,
            last_seen: parse_optional_timestamp(row.last_seen)?,
            tags: parse_string_list(&row.tags)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            id: row.id,
            value: row.value,
            description: row.description,
            severity: row.severity,
            confidence: row.confidence,
            is_active: row.is_active,
            metadata: row.metadata,
            source: row.source,
        })
    }
}

/// Raw `threat_actors` row with its indicator count
struct ActorRow {
    id: String,
    name: String,
    description: Option<String>,
    country: Option<String>,
    motivation: Option<String>,
    first_seen: Option<String>,
    last_seen: Option<String>,
    confidence_level: i64,
    created_at: String,
    updated_at: String,
    indicator_count: i64,
}

impl ActorRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            country: row.get(3)?,
            motivation: row.get(4)?,
            first_seen: row.get(5)?,
            last_seen: row.get(6)?,
            confidence_level: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            indicator_count: row.get(10)?,
        })
    }
}

impl TryFrom<ActorRow> for ThreatActorWithCount {
    type Error = StoreError;

    fn try_from(row: ActorRow) -> std::result::Result<Self, Self::Error> {
        Ok(ThreatActorWithCount {
            actor: ThreatActor {
                first_seen: parse_optional_timestamp(row.first_seen)?,
                last_seen: parse_optional_timestamp(row.last_seen)?,
                created_at: parse_timestamp(&row.created_at)?,
                updated_at: parse_timestamp(&row.updated_at)?,
                id: row.id,
                name: row.name,
                description: row.description,
                country: row.country,
                motivation: row.motivation,
                confidence_level: row.confidence_level,
            },
            indicator_count: count(row.indicator_count),
        })
    }
}

/// Collect every row of `statement` through `map`.
fn query_all<T, F>(conn: &Connection, statement: &Statement, map: F) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(&statement.sql)?;
    let rows = stmt
        .query_map(params_from_iter(statement.args.iter()), map)?
        .collect::<rusqlite::Result<Vec<T>>>()?;
    Ok(rows)
}

/// `(type, count)` rows into a count map.
fn type_counts(conn: &Connection, statement: &Statement) -> Result<BTreeMap<String, u64>> {
    let rows = query_all(conn, statement, |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    Ok(rows.into_iter().map(|(t, n)| (t, count(n))).collect())
}

fn single_count(conn: &Connection, statement: &Statement) -> Result<u64> {
    let n: i64 = conn.query_row(
        &statement.sql,
        params_from_iter(statement.args.iter()),
        |row| row.get(0),
    )?;
    Ok(count(n))
}

// ============================================================================
// Fetchers
// ============================================================================

fn load_indicator(conn: &Connection, id: &str) -> Result<IndicatorWithRelations> {
    let row = conn
        .query_row(INDICATOR_QUERY, [id], IndicatorRow::from_row)
        .optional()?
        .ok_or_else(|| Error::not_found(format!("Indicator {}", id)))?;
    let indicator = Indicator::try_from(row)?;

    let threat_actors = conn
        .prepare(INDICATOR_ACTORS_QUERY)?
        .query_map([id], |row| {
            Ok(ThreatActorSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                confidence: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let campaigns = conn
        .prepare(INDICATOR_CAMPAIGNS_QUERY)?
        .query_map([id], |row| {
            let status: String = row.get(2)?;
            Ok(CampaignSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                active: status == "active",
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let related_rows = conn
        .prepare(RELATED_INDICATORS_QUERY)?
        .query_map(rusqlite::params![id, RELATED_LIMIT], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let related_indicators = related_rows
        .into_iter()
        .map(|(id, t, value)| {
            Ok(RelatedIndicator {
                id,
                indicator_type: parse_type(&t)?,
                value,
                relationship: "same_campaign".to_string(),
            })
        })
        .collect::<std::result::Result<Vec<_>, StoreError>>()?;

    Ok(IndicatorWithRelations {
        indicator,
        threat_actors,
        campaigns,
        related_indicators,
    })
}

fn load_search(conn: &Connection, plan: &SearchPlan) -> Result<(Vec<IndicatorSearchResult>, u64)> {
    let total = single_count(conn, &plan.count)?;

    let raw = query_all(conn, &plan.rows, |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, i64>(5)?,
            row.get::<_, i64>(6)?,
        ))
    })?;

    let rows = raw
        .into_iter()
        .map(|(id, t, value, confidence, first_seen, campaigns, actors)| {
            Ok(IndicatorSearchResult {
                id,
                indicator_type: parse_type(&t)?,
                value,
                confidence,
                first_seen: parse_optional_timestamp(first_seen)?,
                campaign_count: count(campaigns),
                threat_actor_count: count(actors),
            })
        })
        .collect::<std::result::Result<Vec<_>, StoreError>>()?;

    Ok((rows, total))
}

fn load_timeline(conn: &Connection, campaign_id: &str, plan: &TimelinePlan) -> Result<CampaignTimeline> {
    let header = conn
        .query_row(
            &plan.header.sql,
            params_from_iter(plan.header.args.iter()),
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| Error::not_found(format!("Campaign {}", campaign_id)))?;

    let (id, name, description, status, first_seen, last_seen) = header;
    let campaign = CampaignDetail {
        id,
        name,
        description,
        first_seen: parse_optional_timestamp(first_seen)?,
        last_seen: parse_optional_timestamp(last_seen)?,
        status,
    };

    let bucket_rows = query_all(conn, &plan.buckets, |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    // Rows arrive grouped by period, newest first
    let mut timeline: Vec<TimelinePeriod> = Vec::new();
    for (period, id, t, value) in bucket_rows {
        let indicator = TimelineIndicator {
            id,
            indicator_type: parse_type(&t)?,
            value,
        };
        match timeline.last_mut() {
            Some(current) if current.period == period => current.push(indicator),
            _ => {
                let mut bucket = TimelinePeriod::new(period);
                bucket.push(indicator);
                timeline.push(bucket);
            }
        }
    }

    let summary = conn.query_row(
        &plan.summary.sql,
        params_from_iter(plan.summary.args.iter()),
        |row| {
            Ok(TimelineSummary {
                total_indicators: count(row.get(0)?),
                unique_ips: count(row.get(1)?),
                unique_domains: count(row.get(2)?),
                duration_days: row.get(3)?,
            })
        },
    )?;

    Ok(CampaignTimeline {
        campaign,
        timeline,
        summary,
    })
}

fn load_dashboard(conn: &Connection, plan: &DashboardPlan) -> Result<DashboardSummary> {
    let new_indicators = type_counts(conn, &plan.new_indicators)?;
    let active_campaigns = single_count(conn, &plan.active_campaigns)?;
    let indicator_distribution = type_counts(conn, &plan.distribution)?;

    let top_threat_actors = query_all(conn, &plan.top_actors, ActorRow::from_row)?
        .into_iter()
        .map(ThreatActorWithCount::try_from)
        .collect::<std::result::Result<Vec<_>, StoreError>>()?;

    Ok(DashboardSummary {
        time_range: plan.window.as_str().to_string(),
        new_indicators,
        active_campaigns,
        top_threat_actors,
        indicator_distribution,
    })
}

#[async_trait]
impl IndicatorFetcher for SqliteStore {
    async fn fetch_indicator(&self, id: &str) -> Result<IndicatorWithRelations> {
        let id = id.to_string();
        self.with_conn(ResourceKind::IndicatorDetail.namespace(), move |conn| {
            load_indicator(conn, &id)
        })
            .await
    }
}

#[async_trait]
impl SearchFetcher for SqliteStore {
    async fn fetch_search(&self, plan: &SearchPlan) -> Result<(Vec<IndicatorSearchResult>, u64)> {
        let plan = plan.clone();
        self.with_conn(plan.plan.namespace(), move |conn| load_search(conn, &plan))
            .await
    }
}

#[async_trait]
impl TimelineFetcher for SqliteStore {
    async fn fetch_timeline(
        &self,
        campaign_id: &str,
        plan: &TimelinePlan,
    ) -> Result<CampaignTimeline> {
        let campaign_id = campaign_id.to_string();
        let plan = plan.clone();
        self.with_conn(plan.plan.namespace(), move |conn| {
            load_timeline(conn, &campaign_id, &plan)
        })
        .await
    }
}

#[async_trait]
impl DashboardFetcher for SqliteStore {
    async fn fetch_dashboard(&self, plan: &DashboardPlan) -> Result<DashboardSummary> {
        let plan = plan.clone();
        self.with_conn(plan.plan.namespace(), move |conn| load_dashboard(conn, &plan))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SearchParams, TimelineQuery};
    use crate::query::{compose_dashboard, compose_search, compose_timeline};
    use chrono::TimeZone;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute_batch(
                r#"
                INSERT INTO threat_actors (id, name, confidence_level, created_at, updated_at) VALUES
                    ('ta-1', 'Ember Bear', 70, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z'),
                    ('ta-2', 'Quiet Heron', 40, '2024-01-02T00:00:00Z', '2024-01-02T00:00:00Z');
                INSERT INTO campaigns (id, name, status, created_at, updated_at) VALUES
                    ('c-1', 'Night Harvest', 'active', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z'),
                    ('c-2', 'Old Frost', 'inactive', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z');
                INSERT INTO indicators (id, type, value, confidence, first_seen, last_seen, tags, created_at, updated_at) VALUES
                    ('i-1', 'ip', '10.0.0.1', 90, '2024-03-04T10:00:00Z', '2024-03-10T00:00:00Z', '["c2"]', '2024-03-04T10:00:00Z', '2024-03-04T10:00:00Z'),
                    ('i-2', 'domain', 'evil.example', 60, '2024-03-06T08:00:00Z', NULL, '[]', '2024-03-06T08:00:00Z', '2024-03-06T08:00:00Z'),
                    ('i-3', 'ip', '10.0.0.2', 50, NULL, '2024-03-20T00:00:00Z', '[]', '2024-03-07T00:00:00Z', '2024-03-07T00:00:00Z');
                INSERT INTO indicator_campaigns (indicator_id, campaign_id, added_at) VALUES
                    ('i-1', 'c-1', '2024-03-04T12:00:00Z'),
                    ('i-2', 'c-1', '2024-03-06T09:00:00Z'),
                    ('i-3', 'c-1', '2024-03-11T00:00:00Z');
                INSERT INTO indicator_actors (indicator_id, actor_id, attribution_confidence) VALUES
                    ('i-1', 'ta-1', 85),
                    ('i-2', 'ta-1', 55);
                "#,
            )
            .unwrap();
        }
        store
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-04T10:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-04 10:00:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-04").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_fetch_indicator_with_relations() {
        let store = seeded();
        let detail = store.fetch_indicator("i-1").await.unwrap();

        assert_eq!(detail.indicator.value, "10.0.0.1");
        assert_eq!(detail.indicator.tags, vec!["c2".to_string()]);
        assert_eq!(detail.threat_actors.len(), 1);
        assert_eq!(detail.threat_actors[0].confidence, 85);
        assert_eq!(detail.campaigns.len(), 1);
        assert!(detail.campaigns[0].active);

        // i-3 was seen most recently, i-2 never
        let related: Vec<_> = detail.related_indicators.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(related, vec!["i-3", "i-2"]);
        assert!(detail.related_indicators.iter().all(|r| r.relationship == "same_campaign"));
    }

    #[tokio::test]
    async fn test_fetch_indicator_not_found() {
        let store = seeded();
        let err = store.fetch_indicator("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_search_counts() {
        let store = seeded();
        let plan = compose_search(&SearchParams::new().indicator_type(IndicatorType::Ip));
        let (rows, total) = store.fetch_search(&plan).await.unwrap();

        assert_eq!(total, 2);
        // Newest created first
        assert_eq!(rows[0].id, "i-3");
        assert_eq!(rows[1].id, "i-1");
        assert_eq!(rows[1].campaign_count, 1);
        assert_eq!(rows[1].threat_actor_count, 1);
        assert_eq!(rows[0].threat_actor_count, 0);
    }

    #[tokio::test]
    async fn test_fetch_timeline() {
        let store = seeded();
        let plan = compose_timeline(&TimelineQuery::new("c-1"));
        let timeline = store.fetch_timeline("c-1", &plan).await.unwrap();

        let periods: Vec<_> = timeline.timeline.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-03-11", "2024-03-06", "2024-03-04"]);
        assert_eq!(timeline.summary.total_indicators, 3);
        assert_eq!(timeline.summary.unique_ips, 2);
        assert_eq!(timeline.summary.unique_domains, 1);
        assert_eq!(timeline.summary.duration_days, 6);
        assert_eq!(
            timeline.campaign.first_seen,
            Some(Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap())
        );
        assert_eq!(
            timeline.campaign.last_seen,
            Some(Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_time_filters_compare_instants() {
        let store = seeded();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO indicators (id, type, value, first_seen, last_seen, created_at, updated_at) \
                 VALUES ('i-9', 'ip', '10.0.0.9', '2024-03-06 10:00:00', '2024-03-08 10:00:00', \
                 '2024-03-07 12:00:00', '2024-03-07 12:00:00')",
                [],
            )
            .unwrap();
        }

        let after = Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap();
        let plan = compose_search(&SearchParams::new().value("10.0.0.9").first_seen_after(after));
        let (rows, total) = store.fetch_search(&plan).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "i-9");

        let before = Utc.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap();
        let plan = compose_search(&SearchParams::new().value("10.0.0.9").last_seen_before(before));
        assert_eq!(store.fetch_search(&plan).await.unwrap().1, 0);

        // Created after i-3 even though its text sorts before it
        let plan = compose_search(&SearchParams::new().indicator_type(IndicatorType::Ip));
        let (rows, _) = store.fetch_search(&plan).await.unwrap();
        assert_eq!(rows[0].id, "i-9");
    }

    #[tokio::test]
    async fn test_value_filter_folds_unicode() {
        let store = seeded();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO indicators (id, type, value, created_at, updated_at) \
                 VALUES ('i-8', 'domain', 'ÉVIL.example', '2024-03-08T00:00:00Z', '2024-03-08T00:00:00Z')",
                [],
            )
            .unwrap();
        }

        let plan = compose_search(&SearchParams::new().value("évil"));
        let (rows, total) = store.fetch_search(&plan).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, "i-8");
    }

    #[tokio::test]
    async fn test_fetch_timeline_unknown_campaign() {
        let store = seeded();
        let plan = compose_timeline(&TimelineQuery::new("nope"));
        let err = store.fetch_timeline("nope", &plan).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_dashboard() {
        let store = seeded();
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let plan = compose_dashboard("24h", now);
        let summary = store.fetch_dashboard(&plan).await.unwrap();

        assert_eq!(summary.time_range, "24h");
        assert_eq!(summary.new_indicators.get("ip"), Some(&1));
        assert_eq!(summary.new_indicators.get("domain"), None);
        assert_eq!(summary.active_campaigns, 1);
        assert_eq!(summary.indicator_distribution.get("ip"), Some(&2));
        assert_eq!(summary.top_threat_actors[0].actor.id, "ta-1");
        assert_eq!(summary.top_threat_actors[0].indicator_count, 2);
        assert_eq!(summary.top_threat_actors[1].indicator_count, 0);
    }
}
