//! Dashboard summary composition

use chrono::{DateTime, Utc};

use super::sql::{SelectBuilder, SqlArg, Statement, format_timestamp, instant, truncate_timestamp};
use super::{Field, Operator, QueryPlan, TimeRange};
use crate::cache::ResourceKind;

/// Number of threat actors in the dashboard ranking.
pub const TOP_ACTOR_LIMIT: i64 = 5;

const ACTOR_COLUMNS: [&str; 11] = [
    "ta.id",
    "ta.name",
    "ta.description",
    "ta.country",
    "ta.motivation",
    "ta.first_seen",
    "ta.last_seen",
    "ta.confidence_level",
    "ta.created_at",
    "ta.updated_at",
    "COUNT(DISTINCT ia.indicator_id) AS indicator_count",
];

/// A composed dashboard query set
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardPlan {
    pub window: TimeRange,
    /// Start of the window; indicators created at or after it are new
    pub cutoff: DateTime<Utc>,
    pub plan: QueryPlan,
    pub new_indicators: Statement,
    pub active_campaigns: Statement,
    pub top_actors: Statement,
    pub distribution: Statement,
}

/// Compose the dashboard for `time_range`, measured back from `now`.
pub fn compose_dashboard(time_range: &str, now: DateTime<Utc>) -> DashboardPlan {
    let window = TimeRange::parse_lenient(time_range);
    let cutoff = truncate_timestamp(now - window.duration());

    let plan = QueryPlan::builder(ResourceKind::DashboardSummary.namespace())
        .filter_time(Field::CreatedAt, Operator::GtOrEq, Some(cutoff))
        .build();

    let new_indicators = SelectBuilder::select(["i.type", "COUNT(*)"])
        .from("indicators i")
        .predicates(plan.predicates())
        .group_by("i.type")
        .build();

    let active_campaigns = SelectBuilder::select(["COUNT(*)"])
        .from("campaigns c")
        .where_bound(SqlArg::Text("active".into()), |p| format!("c.status = {}", p))
        .build();

    // Ties keep creation order
    let top_actors = SelectBuilder::select(ACTOR_COLUMNS)
        .from("threat_actors ta")
        .join("LEFT JOIN indicator_actors ia ON ia.actor_id = ta.id")
        .group_by("ta.id")
        .order_by("indicator_count DESC")
        .order_by(format!("{} ASC", instant("ta.created_at")))
        .order_by("ta.rowid ASC")
        .limit(TOP_ACTOR_LIMIT)
        .build();

    let distribution = SelectBuilder::select(["i.type", "COUNT(*)"])
        .from("indicators i")
        .group_by("i.type")
        .build();

    log::debug!(
        "Dashboard window {} starts at {}",
        window,
        format_timestamp(&cutoff)
    );

    DashboardPlan {
        window,
        cutoff,
        plan,
        new_indicators,
        active_campaigns,
        top_actors,
        distribution,
    }
}
