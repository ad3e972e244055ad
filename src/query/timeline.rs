//! Campaign timeline composition

use super::sql::{SelectBuilder, SqlArg, Statement, instant, truncate_timestamp};
use super::{Field, GroupBy, Operator, QueryPlan};
use crate::cache::ResourceKind;
use crate::models::TimelineQuery;

const OBSERVED_AT: &str = "COALESCE(i.first_seen, ic.added_at)";
const LAST_OBSERVED_AT: &str = "COALESCE(i.last_seen, ic.added_at)";

/// Render a julian day number back as an RFC 3339 timestamp.
fn instant_text(expr: &str) -> String {
    format!("strftime('%Y-%m-%dT%H:%M:%fZ', {})", expr)
}

/// A composed timeline: campaign header, bucket rows and campaign-wide summary.
///
/// The date range narrows the bucket rows only.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePlan {
    pub query: TimelineQuery,
    pub plan: QueryPlan,
    pub header: Statement,
    pub buckets: Statement,
    pub summary: Statement,
}

/// SQL expression for the bucket label (`YYYY-MM-DD`).
///
/// Weeks are labelled by the Monday that starts them.
fn bucket_expr(group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Day => format!("date({})", OBSERVED_AT),
        GroupBy::Week => format!("date({}, '-6 days', 'weekday 1')", OBSERVED_AT),
    }
}

impl TimelinePlan {
    pub fn group_by(&self) -> GroupBy {
        self.plan.group_by().unwrap_or_default()
    }
}

/// Correct the grouping to a supported value and cut the date range to the
/// precision it is bound with.
pub fn normalize_timeline(query: &TimelineQuery) -> TimelineQuery {
    TimelineQuery {
        campaign_id: query.campaign_id.clone(),
        group_by: GroupBy::parse_lenient(&query.group_by).as_str().to_string(),
        start_date: query.start_date.map(truncate_timestamp),
        end_date: query.end_date.map(truncate_timestamp),
    }
}

pub fn compose_timeline(query: &TimelineQuery) -> TimelinePlan {
    let query = normalize_timeline(query);
    let group_by = GroupBy::parse_lenient(&query.group_by);

    let plan = QueryPlan::builder(ResourceKind::CampaignTimeline.namespace())
        .filter_time(Field::ObservedAt, Operator::GtOrEq, query.start_date)
        .filter_time(Field::ObservedAt, Operator::LtOrEq, query.end_date)
        .group_by(group_by)
        .build();

    let campaign_arg = SqlArg::Text(query.campaign_id.clone());

    let header = SelectBuilder::select([
        "c.id".to_string(),
        "c.name".to_string(),
        "c.description".to_string(),
        "c.status".to_string(),
        instant_text(&format!("MIN({})", instant(OBSERVED_AT))),
        instant_text(&format!("MAX({})", instant(LAST_OBSERVED_AT))),
    ])
    .from("campaigns c")
    .join("LEFT JOIN indicator_campaigns ic ON ic.campaign_id = c.id")
    .join("LEFT JOIN indicators i ON i.id = ic.indicator_id")
    .where_bound(campaign_arg.clone(), |p| format!("c.id = {}", p))
    .group_by("c.id")
    .build();

    let buckets = SelectBuilder::select([
        format!("{} AS period", bucket_expr(plan.group_by().unwrap_or_default())),
        "i.id".to_string(),
        "i.type".to_string(),
        "i.value".to_string(),
    ])
    .from("indicators i")
    .join("JOIN indicator_campaigns ic ON ic.indicator_id = i.id")
    .where_bound(campaign_arg.clone(), |p| format!("ic.campaign_id = {}", p))
    .predicates(plan.predicates())
    .order_by("period DESC")
    .order_by("i.id ASC")
    .build();

    let summary = SelectBuilder::select([
        "COUNT(DISTINCT i.id)".to_string(),
        "COUNT(DISTINCT CASE WHEN i.type = 'ip' THEN i.id END)".to_string(),
        "COUNT(DISTINCT CASE WHEN i.type = 'domain' THEN i.id END)".to_string(),
        format!(
            "COALESCE(CAST(MAX({o}) - MIN({o}) AS INTEGER), 0)",
            o = instant(OBSERVED_AT)
        ),
    ])
    .from("indicators i")
    .join("JOIN indicator_campaigns ic ON ic.indicator_id = i.id")
    .where_bound(campaign_arg, |p| format!("ic.campaign_id = {}", p))
    .build();

    TimelinePlan {
        query,
        plan,
        header,
        buckets,
        summary,
    }
}
