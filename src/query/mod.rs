//! Query composition
//!
//! Turns optional, independently supplied criteria into canonical
//! [`QueryPlan`]s and renders them to parameterized SQL. Out-of-range enum and
//! pagination input is corrected here rather than rejected.

pub mod dashboard;
pub mod search;
pub mod sql;
pub mod timeline;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use dashboard::{DashboardPlan, compose_dashboard};
pub use search::{SearchPlan, compose_search, normalize_search};
pub use sql::{SelectBuilder, SqlArg, Statement};
pub use timeline::{TimelinePlan, compose_timeline};

/// Filterable field of a query plan.
///
/// Declaration order is the canonical predicate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    IndicatorType,
    IndicatorValue,
    ThreatActor,
    Campaign,
    FirstSeen,
    LastSeen,
    /// First-seen time, else the time the indicator joined the campaign
    ObservedAt,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    Eq,
    ContainsIgnoreCase,
    GtOrEq,
    LtOrEq,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanValue {
    Text(String),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: Field,
    pub op: Operator,
    pub value: PlanValue,
}

/// Normalized page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Rows skipped before this page. Saturates instead of overflowing on
    /// very large pages, which then simply come back empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Pages needed to hold `total` rows.
    pub fn total_pages(&self, total: u64) -> u64 {
        total_pages(total, self.limit)
    }
}

/// `ceil(total / limit)`, zero when `limit` is not positive.
pub fn total_pages(total: u64, limit: i64) -> u64 {
    if limit <= 0 {
        return 0;
    }
    total.div_ceil(limit as u64)
}

/// Timeline bucket width
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Week,
}

impl GroupBy {
    /// Parse a bucket width, falling back to `day` for anything unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "week" => GroupBy::Week,
            _ => GroupBy::Day,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Day => "day",
            GroupBy::Week => "week",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard look-back window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "24h")]
    Last24h,
    #[default]
    #[serde(rename = "7d")]
    Last7d,
    #[serde(rename = "30d")]
    Last30d,
}

impl TimeRange {
    /// Parse a window, falling back to `7d` for anything unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "24h" => TimeRange::Last24h,
            "30d" => TimeRange::Last30d,
            _ => TimeRange::Last7d,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last24h => "24h",
            TimeRange::Last7d => "7d",
            TimeRange::Last30d => "30d",
        }
    }

    pub fn duration(&self) -> ChronoDuration {
        match self {
            TimeRange::Last24h => ChronoDuration::hours(24),
            TimeRange::Last7d => ChronoDuration::days(7),
            TimeRange::Last30d => ChronoDuration::days(30),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical, immutable description of one query.
///
/// Predicates are kept sorted by `(field, operator)`, so plans built from the
/// same criteria compare equal no matter what order the criteria arrived in.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    namespace: &'static str,
    predicates: Vec<Predicate>,
    pagination: Option<Pagination>,
    group_by: Option<GroupBy>,
}

impl QueryPlan {
    pub fn builder(namespace: &'static str) -> QueryPlanBuilder {
        QueryPlanBuilder {
            plan: QueryPlan {
                namespace,
                predicates: Vec::new(),
                pagination: None,
                group_by: None,
            },
        }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn group_by(&self) -> Option<GroupBy> {
        self.group_by
    }

    /// The same plan without pagination, for counting the full result set.
    pub fn without_pagination(&self) -> QueryPlan {
        QueryPlan {
            pagination: None,
            ..self.clone()
        }
    }
}

/// Builder for [`QueryPlan`]
#[derive(Debug)]
pub struct QueryPlanBuilder {
    plan: QueryPlan,
}

impl QueryPlanBuilder {
    pub fn filter(mut self, field: Field, op: Operator, value: PlanValue) -> Self {
        self.plan.predicates.push(Predicate { field, op, value });
        self
    }

    /// Add a text predicate when the value is present and non-empty.
    pub fn filter_text(self, field: Field, op: Operator, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.filter(field, op, PlanValue::Text(v.to_string())),
            _ => self,
        }
    }

    /// Add a timestamp predicate when the value is present.
    pub fn filter_time(self, field: Field, op: Operator, value: Option<DateTime<Utc>>) -> Self {
        match value {
            Some(at) => self.filter(field, op, PlanValue::Timestamp(at)),
            None => self,
        }
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.plan.pagination = Some(pagination);
        self
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.plan.group_by = Some(group_by);
        self
    }

    pub fn build(mut self) -> QueryPlan {
        self.plan
            .predicates
            .sort_by(|a, b| (a.field, a.op).cmp(&(b.field, b.op)));
        self.plan
    }
}
