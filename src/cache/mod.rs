//! Read-through caching for threat-intelligence queries
//!
//! Query results are kept in a bounded in-memory cache keyed by resource kind
//! and canonical parameters. Every entry lives for the fixed TTL of its kind.

pub mod key;
pub mod resolver;
pub mod storage;
pub mod value;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Cache TTL configuration per resource kind
///
/// Short TTLs for high-cardinality query shapes, longer ones for expensive
/// aggregates.
pub struct CacheTtl;

impl CacheTtl {
    pub const INDICATOR_DETAIL: Duration = Duration::from_secs(2 * 60); // 2 min
    pub const INDICATOR_SEARCH: Duration = Duration::from_secs(30); // 30 sec
    pub const CAMPAIGN_TIMELINE: Duration = Duration::from_secs(60); // 1 min
    pub const DASHBOARD_SUMMARY: Duration = Duration::from_secs(5 * 60); // 5 min
}

/// Class of cached artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    IndicatorDetail,
    IndicatorSearch,
    CampaignTimeline,
    DashboardSummary,
}

impl ResourceKind {
    /// Key namespace for this kind.
    pub fn namespace(&self) -> &'static str {
        match self {
            ResourceKind::IndicatorDetail => "indicator-detail",
            ResourceKind::IndicatorSearch => "indicator-search",
            ResourceKind::CampaignTimeline => "campaign-timeline",
            ResourceKind::DashboardSummary => "dashboard-summary",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// TTL per resource kind. The default is the [`CacheTtl`] table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtlTable {
    pub indicator_detail: Duration,
    pub indicator_search: Duration,
    pub campaign_timeline: Duration,
    pub dashboard_summary: Duration,
}

impl TtlTable {
    /// Same TTL for every kind.
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            indicator_detail: ttl,
            indicator_search: ttl,
            campaign_timeline: ttl,
            dashboard_summary: ttl,
        }
    }

    pub fn ttl(&self, kind: ResourceKind) -> Duration {
        match kind {
            ResourceKind::IndicatorDetail => self.indicator_detail,
            ResourceKind::IndicatorSearch => self.indicator_search,
            ResourceKind::CampaignTimeline => self.campaign_timeline,
            ResourceKind::DashboardSummary => self.dashboard_summary,
        }
    }
}

impl Default for TtlTable {
    fn default() -> Self {
        Self {
            indicator_detail: CacheTtl::INDICATOR_DETAIL,
            indicator_search: CacheTtl::INDICATOR_SEARCH,
            campaign_timeline: CacheTtl::CAMPAIGN_TIMELINE,
            dashboard_summary: CacheTtl::DASHBOARD_SUMMARY,
        }
    }
}

/// How a cached value is charged against the cache budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostModel {
    /// One unit per entry
    #[default]
    Uniform,
    /// Serialized JSON size in bytes
    Bytes,
}

impl CostModel {
    pub fn cost_of<T: Serialize + ?Sized>(&self, value: &T) -> u32 {
        match self {
            CostModel::Uniform => 1,
            CostModel::Bytes => serde_json::to_vec(value)
                .map(|bytes| u32::try_from(bytes.len()).unwrap_or(u32::MAX))
                .unwrap_or(1),
        }
    }
}

// Re-export main types
pub use key::cache_key;
pub use resolver::{ReadThroughResolver, ResolverConfig};
pub use storage::{BoundedTtlCache, CacheConfig, CacheEntry, CacheStats};
pub use value::{CacheableValue, CachedValue};
