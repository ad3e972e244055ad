//! Indicator search query and result models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::IndicatorType;

/// Default page size for indicator search
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page size a caller may request
pub const MAX_LIMIT: i64 = 100;

/// Logical indicator search query.
///
/// Every filter is optional; an empty filter set matches all indicators.
/// `page` and `limit` are signed so out-of-range caller input survives until
/// it is normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub indicator_type: Option<IndicatorType>,

    /// Case-insensitive substring of the indicator value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(rename = "threat_actor", default, skip_serializing_if = "Option::is_none")]
    pub threat_actor_id: Option<String>,

    #[serde(rename = "campaign", default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen_after: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_before: Option<DateTime<Utc>>,

    #[serde(default)]
    pub page: i64,

    #[serde(default)]
    pub limit: i64,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indicator_type(mut self, t: IndicatorType) -> Self {
        self.indicator_type = Some(t);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn threat_actor(mut self, id: impl Into<String>) -> Self {
        self.threat_actor_id = Some(id.into());
        self
    }

    pub fn campaign(mut self, id: impl Into<String>) -> Self {
        self.campaign_id = Some(id.into());
        self
    }

    pub fn first_seen_after(mut self, at: DateTime<Utc>) -> Self {
        self.first_seen_after = Some(at);
        self
    }

    pub fn last_seen_before(mut self, at: DateTime<Utc>) -> Self {
        self.last_seen_before = Some(at);
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

/// One page of indicator search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub data: Vec<IndicatorSearchResult>,
    pub total: u64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: u64,
}

/// Search row with relationship counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    pub value: String,
    pub confidence: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<Utc>>,
    pub campaign_count: u64,
    pub threat_actor_count: u64,
}
