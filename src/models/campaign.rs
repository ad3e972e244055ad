//! Campaign and campaign timeline models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::IndicatorType;

/// Logical timeline query as received from the caller.
///
/// `group_by` is kept as free text; unknown values are corrected to `day`
/// when the query is composed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineQuery {
    pub campaign_id: String,

    #[serde(default)]
    pub group_by: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl TimelineQuery {
    pub fn new(campaign_id: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            ..Self::default()
        }
    }

    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = group_by.into();
        self
    }

    pub fn start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }
}

/// Campaign timeline: header, buckets and campaign-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignTimeline {
    pub campaign: CampaignDetail,
    pub timeline: Vec<TimelinePeriod>,
    pub summary: TimelineSummary,
}

/// Campaign header with observed first/last activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDetail {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,

    pub status: String,
}

/// One day or week bucket of a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePeriod {
    /// Bucket start as `YYYY-MM-DD`
    pub period: String,
    pub indicators: Vec<TimelineIndicator>,
    pub counts: BTreeMap<String, u64>,
}

impl TimelinePeriod {
    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            indicators: Vec::new(),
            counts: BTreeMap::new(),
        }
    }

    /// Append an indicator and bump its type counter.
    pub fn push(&mut self, indicator: TimelineIndicator) {
        *self
            .counts
            .entry(indicator.indicator_type.as_str().to_string())
            .or_insert(0) += 1;
        self.indicators.push(indicator);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineIndicator {
    pub id: String,
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    pub value: String,
}

/// Campaign-wide statistics, independent of the date filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub total_indicators: u64,
    pub unique_ips: u64,
    pub unique_domains: u64,
    pub duration_days: i64,
}
