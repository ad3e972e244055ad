//! Indicator models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of observable an indicator describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorType {
    Ip,
    Domain,
    Url,
    Hash,
}

impl IndicatorType {
    /// All indicator types, in display order.
    pub const ALL: [IndicatorType; 4] = [
        IndicatorType::Ip,
        IndicatorType::Domain,
        IndicatorType::Url,
        IndicatorType::Hash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorType::Ip => "ip",
            IndicatorType::Domain => "domain",
            IndicatorType::Url => "url",
            IndicatorType::Hash => "hash",
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ip" => Ok(IndicatorType::Ip),
            "domain" => Ok(IndicatorType::Domain),
            "url" => Ok(IndicatorType::Url),
            "hash" => Ok(IndicatorType::Hash),
            other => Err(format!(
                "invalid indicator type '{}' (expected one of: ip, domain, url, hash)",
                other
            )),
        }
    }
}

/// A single indicator of compromise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,

    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,

    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    pub confidence: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,

    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Free-form JSON metadata, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Indicator detail with its attributions, campaigns and neighbours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorWithRelations {
    #[serde(flatten)]
    pub indicator: Indicator,

    pub threat_actors: Vec<ThreatActorSummary>,
    pub campaigns: Vec<CampaignSummary>,
    pub related_indicators: Vec<RelatedIndicator>,
}

/// Another indicator linked through a shared campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedIndicator {
    pub id: String,
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    pub value: String,
    pub relationship: String,
}

/// Threat actor attribution as seen from an indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatActorSummary {
    pub id: String,
    pub name: String,
    /// Attribution confidence for this indicator
    pub confidence: i64,
}

/// Campaign membership as seen from an indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: String,
    pub name: String,
    pub active: bool,
}
