//! Threat actor models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked threat actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatActor {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,

    pub confidence_level: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Threat actor ranked by attributed indicator count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatActorWithCount {
    #[serde(flatten)]
    pub actor: ThreatActor,

    /// Distinct indicators attributed to this actor
    pub indicator_count: u64,
}
