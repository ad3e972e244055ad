//! Dashboard summary model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ThreatActorWithCount;

/// Aggregate dashboard view over a time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Window the new-indicator counts cover (`24h`, `7d`, `30d`)
    pub time_range: String,
    /// New indicators per type created within the window
    pub new_indicators: BTreeMap<String, u64>,
    pub active_campaigns: u64,
    /// Top five actors by distinct attributed indicators
    pub top_threat_actors: Vec<ThreatActorWithCount>,
    /// All-time indicator count per type
    pub indicator_distribution: BTreeMap<String, u64>,
}
