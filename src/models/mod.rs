//! Threat-intelligence data models
//!
//! Logical queries (what callers ask for) and result shapes (what gets
//! cached and returned), organized by resource.

mod actor;
mod campaign;
mod dashboard;
mod indicator;
mod search;

pub use actor::{ThreatActor, ThreatActorWithCount};
pub use campaign::{
    CampaignDetail, CampaignTimeline, TimelineIndicator, TimelinePeriod, TimelineQuery,
    TimelineSummary,
};
pub use dashboard::DashboardSummary;
pub use indicator::{
    CampaignSummary, Indicator, IndicatorType, IndicatorWithRelations, RelatedIndicator,
    ThreatActorSummary,
};
pub use search::{DEFAULT_LIMIT, IndicatorSearchResult, MAX_LIMIT, SearchParams, SearchResult};
