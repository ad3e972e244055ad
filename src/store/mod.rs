//! Data-store collaborators
//!
//! The resolver depends on one capability trait per resource kind:
//! - [`IndicatorFetcher`] - indicator detail with relations
//! - [`SearchFetcher`] - one page of search rows plus the total match count
//! - [`TimelineFetcher`] - campaign timeline
//! - [`DashboardFetcher`] - dashboard aggregates
//!
//! [`DataStore`] combines all four and is implemented for anything that
//! implements them.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CampaignTimeline, DashboardSummary, IndicatorSearchResult, IndicatorWithRelations};
use crate::query::{DashboardPlan, SearchPlan, TimelinePlan};

#[cfg(test)]
pub mod mock;
pub mod schema;
pub mod sqlite;

#[cfg(test)]
pub use mock::MockDataStore;
pub use sqlite::SqliteStore;

/// Indicator detail lookup
#[async_trait]
pub trait IndicatorFetcher: Send + Sync {
    /// Fetch an indicator with its actors, campaigns and related indicators.
    ///
    /// Returns `Error::NotFound` when no indicator has this id.
    async fn fetch_indicator(&self, id: &str) -> Result<IndicatorWithRelations>;
}

/// Indicator search
#[async_trait]
pub trait SearchFetcher: Send + Sync {
    /// Fetch the requested page of rows and the total number of matches.
    async fn fetch_search(&self, plan: &SearchPlan) -> Result<(Vec<IndicatorSearchResult>, u64)>;
}

/// Campaign timeline
#[async_trait]
pub trait TimelineFetcher: Send + Sync {
    /// Returns `Error::NotFound` when the campaign does not exist.
    async fn fetch_timeline(&self, campaign_id: &str, plan: &TimelinePlan)
    -> Result<CampaignTimeline>;
}

/// Dashboard aggregates
#[async_trait]
pub trait DashboardFetcher: Send + Sync {
    async fn fetch_dashboard(&self, plan: &DashboardPlan) -> Result<DashboardSummary>;
}

/// Every capability the resolver needs
pub trait DataStore: IndicatorFetcher + SearchFetcher + TimelineFetcher + DashboardFetcher {}

impl<T> DataStore for T where T: IndicatorFetcher + SearchFetcher + TimelineFetcher + DashboardFetcher {}
