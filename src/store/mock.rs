//! Mock data store for testing
//!
//! Provides an in-memory implementation of the fetcher traits that counts
//! calls, so resolver tests can assert exactly how often the store was hit.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{DashboardFetcher, IndicatorFetcher, SearchFetcher, TimelineFetcher};
use crate::error::{Error, Result};
use crate::models::{
    CampaignDetail, CampaignTimeline, DashboardSummary, Indicator, IndicatorSearchResult,
    IndicatorType, IndicatorWithRelations, TimelineSummary,
};
use crate::query::{DashboardPlan, SearchPlan, TimelinePlan};

/// Mock data store for testing.
///
/// # Example
/// ```ignore
/// let store = MockDataStore::new()
///     .with_indicator(sample_indicator("ind-1", IndicatorType::Ip, "10.0.0.1"))
///     .await;
///
/// let detail = store.fetch_indicator("ind-1").await?;
/// ```
#[derive(Default)]
pub struct MockDataStore {
    indicators: Arc<Mutex<HashMap<String, IndicatorWithRelations>>>,
    search_rows: Arc<Mutex<Vec<IndicatorSearchResult>>>,
    timelines: Arc<Mutex<HashMap<String, CampaignTimeline>>>,
    /// Artificial latency applied to every fetch
    delay: Arc<Mutex<Option<Duration>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<Error>>>,
    call_count: Arc<Mutex<CallCounts>>,
}

/// Tracks fetch counts for test verification
#[derive(Default, Debug, Clone, PartialEq)]
pub struct CallCounts {
    pub fetch_indicator: usize,
    pub fetch_search: usize,
    pub fetch_timeline: usize,
    pub fetch_dashboard: usize,
}

impl CallCounts {
    /// Get total number of fetches made.
    pub fn total(&self) -> usize {
        self.fetch_indicator + self.fetch_search + self.fetch_timeline + self.fetch_dashboard
    }
}

impl MockDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_indicator(self, detail: IndicatorWithRelations) -> Self {
        self.indicators
            .lock()
            .await
            .insert(detail.indicator.id.clone(), detail);
        self
    }

    pub async fn with_search_rows(self, rows: Vec<IndicatorSearchResult>) -> Self {
        *self.search_rows.lock().await = rows;
        self
    }

    pub async fn with_timeline(self, timeline: CampaignTimeline) -> Self {
        self.timelines
            .lock()
            .await
            .insert(timeline.campaign.id.clone(), timeline);
        self
    }

    /// Delay every fetch by `delay` before it completes.
    pub async fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().await = Some(delay);
        self
    }

    /// Configure an error to return on the next fetch.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: Error) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Record the call, apply the delay and surface any pending error.
    async fn begin(&self, record: impl FnOnce(&mut CallCounts)) -> Result<()> {
        record(&mut *self.call_count.lock().await);

        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.error.lock().await.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Minimal indicator detail for tests.
pub fn sample_indicator(id: &str, indicator_type: IndicatorType, value: &str) -> IndicatorWithRelations {
    let now = Utc::now();
    IndicatorWithRelations {
        indicator: Indicator {
            id: id.to_string(),
            indicator_type,
            value: value.to_string(),
            description: None,
            severity: None,
            confidence: 75,
            first_seen: Some(now),
            last_seen: Some(now),
            is_active: true,
            tags: vec![],
            metadata: None,
            source: None,
            created_at: now,
            updated_at: now,
        },
        threat_actors: vec![],
        campaigns: vec![],
        related_indicators: vec![],
    }
}

/// Empty timeline for a campaign.
pub fn sample_timeline(campaign_id: &str) -> CampaignTimeline {
    CampaignTimeline {
        campaign: CampaignDetail {
            id: campaign_id.to_string(),
            name: format!("Campaign {}", campaign_id),
            description: None,
            first_seen: None,
            last_seen: None,
            status: "active".to_string(),
        },
        timeline: vec![],
        summary: TimelineSummary::default(),
    }
}

#[async_trait]
impl IndicatorFetcher for MockDataStore {
    async fn fetch_indicator(&self, id: &str) -> Result<IndicatorWithRelations> {
        self.begin(|c| c.fetch_indicator += 1).await?;
        self.indicators
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Indicator {}", id)))
    }
}

#[async_trait]
impl SearchFetcher for MockDataStore {
    async fn fetch_search(&self, plan: &SearchPlan) -> Result<(Vec<IndicatorSearchResult>, u64)> {
        self.begin(|c| c.fetch_search += 1).await?;

        let rows = self.search_rows.lock().await;
        let pagination = plan.pagination();
        let page = rows
            .iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();

        Ok((page, rows.len() as u64))
    }
}

#[async_trait]
impl TimelineFetcher for MockDataStore {
    async fn fetch_timeline(
        &self,
        campaign_id: &str,
        _plan: &TimelinePlan,
    ) -> Result<CampaignTimeline> {
        self.begin(|c| c.fetch_timeline += 1).await?;
        self.timelines
            .lock()
            .await
            .get(campaign_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("Campaign {}", campaign_id)))
    }
}

#[async_trait]
impl DashboardFetcher for MockDataStore {
    async fn fetch_dashboard(&self, plan: &DashboardPlan) -> Result<DashboardSummary> {
        self.begin(|c| c.fetch_dashboard += 1).await?;
        Ok(DashboardSummary {
            time_range: plan.window.as_str().to_string(),
            new_indicators: BTreeMap::new(),
            active_campaigns: 0,
            top_threat_actors: vec![],
            indicator_distribution: BTreeMap::new(),
        })
    }
}
