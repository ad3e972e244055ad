//! Typed values held by the resolver cache

use serde::Serialize;
use std::sync::Arc;

use crate::models::{CampaignTimeline, DashboardSummary, IndicatorWithRelations, SearchResult};

/// A cached query result, tagged by resource kind.
#[derive(Debug, Clone)]
pub enum CachedValue {
    IndicatorDetail(Arc<IndicatorWithRelations>),
    IndicatorSearch(Arc<SearchResult>),
    CampaignTimeline(Arc<CampaignTimeline>),
    DashboardSummary(Arc<DashboardSummary>),
}

/// Result types that can round-trip through [`CachedValue`].
pub trait CacheableValue: Serialize + Send + Sync + Sized + 'static {
    fn into_cached(value: Arc<Self>) -> CachedValue;

    /// `None` when the entry holds a different kind.
    fn from_cached(cached: &CachedValue) -> Option<Arc<Self>>;
}

macro_rules! cacheable {
    ($ty:ty, $variant:ident) => {
        impl CacheableValue for $ty {
            fn into_cached(value: Arc<Self>) -> CachedValue {
                CachedValue::$variant(value)
            }

            fn from_cached(cached: &CachedValue) -> Option<Arc<Self>> {
                match cached {
                    CachedValue::$variant(value) => Some(Arc::clone(value)),
                    _ => None,
                }
            }
        }
    };
}

cacheable!(IndicatorWithRelations, IndicatorDetail);
cacheable!(SearchResult, IndicatorSearch);
cacheable!(CampaignTimeline, CampaignTimeline);
cacheable!(DashboardSummary, DashboardSummary);
