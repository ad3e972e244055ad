//! Read-through resolver over a data store
//!
//! Derives a key from the normalized logical query, serves cache hits as-is,
//! and on a miss fetches from the store and caches the result for the TTL of
//! its resource kind. Errors are returned to the caller and never cached.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::{
    BoundedTtlCache, CacheStats, CacheableValue, CachedValue, CostModel, ResourceKind, TtlTable,
    cache_key,
};
use crate::error::{Error, Result};
use crate::models::{
    CampaignTimeline, DashboardSummary, IndicatorWithRelations, SearchParams, SearchResult,
    TimelineQuery,
};
use crate::query::{TimeRange, compose_dashboard, compose_search, compose_timeline};
use crate::store::DataStore;

/// Resolver tuning
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    pub ttls: TtlTable,
    pub cost_model: CostModel,
    /// Deadline for a miss-path fetch; `None` waits indefinitely
    pub fetch_timeout: Option<Duration>,
}

/// Read-through cache in front of any [`DataStore`].
///
/// Concurrent misses on the same key are not collapsed: each one fetches and
/// writes, and the last write sets the TTL window. Dropping a resolve future
/// before its fetch completes leaves the cache untouched.
pub struct ReadThroughResolver<S: DataStore> {
    store: Arc<S>,
    cache: Option<Arc<BoundedTtlCache<CachedValue>>>,
    config: ResolverConfig,
}

#[derive(Serialize)]
struct IdParams<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct WindowParams {
    time_range: TimeRange,
}

impl<S: DataStore> ReadThroughResolver<S> {
    /// Create a resolver over `store` backed by a shared cache.
    pub fn new(store: Arc<S>, cache: Arc<BoundedTtlCache<CachedValue>>, config: ResolverConfig) -> Self {
        Self {
            store,
            cache: Some(cache),
            config,
        }
    }

    /// Create a resolver that always goes to the store (for `--no-cache`).
    pub fn uncached(store: Arc<S>, config: ResolverConfig) -> Self {
        Self {
            store,
            cache: None,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cache counters, if caching is enabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|c| c.stats())
    }

    /// Indicator detail by id.
    pub async fn resolve_indicator(&self, id: &str) -> Result<Arc<IndicatorWithRelations>> {
        self.read_through(ResourceKind::IndicatorDetail, &IdParams { id }, || {
            self.store.fetch_indicator(id)
        })
        .await
    }

    /// One page of indicator search results.
    pub async fn resolve_search(&self, params: &SearchParams) -> Result<Arc<SearchResult>> {
        let plan = compose_search(params);

        self.read_through(ResourceKind::IndicatorSearch, &plan.params, || async {
            self.store
                .fetch_search(&plan)
                .await
                .map(|(rows, total)| plan.to_result(rows, total))
        })
        .await
    }

    /// Campaign timeline.
    pub async fn resolve_timeline(&self, query: &TimelineQuery) -> Result<Arc<CampaignTimeline>> {
        let plan = compose_timeline(query);

        self.read_through(ResourceKind::CampaignTimeline, &plan.query, || {
            self.store.fetch_timeline(&query.campaign_id, &plan)
        })
        .await
    }

    /// Dashboard summary for a time window.
    ///
    /// The window start is computed when the store is actually queried, so a
    /// cached summary reflects the moment it was fetched.
    pub async fn resolve_dashboard(&self, time_range: &str) -> Result<Arc<DashboardSummary>> {
        let window = TimeRange::parse_lenient(time_range);

        self.read_through(
            ResourceKind::DashboardSummary,
            &WindowParams { time_range: window },
            || async move {
                let plan = compose_dashboard(window.as_str(), chrono::Utc::now());
                self.store.fetch_dashboard(&plan).await
            },
        )
        .await
    }

    async fn read_through<T, P, F, Fut>(&self, kind: ResourceKind, params: &P, fetch: F) -> Result<Arc<T>>
    where
        T: CacheableValue,
        P: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = cache_key(kind.namespace(), params);

        if let Some(ref cache) = self.cache
            && let Some(cached) = cache.get(&key)
            && let Some(value) = T::from_cached(&cached)
        {
            log::debug!("Cache hit: {}", kind);
            return Ok(value);
        }

        log::debug!("Cache miss: {}", kind);
        let value = Arc::new(self.fetch_with_deadline(kind, fetch()).await?);

        if let Some(ref cache) = self.cache {
            let cost = self.config.cost_model.cost_of(value.as_ref());
            cache.set_with_cost(
                key,
                T::into_cached(Arc::clone(&value)),
                self.config.ttls.ttl(kind),
                cost,
            );
        }

        Ok(value)
    }

    async fn fetch_with_deadline<T>(
        &self,
        kind: ResourceKind,
        fetch: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.config.fetch_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, fetch).await {
                Ok(result) => result,
                Err(_) => {
                    log::warn!("Fetch for {} timed out after {:?}", kind, deadline);
                    Err(Error::Timeout(deadline))
                }
            },
            None => fetch.await,
        }
    }
}
