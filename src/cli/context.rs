//! Command execution context
//!
//! Builds the data store, cache and resolver once per invocation so command
//! handlers only deal with their own query.

use std::future::Future;
use std::sync::Arc;

use crate::cache::{BoundedTtlCache, ReadThroughResolver};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::store::SqliteStore;

/// Context for command execution containing config, resolver, and runtime options.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Read-through resolver over the SQLite store
    pub resolver: ReadThroughResolver<SqliteStore>,
    /// Output format preference
    pub format: OutputFormat,
    /// Times each query is resolved
    pub repeat: u32,
}

impl CommandContext {
    /// Create a command context from loaded config and global options.
    ///
    /// CLI/env overrides win over the config file. The cache is skipped
    /// entirely when disabled by either.
    pub fn new(mut config: Config, opts: &GlobalOptions) -> Result<Self> {
        if let Some(ref database) = opts.database {
            config.database.path = Some(database.clone());
        }
        if opts.no_cache {
            config.cache.enabled = false;
        }
        config.validate()?;

        let store = Arc::new(SqliteStore::open(&config.database_path()?)?);
        let resolver_config = config.resolver_config();

        let resolver = if config.cache.enabled {
            let cache = Arc::new(BoundedTtlCache::new(config.cache_config())?);
            ReadThroughResolver::new(store, cache, resolver_config)
        } else {
            log::debug!("Query cache disabled");
            ReadThroughResolver::uncached(store, resolver_config)
        };

        Ok(Self {
            config,
            resolver,
            format: opts.format,
            repeat: opts.repeat,
        })
    }

    /// Resolve `query` `repeat` times, returning the last result.
    ///
    /// Cache statistics are logged afterwards when the cache is enabled.
    pub async fn resolve_repeated<T, F, Fut>(&self, mut query: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut result = query().await?;
        for _ in 1..self.repeat {
            result = query().await?;
        }

        if let Some(stats) = self.resolver.cache_stats() {
            log::info!(
                "Cache: {} hits, {} misses ({:.0}% hit rate), {} entries",
                stats.hits,
                stats.misses,
                stats.hit_rate() * 100.0,
                stats.entry_count
            );
        }

        Ok(result)
    }
}
