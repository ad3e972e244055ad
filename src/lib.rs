//! ThreatLens - read-through cached queries over threat-intelligence data
//!
//! Indicator lookups, indicator searches, campaign timelines and dashboard
//! summaries are resolved through a bounded in-memory cache with a fixed TTL
//! per resource kind, in front of a SQLite data store.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod query;
pub mod store;

pub use cache::{BoundedTtlCache, CacheConfig, ReadThroughResolver, ResolverConfig, cache_key};
pub use error::{Error, Result};
pub use store::{DataStore, SqliteStore};
