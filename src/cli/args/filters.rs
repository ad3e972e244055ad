//! Filter argument types for CLI commands

use chrono::{DateTime, Utc};
use clap::Args;

use super::{PaginationArgs, parse_date};
use crate::models::{IndicatorType, SearchParams, TimelineQuery};

/// Filter arguments for `indicator search`.
#[derive(Args, Debug, Default, Clone)]
pub struct SearchFilterArgs {
    /// Indicator type (ip, domain, url, hash)
    #[arg(long = "type", short = 't')]
    pub indicator_type: Option<IndicatorType>,

    /// Case-insensitive substring of the indicator value
    #[arg(long, short = 'v')]
    pub value: Option<String>,

    /// Threat actor ID
    #[arg(long)]
    pub threat_actor: Option<String>,

    /// Campaign ID
    #[arg(long)]
    pub campaign: Option<String>,

    /// Only indicators first seen at or after this date
    #[arg(long, value_parser = parse_date)]
    pub first_seen_after: Option<DateTime<Utc>>,

    /// Only indicators last seen at or before this date
    #[arg(long, value_parser = parse_date)]
    pub last_seen_before: Option<DateTime<Utc>>,

    #[command(flatten)]
    pub pagination: PaginationArgs,
}

impl SearchFilterArgs {
    pub fn to_params(&self) -> SearchParams {
        let (page, limit) = self.pagination.to_window();
        SearchParams {
            indicator_type: self.indicator_type,
            value: self.value.clone(),
            threat_actor_id: self.threat_actor.clone(),
            campaign_id: self.campaign.clone(),
            first_seen_after: self.first_seen_after,
            last_seen_before: self.last_seen_before,
            page,
            limit,
        }
    }
}

/// Arguments for `campaign timeline`.
#[derive(Args, Debug, Clone)]
pub struct TimelineArgs {
    /// Campaign ID
    pub campaign_id: String,

    /// Bucket width (day, week); anything else means day
    #[arg(long, short = 'g', default_value = "day")]
    pub group_by: String,

    /// Only indicators observed at or after this date
    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<DateTime<Utc>>,

    /// Only indicators observed at or before this date
    #[arg(long, value_parser = parse_date)]
    pub end_date: Option<DateTime<Utc>>,
}

impl TimelineArgs {
    pub fn to_query(&self) -> TimelineQuery {
        TimelineQuery {
            campaign_id: self.campaign_id.clone(),
            group_by: self.group_by.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}
