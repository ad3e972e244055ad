//! Campaign command implementations

use colored::Colorize;
use tabled::Tabled;

use crate::cli::{CommandContext, TimelineArgs};
use crate::error::Result;
use crate::models::{CampaignTimeline, TimelinePeriod};
use crate::output::formatters::{format_counts, format_timestamp, truncate};
use crate::output::table::{format_fields, format_table};
use crate::output::{Formattable, print};

/// Timeline bucket for table display
#[derive(Tabled)]
struct PeriodDisplay {
    #[tabled(rename = "PERIOD")]
    period: String,
    #[tabled(rename = "COUNT")]
    count: usize,
    #[tabled(rename = "BY TYPE")]
    counts: String,
    #[tabled(rename = "INDICATORS")]
    indicators: String,
}

impl From<&TimelinePeriod> for PeriodDisplay {
    fn from(period: &TimelinePeriod) -> Self {
        let values: Vec<&str> = period.indicators.iter().map(|i| i.value.as_str()).collect();
        Self {
            period: period.period.clone(),
            count: period.indicators.len(),
            counts: format_counts(&period.counts),
            indicators: truncate(&values.join(", "), 60),
        }
    }
}

impl Formattable for CampaignTimeline {
    fn to_table(&self) -> String {
        let c = &self.campaign;
        let s = &self.summary;

        let header = format!("{} {}", "Campaign".bold(), c.name.cyan());
        let fields = format_fields(&[
            ("ID", c.id.clone()),
            ("Status", c.status.clone()),
            ("First seen", format_timestamp(c.first_seen.as_ref())),
            ("Last seen", format_timestamp(c.last_seen.as_ref())),
            ("Indicators", s.total_indicators.to_string()),
            ("Unique IPs", s.unique_ips.to_string()),
            ("Unique domains", s.unique_domains.to_string()),
            ("Duration", format!("{} days", s.duration_days)),
        ]);

        let periods: Vec<PeriodDisplay> = self.timeline.iter().map(PeriodDisplay::from).collect();

        format!(
            "{}\n{}\n\n{}\n{}",
            header,
            fields,
            "Timeline".bold(),
            format_table(&periods)
        )
    }
}

/// Run the campaign timeline command
pub async fn timeline(ctx: &CommandContext, args: &TimelineArgs) -> Result<()> {
    let query = args.to_query();
    let timeline = ctx
        .resolve_repeated(|| ctx.resolver.resolve_timeline(&query))
        .await?;
    print(timeline.as_ref(), ctx.format)
}
