//! Dashboard command implementation

use colored::Colorize;
use tabled::Tabled;

use crate::cli::{CommandContext, DashboardArgs};
use crate::error::Result;
use crate::models::{DashboardSummary, ThreatActorWithCount};
use crate::output::formatters::format_counts;
use crate::output::table::{format_fields, format_table};
use crate::output::{Formattable, print};

/// Ranked threat actor for table display
#[derive(Tabled)]
struct ActorDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "COUNTRY")]
    country: String,
    #[tabled(rename = "INDICATORS")]
    indicators: u64,
}

impl From<&ThreatActorWithCount> for ActorDisplay {
    fn from(actor: &ThreatActorWithCount) -> Self {
        Self {
            id: actor.actor.id.clone(),
            name: actor.actor.name.clone(),
            country: actor.actor.country.clone().unwrap_or_else(|| "-".into()),
            indicators: actor.indicator_count,
        }
    }
}

impl Formattable for DashboardSummary {
    fn to_table(&self) -> String {
        let fields = format_fields(&[
            ("New indicators", format_counts(&self.new_indicators)),
            ("Active campaigns", self.active_campaigns.to_string()),
            ("All indicators", format_counts(&self.indicator_distribution)),
        ]);
        let actors: Vec<ActorDisplay> = self.top_threat_actors.iter().map(ActorDisplay::from).collect();

        format!(
            "{} {}\n{}\n\n{}\n{}",
            "Dashboard".bold(),
            format!("(last {})", self.time_range).dimmed(),
            fields,
            "Top threat actors".bold(),
            format_table(&actors)
        )
    }
}

/// Run the dashboard command
pub async fn run(ctx: &CommandContext, args: &DashboardArgs) -> Result<()> {
    let summary = ctx
        .resolve_repeated(|| ctx.resolver.resolve_dashboard(&args.range))
        .await?;
    print(summary.as_ref(), ctx.format)
}
