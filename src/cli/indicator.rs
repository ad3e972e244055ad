//! Indicator command implementations

use colored::Colorize;
use tabled::Tabled;

use crate::cli::{CommandContext, SearchFilterArgs};
use crate::error::Result;
use crate::models::{IndicatorSearchResult, IndicatorWithRelations, SearchResult};
use crate::output::formatters::{format_timestamp, truncate};
use crate::output::table::{format_fields, format_table};
use crate::output::{Formattable, print};

/// Search row for table display
#[derive(Tabled)]
struct SearchRowDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TYPE")]
    indicator_type: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "CONFIDENCE")]
    confidence: i64,
    #[tabled(rename = "FIRST SEEN")]
    first_seen: String,
    #[tabled(rename = "CAMPAIGNS")]
    campaigns: u64,
    #[tabled(rename = "ACTORS")]
    actors: u64,
}

impl From<&IndicatorSearchResult> for SearchRowDisplay {
    fn from(row: &IndicatorSearchResult) -> Self {
        Self {
            id: row.id.clone(),
            indicator_type: row.indicator_type.to_string(),
            value: truncate(&row.value, 60),
            confidence: row.confidence,
            first_seen: format_timestamp(row.first_seen.as_ref()),
            campaigns: row.campaign_count,
            actors: row.threat_actor_count,
        }
    }
}

/// Related item for table display
#[derive(Tabled)]
struct RelationDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME / VALUE")]
    name: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

impl Formattable for SearchResult {
    fn to_table(&self) -> String {
        let rows: Vec<SearchRowDisplay> = self.data.iter().map(SearchRowDisplay::from).collect();
        let footer = format!(
            "Page {} of {} ({} total, {} per page)",
            self.page, self.total_pages, self.total, self.limit
        );
        format!("{}\n{}", format_table(&rows), footer.dimmed())
    }
}

impl Formattable for IndicatorWithRelations {
    fn to_table(&self) -> String {
        let ind = &self.indicator;
        let mut out = vec![
            format!("{} {}", "Indicator".bold(), ind.value.cyan()),
            format_fields(&[
                ("ID", ind.id.clone()),
                ("Type", ind.indicator_type.to_string()),
                ("Confidence", ind.confidence.to_string()),
                ("Severity", ind.severity.clone().unwrap_or_else(|| "N/A".into())),
                ("Active", if ind.is_active { "yes".into() } else { "no".into() }),
                ("First seen", format_timestamp(ind.first_seen.as_ref())),
                ("Last seen", format_timestamp(ind.last_seen.as_ref())),
                ("Tags", if ind.tags.is_empty() { "-".into() } else { ind.tags.join(", ") }),
            ]),
        ];

        let actors: Vec<RelationDisplay> = self
            .threat_actors
            .iter()
            .map(|a| RelationDisplay {
                id: a.id.clone(),
                name: a.name.clone(),
                detail: format!("confidence {}", a.confidence),
            })
            .collect();
        out.push(format!("\n{}", "Threat actors".bold()));
        out.push(format_table(&actors));

        let campaigns: Vec<RelationDisplay> = self
            .campaigns
            .iter()
            .map(|c| RelationDisplay {
                id: c.id.clone(),
                name: c.name.clone(),
                detail: if c.active { "active".into() } else { "inactive".into() },
            })
            .collect();
        out.push(format!("\n{}", "Campaigns".bold()));
        out.push(format_table(&campaigns));

        let related: Vec<RelationDisplay> = self
            .related_indicators
            .iter()
            .map(|r| RelationDisplay {
                id: r.id.clone(),
                name: truncate(&r.value, 60),
                detail: format!("{} ({})", r.indicator_type, r.relationship),
            })
            .collect();
        out.push(format!("\n{}", "Related indicators".bold()));
        out.push(format_table(&related));

        out.join("\n")
    }
}

/// Run the indicator get command
pub async fn get(ctx: &CommandContext, id: &str) -> Result<()> {
    let detail = ctx
        .resolve_repeated(|| ctx.resolver.resolve_indicator(id))
        .await?;
    print(detail.as_ref(), ctx.format)
}

/// Run the indicator search command
pub async fn search(ctx: &CommandContext, args: &SearchFilterArgs) -> Result<()> {
    let params = args.to_params();
    let result = ctx
        .resolve_repeated(|| ctx.resolver.resolve_search(&params))
        .await?;
    print(result.as_ref(), ctx.format)
}
