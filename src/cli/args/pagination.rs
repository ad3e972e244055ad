//! Pagination argument types for CLI commands

use clap::Args;

/// Page window for search commands.
///
/// Out-of-range values are accepted here and corrected by the query layer:
/// a non-positive page or limit becomes the default, a limit above 100 is
/// clamped.
#[derive(Args, Debug, Default, Clone)]
pub struct PaginationArgs {
    /// Results per page (default 20, max 100)
    #[arg(long, short = 'n', allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Page number (1-indexed)
    #[arg(long, short = 'p', allow_negative_numbers = true)]
    pub page: Option<i64>,
}

impl PaginationArgs {
    /// `(page, limit)` with zero standing for "use the default".
    pub fn to_window(&self) -> (i64, i64) {
        (self.page.unwrap_or(0), self.limit.unwrap_or(0))
    }
}
