//! Output formatting for CLI results

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod formatters;
pub mod json;
pub mod table;

/// Results that know how to render themselves as human-readable text.
///
/// JSON rendering is shared by every result through [`json::format_json`].
pub trait Formattable: Serialize {
    /// Render for terminal display
    fn to_table(&self) -> String;

    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.to_table()),
            OutputFormat::Json => Ok(json::format_json(self)?),
        }
    }
}

/// Format and print data to stdout
pub fn print<T: Formattable + ?Sized>(data: &T, format: OutputFormat) -> Result<()> {
    let output = data.format(format)?;
    println!("{}", output);
    Ok(())
}
