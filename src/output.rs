use std::fmt;
use std::str::FromStr;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::TfrstateError;
use crate::report::Change;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = TfrstateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "markdown" => Ok(OutputFormat::Markdown),
            other => Err(TfrstateError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Markdown => f.write_str("markdown"),
        }
    }
}

#[derive(Tabled)]
struct Row {
    dir: String,
    file: String,
    outputs: String,
}

/// Render the report, terminated by a newline.
pub fn render(changes: &[Change], format: OutputFormat) -> Result<String, TfrstateError> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(changes)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Markdown => {
            let rows = changes.iter().flat_map(|change| {
                change.files.iter().map(|file| Row {
                    dir: change.dir.clone(),
                    file: file.path.clone(),
                    outputs: file.outputs.join(", "),
                })
            });
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            Ok(format!("{table}\n"))
        }
    }
}
