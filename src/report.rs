use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Defines the possible output formats for the run report.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A simple, human-readable summary block.
    Text,
    /// JSON format, suitable for machine processing.
    Json,
}

/// A file or traversal failure recorded while the run kept going.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    /// The path the failure concerns, when known.
    pub path: Option<PathBuf>,
    pub error: String,
}

/// Counts collected over one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub directories_visited: usize,
    /// Regular files seen, whether or not their name matched the filter.
    pub files_visited: usize,
    /// Files whose name contained the extension filter.
    pub files_matched: usize,
    /// Files written back to disk (always zero on a dry run).
    pub files_rewritten: usize,
    /// Files with at least one substitution.
    pub files_changed: usize,
    pub lines_processed: usize,
    pub substitutions: usize,
    pub failures: Vec<Failure>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Renders a [`RunReport`] in one of the [`OutputFormat`]s.
pub struct ReportFormatter {
    format: OutputFormat,
    tool_name: String,
    tool_version: String,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Writes the formatted report to a given writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The `Write` target (e.g., `stdout`).
    /// * `report` - The counts to render.
    /// * `started` - When the run began.
    /// * `elapsed` - How long the run took.
    pub fn write_report<W: Write>(
        &self,
        writer: &mut W,
        report: &RunReport,
        started: DateTime<Utc>,
        elapsed: Duration,
    ) -> Result<()> {
        let output = match self.format {
            OutputFormat::Text => self.format_text(report, elapsed),
            OutputFormat::Json => self.format_json(report, started, elapsed)?,
        };

        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn format_text(&self, report: &RunReport, elapsed: Duration) -> String {
        let mut output = format!("\n{}\n", "-".repeat(50));
        if report.dry_run {
            output.push_str("DRY RUN: no files were written\n");
        }
        output.push_str(&format!("Directories   : {}\n", report.directories_visited));
        output.push_str(&format!("Files scanned : {}\n", report.files_visited));
        output.push_str(&format!("Files matched : {}\n", report.files_matched));
        output.push_str(&format!("Files written : {}\n", report.files_rewritten));
        output.push_str(&format!("Files changed : {}\n", report.files_changed));
        output.push_str(&format!("Total edits   : {}\n", report.substitutions));
        output.push_str(&format!("Failures      : {}\n", report.failures.len()));
        for failure in &report.failures {
            match &failure.path {
                Some(path) => output.push_str(&format!("  {}: {}\n", path.display(), failure.error)),
                None => output.push_str(&format!("  {}\n", failure.error)),
            }
        }
        output.push_str(&format!("Elapsed       : {:.2?}\n", elapsed));
        output
    }

    fn format_json(
        &self,
        report: &RunReport,
        started: DateTime<Utc>,
        elapsed: Duration,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            tool: ToolInfo<'a>,
            started_at: DateTime<Utc>,
            elapsed_ms: u64,
            #[serde(flatten)]
            report: &'a RunReport,
        }

        #[derive(Serialize)]
        struct ToolInfo<'a> {
            name: &'a str,
            version: &'a str,
        }

        let output = JsonOutput {
            tool: ToolInfo {
                name: &self.tool_name,
                version: &self.tool_version,
            },
            started_at: started,
            elapsed_ms: elapsed.as_millis() as u64,
            report,
        };

        let mut json = serde_json::to_string_pretty(&output)?;
        json.push('\n');
        Ok(json)
    }
}
