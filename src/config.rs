use crate::report::OutputFormat;
use std::path::PathBuf;

/// How rule patterns are matched against a line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Patterns are regular expressions and replacements may use `$1`-style
    /// group references.
    #[default]
    Regex,
    /// Patterns and replacements are plain text.
    Literal,
}

/// Everything a run needs, built once from the command line and passed down
/// read-only.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The rules data file.
    pub data_file: PathBuf,
    /// The directory to start the walk from.
    pub root: PathBuf,
    /// Substring a file name must contain to be rewritten.
    pub extension: String,
    pub match_mode: MatchMode,
    /// Compute substitutions without writing anything.
    pub dry_run: bool,
    /// Record per-file failures and continue instead of aborting.
    pub keep_going: bool,
    /// Exit with a non-zero status when anything failed.
    pub strict: bool,
    /// Print a run report in this format when the run ends.
    pub report: Option<OutputFormat>,
}

impl RunConfig {
    pub fn new(data_file: PathBuf, root: PathBuf, extension: String) -> Self {
        Self {
            data_file,
            root,
            extension,
            match_mode: MatchMode::default(),
            dry_run: false,
            keep_going: false,
            strict: false,
            report: None,
        }
    }
}
