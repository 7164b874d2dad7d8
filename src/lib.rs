//! `treesub` rewrites text files across a directory tree from a list of
//! `pattern===>replacement` rules.
//!
//! It provides the core logic for the `treesub` command-line tool but can also
//! be used as a library. The main components are:
//!
//! - `rules`: loads the ordered rule mapping from a data file.
//! - `Replacer`: applies the rules line by line to one file, writing through a
//!   `_tmp` sibling that is renamed over the original.
//! - `Walker`: visits every file below a root and rewrites those whose name
//!   contains the extension filter.
//! - `report`: counts collected over a run, rendered as text or JSON.
//!
//! The whole run is sequential and driven by one immutable `RunConfig`.

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod replacer;
pub mod report;
pub mod rules;
pub mod text;
pub mod walker;

// Re-export main types for easier access by library users.
pub use config::{MatchMode, RunConfig};
pub use errors::{Error, Result};
pub use replacer::Replacer;
pub use report::{OutputFormat, ReportFormatter, RunReport};
pub use rules::RuleSet;
pub use walker::Walker;

use tracing::debug;

/// Runs a full substitution pass described by `config`.
///
/// The rules are loaded and compiled before anything on disk is touched. When
/// the root does not exist or is not a directory the run does nothing and
/// returns an empty report.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    let rules = RuleSet::load(&config.data_file)?;
    let replacer = Replacer::new(&rules, config.match_mode)?;
    debug!("Compiled {} rules ({:?} mode)", replacer.len(), config.match_mode);

    if !config.root.is_dir() {
        debug!("{} is not a directory, nothing to do", config.root.display());
        return Ok(RunReport {
            dry_run: config.dry_run,
            ..RunReport::default()
        });
    }

    Walker::new(&replacer, config).walk(&config.root)
}
