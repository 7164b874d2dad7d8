use crate::config::{MatchMode, RunConfig};
use crate::report::OutputFormat;
use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;

/// Rule-driven string substitution across a directory tree.
///
/// Loads `pattern===>replacement` rules from a data file, walks a directory
/// and rewrites every line of each file whose name contains the given
/// extension.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Rule-driven string substitution across a directory tree",
    long_about = "treesub - rewrite files in place from a list of replacement rules.

The data file holds one rule per line:
  <pattern>===><replacement>

Every file under ROOT_DIR whose name contains EXTENSION is rewritten line by
line. Patterns are regular expressions unless --literal is given; a rule only
applies to a line that contains its pattern as plain text. Replacements may
refer to groups as $1 or ${name}; \\$ gives a literal dollar sign.

Hidden files and .gitignore rules get no special treatment. Symbolic links are
never followed: symlinked files and directories are skipped, as are special
files such as sockets and FIFOs.

EXAMPLES:
  treesub rules.txt ./site xhtml                 # Rewrite all *xhtml* files
  treesub rules.txt ./site xhtml --dry-run -f text
  treesub rules.txt ./src .java --literal --keep-going --strict"
)]
pub struct Args {
    /// Path to the rules data file.
    pub data_file: PathBuf,

    /// The directory to start the search from.
    pub root: PathBuf,

    /// Substring a file name must contain to be rewritten (e.g. `xhtml`).
    pub extension: String,

    /// Treat patterns and replacements as plain text instead of regexes.
    #[arg(long)]
    pub literal: bool,

    /// Preview the changes without actually modifying any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Record failing files and carry on instead of stopping at the first one.
    #[arg(long)]
    pub keep_going: bool,

    /// Exit with status 1 when the run fails or records any failure.
    #[arg(long)]
    pub strict: bool,

    /// Print a summary report at the end (`text` or `json`).
    #[arg(short = 'f', long = "report", value_enum)]
    pub report: Option<OutputFormat>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Folds the parsed arguments into an immutable [`RunConfig`].
    pub fn to_config(&self) -> RunConfig {
        RunConfig {
            match_mode: if self.literal {
                MatchMode::Literal
            } else {
                MatchMode::Regex
            },
            dry_run: self.dry_run,
            keep_going: self.keep_going,
            strict: self.strict,
            report: self.report,
            ..RunConfig::new(
                self.data_file.clone(),
                self.root.clone(),
                self.extension.clone(),
            )
        }
    }
}

/// Outcome of reading the command line.
#[derive(Debug)]
pub enum Parsed {
    Run(Args),
    /// Wrong arguments; usage guidance should be shown.
    Usage,
}

/// Parses command-line arguments.
///
/// `--help` and `--version` print and exit as usual. Any other parse failure,
/// including a wrong number of positional arguments, yields [`Parsed::Usage`].
pub fn parse_args<I, T>(args: I) -> Parsed
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => Parsed::Run(args),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => Parsed::Usage,
    }
}

/// Prints usage guidance to stdout.
pub fn print_usage() {
    println!("Invalid program arguments");
    println!("arg1 - a path to a data file");
    println!("arg2 - a path to a directory that we are going to start our search");
    println!("arg3 - file extension");
    println!("example usage: treesub /home/user/projects/regex-data.txt /home/user/projects/my-project-directory xhtml");
    println!("Run 'treesub --help' for all options");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_positionals() {
        let Parsed::Run(args) = parse_args(["treesub", "rules.txt", "site", "xhtml"]) else {
            panic!("expected arguments to parse");
        };
        let config = args.to_config();
        assert_eq!(config.data_file, PathBuf::from("rules.txt"));
        assert_eq!(config.root, PathBuf::from("site"));
        assert_eq!(config.extension, "xhtml");
        assert_eq!(config.match_mode, MatchMode::Regex);
        assert!(!config.dry_run && !config.keep_going && !config.strict);
        assert!(config.report.is_none());
    }

    #[test]
    fn test_wrong_argument_count_is_usage() {
        assert!(matches!(parse_args(["treesub"]), Parsed::Usage));
        assert!(matches!(parse_args(["treesub", "a", "b"]), Parsed::Usage));
        assert!(matches!(parse_args(["treesub", "a", "b", "c", "d"]), Parsed::Usage));
    }

    #[test]
    fn test_flags_fold_into_config() {
        let Parsed::Run(args) = parse_args([
            "treesub", "--literal", "--dry-run", "--keep-going", "--strict", "-f", "json",
            "rules.txt", "site", "xhtml",
        ]) else {
            panic!("expected arguments to parse");
        };
        let config = args.to_config();
        assert_eq!(config.match_mode, MatchMode::Literal);
        assert!(config.dry_run && config.keep_going && config.strict);
        assert_eq!(config.report, Some(OutputFormat::Json));
    }
}
