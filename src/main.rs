//! The main entry point for the `treesub` command-line application.
//!
//! Failures are printed to stdout and the process still exits successfully,
//! unless `--strict` asks for a non-zero status.

use chrono::{DateTime, Utc};
use std::env;
use std::error::Error as _;
use std::io::{self, Write};
use std::process;
use std::time::{Duration, Instant};
use treesub::cli::{self, Parsed};
use treesub::{ReportFormatter, RunConfig, RunReport, logging};

fn main() {
    let args = match cli::parse_args(env::args_os()) {
        Parsed::Run(args) => args,
        Parsed::Usage => {
            cli::print_usage();
            return;
        }
    };

    logging::init(args.verbose, args.quiet);
    let config = args.to_config();

    let started = Utc::now();
    let clock = Instant::now();

    let outcome = treesub::run(&config);
    let failed = report_outcome(
        &mut io::stdout().lock(),
        &config,
        outcome,
        started,
        clock.elapsed(),
    );

    if failed && config.strict {
        process::exit(1);
    }
}

/// Prints the run report or the error chain and tells whether the run counts
/// as failed. Failing to print the requested report is a failure too.
fn report_outcome<W: Write>(
    out: &mut W,
    config: &RunConfig,
    outcome: treesub::Result<RunReport>,
    started: DateTime<Utc>,
    elapsed: Duration,
) -> bool {
    match outcome {
        Ok(report) => {
            let mut failed = report.has_failures();
            if let Some(format) = config.report {
                if let Err(e) =
                    ReportFormatter::new(format).write_report(out, &report, started, elapsed)
                {
                    let _ = writeln!(out, "Error: {e}");
                    failed = true;
                }
            }
            failed
        }
        Err(e) => {
            let _ = writeln!(out, "Error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                let _ = writeln!(out, "  caused by: {cause}");
                source = cause.source();
            }
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use treesub::OutputFormat;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn config(report: Option<OutputFormat>) -> RunConfig {
        let mut config = RunConfig::new(
            PathBuf::from("rules.txt"),
            PathBuf::from("site"),
            "xhtml".to_string(),
        );
        config.report = report;
        config
    }

    #[test]
    fn test_unwritable_report_counts_as_failure() {
        let failed = report_outcome(
            &mut ClosedPipe,
            &config(Some(OutputFormat::Text)),
            Ok(RunReport::default()),
            Utc::now(),
            Duration::ZERO,
        );
        assert!(failed);
    }

    #[test]
    fn test_clean_run_without_report_succeeds() {
        let failed = report_outcome(
            &mut ClosedPipe,
            &config(None),
            Ok(RunReport::default()),
            Utc::now(),
            Duration::ZERO,
        );
        assert!(!failed);
    }

    #[test]
    fn test_error_prints_cause_chain() {
        let mut out = Vec::new();
        let err = treesub::Error::processing(
            "site/page.xhtml",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let failed = report_outcome(&mut out, &config(None), Err(err), Utc::now(), Duration::ZERO);

        let printed = String::from_utf8(out).unwrap();
        assert!(failed);
        assert!(printed.starts_with("Error: "));
        assert!(printed.contains("caused by:"));
    }
}
