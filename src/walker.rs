use crate::config::RunConfig;
use crate::errors::{Error, Result};
use crate::replacer::{ProcessOptions, Replacer};
use crate::report::{Failure, RunReport};
use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Walks a directory tree and rewrites every file whose name contains the
/// configured extension.
///
/// Every descendant is visited: hidden files and ignore files are not
/// honoured, symlinks are not followed, and siblings are visited in file name
/// order. The first failure aborts the walk unless `keep_going` is set, in
/// which case it is recorded in the report and the walk continues.
pub struct Walker<'a> {
    replacer: &'a Replacer,
    config: &'a RunConfig,
    options: ProcessOptions,
}

impl<'a> Walker<'a> {
    pub fn new(replacer: &'a Replacer, config: &'a RunConfig) -> Self {
        Self {
            replacer,
            config,
            options: ProcessOptions {
                dry_run: config.dry_run,
            },
        }
    }

    /// Walks `root` and returns the collected counts.
    pub fn walk(&self, root: &Path) -> Result<RunReport> {
        let mut report = RunReport {
            dry_run: self.config.dry_run,
            ..RunReport::default()
        };

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        for entry in builder.build() {
            let outcome = entry
                .map_err(Error::from)
                .and_then(|entry| self.visit(&entry, &mut report));

            if let Err(e) = outcome {
                if !self.config.keep_going {
                    return Err(e);
                }
                error!("{e}");
                let path = match &e {
                    Error::Processing { path, .. } => Some(path.clone()),
                    Error::Walk(err) => walk_error_path(err),
                    _ => None,
                };
                report.failures.push(Failure {
                    path,
                    error: e.to_string(),
                });
            }
        }

        Ok(report)
    }

    fn visit(&self, entry: &DirEntry, report: &mut RunReport) -> Result<()> {
        let Some(file_type) = entry.file_type() else {
            return Ok(());
        };
        let path = entry.path();

        if file_type.is_dir() {
            info!("Processing directory {}", path.display());
            report.directories_visited += 1;
        } else if file_type.is_file() {
            // Listings are read ahead, so an entry can be gone by now (a stale
            // `_tmp` sibling removed while rewriting its target).
            if fs::symlink_metadata(path).is_err() {
                debug!("Skipping {}, no longer exists", path.display());
                return Ok(());
            }
            info!("Processing file {}", path.display());
            report.files_visited += 1;
            if matches_extension(path, &self.config.extension) {
                report.files_matched += 1;
                let result = self
                    .replacer
                    .process_file(path, &self.options)
                    .map_err(|e| Error::processing(path, e))?;

                report.lines_processed += result.lines;
                report.substitutions += result.changes;
                if result.changes > 0 {
                    report.files_changed += 1;
                }
                if !self.options.dry_run {
                    report.files_rewritten += 1;
                }
            }
        }

        Ok(())
    }
}

/// The path a traversal error concerns, looking through depth and line
/// number wrappers.
fn walk_error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        _ => None,
    }
}

/// Whether a file's name contains `extension` anywhere, not only as a suffix.
pub fn matches_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains(extension))
        .unwrap_or(false)
}
