use crate::config::MatchMode;
use crate::errors::{Error, Result};
use crate::rules::RuleSet;
use crate::text::Lines;
use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Suffix appended to a target's path to name its temporary sibling.
pub const TEMP_SUFFIX: &str = "_tmp";

/// Core engine for rewriting files with a set of rules.
///
/// A `Replacer` holds every rule of a [`RuleSet`] compiled once, in rule
/// order. Rules are applied to each line one after the other, so a later rule
/// sees the output of an earlier one.
pub struct Replacer {
    rules: Vec<CompiledRule>,
    mode: MatchMode,
}

struct CompiledRule {
    pattern: String,
    regex: Regex,
    replacement: String,
}

/// Options for processing a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// If `true`, substitutions are counted but nothing is written to disk.
    pub dry_run: bool,
}

/// The result of processing a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// Number of lines read from the file.
    pub lines: usize,
    /// Total number of pattern matches replaced.
    pub changes: usize,
}

impl Replacer {
    /// Compiles every rule of `rules`.
    ///
    /// In [`MatchMode::Literal`] patterns are escaped, so compilation cannot
    /// fail. In [`MatchMode::Regex`] an invalid pattern is reported before any
    /// file is touched.
    pub fn new(rules: &RuleSet, mode: MatchMode) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let expr = match mode {
                    MatchMode::Regex => Cow::Borrowed(rule.pattern.as_str()),
                    MatchMode::Literal => Cow::Owned(regex::escape(&rule.pattern)),
                };
                let regex = Regex::new(&expr).map_err(|source| Error::InvalidPattern {
                    pattern: rule.pattern.clone(),
                    source,
                })?;
                let replacement = match mode {
                    MatchMode::Regex => {
                        translate_replacement(&rule.replacement, regex.captures_len() - 1)
                    }
                    MatchMode::Literal => rule.replacement.clone(),
                };
                Ok(CompiledRule {
                    pattern: rule.pattern.clone(),
                    regex,
                    replacement,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules, mode })
    }

    /// Applies all rules to a single line.
    ///
    /// A rule only fires when the line contains its pattern as plain text; it
    /// then replaces every match of the compiled pattern. Returns the new line
    /// and the number of matches replaced.
    pub fn apply<'a>(&self, line: &'a str) -> (Cow<'a, str>, usize) {
        let mut current = Cow::Borrowed(line);
        let mut changes = 0;

        for rule in &self.rules {
            if !current.contains(rule.pattern.as_str()) {
                continue;
            }
            let matches = rule.regex.find_iter(&current).count();
            if matches == 0 {
                continue;
            }
            changes += matches;

            let replaced = match self.mode {
                MatchMode::Regex => rule
                    .regex
                    .replace_all(&current, rule.replacement.as_str())
                    .into_owned(),
                MatchMode::Literal => rule
                    .regex
                    .replace_all(&current, NoExpand(&rule.replacement))
                    .into_owned(),
            };
            current = Cow::Owned(replaced);
        }

        (current, changes)
    }

    /// Rewrites a single file in place.
    ///
    /// Every line is passed through [`Replacer::apply`] and written, followed
    /// by `\n`, to `<path>_tmp`. The temp file takes the original's permissions
    /// and is then renamed over the original. On any failure the temp file is
    /// removed and the original is left as it was.
    pub fn process_file(&self, path: &Path, options: &ProcessOptions) -> Result<ProcessResult> {
        let file = File::open(path)?;
        self.rewrite(path, BufReader::new(file), options)
    }

    /// Rewrites `path` with the lines read from `reader`.
    fn rewrite<R: BufRead>(
        &self,
        path: &Path,
        reader: R,
        options: &ProcessOptions,
    ) -> Result<ProcessResult> {
        let lines = Lines::new(reader);

        if options.dry_run {
            return self.transform(lines, &mut io::sink());
        }

        let tmp_path = temp_path_for(path);
        if tmp_path.exists() {
            debug!("Replacing stale temp file {}", tmp_path.display());
            fs::remove_file(&tmp_path)?;
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| format!("Not a file path: {}", path.display()))?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut temp_file = tempfile::Builder::new()
            .prefix(file_name)
            .suffix(TEMP_SUFFIX)
            .rand_bytes(0)
            .tempfile_in(parent)?;
        trace!("Writing {}", temp_file.path().display());

        let result = {
            let mut out = BufWriter::new(temp_file.as_file_mut());
            let result = self.transform(lines, &mut out)?;
            out.flush()?;
            result
        };

        // Preserve file permissions
        let perms = fs::metadata(path)?.permissions();
        fs::set_permissions(temp_file.path(), perms)?;

        temp_file.persist(path)?;
        debug!(
            "Rewrote {} ({} lines, {} changes)",
            path.display(),
            result.lines,
            result.changes
        );

        Ok(result)
    }

    fn transform<R, W>(&self, lines: Lines<R>, out: &mut W) -> Result<ProcessResult>
    where
        R: BufRead,
        W: Write,
    {
        let mut result = ProcessResult::default();
        for line in lines {
            let line = line?;
            let (new_line, changes) = self.apply(&line);
            out.write_all(new_line.as_bytes())?;
            out.write_all(b"\n")?;
            result.lines += 1;
            result.changes += changes;
        }
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Converts a replacement written in the classic `\`/`$n` style into the
/// `regex` crate's syntax.
///
/// A backslash makes the next character literal. `$` followed by digits takes
/// as many digits as still name a group of the pattern, so with one group
/// `$1a` is group 1 then `a` and `$12` is group 1 then `2`. `${name}` passes
/// through unchanged and any other `$` is a literal dollar sign.
pub fn translate_replacement(replacement: &str, groups: usize) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(next) => out.push(next),
                None => out.push('\\'),
            },
            '$' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    chars.next();
                    let mut group = (d as u8 - b'0') as usize;
                    while let Some(next) = chars.peek().and_then(|c| c.to_digit(10)) {
                        let candidate = group * 10 + next as usize;
                        if candidate > groups {
                            break;
                        }
                        group = candidate;
                        chars.next();
                    }
                    out.push_str(&format!("${{{group}}}"));
                }
                Some('{') => out.push('$'),
                _ => out.push_str("$$"),
            },
            _ => out.push(c),
        }
    }

    out
}

/// The path of the temporary sibling used while rewriting `path`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}
