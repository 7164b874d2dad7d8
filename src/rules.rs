use crate::errors::{Error, Result};
use crate::text::Lines;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Token separating a pattern from its replacement in a data file line.
pub const SEPARATOR: &str = "===>";

/// A single `pattern ===> replacement` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: String,
    pub replacement: String,
}

/// An ordered mapping from pattern to replacement.
///
/// Patterns are unique. Inserting an existing pattern replaces its
/// replacement but keeps the position of the first insertion, so iteration
/// order is always first-seen order.
#[derive(Debug, Default, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a `RuleSet` from a data file with one `pattern===>replacement`
    /// rule per line.
    ///
    /// Any line that does not yield both a pattern and a replacement aborts
    /// the load with [`Error::MalformedRule`].
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading rules from {}", path.display());

        let file = File::open(path).map_err(|e| Error::processing(path, e))?;
        let mut rules = RuleSet::new();

        for (idx, line) in Lines::new(BufReader::new(file)).enumerate() {
            let line = line.map_err(|e| Error::processing(path, e))?;
            let rule = parse_line(&line).map_err(|reason| Error::MalformedRule {
                path: path.to_path_buf(),
                line: idx + 1,
                reason,
                content: line.clone(),
            })?;

            info!("Loaded rule: {:?} with {:?}", rule.pattern, rule.replacement);
            if let Some(previous) = rules.insert(rule.pattern.clone(), rule.replacement) {
                warn!(
                    "Line {}: pattern {:?} redefined, dropping replacement {:?}",
                    idx + 1,
                    rule.pattern,
                    previous
                );
            }
        }

        Ok(rules)
    }

    /// Inserts a rule, returning the replacement it overwrote, if any.
    pub fn insert(&mut self, pattern: String, replacement: String) -> Option<String> {
        match self.index.get(&pattern) {
            Some(&pos) => Some(std::mem::replace(
                &mut self.rules[pos].replacement,
                replacement,
            )),
            None => {
                self.index.insert(pattern.clone(), self.rules.len());
                self.rules.push(Rule {
                    pattern,
                    replacement,
                });
                None
            }
        }
    }

    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.index
            .get(pattern)
            .map(|&pos| self.rules[pos].replacement.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Splits a data file line into a rule.
///
/// Trailing empty segments are dropped before counting, so `foo===>` has no
/// replacement. Segments past the second are ignored.
pub fn parse_line(line: &str) -> std::result::Result<Rule, &'static str> {
    let mut segments: Vec<&str> = line.split(SEPARATOR).collect();
    while segments.len() > 1 && segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }

    if segments.len() < 2 {
        return Err("missing replacement after separator");
    }
    if segments[0].is_empty() {
        return Err("empty pattern");
    }

    Ok(Rule {
        pattern: segments[0].to_string(),
        replacement: segments[1].to_string(),
    })
}
