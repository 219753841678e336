//! Region format templates.
//!
//! A [`RuleStore`] holds, per region tag, an ordered list of [`FormatRule`]s
//! loaded from a line-oriented `<region> <pattern>` source. Rules are tried
//! in file order and the first match wins, so more specific patterns belong
//! earlier in the file.
//!
//! ## Pattern language
//!
//! - `#` matches one digit
//! - `@` matches one alphabetic character
//! - `?` matches any one character
//! - `~` matches any one character and drops it from the normalized text
//! - `[...]` passes through as a regex character class, matching one character
//! - every other character matches itself literally
//!
//! A rule only matches strings whose character count equals the pattern's
//! token count.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, warn};
use regex::Regex;
use thiserror::Error;

/// Errors surfaced by the strict loading entry points.
#[derive(Debug, Error)]
pub enum RuleStoreError {
    /// The rule source could not be opened or read.
    #[error("failed to read rule source {path}: {message}")]
    Read { path: String, message: String },

    /// A pattern did not compile to a matcher.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// One format template for a region.
#[derive(Debug, Clone)]
pub struct FormatRule {
    region: String,
    pattern: String,
    matcher: Regex,
    char_count: usize,
    // Positions matched by `~`, removed from normalized text.
    skip_positions: Vec<usize>,
}

impl FormatRule {
    /// Compile `pattern` (see the module docs for the token set).
    pub fn new(region: &str, pattern: &str) -> Result<Self, RuleStoreError> {
        let mut expression = String::from("^");
        let mut char_count = 0;
        let mut skip_positions = Vec::new();

        let mut tokens = pattern.chars();
        while let Some(token) = tokens.next() {
            match token {
                '#' => expression.push_str("[0-9]"),
                '@' => expression.push_str("[A-Za-z]"),
                '?' => expression.push('.'),
                '~' => {
                    expression.push('.');
                    skip_positions.push(char_count);
                }
                '[' => {
                    // A class is one matched character; an unclosed class
                    // fails to compile and the loader skips the rule.
                    expression.push('[');
                    for c in tokens.by_ref() {
                        expression.push(c);
                        if c == ']' {
                            break;
                        }
                    }
                }
                literal => expression.push_str(&regex::escape(&literal.to_string())),
            }
            char_count += 1;
        }
        expression.push('$');

        let matcher = Regex::new(&expression).map_err(|source| RuleStoreError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            region: region.to_string(),
            pattern: pattern.to_string(),
            matcher,
            char_count,
            skip_positions,
        })
    }

    /// The region tag this rule belongs to.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The source pattern this rule was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether `text` is well-formed under this rule.
    pub fn matches(&self, text: &str) -> bool {
        text.chars().count() == self.char_count && self.matcher.is_match(text)
    }

    /// Drop the characters this rule marks as skips (`~` tokens), plus any
    /// in-band [`SKIP_MARKER`](crate::SKIP_MARKER) characters an upstream
    /// source may have left in the text.
    pub fn normalize(&self, text: &str) -> String {
        text.chars()
            .enumerate()
            .filter(|(index, c)| !self.skip_positions.contains(index) && *c != crate::SKIP_MARKER)
            .map(|(_, c)| c)
            .collect()
    }
}

/// Ordered format rules per region tag.
///
/// Immutable once loaded; share one store (behind an `Arc`) across any number
/// of concurrent sessions.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: HashMap<String, Vec<FormatRule>>,
}

impl RuleStore {
    /// An empty store: every region is unknown, no template filtering occurs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `<region> <pattern>` lines from any reader.
    ///
    /// Lines that do not split into exactly two whitespace-separated tokens
    /// are skipped, as are rules whose pattern fails to compile.
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let mut store = Self::new();
        for line in BufReader::new(reader).lines() {
            let Ok(line) = line else { break };
            store.add_line(&line);
        }
        debug!(
            "loaded format rules for {} region(s)",
            store.rules.len()
        );
        store
    }

    /// Load rules from a file.
    pub fn load_from_path(path: &Path) -> Result<Self, RuleStoreError> {
        let file = File::open(path).map_err(|e| RuleStoreError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_reader(file))
    }

    /// Load rules from a file, degrading to an empty store if the file is
    /// missing or unreadable. With an empty store every region check returns
    /// false and template matching is skipped.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load_from_path(path) {
            Ok(store) => store,
            Err(err) => {
                warn!("{err}; continuing without format rules");
                Self::new()
            }
        }
    }

    fn add_line(&mut self, line: &str) {
        let mut tokens = line.split_whitespace();
        let (Some(region), Some(pattern)) = (tokens.next(), tokens.next()) else {
            return;
        };
        if tokens.next().is_some() {
            return;
        }

        match FormatRule::new(region, pattern) {
            Ok(rule) => self.rules.entry(region.to_string()).or_default().push(rule),
            Err(err) => warn!("skipping rule for region {region:?}: {err}"),
        }
    }

    /// Whether any rules exist for `region`.
    pub fn has_region(&self, region: &str) -> bool {
        self.rules.contains_key(region)
    }

    /// The rules for `region` in match-priority (file) order; empty for an
    /// unknown region.
    pub fn rules_for(&self, region: &str) -> &[FormatRule] {
        self.rules
            .get(region)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
