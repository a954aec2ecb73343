use std::ops::Range;

use regex::Regex;

use crate::entry::Entry;
use crate::error::{FileBuddyError, Result};
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// Captures
// ---------------------------------------------------------------------------

/// Owned result of one successful pattern test.
///
/// Group 0 is always present and holds the whole match. Groups `1..` follow
/// the regex's own numbering; a group that did not participate is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    groups: Vec<Option<String>>,
    span: Range<usize>,
}

impl Captures {
    /// Captures where the whole candidate matched and there are no sub-groups.
    pub fn whole(candidate: &str) -> Self {
        Self {
            groups: vec![Some(candidate.to_owned())],
            span: 0..candidate.len(),
        }
    }

    /// Append a participating group.
    pub fn with_group(mut self, text: impl Into<String>) -> Self {
        self.groups.push(Some(text.into()));
        self
    }

    /// Append a group that did not participate in the match.
    pub fn with_unmatched_group(mut self) -> Self {
        self.groups.push(None);
        self
    }

    fn from_regex(caps: &regex::Captures<'_>) -> Self {
        let span = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let groups = caps
            .iter()
            .map(|g| g.map(|m| m.as_str().to_owned()))
            .collect();
        Self { groups, span }
    }

    /// The whole match (group 0).
    pub fn as_str(&self) -> &str {
        self.groups
            .first()
            .and_then(|g| g.as_deref())
            .unwrap_or_default()
    }

    /// Group `index`, or `None` if it does not exist or did not participate.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    /// Number of groups, counting group 0.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Byte range of the whole match inside the tested candidate.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// An entry whose name satisfied the pattern, with what the pattern captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub entry: Entry,
    pub captures: Captures,
}

impl Match {
    /// The whole-match string (group 0).
    pub fn as_str(&self) -> &str {
        self.captures.as_str()
    }

    pub fn group(&self, index: usize) -> Option<&str> {
        self.captures.group(index)
    }
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A compiled regex used to select entries by name and to scan file lines.
///
/// Matching is unanchored: `txt` selects `notes.txt.bak`. Anchor the pattern
/// (`\.txt$`) to be strict.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern`, failing with [`FileBuddyError::InvalidPattern`].
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| FileBuddyError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// The source text of the pattern.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Test `candidate`, returning the leftmost match's captures.
    pub fn test(&self, candidate: &str) -> Option<Captures> {
        self.regex
            .captures(candidate)
            .map(|caps| Captures::from_regex(&caps))
    }

    /// Cheaper than [`test`](Self::test) when the captures are not needed.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

impl Matcher for Pattern {
    fn captures(&self, candidate: &str) -> Option<Captures> {
        self.test(candidate)
    }
}

/// Selects every candidate. Used when no name pattern is given.
pub struct MatchAll;

impl Matcher for MatchAll {
    fn captures(&self, candidate: &str) -> Option<Captures> {
        Some(Captures::whole(candidate))
    }
}
