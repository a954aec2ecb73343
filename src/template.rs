//! Group-reference templates for rename/copy/move destinations.
//!
//! The only token is `$(N)`: a dollar sign, an opening parenthesis, one or
//! more ASCII digits, and a closing parenthesis. It is replaced by capture
//! group `N` of the active match, `$(0)` being the whole match. Anything
//! that is not exactly this shape (`$(`, `$()`, `$(1a)`, `$1`) is literal
//! text.

use crate::error::{FileBuddyError, Result};
use crate::pattern::{Captures, Match};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Group(usize),
}

/// A parsed template, ready to be expanded against any number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Split `template` into literal text and group references.
    ///
    /// Parsing cannot fail: malformed tokens stay literal. An index too large
    /// for `usize` is kept as `usize::MAX`, which no match can satisfy.
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(at) = rest.find("$(") {
            let after = &rest[at + 2..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();

            if digits == 0 || !after[digits..].starts_with(')') {
                // Not a token; keep "$(" and rescan after it.
                literal.push_str(&rest[..at + 2]);
                rest = after;
                continue;
            }

            literal.push_str(&rest[..at]);
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let index = after[..digits].parse().unwrap_or(usize::MAX);
            segments.push(Segment::Group(index));
            rest = &after[digits + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: template.to_owned(),
            segments,
        }
    }

    /// The template text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the template contains any group reference.
    pub fn has_groups(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Group(_)))
    }

    /// Substitute every group reference with the captured text.
    ///
    /// Fails with [`FileBuddyError::GroupOutOfRange`] when the index exceeds
    /// the pattern's groups and [`FileBuddyError::UnmatchedGroup`] when the
    /// group exists but did not participate.
    pub fn expand(&self, captures: &Captures) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Group(index) => {
                    if *index >= captures.group_count() {
                        return Err(FileBuddyError::GroupOutOfRange {
                            group: *index,
                            highest: captures.group_count().saturating_sub(1),
                        });
                    }
                    let text = captures
                        .group(*index)
                        .ok_or(FileBuddyError::UnmatchedGroup(*index))?;
                    out.push_str(text);
                }
            }
        }
        Ok(out)
    }
}

/// Parse and expand `template` against `m` in one step.
pub fn expand(template: &str, m: &Match) -> Result<String> {
    Template::parse(template).expand(&m.captures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn caps(pattern: &str, candidate: &str) -> Captures {
        Pattern::compile(pattern).unwrap().test(candidate).unwrap()
    }

    #[test]
    fn whole_match_and_groups() {
        let c = caps(r"(\w+)\.(\w+)", "photo.jpeg");
        let t = Template::parse("$(2)/$(1)-copy.$(2) [$(0)]");
        assert_eq!(t.expand(&c).unwrap(), "jpeg/photo-copy.jpeg [photo.jpeg]");
    }

    #[test]
    fn literal_template_ignores_match() {
        let c = caps(r"(a)(b)", "ab");
        assert_eq!(Template::parse("literal").expand(&c).unwrap(), "literal");
        assert!(!Template::parse("literal").has_groups());
    }

    #[test]
    fn malformed_tokens_are_literal() {
        let c = caps(r"x", "x");
        for text in ["$(", "$()", "$(1a)", "$1", "$$(", "cost: $(x)", "$(0"] {
            assert_eq!(Template::parse(text).expand(&c).unwrap(), text, "{text}");
        }
    }

    #[test]
    fn adjacent_and_nested_looking_tokens() {
        let c = caps(r"(\d)(\d)", "42");
        assert_eq!(Template::parse("$(1)$(2)").expand(&c).unwrap(), "42");
        assert_eq!(Template::parse("$($(1))").expand(&c).unwrap(), "$(4)");
        assert_eq!(Template::parse("$(01)").expand(&c).unwrap(), "4");
    }

    #[test]
    fn out_of_range_group_is_an_error() {
        let c = caps(r"(a)", "a");
        let err = Template::parse("$(2)").expand(&c).unwrap_err();
        assert!(matches!(
            err,
            FileBuddyError::GroupOutOfRange { group: 2, highest: 1 }
        ));

        let huge = Template::parse("$(99999999999999999999999999)");
        assert!(huge.has_groups());
        assert!(huge.expand(&c).is_err());
    }

    #[test]
    fn unmatched_group_is_an_error() {
        let c = caps(r"(a)|(b)", "b");
        assert!(matches!(
            Template::parse("$(1)").expand(&c),
            Err(FileBuddyError::UnmatchedGroup(1))
        ));
        assert_eq!(Template::parse("$(2)").expand(&c).unwrap(), "b");
    }

    #[test]
    fn non_ascii_literals_survive() {
        let c = caps(r"(\w+)", "fichier");
        assert_eq!(
            Template::parse("résumé_$(1)_€").expand(&c).unwrap(),
            "résumé_fichier_€"
        );
    }
}
