use crate::entry::Entry;
use crate::pattern::{Captures, Match};

/// Decides which entries are selected, and what was captured when they are.
///
/// Implement this to plug in selection logic other than a regex. The
/// engine only ever sees the resulting [`Match`]es, so a custom matcher
/// must still produce sensible captures: group 0 should be the part of the
/// candidate that matched, because templates refer to it as `$(0)`.
///
/// # Example
///
/// ```rust
/// use filebuddy::{Captures, Matcher};
///
/// struct ExtensionMatcher(&'static str);
///
/// impl Matcher for ExtensionMatcher {
///     fn captures(&self, candidate: &str) -> Option<Captures> {
///         let (stem, ext) = candidate.rsplit_once('.')?;
///         (ext == self.0).then(|| Captures::whole(candidate).with_group(stem))
///     }
/// }
///
/// let m = ExtensionMatcher("rs").captures("main.rs").unwrap();
/// assert_eq!(m.group(1), Some("main"));
/// ```
pub trait Matcher {
    /// Test a candidate string. `None` means the candidate is not selected.
    fn captures(&self, candidate: &str) -> Option<Captures>;

    /// Test an entry by its name, pairing it with the captures on success.
    /// Entries that fail the test are dropped.
    fn select(&self, entry: Entry) -> Option<Match> {
        let captures = self.captures(&entry.name)?;
        Some(Match { entry, captures })
    }
}
