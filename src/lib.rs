//! # filebuddy
//!
//! Pattern-driven batch file operations: select entries with a regex, then
//! list, size, search, rename, delete, copy or move them, using the regex's
//! capture groups to build new names and destinations.
//!
//! One invocation is a straight pipeline:
//!
//! 1. [`PathWalker`] lazily enumerates entries under a root, honouring the
//!    recursion and hidden-entry policy.
//! 2. A [`Matcher`] (normally a [`Pattern`]) tests each entry's *name* and
//!    keeps the ones that match, with their captures.
//! 3. [`engine::execute`] applies the command to every [`Match`], expanding
//!    [`Template`]s for naming commands, and records one [`OperationResult`]
//!    per entry. A failing entry never stops the batch.
//!
//! # Quick Start
//!
//! ```rust
//! use filebuddy::{Command, Status};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
//! std::fs::write(dir.path().join("b.log"), "beta").unwrap();
//!
//! let report = filebuddy::invocation(Command::Rename)
//!     .root(dir.path())
//!     .pattern(r"^(\w+)\.txt$")
//!     .template("renamed_$(1).txt")
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(report.succeeded(), 1);
//! assert_eq!(report.results[0].status, Status::Success);
//! assert!(dir.path().join("renamed_a.txt").exists());
//! ```
//!
//! # Templates
//!
//! `$(N)` in a template is replaced by capture group `N`; `$(0)` is the whole
//! match. Referring to a group the pattern does not have, or one that did not
//! participate in the match, fails that entry instead of silently producing
//! an empty string:
//!
//! ```rust
//! use filebuddy::{Pattern, Template};
//!
//! let captures = Pattern::compile(r"(\d{4})-(\d{2})").unwrap().test("log_2024-06.txt").unwrap();
//! let template = Template::parse("$(1)/$(2)/$(0)");
//! assert_eq!(template.expand(&captures).unwrap(), "2024/06/2024-06");
//! assert!(Template::parse("$(3)").expand(&captures).is_err());
//! ```
//!
//! # Safety
//!
//! Naming commands never overwrite: an occupied destination marks the entry
//! [`Status::Skipped`] and leaves the source untouched. `delete` refuses
//! non-empty directories unless the invocation is recursive.

#![forbid(unsafe_code)]

pub mod engine;
pub mod template;

mod builder;
mod entry;
mod error;
mod fs_ops;
mod invocation;
mod pattern;
mod results;
mod traits;
mod walker;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{run, InvocationBuilder};
pub use entry::{Entry, EntryKind};
pub use error::{FileBuddyError, Result};
pub use invocation::{Command, Invocation};
pub use pattern::{Captures, Match, MatchAll, Pattern};
pub use results::{Detail, OperationResult, Report, ScanStats, Status};
pub use template::Template;
pub use traits::Matcher;
pub use walker::{PathWalker, Walk, WalkOptions};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`InvocationBuilder`] for `command`.
///
/// # Example
///
/// ```rust
/// use filebuddy::Command;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("invoice.txt"), "").unwrap();
/// std::fs::write(dir.path().join("report.txt"), "").unwrap();
///
/// let report = filebuddy::invocation(Command::List)
///     .root(dir.path())
///     .pattern("invoice")
///     .run()
///     .unwrap();
///
/// assert_eq!(report.results.len(), 1);
/// ```
pub fn invocation(command: Command) -> InvocationBuilder {
    InvocationBuilder::new(command)
}
