use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::engine;
use crate::entry::EntryKind;
use crate::error::{FileBuddyError, Result};
use crate::fs_ops::normalize;
use crate::invocation::{Command, Invocation};
use crate::pattern::{Match, MatchAll, Pattern};
use crate::results::{Report, ScanStats};
use crate::template::Template;
use crate::traits::Matcher;
use crate::walker::PathWalker;

// ---------------------------------------------------------------------------
// InvocationBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing one batch operation.
///
/// Created via [`filebuddy::invocation()`](crate::invocation). Configure with
/// chained builder methods, then call [`run()`](InvocationBuilder::run) to
/// execute, or [`build()`](InvocationBuilder::build) to only validate.
///
/// # Example
///
/// ```rust,ignore
/// let report = filebuddy::invocation(Command::Rename)
///     .root("photos")
///     .pattern(r"^IMG_(\d+)\.jpe?g$")
///     .template("holiday_$(1).jpg")
///     .recursive(true)
///     .run()?;
/// ```
#[derive(Debug, Clone)]
pub struct InvocationBuilder {
    command:         Command,
    root:            PathBuf,
    pattern:         Option<String>,
    content_pattern: Option<String>,
    template:        Option<String>,
    recursive:       bool,
    include_hidden:  bool,
    verbose:         bool,
}

impl InvocationBuilder {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            root:            PathBuf::from("."),
            pattern:         None,
            content_pattern: None,
            template:        None,
            recursive:       false,
            include_hidden:  false,
            verbose:         false,
        }
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Directory the walk starts from. Defaults to the current directory.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Regex tested against entry names. Without one every entry is selected.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Regex tested against the lines of selected files by `search`.
    ///
    /// Independent of [`pattern()`](Self::pattern); when unset, `search`
    /// scans lines with the name pattern.
    pub fn content_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.content_pattern = Some(pattern.into());
        self
    }

    /// New name for `rename`, destination for `copy` and `move`.
    /// `$(N)` is replaced by capture group N of the name pattern.
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Walk the whole subtree instead of the direct children only.
    ///
    /// Also allows `delete` to remove non-empty directories.
    pub fn recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }

    /// Include entries whose name starts with `.`, and descend into hidden
    /// directories.
    pub fn include_hidden(mut self, yes: bool) -> Self {
        self.include_hidden = yes;
        self
    }

    /// Log per-entry failures at `warn` level.
    pub fn verbose(mut self, yes: bool) -> Self {
        self.verbose = yes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Validate the configuration into an immutable [`Invocation`].
    ///
    /// # Errors
    ///
    /// Fails before touching anything when a pattern does not compile, the
    /// root is not a directory, a naming command has no template, or a
    /// command that needs a pattern has none.
    pub fn build(self) -> Result<Invocation> {
        let name_pattern = self.pattern.as_deref().map(Pattern::compile).transpose()?;
        let content_pattern = self
            .content_pattern
            .as_deref()
            .map(Pattern::compile)
            .transpose()?;

        let root = std::path::absolute(&self.root)
            .map(|p| normalize(&p))
            .map_err(|e| FileBuddyError::io(&self.root, e))?;
        if !root.is_dir() {
            return Err(FileBuddyError::InvalidRoot(self.root));
        }

        if self.command.is_destructive() && name_pattern.is_none() {
            return Err(FileBuddyError::MissingPattern(self.command));
        }
        if self.command == Command::Search && name_pattern.is_none() && content_pattern.is_none() {
            return Err(FileBuddyError::MissingPattern(self.command));
        }

        let template = self.template.as_deref().map(Template::parse);
        if self.command.needs_template() && template.is_none() {
            return Err(FileBuddyError::MissingTemplate(self.command));
        }

        Ok(Invocation {
            command: self.command,
            root,
            name_pattern,
            content_pattern,
            template,
            recursive: self.recursive,
            include_hidden: self.include_hidden,
            verbose: self.verbose,
        })
    }

    /// Validate, walk, filter, and apply the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` only for setup errors (see [`build()`](Self::build)).
    /// Everything that goes wrong with individual entries is recorded in the
    /// [`Report`].
    pub fn run(self) -> Result<Report> {
        let invocation = self.build()?;
        Ok(run(&invocation))
    }
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Walk, filter and execute a validated invocation.
pub fn run(invocation: &Invocation) -> Report {
    let start = Instant::now();
    info!(
        command = %invocation.command,
        root = %invocation.root.display(),
        recursive = invocation.recursive,
        include_hidden = invocation.include_hidden,
        "starting"
    );

    let matcher: &dyn Matcher = match &invocation.name_pattern {
        Some(pattern) => pattern,
        None => &MatchAll,
    };

    let walker = PathWalker::new(&invocation.root, invocation.walk_options());
    let mut walk = walker.walk();

    let mut files = 0;
    let mut dirs = 0;
    let mut errors = Vec::new();
    let mut matches: Vec<Match> = Vec::new();

    for item in walk.by_ref() {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                errors.push(e);
                continue;
            }
        };

        match entry.kind {
            EntryKind::File => files += 1,
            EntryKind::Dir => dirs += 1,
            _ => {}
        }

        if let Some(m) = matcher.select(entry) {
            matches.push(m);
        }
    }

    let hidden_pruned = walk.hidden_pruned();
    if hidden_pruned > 0 {
        debug!(hidden_pruned, "hidden entries were left out");
    }

    let matched = matches.len();
    let results = engine::execute(invocation, matches);

    Report {
        results,
        errors,
        hidden_pruned,
        stats: ScanStats {
            files,
            dirs,
            matches: matched,
            duration: start.elapsed(),
        },
    }
}
