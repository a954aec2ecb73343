use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::entry::EntryKind;
use crate::error::{FileBuddyError, Result};
use crate::fs_ops::{self, normalize};
use crate::invocation::{Command, Invocation};
use crate::pattern::{Match, MatchAll};
use crate::results::{Detail, OperationResult, Status};
use crate::template::Template;
use crate::traits::Matcher;
use crate::walker::{PathWalker, WalkOptions};

// ---------------------------------------------------------------------------
// execute()
// ---------------------------------------------------------------------------

/// Apply the invocation's command to every match, in the order given.
///
/// Never fails as a whole: each entry's problem is captured in its own
/// [`OperationResult`] and processing moves on. `list`, `size` and `rename`,
/// `delete`, `copy`, `move` produce exactly one result per match; `search`
/// produces one per matching line, or one failure for an unreadable file.
pub fn execute(
    invocation: &Invocation,
    matches: impl IntoIterator<Item = Match>,
) -> Vec<OperationResult> {
    let matches: Vec<Match> = matches.into_iter().collect();
    debug!(command = %invocation.command, matches = matches.len(), "executing");

    let results = match invocation.command {
        Command::List => matches
            .into_iter()
            .map(|m| OperationResult::success(m.entry.path, m.entry.kind))
            .collect(),
        Command::Size => size(invocation, &matches),
        Command::Search => search(invocation, &matches),
        Command::Rename | Command::Delete | Command::Copy | Command::Move => {
            mutate(invocation, &matches)
        }
    };

    for result in &results {
        log_outcome(invocation, result);
    }
    results
}

fn log_outcome(invocation: &Invocation, result: &OperationResult) {
    let source = result.source.display();
    match (&result.status, &result.error) {
        (Status::Success, _) => debug!(%source, target = ?result.target, "done"),
        (status, Some(error)) if invocation.verbose => {
            warn!(%source, ?status, %error, "entry not processed")
        }
        (status, error) => debug!(%source, ?status, ?error, "entry not processed"),
    }
}

// ---------------------------------------------------------------------------
// size
// ---------------------------------------------------------------------------

fn size(invocation: &Invocation, matches: &[Match]) -> Vec<OperationResult> {
    let index = if matches.iter().any(|m| m.entry.is_dir()) {
        SizeIndex::build(&invocation.root, invocation.include_hidden)
    } else {
        SizeIndex::default()
    };

    matches
        .iter()
        .map(|m| {
            let path = m.entry.path.clone();
            let kind = m.entry.kind;

            if m.entry.is_dir() {
                let bytes = index.size_of(&path);
                let unreadable = index.unreadable_below(&path);
                let result = if unreadable == 0 {
                    OperationResult::success(path, kind)
                } else {
                    let error = FileBuddyError::PartialSize {
                        path: path.clone(),
                        unreadable,
                    };
                    OperationResult::failed(path, kind, error)
                };
                return result.with_detail(Detail::Size(bytes));
            }

            let bytes = match m.entry.size {
                Some(bytes) => Ok(bytes),
                None => fs::metadata(&path)
                    .map(|meta| meta.len())
                    .map_err(|e| FileBuddyError::io(&path, e)),
            };
            match bytes {
                Ok(bytes) => OperationResult::success(path, kind).with_detail(Detail::Size(bytes)),
                Err(e) => OperationResult::failed(path, kind, e),
            }
        })
        .collect()
}

/// Directory sizes aggregated bottom-up from one recursive walk.
///
/// Uses the same hidden policy as the invocation, so pruned content never
/// contributes to a total.
#[derive(Default)]
struct SizeIndex {
    sizes: HashMap<PathBuf, u64>,
    unreadable: Vec<PathBuf>,
}

impl SizeIndex {
    fn build(root: &Path, include_hidden: bool) -> Self {
        let walker = PathWalker::new(
            root,
            WalkOptions {
                recursive: true,
                include_hidden,
            },
        );

        let mut index = Self::default();
        for item in walker.walk() {
            let entry = match item {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "size aggregation could not read a path");
                    index.unreadable.push(e.path().cloned().unwrap_or_default());
                    continue;
                }
            };

            let Some(bytes) = entry.size else { continue };
            for dir in entry.path.ancestors().skip(1) {
                if !dir.starts_with(root) {
                    break;
                }
                *index.sizes.entry(dir.to_path_buf()).or_insert(0) += bytes;
            }
        }
        index
    }

    fn size_of(&self, dir: &Path) -> u64 {
        self.sizes.get(dir).copied().unwrap_or(0)
    }

    fn unreadable_below(&self, dir: &Path) -> usize {
        self.unreadable.iter().filter(|p| p.starts_with(dir)).count()
    }
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

fn search(invocation: &Invocation, matches: &[Match]) -> Vec<OperationResult> {
    let matcher: &dyn Matcher = match invocation.line_pattern() {
        Some(pattern) => pattern,
        None => &MatchAll,
    };

    let mut results = Vec::new();
    for m in matches.iter().filter(|m| m.entry.is_file()) {
        scan_lines(&m.entry.path, matcher, &mut results);
    }
    results
}

/// Emit one result per line of `path` that `matcher` accepts.
///
/// The file handle lives only for the duration of this call. A read error,
/// including invalid UTF-8, stops the scan of this file with a failed result;
/// lines reported before it stay reported.
fn scan_lines(path: &Path, matcher: &dyn Matcher, results: &mut Vec<OperationResult>) {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            results.push(OperationResult::failed(
                path.to_path_buf(),
                EntryKind::File,
                FileBuddyError::io(path, e),
            ));
            return;
        }
    };

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let text = match line {
            Ok(text) => text,
            Err(e) => {
                results.push(OperationResult::failed(
                    path.to_path_buf(),
                    EntryKind::File,
                    FileBuddyError::io(path, e),
                ));
                return;
            }
        };

        if let Some(captures) = matcher.captures(&text) {
            let detail = Detail::Line {
                number: index + 1,
                span: captures.span(),
                text,
            };
            results.push(OperationResult::success(path.to_path_buf(), EntryKind::File).with_detail(detail));
        }
    }
}

// ---------------------------------------------------------------------------
// rename / delete / copy / move
// ---------------------------------------------------------------------------

fn mutate(invocation: &Invocation, matches: &[Match]) -> Vec<OperationResult> {
    let mut ledger = Ledger::default();

    matches
        .iter()
        .map(|m| {
            let source = match ledger.locate(&m.entry.path) {
                Ok(path) => path,
                Err(e) => return OperationResult::skipped(m.entry.path.clone(), m.entry.kind, e),
            };

            let outcome = match (invocation.command, invocation.template.as_ref()) {
                (Command::Delete, _) => delete(invocation, &source),
                (Command::Rename, Some(template)) => rename(template, m, &source),
                (Command::Copy | Command::Move, Some(template)) => {
                    transfer(invocation, template, m, &source)
                }
                (command, _) => Outcome::failed(FileBuddyError::MissingTemplate(command)),
            };

            if outcome.result.is_ok() && m.entry.is_dir() {
                match (invocation.command, &outcome.target) {
                    (Command::Delete, _) => ledger.record_removed(&source),
                    (Command::Rename | Command::Move, Some(target)) => {
                        ledger.record_relocated(&source, target)
                    }
                    _ => {}
                }
            }

            outcome.into_result(source, m.entry.kind)
        })
        .collect()
}

/// The result of one mutation, before it is turned into an [`OperationResult`].
struct Outcome {
    target: Option<PathBuf>,
    result: Result<()>,
}

impl Outcome {
    fn failed(error: FileBuddyError) -> Self {
        Self {
            target: None,
            result: Err(error),
        }
    }

    fn at(target: PathBuf, result: Result<()>) -> Self {
        Self {
            target: Some(target),
            result,
        }
    }

    fn into_result(self, source: PathBuf, kind: EntryKind) -> OperationResult {
        let result = match self.result {
            Ok(()) => OperationResult::success(source, kind),
            Err(e @ FileBuddyError::Collision(_)) => OperationResult::skipped(source, kind, e),
            Err(e) => OperationResult::failed(source, kind, e),
        };
        match self.target {
            Some(target) => result.with_target(target),
            None => result,
        }
    }
}

/// Expand `template` against the match's captures.
///
/// Captures come from the UTF-8 rendering of the name, so a name that is not
/// valid UTF-8 would be written back with replacement characters. Such entries
/// fail unless the template is pure literal text.
fn expand_for(template: &Template, m: &Match) -> Result<String> {
    let raw_name = m.entry.path.file_name().and_then(|name| name.to_str());
    if raw_name.is_none() && template.has_groups() {
        return Err(FileBuddyError::NonUtf8Name(m.entry.path.clone()));
    }
    template.expand(&m.captures)
}

fn rename(template: &Template, m: &Match, source: &Path) -> Outcome {
    let new_name = match expand_for(template, m) {
        Ok(name) => name,
        Err(e) => return Outcome::failed(e),
    };

    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    let target = normalize(&parent.join(new_name));

    // A new name may add subdirectories but never climb out of the parent.
    if target == parent || !target.starts_with(parent) {
        let error = FileBuddyError::RenameOutsideDirectory {
            path: source.to_path_buf(),
            target: target.clone(),
        };
        return Outcome::at(target, Err(error));
    }

    if fs_ops::occupied(&target) {
        let collision = FileBuddyError::Collision(target.clone());
        return Outcome::at(target, Err(collision));
    }

    let result = fs_ops::ensure_parent(&target).and_then(|()| fs_ops::relocate(source, &target));
    Outcome::at(target, result)
}

fn delete(invocation: &Invocation, source: &Path) -> Outcome {
    Outcome {
        target: None,
        result: fs_ops::remove(source, invocation.recursive),
    }
}

fn transfer(invocation: &Invocation, template: &Template, m: &Match, source: &Path) -> Outcome {
    let expanded = match expand_for(template, m) {
        Ok(text) => text,
        Err(e) => return Outcome::failed(e),
    };

    let mut target = invocation.root.join(&expanded);
    let into_dir = expanded.ends_with(std::path::is_separator) || target.is_dir();
    if into_dir {
        if let Some(name) = source.file_name() {
            target.push(name);
        }
    }
    let target = normalize(&target);

    if m.entry.is_dir() && target.starts_with(source) {
        let error = FileBuddyError::DestinationInsideSource {
            source_path: source.to_path_buf(),
            destination: target.clone(),
        };
        return Outcome::at(target, Err(error));
    }

    if fs_ops::occupied(&target) {
        let collision = FileBuddyError::Collision(target.clone());
        return Outcome::at(target, Err(collision));
    }

    let result = fs_ops::ensure_parent(&target).and_then(|()| match invocation.command {
        Command::Move => fs_ops::relocate(source, &target),
        _ => fs_ops::copy(source, &target),
    });
    Outcome::at(target, result)
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Directory moves and removals made earlier in the batch.
///
/// Matches were collected before anything changed, so a match beneath a
/// directory that has since been renamed must be looked up at its new
/// location, and one beneath a removed directory no longer exists.
#[derive(Default)]
struct Ledger {
    events: Vec<Event>,
}

enum Event {
    Relocated { from: PathBuf, to: PathBuf },
    Removed(PathBuf),
}

impl Ledger {
    fn record_relocated(&mut self, from: &Path, to: &Path) {
        self.events.push(Event::Relocated {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
    }

    fn record_removed(&mut self, path: &Path) {
        self.events.push(Event::Removed(path.to_path_buf()));
    }

    /// Where `original` lives now, replaying the events in order.
    fn locate(&self, original: &Path) -> Result<PathBuf> {
        let mut current = original.to_path_buf();
        for event in &self.events {
            match event {
                Event::Relocated { from, to } => {
                    if let Ok(rest) = current.strip_prefix(from) {
                        current = to.join(rest);
                    }
                }
                Event::Removed(dir) => {
                    if current.starts_with(dir) {
                        return Err(FileBuddyError::AncestorRemoved {
                            path: original.to_path_buf(),
                            ancestor: dir.clone(),
                        });
                    }
                }
            }
        }
        Ok(current)
    }
}
