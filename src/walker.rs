use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ignore::{DirEntry, WalkBuilder};
use tracing::trace;

use crate::entry::{is_hidden_name, Entry, EntryKind};
use crate::error::FileBuddyError;

// ---------------------------------------------------------------------------
// WalkOptions
// ---------------------------------------------------------------------------

/// Inclusion policy for a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Descend into subdirectories. When `false` only direct children of the
    /// root are produced.
    pub recursive: bool,

    /// Produce hidden entries. When `false` hidden entries are dropped and
    /// hidden directories are pruned, never descended into.
    pub include_hidden: bool,
}

// ---------------------------------------------------------------------------
// PathWalker
// ---------------------------------------------------------------------------

/// Enumerates the entries under a root directory.
///
/// Traversal is depth-first pre-order, and the children of every directory are
/// visited in byte-wise file name order, so two walks over an unchanged tree
/// produce the same sequence. The root itself is never produced and never
/// filtered. Symlinks are reported but not followed.
///
/// Every call to [`walk`](PathWalker::walk) starts from scratch; walks share
/// no state.
#[derive(Debug, Clone)]
pub struct PathWalker {
    root: PathBuf,
    options: WalkOptions,
}

impl PathWalker {
    pub fn new(root: impl Into<PathBuf>, options: WalkOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> WalkOptions {
        self.options
    }

    /// Start a fresh, lazy walk.
    pub fn walk(&self) -> Walk {
        let pruned = Arc::new(AtomicUsize::new(0));

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .same_file_system(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        if !self.options.recursive {
            builder.max_depth(Some(1));
        }

        if !self.options.include_hidden {
            let pruned = Arc::clone(&pruned);
            builder.filter_entry(move |entry| {
                if entry.depth() == 0 || !is_hidden_name(&entry.file_name().to_string_lossy()) {
                    return true;
                }
                pruned.fetch_add(1, Ordering::Relaxed);
                false
            });
        }

        Walk {
            inner: builder.build(),
            pruned,
        }
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// A lazy sequence of entries, or per-path errors, from one walk.
///
/// Errors do not end the sequence: an unreadable directory yields one `Err`
/// and the walk carries on with its siblings.
pub struct Walk {
    inner: ignore::Walk,
    pruned: Arc<AtomicUsize>,
}

impl Walk {
    /// How many hidden entries were dropped so far. A pruned directory counts
    /// once; its contents are never visited.
    pub fn hidden_pruned(&self) -> usize {
        self.pruned.load(Ordering::Relaxed)
    }
}

impl Iterator for Walk {
    type Item = Result<Entry, FileBuddyError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(e) => e,
                Err(e) => return Some(Err(map_ignore_error(e))),
            };

            // Skip the root itself
            if entry.depth() == 0 {
                continue;
            }

            trace!(path = %entry.path().display(), "walked");
            return Some(Ok(to_entry(&entry)));
        }
    }
}

/// Build an [`Entry`] from the `ignore` crate's `DirEntry`.
fn to_entry(entry: &DirEntry) -> Entry {
    let kind = entry
        .file_type()
        .map(EntryKind::from_file_type)
        .unwrap_or(EntryKind::Other);

    let name = entry.file_name().to_string_lossy().into_owned();

    let size = match kind {
        EntryKind::File => entry.metadata().ok().map(|m| m.len()),
        _ => None,
    };

    Entry {
        path: entry.path().to_path_buf(),
        hidden: is_hidden_name(&name),
        name,
        kind,
        depth: entry.depth(),
        size,
    }
}

// ---------------------------------------------------------------------------
// Map ignore::Error to FileBuddyError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> FileBuddyError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => FileBuddyError::io(path, io_err),
            // read_dir failures arrive as WithPath { WithDepth { Io } }
            ignore::Error::WithDepth { err, .. } => {
                map_ignore_error(ignore::Error::WithPath { path, err })
            }
            ignore::Error::Loop { child, .. } => FileBuddyError::SymlinkLoop(child),
            other => FileBuddyError::Walk(format!("{}: {}", path.display(), other)),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => FileBuddyError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => FileBuddyError::io(PathBuf::new(), io_err),
        other => FileBuddyError::Walk(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    /// The shape `ignore` gives a failed `read_dir`.
    fn denied(path: &str) -> ignore::Error {
        let io_err = ignore::Error::Io(io::Error::from(io::ErrorKind::PermissionDenied));
        ignore::Error::WithPath {
            path: PathBuf::from(path),
            err: Box::new(ignore::Error::WithDepth {
                depth: 2,
                err: Box::new(io_err),
            }),
        }
    }

    #[test]
    fn unreadable_directory_keeps_its_path() {
        let err = map_ignore_error(denied("/w/locked"));
        assert!(
            matches!(&err, FileBuddyError::PermissionDenied(p) if p == Path::new("/w/locked")),
            "{err:?}"
        );

        let outer_depth = ignore::Error::WithDepth {
            depth: 1,
            err: Box::new(denied("/w/locked")),
        };
        assert_eq!(map_ignore_error(outer_depth).path(), Some(&PathBuf::from("/w/locked")));
    }

    #[test]
    fn loops_and_unknown_errors_are_tagged() {
        let looped = ignore::Error::Loop {
            ancestor: PathBuf::from("/w"),
            child: PathBuf::from("/w/link"),
        };
        assert!(matches!(map_ignore_error(looped), FileBuddyError::SymlinkLoop(p) if p.ends_with("link")));

        let other = ignore::Error::UnrecognizedFileType("weird".into());
        assert!(matches!(map_ignore_error(other), FileBuddyError::Walk(_)));
    }
}
