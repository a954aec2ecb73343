use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

use crate::entry::EntryKind;
use crate::error::FileBuddyError;

/// How one entry fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation was applied (or, for read-only commands, reported).
    Success,

    /// The operation could not proceed safely and nothing was changed,
    /// e.g. the destination already exists.
    Skipped,

    /// Something went wrong while applying the operation.
    Failed,
}

/// Command-specific payload of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    /// Byte length of a file, or aggregated size of a directory's subtree.
    Size(u64),

    /// One line of a file that matched the content pattern.
    Line {
        /// 1-based line number.
        number: usize,
        text: String,
        /// Byte range of the match within `text`.
        span: Range<usize>,
    },
}

/// The outcome of applying the command to one match.
#[derive(Debug)]
pub struct OperationResult {
    /// Where the entry was when the operation started.
    pub source: PathBuf,

    /// Kind of the source entry.
    pub kind: EntryKind,

    /// Resolved destination for rename/copy/move. Set even when the entry was
    /// skipped because the destination was occupied.
    pub target: Option<PathBuf>,

    pub status: Status,

    pub detail: Option<Detail>,

    /// Why the entry was skipped or failed.
    pub error: Option<FileBuddyError>,
}

impl OperationResult {
    pub(crate) fn success(source: PathBuf, kind: EntryKind) -> Self {
        Self {
            source,
            kind,
            target: None,
            status: Status::Success,
            detail: None,
            error: None,
        }
    }

    pub(crate) fn skipped(source: PathBuf, kind: EntryKind, error: FileBuddyError) -> Self {
        Self {
            status: Status::Skipped,
            error: Some(error),
            ..Self::success(source, kind)
        }
    }

    pub(crate) fn failed(source: PathBuf, kind: EntryKind, error: FileBuddyError) -> Self {
        Self {
            status: Status::Failed,
            error: Some(error),
            ..Self::success(source, kind)
        }
    }

    pub(crate) fn with_target(mut self, target: PathBuf) -> Self {
        self.target = Some(target);
        self
    }

    pub(crate) fn with_detail(mut self, detail: Detail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// The output of a completed invocation.
#[derive(Debug)]
pub struct Report {
    /// One or more results per match, in traversal order.
    pub results: Vec<OperationResult>,

    /// Per-path errors hit while walking (unreadable directories, symlink
    /// loops). The walk continued past each of them.
    pub errors: Vec<FileBuddyError>,

    /// Hidden entries left out of the walk. Non-zero means hidden content
    /// may be missing from the results.
    pub hidden_pruned: usize,

    /// Scan statistics.
    pub stats: ScanStats,
}

impl Report {
    pub fn succeeded(&self) -> usize {
        self.count(Status::Success)
    }

    pub fn skipped(&self) -> usize {
        self.count(Status::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(Status::Failed)
    }

    fn count(&self, status: Status) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Statistics for a completed invocation.
#[derive(Debug, Clone, Copy)]
pub struct ScanStats {
    /// Files produced by the walk (matched or not).
    pub files: usize,

    /// Directories produced by the walk.
    pub dirs: usize,

    /// Entries whose name satisfied the pattern.
    pub matches: usize,

    /// Wall-clock time from the start of the walk to the last operation.
    pub duration: Duration,
}
