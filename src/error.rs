use std::path::PathBuf;
use thiserror::Error;

use crate::invocation::Command;

#[derive(Error, Debug)]
pub enum FileBuddyError {
    // Setup
    #[error("invalid regex pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("directory '{}' does not exist", .0.display())]
    InvalidRoot(PathBuf),

    #[error("{0} requires a pattern")]
    MissingPattern(Command),

    #[error("{0} requires a destination template")]
    MissingTemplate(Command),

    // Template
    #[error("template references group {group} but the highest group is {highest}")]
    GroupOutOfRange { group: usize, highest: usize },

    #[error("template references group {0}, which did not participate in the match")]
    UnmatchedGroup(usize),

    // Traversal
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("symlink loop: {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("walk error: {0}")]
    Walk(String),

    // Operations
    #[error("destination already exists: {}", .0.display())]
    Collision(PathBuf),

    #[error("{} was removed together with {}", .path.display(), .ancestor.display())]
    AncestorRemoved { path: PathBuf, ancestor: PathBuf },

    #[error("directory not empty: {} (use recursive mode to delete it)", .0.display())]
    DirectoryNotEmpty(PathBuf),

    #[error("cannot place {} inside itself at {}", .source_path.display(), .destination.display())]
    DestinationInsideSource {
        source_path: PathBuf,
        destination: PathBuf,
    },

    #[error("name of {} is not valid UTF-8, so its captures cannot be used in a template", .0.display())]
    NonUtf8Name(PathBuf),

    #[error("new name for {} leaves its directory: {}", .path.display(), .target.display())]
    RenameOutsideDirectory { path: PathBuf, target: PathBuf },

    #[error("size of {} is incomplete: {unreadable} path(s) below it could not be read", .path.display())]
    PartialSize { path: PathBuf, unreadable: usize },

    #[error("I/O error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileBuddyError {
    /// Wrap an I/O error, keeping the distinct variants for the common kinds.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source },
        }
    }

    /// The path this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <path>" without pattern matching on variants.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::InvalidRoot(p)
            | Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::SymlinkLoop(p)
            | Self::Collision(p)
            | Self::DirectoryNotEmpty(p)
            | Self::NonUtf8Name(p)
            | Self::RenameOutsideDirectory { path: p, .. }
            | Self::AncestorRemoved { path: p, .. }
            | Self::DestinationInsideSource { source_path: p, .. }
            | Self::PartialSize { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the batch can continue after this error.
    ///
    /// Everything except setup errors is recoverable: it is recorded against
    /// a single entry or path and the rest of the batch keeps going.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidPattern { .. }
                | Self::InvalidRoot(_)
                | Self::MissingPattern(_)
                | Self::MissingTemplate(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FileBuddyError>;
