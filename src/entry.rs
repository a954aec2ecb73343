use std::path::{Path, PathBuf};

/// A single filesystem object produced by the [`PathWalker`](crate::PathWalker).
///
/// Entries are materialized fresh on every walk and never cached. The engine
/// treats them as read-only snapshots: if an operation moves or removes the
/// underlying object, the `Entry` itself is not updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Full path to the entry. Absolute when the walk root was absolute.
    pub path: PathBuf,

    /// The final path component, lossily converted to UTF-8.
    /// This is the string the name pattern is tested against.
    pub name: String,

    /// What kind of entry this is.
    pub kind: EntryKind,

    /// How deep below the walk root this entry was found. Direct children = 1.
    pub depth: usize,

    /// Whether the name marks the entry as hidden (leading `.`).
    pub hidden: bool,

    /// Size in bytes for regular files, read during traversal.
    /// `None` for directories, symlinks, or when metadata was unavailable.
    pub size: Option<u64>,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// The directory containing this entry.
    pub fn parent(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// The kind of a traversed entry.
///
/// Symlinks are never followed, so a link to a directory is reported as
/// `Symlink`, not `Dir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl EntryKind {
    /// Classify a [`std::fs::FileType`].
    pub fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_dir() {
            Self::Dir
        } else if ft.is_file() {
            Self::File
        } else if ft.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }
}

/// Whether a file name marks a hidden entry.
pub(crate) fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}
