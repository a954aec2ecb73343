//! Filesystem primitives used by the destructive commands.
//!
//! None of these overwrite: callers check the destination first, the copy
//! helpers open files with `create_new`, and files are moved by hard-linking
//! before unlinking, so a destination that appears in the meantime is
//! reported instead of clobbered.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{FileBuddyError, Result};

/// Whether something, including a dangling symlink, occupies `path`.
pub(crate) fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Create the parent directories of `path` if they are missing.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| FileBuddyError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Remove a file, symlink, or directory.
///
/// A non-empty directory is only removed when `recursive` is set.
pub(crate) fn remove(path: &Path, recursive: bool) -> Result<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| FileBuddyError::io(path, e))?;

    if !meta.is_dir() {
        return fs::remove_file(path).map_err(|e| FileBuddyError::io(path, e));
    }

    let empty = fs::read_dir(path)
        .map_err(|e| FileBuddyError::io(path, e))?
        .next()
        .is_none();

    if empty {
        fs::remove_dir(path).map_err(|e| FileBuddyError::io(path, e))
    } else if recursive {
        fs::remove_dir_all(path).map_err(|e| FileBuddyError::io(path, e))
    } else {
        Err(FileBuddyError::DirectoryNotEmpty(path.to_path_buf()))
    }
}

/// Copy a file, symlink, or directory tree to a destination that must not exist.
pub(crate) fn copy(from: &Path, to: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(from).map_err(|e| FileBuddyError::io(from, e))?;
    let ft = meta.file_type();

    if ft.is_dir() {
        fs::create_dir(to).map_err(|e| create_error(to, e))?;
        let entries = fs::read_dir(from).map_err(|e| FileBuddyError::io(from, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| FileBuddyError::io(from, e))?;
            copy(&entry.path(), &to.join(entry.file_name()))?;
        }
        // Best effort; contents are already in place.
        if let Err(e) = fs::set_permissions(to, meta.permissions()) {
            debug!(path = %to.display(), error = %e, "could not copy directory permissions");
        }
        Ok(())
    } else if ft.is_symlink() {
        copy_symlink(from, to)
    } else {
        copy_file(from, to, &meta)
    }
}

fn copy_file(from: &Path, to: &Path, meta: &fs::Metadata) -> Result<()> {
    let mut reader = File::open(from).map_err(|e| FileBuddyError::io(from, e))?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
        .map_err(|e| create_error(to, e))?;

    io::copy(&mut reader, &mut writer).map_err(|e| FileBuddyError::io(to, e))?;
    writer
        .set_permissions(meta.permissions())
        .map_err(|e| FileBuddyError::io(to, e))?;
    if let Ok(modified) = meta.modified() {
        let _ = writer.set_modified(modified);
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from).map_err(|e| FileBuddyError::io(from, e))?;
    std::os::unix::fs::symlink(&target, to).map_err(|e| create_error(to, e))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    // Without portable symlink creation, copy what the link points at.
    let meta = fs::metadata(from).map_err(|e| FileBuddyError::io(from, e))?;
    copy_file(from, to, &meta)
}

/// Move `from` to `to`, falling back to copy-then-remove across devices.
///
/// An occupied destination is a [`FileBuddyError::Collision`].
pub(crate) fn relocate(from: &Path, to: &Path) -> Result<()> {
    match rename_no_replace(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
            copy(from, to)?;
            remove(from, true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(FileBuddyError::Collision(to.to_path_buf()))
        }
        Err(e) => Err(FileBuddyError::io(from, e)),
    }
}

/// Rename that fails with `AlreadyExists` instead of replacing `to`.
///
/// A regular file gets a hard link at `to` first, which cannot replace an
/// existing entry, and the old name is unlinked afterwards. Directories,
/// symlinks, and filesystems without hard links fall back to a plain rename
/// behind a fresh occupancy check.
fn rename_no_replace(from: &Path, to: &Path) -> io::Result<()> {
    if fs::symlink_metadata(from)?.is_file() {
        match fs::hard_link(from, to) {
            Ok(()) => return fs::remove_file(from),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::CrossesDevices
                ) =>
            {
                return Err(e)
            }
            Err(e) => {
                debug!(path = %from.display(), error = %e, "hard link unavailable, renaming");
            }
        }
    }

    if occupied(to) {
        return Err(io::ErrorKind::AlreadyExists.into());
    }
    fs::rename(from, to)
}

/// Resolve `.` and `..` lexically, without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn create_error(path: &Path, e: io::Error) -> FileBuddyError {
    if e.kind() == io::ErrorKind::AlreadyExists {
        FileBuddyError::Collision(path.to_path_buf())
    } else {
        FileBuddyError::io(path, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_refuses_non_empty_directory_unless_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("full");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("f"), "x").unwrap();

        let err = remove(&sub, false).unwrap_err();
        assert!(matches!(err, FileBuddyError::DirectoryNotEmpty(_)));
        assert!(sub.exists());

        remove(&sub, true).unwrap();
        assert!(!sub.exists());
    }

    #[test]
    fn remove_deletes_empty_directory_without_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("empty");
        fs::create_dir(&sub).unwrap();
        remove(&sub, false).unwrap();
        assert!(!sub.exists());
    }

    #[test]
    fn copy_tree_and_refuse_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), "alpha").unwrap();
        fs::write(src.join("nested/b.txt"), "beta").unwrap();

        let dst = dir.path().join("dst");
        copy(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(dst.join("nested/b.txt")).unwrap(), "beta");

        let err = copy(&src.join("a.txt"), &dst.join("a.txt")).unwrap_err();
        assert!(matches!(err, FileBuddyError::Collision(_)));
    }

    #[test]
    fn relocate_never_replaces_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let draft = dir.path().join("draft.txt");
        let report = dir.path().join("report.txt");
        fs::write(&draft, "new").unwrap();
        fs::write(&report, "keep me").unwrap();

        let err = relocate(&draft, &report).unwrap_err();
        assert!(matches!(err, FileBuddyError::Collision(p) if p == report));
        assert_eq!(fs::read_to_string(&draft).unwrap(), "new");
        assert_eq!(fs::read_to_string(&report).unwrap(), "keep me");

        let fresh = dir.path().join("fresh.txt");
        relocate(&draft, &fresh).unwrap();
        assert!(!draft.exists());
        assert_eq!(fs::read_to_string(&fresh).unwrap(), "new");
    }

    #[test]
    fn relocate_refuses_an_empty_directory_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();
        fs::create_dir(&dst).unwrap();

        let err = relocate(&src, &dst).unwrap_err();
        assert!(matches!(err, FileBuddyError::Collision(_)));
        assert!(src.join("a.txt").exists());
        assert!(dst.is_dir());
    }

    #[test]
    fn normalize_is_lexical() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn ensure_parent_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x/y/z.txt");
        ensure_parent(&target).unwrap();
        assert!(dir.path().join("x/y").is_dir());
    }
}
