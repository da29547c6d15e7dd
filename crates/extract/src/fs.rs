//! File-system helpers shared by the extractors.

use std::path::{Component, Path, PathBuf};

use binvendor_core::{Error, Result};
use tracing::debug;

use crate::ExtractOptions;

/// Create `dir` and all of its parents.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| Error::file("create directory", dir, e))
}

/// Create the parent directory of `path`, if it has one.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Turn a stored member path into the path it is extracted to, relative to
/// the destination.
///
/// `.` components are dropped. Members that are absolute or climb out with
/// `..` are rejected. When `strip` is a prefix of the member path it is
/// removed; members outside the prefix keep their stored path. Returns `None`
/// when nothing is left, which happens for the prefix directory itself.
pub(crate) fn member_path(stored: &Path, strip: Option<&Path>) -> Result<Option<PathBuf>> {
    let mut relative = PathBuf::new();
    for component in stored.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafeEntryPath {
                    entry: stored.display().to_string(),
                });
            }
        }
    }

    let logical = match strip {
        Some(prefix) => relative
            .strip_prefix(normalize(prefix))
            .map_or(relative.clone(), Path::to_path_buf),
        None => relative,
    };

    if logical.as_os_str().is_empty() {
        Ok(None)
    } else {
        Ok(Some(logical))
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Whether a stored Unix mode describes a symbolic link.
pub(crate) const fn is_symlink_mode(mode: u32) -> bool {
    mode & S_IFMT == S_IFLNK
}

/// Whether anything, including a dangling link, exists at `path`.
pub(crate) fn present(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Recreate the link member `member` (relative to the destination) at
/// `link`, pointing at `target`.
///
/// The target must resolve inside the destination. Platforms without
/// symbolic links get a regular file holding the target text.
pub(crate) fn create_symlink(member: &Path, link: &Path, target: &str) -> Result<()> {
    let unsafe_link = || Error::UnsafeEntryPath {
        entry: format!("{} -> {target}", member.display()),
    };

    let mut depth = member.components().count().saturating_sub(1);
    for component in Path::new(target).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => depth = depth.checked_sub(1).ok_or_else(unsafe_link)?,
            Component::RootDir | Component::Prefix(_) => return Err(unsafe_link()),
        }
    }

    debug!(?link, %target, "Creating symbolic link");
    symlink(target, link)
}

#[cfg(unix)]
fn symlink(target: &str, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::file("create symlink", link, e))
}

#[cfg(not(unix))]
fn symlink(target: &str, link: &Path) -> Result<()> {
    std::fs::write(link, target).map_err(|e| Error::file("write", link, e))
}

/// Apply Unix permission bits to `path`. A no-op on other platforms.
#[cfg(unix)]
pub(crate) fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let permissions = std::fs::Permissions::from_mode(mode & 0o7777);
    std::fs::set_permissions(path, permissions)
        .map_err(|e| Error::file("set permissions on", path, e))
}

/// Apply Unix permission bits to `path`. A no-op on other platforms.
#[cfg(not(unix))]
pub(crate) fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Move a file, falling back to copy-and-delete across file systems.
pub(crate) fn move_file(from: &Path, to: &Path) -> Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            std::fs::copy(from, to).map_err(|e| Error::file("copy", from, e))?;
            std::fs::remove_file(from).map_err(|e| Error::file("remove", from, e))
        }
        Err(e) => Err(Error::file("move", from, e)),
    }
}

/// Perform the post-extraction rename when both ends are configured.
pub(crate) fn apply_rename(destination: &Path, options: &ExtractOptions) -> Result<()> {
    let Some((from, to)) = options.rename_pair() else {
        return Ok(());
    };

    let from = destination.join(from);
    let to = destination.join(to);
    debug!(?from, ?to, "Renaming extracted file");

    ensure_parent(&to)?;
    move_file(&from, &to)
}
