//! Portable relative-path helpers
//!
//! Persisted paths are always relative and use forward slashes, whatever the
//! host. These helpers convert between that form and host `PathBuf`s.

use std::path::{Component, Path, PathBuf};

use crate::error::{LibraryError, Result};
use crate::models::Manifest;

/// Host-independent absolute path detection.
///
/// Recognises POSIX roots (`/x`), Windows root-relative and UNC paths
/// (`\x`, `\\server\share`) and drive paths (`C:\x`, `C:/x`).
pub fn is_absolute_portable(path: &str) -> bool {
    let bytes = path.as_bytes();
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Join `base_dir` and `dataset_filename` with a single `/`.
///
/// Trailing separators on the base and leading separators on the filename
/// are dropped; backslashes become forward slashes. An empty base yields the
/// filename alone.
pub fn join_rel_path(base_dir: &str, dataset_filename: &str) -> String {
    let base = base_dir.replace('\\', "/");
    let base = base.trim_end_matches('/');
    let name = dataset_filename.replace('\\', "/");
    let name = name.trim_start_matches('/');

    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

/// Normalize a dataset-relative filename: forward slashes only, no empty or
/// `.` segments, no leading separator.
pub fn normalize_dataset_filename(name: &str) -> String {
    name.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Check that a normalized dataset filename stays inside the dataset root.
///
/// # Errors
///
/// Returns [`LibraryError::InvalidInput`] for an empty name, an absolute
/// path, or any `..` segment.
pub fn validate_dataset_filename(name: &str) -> Result<()> {
    let problem = if name.is_empty() {
        "empty dataset_filename"
    } else if is_absolute_portable(name) {
        "absolute dataset_filename"
    } else if name.split(['/', '\\']).any(|segment| segment == "..") {
        "dataset_filename escapes the dataset dir"
    } else {
        return Ok(());
    };

    Err(LibraryError::InvalidInput {
        field: "dataset_filename".to_string(),
        message: format!("{}: {:?}", problem, name),
    })
}

/// Relative forward-slash form of `file` below `root`.
///
/// # Errors
///
/// Returns [`LibraryError::InvalidInput`] when `file` is not under `root`.
pub fn to_dataset_filename(root: &Path, file: &Path) -> Result<String> {
    let relative = file
        .strip_prefix(root)
        .map_err(|_| LibraryError::InvalidInput {
            field: "file".to_string(),
            message: format!("{} is not under {}", file.display(), root.display()),
        })?;

    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return Err(LibraryError::InvalidInput {
            field: "file".to_string(),
            message: format!("{} names the root itself", file.display()),
        });
    }

    Ok(segments.join("/"))
}

/// Usable host path for an item: `project_root` + `base_dir` + `dataset_filename`.
///
/// `.` and empty segments are skipped so `./dataset` resolves cleanly.
pub fn resolve(project_root: &Path, manifest: &Manifest, dataset_filename: &str) -> PathBuf {
    let joined = join_rel_path(manifest.base_dir(), dataset_filename);
    let mut path = project_root.to_path_buf();
    for segment in joined.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        path.push(segment);
    }
    path
}

/// Lexical containment check; `..` segments are folded before comparing.
///
/// Neither path has to exist.
pub fn is_within(dir: &Path, path: &Path) -> bool {
    let dir = lexical_normalize(dir);
    let path = lexical_normalize(path);
    path != dir && path.starts_with(&dir)
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
