//! Storage and File System Abstractions
//!
//! Provides the platform-agnostic trait used to enumerate a dataset directory,
//! read image bytes, persist uploads and JSONL exports, and delete uploaded
//! files.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// File system access trait
///
/// Abstracts file I/O operations so the dataset service never touches
/// `std::fs` directly:
/// - Desktop: direct filesystem access through Tokio
/// - Tests: in-memory doubles or `mockall` mocks
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn save_export(fs: &dyn FileSystemAccess, body: String) -> Result<()> {
///     fs.write_file(Path::new("./exports/prompts.jsonl"), body.into()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Write data to a file, creating it (and its parents) if needed
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// List all entries in a directory (non-recursive)
    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// List every regular file below `path`
    ///
    /// The default walks [`list_directory`](Self::list_directory) depth-first.
    /// When `recursive` is false only direct children are returned. Entries
    /// whose metadata cannot be read, and subdirectories that cannot be
    /// listed, land in [`FileListing::unreadable`]; only a failure to list
    /// `path` itself is an error.
    async fn list_files(&self, path: &Path, recursive: bool) -> Result<FileListing> {
        let mut listing = FileListing::default();
        let mut pending = Vec::new();

        for entry in self.list_directory(path).await? {
            pending.push(entry);
        }

        while let Some(entry) = pending.pop() {
            let metadata = match self.metadata(&entry).await {
                Ok(metadata) => metadata,
                Err(_) => {
                    listing.unreadable.push(entry);
                    continue;
                }
            };

            if !metadata.is_directory {
                listing.files.push(entry);
            } else if recursive {
                match self.list_directory(&entry).await {
                    Ok(children) => pending.extend(children),
                    Err(_) => listing.unreadable.push(entry),
                }
            }
        }

        Ok(listing)
    }
}

/// Result of [`FileSystemAccess::list_files`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListing {
    /// Regular files, in no particular order
    pub files: Vec<PathBuf>,
    /// Entries that could not be inspected: dangling links, symlink loops,
    /// permission errors
    pub unreadable: Vec<PathBuf>,
}
