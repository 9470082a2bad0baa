//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FileListing, FileMetadata, FileSystemAccess},
};
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Tokio-based file system implementation
///
/// Paths are used exactly as given; relative paths resolve against the
/// process working directory, which is how a dataset dir such as
/// `./dataset` is meant to be interpreted on desktop.
#[derive(Debug, Clone, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Create a new file system accessor
    pub fn new() -> Self {
        Self
    }

    /// Convert std::io::Error to BridgeError, keeping the path for NotFound
    fn map_io_error(path: &Path, e: std::io::Error) -> BridgeError {
        if e.kind() == ErrorKind::NotFound {
            BridgeError::NotFound(path.display().to_string())
        } else {
            BridgeError::Io(e)
        }
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;

        Ok(FileMetadata {
            size: metadata.len(),
            modified_at: metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64),
            is_directory: metadata.is_dir(),
        })
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent).await?;
        }

        fs::write(path, data.as_ref())
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }

    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Self::map_io_error(path, e))?
        {
            entries.push(entry.path());
        }

        debug!(path = ?path, count = entries.len(), "Listed directory");
        Ok(entries)
    }

    /// Walks with `walkdir` on the blocking pool. Symlinks are followed;
    /// dangling links and loops are reported as unreadable entries.
    async fn list_files(&self, path: &Path, recursive: bool) -> Result<FileListing> {
        fs::metadata(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;

        let root = path.to_path_buf();
        let listing = tokio::task::spawn_blocking(move || walk_files(&root, recursive))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("directory walk panicked: {}", e)))?;

        debug!(
            path = ?path,
            files = listing.files.len(),
            unreadable = listing.unreadable.len(),
            "Walked directory"
        );
        Ok(listing)
    }
}

fn walk_files(root: &Path, recursive: bool) -> FileListing {
    let mut listing = FileListing::default();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => listing.files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "Unreadable directory entry");
                if let Some(path) = e.path() {
                    listing.unreadable.push(path.to_path_buf());
                }
            }
        }
    }

    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let test_file = tmp.path().join("nested").join("test-file.txt");

        let data = Bytes::from("Hello, World!");
        fs.write_file(&test_file, data.clone()).await.unwrap();

        let read_data = fs.read_file(&test_file).await.unwrap();
        assert_eq!(data, read_data);

        fs.delete_file(&test_file).await.unwrap();
        assert!(!fs.exists(&test_file).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_maps_to_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();

        let result = fs.read_file(&tmp.path().join("absent.png")).await;
        assert!(matches!(result, Err(BridgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_files_recursive() {
        let tmp = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        fs.write_file(&tmp.path().join("a.png"), Bytes::from_static(b"a"))
            .await
            .unwrap();
        fs.write_file(&tmp.path().join("sub").join("b.jpg"), Bytes::from_static(b"b"))
            .await
            .unwrap();

        let all = fs.list_files(tmp.path(), true).await.unwrap();
        assert_eq!(all.files.len(), 2);
        assert!(all.files[1].ends_with("sub/b.jpg"));
        assert!(all.unreadable.is_empty());

        let flat = fs.list_files(tmp.path(), false).await.unwrap();
        assert_eq!(flat.files, vec![tmp.path().join("a.png")]);

        let metadata = fs.metadata(&tmp.path().join("sub")).await.unwrap();
        assert!(metadata.is_directory);
    }

    #[tokio::test]
    async fn test_list_files_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();

        let result = fs.list_files(&tmp.path().join("absent"), true).await;
        assert!(matches!(result, Err(BridgeError::NotFound(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_files_survives_broken_links_and_loops() {
        use std::os::unix::fs::symlink;

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("dataset");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("cat.png"), b"cat").unwrap();
        symlink(root.join("gone.png"), root.join("broken.png")).unwrap();
        symlink(&root, root.join("loop")).unwrap();

        let listing = TokioFileSystem::new().list_files(&root, true).await.unwrap();

        assert_eq!(listing.files, vec![root.join("cat.png")]);
        assert_eq!(listing.unreadable.len(), 2);
        assert!(listing.unreadable.contains(&root.join("broken.png")));
        assert!(listing.unreadable.contains(&root.join("loop")));
    }
}
