//! # Core Configuration Module
//!
//! Provides configuration management for the dataset core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the dataset settings and the bridges the service layer
//! needs. It enforces fail-fast validation so a misconfigured dataset
//! directory is reported before any scan or export runs.
//!
//! ## Settings
//!
//! - `project_root` - Directory that relative dataset paths resolve against (default `.`)
//! - `dataset_dir` - Dataset root as the user typed it (default `./dataset`).
//!   This string is written verbatim into exported manifests, so it must be
//!   relative.
//! - `recursive_scan` - Include subfolders when rescanning (default `true`)
//! - `thumbnail_size` - Longest thumbnail side in pixels (default `150`)
//!
//! ## Bridges
//!
//! - `FileSystemAccess` - Required (desktop default: `TokioFileSystem`)
//! - `Clock` - Optional, defaults to `SystemClock`
//!
//! When the `desktop-shims` feature is enabled, a `TokioFileSystem` is
//! injected automatically if none was provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .dataset_dir("./dataset")
//!     .recursive_scan(true)
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, FileSystemAccess, SystemClock};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default dataset directory, relative to the project root
pub const DEFAULT_DATASET_DIR: &str = "./dataset";

/// Default longest side of generated thumbnails
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 150;

const MIN_THUMBNAIL_SIZE: u32 = 16;
const MAX_THUMBNAIL_SIZE: u32 = 1024;

/// Core configuration for the dataset core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Directory that `dataset_dir` is interpreted against
    pub project_root: PathBuf,

    /// Dataset root, relative, as written into export manifests
    pub dataset_dir: String,

    /// Include subfolders when rescanning
    pub recursive_scan: bool,

    /// Longest side of generated thumbnails
    pub thumbnail_size: u32,

    /// File system access abstraction
    pub file_system: Arc<dyn FileSystemAccess>,

    /// Time source for upload names and export timestamps
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("project_root", &self.project_root)
            .field("dataset_dir", &self.dataset_dir)
            .field("recursive_scan", &self.recursive_scan)
            .field("thumbnail_size", &self.thumbnail_size)
            .field("file_system", &"FileSystemAccess { ... }")
            .field("clock", &"Clock { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Host path of the dataset root.
    pub fn dataset_root(&self) -> PathBuf {
        self.project_root.join(&self.dataset_dir)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Dataset directory is not empty and not absolute
    /// - Thumbnail size is within 16..=1024 pixels
    pub fn validate(&self) -> Result<()> {
        let trimmed = self.dataset_dir.trim();
        if trimmed.is_empty() {
            return Err(Error::Config(
                "Dataset directory cannot be empty".to_string(),
            ));
        }

        if looks_absolute(trimmed) {
            return Err(Error::Config(format!(
                "Dataset directory must be relative so exports stay portable \
                 (got '{}'). Use a path like ./dataset and set project_root instead.",
                self.dataset_dir
            )));
        }

        if !(MIN_THUMBNAIL_SIZE..=MAX_THUMBNAIL_SIZE).contains(&self.thumbnail_size) {
            return Err(Error::Config(format!(
                "Thumbnail size must be between {} and {} pixels (got {})",
                MIN_THUMBNAIL_SIZE, MAX_THUMBNAIL_SIZE, self.thumbnail_size
            )));
        }

        Ok(())
    }
}

fn looks_absolute(dir: &str) -> bool {
    let bytes = dir.as_bytes();
    let drive_letter = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\');

    dir.starts_with('/') || dir.starts_with('\\') || drive_letter || Path::new(dir).is_absolute()
}

#[cfg(not(feature = "desktop-shims"))]
fn file_system_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required to scan and store dataset images. \
                 Desktop: enable the 'desktop-shims' feature to use the default TokioFileSystem. \
                 Tests: inject an in-memory implementation."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    let fs: Arc<dyn FileSystemAccess> = Arc::new(TokioFileSystem::new());
    Ok(fs)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Err(file_system_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    project_root: Option<PathBuf>,
    dataset_dir: Option<String>,
    recursive_scan: Option<bool>,
    thumbnail_size: Option<u32>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    clock: Option<Arc<dyn Clock>>,
}

impl CoreConfigBuilder {
    /// Sets the directory relative dataset paths resolve against.
    pub fn project_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Sets the dataset directory (relative, e.g. `./dataset`).
    pub fn dataset_dir(mut self, dir: impl Into<String>) -> Self {
        self.dataset_dir = Some(dir.into());
        self
    }

    /// Include subfolders when rescanning.
    pub fn recursive_scan(mut self, recursive: bool) -> Self {
        self.recursive_scan = Some(recursive);
        self
    }

    /// Sets the longest thumbnail side in pixels.
    pub fn thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = Some(size);
        self
    }

    /// Sets the file system implementation.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Sets the clock implementation.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the final [`CoreConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No `FileSystemAccess` was provided and `desktop-shims` is disabled
    /// - [`CoreConfig::validate`] rejects the settings
    pub fn build(self) -> Result<CoreConfig> {
        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system()?,
        };

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        let config = CoreConfig {
            project_root: self.project_root.unwrap_or_else(|| PathBuf::from(".")),
            dataset_dir: self
                .dataset_dir
                .unwrap_or_else(|| DEFAULT_DATASET_DIR.to_string()),
            recursive_scan: self.recursive_scan.unwrap_or(true),
            thumbnail_size: self.thumbnail_size.unwrap_or(DEFAULT_THUMBNAIL_SIZE),
            file_system,
            clock,
        };

        config.validate()?;
        Ok(config)
    }
}
