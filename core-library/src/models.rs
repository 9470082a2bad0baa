//! Domain models for the prompt dataset
//!
//! An item is one image in the dataset together with its prompt. The
//! manifest carries the relative root that every persisted path hangs off.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{LibraryError, Result};
use crate::paths::{is_absolute_portable, join_rel_path, normalize_dataset_filename};

// =============================================================================
// Item Source
// =============================================================================

/// Provenance tag of an item
///
/// Unrecognised tags are kept verbatim so foreign JSONL files round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ItemSource {
    /// Found on disk by a dataset rescan
    RescannedDataset,
    /// Uploaded by the user and stored in the dataset dir
    UploadedToDataset,
    /// Loaded from a JSONL file
    #[default]
    Jsonl,
    Other(String),
}

impl ItemSource {
    pub fn as_str(&self) -> &str {
        match self {
            ItemSource::RescannedDataset => "rescanned_dataset",
            ItemSource::UploadedToDataset => "uploaded_to_dataset",
            ItemSource::Jsonl => "jsonl",
            ItemSource::Other(tag) => tag,
        }
    }

    pub fn parse(tag: &str) -> Self {
        match tag {
            "rescanned_dataset" => ItemSource::RescannedDataset,
            // legacy spelling
            "uploaded_to_dataset" | "uploaded" => ItemSource::UploadedToDataset,
            "jsonl" => ItemSource::Jsonl,
            other => ItemSource::Other(other.to_string()),
        }
    }

    /// Only uploaded items own their backing file
    pub fn is_upload(&self) -> bool {
        matches!(self, ItemSource::UploadedToDataset)
    }
}

impl fmt::Display for ItemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ItemSource::parse(&tag))
    }
}

// =============================================================================
// Dataset Item
// =============================================================================

/// One dataset image and its prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetItem {
    /// SHA-256 hex digest of the file contents
    pub id: String,
    /// File name at ingestion time
    pub original_name: String,
    /// Path relative to the dataset root, forward slashes only
    pub dataset_filename: String,
    pub prompt: String,
    /// Set once the user edits the prompt
    pub modified: bool,
    pub source: ItemSource,
}

impl DatasetItem {
    /// Create an unmodified item; `dataset_filename` is normalized to
    /// relative forward-slash form.
    pub fn new(
        id: impl Into<String>,
        original_name: impl Into<String>,
        dataset_filename: &str,
        prompt: impl Into<String>,
        source: ItemSource,
    ) -> Self {
        Self {
            id: id.into(),
            original_name: original_name.into(),
            dataset_filename: normalize_dataset_filename(dataset_filename),
            prompt: prompt.into(),
            modified: false,
            source,
        }
    }

    /// Portable path of this item under `manifest`
    pub fn rel_path(&self, manifest: &Manifest) -> String {
        join_rel_path(manifest.base_dir(), &self.dataset_filename)
    }

    /// Replace the prompt, marking the item modified only on a real change.
    ///
    /// Returns whether the prompt changed.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> bool {
        let prompt = prompt.into();
        if prompt == self.prompt {
            return false;
        }
        self.prompt = prompt;
        self.modified = true;
        true
    }
}

// =============================================================================
// Manifest
// =============================================================================

/// Header record of a JSONL file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    base_dir: String,
}

impl Manifest {
    /// Create a manifest rooted at a relative `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::AbsolutePath`] for absolute paths on any host.
    pub fn new(base_dir: impl Into<String>) -> Result<Self> {
        let base_dir = base_dir.into();
        if is_absolute_portable(&base_dir) {
            return Err(LibraryError::AbsolutePath(base_dir));
        }
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }
}
