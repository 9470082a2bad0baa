//! # Dataset Library Module
//!
//! Owns the in-memory dataset model and its portable JSONL representation.
//!
//! ## Overview
//!
//! This module manages:
//! - Dataset items, provenance tags and the relative-path manifest
//! - The session collection (`Dataset`) and its edits
//! - JSONL export/import with relative `rel_path` semantics
//! - Host-independent path helpers

pub mod codec;
pub mod dataset;
pub mod error;
pub mod models;
pub mod paths;

pub use codec::{deserialize, parse_jsonl_str, serialize, to_jsonl_string};
pub use dataset::{Dataset, DatasetStats, MergeSummary};
pub use error::{LibraryError, Result};
pub use models::{DatasetItem, ItemSource, Manifest};
