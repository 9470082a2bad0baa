//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map to the individual workspace
//! crates. Host applications can depend on `prompt-dataset-workspace` and
//! enable `desktop-shims` for the full service façade, or `extractor-only`
//! for the pure extractor and JSONL codec without any filesystem bridge.

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "extractor-only")]
pub use core_library as library;

#[cfg(feature = "extractor-only")]
pub use core_metadata as metadata;
