//! Dataset service façade and bootstrap helpers.
//!
//! This crate wires the host-provided filesystem bridge into the dataset
//! core: rescanning the dataset directory, ingesting uploads, guarded
//! removal and JSONL import/export. Desktop hosts typically enable the
//! `desktop-shims` feature (which depends on `bridge-desktop`) and call
//! [`bootstrap_desktop`].

pub mod dataset_service;
pub mod error;

pub use dataset_service::{
    default_export_filename, DatasetService, FileCheck, ImportReport, RemovalOutcome, ScanReport,
};
pub use error::{CoreError, Result};

pub use core_library::{Dataset, DatasetItem, ItemSource, Manifest};

/// Convenience bootstrapper for desktop hosts.
///
/// Uses the Tokio filesystem and the system clock with default settings
/// rooted at `project_root`.
///
/// ```ignore
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_desktop, Dataset};
///
/// let service = bootstrap_desktop(".")?;
/// let mut dataset = Dataset::new();
/// let report = service.rescan(&mut dataset).await?;
/// println!("added {} images", report.added);
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(project_root: impl Into<std::path::PathBuf>) -> Result<DatasetService> {
    let config = core_runtime::config::CoreConfig::builder()
        .project_root(project_root)
        .build()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    DatasetService::new(config)
}
