//! Dataset orchestration over the filesystem bridge
//!
//! Every operation takes the session [`Dataset`] explicitly. Files are
//! processed one at a time; a failure on one file never aborts a rescan.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bridge_traits::{BridgeError, Clock, FileSystemAccess};
use bytes::Bytes;
use core_library::paths::{is_within, normalize_dataset_filename, resolve, to_dataset_filename};
use core_library::{
    parse_jsonl_str, to_jsonl_string, Dataset, DatasetItem, ItemSource, LibraryError, Manifest,
};
use core_metadata::{is_supported_image, thumbnail_base64, PromptExtractor};
use core_runtime::config::CoreConfig;
use core_runtime::logging::strip_path;
use tracing::{debug, info, instrument, warn};

use crate::error::{CoreError, Result};

/// Counts from a single [`DatasetService::rescan`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Supported image files found under the dataset root
    pub scanned: usize,
    pub added: usize,
    /// Files whose dataset filename was already present
    pub already_known: usize,
    /// Files whose content hash was already present
    pub duplicates: usize,
    /// Files that could not be read, plus directory entries the walk could
    /// not inspect (dangling links, symlink loops)
    pub failed: usize,
    /// Added items whose prompt came back empty
    pub without_prompt: usize,
}

/// Counts from a single [`DatasetService::import_jsonl`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// `base_dir` declared by the imported manifest
    pub base_dir: String,
    pub added: usize,
    /// Records whose id was already present
    pub skipped: usize,
    /// Added records whose image is not on disk
    pub missing_files: usize,
    /// True when `base_dir` differs from the configured dataset dir. Items
    /// are always resolved against the configured dir, so such a file is
    /// rebased onto it and re-exports carry the configured `base_dir`.
    pub rebased: bool,
}

/// Result of removing one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub item: DatasetItem,
    /// True only when the backing upload was deleted from disk
    pub file_deleted: bool,
}

/// On-disk state of an item's backing file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    pub path: PathBuf,
    pub exists: bool,
    pub size: Option<u64>,
}

/// Export file name stamped with the clock's current time (UTC):
/// `image_prompts_YYYYmmdd_HHMMSS.jsonl`
pub fn default_export_filename(clock: &dyn Clock) -> String {
    format!("image_prompts_{}.jsonl", clock.now().format("%Y%m%d_%H%M%S"))
}

/// Dataset operations bound to one configured dataset directory
#[derive(Clone)]
pub struct DatasetService {
    config: CoreConfig,
    extractor: PromptExtractor,
}

impl DatasetService {
    /// Create a service; the configuration is re-validated.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            extractor: PromptExtractor::new(),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn fs(&self) -> &Arc<dyn FileSystemAccess> {
        &self.config.file_system
    }

    /// Host path of the dataset directory
    pub fn dataset_root(&self) -> PathBuf {
        self.config.dataset_root()
    }

    /// Manifest written into exports: the configured dataset dir as typed
    pub fn manifest(&self) -> Result<Manifest> {
        Ok(Manifest::new(self.config.dataset_dir.as_str())?)
    }

    /// Usable host path of an item
    pub fn item_path(&self, item: &DatasetItem) -> Result<PathBuf> {
        Ok(resolve(
            &self.config.project_root,
            &self.manifest()?,
            &item.dataset_filename,
        ))
    }

    /// Add every supported image under the dataset root that is not in
    /// `dataset` yet, in dataset-filename order.
    ///
    /// Files already known by dataset filename or by content hash are
    /// skipped. Unreadable files and entries are counted and logged.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DatasetDirMissing`] if the root is absent or not
    /// a directory.
    #[instrument(skip_all)]
    pub async fn rescan(&self, dataset: &mut Dataset) -> Result<ScanReport> {
        let root = self.dataset_root();
        self.ensure_dataset_dir(&root).await?;

        let listing = self
            .fs()
            .list_files(&root, self.config.recursive_scan)
            .await?;
        for path in &listing.unreadable {
            warn!(file = strip_path(&path.to_string_lossy()), "Skipping unreadable entry");
        }

        let mut candidates: Vec<(String, PathBuf)> = listing
            .files
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .map(|name| is_supported_image(&name.to_string_lossy()))
                    .unwrap_or(false)
            })
            .filter_map(|path| match to_dataset_filename(&root, &path) {
                Ok(name) => Some((name, path)),
                Err(e) => {
                    debug!(error = %e, "Ignoring file outside dataset root");
                    None
                }
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut report = ScanReport {
            scanned: candidates.len(),
            failed: listing.unreadable.len(),
            ..Default::default()
        };

        for (dataset_filename, path) in candidates {
            if dataset.contains_dataset_filename(&dataset_filename) {
                report.already_known += 1;
                continue;
            }

            let bytes = match self.fs().read_file(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(file = strip_path(&dataset_filename), error = %e, "Skipping unreadable file");
                    report.failed += 1;
                    continue;
                }
            };

            let extracted = self.extractor.extract(&bytes);
            if dataset.contains_id(&extracted.content_hash) {
                debug!(file = strip_path(&dataset_filename), "Duplicate content, skipping");
                report.duplicates += 1;
                continue;
            }
            if extracted.is_degraded() {
                warn!(file = strip_path(&dataset_filename), "No prompt metadata found");
                report.without_prompt += 1;
            }

            let original_name = strip_path(&dataset_filename).to_string();
            dataset.insert(DatasetItem::new(
                extracted.content_hash,
                original_name,
                &dataset_filename,
                extracted.prompt,
                ItemSource::RescannedDataset,
            ))?;
            report.added += 1;
        }

        info!(
            scanned = report.scanned,
            added = report.added,
            failed = report.failed,
            "Rescan complete"
        );
        Ok(report)
    }

    /// Store uploaded bytes in the dataset dir as `{unix_millis}_{name}` and
    /// add them as an upload.
    ///
    /// When that name is taken, on disk or in `dataset`, a counter is added:
    /// `{unix_millis}_{n}_{name}`. An existing file is never overwritten.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::InvalidInput`] for an empty or unsupported name
    /// - [`LibraryError::DuplicateItem`] when identical content is already
    ///   in the dataset; nothing is written in that case
    #[instrument(skip(self, dataset, bytes), fields(size = bytes.len()))]
    pub async fn ingest_upload(
        &self,
        dataset: &mut Dataset,
        name: &str,
        bytes: Bytes,
    ) -> Result<DatasetItem> {
        let original_name = strip_path(name.trim());
        if original_name.is_empty() || !is_supported_image(original_name) {
            return Err(LibraryError::InvalidInput {
                field: "name".to_string(),
                message: format!("unsupported upload name: {:?}", name),
            }
            .into());
        }

        let extracted = self.extractor.extract(&bytes);
        if dataset.contains_id(&extracted.content_hash) {
            return Err(LibraryError::DuplicateItem(extracted.content_hash).into());
        }
        if extracted.is_degraded() {
            warn!(file = original_name, "No prompt metadata found");
        }

        let root = self.dataset_root();
        self.fs().create_dir_all(&root).await?;

        let stored_name = self.upload_name(dataset, &root, original_name).await?;
        self.fs().write_file(&root.join(&stored_name), bytes).await?;

        let item = DatasetItem::new(
            extracted.content_hash,
            original_name,
            &stored_name,
            extracted.prompt,
            ItemSource::UploadedToDataset,
        );
        dataset.insert(item.clone())?;

        info!(file = %stored_name, "Stored upload");
        Ok(item)
    }

    async fn upload_name(
        &self,
        dataset: &Dataset,
        root: &Path,
        original_name: &str,
    ) -> Result<String> {
        let millis = self.config.clock.unix_timestamp_millis();
        let mut candidate = format!("{}_{}", millis, original_name);
        let mut counter = 1;

        while dataset.contains_dataset_filename(&candidate)
            || self.fs().exists(&root.join(&candidate)).await?
        {
            debug!(file = %candidate, "Upload name taken");
            candidate = format!("{}_{}_{}", millis, counter, original_name);
            counter += 1;
        }

        Ok(candidate)
    }

    /// Drop an item from the dataset.
    ///
    /// The backing file is deleted only for uploads whose resolved path lies
    /// inside the dataset dir. Scanned and imported files are never touched.
    /// A failed delete is logged and does not keep the item.
    pub async fn remove(&self, dataset: &mut Dataset, id: &str) -> Result<RemovalOutcome> {
        let item = dataset
            .get(id)
            .cloned()
            .ok_or_else(|| LibraryError::item_not_found(id))?;

        let mut file_deleted = false;
        if item.source.is_upload() {
            let path = self.item_path(&item)?;
            if is_within(&self.dataset_root(), &path) {
                match self.fs().delete_file(&path).await {
                    Ok(()) => file_deleted = true,
                    Err(BridgeError::NotFound(_)) => {
                        debug!(file = strip_path(&item.dataset_filename), "Upload already gone");
                    }
                    Err(e) => {
                        warn!(file = strip_path(&item.dataset_filename), error = %e, "Failed to delete upload");
                    }
                }
            } else {
                warn!(file = %item.dataset_filename, "Upload path escapes dataset dir, keeping file");
            }
        }

        dataset.remove(id);
        debug!(id, file_deleted, "Removed item");
        Ok(RemovalOutcome { item, file_deleted })
    }

    /// [`remove`](Self::remove) for each id; unknown ids are skipped
    pub async fn remove_many(
        &self,
        dataset: &mut Dataset,
        ids: &[String],
    ) -> Result<Vec<RemovalOutcome>> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            if dataset.contains_id(id) {
                outcomes.push(self.remove(dataset, id).await?);
            }
        }
        Ok(outcomes)
    }

    /// JSONL document for the given items under this service's manifest
    pub fn render_jsonl(&self, items: &[DatasetItem]) -> Result<String> {
        let mut document = to_jsonl_string(&self.manifest()?, items)?;
        document.push('\n');
        Ok(document)
    }

    /// Write the whole dataset to `destination`. Returns the item count.
    pub async fn export_jsonl(&self, dataset: &Dataset, destination: &Path) -> Result<usize> {
        self.write_jsonl(dataset.items(), destination).await
    }

    /// Write only the items with the given ids, in dataset order.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::InvalidInput`] when no id matches.
    pub async fn export_selected(
        &self,
        dataset: &Dataset,
        ids: &[String],
        destination: &Path,
    ) -> Result<usize> {
        let selected = dataset.select(ids);
        if selected.is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "ids".to_string(),
                message: "no items selected".to_string(),
            }
            .into());
        }
        self.write_jsonl(&selected, destination).await
    }

    async fn write_jsonl(&self, items: &[DatasetItem], destination: &Path) -> Result<usize> {
        let document = self.render_jsonl(items)?;
        self.fs()
            .write_file(destination, Bytes::from(document))
            .await?;

        info!(
            items = items.len(),
            file = strip_path(&destination.to_string_lossy()),
            "Exported JSONL"
        );
        Ok(items.len())
    }

    /// Load a JSONL file and add records whose id is not present yet.
    ///
    /// Records are resolved against the configured dataset dir whatever the
    /// file's `base_dir` says; [`ImportReport::rebased`] flags a mismatch.
    ///
    /// The file is parsed completely before `dataset` is touched, so a
    /// rejected file leaves it unchanged.
    pub async fn import_jsonl(&self, dataset: &mut Dataset, source: &Path) -> Result<ImportReport> {
        let bytes = self.fs().read_file(source).await?;
        let document = std::str::from_utf8(&bytes).map_err(|e| LibraryError::InvalidInput {
            field: "source".to_string(),
            message: format!("not valid UTF-8: {}", e),
        })?;
        let (manifest, items) = parse_jsonl_str(document)?;

        let rebased = normalize_dataset_filename(manifest.base_dir())
            != normalize_dataset_filename(&self.config.dataset_dir);
        if rebased {
            warn!(
                base_dir = manifest.base_dir(),
                configured = %self.config.dataset_dir,
                "Imported manifest uses a different dataset dir, rebasing items"
            );
        }

        let mut missing_files = 0;
        for item in items.iter().filter(|item| !dataset.contains_id(&item.id)) {
            let path = self.item_path(item)?;
            if !self.fs().exists(&path).await.unwrap_or(false) {
                debug!(file = strip_path(&item.dataset_filename), "Imported item has no file on disk");
                missing_files += 1;
            }
        }

        let summary = dataset.merge_imported(items);
        info!(
            added = summary.added,
            skipped = summary.skipped,
            missing_files,
            rebased,
            "Imported JSONL"
        );

        Ok(ImportReport {
            base_dir: manifest.base_dir().to_string(),
            added: summary.added,
            skipped: summary.skipped,
            missing_files,
            rebased,
        })
    }

    /// Existence and size of an item's resolved file, for diagnostics
    pub async fn check_item_file(&self, item: &DatasetItem) -> Result<FileCheck> {
        let path = self.item_path(item)?;
        match self.fs().metadata(&path).await {
            Ok(metadata) if !metadata.is_directory => Ok(FileCheck {
                path,
                exists: true,
                size: Some(metadata.size),
            }),
            Ok(_) | Err(BridgeError::NotFound(_)) => Ok(FileCheck {
                path,
                exists: false,
                size: None,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Base64 PNG thumbnail of an item's image, at most `max_side` pixels on
    /// the longest side
    pub async fn thumbnail_for(&self, item: &DatasetItem, max_side: u32) -> Result<String> {
        let bytes = self.fs().read_file(&self.item_path(item)?).await?;
        Ok(thumbnail_base64(&bytes, max_side)?)
    }

    /// [`thumbnail_for`](Self::thumbnail_for) at the configured size
    pub async fn thumbnail(&self, item: &DatasetItem) -> Result<String> {
        self.thumbnail_for(item, self.config.thumbnail_size).await
    }

    async fn ensure_dataset_dir(&self, root: &Path) -> Result<()> {
        match self.fs().metadata(root).await {
            Ok(metadata) if metadata.is_directory => Ok(()),
            Ok(_) | Err(BridgeError::NotFound(_)) => {
                Err(CoreError::DatasetDirMissing(root.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::storage::FileMetadata;
    use bridge_traits::FixedClock;
    use core_metadata::fixtures;
    use mockall::mock;

    mock! {
        pub Fs {}

        #[async_trait]
        impl FileSystemAccess for Fs {
            async fn exists(&self, path: &Path) -> BridgeResult<bool>;
            async fn metadata(&self, path: &Path) -> BridgeResult<FileMetadata>;
            async fn create_dir_all(&self, path: &Path) -> BridgeResult<()>;
            async fn read_file(&self, path: &Path) -> BridgeResult<Bytes>;
            async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()>;
            async fn delete_file(&self, path: &Path) -> BridgeResult<()>;
            async fn list_directory(&self, path: &Path) -> BridgeResult<Vec<PathBuf>>;
        }
    }

    const NOW_MILLIS: i64 = 1_700_000_000_000;

    fn service(fs: MockFs) -> DatasetService {
        let config = CoreConfig::builder()
            .project_root("project")
            .file_system(Arc::new(fs))
            .clock(Arc::new(FixedClock::from_millis(NOW_MILLIS)))
            .build()
            .unwrap();
        DatasetService::new(config).unwrap()
    }

    fn file_meta(size: u64) -> FileMetadata {
        FileMetadata {
            size,
            modified_at: None,
            is_directory: false,
        }
    }

    fn dir_meta() -> FileMetadata {
        FileMetadata {
            size: 0,
            modified_at: None,
            is_directory: true,
        }
    }

    fn scanned(id: &str, name: &str) -> DatasetItem {
        DatasetItem::new(id, name, name, "p", ItemSource::RescannedDataset)
    }

    #[test]
    fn test_default_export_filename() {
        let clock = FixedClock::from_millis(NOW_MILLIS);
        assert_eq!(
            default_export_filename(&clock),
            "image_prompts_20231114_221320.jsonl"
        );
    }

    #[tokio::test]
    async fn test_remove_scanned_item_never_deletes_file() {
        let mut fs = MockFs::new();
        fs.expect_delete_file().never();
        let service = service(fs);

        let mut dataset = Dataset::new();
        dataset.insert(scanned("h1", "a.png")).unwrap();

        let outcome = service.remove(&mut dataset, "h1").await.unwrap();
        assert!(!outcome.file_deleted);
        assert!(dataset.is_empty());
    }

    #[tokio::test]
    async fn test_remove_upload_deletes_file_inside_dataset_dir() {
        let mut fs = MockFs::new();
        fs.expect_delete_file()
            .withf(|path| path == Path::new("project/dataset/1_cat.png"))
            .times(1)
            .returning(|_| Ok(()));
        let service = service(fs);

        let mut dataset = Dataset::new();
        dataset
            .insert(DatasetItem::new("h1", "cat.png", "1_cat.png", "", ItemSource::UploadedToDataset))
            .unwrap();

        let outcome = service.remove(&mut dataset, "h1").await.unwrap();
        assert!(outcome.file_deleted);
        assert_eq!(outcome.item.id, "h1");
    }

    #[tokio::test]
    async fn test_remove_upload_escaping_dataset_dir_keeps_file() {
        let mut fs = MockFs::new();
        fs.expect_delete_file().never();
        let service = service(fs);

        let mut dataset = Dataset::new();
        dataset
            .insert(DatasetItem::new("h1", "x.png", "../outside/x.png", "", ItemSource::UploadedToDataset))
            .unwrap();

        let outcome = service.remove(&mut dataset, "h1").await.unwrap();
        assert!(!outcome.file_deleted);
        assert!(dataset.is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_id() {
        let service = service(MockFs::new());
        let mut dataset = Dataset::new();

        let result = service.remove(&mut dataset, "nope").await;
        assert!(matches!(
            result,
            Err(CoreError::Library(LibraryError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_rescan_missing_root() {
        let mut fs = MockFs::new();
        fs.expect_metadata()
            .returning(|p| Err(BridgeError::NotFound(p.display().to_string())));
        let service = service(fs);

        let mut dataset = Dataset::new();
        let result = service.rescan(&mut dataset).await;
        assert!(matches!(result, Err(CoreError::DatasetDirMissing(_))));
    }

    #[tokio::test]
    async fn test_rescan_counts_failures_and_filters_types() {
        let root = PathBuf::from("project/./dataset");
        let mut fs = MockFs::new();
        fs.expect_metadata().returning(|path| {
            if path.extension().is_none() {
                Ok(dir_meta())
            } else {
                Ok(file_meta(10))
            }
        });
        let listing = vec![
            root.join("b.png"),
            root.join("notes.txt"),
            root.join("a.PNG"),
        ];
        fs.expect_list_directory()
            .returning(move |_| Ok(listing.clone()));
        fs.expect_read_file().returning(|path| {
            if path.ends_with("a.PNG") {
                Ok(Bytes::from(fixtures::png_with_text(&[("parameters", "a cat")])))
            } else {
                Err(BridgeError::OperationFailed("permission denied".to_string()))
            }
        });
        let service = service(fs);

        let mut dataset = Dataset::new();
        let report = service.rescan(&mut dataset).await.unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.added, 1);
        assert_eq!(report.failed, 1);
        let item = &dataset.items()[0];
        assert_eq!(item.dataset_filename, "a.PNG");
        assert_eq!(item.prompt, "a cat");
        assert_eq!(item.source, ItemSource::RescannedDataset);
    }

    #[tokio::test]
    async fn test_upload_is_stored_with_timestamp_prefix() {
        let mut fs = MockFs::new();
        fs.expect_create_dir_all().times(1).returning(|_| Ok(()));
        fs.expect_exists().returning(|_| Ok(false));
        fs.expect_write_file()
            .withf(|path, _| path == Path::new("project/dataset/1700000000000_cat.png"))
            .times(1)
            .returning(|_, _| Ok(()));
        let service = service(fs);

        let png = fixtures::png_with_text(&[("parameters", "a cat, masterpiece")]);
        let mut dataset = Dataset::new();
        let item = service
            .ingest_upload(&mut dataset, "C:\\Users\\me\\cat.png", Bytes::from(png))
            .await
            .unwrap();

        assert_eq!(item.original_name, "cat.png");
        assert_eq!(item.dataset_filename, "1700000000000_cat.png");
        assert_eq!(item.prompt, "a cat, masterpiece");
        assert_eq!(item.source, ItemSource::UploadedToDataset);
        assert!(dataset.contains_id(&item.id));
    }

    #[tokio::test]
    async fn test_upload_name_collision_gets_counter() {
        let mut fs = MockFs::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_exists()
            .returning(|path| Ok(path.ends_with("1700000000000_cat.png")));
        fs.expect_write_file()
            .withf(|path, _| path == Path::new("project/dataset/1700000000000_2_cat.png"))
            .times(1)
            .returning(|_, _| Ok(()));
        let service = service(fs);

        let mut dataset = Dataset::new();
        dataset
            .insert(DatasetItem::new("h0", "cat.png", "1700000000000_1_cat.png", "", ItemSource::UploadedToDataset))
            .unwrap();

        let png = fixtures::png_with_text(&[("parameters", "another cat")]);
        let item = service
            .ingest_upload(&mut dataset, "cat.png", Bytes::from(png))
            .await
            .unwrap();

        assert_eq!(item.dataset_filename, "1700000000000_2_cat.png");
        assert_eq!(dataset.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_upload_writes_nothing() {
        let mut fs = MockFs::new();
        fs.expect_write_file().never();
        let service = service(fs);

        let png = fixtures::png_with_text(&[("parameters", "same")]);
        let mut dataset = Dataset::new();
        dataset
            .insert(scanned(&core_metadata::content_hash(&png), "same.png"))
            .unwrap();

        let result = service
            .ingest_upload(&mut dataset, "same.png", Bytes::from(png))
            .await;
        assert!(matches!(
            result,
            Err(CoreError::Library(LibraryError::DuplicateItem(_)))
        ));
        assert_eq!(dataset.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_name() {
        let service = service(MockFs::new());
        let mut dataset = Dataset::new();

        let result = service
            .ingest_upload(&mut dataset, "notes.txt", Bytes::from_static(b"x"))
            .await;
        assert!(matches!(
            result,
            Err(CoreError::Library(LibraryError::InvalidInput { .. }))
        ));
    }

    #[tokio::test]
    async fn test_rejected_import_leaves_dataset_untouched() {
        let mut fs = MockFs::new();
        fs.expect_read_file().returning(|_| {
            Ok(Bytes::from_static(
                b"{\"__manifest__\":{\"base_dir\":\"./dataset\"}}\n{oops\n",
            ))
        });
        fs.expect_exists().never();
        let service = service(fs);

        let mut dataset = Dataset::new();
        dataset.insert(scanned("h1", "a.png")).unwrap();
        let before = dataset.clone();

        let result = service
            .import_jsonl(&mut dataset, Path::new("in.jsonl"))
            .await;
        assert!(matches!(
            result,
            Err(CoreError::Library(LibraryError::Format { line: 2, .. }))
        ));
        assert_eq!(dataset, before);
    }

    #[tokio::test]
    async fn test_export_selected_requires_a_match() {
        let mut fs = MockFs::new();
        fs.expect_write_file().never();
        let service = service(fs);

        let mut dataset = Dataset::new();
        dataset.insert(scanned("h1", "a.png")).unwrap();

        let result = service
            .export_selected(&dataset, &["zzz".to_string()], Path::new("out.jsonl"))
            .await;
        assert!(matches!(
            result,
            Err(CoreError::Library(LibraryError::InvalidInput { .. }))
        ));
    }

    #[tokio::test]
    async fn test_check_item_file() {
        let mut fs = MockFs::new();
        fs.expect_metadata().returning(|path| {
            if path.ends_with("a.png") {
                Ok(file_meta(42))
            } else {
                Err(BridgeError::NotFound(path.display().to_string()))
            }
        });
        let service = service(fs);

        let present = service.check_item_file(&scanned("h1", "a.png")).await.unwrap();
        assert!(present.exists);
        assert_eq!(present.size, Some(42));
        assert_eq!(present.path, Path::new("project/dataset/a.png"));

        let missing = service.check_item_file(&scanned("h2", "b.png")).await.unwrap();
        assert!(!missing.exists);
        assert_eq!(missing.size, None);
    }
}
