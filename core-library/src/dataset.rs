//! In-memory dataset collection
//!
//! The session's item list. It is owned by the caller and passed explicitly
//! to whatever needs to read or mutate it; insertion order is preserved.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::{LibraryError, Result};
use crate::models::DatasetItem;

/// Summary counts for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetStats {
    pub total: usize,
    pub modified: usize,
    /// Item count per source tag
    pub by_source: BTreeMap<String, usize>,
}

/// Outcome of [`Dataset::merge_imported`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    /// Items whose id was already present
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    items: Vec<DatasetItem>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from items, keeping the first item for each id
    pub fn from_items(items: Vec<DatasetItem>) -> Self {
        let mut dataset = Self { items };
        dataset.dedupe_by_id();
        dataset
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[DatasetItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&DatasetItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn contains_dataset_filename(&self, dataset_filename: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.dataset_filename == dataset_filename)
    }

    /// Append an item.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::DuplicateItem`] if the id is already present.
    pub fn insert(&mut self, item: DatasetItem) -> Result<()> {
        if self.contains_id(&item.id) {
            return Err(LibraryError::DuplicateItem(item.id));
        }
        self.items.push(item);
        Ok(())
    }

    /// Replace an item's prompt. Returns whether anything changed; an
    /// identical prompt leaves `modified` untouched.
    pub fn edit_prompt(&mut self, id: &str, prompt: impl Into<String>) -> Result<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| LibraryError::item_not_found(id))?;
        Ok(item.set_prompt(prompt))
    }

    /// Wrap the prompts of the given ids in `prefix`/`suffix`.
    ///
    /// Every matched item is marked modified. Returns the number updated;
    /// unknown ids are ignored.
    pub fn apply_affixes(&mut self, ids: &[String], prefix: &str, suffix: &str) -> usize {
        if prefix.is_empty() && suffix.is_empty() {
            return 0;
        }

        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut updated = 0;
        for item in self.items.iter_mut().filter(|i| wanted.contains(i.id.as_str())) {
            item.prompt = format!("{}{}{}", prefix, item.prompt, suffix);
            item.modified = true;
            updated += 1;
        }

        debug!(updated, "Applied prompt affixes");
        updated
    }

    pub fn remove(&mut self, id: &str) -> Option<DatasetItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Add imported items whose id is not present yet
    pub fn merge_imported(&mut self, items: Vec<DatasetItem>) -> MergeSummary {
        let mut summary = MergeSummary::default();
        for item in items {
            if self.contains_id(&item.id) {
                summary.skipped += 1;
            } else {
                self.items.push(item);
                summary.added += 1;
            }
        }
        summary
    }

    /// Clones of the items with the given ids, in dataset order
    pub fn select(&self, ids: &[String]) -> Vec<DatasetItem> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.items
            .iter()
            .filter(|item| wanted.contains(item.id.as_str()))
            .cloned()
            .collect()
    }

    /// Drop later items sharing an id with an earlier one. Returns the
    /// number removed.
    pub fn dedupe_by_id(&mut self) -> usize {
        let before = self.items.len();
        let mut seen = HashSet::new();
        self.items.retain(|item| seen.insert(item.id.clone()));
        before - self.items.len()
    }

    pub fn stats(&self) -> DatasetStats {
        let mut stats = DatasetStats {
            total: self.items.len(),
            ..Default::default()
        };
        for item in &self.items {
            if item.modified {
                stats.modified += 1;
            }
            *stats
                .by_source
                .entry(item.source.as_str().to_string())
                .or_default() += 1;
        }
        stats
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DatasetItem;
    type IntoIter = std::slice::Iter<'a, DatasetItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemSource;

    fn item(id: &str, source: ItemSource) -> DatasetItem {
        DatasetItem::new(id, format!("{}.png", id), &format!("{}.png", id), "base", source)
    }

    fn sample() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.insert(item("a", ItemSource::RescannedDataset)).unwrap();
        dataset.insert(item("b", ItemSource::UploadedToDataset)).unwrap();
        dataset.insert(item("c", ItemSource::RescannedDataset)).unwrap();
        dataset
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut dataset = sample();

        let err = dataset.insert(item("a", ItemSource::Jsonl)).unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateItem(id) if id == "a"));
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_lookups() {
        let dataset = sample();

        assert!(dataset.contains_id("b"));
        assert!(!dataset.contains_id("z"));
        assert!(dataset.contains_dataset_filename("c.png"));
        assert_eq!(dataset.get("b").unwrap().source, ItemSource::UploadedToDataset);
        assert_eq!(dataset.iter().count(), 3);
        assert_eq!((&dataset).into_iter().next().unwrap().id, "a");
    }

    #[test]
    fn test_edit_prompt() {
        let mut dataset = sample();

        assert!(!dataset.edit_prompt("a", "base").unwrap());
        assert!(!dataset.get("a").unwrap().modified);

        assert!(dataset.edit_prompt("a", "new text").unwrap());
        assert!(dataset.get("a").unwrap().modified);

        assert!(matches!(
            dataset.edit_prompt("missing", "x"),
            Err(LibraryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_apply_affixes() {
        let mut dataset = sample();
        let ids = vec!["a".to_string(), "c".to_string(), "zzz".to_string()];

        assert_eq!(dataset.apply_affixes(&ids, "masterpiece, ", ", 4k"), 2);
        assert_eq!(dataset.get("a").unwrap().prompt, "masterpiece, base, 4k");
        assert!(dataset.get("c").unwrap().modified);
        assert!(!dataset.get("b").unwrap().modified);

        assert_eq!(dataset.apply_affixes(&ids, "", ""), 0);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut dataset = sample();

        assert_eq!(dataset.remove("b").unwrap().id, "b");
        assert!(dataset.remove("b").is_none());
        assert_eq!(dataset.len(), 2);

        dataset.clear();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_merge_imported_adds_only_new_ids() {
        let mut dataset = sample();
        let summary = dataset.merge_imported(vec![
            item("a", ItemSource::Jsonl),
            item("d", ItemSource::Jsonl),
            item("d", ItemSource::Jsonl),
        ]);

        assert_eq!(summary, MergeSummary { added: 1, skipped: 2 });
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.get("a").unwrap().source, ItemSource::RescannedDataset);
    }

    #[test]
    fn test_select_keeps_dataset_order() {
        let dataset = sample();
        let picked = dataset.select(&["c".to_string(), "a".to_string()]);

        let ids: Vec<_> = picked.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_dedupe_and_from_items() {
        let dataset = Dataset::from_items(vec![
            item("a", ItemSource::RescannedDataset),
            item("a", ItemSource::Jsonl),
            item("b", ItemSource::Jsonl),
        ]);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get("a").unwrap().source, ItemSource::RescannedDataset);
    }

    #[test]
    fn test_stats() {
        let mut dataset = sample();
        dataset.edit_prompt("c", "edited").unwrap();

        let stats = dataset.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.modified, 1);
        assert_eq!(stats.by_source.get("rescanned_dataset"), Some(&2));
        assert_eq!(stats.by_source.get("uploaded_to_dataset"), Some(&1));
    }
}
