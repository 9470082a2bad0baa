//! JSONL interchange codec
//!
//! ```text
//! {"__manifest__":{"base_dir":"./dataset"}}
//! {"id":"…","original_name":"a.png","dataset_filename":"sub/a.png","rel_path":"./dataset/sub/a.png","prompt":"…","modified":false,"source":"rescanned_dataset"}
//! ```
//!
//! The manifest line comes first. Every item line carries a `rel_path`
//! derived from the manifest, so files stay portable between machines.
//! Absolute paths from older exports (`full_path`) are ignored on import.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LibraryError, Result};
use crate::models::{DatasetItem, ItemSource, Manifest};
use crate::paths::{is_absolute_portable, normalize_dataset_filename, validate_dataset_filename};

const MANIFEST_KEY: &str = "__manifest__";

#[derive(Serialize)]
struct ManifestRecord<'a> {
    #[serde(rename = "__manifest__")]
    manifest: &'a Manifest,
}

#[derive(Deserialize)]
struct ManifestLine {
    #[serde(rename = "__manifest__")]
    manifest: ManifestBody,
}

#[derive(Deserialize)]
struct ManifestBody {
    base_dir: String,
}

/// Field order here is the on-disk order
#[derive(Serialize)]
struct ItemRecord<'a> {
    id: &'a str,
    original_name: &'a str,
    dataset_filename: &'a str,
    rel_path: String,
    prompt: &'a str,
    modified: bool,
    source: &'a ItemSource,
}

#[derive(Deserialize)]
struct ItemLine {
    id: String,
    original_name: String,
    #[serde(default)]
    dataset_filename: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    modified: bool,
    #[serde(default)]
    source: Option<ItemSource>,
}

/// Serialize a manifest and items into JSONL lines (no trailing newlines).
///
/// # Errors
///
/// Returns [`LibraryError::InvalidInput`] for an item whose
/// `dataset_filename` could not be read back: empty, absolute, or leaving
/// the dataset dir through `..`.
pub fn serialize(manifest: &Manifest, items: &[DatasetItem]) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(items.len() + 1);
    lines.push(serde_json::to_string(&ManifestRecord { manifest })?);

    for item in items {
        validate_dataset_filename(&item.dataset_filename)?;
        let record = ItemRecord {
            id: &item.id,
            original_name: &item.original_name,
            dataset_filename: &item.dataset_filename,
            rel_path: item.rel_path(manifest),
            prompt: &item.prompt,
            modified: item.modified,
            source: &item.source,
        };
        lines.push(serde_json::to_string(&record)?);
    }

    debug!(items = items.len(), base_dir = manifest.base_dir(), "Serialized JSONL");
    Ok(lines)
}

/// [`serialize`] joined into one document, lines separated by `\n`
pub fn to_jsonl_string(manifest: &Manifest, items: &[DatasetItem]) -> Result<String> {
    Ok(serialize(manifest, items)?.join("\n"))
}

/// Parse JSONL lines into a manifest and items.
///
/// Blank lines are skipped. The first non-blank line must be the manifest.
/// Parsing is all-or-nothing: the first bad line aborts with its 1-based
/// physical line number.
///
/// # Errors
///
/// Returns [`LibraryError::Format`] for a missing or malformed manifest, a
/// malformed item line, an absolute `base_dir`, or a `dataset_filename` that
/// is absolute or climbs out of the dataset dir with `..`.
pub fn deserialize<I, S>(lines: I) -> Result<(Manifest, Vec<DatasetItem>)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut manifest: Option<Manifest> = None;
    let mut items = Vec::new();

    for (index, raw) in lines.into_iter().enumerate() {
        let line_no = index + 1;
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if manifest.is_none() {
            manifest = Some(parse_manifest(line, line_no)?);
        } else {
            items.push(parse_item(line, line_no)?);
        }
    }

    let manifest =
        manifest.ok_or_else(|| LibraryError::format(1, format!("missing {} line", MANIFEST_KEY)))?;

    debug!(items = items.len(), base_dir = manifest.base_dir(), "Parsed JSONL");
    Ok((manifest, items))
}

/// Parse a whole JSONL document
pub fn parse_jsonl_str(document: &str) -> Result<(Manifest, Vec<DatasetItem>)> {
    deserialize(document.lines())
}

fn parse_manifest(line: &str, line_no: usize) -> Result<Manifest> {
    let parsed: ManifestLine = serde_json::from_str(line).map_err(|e| {
        LibraryError::format(line_no, format!("expected {} record: {}", MANIFEST_KEY, e))
    })?;

    Manifest::new(parsed.manifest.base_dir)
        .map_err(|e| LibraryError::format(line_no, e.to_string()))
}

fn parse_item(line: &str, line_no: usize) -> Result<DatasetItem> {
    let parsed: ItemLine = serde_json::from_str(line)
        .map_err(|e| LibraryError::format(line_no, format!("invalid item record: {}", e)))?;

    if parsed.id.trim().is_empty() {
        return Err(LibraryError::format(line_no, "empty id"));
    }

    let raw_filename = parsed
        .dataset_filename
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| parsed.original_name.clone());
    if is_absolute_portable(&raw_filename) {
        return Err(LibraryError::format(
            line_no,
            format!("absolute dataset_filename: {}", raw_filename),
        ));
    }

    let mut dataset_filename = normalize_dataset_filename(&raw_filename);
    if dataset_filename.is_empty() {
        dataset_filename = normalize_dataset_filename(&parsed.original_name);
    }
    validate_dataset_filename(&dataset_filename)
        .map_err(|e| LibraryError::format(line_no, e.to_string()))?;

    let mut item = DatasetItem::new(
        parsed.id,
        parsed.original_name,
        &dataset_filename,
        parsed.prompt.unwrap_or_default(),
        parsed.source.unwrap_or_default(),
    );
    item.modified = parsed.modified;
    Ok(item)
}
