//! Integration tests for the JSONL interchange format

use core_library::paths::{join_rel_path, resolve};
use core_library::{
    parse_jsonl_str, serialize, to_jsonl_string, Dataset, DatasetItem, ItemSource, LibraryError,
    Manifest,
};
use proptest::prelude::*;
use std::path::Path;

fn sample_items() -> Vec<DatasetItem> {
    let mut edited = DatasetItem::new(
        "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        "cat.png",
        "cats/cat.png",
        "a cat, masterpiece",
        ItemSource::RescannedDataset,
    );
    edited.set_prompt("a cat, masterpiece, best quality");

    vec![
        edited,
        DatasetItem::new(
            "60303ae22b998861bce3b28f33eec1be758a213c86c93c076dbe9f558c11c752",
            "upload.jpg",
            "1700000000000_upload.jpg",
            "",
            ItemSource::UploadedToDataset,
        ),
        DatasetItem::new(
            "fd61a03af4f77d870fc21e05e7e80678095c92d808cfb3b5c279ee04c74aca13",
            "vieux.png",
            "vieux.png",
            "château sous la neige",
            ItemSource::Other("scraped".to_string()),
        ),
    ]
}

#[test]
fn test_round_trip_preserves_items_and_manifest() {
    let manifest = Manifest::new("./dataset").unwrap();
    let items = sample_items();

    let lines = serialize(&manifest, &items).unwrap();
    let (parsed_manifest, parsed_items) = core_library::deserialize(&lines).unwrap();

    assert_eq!(parsed_manifest, manifest);
    assert_eq!(parsed_items, items);
}

#[test]
fn test_rel_path_matches_manifest_join() {
    let manifest = Manifest::new("./dataset").unwrap();
    let items = sample_items();
    let lines = serialize(&manifest, &items).unwrap();

    for (line, item) in lines.iter().skip(1).zip(&items) {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(
            value["rel_path"],
            join_rel_path(manifest.base_dir(), &item.dataset_filename)
        );
    }
    assert!(lines[1].contains(r#""rel_path":"./dataset/cats/cat.png""#));
}

#[test]
fn test_invalid_second_line_leaves_dataset_unchanged() {
    let mut dataset = Dataset::from_items(sample_items());
    let before = dataset.clone();

    let doc = "{\"__manifest__\":{\"base_dir\":\"./dataset\"}}\n{not valid json}\n";
    match parse_jsonl_str(doc) {
        Ok((_, items)) => {
            dataset.merge_imported(items);
        }
        Err(LibraryError::Format { line, .. }) => assert_eq!(line, 2),
        Err(other) => panic!("unexpected error: {}", other),
    }

    assert_eq!(dataset, before);
}

#[test]
fn test_import_reconstructs_host_paths_from_manifest() {
    let doc = concat!(
        "{\"__manifest__\":{\"base_dir\":\"./dataset\"}}\n",
        "\n",
        "{\"id\":\"h1\",\"original_name\":\"img.png\",\"dataset_filename\":\"sub/img.png\",",
        "\"full_path\":\"/old/machine/dataset/sub/img.png\",\"prompt\":\"x\",\"source\":\"uploaded\"}\n",
    );

    let (manifest, items) = parse_jsonl_str(doc).unwrap();
    assert_eq!(items[0].source, ItemSource::UploadedToDataset);

    let path = resolve(Path::new("project"), &manifest, &items[0].dataset_filename);
    assert_eq!(path, Path::new("project").join("dataset").join("sub").join("img.png"));
}

#[test]
fn test_empty_dataset_exports_manifest_only() {
    let manifest = Manifest::new("exports").unwrap();
    let doc = to_jsonl_string(&manifest, &[]).unwrap();

    assert_eq!(doc, r#"{"__manifest__":{"base_dir":"exports"}}"#);
    let (parsed, items) = parse_jsonl_str(&doc).unwrap();
    assert_eq!(parsed.base_dir(), "exports");
    assert!(items.is_empty());
}

fn arb_source() -> impl Strategy<Value = ItemSource> {
    prop_oneof![
        Just(ItemSource::RescannedDataset),
        Just(ItemSource::UploadedToDataset),
        Just(ItemSource::Jsonl),
        "[a-z_]{1,20}".prop_map(|tag| ItemSource::parse(&tag)),
    ]
}

fn arb_item() -> impl Strategy<Value = DatasetItem> {
    (
        "[0-9a-f]{1,64}",
        any::<String>(),
        prop::collection::vec("[A-Za-z0-9_-][A-Za-z0-9_ .-]{0,11}", 1..4),
        any::<String>(),
        any::<bool>(),
        arb_source(),
    )
        .prop_map(|(id, original_name, segments, prompt, modified, source)| {
            let mut item = DatasetItem::new(id, original_name, &segments.join("/"), prompt, source);
            item.modified = modified;
            item
        })
}

proptest! {
    #[test]
    fn prop_round_trip_any_items(
        base_dir in "(\\./)?[a-z]{1,8}(/[a-z]{1,8}){0,2}",
        items in prop::collection::vec(arb_item(), 0..8),
    ) {
        let manifest = Manifest::new(base_dir).unwrap();

        let lines = serialize(&manifest, &items).unwrap();
        let (parsed_manifest, parsed_items) = core_library::deserialize(&lines).unwrap();

        prop_assert_eq!(parsed_manifest, manifest);
        prop_assert_eq!(parsed_items, items);
    }
}
