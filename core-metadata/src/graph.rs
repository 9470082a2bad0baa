//! Node-graph prompt heuristics
//!
//! Image generators that store a node graph instead of a flat prompt embed
//! it as JSON in two shapes:
//!
//! - `workflow`: the editor graph, `{"nodes": [{"type", "title", "widgets_values", ...}]}`
//! - `prompt`: the execution graph, `{"<id>": {"class_type", "inputs": {...}}}`
//!
//! Each function here returns raw candidate texts. Normalization and the
//! final choice happen in [`crate::extractor`].

use std::collections::HashSet;

use serde_json::Value;

const TEXT_ENCODER: &str = "CLIPTextEncode";

/// Keys whose string values are treated as prompts by [`walk`]
const PROMPT_KEYS: &[&str] = &[
    "text",
    "prompt",
    "positive",
    "positive_prompt",
    "positive prompt",
];

/// Positive text-encoder inputs from an editor `workflow` graph.
///
/// A node qualifies when it is a text encoder, its title marks it as
/// positive (or it is untitled and its text looks positive), and nothing
/// marks it as negative. Each node id contributes at most once.
pub fn from_workflow(workflow: &Value) -> Vec<String> {
    let Some(nodes) = workflow.get("nodes").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for node in nodes {
        if !is_text_encoder(node) {
            continue;
        }

        let text = node
            .get("widgets_values")
            .and_then(|values| values.get(0))
            .and_then(Value::as_str)
            .unwrap_or("");
        let title = node
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase();

        let blank = text.trim().is_empty();
        let negative_text = starts_with_negative(text);

        let positive = title.contains("positive")
            || title.contains("pos")
            || ((title.is_empty() || title == "untitled") && !blank && !negative_text);
        let negative =
            title.contains("negative") || title.contains("neg") || blank || negative_text;

        if !positive || negative {
            continue;
        }

        let id = node.get("id").map(node_id).unwrap_or_default();
        if seen.insert(id) {
            candidates.push(text.to_string());
        }
    }

    candidates
}

/// Text-encoder inputs from an execution `prompt` graph.
pub fn from_prompt_graph(graph: &Value) -> Vec<String> {
    let Some(nodes) = graph.as_object() else {
        return Vec::new();
    };

    nodes
        .values()
        .filter(|node| node.get("class_type").and_then(Value::as_str) == Some(TEXT_ENCODER))
        .filter_map(|node| {
            let inputs = node.get("inputs")?;
            inputs
                .get("text")
                .and_then(Value::as_str)
                .or_else(|| inputs.get("prompt").and_then(Value::as_str))
        })
        .filter(|text| !text.trim().is_empty() && !starts_with_negative(text))
        .map(str::to_string)
        .collect()
}

/// Generic depth-first walk collecting string values stored under prompt-like
/// keys. Subtrees under any key mentioning "negative" are skipped.
pub fn walk(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    walk_into(value, &mut out);
    out
}

fn walk_into(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = key.to_lowercase();
                if key.contains("negative") {
                    continue;
                }
                match child {
                    Value::String(text) if PROMPT_KEYS.contains(&key.as_str()) => {
                        out.push(text.clone());
                    }
                    _ => walk_into(child, out),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_into(item, out);
            }
        }
        _ => {}
    }
}

fn is_text_encoder(node: &Value) -> bool {
    let node_type = node.get("type").and_then(Value::as_str).unwrap_or("");
    if node_type == TEXT_ENCODER || node_type.to_lowercase().contains("cliptext") {
        return true;
    }
    node.get("properties")
        .and_then(|props| props.get("Node name for S&R"))
        .and_then(Value::as_str)
        == Some(TEXT_ENCODER)
}

fn starts_with_negative(text: &str) -> bool {
    text.trim_start().to_lowercase().starts_with("negative")
}

fn node_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
