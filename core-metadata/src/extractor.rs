//! Prompt Extraction
//!
//! Recovers the generation prompt embedded in an image file.
//!
//! ## Overview
//!
//! - Reads embedded text fields (PNG text chunks, JPEG comments)
//! - Returns the `parameters` field verbatim when present
//! - Otherwise walks `workflow` and `prompt` node graphs for positive
//!   text-encoder inputs
//! - Calculates SHA-256 content hash for item identity
//! - Never fails: unreadable input yields an empty prompt
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::extractor::PromptExtractor;
//!
//! let extractor = PromptExtractor::new();
//! let extracted = extractor.extract(&bytes);
//!
//! println!("{} -> {}", extracted.content_hash, extracted.prompt);
//! ```

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::container::{read_text_fields, ImageContainer, ImageTextFields};
use crate::graph;

/// Where an extracted prompt came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOrigin {
    /// Flat `parameters` text field
    Parameters,
    /// Text encoder node in the editor `workflow` graph
    Workflow,
    /// Text encoder node in the execution `prompt` graph
    PromptGraph,
    /// Prompt-like key found by the generic graph walk
    GraphWalk,
    /// Nothing usable; the prompt is empty
    None,
}

/// Result of a single extraction
#[derive(Debug, Clone)]
pub struct ExtractedPrompt {
    /// Chosen prompt, or empty when none was found
    pub prompt: String,
    pub origin: PromptOrigin,
    /// SHA-256 hex digest of the input bytes
    pub content_hash: String,
    pub container: ImageContainer,
}

impl ExtractedPrompt {
    /// True when no prompt could be recovered
    pub fn is_degraded(&self) -> bool {
        self.origin == PromptOrigin::None
    }
}

/// Prompt extractor
#[derive(Debug, Clone, Default)]
pub struct PromptExtractor;

impl PromptExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the prompt and content hash from raw image bytes
    pub fn extract(&self, bytes: &[u8]) -> ExtractedPrompt {
        let content_hash = content_hash(bytes);

        let fields = match read_text_fields(bytes) {
            Ok(fields) => fields,
            Err(e) => {
                debug!(hash = %content_hash, error = %e, "No readable text metadata");
                return ExtractedPrompt {
                    prompt: String::new(),
                    origin: PromptOrigin::None,
                    content_hash,
                    container: ImageContainer::Unknown,
                };
            }
        };

        let (prompt, origin) = self.select_prompt(&fields);
        debug!(
            hash = %content_hash,
            origin = ?origin,
            fields = fields.len(),
            "Extracted prompt"
        );

        ExtractedPrompt {
            prompt,
            origin,
            content_hash,
            container: fields.container,
        }
    }

    /// Pick a prompt from already-read text fields.
    ///
    /// Tiers are tried in order and the first one yielding a non-empty
    /// candidate wins. Within a tier the longest normalized candidate is
    /// chosen; ties go to the first seen.
    pub fn select_prompt(&self, fields: &ImageTextFields) -> (String, PromptOrigin) {
        if let Some(parameters) = fields.get("parameters") {
            if !parameters.trim().is_empty() {
                return (parameters.to_string(), PromptOrigin::Parameters);
            }
        }

        let workflow = fields.get("workflow").and_then(parse_graph);
        let prompt_graph = fields.get("prompt").and_then(parse_graph);

        if let Some(best) = workflow.as_ref().map(graph::from_workflow).and_then(choose) {
            return (best, PromptOrigin::Workflow);
        }

        if let Some(best) = prompt_graph
            .as_ref()
            .map(graph::from_prompt_graph)
            .and_then(choose)
        {
            return (best, PromptOrigin::PromptGraph);
        }

        let walked: Vec<String> = workflow
            .iter()
            .chain(prompt_graph.iter())
            .flat_map(graph::walk)
            .collect();
        if let Some(best) = choose(walked) {
            return (best, PromptOrigin::GraphWalk);
        }

        (String::new(), PromptOrigin::None)
    }
}

/// Extract the prompt embedded in image bytes.
///
/// Returns an empty string when the image carries no usable metadata.
pub fn extract_prompt(bytes: &[u8]) -> String {
    PromptExtractor::new().extract(bytes).prompt
}

/// SHA-256 hex digest of the file contents; used as the item id
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Trim and collapse internal whitespace runs to single spaces
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_graph(raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Embedded graph is not valid JSON");
            None
        }
    }
}

/// Normalize, drop empties and duplicates, keep the longest
fn choose(candidates: Vec<String>) -> Option<String> {
    let mut best: Option<String> = None;
    let mut seen = Vec::new();

    for candidate in candidates {
        let normalized = normalize_text(&candidate);
        if normalized.is_empty() || seen.contains(&normalized) {
            continue;
        }
        if best.as_ref().map_or(true, |b| normalized.len() > b.len()) {
            best = Some(normalized.clone());
        }
        seen.push(normalized);
    }

    best
}
