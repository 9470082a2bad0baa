//! # Prompt Metadata Module
//!
//! Extracts embedded generation prompts from dataset images.
//!
//! ## Overview
//!
//! This module handles:
//! - PNG text chunk reading (`tEXt`, `zTXt`, `iTXt`) and JPEG comments
//! - Prompt selection: `parameters` text first, then node-graph heuristics
//!   over `workflow` / `prompt` JSON
//! - Content hashing for stable item identity
//! - Thumbnail generation for the presentation layer
//!
//! Extraction never fails: images without usable metadata produce an empty
//! prompt.

pub mod container;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod thumbnail;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use container::{read_text_fields, ImageContainer, ImageTextFields};
pub use error::{MetadataError, Result};
pub use extractor::{content_hash, extract_prompt, ExtractedPrompt, PromptExtractor, PromptOrigin};
pub use thumbnail::{thumbnail, thumbnail_base64};

/// Returns `true` for file names the dataset scanner should pick up
/// (`.png`, `.jpg`, `.jpeg`, case-insensitive).
pub fn is_supported_image(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}
