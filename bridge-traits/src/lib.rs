//! # Host Bridge Traits
//!
//! Platform abstraction traits that the dataset core depends on.
//!
//! ## Overview
//!
//! The extractor and the JSONL codec are pure functions over bytes and lines.
//! Everything that touches the host (reading the dataset directory, writing
//! uploads, deleting files, telling the time, forwarding logs) goes through
//! the traits defined here so that the orchestration layer can be exercised
//! against in-memory doubles.
//!
//! ## Traits
//!
//! - [`FileSystemAccess`](storage::FileSystemAccess) - File I/O and directory enumeration
//! - [`Clock`](time::Clock) - Time source for upload naming and export timestamps
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert native errors into it and keep the offending
//! path in the message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single implementation can be
//! shared behind an `Arc` by every request handler of the presentation layer.

pub mod error;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use storage::{FileListing, FileMetadata, FileSystemAccess};
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
