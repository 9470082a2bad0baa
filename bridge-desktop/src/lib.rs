//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `FileSystemAccess` using `tokio::fs`, with directory walks on `walkdir`
//!
//! Time is provided by [`bridge_traits::SystemClock`], which needs no
//! desktop-specific adapter.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::TokioFileSystem;
//! use bridge_traits::FileSystemAccess;
//!
//! #[tokio::main]
//! async fn main() {
//!     let fs = TokioFileSystem::new();
//!     let listing = fs.list_files("./dataset".as_ref(), true).await.unwrap();
//! }
//! ```

mod filesystem;

pub use filesystem::TokioFileSystem;
