#![forbid(unsafe_code)]

//! Core domain model and persistence for the RepLog workout log.
//!
//! This crate provides:
//! - Domain types (entries, validated fields, form input)
//! - The entry store abstraction with in-memory and file backends
//! - Configuration and logging setup
//! - CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod memory;
pub mod document;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result, ValidationError};
pub use types::*;
pub use config::Config;
pub use store::{connect, EntryStore, SharedStore, SortSpec};
pub use memory::MemoryStore;
pub use document::JsonFileStore;
