//! Uplink core library.
//!
//! Domain models, settings loading/validation, and the filename comparators
//! shared by the storage client, the upload orchestrator, and the CLI.

pub mod config;
pub mod models;
pub mod sort;

// Re-export commonly used types
pub use config::Settings;
pub use models::{SortStrategy, UploadItem, UploadResult};
