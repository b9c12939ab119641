//! Batch upload models: work items, per-file results, and sort strategies.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single file queued for upload. Created once by file discovery and never
/// mutated afterwards; `index` is its position in the sorted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub index: usize,
    pub file_path: PathBuf,
}

impl UploadItem {
    pub fn new(index: usize, file_path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            file_path: file_path.into(),
        }
    }

    /// Base name of the local file, lossy-decoded for display and remote naming.
    pub fn filename(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Outcome of a successfully uploaded and published file.
///
/// `index` matches the originating [`UploadItem`]; the result array slot at
/// that index is written by exactly one worker, at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub index: usize,
    pub filename: String,
    pub public_url: String,
}

/// How discovered filenames are ordered before indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    /// Ordinal byte-wise comparison of file names.
    #[default]
    #[serde(alias = "LikeString")]
    Lexical,
    /// Numeric-aware comparison: the first digit run in a name is compared as
    /// a number.
    #[serde(alias = "LikeNumbers")]
    Natural,
}
