//! Local file discovery: list, filter by extension, sort, enumerate.

use std::path::{Path, PathBuf};

use anyhow::Context;

use uplink_core::models::{SortStrategy, UploadItem};
use uplink_core::sort;

/// Collect the upload batch from a source folder.
///
/// Only top-level regular files are considered. Extension matching is
/// case-insensitive and accepts configured extensions with or without a
/// leading dot. Files are sorted by name per `strategy`, then enumerated so
/// each item's `index` is its position in the sorted batch.
pub fn collect(
    folder: &str,
    strategy: SortStrategy,
    allowed_extensions: &[String],
) -> Result<Vec<UploadItem>, anyhow::Error> {
    if folder.trim().is_empty() {
        return Err(anyhow::anyhow!("Source folder path cannot be empty"));
    }

    let folder_path = Path::new(folder);
    if !folder_path.is_dir() {
        return Err(anyhow::anyhow!(
            "Source folder does not exist: {}",
            folder_path.display()
        ));
    }

    let entries = std::fs::read_dir(folder_path)
        .with_context(|| format!("Failed to read source folder {}", folder_path.display()))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();
        if path.is_file() && has_allowed_extension(&path, allowed_extensions) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(anyhow::anyhow!(
            "No files found in folder: {}",
            folder_path.display()
        ));
    }

    let cmp = sort::comparator(strategy);
    files.sort_by(|a, b| cmp(&name_of(a), &name_of(b)));

    Ok(files
        .into_iter()
        .enumerate()
        .map(|(index, path)| UploadItem::new(index, path))
        .collect())
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_allowed_extension(path: &Path, allowed_extensions: &[String]) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    allowed_extensions
        .iter()
        .any(|allowed| extension.eq_ignore_ascii_case(allowed.trim_start_matches('.')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    fn png_only() -> Vec<String> {
        vec![".png".to_string()]
    }

    #[test]
    fn filters_by_extension_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        touch(dir.path(), "b.PNG");
        touch(dir.path(), "c.jpg");
        touch(dir.path(), "notes.txt");

        let items = collect(
            dir.path().to_str().unwrap(),
            SortStrategy::Lexical,
            &png_only(),
        )
        .unwrap();

        let names: Vec<String> = items.iter().map(|i| i.filename()).collect();
        assert_eq!(names, vec!["a.png", "b.PNG"]);
    }

    #[test]
    fn accepts_extensions_without_leading_dot() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");

        let items = collect(
            dir.path().to_str().unwrap(),
            SortStrategy::Lexical,
            &["png".to_string()],
        )
        .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn natural_strategy_orders_and_indexes_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["img2.png", "img10.png", "img1.png"] {
            touch(dir.path(), name);
        }

        let items = collect(
            dir.path().to_str().unwrap(),
            SortStrategy::Natural,
            &png_only(),
        )
        .unwrap();

        let names: Vec<String> = items.iter().map(|i| i.filename()).collect();
        assert_eq!(names, vec!["img1.png", "img2.png", "img10.png"]);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.index, i);
        }
    }

    #[test]
    fn lexical_strategy_orders_ordinally() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["img2.png", "img10.png", "img1.png"] {
            touch(dir.path(), name);
        }

        let items = collect(
            dir.path().to_str().unwrap(),
            SortStrategy::Lexical,
            &png_only(),
        )
        .unwrap();

        let names: Vec<String> = items.iter().map(|i| i.filename()).collect();
        assert_eq!(names, vec!["img1.png", "img10.png", "img2.png"]);
    }

    #[test]
    fn subdirectories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();
        touch(dir.path(), "a.png");

        let items = collect(
            dir.path().to_str().unwrap(),
            SortStrategy::Lexical,
            &png_only(),
        )
        .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn empty_match_set_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");

        let err = collect(
            dir.path().to_str().unwrap(),
            SortStrategy::Lexical,
            &png_only(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("No files found"));
    }

    #[test]
    fn missing_folder_is_an_error() {
        let err = collect("/nonexistent/folder", SortStrategy::Lexical, &png_only()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn blank_folder_is_an_error() {
        assert!(collect("  ", SortStrategy::Lexical, &png_only()).is_err());
    }
}
