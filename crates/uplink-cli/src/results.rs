//! Persist the uploaded-links report.

use std::path::Path;

use anyhow::Context;

use uplink_core::models::UploadResult;

/// Write the successful results as pretty-printed JSON, ordered by index.
/// Holes (permanently failed items) are excluded.
pub async fn write_results(
    results: &[Option<UploadResult>],
    path: impl AsRef<Path>,
) -> Result<(), anyhow::Error> {
    let path = path.as_ref();

    let mut successes: Vec<&UploadResult> = results.iter().flatten().collect();
    successes.sort_by_key(|result| result.index);

    let json = serde_json::to_string_pretty(&successes).context("Failed to serialize results")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write results to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, filename: &str) -> UploadResult {
        UploadResult {
            index,
            filename: filename.to_string(),
            public_url: format!("https://downloader.example/{}", filename),
        }
    }

    #[tokio::test]
    async fn writes_successes_ordered_by_index_without_holes() {
        let results = vec![
            Some(result(0, "img1.png")),
            None,
            Some(result(2, "img3.png")),
        ];
        let file = tempfile::NamedTempFile::new().unwrap();

        write_results(&results, file.path()).await.unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["index"], 0);
        assert_eq!(entries[1]["index"], 2);
        assert_eq!(entries[1]["filename"], "img3.png");
        assert_eq!(
            entries[1]["publicUrl"],
            "https://downloader.example/img3.png"
        );
        // Pretty-printed output spans multiple lines.
        assert!(written.contains('\n'));
    }

    #[tokio::test]
    async fn empty_batch_writes_an_empty_list() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_results(&[], file.path()).await.unwrap();
        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(written.trim(), "[]");
    }
}
