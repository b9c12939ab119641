//! REST client for the disk storage service.
//!
//! Encodes the multi-step upload protocol: create folders segment by segment,
//! negotiate a short-lived upload href, stream the file bytes to it, then
//! publish and resolve the direct-download link. Conflict responses carry a
//! structured error code in the body; two of those codes are idempotency
//! signals rather than failures.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::traits::{RemoteStorage, StorageError, StorageResult, UploadOutcome};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://cloud-api.yandex.net/v1/disk";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Conflict code meaning the path already points to an existing directory.
const PATH_EXISTS_CODE: &str = "DiskPathPointsToExistentDirectoryError";
/// Conflict code meaning the resource was already stored by a previous attempt.
const RESOURCE_EXISTS_CODE: &str = "DiskResourceAlreadyExistsError";

/// `href` payload returned by the upload-negotiation and download-link calls.
#[derive(Debug, Deserialize)]
struct Link {
    #[serde(default)]
    href: String,
}

/// Error body shape: `{"error": "<code>", ...}`.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: Option<String>,
}

enum UploadSlot {
    Href(String),
    AlreadyExists,
}

/// HTTP client for the disk REST API.
#[derive(Clone, Debug)]
pub struct DiskClient {
    client: Client,
    base_url: String,
    token: String,
}

impl DiskClient {
    pub fn new(token: impl Into<String>) -> StorageResult<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Client against a custom base endpoint. Tests point this at a local
    /// mock server.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> StorageResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("OAuth {}", self.token))
    }

    fn resources_url(&self, suffix: &str) -> String {
        format!("{}/resources{}", self.base_url, suffix)
    }

    /// Extract the structured error code from a conflict body, if any.
    fn conflict_code(body: &str) -> Option<String> {
        serde_json::from_str::<ApiError>(body)
            .ok()
            .and_then(|e| e.error)
    }

    async fn backend_error(response: Response) -> StorageError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        StorageError::Backend { status, body }
    }

    async fn create_folder(&self, folder_path: &str) -> StorageResult<()> {
        let request = self
            .client
            .put(self.resources_url(""))
            .query(&[("path", folder_path)]);
        let response = self.authorize(request).send().await?;

        if response.status().is_success() {
            return Ok(());
        }

        if response.status() == StatusCode::CONFLICT {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if Self::conflict_code(&body).as_deref() == Some(PATH_EXISTS_CODE) {
                tracing::debug!(folder = folder_path, "Folder already exists");
                return Ok(());
            }
            return Err(StorageError::Backend {
                status: StatusCode::CONFLICT.as_u16(),
                body,
            });
        }

        Err(Self::backend_error(response).await)
    }

    async fn negotiate_upload(&self, remote_path: &str) -> StorageResult<UploadSlot> {
        let request = self
            .client
            .get(self.resources_url("/upload"))
            .query(&[("path", remote_path), ("overwrite", "true")]);
        let response = self.authorize(request).send().await?;

        if response.status() == StatusCode::CONFLICT {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if Self::conflict_code(&body).as_deref() == Some(RESOURCE_EXISTS_CODE) {
                return Ok(UploadSlot::AlreadyExists);
            }
            return Err(StorageError::Backend {
                status: StatusCode::CONFLICT.as_u16(),
                body,
            });
        }

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        let link: Link = response
            .json()
            .await
            .map_err(|e| StorageError::MalformedResponse(format!("upload href: {}", e)))?;
        if link.href.trim().is_empty() {
            return Err(StorageError::MalformedResponse(
                "upload href is empty in response".to_string(),
            ));
        }

        Ok(UploadSlot::Href(link.href))
    }

    async fn stream_file_to(&self, href: &str, local_path: &Path) -> StorageResult<()> {
        let file = tokio::fs::File::open(local_path).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let request = self
            .client
            .put(href)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body);
        let response = self.authorize(request).send().await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        Ok(())
    }

    async fn resolve_download_link(&self, remote_path: &str) -> StorageResult<String> {
        let request = self
            .client
            .get(self.resources_url("/download"))
            .query(&[("path", remote_path)]);
        let response = self.authorize(request).send().await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        let link: Link = response
            .json()
            .await
            .map_err(|e| StorageError::MalformedResponse(format!("download href: {}", e)))?;
        if link.href.trim().is_empty() {
            return Err(StorageError::MalformedResponse(
                "download href is empty in response".to_string(),
            ));
        }

        Ok(link.href)
    }
}

/// Split a remote path into its non-empty segments. Both separators appear in
/// settings files written on Windows.
fn path_segments(remote_path: &str) -> Vec<&str> {
    remote_path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

#[async_trait]
impl RemoteStorage for DiskClient {
    async fn ensure_folder_exists(&self, remote_path: &str) -> StorageResult<()> {
        let segments = path_segments(remote_path);
        if segments.is_empty() {
            return Err(StorageError::InvalidPath(remote_path.to_string()));
        }

        // Parents must exist before children; create each prefix in turn.
        let mut current = String::new();
        for segment in segments {
            if current.is_empty() {
                current.push_str(segment);
            } else {
                current.push('/');
                current.push_str(segment);
            }
            self.create_folder(&current).await?;
        }

        Ok(())
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> StorageResult<UploadOutcome> {
        if remote_path.trim().is_empty() {
            return Err(StorageError::InvalidPath(remote_path.to_string()));
        }
        if !local_path.is_file() {
            return Err(StorageError::MissingLocalFile(local_path.to_path_buf()));
        }

        match self.negotiate_upload(remote_path).await? {
            UploadSlot::AlreadyExists => Ok(UploadOutcome::AlreadyExists),
            UploadSlot::Href(href) => {
                self.stream_file_to(&href, local_path).await?;
                Ok(UploadOutcome::Uploaded)
            }
        }
    }

    async fn publish(&self, remote_path: &str) -> StorageResult<String> {
        if remote_path.trim().is_empty() {
            return Err(StorageError::InvalidPath(remote_path.to_string()));
        }

        let request = self
            .client
            .put(self.resources_url("/publish"))
            .query(&[("path", remote_path)]);
        let response = self.authorize(request).send().await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        self.resolve_download_link(remote_path).await
    }
}
