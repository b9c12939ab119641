//! Concurrent batch upload orchestration.
//!
//! A fixed pool of workers drains one shared queue. Each worker runs the
//! per-file pipeline (upload, then publish) under the retry policy and writes
//! its outcome into the slot matching the item's original index, so the final
//! result order is deterministic even though completion order is not.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use uplink_core::models::{UploadItem, UploadResult};
use uplink_storage::{RemoteStorage, StorageError, UploadOutcome};

use crate::retry::RetryPolicy;

/// Completed-count plus console output, updated as one unit.
///
/// Workers race to report; holding the lock across both the increment and the
/// line keeps `[n/total]` prefixes consistent and un-interleaved.
struct Progress {
    total: usize,
    completed: Mutex<usize>,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: Mutex::new(0),
        }
    }

    fn uploaded(&self, filename: &str, url: &str, already_existed: bool) {
        let mut count = self.completed.lock().unwrap();
        *count += 1;
        if already_existed {
            println!(
                "[{}/{}] ✓ {} (already existed) -> {}",
                count, self.total, filename, url
            );
        } else {
            println!("[{}/{}] ✓ {} -> {}", count, self.total, filename, url);
        }
    }

    fn failed(&self, filename: &str, error: &StorageError) {
        let mut count = self.completed.lock().unwrap();
        *count += 1;
        eprintln!(
            "[{}/{}] ✗ Failed to upload {}: {}",
            count, self.total, filename, error
        );
    }
}

/// Fans a batch of upload items out over a bounded worker pool.
pub struct UploadOrchestrator<S> {
    storage: Arc<S>,
    target_folder: String,
    retry: RetryPolicy,
}

impl<S: RemoteStorage + 'static> UploadOrchestrator<S> {
    pub fn new(storage: Arc<S>, target_folder: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            storage,
            target_folder: target_folder.into(),
            retry,
        }
    }

    /// Upload every item and return the index-addressed results.
    ///
    /// The returned vector always has one slot per input item; a `None` slot
    /// is an item that permanently failed or was cancelled before completing.
    /// Returns only after every worker has exited.
    pub async fn upload_batch(
        &self,
        items: Vec<UploadItem>,
        max_parallel_uploads: usize,
        cancel: CancellationToken,
    ) -> Vec<Option<UploadResult>> {
        let total = items.len();
        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let results = Arc::new(Mutex::new(vec![None; total]));
        let progress = Arc::new(Progress::new(total));

        let workers = max_parallel_uploads.max(1);
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(workers);
        for _ in 0..workers {
            let storage = Arc::clone(&self.storage);
            let queue = Arc::clone(&queue);
            let results = Arc::clone(&results);
            let progress = Arc::clone(&progress);
            let cancel = cancel.clone();
            let retry = self.retry.clone();
            let target_folder = self.target_folder.clone();

            handles.push(tokio::spawn(async move {
                worker_loop(
                    storage,
                    target_folder,
                    retry,
                    cancel,
                    queue,
                    results,
                    progress,
                )
                .await;
            }));
        }

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Upload worker panicked");
            }
        }

        Arc::try_unwrap(results)
            .map(|mutex| mutex.into_inner().unwrap())
            .unwrap_or_else(|shared| shared.lock().unwrap().clone())
    }
}

async fn worker_loop<S: RemoteStorage>(
    storage: Arc<S>,
    target_folder: String,
    retry: RetryPolicy,
    cancel: CancellationToken,
    queue: Arc<Mutex<VecDeque<UploadItem>>>,
    results: Arc<Mutex<Vec<Option<UploadResult>>>>,
    progress: Arc<Progress>,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let item = queue.lock().unwrap().pop_front();
        let Some(item) = item else { break };

        let filename = item.filename();
        let remote_path = format!("{}/{}", target_folder.trim_end_matches('/'), filename);

        let outcome = retry
            .run(&cancel, || {
                let storage = Arc::clone(&storage);
                let local_path = item.file_path.clone();
                let remote_path = remote_path.clone();
                async move {
                    match storage.upload(&local_path, &remote_path).await? {
                        UploadOutcome::Uploaded => {
                            let url = storage.publish(&remote_path).await?;
                            Ok((url, false))
                        }
                        // A previous attempt already stored the file; publishing
                        // is all that remains.
                        UploadOutcome::AlreadyExists => {
                            let url = storage.publish(&remote_path).await?;
                            Ok((url, true))
                        }
                    }
                }
            })
            .await;

        match outcome {
            Ok((url, already_existed)) => {
                results.lock().unwrap()[item.index] = Some(UploadResult {
                    index: item.index,
                    filename: filename.clone(),
                    public_url: url.clone(),
                });
                progress.uploaded(&filename, &url, already_existed);
            }
            Err(StorageError::Cancelled) => break,
            Err(err) => {
                tracing::error!(
                    file = %item.file_path.display(),
                    error = %err,
                    "Upload permanently failed"
                );
                progress.failed(&filename, &err);
            }
        }
    }
}
