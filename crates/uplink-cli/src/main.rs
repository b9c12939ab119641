//! Uplink — batch-upload local files to disk cloud storage and record a
//! public download link for each.
//!
//! Configuration comes from a JSON settings file; `UPLINK_OAUTH_TOKEN`
//! overrides the token from the environment.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use uplink_cli::{init_tracing, results, source};
use uplink_core::Settings;
use uplink_storage::{DiskClient, RemoteStorage};
use uplink_worker::{RetryPolicy, UploadOrchestrator};

#[derive(Parser)]
#[command(name = "uplink", about = "Batch uploader for disk cloud storage")]
struct Cli {
    /// Path to the settings file
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,
    /// Where to write the uploaded-links report
    #[arg(long, default_value = "result.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.settings)?;

    println!("Loading files...");
    let files = source::collect(
        &settings.source_folder,
        settings.sort_strategy,
        &settings.allowed_extensions,
    )?;

    println!("Found {} files:", files.len());
    for file in &files {
        println!("  [{}] {}", file.index, file.filename());
    }

    let client = Arc::new(
        DiskClient::new(settings.oauth_token.clone()).context("Failed to create storage client")?,
    );

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        canceller.cancel();
    });

    let retry = RetryPolicy::default();
    let target_folder = settings.target_disk_folder.trim().to_string();

    retry
        .run(&cancel, || {
            let client = Arc::clone(&client);
            let target_folder = target_folder.clone();
            async move { client.ensure_folder_exists(&target_folder).await }
        })
        .await
        .with_context(|| format!("Failed to prepare remote folder '{}'", target_folder))?;

    let total = files.len();
    let orchestrator = UploadOrchestrator::new(Arc::clone(&client), target_folder, retry);
    let uploads = orchestrator
        .upload_batch(files, settings.max_parallel_uploads, cancel.clone())
        .await;

    results::write_results(&uploads, &cli.output)
        .await
        .context("Failed to write results")?;

    let succeeded = uploads.iter().flatten().count();
    let failed = total - succeeded;
    if cancel.is_cancelled() {
        println!("Upload cancelled: {} of {} files completed", succeeded, total);
    } else {
        println!("Done: {} uploaded, {} failed", succeeded, failed);
    }
    println!("Links written to {}", cli.output.display());

    Ok(())
}

/// Wait for Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Cancelling in-flight uploads...");
}
