//! `blob-to-share`: one mirror run of a blob container into a file share.
//!
//! Takes no arguments. Reads `ACCOUNT_NAME`, `ACCOUNT_KEY`, `CONTAINER_NAME`
//! and `SHARE_NAME` from the environment, exits 0 once the share mirrors the
//! container and 1 on the first failure.

use anyhow::Context;
use blobshare_azure::{MirrorConfig, build_engine};
use blobshare_mirror::MirrorReport;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(report) => {
            info!(
                objects = report.objects_pushed,
                bytes = report.bytes_uploaded,
                directories_created = report.directories_created,
                directories_visited = report.directories_visited,
                files_kept = report.files_kept,
                files_deleted = report.files_deleted,
                "share is in sync with container"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<MirrorReport> {
    let config = MirrorConfig::from_env().context("loading configuration")?;
    info!(
        account = %config.account_name,
        container = %config.container_name,
        share = %config.share_name,
        "starting mirror run"
    );

    let engine = build_engine(&config).context("building storage clients")?;
    let report = engine.run().await.context("mirror run aborted")?;
    Ok(report)
}
