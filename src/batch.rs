use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::config::FetcherConfig;
use crate::downloader::{AssetDownloader, ensure_dirs};
use crate::error::IconError;
use crate::http::HttpFetch;
use crate::models::{AppId, BatchEntry, ResolvedIcon};
use crate::registry::{Catalog, CatalogEntry};
use crate::resolver::Resolver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub app: AppId,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub failures: Vec<BatchFailure>,
    /// Set only when the summary file was written
    pub summary_written: bool,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Resolves and downloads every catalog entry in order. A failing app is
/// recorded and the batch moves on; the summary is only written when nothing
/// failed.
pub async fn run_batch(
    http: &dyn HttpFetch,
    config: &FetcherConfig,
    catalog: &Catalog,
) -> Result<BatchReport, IconError> {
    ensure_dirs(&config.dest_dirs)?;

    let resolver = Resolver::new(http, config);
    let downloader = AssetDownloader::new(http, &config.dest_dirs, &config.user_agent);
    let mut report = BatchReport::default();

    for entry in catalog.iter() {
        print!("- {}: fetching... ", entry.app);
        std::io::stdout().flush().ok();

        match fetch_one(&resolver, &downloader, entry).await {
            Ok(icon) => {
                println!("OK ({})", icon.provenance);
                info!(app = %entry.app, file = %icon.file_name, provenance = %icon.provenance, "icon saved");
                report.entries.push(BatchEntry {
                    application_id: entry.app.clone(),
                    file_name: icon.file_name,
                    provenance: icon.provenance,
                });
            }
            Err(e) => {
                println!("FAIL");
                eprintln!("  {}: {}", entry.app, e);
                info!(app = %entry.app, error = %e, "icon fetch failed");
                report.failures.push(BatchFailure {
                    app: entry.app.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    if !report.is_success() {
        eprintln!(
            "\n{} of {} application(s) failed; summary not written",
            report.failures.len(),
            catalog.len()
        );
        return Ok(report);
    }

    write_summary(&config.summary_path, &report.entries)?;
    report.summary_written = true;
    println!("\nSaved summary: {}", config.summary_path.display());
    Ok(report)
}

async fn fetch_one(
    resolver: &Resolver<'_>,
    downloader: &AssetDownloader<'_>,
    entry: &CatalogEntry,
) -> Result<ResolvedIcon, IconError> {
    let icon = resolver.resolve(&entry.app, &entry.sources).await?;
    downloader.download_to_all(&icon.source_url, &icon.file_name).await?;
    Ok(icon)
}

pub fn write_summary(path: &Path, entries: &[BatchEntry]) -> Result<(), IconError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| IconError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| IconError::io(path, std::io::Error::other(e)))?;
    std::fs::write(path, json).map_err(|e| IconError::io(path, e))
}
