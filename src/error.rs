use std::path::PathBuf;

use crate::models::AppId;

/// Transport-level failures from the HTTP seam
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON from {url}: {message}")]
    Json { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Resolver-local failures. These never leave the orchestrator; they only
/// decide whether the next source gets a turn.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no artwork found for ids [{}]", .candidates.join(", "))]
    NoArtworkFound { candidates: Vec<String> },

    #[error("no icon found in {owner}/{repo}: {reason}")]
    NoIconInRepository {
        owner: String,
        repo: String,
        reason: String,
    },

    #[error("og:image not found for {package}: {reason}")]
    PreviewImageNotFound { package: String, reason: String },
}

/// Per-application failures surfaced to the batch
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("no icon resolved for {app}: {}", describe_attempts(.attempts))]
    UnresolvedIcon {
        app: AppId,
        attempts: Vec<ResolveError>,
    },

    #[error("download failed: {0}")]
    DownloadFailed(#[source] FetchError),

    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IconError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn describe_attempts(attempts: &[ResolveError]) -> String {
    if attempts.is_empty() {
        return "no sources configured".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fetcher config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of the config patching stage
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("io error reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} is not a JSON object")]
    NotAnObject { path: PathBuf },

    #[error("failed to render {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
