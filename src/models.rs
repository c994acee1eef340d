use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable key of one client application, shared by the fetcher, the config
/// patcher and the UI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Where an icon may come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// App-store lookup ids, tried in order
    MetadataLookup { candidates: Vec<String> },
    RepositoryScan { owner: String, repo: String },
    StorefrontScrape { package: String },
}

impl SourceDescriptor {
    pub fn metadata<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MetadataLookup {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn repository(owner: &str, repo: &str) -> Self {
        Self::RepositoryScan {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    pub fn storefront(package: &str) -> Self {
        Self::StorefrontScrape {
            package: package.to_string(),
        }
    }

    /// Lower runs first: metadata lookups are the most stable artwork,
    /// storefront scraping the most fragile.
    pub fn priority(&self) -> u8 {
        match self {
            Self::MetadataLookup { .. } => 0,
            Self::RepositoryScan { .. } => 1,
            Self::StorefrontScrape { .. } => 2,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MetadataLookup { .. } => "apple",
            Self::RepositoryScan { .. } => "github",
            Self::StorefrontScrape { .. } => "play",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIcon {
    pub source_url: String,
    pub file_name: String,
    pub provenance: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub path: String,
    pub score: i32,
}

/// One line of the persisted results summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub application_id: AppId,
    pub file_name: String,
    pub provenance: String,
}
