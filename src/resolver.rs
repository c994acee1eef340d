use tracing::{debug, info};

use crate::config::FetcherConfig;
use crate::error::{IconError, ResolveError};
use crate::http::HttpFetch;
use crate::metadata::resolve_artwork;
use crate::models::{AppId, ResolvedIcon, SourceDescriptor};
use crate::repository::RepositoryScanner;
use crate::storefront::resolve_preview_image;

pub const DEFAULT_EXTENSION: &str = ".png";

/// Extension of the last path segment of `url`, including the dot.
pub fn infer_extension(url: &str) -> String {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let name = path.rsplit('/').next().unwrap_or_default();
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => name[i..].to_string(),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Tries an application's sources in priority order and keeps the first hit.
pub struct Resolver<'a> {
    http: &'a dyn HttpFetch,
    config: &'a FetcherConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(http: &'a dyn HttpFetch, config: &'a FetcherConfig) -> Self {
        Self { http, config }
    }

    pub async fn resolve(&self, app: &AppId, sources: &[SourceDescriptor]) -> Result<ResolvedIcon, IconError> {
        let mut ordered: Vec<&SourceDescriptor> = sources.iter().collect();
        ordered.sort_by_key(|s| s.priority());

        let mut attempts = Vec::new();
        for source in ordered {
            match self.attempt(app, source).await {
                Ok(icon) => {
                    debug!(app = %app, provenance = %icon.provenance, url = %icon.source_url, "resolved");
                    return Ok(icon);
                }
                Err(e) => {
                    info!(app = %app, source = source.kind(), error = %e, "source failed");
                    attempts.push(e);
                }
            }
        }

        Err(IconError::UnresolvedIcon {
            app: app.clone(),
            attempts,
        })
    }

    async fn attempt(&self, app: &AppId, source: &SourceDescriptor) -> Result<ResolvedIcon, ResolveError> {
        let endpoints = &self.config.endpoints;
        match source {
            SourceDescriptor::MetadataLookup { candidates } => {
                let hit = resolve_artwork(self.http, &endpoints.itunes_lookup, candidates).await?;
                // the lookup service hands out PNG-compatible artwork
                Ok(ResolvedIcon {
                    source_url: hit.artwork_url,
                    file_name: format!("{}{}", app, DEFAULT_EXTENSION),
                    provenance: format!("apple:{}", hit.candidate),
                })
            }
            SourceDescriptor::RepositoryScan { owner, repo } => {
                let scanner = RepositoryScanner::new(
                    self.http,
                    &endpoints.github_api,
                    &endpoints.github_raw,
                    &self.config.user_agent,
                );
                let hit = scanner.resolve(owner, repo).await?;
                debug!(app = %app, path = %hit.path, phase = ?hit.phase, "repository icon");
                Ok(ResolvedIcon {
                    file_name: format!("{}{}", app, infer_extension(&hit.download_url)),
                    source_url: hit.download_url,
                    provenance: format!("github:{}/{}", owner, repo),
                })
            }
            SourceDescriptor::StorefrontScrape { package } => {
                let url = resolve_preview_image(
                    self.http,
                    &endpoints.play_store,
                    &self.config.browser_user_agent,
                    package,
                )
                .await?;
                Ok(ResolvedIcon {
                    source_url: url,
                    file_name: format!("{}{}", app, DEFAULT_EXTENSION),
                    provenance: format!("play:{}", package),
                })
            }
        }
    }
}
