use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::IconError;
use crate::http::{HttpFetch, get_ok};

pub fn ensure_dirs(dirs: &[PathBuf]) -> Result<(), IconError> {
    for dir in dirs {
        std::fs::create_dir_all(dir).map_err(|e| IconError::io(dir, e))?;
    }
    Ok(())
}

/// Fetches an icon once and mirrors it into every destination directory
pub struct AssetDownloader<'a> {
    http: &'a dyn HttpFetch,
    dest_dirs: &'a [PathBuf],
    user_agent: &'a str,
}

impl<'a> AssetDownloader<'a> {
    pub fn new(http: &'a dyn HttpFetch, dest_dirs: &'a [PathBuf], user_agent: &'a str) -> Self {
        Self {
            http,
            dest_dirs,
            user_agent,
        }
    }

    /// Returns the written paths. Not retried on failure.
    ///
    /// Every destination gets a `.part` copy before any of them is renamed
    /// into place; a failed copy removes the staged files and leaves every
    /// destination as it was.
    pub async fn download_to_all(&self, url: &str, file_name: &str) -> Result<Vec<PathBuf>, IconError> {
        let response = get_ok(self.http, url, &[("User-Agent", self.user_agent)])
            .await
            .map_err(IconError::DownloadFailed)?;
        let data = response.into_bytes();

        let mut staged = Vec::with_capacity(self.dest_dirs.len());
        for dir in self.dest_dirs {
            let out = dir.join(file_name);
            match stage(&out, &data).await {
                Ok(part) => staged.push((part, out)),
                Err(e) => {
                    discard(staged.iter().map(|(part, _)| part)).await;
                    return Err(e);
                }
            }
        }

        let mut written = Vec::with_capacity(staged.len());
        let mut pending = staged.iter();
        while let Some((part, out)) = pending.next() {
            if let Err(e) = tokio::fs::rename(part, out).await {
                discard(std::iter::once(part).chain(pending.map(|(part, _)| part))).await;
                return Err(IconError::io(out, e));
            }
            written.push(out.clone());
        }
        debug!(url, file_name, bytes = data.len(), copies = written.len(), "downloaded");
        Ok(written)
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    PathBuf::from(part)
}

/// Writes `data` next to `path` as `<path>.part`. A directory already sitting
/// at `path` could never be replaced, so it fails here rather than at rename.
async fn stage(path: &Path, data: &[u8]) -> Result<PathBuf, IconError> {
    if tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir()) {
        return Err(IconError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::IsADirectory, "destination is a directory"),
        ));
    }
    let part = part_path(path);
    if let Err(e) = tokio::fs::write(&part, data).await {
        tokio::fs::remove_file(&part).await.ok();
        return Err(IconError::io(&part, e));
    }
    Ok(part)
}

async fn discard<'p>(parts: impl Iterator<Item = &'p PathBuf>) {
    for part in parts {
        if let Err(e) = tokio::fs::remove_file(part).await {
            debug!(path = %part.display(), error = %e, "could not remove staged file");
        }
    }
}
