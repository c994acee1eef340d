//! Repository icon discovery.
//!
//! Source repositories have no fixed layout, so discovery runs in two phases:
//! a cheap probe of conventional locations, then a ranked scan of the whole
//! file tree.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::ResolveError;
use crate::http::{HttpFetch, get_json};
use crate::models::ScoredCandidate;

/// Probed in order before any tree scan
pub const KNOWN_ICON_PATHS: &[&str] = &[
    // root
    "icon.png",
    "logo.png",
    "logo/icon.png",
    "assets/icon.png",
    "assets/logo.png",
    "static/icon.png",
    "static/logo.png",
    // android
    "app/src/main/ic_launcher-playstore.png",
    "app/src/main/ic_launcher.png",
    "app/src/main/res/mipmap-xxxhdpi/ic_launcher.png",
    "app/src/main/res/mipmap-xxhdpi/ic_launcher.png",
    "app/src/main/res/mipmap-xhdpi/ic_launcher.png",
    "app/src/main/res/mipmap-hdpi/ic_launcher.png",
    "app/src/main/res/mipmap-mdpi/ic_launcher.png",
    "app/src/main/res/mipmap-anydpi-v26/ic_launcher.xml",
    // fastlane
    "fastlane/metadata/android/en-US/images/icon.png",
    "fastlane/metadata/android/en-US/images/featureGraphic.png",
    // tauri
    "src-tauri/icons/icon.png",
    "src-tauri/icons/128x128.png",
    "src-tauri/icons/256x256.png",
    "src-tauri/icons/512x512.png",
    "src-tauri/icons/icon@2x.png",
    "src-tauri/icons/Square150x150Logo.png",
    "src-tauri/icons/Square310x310Logo.png",
    // some v2rayNG forks ship a top-level png
    "V2rayNG.png",
    "v2rayNG.png",
];

pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".svg", ".icns", ".ico"];

const SIZE_HINTS: [i32; 5] = [1024, 512, 256, 128, 64];
const PENALIZED: [&str; 4] = ["screenshot", "screenshots", "banner", "featuregraphic"];
const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    KnownPath,
    TreeScan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMatch {
    pub path: String,
    pub download_url: String,
    pub phase: ScanPhase,
}

pub fn is_image_like(path: &str) -> bool {
    let lower = path.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Additive heuristic; packaging and launcher paths and larger declared sizes
/// look most like the real app icon.
pub fn score_path(path: &str) -> i32 {
    let s = path.to_lowercase();
    let mut score = 0;

    if s.contains("src-tauri/icons") {
        score += 60;
    }
    if s.contains("/icons/") {
        score += 40;
    }
    if s.contains("appicon") || s.contains("app_icon") {
        score += 40;
    }
    if s.contains("ic_launcher") {
        score += 45;
    }
    if s.contains("logo") {
        score += 25;
    }
    if s.contains("icon") {
        score += 20;
    }
    if s.contains("favicon") {
        score += 10;
    }

    if s.ends_with(".png") {
        score += 30;
    } else if s.ends_with(".svg") {
        score += 18;
    } else if s.ends_with(".icns") || s.ends_with(".ico") {
        score += 8;
    }

    if let Some(size) = SIZE_HINTS.iter().find(|n| s.contains(&n.to_string())) {
        score += size / 32;
    }

    if PENALIZED.iter().any(|p| s.contains(p)) {
        score -= 50;
    }

    score
}

/// Image-like paths ranked best first. Ties keep tree order.
pub fn rank_candidates<'a, I>(paths: I) -> Vec<ScoredCandidate>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<ScoredCandidate> = paths
        .into_iter()
        .filter(|p| is_image_like(p))
        .map(|p| ScoredCandidate {
            path: p.to_string(),
            score: score_path(p),
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Blob paths from a git tree listing
pub fn blob_paths(tree: &Value) -> Vec<&str> {
    tree.get("tree")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter(|e| e.get("type").and_then(Value::as_str) == Some("blob"))
                .filter_map(|e| e.get("path").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

pub struct RepositoryScanner<'a> {
    http: &'a dyn HttpFetch,
    api_base: &'a str,
    raw_base: &'a str,
    user_agent: &'a str,
}

impl<'a> RepositoryScanner<'a> {
    pub fn new(http: &'a dyn HttpFetch, api_base: &'a str, raw_base: &'a str, user_agent: &'a str) -> Self {
        Self {
            http,
            api_base,
            raw_base,
            user_agent,
        }
    }

    pub async fn resolve(&self, owner: &str, repo: &str) -> Result<RepositoryMatch, ResolveError> {
        if let Some(hit) = self.probe_known_paths(owner, repo).await {
            return Ok(hit);
        }
        info!(owner, repo, "no known icon path, scanning tree");
        self.scan_tree(owner, repo).await.map_err(|reason| ResolveError::NoIconInRepository {
            owner: owner.to_string(),
            repo: repo.to_string(),
            reason,
        })
    }

    fn headers(&self) -> [(&'a str, &'a str); 2] {
        [
            ("User-Agent", self.user_agent),
            ("Accept", "application/vnd.github+json"),
        ]
    }

    async fn probe_known_paths(&self, owner: &str, repo: &str) -> Option<RepositoryMatch> {
        let headers = self.headers();
        for rel in KNOWN_ICON_PATHS {
            let url = format!("{}/repos/{}/{}/contents/{}", self.api_base, owner, repo, rel);
            let download_url = match get_json(self.http, &url, &headers).await {
                Ok(json) => json.get("download_url").and_then(Value::as_str).map(str::to_string),
                Err(e) => {
                    debug!(path = rel, error = %e, "known path missing");
                    None
                }
            };
            if let Some(download_url) = download_url {
                return Some(RepositoryMatch {
                    path: rel.to_string(),
                    download_url,
                    phase: ScanPhase::KnownPath,
                });
            }
        }
        None
    }

    async fn scan_tree(&self, owner: &str, repo: &str) -> Result<RepositoryMatch, String> {
        let headers = self.headers();
        let info_url = format!("{}/repos/{}/{}", self.api_base, owner, repo);
        let info = get_json(self.http, &info_url, &headers)
            .await
            .map_err(|e| e.to_string())?;
        let branch = info
            .get("default_branch")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_BRANCH)
            .to_string();

        let tree_url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_base,
            owner,
            repo,
            urlencoding::encode(&branch)
        );
        let tree = get_json(self.http, &tree_url, &headers)
            .await
            .map_err(|e| e.to_string())?;

        let ranked = rank_candidates(blob_paths(&tree));
        let best = ranked.into_iter().next().ok_or_else(|| {
            format!(
                "tried {} known paths and a tree scan of {}",
                KNOWN_ICON_PATHS.len(),
                branch
            )
        })?;
        debug!(path = %best.path, score = best.score, "best tree candidate");

        Ok(RepositoryMatch {
            download_url: format!("{}/{}/{}/{}/{}", self.raw_base, owner, repo, branch, best.path),
            path: best.path,
            phase: ScanPhase::TreeScan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeHttp;
    use serde_json::json;

    const API: &str = "https://api.test";
    const RAW: &str = "https://raw.test";

    #[test]
    fn packaging_icon_outranks_screenshot() {
        let packaging = score_path("src-tauri/icons/icon.png");
        let screenshot = score_path("docs/screenshot.png");
        assert!(packaging > screenshot);

        let ranked = rank_candidates(["docs/screenshot.png", "src-tauri/icons/icon.png"]);
        assert_eq!(ranked[0].path, "src-tauri/icons/icon.png");
    }

    #[test]
    fn size_token_bonus_difference() {
        let big = score_path("assets/icon-512.png");
        let small = score_path("assets/icon-128.png");
        assert_eq!(big - small, 512 / 32 - 128 / 32);
        assert_eq!(big - small, 12);
    }

    #[test]
    fn only_largest_size_token_counts() {
        // "1024" wins and "512" is not added on top
        assert_eq!(score_path("a/1024-512.png") - score_path("a/x.png"), 32);
    }

    #[test]
    fn extension_bonuses_are_exclusive() {
        assert_eq!(score_path("x.png"), 30);
        assert_eq!(score_path("x.svg"), 18);
        assert_eq!(score_path("x.icns"), 8);
        assert_eq!(score_path("x.ico"), 8);
    }

    #[test]
    fn keyword_scores_accumulate() {
        // /icons/ +40, icon +20, .png +30
        assert_eq!(score_path("res/icons/a.png"), 90);
        // ic_launcher +45, .png +30
        assert_eq!(score_path("res/mipmap/ic_launcher.png"), 75);
        // logo +25, favicon +10, icon +20, .ico +8
        assert_eq!(score_path("web/favicon-logo.ico"), 63);
        assert_eq!(score_path("store/banner.png"), -20);
    }

    #[test]
    fn non_images_are_filtered() {
        let ranked = rank_candidates(["README.md", "icon.PNG", "ic_launcher.xml", "logo.svg"]);
        let paths: Vec<_> = ranked.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["icon.PNG", "logo.svg"]);
    }

    #[test]
    fn ties_keep_tree_order() {
        let ranked = rank_candidates(["a/one.png", "b/two.png"]);
        assert_eq!(ranked[0].path, "a/one.png");
    }

    #[test]
    fn blob_paths_skip_trees() {
        let tree = json!({ "tree": [
            { "path": "icons", "type": "tree" },
            { "path": "icons/a.png", "type": "blob" }
        ]});
        assert_eq!(blob_paths(&tree), ["icons/a.png"]);
    }

    #[tokio::test]
    async fn known_path_short_circuits_tree_scan() {
        let http = FakeHttp::new().with_json(
            &format!("{API}/repos/o/r/contents/assets/icon.png"),
            json!({ "download_url": "https://raw.test/o/r/main/assets/icon.png" }),
        );
        let scanner = RepositoryScanner::new(&http, API, RAW, "ua");

        let hit = scanner.resolve("o", "r").await.unwrap();
        assert_eq!(hit.phase, ScanPhase::KnownPath);
        assert_eq!(hit.download_url, "https://raw.test/o/r/main/assets/icon.png");

        let urls = http.requested_urls();
        assert!(!urls.iter().any(|u| u.contains("/git/trees/")));
        assert!(!urls.contains(&format!("{API}/repos/o/r")));
        assert_eq!(
            http.header_sent(&urls[0], "accept").as_deref(),
            Some("application/vnd.github+json")
        );
    }

    #[tokio::test]
    async fn falls_back_to_ranked_tree_scan() {
        let http = FakeHttp::new()
            .with_json(&format!("{API}/repos/o/r"), json!({ "default_branch": "dev" }))
            .with_json(
                &format!("{API}/repos/o/r/git/trees/dev?recursive=1"),
                json!({ "tree": [
                    { "path": "docs/screenshots/home.png", "type": "blob" },
                    { "path": "desktop/icons/app_icon_512.png", "type": "blob" },
                    { "path": "src/main.rs", "type": "blob" }
                ]}),
            );
        let scanner = RepositoryScanner::new(&http, API, RAW, "ua");

        let hit = scanner.resolve("o", "r").await.unwrap();
        assert_eq!(hit.phase, ScanPhase::TreeScan);
        assert_eq!(hit.download_url, "https://raw.test/o/r/dev/desktop/icons/app_icon_512.png");
        // every known path was probed first
        assert_eq!(http.requested_urls().len(), KNOWN_ICON_PATHS.len() + 2);
    }

    #[tokio::test]
    async fn missing_default_branch_uses_main() {
        let http = FakeHttp::new()
            .with_json(&format!("{API}/repos/o/r"), json!({}))
            .with_json(
                &format!("{API}/repos/o/r/git/trees/main?recursive=1"),
                json!({ "tree": [{ "path": "logo.svg", "type": "blob" }] }),
            );
        let scanner = RepositoryScanner::new(&http, API, RAW, "ua");

        let hit = scanner.resolve("o", "r").await.unwrap();
        assert_eq!(hit.download_url, "https://raw.test/o/r/main/logo.svg");
    }

    #[tokio::test]
    async fn tree_without_images_fails() {
        let http = FakeHttp::new()
            .with_json(&format!("{API}/repos/o/r"), json!({ "default_branch": "main" }))
            .with_json(
                &format!("{API}/repos/o/r/git/trees/main?recursive=1"),
                json!({ "tree": [{ "path": "README.md", "type": "blob" }] }),
            );
        let scanner = RepositoryScanner::new(&http, API, RAW, "ua");

        let err = scanner.resolve("o", "r").await.unwrap_err();
        assert!(matches!(err, ResolveError::NoIconInRepository { ref owner, .. } if owner == "o"));
    }
}
