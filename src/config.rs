use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "appicon-fetcher.json";

pub const FETCHER_USER_AGENT: &str = "subscription-page-icon-fetcher";
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Ids the config patcher may touch
pub const DEFAULT_ALLOW_LIST: &[&str] = &[
    "clash-meta",
    "clash-mi",
    "clash-verge",
    "exclave",
    "flclashx",
    "happ",
    "hiddify",
    "koala-clash",
    "prizrak-box",
    "shadowrocket",
    "stash",
    "streisand",
    "v2rayNG",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub itunes_lookup: String,
    pub github_api: String,
    pub github_raw: String,
    pub play_store: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            itunes_lookup: "https://itunes.apple.com/lookup".to_string(),
            github_api: "https://api.github.com".to_string(),
            github_raw: "https://raw.githubusercontent.com".to_string(),
            play_store: "https://play.google.com/store/apps/details".to_string(),
        }
    }
}

/// Paths here may be relative; [`load_config`] anchors them on the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    #[serde(skip)]
    pub root: PathBuf,
    pub dest_dirs: Vec<PathBuf>,
    pub summary_path: PathBuf,
    pub config_paths: Vec<PathBuf>,
    pub icons_dir: PathBuf,
    pub icon_url_prefix: String,
    pub allow_list: Vec<String>,
    pub endpoints: Endpoints,
    pub user_agent: String,
    pub browser_user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dest_dirs: vec![
                PathBuf::from("frontend/public/assets/apps-icons"),
                PathBuf::from("public/assets/apps-icons"),
            ],
            summary_path: PathBuf::from("scripts/fetch-real-app-icons.result.json"),
            config_paths: vec![
                PathBuf::from("frontend/public/assets/app-config.json"),
                PathBuf::from("public/assets/app-config.json"),
            ],
            icons_dir: PathBuf::from("frontend/public/assets/apps-icons"),
            icon_url_prefix: "/assets/apps-icons/".to_string(),
            allow_list: DEFAULT_ALLOW_LIST.iter().map(|s| s.to_string()).collect(),
            endpoints: Endpoints::default(),
            user_agent: FETCHER_USER_AGENT.to_string(),
            browser_user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Defaults anchored on `root`
    pub fn for_root(root: &Path) -> Self {
        Self::default().anchored(root)
    }

    fn anchored(mut self, root: &Path) -> Self {
        self.root = root.to_path_buf();
        for dir in &mut self.dest_dirs {
            *dir = root.join(&*dir);
        }
        for path in &mut self.config_paths {
            *path = root.join(&*path);
        }
        self.summary_path = root.join(&self.summary_path);
        self.icons_dir = root.join(&self.icons_dir);
        self
    }

    pub fn log_dir(&self) -> PathBuf {
        self.summary_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone())
    }
}

/// Reads the explicit config file if given, else `appicon-fetcher.json` in
/// the root when it exists, else defaults.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<FetcherConfig, ConfigError> {
    let fallback = root.join(CONFIG_FILE_NAME);
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None if fallback.is_file() => Some(fallback),
        None => None,
    };

    let cfg = match source {
        Some(path) => {
            let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str::<FetcherConfig>(&raw)
                .map_err(|source| ConfigError::Parse { path, source })?
        }
        None => FetcherConfig::default(),
    };
    Ok(cfg.anchored(root))
}
