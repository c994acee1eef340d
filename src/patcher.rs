use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::FetcherConfig;
use crate::error::PatchError;

/// Tried in this order when looking for an icon on disk
pub const ICON_EXTENSIONS: [&str; 4] = [".png", ".svg", ".ico", ".icns"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub path: PathBuf,
    /// Allow-listed entries that got an `iconUrl`
    pub updated: usize,
}

/// Points `iconUrl` of allow-listed app entries at icons found on disk
pub struct ConfigPatcher<'a> {
    icons_dir: &'a Path,
    url_prefix: &'a str,
    allow_list: &'a [String],
}

impl<'a> ConfigPatcher<'a> {
    pub fn new(icons_dir: &'a Path, url_prefix: &'a str, allow_list: &'a [String]) -> Self {
        Self {
            icons_dir,
            url_prefix,
            allow_list,
        }
    }

    pub fn from_config(cfg: &'a FetcherConfig) -> Self {
        Self::new(&cfg.icons_dir, &cfg.icon_url_prefix, &cfg.allow_list)
    }

    pub fn resolve_icon_url(&self, id: &str) -> Option<String> {
        ICON_EXTENSIONS.iter().find_map(|ext| {
            let file = format!("{}{}", id, ext);
            self.icons_dir
                .join(&file)
                .is_file()
                .then(|| format!("{}{}", self.url_prefix, file))
        })
    }

    /// Handles both `{ config, platforms: { ios: [...] } }` and the legacy
    /// flat `{ ios: [...], android: [...] }` shape. Non-array values are left
    /// alone.
    pub fn patch_document(&self, doc: &mut Value) -> usize {
        let Some(root) = doc.as_object_mut() else {
            return 0;
        };
        let has_platforms = root.get("platforms").is_some_and(Value::is_object);
        let platforms = if has_platforms {
            match root.get_mut("platforms").and_then(Value::as_object_mut) {
                Some(p) => p,
                None => return 0,
            }
        } else {
            root
        };

        let mut updated = 0;
        for (platform, list) in platforms.iter_mut() {
            let Some(apps) = list.as_array_mut() else {
                continue;
            };
            for app in apps.iter_mut().filter_map(Value::as_object_mut) {
                let Some(id) = app.get("id").and_then(Value::as_str) else {
                    continue;
                };
                if !self.allow_list.iter().any(|allowed| allowed == id) {
                    continue;
                }
                let Some(icon_url) = self.resolve_icon_url(id) else {
                    debug!(platform = %platform, id, "no icon on disk");
                    continue;
                };
                app.insert("iconUrl".to_string(), Value::String(icon_url));
                updated += 1;
            }
        }
        updated
    }
}

/// 4-space indented JSON with a trailing newline
pub fn render_document(doc: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    doc.serialize(&mut ser)?;
    let mut out = String::from_utf8_lossy(&buf).into_owned();
    out.push('\n');
    Ok(out)
}

fn load_document(path: &Path) -> Result<Value, PatchError> {
    let raw = fs::read_to_string(path).map_err(|source| PatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_json::from_str(&raw).map_err(|source| PatchError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if !doc.is_object() {
        return Err(PatchError::NotAnObject {
            path: path.to_path_buf(),
        });
    }
    Ok(doc)
}

/// Patches every configured file. All files are read and patched in memory
/// before the first one is rewritten.
pub fn patch_files(cfg: &FetcherConfig) -> Result<Vec<PatchOutcome>, PatchError> {
    let patcher = ConfigPatcher::from_config(cfg);

    let mut rendered = Vec::with_capacity(cfg.config_paths.len());
    for path in &cfg.config_paths {
        let mut doc = load_document(path)?;
        let updated = patcher.patch_document(&mut doc);
        let text = render_document(&doc).map_err(|source| PatchError::Render {
            path: path.clone(),
            source,
        })?;
        rendered.push((path, text, updated));
    }

    let mut outcomes = Vec::with_capacity(rendered.len());
    for (path, text, updated) in rendered {
        fs::write(path, text).map_err(|source| PatchError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), updated, "updated iconUrl");
        outcomes.push(PatchOutcome {
            path: path.clone(),
            updated,
        });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn allow(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn setup(icons: &[&str]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("frontend/public/assets/apps-icons");
        fs::create_dir_all(&dir).unwrap();
        for name in icons {
            fs::write(dir.join(name), b"x").unwrap();
        }
        fs::create_dir_all(tmp.path().join("public/assets")).unwrap();
        tmp
    }

    #[test]
    fn extension_priority() {
        let tmp = setup(&["happ.svg", "happ.png", "stash.icns", "stash.ico"]);
        let icons = tmp.path().join("frontend/public/assets/apps-icons");
        let ids = allow(&["happ", "stash"]);
        let patcher = ConfigPatcher::new(&icons, "/assets/apps-icons/", &ids);

        assert_eq!(patcher.resolve_icon_url("happ").as_deref(), Some("/assets/apps-icons/happ.png"));
        assert_eq!(patcher.resolve_icon_url("stash").as_deref(), Some("/assets/apps-icons/stash.ico"));
        assert_eq!(patcher.resolve_icon_url("nope"), None);
    }

    #[test]
    fn legacy_flat_shape_with_svg_asset() {
        let tmp = setup(&["hiddify.svg"]);
        let icons = tmp.path().join("frontend/public/assets/apps-icons");
        let ids = allow(&["hiddify", "stash"]);
        let patcher = ConfigPatcher::new(&icons, "/assets/apps-icons/", &ids);

        let mut doc = json!({
            "ios": [
                { "id": "stash", "name": "Stash", "iconUrl": "/old/stash.png" },
                { "id": "custom", "name": "Custom" }
            ],
            "android": [
                { "id": "hiddify", "name": "Hiddify", "isFeatured": true }
            ]
        });
        let before = doc.clone();

        assert_eq!(patcher.patch_document(&mut doc), 1);
        assert_eq!(doc["android"][0]["iconUrl"], "/assets/apps-icons/hiddify.svg");
        assert_eq!(doc["android"][0]["isFeatured"], true);
        // no asset: existing iconUrl kept
        assert_eq!(doc["ios"], before["ios"]);
    }

    #[test]
    fn wrapper_shape_only_touches_platforms() {
        let tmp = setup(&["happ.png"]);
        let icons = tmp.path().join("frontend/public/assets/apps-icons");
        let ids = allow(&["happ"]);
        let patcher = ConfigPatcher::new(&icons, "/assets/apps-icons/", &ids);

        let mut doc = json!({
            "config": { "additionalLocales": ["ru"], "branding": { "name": "happ" } },
            "platforms": { "ios": [{ "id": "happ" }], "macos": [] }
        });
        assert_eq!(patcher.patch_document(&mut doc), 1);
        assert_eq!(doc["platforms"]["ios"][0]["iconUrl"], "/assets/apps-icons/happ.png");
        assert_eq!(doc["config"], json!({ "additionalLocales": ["ru"], "branding": { "name": "happ" } }));
    }

    #[test]
    fn ids_outside_allow_list_untouched() {
        let tmp = setup(&["rogue.png"]);
        let icons = tmp.path().join("frontend/public/assets/apps-icons");
        let ids = allow(&["happ"]);
        let patcher = ConfigPatcher::new(&icons, "/assets/apps-icons/", &ids);

        let mut doc = json!({ "ios": [{ "id": "rogue" }, "not-an-object", { "name": "no id" }] });
        let before = doc.clone();
        assert_eq!(patcher.patch_document(&mut doc), 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn renders_four_space_indent_and_keeps_key_order() {
        let doc: Value = serde_json::from_str(r#"{"zeta":1,"alpha":{"b":[1],"a":"x"}}"#).unwrap();
        assert_eq!(
            render_document(&doc).unwrap(),
            "{\n    \"zeta\": 1,\n    \"alpha\": {\n        \"b\": [\n            1\n        ],\n        \"a\": \"x\"\n    }\n}\n"
        );
    }

    #[test]
    fn patching_files_is_idempotent() {
        let tmp = setup(&["happ.png", "v2rayNG.svg"]);
        let cfg = FetcherConfig::for_root(tmp.path());
        let original = r#"{
  "platforms": {
    "android": [
      { "name": "v2rayNG", "id": "v2rayNG", "urlScheme": "v2rayng://install-config?url=" },
      { "id": "happ", "iconUrl": "/assets/apps-icons/happ.svg" }
    ]
  },
  "config": { "additionalLocales": [] }
}"#;
        for path in &cfg.config_paths {
            fs::write(path, original).unwrap();
        }

        let first = patch_files(&cfg).unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|o| o.updated == 2));
        let once = fs::read(&cfg.config_paths[0]).unwrap();

        patch_files(&cfg).unwrap();
        let twice = fs::read(&cfg.config_paths[0]).unwrap();
        assert_eq!(once, twice);

        let text = String::from_utf8(once).unwrap();
        assert!(text.starts_with("{\n    \"platforms\""));
        assert!(text.ends_with("}\n"));
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["platforms"]["android"][0]["iconUrl"], "/assets/apps-icons/v2rayNG.svg");
        assert_eq!(doc["platforms"]["android"][1]["iconUrl"], "/assets/apps-icons/happ.png");
    }

    #[test]
    fn bad_file_aborts_before_any_write() {
        let tmp = setup(&["happ.png"]);
        let cfg = FetcherConfig::for_root(tmp.path());
        let good = r#"{"ios":[{"id":"happ"}]}"#;
        fs::write(&cfg.config_paths[0], good).unwrap();
        fs::write(&cfg.config_paths[1], "{ broken").unwrap();

        let err = patch_files(&cfg).unwrap_err();
        assert!(matches!(err, PatchError::Parse { .. }));
        assert_eq!(fs::read_to_string(&cfg.config_paths[0]).unwrap(), good);
    }
}
