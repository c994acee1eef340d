use crate::models::{AppId, SourceDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub app: AppId,
    pub sources: Vec<SourceDescriptor>,
}

impl CatalogEntry {
    pub fn new(app: &str, sources: Vec<SourceDescriptor>) -> Self {
        Self {
            app: AppId::from(app),
            sources,
        }
    }
}

/// Ordered application catalog. Order only affects progress output and the
/// summary layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, app: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.app.as_str() == app)
    }

    /// The clients shown on the subscription page
    pub fn builtin() -> Self {
        use SourceDescriptor as S;

        Self::new(vec![
            CatalogEntry::new(
                "happ",
                vec![
                    S::metadata(["6504287215", "6746188973"]),
                    S::storefront("com.happproxy"),
                    S::repository("Happ-proxy", "happ-android"),
                ],
            ),
            CatalogEntry::new("stash", vec![S::metadata(["1596063349"])]),
            CatalogEntry::new("streisand", vec![S::metadata(["6450534064"])]),
            CatalogEntry::new("shadowrocket", vec![S::metadata(["932747118"])]),
            CatalogEntry::new("clash-mi", vec![S::metadata(["6744321968"])]),
            // Android / desktop open-source clients
            CatalogEntry::new("v2rayNG", vec![S::repository("2dust", "v2rayNG")]),
            CatalogEntry::new(
                "clash-meta",
                vec![S::repository("MetaCubeX", "ClashMetaForAndroid")],
            ),
            CatalogEntry::new("hiddify", vec![S::storefront("com.vpn4tv.hiddify")]),
            CatalogEntry::new("exclave", vec![S::repository("dyhkwong", "Exclave")]),
            CatalogEntry::new("flclashx", vec![S::repository("pluralplay", "FlClashX")]),
            CatalogEntry::new(
                "koala-clash",
                vec![S::repository("coolcoala", "clash-verge-rev-lite")],
            ),
            CatalogEntry::new("prizrak-box", vec![S::repository("legiz-ru", "Prizrak-Box")]),
            CatalogEntry::new(
                "clash-verge",
                vec![S::repository("clash-verge-rev", "clash-verge-rev")],
            ),
        ])
    }
}
