use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ResolveError;
use crate::http::{HttpFetch, get_text};

static OG_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"property="og:image" content="([^"]+)""#).expect("og:image pattern"));

/// Content of the first `og:image` meta tag. Only this one pattern is
/// matched; the page is never parsed as a DOM.
pub fn extract_preview_image(html: &str) -> Option<String> {
    OG_IMAGE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub async fn resolve_preview_image(
    http: &dyn HttpFetch,
    store_base: &str,
    browser_user_agent: &str,
    package: &str,
) -> Result<String, ResolveError> {
    let url = format!(
        "{}?id={}&hl=en&gl=US",
        store_base,
        urlencoding::encode(package)
    );
    let not_found = |reason: String| ResolveError::PreviewImageNotFound {
        package: package.to_string(),
        reason,
    };

    let html = get_text(http, &url, &[("User-Agent", browser_user_agent)])
        .await
        .map_err(|e| not_found(e.to_string()))?;
    extract_preview_image(&html).ok_or_else(|| not_found("no og:image meta tag".to_string()))
}
