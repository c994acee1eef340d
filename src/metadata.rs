use serde_json::Value;
use tracing::debug;

use crate::error::ResolveError;
use crate::http::{HttpFetch, get_json};

pub const LOOKUP_COUNTRY: &str = "us";
pub const LOW_RES_TOKEN: &str = "100x100bb";
pub const HIGH_RES_TOKEN: &str = "512x512bb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkMatch {
    pub candidate: String,
    pub artwork_url: String,
}

/// Pull the best artwork URL out of a lookup response. `artworkUrl512` wins;
/// `artworkUrl100` is upgraded by swapping its size token.
pub fn artwork_from_lookup(json: &Value) -> Option<String> {
    let result = json.get("results")?.as_array()?.first()?;
    let field = |name: &str| result.get(name).and_then(Value::as_str).filter(|s| !s.is_empty());
    let art = field("artworkUrl512").or_else(|| field("artworkUrl100"))?;
    Some(art.replace(LOW_RES_TOKEN, HIGH_RES_TOKEN))
}

/// Tries each lookup id in order; the first one with artwork wins.
pub async fn resolve_artwork(
    http: &dyn HttpFetch,
    lookup_base: &str,
    candidates: &[String],
) -> Result<ArtworkMatch, ResolveError> {
    for candidate in candidates {
        let url = format!(
            "{}?id={}&country={}",
            lookup_base,
            urlencoding::encode(candidate),
            LOOKUP_COUNTRY
        );
        match get_json(http, &url, &[]).await {
            Ok(json) => match artwork_from_lookup(&json) {
                Some(artwork_url) => {
                    return Ok(ArtworkMatch {
                        candidate: candidate.clone(),
                        artwork_url,
                    });
                }
                None => debug!(candidate = %candidate, "lookup returned no artwork"),
            },
            Err(e) => debug!(candidate = %candidate, error = %e, "lookup failed"),
        }
    }
    Err(ResolveError::NoArtworkFound {
        candidates: candidates.to_vec(),
    })
}
