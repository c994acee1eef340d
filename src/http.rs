use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

/// Buffered HTTP response. Bodies here are small (JSON, HTML, one icon), so
/// the whole body is read before the caller sees it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// GET-only client used by every resolver and the downloader.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, FetchError>;
}

/// GET that fails on any non-2xx status
pub async fn get_ok(
    http: &dyn HttpFetch,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<HttpResponse, FetchError> {
    let response = http.get(url, headers).await?;
    if !response.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }
    Ok(response)
}

pub async fn get_json(
    http: &dyn HttpFetch,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<Value, FetchError> {
    let response = get_ok(http, url, headers).await?;
    response.json().map_err(|e| FetchError::Json {
        url: url.to_string(),
        message: e.to_string(),
    })
}

pub async fn get_text(
    http: &dyn HttpFetch,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<String, FetchError> {
    Ok(get_ok(http, url, headers).await?.text())
}

/// reqwest-backed client
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!(url, status, bytes = body.len(), "GET");
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
