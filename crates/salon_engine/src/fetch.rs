use std::time::Duration;

use admin_logging::{admin_debug, admin_trace};
use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use salon_core::{Collection, ListFilter, PageRequest, PageResponse, Record};
use url::Url;

use crate::{FailureKind, FetchError, PageProgress};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the admin API, e.g. `https://api.example.com/admin/`.
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            auth_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn page_fetched(&self, progress: PageProgress);
}

/// Sink for callers that do not track progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn page_fetched(&self, _progress: PageProgress) {}
}

/// Capability to read one page of a list endpoint.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        collection: &Collection,
        request: PageRequest,
        filter: Option<&ListFilter>,
    ) -> Result<PageResponse<Record>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPageSource {
    client: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
    max_bytes: u64,
}

impl ReqwestPageSource {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let base_url = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            base_url,
            auth_token: settings.auth_token,
            max_bytes: settings.max_bytes,
        })
    }

    /// Full URL of one page request, query parameters included.
    pub fn page_url(
        &self,
        collection: &Collection,
        request: PageRequest,
        filter: Option<&ListFilter>,
    ) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(&collection.path())
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in request.query_pairs() {
                query.append_pair(key, &value);
            }
            if let Some(filter) = filter {
                for (key, value) in filter.query_pairs() {
                    query.append_pair(key, &value);
                }
            }
        }
        Ok(url)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<BytesMut, FetchError> {
        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(too_large(self.max_bytes, content_len));
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(too_large(self.max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
            admin_trace!("Read {} bytes so far", body.len());
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl PageSource for ReqwestPageSource {
    async fn fetch_page(
        &self,
        collection: &Collection,
        request: PageRequest,
        filter: Option<&ListFilter>,
    ) -> Result<PageResponse<Record>, FetchError> {
        let url = self.page_url(collection, request, filter)?;
        admin_debug!("GET {}", url);

        let mut builder = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(token) = &self.auth_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status(status));
        }

        let body = self.read_body(response).await?;
        let page: PageResponse<Record> = serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        admin_debug!(
            "{} page {} returned {} items (total {})",
            collection,
            request.page,
            page.items.len(),
            page.total
        );
        Ok(page)
    }
}

/// The base URL must end with `/` for endpoint paths to resolve beneath it.
fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(FetchError::new(
            FailureKind::InvalidUrl,
            format!("{raw} cannot be used as a base url"),
        ));
    }
    Ok(url)
}

fn map_status(status: StatusCode) -> FetchError {
    let kind = match status {
        StatusCode::UNAUTHORIZED => FailureKind::Unauthorized,
        StatusCode::FORBIDDEN => FailureKind::Forbidden,
        other => FailureKind::HttpStatus(other.as_u16()),
    };
    FetchError::new(kind, status.to_string())
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
