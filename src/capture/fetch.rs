//! HTTP fetching for the capture pipeline.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::CaptureConfig;
use crate::errors::{LinkSaverError, Result};

/// Body and final location of a successful fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// URL after redirects
    pub final_url: Url,
    /// `Content-Type` header as sent
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Source of page and asset bytes.
///
/// Errors follow the capture taxonomy: an origin 403 is
/// [`LinkSaverError::Forbidden`], every other failure (network, timeout,
/// non-2xx, oversized body) is [`LinkSaverError::InvalidSource`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Fetched>;
}

/// Map a non-success status onto the capture error taxonomy.
pub fn status_error(url: &Url, status: StatusCode) -> LinkSaverError {
    if status == StatusCode::FORBIDDEN {
        LinkSaverError::forbidden(format!("{} answered 403 Forbidden", url))
    } else {
        LinkSaverError::invalid_source(format!("{} answered status {}", url, status.as_u16()))
    }
}

/// reqwest-backed fetcher with a body size cap.
pub struct HttpFetcher {
    http: Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &CaptureConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| LinkSaverError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            max_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Fetched> {
        let start = Instant::now();

        let mut response = self
            .http
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(url, status));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.max_bytes
        {
            return Err(LinkSaverError::invalid_source(format!(
                "{}: {} bytes exceeds {}",
                url, len, self.max_bytes
            )));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(LinkSaverError::invalid_source(format!(
                    "{}: body exceeds {} bytes",
                    url, self.max_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            final_url,
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Fetched {
            final_url,
            content_type,
            bytes: body.freeze(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mapping() {
        let url = Url::parse("https://a.example/p").unwrap();
        assert!(matches!(
            status_error(&url, StatusCode::FORBIDDEN),
            LinkSaverError::Forbidden(_)
        ));
        assert!(matches!(
            status_error(&url, StatusCode::NOT_FOUND),
            LinkSaverError::InvalidSource(_)
        ));
        assert!(matches!(
            status_error(&url, StatusCode::INTERNAL_SERVER_ERROR),
            LinkSaverError::InvalidSource(_)
        ));
    }

    #[test]
    fn test_http_fetcher_builds_from_defaults() {
        assert!(HttpFetcher::new(&CaptureConfig::default()).is_ok());
    }
}
