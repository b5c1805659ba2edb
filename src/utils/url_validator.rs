//! URL 验证模块
//!
//! Checks a URL submitted for capture before anything is fetched.

use url::Url;

use crate::errors::LinkSaverError;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    UnsupportedScheme(String),
    MissingHost,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::UnsupportedScheme(scheme) => write!(
                f,
                "Unsupported scheme: {}. Only http:// and https:// pages can be saved",
                scheme
            ),
            Self::MissingHost => write!(f, "URL has no host"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl From<UrlValidationError> for LinkSaverError {
    fn from(err: UrlValidationError) -> Self {
        LinkSaverError::validation(err.to_string())
    }
}

/// Parse a page URL submitted for capture.
///
/// The URL must be non-empty, absolute, `http`/`https`, and name a host.
/// Fragments are dropped since they never reach the origin.
pub fn parse_source_url(url: &str) -> Result<Url, UrlValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let mut parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedScheme(format!(
            "{}:",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    parsed.set_fragment(None);
    Ok(parsed)
}
