use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LinkSaverError;

/// A captured page without its content blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    /// External identity of the owner
    pub owner: i64,
    pub original_url: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Listing row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkSummary {
    pub id: i64,
    pub original_url: String,
    pub description: String,
}

/// Captured page bytes and the encoding they are stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub bytes: Vec<u8>,
    /// WHATWG encoding name, e.g. `UTF-8` or `windows-1251`
    pub charset: String,
}

impl PageContent {
    pub fn new(bytes: Vec<u8>, charset: impl Into<String>) -> Self {
        Self {
            bytes,
            charset: charset.into(),
        }
    }

    /// `Content-Type` header value the page is served with.
    pub fn content_type(&self) -> String {
        format!("text/html; charset={}", self.charset)
    }
}

impl From<Vec<u8>> for PageContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "UTF-8")
    }
}

/// Returned by a delete so the caller can evict the matching cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedLink {
    pub original_url: String,
    pub owner: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}

/// Kind of shared static asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Script,
    Css,
    Image,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Script => "script",
            ResourceType::Css => "css",
            ResourceType::Image => "image",
        }
    }

    /// Content type served for a stored resource named `name`.
    pub fn content_type(&self, name: &str) -> &'static str {
        match self {
            ResourceType::Script => "application/javascript",
            ResourceType::Css => "text/css",
            ResourceType::Image => image_content_type(name),
        }
    }
}

fn image_content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = LinkSaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "script" => Ok(ResourceType::Script),
            "css" => Ok(ResourceType::Css),
            "image" => Ok(ResourceType::Image),
            other => Err(LinkSaverError::validation(format!(
                "unknown resource type: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_content_type_by_extension() {
        let image = ResourceType::Image;
        assert_eq!(image.content_type("abc.png"), "image/png");
        assert_eq!(image.content_type("abc.JPG"), "image/jpeg");
        assert_eq!(image.content_type("abc.jpeg"), "image/jpeg");
        assert_eq!(image.content_type("abc.gif"), "image/gif");
        assert_eq!(image.content_type("abc.webp"), "image/webp");
        assert_eq!(image.content_type("abc.svg"), "image/svg+xml");
        assert_eq!(image.content_type("abc.bmp"), "application/octet-stream");
        assert_eq!(image.content_type("abc"), "application/octet-stream");
    }

    #[test]
    fn test_script_and_css_ignore_extension() {
        assert_eq!(
            ResourceType::Script.content_type("x.png"),
            "application/javascript"
        );
        assert_eq!(ResourceType::Css.content_type("x"), "text/css");
    }

    #[test]
    fn test_page_content_type_carries_charset() {
        let page = PageContent::new(b"x".to_vec(), "windows-1251");
        assert_eq!(page.content_type(), "text/html; charset=windows-1251");

        let plain = PageContent::from(b"x".to_vec());
        assert_eq!(plain.content_type(), "text/html; charset=UTF-8");
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!("css".parse::<ResourceType>().unwrap(), ResourceType::Css);
        let err = "font".parse::<ResourceType>().unwrap_err();
        assert!(matches!(err, LinkSaverError::Validation(_)));
    }
}
