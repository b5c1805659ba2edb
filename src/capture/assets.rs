//! Asset discovery and content addressing.

use std::collections::HashMap;

use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use url::Url;

use crate::storage::ResourceType;

/// Elements whose reference attribute may be rewritten, in document order.
///
/// `rel` keywords are ASCII case-insensitive, hence the `i` flag.
pub(crate) const ASSET_SELECTOR: &str = "script[src], link[rel~=stylesheet i][href], img[src]";

/// One asset to fetch; `slots` are the matching elements that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetJob {
    pub kind: ResourceType,
    pub url: Url,
    pub address: String,
    pub slots: Vec<usize>,
}

impl AssetJob {
    /// Serving path of the stored copy under `prefix`
    pub fn serving_path(&self, prefix: &str) -> String {
        serving_path(prefix, self.kind, &self.address)
    }
}

/// Result of scanning a document.
#[derive(Debug, Default)]
pub struct Scan {
    pub jobs: Vec<AssetJob>,
    /// References left untouched: cross-origin, non-fetchable, or over the cap
    pub skipped: usize,
}

/// `{prefix}/assets/{type}/{address}`; `prefix` comes from [`mount_prefix`].
pub fn serving_path(prefix: &str, kind: ResourceType, address: &str) -> String {
    format!("{}/assets/{}/{}", prefix, kind, address)
}

/// Path the service is mounted under, taken from its public base URL.
///
/// Empty for a root mount, otherwise the path without a trailing slash.
pub fn mount_prefix(base_url: &str) -> String {
    Url::parse(base_url)
        .map(|url| url.path().trim_end_matches('/').to_string())
        .unwrap_or_default()
}

/// Content address for an asset: `hex(sha256("{type}:{relative path}"))`
/// followed by the path's file extension, if it has a short one.
pub fn content_address(kind: ResourceType, relative_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", kind, relative_path).as_bytes());
    let digest = hex::encode(hasher.finalize());

    match extension(relative_path) {
        Some(ext) => format!("{}.{}", digest, ext),
        None => digest,
    }
}

fn extension(relative_path: &str) -> Option<String> {
    let path = relative_path.split(['?', '#']).next().unwrap_or_default();
    let file = path.rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 8 {
        return None;
    }
    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then(|| ext.to_ascii_lowercase())
}

/// Path plus query of `url`, which is what identifies an asset on its origin.
pub fn relative_path(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

fn kind_of(tag: &str) -> Option<(ResourceType, &'static str)> {
    match tag {
        "script" => Some((ResourceType::Script, "src")),
        "link" => Some((ResourceType::Css, "href")),
        "img" => Some((ResourceType::Image, "src")),
        _ => None,
    }
}

/// Resolve a raw attribute value, keeping it only if it stays on `origin`.
fn qualify(raw: &str, base: &Url, page: &Url) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let resolved = base.join(raw).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    (resolved.origin() == page.origin()).then_some(resolved)
}

/// Document base: the first `<base href>` resolved against the page URL.
pub fn document_base(html: &Html, page: &Url) -> Url {
    let selector = Selector::parse("base[href]").expect("static selector");
    html.select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| page.join(href.trim()).ok())
        .unwrap_or_else(|| page.clone())
}

/// Find same-origin assets in `source`, grouped by content address.
///
/// At most `max_assets` distinct assets are returned; references to any
/// further asset count as skipped.
pub fn scan(source: &str, page: &Url, max_assets: usize) -> Scan {
    let html = Html::parse_document(source);
    let base = document_base(&html, page);
    let selector = Selector::parse(ASSET_SELECTOR).expect("static selector");

    let mut scan = Scan::default();
    let mut by_address: HashMap<String, usize> = HashMap::new();

    for (slot, element) in html.select(&selector).enumerate() {
        let Some((kind, attr)) = kind_of(element.value().name()) else {
            continue;
        };
        let Some(url) = element
            .value()
            .attr(attr)
            .and_then(|raw| qualify(raw, &base, page))
        else {
            scan.skipped += 1;
            continue;
        };

        let address = content_address(kind, &relative_path(&url));
        if let Some(&index) = by_address.get(&address) {
            scan.jobs[index].slots.push(slot);
            continue;
        }
        if scan.jobs.len() >= max_assets {
            scan.skipped += 1;
            continue;
        }

        by_address.insert(address.clone(), scan.jobs.len());
        scan.jobs.push(AssetJob {
            kind,
            url,
            address,
            slots: vec![slot],
        });
    }

    scan
}
