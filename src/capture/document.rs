//! Deferred attribute rewrites on the captured document.
//!
//! The parsed DOM is not `Send`, so asset tasks never touch it directly.
//! They push edits into an [`EditQueue`]; once every task has finished the
//! queue is drained into a fresh parse of the source and serialized.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use scraper::{Html, Node, Selector};

use super::assets::ASSET_SELECTOR;

/// Replace the reference attribute of the `slot`-th asset element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub slot: usize,
    pub value: String,
}

/// Mutex-guarded queue of pending rewrites shared by asset tasks.
#[derive(Debug, Clone, Default)]
pub struct EditQueue {
    inner: Arc<Mutex<Vec<Rewrite>>>,
}

impl EditQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, slot: usize, value: impl Into<String>) {
        self.inner.lock().push(Rewrite {
            slot,
            value: value.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every queued rewrite. Later pushes for the same slot win.
    pub fn drain(&self) -> HashMap<usize, String> {
        let edits = std::mem::take(&mut *self.inner.lock());
        edits.into_iter().map(|r| (r.slot, r.value)).collect()
    }
}

fn reference_attr(tag: &str) -> Option<&'static str> {
    match tag {
        "script" | "img" => Some("src"),
        "link" => Some("href"),
        _ => None,
    }
}

/// Parse `source`, apply `edits` by slot and serialize the result.
///
/// Returns `source` unchanged when there is nothing to apply.
pub fn apply_rewrites(source: &str, edits: &HashMap<usize, String>) -> String {
    if edits.is_empty() {
        return source.to_string();
    }

    let mut html = Html::parse_document(source);
    let selector = Selector::parse(ASSET_SELECTOR).expect("static selector");
    let targets: Vec<_> = html
        .select(&selector)
        .enumerate()
        .filter_map(|(slot, el)| edits.get(&slot).map(|value| (el.id(), value)))
        .collect();

    for (id, value) in targets {
        let Some(mut node) = html.tree.get_mut(id) else {
            continue;
        };
        if let Node::Element(element) = node.value() {
            let Some(attr) = reference_attr(element.name()) else {
                continue;
            };
            for (name, current) in element.attrs.iter_mut() {
                if &*name.local == attr {
                    *current = value.as_str().into();
                }
            }
        }
    }

    html.html()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drain_keeps_last_write() {
        let queue = EditQueue::new();
        queue.push(0, "/assets/script/a");
        queue.push(2, "/assets/image/b");
        queue.push(0, "/assets/script/c");
        assert_eq!(queue.len(), 3);

        let edits = queue.drain();

        assert!(queue.is_empty());
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[&0], "/assets/script/c");
    }

    #[test]
    fn test_apply_rewrites_targets_slots_only() {
        let source = r#"<html><head><script src="./s.js"></script></head><body><img src="https://cdn.other/x.png"><img src="/local.png"></body></html>"#;
        let mut edits = HashMap::new();
        edits.insert(0, "/assets/script/abc.js".to_string());
        edits.insert(2, "/assets/image/def.png".to_string());

        let out = apply_rewrites(source, &edits);

        assert!(out.contains(r#"<script src="/assets/script/abc.js">"#));
        assert!(out.contains(r#"<img src="https://cdn.other/x.png">"#));
        assert!(out.contains(r#"<img src="/assets/image/def.png">"#));
        assert!(!out.contains("./s.js"));
    }

    #[test]
    fn test_apply_rewrites_touches_only_reference_attr() {
        let source = r#"<html><head><link rel="stylesheet" href="/a.css" title="/a.css"></head></html>"#;
        let mut edits = HashMap::new();
        edits.insert(0, "/assets/css/x.css".to_string());

        let out = apply_rewrites(source, &edits);

        assert!(out.contains(r#"href="/assets/css/x.css""#));
        assert!(out.contains(r#"title="/a.css""#));
    }

    #[test]
    fn test_no_edits_returns_source_verbatim() {
        let source = "<p>not even a full document";
        assert_eq!(apply_rewrites(source, &HashMap::new()), source);
    }
}
