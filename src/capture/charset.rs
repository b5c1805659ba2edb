//! Character encoding of fetched pages.
//!
//! Precedence follows the browser order: byte order mark, then the
//! `Content-Type` charset, then a `<meta>` declaration near the top of the
//! document, then UTF-8.

use encoding_rs::{Encoding, UTF_8};

/// How far into the document a `<meta>` charset declaration is looked for.
const PRESCAN_BYTES: usize = 1024;

/// Encoding `bytes` should be decoded with.
pub fn sniff(bytes: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if let Some(encoding) = content_type.and_then(|value| charset_param(value.as_bytes())) {
        return encoding;
    }
    // a page cannot declare itself UTF-16 from inside an ASCII-compatible prefix
    prescan(bytes).map(Encoding::output_encoding).unwrap_or(UTF_8)
}

fn prescan(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = bytes[..bytes.len().min(PRESCAN_BYTES)].to_ascii_lowercase();
    let mut rest = head.as_slice();
    while let Some(start) = find(rest, b"<meta") {
        let tag = &rest[start + 5..];
        let end = tag.iter().position(|&b| b == b'>').unwrap_or(tag.len());
        if let Some(encoding) = charset_param(&tag[..end]) {
            return Some(encoding);
        }
        rest = &tag[end..];
    }
    None
}

/// First `charset=<label>` in `text` naming a known encoding.
fn charset_param(text: &[u8]) -> Option<&'static Encoding> {
    let mut rest = text;
    while let Some(at) = find_ignore_case(rest, b"charset") {
        rest = &rest[at + 7..];
        let Some(value) = rest.trim_ascii_start().strip_prefix(b"=") else {
            continue;
        };
        let value = value.trim_ascii_start();
        let value = match value.first() {
            Some(b'"' | b'\'') => &value[1..],
            _ => value,
        };
        let end = value
            .iter()
            .position(|&b| is_label_end(b))
            .unwrap_or(value.len());
        if let Some(encoding) = Encoding::for_label(&value[..end]) {
            return Some(encoding);
        }
    }
    None
}

fn is_label_end(b: u8) -> bool {
    matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn find_ignore_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_utf8() {
        assert_eq!(sniff(b"<html><p>hi</p></html>", None), UTF_8);
        assert_eq!(sniff(b"", Some("text/html")), UTF_8);
    }

    #[test]
    fn test_meta_charset_attribute() {
        let page = b"<html><head><meta charset=\"windows-1251\"></head></html>";
        assert_eq!(sniff(page, None).name(), "windows-1251");

        let bare = b"<meta charset=koi8-r><p>x</p>";
        assert_eq!(sniff(bare, None).name(), "KOI8-R");
    }

    #[test]
    fn test_meta_http_equiv_content() {
        let page = b"<HEAD><META HTTP-EQUIV=\"Content-Type\" \
            CONTENT=\"text/html; charset=Shift_JIS\"></HEAD>";
        assert_eq!(sniff(page, None).name(), "Shift_JIS");
    }

    #[test]
    fn test_header_wins_over_meta() {
        let page = b"<meta charset=\"windows-1251\">";
        let encoding = sniff(page, Some("text/html; charset=ISO-8859-2"));
        assert_eq!(encoding.name(), "ISO-8859-2");
    }

    #[test]
    fn test_bom_wins_over_header() {
        let page = b"\xEF\xBB\xBF<meta charset=\"windows-1251\">";
        assert_eq!(sniff(page, Some("text/html; charset=windows-1252")), UTF_8);
    }

    #[test]
    fn test_unknown_labels_are_ignored() {
        let page = b"<meta charset=\"no-such-thing\"><meta charset=\"windows-1250\">";
        let encoding = sniff(page, Some("text/html; charset=bogus"));
        assert_eq!(encoding.name(), "windows-1250");
    }

    #[test]
    fn test_meta_utf16_means_utf8() {
        assert_eq!(sniff(b"<meta charset=\"utf-16le\">", None), UTF_8);
    }

    #[test]
    fn test_declaration_past_prescan_window_is_ignored() {
        let mut page = vec![b' '; PRESCAN_BYTES];
        page.extend_from_slice(b"<meta charset=\"windows-1251\">");
        assert_eq!(sniff(&page, None), UTF_8);
    }
}
