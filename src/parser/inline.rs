//! Regex helpers for the small amount of markup the pipeline understands:
//! inline anchors and images inside block text, and the handful of elements
//! the markup-mode parser extracts.

use crate::models::ArticleImage;
use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid script/style regex")
});

static ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(h[1-4]|p|li)\b[^>]*>(.*?)</(?:h[1-4]|p|li)\s*>").expect("valid element regex")
});

static IMG_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid img regex"));

static ANCHOR_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid anchor regex")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)\b(src|alt)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid attribute regex")
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"));

static BLOCK_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(h[1-6]|p|li|ul|ol|div|section|article|table|tr|td|br|img|script|style)\b")
        .expect("valid block markup regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Element found by the markup scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    pub tag: String,
    pub text: String,
}

/// Remove `<script>` and `<style>` elements entirely
pub fn strip_scripts(html: &str) -> String {
    SCRIPT_STYLE.replace_all(html, " ").into_owned()
}

/// Heading, paragraph and list-item elements in document order
pub fn elements(html: &str) -> Vec<RawElement> {
    ELEMENT
        .captures_iter(html)
        .map(|caps| RawElement {
            tag: caps[1].to_lowercase(),
            text: plain_text(&caps[2]),
        })
        .filter(|element| !element.text.is_empty())
        .collect()
}

/// Drop tags, decode the common entities and collapse whitespace
pub fn plain_text(fragment: &str) -> String {
    let stripped = ANY_TAG.replace_all(fragment, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// `<img>` tags with their `src`/`alt` attributes
pub fn images(text: &str) -> Vec<ArticleImage> {
    IMG_TAG
        .find_iter(text)
        .map(|tag| {
            let mut image = ArticleImage {
                src: String::new(),
                alt: None,
            };
            for caps in ATTRIBUTE.captures_iter(tag.as_str()) {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                match caps[1].to_lowercase().as_str() {
                    "src" => image.src = value,
                    _ => image.alt = Some(value),
                }
            }
            image
        })
        .collect()
}

/// `href` values of every anchor
pub fn hrefs(text: &str) -> Vec<String> {
    ANCHOR_HREF
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Link classification; `None` for empty and `#` anchors
pub fn is_internal(href: &str) -> Option<bool> {
    let href = href.trim();
    if href.is_empty() || href == "#" {
        return None;
    }
    let lower = href.to_lowercase();
    Some(!(lower.starts_with("http://") || lower.starts_with("https://")))
}

/// True when text carries block-level markup (anything beyond inline anchors)
pub fn has_block_markup(text: &str) -> bool {
    BLOCK_MARKUP.is_match(text)
}
