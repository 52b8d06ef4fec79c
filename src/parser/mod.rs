//! Normalized views over an article.
//!
//! Two parsers implement [`ContentParser`]: [`BlockParser`] for block-addressed
//! articles and [`MarkupParser`] for the legacy raw-markup body. [`parser_for`]
//! picks one from the input once per analysis. Markup-mode locations are always
//! [`Locator::Unaddressed`], which degrades downstream issues to whole-article
//! scope.

pub mod block;
pub mod inline;
pub mod markup;

pub use block::BlockParser;
pub use markup::MarkupParser;

use crate::models::{ArticleBlock, ArticleImage, BlockTag, InputError, SeoArticle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Characters kept in a paragraph preview
pub const PREVIEW_CHARS: usize = 100;

/// Paragraphs at or below this many words are not treated as the opening paragraph
pub const FIRST_PARAGRAPH_MIN_WORDS: usize = 10;

/// Where a piece of content lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    Block(String),
    Unaddressed,
}

impl Locator {
    pub fn block_id(&self) -> Option<&str> {
        match self {
            Locator::Block(id) => Some(id),
            Locator::Unaddressed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserMode {
    Block,
    Markup,
}

impl ParserMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserMode::Block => "block",
            ParserMode::Markup => "markup",
        }
    }
}

impl fmt::Display for ParserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A located run of text (heading, paragraph, or list item)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub locator: Locator,
    pub tag: BlockTag,
    pub text: String,
    pub word_count: usize,
}

impl Segment {
    pub fn block_id(&self) -> Option<&str> {
        self.locator.block_id()
    }
}

/// Per-paragraph statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphStat {
    pub locator: Locator,
    /// 1-based position among paragraphs
    pub index: usize,
    pub word_count: usize,
    pub char_count: usize,
    pub preview: String,
}

/// Internal and external link targets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    pub internal: Vec<String>,
    pub external: Vec<String>,
}

impl Links {
    pub fn collect<I: IntoIterator<Item = String>>(hrefs: I) -> Self {
        let mut links = Self::default();
        for href in hrefs {
            match inline::is_internal(&href) {
                Some(true) => links.internal.push(href),
                Some(false) => links.external.push(href),
                None => {}
            }
        }
        links
    }
}

/// Cached views shared by both parser variants
#[derive(Debug, Clone, Default)]
pub struct DocumentView {
    segments: Vec<Segment>,
    clean_text: String,
    headings: BTreeMap<BlockTag, Vec<Segment>>,
    paragraphs: Vec<Segment>,
    first_paragraph: Option<usize>,
    total_words: usize,
    images: Vec<ArticleImage>,
    links: Links,
}

impl DocumentView {
    pub fn build(segments: Vec<Segment>, images: Vec<ArticleImage>, links: Links) -> Self {
        let clean_text = segments
            .iter()
            .filter(|s| s.tag.is_body())
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let mut headings: BTreeMap<BlockTag, Vec<Segment>> = BTreeMap::new();
        for tag in [BlockTag::H1, BlockTag::H2, BlockTag::H3, BlockTag::H4] {
            headings.insert(tag, Vec::new());
        }
        for segment in segments.iter().filter(|s| s.tag.is_heading()) {
            headings.entry(segment.tag).or_default().push(segment.clone());
        }

        let paragraphs: Vec<Segment> = segments
            .iter()
            .filter(|s| s.tag == BlockTag::P)
            .cloned()
            .collect();
        let first_paragraph = paragraphs
            .iter()
            .position(|p| p.word_count > FIRST_PARAGRAPH_MIN_WORDS);
        let total_words = segments.iter().map(|s| s.word_count).sum();

        Self {
            segments,
            clean_text,
            headings,
            paragraphs,
            first_paragraph,
            total_words,
            images,
            links,
        }
    }
}

/// The read-only contract every analyzer consumes
pub trait ContentParser: Send + Sync {
    fn mode(&self) -> ParserMode;

    fn view(&self) -> &DocumentView;

    /// Block lookup; always `None` in markup mode
    fn block_by_id(&self, block_id: &str) -> Option<&ArticleBlock>;

    /// Blocks with a tag; always empty in markup mode
    fn blocks_by_tag(&self, tag: BlockTag) -> Vec<&ArticleBlock>;

    /// All segments in document order
    fn segments(&self) -> &[Segment] {
        &self.view().segments
    }

    /// Paragraph and list-item text joined by spaces (headings excluded)
    fn clean_text(&self) -> &str {
        &self.view().clean_text
    }

    /// First paragraph with more than ten words
    fn first_paragraph(&self) -> Option<&Segment> {
        let view = self.view();
        view.first_paragraph.and_then(|i| view.paragraphs.get(i))
    }

    /// Headings of one level in document order
    fn headings(&self, tag: BlockTag) -> &[Segment] {
        self.view()
            .headings
            .get(&tag)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Heading tag name → heading texts
    fn heading_texts(&self) -> BTreeMap<String, Vec<String>> {
        self.view()
            .headings
            .iter()
            .map(|(tag, items)| {
                (
                    tag.as_str().to_string(),
                    items.iter().map(|s| s.text.clone()).collect(),
                )
            })
            .collect()
    }

    fn paragraphs(&self) -> &[Segment] {
        &self.view().paragraphs
    }

    fn paragraph_stats(&self) -> Vec<ParagraphStat> {
        self.paragraphs()
            .iter()
            .enumerate()
            .map(|(i, p)| ParagraphStat {
                locator: p.locator.clone(),
                index: i + 1,
                word_count: p.word_count,
                char_count: p.text.chars().count(),
                preview: preview(&p.text),
            })
            .collect()
    }

    /// Segments containing the keyword (case-insensitive substring)
    fn find_keyword_in_blocks(&self, keyword: &str) -> Vec<&Segment> {
        let needle = keyword.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.segments()
            .iter()
            .filter(|s| s.text.to_lowercase().contains(&needle))
            .collect()
    }

    /// Sum of word counts over all segments
    fn total_word_count(&self) -> usize {
        self.view().total_words
    }

    fn images(&self) -> &[ArticleImage] {
        &self.view().images
    }

    fn links(&self) -> &Links {
        &self.view().links
    }
}

/// Select the parser for an article: block mode when blocks exist, markup otherwise
pub fn parser_for(article: &SeoArticle) -> Result<Box<dyn ContentParser>, InputError> {
    article.validate()?;

    if !article.blocks.is_empty() {
        tracing::info!(blocks = article.blocks.len(), "Using block parser");
        return Ok(Box::new(BlockParser::new(article)));
    }

    match article.html_content.as_deref() {
        Some(html) => {
            tracing::info!("Using markup parser (no blocks supplied)");
            Ok(Box::new(MarkupParser::new(html, &article.images)))
        }
        None => Err(InputError::NoContent),
    }
}

/// Non-overlapping, case-insensitive occurrences of `keyword` in `text`
pub fn count_occurrences(text: &str, keyword: &str) -> usize {
    let needle = keyword.to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(&needle).count()
}

/// Paragraph with the highest local density of `keyword`; first wins on ties.
///
/// Used both to target `keyword_stuffing` issues and to route their fix tasks,
/// so the two stages always agree on the block.
pub fn keyword_hotspot<'a>(paragraphs: &'a [Segment], keyword: &str) -> Option<&'a Segment> {
    let mut best: Option<(&Segment, f64)> = None;
    for paragraph in paragraphs {
        if paragraph.word_count == 0 {
            continue;
        }
        let count = count_occurrences(&paragraph.text, keyword);
        if count == 0 {
            continue;
        }
        let density = count as f64 / paragraph.word_count as f64;
        match best {
            Some((_, top)) if density <= top => {}
            _ => best = Some((paragraph, density)),
        }
    }
    best.map(|(segment, _)| segment)
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(id: &str, text: &str) -> Segment {
        Segment {
            locator: Locator::Block(id.to_string()),
            tag: BlockTag::P,
            text: text.to_string(),
            word_count: crate::models::count_words(text),
        }
    }

    #[test]
    fn test_count_occurrences_is_case_insensitive() {
        assert_eq!(count_occurrences("Rust rust RUST trust", "rust"), 4);
        assert_eq!(count_occurrences("anything", ""), 0);
    }

    #[test]
    fn test_keyword_hotspot_prefers_local_density() {
        let paragraphs = vec![
            para("p-1", "seo seo one two three four five six seven eight"),
            para("p-2", "seo tips"),
            para("p-3", "nothing here"),
        ];
        let hot = keyword_hotspot(&paragraphs, "seo").unwrap();
        assert_eq!(hot.block_id(), Some("p-2"));
    }

    #[test]
    fn test_keyword_hotspot_first_wins_on_ties() {
        let paragraphs = vec![para("p-1", "seo word"), para("p-2", "seo word")];
        assert_eq!(keyword_hotspot(&paragraphs, "SEO").unwrap().block_id(), Some("p-1"));
        assert!(keyword_hotspot(&paragraphs, "absent").is_none());
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "x".repeat(150);
        let short = preview(&long);
        assert_eq!(short.chars().count(), PREVIEW_CHARS + 3);
        assert!(short.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_parser_for_rejects_empty_article() {
        let article = SeoArticle::new("t", "m");
        assert_eq!(parser_for(&article).err(), Some(InputError::NoContent));
    }

    #[test]
    fn test_links_collect() {
        let links = Links::collect(vec![
            "/a".to_string(),
            "#".to_string(),
            "http://b".to_string(),
        ]);
        assert_eq!(links.internal, vec!["/a"]);
        assert_eq!(links.external, vec!["http://b"]);
    }
}
