use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic role of a content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    H1,
    H2,
    H3,
    H4,
    P,
    Li,
}

impl BlockTag {
    /// Tag name as it appears in block ids and markup
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::H1 => "h1",
            BlockTag::H2 => "h2",
            BlockTag::H3 => "h3",
            BlockTag::H4 => "h4",
            BlockTag::P => "p",
            BlockTag::Li => "li",
        }
    }

    /// Parse a tag name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "h1" => Some(BlockTag::H1),
            "h2" => Some(BlockTag::H2),
            "h3" => Some(BlockTag::H3),
            "h4" => Some(BlockTag::H4),
            "p" | "paragraph" => Some(BlockTag::P),
            "li" => Some(BlockTag::Li),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, BlockTag::H1 | BlockTag::H2 | BlockTag::H3 | BlockTag::H4)
    }

    /// Paragraph-like blocks contribute to body text (density, readability)
    pub fn is_body(&self) -> bool {
        matches!(self, BlockTag::P | BlockTag::Li)
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whitespace-split token count
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Atomic content unit of an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleBlock {
    /// Unique id within the article (e.g., "h2-3")
    pub id: String,

    /// Semantic role
    pub tag: BlockTag,

    /// Plain text, possibly with inline anchor tags
    pub text: String,

    /// Derived from `text` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
}

impl ArticleBlock {
    pub fn new(id: impl Into<String>, tag: BlockTag, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            tag,
            word_count: Some(count_words(&text)),
            text,
        }
    }

    /// Word count, computing it from the text if it was never set
    pub fn words(&self) -> usize {
        self.word_count.unwrap_or_else(|| count_words(&self.text))
    }

    /// Replace the text and recompute the word count
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.word_count = Some(count_words(&self.text));
    }
}

/// Image attached to an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleImage {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ArticleImage {
    pub fn has_alt(&self) -> bool {
        self.alt.as_deref().map_or(false, |alt| !alt.trim().is_empty())
    }
}

/// The aggregate under analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoArticle {
    pub title: String,

    pub meta_description: String,

    /// Ordered content blocks (document order)
    #[serde(default)]
    pub blocks: Vec<ArticleBlock>,

    /// Legacy raw markup body, used only when no blocks are present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,

    /// Target phrases, matched case-insensitively
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ArticleImage>,
}

impl SeoArticle {
    pub fn new(title: impl Into<String>, meta_description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            meta_description: meta_description.into(),
            blocks: Vec::new(),
            html_content: None,
            keywords: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<ArticleBlock>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_content = Some(html.into());
        self
    }

    pub fn block(&self, block_id: &str) -> Option<&ArticleBlock> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    pub fn block_mut(&mut self, block_id: &str) -> Option<&mut ArticleBlock> {
        self.blocks.iter_mut().find(|b| b.id == block_id)
    }

    /// First block carrying the given tag
    pub fn first_block(&self, tag: BlockTag) -> Option<&ArticleBlock> {
        self.blocks.iter().find(|b| b.tag == tag)
    }

    /// Check that the article has something to analyze
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.blocks.is_empty() {
            if self.blocks.iter().all(|b| b.text.trim().is_empty()) {
                return Err(InputError::EmptyContent);
            }
            return Ok(());
        }

        match self.html_content.as_deref() {
            Some(html) if !html.trim().is_empty() => Ok(()),
            Some(_) => Err(InputError::EmptyContent),
            None => Err(InputError::NoContent),
        }
    }
}

/// Article rejected before analysis begins
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Article must have either blocks or html_content")]
    NoContent,

    #[error("Article content is empty")]
    EmptyContent,
}
