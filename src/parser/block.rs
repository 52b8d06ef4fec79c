use super::inline;
use super::{ContentParser, DocumentView, Links, Locator, ParserMode, Segment};
use crate::models::{ArticleBlock, BlockTag, SeoArticle};
use std::collections::HashSet;

/// Parser over the article's own block list
pub struct BlockParser {
    blocks: Vec<ArticleBlock>,
    view: DocumentView,
}

impl BlockParser {
    /// Snapshot the article's blocks, filling in missing word counts
    pub fn new(article: &SeoArticle) -> Self {
        let mut blocks = article.blocks.clone();

        let mut seen = HashSet::new();
        for block in &mut blocks {
            if !seen.insert(block.id.clone()) {
                tracing::warn!(block_id = %block.id, "Duplicate block id, lookups use the first match");
            }
            if block.word_count.is_none() {
                block.word_count = Some(block.words());
            }
        }

        let segments = blocks
            .iter()
            .map(|block| Segment {
                locator: Locator::Block(block.id.clone()),
                tag: block.tag,
                text: block.text.clone(),
                word_count: block.words(),
            })
            .collect();

        let mut images = article.images.clone();
        images.extend(blocks.iter().flat_map(|b| inline::images(&b.text)));

        let links = Links::collect(blocks.iter().flat_map(|b| inline::hrefs(&b.text)));

        Self {
            view: DocumentView::build(segments, images, links),
            blocks,
        }
    }

    pub fn blocks(&self) -> &[ArticleBlock] {
        &self.blocks
    }
}

impl ContentParser for BlockParser {
    fn mode(&self) -> ParserMode {
        ParserMode::Block
    }

    fn view(&self) -> &DocumentView {
        &self.view
    }

    fn block_by_id(&self, block_id: &str) -> Option<&ArticleBlock> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    fn blocks_by_tag(&self, tag: BlockTag) -> Vec<&ArticleBlock> {
        self.blocks.iter().filter(|b| b.tag == tag).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleImage;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    fn sample() -> SeoArticle {
        SeoArticle::new("Title", "Meta")
            .with_blocks(vec![
                ArticleBlock::new("h1-1", BlockTag::H1, "Main heading"),
                ArticleBlock::new("p-1", BlockTag::P, "Too short caption"),
                ArticleBlock::new("p-2", BlockTag::P, words(12)),
                ArticleBlock::new("h2-1", BlockTag::H2, "Section"),
                ArticleBlock::new("li-1", BlockTag::Li, r#"See <a href="/guide">the guide</a>"#),
                ArticleBlock {
                    id: "p-3".to_string(),
                    tag: BlockTag::P,
                    text: r#"Photo <img src="x.png"> and <a href="https://example.com">source</a>"#
                        .to_string(),
                    word_count: None,
                },
            ])
    }

    #[test]
    fn test_first_paragraph_skips_short_blocks() {
        let parser = BlockParser::new(&sample());
        let first = parser.first_paragraph().unwrap();
        assert_eq!(first.block_id(), Some("p-2"));
    }

    #[test]
    fn test_first_paragraph_absent() {
        let article = SeoArticle::new("t", "m")
            .with_blocks(vec![ArticleBlock::new("p-1", BlockTag::P, "ten words or fewer here")]);
        let parser = BlockParser::new(&article);
        assert!(parser.first_paragraph().is_none());
    }

    #[test]
    fn test_clean_text_excludes_headings() {
        let parser = BlockParser::new(&sample());
        assert!(!parser.clean_text().contains("Main heading"));
        assert!(parser.clean_text().starts_with("Too short caption"));
        assert!(parser.clean_text().contains("the guide"));
    }

    #[test]
    fn test_headings_and_stats() {
        let parser = BlockParser::new(&sample());
        assert_eq!(parser.headings(BlockTag::H1).len(), 1);
        assert_eq!(parser.headings(BlockTag::H2)[0].block_id(), Some("h2-1"));
        assert!(parser.headings(BlockTag::H3).is_empty());

        let stats = parser.paragraph_stats();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[1].index, 2);
        assert_eq!(stats[1].word_count, 12);
        assert_eq!(stats[1].locator, Locator::Block("p-2".to_string()));
    }

    #[test]
    fn test_missing_word_count_is_filled() {
        let parser = BlockParser::new(&sample());
        let block = parser.block_by_id("p-3").unwrap();
        assert!(block.word_count.is_some());
    }

    #[test]
    fn test_inline_links_and_images() {
        let mut article = sample();
        article.images.push(ArticleImage {
            src: "hero.png".to_string(),
            alt: Some("Hero".to_string()),
        });
        let parser = BlockParser::new(&article);
        assert_eq!(parser.images().len(), 2);
        assert_eq!(parser.links().internal, vec!["/guide"]);
        assert_eq!(parser.links().external, vec!["https://example.com"]);
    }

    #[test]
    fn test_find_keyword_and_duplicates() {
        let mut article = sample();
        article
            .blocks
            .push(ArticleBlock::new("p-2", BlockTag::P, "duplicate id section text"));
        let parser = BlockParser::new(&article);

        let hits = parser.find_keyword_in_blocks("SECTION");
        let ids: Vec<_> = hits.iter().filter_map(|s| s.block_id()).collect();
        assert_eq!(ids, vec!["h2-1", "p-2"]);

        // first match wins on duplicate ids
        assert_eq!(parser.block_by_id("p-2").unwrap().words(), 12);
    }

    #[test]
    fn test_total_word_count_covers_all_blocks() {
        let article = SeoArticle::new("t", "m").with_blocks(vec![
            ArticleBlock::new("h1-1", BlockTag::H1, "one two"),
            ArticleBlock::new("p-1", BlockTag::P, "three four five"),
        ]);
        assert_eq!(BlockParser::new(&article).total_word_count(), 5);
    }
}
