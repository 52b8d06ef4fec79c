use super::inline;
use super::{ContentParser, DocumentView, Links, Locator, ParserMode, Segment};
use crate::models::{count_words, ArticleBlock, ArticleImage, BlockTag};

/// Legacy parser over a raw markup body. Nothing it returns is addressable.
pub struct MarkupParser {
    view: DocumentView,
}

impl MarkupParser {
    pub fn new(html: &str, extra_images: &[ArticleImage]) -> Self {
        let html = inline::strip_scripts(html);

        let segments = inline::elements(&html)
            .into_iter()
            .filter_map(|element| {
                let tag = BlockTag::parse(&element.tag)?;
                Some(Segment {
                    locator: Locator::Unaddressed,
                    tag,
                    word_count: count_words(&element.text),
                    text: element.text,
                })
            })
            .collect();

        let mut images = extra_images.to_vec();
        images.extend(inline::images(&html));

        let links = Links::collect(inline::hrefs(&html));

        Self {
            view: DocumentView::build(segments, images, links),
        }
    }
}

impl ContentParser for MarkupParser {
    fn mode(&self) -> ParserMode {
        ParserMode::Markup
    }

    fn view(&self) -> &DocumentView {
        &self.view
    }

    fn block_by_id(&self, _block_id: &str) -> Option<&ArticleBlock> {
        None
    }

    fn blocks_by_tag(&self, _tag: BlockTag) -> Vec<&ArticleBlock> {
        Vec::new()
    }
}
