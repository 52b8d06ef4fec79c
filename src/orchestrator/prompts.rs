//! Prompt templates for the rewrite capability
//!
//! Every prompt ends with a strict single-object JSON contract. Replies are
//! parsed by the fix resolver; anything else is treated as a failed task.

use crate::models::{BlockTag, IssueKind, MetaField};

/// Name used for an element type in the structural JSON contract
pub fn element_name(tag: BlockTag) -> &'static str {
    match tag {
        BlockTag::P => "paragraph",
        other => other.as_str(),
    }
}

fn keyword_list(keywords: &[String]) -> String {
    if keywords.is_empty() {
        "(none)".to_string()
    } else {
        keywords
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Rewrite exactly one existing block
pub fn block_fix_prompt(
    block_id: &str,
    tag: BlockTag,
    keyword: Option<&str>,
    current_text: &str,
    recommendation: &str,
) -> String {
    let heading_rule = if tag.is_heading() {
        format!(
            "6. This block is an {} heading: keep it a single line, no line breaks",
            tag.as_str().to_uppercase()
        )
    } else {
        "6. Keep it a single paragraph of running text".to_string()
    };

    format!(
        r#"You are an SEO editor rewriting one block of an article.

## Task
Edit EXACTLY one block so it satisfies the requirement below.

## Block
- Block ID: {block_id}
- Tag: {tag}
- Keyword: "{keyword}"
- Current text: "{current_text}"

## Requirement
{recommendation}

## Rules
1. Edit only this block, never any other block
2. Keep the meaning and the important facts
3. Keep the tone and style
4. Plain text only: no HTML tags or markdown (inline <a> links already present may stay)
5. Do not create or delete blocks
{heading_rule}
7. The keyword must read naturally, do not stuff it

## Output (single JSON object)
{{
    "block_id": "{block_id}",
    "new_text": "the rewritten text"
}}

Return only the JSON object, no explanation.
"#,
        block_id = block_id,
        tag = tag,
        keyword = keyword.unwrap_or(""),
        current_text = current_text,
        recommendation = recommendation,
        heading_rule = heading_rule,
    )
}

/// Lower a keyword's frequency inside one block
pub fn keyword_reduction_prompt(
    block_id: &str,
    current_text: &str,
    keyword: &str,
    recommendation: &str,
) -> String {
    format!(
        r#"You are an SEO editor removing keyword stuffing.

## Task
Reduce how often the keyword "{keyword}" appears in this block while keeping its meaning.

## Block
- Block ID: {block_id}
- Current text: "{current_text}"

## Requirement
{recommendation}

## Rules
1. Keep the meaning and the important facts
2. Use fewer occurrences of the keyword
3. Replace repeats with synonyms or rephrasing
4. Keep the tone and style
5. Plain text only: no HTML tags or markdown

## Output (single JSON object)
{{
    "block_id": "{block_id}",
    "new_text": "the rewritten text"
}}

Return only the JSON object, no explanation.
"#,
        block_id = block_id,
        current_text = current_text,
        keyword = keyword,
        recommendation = recommendation,
    )
}

/// Rewrite the title or meta description
pub fn meta_fix_prompt(
    field: MetaField,
    current_value: &str,
    recommendation: &str,
    keywords: &[String],
) -> String {
    let (min, max) = field.length_contract();
    let label = match field {
        MetaField::Title => "title",
        MetaField::MetaDescription => "meta description",
    };

    format!(
        r#"You are an SEO editor rewriting the article {label}.

## Current
- Current {label}: "{current_value}"
- Main keywords: {keywords}

## Requirement
{recommendation}

## Rules
1. Length: {min}-{max} characters
2. Title: main keyword near the start. Meta description: include the keyword and a call to action
3. Keep the article's main message
4. Natural and compelling, no keyword spam
5. Plain text only, one line

## Output (single JSON object)
{{
    "field": "{field}",
    "new_value": "the new value"
}}

Return only the JSON object, no explanation.
"#,
        label = label,
        current_value = current_value,
        keywords = keyword_list(keywords),
        recommendation = recommendation,
        min = min,
        max = max,
        field = field.as_str(),
    )
}

/// Request one new element for the article
pub fn structural_fix_prompt(
    kind: IssueKind,
    element: BlockTag,
    recommendation: &str,
    article_title: &str,
    keywords: &[String],
) -> String {
    let description = match kind {
        IssueKind::MissingH1 => "the main H1 heading",
        IssueKind::FewH2 => "an H2 section heading",
        IssueKind::NoInternalLinks => "a paragraph that links to related pages on the same site",
        _ => "a paragraph that adds substantive content",
    };

    format!(
        r#"You are an SEO writer adding new content to an article.

## Task
Write {description} for this article.

## Article
- Title: "{article_title}"
- Keywords: {keywords}

## Requirement
{recommendation}

## Rules
1. Fit the context of the article
2. Include the main keyword naturally
3. Professional, engaging tone
4. Length: H1 5-10 words, H2 5-8 words, paragraph 50-100 words
5. Do not repeat existing content
6. Plain text only; a paragraph may contain inline <a href="/..."> links, nothing else

## Output (single JSON object)
{{
    "element_type": "{element}",
    "new_text": "the new content"
}}

Return only the JSON object, no explanation.
"#,
        description = description,
        article_title = article_title,
        keywords = keyword_list(keywords),
        recommendation = recommendation,
        element = element_name(element),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_prompt_carries_contract() {
        let prompt = block_fix_prompt(
            "h2-1",
            BlockTag::H2,
            Some("rust"),
            "Getting started",
            "Add keyword 'rust' to this H2 heading",
        );
        assert!(prompt.contains("Block ID: h2-1"));
        assert!(prompt.contains("\"block_id\": \"h2-1\""));
        assert!(prompt.contains("single line"));
        assert!(prompt.contains("Keyword: \"rust\""));
    }

    #[test]
    fn test_meta_prompt_length_contract() {
        let prompt = meta_fix_prompt(
            MetaField::MetaDescription,
            "Short",
            "Expand it",
            &["rust".to_string()],
        );
        assert!(prompt.contains("120-160 characters"));
        assert!(prompt.contains("\"field\": \"meta_description\""));
    }

    #[test]
    fn test_structural_prompt_names_paragraph() {
        let prompt = structural_fix_prompt(
            IssueKind::NoInternalLinks,
            BlockTag::P,
            "Add internal links",
            "Title",
            &[],
        );
        assert!(prompt.contains("\"element_type\": \"paragraph\""));
        assert!(prompt.contains("Keywords: (none)"));
    }
}
