use crate::models::{
    ArticleBlock, BlockPatch, BlockTag, MetaField, MetaPatch, Patch, PatchOperation,
    PatchSummary, PositionHint, SeoArticle, StructuralPatch,
};
use std::collections::HashSet;
use thiserror::Error;

/// Why a single patch was not applied
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("Block '{0}' no longer exists")]
    BlockNotFound(String),

    #[error("Replacement text for {0} is empty")]
    EmptyReplacement(String),
}

/// Applies patch operations to a copy of an article
#[derive(Debug, Default, Clone, Copy)]
pub struct PatchApplier;

impl PatchApplier {
    pub fn new() -> Self {
        Self
    }

    /// Apply `operations` in order to a clone of `article`
    ///
    /// Each successful operation is marked `applied`; failures are logged and
    /// leave the operation unapplied. The input article is never touched.
    pub fn apply_patches(
        &self,
        article: &SeoArticle,
        operations: &mut [PatchOperation],
    ) -> SeoArticle {
        let mut patched = article.clone();

        for op in operations.iter_mut() {
            if op.applied {
                tracing::debug!(operation_id = %op.operation_id, "Patch already applied");
                continue;
            }

            let result = match &mut op.patch {
                Patch::BlockPatch(patch) => apply_block_patch(&mut patched, patch),
                Patch::MetaPatch(patch) => apply_meta_patch(&mut patched, patch),
                Patch::StructuralPatch(patch) => apply_structural_patch(&mut patched, patch),
            };

            match result {
                Ok(()) => {
                    op.applied = true;
                    tracing::debug!(operation_id = %op.operation_id, scope = %op.scope, "Applied patch");
                }
                Err(e) => {
                    tracing::warn!(operation_id = %op.operation_id, error = %e, "Patch not applied");
                }
            }
        }

        patched
    }

    pub fn summary(&self, operations: &[PatchOperation]) -> PatchSummary {
        PatchSummary::from_operations(operations)
    }
}

fn apply_block_patch(article: &mut SeoArticle, patch: &BlockPatch) -> Result<(), PatchError> {
    if patch.new_text.trim().is_empty() {
        return Err(PatchError::EmptyReplacement(patch.block_id.clone()));
    }
    let block = article
        .block_mut(&patch.block_id)
        .ok_or_else(|| PatchError::BlockNotFound(patch.block_id.clone()))?;
    block.set_text(patch.new_text.clone());
    Ok(())
}

fn apply_meta_patch(article: &mut SeoArticle, patch: &MetaPatch) -> Result<(), PatchError> {
    if patch.new_value.trim().is_empty() {
        return Err(PatchError::EmptyReplacement(patch.field.to_string()));
    }
    match patch.field {
        MetaField::Title => article.title = patch.new_value.clone(),
        MetaField::MetaDescription => article.meta_description = patch.new_value.clone(),
    }
    Ok(())
}

fn apply_structural_patch(
    article: &mut SeoArticle,
    patch: &mut StructuralPatch,
) -> Result<(), PatchError> {
    if patch.new_text.trim().is_empty() {
        return Err(PatchError::EmptyReplacement(patch.element_type.to_string()));
    }

    let id = fresh_block_id(&article.blocks, patch.element_type);
    let index = insert_index(&article.blocks, patch.position_hint);
    article
        .blocks
        .insert(index, ArticleBlock::new(id.clone(), patch.element_type, patch.new_text.clone()));

    patch.added_block_id = Some(id);
    patch.insert_index = Some(index);
    Ok(())
}

/// `<tag>-<count+1>`, probing `<tag>-<count+1>-<attempt>` until unused
pub fn fresh_block_id(blocks: &[ArticleBlock], tag: BlockTag) -> String {
    let existing: HashSet<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
    let count = blocks.iter().filter(|b| b.tag == tag).count();

    let base = format!("{}-{}", tag, count + 1);
    if !existing.contains(base.as_str()) {
        return base;
    }
    (1..)
        .map(|attempt| format!("{}-{}", base, attempt))
        .find(|candidate| !existing.contains(candidate.as_str()))
        .unwrap_or(base)
}

/// Insert position for a new block
pub fn insert_index(blocks: &[ArticleBlock], hint: PositionHint) -> usize {
    match hint {
        PositionHint::Beginning => 0,
        PositionHint::End => blocks.len(),
        PositionHint::AfterLastH2 => blocks
            .iter()
            .rposition(|b| b.tag == BlockTag::H2)
            .or_else(|| blocks.iter().position(|b| b.tag == BlockTag::H1))
            .map_or(blocks.len(), |i| i + 1),
        PositionHint::NearRelatedContent => blocks.len() * 2 / 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article() -> SeoArticle {
        SeoArticle::new("Title", "Meta").with_blocks(vec![
            ArticleBlock::new("h1-1", BlockTag::H1, "Heading"),
            ArticleBlock::new("p-1", BlockTag::P, "first paragraph"),
            ArticleBlock::new("h2-1", BlockTag::H2, "Section"),
            ArticleBlock::new("p-2", BlockTag::P, "second paragraph"),
            ArticleBlock::new("p-3", BlockTag::P, "third paragraph"),
            ArticleBlock::new("li-1", BlockTag::Li, "item"),
        ])
    }

    fn block_op(task: &str, block_id: &str, text: &str) -> PatchOperation {
        PatchOperation::new(
            task,
            Patch::BlockPatch(BlockPatch {
                block_id: block_id.into(),
                old_text: String::new(),
                new_text: text.into(),
                tag: BlockTag::P,
            }),
            "block",
        )
    }

    fn structural_op(task: &str, tag: BlockTag, hint: PositionHint) -> PatchOperation {
        PatchOperation::new(
            task,
            Patch::StructuralPatch(StructuralPatch {
                element_type: tag,
                new_text: "new content here".into(),
                position_hint: hint,
                added_block_id: None,
                insert_index: None,
            }),
            "structural",
        )
    }

    #[test]
    fn test_block_patch_is_local_and_copies() {
        let original = article();
        let mut ops = vec![block_op("fix-001", "p-2", "rewritten second paragraph text")];
        let patched = PatchApplier::new().apply_patches(&original, &mut ops);

        assert!(ops[0].applied);
        assert_eq!(original, article());
        let changed = patched.block("p-2").unwrap();
        assert_eq!(changed.text, "rewritten second paragraph text");
        assert_eq!(changed.word_count, Some(4));
        for (before, after) in original.blocks.iter().zip(&patched.blocks) {
            if before.id != "p-2" {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_failed_patches_do_not_stop_batch() {
        let mut ops = vec![
            block_op("fix-001", "p-404", "text"),
            block_op("fix-002", "p-1", "  "),
            PatchOperation::new(
                "fix-003",
                Patch::MetaPatch(MetaPatch {
                    field: MetaField::Title,
                    old_value: "Title".into(),
                    new_value: "New title".into(),
                }),
                "meta",
            ),
        ];
        let applier = PatchApplier::new();
        let patched = applier.apply_patches(&article(), &mut ops);

        assert_eq!(ops.iter().map(|o| o.applied).collect::<Vec<_>>(), vec![false, false, true]);
        assert_eq!(patched.title, "New title");
        assert_eq!(patched.blocks, article().blocks);

        let summary = applier.summary(&ops);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.by_scope.meta, 1);
    }

    #[test]
    fn test_insert_positions() {
        let blocks = article().blocks;
        assert_eq!(insert_index(&blocks, PositionHint::Beginning), 0);
        assert_eq!(insert_index(&blocks, PositionHint::End), 6);
        assert_eq!(insert_index(&blocks, PositionHint::AfterLastH2), 3);
        assert_eq!(insert_index(&blocks, PositionHint::NearRelatedContent), 4);

        let no_h2: Vec<_> = blocks.iter().filter(|b| b.tag != BlockTag::H2).cloned().collect();
        assert_eq!(insert_index(&no_h2, PositionHint::AfterLastH2), 1);

        let no_headings: Vec<_> = no_h2.iter().filter(|b| b.tag != BlockTag::H1).cloned().collect();
        assert_eq!(insert_index(&no_headings, PositionHint::AfterLastH2), 4);
    }

    #[test]
    fn test_structural_ids_probe_for_collisions() {
        let mut original = article();
        // "h2-2" already taken by an h3-looking block id
        original.blocks.push(ArticleBlock::new("h2-2", BlockTag::H3, "Sub"));

        let mut ops = vec![
            structural_op("fix-001", BlockTag::H2, PositionHint::AfterLastH2),
            structural_op("fix-002", BlockTag::H2, PositionHint::AfterLastH2),
            structural_op("fix-003", BlockTag::H1, PositionHint::Beginning),
        ];
        let patched = PatchApplier::new().apply_patches(&original, &mut ops);

        let added: Vec<String> = ops
            .iter()
            .map(|op| match &op.patch {
                Patch::StructuralPatch(p) => p.added_block_id.clone().unwrap(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(added, vec!["h2-2-1", "h2-3", "h1-2"]);
        assert_eq!(patched.blocks[0].id, "h1-2");

        let ids: HashSet<&str> = patched.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids.len(), patched.blocks.len());
    }

    #[test]
    fn test_applied_operations_are_skipped() {
        let mut ops = vec![block_op("fix-001", "p-1", "once")];
        let applier = PatchApplier::new();
        let first = applier.apply_patches(&article(), &mut ops);
        ops[0].patch = Patch::BlockPatch(BlockPatch {
            block_id: "p-1".into(),
            old_text: String::new(),
            new_text: "twice".into(),
            tag: BlockTag::P,
        });
        let second = applier.apply_patches(&first, &mut ops);
        assert_eq!(second.block("p-1").unwrap().text, "once");
    }
}
