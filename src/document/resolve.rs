/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Alias and merge key resolution.
//!
//! Two passes over a built tree. First every alias node is
//! replaced, in declaration order, by a structural copy of
//! its anchor's target; since YAML forbids forward
//! references, processing in stream order guarantees a
//! target never contains an unresolved alias when it is
//! copied. Second, `<<` merge pairs are expanded: the
//! referenced mappings' pairs are spliced in after the
//! merge pair in declaration order, first writer wins, and
//! the merge pair is removed.

use crate::{
    document::{
        code_error, compare,
        node::{NodeData, NodePair, NodeStyle},
        positioned_error, Document, NodeId,
    },
    error::{internal::ErrorCode, Result},
};

/// Recursion bound for structural copies; a correct tree
/// can never get near it, a corrupted one dies loudly
const MAX_DEPTH: usize = 256;

const MERGE_KEY: &str = "<<";

pub(crate) fn resolve(doc: &mut Document<'_>) -> Result<()>
{
    resolve_aliases(doc)?;
    expand_merge_keys(doc)?;

    doc.reparent();
    doc.prune();

    Ok(())
}

fn resolve_aliases(doc: &mut Document<'_>) -> Result<()>
{
    // Aliases in stream order; anchors always precede their
    // aliases, so each target is fully resolved before it is
    // copied
    let mut aliases: Vec<NodeId> = doc
        .nodes()
        .iter()
        .filter(|(_, cell)| matches!(cell.data, NodeData::Alias(_)))
        .map(|(id, _)| id)
        .collect();

    aliases.sort_by_key(|id| doc.nodes()[*id].mark.at);

    for alias in aliases
    {
        let (name, mark) = match &doc.nodes()[alias].data
        {
            NodeData::Alias(name) => (name.clone(), doc.nodes()[alias].mark),
            _ => continue,
        };

        // The anchor must be declared before the alias; with
        // redeclaration the latest preceding one wins
        let target = doc
            .anchors()
            .filter(|(anchor, id)| {
                **anchor == name
                    && doc
                        .cell(*id)
                        .map(|cell| cell.mark.at <= mark.at)
                        .unwrap_or(false)
            })
            .map(|(_, id)| id)
            .last()
            .ok_or_else(|| positioned_error(ErrorCode::UndefinedAlias, mark))?;

        let copied = copy_subtree(doc, target, 0)?;

        // Replace the alias node in place, keeping its mark
        let replacement = doc.nodes()[copied].clone();
        let cell = doc.cell_mut(alias)?;

        cell.data = replacement.data;
        cell.tag = replacement.tag;
        cell.style = match replacement.style
        {
            NodeStyle::Alias => NodeStyle::Any,
            style => style,
        };

        doc.nodes_mut().remove(copied);
    }

    Ok(())
}

fn expand_merge_keys(doc: &mut Document<'_>) -> Result<()>
{
    // Mappings in stream order, so a referenced mapping is
    // always expanded before anything merges it
    let mut mappings: Vec<NodeId> = doc
        .nodes()
        .iter()
        .filter(|(_, cell)| matches!(cell.data, NodeData::Mapping(_)))
        .map(|(id, _)| id)
        .collect();

    mappings.sort_by_key(|id| doc.nodes()[*id].mark.at);

    for mapping in mappings
    {
        while let Some(at) = find_merge_pair(doc, mapping)?
        {
            expand_one(doc, mapping, at)?;
        }
    }

    Ok(())
}

fn find_merge_pair(doc: &Document<'_>, mapping: NodeId) -> Result<Option<usize>>
{
    let pairs = doc.mapping_pairs(mapping)?;

    for (at, pair) in pairs.iter().enumerate()
    {
        let cell = doc.cell(pair.key)?;

        // Only a *plain* scalar '<<' is a merge directive
        let plain = matches!(cell.style, NodeStyle::Plain | NodeStyle::Any);

        if let NodeData::Scalar(scalar) = &cell.data
        {
            if plain && scalar.text().map(|text| text == MERGE_KEY).unwrap_or(false)
            {
                return Ok(Some(at));
            }
        }
    }

    Ok(None)
}

fn expand_one(doc: &mut Document<'_>, mapping: NodeId, at: usize) -> Result<()>
{
    let pair = doc.mapping_pairs(mapping)?[at];
    let mark = doc.cell(pair.value)?.mark;

    // The value is one mapping, or a sequence of mappings
    let references: Vec<NodeId> = match &doc.cell(pair.value)?.data
    {
        NodeData::Mapping(_) => vec![pair.value],
        NodeData::Sequence(items) =>
        {
            for item in items
            {
                if !matches!(doc.cell(*item)?.data, NodeData::Mapping(_))
                {
                    return Err(positioned_error(ErrorCode::InvalidMergeValue, mark));
                }
            }

            items.clone()
        },
        _ => return Err(positioned_error(ErrorCode::InvalidMergeValue, mark)),
    };

    // Drop the merge pair, then splice copies in at its
    // position: first writer wins, existing keys are kept
    doc.mapping_remove_at(mapping, at)?;

    let mut insert_at = at;

    for reference in references
    {
        let pairs: Vec<NodePair> = match &doc.cell(reference)?.data
        {
            NodeData::Mapping(pairs) => pairs.clone(),
            _ => return Err(positioned_error(ErrorCode::InvalidMergeValue, mark)),
        };

        for merged in pairs
        {
            let already_present = doc
                .mapping_pairs(mapping)?
                .iter()
                .any(|existing| compare::semantic_eq(doc, existing.key, doc, merged.key));

            if already_present
            {
                continue;
            }

            let key = copy_subtree(doc, merged.key, 0)?;
            let value = copy_subtree(doc, merged.value, 0)?;

            doc.mapping_insert_at(mapping, insert_at, key, value)?;
            insert_at += 1;
        }
    }

    Ok(())
}

/// Structural deep copy bounded by [`MAX_DEPTH`]; scalar
/// content is shared, not duplicated
fn copy_subtree(doc: &mut Document<'_>, id: NodeId, depth: usize) -> Result<NodeId>
{
    if depth > MAX_DEPTH
    {
        return Err(code_error(ErrorCode::ResolveDepthExceeded));
    }

    let mut cell = doc.cell(id)?.clone();

    let cell_data = std::mem::replace(&mut cell.data, NodeData::Alias(Default::default()));

    let data = match cell_data
    {
        NodeData::Scalar(scalar) => NodeData::Scalar(scalar),
        NodeData::Alias(name) => NodeData::Alias(name),
        NodeData::Sequence(items) =>
        {
            let mut copies = Vec::with_capacity(items.len());

            for item in items
            {
                copies.push(copy_subtree(doc, item, depth + 1)?);
            }

            NodeData::Sequence(copies)
        },
        NodeData::Mapping(pairs) =>
        {
            let mut copies = Vec::with_capacity(pairs.len());

            for pair in pairs
            {
                copies.push(NodePair {
                    key:   copy_subtree(doc, pair.key, depth + 1)?,
                    value: copy_subtree(doc, pair.value, depth + 1)?,
                });
            }

            NodeData::Mapping(copies)
        },
    };

    let mut copy = cell;
    copy.data = data;
    copy.parent = None;

    Ok(doc.insert_cell(copy))
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use crate::{diag::ParseConfig, document::Document};

    fn build_resolved(data: &str) -> Document<'_>
    {
        Document::build_from_utf8(data, &ParseConfig::default().resolve())
            .expect("build and resolve")
    }

    #[test]
    fn aliases_become_copies()
    {
        let data = "base: &b {x: 1}\nother: *b\n";
        let doc = build_resolved(data);

        let base = doc.node_at("/base").unwrap();
        let other = doc.node_at("/other").unwrap();

        assert_ne!(base, other);
        assert!(doc.semantic_eq(base, &doc, other));
        assert_eq!(doc.get_str("/other/x").unwrap(), "1");
    }

    #[test]
    fn undefined_alias_errors()
    {
        let err = Document::build_from_utf8(
            "a: *nowhere\n",
            &ParseConfig::default().resolve(),
        )
        .unwrap_err();

        assert_eq!(err.classify(), crate::Category::Semantic);
    }

    #[test]
    fn merge_key_override_and_order()
    {
        let data = "defaults: &d { a: 1, b: 2 }\nactual: { <<: *d, b: 3, c: 4 }\n";
        let doc = build_resolved(data);

        let actual = doc.node_at("/actual").unwrap();

        // Merged 'a' arrives at the merge position; the
        // explicit 'b' wins and keeps its place; 'c' stays
        // last
        let keys: Vec<_> = doc
            .mapping_pairs(actual)
            .unwrap()
            .iter()
            .map(|pair| doc.scalar_text(pair.key).unwrap().to_string())
            .collect();

        assert_eq!(keys, ["a", "b", "c"]);

        assert_eq!(doc.get_str("/actual/a").unwrap(), "1");
        assert_eq!(doc.get_str("/actual/b").unwrap(), "3");
        assert_eq!(doc.get_str("/actual/c").unwrap(), "4");
    }

    #[test]
    fn merge_sequence_first_writer_wins()
    {
        let data = "\
one: &one { a: 1, shared: one }
two: &two { b: 2, shared: two }
merged: { <<: [*one, *two] }
";
        let doc = build_resolved(data);

        assert_eq!(doc.get_str("/merged/a").unwrap(), "1");
        assert_eq!(doc.get_str("/merged/b").unwrap(), "2");
        assert_eq!(doc.get_str("/merged/shared").unwrap(), "one");
    }

    #[test]
    fn no_merge_keys_survive()
    {
        let data = "d: &d { a: 1 }\nm: { <<: *d, b: 2 }\n";
        let doc = build_resolved(data);

        let ids: Vec<_> = doc.nodes().iter().map(|(id, _)| id).collect();

        for id in ids
        {
            if doc.kind(id).unwrap() == crate::document::NodeKind::Mapping
            {
                assert!(doc.mapping_lookup(id, "<<").unwrap().is_none());
            }
        }
    }

    #[test]
    fn invalid_merge_value_errors()
    {
        let err = Document::build_from_utf8(
            "m: { <<: just a scalar }\n",
            &ParseConfig::default().resolve(),
        )
        .unwrap_err();

        assert_eq!(err.classify(), crate::Category::Semantic);
    }

    #[test]
    fn nested_merges_resolve_in_declaration_order()
    {
        let data = "\
base: &base { a: 1 }
mid: &mid { <<: *base, b: 2 }
top: { <<: *mid, c: 3 }
";
        let doc = build_resolved(data);

        assert_eq!(doc.get_str("/top/a").unwrap(), "1");
        assert_eq!(doc.get_str("/top/b").unwrap(), "2");
        assert_eq!(doc.get_str("/top/c").unwrap(), "3");
    }
}
