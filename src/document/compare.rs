/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Semantic node comparison.
//!
//! Two nodes compare equal iff both are null scalars, or
//! they share a kind and their *presented* content agrees:
//! scalars by decoded text, sequences element wise,
//! mappings pair wise after normalising the pair order with
//! the default comparator. Style, tags and source position
//! never participate.

use std::cmp::Ordering;

use crate::document::{
    node::{NodeData, NodeKind},
    Document, NodeId,
};

/// The forms of the core `null` scalar
const NULL_FORMS: [&str; 4] = ["", "~", "null", "Null"];

impl<'de> Document<'de>
{
    /// Compare a node of this document with a node of
    /// .other (which may be the same document) under
    /// semantic equality
    pub fn semantic_eq(&self, id: NodeId, other: &Document<'_>, other_id: NodeId) -> bool
    {
        semantic_eq(self, id, other, other_id)
    }

    /// Parse .yaml and compare this document's node against
    /// the resulting root
    pub fn compare_to_yaml_str(&self, id: NodeId, yaml: &str) -> crate::error::Result<bool>
    {
        let config = crate::diag::ParseConfig::default().resolve();
        let parsed = Document::build_from_utf8(yaml, &config)?;

        let root = match parsed.root()
        {
            Some(root) => root,
            None => return Ok(false),
        };

        Ok(semantic_eq(self, id, &parsed, root))
    }
}

pub(crate) fn semantic_eq(
    doc_a: &Document<'_>,
    a: NodeId,
    doc_b: &Document<'_>,
    b: NodeId,
) -> bool
{
    let (cell_a, cell_b) = match (doc_a.cell(a), doc_b.cell(b))
    {
        (Ok(cell_a), Ok(cell_b)) => (cell_a, cell_b),
        _ => return false,
    };

    match (&cell_a.data, &cell_b.data)
    {
        (NodeData::Scalar(lhs), NodeData::Scalar(rhs)) =>
        {
            match (lhs.text(), rhs.text())
            {
                (Ok(lhs), Ok(rhs)) =>
                {
                    (is_null(lhs) && is_null(rhs)) || lhs == rhs
                },
                _ => false,
            }
        },

        // Unresolved aliases compare by referent name
        (NodeData::Alias(lhs), NodeData::Alias(rhs)) => lhs == rhs,

        (NodeData::Sequence(lhs), NodeData::Sequence(rhs)) =>
        {
            lhs.len() == rhs.len()
                && lhs
                    .iter()
                    .zip(rhs.iter())
                    .all(|(l, r)| semantic_eq(doc_a, *l, doc_b, *r))
        },

        (NodeData::Mapping(lhs), NodeData::Mapping(rhs)) =>
        {
            if lhs.len() != rhs.len()
            {
                return false;
            }

            // Order insensitivity: normalise both sides with
            // the default comparator before the pairwise walk
            let mut lhs: Vec<_> = lhs.clone();
            let mut rhs: Vec<_> = rhs.clone();

            lhs.sort_by(|x, y| default_cmp(doc_a, x.key, y.key));
            rhs.sort_by(|x, y| default_cmp(doc_b, x.key, y.key));

            lhs.iter().zip(rhs.iter()).all(|(l, r)| {
                semantic_eq(doc_a, l.key, doc_b, r.key)
                    && semantic_eq(doc_a, l.value, doc_b, r.value)
            })
        },

        _ => false,
    }
}

/// The default key order: mapping keys sort before sequence
/// keys, which sort before scalar keys; scalars order by
/// decoded text. Everything else is a tie, which a stable
/// sort breaks by insertion index.
pub(crate) fn default_cmp(doc: &Document<'_>, a: NodeId, b: NodeId) -> Ordering
{
    let rank = |id: NodeId| match doc.cell(id).map(|cell| cell.kind())
    {
        Ok(NodeKind::Mapping) => 0u8,
        Ok(NodeKind::Sequence) => 1,
        Ok(NodeKind::Scalar) | Ok(NodeKind::Alias) => 2,
        Err(_) => 3,
    };

    match rank(a).cmp(&rank(b))
    {
        Ordering::Equal if rank(a) == 2 =>
        {
            let text = |id: NodeId| match doc.cell(id)
            {
                Ok(cell) => match &cell.data
                {
                    NodeData::Scalar(scalar) =>
                    {
                        scalar.text().map(|t| t.to_string()).unwrap_or_default()
                    },
                    NodeData::Alias(name) => name.to_string(),
                    _ => String::new(),
                },
                Err(_) => String::new(),
            };

            text(a).cmp(&text(b))
        },
        other => other,
    }
}

fn is_null(text: &str) -> bool
{
    NULL_FORMS.contains(&text) || text == "NULL"
}
