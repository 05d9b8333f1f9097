/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Typed, path indexed convenience accessors: the
//! formatted-read/-write surface, expressed as one reader
//! per primitive kind plus a scalar writer that creates
//! intermediate mappings on demand.

use crate::{
    document::{code_error, node::NodeData, Document, NodeId},
    error::{internal::ErrorCode, Result},
    token::Slice,
};

impl<'de> Document<'de>
{
    /// Fetch the scalar at .path as presented text
    pub fn get_str(&self, path: &str) -> Option<Slice<'de>>
    {
        let id = self.node_at(path)?;

        match &self.cell(id).ok()?.data
        {
            NodeData::Scalar(scalar) => scalar.text().ok().cloned(),
            _ => None,
        }
    }

    /// Fetch the scalar at .path as a signed integer
    pub fn get_i64(&self, path: &str) -> Option<i64>
    {
        atoi::atoi(self.get_str(path)?.as_bytes())
    }

    /// Fetch the scalar at .path as an unsigned integer
    pub fn get_u64(&self, path: &str) -> Option<u64>
    {
        atoi::atoi(self.get_str(path)?.as_bytes())
    }

    /// Fetch the scalar at .path as a float
    pub fn get_f64(&self, path: &str) -> Option<f64>
    {
        self.get_str(path)?.parse().ok()
    }

    /// Fetch the scalar at .path as a core schema bool
    pub fn get_bool(&self, path: &str) -> Option<bool>
    {
        match self.get_str(path)?.as_ref()
        {
            "true" | "True" | "TRUE" => Some(true),
            "false" | "False" | "FALSE" => Some(false),
            _ => None,
        }
    }

    /// Write a scalar at .path, creating intermediate
    /// mappings for missing segments. Numeric segments
    /// index existing sequences but never create them.
    pub fn put_scalar<T>(&mut self, path: &str, text: T) -> Result<NodeId>
    where
        T: Into<Slice<'de>>,
    {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if segments.is_empty()
        {
            let scalar = self.new_scalar(text);
            self.set_root(scalar)?;

            return Ok(scalar);
        }

        // Ensure a mapping root exists
        let mut current = match self.root()
        {
            Some(root) => root,
            None =>
            {
                let root = self.new_mapping();
                self.set_root(root)?;

                root
            },
        };

        // Walk (creating) every intermediate segment
        for segment in &segments[..segments.len() - 1]
        {
            current = self.descend_or_create(current, segment)?;
        }

        let last = segments[segments.len() - 1];
        let scalar = self.new_scalar(text);

        match self.kind(current)?
        {
            crate::document::NodeKind::Sequence =>
            {
                let index: usize =
                    atoi::atoi(last.as_bytes()).ok_or_else(|| code_error(ErrorCode::MissingNode))?;

                if index >= self.sequence_items(current)?.len()
                {
                    return Err(code_error(ErrorCode::MissingNode));
                }

                if let NodeData::Sequence(items) = &mut self.cell_mut(current)?.data
                {
                    items[index] = scalar;
                }

                self.reparent();
            },
            crate::document::NodeKind::Mapping =>
            {
                match self.mapping_lookup_pair(current, last)?
                {
                    Some(pair) =>
                    {
                        // Replace the existing value in place
                        if let NodeData::Mapping(pairs) = &mut self.cell_mut(current)?.data
                        {
                            if let Some(slot) = pairs.iter_mut().find(|p| p.key == pair.key)
                            {
                                slot.value = scalar;
                            }
                        }

                        self.reparent();
                    },
                    None =>
                    {
                        let key = self.new_scalar(last.to_string());

                        self.mapping_append_unchecked(current, key, scalar)?;
                    },
                }
            },
            _ => return Err(code_error(ErrorCode::MissingNode)),
        }

        self.prune();

        Ok(scalar)
    }

    fn descend_or_create(&mut self, from: NodeId, segment: &str) -> Result<NodeId>
    {
        match self.kind(from)?
        {
            crate::document::NodeKind::Sequence =>
            {
                let index: usize = atoi::atoi(segment.as_bytes())
                    .ok_or_else(|| code_error(ErrorCode::MissingNode))?;

                self.sequence_items(from)?
                    .get(index)
                    .copied()
                    .ok_or_else(|| code_error(ErrorCode::MissingNode))
            },
            crate::document::NodeKind::Mapping => match self.mapping_lookup(from, segment)?
            {
                Some(value) => Ok(value),
                None =>
                {
                    let key = self.new_scalar(segment.to_string());
                    let value = self.new_mapping();

                    self.mapping_append_unchecked(from, key, value)?;

                    Ok(value)
                },
            },
            _ => Err(code_error(ErrorCode::MissingNode)),
        }
    }
}
