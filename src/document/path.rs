/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Path based node addressing.
//!
//! A path is a '/' separated list of segments walked from
//! the root: a segment selects a mapping value by the key's
//! presented text, or a sequence item by decimal index.
//! `/` (or the empty path) addresses the root. Keys that
//! themselves contain '/' cannot be addressed this way.

use crate::{
    document::{node::NodeData, Document, NodeId},
    error::Result,
};

impl<'de> Document<'de>
{
    /// Walk .path from the root, returning the addressed
    /// node if every segment matches
    pub fn node_at(&self, path: &str) -> Option<NodeId>
    {
        let mut current = self.root()?;

        for segment in path.split('/').filter(|segment| !segment.is_empty())
        {
            current = self.step(current, segment)?;
        }

        Some(current)
    }

    /// The canonical path of a node: its position walked
    /// back up to the root
    pub fn path_of(&self, id: NodeId) -> Result<String>
    {
        self.cell(id)?;

        let mut segments: Vec<String> = Vec::new();
        let mut current = id;

        loop
        {
            // Mapping keys have no parent; address them (and
            // values) through the pair's key text
            let host = match self.parent(current)?
            {
                Some(host) => host,
                None => match self.find_hosting_mapping(current)
                {
                    Some((host, segment)) =>
                    {
                        segments.push(segment);
                        current = host;
                        continue;
                    },
                    None => break,
                },
            };

            match &self.cell(host)?.data
            {
                NodeData::Sequence(items) =>
                {
                    let index = items
                        .iter()
                        .position(|item| *item == current)
                        .unwrap_or_default();

                    segments.push(index.to_string());
                },
                NodeData::Mapping(pairs) =>
                {
                    let segment = pairs
                        .iter()
                        .find(|pair| pair.value == current)
                        .map(|pair| self.key_text(pair.key))
                        .unwrap_or_default();

                    segments.push(segment);
                },
                _ =>
                {},
            }

            current = host;
        }

        segments.reverse();

        match segments.is_empty()
        {
            true => Ok("/".into()),
            false => Ok(format!("/{}", segments.join("/"))),
        }
    }

    fn step(&self, from: NodeId, segment: &str) -> Option<NodeId>
    {
        match &self.cell(from).ok()?.data
        {
            NodeData::Mapping(_) => self.mapping_lookup(from, segment).ok().flatten(),
            NodeData::Sequence(items) =>
            {
                let index: usize = atoi::atoi(segment.as_bytes())?;

                items.get(index).copied()
            },
            _ => None,
        }
    }

    /// Locate the mapping holding .id as a key, returning
    /// the mapping and the key's text segment
    fn find_hosting_mapping(&self, id: NodeId) -> Option<(NodeId, String)>
    {
        for (host, cell) in self.nodes().iter()
        {
            if let NodeData::Mapping(pairs) = &cell.data
            {
                if pairs.iter().any(|pair| pair.key == id)
                {
                    return Some((host, self.key_text(id)));
                }
            }
        }

        None
    }

    fn key_text(&self, key: NodeId) -> String
    {
        match self.cell(key).map(|cell| &cell.data)
        {
            Ok(NodeData::Scalar(scalar)) =>
            {
                scalar.text().map(|text| text.to_string()).unwrap_or_default()
            },
            _ => String::new(),
        }
    }
}
