/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The document tree: building one document at a time from
//! an event stream, querying and mutating it, resolving its
//! aliases and merge keys, and addressing nodes by path.
//!
//! A [`Document`] owns every node it contains in an arena;
//! nodes are addressed by [`NodeId`] handles that are only
//! meaningful against their owning document. Parent links
//! are derived and re-walked after every structural
//! mutation, so the tree can never hold a cycle.

pub mod path;

pub(crate) mod compare;
pub(crate) mod resolve;

mod access;
mod node;

pub use self::node::{NodeId, NodeKind, NodePair, NodeStyle};

use std::rc::Rc;

use slotmap::SlotMap;

use self::node::{NodeCell, NodeData};
use crate::{
    atom::ScalarCell,
    diag::{Diagnostic, ParseConfig, O_DIAG_COLLECT, O_RESOLVE},
    error::{
        internal::{Error as InternalError, ErrorCode},
        Result,
    },
    event::{
        types::{DocumentState, EventData, NodeEvent, Tag, VersionDirective},
        Events,
    },
    input::Source,
    token::{Mark, Slice},
};

/// A single YAML document: a tree of nodes, the anchors
/// declared in it, and the directive state that
/// parameterised its parsing.
#[derive(Debug, Clone)]
pub struct Document<'de>
{
    nodes: SlotMap<NodeId, NodeCell<'de>>,
    root:  Option<NodeId>,

    /// Anchors in declaration order; lookups return the
    /// most recent declaration of a name
    anchors: Vec<(Slice<'de>, NodeId)>,

    state: Rc<DocumentState<'de>>,

    start_implicit: bool,
    end_implicit:   bool,

    diagnostics: Vec<Diagnostic>,
}

impl<'de> Document<'de>
{
    /// An empty document with default directives
    pub fn new() -> Self
    {
        Self {
            nodes:          SlotMap::with_key(),
            root:           None,
            anchors:        Vec::new(),
            state:          Rc::new(DocumentState::default()),
            start_implicit: true,
            end_implicit:   true,
            diagnostics:    Vec::new(),
        }
    }

    /// Build a document from borrowed UTF8 text
    pub fn build_from_utf8(data: &'de str, config: &ParseConfig) -> Result<Self>
    {
        let mut events = Events::new(data);

        match Self::build_next(&mut events, config)?
        {
            Some(document) => Ok(document),
            None => Ok(Self::new()),
        }
    }

    /// Build a document from borrowed bytes, validating
    /// them as UTF8
    pub fn build_from_bytes(data: &'de [u8], config: &ParseConfig) -> Result<Self>
    {
        let data = std::str::from_utf8(data).map_err(|e| {
            crate::error::Error::new(InternalError::new(
                crate::error::internal::SourceError::from(e),
            ))
        })?;

        Self::build_from_utf8(data, config)
    }

    /// Build a document from any [`Source`] held by the
    /// caller (a file read via [`from_path`], a stream via
    /// [`from_read`], ...)
    ///
    /// [`from_path`]: crate::input::from_path
    /// [`from_read`]: crate::input::from_read
    pub fn build_from_source<S>(source: &'de S, config: &ParseConfig) -> Result<Self>
    where
        S: Source + ?Sized,
    {
        let mut events = Events::new(source);

        match Self::build_next(&mut events, config)?
        {
            Some(document) => Ok(document),
            None => Ok(Self::new()),
        }
    }

    /// Build the next document from an event stream,
    /// returning `None` once the stream ends.
    ///
    /// Call repeatedly to drain a multi document stream.
    pub fn build_next<S>(
        events: &mut Events<'de, S>,
        config: &ParseConfig,
    ) -> Result<Option<Self>>
    where
        S: Source + ?Sized,
    {
        let mut document = match Builder::start(events)?
        {
            Some(builder) => builder.finish(events, config)?,
            None => return Ok(None),
        };

        document.reparent();

        if config.flags.contains(O_RESOLVE)
        {
            document.resolve()?;
        }

        Ok(Some(document))
    }

    /// Replace alias nodes with copies of their anchor
    /// targets, then expand `<<` merge keys.
    ///
    /// After a successful resolve the document contains no
    /// alias nodes and no merge pairs.
    pub fn resolve(&mut self) -> Result<()>
    {
        resolve::resolve(self)
    }

    /*
     * ==== Reading ====
     */

    /// The document's root node, if it has any content
    pub fn root(&self) -> Option<NodeId>
    {
        self.root
    }

    /// Replace the root, orphaning the previous tree
    pub fn set_root(&mut self, id: NodeId) -> Result<()>
    {
        self.cell(id)?;

        self.root = Some(id);
        self.reparent();
        self.prune();

        Ok(())
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind>
    {
        self.cell(id).map(NodeCell::kind)
    }

    pub fn style(&self, id: NodeId) -> Result<NodeStyle>
    {
        self.cell(id).map(|cell| cell.style)
    }

    pub fn set_style(&mut self, id: NodeId, style: NodeStyle) -> Result<()>
    {
        self.cell_mut(id)?.style = style;

        Ok(())
    }

    /// The node's resolved tag, if one was written
    pub fn tag(&self, id: NodeId) -> Result<Option<&Tag<'de>>>
    {
        self.cell(id).map(|cell| cell.tag.as_ref())
    }

    pub fn set_tag(&mut self, id: NodeId, tag: Option<Tag<'de>>) -> Result<()>
    {
        self.cell_mut(id)?.tag = tag;

        Ok(())
    }

    /// The source position the node was built from
    pub fn mark(&self, id: NodeId) -> Result<Mark>
    {
        self.cell(id).map(|cell| cell.mark)
    }

    /// The derived parent: none for the root and for
    /// mapping keys, the collection node otherwise
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>>
    {
        self.cell(id).map(|cell| cell.parent)
    }

    /// A scalar's presented text, decoded on demand
    pub fn scalar_text(&self, id: NodeId) -> Result<&Slice<'de>>
    {
        match &self.cell(id)?.data
        {
            NodeData::Scalar(cell) => cell.text().map_err(|e| {
                crate::error::Error::new(InternalError::new(ErrorCode::from(
                    crate::scanner::error::ScanError::from(e),
                )))
            }),
            _ => Err(code_error(ErrorCode::MissingNode)),
        }
    }

    /// An unresolved alias node's anchor name
    pub fn alias_name(&self, id: NodeId) -> Result<Option<&Slice<'de>>>
    {
        match &self.cell(id)?.data
        {
            NodeData::Alias(name) => Ok(Some(name)),
            _ => Ok(None),
        }
    }

    /// A sequence's items, in order
    pub fn sequence_items(&self, id: NodeId) -> Result<&[NodeId]>
    {
        match &self.cell(id)?.data
        {
            NodeData::Sequence(items) => Ok(items),
            _ => Err(code_error(ErrorCode::MissingNode)),
        }
    }

    /// A mapping's pairs, in insertion order
    pub fn mapping_pairs(&self, id: NodeId) -> Result<&[NodePair]>
    {
        match &self.cell(id)?.data
        {
            NodeData::Mapping(pairs) => Ok(pairs),
            _ => Err(code_error(ErrorCode::MissingNode)),
        }
    }

    /// Look up a mapping value by its key's presented text
    pub fn mapping_lookup(&self, id: NodeId, key: &str) -> Result<Option<NodeId>>
    {
        for pair in self.mapping_pairs(id)?
        {
            if let NodeData::Scalar(cell) = &self.cell(pair.key)?.data
            {
                if cell.text().map(|text| text == key).unwrap_or(false)
                {
                    return Ok(Some(pair.value));
                }
            }
        }

        Ok(None)
    }

    /// Look up a whole pair by key text
    pub fn mapping_lookup_pair(&self, id: NodeId, key: &str) -> Result<Option<NodePair>>
    {
        for pair in self.mapping_pairs(id)?
        {
            if let NodeData::Scalar(cell) = &self.cell(pair.key)?.data
            {
                if cell.text().map(|text| text == key).unwrap_or(false)
                {
                    return Ok(Some(*pair));
                }
            }
        }

        Ok(None)
    }

    /*
     * ==== Creation & mutation ====
     */

    /// Create a scalar node from presented text
    pub fn new_scalar<T>(&mut self, text: T) -> NodeId
    where
        T: Into<Slice<'de>>,
    {
        self.insert_cell(NodeCell::new(
            NodeData::Scalar(ScalarCell::from_text(text)),
            NodeStyle::Any,
            Mark::default(),
        ))
    }

    pub fn new_sequence(&mut self) -> NodeId
    {
        self.insert_cell(NodeCell::new(
            NodeData::Sequence(Vec::new()),
            NodeStyle::Any,
            Mark::default(),
        ))
    }

    pub fn new_mapping(&mut self) -> NodeId
    {
        self.insert_cell(NodeCell::new(
            NodeData::Mapping(Vec::new()),
            NodeStyle::Any,
            Mark::default(),
        ))
    }

    pub fn sequence_append(&mut self, seq: NodeId, item: NodeId) -> Result<()>
    {
        self.sequence_insert_at(seq, usize::MAX, item)
    }

    pub fn sequence_prepend(&mut self, seq: NodeId, item: NodeId) -> Result<()>
    {
        self.sequence_insert_at(seq, 0, item)
    }

    /// Insert .item at .index, clamped to the sequence's
    /// length
    pub fn sequence_insert_at(&mut self, seq: NodeId, index: usize, item: NodeId) -> Result<()>
    {
        self.cell(item)?;

        match &mut self.cell_mut(seq)?.data
        {
            NodeData::Sequence(items) =>
            {
                let at = usize::min(index, items.len());

                items.insert(at, item);
            },
            _ => return Err(code_error(ErrorCode::MissingNode)),
        }

        self.reparent();

        Ok(())
    }

    /// Remove and return the item at .index
    pub fn sequence_remove(&mut self, seq: NodeId, index: usize) -> Result<NodeId>
    {
        let removed = match &mut self.cell_mut(seq)?.data
        {
            NodeData::Sequence(items) if index < items.len() => items.remove(index),
            NodeData::Sequence(_) => return Err(code_error(ErrorCode::MissingNode)),
            _ => return Err(code_error(ErrorCode::MissingNode)),
        };

        self.reparent();

        Ok(removed)
    }

    /// Append a pair, rejecting keys already present
    pub fn mapping_append(&mut self, map: NodeId, key: NodeId, value: NodeId) -> Result<()>
    {
        if self.has_equal_key(map, key)?
        {
            return Err(code_error(ErrorCode::DuplicateKey));
        }

        self.mapping_append_unchecked(map, key, value)
    }

    /// Append a pair without the duplicate key check
    pub fn mapping_append_unchecked(
        &mut self,
        map: NodeId,
        key: NodeId,
        value: NodeId,
    ) -> Result<()>
    {
        self.mapping_insert_at(map, usize::MAX, key, value)
    }

    pub fn mapping_prepend(&mut self, map: NodeId, key: NodeId, value: NodeId) -> Result<()>
    {
        if self.has_equal_key(map, key)?
        {
            return Err(code_error(ErrorCode::DuplicateKey));
        }

        self.mapping_insert_at(map, 0, key, value)
    }

    pub(crate) fn mapping_insert_at(
        &mut self,
        map: NodeId,
        index: usize,
        key: NodeId,
        value: NodeId,
    ) -> Result<()>
    {
        self.cell(key)?;
        self.cell(value)?;

        match &mut self.cell_mut(map)?.data
        {
            NodeData::Mapping(pairs) =>
            {
                let at = usize::min(index, pairs.len());

                pairs.insert(at, NodePair { key, value });
            },
            _ => return Err(code_error(ErrorCode::MissingNode)),
        }

        self.reparent();

        Ok(())
    }

    /// Remove the pair at .index, returning it
    pub fn mapping_remove_at(&mut self, map: NodeId, index: usize) -> Result<NodePair>
    {
        let removed = match &mut self.cell_mut(map)?.data
        {
            NodeData::Mapping(pairs) if index < pairs.len() => pairs.remove(index),
            _ => return Err(code_error(ErrorCode::MissingNode)),
        };

        self.reparent();

        Ok(removed)
    }

    /// Remove the pair whose key presents as .key
    pub fn mapping_remove_key(&mut self, map: NodeId, key: &str) -> Result<Option<NodePair>>
    {
        let index = {
            let pairs = self.mapping_pairs(map)?;
            let mut found = None;

            for (at, pair) in pairs.iter().enumerate()
            {
                if let NodeData::Scalar(cell) = &self.cell(pair.key)?.data
                {
                    if cell.text().map(|text| text == key).unwrap_or(false)
                    {
                        found = Some(at);
                        break;
                    }
                }
            }

            found
        };

        match index
        {
            Some(at) => self.mapping_remove_at(map, at).map(Some),
            None => Ok(None),
        }
    }

    /// Merge .source into .target: scalars overwrite,
    /// sequences append, mappings shallow merge with the
    /// source winning on key collision
    pub fn merge_nodes(&mut self, target: NodeId, source: NodeId) -> Result<()>
    {
        let source_data = self.cell(source)?.data.clone();
        let target_kind = self.kind(target)?;

        match (target_kind, source_data)
        {
            (NodeKind::Scalar, NodeData::Scalar(cell)) =>
            {
                if let NodeData::Scalar(slot) = &mut self.cell_mut(target)?.data
                {
                    *slot = cell;
                }
            },
            (NodeKind::Sequence, NodeData::Sequence(items)) =>
            {
                for item in items
                {
                    let copy = self.copy(item)?;

                    self.sequence_append(target, copy)?;
                }
            },
            (NodeKind::Mapping, NodeData::Mapping(pairs)) =>
            {
                for pair in pairs
                {
                    let key_copy = self.copy(pair.key)?;
                    let value_copy = self.copy(pair.value)?;

                    // Source wins: drop any colliding pair first
                    if let Some(at) = self.position_of_equal_key(target, pair.key)?
                    {
                        self.mapping_remove_at(target, at)?;
                    }

                    self.mapping_append_unchecked(target, key_copy, value_copy)?;
                }
            },
            _ => return Err(code_error(ErrorCode::MissingNode)),
        }

        self.reparent();

        Ok(())
    }

    /// Deep copy the subtree at .id, returning the copy's
    /// root. Token backed content is shared, not duplicated.
    pub fn copy(&mut self, id: NodeId) -> Result<NodeId>
    {
        self.cell(id)?;

        Ok(self.copy_inner(id))
    }

    fn copy_inner(&mut self, id: NodeId) -> NodeId
    {
        let cell = self.nodes[id].clone();

        let data = match cell.data
        {
            NodeData::Scalar(scalar) => NodeData::Scalar(scalar),
            NodeData::Alias(name) => NodeData::Alias(name),
            NodeData::Sequence(items) =>
            {
                let copies = items.into_iter().map(|item| self.copy_inner(item)).collect();

                NodeData::Sequence(copies)
            },
            NodeData::Mapping(pairs) =>
            {
                let copies = pairs
                    .into_iter()
                    .map(|pair| NodePair {
                        key:   self.copy_inner(pair.key),
                        value: self.copy_inner(pair.value),
                    })
                    .collect();

                NodeData::Mapping(copies)
            },
        };

        self.insert_cell(NodeCell {
            data,
            tag: cell.tag,
            style: cell.style,
            parent: None,
            mark: cell.mark,
        })
    }

    /// Deep copy a subtree out of another document into
    /// this one, returning the copy's root
    pub fn adopt(&mut self, other: &Document<'de>, id: NodeId) -> Result<NodeId>
    {
        let cell = other.cell(id)?;

        let data = match &cell.data
        {
            NodeData::Scalar(scalar) => NodeData::Scalar(scalar.clone()),
            NodeData::Alias(name) => NodeData::Alias(name.clone()),
            NodeData::Sequence(items) =>
            {
                let mut copies = Vec::with_capacity(items.len());

                for item in items
                {
                    copies.push(self.adopt(other, *item)?);
                }

                NodeData::Sequence(copies)
            },
            NodeData::Mapping(pairs) =>
            {
                let mut copies = Vec::with_capacity(pairs.len());

                for pair in pairs
                {
                    copies.push(NodePair {
                        key:   self.adopt(other, pair.key)?,
                        value: self.adopt(other, pair.value)?,
                    });
                }

                NodeData::Mapping(copies)
            },
        };

        Ok(self.insert_cell(NodeCell {
            data,
            tag: cell.tag.clone(),
            style: cell.style,
            parent: None,
            mark: cell.mark,
        }))
    }

    /*
     * ==== Anchors ====
     */

    /// Anchors in declaration order
    pub fn anchors(&self) -> impl Iterator<Item = (&Slice<'de>, NodeId)>
    {
        self.anchors.iter().map(|(name, id)| (name, *id))
    }

    /// The node the most recent declaration of .name refers
    /// to
    pub fn anchor_lookup(&self, name: &str) -> Option<NodeId>
    {
        self.anchors
            .iter()
            .rev()
            .find(|(anchor, _)| anchor == name)
            .map(|(_, id)| *id)
    }

    /// Declare (or redeclare) an anchor on a node
    pub fn anchor_set<T>(&mut self, name: T, id: NodeId) -> Result<()>
    where
        T: Into<Slice<'de>>,
    {
        self.cell(id)?;
        self.anchors.push((name.into(), id));

        Ok(())
    }

    /// Remove every declaration of .name
    pub fn anchor_remove(&mut self, name: &str)
    {
        self.anchors.retain(|(anchor, _)| anchor != name);
    }

    /*
     * ==== Directives ====
     */

    /// The document's directive bundle
    pub fn state(&self) -> &DocumentState<'de>
    {
        &self.state
    }

    pub fn version(&self) -> VersionDirective
    {
        self.state.version
    }

    /// Tag directives in declaration order, defaults
    /// included
    pub fn tag_directives(&self) -> impl Iterator<Item = &(Slice<'de>, Slice<'de>)>
    {
        self.state.tags.iter()
    }

    pub fn tag_directive_lookup(&self, handle: &str) -> Option<&Slice<'de>>
    {
        self.state.lookup(handle)
    }

    /// Add a tag directive; copy on write if the state is
    /// shared with a parser or other documents
    pub fn tag_directive_add<H, P>(&mut self, handle: H, prefix: P)
    where
        H: Into<Slice<'de>>,
        P: Into<Slice<'de>>,
    {
        let state = Rc::make_mut(&mut self.state);

        state.tags.push((handle.into(), prefix.into()));
        state.tags_explicit = true;
    }

    /// Remove a tag directive; erroring if any node's tag
    /// still references the handle
    pub fn tag_directive_remove(&mut self, handle: &str) -> Result<()>
    {
        let in_use = self
            .nodes
            .values()
            .filter_map(|cell| cell.tag.as_ref())
            .any(|tag| tag.handle == handle);

        if in_use
        {
            return Err(code_error(ErrorCode::DirectiveInUse));
        }

        Rc::make_mut(&mut self.state)
            .tags
            .retain(|(h, _)| h != handle);

        Ok(())
    }

    /*
     * ==== Flags & diagnostics ====
     */

    /// Was the document's start implied rather than marked
    /// with '---'?
    pub fn start_implicit(&self) -> bool
    {
        self.start_implicit
    }

    /// Was the document's end implied rather than marked
    /// with '...'?
    pub fn end_implicit(&self) -> bool
    {
        self.end_implicit
    }

    /// Diagnostics captured during the build, when the
    /// parse config asked for collection
    pub fn diagnostics(&self) -> &[Diagnostic]
    {
        &self.diagnostics
    }

    /*
     * ==== Internals ====
     */

    pub(crate) fn cell(&self, id: NodeId) -> Result<&NodeCell<'de>>
    {
        self.nodes.get(id).ok_or_else(|| code_error(ErrorCode::ForeignNode))
    }

    pub(crate) fn cell_mut(&mut self, id: NodeId) -> Result<&mut NodeCell<'de>>
    {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| code_error(ErrorCode::ForeignNode))
    }

    pub(crate) fn insert_cell(&mut self, cell: NodeCell<'de>) -> NodeId
    {
        self.nodes.insert(cell)
    }

    pub(crate) fn nodes(&self) -> &SlotMap<NodeId, NodeCell<'de>>
    {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut SlotMap<NodeId, NodeCell<'de>>
    {
        &mut self.nodes
    }

    pub(crate) fn anchors_mut(&mut self) -> &mut Vec<(Slice<'de>, NodeId)>
    {
        &mut self.anchors
    }

    /// Re-derive every parent link from the root down.
    /// Mapping keys deliberately get no parent; a mapping
    /// value's parent is the mapping itself.
    pub(crate) fn reparent(&mut self)
    {
        for cell in self.nodes.values_mut()
        {
            cell.parent = None;
        }

        let root = match self.root
        {
            Some(root) => root,
            None => return,
        };

        let mut walk: Vec<NodeId> = vec![root];

        while let Some(id) = walk.pop()
        {
            let data = match self.nodes.get(id)
            {
                Some(cell) => &cell.data,
                None => continue,
            };

            let children: Vec<(NodeId, Option<NodeId>)> = match data
            {
                NodeData::Sequence(items) =>
                {
                    items.iter().map(|item| (*item, Some(id))).collect()
                },
                NodeData::Mapping(pairs) => pairs
                    .iter()
                    .flat_map(|pair| [(pair.key, None), (pair.value, Some(id))])
                    .collect(),
                _ => continue,
            };

            for (child, parent) in children
            {
                if let Some(cell) = self.nodes.get_mut(child)
                {
                    cell.parent = parent;
                }

                walk.push(child);
            }
        }
    }

    /// Drop nodes no longer reachable from the root (or
    /// from an anchor)
    pub(crate) fn prune(&mut self)
    {
        let mut keep = std::collections::HashSet::new();
        let mut walk: Vec<NodeId> = self.root.into_iter().collect();

        walk.extend(self.anchors.iter().map(|(_, id)| *id));

        while let Some(id) = walk.pop()
        {
            if !keep.insert(id)
            {
                continue;
            }

            match self.nodes.get(id).map(|cell| &cell.data)
            {
                Some(NodeData::Sequence(items)) => walk.extend(items.iter().copied()),
                Some(NodeData::Mapping(pairs)) =>
                {
                    walk.extend(pairs.iter().flat_map(|pair| [pair.key, pair.value]));
                },
                _ =>
                {},
            }
        }

        self.nodes.retain(|id, _| keep.contains(&id));
        self.anchors.retain(|(_, id)| keep.contains(id));
    }

    fn has_equal_key(&self, map: NodeId, key: NodeId) -> Result<bool>
    {
        Ok(self.position_of_equal_key(map, key)?.is_some())
    }

    fn position_of_equal_key(&self, map: NodeId, key: NodeId) -> Result<Option<usize>>
    {
        let pairs = self.mapping_pairs(map)?;

        for (at, pair) in pairs.iter().enumerate()
        {
            if compare::semantic_eq(self, pair.key, self, key)
            {
                return Ok(Some(at));
            }
        }

        Ok(None)
    }
}

impl Default for Document<'_>
{
    fn default() -> Self
    {
        Self::new()
    }
}

/// Iterator over every document in an event stream
pub struct Documents<'de, S: Source + ?Sized>
{
    events: Events<'de, S>,
    config: ParseConfig,
}

impl<'de, S> Documents<'de, S>
where
    S: Source + ?Sized,
{
    pub fn new(source: &'de S, config: ParseConfig) -> Self
    {
        Self {
            events: Events::new(source),
            config,
        }
    }
}

impl<'de, S> Iterator for Documents<'de, S>
where
    S: Source + ?Sized,
{
    type Item = Result<Document<'de>>;

    fn next(&mut self) -> Option<Self::Item>
    {
        Document::build_next(&mut self.events, &self.config).transpose()
    }
}

/// Builds one document from the event stream
struct Builder<'de>
{
    document: Document<'de>,

    /// Open collections, innermost last
    open: Vec<NodeId>,

    /// Completed keys of open mappings awaiting their value
    pending_keys: Vec<Option<NodeId>>,
}

impl<'de> Builder<'de>
{
    /// Consume events up to and including the next
    /// DocumentStart, returning `None` if the stream ends
    /// first
    fn start<S>(events: &mut Events<'de, S>) -> Result<Option<Self>>
    where
        S: Source + ?Sized,
    {
        loop
        {
            let event = match events.next_event()
            {
                Some(event) => event?,
                None => return Ok(None),
            };

            match event.into_data()
            {
                EventData::StreamStart(_) => continue,
                EventData::StreamEnd => return Ok(None),
                EventData::DocumentStart(doc) =>
                {
                    let mut document = Document::new();

                    document.state = doc.state;
                    document.start_implicit = doc.implicit;

                    return Ok(Some(Self {
                        document,
                        open: Vec::new(),
                        pending_keys: Vec::new(),
                    }));
                },
                _ => return Err(code_error(ErrorCode::CorruptStream)),
            }
        }
    }

    fn finish<S>(
        mut self,
        events: &mut Events<'de, S>,
        config: &ParseConfig,
    ) -> Result<Document<'de>>
    where
        S: Source + ?Sized,
    {
        loop
        {
            let event = match events.next_event()
            {
                Some(event) => event?,
                None => return Err(code_error(ErrorCode::UnexpectedEOF)),
            };

            let mark = event.start();

            match event.into_data()
            {
                EventData::DocumentEnd(end) =>
                {
                    self.document.end_implicit = end.implicit;

                    if config.flags.contains(O_DIAG_COLLECT)
                        && self.document.state.version_explicit
                        && self.document.state.version.major != 1
                    {
                        self.document.diagnostics.push(Diagnostic::new(
                            mark,
                            crate::diag::DiagLevel::Warning,
                            "document",
                            format!(
                                "unsupported YAML version {}.{}",
                                self.document.state.version.major,
                                self.document.state.version.minor
                            ),
                        ));
                    }

                    return Ok(self.document);
                },

                EventData::Scalar(scalar) => self.on_scalar(scalar, mark)?,
                EventData::Alias(alias) => self.on_alias(alias.name, mark)?,

                EventData::SequenceStart(seq) =>
                {
                    self.on_collection_start(
                        NodeData::Sequence(Vec::new()),
                        seq.anchor,
                        seq.tag,
                        collection_style(seq.content.flow),
                        mark,
                    )?;
                },
                EventData::MappingStart(map) =>
                {
                    self.on_collection_start(
                        NodeData::Mapping(Vec::new()),
                        map.anchor,
                        map.tag,
                        collection_style(map.content.flow),
                        mark,
                    )?;

                    self.pending_keys.push(None);
                },

                EventData::SequenceEnd => self.on_collection_end(false)?,
                EventData::MappingEnd => self.on_collection_end(true)?,

                EventData::StreamStart(_) | EventData::StreamEnd | EventData::DocumentStart(_) =>
                {
                    return Err(code_error(ErrorCode::CorruptStream));
                },
            }
        }
    }

    fn on_scalar(
        &mut self,
        scalar: NodeEvent<'de, ScalarCell<'de>>,
        mark: Mark,
    ) -> Result<()>
    {
        let style = NodeStyle::from(crate::token::ScalarStyle::from(scalar.content.style()));

        let mut cell = NodeCell::new(NodeData::Scalar(scalar.content), style, mark);
        cell.tag = scalar.tag;

        let id = self.document.insert_cell(cell);

        self.register_anchor(scalar.anchor, id, mark)?;
        self.attach(id, mark)
    }

    fn on_alias(&mut self, name: Slice<'de>, mark: Mark) -> Result<()>
    {
        let cell = NodeCell::new(NodeData::Alias(name), NodeStyle::Alias, mark);
        let id = self.document.insert_cell(cell);

        self.attach(id, mark)
    }

    fn on_collection_start(
        &mut self,
        data: NodeData<'de>,
        anchor: Option<Slice<'de>>,
        tag: Option<Tag<'de>>,
        style: NodeStyle,
        mark: Mark,
    ) -> Result<()>
    {
        let mut cell = NodeCell::new(data, style, mark);
        cell.tag = tag;

        let id = self.document.insert_cell(cell);

        self.register_anchor(anchor, id, mark)?;
        self.attach(id, mark)?;
        self.open.push(id);

        Ok(())
    }

    fn on_collection_end(&mut self, mapping: bool) -> Result<()>
    {
        let id = self
            .open
            .pop()
            .ok_or_else(|| code_error(ErrorCode::CorruptStream))?;

        if mapping
        {
            let pending = self
                .pending_keys
                .pop()
                .ok_or_else(|| code_error(ErrorCode::CorruptStream))?;

            // The parser emits empty scalars for elided
            // values, so a dangling key means a broken stream
            if pending.is_some()
            {
                let mark = self.document.cell(id)?.mark;

                return Err(positioned_error(ErrorCode::MissingValue, mark));
            }
        }

        if self.open.is_empty() && self.document.root.is_none()
        {
            self.document.root = Some(id);
        }

        Ok(())
    }

    fn register_anchor(
        &mut self,
        anchor: Option<Slice<'de>>,
        id: NodeId,
        mark: Mark,
    ) -> Result<()>
    {
        let name = match anchor
        {
            Some(name) => name,
            None => return Ok(()),
        };

        if self.document.anchor_lookup(&name).is_some()
        {
            return Err(positioned_error(ErrorCode::DuplicateAnchor, mark));
        }

        self.document.anchors.push((name, id));

        Ok(())
    }

    /// Attach a completed node to the innermost open
    /// collection, or crown it the root
    fn attach(&mut self, id: NodeId, mark: Mark) -> Result<()>
    {
        let host = match self.open.last()
        {
            Some(host) => *host,
            None =>
            {
                if self.document.root.is_none() && self.document.cell(id)?.kind().is_leaf()
                {
                    self.document.root = Some(id);
                }

                return Ok(());
            },
        };

        match self.document.cell(host)?.kind()
        {
            NodeKind::Sequence =>
            {
                if let NodeData::Sequence(items) = &mut self.document.cell_mut(host)?.data
                {
                    items.push(id);
                }

                Ok(())
            },
            NodeKind::Mapping =>
            {
                let slot = self
                    .pending_keys
                    .last_mut()
                    .ok_or_else(|| code_error(ErrorCode::CorruptStream))?;

                match slot.take()
                {
                    None =>
                    {
                        // A new key: reject duplicates up front,
                        // pointing at the offending key
                        if self.document.position_of_equal_key(host, id)?.is_some()
                        {
                            return Err(positioned_error(ErrorCode::DuplicateKey, mark));
                        }

                        *slot = Some(id);
                    },
                    Some(key) =>
                    {
                        if let NodeData::Mapping(pairs) =
                            &mut self.document.cell_mut(host)?.data
                        {
                            pairs.push(NodePair { key, value: id });
                        }
                    },
                }

                Ok(())
            },
            _ => Err(code_error(ErrorCode::CorruptStream)),
        }
    }
}

impl NodeKind
{
    fn is_leaf(self) -> bool
    {
        matches!(self, NodeKind::Scalar | NodeKind::Alias)
    }
}

fn collection_style(flow: bool) -> NodeStyle
{
    match flow
    {
        true => NodeStyle::Flow,
        false => NodeStyle::Block,
    }
}

pub(crate) fn code_error(code: ErrorCode) -> crate::error::Error
{
    crate::error::Error::new(InternalError::new(code))
}

/// An error contextualized at a stream position; positions
/// are stored 1-based so the context survives the "line 0
/// means no context" convention
pub(crate) fn positioned_error(code: ErrorCode, mark: Mark) -> crate::error::Error
{
    crate::error::Error::new(InternalError::with_context(
        code,
        mark.at as u64,
        mark.line as u64 + 1,
        mark.column as u64 + 1,
    ))
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::diag::ParseConfig;

    fn build(data: &str) -> Document<'_>
    {
        Document::build_from_utf8(data, &ParseConfig::default()).expect("build document")
    }

    #[test]
    fn invoice_fields_and_anchors()
    {
        let data = "\
invoice: 34843
date   : !!str 2001-01-23
bill-to: &id001
    given  : Chris
    family : Dumars
";
        let doc = build(data);

        let invoice = doc.node_at("/invoice").expect("invoice node");
        assert_eq!(doc.scalar_text(invoice).unwrap(), "34843");

        let date = doc.node_at("/date").expect("date node");
        let tag = doc.tag(date).unwrap().expect("date tag");
        assert_eq!(tag.resolved(), "tag:yaml.org,2002:str");

        let target = doc.anchor_lookup("id001").expect("anchor id001");
        assert_eq!(doc.kind(target).unwrap(), NodeKind::Mapping);
        assert!(doc.mapping_lookup(target, "given").unwrap().is_some());
        assert!(doc.mapping_lookup(target, "family").unwrap().is_some());
    }

    #[test]
    fn parents_follow_the_structure()
    {
        let data = "a:\n  - 1\n  - k: v\n";
        let doc = build(data);

        let root = doc.root().expect("root");
        assert_eq!(doc.parent(root).unwrap(), None);

        // Mapping keys have no parent
        let pairs = doc.mapping_pairs(root).unwrap().to_vec();
        assert_eq!(doc.parent(pairs[0].key).unwrap(), None);

        // A value's parent is the mapping
        assert_eq!(doc.parent(pairs[0].value).unwrap(), Some(root));

        // Sequence items parent to the sequence
        let seq = pairs[0].value;
        let items = doc.sequence_items(seq).unwrap().to_vec();
        assert_eq!(doc.parent(items[0]).unwrap(), Some(seq));

        // And so on below
        let inner_pairs = doc.mapping_pairs(items[1]).unwrap().to_vec();
        assert_eq!(doc.parent(inner_pairs[0].value).unwrap(), Some(items[1]));
    }

    #[test]
    fn duplicate_key_errors_at_the_second_key()
    {
        let data = "k: 1\nk: 2\n";
        let err = Document::build_from_utf8(data, &ParseConfig::default()).unwrap_err();

        assert_eq!(err.classify(), crate::Category::Semantic);

        // The error points at the second 'k' (1-based)
        assert!(err.has_context());
        assert_eq!(err.line(), 2);
        assert!(err.at() >= 5, "position {} is inside line 2", err.at());
    }

    #[test]
    fn duplicate_anchor_errors()
    {
        let data = "a: &x 1\nb: &x 2\n";
        let err = Document::build_from_utf8(data, &ParseConfig::default()).unwrap_err();

        assert_eq!(err.classify(), crate::Category::Semantic);
    }

    #[test]
    fn giant_implicit_key_builds()
    {
        // No artificial limit on implicit key length
        let key = "x".repeat(2000);
        let data = format!("{}: value\n", key);
        let doc = build(&data);

        let root = doc.root().unwrap();
        assert_eq!(doc.mapping_pairs(root).unwrap().len(), 1);

        let value = doc.mapping_lookup(root, &key).unwrap().expect("value");
        assert_eq!(doc.scalar_text(value).unwrap(), "value");
    }

    #[test]
    fn multi_document_stream()
    {
        let data = "---\nfirst: 1\n---\nsecond: 2\n";
        let mut documents = Documents::new(data, ParseConfig::default());

        let first = documents.next().unwrap().unwrap();
        let second = documents.next().unwrap().unwrap();

        assert!(documents.next().is_none());
        assert!(first.node_at("/first").is_some());
        assert!(second.node_at("/second").is_some());
        assert!(!first.start_implicit());
    }

    #[test]
    fn mutation_round_trip()
    {
        let mut doc = Document::new();

        let root = doc.new_mapping();
        doc.set_root(root).unwrap();

        let key = doc.new_scalar("name");
        let value = doc.new_scalar("yarrow");
        doc.mapping_append(root, key, value).unwrap();

        // Duplicate append is rejected
        let key2 = doc.new_scalar("name");
        let value2 = doc.new_scalar("other");
        assert!(doc.mapping_append(root, key2, value2).is_err());

        let seq = doc.new_sequence();
        let seq_key = doc.new_scalar("list");
        doc.mapping_append(root, seq_key, seq).unwrap();

        for text in ["a", "b"]
        {
            let item = doc.new_scalar(text.to_string());
            doc.sequence_append(seq, item).unwrap();
        }

        let front = doc.new_scalar("z");
        doc.sequence_prepend(seq, front).unwrap();

        let items = doc.sequence_items(seq).unwrap().to_vec();
        let texts: Vec<_> = items
            .iter()
            .map(|id| doc.scalar_text(*id).unwrap().to_string())
            .collect();

        assert_eq!(texts, ["z", "a", "b"]);

        doc.sequence_remove(seq, 0).unwrap();
        assert_eq!(doc.sequence_items(seq).unwrap().len(), 2);

        assert_eq!(doc.parent(seq).unwrap(), Some(root));
    }

    #[test]
    fn merge_nodes_semantics()
    {
        let mut doc = build("target: {a: 1, b: 2}\nsource: {b: 9, c: 3}\n");

        let target = doc.node_at("/target").unwrap();
        let source = doc.node_at("/source").unwrap();

        doc.merge_nodes(target, source).unwrap();

        assert_eq!(doc.get_str("/target/a").unwrap(), "1");
        // Source wins on collision
        assert_eq!(doc.get_str("/target/b").unwrap(), "9");
        assert_eq!(doc.get_str("/target/c").unwrap(), "3");
    }

    #[test]
    fn typed_accessors()
    {
        let doc = build("count: 42\nratio: -0.5\nok: true\nname: thing\n");

        assert_eq!(doc.get_i64("/count"), Some(42));
        assert_eq!(doc.get_f64("/ratio"), Some(-0.5));
        assert_eq!(doc.get_bool("/ok"), Some(true));
        assert_eq!(doc.get_str("/name").unwrap(), "thing");
        assert_eq!(doc.get_i64("/name"), None);
        assert_eq!(doc.get_str("/missing"), None);
    }

    #[test]
    fn put_scalar_creates_intermediates()
    {
        let mut doc = Document::new();

        doc.put_scalar("/server/port", "8080").unwrap();
        doc.put_scalar("/server/host", "localhost").unwrap();
        doc.put_scalar("/server/port", "9090").unwrap();

        assert_eq!(doc.get_str("/server/port").unwrap(), "9090");
        assert_eq!(doc.get_str("/server/host").unwrap(), "localhost");

        let root = doc.root().unwrap();
        assert_eq!(doc.mapping_pairs(root).unwrap().len(), 1);
    }

    #[test]
    fn paths_round_trip()
    {
        let doc = build("a:\n  b:\n    - x\n    - y\n");

        let node = doc.node_at("/a/b/1").expect("node at path");
        assert_eq!(doc.scalar_text(node).unwrap(), "y");
        assert_eq!(doc.path_of(node).unwrap(), "/a/b/1");

        let root = doc.root().unwrap();
        assert_eq!(doc.path_of(root).unwrap(), "/");
    }

    #[test]
    fn tag_directive_management()
    {
        let data = "%TAG !e! tag:example.com:\n---\nkey: !e!thing value\n";
        let mut doc = build(data);

        assert_eq!(
            doc.tag_directive_lookup("!e!").map(|p| p.to_string()),
            Some("tag:example.com:".into())
        );

        // The handle is referenced by a node, removal must
        // fail
        assert!(doc.tag_directive_remove("!e!").is_err());

        doc.tag_directive_add("!f!", "tag:other.org:");
        assert!(doc.tag_directive_remove("!f!").is_ok());
    }

    #[test]
    fn semantic_equality_laws()
    {
        let config = ParseConfig::default();

        let a = Document::build_from_utf8("{x: 1, y: [2, 3]}", &config).unwrap();
        let b = Document::build_from_utf8("y:\n  - 2\n  - 3\nx: 1\n", &config).unwrap();
        let c = Document::build_from_utf8("{x: 1, y: [2, 4]}", &config).unwrap();

        let (ra, rb, rc) = (a.root().unwrap(), b.root().unwrap(), c.root().unwrap());

        // Reflexive, symmetric; key order does not matter
        assert!(a.semantic_eq(ra, &a, ra));
        assert!(a.semantic_eq(ra, &b, rb));
        assert!(b.semantic_eq(rb, &a, ra));

        assert!(!a.semantic_eq(ra, &c, rc));

        // Styles do not matter either
        assert!(a.compare_to_yaml_str(ra, "x: 1\ny: [2, 3]\n").unwrap());
    }
}
