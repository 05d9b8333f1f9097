/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use slotmap::new_key_type;

use crate::{
    atom::ScalarCell,
    event::types::Tag,
    token::{Mark, ScalarStyle, Slice},
};

new_key_type! {
    /// Identifier locating a node in the [`Document`] that
    /// created it.
    ///
    /// A [`NodeId`] must only be used against its owning
    /// document; the accessors verify ownership and
    /// foreign ids surface as errors, never as wrong nodes.
    ///
    /// [`Document`]: super::Document
    pub struct NodeId;
}

/// The three kinds of YAML node, plus the transient alias
/// nodes that exist only until resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind
{
    Scalar,
    Sequence,
    Mapping,
    Alias,
}

/// A presentation hint attached to a node: how it was
/// written, or how a caller would like it written. The
/// emitter treats it as a preference, downgrading whenever
/// the content demands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStyle
{
    /// No preference
    Any,
    Plain,
    SingleQuote,
    DoubleQuote,
    Literal,
    Folded,
    /// Bracketed, JSON like collection style
    Flow,
    /// Indentation based collection style
    Block,
    /// The node is an unresolved alias
    Alias,
}

impl From<ScalarStyle> for NodeStyle
{
    fn from(style: ScalarStyle) -> Self
    {
        match style
        {
            ScalarStyle::Plain => Self::Plain,
            ScalarStyle::SingleQuote => Self::SingleQuote,
            ScalarStyle::DoubleQuote => Self::DoubleQuote,
            ScalarStyle::Literal => Self::Literal,
            ScalarStyle::Folded => Self::Folded,
        }
    }
}

/// A key/value element of a mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePair
{
    pub key:   NodeId,
    pub value: NodeId,
}

/// The content of a node
#[derive(Debug, Clone)]
pub(crate) enum NodeData<'de>
{
    Scalar(ScalarCell<'de>),
    Alias(Slice<'de>),
    Sequence(Vec<NodeId>),
    Mapping(Vec<NodePair>),
}

/// A node and its decorations, stored in the document's
/// arena. Parent links are derived (re-walked after any
/// structural change), never authoritative.
#[derive(Debug, Clone)]
pub(crate) struct NodeCell<'de>
{
    pub data:   NodeData<'de>,
    pub tag:    Option<Tag<'de>>,
    pub style:  NodeStyle,
    pub parent: Option<NodeId>,
    pub mark:   Mark,
}

impl<'de> NodeCell<'de>
{
    pub fn new(data: NodeData<'de>, style: NodeStyle, mark: Mark) -> Self
    {
        Self {
            data,
            tag: None,
            style,
            parent: None,
            mark,
        }
    }

    pub fn kind(&self) -> NodeKind
    {
        match self.data
        {
            NodeData::Scalar(_) => NodeKind::Scalar,
            NodeData::Alias(_) => NodeKind::Alias,
            NodeData::Sequence(_) => NodeKind::Sequence,
            NodeData::Mapping(_) => NodeKind::Mapping,
        }
    }
}
