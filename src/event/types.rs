/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Contains the various types used by [`Event`]s to
//! represent YAML productions.

use std::rc::Rc;

use crate::{
    atom::ScalarCell,
    token::{Mark, Slice, StreamEncoding},
};

/// Default tag directives applied to every YAML document.
///
/// Equivalent of:
///
/// ```yaml
/// %TAG !    !
/// %TAG !!   tag:yaml.org,2002:
/// ```
///
/// These are always in scope, though documents may
/// expressly override them
pub const DEFAULT_TAGS: [(Slice<'static>, Slice<'static>); 2] = [
    (Slice::Borrowed("!"), Slice::Borrowed("!")),
    (Slice::Borrowed("!!"), Slice::Borrowed("tag:yaml.org,2002:")),
];

/// Default YAML stream version, assumed when the stream
/// carries no %YAML directive
pub const DEFAULT_VERSION: VersionDirective = VersionDirective { major: 1, minor: 3 };

/// Specific YAML productions found in the stream. Each
/// event carries start and end marks delimiting the
/// approximate source range it was produced from.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<'de>
{
    start: Mark,
    end:   Mark,
    inner: EventData<'de>,
}

impl<'de> Event<'de>
{
    pub(crate) fn new(start: Mark, end: Mark, inner: EventData<'de>) -> Self
    {
        Self { start, end, inner }
    }

    pub fn start(&self) -> Mark
    {
        self.start
    }

    pub fn end(&self) -> Mark
    {
        self.end
    }

    pub fn data(&self) -> &EventData<'de>
    {
        &self.inner
    }

    pub(crate) fn into_data(self) -> EventData<'de>
    {
        self.inner
    }
}

/// The possible variants of an [`Event`].
///
/// Every start variant is matched by exactly one end
/// variant; the parser guarantees balanced nesting on any
/// stream it accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum EventData<'de>
{
    /// Beginning of the event stream, produced exactly once
    StreamStart(StreamStart),
    /// End of events; nothing follows it
    StreamEnd,

    /// Start of a document's scope; tag resolution and
    /// version behavior inside it follow the attached,
    /// shared document state
    DocumentStart(DocumentStart<'de>),
    /// End of a document's scope
    DocumentEnd(DocumentEnd),

    /// A reference to a previously anchored node
    Alias(Alias<'de>),
    /// A scalar leaf, its content still undecoded
    Scalar(NodeEvent<'de, ScalarCell<'de>>),

    /// Start of a key/value production
    MappingStart(NodeEvent<'de, Mapping>),
    /// End of a key/value production
    MappingEnd,
    /// Start of an ordered list production
    SequenceStart(NodeEvent<'de, Sequence>),
    /// End of an ordered list production
    SequenceEnd,
}

/// Common decoration of the node producing events (Scalar,
/// MappingStart, SequenceStart)
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEvent<'de, T>
{
    /// The anchor declared on this node (if any)
    pub anchor: Option<Slice<'de>>,
    /// The tag applied to this node, already resolved
    /// against the document's directives
    pub tag: Option<Tag<'de>>,
    /// The node's content if simple, or a hint of the
    /// complex structure's type
    pub content: T,
    /// Where in the enclosing structure this node sits
    pub kind: NodeKind,
}

/// A node tag, resolved: .prefix is the expansion of
/// .handle under the owning document's directives, and the
/// full tag is .prefix + .suffix.
///
/// Verbatim tags (`!<uri>`) have empty handle and prefix;
/// the non specific tag `!` has suffix empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'de>
{
    pub handle: Slice<'de>,
    pub prefix: Slice<'de>,
    pub suffix: Slice<'de>,
}

impl<'de> Tag<'de>
{
    /// The full resolved tag URI
    pub fn resolved(&self) -> String
    {
        format!("{}{}", self.prefix, self.suffix)
    }

    /// Is this the non specific '!' tag?
    pub fn is_non_specific(&self) -> bool
    {
        self.handle == "!" && self.suffix.is_empty()
    }
}

/// Contextual information about a node's position in the
/// enclosing structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind
{
    /// Top level node of a document
    Root,
    /// Entry in a sequence
    Entry,
    /// Key in a mapping
    Key,
    /// Value in a mapping
    Value,
}

/// StreamStart [`Event`] contents
#[derive(Debug, Clone, PartialEq)]
pub struct StreamStart
{
    /// Encoding of the underlying byte stream
    pub encoding: StreamEncoding,
}

/// DocumentStart [`Event`] contents
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStart<'de>
{
    /// The document's directive bundle, shared with every
    /// document built from this event
    pub state: Rc<DocumentState<'de>>,
    /// Was this event present in the stream, or inferred?
    pub implicit: bool,
}

/// DocumentEnd [`Event`] contents
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEnd
{
    /// Was this event present in the stream, or inferred?
    pub implicit: bool,
}

/// Alias [`Event`] contents
#[derive(Debug, Clone, PartialEq)]
pub struct Alias<'de>
{
    /// Name of the anchor this alias refers to
    pub name: Slice<'de>,
}

/// MappingStart [`Event`] contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping
{
    /// Was the mapping written in flow style?
    pub flow: bool,
}

/// SequenceStart [`Event`] contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequence
{
    /// Was the sequence written in flow style?
    pub flow: bool,
}

/// The per document bundle of version and tag directive
/// information that parameterises parsing (and emission) of
/// a single document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState<'de>
{
    /// The %YAML version governing the document
    pub version: VersionDirective,
    /// Was the version declared in the stream?
    pub version_explicit: bool,

    /// The %TAG directives in scope, in declaration order,
    /// defaults included
    pub tags: Vec<(Slice<'de>, Slice<'de>)>,
    /// Was any %TAG directive declared in the stream?
    pub tags_explicit: bool,
}

impl<'de> DocumentState<'de>
{
    /// Expand a tag .handle to its declared prefix
    pub fn lookup(&self, handle: &str) -> Option<&Slice<'de>>
    {
        // Scan back to front so a redeclared handle resolves
        // to the most recent declaration
        self.tags
            .iter()
            .rev()
            .find(|(h, _)| h == handle)
            .map(|(_, prefix)| prefix)
    }

    /// The tag directives that are not the built in
    /// defaults
    pub fn explicit_tags(&self) -> impl Iterator<Item = &(Slice<'de>, Slice<'de>)>
    {
        self.tags
            .iter()
            .filter(|(handle, prefix)| {
                !DEFAULT_TAGS
                    .iter()
                    .any(|(dh, dp)| dh == handle && dp == prefix)
            })
    }
}

impl Default for DocumentState<'_>
{
    fn default() -> Self
    {
        Self {
            version:          DEFAULT_VERSION,
            version_explicit: false,
            tags:             DEFAULT_TAGS.to_vec(),
            tags_explicit:    false,
        }
    }
}

/// %YAML directive representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionDirective
{
    pub major: u8,
    pub minor: u8,
}
