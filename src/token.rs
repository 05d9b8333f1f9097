/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::atom::{AtomStyle, ScalarCell};

pub use crate::atom::Slice;

/// A position in the byte stream: absolute offset plus the
/// 0-based line / column it falls on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mark
{
    pub at:     usize,
    pub line:   usize,
    pub column: usize,
}

impl Mark
{
    pub(crate) fn new(at: usize, line: usize, column: usize) -> Self
    {
        Self { at, line, column }
    }
}

/// Tokens that may be emitted by a YAML scanner
#[derive(Debug, PartialEq)]
pub(crate) enum Token<'de>
{
    /// The stream's start, with the byte (encoding)
    /// {virtual}
    StreamStart(StreamEncoding),
    /// The stream's end {virtual}
    StreamEnd,
    /// The %YAML directive, (major,minor)
    VersionDirective(u8, u8),
    /// The %TAG directive, (handle,prefix)
    TagDirective(Slice<'de>, Slice<'de>),
    /// A ---
    DocumentStart,
    /// A ...
    DocumentEnd,
    /// Indentation increase for a block (sequence)
    BlockSequenceStart,
    /// Indentation increase for a block (map)
    BlockMappingStart,
    /// Indentation decrease for a block
    BlockEnd,
    /// A '['
    FlowSequenceStart,
    /// A ']'
    FlowSequenceEnd,
    /// A '{'
    FlowMappingStart,
    /// A '}'
    FlowMappingEnd,
    /// A '-'
    BlockEntry,
    /// A ','
    FlowEntry,
    /// Either a '?' or nothing
    Key,
    /// A ':'
    Value,
    /// An alias (*name)
    Alias(Slice<'de>),
    /// An anchor (&name)
    Anchor(Slice<'de>),
    /// A tag (!handle, !suffix)
    Tag(Slice<'de>, Slice<'de>),
    /// A scalar's content, carried as an undecoded atom
    Scalar(ScalarCell<'de>),
}

/// Discriminant-only view of a [`Token`], used wherever the
/// kind matters but the contents do not (parser lookahead,
/// tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marker
{
    StreamStart,
    StreamEnd,
    VersionDirective,
    TagDirective,
    DocumentStart,
    DocumentEnd,
    BlockSequenceStart,
    BlockMappingStart,
    BlockEnd,
    FlowSequenceStart,
    FlowSequenceEnd,
    FlowMappingStart,
    FlowMappingEnd,
    BlockEntry,
    FlowEntry,
    Key,
    Value,
    Alias,
    Anchor,
    Tag,
    Scalar,
}

impl From<&'_ Token<'_>> for Marker
{
    fn from(t: &'_ Token<'_>) -> Self
    {
        use Token::*;

        match t
        {
            StreamStart(_) => Self::StreamStart,
            StreamEnd => Self::StreamEnd,
            VersionDirective(_, _) => Self::VersionDirective,
            TagDirective(_, _) => Self::TagDirective,
            DocumentStart => Self::DocumentStart,
            DocumentEnd => Self::DocumentEnd,
            BlockSequenceStart => Self::BlockSequenceStart,
            BlockMappingStart => Self::BlockMappingStart,
            BlockEnd => Self::BlockEnd,
            FlowSequenceStart => Self::FlowSequenceStart,
            FlowSequenceEnd => Self::FlowSequenceEnd,
            FlowMappingStart => Self::FlowMappingStart,
            FlowMappingEnd => Self::FlowMappingEnd,
            BlockEntry => Self::BlockEntry,
            FlowEntry => Self::FlowEntry,
            Key => Self::Key,
            Value => Self::Value,
            Alias(_) => Self::Alias,
            Anchor(_) => Self::Anchor,
            Tag(_, _) => Self::Tag,
            Scalar(_) => Self::Scalar,
        }
    }
}

impl Default for Marker
{
    fn default() -> Self
    {
        Self::StreamStart
    }
}

impl PartialEq<Token<'_>> for Marker
{
    fn eq(&self, other: &Token<'_>) -> bool
    {
        self == &Self::from(other)
    }
}

/// The encoding of the underlying byte stream. Only UTF8 is
/// supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamEncoding
{
    UTF8,
}

/// The style of a scalar, corresponding to the possible
/// presentations supported by YAML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle
{
    /// No delimiters, content was detected purely from
    /// stream context
    Plain,
    /// Scalar was quoted in single quotes (`''`)
    SingleQuote,
    /// Scalar was quoted in double quotes (`""`)
    DoubleQuote,
    /// Scalar was preceded by pipe (`|`)
    Literal,
    /// Scalar was preceded by an arrow (`>`)
    Folded,
}

impl From<AtomStyle> for ScalarStyle
{
    fn from(style: AtomStyle) -> Self
    {
        match style
        {
            AtomStyle::SingleQuote => Self::SingleQuote,
            AtomStyle::DoubleQuote => Self::DoubleQuote,
            AtomStyle::Literal => Self::Literal,
            AtomStyle::Folded => Self::Folded,
            // Uri / Comment atoms never back a scalar
            _ => Self::Plain,
        }
    }
}

impl From<ScalarStyle> for AtomStyle
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
