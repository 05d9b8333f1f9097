/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::{error::Error as StdError, fmt};

/// Result typedef used throughout this library's public API
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque type representing all possible errors which can
/// occur during library usage.
pub struct Error
{
    inner: Box<internal::Error>,
}

impl Error
{
    /// The line at which the error occurred.
    pub fn line(&self) -> u64
    {
        self.inner.line
    }

    /// The column into the line where the error occurred.
    pub fn column(&self) -> u64
    {
        self.inner.column
    }

    /// The index into the byte stream at which the error
    /// occurred.
    pub fn at(&self) -> u64
    {
        self.inner.at
    }

    /// Categorize the error, see [`Category`] for the
    /// possible groupings.
    pub fn classify(&self) -> Category
    {
        self.inner.classify()
    }

    /// Checks whether this error was contextualized.
    ///
    /// If this method returns false then
    /// [`at()`](#method.at), [`column()`](#method.column)
    /// and [`line()`](#method.line) return meaningless
    /// values.
    pub fn has_context(&self) -> bool
    {
        self.inner.has_context()
    }

    pub(crate) fn new(err: internal::Error) -> Self
    {
        Self {
            inner: Box::new(err),
        }
    }

    pub(crate) fn code(&self) -> Option<internal::ErrorCode>
    {
        match self.inner.kind
        {
            internal::ErrorKind::Code(code) => Some(code),
            internal::ErrorKind::Source(_) => None,
        }
    }
}

/// Rough category of an [`Error`], useful for making
/// decisions upon encountering one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category
{
    /// The underlying byte stream returned an error while
    /// attempting IO
    IO,

    /// The YAML stream was not lexically or grammatically
    /// valid
    Syntax,

    /// The stream was well formed, but meaningless: a
    /// duplicate mapping key, an undefined alias, a bad
    /// merge value
    Semantic,

    /// Serialization failed: the sink errored, a forced
    /// style cannot represent the content, or a fixed
    /// buffer was too small
    Emit,

    /// There was an issue with the data contained in the
    /// YAML stream (e.g: an integer overflowed)
    Data,

    /// The YAML stream unexpectedly terminated before it
    /// was appropriate to do so
    EOF,
}

pub(crate) mod internal
{
    use std::{error::Error as StdError, fmt, io, str::Utf8Error};

    use super::Category;

    /// Internal error representation used throughout the
    /// library, carrying enough positional metadata to
    /// contextualize it later
    pub(crate) struct Error
    {
        pub kind:   ErrorKind,
        pub at:     u64,
        pub line:   u64,
        pub column: u64,
    }

    impl Error
    {
        /// Create a new, contextless [`Error`]. Care should
        /// be taken to later apply context, if at all
        /// possible.
        pub fn new<T>(err: T) -> Self
        where
            T: Into<ErrorKind>,
        {
            Self::with_context(err, 0, 0, 0)
        }

        /// Create a new, contextualized [`Error`].
        pub fn with_context<T>(err: T, at: u64, line: u64, column: u64) -> Self
        where
            T: Into<ErrorKind>,
        {
            Self {
                kind: err.into(),
                at,
                line,
                column,
            }
        }

        /// Add context to this error, replacing any
        /// existing context.
        pub fn context(mut self, at: u64, line: u64, column: u64) -> Self
        {
            self.at = at;
            self.line = line;
            self.column = column;

            self
        }

        /// Checks whether this error is contextualized
        pub fn has_context(&self) -> bool
        {
            // Only errors created without context will have a line
            // number of 0
            self.line != 0
        }

        /// Categorize this error
        pub fn classify(&self) -> Category
        {
            Into::into(&self.kind)
        }
    }

    /// Unified wrapper around the actual error variants we
    /// can produce
    #[derive(Debug)]
    pub(crate) enum ErrorKind
    {
        Code(ErrorCode),
        Source(SourceError),
    }

    /// Lightweight errors, specific to this library.
    ///
    /// This enum should never be polluted with large
    /// variants, or wrap underlying errors; use
    /// [`SourceError`] for those. Hot paths return this
    /// without boxing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) enum ErrorCode
    {
        /*
         * ==== Scanner errors ====
         */
        /// Got end of stream while scanning a token
        UnexpectedEOF,

        /// Directive was not either YAML or TAG
        UnknownDirective,

        /// A %YAML directive's version was malformed
        InvalidVersion,

        /// Tag handle was not primary (!), secondary (!!)
        /// or named (!word!)
        InvalidTagHandle,

        /// %TAG directive prefix was not a valid URI
        InvalidTagPrefix,

        /// Node tag suffix contained illegal characters
        InvalidTagSuffix,

        /// An anchor (&) or alias (*) name was empty or
        /// contained illegal characters
        InvalidAnchorName,

        /// A quoted scalar contained an illegal character
        /// sequence
        InvalidFlowScalar,

        /// A plain scalar contained an illegal character
        /// sequence
        InvalidPlainScalar,

        /// A block scalar header or body was malformed
        InvalidBlockScalar,

        /// A block entry ('- ') was not expected here
        InvalidBlockEntry,

        /// A tab character was found where indentation
        /// whitespace is required
        InvalidTab,

        /// A mapping key is not allowed in this context
        InvalidKey,

        /// A mapping value is not allowed in this context
        InvalidValue,

        /// An escape sequence in a double quoted scalar was
        /// not recognised
        UnknownEscape,

        /// Found a character that cannot start any token
        UnknownToken,

        /// An integer overflowed
        IntOverflow,

        /// A value was expected for a committed implicit
        /// key, but never found
        MissingValue,

        /*
         * ==== Parser errors ====
         */
        /// The token stream disagrees with the parser's
        /// state; typically a Source shared between two
        /// parsers
        CorruptStream,

        /// More than one %YAML directive in a document
        DuplicateVersion,

        /// Two %TAG directives for one handle with
        /// differing prefixes in a document
        DuplicateTagDirective,

        /// A tag shorthand referenced a handle that was
        /// never declared
        UndefinedTagHandle,

        /// A '---' was required to separate documents
        MissingDocumentStart,

        /// A block sequence entry was expected
        MissingBlockEntry,

        /// A node was required but absent
        MissingNode,

        /// A mapping key was required but absent
        MissingKey,

        /// A flow sequence wanted ',' or ']'
        MissingFlowSequenceDelimiter,

        /// A flow mapping wanted ',' or '}'
        MissingFlowMappingDelimiter,

        /*
         * ==== Document errors ====
         */
        /// Two keys in one mapping compare equal
        DuplicateKey,

        /// Two anchors with the same name declared in one
        /// document
        DuplicateAnchor,

        /// An alias referenced an anchor that was never
        /// declared
        UndefinedAlias,

        /// A '<<' value was not an alias to a mapping, or a
        /// sequence of such aliases
        InvalidMergeValue,

        /// Alias resolution recursed past the safety bound;
        /// the document is malformed
        ResolveDepthExceeded,

        /// Attempted to remove a tag directive still
        /// referenced by a node
        DirectiveInUse,

        /// A node handle was used against a document that
        /// does not own it
        ForeignNode,

        /*
         * ==== Emitter errors ====
         */
        /// The forced emit mode cannot represent this
        /// content
        StyleForbidden,

        /// The provided fixed buffer cannot hold the
        /// output; retry with at least the reported size
        BufferTooSmall,

        /// A node carries a tag but tag directives are
        /// forced off
        DirectivesForcedOff,
    }

    /// Heavy and/or external errors that can occur during
    /// library usage
    #[derive(Debug)]
    pub(crate) enum SourceError
    {
        /// Catch all wrapper for any underlying IO errors
        /// reported to us
        IO(io::Error),

        /// Encountered an invalid UTF8 sequence
        UTF8(Utf8Error),
    }

    impl fmt::Debug for Error
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            let mut this = f.debug_struct("Error");

            this.field("kind", &self.kind);

            if self.has_context()
            {
                this.field("line", &self.line)
                    .field("column", &self.column)
                    .field("index", &self.at);
            }

            this.finish()
        }
    }

    impl fmt::Display for Error
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            use fmt::Display;

            if self.has_context()
            {
                f.write_fmt(format_args!(
                    "{}, on line {}, column {}, at index {}",
                    self.kind, self.line, self.column, self.at
                ))
            }
            else
            {
                Display::fmt(&self.kind, f)
            }
        }
    }

    impl StdError for Error
    {
        fn source(&self) -> Option<&(dyn StdError + 'static)>
        {
            StdError::source(&self.kind)
        }
    }

    impl From<Error> for super::Error
    {
        fn from(err: Error) -> Self
        {
            Self::new(err)
        }
    }

    impl<T> From<T> for Error
    where
        T: Into<ErrorKind>,
    {
        fn from(t: T) -> Self
        {
            Error::new(t.into())
        }
    }

    impl From<&'_ ErrorKind> for Category
    {
        fn from(kind: &'_ ErrorKind) -> Self
        {
            match kind
            {
                ErrorKind::Code(e) => e.into(),
                ErrorKind::Source(e) => e.into(),
            }
        }
    }

    impl fmt::Display for ErrorKind
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            match self
            {
                ErrorKind::Code(ref e) => fmt::Display::fmt(e, f),
                ErrorKind::Source(ref e) => fmt::Display::fmt(e, f),
            }
        }
    }

    impl StdError for ErrorKind {}

    impl From<ErrorCode> for ErrorKind
    {
        fn from(e: ErrorCode) -> Self
        {
            ErrorKind::Code(e)
        }
    }

    impl From<SourceError> for ErrorKind
    {
        fn from(e: SourceError) -> Self
        {
            ErrorKind::Source(e)
        }
    }

    impl From<ErrorCode> for Category
    {
        fn from(code: ErrorCode) -> Self
        {
            use ErrorCode::*;

            match code
            {
                UnknownDirective
                | InvalidVersion
                | InvalidTagHandle
                | InvalidTagPrefix
                | InvalidTagSuffix
                | InvalidAnchorName
                | InvalidFlowScalar
                | InvalidPlainScalar
                | InvalidBlockScalar
                | InvalidBlockEntry
                | InvalidTab
                | InvalidKey
                | InvalidValue
                | UnknownEscape
                | UnknownToken
                | MissingValue
                | DuplicateVersion
                | MissingDocumentStart
                | MissingBlockEntry
                | MissingNode
                | MissingKey
                | MissingFlowSequenceDelimiter
                | MissingFlowMappingDelimiter => Category::Syntax,

                DuplicateTagDirective
                | UndefinedTagHandle
                | DuplicateKey
                | DuplicateAnchor
                | UndefinedAlias
                | InvalidMergeValue
                | ResolveDepthExceeded
                | DirectiveInUse
                | ForeignNode => Category::Semantic,

                StyleForbidden | BufferTooSmall | DirectivesForcedOff => Category::Emit,

                IntOverflow | CorruptStream => Category::Data,

                UnexpectedEOF => Category::EOF,
            }
        }
    }

    impl From<&'_ ErrorCode> for Category
    {
        fn from(code: &'_ ErrorCode) -> Self
        {
            From::from(*code)
        }
    }

    impl fmt::Display for ErrorCode
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            use ErrorCode::*;

            match self
            {
                UnexpectedEOF => f.write_str("unexpected EOF"),
                UnknownDirective => f.write_str("unknown YAML directive"),
                InvalidVersion => f.write_str("%YAML directive version is invalid"),
                InvalidTagHandle =>
                {
                    f.write_str("node tag handle is not one of !, !!, or ![a-zA-Z0-9]+!")
                },
                InvalidTagPrefix => f.write_str("%TAG directive prefix is not a valid URI"),
                InvalidTagSuffix => f.write_str("node tag suffix is invalid"),
                InvalidAnchorName =>
                {
                    f.write_str("node anchor or alias contains invalid characters")
                },
                InvalidFlowScalar => f.write_str("quoted scalar contains invalid characters"),
                InvalidPlainScalar => f.write_str("plain scalar contains invalid characters"),
                InvalidBlockScalar => f.write_str("block scalar is malformed"),
                InvalidBlockEntry => f.write_str("block entry is not allowed in this context"),
                InvalidTab => f.write_str("indentation contained a tab character"),
                InvalidKey => f.write_str("key node is not allowed in this context"),
                InvalidValue => f.write_str("value node is not allowed in this context"),
                UnknownEscape => f.write_str("unknown escape sequence"),
                UnknownToken => f.write_str("unknown token"),
                IntOverflow => f.write_str("integer overflow while parsing"),
                MissingValue => f.write_str("missing YAML mapping value"),
                CorruptStream => f.write_str("invalid or corrupt yaml stream"),
                DuplicateVersion => f.write_str("duplicate %YAML directive found in a document"),
                DuplicateTagDirective =>
                {
                    f.write_str("conflicting %TAG directives for one handle found in a document")
                },
                UndefinedTagHandle => f.write_str("undeclared tag handle used by a node tag"),
                MissingDocumentStart => f.write_str("missing document start or end indicator"),
                MissingBlockEntry => f.write_str("block entry was expected"),
                MissingNode => f.write_str("node was expected"),
                MissingKey => f.write_str("key node was expected"),
                MissingFlowSequenceDelimiter =>
                {
                    f.write_str("missing flow sequence delimiter ',' or ']'")
                },
                MissingFlowMappingDelimiter =>
                {
                    f.write_str("missing flow mapping delimiter ',' or '}'")
                },
                DuplicateKey => f.write_str("duplicate key in a mapping"),
                DuplicateAnchor => f.write_str("duplicate anchor declared in a document"),
                UndefinedAlias => f.write_str("alias references an undefined anchor"),
                InvalidMergeValue =>
                {
                    f.write_str("merge key value is not an alias to a mapping or list thereof")
                },
                ResolveDepthExceeded => f.write_str("alias resolution exceeded the depth bound"),
                DirectiveInUse => f.write_str("tag directive is still referenced by a node"),
                ForeignNode => f.write_str("node does not belong to this document"),
                StyleForbidden => f.write_str("emit mode cannot represent this content"),
                BufferTooSmall => f.write_str("output buffer is too small"),
                DirectivesForcedOff =>
                {
                    f.write_str("node tag requires a directive but directives are disabled")
                },
            }
        }
    }

    impl StdError for ErrorCode {}

    impl From<&'_ SourceError> for Category
    {
        fn from(err: &'_ SourceError) -> Self
        {
            match err
            {
                SourceError::IO(_) => Category::IO,
                SourceError::UTF8(_) => Category::Data,
            }
        }
    }

    impl fmt::Display for SourceError
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            match self
            {
                SourceError::IO(ref e) => fmt::Display::fmt(e, f),
                SourceError::UTF8(ref e) => fmt::Display::fmt(e, f),
            }
        }
    }

    impl StdError for SourceError
    {
        fn source(&self) -> Option<&(dyn StdError + 'static)>
        {
            match self
            {
                SourceError::IO(e) => Some(e),
                SourceError::UTF8(e) => Some(e),
            }
        }
    }

    impl From<Utf8Error> for SourceError
    {
        fn from(e: Utf8Error) -> Self
        {
            SourceError::UTF8(e)
        }
    }

    impl From<io::Error> for SourceError
    {
        fn from(e: io::Error) -> Self
        {
            SourceError::IO(e)
        }
    }
}

impl fmt::Debug for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for Error
{
    fn source(&self) -> Option<&(dyn StdError + 'static)>
    {
        StdError::source(&self.inner)
    }
}
