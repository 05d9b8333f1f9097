/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Input sources: the adapters that own (or borrow) the
//! bytes a YAML stream is parsed from and feed them to the
//! scanner.
//!
//! Three ownership shapes are supported, each with a top
//! level constructor:
//!
//! - `&str` / `&[u8]` => [`from_utf8`] / [`try_from_bytes`]
//! - owned buffers and files => [`from_string`],
//!   [`try_from_vec`], [`from_path`]
//! - `std::io::Read` streams => [`from_read`]
//!
//! Every byte range handed out by a source stays valid and
//! immutable for the source's lifetime; streamed sources
//! guarantee this by never reallocating a committed chunk.
//!
//! The [`Source`] trait is sealed and cannot be implemented
//! outside this library.

pub mod borrow;
pub mod owned;
pub mod stream;

pub(crate) mod error;
pub(crate) mod index;

use std::path::Path;

use crate::{
    input::{
        borrow::BorrowSource,
        error::{InputError, InputResult},
        owned::OwnedSource,
        private::Sealed,
        stream::StreamSource,
    },
    queue::Queue,
    scanner::{entry::TokenEntry, flag::Flags as ScanFlags, Scanner},
};

/// Instantiate a new [`Source`] over the given UTF8 string
/// slice
///
/// ## Examples
///
/// ```rust
/// use yarrow::input::from_utf8;
///
/// let yaml = "{a yaml: mapping}";
///
/// let source = from_utf8(yaml);
/// ```
pub fn from_utf8(utf8: &str) -> BorrowSource<'_>
{
    BorrowSource::new(utf8)
}

/// Try to instantiate a new [`Source`] over the given byte
/// slice
///
/// ## Errors
///
/// Errors if the slice is not valid UTF8
pub fn try_from_bytes(slice: &[u8]) -> crate::error::Result<BorrowSource<'_>>
{
    BorrowSource::try_from_bytes(slice).map_err(Into::into)
}

/// Instantiate a new [`Source`] owning the given string
pub fn from_string(data: String) -> OwnedSource
{
    OwnedSource::new(data)
}

/// Try to instantiate a new [`Source`] owning the given
/// byte buffer
///
/// ## Errors
///
/// Errors if the buffer is not valid UTF8
pub fn try_from_vec(data: Vec<u8>) -> crate::error::Result<OwnedSource>
{
    OwnedSource::try_from_vec(data).map_err(Into::into)
}

/// Instantiate a new [`Source`] over the contents of the
/// file at .path, read into an owned buffer
///
/// ## Errors
///
/// Errors on IO failure, or if the file is not valid UTF8
pub fn from_path<P>(path: P) -> crate::error::Result<OwnedSource>
where
    P: AsRef<Path>,
{
    OwnedSource::from_path(path.as_ref()).map_err(Into::into)
}

/// Like [`from_path`], but resolving a relative .path
/// against the parse config's colon separated search path
pub fn from_path_searched<P>(
    path: P,
    config: &crate::diag::ParseConfig,
) -> crate::error::Result<OwnedSource>
where
    P: AsRef<Path>,
{
    let resolved =
        owned::resolve_in_search_path(path.as_ref(), config.search_path.as_deref());

    OwnedSource::from_path(&resolved).map_err(Into::into)
}

/// Instantiate a new [`Source`] over the given
/// [`std::io::Read`] stream, buffered incrementally as the
/// scanner demands bytes
///
/// ## Examples
///
/// ```no_run
/// use std::fs::File;
///
/// use yarrow::input::from_read;
///
/// let file = File::open("config.yaml")?;
///
/// let source = from_read(file);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn from_read<R>(src: R) -> StreamSource
where
    R: std::io::Read + 'static,
{
    StreamSource::new(src)
}

/// Sealed interface over the functionality that transforms
/// a byte stream into tokens.
///
/// Note the key feature here is `&'de self`: an immutable
/// reference through which any internal mutation must not
/// be visible
pub trait Source: std::fmt::Debug + Sealed
{
    /// Drive the scanner over this source's bytes, placing
    /// output into the context's queue
    #[doc(hidden)]
    fn drive<'de>(&'de self, cxt: SourceContext<'_, '_, 'de>) -> Result<(), InputError>;
}

/// An intentionally opaque type which hides the
/// implementation details of [`Source`] methods.
pub struct SourceContext<'a, 'b, 'de>
{
    scanner: &'a mut Scanner,
    queue:   &'b mut Queue<TokenEntry<'de>>,
    flags:   ScanFlags,
}

impl<'a, 'b, 'de> SourceContext<'a, 'b, 'de>
{
    fn new(
        scanner: &'a mut Scanner,
        queue: &'b mut Queue<TokenEntry<'de>>,
        flags: ScanFlags,
    ) -> Self
    {
        Self {
            scanner,
            queue,
            flags,
        }
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        &'a mut Scanner,
        &'b mut Queue<TokenEntry<'de>>,
        ScanFlags,
    )
    {
        (self.scanner, self.queue, self.flags)
    }
}

/// Responsible for driving a [`Source`], tokenizing the
/// byte stream in preparation for an event stream
#[derive(Debug)]
pub(crate) struct Tokenizer<'de, S: 'de + ?Sized>
{
    scanner: Scanner,
    queue:   Queue<TokenEntry<'de>>,

    options:   ScanFlags,
    exhausted: bool,

    inner: &'de S,
}

impl<'de, S> Tokenizer<'de, S>
where
    S: Source + ?Sized,
{
    pub fn new(source: &'de S, opts: ScanFlags) -> Self
    {
        Self {
            scanner:   Scanner::new(),
            queue:     Queue::new(),
            options:   opts,
            exhausted: false,
            inner:     source,
        }
    }

    pub fn scan_tokens(&mut self) -> InputResult<&mut Queue<TokenEntry<'de>>>
    {
        let start = self.queue.len();

        self.inner.drive(SourceContext::new(
            &mut self.scanner,
            &mut self.queue,
            self.options,
        ))?;

        self.exhausted = start == self.queue.len();

        Ok(&mut self.queue)
    }

    pub fn is_exhausted(&self) -> bool
    {
        self.exhausted && self.queue.is_empty()
    }

    pub fn queue_mut(&mut self) -> &mut Queue<TokenEntry<'de>>
    {
        &mut self.queue
    }
}

/// A [`Tokenizer`] with single token lookahead, the
/// interface the event parser drives
#[derive(Debug)]
pub(crate) struct PeekTokens<'de, S: 'de + ?Sized>
{
    peek:      Option<TokenEntry<'de>>,
    tokenizer: Tokenizer<'de, S>,
}

impl<'de, S> PeekTokens<'de, S>
where
    S: Source + ?Sized,
{
    pub fn new(tokenizer: Tokenizer<'de, S>) -> Self
    {
        Self {
            peek: None,
            tokenizer,
        }
    }

    pub fn pop(&mut self) -> InputResult<Option<TokenEntry<'de>>>
    {
        match self.peek.take()
        {
            Some(entry) => Ok(Some(entry)),
            None if !self.tokenizer.is_exhausted() =>
            {
                self.take_next()?;

                Ok(self.peek.take())
            },
            None => Ok(None),
        }
    }

    pub fn peek(&mut self) -> InputResult<Option<&TokenEntry<'de>>>
    {
        match self.peek
        {
            Some(ref entry) => Ok(Some(entry)),
            None if !self.tokenizer.is_exhausted() =>
            {
                self.take_next()?;

                Ok(self.peek.as_ref())
            },
            None => Ok(None),
        }
    }

    /// Discard the peeked entry, if any
    pub fn consume(&mut self) -> bool
    {
        self.peek.take().is_some()
    }

    fn take_next(&mut self) -> InputResult<()>
    {
        if self.peek.is_some()
        {
            return Ok(());
        }

        if self.tokenizer.queue_mut().is_empty()
        {
            self.tokenizer.scan_tokens()?;
        }

        self.peek = self.tokenizer.queue_mut().pop();

        Ok(())
    }
}

impl<'de, S> From<&'de S> for PeekTokens<'de, S>
where
    S: Source + ?Sized,
{
    fn from(source: &'de S) -> Self
    {
        Self::new(Tokenizer::new(source, ScanFlags::default()))
    }
}

/// A bare `str` is itself a [`Source`]: the simplest way to
/// parse borrowed data without holding a separate source
/// value
impl Source for str
{
    fn drive<'de>(&'de self, cxt: SourceContext<'_, '_, 'de>) -> Result<(), InputError>
    {
        let (scanner, queue, flags) = cxt.into_parts();

        match scanner.scan_tokens(flags, self, queue)
        {
            Ok(_) => Ok(()),
            Err(crate::scanner::error::ScanError::NeedMore) =>
            {
                Err(crate::scanner::error::ScanError::UnexpectedEOF.into())
            },
            Err(e) => Err(e.into()),
        }
    }
}

impl Sealed for str {}

mod private
{
    pub trait Sealed {}
}

pub(crate) use private::Sealed as SourceSealed;

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::token::Marker::{self, *};

    type TestResult = anyhow::Result<()>;

    const YAML_SCALAR: &str = "'a simple, root scalar'";
    const YAML_SEQUENCE: &str = "- A\n- YAML\n- Sequence";
    const YAML_MAPPING: &str = "{'A YAML': Mapping}";

    const SCALAR_MARKERS: [Marker; 3] = [StreamStart, Scalar, StreamEnd];
    const SEQUENCE_MARKERS: [Marker; 10] = [
        StreamStart,
        BlockSequenceStart,
        BlockEntry,
        Scalar,
        BlockEntry,
        Scalar,
        BlockEntry,
        Scalar,
        BlockEnd,
        StreamEnd,
    ];
    const MAPPING_MARKERS: [Marker; 8] = [
        StreamStart,
        FlowMappingStart,
        Key,
        Scalar,
        Value,
        Scalar,
        FlowMappingEnd,
        StreamEnd,
    ];

    fn drive_markers<S>(source: &S, expected: &[Marker]) -> TestResult
    where
        S: Source,
    {
        use pretty_assertions::assert_eq;

        let mut tokenizer = Tokenizer::new(source, ScanFlags::default());
        let mut expected = expected.iter().copied();

        while !tokenizer.is_exhausted()
        {
            let tokens = tokenizer.scan_tokens()?;

            while let Some(actual) = tokens.pop().map(|entry| entry.marker())
            {
                assert_eq!(expected.next(), Some(actual));
            }
        }

        assert_eq!(expected.next(), None);

        Ok(())
    }

    #[test]
    fn borrow_source_markers() -> TestResult
    {
        drive_markers(&from_utf8(YAML_SCALAR), &SCALAR_MARKERS)?;
        drive_markers(&from_utf8(YAML_SEQUENCE), &SEQUENCE_MARKERS)?;
        drive_markers(&from_utf8(YAML_MAPPING), &MAPPING_MARKERS)
    }

    #[test]
    fn owned_source_markers() -> TestResult
    {
        drive_markers(&from_string(YAML_SCALAR.into()), &SCALAR_MARKERS)?;
        drive_markers(&from_string(YAML_SEQUENCE.into()), &SEQUENCE_MARKERS)?;
        drive_markers(&from_string(YAML_MAPPING.into()), &MAPPING_MARKERS)
    }

    #[test]
    fn stream_source_markers() -> TestResult
    {
        use std::io::Cursor;

        let scalar = from_read(Cursor::new(YAML_SCALAR.as_bytes().to_vec()));
        let sequence = from_read(Cursor::new(YAML_SEQUENCE.as_bytes().to_vec()));
        let mapping = from_read(Cursor::new(YAML_MAPPING.as_bytes().to_vec()));

        drive_markers(&scalar, &SCALAR_MARKERS)?;
        drive_markers(&sequence, &SEQUENCE_MARKERS)?;
        drive_markers(&mapping, &MAPPING_MARKERS)
    }
}
