/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Output sinks.
//!
//! The emitter hands every chunk to a [`Sink`] tagged with
//! the [`WriteKind`] it plays in the output, which is what
//! lets a sink colorise indicators differently from
//! content, strip comments, or count scalar bytes, without
//! re-parsing anything.

use std::io;

/// What role a written chunk plays in the emitted stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteKind
{
    /// '---' or '...'
    DocumentIndicator,
    /// A %TAG line
    TagDirective,
    /// A %YAML line
    VersionDirective,
    /// Leading indentation whitespace
    Indent,
    /// Structural punctuation: ':', '-', '[', '{', ',', ...
    Indicator,
    /// Separation whitespace
    Whitespace,
    PlainScalar,
    SingleQuotedScalar,
    DoubleQuotedScalar,
    LiteralScalar,
    FoldedScalar,
    /// An '&name' anchor property
    Anchor,
    /// A '!suffix' / '!<uri>' tag property
    Tag,
    LineBreak,
    /// A '*name' alias
    Alias,
    /// The NUL terminator some byte oriented callers want
    TerminatingZero,
    PlainScalarKey,
    SingleQuotedScalarKey,
    DoubleQuotedScalarKey,
    Comment,
}

impl WriteKind
{
    /// The key flavoured variant of a scalar kind
    pub(crate) fn as_key(self) -> Self
    {
        match self
        {
            Self::PlainScalar => Self::PlainScalarKey,
            Self::SingleQuotedScalar => Self::SingleQuotedScalarKey,
            Self::DoubleQuotedScalar => Self::DoubleQuotedScalarKey,
            other => other,
        }
    }
}

/// Receives emitted chunks. Errors propagate verbatim out
/// of the emitter.
pub trait Sink
{
    fn write(&mut self, kind: WriteKind, data: &str) -> io::Result<()>;
}

impl<S> Sink for &mut S
where
    S: Sink,
{
    fn write(&mut self, kind: WriteKind, data: &str) -> io::Result<()>
    {
        (**self).write(kind, data)
    }
}

/// Collects output into a `String`
#[derive(Debug, Default)]
pub struct StringSink
{
    out: String,
}

impl StringSink
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn into_string(self) -> String
    {
        self.out
    }

    pub fn as_str(&self) -> &str
    {
        &self.out
    }
}

impl Sink for StringSink
{
    fn write(&mut self, _kind: WriteKind, data: &str) -> io::Result<()>
    {
        self.out.push_str(data);

        Ok(())
    }
}

/// Collects output into a byte buffer
#[derive(Debug, Default)]
pub struct VecSink
{
    out: Vec<u8>,
}

impl VecSink
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn into_vec(self) -> Vec<u8>
    {
        self.out
    }
}

impl Sink for VecSink
{
    fn write(&mut self, _kind: WriteKind, data: &str) -> io::Result<()>
    {
        self.out.extend_from_slice(data.as_bytes());

        Ok(())
    }
}

/// Forwards output to any [`std::io::Write`]
#[derive(Debug)]
pub struct WriterSink<W>
{
    inner: W,
}

impl<W> WriterSink<W>
where
    W: io::Write,
{
    pub fn new(inner: W) -> Self
    {
        Self { inner }
    }

    pub fn into_inner(self) -> W
    {
        self.inner
    }
}

impl<W> Sink for WriterSink<W>
where
    W: io::Write,
{
    fn write(&mut self, _kind: WriteKind, data: &str) -> io::Result<()>
    {
        self.inner.write_all(data.as_bytes())
    }
}

/// Writes into a fixed caller buffer. On overflow the sink
/// keeps counting so the caller learns the size a retry
/// needs, per [`required`](#method.required).
#[derive(Debug)]
pub struct BufferSink<'a>
{
    buffer:   &'a mut [u8],
    used:     usize,
    required: usize,
}

impl<'a> BufferSink<'a>
{
    pub fn new(buffer: &'a mut [u8]) -> Self
    {
        Self {
            buffer,
            used: 0,
            required: 0,
        }
    }

    /// Bytes actually written
    pub fn len(&self) -> usize
    {
        self.used
    }

    pub fn is_empty(&self) -> bool
    {
        self.used == 0
    }

    /// Total bytes the full output needs; larger than
    /// [`len`](#method.len) iff the buffer overflowed
    pub fn required(&self) -> usize
    {
        self.required
    }

    pub fn overflowed(&self) -> bool
    {
        self.required > self.buffer.len()
    }
}

impl Sink for BufferSink<'_>
{
    fn write(&mut self, _kind: WriteKind, data: &str) -> io::Result<()>
    {
        let bytes = data.as_bytes();

        self.required += bytes.len();

        if self.used + bytes.len() <= self.buffer.len()
        {
            self.buffer[self.used..self.used + bytes.len()].copy_from_slice(bytes);
            self.used += bytes.len();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn buffer_sink_reports_required_size()
    {
        let mut buffer = [0u8; 4];
        let mut sink = BufferSink::new(&mut buffer);

        sink.write(WriteKind::PlainScalar, "abcd").unwrap();
        sink.write(WriteKind::LineBreak, "\n").unwrap();

        assert_eq!(sink.len(), 4);
        assert_eq!(sink.required(), 5);
        assert!(sink.overflowed());
    }
}
