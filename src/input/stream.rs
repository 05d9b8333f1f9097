/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The incremental source: wraps a `std::io::Read`,
//! committing chunks into an append-only series of buffer
//! generations.
//!
//! The scanner runs over the newest generation with the
//! incremental flag set; when it suspends (`NeedMore`) the
//! unread suffix is copied into a fresh, larger generation
//! together with the next chunk, and the scan restarts from
//! the suffix. Retired generations are kept alive untouched
//! until the source drops, so every token already produced
//! keeps borrowing valid memory.

use std::{cell::UnsafeCell, fmt, io};

use crate::{
    input::{error::InputResult, InputError, Source, SourceContext, SourceSealed},
    queue::Queue,
    scanner::{
        entry::TokenEntry,
        error::ScanError,
        flag::{Flags, O_INCREMENTAL},
        Scanner,
    },
};

const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

pub struct StreamSource
{
    inner: ChunkHolder,
}

impl StreamSource
{
    pub(crate) fn new<R>(src: R) -> Self
    where
        R: io::Read + 'static,
    {
        Self {
            inner: ChunkHolder::new(src),
        }
    }

    #[cfg(test)]
    fn with_chunk_size<R>(src: R, chunk: usize) -> Self
    where
        R: io::Read + 'static,
    {
        let this = Self::new(src);

        // SAFETY: the holder was just created; no references
        // into it exist yet
        unsafe { (*this.inner.inner.get()).chunk = chunk };

        this
    }

    fn drive_scanner<'de>(
        &'de self,
        scanner: &mut Scanner,
        queue: &mut Queue<TokenEntry<'de>>,
        mut opts: Flags,
    ) -> InputResult<()>
    {
        loop
        {
            match self.inner.is_exhausted()
            {
                true => opts.remove(O_INCREMENTAL),
                false => opts.insert(O_INCREMENTAL),
            }

            match scanner.scan_tokens(opts, self.inner.data(), queue)
            {
                Err(ScanError::NeedMore) =>
                {
                    let read_to = scanner.offset();

                    self.inner.read_next_chunk(read_to)?;

                    scanner.reset_offset();
                },

                Ok(_) => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Source for StreamSource
{
    fn drive<'de>(&'de self, cxt: SourceContext<'_, '_, 'de>) -> Result<(), InputError>
    {
        let (scanner, queue, flags) = cxt.into_parts();

        self.drive_scanner(scanner, queue, flags)
    }
}

impl SourceSealed for StreamSource {}

impl fmt::Debug for StreamSource
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("StreamSource")
            .field("inner", &self.inner)
            .finish()
    }
}

struct ChunkHolder
{
    inner: UnsafeCell<Generations>,
}

impl ChunkHolder
{
    fn new<R>(src: R) -> Self
    where
        R: io::Read + 'static,
    {
        Self {
            inner: UnsafeCell::new(Generations::new(src)),
        }
    }

    fn read_next_chunk(&self, read_to: usize) -> InputResult<()>
    {
        // SAFETY: see .data; we only move the (ptr,len,cap)
        // triples of retired buffers, never their contents
        let inner: &mut Generations = unsafe { &mut *self.inner.get() };

        inner.refresh(read_to)
    }

    fn data(&self) -> &str
    {
        // SAFETY:
        //
        // We never drop or reallocate the contents referenced
        // here before the holder itself drops.
        //
        // This section REQUIRES the following invariants:
        //
        //  1. .head and the retired buffers never perform any
        //     operation that could reallocate
        //  2. retired buffers are not dropped before the holder
        let inner: &Generations = unsafe { &*self.inner.get() };

        inner.head()
    }

    fn is_exhausted(&self) -> bool
    {
        let inner: &Generations = unsafe { &*self.inner.get() };

        inner.exhausted
    }
}

impl fmt::Debug for ChunkHolder
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let inner: &Generations = unsafe { &*self.inner.get() };

        fmt::Debug::fmt(inner, f)
    }
}

struct Generations
{
    head:    String,
    retired: Vec<String>,

    chunk: usize,

    /// Bytes of a codepoint split across a chunk boundary,
    /// carried into the next generation
    carry: Vec<u8>,

    source:    Box<dyn io::Read + 'static>,
    exhausted: bool,
}

impl Generations
{
    fn new<R>(src: R) -> Self
    where
        R: io::Read + 'static,
    {
        Self {
            head:      String::new(),
            retired:   Vec::new(),
            chunk:     DEFAULT_CHUNK_SIZE,
            carry:     Vec::new(),
            source:    Box::new(src),
            exhausted: false,
        }
    }

    fn head(&self) -> &str
    {
        &self.head
    }

    /// Build the next generation: the unread suffix of the
    /// current head (from .read_to), any carried partial
    /// codepoint, and a fresh chunk from the source
    fn refresh(&mut self, read_to: usize) -> InputResult<()>
    {
        let grow = self.chunk * usize::max(self.retired.len() + 1, 1);
        let want = grow + (self.head.len() - read_to);

        let mut new = Vec::with_capacity(want);

        new.extend_from_slice(&self.head.as_bytes()[read_to..]);
        new.append(&mut self.carry);

        self.exhausted = read_fill(&mut self.source, &mut new, want)?;

        // Validate UTF8, carrying an incomplete trailing
        // codepoint over to the next refresh
        let new = match String::from_utf8(new)
        {
            Ok(s) => s,
            Err(err) =>
            {
                let utf8 = err.utf8_error();

                match utf8.error_len()
                {
                    // Hard error: invalid bytes inside the chunk
                    Some(_) => return Err(utf8.into()),
                    None =>
                    {
                        let mut bytes = err.into_bytes();
                        let valid = utf8.valid_up_to();

                        self.carry = bytes.split_off(valid);

                        if self.exhausted && !self.carry.is_empty()
                        {
                            return Err(utf8.into());
                        }

                        // SAFETY: valid_up_to bytes are valid UTF8
                        String::from_utf8(bytes).map_err(|e| e.utf8_error())?
                    },
                }
            },
        };

        let old = std::mem::replace(&mut self.head, new);
        self.retired.push(old);

        Ok(())
    }
}

impl fmt::Debug for Generations
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Generations")
            .field("head", &self.head)
            .field("retired", &self.retired.len())
            .field("source", &"dyn <std::io::Read>")
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

/// Fill .buf with up to .limit bytes from .src, returning
/// whether the source is exhausted
fn read_fill(src: &mut dyn io::Read, buf: &mut Vec<u8>, limit: usize) -> io::Result<bool>
{
    let mut remaining = limit;

    while remaining > 0
    {
        let start = buf.len();

        buf.resize(start + remaining, 0);

        match src.read(&mut buf[start..])
        {
            Ok(0) =>
            {
                buf.truncate(start);

                return Ok(true);
            },
            Ok(n) =>
            {
                buf.truncate(start + n);
                remaining -= n;
            },
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted =>
            {
                buf.truncate(start);
            },
            Err(e) =>
            {
                buf.truncate(start);

                return Err(e);
            },
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests
{
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::token::Marker;

    /// A reader that hands out one byte at a time, forcing
    /// generation churn
    struct Trickle(Cursor<Vec<u8>>);

    impl io::Read for Trickle
    {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>
        {
            let len = usize::min(buf.len(), 1);

            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn trickled_stream_scans_whole_documents()
    {
        let data = "key: value\nother: [1, 2, 3]\n";
        let source =
            StreamSource::with_chunk_size(Trickle(Cursor::new(data.as_bytes().to_vec())), 4);

        let mut scanner = Scanner::new();
        let mut queue = Queue::new();

        loop
        {
            let before = queue.len();

            source
                .drive_scanner(&mut scanner, &mut queue, Flags::default())
                .expect("drive scanner");

            if queue.len() == before
            {
                break;
            }
        }

        let markers: Vec<_> = queue.into_iter().map(|e| e.marker()).collect();

        assert_eq!(markers.first(), Some(&Marker::StreamStart));
        assert_eq!(markers.last(), Some(&Marker::StreamEnd));
        assert_eq!(
            markers.iter().filter(|m| **m == Marker::Scalar).count(),
            5
        );
    }

    #[test]
    fn multibyte_codepoint_across_chunks()
    {
        let data = "emoji: \"☺☺☺\"\n";
        let source =
            StreamSource::with_chunk_size(Trickle(Cursor::new(data.as_bytes().to_vec())), 2);

        let mut scanner = Scanner::new();
        let mut queue = Queue::new();

        loop
        {
            let before = queue.len();

            source
                .drive_scanner(&mut scanner, &mut queue, Flags::default())
                .expect("drive scanner");

            if queue.len() == before
            {
                break;
            }
        }

        let texts: Vec<_> = queue
            .into_iter()
            .filter_map(|entry| match entry.into_token()
            {
                crate::token::Token::Scalar(cell) => Some(cell.text().unwrap().to_string()),
                _ => None,
            })
            .collect();

        assert_eq!(texts, ["emoji", "☺☺☺"]);
    }
}
