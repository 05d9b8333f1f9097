/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Tracks how far into the stream the scanner has read:
//! absolute bytes, lines seen, and the byte offset into the
//! current line.

use crate::token::Mark;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(in crate::scanner) struct Cursor
{
    /// Bytes consumed from the start of the stream
    pub read:   usize,
    /// Line breaks consumed
    pub line:   usize,
    /// Bytes consumed since the last line break
    pub column: usize,
}

impl Cursor
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Consume .bytes of non-break content
    pub fn push(&mut self, bytes: usize)
    {
        self.read += bytes;
        self.column += bytes;
    }

    /// Consume .bytes that occupy no column (the BOM)
    pub fn skip(&mut self, bytes: usize)
    {
        self.read += bytes;
    }

    /// Consume one line break of .width bytes
    pub fn push_break(&mut self, width: usize)
    {
        self.read += width;
        self.line += 1;
        self.column = 0;
    }

    /// Fold a sub-scan's cursor, started from zero, into
    /// this one
    pub fn absorb(&mut self, other: &Cursor)
    {
        self.read += other.read;
        self.line += other.line;

        match other.line
        {
            0 => self.column += other.column,
            _ => self.column = other.column,
        }
    }

    pub fn mark(&self) -> Mark
    {
        Mark::new(self.read, self.line, self.column)
    }
}

impl Default for Cursor
{
    fn default() -> Self
    {
        Self {
            read:   0,
            line:   0,
            column: 0,
        }
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn absorb_keeps_column_semantics()
    {
        let mut outer = Cursor {
            read:   10,
            line:   2,
            column: 4,
        };

        let mut inner = Cursor::new();
        inner.push(3);

        outer.absorb(&inner);
        assert_eq!((outer.read, outer.line, outer.column), (13, 2, 7));

        let mut inner = Cursor::new();
        inner.push_break(1);
        inner.push(2);

        outer.absorb(&inner);
        assert_eq!((outer.read, outer.line, outer.column), (16, 3, 2));
    }
}
