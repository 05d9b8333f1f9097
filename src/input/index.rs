/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Byte offset to line / column mapping.
//!
//! The break table is built lazily and extended
//! incrementally, so repeated lookups over the same data
//! are amortised O(log lines) with a single O(n) scan of
//! the bytes ever performed.

use crate::chars;

#[derive(Debug, Clone, Default)]
pub(crate) struct LineIndex
{
    /// Offsets one past each line break seen, in order
    starts:  Vec<usize>,
    covered: usize,
}

impl LineIndex
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Map .offset into .data to its 0-based (line, column).
    /// The column is a byte offset into the line.
    pub fn locate(&mut self, data: &str, offset: usize) -> (usize, usize)
    {
        self.extend(data);

        let line = self.starts.partition_point(|start| *start <= offset);
        let line_start = match line
        {
            0 => 0,
            n => self.starts[n - 1],
        };

        (line, offset.saturating_sub(line_start))
    }

    fn extend(&mut self, data: &str)
    {
        let bytes = data.as_bytes();
        let mut at = self.covered;

        while at < bytes.len()
        {
            match chars::break_width(bytes, at)
            {
                0 => at += chars::width_of(bytes, at).max(1),
                width =>
                {
                    at += width;
                    self.starts.push(at);
                },
            }
        }

        self.covered = self.covered.max(at);
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn locates_lines_and_columns()
    {
        let data = "one\ntwo\r\nthree";
        let mut index = LineIndex::new();

        assert_eq!(index.locate(data, 0), (0, 0));
        assert_eq!(index.locate(data, 2), (0, 2));
        assert_eq!(index.locate(data, 4), (1, 0));
        assert_eq!(index.locate(data, 6), (1, 2));
        // CR LF is one break
        assert_eq!(index.locate(data, 9), (2, 0));
        assert_eq!(index.locate(data, 13), (2, 4));
    }

    #[test]
    fn extends_incrementally()
    {
        let mut index = LineIndex::new();

        assert_eq!(index.locate("a\nb", 2), (1, 0));
        assert_eq!(index.locate("a\nb\nc", 4), (2, 0));
    }
}
