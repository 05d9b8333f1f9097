/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::cell::RefCell;

use crate::{
    input::{error::InputError, index::LineIndex, Source, SourceContext, SourceSealed},
    scanner::error::ScanError,
};

/// A [`Source`] borrowing its bytes from the caller. The
/// cheapest source: the scanner reads straight out of the
/// borrowed slice and every scalar that needs no decoding
/// is a zero copy view into it.
#[derive(Debug)]
pub struct BorrowSource<'s>
{
    data:  &'s str,
    index: RefCell<LineIndex>,
}

impl<'s> BorrowSource<'s>
{
    pub(crate) fn new(data: &'s str) -> Self
    {
        Self {
            data,
            index: RefCell::new(LineIndex::new()),
        }
    }

    pub(crate) fn try_from_bytes(slice: &'s [u8]) -> Result<Self, InputError>
    {
        std::str::from_utf8(slice)
            .map(Self::new)
            .map_err(Into::into)
    }

    /// The full backing slice
    pub fn data(&self) -> &'s str
    {
        self.data
    }

    /// Map a byte .offset to its 0-based (line, column)
    pub fn locate(&self, offset: usize) -> (usize, usize)
    {
        self.index.borrow_mut().locate(self.data, offset)
    }
}

impl Source for BorrowSource<'_>
{
    fn drive<'de>(&'de self, cxt: SourceContext<'_, '_, 'de>) -> Result<(), InputError>
    {
        let (scanner, queue, flags) = cxt.into_parts();

        match scanner.scan_tokens(flags, self.data, queue)
        {
            Ok(_) => Ok(()),
            // A borrowed slice is complete: the scanner never
            // suspends over it
            Err(ScanError::NeedMore) => Err(ScanError::UnexpectedEOF.into()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SourceSealed for BorrowSource<'_> {}
