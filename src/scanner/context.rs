/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Tracks which YAML context the scanner is in. Flow
//! contexts (inside '[' / '{') may nest inside block
//! contexts, but never the reverse; while the flow level is
//! non zero the indentation stack is frozen.

use std::ops::Add;

use crate::scanner::error::{ScanError, ScanResult as Result};

/// The block collection kind an indentation level was
/// opened for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::scanner) enum Collection
{
    Mapping,
    Sequence,
}

/// One open indentation level
#[derive(Debug, Clone)]
pub(in crate::scanner) struct IndentEntry
{
    pub column: usize,
    pub kind:   Collection,

    /// Line the level was opened (or refreshed) on; used to
    /// detect zero indented sequences going stale
    pub line: usize,

    /// A sequence opened at its parent mapping's own column
    pub zero_indented: bool,
}

/// The scanner's indentation stack and flow level counter
#[derive(Debug, Clone, Default)]
pub(in crate::scanner) struct Context
{
    flow:    usize,
    indents: Vec<IndentEntry>,
}

/// The indent "below" every real column: the state before
/// any block collection has opened
pub(in crate::scanner) const STARTING_INDENT: Indent = Indent(None);

impl Context
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn is_flow(&self) -> bool
    {
        self.flow != 0
    }

    pub fn is_block(&self) -> bool
    {
        !self.is_flow()
    }

    pub fn flow(&self) -> usize
    {
        self.flow
    }

    pub fn flow_increment(&mut self) -> Result<usize>
    {
        self.flow = self.flow.checked_add(1).ok_or(ScanError::IntOverflow)?;

        Ok(self.flow)
    }

    pub fn flow_decrement(&mut self) -> Result<usize>
    {
        self.flow = self.flow.checked_sub(1).ok_or(ScanError::IntOverflow)?;

        Ok(self.flow)
    }

    /// The innermost open indentation column
    pub fn indent(&self) -> Indent
    {
        Indent(self.indents.last().map(|entry| entry.column))
    }

    pub fn push_indent(&mut self, column: usize, line: usize, kind: Collection)
    {
        self.indents.push(IndentEntry {
            column,
            kind,
            line,
            zero_indented: false,
        });
    }

    /// Pop levels while the innermost is deeper than
    /// .column, calling .f once per level popped
    pub fn pop_indents_to<T, F>(&mut self, column: T, mut f: F) -> Result<usize>
    where
        T: Into<Indent>,
        F: FnMut(&IndentEntry) -> Result<()>,
    {
        let column = column.into();
        let before = self.indents.len();

        while let Some(entry) = self.indents.last()
        {
            if Indent(Some(entry.column)) <= column
            {
                break;
            }

            f(entry)?;
            self.indents.pop();
        }

        Ok(before - self.indents.len())
    }

    /// Pop exactly one level, calling .f with it
    pub fn pop_indent<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&IndentEntry) -> Result<()>,
    {
        if let Some(entry) = self.indents.last()
        {
            f(entry)?;
            self.indents.pop();
        }

        Ok(())
    }

    pub fn last(&self) -> Option<&IndentEntry>
    {
        self.indents.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut IndentEntry>
    {
        self.indents.last_mut()
    }
}

/// A wrapper around usize that can also express the
/// "before any indent" state without a signed type. Until
/// the first block collection opens the whole document
/// could be a scalar, and no real column is an indent yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(in crate::scanner) struct Indent(Option<usize>);

impl From<usize> for Indent
{
    fn from(indent: usize) -> Self
    {
        Self(Some(indent))
    }
}

impl PartialEq<usize> for Indent
{
    fn eq(&self, other: &usize) -> bool
    {
        self.0.map_or(false, |indent| indent == *other)
    }
}

impl PartialOrd<usize> for Indent
{
    fn partial_cmp(&self, other: &usize) -> Option<std::cmp::Ordering>
    {
        match self.0
        {
            Some(indent) => indent.partial_cmp(other),
            None => Some(std::cmp::Ordering::Less),
        }
    }
}

impl Add<usize> for Indent
{
    type Output = usize;

    fn add(self, rhs: usize) -> Self::Output
    {
        match self.0
        {
            Some(indent) => indent + rhs,
            None => rhs,
        }
    }
}
