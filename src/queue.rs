/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! An ordered FIFO over entries keyed by stream position.
//!
//! Almost every push lands at the back (the scanner reads
//! the stream front to back), but a handful of tokens are
//! discovered retroactively -- most importantly the KEY
//! token inserted once a ':' proves an earlier scalar was
//! an implicit key -- and must slot in *before* entries
//! already queued. Entries with equal keys keep insertion
//! order.

use std::{
    collections::VecDeque,
    fmt::{self, Debug},
};

pub(crate) struct Queue<T>
{
    entries: VecDeque<T>,
}

impl<T> Queue<T>
where
    T: Ord,
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Add an .item, placing it before any existing entry
    /// that compares strictly greater
    pub fn push(&mut self, item: T)
    {
        match self.entries.back()
        {
            // Fast path: in-order insert
            Some(last) if last <= &item => self.entries.push_back(item),
            None => self.entries.push_back(item),

            // Out of order: walk back to the partition point.
            // These inserts are rare and always near the back,
            // so a linear walk beats a binary search here.
            Some(_) =>
            {
                let mut at = self.entries.len();

                while at > 0 && self.entries[at - 1] > item
                {
                    at -= 1;
                }

                self.entries.insert(at, item);
            },
        }
    }

    pub fn pop(&mut self) -> Option<T>
    {
        self.entries.pop_front()
    }

    pub fn head(&self) -> Option<&T>
    {
        self.entries.front()
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }
}

impl<T> Default for Queue<T>
{
    fn default() -> Self
    {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<T> IntoIterator for Queue<T>
{
    type IntoIter = std::collections::vec_deque::IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter
    {
        self.entries.into_iter()
    }
}

impl<T> Debug for Queue<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct E(usize, &'static str);

    impl PartialOrd for E
    {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering>
        {
            Some(self.cmp(other))
        }
    }

    impl Ord for E
    {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering
        {
            self.0.cmp(&other.0)
        }
    }

    #[test]
    fn fifo_in_order()
    {
        let mut queue = Queue::new();

        for (at, name) in [(0, "a"), (3, "b"), (7, "c")]
        {
            queue.push(E(at, name));
        }

        let drained: Vec<_> = queue.into_iter().map(|e| e.1).collect();

        assert_eq!(drained, ["a", "b", "c"]);
    }

    #[test]
    fn retroactive_insert()
    {
        let mut queue = Queue::new();

        queue.push(E(5, "scalar"));
        queue.push(E(9, "value"));
        // The retroactive KEY token, discovered at offset 9 but
        // belonging before the scalar at 5
        queue.push(E(5, "key"));

        // Equal keys keep insertion order
        let drained: Vec<_> = queue.into_iter().map(|e| e.1).collect();

        assert_eq!(drained, ["scalar", "key", "value"]);
    }

    #[test]
    fn retroactive_insert_before()
    {
        let mut queue = Queue::new();

        queue.push(E(6, "scalar"));
        queue.push(E(9, "value"));
        queue.push(E(5, "key"));

        let drained: Vec<_> = queue.into_iter().map(|e| e.1).collect();

        assert_eq!(drained, ["key", "scalar", "value"]);
    }
}
