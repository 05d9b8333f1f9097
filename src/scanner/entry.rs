/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::cmp::Ordering;

use crate::token::{Mark, Marker, Token};

/// A queued token plus the stream mark it was read at. The
/// Ord impl orders entries by position only -- the queue
/// relies on this to slot retroactive tokens in place.
#[derive(Debug)]
pub(crate) struct TokenEntry<'de>
{
    pub token: Token<'de>,
    mark:      Mark,
}

impl<'de> TokenEntry<'de>
{
    pub fn new(token: Token<'de>, mark: Mark) -> Self
    {
        Self { token, mark }
    }

    pub fn mark(&self) -> Mark
    {
        self.mark
    }

    pub fn read_at(&self) -> usize
    {
        self.mark.at
    }

    pub fn marker(&self) -> Marker
    {
        Marker::from(&self.token)
    }

    pub fn into_token(self) -> Token<'de>
    {
        self.token
    }
}

impl PartialEq for TokenEntry<'_>
{
    fn eq(&self, other: &Self) -> bool
    {
        self.mark.at.eq(&other.mark.at)
    }
}

impl Eq for TokenEntry<'_> {}

impl PartialOrd for TokenEntry<'_>
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        Some(self.cmp(other))
    }
}

impl Ord for TokenEntry<'_>
{
    fn cmp(&self, other: &Self) -> Ordering
    {
        self.mark.at.cmp(&other.mark.at)
    }
}
