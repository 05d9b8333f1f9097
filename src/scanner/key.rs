/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Simple (implicit) key candidates.
//!
//! When a token that could open a mapping key is scanned in
//! a position where a key would be legal, its mark is saved
//! here. If a ':' later proves the guess right, a KEY token
//! is queued retroactively at the saved mark.
//!
//! One candidate is tracked per flow level: the token
//! opening a flow collection is itself a candidate *in the
//! enclosing level* ('[a]: x' is legal), so levels must not
//! clobber each other.
//!
//! There is no length cap on candidates -- the queue is
//! keyed by position, not by buffered text -- but a
//! candidate dies when a line break passes it, since
//! implicit keys are bounded to a single line.

use crate::token::Mark;

#[derive(Debug, Clone, Copy)]
pub(in crate::scanner) struct Candidate
{
    pub mark: Mark,

    /// A required candidate *must* become a key; failing to
    /// find its ':' is an error rather than a demotion
    pub required: bool,

    /// Cleared when the candidate expires; the entry is
    /// kept so a required miss can still be reported
    pub allowed: bool,
}

#[derive(Debug, Clone)]
pub(in crate::scanner) struct SimpleKey
{
    // One slot per flow level; slot 0 is the block context
    slots: Vec<Option<Candidate>>,
}

impl SimpleKey
{
    pub fn new() -> Self
    {
        Self {
            slots: vec![None],
        }
    }

    /// Save a candidate at the current level, replacing any
    /// existing one
    pub fn save(&mut self, mark: Mark, required: bool)
    {
        *self.current_mut() = Some(Candidate {
            mark,
            required,
            allowed: true,
        });
    }

    /// Take the current level's candidate
    pub fn take(&mut self) -> Option<Candidate>
    {
        self.current_mut().take()
    }

    pub fn get(&self) -> Option<&Candidate>
    {
        self.slots.last().and_then(|slot| slot.as_ref())
    }

    /// A '[' or '{' was consumed: open a fresh level
    pub fn enter_flow(&mut self)
    {
        self.slots.push(None);
    }

    /// A ']' or '}' was consumed: drop the level and any
    /// unresolved candidate in it
    pub fn leave_flow(&mut self) -> Option<Candidate>
    {
        match self.slots.len() > 1
        {
            true => self.slots.pop().flatten(),
            false => self.current_mut().take(),
        }
    }

    /// Is any candidate, at any level, still pending
    /// resolution? While one is, queued tokens may yet be
    /// reordered and must not be released.
    pub fn pending(&self) -> bool
    {
        self.slots
            .iter()
            .flatten()
            .any(|candidate| candidate.allowed)
    }

    /// Expire candidates a line break has passed, returning
    /// the error mark if one of them was required
    pub fn expire_passed(&mut self, line: usize) -> Result<(), Mark>
    {
        for candidate in self.slots.iter_mut().flatten()
        {
            if candidate.allowed && candidate.mark.line < line
            {
                if candidate.required
                {
                    return Err(candidate.mark);
                }

                candidate.allowed = false;
            }
        }

        Ok(())
    }

    fn current_mut(&mut self) -> &mut Option<Candidate>
    {
        // .slots is never empty: constructed with the block
        // slot, and leave_flow refuses to pop it
        self.slots.last_mut().expect("key slots cannot be empty")
    }
}

impl Default for SimpleKey
{
    fn default() -> Self
    {
        Self::new()
    }
}
