/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use bitflags::bitflags;

/// An empty, zeroed flag set. This is the default set, with
/// all other flags disabled.
pub(crate) const O_ZEROED: Flags = Flags::empty();

/// Hints to the Scanner that the byte slice it was given is
/// a committed prefix of a larger stream. If set, the
/// Scanner returns the `NeedMore` sentinel when the slice
/// ends before a token does, rather than treating the end
/// of slice as the end of stream.
pub(crate) const O_INCREMENTAL: Flags = Flags::INCREMENTAL;

bitflags! {
    /// Directives controlling Scanner behavior, see each O_
    /// constant for an explanation
    #[derive(Default)]
    pub(crate) struct Flags: u32 {
        const INCREMENTAL = 0b00000001;
    }
}
