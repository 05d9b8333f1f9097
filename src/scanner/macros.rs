/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The cursor movement and byte matching macros shared by
//! lib/scanner.

/// Rebind .buffer's binding .amount bytes (or one @line
/// break) forward, optionally updating a .cursor.
///
/// @line *will not move* the buffer if it does not start
/// with a YAML line break.
///
/// Variants
///     /1 .buffer, .amount
///     /2 .buffer, :.cursor, .amount
///     /3 .buffer, @line
///     /4 .buffer, :.cursor, @line
macro_rules! advance {
    ($buffer:expr, $amount:expr) => {
        $buffer = &$buffer[$amount..]
    };
    ($buffer:expr, :$cursor:expr, $amount:expr) => {{
        $cursor.push($amount);
        $buffer = &$buffer[$amount..]
    }};
    ($buffer:expr, @line) => {{
        let width = $crate::chars::break_width($buffer.as_bytes(), 0);
        $buffer = &$buffer[width..]
    }};
    ($buffer:expr, :$cursor:expr, @line) => {{
        let width = $crate::chars::break_width($buffer.as_bytes(), 0);
        $cursor.push_break(width);
        $buffer = &$buffer[width..]
    }};
}

/// Push a token into the queue at the given .mark
///
/// Variants
///     /1 .token, .mark => .tokens
macro_rules! enqueue {
    ($token:expr, $mark:expr => $tokens:expr) => {
        $tokens.push($crate::scanner::entry::TokenEntry::new($token, $mark))
    };
}

/// New cow pointer from the given expr
macro_rules! cow {
    ($from:expr) => {
        std::borrow::Cow::from($from)
    };
}

/// Check the .buffer (as bytes) matches the given slice
/// .pattern(s), returning a bool
///
/// Variants
///     /1 .buffer => .pattern *[ | .pattern ]
macro_rules! check {
    ($buffer:expr => $( $match:pat_param )|+) => {
        matches!($buffer.as_bytes(), $( $match )|+)
    };
}

/// Ensure at least .codepoints whole codepoints are visible
/// at the head of .buffer, returning the NeedMore sentinel
/// when the slice runs out first *and* the .opts mark the
/// stream incremental. A truncated slice on a terminal
/// stream is left for the caller's EOF handling.
///
/// Variants
///     /1 .buffer, .codepoints, .opts
macro_rules! lookahead {
    ($buffer:expr, $codepoints:expr, $opts:expr) => {{
        let bytes = $buffer.as_bytes();
        let mut at = 0;
        let mut ok = true;

        for _ in 0..$codepoints
        {
            match $crate::chars::width_of(bytes, at)
            {
                0 => {
                    ok = false;
                    break;
                },
                width if bytes.len() < at + width => {
                    ok = false;
                    break;
                },
                width => at += width,
            }
        }

        match ok || !$opts.contains($crate::scanner::flag::O_INCREMENTAL)
        {
            true => Ok(()),
            false => Err($crate::scanner::error::ScanError::NeedMore),
        }
    }};
}
