/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::{
    atom::{Atom, AtomStyle, ScalarCell, A_FOLDS, A_NIL},
    chars,
    scanner::{
        context::Context,
        error::{ScanError, ScanResult as Result},
        flag::{Flags, O_INCREMENTAL},
        stats::Cursor,
    },
    token::Token,
};

/// Scan a plain scalar from the head of .base, returning
/// the token and the bytes consumed.
///
/// Only the scalar's content is consumed: trailing blanks
/// (and the whitespace of a rejected continuation line)
/// stay in the buffer for the next fetch. The ending rules:
///
/// - block context: ':' followed by whitespace, or ' #'
/// - flow context: additionally any flow indicator, and ':'
///   followed by one
/// - either: a document marker at column 0, a line at or
///   below the current block indent, end of stream
pub(in crate::scanner) fn scan_plain_scalar<'de>(
    opts: Flags,
    base: &'de str,
    cursor: &mut Cursor,
    context: &Context,
) -> Result<(Token<'de>, usize)>
{
    let bytes = base.as_bytes();
    let block = context.is_block();
    let indent = context.indent();
    let start = cursor.read;

    let mut at = 0;
    let mut walk = cursor.clone();

    // The committed scalar: everything up to the last non
    // blank character consumed, with the cursor state there
    let mut content_end = 0;
    let mut committed = cursor.clone();

    let mut folds = false;

    'scan: loop
    {
        // One line of content
        while !chars::is_break_z(bytes, at)
        {
            let byte = bytes[at];

            // ' #' starts a comment, ending the scalar
            if byte == b'#' && at > 0 && chars::is_ws(bytes, at - 1)
            {
                break 'scan;
            }

            if byte == b':'
            {
                let ends = match block
                {
                    true => chars::is_ws_z(bytes, at + 1),
                    false =>
                    {
                        chars::is_ws_z(bytes, at + 1) || chars::is_flow_indicator(bytes, at + 1)
                    },
                };

                if ends
                {
                    break 'scan;
                }
            }

            if !block && chars::is_flow_indicator(bytes, at)
            {
                break 'scan;
            }

            if !chars::is_printable(bytes, at)
            {
                return Err(ScanError::InvalidPlainScalar);
            }

            let width = chars::width_of(bytes, at).max(1);

            walk.push(width);
            at += width;

            if !chars::is_blank(bytes, at - width)
            {
                content_end = at;
                committed = walk.clone();
            }
        }

        if at >= bytes.len()
        {
            if opts.contains(O_INCREMENTAL)
            {
                return Err(ScanError::NeedMore);
            }

            break 'scan;
        }

        // Peek past the break (and any blank lines) for a
        // continuation line; nothing is committed unless the
        // scalar really does continue
        let mut peek = at;
        let mut peek_walk = walk.clone();

        loop
        {
            let width = chars::break_width(bytes, peek);

            if width != 0
            {
                peek_walk.push_break(width);
                peek += width;
            }
            else if chars::is_blank(bytes, peek)
            {
                peek_walk.push(1);
                peek += 1;
            }
            else
            {
                break;
            }
        }

        if peek >= bytes.len()
        {
            if opts.contains(O_INCREMENTAL)
            {
                return Err(ScanError::NeedMore);
            }

            break 'scan;
        }

        // A document marker always ends the scalar
        if peek_walk.column == 0
            && check!(&base[peek..] => [b'-', b'-', b'-', ..] | [b'.', b'.', b'.', ..])
            && chars::is_ws_z(bytes, peek + 3)
        {
            break 'scan;
        }

        // In the block context a continuation must be deeper
        // than the open indent
        if block && !(indent < peek_walk.column)
        {
            break 'scan;
        }

        folds = true;
        at = peek;
        walk = peek_walk;
    }

    if content_end == 0
    {
        return Err(ScanError::InvalidPlainScalar);
    }

    let flags = match folds
    {
        true => A_FOLDS,
        false => A_NIL,
    };

    let atom = Atom::new(&base[..content_end], start, AtomStyle::Plain, flags, 0);
    let token = Token::Scalar(ScalarCell::from_atom(atom));

    *cursor = committed;

    Ok((token, content_end))
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::scanner::flag::O_ZEROED;

    fn scan(base: &str) -> Result<(String, usize)>
    {
        let mut cursor = Cursor::new();
        let context = Context::new();

        scan_plain_scalar(O_ZEROED, base, &mut cursor, &context).map(|(token, amount)| {
            match token
            {
                Token::Scalar(cell) => (cell.text().unwrap().to_string(), amount),
                _ => unreachable!(),
            }
        })
    }

    #[test]
    fn simple()
    {
        let (text, amount) = scan("a plain scalar").unwrap();

        assert_eq!(text, "a plain scalar");
        assert_eq!(amount, 14);
    }

    #[test]
    fn stops_at_value()
    {
        let (text, amount) = scan("key: value").unwrap();

        assert_eq!(text, "key");
        assert_eq!(amount, 3);
    }

    #[test]
    fn colon_without_space_is_content()
    {
        let (text, _) = scan("http://example.com").unwrap();

        assert_eq!(text, "http://example.com");
    }

    #[test]
    fn stops_at_comment()
    {
        let (text, _) = scan("value # a comment").unwrap();

        assert_eq!(text, "value");
    }

    #[test]
    fn multiline_folds()
    {
        let (text, _) = scan("first\n  second\n\n  third").unwrap();

        assert_eq!(text, "first second\nthird");
    }

    #[test]
    fn stops_at_document_marker()
    {
        let (text, _) = scan("content\n--- next").unwrap();

        assert_eq!(text, "content");
    }

    #[test]
    fn incremental_suspends()
    {
        let mut cursor = Cursor::new();
        let context = Context::new();

        let run = scan_plain_scalar(O_INCREMENTAL, "partial", &mut cursor, &context);

        assert_eq!(run.unwrap_err(), ScanError::NeedMore);
    }
}
