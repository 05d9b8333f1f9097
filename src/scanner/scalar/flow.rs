/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::{
    atom::{Atom, AtomStyle, AtomFlags, ScalarCell, A_ESCAPES, A_FOLDS},
    chars,
    scanner::{
        error::{ScanError, ScanResult as Result},
        flag::{Flags, O_INCREMENTAL},
        stats::Cursor,
    },
    token::Token,
};

/// Scan a quoted scalar from the head of .base, returning
/// the token and bytes consumed (including both quotes).
///
/// Escape sequences are validated here but not processed;
/// the atom records that they exist and the decoder does
/// the rest.
pub(in crate::scanner) fn scan_flow_scalar<'de>(
    opts: Flags,
    base: &'de str,
    cursor: &mut Cursor,
    single: bool,
) -> Result<(Token<'de>, usize)>
{
    let bytes = base.as_bytes();
    let start = cursor.read;

    let mut at = 1;
    let mut walk = cursor.clone();
    let mut flags = AtomFlags::empty();

    // Opening quote
    walk.push(1);

    let content_end = 'scalar: loop
    {
        if at >= bytes.len()
        {
            match opts.contains(O_INCREMENTAL)
            {
                true => return Err(ScanError::NeedMore),
                false => return Err(ScanError::UnexpectedEOF),
            }
        }

        match (single, bytes[at])
        {
            // An escaped quote; the only escape single quotes
            // have
            (true, b'\'') if check!(&base[at..] => [b'\'', b'\'', ..]) =>
            {
                flags |= A_ESCAPES;
                walk.push(2);
                at += 2;
            },
            (true, b'\'') | (false, b'"') => break 'scalar at,
            (false, b'\\') =>
            {
                flags |= A_ESCAPES;

                // An escaped line break joins lines
                let brk = chars::break_width(bytes, at + 1);
                if brk != 0
                {
                    flags |= A_FOLDS;
                    walk.push(1);
                    walk.push_break(brk);
                    at += 1 + brk;
                    continue;
                }

                let width = escape_width(bytes, at, opts)?;

                walk.push(width);
                at += width;
            },
            _ if chars::is_break(bytes, at) =>
            {
                flags |= A_FOLDS;

                let width = chars::break_width(bytes, at);

                walk.push_break(width);
                at += width;

                // A document marker terminates even a quoted
                // scalar
                if check!(&base[at..] => [b'-', b'-', b'-', ..] | [b'.', b'.', b'.', ..])
                    && chars::is_ws_z(bytes, at + 3)
                {
                    return Err(ScanError::InvalidFlowScalar);
                }
            },
            _ if !chars::is_printable(bytes, at) => return Err(ScanError::InvalidFlowScalar),
            _ =>
            {
                let width = chars::width_of(bytes, at).max(1);

                walk.push(width);
                at += width;
            },
        }
    };

    // Closing quote
    walk.push(1);

    let style = match single
    {
        true => AtomStyle::SingleQuote,
        false => AtomStyle::DoubleQuote,
    };

    let atom = Atom::new(&base[1..content_end], start + 1, style, flags, 0);
    let token = Token::Scalar(ScalarCell::from_atom(atom));

    *cursor = walk;

    Ok((token, content_end + 1))
}

/// Total byte width of the escape sequence at .at (which
/// holds the backslash), validating its shape
fn escape_width(bytes: &[u8], at: usize, opts: Flags) -> Result<usize>
{
    let hex_digits = match bytes.get(at + 1)
    {
        None => match opts.contains(O_INCREMENTAL)
        {
            true => return Err(ScanError::NeedMore),
            false => return Err(ScanError::UnexpectedEOF),
        },
        Some(b) => match b
        {
            b'0' | b'a' | b'b' | b't' | b'\t' | b'n' | b'v' | b'f' | b'r' | b'e' | b' '
            | b'"' | b'/' | b'\\' | b'N' | b'_' | b'L' | b'P' => return Ok(2),
            b'x' => 2,
            b'u' => 4,
            b'U' => 8,
            _ => return Err(ScanError::UnknownEscape),
        },
    };

    for offset in 0..hex_digits
    {
        if !chars::is_hex(bytes, at + 2 + offset)
        {
            let truncated = bytes.len() <= at + 2 + offset;

            return match truncated && opts.contains(O_INCREMENTAL)
            {
                true => Err(ScanError::NeedMore),
                false => Err(ScanError::UnknownEscape),
            };
        }
    }

    Ok(2 + hex_digits)
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::scanner::flag::O_ZEROED;

    fn scan(base: &str, single: bool) -> Result<(String, usize)>
    {
        let mut cursor = Cursor::new();

        scan_flow_scalar(O_ZEROED, base, &mut cursor, single).map(|(token, amount)| match token
        {
            Token::Scalar(cell) => (cell.text().unwrap().to_string(), amount),
            _ => unreachable!(),
        })
    }

    #[test]
    fn single_empty()
    {
        let (text, amount) = scan("''", true).unwrap();

        assert_eq!(text, "");
        assert_eq!(amount, 2);
    }

    #[test]
    fn single_simple()
    {
        let (text, amount) = scan("'hello world' rest", true).unwrap();

        assert_eq!(text, "hello world");
        assert_eq!(amount, 13);
    }

    #[test]
    fn single_escaped_quote()
    {
        let (text, _) = scan("'it''s'", true).unwrap();

        assert_eq!(text, "it's");
    }

    #[test]
    fn double_escapes()
    {
        let (text, _) = scan(r#""a\tb☺c""#, false).unwrap();

        assert_eq!(text, "a\tb\u{263A}c");
    }

    #[test]
    fn double_folds()
    {
        let (text, _) = scan("\"first\n  second\"", false).unwrap();

        assert_eq!(text, "first second");
    }

    #[test]
    fn rejects_unterminated()
    {
        assert_eq!(scan("'no end", true), Err(ScanError::UnexpectedEOF));
    }

    #[test]
    fn rejects_unknown_escape()
    {
        assert_eq!(scan(r#""bad \q""#, false), Err(ScanError::UnknownEscape));
    }

    #[test]
    fn rejects_document_marker()
    {
        assert_eq!(scan("'text\n--- '", true), Err(ScanError::InvalidFlowScalar));
    }
}
