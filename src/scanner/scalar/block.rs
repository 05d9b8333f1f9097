/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::{
    atom::{Atom, AtomFlags, AtomStyle, ScalarCell, A_CHOMP_KEEP, A_CHOMP_STRIP},
    chars,
    scanner::{
        context::Context,
        error::{ScanError, ScanResult as Result},
        flag::{Flags, O_INCREMENTAL},
        stats::Cursor,
    },
    token::Token,
};

/// Scan a block scalar ('|' literal or '>' folded) from the
/// head of .base, returning the token and bytes consumed.
///
/// The header may carry an explicit indentation indicator
/// (1-9, relative to the enclosing block level) and a
/// chomping indicator ('+' keep, '-' strip), in either
/// order. Without an explicit indicator the content indent
/// is detected from the first non empty line.
pub(in crate::scanner) fn scan_block_scalar<'de>(
    opts: Flags,
    base: &'de str,
    cursor: &mut Cursor,
    context: &Context,
    fold: bool,
) -> Result<(Token<'de>, usize)>
{
    let bytes = base.as_bytes();
    let parent = context.indent();
    let start = cursor.read;

    let mut at = 1;
    let mut walk = cursor.clone();

    // '|' / '>'
    walk.push(1);

    // Header indicators
    let mut explicit: Option<usize> = None;
    let mut flags = AtomFlags::empty();

    loop
    {
        match bytes.get(at)
        {
            Some(b'1'..=b'9') if explicit.is_none() =>
            {
                explicit = Some((bytes[at] - b'0') as usize);
            },
            Some(b'+') if !flags.intersects(A_CHOMP_KEEP | A_CHOMP_STRIP) =>
            {
                flags |= A_CHOMP_KEEP;
            },
            Some(b'-') if !flags.intersects(A_CHOMP_KEEP | A_CHOMP_STRIP) =>
            {
                flags |= A_CHOMP_STRIP;
            },
            Some(b'0') => return Err(ScanError::InvalidBlockScalar),
            _ => break,
        }

        walk.push(1);
        at += 1;
    }

    // Only blanks and a comment may follow the header
    while chars::is_blank(bytes, at)
    {
        walk.push(1);
        at += 1;
    }

    if check!(&base[at..] => [b'#', ..])
    {
        while !chars::is_break_z(bytes, at)
        {
            let width = chars::width_of(bytes, at).max(1);

            walk.push(width);
            at += width;
        }
    }

    let header_break = chars::break_width(bytes, at);

    if header_break == 0 && at < bytes.len()
    {
        return Err(ScanError::InvalidBlockScalar);
    }

    if at >= bytes.len() && opts.contains(O_INCREMENTAL)
    {
        return Err(ScanError::NeedMore);
    }

    if header_break != 0
    {
        walk.push_break(header_break);
        at += header_break;
    }

    // Body: consume lines while they are empty or indented
    // to the scalar's level
    let body_start = at;
    let mut indent = explicit.map(|n| parent + n);
    let mut end = at;

    loop
    {
        if at >= bytes.len()
        {
            if opts.contains(O_INCREMENTAL)
            {
                return Err(ScanError::NeedMore);
            }

            break;
        }

        // Measure the line's leading spaces without committing
        let mut lead = 0;

        while check!(&base[at + lead..] => [b' ', ..])
        {
            lead += 1;
        }

        let content = at + lead;

        if chars::is_break_z(bytes, content)
        {
            if content >= bytes.len()
            {
                if opts.contains(O_INCREMENTAL)
                {
                    return Err(ScanError::NeedMore);
                }

                // Trailing blanks with no break are not content
                break;
            }

            // An empty line always belongs to the scalar
            let width = chars::break_width(bytes, content);

            walk.push(lead);
            walk.push_break(width);
            at = content + width;
            end = at;

            continue;
        }

        // A content line: settle the indent on the first one
        let scalar_indent = match indent
        {
            Some(value) => value,
            None =>
            {
                if !(parent < lead)
                {
                    // Content at or above the parent level: the
                    // scalar is empty and this line is the next
                    // token's
                    break;
                }

                indent = Some(lead);

                lead
            },
        };

        if lead < scalar_indent
        {
            break;
        }

        // Commit the line through its break (or EOF)
        walk.push(lead);
        at = content;

        while !chars::is_break_z(bytes, at)
        {
            if !chars::is_printable(bytes, at)
            {
                return Err(ScanError::InvalidBlockScalar);
            }

            let width = chars::width_of(bytes, at).max(1);

            walk.push(width);
            at += width;
        }

        let width = chars::break_width(bytes, at);

        match width
        {
            0 => end = at,
            width =>
            {
                walk.push_break(width);
                at += width;
                end = at;
            },
        }
    }

    let style = match fold
    {
        true => AtomStyle::Folded,
        false => AtomStyle::Literal,
    };

    let atom = Atom::new(
        &base[body_start..end],
        start + body_start,
        style,
        flags,
        indent.unwrap_or(0),
    );
    let token = Token::Scalar(ScalarCell::from_atom(atom));

    *cursor = walk;

    Ok((token, end))
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::scanner::flag::O_ZEROED;

    fn scan(base: &str, fold: bool) -> Result<String>
    {
        let mut cursor = Cursor::new();
        let context = Context::new();

        scan_block_scalar(O_ZEROED, base, &mut cursor, &context, fold).map(|(token, _)| {
            match token
            {
                Token::Scalar(cell) => cell.text().unwrap().to_string(),
                _ => unreachable!(),
            }
        })
    }

    #[test]
    fn literal_simple()
    {
        let text = scan("|\n  line one\n  line two\n", false).unwrap();

        assert_eq!(text, "line one\nline two\n");
    }

    #[test]
    fn literal_keeps_inner_breaks()
    {
        let text = scan("|\n  a\n\n  b\n", false).unwrap();

        assert_eq!(text, "a\n\nb\n");
    }

    #[test]
    fn folded_joins()
    {
        let text = scan(">\n  a\n  b\n\n  c\n", true).unwrap();

        assert_eq!(text, "a b\nc\n");
    }

    #[test]
    fn chomp_strip_and_keep()
    {
        assert_eq!(scan("|-\n  text\n\n", false).unwrap(), "text");
        assert_eq!(scan("|+\n  text\n\n", false).unwrap(), "text\n\n");
    }

    #[test]
    fn explicit_indent()
    {
        let text = scan("|2\n   deep\n", false).unwrap();

        assert_eq!(text, " deep\n");
    }

    #[test]
    fn stops_at_dedent()
    {
        let mut cursor = Cursor::new();
        let context = Context::new();
        let base = "|\n  content\nnext: token\n";

        let (token, amount) = scan_block_scalar(O_ZEROED, base, &mut cursor, &context, false)
            .expect("scan block scalar");

        match token
        {
            Token::Scalar(cell) => assert_eq!(cell.text().unwrap(), "content\n"),
            _ => unreachable!(),
        }

        assert_eq!(&base[amount..], "next: token\n");
    }

    #[test]
    fn rejects_bad_header()
    {
        assert_eq!(scan("| trailing junk\n", false), Err(ScanError::InvalidBlockScalar));
        assert_eq!(scan("|0\n", false), Err(ScanError::InvalidBlockScalar));
    }
}
