/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::{
    atom::{Atom, AtomStyle, A_ESCAPES, A_NIL},
    chars,
    scanner::{
        error::{ScanError, ScanResult as Result},
        stats::Cursor,
    },
    token::Token,
};

/// Scan a node tag from the head of .base, returning the
/// token and bytes consumed.
///
/// The shapes accepted:
///
///     !                   non specific
///     !suffix             primary handle
///     !!suffix            secondary handle
///     !handle!suffix      named handle
///     !<verbatim:uri>     verbatim, handle is empty
pub(in crate::scanner) fn scan_node_tag<'de>(
    base: &'de str,
    cursor: &mut Cursor,
) -> Result<(Token<'de>, usize)>
{
    let mut buffer = base;

    // Verbatim tags skip handle resolution entirely
    if check!(buffer => [b'!', b'<', ..])
    {
        advance!(buffer, :cursor, 2);

        let (uri, len) = scan_uri(&mut buffer, cursor, false)?;

        if !check!(buffer => [b'>', ..])
        {
            return Err(ScanError::InvalidTagSuffix);
        }

        advance!(buffer, :cursor, 1);

        if len == 0 || !tag_ends(buffer)
        {
            return Err(ScanError::InvalidTagSuffix);
        }

        return Ok((Token::Tag(cow!(""), uri), base.len() - buffer.len()));
    }

    let handle_len = scan_handle_len(buffer);
    let handle = &buffer[..handle_len];

    advance!(buffer, :cursor, handle_len);

    let (suffix, _) = scan_uri(&mut buffer, cursor, true)?;

    if !tag_ends(buffer)
    {
        return Err(ScanError::InvalidTagSuffix);
    }

    Ok((Token::Tag(cow!(handle), suffix), base.len() - buffer.len()))
}

/// Byte length of the tag handle opening .buffer: "!",
/// "!!", or "!word!"
fn scan_handle_len(buffer: &str) -> usize
{
    let bytes = buffer.as_bytes();

    if check!(buffer => [b'!', b'!', ..])
    {
        return 2;
    }

    let mut words = 1;

    while chars::is_word(bytes, words)
    {
        words += 1;
    }

    // A named handle needs its closing '!'; otherwise the word
    // run is the suffix of the primary handle
    match words > 1 && check!(&buffer[words..] => [b'!', ..])
    {
        true => words + 1,
        false => 1,
    }
}

/// Consume a run of URI characters, returning the presented
/// (percent decoded) text. Flow indicators terminate the
/// run when .exclude_flow is set, so tags inside flow
/// collections do not swallow their delimiters.
fn scan_uri<'de>(
    buffer: &mut &'de str,
    cursor: &mut Cursor,
    exclude_flow: bool,
) -> Result<(crate::token::Slice<'de>, usize)>
{
    let source: &'de str = buffer;
    let bytes = source.as_bytes();
    let mut len = 0;
    let mut escapes = false;

    loop
    {
        if exclude_flow && chars::is_flow_indicator(bytes, len)
        {
            break;
        }

        if !chars::is_uri_char(bytes, len)
        {
            break;
        }

        if bytes[len] == b'%'
        {
            if !(chars::is_hex(bytes, len + 1) && chars::is_hex(bytes, len + 2))
            {
                return Err(ScanError::InvalidTagSuffix);
            }

            escapes = true;
            len += 3;
            continue;
        }

        len += 1;
    }

    let flags = match escapes
    {
        true => A_ESCAPES,
        false => A_NIL,
    };

    let uri = Atom::new(&source[..len], cursor.read, AtomStyle::Uri, flags, 0)
        .decode()
        .map_err(|_| ScanError::InvalidTagSuffix)?;

    advance!(*buffer, :cursor, len);

    Ok((uri, len))
}

/// A tag must be followed by whitespace, end of stream, or
/// (so flow collections stay parseable) a flow indicator
fn tag_ends(buffer: &str) -> bool
{
    chars::is_ws_z(buffer.as_bytes(), 0) || chars::is_flow_indicator(buffer.as_bytes(), 0)
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn primary_and_secondary()
    {
        let (token, amount) = scan_node_tag("!local value", &mut Cursor::new()).unwrap();

        assert_eq!(token, Token::Tag(cow!("!"), cow!("local")));
        assert_eq!(amount, 6);

        let (token, _) = scan_node_tag("!!str value", &mut Cursor::new()).unwrap();

        assert_eq!(token, Token::Tag(cow!("!!"), cow!("str")));
    }

    #[test]
    fn named_handle()
    {
        let (token, _) = scan_node_tag("!e!widget value", &mut Cursor::new()).unwrap();

        assert_eq!(token, Token::Tag(cow!("!e!"), cow!("widget")));
    }

    #[test]
    fn non_specific()
    {
        let (token, amount) = scan_node_tag("! value", &mut Cursor::new()).unwrap();

        assert_eq!(token, Token::Tag(cow!("!"), cow!("")));
        assert_eq!(amount, 1);
    }

    #[test]
    fn verbatim()
    {
        let (token, _) =
            scan_node_tag("!<tag:yaml.org,2002:str> v", &mut Cursor::new()).unwrap();

        assert_eq!(token, Token::Tag(cow!(""), cow!("tag:yaml.org,2002:str")));
    }

    #[test]
    fn percent_escapes_decode()
    {
        let (token, _) = scan_node_tag("!e!a%20b value", &mut Cursor::new()).unwrap();

        assert_eq!(token, Token::Tag(cow!("!e!"), cow!("a b")));
    }

    #[test]
    fn rejects_dangling_escape()
    {
        assert_eq!(
            scan_node_tag("!!a%2 value", &mut Cursor::new()),
            Err(ScanError::InvalidTagSuffix)
        );
    }
}
