/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::{
    chars,
    scanner::{
        error::{ScanError, ScanResult as Result},
        stats::Cursor,
    },
    token::Token,
};

/// Scan a '%' directive from the head of .base, returning
/// the token and the bytes consumed. Trailing content on
/// the directive line (other than whitespace and a comment)
/// is an error.
pub(in crate::scanner) fn scan_directive<'de>(
    base: &'de str,
    cursor: &mut Cursor,
) -> Result<(Token<'de>, usize)>
{
    let mut buffer = base;

    // '%'
    advance!(buffer, :cursor, 1);

    let name_len = run_while(buffer, chars::is_alpha);

    let token = match &buffer[..name_len]
    {
        "YAML" =>
        {
            advance!(buffer, :cursor, name_len);
            eat_blanks(&mut buffer, cursor);

            scan_version(&mut buffer, cursor)?
        },
        "TAG" =>
        {
            advance!(buffer, :cursor, name_len);
            eat_blanks(&mut buffer, cursor);

            scan_tag_directive(&mut buffer, cursor)?
        },
        _ => return Err(ScanError::UnknownDirective),
    };

    // Nothing but blanks and an optional comment may follow
    eat_blanks(&mut buffer, cursor);

    if !(chars::is_break_z(buffer.as_bytes(), 0) || check!(buffer => [b'#', ..]))
    {
        return Err(ScanError::UnknownDirective);
    }

    Ok((token, base.len() - buffer.len()))
}

/// %YAML <major>.<minor>
fn scan_version<'de>(buffer: &mut &'de str, cursor: &mut Cursor) -> Result<Token<'de>>
{
    let major = scan_version_number(buffer, cursor)?;

    if !check!(buffer => [b'.', ..])
    {
        return Err(ScanError::InvalidVersion);
    }

    advance!(*buffer, :cursor, 1);

    let minor = scan_version_number(buffer, cursor)?;

    Ok(Token::VersionDirective(major, minor))
}

fn scan_version_number(buffer: &mut &str, cursor: &mut Cursor) -> Result<u8>
{
    let digits = run_while(buffer, chars::is_digit);

    if digits == 0
    {
        return Err(ScanError::InvalidVersion);
    }

    let number = atoi::atoi::<u8>(buffer[..digits].as_bytes()).ok_or(ScanError::IntOverflow)?;

    advance!(*buffer, :cursor, digits);

    Ok(number)
}

/// %TAG <handle> <prefix>
fn scan_tag_directive<'de>(buffer: &mut &'de str, cursor: &mut Cursor) -> Result<Token<'de>>
{
    // Handle: '!', '!!' or '!word!'
    if !check!(buffer => [b'!', ..])
    {
        return Err(ScanError::InvalidTagHandle);
    }

    let source: &'de str = buffer;
    let mut handle_len = 1;

    while chars::is_word(source.as_bytes(), handle_len)
    {
        handle_len += 1;
    }

    if check!(&source[handle_len..] => [b'!', ..])
    {
        handle_len += 1;
    }
    else if handle_len != 1
    {
        // '!word' without the closing '!' is not a handle
        return Err(ScanError::InvalidTagHandle);
    }

    let handle = &source[..handle_len];

    advance!(*buffer, :cursor, handle_len);

    if !chars::is_blank(buffer.as_bytes(), 0)
    {
        return Err(ScanError::InvalidTagHandle);
    }

    eat_blanks(buffer, cursor);

    // Prefix: a run of URI characters
    let source: &'de str = buffer;
    let prefix_len = run_while(source, chars::is_uri_char);

    if prefix_len == 0 || !chars::is_ws_z(source.as_bytes(), prefix_len)
    {
        return Err(ScanError::InvalidTagPrefix);
    }

    let prefix = &source[..prefix_len];

    advance!(*buffer, :cursor, prefix_len);

    Ok(Token::TagDirective(cow!(handle), cow!(prefix)))
}

fn eat_blanks(buffer: &mut &str, cursor: &mut Cursor)
{
    let amount = run_while(buffer, chars::is_blank);

    advance!(*buffer, :cursor, amount);
}

fn run_while<F>(buffer: &str, f: F) -> usize
where
    F: Fn(&[u8], usize) -> bool,
{
    let bytes = buffer.as_bytes();
    let mut len = 0;

    while f(bytes, len)
    {
        len += 1;
    }

    len
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn version_directive()
    {
        let mut cursor = Cursor::new();
        let (token, amount) = scan_directive("%YAML 1.3 # latest\n", &mut cursor).unwrap();

        assert_eq!(token, Token::VersionDirective(1, 3));
        assert_eq!(amount, 9);
    }

    #[test]
    fn tag_directive()
    {
        let mut cursor = Cursor::new();
        let (token, _) = scan_directive("%TAG !e! tag:example.com,2024:\n", &mut cursor).unwrap();

        assert_eq!(
            token,
            Token::TagDirective(cow!("!e!"), cow!("tag:example.com,2024:"))
        );
    }

    #[test]
    fn rejects_unknown()
    {
        let mut cursor = Cursor::new();

        assert_eq!(
            scan_directive("%FOO bar\n", &mut cursor),
            Err(ScanError::UnknownDirective)
        );
    }

    #[test]
    fn rejects_bad_version()
    {
        let mut cursor = Cursor::new();

        assert_eq!(
            scan_directive("%YAML one.two\n", &mut cursor),
            Err(ScanError::InvalidVersion)
        );
    }
}
