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

/// Scan an anchor ('&name') or alias ('*name') from the
/// head of .base, returning the token and bytes consumed
pub(in crate::scanner) fn scan_anchor<'de>(
    base: &'de str,
    cursor: &mut Cursor,
) -> Result<(Token<'de>, usize)>
{
    let mut buffer = base;
    let alias = check!(buffer => [b'*', ..]);

    // '&' / '*'
    advance!(buffer, :cursor, 1);

    let bytes = buffer.as_bytes();
    let mut len = 0;

    while !chars::is_ws_z(bytes, len) && !chars::is_flow_indicator(bytes, len)
    {
        len += chars::width_of(bytes, len).max(1);
    }

    if len == 0
    {
        return Err(ScanError::InvalidAnchorName);
    }

    let name = &buffer[..len];

    advance!(buffer, :cursor, len);

    let token = match alias
    {
        true => Token::Alias(cow!(name)),
        false => Token::Anchor(cow!(name)),
    };

    Ok((token, base.len() - buffer.len()))
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn anchor_and_alias()
    {
        let mut cursor = Cursor::new();
        let (token, amount) = scan_anchor("&id001 rest", &mut cursor).unwrap();

        assert_eq!(token, Token::Anchor(cow!("id001")));
        assert_eq!(amount, 6);

        let (token, _) = scan_anchor("*id001, next", &mut Cursor::new()).unwrap();

        assert_eq!(token, Token::Alias(cow!("id001")));
    }

    #[test]
    fn rejects_empty_name()
    {
        assert_eq!(
            scan_anchor("& value", &mut Cursor::new()),
            Err(ScanError::InvalidAnchorName)
        );
    }
}
