/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Codepoint decoding and the YAML character classes.
//!
//! Every function here is pure, operates on raw byte
//! slices and never panics on truncated or invalid
//! sequences; the error path is always a `0` width or a
//! `false` classification, letting callers decide whether
//! truncation means "need more input" or "bad stream".

/// Byte length of the UTF8 sequence starting at .at, or 0
/// if the slice ends or the lead byte is invalid
pub(crate) const fn width_of(buffer: &[u8], at: usize) -> usize
{
    match buffer.len() <= at
    {
        true => 0,
        false => match buffer[at]
        {
            b if b & 0x80 == 0x00 => 1,
            b if b & 0xE0 == 0xC0 => 2,
            b if b & 0xF0 == 0xE0 => 3,
            b if b & 0xF8 == 0xF0 => 4,
            _ => 0,
        },
    }
}

/// Decode the codepoint starting at .at, returning it and
/// its byte width
pub(crate) fn codepoint_at(buffer: &[u8], at: usize) -> Option<(char, usize)>
{
    let width = width_of(buffer, at);

    if width == 0 || buffer.len() < at + width
    {
        return None;
    }

    std::str::from_utf8(&buffer[at..at + width])
        .ok()
        .and_then(|s| s.chars().next())
        .map(|c| (c, width))
}

/// Space or tab
pub(crate) const fn is_blank(buffer: &[u8], at: usize) -> bool
{
    match buffer.len() <= at
    {
        true => false,
        false => matches!(buffer[at], b' ' | b'\t'),
    }
}

/// YAML line break: LF, CR, NEL, LS or PS
pub(crate) fn is_break(buffer: &[u8], at: usize) -> bool
{
    break_width(buffer, at) != 0
}

/// Line break or end of buffer
pub(crate) fn is_break_z(buffer: &[u8], at: usize) -> bool
{
    buffer.len() <= at || is_break(buffer, at)
}

/// Blank or line break
pub(crate) fn is_ws(buffer: &[u8], at: usize) -> bool
{
    is_blank(buffer, at) || is_break(buffer, at)
}

/// Blank, line break or end of buffer
pub(crate) fn is_ws_z(buffer: &[u8], at: usize) -> bool
{
    buffer.len() <= at || is_blank(buffer, at) || is_break(buffer, at)
}

/// Byte width of the line break starting at .at, with CR LF
/// counted as a single break. 0 if no break starts here.
pub(crate) fn break_width(buffer: &[u8], at: usize) -> usize
{
    match buffer.get(at..)
    {
        Some([b'\r', b'\n', ..]) => 2,
        Some([b'\r', ..]) | Some([b'\n', ..]) => 1,
        Some([0xC2, 0x85, ..]) => 2,
        Some([0xE2, 0x80, 0xA8, ..]) | Some([0xE2, 0x80, 0xA9, ..]) => 3,
        _ => 0,
    }
}

pub(crate) const fn is_digit(buffer: &[u8], at: usize) -> bool
{
    match buffer.len() <= at
    {
        true => false,
        false => buffer[at].is_ascii_digit(),
    }
}

pub(crate) const fn is_hex(buffer: &[u8], at: usize) -> bool
{
    match buffer.len() <= at
    {
        true => false,
        false => buffer[at].is_ascii_hexdigit(),
    }
}

pub(crate) const fn is_alpha(buffer: &[u8], at: usize) -> bool
{
    match buffer.len() <= at
    {
        true => false,
        false => buffer[at].is_ascii_alphabetic(),
    }
}

/// Alphanumeric, '-' or '_'; the anchor / handle word class
pub(crate) const fn is_word(buffer: &[u8], at: usize) -> bool
{
    match buffer.len() <= at
    {
        true => false,
        false => buffer[at].is_ascii_alphanumeric() || matches!(buffer[at], b'-' | b'_'),
    }
}

pub(crate) const fn is_flow_indicator(buffer: &[u8], at: usize) -> bool
{
    match buffer.len() <= at
    {
        true => false,
        false => matches!(buffer[at], b',' | b'[' | b']' | b'{' | b'}'),
    }
}

/// Characters legal in tag URIs, before %-escape validation
pub(crate) const fn is_uri_char(buffer: &[u8], at: usize) -> bool
{
    match buffer.len() <= at
    {
        true => false,
        false =>
        {
            buffer[at].is_ascii_alphanumeric()
                || matches!(
                    buffer[at],
                    b'#' | b';'
                        | b'/'
                        | b'?'
                        | b':'
                        | b'@'
                        | b'&'
                        | b'='
                        | b'+'
                        | b'$'
                        | b','
                        | b'_'
                        | b'.'
                        | b'!'
                        | b'~'
                        | b'*'
                        | b'\''
                        | b'('
                        | b')'
                        | b'['
                        | b']'
                        | b'-'
                        | b'%'
                )
        },
    }
}

/// The YAML printable set, excluding the BOM
pub(crate) fn is_printable(buffer: &[u8], at: usize) -> bool
{
    match codepoint_at(buffer, at)
    {
        None => false,
        Some((c, _)) => match c
        {
            '\t' | '\n' | '\r' | '\u{85}' => true,
            '\u{FEFF}' => false,
            c if ('\u{20}'..='\u{7E}').contains(&c) => true,
            c if ('\u{A0}'..='\u{D7FF}').contains(&c) => true,
            c if ('\u{E000}'..='\u{FFFD}').contains(&c) => true,
            c if ('\u{10000}'..='\u{10FFFF}').contains(&c) => true,
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    const BREAKS: [&str; 5] = ["\n", "\r", "\u{85}", "\u{2028}", "\u{2029}"];

    #[test]
    fn break_classes()
    {
        for brk in &BREAKS
        {
            assert!(is_break(brk.as_bytes(), 0), "{:?} must be a break", brk);
            assert_eq!(break_width(brk.as_bytes(), 0), brk.len());
        }

        assert_eq!(break_width(b"\r\n rest", 0), 2);
        assert!(!is_break(b"x", 0));
    }

    #[test]
    fn ws_classes()
    {
        assert!(is_blank(b" ", 0) && is_blank(b"\t", 0));
        assert!(is_ws_z(b"", 0));
        assert!(is_ws_z(b"  ", 2));
        assert!(!is_ws(b"a", 0));
    }

    #[test]
    fn widths()
    {
        assert_eq!(width_of("a".as_bytes(), 0), 1);
        assert_eq!(width_of("ä".as_bytes(), 0), 2);
        assert_eq!(width_of("€".as_bytes(), 0), 3);
        assert_eq!(width_of("𐍈".as_bytes(), 0), 4);
        assert_eq!(width_of(b"", 0), 0);
    }

    #[test]
    fn printable_excludes_bom()
    {
        assert!(is_printable("x".as_bytes(), 0));
        assert!(is_printable("€".as_bytes(), 0));
        assert!(!is_printable("\u{FEFF}".as_bytes(), 0));
        assert!(!is_printable(b"\x07", 0));
    }

    #[test]
    fn uri_class()
    {
        for b in "abc019#;/?:@&=+$,_.!~*'()[]-%".bytes()
        {
            assert!(is_uri_char(&[b], 0), "{} must be a uri char", b as char);
        }

        assert!(!is_uri_char(b"<", 0));
        assert!(!is_uri_char(b" ", 0));
    }
}
