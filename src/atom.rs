/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Atoms are the sole representation of textual content in
//! the stream: a borrowed slice of the source tagged with
//! the style it was written in, plus flags recording
//! whatever the scanner learned while walking it (escapes
//! seen, line folds, chomping mode).
//!
//! An atom never owns character data. The presented text is
//! materialised only when a caller asks, via
//! [`Atom::decode`], which borrows straight from the source
//! whenever the raw slice and the presentation agree.

use std::cell::OnceCell;

use bitflags::bitflags;

use crate::chars;

/// Copy on write representation of YAML data content.
///
/// Most variable data returned by this library is stored as
/// this type, and where possible, is borrowed from the
/// underlying byte stream.
pub type Slice<'a> = std::borrow::Cow<'a, str>;

/// No flags set
pub(crate) const A_NIL: AtomFlags = AtomFlags::empty();
/// The raw slice contains escape sequences that must be
/// processed before presentation
pub(crate) const A_ESCAPES: AtomFlags = AtomFlags::ESCAPES;
/// The raw slice spans multiple lines which fold into the
/// presented text
pub(crate) const A_FOLDS: AtomFlags = AtomFlags::FOLDS;
/// Leading or trailing whitespace in the raw slice is
/// significant to the presentation
pub(crate) const A_WS_EDGE: AtomFlags = AtomFlags::WS_EDGE;
/// The slice was assembled across multiple source chunks
pub(crate) const A_JOINED: AtomFlags = AtomFlags::JOINED;
/// Block scalar keep chomping ('+'): trailing breaks kept
pub(crate) const A_CHOMP_KEEP: AtomFlags = AtomFlags::CHOMP_KEEP;
/// Block scalar strip chomping ('-'): trailing breaks
/// removed. Neither KEEP nor STRIP means clip.
pub(crate) const A_CHOMP_STRIP: AtomFlags = AtomFlags::CHOMP_STRIP;

bitflags! {
    /// Facts about an atom's raw slice recorded at scan time,
    /// consumed by [`Atom::decode`]
    #[derive(Default)]
    pub(crate) struct AtomFlags: u8 {
        const ESCAPES     = 0b00000001;
        const FOLDS       = 0b00000010;
        const WS_EDGE     = 0b00000100;
        const JOINED      = 0b00001000;
        const CHOMP_KEEP  = 0b00010000;
        const CHOMP_STRIP = 0b00100000;
    }
}

/// The escaping / presentation discipline of an atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AtomStyle
{
    Plain,
    SingleQuote,
    DoubleQuote,
    Literal,
    Folded,
    Uri,
    Comment,
}

/// A tagged view into the source: raw bytes at .start,
/// presented according to .style and .flags.
///
/// .indent is only meaningful for Literal / Folded atoms,
/// where it records the block indentation to strip from
/// every line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Atom<'de>
{
    data:   &'de str,
    start:  usize,
    indent: usize,
    style:  AtomStyle,
    flags:  AtomFlags,
}

/// Failures while materialising an atom's presented text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeError
{
    /// An escape sequence was not recognised
    UnknownEscape,
    /// An escape sequence was recognised but malformed
    /// (bad hex digit, surrogate, overlong)
    InvalidEscape,
    /// The slice ended inside an escape sequence
    Truncated,
}

impl<'de> Atom<'de>
{
    pub fn new(
        data: &'de str,
        start: usize,
        style: AtomStyle,
        flags: AtomFlags,
        indent: usize,
    ) -> Self
    {
        Self {
            data,
            start,
            indent,
            style,
            flags,
        }
    }

    /// The raw source slice backing this atom
    pub fn raw(&self) -> &'de str
    {
        self.data
    }

    /// Absolute byte offset of the slice in its input
    pub fn start(&self) -> usize
    {
        self.start
    }

    /// One past the last byte of the slice in its input
    pub fn end(&self) -> usize
    {
        self.start + self.data.len()
    }

    pub fn style(&self) -> AtomStyle
    {
        self.style
    }

    pub fn flags(&self) -> AtomFlags
    {
        self.flags
    }

    /// Materialise the presented text of this atom.
    ///
    /// Borrows from the source when the raw slice needs no
    /// processing, otherwise allocates exactly once.
    pub fn decode(&self) -> Result<Slice<'de>, DecodeError>
    {
        match self.style
        {
            AtomStyle::Plain | AtomStyle::Comment => Ok(self.decode_plain()),
            AtomStyle::SingleQuote => Ok(self.decode_single()),
            AtomStyle::DoubleQuote => self.decode_double(),
            AtomStyle::Literal => Ok(self.decode_block(false)),
            AtomStyle::Folded => Ok(self.decode_block(true)),
            AtomStyle::Uri => self.decode_uri(),
        }
    }

    fn decode_plain(&self) -> Slice<'de>
    {
        if !self.flags.contains(A_FOLDS)
        {
            return Slice::Borrowed(self.data);
        }

        let mut scratch = String::with_capacity(self.data.len());

        fold_flow_spans(self.data, &mut scratch, |span, out| out.push_str(span));

        Slice::Owned(scratch)
    }

    fn decode_single(&self) -> Slice<'de>
    {
        if !self.flags.intersects(A_ESCAPES | A_FOLDS)
        {
            return Slice::Borrowed(self.data);
        }

        let mut scratch = String::with_capacity(self.data.len());

        fold_flow_spans(self.data, &mut scratch, |span, out| {
            // The only escape in single quoted scalars: '' => '
            let mut rest = span;

            while let Some(found) = rest.find("''")
            {
                out.push_str(&rest[..found]);
                out.push('\'');
                rest = &rest[found + 2..];
            }

            out.push_str(rest);
        });

        Slice::Owned(scratch)
    }

    fn decode_double(&self) -> Result<Slice<'de>, DecodeError>
    {
        if !self.flags.intersects(A_ESCAPES | A_FOLDS)
        {
            return Ok(Slice::Borrowed(self.data));
        }

        let mut scratch = String::with_capacity(self.data.len());
        let mut rest = self.data;

        // Escaped characters are content even when they look
        // like trailing blanks; .guard fences them off from the
        // fold's whitespace trim
        let mut guard = 0;

        // Unlike the single quoted case we cannot treat escape
        // processing per folded span, as '\' may escape a line
        // break, suppressing the fold itself
        while !rest.is_empty()
        {
            let bytes = rest.as_bytes();

            if bytes[0] == b'\\'
            {
                // An escaped break joins the lines with nothing,
                // eating the following indentation
                let width = chars::break_width(bytes, 1);
                if width != 0
                {
                    rest = eat_indentation(&rest[1 + width..]);
                    continue;
                }

                let (c, amt) = unescape(rest)?;
                scratch.push(c);
                guard = scratch.len();
                rest = &rest[amt..];
            }
            else if chars::is_break(bytes, 0)
            {
                let (folded, after) = fold_at_break(rest);
                let keep = scratch[guard..].trim_end_matches([' ', '\t']).len();
                scratch.truncate(guard + keep);
                scratch.push_str(&folded);
                rest = after;
            }
            else
            {
                let width = chars::width_of(bytes, 0).max(1);
                scratch.push_str(&rest[..width]);
                rest = &rest[width..];
            }
        }

        Ok(Slice::Owned(scratch))
    }

    fn decode_block(&self, fold: bool) -> Slice<'de>
    {
        let mut out = String::with_capacity(self.data.len());
        let mut pending = 0usize;
        let mut last_more_indented = false;
        let mut any_content = false;

        for (content, had_break) in BlockLines::new(self.data, self.indent)
        {
            if content.is_empty()
            {
                pending += usize::from(had_break);
                continue;
            }

            let more_indented = content.starts_with([' ', '\t']);

            if any_content
            {
                match (fold, last_more_indented || more_indented)
                {
                    // Literal style, and folded style around more
                    // indented lines, keep every break
                    (false, _) | (true, true) =>
                    {
                        (0..pending).for_each(|_| out.push('\n'));
                    },
                    // Folded style joins a single break to a space
                    (true, false) if pending == 1 => out.push(' '),
                    (true, false) =>
                    {
                        (1..pending).for_each(|_| out.push('\n'));
                    },
                }
            }

            out.push_str(content);

            pending = usize::from(had_break);
            last_more_indented = more_indented;
            any_content = true;
        }

        // Chomping: strip removes every trailing break, keep
        // retains all of them, clip leaves exactly one after
        // content
        if self.flags.contains(A_CHOMP_KEEP)
        {
            (0..pending).for_each(|_| out.push('\n'));
        }
        else if !self.flags.contains(A_CHOMP_STRIP) && any_content && pending > 0
        {
            out.push('\n');
        }

        Slice::Owned(out)
    }

    fn decode_uri(&self) -> Result<Slice<'de>, DecodeError>
    {
        if !self.flags.contains(A_ESCAPES)
        {
            return Ok(Slice::Borrowed(self.data));
        }

        let mut scratch = Vec::with_capacity(self.data.len());
        let mut rest = self.data.as_bytes();

        while let [byte, tail @ ..] = rest
        {
            match byte
            {
                b'%' => match tail
                {
                    [hi, lo, tail @ ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() =>
                    {
                        scratch.push(hex_pair(*hi, *lo));
                        rest = tail;
                    },
                    [_, _, ..] => return Err(DecodeError::InvalidEscape),
                    _ => return Err(DecodeError::Truncated),
                },
                _ =>
                {
                    scratch.push(*byte);
                    rest = tail;
                },
            }
        }

        String::from_utf8(scratch)
            .map(Slice::Owned)
            .map_err(|_| DecodeError::InvalidEscape)
    }
}

/// A scalar content carrier: an atom plus a decode cache.
///
/// The cache, once populated, is guaranteed byte equal to
/// re-decoding the atom; synthetic cells (created from bare
/// text by the mutation APIs) have no atom and are always
/// populated.
#[derive(Debug, Clone)]
pub(crate) struct ScalarCell<'de>
{
    atom:  Option<Atom<'de>>,
    cache: OnceCell<Slice<'de>>,
}

impl<'de> ScalarCell<'de>
{
    pub fn from_atom(atom: Atom<'de>) -> Self
    {
        Self {
            atom:  Some(atom),
            cache: OnceCell::new(),
        }
    }

    /// A cell not backed by the source stream, carrying the
    /// given presented .text directly
    pub fn from_text<T>(text: T) -> Self
    where
        T: Into<Slice<'de>>,
    {
        let cache = OnceCell::new();
        let _ = cache.set(text.into());

        Self { atom: None, cache }
    }

    pub fn atom(&self) -> Option<&Atom<'de>>
    {
        self.atom.as_ref()
    }

    /// The presented text, decoding and caching it on first
    /// access
    pub fn text(&self) -> Result<&Slice<'de>, DecodeError>
    {
        match self.cache.get()
        {
            Some(text) => Ok(text),
            None => match &self.atom
            {
                Some(atom) =>
                {
                    let decoded = atom.decode()?;

                    Ok(self.cache.get_or_init(|| decoded))
                },
                // Cells are constructed with either an atom or a
                // populated cache
                None => Err(DecodeError::Truncated),
            },
        }
    }

    /// The style this scalar was (or will be) written in
    pub fn style(&self) -> AtomStyle
    {
        self.atom
            .as_ref()
            .map(|atom| atom.style())
            .unwrap_or(AtomStyle::Plain)
    }

    pub fn mark(&self) -> (usize, usize)
    {
        self.atom
            .as_ref()
            .map(|atom| (atom.start(), atom.end()))
            .unwrap_or((0, 0))
    }
}

impl PartialEq for ScalarCell<'_>
{
    fn eq(&self, other: &Self) -> bool
    {
        match (self.text(), other.text())
        {
            (Ok(lhs), Ok(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

/// Walk .data folding line breaks flow style: one break
/// joins as a space, n breaks join as n-1 newlines.
/// Trailing blanks before a break and indentation after it
/// are dropped. Content spans are handed to .f for style
/// specific processing.
fn fold_flow_spans<F>(data: &str, out: &mut String, f: F)
where
    F: Fn(&str, &mut String),
{
    let mut rest = data;
    let mut first = true;

    while !rest.is_empty()
    {
        let bytes = rest.as_bytes();
        let mut span_end = 0;

        while span_end < bytes.len() && !chars::is_break(bytes, span_end)
        {
            span_end += chars::width_of(bytes, span_end).max(1);
        }

        let span = &rest[..span_end];
        let span = match first
        {
            true => span,
            false => span.trim_start_matches([' ', '\t']),
        };
        let span = match span_end < bytes.len()
        {
            true => span.trim_end_matches([' ', '\t']),
            false => span,
        };

        if !span.is_empty()
        {
            f(span, out);
        }

        rest = &rest[span_end..];
        first = false;

        if !rest.is_empty()
        {
            let (folded, after) = fold_at_break(rest);
            out.push_str(&folded);
            rest = after;
        }
    }
}

/// Given .rest starting on a line break, consume the run of
/// breaks (and intervening blank lines), returning the fold
/// replacement and the remainder after any indentation
fn fold_at_break(rest: &str) -> (String, &str)
{
    let mut after = rest;
    let mut breaks = 0;

    loop
    {
        let width = chars::break_width(after.as_bytes(), 0);

        if width != 0
        {
            breaks += 1;
            after = &after[width..];
        }
        else if breaks != 0 && chars::is_blank(after.as_bytes(), 0)
        {
            // Blanks between breaks are indentation of an empty
            // line; peek past them for another break
            let trimmed = after.trim_start_matches([' ', '\t']);

            match chars::break_width(trimmed.as_bytes(), 0) != 0
            {
                true => after = trimmed,
                false => break,
            }
        }
        else
        {
            break;
        }
    }

    let after = eat_indentation(after);
    let folded = match breaks
    {
        0 | 1 => " ".into(),
        n => "\n".repeat(n - 1),
    };

    (folded, after)
}

fn eat_indentation(s: &str) -> &str
{
    s.trim_start_matches([' ', '\t'])
}

/// Process the escape sequence at the head of .rest,
/// returning the unescaped char and bytes consumed
fn unescape(rest: &str) -> Result<(char, usize), DecodeError>
{
    let bytes = rest.as_bytes();

    let (c, amt) = match bytes.get(1)
    {
        None => return Err(DecodeError::Truncated),
        Some(b) => match b
        {
            b'0' => ('\0', 2),
            b'a' => ('\x07', 2),
            b'b' => ('\x08', 2),
            b't' | b'\t' => ('\t', 2),
            b'n' => ('\n', 2),
            b'v' => ('\x0B', 2),
            b'f' => ('\x0C', 2),
            b'r' => ('\r', 2),
            b'e' => ('\x1B', 2),
            b' ' => (' ', 2),
            b'"' => ('"', 2),
            b'/' => ('/', 2),
            b'\\' => ('\\', 2),
            b'N' => ('\u{85}', 2),
            b'_' => ('\u{A0}', 2),
            b'L' => ('\u{2028}', 2),
            b'P' => ('\u{2029}', 2),
            b'x' => return unescape_unicode(rest, 2),
            b'u' => return unescape_unicode(rest, 4),
            b'U' => return unescape_unicode(rest, 8),
            _ => return Err(DecodeError::UnknownEscape),
        },
    };

    Ok((c, amt))
}

fn unescape_unicode(rest: &str, digits: usize) -> Result<(char, usize), DecodeError>
{
    let bytes = rest.as_bytes();

    if bytes.len() < 2 + digits
    {
        return Err(DecodeError::Truncated);
    }

    let mut value: u32 = 0;

    for &b in &bytes[2..2 + digits]
    {
        if !b.is_ascii_hexdigit()
        {
            return Err(DecodeError::InvalidEscape);
        }

        value = value
            .checked_mul(16)
            .ok_or(DecodeError::InvalidEscape)?
            .wrapping_add(hex_value(b) as u32);
    }

    char::from_u32(value)
        .map(|c| (c, 2 + digits))
        .ok_or(DecodeError::InvalidEscape)
}

const fn hex_value(b: u8) -> u8
{
    match b
    {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

const fn hex_pair(hi: u8, lo: u8) -> u8
{
    (hex_value(hi) << 4) | hex_value(lo)
}

/// Iterator over a block scalar body: yields each line with
/// up to .indent leading spaces stripped, and whether the
/// line ended with a break
struct BlockLines<'a>
{
    rest:   &'a str,
    indent: usize,
}

impl<'a> BlockLines<'a>
{
    fn new(data: &'a str, indent: usize) -> Self
    {
        Self { rest: data, indent }
    }
}

impl<'a> Iterator for BlockLines<'a>
{
    type Item = (&'a str, bool);

    fn next(&mut self) -> Option<Self::Item>
    {
        if self.rest.is_empty()
        {
            return None;
        }

        let bytes = self.rest.as_bytes();
        let mut at = 0;

        while at < bytes.len() && !chars::is_break(bytes, at)
        {
            at += chars::width_of(bytes, at).max(1);
        }

        let line = &self.rest[..at];
        let width = chars::break_width(bytes, at);

        self.rest = &self.rest[at + width..];

        // Strip the block indentation; a line shorter than the
        // indent is necessarily all blanks (empty content)
        let mut stripped = line;
        let mut strip = self.indent;

        while strip > 0 && stripped.starts_with(' ')
        {
            stripped = &stripped[1..];
            strip -= 1;
        }

        Some((stripped, width != 0))
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    fn atom(data: &str, style: AtomStyle, flags: AtomFlags) -> Atom<'_>
    {
        Atom::new(data, 0, style, flags, 0)
    }

    #[test]
    fn plain_borrows_single_line()
    {
        let a = atom("simple scalar", AtomStyle::Plain, A_NIL);

        assert_eq!(a.decode(), Ok(Slice::Borrowed("simple scalar")));
    }

    #[test]
    fn plain_folds_lines()
    {
        let a = atom("first\n  second\n\n  third", AtomStyle::Plain, A_FOLDS);

        assert_eq!(a.decode().unwrap(), "first second\nthird");
    }

    #[test]
    fn single_quote_unescapes()
    {
        let a = atom("it''s here", AtomStyle::SingleQuote, A_ESCAPES);

        assert_eq!(a.decode().unwrap(), "it's here");
    }

    #[test]
    fn double_quote_escapes()
    {
        let a = atom(
            r#"tab\there ☺ \x41"#,
            AtomStyle::DoubleQuote,
            A_ESCAPES,
        );

        assert_eq!(a.decode().unwrap(), "tab\there \u{263A} A");
    }

    #[test]
    fn double_quote_escaped_break_joins()
    {
        let a = atom(
            "folded \\\n  to a word",
            AtomStyle::DoubleQuote,
            A_ESCAPES | A_FOLDS,
        );

        assert_eq!(a.decode().unwrap(), "folded to a word");
    }

    #[test]
    fn double_quote_rejects_unknown()
    {
        let a = atom(r"what\qhuh", AtomStyle::DoubleQuote, A_ESCAPES);

        assert_eq!(a.decode(), Err(DecodeError::UnknownEscape));
    }

    #[test]
    fn literal_clip()
    {
        let a = Atom::new("  line one\n  line two\n\n", 0, AtomStyle::Literal, A_NIL, 2);

        assert_eq!(a.decode().unwrap(), "line one\nline two\n");
    }

    #[test]
    fn literal_keep_and_strip()
    {
        let keep = Atom::new("  text\n\n", 0, AtomStyle::Literal, A_CHOMP_KEEP, 2);
        let strip = Atom::new("  text\n\n", 0, AtomStyle::Literal, A_CHOMP_STRIP, 2);

        assert_eq!(keep.decode().unwrap(), "text\n\n");
        assert_eq!(strip.decode().unwrap(), "text");
    }

    #[test]
    fn folded_joins_and_respects_indent()
    {
        let a = Atom::new(
            " one\n two\n\n three\n  more\n four\n",
            0,
            AtomStyle::Folded,
            A_NIL,
            1,
        );

        assert_eq!(a.decode().unwrap(), "one two\nthree\n more\nfour\n");
    }

    #[test]
    fn uri_percent_decoding()
    {
        let a = atom("tag:example%20com", AtomStyle::Uri, A_ESCAPES);

        assert_eq!(a.decode().unwrap(), "tag:example com");
    }

    #[test]
    fn cell_caches_decode()
    {
        let cell = ScalarCell::from_atom(atom("it''s", AtomStyle::SingleQuote, A_ESCAPES));

        let first = cell.text().unwrap().clone();
        let second = cell.text().unwrap().clone();

        assert_eq!(first, "it's");
        assert_eq!(first, second);
    }

    #[test]
    fn synthetic_cell()
    {
        let cell = ScalarCell::from_text("plain text");

        assert_eq!(cell.text().unwrap(), &Slice::Borrowed("plain text"));
        assert_eq!(cell.style(), AtomStyle::Plain);
    }
}
