/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Scalar content analysis and the style specific writers.
//!
//! Analysis decides which presentations can reproduce a
//! given text exactly; the emitter then picks the best
//! allowed style at or below the node's hint.

use std::io;

use crate::emit::sink::{Sink, WriteKind};

/// Which presentations can carry a given text
#[derive(Debug, Clone, Copy)]
pub(crate) struct Analysis
{
    pub empty:     bool,
    pub multiline: bool,

    pub plain_ok:   bool,
    pub single_ok:  bool,
    pub literal_ok: bool,
}

pub(crate) fn analyze(text: &str, in_flow: bool) -> Analysis
{
    let empty = text.is_empty();
    let multiline = text.contains(['\n', '\r']);

    let mut plain_ok = !empty && !multiline;

    if plain_ok
    {
        plain_ok = plain_allowed(text, in_flow);
    }

    // Single quotes cannot express breaks (folding would
    // rewrite them) or non printable content
    let single_ok = !multiline && text.chars().all(printable);

    // Literal blocks keep breaks byte for byte but cannot
    // carry non printable content, and lines with trailing
    // blanks would not round trip
    let literal_ok = !empty
        && !in_flow
        && text.chars().all(|c| printable(c) || c == '\n')
        && !text
            .split('\n')
            .any(|line| line.ends_with([' ', '\t']) || line.starts_with('\t'));

    Analysis {
        empty,
        multiline,
        plain_ok,
        single_ok,
        literal_ok,
    }
}

fn plain_allowed(text: &str, in_flow: bool) -> bool
{
    let bytes = text.as_bytes();

    // Leading or trailing whitespace is significant and
    // plain cannot carry it
    if text.starts_with([' ', '\t']) || text.ends_with([' ', '\t'])
    {
        return false;
    }

    // The first character must not open another production
    if matches!(
        bytes[0],
        b'-' | b'?'
            | b':'
            | b','
            | b'['
            | b']'
            | b'{'
            | b'}'
            | b'#'
            | b'&'
            | b'*'
            | b'!'
            | b'|'
            | b'>'
            | b'\''
            | b'"'
            | b'%'
            | b'@'
            | b'`'
    )
    {
        // '-'/'?'/':' are fine when they do not form an
        // indicator
        let softens = matches!(bytes[0], b'-' | b'?' | b':')
            && bytes.len() > 1
            && !matches!(bytes[1], b' ' | b'\t');

        if !(softens && !in_flow)
        {
            return false;
        }
    }

    if text == "---" || text == "..."
    {
        return false;
    }

    for (at, c) in text.char_indices()
    {
        if !printable(c)
        {
            return false;
        }

        match c
        {
            ':' if matches!(bytes.get(at + 1), None | Some(b' ') | Some(b'\t')) =>
            {
                return false
            },
            '#' if at > 0 && matches!(bytes[at - 1], b' ' | b'\t') => return false,
            ',' | '[' | ']' | '{' | '}' if in_flow => return false,
            ':' if in_flow => return false,
            _ =>
            {},
        }
    }

    true
}

fn printable(c: char) -> bool
{
    match c
    {
        '\t' => true,
        c if c < '\u{20}' => false,
        '\u{7F}' => false,
        '\u{FEFF}' => false,
        c if ('\u{80}'..'\u{A0}').contains(&c) => false,
        _ => true,
    }
}

pub(crate) fn write_plain<S>(sink: &mut S, text: &str, key: bool) -> io::Result<()>
where
    S: Sink,
{
    let kind = match key
    {
        true => WriteKind::PlainScalar.as_key(),
        false => WriteKind::PlainScalar,
    };

    sink.write(kind, text)
}

pub(crate) fn write_single<S>(sink: &mut S, text: &str, key: bool) -> io::Result<()>
where
    S: Sink,
{
    let kind = match key
    {
        true => WriteKind::SingleQuotedScalar.as_key(),
        false => WriteKind::SingleQuotedScalar,
    };

    sink.write(kind, "'")?;

    let mut rest = text;

    while let Some(found) = rest.find('\'')
    {
        sink.write(kind, &rest[..found])?;
        sink.write(kind, "''")?;
        rest = &rest[found + 1..];
    }

    sink.write(kind, rest)?;
    sink.write(kind, "'")
}

/// Double quoted writing escapes exactly what YAML *and*
/// JSON require, so one writer serves every mode
pub(crate) fn write_double<S>(sink: &mut S, text: &str, key: bool) -> io::Result<()>
where
    S: Sink,
{
    let kind = match key
    {
        true => WriteKind::DoubleQuotedScalar.as_key(),
        false => WriteKind::DoubleQuotedScalar,
    };

    sink.write(kind, "\"")?;

    let mut buffer = String::with_capacity(text.len());

    for c in text.chars()
    {
        match c
        {
            '"' => buffer.push_str("\\\""),
            '\\' => buffer.push_str("\\\\"),
            '\u{08}' => buffer.push_str("\\b"),
            '\u{0C}' => buffer.push_str("\\f"),
            '\n' => buffer.push_str("\\n"),
            '\r' => buffer.push_str("\\r"),
            '\t' => buffer.push_str("\\t"),
            c if (c < '\u{20}') || c == '\u{7F}' || ('\u{80}'..'\u{A0}').contains(&c) =>
            {
                buffer.push_str(&format!("\\u{:04X}", c as u32));
            },
            c => buffer.push(c),
        }
    }

    sink.write(kind, &buffer)?;
    sink.write(kind, "\"")
}

/// The chomping indicator a literal block needs to
/// reproduce .text exactly
pub(crate) fn literal_chomp(text: &str) -> &'static str
{
    let trailing = text.len() - text.trim_end_matches('\n').len();

    match trailing
    {
        0 => "-",
        1 => "",
        _ => "+",
    }
}

/// The classes of scalar JSON can carry unquoted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JsonKind
{
    Null,
    Bool,
    Number,
}

/// Classify .text under the JSON grammar for null / bool /
/// number, the gate for unquoted emission in type
/// preserving JSON mode
pub(crate) fn json_kind(text: &str) -> Option<JsonKind>
{
    match text
    {
        "null" => return Some(JsonKind::Null),
        "true" | "false" => return Some(JsonKind::Bool),
        _ =>
        {},
    }

    json_number(text).then(|| JsonKind::Number)
}

fn json_number(text: &str) -> bool
{
    let mut rest = text.as_bytes();

    if let [b'-', tail @ ..] = rest
    {
        rest = tail;
    }

    // Integer part: '0' alone, or a nonzero digit run
    match rest
    {
        [b'0', tail @ ..] => rest = tail,
        [b'1'..=b'9', ..] =>
        {
            while let [b'0'..=b'9', tail @ ..] = rest
            {
                rest = tail;
            }
        },
        _ => return false,
    }

    if let [b'.', tail @ ..] = rest
    {
        let mut digits = 0;
        rest = tail;

        while let [b'0'..=b'9', tail @ ..] = rest
        {
            rest = tail;
            digits += 1;
        }

        if digits == 0
        {
            return false;
        }
    }

    if let [b'e' | b'E', tail @ ..] = rest
    {
        rest = tail;

        if let [b'+' | b'-', tail @ ..] = rest
        {
            rest = tail;
        }

        let mut digits = 0;

        while let [b'0'..=b'9', tail @ ..] = rest
        {
            rest = tail;
            digits += 1;
        }

        if digits == 0
        {
            return false;
        }
    }

    rest.is_empty()
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_rules()
    {
        assert!(analyze("simple", false).plain_ok);
        assert!(analyze("with spaces inside", false).plain_ok);
        assert!(analyze("-starts-fine", false).plain_ok);

        assert!(!analyze("", false).plain_ok);
        assert!(!analyze(" leading", false).plain_ok);
        assert!(!analyze("trailing ", false).plain_ok);
        assert!(!analyze("colon: inside", false).plain_ok);
        assert!(!analyze("hash # inside", false).plain_ok);
        assert!(!analyze("# leads", false).plain_ok);
        assert!(!analyze("---", false).plain_ok);
        assert!(!analyze("two\nlines", false).plain_ok);

        // Flow adds its own forbidden set
        assert!(!analyze("a,b", true).plain_ok);
        assert!(!analyze("a:b", true).plain_ok);
        assert!(analyze("a,b", false).plain_ok);
    }

    #[test]
    fn literal_rules()
    {
        assert!(analyze("line one\nline two\n", false).literal_ok);
        assert!(!analyze("line one\nline two\n", true).literal_ok);
        assert!(!analyze("trailing blank \nline", false).literal_ok);
    }

    #[test]
    fn chomp_selection()
    {
        assert_eq!(literal_chomp("text"), "-");
        assert_eq!(literal_chomp("text\n"), "");
        assert_eq!(literal_chomp("text\n\n"), "+");
    }

    #[test]
    fn json_classification()
    {
        assert_eq!(json_kind("null"), Some(JsonKind::Null));
        assert_eq!(json_kind("true"), Some(JsonKind::Bool));
        assert_eq!(json_kind("0"), Some(JsonKind::Number));
        assert_eq!(json_kind("-12.5e+3"), Some(JsonKind::Number));

        assert_eq!(json_kind("Null"), None);
        assert_eq!(json_kind("01"), None);
        assert_eq!(json_kind("1."), None);
        assert_eq!(json_kind("0x10"), None);
        assert_eq!(json_kind("plain text"), None);
    }

    #[test]
    fn double_quote_escaping()
    {
        let mut sink = crate::emit::sink::StringSink::new();

        write_double(&mut sink, "tab\there \"q\" \u{7}", false).unwrap();

        assert_eq!(sink.as_str(), "\"tab\\there \\\"q\\\" \\u0007\"");
    }
}
