/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use pretty_assertions::assert_eq;

use super::*;
use crate::{
    atom::ScalarCell,
    scanner::flag::O_ZEROED,
    token::{Marker, Token},
};

struct ScanIter<'de>
{
    data:   &'de str,
    scan:   Scanner,
    tokens: Tokens<'de>,

    done: bool,
}

impl<'de> ScanIter<'de>
{
    fn new(data: &'de str) -> Self
    {
        Self {
            data,
            scan: Scanner::new(),
            tokens: Tokens::new(),
            done: false,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'de>>>
    {
        if !self.done && self.tokens.is_empty()
        {
            if let 0 = self.scan.scan_tokens(O_ZEROED, self.data, &mut self.tokens)?
            {
                self.done = true;
            }
        }

        Ok(self.tokens.pop().map(|entry| entry.into_token()))
    }
}

impl<'de> Iterator for ScanIter<'de>
{
    type Item = Result<Token<'de>>;

    fn next(&mut self) -> Option<Self::Item>
    {
        self.next_token().transpose()
    }
}

fn markers(data: &str) -> Result<Vec<Marker>>
{
    ScanIter::new(data)
        .map(|token| token.map(|t| Marker::from(&t)))
        .collect()
}

fn tokens(data: &str) -> Result<Vec<Token<'_>>>
{
    ScanIter::new(data).collect()
}

fn scalar(text: &str) -> Token<'_>
{
    Token::Scalar(ScalarCell::from_text(text))
}

#[test]
fn empty_stream()
{
    use Marker::*;

    assert_eq!(markers("").unwrap(), [StreamStart, StreamEnd]);
    assert_eq!(markers("   \n\n  # comment\n").unwrap(), [StreamStart, StreamEnd]);
}

#[test]
fn root_scalar()
{
    use Marker::*;

    assert_eq!(
        markers("'a simple, root scalar'").unwrap(),
        [StreamStart, Scalar, StreamEnd]
    );
}

#[test]
fn bom_is_discarded()
{
    use Marker::*;

    assert_eq!(
        markers("\u{FEFF}scalar").unwrap(),
        [StreamStart, Scalar, StreamEnd]
    );
}

#[test]
fn block_mapping()
{
    use Marker::*;

    let expected = [
        StreamStart,
        BlockMappingStart,
        Key,
        Scalar,
        Value,
        Scalar,
        Key,
        Scalar,
        Value,
        Scalar,
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(markers("invoice: 34843\ndate: 2001-01-23\n").unwrap(), expected);
}

#[test]
fn block_mapping_contents()
{
    use Token::*;

    let expected = vec![
        StreamStart(StreamEncoding::UTF8),
        BlockMappingStart,
        Key,
        scalar("key"),
        Value,
        scalar("value"),
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(tokens("key: value\n").unwrap(), expected);
}

#[test]
fn nested_block_mapping()
{
    use Marker::*;

    let data = "bill-to:\n    given: Chris\n    family: Dumars\n";
    let expected = [
        StreamStart,
        BlockMappingStart,
        Key,
        Scalar,
        Value,
        BlockMappingStart,
        Key,
        Scalar,
        Value,
        Scalar,
        Key,
        Scalar,
        Value,
        Scalar,
        BlockEnd,
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(markers(data).unwrap(), expected);
}

#[test]
fn block_sequence()
{
    use Marker::*;

    let expected = [
        StreamStart,
        BlockSequenceStart,
        BlockEntry,
        Scalar,
        BlockEntry,
        Scalar,
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(markers("- one\n- two\n").unwrap(), expected);
}

#[test]
fn zero_indented_sequence()
{
    use Marker::*;

    let data = "key:\n- a\n- b\nnext: x\n";
    let expected = [
        StreamStart,
        BlockMappingStart,
        Key,
        Scalar,
        Value,
        BlockSequenceStart,
        BlockEntry,
        Scalar,
        BlockEntry,
        Scalar,
        BlockEnd,
        Key,
        Scalar,
        Value,
        Scalar,
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(markers(data).unwrap(), expected);
}

#[test]
fn flow_sequence()
{
    use Marker::*;

    let expected = [
        StreamStart,
        FlowSequenceStart,
        Scalar,
        FlowEntry,
        Scalar,
        FlowEntry,
        FlowSequenceStart,
        Scalar,
        FlowSequenceEnd,
        FlowSequenceEnd,
        StreamEnd,
    ];

    assert_eq!(markers("[1, 2, [3]]").unwrap(), expected);
}

#[test]
fn flow_mapping()
{
    use Marker::*;

    let expected = [
        StreamStart,
        FlowMappingStart,
        Key,
        Scalar,
        Value,
        Scalar,
        FlowEntry,
        Key,
        Scalar,
        Value,
        Scalar,
        FlowMappingEnd,
        StreamEnd,
    ];

    assert_eq!(markers("{a: 1, b: 2}").unwrap(), expected);
}

#[test]
fn json_like_flow_mapping()
{
    use Marker::*;

    let expected = [
        StreamStart,
        FlowMappingStart,
        Key,
        Scalar,
        Value,
        Scalar,
        FlowMappingEnd,
        StreamEnd,
    ];

    assert_eq!(markers("{\"a\":1}").unwrap(), expected);
}

#[test]
fn flow_collection_as_implicit_key()
{
    use Marker::*;

    // The sequence itself keys the mapping; the KEY token
    // must land before the sequence start
    let expected = [
        StreamStart,
        BlockMappingStart,
        Key,
        FlowSequenceStart,
        Scalar,
        FlowSequenceEnd,
        Value,
        Scalar,
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(markers("[a]: x\n").unwrap(), expected);
}

#[test]
fn explicit_key()
{
    use Marker::*;

    let expected = [
        StreamStart,
        BlockMappingStart,
        Key,
        Scalar,
        Value,
        Scalar,
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(markers("? key\n: value\n").unwrap(), expected);
}

#[test]
fn document_markers()
{
    use Marker::*;

    let expected = [
        StreamStart,
        DocumentStart,
        Scalar,
        DocumentEnd,
        DocumentStart,
        Scalar,
        StreamEnd,
    ];

    assert_eq!(markers("---\nfirst\n...\n---\nsecond\n").unwrap(), expected);
}

#[test]
fn directives()
{
    use Token::*;

    let data = "%YAML 1.3\n%TAG !e! tag:example.com:\n---\nx\n";
    let expected = vec![
        StreamStart(StreamEncoding::UTF8),
        VersionDirective(1, 3),
        TagDirective(cow!("!e!"), cow!("tag:example.com:")),
        DocumentStart,
        scalar("x"),
        StreamEnd,
    ];

    assert_eq!(tokens(data).unwrap(), expected);
}

#[test]
fn anchors_and_aliases()
{
    use Token::*;

    let data = "a: &anchor 1\nb: *anchor\n";
    let expected = vec![
        StreamStart(StreamEncoding::UTF8),
        BlockMappingStart,
        Key,
        scalar("a"),
        Value,
        Anchor(cow!("anchor")),
        scalar("1"),
        Key,
        scalar("b"),
        Value,
        Alias(cow!("anchor")),
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(tokens(data).unwrap(), expected);
}

#[test]
fn node_tags()
{
    use Token::*;

    let data = "date: !!str 2001-01-23\n";
    let expected = vec![
        StreamStart(StreamEncoding::UTF8),
        BlockMappingStart,
        Key,
        scalar("date"),
        Value,
        Tag(cow!("!!"), cow!("str")),
        scalar("2001-01-23"),
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(tokens(data).unwrap(), expected);
}

#[test]
fn block_scalar_value()
{
    use Token::*;

    let data = "log: |\n  line one\n  line two\n";
    let expected = vec![
        StreamStart(StreamEncoding::UTF8),
        BlockMappingStart,
        Key,
        scalar("log"),
        Value,
        scalar("line one\nline two\n"),
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(tokens(data).unwrap(), expected);
}

#[test]
fn implicit_key_has_no_length_limit()
{
    use Marker::*;

    // A 2000 character implicit key scans without error
    let long = "k".repeat(2000);
    let data = format!("{}: value\n", long);

    let expected = [
        StreamStart,
        BlockMappingStart,
        Key,
        Scalar,
        Value,
        Scalar,
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(markers(&data).unwrap(), expected);
}

#[test]
fn comments_are_skipped()
{
    use Marker::*;

    let data = "# leading\nkey: value # trailing\n# final\n";
    let expected = [
        StreamStart,
        BlockMappingStart,
        Key,
        Scalar,
        Value,
        Scalar,
        BlockEnd,
        StreamEnd,
    ];

    assert_eq!(markers(data).unwrap(), expected);
}

#[test]
fn rejects_tab_indentation()
{
    let data = "key:\n\tnested: x\n";

    assert_eq!(markers(data).unwrap_err(), ScanError::InvalidTab);
}

#[test]
fn rejects_unterminated_quote()
{
    assert_eq!(
        markers("key: 'no end\n").unwrap_err(),
        ScanError::UnexpectedEOF
    );
}

#[test]
fn rejects_block_entry_in_flow()
{
    assert_eq!(
        markers("[- a]").unwrap_err(),
        ScanError::InvalidBlockEntry
    );
}

#[test]
fn token_marks_are_positions()
{
    let mut scan = Scanner::new();
    let mut queue = Tokens::new();

    while scan.scan_tokens(O_ZEROED, "key: value", &mut queue).unwrap() != 0
    {}

    let entries: Vec<_> = queue.into_iter().collect();

    // StreamStart, BlockMappingStart, Key, Scalar(key),
    // Value, Scalar(value), ...
    assert_eq!(entries[0].read_at(), 0);
    assert_eq!(entries[1].read_at(), 0);
    assert_eq!(entries[2].read_at(), 0);
    assert_eq!(entries[3].read_at(), 3);
    assert_eq!(entries[4].read_at(), 4);
    assert_eq!(entries[5].read_at(), 10);
}
