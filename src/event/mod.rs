/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! This module exposes the [`Events`] pull interface: a
//! [`Parser`](parser) bound to a token stream over a
//! [`Source`], yielding [`Event`]s until the stream ends or
//! a fatal error latches the parser.
//!
//! ```rust
//! use yarrow::{event::Events, input::from_utf8};
//!
//! let source = from_utf8("lang: rust");
//! let mut events = Events::new(&source);
//!
//! while let Some(event) = events.next_event()
//! {
//!     let event = event?;
//!     // inspect event.data()
//! }
//! # Ok::<(), yarrow::Error>(())
//! ```

pub mod types;

pub(crate) mod error;
pub(crate) mod parser;

mod state;

use crate::{
    error::{Category, Result},
    event::{parser::Parser, types::Event},
    input::{PeekTokens, Source, Tokenizer},
    scanner::flag::Flags as ScanFlags,
};

/// A pull based event stream over a [`Source`].
///
/// Events are produced in exact input order; every start
/// event is matched by an end event on any stream accepted
/// without error. After a fatal error the stream is
/// latched: [`next_event`](#method.next_event) returns
/// `None` and [`stream_error`](#method.stream_error)
/// reports the failure's category.
#[derive(Debug)]
pub struct Events<'de, S: Source + ?Sized>
{
    parser: Parser<'de>,
    tokens: PeekTokens<'de, S>,
}

impl<'de, S> Events<'de, S>
where
    S: Source + ?Sized,
{
    pub fn new(source: &'de S) -> Self
    {
        Self {
            parser: Parser::new(),
            tokens: PeekTokens::new(Tokenizer::new(source, ScanFlags::default())),
        }
    }

    /// Fetch the next event, or `None` once the stream has
    /// ended (or latched on an error)
    pub fn next_event(&mut self) -> Option<Result<Event<'de>>>
    {
        self.parser
            .next_event(&mut self.tokens)
            .map(|result| result.map_err(Into::into))
    }

    /// The stream error latch: the category of the error
    /// that stopped production, if one has
    pub fn stream_error(&self) -> Option<Category>
    {
        self.parser.stream_error()
    }
}

impl<'de, S> Iterator for Events<'de, S>
where
    S: Source + ?Sized,
{
    type Item = Result<Event<'de>>;

    fn next(&mut self) -> Option<Self::Item>
    {
        self.next_event()
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::{types::*, *};
    use crate::input::from_utf8;

    /// Compressed view of an event stream for assertions
    #[derive(Debug, PartialEq)]
    enum Ev
    {
        StreamStart,
        StreamEnd,
        DocStart(bool),
        DocEnd(bool),
        Scalar(String),
        Alias(String),
        MapStart,
        MapEnd,
        SeqStart,
        SeqEnd,
    }

    fn events(data: &str) -> crate::error::Result<Vec<Ev>>
    {
        let source = from_utf8(data);
        let mut stream = Events::new(&source);
        let mut out = Vec::new();

        while let Some(event) = stream.next_event()
        {
            let event = event?;

            out.push(match event.data()
            {
                EventData::StreamStart(_) => Ev::StreamStart,
                EventData::StreamEnd => Ev::StreamEnd,
                EventData::DocumentStart(doc) => Ev::DocStart(doc.implicit),
                EventData::DocumentEnd(doc) => Ev::DocEnd(doc.implicit),
                EventData::Scalar(node) =>
                {
                    Ev::Scalar(node.content.text().unwrap().to_string())
                },
                EventData::Alias(alias) => Ev::Alias(alias.name.to_string()),
                EventData::MappingStart(_) => Ev::MapStart,
                EventData::MappingEnd => Ev::MapEnd,
                EventData::SequenceStart(_) => Ev::SeqStart,
                EventData::SequenceEnd => Ev::SeqEnd,
            });
        }

        Ok(out)
    }

    #[test]
    fn bare_stream_has_no_documents()
    {
        assert_eq!(
            events("").unwrap(),
            [Ev::StreamStart, Ev::StreamEnd]
        );

        assert_eq!(
            events("# only a comment\n").unwrap(),
            [Ev::StreamStart, Ev::StreamEnd]
        );
    }

    #[test]
    fn implicit_document()
    {
        assert_eq!(
            events("scalar").unwrap(),
            [
                Ev::StreamStart,
                Ev::DocStart(true),
                Ev::Scalar("scalar".into()),
                Ev::DocEnd(true),
                Ev::StreamEnd,
            ]
        );
    }

    #[test]
    fn explicit_documents()
    {
        assert_eq!(
            events("---\none\n...\n---\ntwo\n").unwrap(),
            [
                Ev::StreamStart,
                Ev::DocStart(false),
                Ev::Scalar("one".into()),
                Ev::DocEnd(false),
                Ev::DocStart(false),
                Ev::Scalar("two".into()),
                Ev::DocEnd(true),
                Ev::StreamEnd,
            ]
        );
    }

    #[test]
    fn block_mapping_events()
    {
        assert_eq!(
            events("a: 1\nb: 2\n").unwrap(),
            [
                Ev::StreamStart,
                Ev::DocStart(true),
                Ev::MapStart,
                Ev::Scalar("a".into()),
                Ev::Scalar("1".into()),
                Ev::Scalar("b".into()),
                Ev::Scalar("2".into()),
                Ev::MapEnd,
                Ev::DocEnd(true),
                Ev::StreamEnd,
            ]
        );
    }

    #[test]
    fn nested_flow_events()
    {
        assert_eq!(
            events("[1, {a: 2}, [3]]").unwrap(),
            [
                Ev::StreamStart,
                Ev::DocStart(true),
                Ev::SeqStart,
                Ev::Scalar("1".into()),
                Ev::MapStart,
                Ev::Scalar("a".into()),
                Ev::Scalar("2".into()),
                Ev::MapEnd,
                Ev::SeqStart,
                Ev::Scalar("3".into()),
                Ev::SeqEnd,
                Ev::SeqEnd,
                Ev::DocEnd(true),
                Ev::StreamEnd,
            ]
        );
    }

    #[test]
    fn compact_flow_mapping_in_sequence()
    {
        assert_eq!(
            events("[a: 1, b]").unwrap(),
            [
                Ev::StreamStart,
                Ev::DocStart(true),
                Ev::SeqStart,
                Ev::MapStart,
                Ev::Scalar("a".into()),
                Ev::Scalar("1".into()),
                Ev::MapEnd,
                Ev::Scalar("b".into()),
                Ev::SeqEnd,
                Ev::DocEnd(true),
                Ev::StreamEnd,
            ]
        );
    }

    #[test]
    fn missing_values_become_empty_scalars()
    {
        assert_eq!(
            events("a:\nb: 2\n").unwrap(),
            [
                Ev::StreamStart,
                Ev::DocStart(true),
                Ev::MapStart,
                Ev::Scalar("a".into()),
                Ev::Scalar("".into()),
                Ev::Scalar("b".into()),
                Ev::Scalar("2".into()),
                Ev::MapEnd,
                Ev::DocEnd(true),
                Ev::StreamEnd,
            ]
        );
    }

    #[test]
    fn anchors_aliases_and_tags()
    {
        let source = from_utf8("a: &x !!str v\nb: *x\n");
        let mut stream = Events::new(&source);

        let mut anchors = 0;
        let mut aliases = 0;
        let mut tags = Vec::new();

        while let Some(event) = stream.next_event()
        {
            match event.unwrap().into_data()
            {
                EventData::Scalar(node) =>
                {
                    anchors += usize::from(node.anchor.is_some());

                    if let Some(tag) = node.tag
                    {
                        tags.push(tag.resolved());
                    }
                },
                EventData::Alias(_) => aliases += 1,
                _ =>
                {},
            }
        }

        assert_eq!((anchors, aliases), (1, 1));
        assert_eq!(tags, ["tag:yaml.org,2002:str"]);
    }

    #[test]
    fn directives_parameterise_the_document()
    {
        let source = from_utf8("%YAML 1.3\n%TAG !e! tag:example.com:\n---\n!e!thing x\n");
        let mut stream = Events::new(&source);

        let mut version = None;
        let mut resolved = Vec::new();

        while let Some(event) = stream.next_event()
        {
            match event.unwrap().into_data()
            {
                EventData::DocumentStart(doc) =>
                {
                    version = Some(doc.state.version);
                    assert!(!doc.implicit);
                },
                EventData::Scalar(node) =>
                {
                    if let Some(tag) = node.tag
                    {
                        resolved.push(tag.resolved());
                    }
                },
                _ =>
                {},
            }
        }

        assert_eq!(version, Some(VersionDirective { major: 1, minor: 3 }));
        assert_eq!(resolved, ["tag:example.com:thing"]);
    }

    #[test]
    fn undefined_tag_handle_is_an_error()
    {
        let source = from_utf8("key: !undeclared!suffix value\n");
        let mut stream = Events::new(&source);

        let error = stream
            .by_ref()
            .find_map(|event| event.err())
            .expect("an error");

        assert_eq!(error.classify(), crate::Category::Semantic);

        // The latch holds, and production has stopped
        assert_eq!(stream.stream_error(), Some(crate::Category::Semantic));
        assert!(stream.next_event().is_none());
    }

    #[test]
    fn directives_require_explicit_document()
    {
        let source = from_utf8("%YAML 1.3\nkey: value\n");
        let mut stream = Events::new(&source);

        let error = stream
            .by_ref()
            .find_map(|event| event.err())
            .expect("an error");

        assert_eq!(error.classify(), crate::Category::Syntax);
    }

    #[test]
    fn balanced_nesting_always_holds()
    {
        let cases = [
            "a: [1, {b: c}]\n",
            "- - - deep\n",
            "? [complex, key]\n: value\n",
            "{a: {b: {c: d}}}",
        ];

        for case in cases
        {
            let mut depth = 0usize;

            for ev in events(case).unwrap()
            {
                match ev
                {
                    Ev::MapStart | Ev::SeqStart => depth += 1,
                    Ev::MapEnd | Ev::SeqEnd =>
                    {
                        depth = depth.checked_sub(1).expect("balanced nesting");
                    },
                    _ =>
                    {},
                }
            }

            assert_eq!(depth, 0, "unbalanced events for {:?}", case);
        }
    }
}
