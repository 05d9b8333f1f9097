/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The [`Parser`] drives the scanner's token stream through
//! a grammar state machine, producing [`Event`]s. It owns
//! the directive context of the document currently being
//! parsed and guarantees balanced start/end events on any
//! stream it accepts.

use std::rc::Rc;

use crate::{
    atom::ScalarCell,
    error::internal::ErrorCode,
    event::{
        error::{ParseError as Error, ParseResult as Result},
        state::{State, StateMachine, O_FIRST, O_IMPLICIT, O_NIL},
        types::{
            Alias, DocumentEnd, DocumentStart, DocumentState, Event, EventData, Mapping,
            NodeEvent, NodeKind, Sequence, StreamStart, Tag, VersionDirective,
        },
    },
    input::{PeekTokens, Source},
    scanner::entry::TokenEntry,
    token::{Mark, Marker, Slice, Token},
};

type Tokens<'de, S> = PeekTokens<'de, S>;

const BLOCK: bool = true;
const EMPTY_OK: bool = true;

/// Translates a token stream into events.
///
/// The two interesting methods are
/// [`next_event`](#method.next_event) and
/// [`stream_error`](#method.stream_error). Once an error
/// has been returned the parser is latched: every further
/// `next_event` call returns `None`, and the latch records
/// the failure.
#[derive(Debug)]
pub(crate) struct Parser<'de>
{
    state: StateMachine,

    document: Rc<DocumentState<'de>>,
    latched:  Option<crate::error::Category>,
    done:     bool,
}

impl<'de> Parser<'de>
{
    pub fn new() -> Self
    {
        Self {
            state:    StateMachine::default(),
            document: Rc::new(DocumentState::default()),
            latched:  None,
            done:     false,
        }
    }

    /// Fetch the next [`Event`] from the provided .tokens
    /// stream.
    ///
    /// Note that once you call this method, the given
    /// .tokens is bound to this [`Parser`], and must not be
    /// handed to anything else which modifies the stream.
    pub fn next_event<S>(&mut self, tokens: &mut Tokens<'de, S>) -> Option<Result<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        if self.latched.is_some()
        {
            return None;
        }

        match self.get_next_event(tokens)
        {
            Ok(event) => event.map(Ok),
            Err(error) =>
            {
                log::debug!("parser latched on error: {}", error);

                self.latched = Some(classify(&error));
                self.done = true;

                Some(Err(error))
            },
        }
    }

    /// The stream error latch: the category of the fatal
    /// error that stopped event production, if one has
    pub fn stream_error(&self) -> Option<crate::error::Category>
    {
        self.latched
    }

    /// Runs the state machine until it either produces an
    /// event, errors, or finishes
    fn get_next_event<S>(&mut self, tokens: &mut Tokens<'de, S>) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        let mut event = None;

        while !self.done && event.is_none()
        {
            event = self.state_transition(tokens)?;
        }

        Ok(event)
    }

    fn state_transition<S>(&mut self, tokens: &mut Tokens<'de, S>) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        log::trace!("parser state: {:?}", self.state.top());

        match self.state.top().clone()
        {
            State::StreamStart => self.stream_start(tokens),
            State::DocumentStart(opts) =>
            {
                self.document_start(tokens, opts.contains(O_IMPLICIT), opts.contains(O_FIRST))
            },
            State::DocumentContent => self.document_content(tokens),
            State::DocumentEnd => self.document_end(tokens),

            State::BlockNode => self.node(tokens, BLOCK, NodeKind::Root, !EMPTY_OK),

            State::BlockSequenceEntry(opts) => self.block_sequence_entry(tokens, opts.contains(O_FIRST)),
            State::BlockMappingKey(opts) => self.block_mapping_key(tokens, opts.contains(O_FIRST)),
            State::BlockMappingValue => self.block_mapping_value(tokens),

            State::FlowSequenceEntry(opts) => self.flow_sequence_entry(tokens, opts.contains(O_FIRST)),
            State::FlowSequenceMappingKey => self.flow_sequence_mapping_key(tokens),
            State::FlowSequenceMappingValue => self.flow_sequence_mapping_value(tokens),
            State::FlowSequenceMappingEnd => self.flow_sequence_mapping_end(tokens),

            State::FlowMappingKey(opts) => self.flow_mapping_key(tokens, opts.contains(O_FIRST)),
            State::FlowMappingValue => self.flow_mapping_value(tokens),

            State::StreamEnd => self.stream_end(tokens),
        }
    }

    fn stream_start<S>(&mut self, tokens: &mut Tokens<'de, S>) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        let entry = pop_entry(tokens)?;
        let mark = entry.mark();

        let encoding = match entry.into_token()
        {
            Token::StreamStart(encoding) => encoding,
            _ => return Err(ErrorCode::CorruptStream.into()),
        };

        self.state.set(State::DocumentStart(O_IMPLICIT | O_FIRST));

        Ok(Some(Event::new(
            mark,
            mark,
            EventData::StreamStart(StreamStart { encoding }),
        )))
    }

    fn stream_end<S>(&mut self, tokens: &mut Tokens<'de, S>) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        if self.done
        {
            return Ok(None);
        }

        let entry = pop_entry(tokens)?;
        let mark = entry.mark();

        if entry.marker() != Marker::StreamEnd
        {
            return Err(ErrorCode::CorruptStream.into());
        }

        self.done = true;

        Ok(Some(Event::new(mark, mark, EventData::StreamEnd)))
    }

    fn document_start<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
        implicit_ok: bool,
        first: bool,
    ) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        let _ = first;

        // Skip stray '...' markers
        if !implicit_ok
        {
            while peek_marker(tokens)? == Marker::DocumentEnd
            {
                pop_entry(tokens)?;
            }
        }

        // A stream without content produces no document
        // events at all
        if peek_marker(tokens)? == Marker::StreamEnd
        {
            self.state.set(State::StreamEnd);

            return Ok(None);
        }

        let directives = self.scan_directives(tokens)?;
        let explicit_marked = peek_marker(tokens)? == Marker::DocumentStart;
        let mark = peek_mark(tokens)?;

        if explicit_marked
        {
            pop_entry(tokens)?;
        }
        else if directives.is_some()
        {
            // Directives bind to a document, which must then
            // be explicitly started
            return Err(ErrorCode::MissingDocumentStart.into());
        }
        else if !implicit_ok
        {
            return Err(ErrorCode::MissingDocumentStart.into());
        }

        self.document = Rc::new(directives.unwrap_or_default());

        self.state.push(State::DocumentEnd);
        self.state.set(match explicit_marked
        {
            true => State::DocumentContent,
            false => State::BlockNode,
        });

        Ok(Some(Event::new(
            mark,
            mark,
            EventData::DocumentStart(DocumentStart {
                state:    Rc::clone(&self.document),
                implicit: !explicit_marked,
            }),
        )))
    }

    fn document_content<S>(&mut self, tokens: &mut Tokens<'de, S>) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        use Marker::*;

        // An explicit document may be empty; return control
        // to the machine with the content state popped
        let empty = matches!(
            peek_marker(tokens)?,
            VersionDirective | TagDirective | DocumentStart | DocumentEnd | StreamEnd
        );

        match empty
        {
            true =>
            {
                self.state.pop();

                Ok(None)
            },
            false => self.node(tokens, BLOCK, NodeKind::Root, !EMPTY_OK),
        }
    }

    fn document_end<S>(&mut self, tokens: &mut Tokens<'de, S>) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        let mark = peek_mark(tokens)?;
        let mut implicit = true;

        if peek_marker(tokens)? == Marker::DocumentEnd
        {
            pop_entry(tokens)?;
            implicit = false;
        }

        // An implicitly ended document requires the next one
        // to be explicitly started
        let opts = match implicit
        {
            true => O_NIL,
            false => O_IMPLICIT,
        };

        self.state.set(State::DocumentStart(opts));

        Ok(Some(Event::new(
            mark,
            mark,
            EventData::DocumentEnd(DocumentEnd { implicit }),
        )))
    }

    /// Collect any directive tokens into a fresh document
    /// state, enforcing the duplicate rules
    fn scan_directives<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
    ) -> Result<Option<DocumentState<'de>>>
    where
        S: Source + ?Sized,
    {
        let mut state = DocumentState::default();
        let mut any = false;

        loop
        {
            match peek_marker(tokens)?
            {
                Marker::VersionDirective =>
                {
                    let entry = pop_entry(tokens)?;

                    let (major, minor) = match entry.into_token()
                    {
                        Token::VersionDirective(major, minor) => (major, minor),
                        _ => return Err(ErrorCode::CorruptStream.into()),
                    };

                    if state.version_explicit
                    {
                        return Err(ErrorCode::DuplicateVersion.into());
                    }

                    state.version = VersionDirective { major, minor };
                    state.version_explicit = true;
                    any = true;
                },
                Marker::TagDirective =>
                {
                    let entry = pop_entry(tokens)?;

                    let (handle, prefix) = match entry.into_token()
                    {
                        Token::TagDirective(handle, prefix) => (handle, prefix),
                        _ => return Err(ErrorCode::CorruptStream.into()),
                    };

                    // A redeclared handle is an error unless it
                    // overrides a built in, or repeats the same
                    // prefix
                    let existing = state.lookup(&handle).cloned();

                    match existing
                    {
                        Some(previous) if previous == prefix =>
                        {},
                        Some(_) if is_builtin(&handle) =>
                        {
                            state.tags.push((handle, prefix));
                        },
                        Some(_) => return Err(ErrorCode::DuplicateTagDirective.into()),
                        None => state.tags.push((handle, prefix)),
                    }

                    state.tags_explicit = true;
                    any = true;
                },
                _ => break,
            }
        }

        Ok(any.then(|| state))
    }

    /// Produce the event for a single node: its decorators
    /// (anchor, tag) followed by a scalar, an alias, or a
    /// collection start.
    ///
    /// Callers must have pushed their continuation state;
    /// simple nodes pop it back into the top, collections
    /// replace the top with their entry state.
    fn node<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
        block: bool,
        kind: NodeKind,
        empty_ok: bool,
    ) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        let mut anchor: Option<Slice<'de>> = None;
        let mut tag: Option<Tag<'de>> = None;
        let mut start: Option<Mark> = None;

        loop
        {
            match peek_marker(tokens)?
            {
                Marker::Anchor if anchor.is_none() =>
                {
                    let entry = pop_entry(tokens)?;

                    start.get_or_insert(entry.mark());

                    anchor = match entry.into_token()
                    {
                        Token::Anchor(name) => Some(name),
                        _ => return Err(ErrorCode::CorruptStream.into()),
                    };
                },
                Marker::Tag if tag.is_none() =>
                {
                    let entry = pop_entry(tokens)?;

                    start.get_or_insert(entry.mark());

                    tag = match entry.into_token()
                    {
                        Token::Tag(handle, suffix) => Some(self.resolve_tag(handle, suffix)?),
                        _ => return Err(ErrorCode::CorruptStream.into()),
                    };
                },
                _ => break,
            }
        }

        let mark = peek_mark(tokens)?;
        let start = start.unwrap_or(mark);

        let data = match peek_marker(tokens)?
        {
            Marker::Alias =>
            {
                // Decorators cannot apply to an alias
                if anchor.is_some() || tag.is_some()
                {
                    return Err(ErrorCode::MissingNode.into());
                }

                let entry = pop_entry(tokens)?;

                let name = match entry.into_token()
                {
                    Token::Alias(name) => name,
                    _ => return Err(ErrorCode::CorruptStream.into()),
                };

                self.state.pop();

                EventData::Alias(Alias { name })
            },
            Marker::Scalar =>
            {
                let entry = pop_entry(tokens)?;

                let content = match entry.into_token()
                {
                    Token::Scalar(cell) => cell,
                    _ => return Err(ErrorCode::CorruptStream.into()),
                };

                self.state.pop();

                EventData::Scalar(NodeEvent {
                    anchor,
                    tag,
                    content,
                    kind,
                })
            },
            Marker::BlockSequenceStart if block =>
            {
                pop_entry(tokens)?;
                self.state.set(State::BlockSequenceEntry(O_FIRST));

                EventData::SequenceStart(NodeEvent {
                    anchor,
                    tag,
                    content: Sequence { flow: false },
                    kind,
                })
            },
            Marker::BlockMappingStart if block =>
            {
                pop_entry(tokens)?;
                self.state.set(State::BlockMappingKey(O_FIRST));

                EventData::MappingStart(NodeEvent {
                    anchor,
                    tag,
                    content: Mapping { flow: false },
                    kind,
                })
            },
            Marker::FlowSequenceStart =>
            {
                pop_entry(tokens)?;
                self.state.set(State::FlowSequenceEntry(O_FIRST));

                EventData::SequenceStart(NodeEvent {
                    anchor,
                    tag,
                    content: Sequence { flow: true },
                    kind,
                })
            },
            Marker::FlowMappingStart =>
            {
                pop_entry(tokens)?;
                self.state.set(State::FlowMappingKey(O_FIRST));

                EventData::MappingStart(NodeEvent {
                    anchor,
                    tag,
                    content: Mapping { flow: true },
                    kind,
                })
            },
            _ if anchor.is_some() || tag.is_some() || empty_ok =>
            {
                self.state.pop();

                EventData::Scalar(NodeEvent {
                    anchor,
                    tag,
                    content: ScalarCell::from_text(""),
                    kind,
                })
            },
            _ => return Err(ErrorCode::MissingNode.into()),
        };

        Ok(Some(Event::new(start, mark, data)))
    }

    fn block_sequence_entry<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
        first: bool,
    ) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        let _ = first;

        match peek_marker(tokens)?
        {
            Marker::BlockEnd =>
            {
                let mark = pop_entry(tokens)?.mark();

                self.state.pop();

                Ok(Some(Event::new(mark, mark, EventData::SequenceEnd)))
            },
            Marker::BlockEntry =>
            {
                pop_entry(tokens)?;

                // An entry may be empty: '- ' followed by
                // another entry or the block's end
                match peek_marker(tokens)?
                {
                    Marker::BlockEntry | Marker::BlockEnd =>
                    {
                        let mark = peek_mark(tokens)?;

                        Ok(Some(empty_scalar(mark, NodeKind::Entry)))
                    },
                    _ =>
                    {
                        self.state.push(State::BlockSequenceEntry(O_NIL));

                        self.node(tokens, BLOCK, NodeKind::Entry, !EMPTY_OK)
                    },
                }
            },
            _ => Err(ErrorCode::MissingBlockEntry.into()),
        }
    }

    fn block_mapping_key<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
        first: bool,
    ) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        let _ = first;

        match peek_marker(tokens)?
        {
            Marker::BlockEnd =>
            {
                let mark = pop_entry(tokens)?.mark();

                self.state.pop();

                Ok(Some(Event::new(mark, mark, EventData::MappingEnd)))
            },
            Marker::Key =>
            {
                pop_entry(tokens)?;

                match peek_marker(tokens)?
                {
                    // '? ' followed by another structure token:
                    // the key is empty
                    Marker::Key | Marker::Value | Marker::BlockEnd =>
                    {
                        let mark = peek_mark(tokens)?;

                        self.state.set(State::BlockMappingValue);

                        Ok(Some(empty_scalar(mark, NodeKind::Key)))
                    },
                    _ =>
                    {
                        self.state.push(State::BlockMappingValue);

                        self.node(tokens, BLOCK, NodeKind::Key, !EMPTY_OK)
                    },
                }
            },
            // A value with no preceding key
            Marker::Value =>
            {
                let mark = peek_mark(tokens)?;

                self.state.set(State::BlockMappingValue);

                Ok(Some(empty_scalar(mark, NodeKind::Key)))
            },
            _ => Err(ErrorCode::MissingKey.into()),
        }
    }

    fn block_mapping_value<S>(&mut self, tokens: &mut Tokens<'de, S>)
        -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        match peek_marker(tokens)?
        {
            Marker::Value =>
            {
                pop_entry(tokens)?;

                match peek_marker(tokens)?
                {
                    // 'key:' with nothing on the right
                    Marker::Key | Marker::Value | Marker::BlockEnd =>
                    {
                        let mark = peek_mark(tokens)?;

                        self.state.set(State::BlockMappingKey(O_NIL));

                        Ok(Some(empty_scalar(mark, NodeKind::Value)))
                    },
                    _ =>
                    {
                        self.state.push(State::BlockMappingKey(O_NIL));

                        self.node(tokens, BLOCK, NodeKind::Value, EMPTY_OK)
                    },
                }
            },
            _ =>
            {
                let mark = peek_mark(tokens)?;

                self.state.set(State::BlockMappingKey(O_NIL));

                Ok(Some(empty_scalar(mark, NodeKind::Value)))
            },
        }
    }

    fn flow_sequence_entry<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
        first: bool,
    ) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        if peek_marker(tokens)? == Marker::FlowSequenceEnd
        {
            let mark = pop_entry(tokens)?.mark();

            self.state.pop();

            return Ok(Some(Event::new(mark, mark, EventData::SequenceEnd)));
        }

        if !first
        {
            if peek_marker(tokens)? != Marker::FlowEntry
            {
                return Err(ErrorCode::MissingFlowSequenceDelimiter.into());
            }

            pop_entry(tokens)?;

            // A trailing ',' before the ']'
            if peek_marker(tokens)? == Marker::FlowSequenceEnd
            {
                let mark = pop_entry(tokens)?.mark();

                self.state.pop();

                return Ok(Some(Event::new(mark, mark, EventData::SequenceEnd)));
            }
        }

        match peek_marker(tokens)?
        {
            // A compact mapping: '[ key: value ]'
            Marker::Key =>
            {
                let mark = pop_entry(tokens)?.mark();

                self.state.set(State::FlowSequenceMappingKey);

                Ok(Some(Event::new(
                    mark,
                    mark,
                    EventData::MappingStart(NodeEvent {
                        anchor:  None,
                        tag:     None,
                        content: Mapping { flow: true },
                        kind:    NodeKind::Entry,
                    }),
                )))
            },
            _ =>
            {
                self.state.push(State::FlowSequenceEntry(O_NIL));

                self.node(tokens, !BLOCK, NodeKind::Entry, !EMPTY_OK)
            },
        }
    }

    fn flow_sequence_mapping_key<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
    ) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        match peek_marker(tokens)?
        {
            Marker::Value =>
            {
                let mark = peek_mark(tokens)?;

                self.state.set(State::FlowSequenceMappingValue);

                Ok(Some(empty_scalar(mark, NodeKind::Key)))
            },
            _ =>
            {
                self.state.push(State::FlowSequenceMappingValue);

                self.node(tokens, !BLOCK, NodeKind::Key, !EMPTY_OK)
            },
        }
    }

    fn flow_sequence_mapping_value<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
    ) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        match peek_marker(tokens)?
        {
            Marker::Value =>
            {
                pop_entry(tokens)?;

                match peek_marker(tokens)?
                {
                    Marker::FlowEntry | Marker::FlowSequenceEnd =>
                    {
                        let mark = peek_mark(tokens)?;

                        self.state.set(State::FlowSequenceMappingEnd);

                        Ok(Some(empty_scalar(mark, NodeKind::Value)))
                    },
                    _ =>
                    {
                        self.state.push(State::FlowSequenceMappingEnd);

                        self.node(tokens, !BLOCK, NodeKind::Value, EMPTY_OK)
                    },
                }
            },
            _ =>
            {
                let mark = peek_mark(tokens)?;

                self.state.set(State::FlowSequenceMappingEnd);

                Ok(Some(empty_scalar(mark, NodeKind::Value)))
            },
        }
    }

    fn flow_sequence_mapping_end<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
    ) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        let mark = peek_mark(tokens)?;

        self.state.set(State::FlowSequenceEntry(O_NIL));

        Ok(Some(Event::new(mark, mark, EventData::MappingEnd)))
    }

    fn flow_mapping_key<S>(
        &mut self,
        tokens: &mut Tokens<'de, S>,
        first: bool,
    ) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        if peek_marker(tokens)? == Marker::FlowMappingEnd
        {
            let mark = pop_entry(tokens)?.mark();

            self.state.pop();

            return Ok(Some(Event::new(mark, mark, EventData::MappingEnd)));
        }

        if !first
        {
            if peek_marker(tokens)? != Marker::FlowEntry
            {
                return Err(ErrorCode::MissingFlowMappingDelimiter.into());
            }

            pop_entry(tokens)?;

            if peek_marker(tokens)? == Marker::FlowMappingEnd
            {
                let mark = pop_entry(tokens)?.mark();

                self.state.pop();

                return Ok(Some(Event::new(mark, mark, EventData::MappingEnd)));
            }
        }

        match peek_marker(tokens)?
        {
            Marker::Key =>
            {
                pop_entry(tokens)?;

                match peek_marker(tokens)?
                {
                    Marker::Value | Marker::FlowEntry | Marker::FlowMappingEnd =>
                    {
                        let mark = peek_mark(tokens)?;

                        self.state.set(State::FlowMappingValue);

                        Ok(Some(empty_scalar(mark, NodeKind::Key)))
                    },
                    _ =>
                    {
                        self.state.push(State::FlowMappingValue);

                        self.node(tokens, !BLOCK, NodeKind::Key, !EMPTY_OK)
                    },
                }
            },
            Marker::Value =>
            {
                let mark = peek_mark(tokens)?;

                self.state.set(State::FlowMappingValue);

                Ok(Some(empty_scalar(mark, NodeKind::Key)))
            },
            _ =>
            {
                self.state.push(State::FlowMappingValue);

                self.node(tokens, !BLOCK, NodeKind::Key, !EMPTY_OK)
            },
        }
    }

    fn flow_mapping_value<S>(&mut self, tokens: &mut Tokens<'de, S>) -> Result<Option<Event<'de>>>
    where
        S: Source + ?Sized,
    {
        match peek_marker(tokens)?
        {
            Marker::Value =>
            {
                pop_entry(tokens)?;

                match peek_marker(tokens)?
                {
                    Marker::FlowEntry | Marker::FlowMappingEnd =>
                    {
                        let mark = peek_mark(tokens)?;

                        self.state.set(State::FlowMappingKey(O_NIL));

                        Ok(Some(empty_scalar(mark, NodeKind::Value)))
                    },
                    _ =>
                    {
                        self.state.push(State::FlowMappingKey(O_NIL));

                        self.node(tokens, !BLOCK, NodeKind::Value, EMPTY_OK)
                    },
                }
            },
            _ =>
            {
                let mark = peek_mark(tokens)?;

                self.state.set(State::FlowMappingKey(O_NIL));

                Ok(Some(empty_scalar(mark, NodeKind::Value)))
            },
        }
    }

    /// Resolve a tag token's handle against the current
    /// document's directives
    fn resolve_tag(&self, handle: Slice<'de>, suffix: Slice<'de>) -> Result<Tag<'de>>
    {
        // Verbatim tags bypass resolution
        if handle.is_empty()
        {
            return Ok(Tag {
                handle,
                prefix: Slice::Borrowed(""),
                suffix,
            });
        }

        match self.document.lookup(&handle)
        {
            Some(prefix) => Ok(Tag {
                prefix: prefix.clone(),
                handle,
                suffix,
            }),
            None => Err(ErrorCode::UndefinedTagHandle.into()),
        }
    }
}

fn classify(error: &Error) -> crate::error::Category
{
    match error.code()
    {
        Some(code) => code.into(),
        None => crate::error::Category::IO,
    }
}

fn empty_scalar<'de>(mark: Mark, kind: NodeKind) -> Event<'de>
{
    Event::new(
        mark,
        mark,
        EventData::Scalar(NodeEvent {
            anchor:  None,
            tag:     None,
            content: ScalarCell::from_text(""),
            kind,
        }),
    )
}

fn is_builtin(handle: &str) -> bool
{
    crate::event::types::DEFAULT_TAGS
        .iter()
        .any(|(dh, _)| dh == handle)
}

fn peek_marker<'de, S>(tokens: &mut Tokens<'de, S>) -> Result<Marker>
where
    S: Source + ?Sized,
{
    tokens
        .peek()
        .map_err(Error::from)
        .and_then(|maybe| maybe.ok_or_else(|| ErrorCode::UnexpectedEOF.into()))
        .map(|entry| entry.marker())
}

fn peek_mark<'de, S>(tokens: &mut Tokens<'de, S>) -> Result<Mark>
where
    S: Source + ?Sized,
{
    tokens
        .peek()
        .map_err(Error::from)
        .and_then(|maybe| maybe.ok_or_else(|| ErrorCode::UnexpectedEOF.into()))
        .map(|entry| entry.mark())
}

fn pop_entry<'de, S>(tokens: &mut Tokens<'de, S>) -> Result<TokenEntry<'de>>
where
    S: Source + ?Sized,
{
    tokens
        .pop()
        .map_err(Error::from)
        .and_then(|maybe| maybe.ok_or_else(|| ErrorCode::UnexpectedEOF.into()))
}
