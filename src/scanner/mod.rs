/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The scanner: a streaming tokenizer over YAML byte
//! slices. It manages the indentation stack, the flow level
//! and the simple key candidates, queueing tokens keyed by
//! the stream position they were read at so that tokens
//! discovered retroactively (KEY, most importantly) land in
//! the right place.

// Note that this module must come before all others, as
// they depend on the macros which expand into this scope
#[macro_use]
mod macros;

pub(crate) mod entry;
pub(crate) mod error;
pub(crate) mod flag;

mod anchor;
mod context;
mod directive;
mod key;
mod scalar;
mod stats;
mod tag;

use crate::{
    chars,
    queue::Queue,
    scanner::{
        anchor::scan_anchor,
        context::{Collection, Context, STARTING_INDENT},
        directive::scan_directive,
        entry::TokenEntry,
        error::{ScanError, ScanResult as Result},
        flag::{Flags, O_INCREMENTAL},
        key::SimpleKey,
        scalar::{block::scan_block_scalar, flow::scan_flow_scalar, plain::scan_plain_scalar},
        stats::Cursor,
        tag::scan_node_tag,
    },
    token::{StreamEncoding, Token},
};

type Tokens<'de> = Queue<TokenEntry<'de>>;

#[derive(Debug)]
pub(crate) struct Scanner
{
    /// Offset into the data buffer to start at
    offset: usize,

    /// Current stream state
    state: StreamState,

    /// Can a simple (i.e not complex) key potentially start
    /// at the current position?
    simple_key_allowed: bool,

    // Subsystems
    cursor:  Cursor,
    key:     SimpleKey,
    context: Context,
}

impl Scanner
{
    pub fn new() -> Self
    {
        Self {
            offset:             0,
            state:              StreamState::Start,
            simple_key_allowed: false,
            cursor:             Cursor::new(),
            key:                SimpleKey::new(),
            context:            Context::new(),
        }
    }

    /// Scan tokens from .base into .tokens, returning the
    /// number added. Zero tokens added with an Ok return
    /// means the stream is done.
    pub fn scan_tokens<'de>(
        &mut self,
        opts: Flags,
        base: &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<usize>
    {
        let starting_tokens = tokens.len();

        // Keep scanning while a candidate key is pending, as
        // until it resolves the queue's head may yet be
        // reordered
        while self.state != StreamState::Done
            && (starting_tokens == tokens.len() || self.key.pending())
        {
            if let Some(mut buffer) = base.get(self.offset..)
            {
                let run = self.scan_next_token(opts, &mut buffer, tokens);

                if matches!(run, Err(ScanError::NeedMore) | Ok(_))
                {
                    self.offset = base.len() - buffer.len();
                }

                run?;
            }
        }

        Ok(tokens.len() - starting_tokens)
    }

    /// Offset into the last scanned buffer that tokens have
    /// been consumed to
    pub fn offset(&self) -> usize
    {
        self.offset
    }

    /// Reset the buffer offset, typically after the caller
    /// has rebased the buffer on a new chunk
    pub fn reset_offset(&mut self)
    {
        self.offset = 0;
    }

    fn scan_next_token<'de>(
        &mut self,
        opts: Flags,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        if self.state == StreamState::Start
        {
            self.fetch_stream_start(base, tokens);

            return Ok(());
        }

        self.eat_whitespace(base)?;

        // Candidates a line break has passed can no longer
        // become keys
        if self.key.expire_passed(self.cursor.line).is_err()
        {
            return Err(ScanError::MissingValue);
        }

        // An empty incremental buffer is a suspension, not
        // the end of the stream
        if base.is_empty() && opts.contains(O_INCREMENTAL)
        {
            return Err(ScanError::NeedMore);
        }

        // Handle indentation decreases
        self.unroll_indent(tokens, self.cursor.column)?;
        self.pop_zero_indent_sequence(*base, tokens)?;

        if base.is_empty() || self.state == StreamState::Done
        {
            return self.fetch_stream_end(*base, tokens);
        }

        // 4 codepoints covers the longest lookahead we need:
        // '--- ' / '... '
        lookahead!(*base, 4, opts)?;

        match base.as_bytes()
        {
            [DIRECTIVE, ..] if self.cursor.column == 0 => self.fetch_directive(opts, base, tokens),

            [b @ b'-', b'-', b'-', ..] | [b @ b'.', b'.', b'.', ..]
                if self.cursor.column == 0 && chars::is_ws_z(base.as_bytes(), 3) =>
            {
                self.fetch_document_marker(base, tokens, *b == b'-')
            },

            [b @ FLOW_MAPPING_START, ..] | [b @ FLOW_SEQUENCE_START, ..] =>
            {
                self.fetch_flow_collection_start(base, tokens, *b == FLOW_MAPPING_START)
            },

            [b @ FLOW_MAPPING_END, ..] | [b @ FLOW_SEQUENCE_END, ..] =>
            {
                self.fetch_flow_collection_end(base, tokens, *b == FLOW_MAPPING_END)
            },

            [FLOW_ENTRY, ..] => self.fetch_flow_collection_entry(base, tokens),

            [BLOCK_ENTRY, ..] if chars::is_ws_z(base.as_bytes(), 1) =>
            {
                self.fetch_block_collection_entry(base, tokens)
            },

            [EXPLICIT_KEY, ..]
                if self.context.is_flow() || chars::is_ws_z(base.as_bytes(), 1) =>
            {
                self.fetch_explicit_key(base, tokens)
            },

            [VALUE, ..] if chars::is_ws_z(base.as_bytes(), 1) || self.context.is_flow() =>
            {
                self.fetch_value(base, tokens)
            },

            [ANCHOR, ..] | [ALIAS, ..] => self.fetch_anchor(opts, base, tokens),

            [TAG, ..] => self.fetch_tag(opts, base, tokens),

            [c @ LITERAL, ..] | [c @ FOLDED, ..] if self.context.is_block() =>
            {
                self.fetch_block_scalar(opts, base, tokens, *c == FOLDED)
            },

            [SINGLE, ..] | [DOUBLE, ..] => self.fetch_flow_scalar(opts, base, tokens),

            _ if self.is_plain_scalar(*base) => self.fetch_plain_scalar(opts, base, tokens),

            _ => Err(ScanError::UnknownToken),
        }
    }

    fn fetch_stream_start<'de>(&mut self, base: &mut &'de str, tokens: &mut Tokens<'de>)
    {
        // A leading BOM is accepted and discarded
        if base.starts_with('\u{FEFF}')
        {
            advance!(*base, 3);
            self.cursor.skip(3);
        }

        // A key is allowed at the beginning of the stream
        self.simple_key_allowed = true;
        self.state = StreamState::Stream;

        enqueue!(Token::StreamStart(StreamEncoding::UTF8), self.cursor.mark() => tokens);
    }

    fn fetch_stream_end(&mut self, buffer: &str, tokens: &mut Tokens) -> Result<()>
    {
        match (self.state, buffer.is_empty())
        {
            (StreamState::Done, _) | (_, false) =>
            {},
            (_, true) =>
            {
                self.unroll_indent(tokens, STARTING_INDENT)?;
                self.clear_saved_key()?;

                self.state = StreamState::Done;

                enqueue!(Token::StreamEnd, self.cursor.mark() => tokens);
            },
        }

        Ok(())
    }

    fn fetch_document_marker<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
        start: bool,
    ) -> Result<()>
    {
        self.unroll_indent(tokens, STARTING_INDENT)?;
        self.clear_saved_key()?;

        // A key cannot follow a document marker
        self.simple_key_allowed = false;

        advance!(*base, :self.cursor, 3);

        let token = match start
        {
            true => Token::DocumentStart,
            false => Token::DocumentEnd,
        };

        enqueue!(token, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_directive<'de>(
        &mut self,
        opts: Flags,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        ensure_line_visible(base, opts)?;

        self.unroll_indent(tokens, STARTING_INDENT)?;
        self.clear_saved_key()?;

        // A key cannot follow a directive (a newline is
        // required)
        self.simple_key_allowed = false;

        let (token, amount) = scan_directive(*base, &mut self.cursor)?;

        advance!(*base, amount);

        enqueue!(token, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_anchor<'de>(
        &mut self,
        opts: Flags,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        ensure_line_visible(base, opts)?;

        // An anchor / alias may start a simple key
        self.save_key(!REQUIRED);

        // A key may not start after an anchor (only before)
        self.simple_key_allowed = false;

        let (token, amount) = scan_anchor(*base, &mut self.cursor)?;

        advance!(*base, amount);

        enqueue!(token, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_tag<'de>(
        &mut self,
        opts: Flags,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        ensure_line_visible(base, opts)?;

        self.save_key(!REQUIRED);

        // A key may not start after a tag (only before)
        self.simple_key_allowed = false;

        let (token, amount) = scan_node_tag(*base, &mut self.cursor)?;

        advance!(*base, amount);

        enqueue!(token, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_flow_scalar<'de>(
        &mut self,
        opts: Flags,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        let single = check!(base => [SINGLE, ..]);

        self.save_key(!REQUIRED);

        // A key cannot follow a flow scalar, as we're either
        // currently in a key (which should be followed by a
        // value), or a value which needs a separator (e.g
        // line break) before another key is legal
        self.simple_key_allowed = false;

        let (token, amount) = scan_flow_scalar(opts, *base, &mut self.cursor, single)?;

        advance!(*base, amount);

        enqueue!(token, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_plain_scalar<'de>(
        &mut self,
        opts: Flags,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        self.save_key(!REQUIRED);

        // A simple key cannot follow a plain scalar, there
        // must be an indicator or new line before a key is
        // valid again
        self.simple_key_allowed = false;

        let (token, amount) = scan_plain_scalar(opts, *base, &mut self.cursor, &self.context)?;

        advance!(*base, amount);

        enqueue!(token, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_block_scalar<'de>(
        &mut self,
        opts: Flags,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
        fold: bool,
    ) -> Result<()>
    {
        self.clear_saved_key()?;

        // A block scalar cannot be a key, therefore a key may
        // always follow one
        self.simple_key_allowed = true;

        let (token, amount) =
            scan_block_scalar(opts, *base, &mut self.cursor, &self.context, fold)?;

        advance!(*base, amount);

        enqueue!(token, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_explicit_key<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        let block_context = self.context.is_block();

        if block_context
        {
            if !self.simple_key_allowed
            {
                return Err(ScanError::InvalidKey);
            }

            roll_indent(
                &mut self.context,
                tokens,
                self.cursor.mark(),
                Collection::Mapping,
            );
        }

        self.clear_saved_key()?;

        /*
         * Another key may follow an explicit key in the block
         * context, typically when this explicit key is a
         * mapping node, and the mapping starts inline with the
         * explicit key. E.g:
         *
         *      ? my key: value
         *      : value
         */
        self.simple_key_allowed = block_context;

        advance!(*base, :self.cursor, 1);

        enqueue!(Token::Key, self.cursor.mark() => tokens);

        Ok(())
    }

    /// Fetch a value token (':'), unwinding any saved key
    /// and adding indentation tokens as needed
    fn fetch_value<'de>(&mut self, base: &mut &'de str, tokens: &mut Tokens<'de>) -> Result<()>
    {
        match self.key.take()
        {
            Some(saved) if saved.allowed =>
            {
                roll_indent(&mut self.context, tokens, saved.mark, Collection::Mapping);

                enqueue!(Token::Key, saved.mark => tokens);

                // A key cannot follow another key
                self.simple_key_allowed = false;
            },
            // Otherwise we found a complex key ('?')
            // previously, or a scalar that cannot be a key
            _ =>
            {
                let block_context = self.context.is_block();

                if block_context
                {
                    if !self.simple_key_allowed
                    {
                        return Err(ScanError::InvalidValue);
                    }

                    roll_indent(
                        &mut self.context,
                        tokens,
                        self.cursor.mark(),
                        Collection::Mapping,
                    );
                }

                // A simple key is allowed after a value in the
                // block context
                self.simple_key_allowed = block_context;
            },
        }

        advance!(*base, :self.cursor, 1);

        enqueue!(Token::Value, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_flow_collection_start<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
        map: bool,
    ) -> Result<()>
    {
        // The collection itself may be an implicit key of the
        // enclosing level
        self.save_key(!REQUIRED);

        self.context.flow_increment()?;
        self.key.enter_flow();

        // A simple key may start after '[' or '{'
        self.simple_key_allowed = true;

        advance!(*base, :self.cursor, 1);

        let token = match map
        {
            true => Token::FlowMappingStart,
            false => Token::FlowSequenceStart,
        };

        enqueue!(token, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_flow_collection_end<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
        map: bool,
    ) -> Result<()>
    {
        // Any unresolved candidate of the closing level dies
        // with it
        self.key.leave_flow();

        if self.context.is_flow()
        {
            self.context.flow_decrement()?;
        }

        // A simple key is not allowed after a ']' or '}'
        self.simple_key_allowed = false;

        advance!(*base, :self.cursor, 1);

        let token = match map
        {
            true => Token::FlowMappingEnd,
            false => Token::FlowSequenceEnd,
        };

        enqueue!(token, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_flow_collection_entry<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        self.key.take();

        // A simple key can start after a ','
        self.simple_key_allowed = true;

        advance!(*base, :self.cursor, 1);

        enqueue!(Token::FlowEntry, self.cursor.mark() => tokens);

        Ok(())
    }

    fn fetch_block_collection_entry<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        if !(self.context.is_block() && self.simple_key_allowed)
        {
            return Err(ScanError::InvalidBlockEntry);
        }

        roll_indent(
            &mut self.context,
            tokens,
            self.cursor.mark(),
            Collection::Sequence,
        );

        // A zero indented sequence that is still producing
        // entries must not be popped; refresh its line
        let line = self.cursor.line;
        let column = self.cursor.column;

        if let Some(entry) = self.context.last_mut()
        {
            if entry.zero_indented && entry.column == column && entry.line < line
            {
                entry.line = line;
            }
        }

        self.clear_saved_key()?;

        // A key is possible after a '-'
        self.simple_key_allowed = true;

        advance!(*base, :self.cursor, 1);

        enqueue!(Token::BlockEntry, self.cursor.mark() => tokens);

        Ok(())
    }

    fn unroll_indent<'de, T>(&mut self, tokens: &mut Tokens<'de>, column: T) -> Result<()>
    where
        T: Into<context::Indent>,
    {
        if self.context.is_block()
        {
            let mark = self.cursor.mark();

            self.context.pop_indents_to(column, |_| {
                enqueue!(Token::BlockEnd, mark => tokens);

                Ok(())
            })?;
        }

        Ok(())
    }

    /// Close a zero indented sequence once a new line brings
    /// something other than another entry
    fn pop_zero_indent_sequence<'de>(
        &mut self,
        base: &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        let stale = self.context.last().map_or(false, |entry| {
            entry.zero_indented
                && entry.kind == Collection::Sequence
                && entry.line < self.cursor.line
        });

        if stale && !check!(base => [b'-', ..])
        {
            let mark = self.cursor.mark();

            self.context.pop_indent(|_| {
                enqueue!(Token::BlockEnd, mark => tokens);

                Ok(())
            })?;
        }

        Ok(())
    }

    /// Save the current position as a key candidate, if a
    /// simple key is possible here
    fn save_key(&mut self, required: bool)
    {
        // A key is required if we are in the block context at
        // the exact column of the open indent
        let required = required
            || (self.context.is_block() && self.context.indent() == self.cursor.column);

        if self.simple_key_allowed
        {
            self.key.save(self.cursor.mark(), required);
        }
    }

    fn clear_saved_key(&mut self) -> Result<()>
    {
        if let Some(saved) = self.key.take()
        {
            if saved.required && saved.allowed
            {
                return Err(ScanError::MissingValue);
            }
        }

        Ok(())
    }

    /// Checks if .base starts a plain scalar, per the YAML
    /// restrictions on a plain scalar's first character
    fn is_plain_scalar(&self, base: &str) -> bool
    {
        if chars::is_ws_z(base.as_bytes(), 0)
        {
            return false;
        }

        match base.as_bytes()
        {
            [DIRECTIVE, ..]
            | [ANCHOR, ..]
            | [ALIAS, ..]
            | [TAG, ..]
            | [SINGLE, ..]
            | [DOUBLE, ..]
            | [FLOW_MAPPING_START, ..]
            | [FLOW_SEQUENCE_START, ..]
            | [FLOW_MAPPING_END, ..]
            | [FLOW_SEQUENCE_END, ..]
            | [FLOW_ENTRY, ..]
            | [LITERAL, ..]
            | [FOLDED, ..]
            | [COMMENT, ..]
            | [RESERVED_1, ..]
            | [RESERVED_2, ..] => false,

            // ':' '?' '-' may start a plain scalar if their
            // follower is plain safe
            [VALUE, ..] | [EXPLICIT_KEY, ..] | [BLOCK_ENTRY, ..] =>
            {
                self.context.is_block() || !chars::is_flow_indicator(base.as_bytes(), 1)
            },

            _ => true,
        }
    }

    /// Chomp whitespace and comments until the next token,
    /// rejecting tabs found in block indentation
    fn eat_whitespace(&mut self, buffer: &mut &str) -> Result<()>
    {
        let mut in_comment = false;
        let mut line_start = false;
        let mut tab_in_indent = false;

        loop
        {
            let bytes = buffer.as_bytes();

            if check!(buffer => [b'#', ..]) && !in_comment
            {
                in_comment = true;
            }

            if chars::is_break(bytes, 0)
            {
                advance!(*buffer, :self.cursor, @line);

                in_comment = false;
                line_start = true;
                tab_in_indent = false;

                // A new line may start a key in the block
                // context
                if self.context.is_block()
                {
                    self.simple_key_allowed = true;
                }
            }
            else if chars::is_blank(bytes, 0)
            {
                if line_start && bytes[0] == b'\t' && self.context.is_block()
                {
                    tab_in_indent = true;
                }

                advance!(*buffer, :self.cursor, 1);
            }
            else if in_comment && !bytes.is_empty()
            {
                let width = chars::width_of(bytes, 0).max(1);

                advance!(*buffer, :self.cursor, width);
            }
            else
            {
                // Tabs cannot indent a token in the block
                // context
                if tab_in_indent && !bytes.is_empty() && bytes[0] != b'#'
                {
                    return Err(ScanError::InvalidTab);
                }

                return Ok(());
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum StreamState
{
    Start,
    Stream,
    Done,
}

/// Open a block collection at .mark if the indentation
/// demands one, enqueueing its start token
fn roll_indent<'de>(
    context: &mut Context,
    tokens: &mut Tokens<'de>,
    mark: crate::token::Mark,
    kind: Collection,
)
{
    if context.is_flow()
    {
        return;
    }

    if context.indent() < mark.column
    {
        context.push_indent(mark.column, mark.line, kind);

        let token = match kind
        {
            Collection::Mapping => Token::BlockMappingStart,
            Collection::Sequence => Token::BlockSequenceStart,
        };

        enqueue!(token, mark => tokens);
    }
    // A sequence may sit at the same column as the mapping
    // that holds it (a zero indented sequence)
    else if kind == Collection::Sequence && context.indent() == mark.column
    {
        let host_is_mapping = context
            .last()
            .map_or(false, |entry| entry.kind == Collection::Mapping);

        if host_is_mapping
        {
            context.push_indent(mark.column, mark.line, kind);

            if let Some(entry) = context.last_mut()
            {
                entry.zero_indented = true;
            }

            enqueue!(Token::BlockSequenceStart, mark => tokens);
        }
    }
}

/// Error with the NeedMore sentinel if no line break is
/// visible in .buffer and the stream is incremental; used
/// before scanning line bounded constructs so a suspended
/// scan never half-updates the cursor
fn ensure_line_visible(buffer: &str, opts: Flags) -> Result<()>
{
    let bytes = buffer.as_bytes();

    if !opts.contains(O_INCREMENTAL)
    {
        return Ok(());
    }

    let mut at = 0;

    while at < bytes.len()
    {
        if chars::is_break(bytes, at)
        {
            return Ok(());
        }

        at += chars::width_of(bytes, at).max(1);
    }

    Err(ScanError::NeedMore)
}

const DIRECTIVE: u8 = b'%';
const ANCHOR: u8 = b'&';
const ALIAS: u8 = b'*';
const TAG: u8 = b'!';
const SINGLE: u8 = b'\'';
const DOUBLE: u8 = b'"';
const VALUE: u8 = b':';
const FLOW_MAPPING_START: u8 = b'{';
const FLOW_MAPPING_END: u8 = b'}';
const FLOW_SEQUENCE_START: u8 = b'[';
const FLOW_SEQUENCE_END: u8 = b']';
const FLOW_ENTRY: u8 = b',';
const BLOCK_ENTRY: u8 = b'-';
const EXPLICIT_KEY: u8 = b'?';
const LITERAL: u8 = b'|';
const FOLDED: u8 = b'>';
const COMMENT: u8 = b'#';
const RESERVED_1: u8 = b'@';
const RESERVED_2: u8 = b'`';

const REQUIRED: bool = true;

#[cfg(test)]
mod tests;
