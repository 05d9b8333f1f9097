/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The emitter: serialises a [`Document`] (or any node of
//! one) back to bytes through a [`Sink`], in a
//! configurable [`EmitMode`].
//!
//! Round trips are *semantic*: a re-parse of the output
//! compares equal to the source document, while the byte
//! layout follows the configuration and each node's style
//! hint where the content allows it.

pub mod config;
pub mod sink;

pub(crate) mod scalar;

pub use self::{
    config::{EmitConfig, EmitFlags, EmitMode, MarkPolicy, O_EMIT_NONE, O_SORT_KEYS},
    sink::{BufferSink, Sink, StringSink, VecSink, WriteKind, WriterSink},
};

use std::collections::HashMap;

use crate::{
    document::{compare, Document, NodeId, NodeKind, NodeStyle},
    error::{
        internal::{Error as InternalError, ErrorCode, SourceError},
        Result,
    },
    event::types::Tag,
};

use self::scalar::Analysis;

/// Serialises documents through a [`Sink`]
#[derive(Debug)]
pub struct Emitter<S>
{
    config: EmitConfig,
    sink:   S,

    column:    usize,
    documents: usize,
}

impl<S> Emitter<S>
where
    S: Sink,
{
    pub fn new(config: EmitConfig, sink: S) -> Self
    {
        Self {
            config,
            sink,
            column: 0,
            documents: 0,
        }
    }

    pub fn into_sink(self) -> S
    {
        self.sink
    }

    /// Emit a whole document: framing, directives and
    /// content
    pub fn emit_document(&mut self, doc: &Document<'_>) -> Result<()>
    {
        self.emit_document_start(doc)?;

        if doc.root().is_some()
        {
            self.emit_root_node(doc)?;
        }

        self.emit_document_end(doc)
    }

    /// Emit the document framing that precedes content:
    /// directives and the '---' marker, per policy
    pub fn emit_document_start(&mut self, doc: &Document<'_>) -> Result<()>
    {
        if self.config.mode.is_json()
        {
            return Ok(());
        }

        let state = doc.state();
        let mut directives = false;

        match self.config.version_directive
        {
            MarkPolicy::On =>
            {
                self.put(
                    WriteKind::VersionDirective,
                    &format!("%YAML {}.{}", state.version.major, state.version.minor),
                )?;
                self.newline()?;

                directives = true;
            },
            MarkPolicy::Auto if state.version_explicit =>
            {
                self.put(
                    WriteKind::VersionDirective,
                    &format!("%YAML {}.{}", state.version.major, state.version.minor),
                )?;
                self.newline()?;

                directives = true;
            },
            _ =>
            {},
        }

        match self.config.tag_directives
        {
            MarkPolicy::Off => self.check_directives_not_needed(doc)?,
            MarkPolicy::On | MarkPolicy::Auto =>
            {
                let wanted = matches!(self.config.tag_directives, MarkPolicy::On)
                    || state.tags_explicit;

                if wanted
                {
                    for (handle, prefix) in state.explicit_tags()
                    {
                        self.put(
                            WriteKind::TagDirective,
                            &format!("%TAG {} {}", handle, prefix),
                        )?;
                        self.newline()?;

                        directives = true;
                    }
                }
            },
        }

        let marker = match self.config.doc_start_mark
        {
            MarkPolicy::On => true,
            // Directives force the marker regardless of policy
            MarkPolicy::Off => directives,
            MarkPolicy::Auto =>
            {
                directives || !doc.start_implicit() || self.documents > 0
            },
        };

        if marker
        {
            self.put(WriteKind::DocumentIndicator, "---")?;
            self.newline()?;
        }

        Ok(())
    }

    /// Emit the '...' marker, per policy
    pub fn emit_document_end(&mut self, doc: &Document<'_>) -> Result<()>
    {
        if !self.config.mode.is_json()
        {
            let marker = match self.config.doc_end_mark
            {
                MarkPolicy::On => true,
                MarkPolicy::Off => false,
                MarkPolicy::Auto => !doc.end_implicit(),
            };

            if marker
            {
                self.put(WriteKind::DocumentIndicator, "...")?;
                self.newline()?;
            }
        }

        self.documents += 1;

        Ok(())
    }

    /// Emit the document's root node without framing
    pub fn emit_root_node(&mut self, doc: &Document<'_>) -> Result<()>
    {
        match doc.root()
        {
            Some(root) => self.emit_node(doc, root),
            None => Ok(()),
        }
    }

    /// Emit any node of the document without framing
    pub fn emit_node(&mut self, doc: &Document<'_>, id: NodeId) -> Result<()>
    {
        let anchors = self.collect_anchors(doc);

        if self.config.mode.is_flow() || self.flow_hinted(doc, id)
        {
            self.flow_node(doc, &anchors, id, 0, false, false)?;

            if !self.config.mode.is_oneline()
            {
                self.newline()?;
            }

            return Ok(());
        }

        match doc.kind(id)?
        {
            NodeKind::Sequence if !doc.sequence_items(id)?.is_empty() =>
            {
                self.block_sequence(doc, &anchors, id, 0, false)
            },
            NodeKind::Mapping if !doc.mapping_pairs(id)?.is_empty() =>
            {
                self.block_mapping(doc, &anchors, id, 0, false)
            },
            _ =>
            {
                if !self.inline_node(doc, &anchors, id, 0, false)?
                {
                    self.newline()?;
                }

                Ok(())
            },
        }
    }

    /*
     * ==== Block emission ====
     *
     * Contract: block collection emitters are entered
     * either at a fresh line (inline = false) or with the
     * cursor already positioned for their first entry
     * (inline = true), and always leave the cursor at a
     * fresh line.
     */

    fn block_sequence(
        &mut self,
        doc: &Document<'_>,
        anchors: &AnchorMap,
        id: NodeId,
        level: usize,
        inline: bool,
    ) -> Result<()>
    {
        let items = doc.sequence_items(id)?.to_vec();

        for (at, item) in items.iter().enumerate()
        {
            if !(inline && at == 0)
            {
                self.indent_to(level)?;
            }

            self.put(WriteKind::Indicator, "-")?;
            self.pad_after_indicator()?;

            self.block_child(doc, anchors, *item, level, true)?;
        }

        Ok(())
    }

    fn block_mapping(
        &mut self,
        doc: &Document<'_>,
        anchors: &AnchorMap,
        id: NodeId,
        level: usize,
        inline: bool,
    ) -> Result<()>
    {
        let mut pairs = doc.mapping_pairs(id)?.to_vec();

        if self.config.flags.contains(O_SORT_KEYS)
        {
            pairs.sort_by(|a, b| compare::default_cmp(doc, a.key, b.key));
        }

        for (at, pair) in pairs.iter().enumerate()
        {
            if !(inline && at == 0)
            {
                self.indent_to(level)?;
            }

            if self.simple_key(doc, pair.key)
            {
                let _ = self.inline_node(doc, anchors, pair.key, level, true)?;
            }
            else
            {
                // Complex keys take the explicit form, the key
                // itself rendered flow on one line
                self.put(WriteKind::Indicator, "?")?;
                self.put(WriteKind::Whitespace, " ")?;
                self.flow_node(doc, anchors, pair.key, level + 1, true, true)?;
                self.newline()?;
                self.indent_to(level)?;
            }

            self.put(WriteKind::Indicator, ":")?;

            self.block_value(doc, anchors, pair.value, level)?;
        }

        Ok(())
    }

    /// A sequence entry's content, cursor after "- "
    fn block_child(
        &mut self,
        doc: &Document<'_>,
        anchors: &AnchorMap,
        id: NodeId,
        level: usize,
        _entry: bool,
    ) -> Result<()>
    {
        if self.flow_hinted(doc, id)
        {
            self.flow_node(doc, anchors, id, level + 1, false, false)?;

            return self.newline();
        }

        match doc.kind(id)?
        {
            NodeKind::Sequence if !doc.sequence_items(id)?.is_empty() =>
            {
                self.block_sequence(doc, anchors, id, level + 1, true)
            },
            NodeKind::Mapping if !doc.mapping_pairs(id)?.is_empty() =>
            {
                self.block_mapping(doc, anchors, id, level + 1, true)
            },
            _ =>
            {
                if !self.inline_node(doc, anchors, id, level + 1, false)?
                {
                    self.newline()?;
                }

                Ok(())
            },
        }
    }

    /// A mapping value, cursor after the ':' indicator
    fn block_value(
        &mut self,
        doc: &Document<'_>,
        anchors: &AnchorMap,
        id: NodeId,
        level: usize,
    ) -> Result<()>
    {
        if self.flow_hinted(doc, id)
        {
            self.put(WriteKind::Whitespace, " ")?;
            self.flow_node(doc, anchors, id, level + 1, false, false)?;

            return self.newline();
        }

        match doc.kind(id)?
        {
            NodeKind::Sequence if !doc.sequence_items(id)?.is_empty() =>
            {
                self.newline()?;
                self.block_sequence(doc, anchors, id, level + 1, false)
            },
            NodeKind::Mapping if !doc.mapping_pairs(id)?.is_empty() =>
            {
                self.newline()?;
                self.block_mapping(doc, anchors, id, level + 1, false)
            },
            _ =>
            {
                self.put(WriteKind::Whitespace, " ")?;

                if !self.inline_node(doc, anchors, id, level + 1, false)?
                {
                    self.newline()?;
                }

                Ok(())
            },
        }
    }

    /// A leaf rendered on the current line: a scalar (any
    /// style, including a literal block spilling onto
    /// following lines), an alias, or an empty collection
    /// Returns whether the node's emission already ended
    /// the line (a literal block does; everything else
    /// leaves the cursor where it stopped)
    fn inline_node(
        &mut self,
        doc: &Document<'_>,
        anchors: &AnchorMap,
        id: NodeId,
        level: usize,
        as_key: bool,
    ) -> Result<bool>
    {
        self.props(doc, anchors, id)?;

        match doc.kind(id)?
        {
            NodeKind::Alias =>
            {
                let name = doc.alias_name(id)?.cloned().unwrap_or_default();

                self.put(WriteKind::Alias, &format!("*{}", name))?;

                Ok(false)
            },
            NodeKind::Sequence =>
            {
                self.put(WriteKind::Indicator, "[]")?;

                Ok(false)
            },
            NodeKind::Mapping =>
            {
                self.put(WriteKind::Indicator, "{}")?;

                Ok(false)
            },
            NodeKind::Scalar =>
            {
                let text = doc.scalar_text(id)?.clone();
                let analysis = scalar::analyze(&text, false);
                let style = self.choose_style(doc.style(id)?, &analysis, false, as_key);

                self.write_styled(&text, style, level, as_key)?;

                Ok(style == ChosenStyle::Literal)
            },
        }
    }

    fn write_styled(
        &mut self,
        text: &str,
        style: ChosenStyle,
        level: usize,
        as_key: bool,
    ) -> Result<()>
    {
        let put_err = |e| convert_io(e);

        match style
        {
            ChosenStyle::Plain =>
            {
                scalar::write_plain(&mut self.sink, text, as_key).map_err(put_err)?;
                self.column += text.len();

                Ok(())
            },
            ChosenStyle::Single =>
            {
                scalar::write_single(&mut self.sink, text, as_key).map_err(put_err)?;
                self.column += text.len() + 2;

                Ok(())
            },
            ChosenStyle::Double =>
            {
                scalar::write_double(&mut self.sink, text, as_key).map_err(put_err)?;
                self.column += text.len() + 2;

                Ok(())
            },
            ChosenStyle::Literal => self.write_literal(text, level),
        }
    }

    /// Write a literal block scalar: header, then the text's
    /// lines indented one level deeper
    fn write_literal(&mut self, text: &str, level: usize) -> Result<()>
    {
        let chomp = scalar::literal_chomp(text);
        let body = text.trim_end_matches('\n');
        let trailing = text.len() - body.len();

        // Content starting with a blank needs the explicit
        // indentation indicator
        let explicit = match text.starts_with(' ')
        {
            true => self.config.indent.to_string(),
            false => String::new(),
        };

        self.put(
            WriteKind::Indicator,
            &format!("|{}{}", explicit, chomp),
        )?;
        self.newline()?;

        for line in body.split('\n')
        {
            if !line.is_empty()
            {
                self.indent_to(usize::max(level, 1))?;
                self.put(WriteKind::LiteralScalar, line)?;
            }

            self.newline()?;
        }

        // Keep chomping: re-emit the kept trailing breaks
        // beyond the one ending the last content line
        for _ in 1..trailing
        {
            self.newline()?;
        }

        Ok(())
    }

    /*
     * ==== Flow / JSON emission ====
     */

    fn flow_node(
        &mut self,
        doc: &Document<'_>,
        anchors: &AnchorMap,
        id: NodeId,
        level: usize,
        as_key: bool,
        force_oneline: bool,
    ) -> Result<()>
    {
        let json = self.config.mode.is_json();

        if !json
        {
            self.props(doc, anchors, id)?;
        }

        match doc.kind(id)?
        {
            NodeKind::Alias =>
            {
                if json
                {
                    return Err(code(ErrorCode::StyleForbidden));
                }

                let name = doc.alias_name(id)?.cloned().unwrap_or_default();

                self.put(WriteKind::Alias, &format!("*{}", name))
            },
            NodeKind::Scalar =>
            {
                let text = doc.scalar_text(id)?.clone();

                if json
                {
                    return self.json_scalar(&text, doc.style(id)?, as_key);
                }

                let analysis = scalar::analyze(&text, true);
                let style = self.choose_style(doc.style(id)?, &analysis, true, as_key);

                self.write_styled(&text, style, level, as_key)
            },
            NodeKind::Sequence =>
            {
                self.flow_sequence(doc, anchors, id, level, force_oneline)
            },
            NodeKind::Mapping => self.flow_mapping(doc, anchors, id, level, force_oneline),
        }
    }

    fn flow_sequence(
        &mut self,
        doc: &Document<'_>,
        anchors: &AnchorMap,
        id: NodeId,
        level: usize,
        force_oneline: bool,
    ) -> Result<()>
    {
        let items = doc.sequence_items(id)?.to_vec();
        let pretty = self.pretty_structured(force_oneline) && !items.is_empty();

        self.put(WriteKind::Indicator, "[")?;

        for (at, item) in items.iter().enumerate()
        {
            if at > 0
            {
                self.put(WriteKind::Indicator, ",")?;
                self.entry_separator(level, force_oneline, pretty)?;
            }
            else if pretty
            {
                self.newline()?;
                self.indent_to(level + 1)?;
            }

            self.flow_node(doc, anchors, *item, level + 1, false, force_oneline)?;
        }

        if pretty
        {
            self.newline()?;
            self.indent_to(level)?;
        }

        self.put(WriteKind::Indicator, "]")
    }

    fn flow_mapping(
        &mut self,
        doc: &Document<'_>,
        anchors: &AnchorMap,
        id: NodeId,
        level: usize,
        force_oneline: bool,
    ) -> Result<()>
    {
        let mut pairs = doc.mapping_pairs(id)?.to_vec();

        if self.config.flags.contains(O_SORT_KEYS)
        {
            pairs.sort_by(|a, b| compare::default_cmp(doc, a.key, b.key));
        }

        let pretty = self.pretty_structured(force_oneline) && !pairs.is_empty();

        self.put(WriteKind::Indicator, "{")?;

        for (at, pair) in pairs.iter().enumerate()
        {
            if at > 0
            {
                self.put(WriteKind::Indicator, ",")?;
                self.entry_separator(level, force_oneline, pretty)?;
            }
            else if pretty
            {
                self.newline()?;
                self.indent_to(level + 1)?;
            }

            self.flow_node(doc, anchors, pair.key, level + 1, true, force_oneline)?;
            self.put(WriteKind::Indicator, ":")?;

            // JSON oneline is the only fully compact shape
            if self.config.mode != EmitMode::JsonOneline
            {
                self.put(WriteKind::Whitespace, " ")?;
            }

            self.flow_node(doc, anchors, pair.value, level + 1, false, force_oneline)?;
        }

        if pretty
        {
            self.newline()?;
            self.indent_to(level)?;
        }

        self.put(WriteKind::Indicator, "}")
    }

    fn json_scalar(&mut self, text: &str, hint: NodeStyle, as_key: bool) -> Result<()>
    {
        // Keys are always strings in JSON output
        if !as_key && self.typed_json()
        {
            let plainish = matches!(hint, NodeStyle::Plain | NodeStyle::Any);

            if plainish && scalar::json_kind(text).is_some()
            {
                return self.put(WriteKind::PlainScalar, text);
            }
        }

        scalar::write_double(&mut self.sink, text, as_key).map_err(convert_io)?;
        self.column += text.len() + 2;

        Ok(())
    }

    /*
     * ==== Shared helpers ====
     */

    /// Separator after a flow ',': a structural newline in
    /// pretty modes, a wrap when past the width target,
    /// otherwise a space
    fn entry_separator(&mut self, level: usize, oneline: bool, pretty: bool) -> Result<()>
    {
        if pretty
        {
            self.newline()?;

            return self.indent_to(level + 1);
        }

        if self.config.mode == EmitMode::JsonOneline
        {
            return Ok(());
        }

        let width = self.config.width as usize;
        let bounded = self.config.width != config::WIDTH_UNBOUNDED;

        if !oneline && !self.oneline_mode() && bounded && self.column >= width
        {
            self.newline()?;

            return self.indent_to(level + 1);
        }

        self.put(WriteKind::Whitespace, " ")
    }

    /// Structured (multi line) JSON / flow output applies in
    /// the pretty JSON modes only
    fn pretty_structured(&self, force_oneline: bool) -> bool
    {
        !force_oneline
            && matches!(self.config.mode, EmitMode::Json | EmitMode::JsonTyped)
    }

    fn oneline_mode(&self) -> bool
    {
        self.config.mode.is_oneline()
    }

    fn typed_json(&self) -> bool
    {
        matches!(self.config.mode, EmitMode::JsonTyped | EmitMode::JsonOneline)
    }

    /// Anchor / tag properties preceding a node
    fn props(&mut self, doc: &Document<'_>, anchors: &AnchorMap, id: NodeId) -> Result<()>
    {
        if let Some(name) = anchors.get(&id)
        {
            self.put(WriteKind::Anchor, &format!("&{}", name))?;
            self.put(WriteKind::Whitespace, " ")?;
        }

        if let Some(tag) = doc.tag(id)?
        {
            if !tag.is_non_specific()
            {
                let rendered = render_tag(tag);

                self.put(WriteKind::Tag, &rendered)?;
                self.put(WriteKind::Whitespace, " ")?;
            }
        }

        Ok(())
    }

    /// Does this node ask for flow output in Original mode?
    fn flow_hinted(&self, doc: &Document<'_>, id: NodeId) -> bool
    {
        if self.config.mode != EmitMode::Original
        {
            return false;
        }

        matches!(doc.style(id), Ok(NodeStyle::Flow))
    }

    fn simple_key(&self, doc: &Document<'_>, key: NodeId) -> bool
    {
        match doc.cell(key).map(|cell| cell.kind())
        {
            Ok(crate::document::NodeKind::Scalar) =>
            {
                doc.scalar_text(key)
                    .map(|text| !text.contains(['\n', '\r']))
                    .unwrap_or(false)
            },
            _ => false,
        }
    }

    fn choose_style(
        &self,
        hint: NodeStyle,
        analysis: &Analysis,
        in_flow: bool,
        as_key: bool,
    ) -> ChosenStyle
    {
        let literal_allowed = analysis.literal_ok && !in_flow && !as_key;

        let fallback = |analysis: &Analysis| match ()
        {
            _ if analysis.plain_ok => ChosenStyle::Plain,
            _ if analysis.single_ok => ChosenStyle::Single,
            _ => ChosenStyle::Double,
        };

        match self.config.mode
        {
            EmitMode::BlockOnly => match ()
            {
                _ if analysis.plain_ok => ChosenStyle::Plain,
                _ if literal_allowed => ChosenStyle::Literal,
                _ if analysis.single_ok => ChosenStyle::Single,
                _ => ChosenStyle::Double,
            },

            _ => match hint
            {
                NodeStyle::DoubleQuote => ChosenStyle::Double,
                NodeStyle::SingleQuote if analysis.single_ok => ChosenStyle::Single,
                NodeStyle::Literal | NodeStyle::Folded if literal_allowed =>
                {
                    ChosenStyle::Literal
                },
                // Multiline content downgrades to the one style
                // able to carry any text on one logical line
                _ if analysis.multiline && !literal_allowed => ChosenStyle::Double,
                _ if analysis.multiline => ChosenStyle::Literal,
                _ => fallback(analysis),
            },
        }
    }

    /// With tag directives forced off, any node needing a
    /// declared (non built in) handle cannot be emitted
    fn check_directives_not_needed(&self, doc: &Document<'_>) -> Result<()>
    {
        for (_, cell) in doc.nodes().iter()
        {
            if let Some(tag) = &cell.tag
            {
                let named = !tag.handle.is_empty()
                    && tag.handle != "!"
                    && tag.handle != "!!";

                if named
                {
                    return Err(code(ErrorCode::DirectivesForcedOff));
                }
            }
        }

        Ok(())
    }

    fn collect_anchors(&self, doc: &Document<'_>) -> AnchorMap
    {
        let mut map = AnchorMap::new();

        // Later declarations win
        for (name, id) in doc.anchors()
        {
            map.insert(id, name.to_string());
        }

        map
    }

    fn put(&mut self, kind: WriteKind, text: &str) -> Result<()>
    {
        self.sink.write(kind, text).map_err(convert_io)?;

        match text.rfind('\n')
        {
            Some(at) => self.column = text.len() - at - 1,
            None => self.column += text.len(),
        }

        Ok(())
    }

    fn newline(&mut self) -> Result<()>
    {
        self.put(WriteKind::LineBreak, "\n")
    }

    fn indent_to(&mut self, level: usize) -> Result<()>
    {
        let spaces = " ".repeat(level * self.config.indent as usize);

        self.put(WriteKind::Indent, &spaces)
    }

    /// Width of the pad after a '-' entry indicator, sized
    /// so nested block content aligns with the indent unit
    fn pad_after_indicator(&mut self) -> Result<()>
    {
        let pad = " ".repeat(usize::max(self.config.indent as usize - 1, 1));

        self.put(WriteKind::Whitespace, &pad)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChosenStyle
{
    Plain,
    Single,
    Double,
    Literal,
}

type AnchorMap = HashMap<NodeId, String>;

fn render_tag(tag: &Tag<'_>) -> String
{
    match (tag.handle.as_ref(), tag.suffix.is_empty())
    {
        // A resolvable shorthand round trips as written
        ("!", false) => format!("!{}", tag.suffix),
        ("!!", false) => format!("!!{}", tag.suffix),
        (handle, false) if !handle.is_empty() => format!("{}{}", handle, tag.suffix),
        // Everything else is safest verbatim
        _ => format!("!<{}>", tag.resolved()),
    }
}

fn code(code: ErrorCode) -> crate::error::Error
{
    crate::error::Error::new(InternalError::new(code))
}

fn convert_io(err: std::io::Error) -> crate::error::Error
{
    crate::error::Error::new(InternalError::new(SourceError::from(err)))
}

/// Emit .doc to a fresh string
pub fn emit_to_string(doc: &Document<'_>, config: &EmitConfig) -> Result<String>
{
    let mut emitter = Emitter::new(config.clone(), StringSink::new());

    emitter.emit_document(doc)?;

    Ok(emitter.into_sink().into_string())
}

/// Emit .doc to a fresh byte buffer
pub fn emit_to_vec(doc: &Document<'_>, config: &EmitConfig) -> Result<Vec<u8>>
{
    let mut emitter = Emitter::new(config.clone(), VecSink::new());

    emitter.emit_document(doc)?;

    Ok(emitter.into_sink().into_vec())
}

/// Emit .doc through any [`std::io::Write`]
pub fn emit_to_writer<W>(doc: &Document<'_>, config: &EmitConfig, writer: W) -> Result<W>
where
    W: std::io::Write,
{
    let mut emitter = Emitter::new(config.clone(), WriterSink::new(writer));

    emitter.emit_document(doc)?;

    Ok(emitter.into_sink().into_inner())
}

impl Document<'_>
{
    /// Serialise this document under .config
    pub fn to_yaml_string(&self, config: &EmitConfig) -> Result<String>
    {
        emit_to_string(self, config)
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::diag::ParseConfig;

    fn build(data: &str) -> Document<'_>
    {
        Document::build_from_utf8(data, &ParseConfig::default()).expect("build document")
    }

    fn emit(doc: &Document<'_>, config: &EmitConfig) -> String
    {
        emit_to_string(doc, config).expect("emit document")
    }

    #[test]
    fn flow_oneline_nested_sequence_is_byte_exact()
    {
        let doc = build("[1, 2, 3, [4, 5]]");
        let out = emit(&doc, &EmitConfig::new().mode(EmitMode::FlowOneline));

        assert_eq!(out, "[1, 2, 3, [4, 5]]");
    }

    #[test]
    fn json_oneline_round_trips_byte_exact()
    {
        let data = r#"{"a":[1,2,null,true]}"#;
        let doc = build(data);
        let out = emit(&doc, &EmitConfig::new().mode(EmitMode::JsonOneline));

        assert_eq!(out, data);
    }

    #[test]
    fn json_mode_quotes_keys_and_strings()
    {
        let doc = build("count: 3\nname: thing\n");
        let out = emit(&doc, &EmitConfig::new().mode(EmitMode::JsonOneline));

        assert_eq!(out, r#"{"count":3,"name":"thing"}"#);
    }

    #[test]
    fn untyped_json_quotes_everything()
    {
        let doc = build("count: 3\nokay: true\n");
        let out = emit(&doc, &EmitConfig::new().mode(EmitMode::Json));

        assert_eq!(
            out,
            "{\n  \"count\": \"3\",\n  \"okay\": \"true\"\n}\n"
        );
    }

    #[test]
    fn typed_json_follows_the_json_grammar()
    {
        // 'yes' and '01' are not JSON scalars; they stay
        // strings even in typed mode
        let doc = build("a: 1\nb: yes\nc: 01\nd: null\n");
        let out = emit(&doc, &EmitConfig::new().mode(EmitMode::JsonOneline));

        assert_eq!(out, r#"{"a":1,"b":"yes","c":"01","d":null}"#);
    }

    #[test]
    fn block_mapping_output()
    {
        let doc = build("name: thing\nitems:\n  - one\n  - two\nnested:\n  inner: 1\n");
        let out = emit(&doc, &EmitConfig::new());

        assert_eq!(
            out,
            "\
name: thing
items:
  - one
  - two
nested:
  inner: 1
"
        );
    }

    #[test]
    fn quoting_survives_where_needed()
    {
        let mut doc = Document::new();

        let root = doc.new_mapping();
        doc.set_root(root).unwrap();

        for (key, value) in [("colon", "a: b"), ("hash", "a # b"), ("tab", "a\tb")]
        {
            let k = doc.new_scalar(key);
            let v = doc.new_scalar(value);
            doc.mapping_append(root, k, v).unwrap();
        }

        let out = emit(&doc, &EmitConfig::new());
        let reparsed = build(&out);

        assert_eq!(reparsed.get_str("/colon").unwrap(), "a: b");
        assert_eq!(reparsed.get_str("/hash").unwrap(), "a # b");
        assert_eq!(reparsed.get_str("/tab").unwrap(), "a\tb");
    }

    #[test]
    fn literal_blocks_round_trip()
    {
        let data = "log: |\n  line one\n  line two\n";
        let doc = build(data);
        let out = emit(&doc, &EmitConfig::new());

        assert_eq!(out, data);
    }

    #[test]
    fn sort_keys_reorders_output()
    {
        let doc = build("b: 2\na: 1\nc: 3\n");
        let out = emit(&doc, &EmitConfig::new().sort_keys());

        assert_eq!(out, "a: 1\nb: 2\nc: 3\n");
    }

    #[test]
    fn anchors_and_aliases_survive_unresolved_emission()
    {
        let doc = build("base: &b 1\nref: *b\n");
        let out = emit(&doc, &EmitConfig::new());

        assert_eq!(out, "base: &b 1\nref: *b\n");
    }

    #[test]
    fn document_markers_follow_policy()
    {
        let doc = build("---\nx: 1\n...\n");

        // Auto reproduces the explicit markers
        let auto = emit(&doc, &EmitConfig::new());
        assert_eq!(auto, "---\nx: 1\n...\n");

        // Off suppresses them
        let off = emit(
            &doc,
            &EmitConfig::new()
                .doc_start_mark(MarkPolicy::Off)
                .doc_end_mark(MarkPolicy::Off),
        );
        assert_eq!(off, "x: 1\n");
    }

    #[test]
    fn directives_are_reemitted()
    {
        let data = "%YAML 1.3\n%TAG !e! tag:example.com:\n---\nkey: !e!thing value\n";
        let doc = build(data);
        let out = emit(&doc, &EmitConfig::new());

        assert!(out.starts_with("%YAML 1.3\n%TAG !e! tag:example.com:\n---\n"));
        assert!(out.contains("!e!thing"));
    }

    #[test]
    fn forced_off_directives_error_when_needed()
    {
        let data = "%TAG !e! tag:example.com:\n---\nkey: !e!thing value\n";
        let doc = build(data);

        let err = emit_to_string(
            &doc,
            &EmitConfig::new().tag_directives(MarkPolicy::Off),
        )
        .unwrap_err();

        assert_eq!(err.classify(), crate::Category::Emit);
    }

    #[test]
    fn buffer_sink_reports_required_size()
    {
        let doc = build("key: value\n");

        let mut buffer = [0u8; 4];
        let mut sink = BufferSink::new(&mut buffer);

        let mut emitter = Emitter::new(EmitConfig::new(), &mut sink);
        emitter.emit_document(&doc).unwrap();

        assert!(sink.overflowed());
        assert_eq!(sink.required(), "key: value\n".len());
    }

    #[test]
    fn semantic_round_trip_holds()
    {
        let corpus = [
            "plain scalar",
            "a: 1\nb:\n  - x\n  - y: z\n",
            "[1, {two: 3}, [4]]",
            "quoted: 'it''s'\nescaped: \"a\\tb\"\n",
            "empty:\nfull: v\n",
            "log: |\n  first\n  second\n",
        ];

        for data in corpus
        {
            let doc = build(data);
            let out = emit(&doc, &EmitConfig::new());
            let rebuilt = build(&out);

            match (doc.root(), rebuilt.root())
            {
                (Some(a), Some(b)) =>
                {
                    assert!(
                        doc.semantic_eq(a, &rebuilt, b),
                        "round trip changed semantics for {:?}: got {:?}",
                        data,
                        out
                    );
                },
                (None, None) =>
                {},
                _ => panic!("round trip lost the document for {:?}", data),
            }
        }
    }

    #[test]
    fn emit_parse_emit_is_idempotent()
    {
        let corpus = [
            "a: 1\nlist:\n  - x\n  - {f: 1}\n",
            "[1, 2, [3, 4]]",
            "key: 'quoted value'\n",
        ];

        for data in corpus
        {
            let config = EmitConfig::new();

            let first = emit(&build(data), &config);
            let second = emit(&build(&first), &config);

            assert_eq!(first, second, "emit not idempotent for {:?}", data);
        }
    }
}
