/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use bitflags::bitflags;

/// Unbounded line width
pub const WIDTH_UNBOUNDED: u8 = 255;

/// An empty, zeroed flag set
pub const O_EMIT_NONE: EmitFlags = EmitFlags::empty();
/// Reorder every mapping by the default key comparator
/// before emission
pub const O_SORT_KEYS: EmitFlags = EmitFlags::SORT_KEYS;
/// Reserved: emit captured comments, best effort. Comments
/// are not captured by this implementation, so the flag is
/// accepted and changes nothing.
pub const O_OUTPUT_COMMENTS: EmitFlags = EmitFlags::OUTPUT_COMMENTS;

bitflags! {
    /// Emitter behavior toggles, see the O_ constants
    #[derive(Default)]
    pub struct EmitFlags: u32 {
        const SORT_KEYS       = 0b00000001;
        const OUTPUT_COMMENTS = 0b00000010;
    }
}

/// The overall output shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitMode
{
    /// Respect each node's style hint where the content
    /// allows it
    #[default]
    Original,
    /// Indentation based output only; scalars plain or
    /// literal, collections never flow
    BlockOnly,
    /// Bracketed output only
    FlowOnly,
    /// Bracketed output on a single line
    FlowOneline,
    /// JSON: dq keys and strings, flow collections, no
    /// tags or anchors
    Json,
    /// JSON, but bools / nulls / numbers stay unquoted
    JsonTyped,
    /// JSON on a single line
    JsonOneline,
}

impl EmitMode
{
    pub(crate) fn is_json(self) -> bool
    {
        matches!(self, Self::Json | Self::JsonTyped | Self::JsonOneline)
    }

    pub(crate) fn is_flow(self) -> bool
    {
        self.is_json() || matches!(self, Self::FlowOnly | Self::FlowOneline)
    }

    pub(crate) fn is_oneline(self) -> bool
    {
        matches!(self, Self::FlowOneline | Self::JsonOneline)
    }
}

/// Tri-state switch for stream furniture (document markers
/// and directives)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkPolicy
{
    /// Emit only when required for an unambiguous stream
    #[default]
    Auto,
    Off,
    On,
}

/// Emitter configuration
#[derive(Debug, Clone)]
pub struct EmitConfig
{
    /// Spaces per indentation level in block output, 1-9
    pub indent: u8,
    /// Soft line wrap target for flow output; 255 is
    /// unbounded. A single indivisible token is never
    /// broken.
    pub width: u8,

    pub mode: EmitMode,

    pub doc_start_mark: MarkPolicy,
    pub doc_end_mark:   MarkPolicy,

    pub version_directive: MarkPolicy,
    pub tag_directives:    MarkPolicy,

    pub flags: EmitFlags,
}

impl EmitConfig
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Set the block indent, clamped to 1-9
    pub fn indent(mut self, indent: u8) -> Self
    {
        self.indent = indent.clamp(1, 9);
        self
    }

    pub fn width(mut self, width: u8) -> Self
    {
        self.width = width;
        self
    }

    pub fn mode(mut self, mode: EmitMode) -> Self
    {
        self.mode = mode;
        self
    }

    pub fn sort_keys(mut self) -> Self
    {
        self.flags |= O_SORT_KEYS;
        self
    }

    pub fn doc_start_mark(mut self, policy: MarkPolicy) -> Self
    {
        self.doc_start_mark = policy;
        self
    }

    pub fn doc_end_mark(mut self, policy: MarkPolicy) -> Self
    {
        self.doc_end_mark = policy;
        self
    }

    pub fn version_directive(mut self, policy: MarkPolicy) -> Self
    {
        self.version_directive = policy;
        self
    }

    pub fn tag_directives(mut self, policy: MarkPolicy) -> Self
    {
        self.tag_directives = policy;
        self
    }
}

impl Default for EmitConfig
{
    fn default() -> Self
    {
        Self {
            indent:            2,
            width:             80,
            mode:              EmitMode::default(),
            doc_start_mark:    MarkPolicy::default(),
            doc_end_mark:      MarkPolicy::default(),
            version_directive: MarkPolicy::default(),
            tag_directives:    MarkPolicy::default(),
            flags:             EmitFlags::default(),
        }
    }
}
