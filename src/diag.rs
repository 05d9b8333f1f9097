/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Diagnostics and parse configuration.
//!
//! Rendered diagnostics follow the classic one line shape
//!
//! ```text
//! source:line:column: <level>: <module>: <message>
//! ```
//!
//! with 1-based positions, optionally followed by the
//! offending line and a caret. Process wide defaults may be
//! installed once at startup and are picked up by configs
//! created afterwards.

use std::{borrow::Cow, fmt, sync::OnceLock};

use bitflags::bitflags;

use crate::token::Mark;

/// An empty, zeroed flag set
pub const O_NONE: ParseFlags = ParseFlags::empty();
/// Suppress diagnostic output through the log facade
pub const O_QUIET: ParseFlags = ParseFlags::QUIET;
/// Capture diagnostics onto the built document instead of
/// (only) logging them
pub const O_DIAG_COLLECT: ParseFlags = ParseFlags::DIAG_COLLECT;
/// Run alias / merge key resolution as part of building
pub const O_RESOLVE: ParseFlags = ParseFlags::RESOLVE;
/// Disable memory mapping of file inputs. File inputs are
/// always buffered by this implementation, so the flag is
/// accepted and changes nothing.
pub const O_NO_MMAP: ParseFlags = ParseFlags::NO_MMAP;

bitflags! {
    /// Parse behavior toggles, see the O_ constants
    #[derive(Default)]
    pub struct ParseFlags: u32 {
        const QUIET        = 0b00000001;
        const DIAG_COLLECT = 0b00000010;
        const RESOLVE      = 0b00000100;
        const NO_MMAP      = 0b00001000;
    }
}

/// Diagnostic color handling for front ends that render
/// diagnostics; the library itself never colors output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode
{
    #[default]
    Auto,
    None,
    Force,
}

/// Configuration for parsing and document building
#[derive(Debug, Clone, Default)]
pub struct ParseConfig
{
    pub flags: ParseFlags,
    pub color: ColorMode,

    /// Colon separated directories searched by file
    /// resolution helpers
    pub search_path: Option<String>,
}

impl ParseConfig
{
    /// A new config seeded from the process wide defaults
    pub fn new() -> Self
    {
        let defaults = defaults();

        Self {
            flags:       defaults.flags,
            color:       defaults.color,
            search_path: None,
        }
    }

    pub fn quiet(mut self) -> Self
    {
        self.flags |= O_QUIET;
        self
    }

    pub fn collect_diagnostics(mut self) -> Self
    {
        self.flags |= O_DIAG_COLLECT;
        self
    }

    pub fn resolve(mut self) -> Self
    {
        self.flags |= O_RESOLVE;
        self
    }

    pub fn search_path<T>(mut self, path: T) -> Self
    where
        T: Into<String>,
    {
        self.search_path = Some(path.into());
        self
    }
}

/// Process wide diagnostic defaults, set once at
/// initialisation
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagDefaults
{
    pub flags: ParseFlags,
    pub color: ColorMode,
}

static DEFAULTS: OnceLock<DiagDefaults> = OnceLock::new();

/// Install the process wide defaults; returns false if they
/// were already set
pub fn set_defaults(defaults: DiagDefaults) -> bool
{
    DEFAULTS.set(defaults).is_ok()
}

/// The process wide defaults (zeroed until installed)
pub fn defaults() -> DiagDefaults
{
    DEFAULTS.get().copied().unwrap_or_default()
}

/// Severity of a [`Diagnostic`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagLevel
{
    Debug,
    Info,
    Notice,
    Warning,
    Error,
}

impl fmt::Display for DiagLevel
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self
        {
            DiagLevel::Debug => "debug",
            DiagLevel::Info => "info",
            DiagLevel::Notice => "notice",
            DiagLevel::Warning => "warning",
            DiagLevel::Error => "error",
        };

        f.write_str(name)
    }
}

/// A single diagnostic: a position, a severity, the module
/// that raised it and a message. Positions are stored
/// 0-based and rendered 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic
{
    pub source:  Option<String>,
    pub at:      usize,
    pub line:    usize,
    pub column:  usize,
    pub level:   DiagLevel,
    pub module:  Cow<'static, str>,
    pub message: String,
}

impl Diagnostic
{
    pub fn new<M, T>(mark: Mark, level: DiagLevel, module: M, message: T) -> Self
    where
        M: Into<Cow<'static, str>>,
        T: Into<String>,
    {
        Self {
            source: None,
            at: mark.at,
            line: mark.line,
            column: mark.column,
            level,
            module: module.into(),
            message: message.into(),
        }
    }

    pub fn with_source<T>(mut self, source: T) -> Self
    where
        T: Into<String>,
    {
        self.source = Some(source.into());
        self
    }

    /// Render the diagnostic with the offending line and a
    /// caret below it
    pub fn render_with_snippet(&self, data: &str) -> String
    {
        let line = data.split(['\n', '\r']).nth(self.line).unwrap_or("");
        let caret = " ".repeat(self.column);

        format!("{}\n{}\n{}^", self, line, caret)
    }
}

/// Build a diagnostic from a contextualized [`Error`]
///
/// [`Error`]: crate::error::Error
pub fn diagnostic_from_error(error: &crate::error::Error, module: &'static str) -> Diagnostic
{
    // Errors carry 1-based positions (0 meaning absent)
    let line = (error.line() as usize).saturating_sub(1);
    let column = (error.column() as usize).saturating_sub(1);

    Diagnostic::new(
        Mark::new(error.at() as usize, line, column),
        DiagLevel::Error,
        module,
        error.to_string(),
    )
}

impl fmt::Display for Diagnostic
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_fmt(format_args!(
            "{}:{}:{}: {}: {}: {}",
            self.source.as_deref().unwrap_or("<input>"),
            self.line + 1,
            self.column + 1,
            self.level,
            self.module,
            self.message
        ))
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn renders_one_line_form()
    {
        let diag = Diagnostic::new(
            Mark::new(12, 2, 4),
            DiagLevel::Error,
            "scanner",
            "unexpected EOF",
        )
        .with_source("config.yaml");

        assert_eq!(
            diag.to_string(),
            "config.yaml:3:5: error: scanner: unexpected EOF"
        );
    }

    #[test]
    fn snippet_points_at_the_column()
    {
        let data = "first\nsecond line\n";
        let diag = Diagnostic::new(Mark::new(9, 1, 3), DiagLevel::Warning, "parser", "odd");

        let rendered = diag.render_with_snippet(data);
        let mut lines = rendered.lines();

        lines.next();
        assert_eq!(lines.next(), Some("second line"));
        assert_eq!(lines.next(), Some("   ^"));
    }

    #[test]
    fn config_builder_composes()
    {
        let config = ParseConfig::new().quiet().resolve();

        assert!(config.flags.contains(O_QUIET));
        assert!(config.flags.contains(O_RESOLVE));
        assert!(!config.flags.contains(O_DIAG_COLLECT));
    }
}
