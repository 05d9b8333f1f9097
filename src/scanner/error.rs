/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{atom::DecodeError, error::internal::ErrorCode};

pub(crate) type ScanResult<T> = Result<T, ScanError>;

/// Failures scanning the byte stream into tokens.
///
/// `NeedMore` is not an error: it is the suspension
/// sentinel returned when an incremental source runs dry
/// mid token, telling the driver to feed another chunk and
/// retry. It must never escape to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanError
{
    NeedMore,

    UnexpectedEOF,
    UnknownDirective,
    InvalidVersion,
    InvalidTagHandle,
    InvalidTagPrefix,
    InvalidTagSuffix,
    InvalidAnchorName,
    InvalidFlowScalar,
    InvalidPlainScalar,
    InvalidBlockScalar,
    InvalidBlockEntry,
    InvalidTab,
    InvalidKey,
    InvalidValue,
    UnknownEscape,
    UnknownToken,
    IntOverflow,
    MissingValue,
}

impl From<ScanError> for ErrorCode
{
    fn from(err: ScanError) -> Self
    {
        use ScanError::*;

        match err
        {
            // The sentinel is handled by the source drivers; if it
            // leaks this far the stream state is gone
            NeedMore => ErrorCode::CorruptStream,

            UnexpectedEOF => ErrorCode::UnexpectedEOF,
            UnknownDirective => ErrorCode::UnknownDirective,
            InvalidVersion => ErrorCode::InvalidVersion,
            InvalidTagHandle => ErrorCode::InvalidTagHandle,
            InvalidTagPrefix => ErrorCode::InvalidTagPrefix,
            InvalidTagSuffix => ErrorCode::InvalidTagSuffix,
            InvalidAnchorName => ErrorCode::InvalidAnchorName,
            InvalidFlowScalar => ErrorCode::InvalidFlowScalar,
            InvalidPlainScalar => ErrorCode::InvalidPlainScalar,
            InvalidBlockScalar => ErrorCode::InvalidBlockScalar,
            InvalidBlockEntry => ErrorCode::InvalidBlockEntry,
            InvalidTab => ErrorCode::InvalidTab,
            InvalidKey => ErrorCode::InvalidKey,
            InvalidValue => ErrorCode::InvalidValue,
            UnknownEscape => ErrorCode::UnknownEscape,
            UnknownToken => ErrorCode::UnknownToken,
            IntOverflow => ErrorCode::IntOverflow,
            MissingValue => ErrorCode::MissingValue,
        }
    }
}

impl From<DecodeError> for ScanError
{
    fn from(err: DecodeError) -> Self
    {
        match err
        {
            DecodeError::UnknownEscape => ScanError::UnknownEscape,
            DecodeError::InvalidEscape => ScanError::UnknownEscape,
            DecodeError::Truncated => ScanError::UnexpectedEOF,
        }
    }
}

impl fmt::Display for ScanError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            ScanError::NeedMore => f.write_str("scanner suspended awaiting more input"),
            err => fmt::Display::fmt(&ErrorCode::from(*err), f),
        }
    }
}

impl std::error::Error for ScanError {}
