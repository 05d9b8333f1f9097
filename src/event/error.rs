/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{
    error::internal::{self, ErrorCode},
    input::error::InputError,
    scanner::error::ScanError,
};

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// Failures converting the token stream into events:
/// either a grammar violation (carried as a code) or an
/// error bubbled up from the source / scanner
#[derive(Debug)]
pub(crate) enum ParseError
{
    Code(ErrorCode),
    Source(InputError),
}

impl ParseError
{
    pub fn code(&self) -> Option<ErrorCode>
    {
        match self
        {
            Self::Code(code) => Some(*code),
            Self::Source(InputError::Scan(e)) => Some((*e).into()),
            Self::Source(_) => None,
        }
    }
}

impl From<ErrorCode> for ParseError
{
    fn from(code: ErrorCode) -> Self
    {
        Self::Code(code)
    }
}

impl From<InputError> for ParseError
{
    fn from(err: InputError) -> Self
    {
        Self::Source(err)
    }
}

impl From<ScanError> for ParseError
{
    fn from(err: ScanError) -> Self
    {
        Self::Code(err.into())
    }
}

impl From<ParseError> for internal::Error
{
    fn from(err: ParseError) -> Self
    {
        match err
        {
            ParseError::Code(code) => internal::Error::new(code),
            ParseError::Source(source) => source.into(),
        }
    }
}

impl From<ParseError> for crate::error::Error
{
    fn from(err: ParseError) -> Self
    {
        crate::error::Error::new(err.into())
    }
}

impl fmt::Display for ParseError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            Self::Code(code) => fmt::Display::fmt(code, f),
            Self::Source(InputError::Scan(e)) => fmt::Display::fmt(e, f),
            Self::Source(InputError::IO(e)) => fmt::Display::fmt(e, f),
            Self::Source(InputError::UTF8(e)) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for ParseError {}
