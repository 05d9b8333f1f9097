/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::{fmt, io, str::Utf8Error};

use crate::{
    error::internal::{self, SourceError},
    scanner::error::ScanError,
};

pub(crate) type InputResult<T> = Result<T, InputError>;

/// Failures surfaced while feeding the scanner from an
/// input source
#[derive(Debug)]
pub(crate) enum InputError
{
    Scan(ScanError),
    IO(io::Error),
    UTF8(Utf8Error),
}

impl fmt::Display for InputError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            InputError::Scan(e) => write!(f, "{e}"),
            InputError::IO(e) => write!(f, "{e}"),
            InputError::UTF8(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InputError {}

impl From<ScanError> for InputError
{
    fn from(err: ScanError) -> Self
    {
        Self::Scan(err)
    }
}

impl From<io::Error> for InputError
{
    fn from(err: io::Error) -> Self
    {
        Self::IO(err)
    }
}

impl From<Utf8Error> for InputError
{
    fn from(err: Utf8Error) -> Self
    {
        Self::UTF8(err)
    }
}

impl From<InputError> for internal::Error
{
    fn from(err: InputError) -> Self
    {
        match err
        {
            InputError::Scan(e) => internal::Error::new(internal::ErrorCode::from(e)),
            InputError::IO(e) => internal::Error::new(SourceError::from(e)),
            InputError::UTF8(e) => internal::Error::new(SourceError::from(e)),
        }
    }
}

impl From<InputError> for crate::error::Error
{
    fn from(err: InputError) -> Self
    {
        crate::error::Error::new(err.into())
    }
}
