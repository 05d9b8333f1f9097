/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::{cell::RefCell, fs, path::Path, path::PathBuf};

use crate::{
    input::{error::InputError, index::LineIndex, Source, SourceContext, SourceSealed},
    scanner::error::ScanError,
};

/// A [`Source`] owning its bytes outright: strings, byte
/// buffers and whole files read up front.
///
/// File contents are always read into this buffer; there is
/// no memory mapping path, so the `O_NO_MMAP` parse flag is
/// accepted and has nothing to disable.
#[derive(Debug)]
pub struct OwnedSource
{
    data:  String,
    index: RefCell<LineIndex>,
}

impl OwnedSource
{
    pub(crate) fn new(data: String) -> Self
    {
        Self {
            data,
            index: RefCell::new(LineIndex::new()),
        }
    }

    pub(crate) fn try_from_vec(data: Vec<u8>) -> Result<Self, InputError>
    {
        String::from_utf8(data)
            .map(Self::new)
            .map_err(|e| e.utf8_error().into())
    }

    pub(crate) fn from_path(path: &Path) -> Result<Self, InputError>
    {
        let data = fs::read(path)?;

        Self::try_from_vec(data)
    }

    /// The full backing buffer
    pub fn data(&self) -> &str
    {
        &self.data
    }

    /// Map a byte .offset to its 0-based (line, column)
    pub fn locate(&self, offset: usize) -> (usize, usize)
    {
        self.index.borrow_mut().locate(&self.data, offset)
    }
}

impl Source for OwnedSource
{
    fn drive<'de>(&'de self, cxt: SourceContext<'_, '_, 'de>) -> Result<(), InputError>
    {
        let (scanner, queue, flags) = cxt.into_parts();

        match scanner.scan_tokens(flags, &self.data, queue)
        {
            Ok(_) => Ok(()),
            Err(ScanError::NeedMore) => Err(ScanError::UnexpectedEOF.into()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SourceSealed for OwnedSource {}

/// Resolve .name against a colon separated .search list of
/// directories, returning the first existing path, or the
/// name itself
pub(crate) fn resolve_in_search_path(name: &Path, search: Option<&str>) -> PathBuf
{
    if name.is_absolute() || name.exists()
    {
        return name.to_path_buf();
    }

    if let Some(dirs) = search
    {
        for dir in dirs.split(':').filter(|dir| !dir.is_empty())
        {
            let candidate = Path::new(dir).join(name);

            if candidate.exists()
            {
                return candidate;
            }
        }
    }

    name.to_path_buf()
}
