/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! This library is a complete YAML toolkit: a zero copy
//! scanner and event parser, a document tree with anchor /
//! merge key resolution and path access, and a configurable
//! emitter. JSON is read as a strict subset and can be
//! emitted back out.
//!
//! The exposed APIs are grouped by module:
//!
//! - [`input`]: byte sources (borrowed, owned, streamed)
//! - [`event`]: the pull based event parser
//! - [`document`]: building, querying and mutating document
//!   trees
//! - [`emit`]: serialising documents back to bytes
//! - [`diag`]: diagnostics and parse configuration

#![allow(dead_code)]
#![allow(clippy::suspicious_else_formatting)]

// Note that this module must come before all others, as
// they depend on the macros which expand into this scope
mod scanner;

pub mod diag;
pub mod document;
pub mod emit;
pub mod event;
pub mod input;

mod atom;
mod chars;
mod error;
mod queue;
mod token;

pub use crate::{
    diag::ParseConfig,
    document::{Document, Documents, NodeId, NodeKind, NodeStyle},
    emit::{EmitConfig, EmitMode, Emitter},
    error::{Category, Error, Result},
    token::{Mark, ScalarStyle, StreamEncoding},
};
