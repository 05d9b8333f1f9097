/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Scalar scanning: plain, quoted (flow) and block styles.
//!
//! Each scanner locates the scalar's extent and records the
//! facts the decoder needs (escapes seen, folds, chomping),
//! but never materialises the presented text; the token
//! carries an undecoded atom.

pub(in crate::scanner) mod block;
pub(in crate::scanner) mod flow;
pub(in crate::scanner) mod plain;
