// Global constants across the entirety of cmodel
//
//  Copyright (C) 2014-2022 Ryan Specialty Group, LLC.
//
//  This file is part of cmodel.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! System-wide static configuration.
//!
//! This module provides a system-wide configuration.
//! Subsystems should reference these values rather than defining their own
//!   and risk incompatibilities or maintenance issues as requirements
//!   change.
//!
//! By convention,
//!   import this entire module rather than individual members and reference
//!   them as `global::foo` to emphasize their nature and risk.

/// A size capable of representing every leaf of a single compiled content
///   model,
///     including the initial pseudo-leaf.
///
/// Content models are written by hand in a DTD and so are small,
///   but parameter entities may expand into very large groups.
pub type LeafIndexSize = u32;

/// A size capable of representing every AND-group member slot of a single
///   compiled content model.
///
/// This is also the size of the AND-group descriptor table index.
pub type AndIndexSize = u32;

/// A size capable of representing the nesting depth of AND-groups.
///
/// This must be ≤ [`AndIndexSize`],
///   since every level of nesting requires at least one slot.
pub type AndDepthSize = u32;

/// A size capable of representing every distinct element type of an
///   active grammar.
pub type ElementTypeSize = u32;

/// A size capable of representing the byte offset of any declaration
///   within its source context.
pub type SourceFileSize = u32;

/// A size capable of representing the byte length of a single token of a
///   declaration.
pub type FrontendTokenLength = u16;

/// Maximum number of expected symbols retained for a single diagnostic
///   message.
///
/// Models with many alternatives would otherwise produce unreadable
///   "expected one of …" lists;
///     remaining symbols are counted but not named.
pub const EXPECTED_SYMBOL_DISPLAY_MAX: usize = 8;
