// Source spans for declarations and document events
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

//! Mapping to source input byte intervals.
//!
//! A [`Span`] is a mapping to a byte interval within a source context,
//!   representing where a content model token was declared or where a
//!   document event occurred.
//! This underpins the [diagnostic system](crate::diagnose).
//!
//! This crate does not read any source input itself;
//!   the grammar declaration layer and the markup tokenizer are
//!   responsible for producing spans,
//!     and a [`Context`] is nothing more than an opaque number that they
//!     assign to each of their sources
//!       (such as an entity or a file).
//!
//! ```
//! use cmodel::span::{Span, Context};
//!
//! let ctx = Context::new(3);
//! let span = Span::new(2, 6, ctx);
//!
//! assert_eq!(2, span.offset());
//! assert_eq!(6, span.len());
//! assert_eq!(ctx, span.context());
//!
//! // Freely copyable
//! let cp = span;
//! assert_eq!(cp, span);
//! ```
//!
//! Spans are ordered first by [`Context`],
//!   then by offset,
//!   and finally by length.
//!
//! Span is expected to fit within a general-purpose CPU register on a
//!   64-bit system,
//!     and so does not exceed 8 bytes in length.
//! Every leaf of a compiled content model carries one.

use crate::global;
use std::fmt::Display;

/// Size of a [`Span`]'s `offset` field.
pub type SpanOffsetSize = global::SourceFileSize;

/// Size of a [`Span`]'s `len` field.
pub type SpanLenSize = global::FrontendTokenLength;

/// Description of a source location and byte interval for some object.
///
/// If a content model is produced by expanding parameter entities,
///   the span ought to reference the location that the user is able to
///   modify to correct any problems.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Span {
    /// Context onto which byte offsets are mapped,
    ///   such as a DTD entity.
    ctx: Context,

    /// Starting 0-indexed byte position, inclusive.
    offset: SpanOffsetSize,

    /// Token length (ending byte offset - `offset`).
    len: SpanLenSize,
}

assert_eq_size!(Span, u64);

impl Span {
    /// Create a new span from its constituent parts.
    pub const fn new(
        offset: SpanOffsetSize,
        len: SpanLenSize,
        ctx: Context,
    ) -> Self {
        Self { ctx, offset, len }
    }

    /// Byte offset of the beginning of the span relative to its context.
    pub fn offset(&self) -> SpanOffsetSize {
        self.offset
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> SpanLenSize {
        self.len
    }

    /// Whether this span has a length of zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The context to which the span applies.
    pub fn context(&self) -> Context {
        self.ctx
    }

    /// Whether this span references an actual source location.
    pub fn is_known(&self) -> bool {
        self.ctx != UNKNOWN_CONTEXT
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let end = self.offset as usize + self.len as usize;

        // Very primitive information to begin with; the grammar
        //   declaration layer is expected to resolve spans to lines.
        write!(f, "[{} offset {}-{}]", self.ctx, self.offset, end)
    }
}

/// A placeholder span indicating that a span is expected but is not
///   known,
///     such as for content models constructed programmatically.
pub const UNKNOWN_SPAN: Span = Span::new(0, 0, UNKNOWN_CONTEXT);

/// Context for byte offsets (e.g. a DTD entity).
///
/// Since this is used within [`Span`],
///   it must be kept as small as possible.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Context(u16);

impl Context {
    /// Context identified by the given number.
    ///
    /// Numbers `0` and `1` are reserved for [`UNKNOWN_CONTEXT`] and the
    ///   dummy context used by tests respectively,
    ///     but are not rejected.
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

/// A placeholder context indicating that a context is expected but is not
///   known.
pub const UNKNOWN_CONTEXT: Context = Context(0);

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            UNKNOWN_CONTEXT => write!(f, "<unknown>"),
            Context(1) => write!(f, "<dummy>"),
            Context(id) => write!(f, "ctx{id}"),
        }
    }
}
