// Content model compilation diagnostics
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

//! Advisory diagnostics produced by [`compile`](super::compile).
//!
//! Neither of these prevents a model from being used;
//!   they are returned as data for the caller to report as it sees fit.

use super::{AndDepth, Leaf, LeafIndex};
use crate::{
    diagnose::{Annotate, AnnotatedSpan, Diagnostic, Level},
    model::Symbol,
    span::Span,
};
use std::fmt::{self, Display};

/// Two transitions from the same leaf match the same symbol and cannot be
///   distinguished.
///
/// SGML requires content models to be unambiguous:
///   it must be possible to determine which token of the model an element
///   matches without looking ahead.
/// The compiled model resolves this by always preferring the first
///   transition,
///     but the grammar is still in error.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AmbiguityRecord {
    from: LeafIndex,
    candidates: (LeafIndex, LeafIndex),
    and_depth: AndDepth,
    symbol: Symbol,
    spans: (Span, Span, Span),
}

impl AmbiguityRecord {
    pub(super) fn new(
        from: &Leaf,
        first: &Leaf,
        second: &Leaf,
        and_depth: AndDepth,
    ) -> Self {
        Self {
            from: from.index(),
            candidates: (first.index(), second.index()),
            and_depth,
            // Only leaves of the grammar are ever targets of transitions.
            symbol: second.symbol().unwrap_or(Symbol::Text),
            spans: (from.span(), first.span(), second.span()),
        }
    }

    /// Leaf from which the ambiguous transitions originate.
    pub fn from(&self) -> LeafIndex {
        self.from
    }

    /// The two target leaves that match the same symbol,
    ///   in order of preference.
    pub fn candidates(&self) -> (LeafIndex, LeafIndex) {
        self.candidates
    }

    /// AND depth of the later of the two transitions,
    ///   or `0` outside of any AND group.
    pub fn and_depth(&self) -> AndDepth {
        self.and_depth
    }

    /// Symbol matched by both candidates.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }
}

impl Display for AmbiguityRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (first, second) = self.candidates;

        write!(
            f,
            "ambiguous content model: {} after {} may match either {first} \
                or {second}",
            self.symbol, self.from,
        )
    }
}

impl Diagnostic for AmbiguityRecord {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        let (from, first, second) = self.spans;

        vec![
            from.note("after this token"),
            first.warning("this token will always be matched"),
            second.warning("but this token matches the same symbol"),
            second.help(
                "content models must determine which token is matched \
                    without looking ahead",
            ),
        ]
    }

    fn level(&self) -> Level {
        Level::Warning
    }
}

/// Text is permitted by a content model,
///   but not at every position within it.
///
/// This is permitted by SGML but is generally a mistake,
///   since whitespace in the document may be interpreted as text where
///   text is not allowed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TextUnreachable(Span);

impl TextUnreachable {
    pub(super) fn new(span: Span) -> Self {
        Self(span)
    }
}

impl Display for TextUnreachable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "mixed content model does not permit text everywhere")
    }
}

impl Diagnostic for TextUnreachable {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        self.0
            .warning("#PCDATA is not permitted at every position of this model")
            .with_help(
                "consider a model of the form `(#PCDATA | a | b)*` instead",
            )
            .into()
    }

    fn level(&self) -> Level {
        Level::Warning
    }
}
