// Validation errors
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

//! Errors resulting from document validation.

use std::{
    error::Error,
    fmt::{self, Display},
};

use arrayvec::ArrayVec;

use crate::{
    diagnose::{Annotate, AnnotatedSpan, Diagnostic},
    fmt::{DisplayWrapper, ListDisplayWrapper, OrConjList, TtQuote},
    global::EXPECTED_SYMBOL_DISPLAY_MAX,
    span::Span,
};

/// An event rejected by a [`Validator`](super::Validator).
///
/// Element type names are rendered at the time of the error so that the
///   error is independent of the declarations that produced it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ValidateError {
    /// Start tag of an element type that has no declaration.
    UndeclaredElement { name: String, span: Span },

    /// The first element of the document is not of the declared document
    ///   type.
    DocumentElementMismatch {
        name: String,
        expected: String,
        span: Span,
    },

    /// The content model of the parent does not permit the element at this
    ///   position.
    ElementNotAllowed {
        name: String,
        parent: String,
        expected: ExpectedSymbols,
        span: Span,
        parent_span: Span,
    },

    /// The content model of the parent does not permit text at this
    ///   position.
    TextNotAllowed {
        parent: String,
        expected: ExpectedSymbols,
        span: Span,
        parent_span: Span,
    },

    /// An element declared EMPTY has content.
    ContentInEmpty {
        parent: String,
        span: Span,
        parent_span: Span,
    },

    /// End tag of an element whose content model has not been satisfied.
    IncompleteContent {
        name: String,
        expected: ExpectedSymbols,

        /// Element that the grammar requires next,
        ///   if there is exactly one.
        required: Option<String>,

        span: Span,
        start_span: Span,
    },

    /// End tag with no open element.
    UnbalancedEndTag { span: Span },

    /// An element follows the end of the document element.
    ContentAfterDocumentElement { span: Span },

    /// Text before or after the document element.
    TextOutsideDocumentElement { span: Span },

    /// The document ended while an element was still open.
    PrematureEnd { name: String, start_span: Span },

    /// The document ended before the document element was seen.
    MissingDocumentElement { expected: String },
}

impl Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ValidateError::*;

        match self {
            UndeclaredElement { name, .. } => {
                write!(f, "element {} is not declared", TtQuote::wrap(name))
            }

            DocumentElementMismatch { name, expected, .. } => write!(
                f,
                "expected document element {}, found {}",
                TtQuote::wrap(expected),
                TtQuote::wrap(name),
            ),

            ElementNotAllowed { name, parent, .. } => write!(
                f,
                "element {} is not allowed here in {}",
                TtQuote::wrap(name),
                TtQuote::wrap(parent),
            ),

            TextNotAllowed { parent, .. } => write!(
                f,
                "text is not allowed here in {}",
                TtQuote::wrap(parent)
            ),

            ContentInEmpty { parent, .. } => write!(
                f,
                "element {} is declared EMPTY and cannot have content",
                TtQuote::wrap(parent)
            ),

            IncompleteContent { name, .. } => {
                write!(f, "content of {} is incomplete", TtQuote::wrap(name))
            }

            UnbalancedEndTag { .. } => {
                write!(f, "end tag does not close any open element")
            }

            ContentAfterDocumentElement { .. } => {
                write!(f, "element follows the end of the document element")
            }

            TextOutsideDocumentElement { .. } => {
                write!(f, "text outside of the document element")
            }

            PrematureEnd { name, .. } => write!(
                f,
                "document ended before element {} was closed",
                TtQuote::wrap(name)
            ),

            MissingDocumentElement { expected } => write!(
                f,
                "document is missing its document element {}",
                TtQuote::wrap(expected)
            ),
        }
    }
}

impl Error for ValidateError {}

impl Diagnostic for ValidateError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        use ValidateError::*;

        match self {
            UndeclaredElement { span, .. } => vec![
                span.error("no declaration for this element type"),
            ],

            DocumentElementMismatch { expected, span, .. } => vec![span
                .error(format!("expected {}", TtQuote::wrap(expected)))],

            ElementNotAllowed {
                parent,
                expected,
                span,
                parent_span,
                ..
            } => vec![
                parent_span.note(format!(
                    "content of {} begins here",
                    TtQuote::wrap(parent)
                )),
                span.error("element not permitted at this position"),
                span.help(expected.help()),
            ],

            TextNotAllowed {
                parent,
                expected,
                span,
                parent_span,
            } => vec![
                parent_span.note(format!(
                    "content of {} begins here",
                    TtQuote::wrap(parent)
                )),
                span.error("text not permitted at this position"),
                span.help(expected.help()),
            ],

            ContentInEmpty {
                span, parent_span, ..
            } => vec![
                parent_span.note("this element is declared EMPTY"),
                span.error("unexpected content"),
            ],

            IncompleteContent {
                expected,
                required,
                span,
                start_span,
                ..
            } => {
                let mut desc = vec![
                    start_span.note("element begins here"),
                    span.error("element ends before its content is complete"),
                    span.help(expected.help()),
                ];

                if let Some(name) = required {
                    desc.push(span.help(format!(
                        "the start tag of {} may be missing",
                        TtQuote::wrap(name)
                    )));
                }

                desc
            }

            UnbalancedEndTag { span } => {
                vec![span.error("no element is open")]
            }

            ContentAfterDocumentElement { span } => vec![
                span.error("unexpected element"),
                span.help("a document has exactly one document element"),
            ],

            TextOutsideDocumentElement { span } => {
                vec![span.error("unexpected text")]
            }

            PrematureEnd { start_span, .. } => {
                vec![start_span.error("this element is never closed")]
            }

            // There is nothing in the document to point to.
            MissingDocumentElement { .. } => vec![],
        }
    }
}

/// Symbols that would have been accepted in place of a rejected event.
///
/// Only the first [`EXPECTED_SYMBOL_DISPLAY_MAX`] symbols are retained;
///   the remainder are counted so that the user is not overwhelmed by
///   large OR groups.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ExpectedSymbols {
    shown: ArrayVec<String, EXPECTED_SYMBOL_DISPLAY_MAX>,
    omitted: usize,
}

impl ExpectedSymbols {
    /// Whether nothing at all would have been accepted.
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    /// Total number of expected symbols,
    ///   including those omitted from display.
    pub fn len(&self) -> usize {
        self.shown.len() + self.omitted
    }

    /// Symbols retained for display.
    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    fn help(&self) -> String {
        if self.is_empty() {
            "no further content is permitted here".into()
        } else {
            format!("expecting {self}")
        }
    }
}

impl FromIterator<String> for ExpectedSymbols {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut expected = Self::default();

        for name in iter {
            match expected.shown.try_push(name) {
                Ok(()) => (),
                Err(_) => expected.omitted += 1,
            }
        }

        expected
    }
}

impl Display for ExpectedSymbols {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.omitted {
            0 => OrConjList::<TtQuote>::fmt(&self.shown[..], f),
            n => write!(
                f,
                "{} (or {n} more)",
                CommaList(&self.shown),
            ),
        }
    }
}

/// Comma-separated list without a conjunction,
///   for lists that continue beyond what is shown.
struct CommaList<'a>(&'a [String]);

impl<'a> Display for CommaList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.iter().enumerate().try_for_each(|(i, name)| match i {
            0 => TtQuote::fmt(name, f),
            _ => {
                write!(f, ", ")?;
                TtQuote::fmt(name, f)
            }
        })
    }
}
