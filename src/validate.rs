// Document content validation
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

//! Validation of document content against element declarations.
//!
//! A [`Validator`] consumes a stream of [`Event`]s produced by a markup
//!   tokenizer and maintains a stack of open elements,
//!     each with a [`MatchState`] for its declared content model.
//! Each event is either accepted or rejected with a [`ValidateError`];
//!   a rejected event leaves the validator exactly as it was,
//!     and so callers may report the error and continue with the next
//!     event.
//!
//! ```
//! use cmodel::{
//!     gi::ElementTypes,
//!     model::GrammarNode as G,
//!     span::UNKNOWN_SPAN as S,
//!     validate::{DeclaredContent, ElementDecls, Event, Validator},
//! };
//!
//! let mut types = ElementTypes::new();
//! let (doc, title, para) =
//!     (types.intern("DOC"), types.intern("TITLE"), types.intern("PARA"));
//!
//! let mut decls = ElementDecls::new(types);
//! decls.declare_model(doc, &G::seq([G::element(title), G::element(para).plus()]));
//! decls.declare(title, DeclaredContent::RcData);
//! decls.declare(para, DeclaredContent::RcData);
//!
//! let mut sut = Validator::new(&decls, doc);
//!
//! sut.feed(Event::Start(doc, S)).unwrap();
//! sut.feed(Event::Start(title, S)).unwrap();
//! sut.feed(Event::Text(S)).unwrap();
//! sut.feed(Event::End(S)).unwrap();
//!
//! // The grammar requires PARA before DOC may end.
//! assert!(sut.feed(Event::End(S)).is_err());
//!
//! sut.feed(Event::Start(para, S)).unwrap();
//! sut.feed(Event::End(S)).unwrap();
//! sut.feed(Event::End(S)).unwrap();
//!
//! assert_eq!(Ok(()), sut.finalize());
//! ```
//!
//! Tag omission,
//!   exceptions (inclusions and exclusions),
//!   and attribute validation are the responsibility of the caller;
//!     [`MatchState`] exposes the queries needed to implement them.

use crate::{
    automaton::{
        compile, AmbiguityRecord, Compiled, CompiledModel, TextUnreachable,
    },
    gi::{ElementType, ElementTypes},
    matcher::MatchState,
    model::{GrammarNode, Symbol},
    span::Span,
    trace::{DefaultTrace, ValidatorTrace},
};
use fxhash::FxHashMap;
use std::{
    fmt::{self, Debug, Display},
    sync::Arc,
};

mod error;

#[cfg(test)]
mod test;

pub use error::{ExpectedSymbols, ValidateError};

/// Declared content of an element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredContent {
    /// Content governed by a compiled content model.
    Model(Arc<CompiledModel>),

    /// No content at all.
    ///
    /// The element is still closed by an [`Event::End`],
    ///   which the tokenizer is expected to supply in place of the
    ///   omitted end tag.
    Empty,

    /// Any mixture of text and declared elements.
    Any,

    /// Text only,
    ///   with markup not recognized.
    CData,

    /// Text only,
    ///   with entity references recognized.
    RcData,
}

/// Advisory diagnostics from compiling a declared content model.
#[derive(Debug, Default)]
pub struct ModelWarnings {
    pub ambiguities: Vec<AmbiguityRecord>,
    pub text_unreachable: Option<TextUnreachable>,
}

impl ModelWarnings {
    pub fn is_empty(&self) -> bool {
        self.ambiguities.is_empty() && self.text_unreachable.is_none()
    }
}

/// Element declarations of an active grammar.
///
/// Declarations are keyed by [`ElementType`],
///   which are allocated by the [`ElementTypes`] table owned by this
///   object.
#[derive(Debug, Default)]
pub struct ElementDecls {
    types: ElementTypes,
    decls: FxHashMap<ElementType, DeclaredContent>,
}

impl ElementDecls {
    pub fn new(types: ElementTypes) -> Self {
        Self {
            types,
            decls: FxHashMap::default(),
        }
    }

    pub fn types(&self) -> &ElementTypes {
        &self.types
    }

    /// Mutable access to element types,
    ///   for grammars that introduce new names as they are declared.
    pub fn types_mut(&mut self) -> &mut ElementTypes {
        &mut self.types
    }

    /// Declare the content of `ty`,
    ///   returning any previous declaration.
    pub fn declare(
        &mut self,
        ty: ElementType,
        content: DeclaredContent,
    ) -> Option<DeclaredContent> {
        self.decls.insert(ty, content)
    }

    /// Compile `grammar` and declare it as the content model of `ty`.
    ///
    /// Compilation is always successful;
    ///   see [`ModelWarnings`] for diagnostics that the caller may wish to
    ///   report.
    pub fn declare_model(
        &mut self,
        ty: ElementType,
        grammar: &GrammarNode,
    ) -> ModelWarnings {
        let compiled = compile(grammar, self.types.len());
        let text_unreachable = compiled.text_unreachable_warning();

        let Compiled {
            model, ambiguities, ..
        } = compiled;

        self.declare(ty, DeclaredContent::Model(Arc::new(model)));

        ModelWarnings {
            ambiguities,
            text_unreachable,
        }
    }

    pub fn get(&self, ty: ElementType) -> Option<&DeclaredContent> {
        self.decls.get(&ty)
    }

    /// Name of `ty` for display,
    ///   falling back to its index if it is not known.
    fn name(&self, ty: ElementType) -> String {
        self.types.display(ty).to_string()
    }

    /// Name of `symbol` for display.
    fn symbol_name(&self, symbol: Symbol) -> String {
        symbol.display(&self.types).to_string()
    }
}

/// A single event of document content,
///   as produced by a markup tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Start tag of an element.
    Start(ElementType, Span),

    /// End tag of the innermost open element.
    End(Span),

    /// A run of character data.
    ///
    /// Consecutive text events within the same element are treated as a
    ///   single run.
    Text(Span),
}

impl Event {
    pub fn span(&self) -> Span {
        match self {
            Self::Start(_, span) | Self::End(span) | Self::Text(span) => *span,
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(ty, span) => write!(f, "start tag of {ty} at {span}"),
            Self::End(span) => write!(f, "end tag at {span}"),
            Self::Text(span) => write!(f, "text at {span}"),
        }
    }
}

/// Content state of an open element.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Content<'d> {
    Model(MatchState<'d>),
    Empty,
    Any,

    /// CDATA or RCDATA.
    Text,
}

/// An element whose end tag has not yet been seen.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenElement<'d> {
    ty: ElementType,
    span: Span,
    content: Content<'d>,

    /// Whether the most recent event within this element was text.
    in_text: bool,
}

/// Progress through the document as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    /// The document element has not yet started.
    Prolog,

    /// Within the document element.
    Document,

    /// The document element has ended.
    Epilog,
}

/// Validate document content against element declarations.
///
/// See the [module-level documentation](self) for more information.
pub struct Validator<'d> {
    decls: &'d ElementDecls,

    /// Expected type of the document element.
    root: ElementType,

    stack: Vec<OpenElement<'d>>,
    progress: Progress,
    trace: DefaultTrace,
}

impl<'d> Validator<'d> {
    pub fn new(decls: &'d ElementDecls, root: ElementType) -> Self {
        Self {
            decls,
            root,
            stack: Vec::new(),
            progress: Progress::Prolog,
            trace: DefaultTrace::default(),
        }
    }

    /// Number of open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Type of the innermost open element,
    ///   if any.
    pub fn current_element(&self) -> Option<ElementType> {
        self.stack.last().map(|open| open.ty)
    }

    /// Match state of the innermost open element,
    ///   if it has a content model.
    ///
    /// This exposes the queries needed for tag omission and exceptions.
    pub fn current_match_state(&self) -> Option<&MatchState<'d>> {
        match self.stack.last() {
            Some(OpenElement {
                content: Content::Model(state),
                ..
            }) => Some(state),
            _ => None,
        }
    }

    /// Validate the next event of the document.
    ///
    /// If the event is rejected,
    ///   the state of the validator is unchanged.
    pub fn feed(&mut self, ev: Event) -> Result<(), ValidateError> {
        // The trace observes the entire validator.
        let mut trace = std::mem::take(&mut self.trace);
        trace.trace_event_begin(&*self, &ev);

        let result = match ev {
            Event::Start(ty, span) => self.start(ty, span),
            Event::End(span) => self.end(span),
            Event::Text(span) => self.text(span),
        };

        trace.trace_event_end(&*self, &result);
        self.trace = trace;

        result
    }

    /// Validate that the document is complete.
    pub fn finalize(&self) -> Result<(), ValidateError> {
        match (self.progress, self.stack.last()) {
            (Progress::Prolog, _) => Err(ValidateError::MissingDocumentElement {
                expected: self.decls.name(self.root),
            }),

            (_, Some(open)) => Err(ValidateError::PrematureEnd {
                name: self.decls.name(open.ty),
                start_span: open.span,
            }),

            (_, None) => Ok(()),
        }
    }

    fn start(
        &mut self,
        ty: ElementType,
        span: Span,
    ) -> Result<(), ValidateError> {
        use ValidateError::*;

        let decls = self.decls;

        let decl = decls.get(ty).ok_or_else(|| UndeclaredElement {
            name: decls.name(ty),
            span,
        })?;

        match (self.progress, self.stack.last_mut()) {
            (Progress::Prolog, _) if ty != self.root => {
                return Err(DocumentElementMismatch {
                    name: decls.name(ty),
                    expected: decls.name(self.root),
                    span,
                })
            }

            (Progress::Prolog, _) => self.progress = Progress::Document,

            (Progress::Epilog, _) | (Progress::Document, None) => {
                return Err(ContentAfterDocumentElement { span })
            }

            (Progress::Document, Some(parent)) => {
                let accepted = match &mut parent.content {
                    Content::Model(state) => state.try_transition(ty),
                    Content::Any => true,
                    Content::Text => false,
                    Content::Empty => {
                        return Err(ContentInEmpty {
                            parent: decls.name(parent.ty),
                            span,
                            parent_span: parent.span,
                        })
                    }
                };

                if !accepted {
                    return Err(ElementNotAllowed {
                        name: decls.name(ty),
                        parent: decls.name(parent.ty),
                        expected: Self::expected(decls, &parent.content),
                        span,
                        parent_span: parent.span,
                    });
                }

                parent.in_text = false;
            }
        }

        let content = match decl {
            DeclaredContent::Model(model) => {
                Content::Model(MatchState::new(model.as_ref()))
            }
            DeclaredContent::Any => Content::Any,
            DeclaredContent::CData | DeclaredContent::RcData => Content::Text,
            DeclaredContent::Empty => Content::Empty,
        };

        self.stack.push(OpenElement {
            ty,
            span,
            content,
            in_text: false,
        });

        Ok(())
    }

    fn end(&mut self, span: Span) -> Result<(), ValidateError> {
        use ValidateError::*;

        let open = self.stack.last().ok_or(UnbalancedEndTag { span })?;

        if let Content::Model(state) = &open.content {
            if !state.is_finished() {
                return Err(IncompleteContent {
                    name: self.decls.name(open.ty),
                    expected: Self::expected(self.decls, &open.content),
                    required: state
                        .implied_start_tag()
                        .map(|ty| self.decls.name(ty)),
                    span,
                    start_span: open.span,
                });
            }
        }

        self.stack.pop();
        self.close_if_root();

        Ok(())
    }

    fn text(&mut self, span: Span) -> Result<(), ValidateError> {
        use ValidateError::*;

        let decls = self.decls;

        let Some(open) = self.stack.last_mut() else {
            return Err(TextOutsideDocumentElement { span });
        };

        if open.in_text {
            return Ok(());
        }

        let accepted = match &mut open.content {
            Content::Model(state) => state.try_transition_text(),
            Content::Any | Content::Text => true,
            Content::Empty => {
                return Err(ContentInEmpty {
                    parent: decls.name(open.ty),
                    span,
                    parent_span: open.span,
                })
            }
        };

        if !accepted {
            return Err(TextNotAllowed {
                parent: decls.name(open.ty),
                expected: Self::expected(decls, &open.content),
                span,
                parent_span: open.span,
            });
        }

        open.in_text = true;

        Ok(())
    }

    /// Enter the epilog if the document element has just ended.
    fn close_if_root(&mut self) {
        if self.stack.is_empty() {
            self.progress = Progress::Epilog;
        }
    }

    /// Symbols permitted by `content` in its current state.
    fn expected(decls: &ElementDecls, content: &Content) -> ExpectedSymbols {
        match content {
            Content::Model(state) => state
                .possible_transitions()
                .into_iter()
                .map(|symbol| decls.symbol_name(symbol))
                .collect(),

            Content::Empty | Content::Any => ExpectedSymbols::default(),
            Content::Text => [decls.symbol_name(Symbol::Text)]
                .into_iter()
                .collect(),
        }
    }
}

impl<'d> Debug for Validator<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("root", &self.root)
            .field("stack", &self.stack)
            .field("progress", &self.progress)
            .finish()
    }
}

impl<'d> Display for Validator<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.progress, self.stack.last()) {
            (Progress::Prolog, _) => write!(
                f,
                "awaiting document element {}",
                self.decls.types.display(self.root)
            ),

            (_, Some(open)) => {
                write!(
                    f,
                    "within {} at depth {}",
                    self.decls.types.display(open.ty),
                    self.stack.len(),
                )?;

                match &open.content {
                    Content::Model(state) => write!(f, " {state}"),
                    Content::Empty => write!(f, " (EMPTY)"),
                    Content::Any => write!(f, " (ANY)"),
                    Content::Text => write!(f, " (text only)"),
                }
            }

            (_, None) => write!(f, "after document element"),
        }
    }
}
