// Content model grammar trees
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

//! Content model grammar as declared.
//!
//! A content model is a tree of [`GrammarNode`]s:
//!   leaves reference an element type or text (`#PCDATA`),
//!   and groups join their children with a [`Connector`].
//! Every node carries an [`Occurrence`] indicator.
//!
//! The grammar declaration layer is responsible for parsing declarations
//!   into this tree;
//!     this crate only ever consumes a complete tree.
//! The tree is immutable once constructed and is consumed by reference
//!   by the [automaton compiler](crate::automaton::compile).
//!
//! The builder methods read much like the declaration itself.
//! For example,
//!   `((TITLE, PARA+) & META?)` is:
//!
//! ```
//! use cmodel::{gi::ElementTypes, model::GrammarNode as G};
//!
//! let mut types = ElementTypes::new();
//! let (title, para, meta) =
//!     (types.intern("TITLE"), types.intern("PARA"), types.intern("META"));
//!
//! let model = G::and([
//!     G::seq([G::element(title), G::element(para).plus()]),
//!     G::element(meta).opt(),
//! ]);
//!
//! assert_eq!(
//!     "((TITLE, PARA+) & META?)",
//!     model.display(&types).to_string(),
//! );
//! ```

use crate::{
    gi::{ElementType, ElementTypes},
    span::{Span, UNKNOWN_SPAN},
};
use std::fmt::{self, Display};


/// A terminal symbol of the content model alphabet.
///
/// This is what a leaf of the grammar matches against.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum Symbol {
    /// An element of the given type.
    Element(ElementType),

    /// Character data (`#PCDATA`).
    Text,
}

impl Symbol {
    /// Element type of this symbol,
    ///   if any.
    pub fn element_type(self) -> Option<ElementType> {
        match self {
            Self::Element(ty) => Some(ty),
            Self::Text => None,
        }
    }

    /// Render this symbol using the names in `types`.
    pub fn display<'a>(&self, types: &'a ElementTypes) -> DisplaySymbol<'a> {
        DisplaySymbol(*self, types)
    }
}

impl From<ElementType> for Symbol {
    fn from(ty: ElementType) -> Self {
        Self::Element(ty)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(ty) => Display::fmt(ty, f),
            Self::Text => write!(f, "#PCDATA"),
        }
    }
}

/// A [`Symbol`] that displays element types by name.
#[derive(Debug, Clone, Copy)]
pub struct DisplaySymbol<'a>(Symbol, &'a ElementTypes);

impl<'a> Display for DisplaySymbol<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self(Symbol::Element(ty), types) => types.display(*ty).fmt(f),
            Self(Symbol::Text, _) => write!(f, "#PCDATA"),
        }
    }
}

/// Occurrence indicator of a content token.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Occurrence {
    /// Exactly once.
    #[default]
    None,

    /// Zero or one times (`?`).
    Optional,

    /// One or more times (`+`).
    OneOrMore,

    /// Zero or more times (`*`).
    ZeroOrMore,
}

impl Occurrence {
    /// Whether this indicator permits the token to be omitted.
    pub fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }

    /// Whether this indicator permits the token to repeat.
    pub fn is_repeatable(self) -> bool {
        matches!(self, Self::OneOrMore | Self::ZeroOrMore)
    }
}

impl Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Optional => write!(f, "?"),
            Self::OneOrMore => write!(f, "+"),
            Self::ZeroOrMore => write!(f, "*"),
        }
    }
}

/// Connector joining the members of a model group.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Connector {
    /// All members in order (`,`).
    Seq,

    /// Exactly one member (`|`).
    Or,

    /// All members exactly once in any order (`&`).
    And,
}

impl Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seq => write!(f, ","),
            Self::Or => write!(f, "|"),
            Self::And => write!(f, "&"),
        }
    }
}

/// A node of a content model grammar tree.
///
/// Each child of a group is exclusively owned by its parent.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum GrammarNode {
    /// A terminal token matching a single [`Symbol`].
    Leaf {
        symbol: Symbol,
        occurrence: Occurrence,
        span: Span,
    },

    /// A model group.
    ///
    /// Groups declared by a DTD always have at least one member.
    Group {
        connector: Connector,
        children: Vec<GrammarNode>,
        occurrence: Occurrence,
        span: Span,
    },
}

impl GrammarNode {
    /// A leaf matching an element of type `ty`.
    pub fn element(ty: ElementType) -> Self {
        Self::leaf(Symbol::Element(ty))
    }

    /// A leaf matching character data (`#PCDATA`).
    pub fn text() -> Self {
        Self::leaf(Symbol::Text)
    }

    pub fn leaf(symbol: Symbol) -> Self {
        Self::Leaf {
            symbol,
            occurrence: Occurrence::None,
            span: UNKNOWN_SPAN,
        }
    }

    /// A sequence group `(a, b, …)`.
    pub fn seq<I: IntoIterator<Item = GrammarNode>>(children: I) -> Self {
        Self::group(Connector::Seq, children)
    }

    /// An OR group `(a | b | …)`.
    pub fn or<I: IntoIterator<Item = GrammarNode>>(children: I) -> Self {
        Self::group(Connector::Or, children)
    }

    /// An AND group `(a & b & …)`.
    pub fn and<I: IntoIterator<Item = GrammarNode>>(children: I) -> Self {
        Self::group(Connector::And, children)
    }

    pub fn group<I: IntoIterator<Item = GrammarNode>>(
        connector: Connector,
        children: I,
    ) -> Self {
        Self::Group {
            connector,
            children: children.into_iter().collect(),
            occurrence: Occurrence::None,
            span: UNKNOWN_SPAN,
        }
    }

    /// Replace the occurrence indicator of this node.
    pub fn with_occurrence(self, occ: Occurrence) -> Self {
        match self {
            Self::Leaf { symbol, span, .. } => Self::Leaf {
                symbol,
                occurrence: occ,
                span,
            },
            Self::Group {
                connector,
                children,
                span,
                ..
            } => Self::Group {
                connector,
                children,
                occurrence: occ,
                span,
            },
        }
    }

    /// Mark this node optional (`?`).
    pub fn opt(self) -> Self {
        self.with_occurrence(Occurrence::Optional)
    }

    /// Mark this node as repeating one or more times (`+`).
    pub fn plus(self) -> Self {
        self.with_occurrence(Occurrence::OneOrMore)
    }

    /// Mark this node as repeating zero or more times (`*`).
    pub fn rep(self) -> Self {
        self.with_occurrence(Occurrence::ZeroOrMore)
    }

    /// Associate the span of the declaration of this node.
    pub fn with_span(self, span: Span) -> Self {
        match self {
            Self::Leaf {
                symbol, occurrence, ..
            } => Self::Leaf {
                symbol,
                occurrence,
                span,
            },
            Self::Group {
                connector,
                children,
                occurrence,
                ..
            } => Self::Group {
                connector,
                children,
                occurrence,
                span,
            },
        }
    }

    /// Occurrence indicator as declared.
    ///
    /// See also [`Self::effective_occurrence`].
    pub fn occurrence(&self) -> Occurrence {
        match self {
            Self::Leaf { occurrence, .. } | Self::Group { occurrence, .. } => {
                *occurrence
            }
        }
    }

    /// Occurrence indicator used when matching.
    ///
    /// Text (`#PCDATA`) always occurs zero or more times,
    ///   whatever indicator was declared for it.
    pub fn effective_occurrence(&self) -> Occurrence {
        match self {
            Self::Leaf {
                symbol: Symbol::Text,
                ..
            } => Occurrence::ZeroOrMore,
            _ => self.occurrence(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Leaf { span, .. } | Self::Group { span, .. } => *span,
        }
    }

    /// Members of this node,
    ///   which is empty for leaves.
    pub fn children(&self) -> &[GrammarNode] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Group { children, .. } => children,
        }
    }

    /// Whether this node may match an empty sequence of events.
    ///
    /// This is what SGML calls _inherently optional_:
    ///   a token is inherently optional if its
    ///   [effective occurrence indicator](Self::effective_occurrence)
    ///   permits omission,
    ///     or if it is a group whose connector permits every member
    ///     (`,`, `&`) or any member (`|`) to be omitted.
    /// A group with no members matches only the empty sequence.
    pub fn is_inherently_optional(&self) -> bool {
        self.effective_occurrence().is_optional()
            || match self {
                Self::Leaf { .. } => false,
                Self::Group {
                    connector: Connector::Or,
                    children,
                    ..
                } => {
                    children.is_empty()
                        || children.iter().any(Self::is_inherently_optional)
                }
                Self::Group { children, .. } => {
                    children.iter().all(Self::is_inherently_optional)
                }
            }
    }

    /// Whether text may appear anywhere within this node.
    pub fn contains_text(&self) -> bool {
        match self {
            Self::Leaf { symbol, .. } => *symbol == Symbol::Text,
            Self::Group { children, .. } => {
                children.iter().any(Self::contains_text)
            }
        }
    }

    /// Number of leaves within this node,
    ///   which is the number of positions that the compiled automaton will
    ///   have in addition to its initial position.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Group { children, .. } => {
                children.iter().map(Self::leaf_count).sum()
            }
        }
    }

    /// Number of content tokens within this node,
    ///   counting each group as well as each leaf.
    ///
    /// This is the quantity limited by the `GRPGTCNT` capacity of the
    ///   concrete syntax.
    pub fn grpgtcnt(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Group { children, .. } => {
                1 + children.iter().map(Self::grpgtcnt).sum::<usize>()
            }
        }
    }

    /// Render this node in SGML declaration syntax using the names in
    ///   `types`.
    pub fn display<'a>(&'a self, types: &'a ElementTypes) -> DisplayNode<'a> {
        DisplayNode(self, Some(types))
    }
}

impl Display for GrammarNode {
    /// Render this node in SGML declaration syntax,
    ///   with element types rendered by index.
    ///
    /// See also [`GrammarNode::display`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DisplayNode(self, None).fmt(f)
    }
}

/// A [`GrammarNode`] rendered in SGML declaration syntax.
#[derive(Debug, Clone, Copy)]
pub struct DisplayNode<'a>(&'a GrammarNode, Option<&'a ElementTypes>);

impl<'a> Display for DisplayNode<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(node, otypes) = *self;

        match node {
            GrammarNode::Leaf {
                symbol, occurrence, ..
            } => match otypes {
                Some(types) => write!(f, "{}{occurrence}", symbol.display(types)),
                None => write!(f, "{symbol}{occurrence}"),
            },

            GrammarNode::Group {
                connector,
                children,
                occurrence,
                ..
            } => {
                write!(f, "(")?;

                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        match connector {
                            Connector::Seq => write!(f, ", ")?,
                            _ => write!(f, " {connector} ")?,
                        }
                    }

                    DisplayNode(child, otypes).fmt(f)?;
                }

                write!(f, "){occurrence}")
            }
        }
    }
}
