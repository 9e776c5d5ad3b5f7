// Content model automata
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

//! Compiled content models.
//!
//! A [`GrammarNode`](crate::model::GrammarNode) is [`compile`]d into a
//!   [`CompiledModel`]:
//!     a nondeterministic transition graph whose positions are the leaves
//!     of the grammar,
//!       plus a synthetic initial position that precedes all content.
//! A [`MatchState`](crate::matcher::MatchState) is then driven through
//!   that graph one event at a time.
//!
//! Positions and Transitions
//! =========================
//! Each [`Leaf`] is identified by a dense [`LeafIndex`].
//! The initial pseudo-leaf is always [`LeafIndex::INITIAL`];
//!   the leaves of the grammar follow in declaration order.
//! A [`Transition`] from a leaf names the leaf that may follow it.
//!
//! Transitions for a single leaf are stored in decreasing order of
//!   [AND depth](Transition::and_depth);
//!     matching always takes the first legal transition,
//!     and so the most deeply nested AND context wins.
//!
//! AND Groups
//! ==========
//! An AND group `(a & b & c)` requires each of its members exactly once in
//!   any order.
//! This cannot be expressed by the graph alone,
//!   and so each member of each AND group is allocated a slot
//!   ([`AndIndex`]) in a bit vector carried by the match state.
//! A member's bit is set once the member has been completed and another
//!   member begins;
//!     transitions into a member require that member's bit to be clear,
//!     and transitions that leave a group clear all bits allocated to it and
//!     to any group nested within it.
//!
//! The descriptor of each group is an [`AndGroup`],
//!   addressed by [`AndGroupId`];
//!     leaves within a group reference only the innermost group that
//!     contains them
//!       (see [`AndMembership`]),
//!     and the chain of enclosing groups is followed through the
//!     descriptors.
//!
//! Diagnostics
//! ===========
//! Compilation never fails.
//! Grammars that SGML considers ambiguous compile just the same,
//!   but each ambiguity is reported as an [`AmbiguityRecord`] alongside the
//!   model;
//!     matching remains deterministic because of the ordering of
//!     transitions.
//! Mixed content that is not permitted at every position produces a
//!   [`TextUnreachable`] warning.

use crate::{gi::ElementType, global, model::Symbol, span::Span};
use std::fmt::{self, Display};

mod ambiguity;
mod compile;
mod graph;
mod set;

#[cfg(test)]
mod test;

pub use ambiguity::{AmbiguityRecord, TextUnreachable};
pub use compile::compile;
pub use graph::{ModelGraph, ModelGraphIx};

/// Nesting depth of AND groups.
///
/// A depth of `0` represents a context outside of any AND group.
pub type AndDepth = global::AndDepthSize;

/// Dense index of a [`Leaf`] within its [`CompiledModel`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct LeafIndex(global::LeafIndexSize);

assert_eq_size!(LeafIndex, u32);

impl LeafIndex {
    /// The initial pseudo-leaf,
    ///   representing the position before any content.
    pub const INITIAL: Self = Self(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Index for a leaf allocated at the given offset of the leaf table.
    ///
    /// Panics
    /// ======
    /// If `index` exceeds [`global::LeafIndexSize`].
    fn from_usize(index: usize) -> Self {
        match global::LeafIndexSize::try_from(index) {
            Ok(i) => Self(i),
            Err(_) => panic!("internal error: LeafIndex range exhausted"),
        }
    }
}

impl Display for LeafIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Slot of an AND group member within the AND state bit vector.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct AndIndex(global::AndIndexSize);

impl AndIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Slot at the given offset.
    ///
    /// Panics
    /// ======
    /// If `index` exceeds [`global::AndIndexSize`].
    pub(crate) fn from_usize(index: usize) -> Self {
        match global::AndIndexSize::try_from(index) {
            Ok(i) => Self(i),
            Err(_) => panic!("internal error: AndIndex range exhausted"),
        }
    }
}

impl Display for AndIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{}", self.0)
    }
}

/// Index of an [`AndGroup`] descriptor within its [`CompiledModel`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct AndGroupId(global::AndIndexSize);

impl AndGroupId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Membership of a node within its innermost enclosing AND group.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AndMembership {
    group: AndGroupId,

    /// Offset of the member of `group` containing the node.
    member: global::AndIndexSize,
}

impl AndMembership {
    pub fn group(&self) -> AndGroupId {
        self.group
    }

    pub fn member(&self) -> usize {
        self.member as usize
    }
}

/// Descriptor of an AND group.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AndGroup {
    /// Number of AND groups enclosing this one.
    depth: AndDepth,

    /// Slot of the first member of this group;
    ///   members occupy consecutive slots.
    base: AndIndex,

    /// Whether each member is inherently optional,
    ///   by member offset.
    member_optional: Vec<bool>,

    /// Membership of this group within its own enclosing AND group,
    ///   if any.
    ancestor: Option<AndMembership>,

    span: Span,
}

impl AndGroup {
    pub fn depth(&self) -> AndDepth {
        self.depth
    }

    /// Slot of the member at offset `member`.
    pub fn member_slot(&self, member: usize) -> AndIndex {
        AndIndex(self.base.0 + member as global::AndIndexSize)
    }

    pub fn member_count(&self) -> usize {
        self.member_optional.len()
    }

    pub fn is_member_optional(&self, member: usize) -> bool {
        self.member_optional.get(member).copied().unwrap_or(true)
    }

    /// Offsets of all members other than `member` that must appear.
    pub fn required_members_except(
        &self,
        member: usize,
    ) -> impl Iterator<Item = usize> + '_ {
        self.member_optional
            .iter()
            .enumerate()
            .filter(move |&(i, &opt)| i != member && !opt)
            .map(|(i, _)| i)
    }

    pub fn ancestor(&self) -> Option<AndMembership> {
        self.ancestor
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// An edge from one [`Leaf`] to another.
///
/// A transition is legal from a given match state if
///   its [`Self::require_clear`] slot is clear
///   and its [`Self::and_depth`] is at least the state's minimum AND
///   depth.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Transition {
    to: LeafIndex,
    and_depth: AndDepth,
    clear_from: AndIndex,
    require_clear: Option<AndIndex>,
    set_on_take: Option<AndIndex>,
    isolated: bool,
}

impl Transition {
    /// Target leaf.
    pub fn to(&self) -> LeafIndex {
        self.to
    }

    /// Depth of the AND context in which this transition was produced.
    ///
    /// This is one greater than the depth of the innermost AND group
    ///   enclosing the context,
    ///     or `0` outside of any AND group.
    pub fn and_depth(&self) -> AndDepth {
        self.and_depth
    }

    /// Slots at and above this index are cleared when the transition is
    ///   taken.
    pub fn clear_from(&self) -> AndIndex {
        self.clear_from
    }

    /// Slot that must be clear for this transition to be legal.
    pub fn require_clear(&self) -> Option<AndIndex> {
        self.require_clear
    }

    /// Slot that is set when this transition is taken.
    pub fn set_on_take(&self) -> Option<AndIndex> {
        self.set_on_take
    }

    /// Whether the target is a required member of the AND group being
    ///   entered,
    ///     making this transition unambiguous relative to transitions of
    ///     a shallower depth to the same symbol.
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{} clr{}", self.and_depth, self.clear_from)?;

        if let Some(slot) = self.require_clear {
            write!(f, " req{slot}")?;
        }
        if let Some(slot) = self.set_on_take {
            write!(f, " set{slot}")?;
        }
        if self.isolated {
            write!(f, " iso")?;
        }

        Ok(())
    }
}

/// What a [`Leaf`] matches.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LeafKind {
    /// The synthetic position before any content,
    ///   which matches nothing.
    Initial,

    Element(ElementType),

    Text,
}

impl LeafKind {
    /// Symbol matched by this leaf,
    ///   which is [`None`] for the initial pseudo-leaf.
    pub fn symbol(self) -> Option<Symbol> {
        match self {
            Self::Initial => None,
            Self::Element(ty) => Some(Symbol::Element(ty)),
            Self::Text => Some(Symbol::Text),
        }
    }
}

impl From<Symbol> for LeafKind {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::Element(ty) => Self::Element(ty),
            Symbol::Text => Self::Text,
        }
    }
}

impl Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "(initial)"),
            Self::Element(ty) => Display::fmt(ty, f),
            Self::Text => write!(f, "#PCDATA"),
        }
    }
}

/// Precomputed strategy for matching text from a given [`Leaf`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum TextTransition {
    /// Text is never permitted.
    #[default]
    None,

    /// Text always moves to the given leaf,
    ///   independent of AND state.
    Simple(LeafIndex),

    /// Text requires a search of transitions like any element.
    General,
}

/// A position within a [`CompiledModel`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Leaf {
    index: LeafIndex,

    /// Occurrence of this leaf's symbol within the grammar.
    type_index: global::LeafIndexSize,

    kind: LeafKind,
    span: Span,

    /// Outgoing transitions in decreasing order of AND depth.
    transitions: Vec<Transition>,

    /// Offset into [`Self::transitions`] of the transition that the
    ///   grammar requires next,
    ///     if any.
    required: Option<usize>,

    is_final: bool,
    or_group_member: bool,
    inherently_optional: bool,
    and_membership: Option<AndMembership>,
    text_transition: TextTransition,
}

impl Leaf {
    fn new(
        index: LeafIndex,
        type_index: global::LeafIndexSize,
        kind: LeafKind,
        span: Span,
    ) -> Self {
        Self {
            index,
            type_index,
            kind,
            span,
            transitions: vec![],
            required: None,
            is_final: false,
            or_group_member: false,
            inherently_optional: false,
            and_membership: None,
            text_transition: TextTransition::None,
        }
    }

    pub fn index(&self) -> LeafIndex {
        self.index
    }

    /// Occurrence number of this leaf's symbol,
    ///   distinguishing multiple leaves of the same element type
    ///   (or multiple text leaves)
    ///   within a single grammar.
    pub fn type_index(&self) -> usize {
        self.type_index as usize
    }

    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    pub fn symbol(&self) -> Option<Symbol> {
        self.kind.symbol()
    }

    /// Whether this leaf matches the given symbol.
    pub fn matches(&self, symbol: Symbol) -> bool {
        self.kind.symbol() == Some(symbol)
    }

    /// Element type matched by this leaf,
    ///   if any.
    pub fn element_type(&self) -> Option<ElementType> {
        match self.kind {
            LeafKind::Element(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The transition required by the grammar from this leaf,
    ///   if any.
    pub fn required_transition(&self) -> Option<&Transition> {
        self.required.and_then(|i| self.transitions.get(i))
    }

    /// Whether content may end at this leaf.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Whether this leaf is a direct member of an OR group.
    pub fn is_or_group_member(&self) -> bool {
        self.or_group_member
    }

    /// Whether this leaf may be omitted,
    ///   which is always the case for text.
    pub fn is_inherently_optional(&self) -> bool {
        self.inherently_optional
    }

    /// Innermost AND group containing this leaf,
    ///   if any.
    pub fn and_membership(&self) -> Option<AndMembership> {
        self.and_membership
    }

    pub fn text_transition(&self) -> TextTransition {
        self.text_transition
    }
}

/// An immutable compiled content model.
///
/// Models are compiled once per element declaration and shared by every
///   element of that type;
///     wrap in an [`Arc`](std::sync::Arc) to share across threads.
#[derive(Debug, PartialEq, Eq)]
pub struct CompiledModel {
    /// Leaves by [`LeafIndex`],
    ///   beginning with the initial pseudo-leaf.
    leaves: Vec<Leaf>,

    /// AND group descriptors by [`AndGroupId`].
    and_groups: Vec<AndGroup>,

    and_state_size: usize,
    contains_text: bool,

    /// Span of the root of the grammar.
    span: Span,
}

assert_impl_all!(CompiledModel: Send, Sync);

impl CompiledModel {
    /// The initial pseudo-leaf,
    ///   where matching begins.
    pub fn initial_position(&self) -> &Leaf {
        self.leaf_at(LeafIndex::INITIAL)
    }

    /// Number of AND group member slots required by match states.
    pub fn and_state_size(&self) -> usize {
        self.and_state_size
    }

    /// Whether the grammar contains any text (`#PCDATA`) leaf.
    pub fn contains_text(&self) -> bool {
        self.contains_text
    }

    pub fn leaf(&self, index: LeafIndex) -> Option<&Leaf> {
        self.leaves.get(index.index())
    }

    /// All leaves in index order,
    ///   beginning with the initial pseudo-leaf.
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Number of leaves,
    ///   including the initial pseudo-leaf.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn and_group(&self, id: AndGroupId) -> Option<&AndGroup> {
        self.and_groups.get(id.index())
    }

    pub fn and_groups(&self) -> &[AndGroup] {
        &self.and_groups
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Leaf that is known to exist because its index was produced by this
    ///   model.
    pub(crate) fn leaf_at(&self, index: LeafIndex) -> &Leaf {
        match self.leaves.get(index.index()) {
            Some(leaf) => leaf,
            None => panic!(
                "internal error: {index} is not a leaf of this model \
                 ({} leaves)",
                self.leaves.len()
            ),
        }
    }

    /// AND group that is known to exist because its id was produced by
    ///   this model.
    pub(crate) fn group_at(&self, id: AndGroupId) -> &AndGroup {
        match self.and_groups.get(id.index()) {
            Some(group) => group,
            None => panic!(
                "internal error: AND group {} is not part of this model",
                id.index()
            ),
        }
    }
}

/// Result of [`compile`].
#[derive(Debug)]
pub struct Compiled {
    pub model: CompiledModel,

    /// Ambiguities discovered while compiling,
    ///   in order of discovery.
    pub ambiguities: Vec<AmbiguityRecord>,

    /// Whether the grammar contains text that is not permitted at every
    ///   position.
    ///
    /// This is never set for grammars that do not contain text.
    pub text_unreachable: bool,
}

impl Compiled {
    /// Warning describing [`Self::text_unreachable`],
    ///   if set.
    pub fn text_unreachable_warning(&self) -> Option<TextUnreachable> {
        self.text_unreachable
            .then(|| TextUnreachable::new(self.model.span()))
    }
}
