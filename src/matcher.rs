// Content model matching
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

//! Incremental matching of content against a [`CompiledModel`].
//!
//! Each open element of a document owns a [`MatchState`] for the model of
//!   its element type.
//! As each child element or run of text is encountered,
//!   the state is advanced by a single transition;
//!     a transition that is not permitted leaves the state untouched and
//!     is reported as `false`,
//!       which is an ordinary outcome and not an error.
//!
//! ```
//! use cmodel::{automaton::compile, gi::ElementTypes, matcher::MatchState};
//! use cmodel::model::GrammarNode as G;
//!
//! let mut types = ElementTypes::new();
//! let (a, b) = (types.intern("A"), types.intern("B"));
//!
//! // (A, B)
//! let compiled = compile(&G::seq([G::element(a), G::element(b)]), types.len());
//! let mut state = MatchState::new(&compiled.model);
//!
//! assert!(!state.try_transition(b));
//! assert!(state.try_transition(a));
//! assert!(!state.is_finished());
//! assert!(state.try_transition(b));
//! assert!(state.is_finished());
//! ```
//!
//! Match states are small values that are cheap to clone and compare,
//!   so that callers may speculatively attempt transitions and roll back
//!   to a saved state.

use crate::{
    automaton::{
        AndDepth, CompiledModel, Leaf, LeafIndex, TextTransition, Transition,
    },
    gi::ElementType,
    model::Symbol,
};
use std::{
    fmt::{self, Debug, Display},
    ptr,
};

mod and_state;


pub use and_state::AndState;

/// Position of an open element within its content model.
///
/// The state consists of the current [`Leaf`],
///   the [`AndState`] of AND group members,
///   and the minimum AND depth that a transition must have to be taken
///     (which is non-zero while required members of an enclosing AND
///     group are still outstanding).
#[derive(Clone)]
pub struct MatchState<'m> {
    model: &'m CompiledModel,
    pos: LeafIndex,
    and_state: AndState,
    min_and_depth: AndDepth,
}

impl<'m> MatchState<'m> {
    /// A new state at the initial position of `model`.
    pub fn new(model: &'m CompiledModel) -> Self {
        Self {
            model,
            pos: LeafIndex::INITIAL,
            and_state: AndState::new(model.and_state_size()),
            min_and_depth: 0,
        }
    }

    pub fn model(&self) -> &'m CompiledModel {
        self.model
    }

    /// Leaf most recently matched,
    ///   or the initial pseudo-leaf if nothing has yet been matched.
    pub fn current_position(&self) -> &'m Leaf {
        self.model.leaf_at(self.pos)
    }

    /// Minimum AND depth of the next transition.
    pub fn min_and_depth(&self) -> AndDepth {
        self.min_and_depth
    }

    pub fn and_state(&self) -> &AndState {
        &self.and_state
    }

    /// Attempt to match an element of type `ty`.
    ///
    /// If no transition is permitted,
    ///   the state is left unchanged and `false` is returned.
    pub fn try_transition(&mut self, ty: ElementType) -> bool {
        self.try_symbol(Symbol::Element(ty))
    }

    /// Attempt to match text.
    ///
    /// Most leaves are able to resolve text without searching their
    ///   transitions;
    ///     see [`TextTransition`].
    pub fn try_transition_text(&mut self) -> bool {
        match self.current_position().text_transition() {
            TextTransition::None => false,

            TextTransition::Simple(to) => {
                self.pos = to;
                self.min_and_depth = self.compute_min_and_depth();
                true
            }

            TextTransition::General => self.try_symbol(Symbol::Text),
        }
    }

    /// Whether content may end in this state.
    pub fn is_finished(&self) -> bool {
        self.current_position().is_final() && self.min_and_depth == 0
    }

    /// Element type whose start tag the grammar requires next,
    ///   if any.
    ///
    /// This is the basis of start tag omission:
    ///   the required element may be inferred without its start tag
    ///   using [`Self::do_required_transition`].
    pub fn implied_start_tag(&self) -> Option<ElementType> {
        self.required_transition()
            .and_then(|t| self.model.leaf_at(t.to()).element_type())
    }

    /// Take the transition required by the grammar.
    ///
    /// Panics
    /// ======
    /// If there is no required transition from the current leaf.
    /// Callers must first consult [`Self::implied_start_tag`].
    pub fn do_required_transition(&mut self) {
        match self.current_position().required_transition() {
            Some(t) => self.take(*t),
            None => panic!(
                "internal error: no required transition from {} \
                    (check implied_start_tag before do_required_transition)",
                self.pos,
            ),
        }
    }

    /// Symbols that may be matched from this state,
    ///   in transition order and without duplicates.
    ///
    /// This is intended for diagnostics and is not optimized.
    pub fn possible_transitions(&self) -> Vec<Symbol> {
        let mut symbols = Vec::new();

        self.legal_transitions()
            .filter_map(|t| self.model.leaf_at(t.to()).symbol())
            .for_each(|symbol| {
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            });

        symbols
    }

    /// Leaf that would become impossible to satisfy if elements of type
    ///   `ty` were excluded from this point,
    ///     if any.
    ///
    /// This is the leaf that `ty` would match if it is neither inherently
    ///   optional nor a member of an OR group,
    ///     meaning that the grammar offers no alternative to it.
    pub fn invalid_exclusion(&self, ty: ElementType) -> Option<&'m Leaf> {
        self.find(Symbol::Element(ty))
            .map(|t| self.model.leaf_at(t.to()))
            .filter(|leaf| {
                !leaf.is_inherently_optional() && !leaf.is_or_group_member()
            })
    }

    fn try_symbol(&mut self, symbol: Symbol) -> bool {
        match self.find(symbol) {
            Some(t) => {
                self.take(t);
                true
            }
            None => false,
        }
    }

    /// First legal transition to a leaf matching `symbol`.
    fn find(&self, symbol: Symbol) -> Option<Transition> {
        self.legal_transitions()
            .find(|t| self.model.leaf_at(t.to()).matches(symbol))
    }

    fn legal_transitions(&self) -> impl Iterator<Item = Transition> + '_ {
        self.current_position()
            .transitions()
            .iter()
            .copied()
            .filter(|t| self.is_legal(t))
    }

    fn is_legal(&self, t: &Transition) -> bool {
        t.require_clear()
            .map_or(true, |slot| self.and_state.is_clear(slot))
            && t.and_depth() >= self.min_and_depth
    }

    fn required_transition(&self) -> Option<&'m Transition> {
        self.current_position()
            .required_transition()
            .filter(|t| self.is_legal(t))
    }

    fn take(&mut self, t: Transition) {
        if let Some(slot) = t.set_on_take() {
            self.and_state.set(slot);
        }

        self.and_state.clear_from(t.clear_from());
        self.pos = t.to();
        self.min_and_depth = self.compute_min_and_depth();
    }

    /// Minimum AND depth required of the next transition from the current
    ///   leaf.
    ///
    /// Walking outward from the innermost AND group containing the leaf,
    ///   the first group with a required member that has not been
    ///   completed
    ///     (other than the member containing the walk)
    ///   must be completed before leaving that group,
    ///     and so transitions must be at least as deep as its members.
    fn compute_min_and_depth(&self) -> AndDepth {
        let mut membership = self.current_position().and_membership();

        while let Some(m) = membership {
            let group = self.model.group_at(m.group());

            let outstanding = group
                .required_members_except(m.member())
                .any(|i| self.and_state.is_clear(group.member_slot(i)));

            if outstanding {
                return group.depth() + 1;
            }

            membership = group.ancestor();
        }

        0
    }
}

impl<'m> PartialEq for MatchState<'m> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.model, other.model)
            && self.pos == other.pos
            && self.and_state == other.and_state
            && self.min_and_depth == other.min_and_depth
    }
}

impl<'m> Eq for MatchState<'m> {}

impl<'m> Debug for MatchState<'m> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The model is shared by every state and would otherwise dominate
        //   the output of traces.
        f.debug_struct("MatchState")
            .field(
                "model",
                &format_args!("[{} leaves]", self.model.leaf_count()),
            )
            .field("pos", &self.pos)
            .field("and_state", &self.and_state)
            .field("min_and_depth", &self.min_and_depth)
            .finish()
    }
}

impl<'m> Display for MatchState<'m> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at {} {} (AND state {}, min AND depth {})",
            self.pos,
            self.current_position().kind(),
            self.and_state,
            self.min_and_depth,
        )
    }
}
