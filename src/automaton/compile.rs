// Content model compiler
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

//! Compilation of grammar trees into [`CompiledModel`]s.
//!
//! Compilation is a single recursive pass over the grammar followed by a
//!   finishing pass over each leaf.
//!
//! The recursive pass computes,
//!   for every node,
//!   the set of leaves that may begin it ([`FirstSet`]),
//!   the set of leaves that may end it ([`LastSet`]),
//!   and whether it may be omitted entirely.
//! Each connector then links the leaves that end one node to the leaves
//!   that begin the node that may follow it.
//!
//! The finishing pass orders the transitions of each leaf,
//!   prunes those that can never be taken,
//!   detects ambiguities,
//!   and precomputes how text is to be matched.

use super::{
    set::{FirstSet, LastSet},
    AmbiguityRecord, AndDepth, AndGroup, AndGroupId, AndIndex, AndMembership,
    Compiled, CompiledModel, Leaf, LeafIndex, LeafKind, TextTransition,
    Transition,
};
use crate::{
    global,
    model::{Connector, GrammarNode, Occurrence, Symbol},
    span::{Span, UNKNOWN_SPAN},
    trace::{CompileTrace, DefaultTrace},
};
use std::cmp::Reverse;

/// Compile a grammar into a [`CompiledModel`].
///
/// `element_type_count` is the number of distinct element types of the
///   active grammar and is used only to size bookkeeping;
///     element types beyond it are accommodated.
///
/// Compilation never fails.
/// Ambiguities and unreachable text are returned alongside the model as
///   advisory diagnostics;
///     see [`Compiled`].
pub fn compile(root: &GrammarNode, element_type_count: usize) -> Compiled {
    let compiled = Compiler::new(element_type_count).compile(root);

    DefaultTrace::default().trace_compiled(root, &compiled);

    compiled
}

/// Context of a node with respect to its innermost enclosing AND group.
type AndContext = Option<AndMembership>;

/// Sentinel depth for targets that have no kept transition.
const UNSEEN: AndDepth = AndDepth::MAX;

/// Summary of a single analyzed grammar node.
#[derive(Debug, Default)]
struct Analysis {
    first: FirstSet,
    last: LastSet,

    /// Whether the node may match an empty sequence of events.
    optional: bool,
}

impl Analysis {
    /// Analysis of a group with no members,
    ///   which matches only the empty sequence.
    fn empty() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }
}

/// Accumulator threaded through the recursive pass.
struct Compiler {
    /// Leaves by [`LeafIndex`],
    ///   beginning with the initial pseudo-leaf.
    leaves: Vec<Leaf>,

    and_groups: Vec<AndGroup>,

    /// Next [`Leaf::type_index`] for each symbol,
    ///   by [`symbol_slot`].
    next_type_index: Vec<global::LeafIndexSize>,

    and_state_size: usize,
    contains_text: bool,
}

/// Dense slot of a symbol for per-symbol bookkeeping.
///
/// Text occupies slot `0`;
///   element types follow.
fn symbol_slot(kind: LeafKind) -> usize {
    match kind {
        LeafKind::Element(ty) => ty.index() + 1,
        LeafKind::Text | LeafKind::Initial => 0,
    }
}

impl Compiler {
    fn new(element_type_count: usize) -> Self {
        Self {
            leaves: vec![Leaf::new(
                LeafIndex::INITIAL,
                0,
                LeafKind::Initial,
                UNKNOWN_SPAN,
            )],
            and_groups: vec![],
            next_type_index: vec![0; element_type_count + 1],
            and_state_size: 0,
            contains_text: false,
        }
    }

    fn compile(mut self, root: &GrammarNode) -> Compiled {
        let analysis = self.analyze(root, None);

        for leaf in analysis.last.iter() {
            self.leaf_mut(leaf).is_final = true;
        }

        let initial = LastSet::single(LeafIndex::INITIAL);
        let proto = self.context_transition(None);
        self.add_transitions(&initial, &analysis.first, true, proto);

        if analysis.optional {
            self.leaf_mut(LeafIndex::INITIAL).is_final = true;
        }

        let (ambiguities, text_unreachable) = self.finish();

        Compiled {
            model: CompiledModel {
                leaves: self.leaves,
                and_groups: self.and_groups,
                and_state_size: self.and_state_size,
                contains_text: self.contains_text,
                span: root.span(),
            },
            ambiguities,
            text_unreachable: text_unreachable && self.contains_text,
        }
    }

    fn leaf_mut(&mut self, index: LeafIndex) -> &mut Leaf {
        &mut self.leaves[index.index()]
    }

    fn group(&self, id: AndGroupId) -> &AndGroup {
        &self.and_groups[id.index()]
    }

    /// AND depth of transitions produced within `ctx`.
    fn context_depth(&self, ctx: AndContext) -> AndDepth {
        ctx.map(|m| self.group(m.group).depth + 1).unwrap_or(0)
    }

    /// First slot following those allocated to the group of `ctx` and its
    ///   members.
    fn context_clear_from(&self, ctx: AndContext) -> AndIndex {
        ctx.map(|m| {
            let group = self.group(m.group);
            AndIndex::from_usize(group.base.index() + group.member_count())
        })
        .unwrap_or(AndIndex(0))
    }

    /// Prototype of a transition produced by a sequence or repetition
    ///   within `ctx`.
    ///
    /// The target is filled in by [`Self::add_transitions`].
    fn context_transition(&self, ctx: AndContext) -> Transition {
        Transition {
            to: LeafIndex::INITIAL,
            and_depth: self.context_depth(ctx),
            clear_from: self.context_clear_from(ctx),
            require_clear: None,
            set_on_take: None,
            isolated: false,
        }
    }

    /// Add a transition from each leaf of `from` to each leaf of `to`.
    ///
    /// If `maybe_required`,
    ///   the required leaf of `to` becomes the required transition of
    ///   each leaf of `from`.
    fn add_transitions(
        &mut self,
        from: &LastSet,
        to: &FirstSet,
        maybe_required: bool,
        proto: Transition,
    ) {
        for index in from.iter() {
            let leaf = self.leaf_mut(index);

            if maybe_required {
                if let Some(offset) = to.required_offset() {
                    debug_assert!(
                        leaf.required.is_none(),
                        "internal error: {index} already has a required \
                            transition",
                    );

                    leaf.required = Some(leaf.transitions.len() + offset);
                }
            }

            leaf.transitions
                .extend(to.iter().map(|to| Transition { to, ..proto }));
        }
    }

    fn analyze(&mut self, node: &GrammarNode, ctx: AndContext) -> Analysis {
        let occurrence = node.effective_occurrence();

        let mut analysis = match node {
            GrammarNode::Leaf { symbol, span, .. } => {
                self.analyze_leaf(*symbol, occurrence, *span, ctx)
            }

            GrammarNode::Group {
                connector: Connector::Seq,
                children,
                ..
            } => self.analyze_seq(children, ctx),

            GrammarNode::Group {
                connector: Connector::Or,
                children,
                ..
            } => self.analyze_or(children, ctx),

            GrammarNode::Group {
                connector: Connector::And,
                children,
                span,
                ..
            } => self.analyze_and(children, *span, ctx),
        };

        analysis.optional |= occurrence.is_optional();

        if analysis.optional {
            analysis.first.set_not_required();
        }

        // Repetition happens outside of the node's own AND semantics.
        if occurrence.is_repeatable() {
            let proto = self.context_transition(ctx);
            self.add_transitions(
                &analysis.last,
                &analysis.first,
                false,
                proto,
            );
        }

        analysis
    }

    fn analyze_leaf(
        &mut self,
        symbol: Symbol,
        occurrence: Occurrence,
        span: Span,
        ctx: AndContext,
    ) -> Analysis {
        let kind = LeafKind::from(symbol);
        let index = LeafIndex::from_usize(self.leaves.len());

        let slot = symbol_slot(kind);
        if slot >= self.next_type_index.len() {
            self.next_type_index.resize(slot + 1, 0);
        }

        let type_index = self.next_type_index[slot];
        self.next_type_index[slot] += 1;

        if kind == LeafKind::Text {
            self.contains_text = true;
        }

        let mut leaf = Leaf::new(index, type_index, kind, span);
        leaf.and_membership = ctx;
        leaf.inherently_optional = occurrence.is_optional();

        self.leaves.push(leaf);

        Analysis {
            first: FirstSet::required(index),
            last: LastSet::single(index),
            optional: false,
        }
    }

    fn analyze_seq(
        &mut self,
        children: &[GrammarNode],
        ctx: AndContext,
    ) -> Analysis {
        let Some((head, tail)) = children.split_first() else {
            return Analysis::empty();
        };

        let mut acc = self.analyze(head, ctx);
        let proto = self.context_transition(ctx);

        for child in tail {
            let next = self.analyze(child, ctx);

            self.add_transitions(&acc.last, &next.first, true, proto);

            if acc.optional {
                acc.first.append(&next.first);
            }

            if next.optional {
                acc.last.extend(&next.last);
            } else {
                acc.last = next.last;
            }

            acc.optional &= next.optional;
        }

        acc
    }

    fn analyze_or(
        &mut self,
        children: &[GrammarNode],
        ctx: AndContext,
    ) -> Analysis {
        let mut acc = Analysis {
            optional: children.is_empty(),
            ..Default::default()
        };

        for child in children {
            let next = self.analyze(child, ctx);

            if let GrammarNode::Leaf { .. } = child {
                for index in next.first.iter() {
                    self.leaf_mut(index).or_group_member = true;
                }
            }

            acc.first.append(&next.first);
            acc.first.set_not_required();
            acc.last.extend(&next.last);
            acc.optional |= next.optional;
        }

        acc
    }

    fn analyze_and(
        &mut self,
        children: &[GrammarNode],
        span: Span,
        ctx: AndContext,
    ) -> Analysis {
        let depth = self.context_depth(ctx);
        let base = self.context_clear_from(ctx);
        let n = children.len();

        let id = AndGroupId(AndIndex::from_usize(self.and_groups.len()).0);

        self.and_groups.push(AndGroup {
            depth,
            base,
            member_optional: vec![false; n],
            ancestor: ctx,
            span,
        });

        self.and_state_size = self.and_state_size.max(base.index() + n);

        let members = children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let membership = AndMembership {
                    group: id,
                    member: AndIndex::from_usize(i).0,
                };

                self.analyze(child, Some(membership))
            })
            .collect::<Vec<_>>();

        let mut acc = Analysis::empty();

        for (i, member) in members.iter().enumerate() {
            acc.first.append(&member.first);
            acc.first.set_not_required();
            acc.last.extend(&member.last);
            acc.optional &= member.optional;

            self.and_groups[id.index()].member_optional[i] = member.optional;
        }

        let clear_from = AndIndex::from_usize(base.index() + n);

        for (i, from) in members.iter().enumerate() {
            for (j, to) in members.iter().enumerate().filter(|&(j, _)| j != i)
            {
                let proto = Transition {
                    to: LeafIndex::INITIAL,
                    and_depth: depth + 1,
                    clear_from,
                    require_clear: Some(AndIndex::from_usize(base.index() + j)),
                    set_on_take: Some(AndIndex::from_usize(base.index() + i)),
                    isolated: !to.optional,
                };

                self.add_transitions(&from.last, &to.first, false, proto);
            }
        }

        acc
    }

    /// Finish each leaf in index order,
    ///   returning discovered ambiguities and whether text is unreachable
    ///   from any leaf.
    fn finish(&mut self) -> (Vec<AmbiguityRecord>, bool) {
        let mut scratch = Scratch {
            min_depth: vec![UNSEEN; self.leaves.len()],
            slots: vec![None; self.next_type_index.len()],
        };

        let mut ambiguities = vec![];
        let mut text_unreachable = false;

        for i in 0..self.leaves.len() {
            let finished = self.finish_leaf(&self.leaves[i], &mut scratch);

            ambiguities.extend(finished.ambiguities);
            text_unreachable |= finished.text_unreachable;

            let leaf = &mut self.leaves[i];
            leaf.transitions = finished.transitions;
            leaf.required = finished.required;
            leaf.text_transition = finished.text_transition;
        }

        (ambiguities, text_unreachable)
    }

    /// Order and prune the transitions of `leaf`.
    ///
    /// `scratch` must be clear on entry and is cleared again before
    ///   returning.
    fn finish_leaf(&self, leaf: &Leaf, scratch: &mut Scratch) -> Finished {
        let mut order = (0..leaf.transitions.len()).collect::<Vec<_>>();
        order.sort_by_key(|&i| Reverse(leaf.transitions[i].and_depth));

        let mut fin = Finished::default();
        let mut required_kept = false;

        let mut text = TextCoverage::default();

        for &i in &order {
            let t = leaf.transitions[i];
            let min_depth = &mut scratch.min_depth[t.to.index()];

            // Transitions to the same target are only useful if they are
            //   permitted in a shallower AND context.
            if t.and_depth >= *min_depth {
                continue;
            }
            *min_depth = t.and_depth;

            let j = fin.transitions.len();
            fin.transitions.push(t);

            if leaf.required == Some(i) {
                fin.required = Some(j);
                required_kept = true;
            }

            let target = &self.leaves[t.to.index()];
            let slot = symbol_slot(target.kind);

            match leaf.and_membership {
                None => {
                    // AND state is always clear outside of AND groups,
                    //   so the first text transition is the one taken.
                    if target.kind == LeafKind::Text
                        && fin.text_transition == TextTransition::None
                    {
                        fin.text_transition = match target.and_membership {
                            None => TextTransition::Simple(t.to),
                            Some(_) => TextTransition::General,
                        };
                    }

                    if let Some(prev) = scratch.slots[slot] {
                        let prev: Transition = fin.transitions[prev];

                        if prev.to != t.to {
                            fin.ambiguities.push(AmbiguityRecord::new(
                                leaf,
                                &self.leaves[prev.to.index()],
                                target,
                                0,
                            ));
                        }
                    }

                    scratch.slots[slot] = Some(j);
                }

                Some(membership) => {
                    if target.kind == LeafKind::Text {
                        fin.text_transition = TextTransition::General;
                        fin.text_unreachable |=
                            text.cover(self, membership, &t);
                    }

                    match scratch.slots[slot] {
                        Some(prev) => {
                            let prev: Transition = fin.transitions[prev];

                            if prev.to != t.to
                                && (prev.and_depth == t.and_depth
                                    || !prev.isolated)
                            {
                                fin.ambiguities.push(AmbiguityRecord::new(
                                    leaf,
                                    &self.leaves[prev.to.index()],
                                    target,
                                    t.and_depth,
                                ));
                            }

                            if prev.isolated {
                                scratch.slots[slot] = Some(j);
                            }
                        }

                        None => scratch.slots[slot] = Some(j),
                    }
                }
            }
        }

        // A required transition pruned as redundant is replaced by the
        //   kept transition to the same target.
        if let (Some(i), false) = (leaf.required, required_kept) {
            let to = leaf.transitions[i].to;
            fin.required = fin.transitions.iter().position(|t| t.to == to);
        }

        fin.text_unreachable |= match leaf.and_membership {
            None => fin.text_transition == TextTransition::None,
            Some(_) => text.is_incomplete(),
        };

        scratch.reset(&self.leaves, &leaf.transitions);

        fin
    }
}

/// Per-leaf bookkeeping reused across the finishing pass.
struct Scratch {
    /// Smallest AND depth of any kept transition to each leaf.
    min_depth: Vec<AndDepth>,

    /// Offset of the preferred kept transition for each symbol,
    ///   by [`symbol_slot`].
    slots: Vec<Option<usize>>,
}

impl Scratch {
    fn reset(&mut self, leaves: &[Leaf], transitions: &[Transition]) {
        for t in transitions {
            self.min_depth[t.to.index()] = UNSEEN;
            self.slots[symbol_slot(leaves[t.to.index()].kind)] = None;
        }
    }
}

/// Result of finishing a single leaf.
#[derive(Debug, Default)]
struct Finished {
    transitions: Vec<Transition>,
    required: Option<usize>,
    text_transition: TextTransition,
    ambiguities: Vec<AmbiguityRecord>,
    text_unreachable: bool,
}

/// Whether text transitions from a leaf within an AND group cover every
///   context in which text may be required.
#[derive(Debug, Default)]
struct TextCoverage {
    seen: bool,

    /// Depth below which text has not yet been shown to be reachable.
    min_covered: AndDepth,
}

impl TextCoverage {
    /// Account for the text transition `t` from a leaf within
    ///   `membership`,
    ///     returning whether text is unreachable in some context.
    fn cover(
        &mut self,
        compiler: &Compiler,
        membership: AndMembership,
        t: &Transition,
    ) -> bool {
        let depth = t.and_depth;
        let mut unreachable = false;

        if !self.seen {
            self.seen = true;

            // The first text transition must be permitted by the
            //   innermost group that still has required members
            //   outstanding.
            let mut member = Some(membership);

            while let Some(m) = member {
                let group = compiler.group(m.group);

                if group.required_members_except(m.member()).next().is_some()
                {
                    unreachable = depth <= group.depth;
                    break;
                }

                member = group.ancestor;
            }

            if t.isolated {
                self.min_covered = depth;
            }
        } else {
            unreachable = self.min_covered > depth + 1;
            self.min_covered = if t.isolated { depth } else { 0 };
        }

        unreachable
    }

    fn is_incomplete(&self) -> bool {
        !self.seen || self.min_covered > 0
    }
}
