// Tests for content model compilation
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

use super::*;
use crate::{
    diagnose::{Diagnostic, Level},
    model::GrammarNode as G,
    span::dummy::*,
};

const A: ElementType = ElementType::from_index(0);
const B: ElementType = ElementType::from_index(1);
const C: ElementType = ElementType::from_index(2);

const L0: LeafIndex = LeafIndex::INITIAL;
const L1: LeafIndex = LeafIndex(1);
const L2: LeafIndex = LeafIndex(2);
const L3: LeafIndex = LeafIndex(3);
const L4: LeafIndex = LeafIndex(4);

fn sut(root: G) -> Compiled {
    compile(&root, 3)
}

fn targets(model: &CompiledModel, leaf: LeafIndex) -> Vec<LeafIndex> {
    model
        .leaf(leaf)
        .expect("missing leaf")
        .transitions()
        .iter()
        .map(Transition::to)
        .collect()
}

fn leaf(model: &CompiledModel, index: LeafIndex) -> &Leaf {
    model.leaf(index).expect("missing leaf")
}

#[test]
fn seq_links_members_in_order() {
    let Compiled {
        model,
        ambiguities,
        text_unreachable,
    } = sut(G::seq([G::element(A), G::element(B)]));

    assert_eq!(3, model.leaf_count());
    assert_eq!(LeafKind::Initial, model.initial_position().kind());
    assert_eq!(LeafKind::Element(A), leaf(&model, L1).kind());
    assert_eq!(LeafKind::Element(B), leaf(&model, L2).kind());

    assert_eq!(vec![L1], targets(&model, L0));
    assert_eq!(vec![L2], targets(&model, L1));
    assert_eq!(Vec::<LeafIndex>::new(), targets(&model, L2));

    assert!(!model.initial_position().is_final());
    assert!(!leaf(&model, L1).is_final());
    assert!(leaf(&model, L2).is_final());

    // Both members are required.
    assert_eq!(
        Some(L2),
        leaf(&model, L1).required_transition().map(Transition::to)
    );

    assert_eq!(0, model.and_state_size());
    assert!(!model.contains_text());
    assert!(ambiguities.is_empty());
    assert!(!text_unreachable);
}

#[test]
fn leaves_are_numbered_with_per_type_occurrences() {
    let model = sut(G::seq([
        G::element(A),
        G::element(B),
        G::element(A),
        G::text(),
        G::text(),
    ]))
    .model;

    let type_indexes = model
        .leaves()
        .iter()
        .skip(1)
        .map(Leaf::type_index)
        .collect::<Vec<_>>();

    assert_eq!(vec![0, 0, 1, 0, 1], type_indexes);

    assert!(model
        .leaves()
        .iter()
        .enumerate()
        .all(|(i, leaf)| leaf.index().index() == i));
}

#[test]
fn optional_prefix_extends_first_set_and_required_leaf() {
    // (A?, B)
    let model = sut(G::seq([G::element(A).opt(), G::element(B)])).model;
    let initial = model.initial_position();

    assert_eq!(vec![L1, L2], targets(&model, L0));

    // B is the only leaf that cannot be omitted.
    assert_eq!(Some(L2), initial.required_transition().map(Transition::to));
    assert!(leaf(&model, L1).is_inherently_optional());
    assert!(!leaf(&model, L2).is_inherently_optional());
}

#[test]
fn optional_root_makes_initial_final() {
    let model = sut(G::seq([G::element(A).opt(), G::element(B).rep()])).model;

    assert!(model.initial_position().is_final());
    assert!(leaf(&model, L1).is_final());
    assert!(leaf(&model, L2).is_final());

    // Nothing is required.
    assert_eq!(None, model.initial_position().required_transition());
}

#[test]
fn repetition_loops_from_last_to_first() {
    // (A, B)+
    let model = sut(G::seq([G::element(A), G::element(B)]).plus()).model;

    assert_eq!(vec![L1], targets(&model, L2));

    // Repetition is never required.
    assert_eq!(None, leaf(&model, L2).required_transition());
    assert_eq!(
        Some(L1),
        model.initial_position().required_transition().map(Transition::to)
    );
}

#[test]
fn redundant_transitions_to_same_target_are_pruned() {
    // (A*)*
    let Compiled {
        model, ambiguities, ..
    } = sut(G::seq([G::element(A).rep()]).rep());

    assert_eq!(vec![L1], targets(&model, L1));
    assert!(ambiguities.is_empty());
}

#[test]
fn or_members_are_flagged_and_not_required() {
    // (A | (B, C))
    let model =
        sut(G::or([G::element(A), G::seq([G::element(B), G::element(C)])]))
            .model;

    assert!(leaf(&model, L1).is_or_group_member());
    assert!(!leaf(&model, L2).is_or_group_member());
    assert!(!leaf(&model, L3).is_or_group_member());

    assert_eq!(vec![L1, L2], targets(&model, L0));
    assert_eq!(None, model.initial_position().required_transition());

    assert!(leaf(&model, L1).is_final());
    assert!(!leaf(&model, L2).is_final());
    assert!(leaf(&model, L3).is_final());
}

#[test]
fn shared_prefix_is_ambiguous() {
    // ((A, B) | (A, C))
    let Compiled {
        model, ambiguities, ..
    } = sut(G::or([
        G::seq([G::element(A).with_span(S1), G::element(B)]),
        G::seq([G::element(A).with_span(S2), G::element(C)]),
    ]));

    assert_eq!(vec![L1, L3], targets(&model, L0));

    assert_eq!(1, ambiguities.len());

    let amb = &ambiguities[0];
    assert_eq!(L0, amb.from());
    assert_eq!((L1, L3), amb.candidates());
    assert_eq!(0, amb.and_depth());
    assert_eq!(Symbol::Element(A), amb.symbol());

    assert_eq!(Level::Warning, amb.level());
    let spans = amb.describe();
    assert_eq!(S1, spans[1].span());
    assert_eq!(S2, spans[2].span());
}

#[test]
fn distinct_types_after_shared_leaf_are_not_ambiguous() {
    // (A, (B | C))
    let ambiguities = sut(G::seq([
        G::element(A),
        G::or([G::element(B), G::element(C)]),
    ]))
    .ambiguities;

    assert!(ambiguities.is_empty());
}

#[test]
fn and_group_transitions_carry_member_slots() {
    // (A & B)
    let Compiled {
        model, ambiguities, ..
    } = sut(G::and([G::element(A), G::element(B)]));

    assert_eq!(2, model.and_state_size());
    assert!(ambiguities.is_empty());

    let group = model.and_group(AndGroupId(0)).expect("missing group");
    assert_eq!(0, group.depth());
    assert_eq!(2, group.member_count());
    assert_eq!(None, group.ancestor());

    assert_eq!(
        leaf(&model, L1).transitions(),
        &[Transition {
            to: L2,
            and_depth: 1,
            clear_from: AndIndex(2),
            require_clear: Some(AndIndex(1)),
            set_on_take: Some(AndIndex(0)),
            isolated: true,
        }],
    );

    assert_eq!(
        leaf(&model, L2).transitions(),
        &[Transition {
            to: L1,
            and_depth: 1,
            clear_from: AndIndex(2),
            require_clear: Some(AndIndex(0)),
            set_on_take: Some(AndIndex(1)),
            isolated: true,
        }],
    );

    // Members may appear in either order,
    //   and so neither is required first.
    assert_eq!(vec![L1, L2], targets(&model, L0));
    assert_eq!(None, model.initial_position().required_transition());

    let membership = leaf(&model, L2).and_membership().expect("not in group");
    assert_eq!(AndGroupId(0), membership.group());
    assert_eq!(1, membership.member());
}

#[test]
fn optional_and_member_transitions_are_not_isolated() {
    // (A & B?)
    let model = sut(G::and([G::element(A), G::element(B).opt()])).model;

    assert!(!leaf(&model, L1).transitions()[0].is_isolated());
    assert!(leaf(&model, L2).transitions()[0].is_isolated());

    let group = model.and_group(AndGroupId(0)).expect("missing group");
    assert!(!group.is_member_optional(0));
    assert!(group.is_member_optional(1));
}

#[test]
fn nested_and_groups_allocate_consecutive_slots() {
    // ((A & B) & C)
    let model = sut(G::and([
        G::and([G::element(A), G::element(B)]),
        G::element(C),
    ]))
    .model;

    assert_eq!(4, model.and_state_size());

    let outer = model.and_group(AndGroupId(0)).expect("missing outer");
    let inner = model.and_group(AndGroupId(1)).expect("missing inner");

    assert_eq!(0, outer.depth());
    assert_eq!(AndIndex(0), outer.member_slot(0));

    assert_eq!(1, inner.depth());
    assert_eq!(AndIndex(2), inner.member_slot(0));
    assert_eq!(AndIndex(3), inner.member_slot(1));
    assert_eq!(
        Some(0),
        inner.ancestor().map(|m| m.member()),
        "inner group is the first member of the outer group",
    );

    // A may continue within the inner group (deeper) or leave it for C
    //   (shallower);
    //     deeper transitions come first.
    let a = leaf(&model, L1);
    let depths = a
        .transitions()
        .iter()
        .map(|t| (t.to(), t.and_depth()))
        .collect::<Vec<_>>();
    assert_eq!(vec![(L2, 2), (L3, 1)], depths);

    // Leaving the inner group clears the slots of the inner group.
    assert_eq!(AndIndex(4), a.transitions()[0].clear_from());
    assert_eq!(AndIndex(2), a.transitions()[1].clear_from());
}

#[test]
fn and_group_within_seq_context() {
    // (C, (A & B))
    let model = sut(G::seq([
        G::element(C),
        G::and([G::element(A), G::element(B)]),
    ]))
    .model;

    let group = model.and_group(AndGroupId(0)).expect("missing group");
    assert_eq!(0, group.depth());
    assert_eq!(AndIndex(0), group.member_slot(0));

    // The sequence transition is outside of any AND context.
    let c = leaf(&model, L1);
    assert!(c.transitions().iter().all(|t| t.and_depth() == 0));
    assert_eq!(vec![L2, L3], targets(&model, L1));
}

#[test]
fn mixed_content_reachable_everywhere() {
    // (#PCDATA | A)*
    let Compiled {
        model,
        text_unreachable,
        ..
    } = sut(G::or([G::text(), G::element(A)]).rep());

    assert!(model.contains_text());
    assert!(!text_unreachable);

    for leaf in model.leaves() {
        assert_eq!(TextTransition::Simple(L1), leaf.text_transition());
    }
}

#[test]
fn text_unreachable_from_some_position() {
    // (A, #PCDATA)
    let compiled = sut(G::seq([G::element(A), G::text()]).with_span(S4));

    assert!(compiled.text_unreachable);
    assert_eq!(
        TextTransition::None,
        compiled.model.initial_position().text_transition()
    );

    let warning = compiled
        .text_unreachable_warning()
        .expect("missing text warning");

    assert_eq!(Level::Warning, warning.level());
    assert_eq!(S4, warning.describe()[0].span());
}

#[test]
fn text_unreachable_never_set_without_text() {
    // (A, B) has no text transitions anywhere.
    let compiled = sut(G::seq([G::element(A), G::element(B)]));

    assert!(!compiled.text_unreachable);
    assert_eq!(None, compiled.text_unreachable_warning());
}

#[test]
fn text_within_and_group_requires_general_search() {
    // (A & #PCDATA)
    let compiled = sut(G::and([G::element(A), G::text()]));

    assert!(!compiled.text_unreachable);
    assert_eq!(
        TextTransition::General,
        compiled.model.initial_position().text_transition()
    );
    assert_eq!(
        TextTransition::General,
        leaf(&compiled.model, L1).text_transition()
    );
    assert_eq!(
        TextTransition::General,
        leaf(&compiled.model, L2).text_transition()
    );

    // The text member may be omitted.
    let group = compiled.model.and_group(AndGroupId(0)).expect("no group");
    assert!(!group.is_member_optional(0));
    assert!(group.is_member_optional(1));
}

#[test]
fn text_leaf_is_optional_and_repeats() {
    // (#PCDATA)
    let Compiled {
        model,
        text_unreachable,
        ..
    } = sut(G::seq([G::text()]));

    assert!(model.initial_position().is_final());
    assert!(leaf(&model, L1).is_inherently_optional());
    assert!(leaf(&model, L1).is_final());

    assert_eq!(vec![L1], targets(&model, L0));
    assert_eq!(vec![L1], targets(&model, L1));
    assert_eq!(
        TextTransition::Simple(L1),
        leaf(&model, L1).text_transition()
    );

    assert!(!text_unreachable);
}

#[test]
fn text_never_provides_required_transition() {
    // (#PCDATA, A)
    let model = sut(G::seq([G::text(), G::element(A)])).model;

    assert_eq!(vec![L1, L2], targets(&model, L0));
    assert_eq!(
        Some(L2),
        model.initial_position().required_transition().map(Transition::to)
    );
    assert_eq!(
        Some(L2),
        leaf(&model, L1).required_transition().map(Transition::to)
    );
}

#[test]
fn and_ambiguity_at_equal_depth() {
    // ((A, B?) & B)
    let Compiled {
        model, ambiguities, ..
    } = sut(G::and([
        G::seq([G::element(A), G::element(B).opt()]),
        G::element(B),
    ]));

    // From A,
    //   B may continue the first member or begin the second,
    //   both within the group.
    assert_eq!(vec![L2, L3], targets(&model, L1));

    assert_eq!(1, ambiguities.len());

    let amb = &ambiguities[0];
    assert_eq!(L1, amb.from());
    assert_eq!((L2, L3), amb.candidates());
    assert_eq!(1, amb.and_depth());
    assert_eq!(Symbol::Element(B), amb.symbol());
}

#[test]
fn and_no_ambiguity_after_isolated_transition() {
    // ((A & B), B)
    let Compiled {
        model, ambiguities, ..
    } = sut(G::seq([
        G::and([G::element(A), G::element(B)]),
        G::element(B),
    ]));

    // The deeper transition to the required member is taken only while
    //   that member is outstanding,
    //     and the shallower one only after it has been completed.
    let a = leaf(&model, L1);
    assert_eq!(vec![L2, L3], targets(&model, L1));
    assert!(a.transitions()[0].is_isolated());
    assert_eq!(
        vec![1, 0],
        a.transitions()
            .iter()
            .map(Transition::and_depth)
            .collect::<Vec<_>>()
    );

    assert!(ambiguities.is_empty());
}

#[test]
fn and_ambiguity_after_optional_member() {
    // ((A & B?), B)
    let Compiled {
        model, ambiguities, ..
    } = sut(G::seq([
        G::and([G::element(A), G::element(B).opt()]),
        G::element(B),
    ]));

    // B may either complete the group or follow it.
    assert_eq!(vec![L2, L3], targets(&model, L1));
    assert!(!leaf(&model, L1).transitions()[0].is_isolated());

    assert_eq!(1, ambiguities.len());

    let amb = &ambiguities[0];
    assert_eq!(L1, amb.from());
    assert_eq!((L2, L3), amb.candidates());
    assert_eq!(0, amb.and_depth());
}

/// `((((#PCDATA, A) & (#PCDATA, B)) & outer), #PCDATA)`
fn nested_text_coverage(outer: G) -> G {
    G::seq([
        G::and([
            G::and([
                G::seq([G::text(), G::element(A)]),
                G::seq([G::text(), G::element(B)]),
            ]),
            outer,
        ]),
        G::text(),
    ])
}

/// Depths of the text transitions of `index`.
fn text_depths(model: &CompiledModel, index: LeafIndex) -> Vec<AndDepth> {
    leaf(model, index)
        .transitions()
        .iter()
        .filter(|t| leaf(model, t.to()).kind() == LeafKind::Text)
        .map(Transition::and_depth)
        .collect()
}

#[test]
fn text_coverage_skipping_an_and_depth_is_unreachable() {
    let compiled = sut(nested_text_coverage(G::element(C)));

    // Having completed the inner group with A,
    //   and with C outstanding,
    //   text is permitted neither within the outer group nor after it.
    assert_eq!(vec![2, 0], text_depths(&compiled.model, L2));
    assert!(compiled.text_unreachable);
}

#[test]
fn text_coverage_at_every_and_depth_is_reachable() {
    let compiled = sut(nested_text_coverage(G::seq([
        G::text(),
        G::element(C),
    ])));

    assert_eq!(vec![2, 1, 0], text_depths(&compiled.model, L2));
    assert!(!compiled.text_unreachable);
}

#[test]
fn element_types_beyond_count_are_accommodated() {
    let far = ElementType::from_index(40);

    let compiled = compile(&G::seq([G::element(far), G::element(far)]), 0);

    assert_eq!(1, leaf(&compiled.model, L2).type_index());
    assert!(compiled.ambiguities.is_empty());
}

#[test]
fn empty_groups_match_nothing() {
    let compiled = sut(G::seq(Vec::<G>::new()));

    assert_eq!(1, compiled.model.leaf_count());
    assert!(compiled.model.initial_position().is_final());
    assert!(compiled.model.initial_position().transitions().is_empty());
}

#[test]
fn graph_view_mirrors_leaves() {
    use petgraph::algo::has_path_connecting;

    // (A, (B | C))
    let model = sut(G::seq([
        G::element(A),
        G::or([G::element(B), G::element(C)]),
    ]))
    .model;

    let graph = model.to_graph();

    assert_eq!(4, graph.node_count());
    assert_eq!(3, graph.edge_count());
    assert_eq!(
        Some(&LeafKind::Element(C)),
        graph.node_weight(CompiledModel::node_index(L3))
    );

    assert!(has_path_connecting(
        &graph,
        CompiledModel::node_index(L0),
        CompiledModel::node_index(L3),
        None,
    ));
    assert!(!has_path_connecting(
        &graph,
        CompiledModel::node_index(L2),
        CompiledModel::node_index(L3),
        None,
    ));

    assert!(model.to_dot().starts_with("digraph {"));
}

#[test]
fn compiled_model_leaf_lookup_out_of_range() {
    let model = sut(G::element(A)).model;

    assert!(model.leaf(L1).is_some());
    assert!(model.leaf(L4).is_none());
    assert!(model.and_group(AndGroupId(0)).is_none());
}
