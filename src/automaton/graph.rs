// Graph view of compiled content models
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

//! A [`petgraph`] view of a [`CompiledModel`] for inspection.
//!
//! Matching never uses this view;
//!   it exists so that models can be analyzed with graph algorithms
//!   (e.g. reachability)
//!   and rendered using the DOT graph description language.

use super::{CompiledModel, LeafIndex, LeafKind, Transition};
use crate::global;
use petgraph::{
    dot::Dot,
    graph::{DiGraph, NodeIndex},
};

/// Index size for graph nodes and edges.
pub type ModelGraphIx = global::LeafIndexSize;

/// Graph of leaves and their transitions.
///
/// Node indexes correspond exactly to [`LeafIndex`]es.
pub type ModelGraph = DiGraph<LeafKind, Transition, ModelGraphIx>;

impl CompiledModel {
    /// Produce a graph of this model's leaves and transitions.
    pub fn to_graph(&self) -> ModelGraph {
        let edge_count = self.leaves.iter().map(|l| l.transitions.len()).sum();
        let mut graph = ModelGraph::with_capacity(self.leaves.len(), edge_count);

        for leaf in &self.leaves {
            let node = graph.add_node(leaf.kind);
            debug_assert_eq!(node, Self::node_index(leaf.index));
        }

        for leaf in &self.leaves {
            for t in &leaf.transitions {
                graph.add_edge(
                    Self::node_index(leaf.index),
                    Self::node_index(t.to),
                    *t,
                );
            }
        }

        graph
    }

    /// Node of [`Self::to_graph`] corresponding to the given leaf.
    pub fn node_index(leaf: LeafIndex) -> NodeIndex<ModelGraphIx> {
        NodeIndex::new(leaf.index())
    }

    /// Render this model in the DOT graph description language.
    pub fn to_dot(&self) -> String {
        let graph = self.to_graph();
        format!("{}", Dot::new(&graph))
    }
}
