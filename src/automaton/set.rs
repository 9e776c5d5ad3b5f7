// First and last sets of grammar nodes
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

//! Sets of leaves that may begin and end a grammar node.

use super::LeafIndex;

/// Leaves that may begin a grammar node.
///
/// At most one of these leaves may be _required_,
///   meaning that the node cannot begin any other way;
///     this is the basis of start tag omission.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub(super) struct FirstSet {
    leaves: Vec<LeafIndex>,
    required: Option<usize>,
}

impl FirstSet {
    /// A set containing only `leaf`,
    ///   which is required.
    pub fn required(leaf: LeafIndex) -> Self {
        Self {
            leaves: vec![leaf],
            required: Some(0),
        }
    }

    /// Offset of the required leaf,
    ///   if any.
    pub fn required_offset(&self) -> Option<usize> {
        self.required
    }

    pub fn set_not_required(&mut self) {
        self.required = None;
    }

    /// Add all leaves of `other` to this set,
    ///   carrying over its required leaf.
    pub fn append(&mut self, other: &FirstSet) {
        if let Some(offset) = other.required {
            debug_assert!(
                self.required.is_none(),
                "internal error: FirstSet already has a required leaf",
            );

            self.required = Some(self.leaves.len() + offset);
        }

        self.leaves.extend_from_slice(&other.leaves);
    }

    pub fn iter(&self) -> impl Iterator<Item = LeafIndex> + '_ {
        self.leaves.iter().copied()
    }
}

/// Leaves that may end a grammar node.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub(super) struct LastSet(Vec<LeafIndex>);

impl LastSet {
    pub fn single(leaf: LeafIndex) -> Self {
        Self(vec![leaf])
    }

    pub fn extend(&mut self, other: &LastSet) {
        self.0.extend_from_slice(&other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = LeafIndex> + '_ {
        self.0.iter().copied()
    }
}
