// AND group match state
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

//! Completion state of AND group members.

use crate::automaton::AndIndex;
use fixedbitset::FixedBitSet;
use std::fmt::{self, Display};

/// One bit per AND group member slot,
///   set once the member has been completed.
///
/// All bits at and above the _high-water mark_ are known to be clear,
///   which keeps clearing and comparison proportional to the slots that
///   have actually been used rather than to the size of the model.
#[derive(Debug, Clone, Default)]
pub struct AndState {
    bits: FixedBitSet,

    /// One past the greatest slot that may be set.
    clear_from: usize,
}

impl AndState {
    /// A clear state with capacity for `size` slots.
    pub fn new(size: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(size),
            clear_from: 0,
        }
    }

    pub fn is_clear(&self, slot: AndIndex) -> bool {
        !self.bits.contains(slot.index())
    }

    pub fn is_set(&self, slot: AndIndex) -> bool {
        !self.is_clear(slot)
    }

    pub fn set(&mut self, slot: AndIndex) {
        let i = slot.index();

        if i >= self.bits.len() {
            self.bits.grow(i + 1);
        }

        self.bits.insert(i);
        self.clear_from = self.clear_from.max(i + 1);
    }

    /// Clear all slots at and above `slot`.
    pub fn clear_from(&mut self, slot: AndIndex) {
        let i = slot.index();

        if i < self.clear_from {
            self.bits.set_range(i..self.clear_from, false);
            self.clear_from = i;
        }
    }

    /// One past the greatest slot that may be set.
    pub fn high_water_mark(&self) -> usize {
        self.clear_from
    }

    /// Slots that are currently set,
    ///   in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = AndIndex> + '_ {
        self.bits.ones().map(AndIndex::from_usize)
    }
}

impl PartialEq for AndState {
    /// Slots at or above both high-water marks are clear in both states
    ///   and need not be compared.
    fn eq(&self, other: &Self) -> bool {
        let hwm = self.clear_from.max(other.clear_from);

        (0..hwm).all(|i| self.bits.contains(i) == other.bits.contains(i))
    }
}

impl Eq for AndState {}

impl Display for AndState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;

        for (i, slot) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{slot}")?;
        }

        write!(f, "}}")
    }
}
