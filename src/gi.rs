// Element types (generic identifiers)
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

//! Element types and their generic identifiers.
//!
//! In SGML,
//!   the name of an element type is its _generic identifier_ (GI).
//! Content models reference element types by [`ElementType`],
//!   which is a dense index into the [`ElementTypes`] table of the active
//!   grammar;
//!     the number of distinct element types sizes the bookkeeping of the
//!     [automaton compiler](crate::automaton::compile).
//!
//! ```
//! use cmodel::gi::ElementTypes;
//!
//! let mut types = ElementTypes::new();
//!
//! let title = types.intern("TITLE");
//! let para = types.intern("PARA");
//!
//! assert_eq!(title, types.intern("TITLE"));
//! assert_ne!(title, para);
//! assert_eq!(2, types.len());
//!
//! assert_eq!(Some("PARA"), types.name(para));
//! assert_eq!(Some(para), types.lookup("PARA"));
//! assert_eq!(None, types.lookup("META"));
//! ```
//!
//! Case folding of names
//!   (SGML's `NAMECASE GENERAL`)
//!   is the responsibility of the tokenizer;
//!     names are interned exactly as given.

use crate::global;
use bumpalo::Bump;
use fxhash::FxHashMap;
use std::fmt::Display;

/// Size of the index held by an [`ElementType`].
pub type ElementTypeSize = global::ElementTypeSize;

/// A reference to an element type of the active grammar.
///
/// Element types are dense indexes beginning at `0`,
///   allocated by [`ElementTypes::intern`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct ElementType(ElementTypeSize);

assert_eq_size!(ElementType, u32);

impl ElementType {
    /// Element type for the given dense index.
    ///
    /// This is intended for callers that maintain their own element type
    ///   tables;
    ///     see [`ElementTypes`] for an interner that allocates these.
    pub const fn from_index(index: ElementTypeSize) -> Self {
        Self(index)
    }

    /// Dense index of this element type.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for ElementType {
    /// Element types do not know their own names;
    ///   use [`ElementTypes::name`] where a name is available.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Table of element types,
///   interning generic identifiers as [`ElementType`]s.
///
/// Names are stored in an [arena](bumpalo) and are never freed until the
///   table itself is dropped,
///     which matches the lifetime of a grammar.
/// Lookups use the [Fx Hash][fxhash] hashing function,
///   since denial of service is not a concern for names coming from a DTD.
pub struct ElementTypes {
    /// Storage for interned names.
    arena: Bump,

    /// Interned names by [`ElementType`] index.
    ///
    /// These string slices are stored in `arena` and must never escape
    ///   this struct with a lifetime longer than `&self`.
    names: Vec<&'static str>,

    /// Map of interned names to their respective [`ElementType`].
    map: FxHashMap<&'static str, ElementType>,
}

impl ElementTypes {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Initialize a new table with an initial capacity for the underlying
    ///   map.
    ///
    /// The given `capacity` has no affect on arena allocation.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Bump::new(),
            names: Vec::with_capacity(capacity),
            map: FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            ),
        }
    }

    /// Intern a name or return its existing [`ElementType`].
    ///
    /// Panics
    /// ======
    /// If more than [`ElementTypeSize`] element types are interned.
    /// No DTD is expected to come anywhere near this limit.
    pub fn intern(&mut self, name: &str) -> ElementType {
        if let Some(ty) = self.map.get(name) {
            return *ty;
        }

        let ty = match ElementTypeSize::try_from(self.names.len()) {
            Ok(index) => ElementType(index),
            Err(_) => panic!("internal error: ElementType range exhausted"),
        };

        let stored = self.copy_into_arena(name);

        self.names.push(stored);
        self.map.insert(stored, ty);

        ty
    }

    /// Retrieve the [`ElementType`] of an existing name without interning.
    pub fn lookup(&self, name: &str) -> Option<ElementType> {
        self.map.get(name).copied()
    }

    /// Generic identifier of the given element type,
    ///   if it was allocated by this table.
    pub fn name(&self, ty: ElementType) -> Option<&str> {
        self.names.get(ty.index()).copied()
    }

    /// Number of distinct element types.
    ///
    /// This is the `element_type_count` expected by
    ///   [`compile`](crate::automaton::compile).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over all element types in order of allocation.
    pub fn iter(&self) -> impl Iterator<Item = (ElementType, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (ElementType(i as ElementTypeSize), *name))
    }

    /// Wrap an element type such that it displays as its name,
    ///   falling back to its index if it was not allocated by this table.
    pub fn display(&self, ty: ElementType) -> DisplayElementType {
        DisplayElementType(self.name(ty), ty)
    }

    fn copy_into_arena(&self, value: &str) -> &'static str {
        // The arena is never reset and is owned by `self`,
        //   and its chunks do not move even if `self` does;
        //     slices are only ever handed out bounded by `&self`.
        unsafe { &*(self.arena.alloc_str(value) as *const str) }
    }
}

impl Default for ElementTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ElementTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ElementTypes").field(&self.names).finish()
    }
}

/// An [`ElementType`] that displays as its generic identifier.
///
/// See [`ElementTypes::display`].
#[derive(Debug, Clone, Copy)]
pub struct DisplayElementType<'a>(Option<&'a str>, ElementType);

impl<'a> Display for DisplayElementType<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self(Some(name), _) => write!(f, "{name}"),
            Self(None, ty) => Display::fmt(ty, f),
        }
    }
}
