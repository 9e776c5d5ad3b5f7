// SGML content model compilation and validation
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

//! Compilation of SGML element content models into automata,
//!   and incremental validation of document content against them.
//!
//! The system is layered:
//!
//!   - [`model`] is the grammar of a content model as written in an
//!       element declaration,
//!         such as `((TITLE, PARA+) & META?)`;
//!   - [`automaton`] compiles a grammar into an immutable
//!       [`CompiledModel`](automaton::CompiledModel) that may be shared by
//!       any number of documents;
//!   - [`matcher`] advances a [`MatchState`](matcher::MatchState) one
//!       child element or run of text at a time;
//!   - [`validate`] drives match states for each open element of a
//!       document and reports [`ValidateError`](validate::ValidateError)s.
//!
//! AND groups (`&`),
//!   which permit their members in any order,
//!   are supported without expanding them into every permutation;
//!     see [`automaton`] for how this is done.

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod global;

#[macro_use]
extern crate static_assertions;

pub mod automaton;
pub mod diagnose;
pub mod fmt;
pub mod gi;
pub mod matcher;
pub mod model;
pub mod span;
pub mod validate;

mod trace;
