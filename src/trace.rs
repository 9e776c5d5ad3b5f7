// Tracing of compilation and validation
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

//! Tracing for compilation and validation.
//!
//! This provides human-readable traces on standard error any time a
//!   content model is compiled or an event is fed to a
//!   [`Validator`](crate::validate::Validator).
//! These traces are provided automatically when `cfg(test)`,
//!   which means that they are automatically included in the output of any
//!   test failure.
//!
//! Outside of tests,
//!   this can be enabled using the `matcher-trace-stderr` feature flag
//!     (`cargo build --features matcher-trace-stderr`).
//!
//! _These traces are not meant to be machine-readable!_
//! Do not try to use the human-readable traces in that way since the format
//!   is subject to change without notice;
//!     use [`CompiledModel::to_graph`](crate::automaton::CompiledModel)
//!     to inspect models programmatically.

use crate::{
    automaton::Compiled,
    model::GrammarNode,
    validate::{Event, ValidateError},
};
use std::fmt::{Debug, Display};

/// Trace used unless configured otherwise.
#[cfg(not(any(test, feature = "matcher-trace-stderr")))]
pub(crate) type DefaultTrace = VoidTrace;

/// Trace used unless configured otherwise.
#[cfg(any(test, feature = "matcher-trace-stderr"))]
pub(crate) type DefaultTrace = HumanReadableTrace;

pub(crate) trait CompileTrace: Default {
    /// Output a summary of a newly compiled model.
    ///
    /// There is no means to return an error and a failure to output the
    ///   trace should not interrupt processing.
    fn trace_compiled(&mut self, root: &GrammarNode, compiled: &Compiled);
}

pub(crate) trait ValidatorTrace: Default {
    /// Output the upper portion of an event trace.
    ///
    /// This begins the trace with information about the current state of
    ///   the validator and the event that was received.
    /// Post-event tracing is handled by [`Self::trace_event_end`].
    fn trace_event_begin<V: Display + Debug>(&mut self, st: &V, ev: &Event);

    /// Output the lower portion of an event trace.
    ///
    /// This ends the trace with the resulting state of the validator and
    ///   the error,
    ///     if any.
    fn trace_event_end<V: Display + Debug>(
        &mut self,
        st: &V,
        result: &Result<(), ValidateError>,
    );
}

/// Perform no tracing.
///
/// This should be used by default for non-test builds,
///   since tracing can incur a significant performance cost.
#[derive(Debug, PartialEq, Default)]
pub struct VoidTrace;

impl CompileTrace for VoidTrace {
    fn trace_compiled(&mut self, _root: &GrammarNode, _compiled: &Compiled) {
        // Do nothing at all.
    }
}

impl ValidatorTrace for VoidTrace {
    fn trace_event_begin<V: Display + Debug>(&mut self, _st: &V, _ev: &Event) {
        // Do nothing at all.
    }

    fn trace_event_end<V: Display + Debug>(
        &mut self,
        _st: &V,
        _result: &Result<(), ValidateError>,
    ) {
        // Do nothing at all.
    }
}

/// Human-readable trace.
///
/// See [module-level](self) documentation for more information.
#[derive(Debug, PartialEq, Default)]
pub struct HumanReadableTrace;

impl HumanReadableTrace {
    fn trace_note(&self) {
        #[allow(unused_variables)]
        let cfg = ""; // so that this compiles without matching cfg
        #[cfg(feature = "matcher-trace-stderr")]
        #[allow(unused_variables)]
        let cfg = "feature = \"matcher-trace-stderr\"";
        #[cfg(test)] // takes precedence if both are set
        let cfg = "test";
        eprint!(
            "= note: this trace was output as a debugging aid \
                because `cfg({cfg})`.\n\n",
        );
    }
}

impl CompileTrace for HumanReadableTrace {
    fn trace_compiled(&mut self, root: &GrammarNode, compiled: &Compiled) {
        let model = &compiled.model;

        eprint!(
            "\
[compile] {root}
| ==> {leaves} leaves, {slots} AND slots, contains text: {text}
|\n",
            leaves = model.leaf_count(),
            slots = model.and_state_size(),
            text = model.contains_text(),
        );

        for leaf in model.leaves() {
            let fin = if leaf.is_final() { " (final)" } else { "" };

            eprint!(
                "| ==> {index} {kind}{fin}\n",
                index = leaf.index(),
                kind = leaf.kind(),
            );

            for t in leaf.transitions() {
                eprint!("|  |  -> {} [{t}]\n", t.to());
            }
        }

        for amb in &compiled.ambiguities {
            eprint!("|\n| ==> !!! warning: {amb}.\n");
        }

        if compiled.text_unreachable {
            eprint!("|\n| ==> !!! warning: text is not reachable everywhere.\n");
        }

        eprint!("|\n");
        self.trace_note();
    }
}

impl ValidatorTrace for HumanReadableTrace {
    fn trace_event_begin<V: Display + Debug>(&mut self, st: &V, ev: &Event) {
        eprint!(
            "\
[Validator::feed]
| ==> Validator before event is {st}.
|  |  {st:?}
|
| ==> event: {ev}
|  |  {ev:?}
|\n",
        );
    }

    fn trace_event_end<V: Display + Debug>(
        &mut self,
        st: &V,
        result: &Result<(), ValidateError>,
    ) {
        eprint!(
            "\
| ==> Validator after event is {st}.
|  |  {st:?}\n",
        );

        if let Err(err) = result {
            eprint!(
                "\
|
| ==> !!! error: {err}.
|  |  {err:?}\n",
            );
        }

        self.trace_note();
    }
}
