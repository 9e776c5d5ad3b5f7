// Diagnostic system rendering
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

//! Rendering of diagnostic information.

// NB: `write!` together with `\n` is preferred to `writeln!` so that there
//   is only a single sequence of characters to search for while tracking
//   down newlines,
//     rather than using both.

use super::{AnnotatedSpan, Diagnostic, Level};
use std::fmt::{self, Display};

pub trait Reporter {
    /// Render diagnostic report.
    ///
    /// The provided [`Report`] implements [`Display`].
    ///
    /// This method _does not return [`Result`]_ and should never fail.
    fn render<'d, D: Diagnostic>(&mut self, diagnostic: &'d D)
        -> Report<'d, D>;
}

/// Render diagnostic reports without access to source text.
///
/// Spans are rendered using their [`Display`] implementation,
///   one per line,
///   beneath the diagnostic message.
/// Callers that are able to resolve spans into lines and columns should
///   implement their own [`Reporter`] using [`Diagnostic::describe`].
#[derive(Debug, Default)]
pub struct PlainReporter;

impl PlainReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for PlainReporter {
    fn render<'d, D: Diagnostic>(
        &mut self,
        diagnostic: &'d D,
    ) -> Report<'d, D> {
        Report {
            diagnostic,
            level: diagnostic.level(),
            spans: diagnostic.describe(),
        }
    }
}

#[derive(Debug)]
pub struct Report<'d, D: Diagnostic> {
    diagnostic: &'d D,
    level: Level,
    spans: Vec<AnnotatedSpan<'d>>,
}

impl<'d, D: Diagnostic> Report<'d, D> {
    /// Severity of the report as a whole.
    pub fn level(&self) -> Level {
        self.level
    }
}

impl<'d, D: Diagnostic> Display for Report<'d, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}\n", self.level, self.diagnostic)?;

        self.spans.iter().try_for_each(|aspan| {
            write!(f, "  --> {}", aspan.span())?;

            match aspan.label() {
                Some(label) => write!(f, "\n      {}: {label}\n", aspan.level()),
                None => write!(f, "\n"),
            }
        })
    }
}
