// Formatting helpers
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

//! Typed formatting helpers.
//!
//! These types create composable formatters for use with [`Display`].
//! Whereas [`Display`] operates on data owned by the type implementing it,
//!   these formatters compose into functions that operate on data provided
//!   _to_ it.
//!
//! There are two types of wrappers:
//!
//!   - [`DisplayWrapper`] formats objects as atoms; and
//!   - [`ListDisplayWrapper`] maps a [`DisplayWrapper`] to each of its
//!       items as atoms,
//!         joining them into an English list.
//!
//! These are used to render the "expected" lists of validation errors:
//!
//! ```
//! # use cmodel::fmt::*;
//! assert_eq!(
//!     OrConjList::<TtQuote>::wrap(&["TITLE", "META", "#PCDATA"]).to_string(),
//!     "`TITLE`, `META`, or `#PCDATA`",
//! );
//!
//! assert_eq!(
//!     AndConjList::<Raw>::wrap(&["toil", "trouble"]).to_string(),
//!     "toil and trouble",
//! );
//! ```

use std::{
    fmt::{Display, Formatter, Result},
    marker::PhantomData,
};

/// Wrapper for a [`Display`]-able type.
///
/// See the [module-level documentation](self) for more information.
pub trait DisplayWrapper {
    /// Transform inner data and output using the provided [`Formatter`].
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result;

    /// Associate data with a [`DisplayWrapper`] for rendering using
    ///   [`Display`].
    ///
    /// This has the effect of creating an arbitrary [`Display`]
    ///   implementation for the wrapped object,
    ///     which will work well with [`format!`] and anything else that
    ///     does not have access to an explicit [`Formatter`].
    fn wrap<T: Display>(inner: T) -> Wrap<Self, T> {
        Wrap {
            inner,
            _phantom: PhantomData,
        }
    }
}

/// Wrapper with associated data.
pub struct Wrap<W: DisplayWrapper + ?Sized, T: Display> {
    inner: T,
    _phantom: PhantomData<W>,
}

impl<W: DisplayWrapper + ?Sized, T: Display> Display for Wrap<W, T> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        W::fmt(&self.inner, f)
    }
}

/// Echo data as-is without any wrapping.
pub struct Raw;

impl DisplayWrapper for Raw {
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result {
        inner.fmt(f)
    }
}

/// Quote text that would be typed by the user,
///   such as an element type name.
///
/// This is styled after Markdown inline code.
pub struct TtQuote;

impl DisplayWrapper for TtQuote {
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result {
        write!(f, "`{inner}`")
    }
}

/// A conjunctive term used to join the last item of a list.
pub trait Conjunction {
    const TERM: &'static str;
}

pub struct And;
pub struct Or;

impl Conjunction for And {
    const TERM: &'static str = "and";
}

impl Conjunction for Or {
    const TERM: &'static str = "or";
}

/// Wrapper for a list of [`Display`]-able items.
pub trait ListDisplayWrapper {
    /// Format a slice using the provided wrappers.
    fn fmt<T: Display>(list: &[T], f: &mut Formatter) -> Result;

    /// Associate data with a [`ListDisplayWrapper`] for rendering using
    ///   [`Display`].
    fn wrap<T: Display>(list: &[T]) -> ListWrap<Self, T> {
        ListWrap {
            list,
            _phantom: PhantomData,
        }
    }
}

/// Format each item of a slice using a [`DisplayWrapper`] formatter,
///   outputting an English list with a serial comma and conjunctive term.
///
/// No formatting is done to a single item,
///   and the serial comma is omitted for only two items.
///
/// For example:
///   If we have a slice `[1, 2, 3]`,
///     this will output "1, 2, and 3".
///   If we have a slice `[1, 2]`,
///     it will omit the serial comma and output "1 and 2".
pub struct ConjList<C: Conjunction, W: DisplayWrapper>(PhantomData<(C, W)>);

impl<C: Conjunction, W: DisplayWrapper> ListDisplayWrapper for ConjList<C, W> {
    fn fmt<T: Display>(list: &[T], f: &mut Formatter) -> Result {
        let maxi = list.len().saturating_sub(1);

        list.iter().enumerate().try_for_each(|next| match next {
            (0, x) => W::fmt(x, f),
            (1, x) if maxi == 1 => {
                write!(f, " {} ", C::TERM)?;
                W::fmt(x, f)
            }
            (i, x) if maxi == i => {
                write!(f, ", {} ", C::TERM)?;
                W::fmt(x, f)
            }
            (_, x) => {
                write!(f, ", ")?;
                W::fmt(x, f)
            }
        })
    }
}

/// List joined by "and".
pub type AndConjList<W> = ConjList<And, W>;

/// List joined by "or".
pub type OrConjList<W> = ConjList<Or, W>;

/// A [`ListDisplayWrapper`] with associated data.
pub struct ListWrap<'a, W: ListDisplayWrapper + ?Sized, T: Display> {
    list: &'a [T],
    _phantom: PhantomData<W>,
}

impl<'a, W: ListDisplayWrapper + ?Sized, T: Display> Display
    for ListWrap<'a, W, T>
{
    fn fmt(&self, f: &mut Formatter) -> Result {
        W::fmt(self.list, f)
    }
}
