//! Eager terminal operations over synchronous sequences.
//!
//! Each function opens one cursor, drains it, and closes it on every exit
//! path. A callback fault aborts the drain and closes the source before it is
//! returned.

use crate::{
    error::{BoxError, Result, SeqError},
    link::Link,
    sequence::{Cursor, Sequence},
    step::Step,
};

/// Fold every value of `source` into an accumulator starting at `seed`.
///
/// # Examples
///
/// ```
/// use pullseq::prelude::*;
/// use pullseq::run::reduce;
///
/// let sum = reduce(&of([1, 2, 3, 4]), |acc, x, _| acc + x, 0).unwrap();
/// assert_eq!(sum, 10);
/// ```
pub fn reduce<S, A, F>(source: &S, mut f: F, seed: A) -> Result<A>
where
    S: Sequence + ?Sized,
    F: FnMut(A, S::Item, usize) -> A,
{
    try_reduce(source, move |acc, x, i| Ok::<_, BoxError>(f(acc, x, i)), seed)
}

/// Fold every value with a reducer that may fail.
///
/// An `Err` from `f` is a callback fault: folding stops, the source cursor is
/// closed, and the fault is returned.
pub fn try_reduce<S, A, E, F>(source: &S, mut f: F, seed: A) -> Result<A>
where
    S: Sequence + ?Sized,
    F: FnMut(A, S::Item, usize) -> std::result::Result<A, E>,
    E: Into<BoxError>,
{
    let mut link = Link::new(source.cursor()?);
    let mut acc = seed;
    let mut index = 0;
    while let Step::Yielded(value) = link.pull()? {
        acc = match f(acc, value, index) {
            Ok(acc) => acc,
            Err(err) => return Err(link.fail(SeqError::callback(err))),
        };
        index += 1;
    }
    Ok(acc)
}

/// Call `f` with every value of `source` and its index.
pub fn for_each<S, F>(source: &S, mut f: F) -> Result<()>
where
    S: Sequence + ?Sized,
    F: FnMut(S::Item, usize),
{
    reduce(source, move |(), x, i| f(x, i), ())
}

/// Drain `source` into a vector.
pub fn to_vec<S>(source: &S) -> Result<Vec<S::Item>>
where
    S: Sequence + ?Sized,
{
    drain(source.cursor()?)
}

/// Drain an already opened cursor into a vector, closing it afterwards.
pub fn drain<C: Cursor>(cursor: C) -> Result<Vec<C::Item>> {
    let mut link = Link::new(cursor);
    let mut out = Vec::new();
    while let Step::Yielded(value) = link.pull()? {
        out.push(value);
    }
    Ok(out)
}
