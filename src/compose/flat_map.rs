//! Expanding each value of a sequence into a sequence of its own.

use tracing::warn;

use crate::{
    callback::{Callback, Fallible, Plain},
    error::{BoxError, Result, SeqError},
    link::Link,
    sequence::{Cursor, Sequence},
    step::Step,
};

/// Flattens the sequences produced for each outer value.
///
/// Created via [`flat_map`] or [`try_flat_map`]. Each inner sequence is exhausted,
/// in order, before the next outer value is pulled.
#[derive(Debug, Clone)]
pub struct FlatMap<S, T> {
    source: S,
    transform: T,
}

/// Create a sequence yielding every value of `f(value, index)` for each value.
///
/// # Examples
///
/// ```
/// use pullseq::prelude::*;
/// use pullseq::compose::flat_map;
///
/// let spread = flat_map(of([1, 2]), |x, _| of([x, x * 10]));
/// assert_eq!(spread.to_vec().unwrap(), vec![1, 10, 2, 20]);
/// ```
pub fn flat_map<S, I, F>(source: S, f: F) -> FlatMap<S, Plain<F>>
where
    S: Sequence,
    F: FnMut(S::Item, usize) -> I + Clone,
    I: Sequence,
{
    FlatMap {
        source,
        transform: Plain(f),
    }
}

/// Create a flattened sequence from a callback that may fail.
pub fn try_flat_map<S, I, E, F>(source: S, f: F) -> FlatMap<S, Fallible<F>>
where
    S: Sequence,
    F: FnMut(S::Item, usize) -> std::result::Result<I, E> + Clone,
    I: Sequence,
    E: Into<BoxError>,
{
    FlatMap {
        source,
        transform: Fallible(f),
    }
}

impl<S, T> Sequence for FlatMap<S, T>
where
    S: Sequence,
    T: Callback<S::Item> + Clone,
    T::Output: Sequence,
{
    type Item = <T::Output as Sequence>::Item;
    type Cursor = FlatMapCursor<S::Cursor, T>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(FlatMapCursor {
            inner: None,
            outer: Link::new(self.source.cursor()?),
            transform: self.transform.clone(),
            index: 0,
        })
    }
}

/// Cursor of a [`FlatMap`] sequence.
///
/// Holds at most one outer and one inner cursor at a time.
pub struct FlatMapCursor<C, T>
where
    C: Cursor,
    T: Callback<C::Item>,
    T::Output: Sequence,
{
    // Declared before `outer` so that drop releases the inner cursor first.
    inner: Option<Link<<T::Output as Sequence>::Cursor>>,
    outer: Link<C>,
    transform: T,
    index: usize,
}

impl<C, T> Cursor for FlatMapCursor<C, T>
where
    C: Cursor,
    T: Callback<C::Item>,
    T::Output: Sequence,
{
    type Item = <T::Output as Sequence>::Item;

    fn pull(&mut self) -> Result<Step<Self::Item>> {
        loop {
            if let Some(inner) = self.inner.as_mut() {
                match inner.pull() {
                    Ok(Step::Yielded(value)) => return Ok(Step::Yielded(value)),
                    Ok(Step::Done) => self.inner = None,
                    Err(err) => {
                        self.inner = None;
                        return Err(self.outer.fail(err));
                    }
                }
            }

            let Step::Yielded(value) = self.outer.pull()? else {
                return Ok(Step::Done);
            };
            let index = self.index;
            self.index += 1;
            let inner = self
                .transform
                .call(value, index)
                .map_err(SeqError::Callback)
                .and_then(|seq| seq.cursor());
            match inner {
                Ok(cursor) => self.inner = Some(Link::new(cursor)),
                Err(err) => return Err(self.outer.fail(err)),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        let inner = match self.inner.take() {
            Some(mut inner) => inner.close(),
            None => Ok(()),
        };
        let outer = self.outer.close();
        if let (Err(inner), Err(outer)) = (&inner, &outer) {
            warn!(error = %outer, first = %inner, "outer cleanup failed after inner cleanup failed");
        }
        inner.and(outer)
    }
}
