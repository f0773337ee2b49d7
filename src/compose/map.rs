//! Transforming each value of a sequence.

use crate::{
    callback::{Callback, Fallible, Plain},
    error::{BoxError, Result, SeqError},
    link::Link,
    sequence::{Cursor, Sequence},
    step::Step,
};

/// Transforms every value of the wrapped sequence.
///
/// Created via [`map`] or [`try_map`].
#[derive(Debug, Clone)]
pub struct Map<S, T> {
    source: S,
    transform: T,
}

/// Create a sequence that applies `f(value, index)` to each value.
///
/// # Examples
///
/// ```
/// use pullseq::prelude::*;
/// use pullseq::compose::map;
///
/// let labelled = map(of(["a", "b"]), |s, i| format!("{i}{s}"));
/// assert_eq!(labelled.to_vec().unwrap(), vec!["0a", "1b"]);
/// ```
pub fn map<S, B, F>(source: S, f: F) -> Map<S, Plain<F>>
where
    S: Sequence,
    F: FnMut(S::Item, usize) -> B + Clone,
{
    Map {
        source,
        transform: Plain(f),
    }
}

/// Create a sequence that applies a fallible `f(value, index)` to each value.
///
/// An `Err` from `f` is a callback fault: the pull that triggered it fails, the
/// upstream is closed, and the cursor is done afterwards.
pub fn try_map<S, B, E, F>(source: S, f: F) -> Map<S, Fallible<F>>
where
    S: Sequence,
    F: FnMut(S::Item, usize) -> std::result::Result<B, E> + Clone,
    E: Into<BoxError>,
{
    Map {
        source,
        transform: Fallible(f),
    }
}

impl<S, T> Sequence for Map<S, T>
where
    S: Sequence,
    T: Callback<S::Item> + Clone,
{
    type Item = T::Output;
    type Cursor = MapCursor<S::Cursor, T>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(MapCursor {
            upstream: Link::new(self.source.cursor()?),
            transform: self.transform.clone(),
            index: 0,
        })
    }
}

/// Cursor of a [`Map`] sequence.
pub struct MapCursor<C: Cursor, T> {
    upstream: Link<C>,
    transform: T,
    index: usize,
}

impl<C, T> Cursor for MapCursor<C, T>
where
    C: Cursor,
    T: Callback<C::Item>,
{
    type Item = T::Output;

    fn pull(&mut self) -> Result<Step<T::Output>> {
        let Step::Yielded(value) = self.upstream.pull()? else {
            return Ok(Step::Done);
        };
        let index = self.index;
        self.index += 1;
        match self.transform.call(value, index) {
            Ok(out) => Ok(Step::Yielded(out)),
            Err(err) => Err(self.upstream.fail(SeqError::Callback(err))),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.upstream.close()
    }
}
