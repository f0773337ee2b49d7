//! Keeping the values of a sequence that match a predicate.

use crate::{
    callback::{Fallible, Plain, Predicate},
    error::{BoxError, Result, SeqError},
    link::Link,
    sequence::{Cursor, Sequence},
    step::Step,
};

/// Yields only the values accepted by a predicate.
///
/// Created via [`filter`] or [`try_filter`]. Holds at most the single candidate
/// being tested; each rejected candidate costs exactly one more upstream pull.
#[derive(Debug, Clone)]
pub struct Filter<S, P> {
    source: S,
    predicate: P,
}

/// Create a sequence of the values for which `predicate(&value, index)` holds.
///
/// `index` is the candidate's position in the upstream sequence.
///
/// # Examples
///
/// ```
/// use pullseq::prelude::*;
/// use pullseq::compose::filter;
///
/// let odd_positions = filter(of(["a", "b", "c", "d"]), |_, i| i % 2 == 1);
/// assert_eq!(odd_positions.to_vec().unwrap(), vec!["b", "d"]);
/// ```
pub fn filter<S, P>(source: S, predicate: P) -> Filter<S, Plain<P>>
where
    S: Sequence,
    P: FnMut(&S::Item, usize) -> bool + Clone,
{
    Filter {
        source,
        predicate: Plain(predicate),
    }
}

/// Create a filtered sequence from a predicate that may fail.
pub fn try_filter<S, E, P>(source: S, predicate: P) -> Filter<S, Fallible<P>>
where
    S: Sequence,
    P: FnMut(&S::Item, usize) -> std::result::Result<bool, E> + Clone,
    E: Into<BoxError>,
{
    Filter {
        source,
        predicate: Fallible(predicate),
    }
}

impl<S, P> Sequence for Filter<S, P>
where
    S: Sequence,
    P: Predicate<S::Item> + Clone,
{
    type Item = S::Item;
    type Cursor = FilterCursor<S::Cursor, P>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(FilterCursor {
            upstream: Link::new(self.source.cursor()?),
            predicate: self.predicate.clone(),
            index: 0,
        })
    }
}

/// Cursor of a [`Filter`] sequence.
pub struct FilterCursor<C: Cursor, P> {
    upstream: Link<C>,
    predicate: P,
    index: usize,
}

impl<C, P> Cursor for FilterCursor<C, P>
where
    C: Cursor,
    P: Predicate<C::Item>,
{
    type Item = C::Item;

    fn pull(&mut self) -> Result<Step<C::Item>> {
        loop {
            let Step::Yielded(candidate) = self.upstream.pull()? else {
                return Ok(Step::Done);
            };
            let index = self.index;
            self.index += 1;
            match self.predicate.test(&candidate, index) {
                Ok(true) => return Ok(Step::Yielded(candidate)),
                Ok(false) => continue,
                Err(err) => return Err(self.upstream.fail(SeqError::Callback(err))),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.upstream.close()
    }
}
