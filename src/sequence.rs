//! Core traits of the synchronous protocol.
//!
//! A [`Sequence`] is a capability: it hands out fresh [`Cursor`]s on demand. A
//! [`Cursor`] is the single-owner handle that is pulled until it reports
//! [`Step::Done`] or is closed early.
//!
//! # Examples
//!
//! ```rust
//! use pullseq::prelude::*;
//!
//! let evens = of([1, 2, 3, 4]).filter(|x, _| x % 2 == 0);
//!
//! let mut cursor = evens.cursor().unwrap();
//! assert_eq!(cursor.pull().unwrap(), Step::Yielded(2));
//! cursor.close().unwrap();
//! assert_eq!(cursor.pull().unwrap(), Step::Done);
//! ```

use std::rc::Rc;
use std::sync::Arc;

use either::Either;
use futures_util::future::TryFuture;

use crate::{
    asynchronous::{from_deferred, from_sync, FromDeferred, FromSync},
    callback::{Fallible, Plain},
    compose::{self, Chunks, Filter, FlatMap, Map, OnClose, Skip, Take},
    error::{BoxError, Result},
    iter::CursorIter,
    run,
    step::Step,
};

/// Stateful, single-owner iteration handle.
///
/// Exactly one operation is legal at a time: [`pull`](Cursor::pull) to advance or
/// [`close`](Cursor::close) to terminate early. After `Done`, a fault, or `close`,
/// every further pull returns `Done` and further closes are no-ops.
pub trait Cursor {
    /// Type of values produced
    type Item;

    /// Advance and retrieve the next value.
    fn pull(&mut self) -> Result<Step<Self::Item>>;

    /// Release the cursor and everything upstream of it.
    fn close(&mut self) -> Result<()>;

    /// Adapt into an [`Iterator`] over `Result<Item>`.
    fn into_values(self) -> CursorIter<Self>
    where
        Self: Sized,
    {
        CursorIter::new(self)
    }
}

impl<C> Cursor for Box<C>
where
    C: Cursor + ?Sized,
{
    type Item = C::Item;

    fn pull(&mut self) -> Result<Step<Self::Item>> {
        (**self).pull()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<C> Cursor for &'_ mut C
where
    C: Cursor + ?Sized,
{
    type Item = C::Item;

    fn pull(&mut self) -> Result<Step<Self::Item>> {
        (**self).pull()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<L, R> Cursor for Either<L, R>
where
    L: Cursor,
    R: Cursor<Item = L::Item>,
{
    type Item = L::Item;

    fn pull(&mut self) -> Result<Step<Self::Item>> {
        match self {
            Either::Left(l) => l.pull(),
            Either::Right(r) => r.pull(),
        }
    }

    fn close(&mut self) -> Result<()> {
        match self {
            Either::Left(l) => l.close(),
            Either::Right(r) => r.close(),
        }
    }
}

/// Anything that can produce a fresh [`Cursor`].
///
/// Re-iterable sequences start a new traversal on every call to
/// [`cursor`](Sequence::cursor). Single-use sequences succeed once and fail with
/// [`SeqError::AlreadyIterated`](crate::SeqError::AlreadyIterated) afterwards;
/// operators preserve whichever behaviour their source has.
///
/// Every lazy method below only wraps `self`. Nothing is pulled until a cursor of
/// the returned sequence is pulled.
pub trait Sequence {
    /// Type of values produced
    type Item;
    /// Cursor handed out for each traversal
    type Cursor: Cursor<Item = Self::Item>;

    /// Start a new traversal.
    fn cursor(&self) -> Result<Self::Cursor>;

    /// Transform each value.
    ///
    /// ```rust
    /// use pullseq::prelude::*;
    ///
    /// let doubled = of([1, 2, 3]).map(|x, _| x * 2);
    /// assert_eq!(doubled.to_vec().unwrap(), vec![2, 4, 6]);
    /// ```
    fn map<B, F>(self, f: F) -> Map<Self, Plain<F>>
    where
        Self: Sized,
        F: FnMut(Self::Item, usize) -> B + Clone,
    {
        compose::map(self, f)
    }

    /// Transform each value with a callback that may fail.
    fn try_map<B, E, F>(self, f: F) -> Map<Self, Fallible<F>>
    where
        Self: Sized,
        F: FnMut(Self::Item, usize) -> std::result::Result<B, E> + Clone,
        E: Into<BoxError>,
    {
        compose::try_map(self, f)
    }

    /// Keep only values matching `predicate`.
    fn filter<P>(self, predicate: P) -> Filter<Self, Plain<P>>
    where
        Self: Sized,
        P: FnMut(&Self::Item, usize) -> bool + Clone,
    {
        compose::filter(self, predicate)
    }

    /// Keep only values matching a predicate that may fail.
    fn try_filter<E, P>(self, predicate: P) -> Filter<Self, Fallible<P>>
    where
        Self: Sized,
        P: FnMut(&Self::Item, usize) -> std::result::Result<bool, E> + Clone,
        E: Into<BoxError>,
    {
        compose::try_filter(self, predicate)
    }

    /// Replace each value by the sequence `f` produces for it.
    fn flat_map<S, F>(self, f: F) -> FlatMap<Self, Plain<F>>
    where
        Self: Sized,
        F: FnMut(Self::Item, usize) -> S + Clone,
        S: Sequence,
    {
        compose::flat_map(self, f)
    }

    /// Replace each value by the sequence a fallible `f` produces for it.
    fn try_flat_map<S, E, F>(self, f: F) -> FlatMap<Self, Fallible<F>>
    where
        Self: Sized,
        F: FnMut(Self::Item, usize) -> std::result::Result<S, E> + Clone,
        S: Sequence,
        E: Into<BoxError>,
    {
        compose::try_flat_map(self, f)
    }

    /// Yield at most `n` values.
    fn take(self, n: usize) -> Take<Self>
    where
        Self: Sized,
    {
        compose::take(self, n)
    }

    /// Discard the first `n` values.
    fn skip(self, n: usize) -> Skip<Self>
    where
        Self: Sized,
    {
        compose::skip(self, n)
    }

    /// Group values into vectors of `size`; the last one may be shorter.
    fn chunks(self, size: usize) -> Chunks<Self>
    where
        Self: Sized,
    {
        compose::chunks(self, size)
    }

    /// Run `hook` exactly once when a traversal terminates.
    fn on_close<E, H>(self, hook: H) -> OnClose<Self, H>
    where
        Self: Sized,
        H: FnMut() -> std::result::Result<(), E> + Clone,
        E: Into<BoxError>,
    {
        compose::on_close(self, hook)
    }

    /// Apply `transform` to this sequence.
    ///
    /// ```rust
    /// use pullseq::prelude::*;
    ///
    /// fn evens<S: Sequence<Item = i32>>(s: S) -> impl Sequence<Item = i32> {
    ///     s.filter(|x, _| x % 2 == 0)
    /// }
    ///
    /// let out = of([1, 2, 3, 4]).chain(evens).map(|x, _| x * 10);
    /// assert_eq!(out.to_vec().unwrap(), vec![20, 40]);
    /// ```
    fn chain<T, F>(self, transform: F) -> T
    where
        Self: Sized,
        F: FnOnce(Self) -> T,
    {
        compose::chain(self, transform)
    }

    /// Fold every value into an accumulator, draining the sequence.
    fn reduce<A, F>(&self, f: F, seed: A) -> Result<A>
    where
        F: FnMut(A, Self::Item, usize) -> A,
    {
        run::reduce(self, f, seed)
    }

    /// Fold every value with a reducer that may fail.
    fn try_reduce<A, E, F>(&self, f: F, seed: A) -> Result<A>
    where
        F: FnMut(A, Self::Item, usize) -> std::result::Result<A, E>,
        E: Into<BoxError>,
    {
        run::try_reduce(self, f, seed)
    }

    /// Call `f` for every value.
    fn for_each<F>(&self, f: F) -> Result<()>
    where
        F: FnMut(Self::Item, usize),
    {
        run::for_each(self, f)
    }

    /// Drain the sequence into a vector.
    fn to_vec(&self) -> Result<Vec<Self::Item>> {
        run::to_vec(self)
    }

    /// Start a traversal as an [`Iterator`] over `Result<Item>`.
    fn iter(&self) -> Result<CursorIter<Self::Cursor>> {
        Ok(CursorIter::new(self.cursor()?))
    }

    /// Bridge into the asynchronous protocol.
    fn into_async(self) -> FromSync<Self>
    where
        Self: Sized,
    {
        from_sync(self)
    }

    /// Bridge a sequence of futures into the asynchronous protocol, awaiting
    /// each element in order.
    fn into_deferred(self) -> FromDeferred<Self>
    where
        Self: Sized,
        Self::Item: TryFuture,
        <Self::Item as TryFuture>::Error: Into<BoxError>,
    {
        from_deferred(self)
    }
}

impl<S> Sequence for &'_ S
where
    S: Sequence,
{
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Result<Self::Cursor> {
        (**self).cursor()
    }
}

impl<S> Sequence for Box<S>
where
    S: Sequence,
{
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Result<Self::Cursor> {
        (**self).cursor()
    }
}

impl<S> Sequence for Rc<S>
where
    S: Sequence,
{
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Result<Self::Cursor> {
        (**self).cursor()
    }
}

impl<S> Sequence for Arc<S>
where
    S: Sequence,
{
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Result<Self::Cursor> {
        (**self).cursor()
    }
}

impl<L, R> Sequence for Either<L, R>
where
    L: Sequence,
    R: Sequence<Item = L::Item>,
{
    type Item = L::Item;
    type Cursor = Either<L::Cursor, R::Cursor>;

    fn cursor(&self) -> Result<Self::Cursor> {
        match self {
            Either::Left(l) => l.cursor().map(Either::Left),
            Either::Right(r) => r.cursor().map(Either::Right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{empty, of, once};
    use crate::SeqError;

    #[test]
    fn test_shared_reference_is_a_sequence() {
        let items = of([1, 2, 3]);
        let by_ref = (&items).map(|x, _| x + 1);
        assert_eq!(by_ref.to_vec().unwrap(), vec![2, 3, 4]);
        assert_eq!(items.to_vec().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_either_dispatches_to_active_arm() {
        let left: Either<_, crate::source::Empty<i32>> = Either::Left(of([1, 2]));
        let right: Either<crate::source::Items<i32>, _> = Either::Right(empty::<i32>());
        assert_eq!(left.to_vec().unwrap(), vec![1, 2]);
        assert_eq!(right.to_vec().unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn test_shared_handles_start_fresh_traversals() {
        let shared = Rc::new(of([1, 2]));
        let boxed = Box::new(of([3]));
        assert_eq!(shared.to_vec().unwrap(), vec![1, 2]);
        assert_eq!(Arc::new(of([4])).to_vec().unwrap(), vec![4]);
        assert_eq!((&shared).map(|x, _| x + 1).to_vec().unwrap(), vec![2, 3]);
        assert_eq!(boxed.to_vec().unwrap(), vec![3]);
    }

    #[test]
    fn test_boxed_cursor_forwards() {
        let mut cursor: Box<dyn Cursor<Item = i32>> = Box::new(of([7]).cursor().unwrap());
        assert_eq!(cursor.pull().unwrap(), Step::Yielded(7));
        assert_eq!(cursor.pull().unwrap(), Step::Done);
    }

    #[test]
    fn test_single_use_preserved_through_operators() {
        let mapped = once(vec![1, 2, 3]).map(|x, _| x * 2);
        assert_eq!(mapped.to_vec().unwrap(), vec![2, 4, 6]);
        assert!(matches!(mapped.to_vec(), Err(SeqError::AlreadyIterated)));
    }

    #[test]
    fn test_reiterable_gives_independent_cursors() {
        let seq = of([1, 2, 3]).map(|x, i| x + i as i32);
        let mut a = seq.cursor().unwrap();
        let mut b = seq.cursor().unwrap();
        assert_eq!(a.pull().unwrap(), Step::Yielded(1));
        assert_eq!(a.pull().unwrap(), Step::Yielded(3));
        assert_eq!(b.pull().unwrap(), Step::Yielded(1));
    }
}
