//! The asynchronous protocol.
//!
//! [`AsyncCursor`] is the same contract as [`Cursor`](crate::Cursor) with a
//! suspension point: `poll_pull` and `poll_close` may return
//! [`Poll::Pending`]. Each cursor is an explicit state machine driven through
//! `&mut self`; nothing in this module relies on pinning a cursor, so every
//! in-flight future an operator holds is boxed or `Unpin`.
//!
//! [`AsyncCursorExt`] turns the poll functions into futures:
//!
//! ```rust
//! use pullseq::prelude::*;
//! use pullseq::asynchronous;
//!
//! # futures_util::future::FutureExt::now_or_never(async {
//! let seq = asynchronous::of([1, 2, 3, 4])
//!     .filter(|x, _| x % 2 == 0)
//!     .map(|x, _| x * 2);
//!
//! let mut cursor = seq.cursor().unwrap();
//! assert_eq!(cursor.pull().await.unwrap(), Step::Yielded(4));
//! assert_eq!(cursor.pull().await.unwrap(), Step::Yielded(8));
//! assert_eq!(cursor.pull().await.unwrap(), Step::Done);
//! cursor.close().await.unwrap();
//! # }).unwrap();
//! ```

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use either::Either;
use futures_util::future::TryFuture;

use crate::{
    callback::{Fallible, Plain},
    error::{BoxError, Result},
    step::Step,
};

mod bridge;
pub mod compose;
mod link;
mod run;
mod stream;

pub use bridge::{
    empty, from, from_async_cursor, from_deferred, from_stream, from_sync, from_try_stream, of,
    FromAsyncCursor, FromDeferred, FromDeferredCursor, FromStream, FromSync, FromSyncCursor,
    FromTryStream, StreamCursor,
};
pub use compose::{FilterAsync, FlatMapAsync, MapAsync};
pub use link::AsyncLink;
pub use run::{drain, for_each, reduce, reduce_async, to_vec, try_reduce};
pub use stream::CursorStream;

use compose::{Filter, FlatMap, Map, Skip, Take};

/// Stateful, single-owner iteration handle whose operations may suspend.
///
/// The rules of [`Cursor`](crate::Cursor) apply unchanged: after `Done`, a
/// fault, or a completed close, every pull resolves to `Done` and every close to
/// `Ok(())`.
pub trait AsyncCursor {
    /// Type of values produced
    type Item;

    /// Attempt to advance and retrieve the next value.
    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<Self::Item>>>;

    /// Attempt to release the cursor and everything upstream of it.
    ///
    /// Resolves once cleanup is confirmed complete.
    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>>;
}

impl<C> AsyncCursor for Box<C>
where
    C: AsyncCursor + ?Sized,
{
    type Item = C::Item;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<Self::Item>>> {
        (**self).poll_pull(cx)
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        (**self).poll_close(cx)
    }
}

impl<C> AsyncCursor for &'_ mut C
where
    C: AsyncCursor + ?Sized,
{
    type Item = C::Item;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<Self::Item>>> {
        (**self).poll_pull(cx)
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        (**self).poll_close(cx)
    }
}

impl<L, R> AsyncCursor for Either<L, R>
where
    L: AsyncCursor,
    R: AsyncCursor<Item = L::Item>,
{
    type Item = L::Item;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<Self::Item>>> {
        match self {
            Either::Left(l) => l.poll_pull(cx),
            Either::Right(r) => r.poll_pull(cx),
        }
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        match self {
            Either::Left(l) => l.poll_close(cx),
            Either::Right(r) => r.poll_close(cx),
        }
    }
}

/// Future-returning helpers for every [`AsyncCursor`].
pub trait AsyncCursorExt: AsyncCursor {
    /// Advance and retrieve the next value.
    fn pull(&mut self) -> Pull<'_, Self> {
        Pull { cursor: self }
    }

    /// Release the cursor and everything upstream of it.
    fn close(&mut self) -> Close<'_, Self> {
        Close { cursor: self }
    }

    /// Adapt into a [`Stream`](futures_util::Stream) over `Result<Item>`.
    fn into_stream(self) -> CursorStream<Self>
    where
        Self: Sized,
    {
        CursorStream::new(self)
    }
}

impl<C: AsyncCursor + ?Sized> AsyncCursorExt for C {}

/// Future for [`AsyncCursorExt::pull`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Pull<'a, C: ?Sized> {
    cursor: &'a mut C,
}

impl<C: AsyncCursor + ?Sized> Future for Pull<'_, C> {
    type Output = Result<Step<C::Item>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.cursor.poll_pull(cx)
    }
}

/// Future for [`AsyncCursorExt::close`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Close<'a, C: ?Sized> {
    cursor: &'a mut C,
}

impl<C: AsyncCursor + ?Sized> Future for Close<'_, C> {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.cursor.poll_close(cx)
    }
}

/// Anything that can produce a fresh [`AsyncCursor`].
///
/// Mirrors [`Sequence`](crate::Sequence): re-iterable sources start a new
/// traversal per call, single-use sources fail the second request with
/// [`SeqError::AlreadyIterated`](crate::SeqError::AlreadyIterated), and every
/// lazy method only wraps `self`.
///
/// Synchronous callbacks passed to [`map`](AsyncSequence::map) or
/// [`filter`](AsyncSequence::filter) never suspend; the `*_async` variants take
/// callbacks returning futures, which are awaited one at a time.
pub trait AsyncSequence {
    /// Type of values produced
    type Item;
    /// Cursor handed out for each traversal
    type Cursor: AsyncCursor<Item = Self::Item>;

    /// Start a new traversal.
    fn cursor(&self) -> Result<Self::Cursor>;

    /// Transform each value.
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

    /// Transform each value with a callback returning a future.
    ///
    /// ```rust
    /// use pullseq::prelude::*;
    /// use pullseq::asynchronous;
    ///
    /// # futures_util::future::FutureExt::now_or_never(async {
    /// let lengths = asynchronous::of(["a", "bcd"])
    ///     .map_async(|s, _| async move { Ok::<_, SeqError>(s.len()) });
    /// assert_eq!(lengths.to_vec().await.unwrap(), vec![1, 3]);
    /// # }).unwrap();
    /// ```
    fn map_async<F, Fut>(self, f: F) -> MapAsync<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item, usize) -> Fut + Clone,
        Fut: TryFuture,
        Fut::Error: Into<BoxError>,
    {
        compose::map_async(self, f)
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

    /// Keep only values whose predicate future resolves to `true`.
    fn filter_async<P, Fut>(self, predicate: P) -> FilterAsync<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item, usize) -> Fut + Clone,
        Fut: TryFuture<Ok = bool>,
        Fut::Error: Into<BoxError>,
    {
        compose::filter_async(self, predicate)
    }

    /// Replace each value by the sequence `f` produces for it.
    fn flat_map<S, F>(self, f: F) -> FlatMap<Self, Plain<F>>
    where
        Self: Sized,
        F: FnMut(Self::Item, usize) -> S + Clone,
        S: AsyncSequence,
    {
        compose::flat_map(self, f)
    }

    /// Replace each value by the sequence a fallible `f` produces for it.
    fn try_flat_map<S, E, F>(self, f: F) -> FlatMap<Self, Fallible<F>>
    where
        Self: Sized,
        F: FnMut(Self::Item, usize) -> std::result::Result<S, E> + Clone,
        S: AsyncSequence,
        E: Into<BoxError>,
    {
        compose::try_flat_map(self, f)
    }

    /// Replace each value by the sequence a future resolves to.
    fn flat_map_async<F, Fut>(self, f: F) -> FlatMapAsync<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item, usize) -> Fut + Clone,
        Fut: TryFuture,
        Fut::Ok: AsyncSequence,
        Fut::Error: Into<BoxError>,
    {
        compose::flat_map_async(self, f)
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

    /// Apply `transform` to this sequence.
    fn chain<T, F>(self, transform: F) -> T
    where
        Self: Sized,
        F: FnOnce(Self) -> T,
    {
        compose::chain(self, transform)
    }

    /// Fold every value into an accumulator, draining the sequence.
    fn reduce<A, F>(&self, f: F, seed: A) -> impl Future<Output = Result<A>>
    where
        F: FnMut(A, Self::Item, usize) -> A,
    {
        run::reduce(self, f, seed)
    }

    /// Fold every value with a reducer that may fail.
    fn try_reduce<A, E, F>(&self, f: F, seed: A) -> impl Future<Output = Result<A>>
    where
        F: FnMut(A, Self::Item, usize) -> std::result::Result<A, E>,
        E: Into<BoxError>,
    {
        run::try_reduce(self, f, seed)
    }

    /// Fold every value with a reducer returning a future.
    ///
    /// Folds never overlap: the next value is not pulled until the previous
    /// fold resolved.
    fn reduce_async<A, F, Fut>(&self, f: F, seed: A) -> impl Future<Output = Result<A>>
    where
        F: FnMut(A, Self::Item, usize) -> Fut,
        Fut: TryFuture<Ok = A>,
        Fut::Error: Into<BoxError>,
    {
        run::reduce_async(self, f, seed)
    }

    /// Call `f` for every value.
    fn for_each<F>(&self, f: F) -> impl Future<Output = Result<()>>
    where
        F: FnMut(Self::Item, usize),
    {
        run::for_each(self, f)
    }

    /// Drain the sequence into a vector.
    fn to_vec(&self) -> impl Future<Output = Result<Vec<Self::Item>>> {
        run::to_vec(self)
    }

    /// Start a traversal as a [`Stream`](futures_util::Stream) over `Result<Item>`.
    fn stream(&self) -> Result<CursorStream<Self::Cursor>> {
        Ok(CursorStream::new(self.cursor()?))
    }
}

impl<S> AsyncSequence for &'_ S
where
    S: AsyncSequence,
{
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Result<Self::Cursor> {
        (**self).cursor()
    }
}

impl<S> AsyncSequence for Box<S>
where
    S: AsyncSequence,
{
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Result<Self::Cursor> {
        (**self).cursor()
    }
}

impl<S> AsyncSequence for Rc<S>
where
    S: AsyncSequence,
{
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Result<Self::Cursor> {
        (**self).cursor()
    }
}

impl<S> AsyncSequence for Arc<S>
where
    S: AsyncSequence,
{
    type Item = S::Item;
    type Cursor = S::Cursor;

    fn cursor(&self) -> Result<Self::Cursor> {
        (**self).cursor()
    }
}

impl<L, R> AsyncSequence for Either<L, R>
where
    L: AsyncSequence,
    R: AsyncSequence<Item = L::Item>,
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
    use crate::testing::{Probe, Stalling};
    use crate::SeqError;

    #[tokio::test]
    async fn test_pull_and_close_futures() {
        let probe = Probe::new(vec![1, 2]);
        let mut cursor = AsyncLink::new(Stalling(probe.clone()).cursor().unwrap());
        assert_eq!(cursor.pull().await.unwrap(), Step::Yielded(1));
        cursor.close().await.unwrap();
        cursor.close().await.unwrap();
        assert_eq!(cursor.pull().await.unwrap(), Step::Done);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_suspended_cursor_does_not_block_sibling() {
        let probe = Probe::new(vec![1, 2]);
        let seq = Stalling(probe.clone());
        let mut suspended = seq.cursor().unwrap();
        let mut sibling = seq.cursor().unwrap();

        let mut cx = Context::from_waker(futures_util::task::noop_waker_ref());
        assert!(suspended.poll_pull(&mut cx).is_pending());

        assert_eq!(sibling.pull().await.unwrap(), Step::Yielded(1));
        assert_eq!(sibling.pull().await.unwrap(), Step::Yielded(2));
        assert_eq!(sibling.pull().await.unwrap(), Step::Done);

        assert_eq!(suspended.pull().await.unwrap(), Step::Yielded(1));
        assert_eq!(probe.cursors(), 2);
        assert_eq!(probe.pulls(), 4);
    }

    #[tokio::test]
    async fn test_either_of_async_sequences() {
        let pick = |left: bool| -> Either<_, FromSync<crate::source::Empty<i32>>> {
            if left {
                Either::Left(of([1, 2]))
            } else {
                Either::Right(empty())
            }
        };
        assert_eq!(pick(true).to_vec().await.unwrap(), vec![1, 2]);
        assert!(pick(false).to_vec().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_boxed_async_cursor() {
        let mut cursor: Box<dyn AsyncCursor<Item = i32>> = Box::new(of([3]).cursor().unwrap());
        assert_eq!(cursor.pull().await.unwrap(), Step::Yielded(3));
        assert_eq!(cursor.pull().await.unwrap(), Step::Done);
    }

    #[tokio::test]
    async fn test_reference_is_reiterable() {
        let seq = of([1, 2, 3]);
        let doubled = (&seq).map(|x, _| x * 2);
        assert_eq!(doubled.to_vec().await.unwrap(), vec![2, 4, 6]);
        assert_eq!(seq.to_vec().await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_single_use_preserved() {
        let seq = from_sync(crate::source::once(vec![1, 2])).map(|x, _| x + 1);
        assert_eq!(seq.to_vec().await.unwrap(), vec![2, 3]);
        assert!(matches!(seq.to_vec().await, Err(SeqError::AlreadyIterated)));
    }
}
