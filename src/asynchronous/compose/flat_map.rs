//! Expanding each value of an async sequence into an async sequence of its own.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::TryFuture;
use futures_util::ready;
use tracing::warn;

use crate::{
    asynchronous::{AsyncCursor, AsyncLink, AsyncSequence},
    callback::{AsyncCallback, Deferred, Fallible, Plain},
    error::{BoxError, Result, SeqError},
    step::Step,
};

/// Flattens the async sequences produced for each outer value.
///
/// Created via [`flat_map`], [`try_flat_map`] or [`flat_map_async`].
#[derive(Debug, Clone)]
pub struct FlatMap<S, T> {
    source: S,
    transform: T,
}

/// [`FlatMap`] driven by a callback returning a future of the inner sequence.
pub type FlatMapAsync<S, F> = FlatMap<S, Deferred<F>>;

/// Create a sequence yielding every value of `f(value, index)` for each value.
pub fn flat_map<S, I, F>(source: S, f: F) -> FlatMap<S, Plain<F>>
where
    S: AsyncSequence,
    F: FnMut(S::Item, usize) -> I + Clone,
    I: AsyncSequence,
{
    FlatMap {
        source,
        transform: Plain(f),
    }
}

/// Create a flattened sequence from a callback that may fail.
pub fn try_flat_map<S, I, E, F>(source: S, f: F) -> FlatMap<S, Fallible<F>>
where
    S: AsyncSequence,
    F: FnMut(S::Item, usize) -> std::result::Result<I, E> + Clone,
    I: AsyncSequence,
    E: Into<BoxError>,
{
    FlatMap {
        source,
        transform: Fallible(f),
    }
}

/// Create a flattened sequence from a callback whose future resolves to the
/// inner sequence.
pub fn flat_map_async<S, F, Fut>(source: S, f: F) -> FlatMapAsync<S, F>
where
    S: AsyncSequence,
    F: FnMut(S::Item, usize) -> Fut + Clone,
    Fut: TryFuture,
    Fut::Ok: AsyncSequence,
    Fut::Error: Into<BoxError>,
{
    FlatMap {
        source,
        transform: Deferred(f),
    }
}

impl<S, T> AsyncSequence for FlatMap<S, T>
where
    S: AsyncSequence,
    T: AsyncCallback<S::Item> + Clone,
    T::Output: AsyncSequence,
{
    type Item = <T::Output as AsyncSequence>::Item;
    type Cursor = FlatMapCursor<S::Cursor, T>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(FlatMapCursor {
            inner: None,
            pending: None,
            outer: AsyncLink::new(self.source.cursor()?),
            transform: self.transform.clone(),
            index: 0,
            inner_cleanup: None,
        })
    }
}

/// Cursor of an async [`FlatMap`] sequence.
pub struct FlatMapCursor<C, T>
where
    C: AsyncCursor,
    T: AsyncCallback<C::Item>,
    T::Output: AsyncSequence,
{
    inner: Option<AsyncLink<<T::Output as AsyncSequence>::Cursor>>,
    pending: Option<T::Future>,
    outer: AsyncLink<C>,
    transform: T,
    index: usize,
    // Outcome of closing the inner cursor while the outer close is still pending.
    inner_cleanup: Option<SeqError>,
}

impl<C, T> AsyncCursor for FlatMapCursor<C, T>
where
    C: AsyncCursor,
    T: AsyncCallback<C::Item>,
    T::Output: AsyncSequence,
{
    type Item = <T::Output as AsyncSequence>::Item;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<Self::Item>>> {
        loop {
            if let Some(inner) = self.inner.as_mut() {
                match ready!(inner.poll_pull(cx)) {
                    Ok(Step::Yielded(value)) => return Poll::Ready(Ok(Step::Yielded(value))),
                    Ok(Step::Done) => self.inner = None,
                    Err(err) => {
                        self.inner = None;
                        self.outer.abort(err);
                    }
                }
            }

            if let Some(transform) = self.pending.as_mut() {
                let out = ready!(Pin::new(transform).poll(cx));
                self.pending = None;
                match out.map_err(SeqError::Callback).and_then(|seq| seq.cursor()) {
                    Ok(cursor) => self.inner = Some(AsyncLink::new(cursor)),
                    Err(err) => self.outer.abort(err),
                }
                continue;
            }

            let Step::Yielded(value) = ready!(self.outer.poll_pull(cx))? else {
                return Poll::Ready(Ok(Step::Done));
            };
            let index = self.index;
            self.index += 1;
            self.pending = Some(self.transform.call(value, index));
        }
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.pending = None;
        if let Some(inner) = self.inner.as_mut() {
            let closed = ready!(inner.poll_close(cx));
            self.inner = None;
            self.inner_cleanup = closed.err();
        }
        let outer = ready!(self.outer.poll_close(cx));
        Poll::Ready(match self.inner_cleanup.take() {
            Some(inner) => {
                if let Err(outer) = outer {
                    warn!(error = %outer, first = %inner, "outer cleanup failed after inner cleanup failed");
                }
                Err(inner)
            }
            None => outer,
        })
    }
}
