//! Keeping the values of an async sequence that match a predicate.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::TryFuture;
use futures_util::ready;

use crate::{
    asynchronous::{AsyncCursor, AsyncLink, AsyncSequence},
    callback::{AsyncPredicate, Deferred, Fallible, Plain},
    error::{BoxError, Result, SeqError},
    step::Step,
};

/// Yields only the values accepted by a predicate.
///
/// Created via [`filter`], [`try_filter`] or [`filter_async`]. Holds at most the
/// single candidate being tested.
#[derive(Debug, Clone)]
pub struct Filter<S, P> {
    source: S,
    predicate: P,
}

/// [`Filter`] driven by a future-returning predicate.
pub type FilterAsync<S, P> = Filter<S, Deferred<P>>;

/// Create a sequence of the values for which `predicate(&value, index)` holds.
pub fn filter<S, P>(source: S, predicate: P) -> Filter<S, Plain<P>>
where
    S: AsyncSequence,
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
    S: AsyncSequence,
    P: FnMut(&S::Item, usize) -> std::result::Result<bool, E> + Clone,
    E: Into<BoxError>,
{
    Filter {
        source,
        predicate: Fallible(predicate),
    }
}

/// Create a filtered sequence from a predicate returning a future.
///
/// The predicate receives a borrowed candidate and must return a future that
/// does not borrow it.
pub fn filter_async<S, P, Fut>(source: S, predicate: P) -> FilterAsync<S, P>
where
    S: AsyncSequence,
    P: FnMut(&S::Item, usize) -> Fut + Clone,
    Fut: TryFuture<Ok = bool>,
    Fut::Error: Into<BoxError>,
{
    Filter {
        source,
        predicate: Deferred(predicate),
    }
}

impl<S, P> AsyncSequence for Filter<S, P>
where
    S: AsyncSequence,
    P: AsyncPredicate<S::Item> + Clone,
{
    type Item = S::Item;
    type Cursor = FilterCursor<S::Cursor, P>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(FilterCursor {
            upstream: AsyncLink::new(self.source.cursor()?),
            predicate: self.predicate.clone(),
            pending: None,
            index: 0,
        })
    }
}

/// Cursor of an async [`Filter`] sequence.
pub struct FilterCursor<C, P>
where
    C: AsyncCursor,
    P: AsyncPredicate<C::Item>,
{
    upstream: AsyncLink<C>,
    predicate: P,
    pending: Option<(C::Item, P::Future)>,
    index: usize,
}

impl<C, P> AsyncCursor for FilterCursor<C, P>
where
    C: AsyncCursor,
    P: AsyncPredicate<C::Item>,
{
    type Item = C::Item;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<C::Item>>> {
        loop {
            if let Some((candidate, mut verdict)) = self.pending.take() {
                match Pin::new(&mut verdict).poll(cx) {
                    Poll::Pending => {
                        self.pending = Some((candidate, verdict));
                        return Poll::Pending;
                    }
                    Poll::Ready(Ok(true)) => return Poll::Ready(Ok(Step::Yielded(candidate))),
                    Poll::Ready(Ok(false)) => {}
                    Poll::Ready(Err(err)) => self.upstream.abort(SeqError::Callback(err)),
                }
            }
            let Step::Yielded(candidate) = ready!(self.upstream.poll_pull(cx))? else {
                return Poll::Ready(Ok(Step::Done));
            };
            let index = self.index;
            self.index += 1;
            let verdict = self.predicate.test(&candidate, index);
            self.pending = Some((candidate, verdict));
        }
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.pending = None;
        self.upstream.poll_close(cx)
    }
}
