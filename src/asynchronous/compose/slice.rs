//! Limiting and offsetting async sequences.

use std::task::{Context, Poll};

use futures_util::ready;

use crate::{
    asynchronous::{AsyncCursor, AsyncLink, AsyncSequence},
    error::Result,
    step::Step,
};

/// Yields at most `n` values, then closes the upstream.
///
/// Created via [`take`].
#[derive(Debug, Clone)]
pub struct Take<S> {
    source: S,
    n: usize,
}

/// Create a sequence of the first `n` values of `source`.
pub fn take<S: AsyncSequence>(source: S, n: usize) -> Take<S> {
    Take { source, n }
}

impl<S: AsyncSequence> AsyncSequence for Take<S> {
    type Item = S::Item;
    type Cursor = TakeCursor<S::Cursor>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(TakeCursor {
            upstream: AsyncLink::new(self.source.cursor()?),
            remaining: self.n,
        })
    }
}

/// Cursor of an async [`Take`] sequence.
pub struct TakeCursor<C: AsyncCursor> {
    upstream: AsyncLink<C>,
    remaining: usize,
}

impl<C: AsyncCursor> AsyncCursor for TakeCursor<C> {
    type Item = C::Item;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<C::Item>>> {
        if self.remaining == 0 {
            ready!(self.upstream.poll_close(cx))?;
            return Poll::Ready(Ok(Step::Done));
        }
        let step = ready!(self.upstream.poll_pull(cx))?;
        if step.is_yielded() {
            self.remaining -= 1;
        }
        Poll::Ready(Ok(step))
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.upstream.poll_close(cx)
    }
}

/// Discards the first `n` values.
///
/// Created via [`skip`].
#[derive(Debug, Clone)]
pub struct Skip<S> {
    source: S,
    n: usize,
}

/// Create a sequence without the first `n` values of `source`.
pub fn skip<S: AsyncSequence>(source: S, n: usize) -> Skip<S> {
    Skip { source, n }
}

impl<S: AsyncSequence> AsyncSequence for Skip<S> {
    type Item = S::Item;
    type Cursor = SkipCursor<S::Cursor>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(SkipCursor {
            upstream: AsyncLink::new(self.source.cursor()?),
            pending: self.n,
        })
    }
}

/// Cursor of an async [`Skip`] sequence.
pub struct SkipCursor<C: AsyncCursor> {
    upstream: AsyncLink<C>,
    pending: usize,
}

impl<C: AsyncCursor> AsyncCursor for SkipCursor<C> {
    type Item = C::Item;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<C::Item>>> {
        while self.pending > 0 {
            if ready!(self.upstream.poll_pull(cx))?.is_done() {
                self.pending = 0;
                return Poll::Ready(Ok(Step::Done));
            }
            self.pending -= 1;
        }
        self.upstream.poll_pull(cx)
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.upstream.poll_close(cx)
    }
}
