//! Entry points into the asynchronous protocol.
//!
//! A synchronous sequence crosses over with [`from_sync`] and adds no suspension
//! of its own. A synchronous sequence of futures crosses over with
//! [`from_deferred`], which awaits each element before yielding it, one at a
//! time. Native streams and cursors are wrapped by [`from_stream`],
//! [`from_try_stream`] and [`from_async_cursor`].

use std::convert::Infallible;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::TryFuture;
use futures_util::stream::{self, Stream, StreamExt, TryStream};
use futures_util::ready;

use crate::{
    asynchronous::{AsyncCursor, AsyncSequence},
    error::{BoxError, Result, SeqError},
    link::Link,
    sequence::{Cursor, Sequence},
    source::{self, Empty, Items, Iterable, SingleUse},
    step::Step,
};

/// Asynchronous view of a synchronous sequence.
///
/// Created via [`from_sync`] or [`Sequence::into_async`]. Re-iterable or
/// single-use exactly as the wrapped sequence is.
#[derive(Debug, Clone)]
pub struct FromSync<S> {
    source: S,
}

/// Bridge a synchronous sequence into the asynchronous protocol.
///
/// Every pull completes immediately with the wrapped cursor's result.
pub fn from_sync<S: Sequence>(source: S) -> FromSync<S> {
    FromSync { source }
}

/// Asynchronous re-iterable sequence of the given values.
pub fn of<T, I>(values: I) -> FromSync<Items<T>>
where
    T: Clone,
    I: IntoIterator<Item = T>,
{
    from_sync(source::of(values))
}

/// Asynchronous re-iterable sequence over a cloneable iterable.
pub fn from<I>(iterable: I) -> FromSync<Iterable<I>>
where
    I: IntoIterator + Clone,
{
    from_sync(source::from(iterable))
}

/// Asynchronous sequence with no values.
pub fn empty<T>() -> FromSync<Empty<T>> {
    from_sync(source::empty())
}

impl<S: Sequence> AsyncSequence for FromSync<S> {
    type Item = S::Item;
    type Cursor = FromSyncCursor<S::Cursor>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(FromSyncCursor {
            upstream: Link::new(self.source.cursor()?),
        })
    }
}

/// Cursor of a [`FromSync`] sequence.
pub struct FromSyncCursor<C: Cursor> {
    upstream: Link<C>,
}

impl<C: Cursor> AsyncCursor for FromSyncCursor<C> {
    type Item = C::Item;

    fn poll_pull(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Step<C::Item>>> {
        Poll::Ready(self.upstream.pull())
    }

    fn poll_close(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(self.upstream.close())
    }
}

/// Asynchronous sequence awaiting each element of a synchronous sequence of
/// futures.
///
/// Created via [`from_deferred`] or [`Sequence::into_deferred`].
#[derive(Debug, Clone)]
pub struct FromDeferred<S> {
    source: S,
}

/// Bridge a synchronous sequence of futures, awaiting each before it is yielded.
///
/// The next element is not pulled until the previous one resolved, so at most
/// one future is in flight. A future resolving to `Err` is a source fault: the
/// pull fails and the upstream is closed.
///
/// ```rust
/// use pullseq::prelude::*;
///
/// # futures_util::future::FutureExt::now_or_never(async {
/// let fetched = of([1, 2, 3])
///     .map(|id, _| async move { Ok::<_, SeqError>(id * 100) })
///     .into_deferred();
/// assert_eq!(fetched.to_vec().await.unwrap(), vec![100, 200, 300]);
/// # }).unwrap();
/// ```
pub fn from_deferred<S>(source: S) -> FromDeferred<S>
where
    S: Sequence,
    S::Item: TryFuture,
    <S::Item as TryFuture>::Error: Into<BoxError>,
{
    FromDeferred { source }
}

impl<S> AsyncSequence for FromDeferred<S>
where
    S: Sequence,
    S::Item: TryFuture,
    <S::Item as TryFuture>::Error: Into<BoxError>,
{
    type Item = <S::Item as TryFuture>::Ok;
    type Cursor = FromDeferredCursor<S::Cursor>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(FromDeferredCursor {
            upstream: Link::new(self.source.cursor()?),
            pending: None,
        })
    }
}

/// Cursor of a [`FromDeferred`] sequence.
pub struct FromDeferredCursor<C: Cursor> {
    upstream: Link<C>,
    pending: Option<Pin<Box<C::Item>>>,
}

impl<C> AsyncCursor for FromDeferredCursor<C>
where
    C: Cursor,
    C::Item: TryFuture,
    <C::Item as TryFuture>::Error: Into<BoxError>,
{
    type Item = <C::Item as TryFuture>::Ok;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<Self::Item>>> {
        loop {
            if let Some(element) = self.pending.as_mut() {
                let resolved = ready!(element.as_mut().try_poll(cx));
                self.pending = None;
                return Poll::Ready(match resolved {
                    Ok(value) => Ok(Step::Yielded(value)),
                    Err(err) => Err(self.upstream.fail(SeqError::source(err))),
                });
            }
            match self.upstream.pull()? {
                Step::Yielded(element) => self.pending = Some(Box::pin(element)),
                Step::Done => return Poll::Ready(Ok(Step::Done)),
            }
        }
    }

    fn poll_close(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.pending = None;
        Poll::Ready(self.upstream.close())
    }
}

/// Single-use asynchronous sequence over a fallible stream.
///
/// Created via [`from_try_stream`] or [`from_stream`].
pub struct FromTryStream<St> {
    stream: SingleUse<St>,
}

impl<St> fmt::Debug for FromTryStream<St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromTryStream").finish_non_exhaustive()
    }
}

/// Sequence type returned by [`from_stream`].
pub type FromStream<St> = FromTryStream<
    stream::Map<St, fn(<St as Stream>::Item) -> std::result::Result<<St as Stream>::Item, Infallible>>,
>;

/// Wrap a stream of values as a single-use asynchronous sequence.
pub fn from_stream<St: Stream>(stream: St) -> FromStream<St> {
    from_try_stream(stream.map(Ok as fn(St::Item) -> std::result::Result<St::Item, Infallible>))
}

/// Wrap a stream of results as a single-use asynchronous sequence.
///
/// An `Err` item is a source fault and ends the traversal.
pub fn from_try_stream<St>(stream: St) -> FromTryStream<St>
where
    St: TryStream,
    St::Error: Into<BoxError>,
{
    FromTryStream {
        stream: SingleUse::new(stream),
    }
}

impl<St> AsyncSequence for FromTryStream<St>
where
    St: TryStream,
    St::Error: Into<BoxError>,
{
    type Item = St::Ok;
    type Cursor = StreamCursor<St>;

    fn cursor(&self) -> Result<Self::Cursor> {
        self.stream.take().map(|stream| StreamCursor {
            stream: Some(Box::pin(stream)),
        })
    }
}

/// Cursor over a [`TryStream`].
pub struct StreamCursor<St> {
    stream: Option<Pin<Box<St>>>,
}

impl<St> AsyncCursor for StreamCursor<St>
where
    St: TryStream,
    St::Error: Into<BoxError>,
{
    type Item = St::Ok;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<St::Ok>>> {
        let Some(stream) = self.stream.as_mut() else {
            return Poll::Ready(Ok(Step::Done));
        };
        let next = ready!(stream.as_mut().try_poll_next(cx));
        Poll::Ready(match next {
            Some(Ok(value)) => Ok(Step::Yielded(value)),
            Some(Err(err)) => {
                self.stream = None;
                Err(SeqError::source(err))
            }
            None => {
                self.stream = None;
                Ok(Step::Done)
            }
        })
    }

    fn poll_close(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.stream = None;
        Poll::Ready(Ok(()))
    }
}

/// Single-use sequence wrapping an existing async cursor.
///
/// Created via [`from_async_cursor`].
pub struct FromAsyncCursor<C> {
    cursor: SingleUse<C>,
}

/// Expose a native async cursor as a single-use sequence so operators can wrap it.
pub fn from_async_cursor<C: AsyncCursor>(cursor: C) -> FromAsyncCursor<C> {
    FromAsyncCursor {
        cursor: SingleUse::new(cursor),
    }
}

impl<C: AsyncCursor> AsyncSequence for FromAsyncCursor<C> {
    type Item = C::Item;
    type Cursor = C;

    fn cursor(&self) -> Result<C> {
        self.cursor.take()
    }
}
