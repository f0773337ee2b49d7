//! Transforming each value of an async sequence.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::TryFuture;
use futures_util::ready;

use crate::{
    asynchronous::{AsyncCursor, AsyncLink, AsyncSequence},
    callback::{AsyncCallback, Deferred, Fallible, Plain},
    error::{BoxError, Result, SeqError},
    step::Step,
};

/// Transforms every value of the wrapped async sequence.
///
/// Created via [`map`], [`try_map`] or [`map_async`].
#[derive(Debug, Clone)]
pub struct Map<S, T> {
    source: S,
    transform: T,
}

/// [`Map`] driven by a future-returning callback.
pub type MapAsync<S, F> = Map<S, Deferred<F>>;

/// Create a sequence that applies `f(value, index)` to each value.
pub fn map<S, B, F>(source: S, f: F) -> Map<S, Plain<F>>
where
    S: AsyncSequence,
    F: FnMut(S::Item, usize) -> B + Clone,
{
    Map {
        source,
        transform: Plain(f),
    }
}

/// Create a sequence that applies a fallible `f(value, index)` to each value.
pub fn try_map<S, B, E, F>(source: S, f: F) -> Map<S, Fallible<F>>
where
    S: AsyncSequence,
    F: FnMut(S::Item, usize) -> std::result::Result<B, E> + Clone,
    E: Into<BoxError>,
{
    Map {
        source,
        transform: Fallible(f),
    }
}

/// Create a sequence that awaits `f(value, index)` for each value.
///
/// A future resolving to `Err` is a callback fault.
pub fn map_async<S, F, Fut>(source: S, f: F) -> MapAsync<S, F>
where
    S: AsyncSequence,
    F: FnMut(S::Item, usize) -> Fut + Clone,
    Fut: TryFuture,
    Fut::Error: Into<BoxError>,
{
    Map {
        source,
        transform: Deferred(f),
    }
}

impl<S, T> AsyncSequence for Map<S, T>
where
    S: AsyncSequence,
    T: AsyncCallback<S::Item> + Clone,
{
    type Item = T::Output;
    type Cursor = MapCursor<S::Cursor, T>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(MapCursor {
            upstream: AsyncLink::new(self.source.cursor()?),
            transform: self.transform.clone(),
            pending: None,
            index: 0,
        })
    }
}

/// Cursor of an async [`Map`] sequence.
pub struct MapCursor<C, T>
where
    C: AsyncCursor,
    T: AsyncCallback<C::Item>,
{
    upstream: AsyncLink<C>,
    transform: T,
    pending: Option<T::Future>,
    index: usize,
}

impl<C, T> AsyncCursor for MapCursor<C, T>
where
    C: AsyncCursor,
    T: AsyncCallback<C::Item>,
{
    type Item = T::Output;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<T::Output>>> {
        loop {
            if let Some(transform) = self.pending.as_mut() {
                let out = ready!(Pin::new(transform).poll(cx));
                self.pending = None;
                match out {
                    Ok(value) => return Poll::Ready(Ok(Step::Yielded(value))),
                    Err(err) => self.upstream.abort(SeqError::Callback(err)),
                }
            }
            let Step::Yielded(value) = ready!(self.upstream.poll_pull(cx))? else {
                return Poll::Ready(Ok(Step::Done));
            };
            let index = self.index;
            self.index += 1;
            self.pending = Some(self.transform.call(value, index));
        }
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.pending = None;
        self.upstream.poll_close(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asynchronous::AsyncCursorExt;
    use crate::testing::{Probe, Stalling};
    use tokio::task::yield_now;

    #[tokio::test]
    async fn test_construction_performs_no_pulls() {
        let probe = Probe::new(vec![1, 2]);
        let mapped = map(Stalling(probe.clone()), |x, _| x + 1);
        assert_eq!(probe.cursors(), 0);
        let mut cursor = mapped.cursor().unwrap();
        assert_eq!(probe.pulls(), 0);
        assert_eq!(cursor.pull().await.unwrap(), Step::Yielded(2));
        assert_eq!(probe.pulls(), 1);
    }

    #[tokio::test]
    async fn test_map_async_awaits_in_order() {
        let seq = map_async(Stalling(Probe::new(vec![3, 1, 2])), |x, i| async move {
            yield_now().await;
            Ok::<_, SeqError>((i, x))
        });
        assert_eq!(seq.to_vec().await.unwrap(), vec![(0, 3), (1, 1), (2, 2)]);
    }

    #[tokio::test]
    async fn test_rejected_callback_closes_upstream() {
        let probe = Probe::new(vec![1, 2, 3]);
        let seq = map_async(Stalling(probe.clone()), |x, _| async move {
            yield_now().await;
            if x == 2 {
                Err("rejected")
            } else {
                Ok(x)
            }
        });
        let mut cursor = seq.cursor().unwrap();
        assert_eq!(cursor.pull().await.unwrap(), Step::Yielded(1));
        let err = cursor.pull().await.unwrap_err();
        assert!(err.is_callback());
        assert_eq!(err.to_string(), "callback failed: rejected");
        assert_eq!(cursor.pull().await.unwrap(), Step::Done);
        assert_eq!(probe.pulls(), 2);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_close_discards_pending_callback() {
        let probe = Probe::new(vec![1, 2]);
        let seq = map_async(Stalling(probe.clone()), |x, _| async move {
            yield_now().await;
            Ok::<_, SeqError>(x)
        });
        let mut cursor = seq.cursor().unwrap();
        assert_eq!(cursor.pull().await.unwrap(), Step::Yielded(1));
        cursor.close().await.unwrap();
        cursor.close().await.unwrap();
        assert_eq!(cursor.pull().await.unwrap(), Step::Done);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_try_map_fault() {
        let probe = Probe::new(vec![1, 2]);
        let seq = try_map(Stalling(probe.clone()), |x, _| {
            if x == 1 {
                Err("first")
            } else {
                Ok(x)
            }
        });
        assert!(seq.to_vec().await.unwrap_err().is_callback());
        assert_eq!(probe.closes(), 1);
    }
}
