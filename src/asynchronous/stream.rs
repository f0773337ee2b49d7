//! Stream adapter for async cursors.
//!
//! [`CursorStream`] is the async counterpart of [`CursorIter`](crate::CursorIter):
//! items are `Result<T>`, a fault is yielded once, and the stream is fused
//! afterwards.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::ready;
use futures_util::stream::{FusedStream, Stream};

use crate::{
    asynchronous::{AsyncCursor, AsyncCursorExt, AsyncLink},
    error::Result,
    step::Step,
};

/// Stream over the values of an async cursor.
pub struct CursorStream<C: AsyncCursor> {
    link: AsyncLink<C>,
}

// Cursors are only ever driven through `&mut`, never pinned in place.
impl<C: AsyncCursor> Unpin for CursorStream<C> {}

impl<C: AsyncCursor> CursorStream<C> {
    /// Create a new stream from a cursor.
    pub fn new(cursor: C) -> Self {
        Self {
            link: AsyncLink::new(cursor),
        }
    }

    /// Check if the underlying cursor has terminated.
    pub fn is_complete(&self) -> bool {
        self.link.is_closed()
    }

    /// Close the underlying chain, reporting any cleanup fault.
    pub async fn close(&mut self) -> Result<()> {
        self.link.close().await
    }
}

impl<C: AsyncCursor> Stream for CursorStream<C> {
    type Item = Result<C::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Poll::Ready(match ready!(this.link.poll_pull(cx)) {
            Ok(Step::Yielded(value)) => Some(Ok(value)),
            Ok(Step::Done) => None,
            Err(err) => Some(Err(err)),
        })
    }
}

impl<C: AsyncCursor> FusedStream for CursorStream<C> {
    fn is_terminated(&self) -> bool {
        self.link.is_closed()
    }
}
