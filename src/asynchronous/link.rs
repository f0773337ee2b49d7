//! Ownership of one upstream async cursor and the single place it is closed.

use std::task::{Context, Poll};

use futures_util::future::poll_fn;
use futures_util::ready;
use futures_util::task::noop_waker_ref;
use tracing::{debug, trace, warn};

use crate::{
    asynchronous::AsyncCursor,
    error::{Result, SeqError},
    step::Step,
};

/// Owning handle over an upstream [`AsyncCursor`].
///
/// The async counterpart of [`Link`](crate::Link). Closing may suspend, so a
/// terminal event first records why the upstream must be released and the
/// release is then driven to completion across polls. Once released, pulls
/// resolve to `Done` and closes to `Ok(())`.
///
/// Dropping an open link polls the upstream's close once with a no-op waker.
/// A close that completes in that poll releases the upstream as usual; one that
/// suspends is abandoned. Callers that need confirmed cleanup close explicitly.
pub struct AsyncLink<C: AsyncCursor> {
    cursor: Option<C>,
    closing: Option<&'static str>,
    fault: Option<SeqError>,
}

impl<C: AsyncCursor> AsyncLink<C> {
    /// Take ownership of `cursor`.
    pub fn new(cursor: C) -> Self {
        Self {
            cursor: Some(cursor),
            closing: None,
            fault: None,
        }
    }

    /// Returns `true` once the upstream has been released.
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    /// Schedule the release of the upstream with `err` as the outcome.
    ///
    /// The next [`poll_pull`](AsyncCursor::poll_pull) drives the release and then
    /// resolves to `Err(err)`. Operators use this when a callback of theirs fails
    /// in the middle of a poll.
    pub fn abort(&mut self, err: SeqError) {
        if self.cursor.is_some() {
            self.closing = Some("fault");
        }
        self.fault = Some(err);
    }

    /// Release the upstream and report `err`.
    ///
    /// A cleanup failure here is logged; the original fault is what the caller sees.
    pub async fn fail(&mut self, err: SeqError) -> SeqError {
        if self.cursor.is_some() {
            self.closing = Some("fault");
        }
        if let Err(cleanup) = poll_fn(|cx| self.poll_release(cx)).await {
            warn!(error = %cleanup, fault = %err, "cleanup failed while propagating a fault");
        }
        err
    }

    fn poll_release(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        let Some(reason) = self.closing else {
            return Poll::Ready(Ok(()));
        };
        let closed = match self.cursor.as_mut() {
            Some(cursor) => ready!(cursor.poll_close(cx)),
            None => Ok(()),
        };
        trace!(reason, "closed upstream async cursor");
        self.cursor = None;
        self.closing = None;
        Poll::Ready(closed)
    }

    /// Settle a finished release against a pending fault; the fault wins.
    fn settle(&mut self, closed: Result<()>) -> Result<()> {
        match self.fault.take() {
            Some(fault) => {
                if let Err(cleanup) = closed {
                    warn!(error = %cleanup, fault = %fault, "cleanup failed while propagating a fault");
                }
                Err(fault)
            }
            None => closed,
        }
    }
}

impl<C: AsyncCursor> AsyncCursor for AsyncLink<C> {
    type Item = C::Item;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<C::Item>>> {
        loop {
            if self.closing.is_some() || self.fault.is_some() {
                let closed = ready!(self.poll_release(cx));
                self.settle(closed)?;
                return Poll::Ready(Ok(Step::Done));
            }
            let Some(cursor) = self.cursor.as_mut() else {
                return Poll::Ready(Ok(Step::Done));
            };
            match ready!(cursor.poll_pull(cx)) {
                Ok(Step::Yielded(value)) => return Poll::Ready(Ok(Step::Yielded(value))),
                Ok(Step::Done) => self.closing = Some("exhausted"),
                Err(err) => self.abort(err),
            }
        }
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        if self.closing.is_none() && self.cursor.is_some() {
            self.closing = Some("requested");
        }
        let closed = ready!(self.poll_release(cx));
        Poll::Ready(self.settle(closed))
    }
}

impl<C: AsyncCursor> Drop for AsyncLink<C> {
    fn drop(&mut self) {
        if self.cursor.is_none() {
            return;
        }
        if self.closing.is_none() {
            self.closing = Some("dropped");
        }
        let mut cx = Context::from_waker(noop_waker_ref());
        match self.poll_release(&mut cx) {
            Poll::Ready(Ok(())) => {}
            Poll::Ready(Err(err)) => {
                warn!(error = %err, "cleanup failed while dropping async cursor");
            }
            Poll::Pending => debug!("async cursor dropped before its close completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asynchronous::{AsyncCursorExt, AsyncSequence};
    use crate::testing::{Probe, Prompt, Stalling};

    fn link(probe: &Probe<i32>) -> AsyncLink<<Stalling<Probe<i32>> as AsyncSequence>::Cursor> {
        AsyncLink::new(Stalling(probe.clone()).cursor().unwrap())
    }

    #[tokio::test]
    async fn test_exhaustion_closes_upstream_once() {
        let probe = Probe::new(vec![1]);
        let mut link = link(&probe);
        assert_eq!(link.pull().await.unwrap(), Step::Yielded(1));
        assert_eq!(link.pull().await.unwrap(), Step::Done);
        assert!(link.is_closed());
        assert_eq!(link.pull().await.unwrap(), Step::Done);
        link.close().await.unwrap();
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let probe = Probe::new(vec![1, 2]);
        let mut link = link(&probe);
        assert_eq!(link.pull().await.unwrap(), Step::Yielded(1));
        link.close().await.unwrap();
        link.close().await.unwrap();
        assert_eq!(link.pull().await.unwrap(), Step::Done);
        assert_eq!(probe.pulls(), 1);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_source_fault_closes_then_done() {
        let probe = Probe::new(vec![1, 2]).fail_at(0);
        let mut link = link(&probe);
        assert!(link.pull().await.unwrap_err().is_source());
        assert_eq!(link.pull().await.unwrap(), Step::Done);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_abort_surfaces_on_next_pull() {
        let probe = Probe::new(vec![1, 2]);
        let mut link = link(&probe);
        assert_eq!(link.pull().await.unwrap(), Step::Yielded(1));
        link.abort(SeqError::callback("rejected"));
        assert!(link.pull().await.unwrap_err().is_callback());
        assert_eq!(link.pull().await.unwrap(), Step::Done);
        assert_eq!(probe.pulls(), 1);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_fail_masks_cleanup_fault() {
        crate::testing::init_tracing();
        let probe = Probe::new(vec![1]).fail_close();
        let mut link = link(&probe);
        let err = link.fail(SeqError::callback("boom")).await;
        assert!(err.is_callback());
        assert!(link.is_closed());
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_fault_on_close_is_reported() {
        let probe = Probe::new(vec![1]).fail_close();
        let mut link = link(&probe);
        assert!(link.close().await.unwrap_err().is_cleanup());
        link.close().await.unwrap();
    }

    #[test]
    fn test_drop_closes_ready_upstream() {
        let probe = Probe::new(vec![1, 2]);
        drop(AsyncLink::new(Prompt(probe.clone()).cursor().unwrap()));
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn test_drop_abandons_suspended_close() {
        crate::testing::init_tracing();
        let probe = Probe::new(vec![1]);
        drop(link(&probe));
        assert_eq!(probe.closes(), 0);
    }

    #[test]
    fn test_drop_after_close_does_not_close_again() {
        let probe = Probe::new(vec![1]);
        let mut link = AsyncLink::new(Prompt(probe.clone()).cursor().unwrap());
        futures_util::FutureExt::now_or_never(link.close())
            .unwrap()
            .unwrap();
        drop(link);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn test_drop_logs_cleanup_fault() {
        crate::testing::init_tracing();
        let probe = Probe::new(vec![1]).fail_close();
        drop(AsyncLink::new(Prompt(probe.clone()).cursor().unwrap()));
        assert_eq!(probe.closes(), 1);
    }
}
