//! Instrumented sources shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::asynchronous::{AsyncCursor, AsyncSequence};
use crate::{Cursor, Result, SeqError, Sequence, Step};

/// Route `tracing` output through the test harness; repeated calls are no-ops.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::new("pullseq=trace"))
        .try_init();
}

#[derive(Debug, Default)]
struct Counters {
    cursors: AtomicUsize,
    pulls: AtomicUsize,
    closes: AtomicUsize,
}

/// Re-iterable source that counts cursors, pulls and closes, and can inject
/// source or cleanup faults.
#[derive(Debug, Clone)]
pub(crate) struct Probe<T> {
    items: Vec<T>,
    fail_at: Option<usize>,
    fail_close: bool,
    counters: Arc<Counters>,
}

impl<T: Clone> Probe<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self {
            items,
            fail_at: None,
            fail_close: false,
            counters: Arc::default(),
        }
    }

    /// Fault when the value at `index` is pulled.
    pub(crate) fn fail_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Fault from every `close`.
    pub(crate) fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub(crate) fn cursors(&self) -> usize {
        self.counters.cursors.load(Ordering::SeqCst)
    }

    pub(crate) fn pulls(&self) -> usize {
        self.counters.pulls.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }
}

impl<T: Clone> Sequence for Probe<T> {
    type Item = T;
    type Cursor = ProbeCursor<T>;

    fn cursor(&self) -> Result<ProbeCursor<T>> {
        self.counters.cursors.fetch_add(1, Ordering::SeqCst);
        Ok(ProbeCursor {
            probe: self.clone(),
            index: 0,
            closed: false,
        })
    }
}

pub(crate) struct ProbeCursor<T> {
    probe: Probe<T>,
    index: usize,
    closed: bool,
}

impl<T: Clone> Cursor for ProbeCursor<T> {
    type Item = T;

    fn pull(&mut self) -> Result<Step<T>> {
        if self.closed {
            return Ok(Step::Done);
        }
        self.probe.counters.pulls.fetch_add(1, Ordering::SeqCst);
        if self.probe.fail_at == Some(self.index) {
            return Err(SeqError::source(format!("probe fault at {}", self.index)));
        }
        let step = self.probe.items.get(self.index).cloned().into();
        self.index += 1;
        Ok(step)
    }

    // Every call is counted so double closes are visible to tests.
    fn close(&mut self) -> Result<()> {
        self.probe.counters.closes.fetch_add(1, Ordering::SeqCst);
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.probe.fail_close {
            return Err(SeqError::cleanup("probe cleanup fault"));
        }
        Ok(())
    }
}

/// Async view of a synchronous sequence whose pulls and closes each suspend
/// once before completing.
#[derive(Debug, Clone)]
pub(crate) struct Stalling<S>(pub(crate) S);

impl<S: Sequence> AsyncSequence for Stalling<S> {
    type Item = S::Item;
    type Cursor = Stall<S::Cursor>;

    fn cursor(&self) -> Result<Stall<S::Cursor>> {
        Ok(Stall {
            inner: self.0.cursor()?,
            stalls: true,
            stalled: false,
        })
    }
}

/// Async view of a synchronous sequence whose pulls and closes complete on
/// their first poll.
#[derive(Debug, Clone)]
pub(crate) struct Prompt<S>(pub(crate) S);

impl<S: Sequence> AsyncSequence for Prompt<S> {
    type Item = S::Item;
    type Cursor = Stall<S::Cursor>;

    fn cursor(&self) -> Result<Stall<S::Cursor>> {
        Ok(Stall {
            inner: self.0.cursor()?,
            stalls: false,
            stalled: false,
        })
    }
}

pub(crate) struct Stall<C> {
    inner: C,
    stalls: bool,
    stalled: bool,
}

impl<C> Stall<C> {
    fn stall(&mut self, cx: &mut Context<'_>) -> bool {
        if !self.stalls {
            return false;
        }
        self.stalled = !self.stalled;
        if self.stalled {
            cx.waker().wake_by_ref();
        }
        self.stalled
    }
}

impl<C: Cursor> AsyncCursor for Stall<C> {
    type Item = C::Item;

    fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Step<C::Item>>> {
        if self.stall(cx) {
            return Poll::Pending;
        }
        Poll::Ready(self.inner.pull())
    }

    fn poll_close(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        if self.stall(cx) {
            return Poll::Pending;
        }
        Poll::Ready(self.inner.close())
    }
}
