//! Attaching cleanup work to a traversal.

use tracing::warn;

use crate::{
    error::{BoxError, Result, SeqError},
    link::Link,
    sequence::{Cursor, Sequence},
    step::Step,
};

/// Runs a hook once when a traversal ends.
///
/// Created via [`on_close`]. The hook fires exactly once per cursor, after the
/// upstream was released, on whichever terminal path comes first: exhaustion, a
/// fault, an explicit close, or drop. This is where a source that owns a
/// resource (a file, a connection) releases it.
#[derive(Debug, Clone)]
pub struct OnClose<S, H> {
    source: S,
    hook: H,
}

/// Attach `hook` to every traversal of `source`.
///
/// A hook failure is a cleanup fault. It is returned from the pull that reached
/// exhaustion or from `close`; when a fault is already propagating the original
/// fault wins and the hook failure is logged.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use pullseq::prelude::*;
/// use pullseq::compose::on_close;
///
/// let released = Rc::new(Cell::new(0));
/// let seq = on_close(of([1, 2, 3]), {
///     let released = Rc::clone(&released);
///     move || {
///         released.set(released.get() + 1);
///         Ok::<_, SeqError>(())
///     }
/// });
///
/// let mut cursor = seq.cursor().unwrap();
/// assert_eq!(cursor.pull().unwrap(), Step::Yielded(1));
/// cursor.close().unwrap();
/// cursor.close().unwrap();
/// assert_eq!(released.get(), 1);
/// ```
pub fn on_close<S, E, H>(source: S, hook: H) -> OnClose<S, H>
where
    S: Sequence,
    H: FnMut() -> std::result::Result<(), E> + Clone,
    E: Into<BoxError>,
{
    OnClose { source, hook }
}

impl<S, E, H> Sequence for OnClose<S, H>
where
    S: Sequence,
    H: FnMut() -> std::result::Result<(), E> + Clone,
    E: Into<BoxError>,
{
    type Item = S::Item;
    type Cursor = OnCloseCursor<S::Cursor, H>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(OnCloseCursor {
            upstream: Link::new(self.source.cursor()?),
            hook: Some(self.hook.clone()),
        })
    }
}

/// Cursor of an [`OnClose`] sequence.
pub struct OnCloseCursor<C, H>
where
    C: Cursor,
    H: HookFn,
{
    upstream: Link<C>,
    hook: Option<H>,
}

/// Hook signature accepted by [`on_close`].
///
/// Implemented for every `FnMut() -> Result<(), E>` with `E: Into<BoxError>`.
pub trait HookFn {
    /// Run the hook.
    fn run(&mut self) -> std::result::Result<(), BoxError>;
}

impl<E, H> HookFn for H
where
    H: FnMut() -> std::result::Result<(), E>,
    E: Into<BoxError>,
{
    fn run(&mut self) -> std::result::Result<(), BoxError> {
        (*self)().map_err(Into::into)
    }
}

impl<C: Cursor, H: HookFn> OnCloseCursor<C, H> {
    fn fire(&mut self) -> Result<()> {
        match self.hook.take() {
            Some(mut hook) => hook.run().map_err(SeqError::Cleanup),
            None => Ok(()),
        }
    }

    /// Run the hook while `err` propagates; `err` wins.
    fn fire_masked(&mut self, err: SeqError) -> SeqError {
        if let Err(cleanup) = self.fire() {
            warn!(error = %cleanup, fault = %err, "close hook failed while propagating a fault");
        }
        err
    }
}

impl<C: Cursor, H: HookFn> Cursor for OnCloseCursor<C, H> {
    type Item = C::Item;

    fn pull(&mut self) -> Result<Step<C::Item>> {
        if self.hook.is_none() {
            return Ok(Step::Done);
        }
        match self.upstream.pull() {
            Ok(Step::Yielded(value)) => Ok(Step::Yielded(value)),
            Ok(Step::Done) => {
                self.fire()?;
                Ok(Step::Done)
            }
            Err(err) => Err(self.fire_masked(err)),
        }
    }

    fn close(&mut self) -> Result<()> {
        match self.upstream.close() {
            Ok(()) => self.fire(),
            Err(err) => Err(self.fire_masked(err)),
        }
    }
}

impl<C: Cursor, H: HookFn> Drop for OnCloseCursor<C, H> {
    fn drop(&mut self) {
        if self.hook.is_some() {
            if let Err(err) = self.close() {
                warn!(error = %err, "cleanup failed while dropping cursor");
            }
        }
    }
}
