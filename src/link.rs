//! Ownership of one upstream cursor and the single place it is closed.
//!
//! Every operator holds its upstream through a [`Link`]. The link closes the
//! upstream exactly once, whichever terminal path is taken first: exhaustion, a
//! fault, an explicit [`close`](Link::close), or drop.

use tracing::{trace, warn};

use crate::{
    error::{Result, SeqError},
    sequence::Cursor,
    step::Step,
};

/// Owning handle over an upstream cursor.
///
/// `None` is the absorbing terminal state.
pub struct Link<C: Cursor> {
    cursor: Option<C>,
}

impl<C: Cursor> Link<C> {
    /// Take ownership of `cursor`.
    pub fn new(cursor: C) -> Self {
        Self {
            cursor: Some(cursor),
        }
    }

    /// Returns `true` once the upstream has been released.
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    /// Release the upstream and report `err`.
    ///
    /// A cleanup failure here is logged; the original fault is what the caller sees.
    pub fn fail(&mut self, err: SeqError) -> SeqError {
        if let Some(mut cursor) = self.cursor.take() {
            trace!(reason = "fault", "closing upstream cursor");
            if let Err(cleanup) = cursor.close() {
                warn!(error = %cleanup, fault = %err, "cleanup failed while propagating a fault");
            }
        }
        err
    }

    fn release(&mut self, reason: &'static str) -> Result<()> {
        match self.cursor.take() {
            Some(mut cursor) => {
                trace!(reason, "closing upstream cursor");
                cursor.close()
            }
            None => Ok(()),
        }
    }
}

impl<C: Cursor> Cursor for Link<C> {
    type Item = C::Item;

    fn pull(&mut self) -> Result<Step<C::Item>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(Step::Done);
        };
        match cursor.pull() {
            Ok(Step::Yielded(value)) => Ok(Step::Yielded(value)),
            Ok(Step::Done) => {
                self.release("exhausted")?;
                Ok(Step::Done)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.release("requested")
    }
}

impl<C: Cursor> Drop for Link<C> {
    fn drop(&mut self) {
        if let Err(err) = self.release("dropped") {
            warn!(error = %err, "cleanup failed while dropping cursor");
        }
    }
}
