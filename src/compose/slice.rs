//! Limiting and offsetting sequences.

use crate::{
    error::Result,
    link::Link,
    sequence::{Cursor, Sequence},
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
///
/// Once `n` values were yielded the next pull closes the upstream without
/// pulling it again, so an unbounded source is never over-read.
pub fn take<S: Sequence>(source: S, n: usize) -> Take<S> {
    Take { source, n }
}

impl<S: Sequence> Sequence for Take<S> {
    type Item = S::Item;
    type Cursor = TakeCursor<S::Cursor>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(TakeCursor {
            upstream: Link::new(self.source.cursor()?),
            remaining: self.n,
        })
    }
}

/// Cursor of a [`Take`] sequence.
pub struct TakeCursor<C: Cursor> {
    upstream: Link<C>,
    remaining: usize,
}

impl<C: Cursor> Cursor for TakeCursor<C> {
    type Item = C::Item;

    fn pull(&mut self) -> Result<Step<C::Item>> {
        if self.remaining == 0 {
            self.upstream.close()?;
            return Ok(Step::Done);
        }
        let step = self.upstream.pull()?;
        if step.is_yielded() {
            self.remaining -= 1;
        }
        Ok(step)
    }

    fn close(&mut self) -> Result<()> {
        self.upstream.close()
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
///
/// The skipped values are pulled on the first downstream pull, not before.
pub fn skip<S: Sequence>(source: S, n: usize) -> Skip<S> {
    Skip { source, n }
}

impl<S: Sequence> Sequence for Skip<S> {
    type Item = S::Item;
    type Cursor = SkipCursor<S::Cursor>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(SkipCursor {
            upstream: Link::new(self.source.cursor()?),
            pending: self.n,
        })
    }
}

/// Cursor of a [`Skip`] sequence.
pub struct SkipCursor<C: Cursor> {
    upstream: Link<C>,
    pending: usize,
}

impl<C: Cursor> Cursor for SkipCursor<C> {
    type Item = C::Item;

    fn pull(&mut self) -> Result<Step<C::Item>> {
        while self.pending > 0 {
            if self.upstream.pull()?.is_done() {
                self.pending = 0;
                return Ok(Step::Done);
            }
            self.pending -= 1;
        }
        self.upstream.pull()
    }

    fn close(&mut self) -> Result<()> {
        self.upstream.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::from;
    use crate::testing::Probe;

    #[test]
    fn test_take_stops_without_overreading() {
        let probe = Probe::new(vec![1, 2, 3, 4]);
        assert_eq!(take(probe.clone(), 2).to_vec().unwrap(), vec![1, 2]);
        assert_eq!(probe.pulls(), 2);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn test_take_zero_never_pulls() {
        let probe = Probe::new(vec![1]);
        assert!(take(probe.clone(), 0).to_vec().unwrap().is_empty());
        assert_eq!(probe.pulls(), 0);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn test_take_from_unbounded_source() {
        let naturals = from(0u64..);
        assert_eq!(naturals.take(3).to_vec().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_take_more_than_available() {
        let probe = Probe::new(vec![1, 2]);
        assert_eq!(take(probe.clone(), 5).to_vec().unwrap(), vec![1, 2]);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn test_skip() {
        let probe = Probe::new(vec![1, 2, 3, 4]);
        let skipped = skip(probe.clone(), 2);
        assert_eq!(probe.pulls(), 0);
        assert_eq!(skipped.to_vec().unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_skip_past_end() {
        assert!(skip(Probe::new(vec![1, 2]), 5).to_vec().unwrap().is_empty());
    }
}
