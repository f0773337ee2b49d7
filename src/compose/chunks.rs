//! Grouping consecutive values.

use crate::{
    error::Result,
    link::Link,
    sequence::{Cursor, Sequence},
    step::Step,
};

/// Yields vectors of `size` consecutive values.
///
/// Created via [`chunks`]. This operator buffers: one downstream pull issues up
/// to `size` upstream pulls. The final chunk holds the remainder and may be
/// shorter; an empty remainder yields nothing.
#[derive(Debug, Clone)]
pub struct Chunks<S> {
    source: S,
    size: usize,
}

/// Create a sequence of `size`-long chunks of `source`.
///
/// # Panics
///
/// Panics if `size` is 0.
///
/// # Examples
///
/// ```
/// use pullseq::prelude::*;
/// use pullseq::compose::chunks;
///
/// let pairs = chunks(of(1..=5), 2);
/// assert_eq!(pairs.to_vec().unwrap(), vec![vec![1, 2], vec![3, 4], vec![5]]);
/// ```
pub fn chunks<S: Sequence>(source: S, size: usize) -> Chunks<S> {
    assert!(size != 0, "chunk size must be non-zero");
    Chunks { source, size }
}

impl<S: Sequence> Sequence for Chunks<S> {
    type Item = Vec<S::Item>;
    type Cursor = ChunksCursor<S::Cursor>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(ChunksCursor {
            upstream: Link::new(self.source.cursor()?),
            size: self.size,
        })
    }
}

/// Cursor of a [`Chunks`] sequence.
pub struct ChunksCursor<C: Cursor> {
    upstream: Link<C>,
    size: usize,
}

impl<C: Cursor> Cursor for ChunksCursor<C> {
    type Item = Vec<C::Item>;

    fn pull(&mut self) -> Result<Step<Vec<C::Item>>> {
        let mut chunk = Vec::with_capacity(self.size);
        while chunk.len() < self.size {
            match self.upstream.pull()? {
                Step::Yielded(value) => chunk.push(value),
                Step::Done => break,
            }
        }
        if chunk.is_empty() {
            Ok(Step::Done)
        } else {
            Ok(Step::Yielded(chunk))
        }
    }

    fn close(&mut self) -> Result<()> {
        self.upstream.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;

    #[test]
    fn test_exact_multiple() {
        let seq = chunks(Probe::new(vec![1, 2, 3, 4]), 2);
        assert_eq!(seq.to_vec().unwrap(), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_buffers_one_chunk_per_pull() {
        let probe = Probe::new(vec![1, 2, 3, 4, 5]);
        let mut cursor = chunks(probe.clone(), 3).cursor().unwrap();
        assert_eq!(cursor.pull().unwrap(), Step::Yielded(vec![1, 2, 3]));
        assert_eq!(probe.pulls(), 3);
        assert_eq!(cursor.pull().unwrap(), Step::Yielded(vec![4, 5]));
        assert_eq!(cursor.pull().unwrap(), Step::Done);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn test_fault_mid_chunk() {
        let probe = Probe::new(vec![1, 2, 3]).fail_at(1);
        let mut cursor = chunks(probe.clone(), 2).cursor().unwrap();
        assert!(cursor.pull().unwrap_err().is_source());
        assert_eq!(cursor.pull().unwrap(), Step::Done);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    #[should_panic(expected = "chunk size must be non-zero")]
    fn test_zero_size_panics() {
        let _ = chunks(Probe::new(vec![1]), 0);
    }
}
