//! Iterator adapter for cursors.
//!
//! [`CursorIter`] lets a chain be consumed with a `for` loop. Items are
//! `Result<T>`: a fault is yielded once, after which the iterator is fused.
//! Leaving the loop early drops the adapter, which closes the whole chain.
//!
//! ```rust
//! use pullseq::prelude::*;
//!
//! let mut seen = Vec::new();
//! for value in of([1, 2, 3, 4]).map(|x, _| x * 2).iter().unwrap() {
//!     let value = value.unwrap();
//!     if value > 4 {
//!         break;
//!     }
//!     seen.push(value);
//! }
//! assert_eq!(seen, vec![2, 4]);
//! ```

use std::iter::FusedIterator;

use crate::{error::Result, link::Link, sequence::Cursor, step::Step};

/// Iterator over the values of a cursor.
///
/// Both `CursorIter` and `&mut CursorIter` implement `Iterator`, so a caller can
/// iterate part of the way and then [`close`](CursorIter::close) explicitly to
/// observe cleanup faults.
pub struct CursorIter<C: Cursor> {
    link: Link<C>,
}

impl<C: Cursor> CursorIter<C> {
    /// Create a new iterator from a cursor.
    pub fn new(cursor: C) -> Self {
        Self {
            link: Link::new(cursor),
        }
    }

    /// Check if the underlying cursor has terminated.
    pub fn is_complete(&self) -> bool {
        self.link.is_closed()
    }

    /// Close the underlying chain, reporting any cleanup fault.
    pub fn close(&mut self) -> Result<()> {
        self.link.close()
    }
}

impl<C: Cursor> Iterator for CursorIter<C> {
    type Item = Result<C::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.link.pull() {
            Ok(Step::Yielded(value)) => Some(Ok(value)),
            Ok(Step::Done) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<C: Cursor> FusedIterator for CursorIter<C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;
    use crate::Sequence;

    #[test]
    fn test_collects_results() {
        let values: Result<Vec<_>> = Probe::new(vec![1, 2, 3]).iter().unwrap().collect();
        assert_eq!(values.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_break_closes_source() {
        let probe = Probe::new(vec![1, 2, 3, 4]);
        for value in (&probe).map(|x, _| x * 10).iter().unwrap() {
            if value.unwrap() == 20 {
                break;
            }
        }
        assert_eq!(probe.pulls(), 2);
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn test_fault_is_yielded_once() {
        let probe = Probe::new(vec![1, 2, 3]).fail_at(1);
        let mut iter = probe.iter().unwrap();
        assert_eq!(iter.next().unwrap().unwrap(), 1);
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
        assert!(iter.is_complete());
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn test_partial_iteration_with_mut_ref() {
        let probe = Probe::new(vec![1, 2, 3]);
        let mut iter = probe.iter().unwrap();
        let first: Vec<_> = (&mut iter).take(2).map(|r| r.unwrap()).collect();
        assert_eq!(first, vec![1, 2]);
        assert!(!iter.is_complete());
        iter.close().unwrap();
        assert!(iter.is_complete());
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn test_cursor_into_values() {
        let cursor = Probe::new(vec!["a"]).cursor().unwrap();
        let values: Vec<_> = cursor.into_values().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec!["a"]);
    }
}
