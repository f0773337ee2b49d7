//! Applying a caller-supplied transform to a whole sequence.

use crate::sequence::Sequence;

/// Apply `transform` to `source` and return whatever it builds.
///
/// `chain` adds no buffering and no state: laziness and cursor ownership of the
/// result are exactly those of the sequence `transform` returns. It lets reusable
/// pipelines be spliced into fluent method chains.
///
/// # Examples
///
/// ```
/// use pullseq::prelude::*;
/// use pullseq::compose::chain;
///
/// let doubled_evens = chain(of([1, 2, 3, 4]), |s| {
///     s.filter(|x, _| x % 2 == 0).map(|x, _| x * 2)
/// });
/// assert_eq!(doubled_evens.to_vec().unwrap(), vec![4, 8]);
/// ```
pub fn chain<S, T, F>(source: S, transform: F) -> T
where
    S: Sequence,
    F: FnOnce(S) -> T,
{
    transform(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;

    #[test]
    fn test_chain_is_lazy() {
        let probe = Probe::new(vec![1, 2, 3]);
        let chained = chain(probe.clone(), |s| s.map(|x, _| x + 1));
        assert_eq!(probe.cursors(), 0);
        assert_eq!(probe.pulls(), 0);
        assert_eq!(chained.to_vec().unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_chain_keeps_ownership_of_transform_result() {
        let probe = Probe::new(vec![1, 2, 3]);
        let chained = probe.clone().chain(|s| s.take(1));
        assert_eq!(chained.to_vec().unwrap(), vec![1]);
        assert_eq!(probe.closes(), 1);
    }
}
