//! Applying a caller-supplied transform to a whole async sequence.

use crate::asynchronous::AsyncSequence;

/// Apply `transform` to `source` and return whatever it builds.
///
/// Adds no state of its own; laziness and cleanup are those of the result.
pub fn chain<S, T, F>(source: S, transform: F) -> T
where
    S: AsyncSequence,
    F: FnOnce(S) -> T,
{
    transform(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Probe, Stalling};

    fn evens<S: AsyncSequence<Item = i32>>(s: S) -> impl AsyncSequence<Item = i32> {
        s.filter(|x, _| x % 2 == 0)
    }

    #[tokio::test]
    async fn test_chain_splices_pipeline() {
        let probe = Probe::new(vec![1, 2, 3, 4]);
        let seq = chain(Stalling(probe.clone()), evens).map(|x, _| x * 10);
        assert_eq!(probe.pulls(), 0);
        assert_eq!(seq.to_vec().await.unwrap(), vec![20, 40]);
    }
}
