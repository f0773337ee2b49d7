//! Eager terminal operations over asynchronous sequences.

use futures_util::future::{TryFuture, TryFutureExt};

use crate::{
    asynchronous::{AsyncCursor, AsyncCursorExt, AsyncLink, AsyncSequence},
    error::{BoxError, Result, SeqError},
    step::Step,
};

/// Fold every value of `source` into an accumulator starting at `seed`.
pub async fn reduce<S, A, F>(source: &S, mut f: F, seed: A) -> Result<A>
where
    S: AsyncSequence + ?Sized,
    F: FnMut(A, S::Item, usize) -> A,
{
    try_reduce(source, move |acc, x, i| Ok::<_, BoxError>(f(acc, x, i)), seed).await
}

/// Fold every value with a reducer that may fail.
///
/// An `Err` from `f` stops the fold; the source is closed before the fault is
/// returned.
pub async fn try_reduce<S, A, E, F>(source: &S, mut f: F, seed: A) -> Result<A>
where
    S: AsyncSequence + ?Sized,
    F: FnMut(A, S::Item, usize) -> std::result::Result<A, E>,
    E: Into<BoxError>,
{
    let mut link = AsyncLink::new(source.cursor()?);
    let mut acc = seed;
    let mut index = 0;
    while let Step::Yielded(value) = link.pull().await? {
        acc = match f(acc, value, index) {
            Ok(acc) => acc,
            Err(err) => return Err(link.fail(SeqError::callback(err)).await),
        };
        index += 1;
    }
    Ok(acc)
}

/// Fold every value with a reducer returning a future.
///
/// Strictly one fold at a time: the next value is pulled only after the
/// previous fold resolved.
///
/// ```rust
/// use pullseq::prelude::*;
/// use pullseq::asynchronous;
///
/// # futures_util::future::FutureExt::now_or_never(async {
/// let total = asynchronous::of([1, 2, 3])
///     .reduce_async(|acc, x, _| async move { Ok::<_, SeqError>(acc + x) }, 0)
///     .await
///     .unwrap();
/// assert_eq!(total, 6);
/// # }).unwrap();
/// ```
pub async fn reduce_async<S, A, F, Fut>(source: &S, mut f: F, seed: A) -> Result<A>
where
    S: AsyncSequence + ?Sized,
    F: FnMut(A, S::Item, usize) -> Fut,
    Fut: TryFuture<Ok = A>,
    Fut::Error: Into<BoxError>,
{
    let mut link = AsyncLink::new(source.cursor()?);
    let mut acc = seed;
    let mut index = 0;
    while let Step::Yielded(value) = link.pull().await? {
        acc = match f(acc, value, index).err_into::<BoxError>().await {
            Ok(acc) => acc,
            Err(err) => return Err(link.fail(SeqError::Callback(err)).await),
        };
        index += 1;
    }
    Ok(acc)
}

/// Call `f` with every value of `source` and its index.
pub async fn for_each<S, F>(source: &S, mut f: F) -> Result<()>
where
    S: AsyncSequence + ?Sized,
    F: FnMut(S::Item, usize),
{
    reduce(source, move |(), x, i| f(x, i), ()).await
}

/// Drain `source` into a vector.
pub async fn to_vec<S>(source: &S) -> Result<Vec<S::Item>>
where
    S: AsyncSequence + ?Sized,
{
    drain(source.cursor()?).await
}

/// Drain an already opened cursor into a vector, closing it afterwards.
pub async fn drain<C: AsyncCursor>(cursor: C) -> Result<Vec<C::Item>> {
    let mut link = AsyncLink::new(cursor);
    let mut out = Vec::new();
    while let Step::Yielded(value) = link.pull().await? {
        out.push(value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Probe, Stalling};
    use std::cell::Cell;
    use std::rc::Rc;
    use tokio::task::yield_now;

    #[tokio::test]
    async fn test_reduce_folds_in_order() {
        let probe = Probe::new(vec![1, 2, 3]);
        let digits = reduce(&Stalling(probe.clone()), |acc, x, _| acc * 10 + x, 0).await;
        assert_eq!(digits.unwrap(), 123);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_reduce_async_never_overlaps() {
        let in_flight = Rc::new(Cell::new(0));
        let peak = Rc::new(Cell::new(0));
        let total = reduce_async(
            &Stalling(Probe::new(vec![1, 2, 3, 4])),
            |acc, x, _| {
                let in_flight = Rc::clone(&in_flight);
                let peak = Rc::clone(&peak);
                async move {
                    in_flight.set(in_flight.get() + 1);
                    peak.set(peak.get().max(in_flight.get()));
                    yield_now().await;
                    in_flight.set(in_flight.get() - 1);
                    Ok::<_, SeqError>(acc + x)
                }
            },
            0,
        )
        .await
        .unwrap();
        assert_eq!(total, 10);
        assert_eq!(peak.get(), 1);
    }

    #[tokio::test]
    async fn test_reducer_fault_closes_source() {
        let probe = Probe::new(vec![1, 2, 3]);
        let err = reduce_async(
            &Stalling(probe.clone()),
            |acc, x, _| async move {
                if x == 2 {
                    Err("fold rejected")
                } else {
                    Ok(acc + x)
                }
            },
            0,
        )
        .await
        .unwrap_err();
        assert!(err.is_callback());
        assert_eq!(probe.pulls(), 2);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_try_reduce_fault() {
        let probe = Probe::new(vec![1, 2]).fail_at(1);
        let err = try_reduce(&Stalling(probe.clone()), |a, x, _| Ok::<_, SeqError>(a + x), 0)
            .await
            .unwrap_err();
        assert!(err.is_source());
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_for_each_and_to_vec() {
        let seq = Stalling(Probe::new(vec!['p', 'q']));
        let mut seen = Vec::new();
        for_each(&seq, |c, i| seen.push((i, c))).await.unwrap();
        assert_eq!(seen, vec![(0, 'p'), (1, 'q')]);
        assert_eq!(to_vec(&seq).await.unwrap(), vec!['p', 'q']);
    }
}
