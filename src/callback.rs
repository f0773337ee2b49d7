//! Adapters that give user closures a uniform calling convention.
//!
//! Operators accept plain closures, closures returning `Result`, and closures
//! returning futures. Each flavour is wrapped once here ([`Plain`], [`Fallible`],
//! [`Deferred`]) so a single operator implementation serves all of them and a
//! failing callback always surfaces as a [`BoxError`].

use std::future::Future;
use std::pin::Pin;

use futures_util::future::{self, ErrInto, Ready, TryFuture, TryFutureExt};

use crate::error::BoxError;

/// A closure that cannot fail.
#[derive(Debug, Clone, Copy)]
pub struct Plain<F>(pub(crate) F);

/// A closure returning `Result<_, E>` with `E: Into<BoxError>`.
#[derive(Debug, Clone, Copy)]
pub struct Fallible<F>(pub(crate) F);

/// A closure returning a future that resolves to `Result<_, E>`.
#[derive(Debug, Clone, Copy)]
pub struct Deferred<F>(pub(crate) F);

/// Transform applied to each value together with its zero-based index.
pub trait Callback<A> {
    /// Value produced by the transform
    type Output;

    /// Apply the transform.
    fn call(&mut self, value: A, index: usize) -> Result<Self::Output, BoxError>;
}

impl<A, B, F> Callback<A> for Plain<F>
where
    F: FnMut(A, usize) -> B,
{
    type Output = B;

    #[inline]
    fn call(&mut self, value: A, index: usize) -> Result<B, BoxError> {
        Ok((self.0)(value, index))
    }
}

impl<A, B, E, F> Callback<A> for Fallible<F>
where
    F: FnMut(A, usize) -> Result<B, E>,
    E: Into<BoxError>,
{
    type Output = B;

    #[inline]
    fn call(&mut self, value: A, index: usize) -> Result<B, BoxError> {
        (self.0)(value, index).map_err(Into::into)
    }
}

/// Predicate tested against a borrowed candidate and its upstream index.
pub trait Predicate<T> {
    /// Decide whether `value` is kept.
    fn test(&mut self, value: &T, index: usize) -> Result<bool, BoxError>;
}

impl<T, F> Predicate<T> for Plain<F>
where
    F: FnMut(&T, usize) -> bool,
{
    #[inline]
    fn test(&mut self, value: &T, index: usize) -> Result<bool, BoxError> {
        Ok((self.0)(value, index))
    }
}

impl<T, E, F> Predicate<T> for Fallible<F>
where
    F: FnMut(&T, usize) -> Result<bool, E>,
    E: Into<BoxError>,
{
    #[inline]
    fn test(&mut self, value: &T, index: usize) -> Result<bool, BoxError> {
        (self.0)(value, index).map_err(Into::into)
    }
}

/// Boxed future produced by a [`Deferred`] callback.
pub type DeferredFuture<Fut> = Pin<Box<ErrInto<Fut, BoxError>>>;

/// Transform used by the asynchronous protocol.
///
/// Synchronous callbacks resolve immediately through [`Ready`], so composing
/// them into an async chain adds no suspension point of their own.
pub trait AsyncCallback<A> {
    /// Value produced by the transform
    type Output;
    /// Future resolving to the transformed value
    type Future: Future<Output = Result<Self::Output, BoxError>> + Unpin;

    /// Start the transform.
    fn call(&mut self, value: A, index: usize) -> Self::Future;
}

impl<A, B, F> AsyncCallback<A> for Plain<F>
where
    F: FnMut(A, usize) -> B,
{
    type Output = B;
    type Future = Ready<Result<B, BoxError>>;

    #[inline]
    fn call(&mut self, value: A, index: usize) -> Self::Future {
        future::ready(Callback::call(self, value, index))
    }
}

impl<A, B, E, F> AsyncCallback<A> for Fallible<F>
where
    F: FnMut(A, usize) -> Result<B, E>,
    E: Into<BoxError>,
{
    type Output = B;
    type Future = Ready<Result<B, BoxError>>;

    #[inline]
    fn call(&mut self, value: A, index: usize) -> Self::Future {
        future::ready(Callback::call(self, value, index))
    }
}

impl<A, F, Fut> AsyncCallback<A> for Deferred<F>
where
    F: FnMut(A, usize) -> Fut,
    Fut: TryFuture,
    Fut::Error: Into<BoxError>,
{
    type Output = Fut::Ok;
    type Future = DeferredFuture<Fut>;

    fn call(&mut self, value: A, index: usize) -> Self::Future {
        Box::pin((self.0)(value, index).err_into())
    }
}

/// Predicate used by the asynchronous protocol.
pub trait AsyncPredicate<T> {
    /// Future resolving to the verdict
    type Future: Future<Output = Result<bool, BoxError>> + Unpin;

    /// Start testing `value`.
    fn test(&mut self, value: &T, index: usize) -> Self::Future;
}

impl<T, F> AsyncPredicate<T> for Plain<F>
where
    F: FnMut(&T, usize) -> bool,
{
    type Future = Ready<Result<bool, BoxError>>;

    #[inline]
    fn test(&mut self, value: &T, index: usize) -> Self::Future {
        future::ready(Predicate::test(self, value, index))
    }
}

impl<T, E, F> AsyncPredicate<T> for Fallible<F>
where
    F: FnMut(&T, usize) -> Result<bool, E>,
    E: Into<BoxError>,
{
    type Future = Ready<Result<bool, BoxError>>;

    #[inline]
    fn test(&mut self, value: &T, index: usize) -> Self::Future {
        future::ready(Predicate::test(self, value, index))
    }
}

impl<T, F, Fut> AsyncPredicate<T> for Deferred<F>
where
    F: FnMut(&T, usize) -> Fut,
    Fut: TryFuture<Ok = bool>,
    Fut::Error: Into<BoxError>,
{
    type Future = DeferredFuture<Fut>;

    fn test(&mut self, value: &T, index: usize) -> Self::Future {
        Box::pin((self.0)(value, index).err_into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;

    #[test]
    fn test_plain_callback_passes_index() {
        let mut cb = Plain(|x: i32, i: usize| x * 10 + i as i32);
        assert_eq!(Callback::call(&mut cb, 4, 2).unwrap(), 42);
    }

    #[test]
    fn test_fallible_callback_boxes_error() {
        let mut cb = Fallible(|x: i32, _: usize| if x < 0 { Err("negative") } else { Ok(x) });
        assert_eq!(Callback::call(&mut cb, 3, 0).unwrap(), 3);
        let err = Callback::call(&mut cb, -1, 1).unwrap_err();
        assert_eq!(err.to_string(), "negative");
    }

    #[test]
    fn test_plain_async_callback_is_immediately_ready() {
        let mut cb = Plain(|x: i32, _: usize| x + 1);
        let out = AsyncCallback::call(&mut cb, 1, 0).now_or_never();
        assert_eq!(out.map(|r| r.unwrap()), Some(2));
    }

    #[test]
    fn test_deferred_predicate_resolves() {
        let mut p = Deferred(|x: &i32, _: usize| {
            let even = *x % 2 == 0;
            async move { Ok::<_, std::io::Error>(even) }
        });
        let verdict = AsyncPredicate::test(&mut p, &4, 0).now_or_never();
        assert!(verdict.unwrap().unwrap());
    }
}
