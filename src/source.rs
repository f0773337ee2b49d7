//! Building sequences from collections, iterators and producers.
//!
//! Re-iterable sources ([`of`], [`from`], [`empty`]) hand out a fresh traversal for
//! every cursor. Single-use sources ([`once`], [`from_fn`], [`from_cursor`]) are
//! consumed as they are pulled and refuse a second cursor with
//! [`SeqError::AlreadyIterated`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    error::{BoxError, Result, SeqError},
    sequence::{Cursor, Sequence},
    step::Step,
};

/// Re-iterable sequence over an owned, shared buffer.
///
/// Created via [`of`]. Cursors share the buffer and clone each value as it is pulled.
pub struct Items<T> {
    items: Arc<[T]>,
}

impl<T> Clone for Items<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Items<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

/// Create a re-iterable sequence from a list of values.
///
/// ```rust
/// use pullseq::prelude::*;
///
/// let seq = of([1, 2, 3]);
/// assert_eq!(seq.to_vec().unwrap(), vec![1, 2, 3]);
/// assert_eq!(seq.to_vec().unwrap(), vec![1, 2, 3]); // again, from the start
/// ```
pub fn of<T, I>(values: I) -> Items<T>
where
    I: IntoIterator<Item = T>,
{
    Items {
        items: values.into_iter().collect(),
    }
}

impl<T> FromIterator<T> for Items<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        of(iter)
    }
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl<T: Clone> Sequence for Items<T> {
    type Item = T;
    type Cursor = ItemsCursor<T>;

    fn cursor(&self) -> Result<ItemsCursor<T>> {
        Ok(ItemsCursor {
            items: Some(Arc::clone(&self.items)),
            index: 0,
        })
    }
}

/// Cursor over an [`Items`] buffer.
pub struct ItemsCursor<T> {
    items: Option<Arc<[T]>>,
    index: usize,
}

impl<T: Clone> Cursor for ItemsCursor<T> {
    type Item = T;

    fn pull(&mut self) -> Result<Step<T>> {
        let Some(items) = &self.items else {
            return Ok(Step::Done);
        };
        match items.get(self.index) {
            Some(value) => {
                self.index += 1;
                Ok(Step::Yielded(value.clone()))
            }
            None => {
                self.items = None;
                Ok(Step::Done)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.items = None;
        Ok(())
    }
}

/// Re-iterable sequence over any cloneable iterable.
///
/// Created via [`from`]. Each cursor iterates a fresh clone, so nothing is read
/// from the iterable until a cursor is pulled.
#[derive(Debug, Clone)]
pub struct Iterable<I> {
    iterable: I,
}

/// Create a re-iterable sequence from a collection or cloneable iterator.
///
/// Works with vectors, ranges, sets, maps and any other `IntoIterator + Clone`.
///
/// ```rust
/// use std::collections::BTreeMap;
/// use pullseq::prelude::*;
///
/// let squares = from(1..=4).map(|x, _| x * x);
/// assert_eq!(squares.to_vec().unwrap(), vec![1, 4, 9, 16]);
///
/// let map = BTreeMap::from([("a", 1), ("b", 2)]);
/// assert_eq!(from(map).to_vec().unwrap(), vec![("a", 1), ("b", 2)]);
/// ```
pub fn from<I>(iterable: I) -> Iterable<I>
where
    I: IntoIterator + Clone,
{
    Iterable { iterable }
}

impl<I> Sequence for Iterable<I>
where
    I: IntoIterator + Clone,
{
    type Item = I::Item;
    type Cursor = IterCursor<I::IntoIter>;

    fn cursor(&self) -> Result<Self::Cursor> {
        Ok(IterCursor::new(self.iterable.clone().into_iter()))
    }
}

/// Cursor over a native [`Iterator`].
pub struct IterCursor<I> {
    iter: Option<I>,
}

impl<I: Iterator> IterCursor<I> {
    /// Wrap `iter`; it is dropped on exhaustion or close.
    pub fn new(iter: I) -> Self {
        Self { iter: Some(iter) }
    }
}

impl<I: Iterator> Cursor for IterCursor<I> {
    type Item = I::Item;

    fn pull(&mut self) -> Result<Step<I::Item>> {
        let Some(iter) = self.iter.as_mut() else {
            return Ok(Step::Done);
        };
        match iter.next() {
            Some(value) => Ok(Step::Yielded(value)),
            None => {
                self.iter = None;
                Ok(Step::Done)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.iter = None;
        Ok(())
    }
}

/// Re-iterable sequence that never yields.
pub struct Empty<T>(PhantomData<fn() -> T>);

impl<T> Clone for Empty<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Empty<T> {}

impl<T> fmt::Debug for Empty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Empty")
    }
}

/// Create a sequence that is immediately done.
pub fn empty<T>() -> Empty<T> {
    Empty(PhantomData)
}

impl<T> Sequence for Empty<T> {
    type Item = T;
    type Cursor = Empty<T>;

    fn cursor(&self) -> Result<Empty<T>> {
        Ok(*self)
    }
}

impl<T> Cursor for Empty<T> {
    type Item = T;

    fn pull(&mut self) -> Result<Step<T>> {
        Ok(Step::Done)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Hands out its payload to the first cursor request only.
pub(crate) struct SingleUse<T> {
    slot: Mutex<Option<T>>,
}

impl<T> SingleUse<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            slot: Mutex::new(Some(value)),
        }
    }

    pub(crate) fn take(&self) -> Result<T> {
        self.slot.lock().take().ok_or(SeqError::AlreadyIterated)
    }
}

/// Single-use sequence over an iterator.
///
/// Created via [`once`].
pub struct Once<I> {
    iter: SingleUse<I>,
}

/// Create a single-use sequence that consumes `iterable` as it is pulled.
///
/// ```rust
/// use pullseq::prelude::*;
///
/// let lines = once(vec!["a", "b"]);
/// assert_eq!(lines.to_vec().unwrap(), vec!["a", "b"]);
/// assert!(matches!(lines.to_vec(), Err(SeqError::AlreadyIterated)));
/// ```
pub fn once<I>(iterable: I) -> Once<I::IntoIter>
where
    I: IntoIterator,
{
    Once {
        iter: SingleUse::new(iterable.into_iter()),
    }
}

impl<I: Iterator> Sequence for Once<I> {
    type Item = I::Item;
    type Cursor = IterCursor<I>;

    fn cursor(&self) -> Result<IterCursor<I>> {
        self.iter.take().map(IterCursor::new)
    }
}

/// Single-use generator driven by a closure.
///
/// Created via [`from_fn`].
pub struct FromFn<F> {
    f: SingleUse<F>,
}

/// Create a single-use sequence from a producer closure.
///
/// The closure returns `Ok(Some(value))` to yield, `Ok(None)` to finish and
/// `Err(_)` to fail as a source fault.
///
/// ```rust
/// use pullseq::prelude::*;
///
/// let mut n = 0;
/// let counter = from_fn(move || {
///     n += 1;
///     Ok::<_, std::io::Error>((n <= 3).then_some(n))
/// });
/// assert_eq!(counter.to_vec().unwrap(), vec![1, 2, 3]);
/// ```
pub fn from_fn<T, E, F>(f: F) -> FromFn<F>
where
    F: FnMut() -> std::result::Result<Option<T>, E>,
    E: Into<BoxError>,
{
    FromFn {
        f: SingleUse::new(f),
    }
}

impl<T, E, F> Sequence for FromFn<F>
where
    F: FnMut() -> std::result::Result<Option<T>, E>,
    E: Into<BoxError>,
{
    type Item = T;
    type Cursor = FromFnCursor<F>;

    fn cursor(&self) -> Result<FromFnCursor<F>> {
        self.f.take().map(|f| FromFnCursor { f: Some(f) })
    }
}

/// Cursor driving a [`FromFn`] producer.
pub struct FromFnCursor<F> {
    f: Option<F>,
}

impl<T, E, F> Cursor for FromFnCursor<F>
where
    F: FnMut() -> std::result::Result<Option<T>, E>,
    E: Into<BoxError>,
{
    type Item = T;

    fn pull(&mut self) -> Result<Step<T>> {
        let Some(f) = self.f.as_mut() else {
            return Ok(Step::Done);
        };
        match f() {
            Ok(Some(value)) => Ok(Step::Yielded(value)),
            Ok(None) => {
                self.f = None;
                Ok(Step::Done)
            }
            Err(err) => {
                self.f = None;
                Err(SeqError::source(err))
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.f = None;
        Ok(())
    }
}

/// Single-use sequence wrapping an existing cursor.
///
/// Created via [`from_cursor`].
pub struct FromCursor<C> {
    cursor: SingleUse<C>,
}

/// Expose a native cursor as a single-use sequence so operators can wrap it.
pub fn from_cursor<C: Cursor>(cursor: C) -> FromCursor<C> {
    FromCursor {
        cursor: SingleUse::new(cursor),
    }
}

impl<C: Cursor> Sequence for FromCursor<C> {
    type Item = C::Item;
    type Cursor = C;

    fn cursor(&self) -> Result<C> {
        self.cursor.take()
    }
}
