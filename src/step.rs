/// Result of a single pull: either the next value or the end of the sequence.
///
/// `Step` is the envelope every cursor produces, similar to how `Option` represents
/// an optional value. Once a cursor returns [`Step::Done`] it keeps returning it.
///
/// # Examples
///
/// ```rust
/// use pullseq::Step;
///
/// let next: Step<i32> = Step::Yielded(42);
/// let end: Step<i32> = Step::Done;
///
/// assert_eq!(next.map(|x| x * 2), Step::Yielded(84));
/// assert_eq!(end.map(|x| x * 2), Step::Done);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step<T> {
    /// The cursor advanced and produced a value
    Yielded(T),
    /// The cursor is exhausted
    Done,
}

impl<T> Step<T> {
    /// Returns `true` if the step is `Yielded`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pullseq::Step;
    ///
    /// assert!(Step::Yielded(1).is_yielded());
    /// assert!(!Step::<i32>::Done.is_yielded());
    /// ```
    #[inline]
    pub const fn is_yielded(&self) -> bool {
        matches!(self, Step::Yielded(_))
    }

    /// Returns `true` if the step is `Done`.
    #[inline]
    pub const fn is_done(&self) -> bool {
        matches!(self, Step::Done)
    }

    /// Converts from `Step<T>` to `Option<T>`, discarding the end marker.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pullseq::Step;
    ///
    /// assert_eq!(Step::Yielded(42).yielded_value(), Some(42));
    /// assert_eq!(Step::<i32>::Done.yielded_value(), None);
    /// ```
    #[inline]
    pub fn yielded_value(self) -> Option<T> {
        match self {
            Step::Yielded(value) => Some(value),
            Step::Done => None,
        }
    }

    /// Maps a `Step<T>` to `Step<U>` by applying a function to the yielded value.
    #[inline]
    pub fn map<U, F>(self, f: F) -> Step<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Step::Yielded(value) => Step::Yielded(f(value)),
            Step::Done => Step::Done,
        }
    }

    /// Returns the yielded value or a default.
    #[inline]
    pub fn yielded_or(self, default: T) -> T {
        match self {
            Step::Yielded(value) => value,
            Step::Done => default,
        }
    }

    /// Returns the yielded value or computes it from a closure.
    #[inline]
    pub fn yielded_or_else<F>(self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self {
            Step::Yielded(value) => value,
            Step::Done => f(),
        }
    }

    /// Converts from `&Step<T>` to `Step<&T>`.
    #[inline]
    pub const fn as_ref(&self) -> Step<&T> {
        match self {
            Step::Yielded(value) => Step::Yielded(value),
            Step::Done => Step::Done,
        }
    }

    /// Converts from `&mut Step<T>` to `Step<&mut T>`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pullseq::Step;
    ///
    /// let mut x = Step::Yielded(42);
    /// if let Step::Yielded(v) = x.as_mut() {
    ///     *v = 100;
    /// }
    /// assert_eq!(x, Step::Yielded(100));
    /// ```
    #[inline]
    pub fn as_mut(&mut self) -> Step<&mut T> {
        match self {
            Step::Yielded(value) => Step::Yielded(value),
            Step::Done => Step::Done,
        }
    }

    /// Returns the yielded value, consuming the `self` value.
    ///
    /// # Panics
    ///
    /// Panics with `msg` if the step is `Done`.
    #[inline]
    pub fn expect_yielded(self, msg: &str) -> T {
        match self {
            Step::Yielded(value) => value,
            Step::Done => panic!("{}", msg),
        }
    }

    /// Returns the yielded value, consuming the `self` value.
    ///
    /// # Panics
    ///
    /// Panics if the step is `Done`.
    ///
    /// ```should_panic
    /// use pullseq::Step;
    ///
    /// Step::<i32>::Done.unwrap_yielded(); // panics
    /// ```
    #[inline]
    pub fn unwrap_yielded(self) -> T {
        match self {
            Step::Yielded(value) => value,
            Step::Done => panic!("called `Step::unwrap_yielded()` on a `Done` value"),
        }
    }
}

impl<T> From<Option<T>> for Step<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Step::Yielded(value),
            None => Step::Done,
        }
    }
}

impl<T> From<Step<T>> for Option<T> {
    fn from(step: Step<T>) -> Self {
        step.yielded_value()
    }
}
