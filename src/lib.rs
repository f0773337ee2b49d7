//! # Pullseq: Lazy Pull-Based Sequences
//!
//! Build lazy sequences, compose them with operators, and pull values out one at
//! a time, synchronously or asynchronously.
//!
//! ## Core Traits
//!
//! - **[`Sequence`]**: Anything that hands out a fresh [`Cursor`] per traversal
//! - **[`Cursor`]**: Single-owner handle with `pull()` and `close()`
//! - **[`AsyncSequence`]** / **[`AsyncCursor`]**: The same contract with suspension points
//!
//! ## Key Features
//!
//! - **Lazy**: Building a chain pulls nothing; each layer pulls at most one
//!   upstream value per downstream pull
//! - **Closed exactly once**: Exhaustion, a fault, `close()` or dropping a chain
//!   releases every open upstream cursor once, innermost first
//! - **Bridged**: `into_async()` and `into_deferred()` cross into the async
//!   protocol without reordering or prefetching
//!
//! ## Example
//!
//! ```
//! use pullseq::prelude::*;
//!
//! let pipeline = of([1, 2, 3, 4])
//!     .filter(|x, _| x % 2 == 0)
//!     .map(|x, _| x * 2);
//!
//! assert_eq!(pipeline.to_vec().unwrap(), vec![4, 8]);
//! assert_eq!(pipeline.reduce(|acc, x, _| acc + x, 0).unwrap(), 12);
//! ```
//!
//! ## Common Functions
//!
//! **Sources:**
//! - [`of(values)`](of) - Re-iterable sequence over owned values
//! - [`from(iterable)`](from) - Re-iterable sequence over any cloneable iterable
//! - [`once(iterable)`](once) - Single-use sequence consumed as it is pulled
//! - [`from_fn(f)`](from_fn) - Single-use generator
//!
//! **Operators:** [`compose`] and [`asynchronous::compose`] hold the free-function
//! forms of every operator; the trait methods forward to them.
//!
//! **Execution:**
//! - [`Sequence::to_vec`], [`Sequence::reduce`], [`Sequence::iter`]
//! - [`AsyncSequence::to_vec`], [`AsyncSequence::reduce_async`], [`AsyncSequence::stream`]

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod asynchronous;
pub mod callback;
pub mod compose;
mod error;
mod iter;
mod link;
pub mod prelude;
pub mod run;
mod sequence;
pub mod source;
mod step;

#[cfg(test)]
mod testing;

pub use asynchronous::{AsyncCursor, AsyncCursorExt, AsyncLink, AsyncSequence, CursorStream};
pub use error::*;
pub use iter::*;
pub use link::*;
pub use sequence::*;
pub use source::{empty, from, from_cursor, from_fn, of, once};
pub use step::*;
