//! Commonly used imports
//!
//! Use `use pullseq::prelude::*;` for quick access to the traits, the pull
//! envelope and the synchronous sources.

// Core types
pub use crate::{SeqError, Step};

// Protocol traits
pub use crate::{AsyncCursor, AsyncCursorExt, AsyncSequence, Cursor, Sequence};

// Sources
pub use crate::source::{empty, from, from_cursor, from_fn, of, once};
