//! Lazy operators over synchronous sequences.
//!
//! Each operator wraps its source without pulling from it. Its cursor owns the
//! upstream cursor through a [`Link`](crate::Link), pulls at most one upstream
//! value per downstream pull (except [`chunks`], which buffers by contract), and
//! closes the upstream on every terminal path.

mod chain;
mod chunks;
mod filter;
mod flat_map;
mod map;
mod on_close;
mod slice;

pub use chain::chain;
pub use chunks::{chunks, Chunks, ChunksCursor};
pub use filter::{filter, try_filter, Filter, FilterCursor};
pub use flat_map::{flat_map, try_flat_map, FlatMap, FlatMapCursor};
pub use map::{map, try_map, Map, MapCursor};
pub use on_close::{on_close, HookFn, OnClose, OnCloseCursor};
pub use slice::{skip, take, Skip, SkipCursor, Take, TakeCursor};
