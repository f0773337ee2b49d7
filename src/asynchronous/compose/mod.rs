//! Lazy operators over asynchronous sequences.
//!
//! Same discipline as [`crate::compose`], with the upstream held through an
//! [`AsyncLink`](super::AsyncLink). Synchronous callbacks resolve within the
//! poll that invoked them; only upstream pulls and the futures returned by
//! `*_async` callbacks suspend. At most one callback future is in flight per
//! cursor.

mod chain;
mod filter;
mod flat_map;
mod map;
mod slice;

pub use chain::chain;
pub use filter::{filter, filter_async, try_filter, Filter, FilterAsync, FilterCursor};
pub use flat_map::{
    flat_map, flat_map_async, try_flat_map, FlatMap, FlatMapAsync, FlatMapCursor,
};
pub use map::{map, map_async, try_map, Map, MapAsync, MapCursor};
pub use slice::{skip, take, Skip, SkipCursor, Take, TakeCursor};
