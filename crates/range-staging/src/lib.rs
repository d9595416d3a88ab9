//! Components B and C: range bundle persistence and the fetcher that
//! ensures a range is staged from whatever source is cheapest — an
//! existing bundle, a legacy per-block artifact, or the RPC pool.

mod fetcher;
mod store;

pub use {
    fetcher::{FetchError, RangeFetcher},
    store::{RangeStore, StoreError},
};
