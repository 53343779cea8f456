//! Resource query store.
//!
//! A process-wide keyed cache mapping query keys to fetched data, with two
//! entry shapes: plain JSON values and cursor-paginated page sequences.
//! Entries are created on first fetch, patched synchronously by optimistic
//! mutations, marked stale by invalidation (scheduling a background
//! refetch), and removed only on sign-out.
//!
//! Concurrency: at most one fetch is in flight per key at a time, enforced
//! by an explicit per-key flag. A `fetch_next_page` issued while another is
//! outstanding for the same key is coalesced into a no-op; concurrent
//! simple-query readers wait for the in-flight result instead of issuing a
//! duplicate request.

mod entry;
mod key;
mod store;

pub use entry::{CacheEntry, Paginated};
pub use key::QueryKey;
pub use store::{PageFetcher, QueryStore, SimpleFetcher};
