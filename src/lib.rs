//! Chirp Client Library
//!
//! Client-side data-synchronization layer for the Chirp social network:
//! a keyed query store with cursor pagination, optimistic mutations with
//! invalidation-driven reconciliation, viewport-driven infinite scroll,
//! and a debounced search path.

pub mod cache;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod scroll;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;
